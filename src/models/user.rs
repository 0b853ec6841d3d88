//! User domain models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

pub const DEFAULT_PICTURE: &str = "default.jpg";

/// User account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,

    // Profile
    pub name: Option<String>,
    pub tagline: Option<String>,
    pub bio: Option<String>,
    pub profile_pic: String,
    pub cover_pic: String,

    // Password reset (SHA-256 of the emailed token)
    pub password_reset_token: Option<String>,
    pub password_reset_expires_at: Option<DateTime<Utc>>,
    pub password_changed_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// A reset token is on file and its expiry has not passed.
    pub fn has_active_reset_token(&self) -> bool {
        match (&self.password_reset_token, self.password_reset_expires_at) {
            (Some(_), Some(expires_at)) => expires_at > Utc::now(),
            _ => false,
        }
    }

    /// 令牌签发（秒级 `iat`）早于最近一次改密
    pub fn changed_password_after(&self, issued_at: i64) -> bool {
        self.password_changed_at
            .is_some_and(|changed_at| issued_at < changed_at.timestamp())
    }
}

/// Fields required to insert a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub name: Option<String>,
}

/// Signup request
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 3, max = 30, message = "Username must be 3 to 30 characters"))]
    pub username: String,
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,
    pub password: String,
    #[serde(alias = "confirmPassword")]
    pub confirm_password: String,
    #[validate(length(max = 50, message = "Name must be at most 50 characters"))]
    pub name: Option<String>,
}

/// Profile update request
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(max = 50, message = "Name must be at most 50 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 100, message = "Tagline must be at most 100 characters"))]
    pub tagline: Option<String>,
    #[validate(length(max = 1000, message = "Bio must be at most 1000 characters"))]
    pub bio: Option<String>,
    #[serde(alias = "profilePic")]
    pub profile_pic: Option<String>,
    #[serde(alias = "coverPic")]
    pub cover_pic: Option<String>,
}

/// Change password request
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    #[serde(alias = "oldPassword")]
    pub current_password: String,
    pub password: String,
    #[serde(alias = "confirmPassword")]
    pub confirm_password: String,
}

/// 分页参数
#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

/// User response (without sensitive data)
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub name: Option<String>,
    pub tagline: Option<String>,
    pub bio: Option<String>,
    pub profile_pic: String,
    pub cover_pic: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            name: user.name,
            tagline: user.tagline,
            bio: user.bio,
            profile_pic: user.profile_pic,
            cover_pic: user.cover_pic,
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "$argon2id$...".to_string(),
            name: None,
            tagline: None,
            bio: None,
            profile_pic: DEFAULT_PICTURE.to_string(),
            cover_pic: DEFAULT_PICTURE.to_string(),
            password_reset_token: None,
            password_reset_expires_at: None,
            password_changed_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_changed_password_after() {
        let mut u = user();
        let changed_at = Utc::now();
        let now = changed_at.timestamp();
        assert!(!u.changed_password_after(now - 3600));

        u.password_changed_at = Some(changed_at);
        assert!(u.changed_password_after(now - 3600));
        // 改密后同一秒签发的令牌仍然有效
        assert!(!u.changed_password_after(now));
    }

    #[test]
    fn test_reset_token_activity() {
        let mut u = user();
        assert!(!u.has_active_reset_token());

        u.password_reset_token = Some("abc".to_string());
        u.password_reset_expires_at = Some(Utc::now() + Duration::minutes(5));
        assert!(u.has_active_reset_token());

        u.password_reset_expires_at = Some(Utc::now() - Duration::seconds(1));
        assert!(!u.has_active_reset_token());
    }

    #[test]
    fn test_user_response_strips_secrets() {
        let mut u = user();
        u.password_reset_token = Some("abc".to_string());
        let json = serde_json::to_value(UserResponse::from(u)).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("password_reset_token").is_none());
        assert_eq!(json["username"], "alice");
    }

    #[test]
    fn test_signup_validation() {
        let req = SignupRequest {
            username: "al".to_string(),
            email: "not-an-email".to_string(),
            password: "secret123".to_string(),
            confirm_password: "secret123".to_string(),
            name: None,
        };
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("username"));
        assert!(errors.field_errors().contains_key("email"));
    }
}
