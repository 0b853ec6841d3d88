//! Authentication-related models

use serde::{Deserialize, Serialize};

use super::user::UserResponse;

/// Login request. Both fields are optional so a missing one can be reported
/// with the login-specific message instead of a body parse error.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Token refresh request; `token` is the (possibly expired) access token
#[derive(Debug, Default, Deserialize)]
pub struct RefreshTokenRequest {
    pub token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ForgotPasswordRequest {
    #[serde(default)]
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    #[serde(alias = "userID")]
    pub user_id: String,
    pub token: String,
    pub password: String,
    #[serde(alias = "confirmPassword")]
    pub confirm_password: String,
}

/// Body for `POST /resetPassword/{user_id}/{token}`, the form the emailed
/// link points at
#[derive(Debug, Deserialize)]
pub struct NewPasswordRequest {
    pub password: String,
    #[serde(alias = "confirmPassword")]
    pub confirm_password: String,
}

/// Body returned whenever tokens are issued
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub status: &'static str,
    pub token: String,
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub status: &'static str,
    pub token: String,
}
