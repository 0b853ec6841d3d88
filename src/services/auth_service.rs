//! 认证服务：注册、登录、令牌刷新、密码重置

use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::{jwt::JwtService, password::PasswordHasher, reset_token, TokenPair},
    config::SecurityConfig,
    error::AppError,
    mailer::{Email, Mailer},
    models::{auth::*, user::*},
    repository::UserRepository,
};

/// A user together with freshly issued tokens
#[derive(Debug)]
pub struct AuthOutcome {
    pub user: UserResponse,
    pub tokens: TokenPair,
}

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    jwt_service: Arc<JwtService>,
    hasher: PasswordHasher,
    mailer: Arc<dyn Mailer>,
    reset_token_ttl_mins: u64,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        jwt_service: Arc<JwtService>,
        mailer: Arc<dyn Mailer>,
        security: &SecurityConfig,
    ) -> Result<Self, AppError> {
        Ok(Self {
            users,
            jwt_service,
            hasher: PasswordHasher::from_config(security)?,
            mailer,
            reset_token_ttl_mins: security.reset_token_ttl_mins,
        })
    }

    /// 签发访问令牌与刷新令牌
    fn issue(&self, user: User) -> Result<AuthOutcome, AppError> {
        let tokens = self.jwt_service.generate_token_pair(&user.id)?;
        Ok(AuthOutcome {
            user: UserResponse::from(user),
            tokens,
        })
    }

    /// 用户注册
    pub async fn signup(&self, req: SignupRequest) -> Result<AuthOutcome, AppError> {
        req.validate()?;
        self.hasher.validate_policy(&req.password)?;

        if req.password != req.confirm_password {
            return Err(AppError::bad_request("Passwords do not match"));
        }

        let password_hash = self.hasher.hash(&req.password)?;
        let user = self
            .users
            .create(&NewUser {
                username: req.username,
                email: req.email,
                password_hash,
                name: req.name,
            })
            .await?;

        tracing::info!(user_id = %user.id, username = %user.username, "User signed up");

        self.issue(user)
    }

    /// 用户登录
    pub async fn login(&self, req: LoginRequest) -> Result<AuthOutcome, AppError> {
        let (username, password) = match (req.username, req.password) {
            (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => (u, p),
            _ => return Err(AppError::bad_request("Username or Password doesn't exists")),
        };

        // 用户不存在与密码错误返回同一条消息
        let incorrect = || AppError::bad_request("Incorrect Username or Password");

        let user = self
            .users
            .find_by_username(&username)
            .await?
            .ok_or_else(incorrect)?;

        if !self.hasher.verify(&password, &user.password_hash)? {
            tracing::debug!(user_id = %user.id, "Login rejected: wrong password");
            return Err(incorrect());
        }

        tracing::info!(user_id = %user.id, "User logged in");

        self.issue(user)
    }

    /// 刷新访问令牌。刷新令牌本身不轮换。
    pub async fn refresh(
        &self,
        req: RefreshTokenRequest,
        refresh_token: Option<String>,
    ) -> Result<String, AppError> {
        let invalid_access = || AppError::authentication("Invalid access token");

        // 1. 访问令牌只校验签名，允许已过期
        let access_claims = req
            .token
            .as_deref()
            .ok_or_else(invalid_access)
            .and_then(|t| {
                self.jwt_service
                    .decode_access_token_allow_expired(t)
                    .map_err(|_| invalid_access())
            })?;
        let user_id = access_claims.user_id().ok_or_else(invalid_access)?;

        // 2. 用户仍然存在
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::authentication("User of this token no longer exists"))?;

        // 3. 提供了刷新令牌
        let refresh_token =
            refresh_token.ok_or_else(|| AppError::authentication("Refresh token not provided"))?;

        // 4. 刷新令牌签名
        let refresh_claims = self
            .jwt_service
            .decode_refresh_token(&refresh_token)
            .map_err(|_| AppError::authentication("Invalid refresh token"))?;

        // 5. 两个令牌属于同一用户
        if refresh_claims.sub != access_claims.sub {
            tracing::warn!(
                access_sub = %access_claims.sub,
                refresh_sub = %refresh_claims.sub,
                "Refresh rejected: mismatched tokens"
            );
            return Err(AppError::authentication("Mismatched Tokens"));
        }

        // 6. 显式检查刷新令牌过期
        if refresh_claims.is_expired() {
            return Err(AppError::authentication("Refresh token expired"));
        }

        tracing::debug!(user_id = %user.id, "Access token refreshed");

        self.jwt_service.generate_access_token(&user.id)
    }

    /// 发送密码重置邮件。`reset_url_base` 不带结尾斜杠。
    pub async fn forgot_password(
        &self,
        req: ForgotPasswordRequest,
        reset_url_base: &str,
    ) -> Result<(), AppError> {
        let user = self
            .users
            .find_by_username(&req.username)
            .await?
            .ok_or_else(|| AppError::authentication("No User of this username found"))?;

        // 直接写入，不经过字段校验；新令牌覆盖旧令牌
        let token = reset_token::issue(self.reset_token_ttl_mins);
        self.users
            .set_reset_token(user.id, &token.hash, token.expires_at)
            .await?;

        let url = format!("{}/resetPassword/{}/{}", reset_url_base, user.id, token.raw);
        let email = Email {
            to: user.email.clone(),
            subject: "Reset your Password!".to_string(),
            body: format!("Forgot your Password? Click here to reset: {}", url),
            template: "forgot_password".to_string(),
        };

        if let Err(e) = self.mailer.send(&email).await {
            tracing::error!(user_id = %user.id, error = %e, "Failed to send reset email");
            // 投递失败时令牌不能继续有效
            self.users.clear_reset_token(user.id).await?;
            return Err(AppError::EmailDelivery(e.to_string()));
        }

        tracing::info!(user_id = %user.id, "Password reset email sent");
        Ok(())
    }

    /// 使用重置令牌设置新密码，成功后自动登录
    pub async fn reset_password(&self, req: ResetPasswordRequest) -> Result<AuthOutcome, AppError> {
        let invalid_url = || AppError::authentication("Invalid URL");

        let user_id = Uuid::parse_str(&req.user_id).map_err(|_| invalid_url())?;
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(invalid_url)?;

        if !user.has_active_reset_token() {
            return Err(AppError::authentication("URL has Expired"));
        }

        let stored = user.password_reset_token.as_deref().unwrap_or_default();
        if !reset_token::matches(&req.token, stored) {
            return Err(invalid_url());
        }

        if req.password != req.confirm_password {
            return Err(AppError::bad_request("Passwords do not match"));
        }
        self.hasher.validate_policy(&req.password)?;

        let password_hash = self.hasher.hash(&req.password)?;
        if !self.users.update_password(user.id, &password_hash).await? {
            return Err(invalid_url());
        }

        let user = self.users.find_by_id(user.id).await?.ok_or_else(invalid_url)?;

        tracing::info!(user_id = %user.id, "Password reset completed");

        self.issue(user)
    }

    /// 已登录用户修改密码，成功后重新签发令牌
    pub async fn change_password(
        &self,
        user_id: Uuid,
        req: ChangePasswordRequest,
    ) -> Result<AuthOutcome, AppError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::authentication("User of this token no longer exists"))?;

        if !self.hasher.verify(&req.current_password, &user.password_hash)? {
            return Err(AppError::authentication("Your current password is wrong"));
        }

        if req.password != req.confirm_password {
            return Err(AppError::bad_request("Passwords do not match"));
        }
        self.hasher.validate_policy(&req.password)?;

        let password_hash = self.hasher.hash(&req.password)?;
        self.users.update_password(user.id, &password_hash).await?;

        let user = self
            .users
            .find_by_id(user.id)
            .await?
            .ok_or_else(|| AppError::authentication("User of this token no longer exists"))?;

        self.issue(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::jwt::tests::test_config,
        mailer::{LogMailer, MailError},
        repository::InMemoryStore,
    };
    use async_trait::async_trait;

    struct FailingMailer;

    #[async_trait]
    impl Mailer for FailingMailer {
        async fn send(&self, _email: &Email) -> Result<(), MailError> {
            Err(MailError::Rejected(502))
        }
    }

    fn service(mailer: Arc<dyn Mailer>) -> (AuthService, Arc<InMemoryStore>) {
        let config = test_config();
        let store = Arc::new(InMemoryStore::new());
        let jwt = Arc::new(JwtService::from_config(&config).unwrap());
        let service = AuthService::new(store.clone(), jwt, mailer, &config.security).unwrap();
        (service, store)
    }

    fn signup_request(username: &str) -> SignupRequest {
        SignupRequest {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            password: "correct-horse".to_string(),
            confirm_password: "correct-horse".to_string(),
            name: None,
        }
    }

    #[tokio::test]
    async fn test_login_does_not_reveal_which_field_was_wrong() {
        let (service, _) = service(Arc::new(LogMailer::new("x")));
        service.signup(signup_request("alice")).await.unwrap();

        let wrong_password = service
            .login(LoginRequest {
                username: Some("alice".to_string()),
                password: Some("wrong".to_string()),
            })
            .await
            .unwrap_err();
        let unknown_user = service
            .login(LoginRequest {
                username: Some("nobody".to_string()),
                password: Some("correct-horse".to_string()),
            })
            .await
            .unwrap_err();

        assert_eq!(wrong_password.user_message(), unknown_user.user_message());
        assert_eq!(wrong_password.user_message(), "Incorrect Username or Password");
    }

    #[tokio::test]
    async fn test_login_missing_fields() {
        let (service, _) = service(Arc::new(LogMailer::new("x")));
        let err = service
            .login(LoginRequest {
                username: Some("alice".to_string()),
                password: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), 400);
        assert_eq!(err.user_message(), "Username or Password doesn't exists");
    }

    #[tokio::test]
    async fn test_failed_email_clears_reset_token() {
        let (service, store) = service(Arc::new(FailingMailer));
        service.signup(signup_request("bob")).await.unwrap();

        let err = service
            .forgot_password(
                ForgotPasswordRequest {
                    username: "bob".to_string(),
                },
                "http://localhost",
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), 500);

        let user = store.find_by_username("bob").await.unwrap().unwrap();
        assert!(user.password_reset_token.is_none());
        assert!(user.password_reset_expires_at.is_none());
    }

    #[tokio::test]
    async fn test_refresh_with_missing_cookie() {
        let (service, _) = service(Arc::new(LogMailer::new("x")));
        let outcome = service.signup(signup_request("carol")).await.unwrap();

        let err = service
            .refresh(
                RefreshTokenRequest {
                    token: Some(outcome.tokens.access_token),
                },
                None,
            )
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "Refresh token not provided");
    }
}
