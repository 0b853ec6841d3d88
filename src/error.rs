//! 统一错误模型
//!
//! Every failure is turned into an [`AppError`] variant where it happens, so
//! the boundary never has to sniff error shapes. `IntoResponse` renders the
//! safe body; [`crate::middleware::error_boundary`] swaps in the verbose body
//! when the server runs in development mode.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use thiserror::Error;

/// 结果类型别名
pub type Result<T> = std::result::Result<T, AppError>;

/// Postgres SQLSTATE for unique_violation.
const PG_UNIQUE_VIOLATION: &str = "23505";

/// 应用错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// A value could not be read as the type its field expects.
    #[error("Invalid {path}: {value}.")]
    Cast { path: String, value: String },

    #[error("Duplicate {field}: {value}")]
    Duplicate { field: String, value: String },

    /// Model-level validation failure; one message per offending field.
    #[error("Invalid input: {}", .0.join(", "))]
    Validation(Vec<String>),

    /// The request body could not be parsed into the expected shape.
    #[error("{0}")]
    RequestValidation(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Authentication(String),

    #[error("Invalid Token. Please Login Again")]
    InvalidToken,

    #[error("Token Expired. Please Login Again")]
    TokenExpired,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Email delivery failed: {0}")]
    EmailDelivery(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// 获取 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Cast { .. }
            | AppError::Duplicate { .. }
            | AppError::Validation(_)
            | AppError::RequestValidation(_)
            | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Authentication(_) | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::TokenExpired | AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::EmailDelivery(_)
            | AppError::Database(_)
            | AppError::Config(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Operational errors are expected failures whose message is safe to
    /// show to a client. Anything else is a bug or an infrastructure fault.
    pub fn is_operational(&self) -> bool {
        !matches!(
            self,
            AppError::Database(_) | AppError::Config(_) | AppError::Internal(_)
        )
    }

    /// 获取用户友好的错误消息（不包含敏感信息）
    pub fn user_message(&self) -> String {
        match self {
            AppError::EmailDelivery(_) => "There was an error sending the email".to_string(),
            e if e.is_operational() => e.to_string(),
            _ => "Internal Server Error".to_string(),
        }
    }

    /// Stable variant name, used in verbose error bodies and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Cast { .. } => "cast",
            AppError::Duplicate { .. } => "duplicate",
            AppError::Validation(_) => "validation",
            AppError::RequestValidation(_) => "request_validation",
            AppError::BadRequest(_) => "bad_request",
            AppError::Authentication(_) => "authentication",
            AppError::InvalidToken => "invalid_token",
            AppError::TokenExpired => "token_expired",
            AppError::Forbidden(_) => "forbidden",
            AppError::NotFound(_) => "not_found",
            AppError::EmailDelivery(_) => "email_delivery",
            AppError::Database(_) => "database",
            AppError::Config(_) => "config",
            AppError::Internal(_) => "internal",
        }
    }

    /// 获取错误码
    pub fn code(&self) -> u16 {
        self.status_code().as_u16()
    }

    /// The error and each of its sources, outermost first.
    pub fn chain(&self) -> Vec<String> {
        let mut chain = vec![self.to_string()];
        let mut source = std::error::Error::source(self);
        while let Some(err) = source {
            chain.push(err.to_string());
            source = err.source();
        }
        chain
    }

    // 便捷方法
    pub fn authentication(msg: &str) -> Self {
        AppError::Authentication(msg.to_string())
    }

    pub fn bad_request(msg: &str) -> Self {
        AppError::BadRequest(msg.to_string())
    }

    pub fn not_found(msg: &str) -> Self {
        AppError::NotFound(msg.to_string())
    }

    pub fn forbidden(msg: &str) -> Self {
        AppError::Forbidden(msg.to_string())
    }

    pub fn cast(path: &str, value: &str) -> Self {
        AppError::Cast {
            path: path.to_string(),
            value: value.to_string(),
        }
    }

    /// Turns a unique-constraint violation on `field` into [`AppError::Duplicate`];
    /// every other database error passes through unchanged.
    pub fn from_db_conflict(err: sqlx::Error, field: &str, value: &str) -> Self {
        let is_conflict = err
            .as_database_error()
            .and_then(|db| db.code())
            .is_some_and(|code| code == PG_UNIQUE_VIOLATION);

        if is_conflict {
            AppError::Duplicate {
                field: field.to_string(),
                value: value.to_string(),
            }
        } else {
            AppError::Database(err)
        }
    }
}

/// 错误响应 DTO
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: &'static str,
    pub message: String,
}

/// Attached to every error response so the boundary middleware can render
/// the verbose body without re-parsing the safe one.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub kind: &'static str,
    pub status_code: u16,
    pub message: String,
    pub chain: Vec<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if self.is_operational() {
            tracing::debug!(
                code = self.code(),
                kind = self.kind(),
                message = %self,
                "Request rejected"
            );
        } else {
            tracing::error!(
                code = self.code(),
                kind = self.kind(),
                error = ?self,
                "Unhandled application error"
            );
        }

        let report = ErrorReport {
            kind: self.kind(),
            status_code: self.code(),
            message: self.to_string(),
            chain: self.chain(),
        };

        let body = ErrorResponse {
            status: "error",
            message: self.user_message(),
        };

        let mut response = (status, Json(body)).into_response();
        response.extensions_mut().insert(report);
        response
    }
}

/// Body that failed to deserialize or had the wrong content type.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::RequestValidation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::RequestValidation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::RequestValidation(rejection.body_text())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => msg.to_string(),
                    None => format!("{} is invalid", field),
                })
            })
            .collect();
        messages.sort();
        AppError::Validation(messages)
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::TokenExpired,
            _ => AppError::InvalidToken,
        }
    }
}

/// 从 config::ConfigError 转换
impl From<config::ConfigError> for AppError {
    fn from(e: config::ConfigError) -> Self {
        AppError::Config(e.to_string())
    }
}
