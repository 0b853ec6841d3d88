//! Refresh-token cookie handling

use axum::http::{header, HeaderMap, HeaderValue};
use chrono::{Duration, Utc};

use crate::error::AppError;

pub const REFRESH_COOKIE: &str = "refresh_token";

/// Value written over the refresh cookie on logout.
pub const LOGOUT_SENTINEL: &str = "logout";

/// Attributes of the refresh-token cookie
#[derive(Debug, Clone)]
pub struct RefreshCookie {
    pub secure: bool,
    pub max_age_secs: i64,
}

impl RefreshCookie {
    pub fn new(secure: bool, max_age_secs: u64) -> Self {
        Self {
            secure,
            max_age_secs: max_age_secs as i64,
        }
    }

    /// Build Set-Cookie header value
    pub fn build_set_cookie(&self, value: &str) -> String {
        let expires = Utc::now() + Duration::seconds(self.max_age_secs);
        let mut cookie = format!(
            "{}={}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}; Expires={}",
            REFRESH_COOKIE,
            value,
            self.max_age_secs,
            expires.format("%a, %d %b %Y %H:%M:%S GMT"),
        );

        if self.secure {
            cookie.push_str("; Secure");
        }

        cookie
    }

    /// Cookie that replaces the refresh token with a sentinel expiring in one second.
    pub fn build_logout_cookie(&self) -> String {
        RefreshCookie {
            secure: self.secure,
            max_age_secs: 1,
        }
        .build_set_cookie(LOGOUT_SENTINEL)
    }

    pub fn header_value(cookie: String) -> Result<HeaderValue, AppError> {
        HeaderValue::from_str(&cookie)
            .map_err(|e| AppError::Internal(format!("Invalid Set-Cookie value: {}", e)))
    }
}

/// Extract a cookie value from headers. Empty values and the logout sentinel
/// count as absent.
pub fn extract_refresh_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .find_map(|cookie| {
            let (key, value) = cookie.trim().split_once('=')?;
            (key == REFRESH_COOKIE && !value.is_empty() && value != LOGOUT_SENTINEL)
                .then(|| value.to_string())
        })
}
