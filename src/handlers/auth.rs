//! 认证相关的 HTTP 处理器

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;

use super::{AppJson, AppPath};
use crate::{
    auth::{extract_refresh_token, RefreshCookie},
    error::AppError,
    middleware::AppState,
    models::{auth::*, user::SignupRequest},
    services::AuthOutcome,
};

/// 写入刷新令牌 Cookie 并返回访问令牌与用户
pub(crate) fn send_tokens(
    state: &AppState,
    outcome: AuthOutcome,
    status: StatusCode,
) -> Result<Response, AppError> {
    let cookie = state
        .refresh_cookie
        .build_set_cookie(&outcome.tokens.refresh_token);

    let body = AuthResponse {
        status: "success",
        token: outcome.tokens.access_token,
        user: outcome.user,
    };

    Ok((
        status,
        [(header::SET_COOKIE, RefreshCookie::header_value(cookie)?)],
        Json(body),
    )
        .into_response())
}

/// 注册
pub async fn signup(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<SignupRequest>,
) -> Result<Response, AppError> {
    let outcome = state.auth_service.signup(req).await?;
    send_tokens(&state, outcome, StatusCode::CREATED)
}

/// 登录
///
/// A missing or unparsable body is treated as missing credentials.
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let req = payload.map(|Json(req)| req).unwrap_or_default();
    let outcome = state.auth_service.login(req).await?;
    send_tokens(&state, outcome, StatusCode::OK)
}

/// 登出：用一秒后过期的哨兵值覆盖刷新 Cookie
pub async fn logout(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    let cookie = state.refresh_cookie.build_logout_cookie();

    Ok((
        [(header::SET_COOKIE, RefreshCookie::header_value(cookie)?)],
        Json(json!({ "status": "success" })),
    )
        .into_response())
}

/// 刷新访问令牌
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<RefreshTokenRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let req = payload.map(|Json(req)| req).unwrap_or_default();
    let token = state
        .auth_service
        .refresh(req, extract_refresh_token(&headers))
        .await?;

    Ok(Json(RefreshResponse {
        status: "success",
        token,
    }))
}

/// 忘记密码
pub async fn forgot_password(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    AppJson(req): AppJson<ForgotPasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    let base = reset_url_base(state.config.mail.reset_url_base.as_deref(), &headers);
    state.auth_service.forgot_password(req, &base).await?;

    Ok(Json(json!({
        "status": "success",
        "message": "Reset URL send to registered email."
    })))
}

/// 重置密码（请求体携带 user_id 与 token）
pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<ResetPasswordRequest>,
) -> Result<Response, AppError> {
    let outcome = state.auth_service.reset_password(req).await?;
    send_tokens(&state, outcome, StatusCode::OK)
}

/// 重置密码（邮件链接形式）
pub async fn reset_password_from_link(
    State(state): State<Arc<AppState>>,
    AppPath((user_id, token)): AppPath<(String, String)>,
    AppJson(body): AppJson<NewPasswordRequest>,
) -> Result<Response, AppError> {
    let req = ResetPasswordRequest {
        user_id,
        token,
        password: body.password,
        confirm_password: body.confirm_password,
    };
    let outcome = state.auth_service.reset_password(req).await?;
    send_tokens(&state, outcome, StatusCode::OK)
}

/// 重置链接的前缀：优先使用配置，否则按请求的 Host 推导
fn reset_url_base(configured: Option<&str>, headers: &HeaderMap) -> String {
    if let Some(base) = configured {
        return base.trim_end_matches('/').to_string();
    }

    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    let proto = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");

    format!("{}://{}", proto, host)
}
