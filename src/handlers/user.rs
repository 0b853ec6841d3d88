//! 用户管理的 HTTP 处理器

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use super::{auth::send_tokens, requested_at, AppJson, AppPath, AppQuery};
use crate::{
    auth::{middleware::AuthContext, RefreshCookie},
    error::AppError,
    middleware::AppState,
    models::user::*,
    services::exhibition_service::parse_id,
};

fn token_owner_gone() -> AppError {
    AppError::authentication("User of this token no longer exists")
}

/// 列出用户
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    AppQuery(page): AppQuery<Pagination>,
) -> Result<impl IntoResponse, AppError> {
    let users = state
        .users
        .list(page.limit.clamp(1, 100), page.offset.max(0))
        .await?;
    let users: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();

    Ok(Json(json!({
        "status": "success",
        "requested_at": requested_at(),
        "results": users.len(),
        "data": { "users": users }
    })))
}

/// 获取用户详情
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id("userID", &id)?;
    let user = state
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("No user of this ID found"))?;

    Ok(Json(json!({
        "status": "success",
        "data": { "user": UserResponse::from(user) }
    })))
}

/// 当前登录用户
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .users
        .find_by_id(auth_context.user_id)
        .await?
        .ok_or_else(token_owner_gone)?;

    Ok(Json(json!({
        "status": "success",
        "data": { "user": UserResponse::from(user) }
    })))
}

/// 更新个人资料（不含密码）
pub async fn update_me(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    AppJson(req): AppJson<UpdateProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let user = state
        .users
        .update_profile(auth_context.user_id, &req)
        .await?
        .ok_or_else(token_owner_gone)?;

    tracing::info!(user_id = %user.id, "Profile updated");

    Ok(Json(json!({
        "status": "success",
        "data": { "user": UserResponse::from(user) }
    })))
}

/// 删除当前账户，同时清除刷新 Cookie
pub async fn delete_me(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
) -> Result<Response, AppError> {
    if !state.users.delete(auth_context.user_id).await? {
        return Err(token_owner_gone());
    }

    tracing::info!(user_id = %auth_context.user_id, "Account deleted");

    let cookie = state.refresh_cookie.build_logout_cookie();
    Ok((
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, RefreshCookie::header_value(cookie)?)],
    )
        .into_response())
}

/// 修改密码，成功后重新签发令牌
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    AppJson(req): AppJson<ChangePasswordRequest>,
) -> Result<Response, AppError> {
    let outcome = state
        .auth_service
        .change_password(auth_context.user_id, req)
        .await?;
    send_tokens(&state, outcome, StatusCode::OK)
}
