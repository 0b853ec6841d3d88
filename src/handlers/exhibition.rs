//! 展览 CRUD 处理器

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;

use super::{requested_at, AppJson, AppPath, AppQuery};
use crate::{
    auth::middleware::AuthContext, error::AppError, middleware::AppState, models::exhibition::*,
};

/// 列出展览，可用 `?user=<id>` 过滤
pub async fn list_exhibitions(
    State(state): State<Arc<AppState>>,
    AppQuery(query): AppQuery<ExhibitionQuery>,
) -> Result<impl IntoResponse, AppError> {
    let exhibitions = state
        .exhibition_service
        .list(query.user.as_deref())
        .await?;

    Ok(Json(json!({
        "status": "success",
        "requested_at": requested_at(),
        "results": exhibitions.len(),
        "data": { "exhibitions": exhibitions }
    })))
}

pub async fn get_exhibition(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<String>,
) -> Result<impl IntoResponse, AppError> {
    let exhibition = state.exhibition_service.get(&id).await?;

    Ok(Json(json!({
        "status": "success",
        "data": { "exhibition": exhibition }
    })))
}

pub async fn create_exhibition(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    AppJson(req): AppJson<CreateExhibitionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let exhibition = state
        .exhibition_service
        .create(auth_context.user_id, req)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "data": { "exhibition": exhibition }
        })),
    ))
}

pub async fn update_exhibition(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    AppPath(id): AppPath<String>,
    AppJson(req): AppJson<UpdateExhibitionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let exhibition = state
        .exhibition_service
        .update(auth_context.user_id, &id, req)
        .await?;

    Ok(Json(json!({
        "status": "success",
        "data": { "exhibition": exhibition }
    })))
}

pub async fn delete_exhibition(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    AppPath(id): AppPath<String>,
) -> Result<impl IntoResponse, AppError> {
    state
        .exhibition_service
        .delete(auth_context.user_id, &id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
