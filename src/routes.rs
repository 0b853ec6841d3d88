//! 路由注册
//! 创建所有 API 路由并应用中间件

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
};

use crate::{auth::middleware::jwt_auth_middleware, handlers, middleware::AppState};

/// 请求体上限
const BODY_LIMIT_BYTES: usize = 10 * 1024;

/// 创建应用路由
pub fn create_router(state: Arc<AppState>) -> Router {
    // 公开端点（健康检查）
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check));

    // 认证路由（无需访问令牌）
    let auth_routes = Router::new()
        .route("/signup", post(handlers::auth::signup))
        .route("/login", post(handlers::auth::login))
        .route("/logout", post(handlers::auth::logout))
        .route("/refresh", post(handlers::auth::refresh))
        .route("/forgotPassword", post(handlers::auth::forgot_password))
        .route("/resetPassword", post(handlers::auth::reset_password))
        .route(
            "/resetPassword/{user_id}/{token}",
            post(handlers::auth::reset_password_from_link),
        );

    // 只读资源；静态段 `/users/me` 优先于 `/users/{id}` 匹配
    let read_routes = Router::new()
        .route("/users", get(handlers::user::list_users))
        .route("/users/{id}", get(handlers::user::get_user))
        .route("/exhibitions", get(handlers::exhibition::list_exhibitions))
        .route("/exhibitions/{id}", get(handlers::exhibition::get_exhibition));

    // 需要认证的路由
    let authenticated_routes = Router::new()
        .route(
            "/users/me",
            get(handlers::user::get_me)
                .patch(handlers::user::update_me)
                .delete(handlers::user::delete_me),
        )
        .route("/users/me/password", patch(handlers::user::change_password))
        .route("/exhibitions", post(handlers::exhibition::create_exhibition))
        .route(
            "/exhibitions/{id}",
            patch(handlers::exhibition::update_exhibition)
                .delete(handlers::exhibition::delete_exhibition),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_middleware,
        ));

    // 组合所有路由
    Router::new()
        .merge(public_routes)
        .merge(auth_routes)
        .merge(read_routes)
        .merge(authenticated_routes)
        .fallback(handlers::route_not_found)
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(axum::middleware::from_fn_with_state(
            state.config.server.mode,
            crate::middleware::error_boundary,
        ))
        .layer(cors_layer(&state.config.server.allowed_origins))
        .layer(CompressionLayer::new())
        .layer(axum::middleware::from_fn(crate::middleware::request_tracking_middleware))
        .with_state(state)
}

/// 跨域配置；刷新令牌走 Cookie，因此需要 allow_credentials
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}
