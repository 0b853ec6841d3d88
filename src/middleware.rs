//! HTTP 中间件
//! 应用状态、请求追踪、错误边界

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use crate::{
    auth::{JwtService, RefreshCookie},
    config::{AppConfig, RuntimeMode},
    error::{AppError, ErrorReport},
    mailer::Mailer,
    repository::{ExhibitionRepository, UserRepository},
    services::{AuthService, ExhibitionService},
};

/// 应用状态
///
/// 配置在启动时构建一次，之后只读；仓储与服务通过 Arc 共享。
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub users: Arc<dyn UserRepository>,
    pub jwt_service: Arc<JwtService>,
    pub auth_service: Arc<AuthService>,
    pub exhibition_service: Arc<ExhibitionService>,
    pub refresh_cookie: RefreshCookie,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        users: Arc<dyn UserRepository>,
        exhibitions: Arc<dyn ExhibitionRepository>,
        mailer: Arc<dyn Mailer>,
    ) -> Result<Self, AppError> {
        let jwt_service = Arc::new(JwtService::from_config(&config)?);
        let auth_service = Arc::new(AuthService::new(
            users.clone(),
            jwt_service.clone(),
            mailer,
            &config.security,
        )?);
        let exhibition_service = Arc::new(ExhibitionService::new(exhibitions, users.clone()));
        let refresh_cookie = RefreshCookie::new(
            config.server.mode.secure_cookies(),
            config.security.refresh_token_ttl_secs(),
        );

        Ok(Self {
            config,
            users,
            jwt_service,
            auth_service,
            exhibition_service,
            refresh_cookie,
        })
    }
}

/// 请求追踪中间件
/// 为每个请求生成 trace_id 和 request_id，并记录完成日志
pub async fn request_tracking_middleware(req: Request, next: Next) -> Response {
    let trace_id = extract_or_generate_trace_id(req.headers());
    let request_id = Uuid::new_v4().to_string();

    let method = req.method().to_string();
    let uri = req.uri().to_string();

    let span = tracing::info_span!(
        "http_request",
        trace_id = %trace_id,
        request_id = %request_id,
        method = %method,
        uri = %uri,
    );

    async move {
        let start = Instant::now();

        let mut response = next.run(req).await;

        let elapsed = start.elapsed();
        let status = response.status().as_u16();

        tracing::info!(
            method = %method,
            uri = %uri,
            status = status,
            elapsed_ms = elapsed.as_millis(),
            "Request completed"
        );

        // 非法的外部 trace_id 不回写
        if let Ok(value) = HeaderValue::from_str(&trace_id) {
            response.headers_mut().insert("x-trace-id", value);
        }
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response.headers_mut().insert("x-request-id", value);
        }

        response
    }
    .instrument(span)
    .await
}

/// 从请求头中提取或生成 trace_id
fn extract_or_generate_trace_id(headers: &HeaderMap) -> String {
    headers
        .get("x-trace-id")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

#[derive(Serialize)]
struct ErrorDetail {
    kind: &'static str,
    status_code: u16,
}

/// Error body in development mode
#[derive(Serialize)]
struct VerboseErrorResponse {
    status: &'static str,
    message: String,
    error: ErrorDetail,
    stack: Vec<String>,
}

/// 错误边界
///
/// Production responses pass through untouched. In development mode any
/// response carrying an [`ErrorReport`] gets its body replaced with the
/// full error detail.
pub async fn error_boundary(State(mode): State<RuntimeMode>, req: Request, next: Next) -> Response {
    let response = next.run(req).await;

    if !mode.is_development() {
        return response;
    }

    let Some(report) = response.extensions().get::<ErrorReport>().cloned() else {
        return response;
    };

    let (mut parts, _) = response.into_parts();
    parts.headers.remove(header::CONTENT_LENGTH);

    let body = VerboseErrorResponse {
        status: "error",
        message: report.message,
        error: ErrorDetail {
            kind: report.kind,
            status_code: report.status_code,
        },
        stack: report.chain,
    };

    (parts, Json(body)).into_response()
}
