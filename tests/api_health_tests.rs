//! 健康检查 API 集成测试

use axum::http::StatusCode;
use gallery_api::config::RuntimeMode;

mod common;
use common::{body_json, create_test_app, get, send};

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app(RuntimeMode::Production);

    let response = send(&app.router, get("/health")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert!(json["uptime_secs"].is_number());
}

#[tokio::test]
async fn test_readiness_endpoint() {
    let app = create_test_app(RuntimeMode::Production);

    let response = send(&app.router, get("/ready")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["ready"], true);
    assert_eq!(json["checks"][0]["name"], "database");
    assert_eq!(json["checks"][0]["status"], "healthy");
}

#[tokio::test]
async fn test_tracking_headers() {
    let app = create_test_app(RuntimeMode::Production);

    let response = send(
        &app.router,
        axum::http::Request::builder()
            .uri("/health")
            .header("x-trace-id", "trace-abc")
            .body(axum::body::Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.headers().get("x-trace-id").unwrap(), "trace-abc");
    assert!(response.headers().get("x-request-id").is_some());
}

#[tokio::test]
async fn test_cors_preflight_allows_configured_origin() {
    let app = create_test_app(RuntimeMode::Production);

    let response = send(
        &app.router,
        axum::http::Request::builder()
            .method("OPTIONS")
            .uri("/login")
            .header("origin", "http://localhost:5173")
            .header("access-control-request-method", "POST")
            .body(axum::body::Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "http://localhost:5173"
    );
    assert_eq!(
        response.headers().get("access-control-allow-credentials").unwrap(),
        "true"
    );
}
