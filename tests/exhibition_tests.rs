//! 展览与用户资源 API 集成测试

use axum::http::StatusCode;
use gallery_api::config::RuntimeMode;
use serde_json::json;

mod common;
use common::{
    authed_json_request, authed_request, body_json, create_test_app, get, json_request, send,
    signup, PASSWORD,
};

async fn create_exhibition(router: &axum::Router, token: &str, title: &str) -> String {
    let response = send(
        router,
        authed_json_request(
            "POST",
            "/exhibitions",
            token,
            json!({ "title": title, "images": ["one.jpg", "two.jpg"] }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    json["data"]["exhibition"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_exhibition_crud() {
    let app = create_test_app(RuntimeMode::Production);
    let (user_id, token, _) = signup(&app.router, "alice").await;

    let id = create_exhibition(&app.router, &token, "Spring").await;

    let response = send(&app.router, get(&format!("/exhibitions/{}", id))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["exhibition"]["title"], "Spring");
    assert_eq!(json["data"]["exhibition"]["user_id"], user_id.as_str());
    assert_eq!(json["data"]["exhibition"]["user"]["username"], "alice");

    let response = send(
        &app.router,
        authed_json_request(
            "PATCH",
            &format!("/exhibitions/{}", id),
            &token,
            json!({ "title": "Summer" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["exhibition"]["title"], "Summer");
    assert_eq!(json["data"]["exhibition"]["images"].as_array().unwrap().len(), 2);

    let response = send(
        &app.router,
        authed_request("DELETE", &format!("/exhibitions/{}", id), &token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(&app.router, get(&format!("/exhibitions/{}", id))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "No exhibition of this ID found");
}

#[tokio::test]
async fn test_list_exhibitions_filtered_by_user() {
    let app = create_test_app(RuntimeMode::Production);
    let (alice_id, alice_token, _) = signup(&app.router, "alice").await;
    let (_, bob_token, _) = signup(&app.router, "bob").await;

    create_exhibition(&app.router, &alice_token, "A1").await;
    create_exhibition(&app.router, &alice_token, "A2").await;
    create_exhibition(&app.router, &bob_token, "B1").await;

    let response = send(&app.router, get("/exhibitions")).await;
    let json = body_json(response).await;
    assert_eq!(json["results"], 3);
    assert!(json["requested_at"].is_string());

    let response = send(&app.router, get(&format!("/exhibitions?user={}", alice_id))).await;
    let json = body_json(response).await;
    assert_eq!(json["results"], 2);
}

#[tokio::test]
async fn test_non_owner_cannot_modify_exhibition() {
    let app = create_test_app(RuntimeMode::Production);
    let (_, alice_token, _) = signup(&app.router, "alice").await;
    let (_, bob_token, _) = signup(&app.router, "bob").await;

    let id = create_exhibition(&app.router, &alice_token, "Mine").await;

    let response = send(
        &app.router,
        authed_json_request(
            "PATCH",
            &format!("/exhibitions/{}", id),
            &bob_token,
            json!({ "title": "Stolen" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["message"], "You do not own this exhibition");

    let response = send(
        &app.router,
        authed_request("DELETE", &format!("/exhibitions/{}", id), &bob_token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_malformed_exhibition_id() {
    let app = create_test_app(RuntimeMode::Production);

    let response = send(&app.router, get("/exhibitions/abc")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "Invalid exhibitionID: abc.");
}

#[tokio::test]
async fn test_create_exhibition_requires_login() {
    let app = create_test_app(RuntimeMode::Production);

    let response = send(
        &app.router,
        json_request("POST", "/exhibitions", json!({ "title": "Anon" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["message"], "You are not logged in");

    let response = send(
        &app.router,
        authed_json_request("POST", "/exhibitions", "not.a.jwt", json!({ "title": "Anon" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(response).await["message"],
        "Invalid Token. Please Login Again"
    );
}

#[tokio::test]
async fn test_create_exhibition_validation() {
    let app = create_test_app(RuntimeMode::Production);
    let (_, token, _) = signup(&app.router, "alice").await;

    let response = send(
        &app.router,
        authed_json_request("POST", "/exhibitions", &token, json!({ "title": "" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["message"],
        "Invalid input: Title must be 1 to 100 characters"
    );
}

#[tokio::test]
async fn test_profile_and_account_lifecycle() {
    let app = create_test_app(RuntimeMode::Production);
    let (user_id, token, _) = signup(&app.router, "alice").await;

    let response = send(&app.router, authed_request("GET", "/users/me", &token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["user"]["profile_pic"], "default.jpg");

    let response = send(
        &app.router,
        authed_json_request("PATCH", "/users/me", &token, json!({ "tagline": "Painter" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["user"]["tagline"], "Painter");

    let response = send(&app.router, get(&format!("/users/{}", user_id))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app.router, get("/users/xyz")).await;
    assert_eq!(body_json(response).await["message"], "Invalid userID: xyz.");

    create_exhibition(&app.router, &token, "Doomed").await;

    let response = send(&app.router, authed_request("DELETE", "/users/me", &token)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // 删除用户同时删除其展览
    let response = send(&app.router, get(&format!("/exhibitions?user={}", user_id))).await;
    assert_eq!(body_json(response).await["results"], 0);

    let response = send(&app.router, authed_request("GET", "/users/me", &token)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_deleted_account_token_cannot_create_exhibition() {
    let app = create_test_app(RuntimeMode::Production);
    let (user_id, token, _) = signup(&app.router, "alice").await;

    let response = send(&app.router, authed_request("DELETE", "/users/me", &token)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(
        &app.router,
        authed_json_request("POST", "/exhibitions", &token, json!({ "title": "Orphan" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(response).await["message"],
        "User of this token no longer exists"
    );

    let response = send(&app.router, get(&format!("/exhibitions?user={}", user_id))).await;
    assert_eq!(body_json(response).await["results"], 0);
}

#[tokio::test]
async fn test_change_password() {
    let app = create_test_app(RuntimeMode::Production);
    let (_, token, _) = signup(&app.router, "alice").await;

    let response = send(
        &app.router,
        authed_json_request(
            "PATCH",
            "/users/me/password",
            &token,
            json!({
                "current_password": "WrongPass1",
                "password": "BrandNew456",
                "confirm_password": "BrandNew456",
            }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(
        &app.router,
        authed_json_request(
            "PATCH",
            "/users/me/password",
            &token,
            json!({
                "current_password": PASSWORD,
                "password": "BrandNew456",
                "confirm_password": "BrandNew456",
            }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await["token"].is_string());

    let response = send(
        &app.router,
        json_request("POST", "/login", json!({ "username": "alice", "password": "BrandNew456" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}
