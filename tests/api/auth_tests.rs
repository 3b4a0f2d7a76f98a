//! Authentication and authorization API tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::{access_token, body_json, TestApp};

#[tokio::test]
async fn test_protected_route_without_token_is_unauthorized() {
    let app = TestApp::new();

    let response = app.get("/api/member/me").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["message_key"], "authentication.required");
    assert_eq!(body["message"], "Authentication is required");
}

#[tokio::test]
async fn test_protected_route_with_garbage_token_is_unauthorized() {
    let app = TestApp::new();

    let response = app.get_auth("/api/notification/count-unread", "not.a.jwt").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["message_key"], "invalid.token");
}

#[tokio::test]
async fn test_token_signed_with_another_secret_is_rejected() {
    let app = TestApp::new();
    let forged = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &json!({ "sub": "1", "roles": ["USER"], "iat": 0, "exp": 4_102_444_800i64 }),
        &jsonwebtoken::EncodingKey::from_secret(b"some-other-secret-that-is-long-enough"),
    )
    .unwrap();

    let response = app.get_auth("/api/member/me", &forged).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_sign_up_validation_reports_fields() {
    let app = TestApp::new();
    let body = json!({
        "email_address": "not-an-email",
        "username": "ab",
        "first_name": "Ada",
        "last_name": "Lovelace",
        "password": "short"
    });

    let response = app.post_json("/api/auth/sign-up", &body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message_key"], "validation.failed");

    let mut fields: Vec<String> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap().to_string())
        .collect();
    fields.sort();
    assert_eq!(fields, vec!["email_address", "password", "username"]);
}

#[tokio::test]
async fn test_sign_in_with_malformed_json_is_bad_request() {
    let app = TestApp::new();

    let response = app.post_json("/api/auth/sign-in", &json!({ "email_address": 42 })).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message_key"], "payload.invalid");
}

#[tokio::test]
async fn test_calendar_management_requires_administrator() {
    let app = TestApp::new();
    let token = access_token(7, &["USER"]);

    let response = app.get_auth("/api/calendar/entries", &token).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["message_key"], "not.allowed");
}

#[tokio::test]
async fn test_unknown_oauth2_service_is_bad_request() {
    let app = TestApp::new();
    let token = access_token(7, &["ADMINISTRATOR"]);

    let response = app
        .get_auth("/api/oauth2/dropbox/get-authorization-uri", &token)
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message_key"], "oauth2.service.invalid");
}
