//! Cross-cutting router behavior: locale, ids, headers

use axum::{
    body::Body,
    http::{header, HeaderValue, Request, StatusCode},
};
use axum_test::TestServer;
use pretty_assertions::assert_eq;
use serde_json::Value;
use test_case::test_case;

use crate::common::{body_json, test_router, TestApp};

#[test_case("fr", "Une authentification est requise" ; "french")]
#[test_case("fr-CA,fr;q=0.9", "Une authentification est requise" ; "french region")]
#[test_case("de", "Authentication is required" ; "unsupported falls back to english")]
#[tokio::test]
async fn test_error_message_follows_accept_language(accept_language: &str, expected: &str) {
    let app = TestApp::new();

    let response = app
        .send(
            Request::get("/api/member/me")
                .header(header::ACCEPT_LANGUAGE, accept_language)
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["message"], expected);
}

#[tokio::test]
async fn test_non_numeric_id_is_rejected_before_lookup() {
    let server = TestServer::new(test_router()).unwrap();

    let response = server
        .get("/api/soft-ask/not-a-number")
        .add_header(header::ACCEPT_LANGUAGE, HeaderValue::from_static("fr"))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["message_key"], "invalid.id");
    assert_eq!(body["message"], "Identifiant invalide");
}

#[tokio::test]
async fn test_security_headers_are_set() {
    let app = TestApp::new();

    let response = app.get("/health").await;

    let headers = response.headers();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert!(headers.get("strict-transport-security").is_none());
}

#[tokio::test]
async fn test_allowed_origin_is_echoed() {
    let app = TestApp::new();

    let response = app
        .send(
            Request::get("/health")
                .header(header::ORIGIN, "http://localhost:4200")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:4200"
    );
}
