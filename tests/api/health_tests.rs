//! Health and metrics endpoint tests

use axum::http::{header, StatusCode};
use axum_test::TestServer;
use pretty_assertions::assert_eq;
use serde_json::Value;

use crate::common::{body_json, test_router, TestApp};

#[tokio::test]
async fn test_health_check_returns_healthy() {
    let server = TestServer::new(test_router()).unwrap();

    let response = server.get("/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_liveness_probe() {
    let server = TestServer::new(test_router()).unwrap();

    let response = server.get("/health/live").await;

    response.assert_status_ok();
    response.assert_json(&serde_json::json!({ "status": "alive" }));
}

#[tokio::test]
async fn test_readiness_reports_unreachable_database() {
    let app = TestApp::new();

    let response = app.get("/health/ready").await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(response).await;
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["checks"]["database"]["status"], "unhealthy");
    assert_eq!(body["checks"]["redis"]["status"], "unhealthy");
}

#[tokio::test]
async fn test_metrics_exposition() {
    let app = TestApp::new();
    app.get("/health").await;

    let response = app.get("/metrics").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));
}
