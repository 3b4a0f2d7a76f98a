//! Request Logging and Metrics
//!
//! `TraceLayer` spans for every request plus Prometheus request counters.

use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::infrastructure::metrics::record_http_request;

/// Label used for requests that matched no route, keeping path cardinality bounded.
const UNMATCHED_PATH: &str = "unmatched";

pub fn create_trace_layer(
) -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse> {
    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
        .on_response(DefaultOnResponse::new().level(Level::INFO))
}

/// Record `http_requests_total` and `http_request_duration_seconds` under
/// the route template (`/api/chat-space/{id}`), never the raw path.
pub async fn track_metrics(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| UNMATCHED_PATH.to_string(), |p| p.as_str().to_string());

    let response = next.run(request).await;

    record_http_request(&method, &path, response.status().as_u16(), start.elapsed().as_secs_f64());
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::metrics::gather_metrics;
    use axum::{body::Body, middleware, routing::get, Router};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_metrics_use_route_template() {
        let app = Router::new()
            .route("/items/{id}", get(|| async { "OK" }))
            .route_layer(middleware::from_fn(track_metrics));

        app.oneshot(Request::builder().uri("/items/77").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let output = gather_metrics();
        assert!(output.contains("path=\"/items/{id}\""));
        assert!(!output.contains("/items/77"));
    }
}
