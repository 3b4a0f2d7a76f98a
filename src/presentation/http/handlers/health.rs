//! Health Check Handlers
//!
//! Liveness and readiness probes plus the Prometheus scrape endpoint.
//!
//! # Endpoints
//! - `GET /health` - Basic health check
//! - `GET /health/live` - Liveness probe (is the server running?)
//! - `GET /health/ready` - Readiness probe (are PostgreSQL and Redis reachable?)
//! - `GET /metrics` - Prometheus text exposition

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::time::Instant;

use crate::infrastructure::metrics;
use crate::startup::AppState;

static SERVER_START: Lazy<Instant> = Lazy::new(Instant::now);
static SERVER_START_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

/// Initialize the server start time (call during startup)
pub fn init_server_start() {
    Lazy::force(&SERVER_START);
    Lazy::force(&SERVER_START_TIME);
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct DetailedHealthResponse {
    pub status: HealthStatus,
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub started_at: String,
    pub checks: HealthChecks,
}

#[derive(Debug, Serialize)]
pub struct HealthChecks {
    pub database: ServiceHealth,
    pub redis: ServiceHealth,
}

#[derive(Debug, Serialize)]
pub struct ServiceHealth {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ServiceHealth {
    fn from_probe<E: std::fmt::Display>(result: Result<(), E>, started: Instant, degraded_after_ms: u64) -> Self {
        match result {
            Ok(()) => {
                let latency = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
                Self {
                    status: if latency < degraded_after_ms {
                        HealthStatus::Healthy
                    } else {
                        HealthStatus::Degraded
                    },
                    latency_ms: Some(latency),
                    message: None,
                }
            }
            Err(e) => Self {
                status: HealthStatus::Unhealthy,
                latency_ms: None,
                message: Some(e.to_string()),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Serialize)]
pub struct LivenessResponse {
    pub status: &'static str,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn liveness() -> Json<LivenessResponse> {
    Json(LivenessResponse { status: "alive" })
}

/// Readiness probe. 503 when PostgreSQL is down; Redis trouble only degrades.
pub async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    let (database, redis) = futures::join!(check_database(&state), check_redis(&state));
    let status = determine_overall_status(&database, &redis);

    let response = DetailedHealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: SERVER_START.elapsed().as_secs(),
        started_at: SERVER_START_TIME.to_rfc3339(),
        checks: HealthChecks { database, redis },
    };

    let status_code = match status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(response))
}

/// Prometheus scrape endpoint; refreshes pool gauges before gathering.
pub async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    metrics::update_db_pool_stats(u32::try_from(state.db.num_idle()).unwrap_or(u32::MAX), state.db.size());
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        metrics::gather_metrics(),
    )
}

async fn check_database(state: &AppState) -> ServiceHealth {
    let started = Instant::now();
    let result = sqlx::query("SELECT 1").execute(&state.db).await.map(|_| ());
    ServiceHealth::from_probe(result, started, 100)
}

async fn check_redis(state: &AppState) -> ServiceHealth {
    let started = Instant::now();
    ServiceHealth::from_probe(state.redis.ping().await, started, 50)
}

fn determine_overall_status(db: &ServiceHealth, redis: &ServiceHealth) -> HealthStatus {
    if db.status == HealthStatus::Unhealthy {
        return HealthStatus::Unhealthy;
    }

    if db.status == HealthStatus::Degraded || redis.status != HealthStatus::Healthy {
        return HealthStatus::Degraded;
    }

    HealthStatus::Healthy
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn health(status: HealthStatus) -> ServiceHealth {
        ServiceHealth {
            status,
            latency_ms: None,
            message: None,
        }
    }

    #[test]
    fn test_health_status_serialization() {
        let json = serde_json::to_string(&HealthStatus::Degraded).unwrap();
        assert_eq!(json, "\"degraded\"");
    }

    #[test]
    fn test_determine_overall_status() {
        use HealthStatus::*;

        assert_eq!(determine_overall_status(&health(Healthy), &health(Healthy)), Healthy);
        assert_eq!(determine_overall_status(&health(Degraded), &health(Healthy)), Degraded);
        assert_eq!(determine_overall_status(&health(Healthy), &health(Unhealthy)), Degraded);
        assert_eq!(determine_overall_status(&health(Unhealthy), &health(Healthy)), Unhealthy);
    }

    #[test]
    fn test_failed_check_carries_message() {
        let check = ServiceHealth::from_probe(Err("connection refused"), Instant::now(), 100);
        assert_eq!(check.status, HealthStatus::Unhealthy);
        assert_eq!(check.message.as_deref(), Some("connection refused"));
    }
}
