//! Rate Limiting Middleware
//!
//! Redis-based distributed rate limiting using a sliding window. Limits are
//! tracked per member when a token was presented and per client address
//! otherwise. A Redis outage never blocks traffic: the limiter logs and lets
//! the request through.

use std::net::{IpAddr, SocketAddr};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Serialize;
use tracing::{error, warn};

use crate::config::RateLimitSettings;
use crate::infrastructure::cache::{keys, RedisHandle};
use crate::presentation::http::extractors::client_ip;
use crate::presentation::middleware::auth::AuthUser;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Limit applied to one route group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub requests_per_window: u32,
    pub window_seconds: u64,
}

/// Route groups with their own budgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointType {
    /// Sign-up, sign-in and token refresh
    Auth,
    /// Everything else under `/api`
    Api,
}

impl EndpointType {
    pub fn config(&self, settings: &RateLimitSettings) -> RateLimitConfig {
        let requests_per_window = match self {
            EndpointType::Auth => settings.auth_requests_per_window,
            EndpointType::Api => settings.api_requests_per_window,
        };
        RateLimitConfig {
            requests_per_window,
            window_seconds: settings.window_seconds.max(1),
        }
    }

    fn scope(&self) -> &'static str {
        match self {
            EndpointType::Auth => "auth",
            EndpointType::Api => "api",
        }
    }
}

/// Rate limit status reported in response headers.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RateLimitInfo {
    /// Maximum requests allowed in the current window
    pub limit: u32,
    /// Remaining requests in the current window
    pub remaining: u32,
    /// Unix timestamp when the window resets
    pub reset_at: i64,
    /// Seconds to wait before retrying, 0 when allowed
    pub retry_after: u64,
}

const SLIDING_WINDOW_SCRIPT: &str = r#"
local key = KEYS[1]
local now_ms = tonumber(ARGV[1])
local window_start = tonumber(ARGV[2])
local max_requests = tonumber(ARGV[3])
local window_seconds = tonumber(ARGV[4])

redis.call('ZREMRANGEBYSCORE', key, '-inf', window_start)
local current_count = redis.call('ZCARD', key)

if current_count < max_requests then
    local member = now_ms .. ':' .. math.random(1000000)
    redis.call('ZADD', key, now_ms, member)
    redis.call('EXPIRE', key, window_seconds + 1)
    return {1, current_count + 1, 0}
end

local oldest = redis.call('ZRANGE', key, 0, 0, 'WITHSCORES')
local retry_after = 0
if oldest and #oldest >= 2 then
    retry_after = oldest[2] + (window_seconds * 1000) - now_ms
end
return {0, current_count, retry_after}
"#;

/// Sliding-window limiter for one endpoint type.
#[derive(Clone)]
pub struct RateLimiter {
    redis: RedisHandle,
    config: RateLimitConfig,
    endpoint_type: EndpointType,
}

impl RateLimiter {
    pub fn new(redis: RedisHandle, endpoint_type: EndpointType, config: RateLimitConfig) -> Self {
        Self {
            redis,
            config,
            endpoint_type,
        }
    }

    /// Count a request against `identifier`.
    ///
    /// Returns `Ok(info)` when allowed and `Err(info)` when over the limit.
    pub async fn check(&self, identifier: &str) -> Result<RateLimitInfo, RateLimitInfo> {
        let key = keys::rate_limit(self.endpoint_type.scope(), identifier);
        let now_ms = Utc::now().timestamp_millis();
        let window_ms = (self.config.window_seconds * 1000) as i64;
        let limit = self.config.requests_per_window;
        let reset_at = now_ms / 1000 + self.config.window_seconds as i64;

        let result = match self.run_script(&key, now_ms, now_ms - window_ms).await {
            Ok(result) => result,
            Err(e) => {
                error!(error = %e, key = %key, "Rate limiter unavailable, allowing request");
                return Ok(RateLimitInfo {
                    limit,
                    remaining: limit,
                    reset_at,
                    retry_after: 0,
                });
            }
        };

        match outcome(&result, limit, reset_at) {
            (true, info) => Ok(info),
            (false, info) => Err(info),
        }
    }

    async fn run_script(&self, key: &str, now_ms: i64, window_start: i64) -> Result<Vec<i64>, AppError> {
        let mut conn = self.redis.connection().await?;
        let result = redis::Script::new(SLIDING_WINDOW_SCRIPT)
            .key(key)
            .arg(now_ms)
            .arg(window_start)
            .arg(self.config.requests_per_window as i64)
            .arg(self.config.window_seconds as i64)
            .invoke_async(&mut conn)
            .await?;
        Ok(result)
    }
}

/// Interpret the script's `{allowed, count, retry_after_ms}` reply.
fn outcome(result: &[i64], limit: u32, reset_at: i64) -> (bool, RateLimitInfo) {
    let allowed = result.first().copied() == Some(1);
    let count = result.get(1).copied().unwrap_or(0).max(0) as u32;
    let retry_ms = result.get(2).copied().unwrap_or(0).max(0);

    let info = RateLimitInfo {
        limit,
        remaining: limit.saturating_sub(count),
        reset_at,
        retry_after: if allowed { 0 } else { (retry_ms as u64).div_ceil(1000).max(1) },
    };
    (allowed, info)
}

/// Key for the caller: the member id when authenticated, else the client address.
fn extract_identifier(request: &Request, peer: Option<IpAddr>) -> String {
    if let Some(user) = request.extensions().get::<AuthUser>() {
        return format!("member:{}", user.member_id);
    }

    match client_ip(request.headers(), peer) {
        Some(ip) => format!("ip:{}", ip),
        None => "ip:unknown".to_string(),
    }
}

/// Rate limit sign-up, sign-in and refresh.
pub async fn rate_limit_auth(State(state): State<AppState>, request: Request, next: Next) -> Response {
    rate_limit_inner(state, request, next, EndpointType::Auth).await
}

/// Rate limit the general API.
pub async fn rate_limit_api(State(state): State<AppState>, request: Request, next: Next) -> Response {
    rate_limit_inner(state, request, next, EndpointType::Api).await
}

async fn rate_limit_inner(state: AppState, request: Request, next: Next, endpoint_type: EndpointType) -> Response {
    let settings = &state.settings.rate_limit;
    if !settings.enabled {
        return next.run(request).await;
    }

    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    let identifier = extract_identifier(&request, peer);
    let limiter = RateLimiter::new(state.redis.clone(), endpoint_type, endpoint_type.config(settings));

    match limiter.check(&identifier).await {
        Ok(info) => {
            let mut response = next.run(request).await;
            add_rate_limit_headers(response.headers_mut(), &info);
            response
        }
        Err(info) => {
            warn!(identifier = %identifier, endpoint_type = ?endpoint_type, "Rate limit exceeded");
            rate_limited_response(&info)
        }
    }
}

fn add_rate_limit_headers(headers: &mut HeaderMap, info: &RateLimitInfo) {
    headers.insert("x-ratelimit-limit", HeaderValue::from(info.limit));
    headers.insert("x-ratelimit-remaining", HeaderValue::from(info.remaining));
    headers.insert("x-ratelimit-reset", HeaderValue::from(info.reset_at));
}

fn rate_limited_response(info: &RateLimitInfo) -> Response {
    let mut response = AppError::RateLimited.into_response();
    let headers = response.headers_mut();
    headers.insert(header::RETRY_AFTER, HeaderValue::from(info.retry_after));
    add_rate_limit_headers(headers, info);
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::StatusCode;
    use pretty_assertions::assert_eq;

    fn settings() -> RateLimitSettings {
        RateLimitSettings {
            enabled: true,
            api_requests_per_window: 120,
            auth_requests_per_window: 10,
            window_seconds: 60,
        }
    }

    #[test]
    fn test_endpoint_type_config() {
        assert_eq!(
            EndpointType::Auth.config(&settings()),
            RateLimitConfig {
                requests_per_window: 10,
                window_seconds: 60
            }
        );
        assert_eq!(EndpointType::Api.config(&settings()).requests_per_window, 120);
    }

    #[test]
    fn test_zero_window_is_clamped() {
        let mut settings = settings();
        settings.window_seconds = 0;
        assert_eq!(EndpointType::Api.config(&settings).window_seconds, 1);
    }

    #[test]
    fn test_outcome_allowed() {
        let (allowed, info) = outcome(&[1, 3, 0], 10, 1_000);
        assert!(allowed);
        assert_eq!(info.remaining, 7);
        assert_eq!(info.retry_after, 0);
    }

    #[test]
    fn test_outcome_rejected_rounds_retry_up() {
        let (allowed, info) = outcome(&[0, 10, 1_500], 10, 1_000);
        assert!(!allowed);
        assert_eq!(info.remaining, 0);
        assert_eq!(info.retry_after, 2);
    }

    #[test]
    fn test_identifier_prefers_member() {
        let mut request = Request::builder()
            .header("x-forwarded-for", "203.0.113.9")
            .body(Body::empty())
            .unwrap();
        assert_eq!(extract_identifier(&request, None), "ip:203.0.113.9");

        request.extensions_mut().insert(AuthUser {
            member_id: 42,
            roles: vec![],
            session_id: None,
        });
        assert_eq!(extract_identifier(&request, None), "member:42");
    }

    #[test]
    fn test_rate_limited_response_headers() {
        let info = RateLimitInfo {
            limit: 10,
            remaining: 0,
            reset_at: 1_700_000_000,
            retry_after: 12,
        };
        let response = rate_limited_response(&info);
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "12");
        assert_eq!(response.headers()["x-ratelimit-remaining"], "0");
    }
}
