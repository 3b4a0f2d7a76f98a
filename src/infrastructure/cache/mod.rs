//! Cache Module
//!
//! Redis connection management and the small set of Redis-backed stores the
//! platform needs.
//!
//! This module provides:
//! - [`RedisHandle`]: a cheaply clonable handle that opens its
//!   `ConnectionManager` on first use, so the server (and tests) can start
//!   while Redis is still unreachable
//! - A `Cache` trait with a JSON-over-Redis implementation
//! - The OAuth2 `state` store
//! - Predefined key prefixes and channel names
//!
//! # Example
//!
//! ```rust,ignore
//! use fleenfeen::infrastructure::cache::{Cache, RedisCache, RedisHandle};
//!
//! let handle = RedisHandle::open(&settings.redis)?;
//! let cache = RedisCache::new(handle);
//! cache.set_ex("oauth2:state:abc", &pending, 600).await?;
//! ```

mod cache_service;
mod oauth_state;

pub use cache_service::{Cache, RedisCache};
pub use oauth_state::RedisOAuthStateStore;

use std::sync::Arc;

use redis::aio::ConnectionManager;
use redis::Client;
use tokio::sync::OnceCell;
use tracing::{info, instrument};

use crate::config::RedisSettings;
use crate::shared::error::AppError;

/// Lazily connected Redis handle.
///
/// `Client::open` only parses the URL; the connection manager is created on
/// the first command and then shared by every clone.
#[derive(Clone)]
pub struct RedisHandle {
    client: Client,
    manager: Arc<OnceCell<ConnectionManager>>,
}

impl RedisHandle {
    /// Parse the Redis URL without connecting.
    pub fn open(settings: &RedisSettings) -> Result<Self, redis::RedisError> {
        Ok(Self {
            client: Client::open(settings.url.as_str())?,
            manager: Arc::new(OnceCell::new()),
        })
    }

    /// Connection manager, connecting on first use.
    pub async fn connection(&self) -> Result<ConnectionManager, AppError> {
        let manager = self
            .manager
            .get_or_try_init(|| create_redis_client(&self.client))
            .await?;
        Ok(manager.clone())
    }

    /// Round-trip a PING, used by readiness checks.
    pub async fn ping(&self) -> Result<(), AppError> {
        let mut conn = self.connection().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

/// Creates a Redis connection manager with automatic reconnection.
#[instrument(skip(client))]
async fn create_redis_client(client: &Client) -> Result<ConnectionManager, redis::RedisError> {
    info!("Connecting to Redis...");
    let manager = ConnectionManager::new(client.clone()).await?;
    info!("Redis connection established");
    Ok(manager)
}

/// Cache key prefixes and pub/sub channel names.
pub mod keys {
    /// Prefix for pending OAuth2 authorizations (e.g., "oauth2:state:<state>")
    pub const OAUTH2_STATE: &str = "oauth2:state:";

    /// Prefix for rate limiting windows (e.g., "ratelimit:api:user:123")
    pub const RATE_LIMIT: &str = "ratelimit:";

    /// Channel receiving `stream.created` events
    pub const STREAM_CREATED_CHANNEL: &str = "stream.created";

    #[inline]
    pub fn oauth2_state(state: &str) -> String {
        format!("{}{}", OAUTH2_STATE, state)
    }

    #[inline]
    pub fn rate_limit(scope: &str, identifier: &str) -> String {
        format!("{}{}:{}", RATE_LIMIT, scope, identifier)
    }

    /// Channel carrying vote counters for one soft ask.
    #[inline]
    pub fn soft_ask_counters(soft_ask_id: impl std::fmt::Display) -> String {
        format!("soft-ask:{}:counters", soft_ask_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys() {
        assert_eq!(keys::oauth2_state("abc"), "oauth2:state:abc");
        assert_eq!(keys::rate_limit("api", "user:1"), "ratelimit:api:user:1");
        assert_eq!(keys::soft_ask_counters(42), "soft-ask:42:counters");
    }

    #[test]
    fn test_open_rejects_invalid_url() {
        let settings = RedisSettings { url: "not a url".into() };
        assert!(RedisHandle::open(&settings).is_err());
    }

    #[test]
    fn test_open_does_not_connect() {
        let settings = RedisSettings { url: "redis://127.0.0.1:1".into() };
        assert!(RedisHandle::open(&settings).is_ok());
    }
}
