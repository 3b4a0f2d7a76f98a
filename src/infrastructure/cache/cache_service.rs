//! Cache Service
//!
//! Generic cache trait and Redis implementation storing values as JSON.

use async_trait::async_trait;
use redis::AsyncCommands;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, instrument, warn};

use super::RedisHandle;
use crate::shared::error::AppError;

/// Generic cache trait for abstracting cache operations.
///
/// All operations are async and return `Result<T, AppError>`.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Retrieves a value from the cache by key.
    async fn get<T: DeserializeOwned + Send>(&self, key: &str) -> Result<Option<T>, AppError>;

    /// Stores a value with an expiration time in seconds.
    async fn set_ex<T: Serialize + Sync + Send>(&self, key: &str, value: &T, seconds: u64) -> Result<(), AppError>;

    /// Retrieves and deletes a value in one step.
    ///
    /// Concurrent callers never both observe the value.
    async fn take<T: DeserializeOwned + Send>(&self, key: &str) -> Result<Option<T>, AppError>;

    /// Deletes a key. Returns whether it existed.
    async fn delete(&self, key: &str) -> Result<bool, AppError>;
}

/// Redis-backed cache implementation.
#[derive(Clone)]
pub struct RedisCache {
    redis: RedisHandle,
}

impl RedisCache {
    pub fn new(redis: RedisHandle) -> Self {
        Self { redis }
    }

    fn serialize<T: Serialize>(value: &T) -> Result<String, AppError> {
        serde_json::to_string(value).map_err(|e| {
            warn!("Cache serialization error: {}", e);
            AppError::Internal(format!("Cache serialization failed: {}", e))
        })
    }

    fn deserialize<T: DeserializeOwned>(data: &str) -> Result<T, AppError> {
        serde_json::from_str(data).map_err(|e| {
            warn!("Cache deserialization error: {}", e);
            AppError::Internal(format!("Cache deserialization failed: {}", e))
        })
    }
}

#[async_trait]
impl Cache for RedisCache {
    #[instrument(skip(self), level = "debug")]
    async fn get<T: DeserializeOwned + Send>(&self, key: &str) -> Result<Option<T>, AppError> {
        let mut conn = self.redis.connection().await?;
        let result: Option<String> = conn.get(key).await?;

        match result {
            Some(data) => {
                debug!(key = %key, "Cache hit");
                Ok(Some(Self::deserialize(&data)?))
            }
            None => {
                debug!(key = %key, "Cache miss");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, value), level = "debug")]
    async fn set_ex<T: Serialize + Sync + Send>(&self, key: &str, value: &T, seconds: u64) -> Result<(), AppError> {
        let data = Self::serialize(value)?;
        let mut conn = self.redis.connection().await?;

        let _: () = conn.set_ex(key, data, seconds).await?;
        debug!(key = %key, ttl = seconds, "Cache set with expiration");

        Ok(())
    }

    #[instrument(skip(self), level = "debug")]
    async fn take<T: DeserializeOwned + Send>(&self, key: &str) -> Result<Option<T>, AppError> {
        let mut conn = self.redis.connection().await?;
        let result: Option<String> = conn.get_del(key).await?;
        result.map(|data| Self::deserialize(&data)).transpose()
    }

    #[instrument(skip(self), level = "debug")]
    async fn delete(&self, key: &str) -> Result<bool, AppError> {
        let mut conn = self.redis.connection().await?;
        let deleted: i64 = conn.del(key).await?;
        Ok(deleted > 0)
    }
}
