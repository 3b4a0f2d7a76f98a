//! Messaging Module
//!
//! Redis pub/sub publisher for fire-and-forget platform events.

use async_trait::async_trait;
use redis::AsyncCommands;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::domain::gateways::{EventPublisher, SoftAskCounters, StreamCreatedEvent};
use crate::infrastructure::cache::{keys, RedisHandle};
use crate::shared::error::AppError;

/// Publishes JSON payloads on Redis channels.
#[derive(Clone)]
pub struct RedisEventPublisher {
    redis: RedisHandle,
}

impl RedisEventPublisher {
    pub fn new(redis: RedisHandle) -> Self {
        Self { redis }
    }

    async fn publish<T: Serialize + Sync>(&self, channel: &str, payload: &T) -> Result<(), AppError> {
        let body = serde_json::to_string(payload)
            .map_err(|e| AppError::Internal(format!("Event serialization failed: {}", e)))?;
        let mut conn = self.redis.connection().await?;
        let receivers: i64 = conn.publish(channel, body).await?;
        debug!(channel = %channel, receivers, "Event published");
        Ok(())
    }
}

#[async_trait]
impl EventPublisher for RedisEventPublisher {
    #[instrument(skip(self, event), fields(stream_id = %event.stream_id))]
    async fn stream_created(&self, event: StreamCreatedEvent) -> Result<(), AppError> {
        self.publish(keys::STREAM_CREATED_CHANNEL, &event).await
    }

    #[instrument(skip(self, counters), fields(soft_ask_id = %counters.soft_ask_id))]
    async fn soft_ask_counters(&self, counters: SoftAskCounters) -> Result<(), AppError> {
        self.publish(&keys::soft_ask_counters(&counters.soft_ask_id), &counters).await
    }
}
