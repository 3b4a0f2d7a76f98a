//! Redis storage for OAuth2 `state` values.

use async_trait::async_trait;

use super::{keys, Cache, RedisCache};
use crate::domain::gateways::{OAuthStateStore, PendingAuthorization};
use crate::shared::error::AppError;

#[derive(Clone)]
pub struct RedisOAuthStateStore {
    cache: RedisCache,
}

impl RedisOAuthStateStore {
    pub fn new(cache: RedisCache) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl OAuthStateStore for RedisOAuthStateStore {
    async fn save(&self, state: &str, pending: &PendingAuthorization, ttl_secs: u64) -> Result<(), AppError> {
        self.cache.set_ex(&keys::oauth2_state(state), pending, ttl_secs).await
    }

    async fn consume(&self, state: &str) -> Result<Option<PendingAuthorization>, AppError> {
        self.cache.take(&keys::oauth2_state(state)).await
    }
}
