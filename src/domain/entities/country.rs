//! Country entity and repository trait.
//!
//! Maps to the `countries` table, seeded by migration.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;
use crate::shared::pagination::SearchRequest;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub id: i64,
    pub title: String,
    /// ISO 3166-1 alpha-2 code, upper case
    pub code: String,
    /// Representative IANA timezone
    pub timezone: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CountryRepository: Send + Sync {
    async fn find_by_code(&self, code: &str) -> Result<Option<Country>, AppError>;

    /// Page of countries whose title matches the request pattern.
    async fn search(&self, request: &SearchRequest) -> Result<(Vec<Country>, i64), AppError>;
}
