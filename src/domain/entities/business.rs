//! Business profile entity and repository trait.
//!
//! Maps to the `businesses` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::string_enum;
use crate::shared::error::AppError;
use crate::shared::pagination::SearchRequest;

string_enum! {
    pub enum BusinessChannel {
        Online = "ONLINE",
        Physical = "PHYSICAL",
        Hybrid = "HYBRID",
    }
}

string_enum! {
    pub enum BusinessStatus {
        Active = "ACTIVE",
        Inactive = "INACTIVE",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Business {
    pub id: i64,
    pub owner_id: i64,
    pub title: String,
    pub motto: Option<String>,
    pub description: String,
    pub channel: BusinessChannel,
    pub business_type: String,
    pub country: String,
    pub address: Option<String>,
    pub founding_year: Option<i32>,
    pub registration_number: Option<String>,
    pub status: BusinessStatus,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Business {
    pub fn is_owner(&self, member_id: i64) -> bool {
        self.owner_id == member_id
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BusinessRepository: Send + Sync {
    /// Find a business that is not deleted.
    async fn find_by_id(&self, id: i64) -> Result<Option<Business>, AppError>;

    async fn create(&self, business: &Business) -> Result<Business, AppError>;

    async fn update(&self, business: &Business) -> Result<Business, AppError>;

    async fn soft_delete(&self, id: i64) -> Result<(), AppError>;

    async fn search(&self, request: &SearchRequest) -> Result<(Vec<Business>, i64), AppError>;

    async fn find_by_owner(
        &self,
        owner_id: i64,
        request: &SearchRequest,
    ) -> Result<(Vec<Business>, i64), AppError>;
}
