//! Member-to-member relationships: contacts, follows and blocks.
//!
//! Maps to the `contacts`, `followers` and `block_users` tables.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::string_enum;
use crate::shared::error::AppError;
use crate::shared::pagination::SearchRequest;

string_enum! {
    pub enum ContactType {
        Email = "EMAIL",
        PhoneNumber = "PHONE_NUMBER",
        Whatsapp = "WHATSAPP",
        Telegram = "TELEGRAM",
        Facebook = "FACEBOOK",
        Instagram = "INSTAGRAM",
        X = "X",
    }
}

string_enum! {
    pub enum BlockStatus {
        Blocked = "BLOCKED",
        Unblocked = "UNBLOCKED",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: i64,
    pub member_id: i64,
    pub contact_type: ContactType,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Follower {
    pub id: i64,
    pub follower_id: i64,
    pub followed_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockUser {
    pub id: i64,
    pub initiator_id: i64,
    pub recipient_id: i64,
    pub block_status: BlockStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A related member with the display fields lists need.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberSummary {
    pub member_id: i64,
    pub full_name: String,
    pub username: String,
    pub profile_photo_url: Option<String>,
    pub since: DateTime<Utc>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContactRepository: Send + Sync {
    async fn find_by_member(&self, member_id: i64) -> Result<Vec<Contact>, AppError>;

    /// Replace every contact of the member in one transaction.
    async fn replace_all(&self, member_id: i64, contacts: &[Contact]) -> Result<Vec<Contact>, AppError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FollowerRepository: Send + Sync {
    async fn exists(&self, follower_id: i64, followed_id: i64) -> Result<bool, AppError>;

    async fn create(&self, follower: &Follower) -> Result<Follower, AppError>;

    /// Returns whether a row was removed.
    async fn delete(&self, follower_id: i64, followed_id: i64) -> Result<bool, AppError>;

    /// Remove follow links in both directions.
    async fn delete_between(&self, a: i64, b: i64) -> Result<(), AppError>;

    async fn find_followers(
        &self,
        member_id: i64,
        request: &SearchRequest,
    ) -> Result<(Vec<MemberSummary>, i64), AppError>;

    async fn find_followings(
        &self,
        member_id: i64,
        request: &SearchRequest,
    ) -> Result<(Vec<MemberSummary>, i64), AppError>;

    /// (followers, following)
    async fn counts(&self, member_id: i64) -> Result<(i64, i64), AppError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlockUserRepository: Send + Sync {
    /// Insert or update keyed by (initiator_id, recipient_id).
    async fn upsert(&self, block: &BlockUser) -> Result<BlockUser, AppError>;

    /// Whether `initiator_id` currently blocks `recipient_id`.
    async fn is_blocked(&self, initiator_id: i64, recipient_id: i64) -> Result<bool, AppError>;

    async fn is_blocked_either_way(&self, a: i64, b: i64) -> Result<bool, AppError>;

    async fn find_blocked(
        &self,
        initiator_id: i64,
        request: &SearchRequest,
    ) -> Result<(Vec<MemberSummary>, i64), AppError>;
}
