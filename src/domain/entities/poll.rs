//! Poll entity with options and votes.
//!
//! Maps to the `polls`, `poll_options` and `poll_votes` tables.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{ParentType, Visibility};
use crate::shared::error::AppError;
use crate::shared::pagination::SearchRequest;

pub const MIN_POLL_OPTIONS: usize = 2;
pub const MAX_POLL_OPTIONS: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Poll {
    pub id: i64,
    pub question: String,
    pub description: Option<String>,
    pub author_id: i64,
    pub parent_type: Option<ParentType>,
    pub parent_id: Option<i64>,
    pub visibility: Visibility,
    pub is_multiple_choice: bool,
    pub is_anonymous: bool,
    pub expires_at: DateTime<Utc>,
    pub is_ended: bool,
    pub total_votes: i64,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Poll {
    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        !self.is_ended && self.expires_at > now
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollOption {
    pub id: i64,
    pub poll_id: i64,
    pub text: String,
    pub vote_count: i64,
    pub position: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollVote {
    pub poll_id: i64,
    pub option_id: i64,
    pub member_id: i64,
    pub created_at: DateTime<Utc>,
}

/// A voter shown against an option on non-anonymous polls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollVoter {
    pub option_id: i64,
    pub member_id: i64,
    pub full_name: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PollRepository: Send + Sync {
    /// Find a poll that is not deleted.
    async fn find_by_id(&self, id: i64) -> Result<Option<Poll>, AppError>;

    async fn create(&self, poll: &Poll, options: &[PollOption]) -> Result<Poll, AppError>;

    async fn find_options(&self, poll_id: i64) -> Result<Vec<PollOption>, AppError>;

    async fn find_member_votes(&self, poll_id: i64, member_id: i64) -> Result<Vec<i64>, AppError>;

    async fn find_voters(&self, poll_id: i64) -> Result<Vec<PollVoter>, AppError>;

    /// Atomically drop the member's previous votes and record `option_ids`,
    /// keeping option and poll counters consistent.
    async fn replace_votes(&self, poll_id: i64, member_id: i64, option_ids: &[i64]) -> Result<(), AppError>;

    async fn close(&self, id: i64) -> Result<(), AppError>;

    async fn soft_delete(&self, id: i64) -> Result<(), AppError>;

    async fn find_by_parent(
        &self,
        parent_type: ParentType,
        parent_id: i64,
        request: &SearchRequest,
    ) -> Result<(Vec<Poll>, i64), AppError>;
}
