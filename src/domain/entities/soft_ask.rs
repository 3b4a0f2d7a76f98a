//! Soft ask (community question) with answers, threaded replies and votes.
//!
//! Maps to the `soft_asks`, `soft_ask_answers`, `soft_ask_replies` and
//! `soft_ask_votes` tables.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{string_enum, ParentType, Visibility};
use crate::shared::error::AppError;
use crate::shared::pagination::SearchRequest;

string_enum! {
    /// What a soft ask vote is cast on.
    pub enum SoftAskVoteParent {
        SoftAsk = "SOFT_ASK",
        Answer = "ANSWER",
        Reply = "REPLY",
    }
}

string_enum! {
    pub enum SoftAskVoteType {
        Voted = "VOTED",
        NotVoted = "NOT_VOTED",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoftAsk {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub tags: Option<String>,
    pub author_id: i64,
    pub parent_type: Option<ParentType>,
    pub parent_id: Option<i64>,
    pub visibility: Visibility,
    pub is_closed: bool,
    pub deadline: Option<DateTime<Utc>>,
    pub total_answers: i64,
    pub total_votes: i64,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SoftAsk {
    pub fn is_author(&self, member_id: i64) -> bool {
        self.author_id == member_id
    }

    /// Closed explicitly or past its deadline.
    pub fn accepts_answers(&self, now: DateTime<Utc>) -> bool {
        !self.is_closed && self.deadline.map_or(true, |d| d > now)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoftAskAnswer {
    pub id: i64,
    pub soft_ask_id: i64,
    pub author_id: i64,
    pub content: String,
    pub total_replies: i64,
    pub total_votes: i64,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoftAskReply {
    pub id: i64,
    pub soft_ask_id: i64,
    pub answer_id: i64,
    pub parent_reply_id: Option<i64>,
    pub author_id: i64,
    pub content: String,
    pub total_votes: i64,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoftAskVote {
    pub id: i64,
    pub member_id: i64,
    pub parent_type: SoftAskVoteParent,
    pub parent_id: i64,
    pub vote_type: SoftAskVoteType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SoftAskRepository: Send + Sync {
    /// Find a soft ask that is not deleted.
    async fn find_by_id(&self, id: i64) -> Result<Option<SoftAsk>, AppError>;

    async fn create(&self, soft_ask: &SoftAsk) -> Result<SoftAsk, AppError>;

    async fn update(&self, soft_ask: &SoftAsk) -> Result<SoftAsk, AppError>;

    async fn soft_delete(&self, id: i64) -> Result<(), AppError>;

    async fn search(
        &self,
        parent: Option<(ParentType, i64)>,
        request: &SearchRequest,
    ) -> Result<(Vec<SoftAsk>, i64), AppError>;

    async fn find_answer(&self, id: i64) -> Result<Option<SoftAskAnswer>, AppError>;

    /// Insert the answer and increment the ask's `total_answers`.
    async fn create_answer(&self, answer: &SoftAskAnswer) -> Result<SoftAskAnswer, AppError>;

    /// Soft delete the answer and decrement the ask's `total_answers`.
    async fn delete_answer(&self, answer: &SoftAskAnswer) -> Result<(), AppError>;

    async fn find_answers(
        &self,
        soft_ask_id: i64,
        request: &SearchRequest,
    ) -> Result<(Vec<SoftAskAnswer>, i64), AppError>;

    async fn find_reply(&self, id: i64) -> Result<Option<SoftAskReply>, AppError>;

    /// Insert the reply and increment the answer's `total_replies`.
    async fn create_reply(&self, reply: &SoftAskReply) -> Result<SoftAskReply, AppError>;

    /// Soft delete the reply and decrement the answer's `total_replies`.
    async fn delete_reply(&self, reply: &SoftAskReply) -> Result<(), AppError>;

    async fn find_replies(
        &self,
        answer_id: i64,
        request: &SearchRequest,
    ) -> Result<(Vec<SoftAskReply>, i64), AppError>;

    async fn find_vote(
        &self,
        member_id: i64,
        parent_type: SoftAskVoteParent,
        parent_id: i64,
    ) -> Result<Option<SoftAskVote>, AppError>;

    /// Upsert the vote and move the parent's `total_votes` by +1 or
    /// `GREATEST(x - 1, 0)`; returns the new total.
    async fn save_vote(&self, vote: &SoftAskVote) -> Result<i64, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_accepts_answers() {
        let now = Utc::now();
        let mut ask = SoftAsk {
            id: 1,
            title: "Best venue?".into(),
            description: String::new(),
            tags: None,
            author_id: 1,
            parent_type: None,
            parent_id: None,
            visibility: Visibility::Public,
            is_closed: false,
            deadline: Some(now + Duration::days(1)),
            total_answers: 0,
            total_votes: 0,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        };
        assert!(ask.accepts_answers(now));

        ask.deadline = Some(now - Duration::seconds(1));
        assert!(!ask.accepts_answers(now));

        ask.deadline = None;
        ask.is_closed = true;
        assert!(!ask.accepts_answers(now));
    }
}
