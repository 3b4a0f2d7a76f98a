//! Soft ask DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::{EnumInfo, ParentType, SoftAsk, SoftAskAnswer, SoftAskReply, SoftAskVoteParent, Visibility};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSoftAskRequest {
    #[validate(length(min = 1, max = 500, message = "soft.ask.title.length"))]
    pub title: String,

    #[validate(length(min = 1, max = 3000, message = "soft.ask.description.length"))]
    pub description: String,

    #[validate(length(max = 300, message = "tags.too.long"))]
    pub tags: Option<String>,

    pub parent_type: Option<ParentType>,

    #[serde(default, with = "super::id_format::option")]
    pub parent_id: Option<i64>,

    pub visibility: Visibility,

    pub deadline: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateSoftAskRequest {
    #[validate(length(min = 1, max = 500, message = "soft.ask.title.length"))]
    pub title: String,

    #[validate(length(min = 1, max = 3000, message = "soft.ask.description.length"))]
    pub description: String,

    #[validate(length(max = 300, message = "tags.too.long"))]
    pub tags: Option<String>,

    pub deadline: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddAnswerRequest {
    #[validate(length(min = 1, max = 3000, message = "soft.ask.content.length"))]
    pub content: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddReplyRequest {
    #[validate(length(min = 1, max = 3000, message = "soft.ask.content.length"))]
    pub content: String,

    /// Reply being answered, within the same answer
    #[serde(default, with = "super::id_format::option")]
    pub parent_reply_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SoftAskVoteRequest {
    pub parent_type: SoftAskVoteParent,
    #[serde(with = "super::id_format")]
    pub parent_id: i64,
}

/// Optional `?parent_type=CHAT_SPACE&parent_id=...` filter on searches.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SoftAskParentQuery {
    pub parent_type: Option<ParentType>,
    #[serde(default, with = "super::id_format::option")]
    pub parent_id: Option<i64>,
}

impl SoftAskParentQuery {
    pub fn parent(&self) -> Option<(ParentType, i64)> {
        self.parent_type.zip(self.parent_id)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SoftAskResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub tags: Option<String>,
    pub author_id: String,
    pub parent_type: Option<EnumInfo>,
    pub parent_id: Option<String>,
    pub visibility: EnumInfo,
    pub is_closed: bool,
    pub deadline: Option<DateTime<Utc>>,
    pub total_answers: i64,
    pub total_votes: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SoftAsk> for SoftAskResponse {
    fn from(ask: SoftAsk) -> Self {
        Self {
            id: ask.id.to_string(),
            title: ask.title,
            description: ask.description,
            tags: ask.tags,
            author_id: ask.author_id.to_string(),
            parent_type: ask.parent_type.map(|t| t.info()),
            parent_id: ask.parent_id.map(|id| id.to_string()),
            visibility: ask.visibility.info(),
            is_closed: ask.is_closed,
            deadline: ask.deadline,
            total_answers: ask.total_answers,
            total_votes: ask.total_votes,
            created_at: ask.created_at,
            updated_at: ask.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SoftAskAnswerResponse {
    pub id: String,
    pub soft_ask_id: String,
    pub author_id: String,
    pub content: String,
    pub total_replies: i64,
    pub total_votes: i64,
    pub created_at: DateTime<Utc>,
}

impl From<SoftAskAnswer> for SoftAskAnswerResponse {
    fn from(answer: SoftAskAnswer) -> Self {
        Self {
            id: answer.id.to_string(),
            soft_ask_id: answer.soft_ask_id.to_string(),
            author_id: answer.author_id.to_string(),
            content: answer.content,
            total_replies: answer.total_replies,
            total_votes: answer.total_votes,
            created_at: answer.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SoftAskReplyResponse {
    pub id: String,
    pub answer_id: String,
    pub parent_reply_id: Option<String>,
    pub author_id: String,
    pub content: String,
    pub total_votes: i64,
    pub created_at: DateTime<Utc>,
}

impl From<SoftAskReply> for SoftAskReplyResponse {
    fn from(reply: SoftAskReply) -> Self {
        Self {
            id: reply.id.to_string(),
            answer_id: reply.answer_id.to_string(),
            parent_reply_id: reply.parent_reply_id.map(|id| id.to_string()),
            author_id: reply.author_id.to_string(),
            content: reply.content,
            total_votes: reply.total_votes,
            created_at: reply.created_at,
        }
    }
}

/// Outcome of a vote toggle.
#[derive(Debug, Clone, Serialize)]
pub struct SoftAskVoteResponse {
    pub voted: bool,
    pub total_votes: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_query_needs_both_parts() {
        let query: SoftAskParentQuery = serde_json::from_str(r#"{"parent_type":"STREAM"}"#).unwrap();
        assert_eq!(query.parent(), None);

        let query: SoftAskParentQuery =
            serde_json::from_str(r#"{"parent_type":"STREAM","parent_id":"19"}"#).unwrap();
        assert_eq!(query.parent(), Some((ParentType::Stream, 19)));
    }

    #[test]
    fn test_vote_request_parses() {
        let request: SoftAskVoteRequest =
            serde_json::from_str(r#"{"parent_type":"ANSWER","parent_id":"88"}"#).unwrap();
        assert_eq!(request.parent_type, SoftAskVoteParent::Answer);
        assert_eq!(request.parent_id, 88);
    }
}
