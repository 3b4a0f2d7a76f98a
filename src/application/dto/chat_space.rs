//! Chat space DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::{ChatSpace, ChatSpaceMemberView, EnumInfo, JoinDecision, Visibility};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateChatSpaceRequest {
    #[validate(length(min = 1, max = 300, message = "chat.space.title.length"))]
    pub title: String,

    #[validate(length(min = 1, max = 3000, message = "chat.space.description.length"))]
    pub description: String,

    #[validate(length(max = 300, message = "tags.too.long"))]
    pub tags: Option<String>,

    #[validate(length(max = 3000, message = "chat.space.guidelines.too.long"))]
    pub guidelines_or_rules: Option<String>,

    pub visibility: Visibility,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateChatSpaceRequest {
    #[validate(length(min = 1, max = 300, message = "chat.space.title.length"))]
    pub title: String,

    #[validate(length(min = 1, max = 3000, message = "chat.space.description.length"))]
    pub description: String,

    #[validate(length(max = 300, message = "tags.too.long"))]
    pub tags: Option<String>,

    #[validate(length(max = 3000, message = "chat.space.guidelines.too.long"))]
    pub guidelines_or_rules: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateVisibilityRequest {
    pub visibility: Visibility,
}

/// Body of a request to join; the comment is shown to admins.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RequestToJoinRequest {
    #[validate(length(max = 500, message = "comment.too.long"))]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProcessJoinRequest {
    #[serde(with = "super::id_format")]
    pub member_id: i64,

    pub join_status: JoinDecision,

    #[validate(length(max = 500, message = "comment.too.long"))]
    pub comment: Option<String>,
}

/// Target of remove, restore, promote and demote.
#[derive(Debug, Clone, Deserialize)]
pub struct MemberActionRequest {
    #[serde(with = "super::id_format")]
    pub member_id: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatSpaceResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub tags: Option<String>,
    pub guidelines_or_rules: Option<String>,
    pub visibility: EnumInfo,
    pub status: EnumInfo,
    pub organizer_id: String,
    pub space_link: Option<String>,
    pub total_members: i64,
    pub total_request_to_join: i64,
    pub total_likes: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ChatSpace> for ChatSpaceResponse {
    fn from(cs: ChatSpace) -> Self {
        Self {
            id: cs.id.to_string(),
            title: cs.title,
            description: cs.description,
            tags: cs.tags,
            guidelines_or_rules: cs.guidelines_or_rules,
            visibility: cs.visibility.info(),
            status: cs.status.info(),
            organizer_id: cs.organizer_id.to_string(),
            space_link: cs.space_link,
            total_members: cs.total_members,
            total_request_to_join: cs.total_request_to_join,
            total_likes: cs.total_likes,
            created_at: cs.created_at,
            updated_at: cs.updated_at,
        }
    }
}

/// Chat space as seen by a particular viewer.
#[derive(Debug, Clone, Serialize)]
pub struct ChatSpaceDetailResponse {
    #[serde(flatten)]
    pub chat_space: ChatSpaceResponse,
    pub join_status: EnumInfo,
    pub is_organizer: bool,
    pub is_admin: bool,
    pub has_liked: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatSpaceMemberResponse {
    pub id: String,
    pub member_id: String,
    pub full_name: String,
    pub username: String,
    pub profile_photo_url: Option<String>,
    pub role: EnumInfo,
    pub request_to_join_status: EnumInfo,
    pub join_reason: Option<String>,
    pub decision_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ChatSpaceMemberView> for ChatSpaceMemberResponse {
    fn from(view: ChatSpaceMemberView) -> Self {
        let m = view.membership;
        Self {
            id: m.id.to_string(),
            member_id: m.member_id.to_string(),
            full_name: view.full_name,
            username: view.username,
            profile_photo_url: view.profile_photo_url,
            role: m.role.info(),
            request_to_join_status: m.request_to_join_status.info(),
            join_reason: m.join_reason,
            decision_reason: m.decision_reason,
            created_at: m.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::validation::validate;

    #[test]
    fn test_process_join_request_parses_decision() {
        let request: ProcessJoinRequest = serde_json::from_str(
            r#"{"member_id":"77","join_status":"DISAPPROVED","comment":"Not this time"}"#,
        )
        .unwrap();
        assert_eq!(request.member_id, 77);
        assert_eq!(request.join_status, JoinDecision::Disapproved);
    }

    #[test]
    fn test_pending_is_not_a_decision() {
        let parsed = serde_json::from_str::<ProcessJoinRequest>(r#"{"member_id":"77","join_status":"PENDING"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_blank_title_is_rejected() {
        let request = CreateChatSpaceRequest {
            title: String::new(),
            description: "About".into(),
            tags: None,
            guidelines_or_rules: None,
            visibility: Visibility::Public,
        };
        assert!(validate(&request).is_err());
    }
}
