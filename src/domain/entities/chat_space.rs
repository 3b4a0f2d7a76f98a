//! Chat space entity, chat space membership, and repository trait.
//!
//! Maps to the `chat_spaces` and `chat_space_members` tables.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::services::MembershipSnapshot;
use crate::domain::value_objects::{string_enum, RequestToJoinStatus, Visibility};
use crate::shared::error::AppError;
use crate::shared::pagination::SearchRequest;

string_enum! {
    pub enum ChatSpaceStatus {
        Active = "ACTIVE",
        Inactive = "INACTIVE",
    }
}

string_enum! {
    pub enum ChatSpaceRole {
        Admin = "ADMIN",
        Member = "MEMBER",
    }
}

/// A discussion space, optionally mirrored to a Google Chat space.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSpace {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub tags: Option<String>,
    pub guidelines_or_rules: Option<String>,
    pub visibility: Visibility,
    pub status: ChatSpaceStatus,
    pub organizer_id: i64,
    /// Resource name of the mirrored remote space (`spaces/AAAA...`)
    pub external_id_or_name: Option<String>,
    pub space_link: Option<String>,
    pub total_members: i64,
    pub total_request_to_join: i64,
    pub total_likes: i64,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChatSpace {
    pub fn is_organizer(&self, member_id: i64) -> bool {
        self.organizer_id == member_id
    }

    pub fn is_active(&self) -> bool {
        matches!(self.status, ChatSpaceStatus::Active)
    }
}

/// A member's relationship with a chat space.
///
/// One row per (chat_space_id, member_id); leaving or removal flips flags
/// rather than deleting the row so history and join status survive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSpaceMember {
    pub id: i64,
    pub chat_space_id: i64,
    pub member_id: i64,
    pub role: ChatSpaceRole,
    pub request_to_join_status: RequestToJoinStatus,
    pub join_reason: Option<String>,
    pub decision_reason: Option<String>,
    pub left: bool,
    pub removed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChatSpaceMember {
    pub fn new(id: i64, chat_space_id: i64, member_id: i64, status: RequestToJoinStatus) -> Self {
        let now = Utc::now();
        Self {
            id,
            chat_space_id,
            member_id,
            role: ChatSpaceRole::Member,
            request_to_join_status: status,
            join_reason: None,
            decision_reason: None,
            left: false,
            removed: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Approved, not left, not removed.
    pub fn is_active_member(&self) -> bool {
        self.request_to_join_status.is_approved() && !self.left && !self.removed
    }

    pub fn is_admin(&self) -> bool {
        self.is_active_member() && matches!(self.role, ChatSpaceRole::Admin)
    }

    pub fn snapshot(&self) -> MembershipSnapshot {
        MembershipSnapshot {
            request_status: self.request_to_join_status,
            left: self.left,
            removed: self.removed,
        }
    }
}

/// Chat space member joined with the member's display fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSpaceMemberView {
    pub membership: ChatSpaceMember,
    pub full_name: String,
    pub username: String,
    pub profile_photo_url: Option<String>,
}

/// Repository trait for chat spaces and their memberships.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatSpaceRepository: Send + Sync {
    /// Find a chat space that is not deleted.
    async fn find_by_id(&self, id: i64) -> Result<Option<ChatSpace>, AppError>;

    async fn create(&self, chat_space: &ChatSpace, organizer: &ChatSpaceMember) -> Result<ChatSpace, AppError>;

    async fn update(&self, chat_space: &ChatSpace) -> Result<ChatSpace, AppError>;

    async fn soft_delete(&self, id: i64) -> Result<(), AppError>;

    async fn search(&self, request: &SearchRequest) -> Result<(Vec<ChatSpace>, i64), AppError>;

    /// Spaces the member organizes or is an active member of.
    async fn find_by_member(
        &self,
        member_id: i64,
        request: &SearchRequest,
    ) -> Result<(Vec<ChatSpace>, i64), AppError>;

    /// Adjust `total_members` / `total_request_to_join` by the given deltas, never below zero.
    async fn adjust_counters(&self, id: i64, members_delta: i64, requests_delta: i64) -> Result<(), AppError>;

    async fn find_member(&self, chat_space_id: i64, member_id: i64) -> Result<Option<ChatSpaceMember>, AppError>;

    /// Insert or update the membership row keyed by (chat_space_id, member_id).
    async fn save_member(&self, membership: &ChatSpaceMember) -> Result<ChatSpaceMember, AppError>;

    async fn find_members(
        &self,
        chat_space_id: i64,
        request: &SearchRequest,
    ) -> Result<(Vec<ChatSpaceMemberView>, i64), AppError>;

    async fn find_join_requests(
        &self,
        chat_space_id: i64,
        request: &SearchRequest,
    ) -> Result<(Vec<ChatSpaceMemberView>, i64), AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_left_admin_is_not_admin() {
        let mut membership = ChatSpaceMember::new(1, 2, 3, RequestToJoinStatus::Approved);
        membership.role = ChatSpaceRole::Admin;
        assert!(membership.is_admin());

        membership.left = true;
        assert!(!membership.is_admin());
        assert!(!membership.is_active_member());
    }

    #[test]
    fn test_pending_member_is_not_active() {
        let membership = ChatSpaceMember::new(1, 2, 3, RequestToJoinStatus::Pending);
        assert!(!membership.is_active_member());
    }
}
