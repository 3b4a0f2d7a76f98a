//! In-app notification entity and repository trait.
//!
//! Maps to the `notifications` table. The message is not stored: it is
//! rendered from the notification type and `params` in the reader's locale.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{string_enum, ParentType};
use crate::shared::error::AppError;
use crate::shared::pagination::SearchRequest;

string_enum! {
    pub enum NotificationType {
        FollowedYou = "FOLLOWED_YOU",
        ChatSpaceJoinRequest = "CHAT_SPACE_JOIN_REQUEST",
        ChatSpaceJoinApproved = "CHAT_SPACE_JOIN_APPROVED",
        ChatSpaceJoinDisapproved = "CHAT_SPACE_JOIN_DISAPPROVED",
        StreamJoinRequest = "STREAM_JOIN_REQUEST",
        StreamJoinApproved = "STREAM_JOIN_APPROVED",
        StreamJoinDisapproved = "STREAM_JOIN_DISAPPROVED",
        StreamCancelled = "STREAM_CANCELLED",
        SoftAskAnswered = "SOFT_ASK_ANSWERED",
        SoftAskReplied = "SOFT_ASK_REPLIED",
        ReviewReceived = "REVIEW_RECEIVED",
    }
}

impl NotificationType {
    /// Catalog key of the message template, e.g. `notification.followed.you`.
    pub fn message_key(&self) -> String {
        format!("notification.{}", self.as_str().to_lowercase().replace('_', "."))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub receiver_id: i64,
    pub initiator_id: Option<i64>,
    pub notification_type: NotificationType,
    pub parent_type: Option<ParentType>,
    pub parent_id: Option<i64>,
    /// Template parameters, e.g. `{"name": "...", "title": "..."}`
    pub params: serde_json::Value,
    pub is_read: bool,
    pub read_on: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Notification>, AppError>;

    async fn create(&self, notification: &Notification) -> Result<Notification, AppError>;

    async fn find_by_receiver(
        &self,
        receiver_id: i64,
        request: &SearchRequest,
    ) -> Result<(Vec<Notification>, i64), AppError>;

    async fn count_unread(&self, receiver_id: i64) -> Result<i64, AppError>;

    async fn mark_as_read(&self, id: i64, read_on: DateTime<Utc>) -> Result<(), AppError>;

    /// Returns how many notifications changed.
    async fn mark_all_as_read(&self, receiver_id: i64, read_on: DateTime<Utc>) -> Result<u64, AppError>;

    async fn delete(&self, id: i64) -> Result<(), AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_key() {
        assert_eq!(NotificationType::FollowedYou.message_key(), "notification.followed.you");
        assert_eq!(
            NotificationType::ChatSpaceJoinRequest.message_key(),
            "notification.chat.space.join.request"
        );
    }
}
