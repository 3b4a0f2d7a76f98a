//! Notification Service
//!
//! In-app notifications. Other services raise notifications through
//! [`Notifier`], which never fails the calling operation; members read and
//! manage theirs through [`NotificationService`].

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::application::dto::notification::NotificationResponse;
use crate::domain::{Notification, NotificationRepository, NotificationType, ParentType};
use crate::shared::error::AppError;
use crate::shared::pagination::{SearchRequest, SearchResult};
use crate::shared::snowflake::SnowflakeGenerator;

/// A notification to raise.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub receiver_id: i64,
    pub initiator_id: Option<i64>,
    pub notification_type: NotificationType,
    pub parent: Option<(ParentType, i64)>,
    /// Template parameters (`name`, `title`, ...)
    pub params: Value,
}

/// Raises notifications on behalf of other services.
#[derive(Clone)]
pub struct Notifier {
    repo: Arc<dyn NotificationRepository>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl Notifier {
    pub fn new(repo: Arc<dyn NotificationRepository>, id_generator: Arc<SnowflakeGenerator>) -> Self {
        Self { repo, id_generator }
    }

    /// Store a notification. Failures are logged and swallowed; members never
    /// notify themselves.
    pub async fn notify(&self, new: NewNotification) {
        if new.initiator_id == Some(new.receiver_id) {
            return;
        }

        let notification = Notification {
            id: self.id_generator.generate(),
            receiver_id: new.receiver_id,
            initiator_id: new.initiator_id,
            notification_type: new.notification_type,
            parent_type: new.parent.map(|(t, _)| t),
            parent_id: new.parent.map(|(_, id)| id),
            params: new.params,
            is_read: false,
            read_on: None,
            created_at: Utc::now(),
        };

        if let Err(e) = self.repo.create(&notification).await {
            warn!(
                receiver_id = notification.receiver_id,
                notification_type = %notification.notification_type,
                error = %e,
                "Failed to store notification"
            );
        }
    }
}

/// Notification service trait
#[async_trait]
pub trait NotificationService: Send + Sync {
    async fn find_mine(
        &self,
        member_id: i64,
        request: &SearchRequest,
    ) -> Result<SearchResult<NotificationResponse>, NotificationError>;

    async fn count_unread(&self, member_id: i64) -> Result<i64, NotificationError>;

    async fn mark_as_read(&self, member_id: i64, notification_id: i64) -> Result<(), NotificationError>;

    /// Returns how many notifications were marked.
    async fn mark_all_as_read(&self, member_id: i64) -> Result<u64, NotificationError>;

    async fn delete(&self, member_id: i64, notification_id: i64) -> Result<(), NotificationError>;
}

/// Notification service errors
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    /// Unknown, or addressed to somebody else
    #[error("Notification not found")]
    NotFound,

    #[error(transparent)]
    Repository(#[from] AppError),
}

impl From<NotificationError> for AppError {
    fn from(err: NotificationError) -> Self {
        match err {
            NotificationError::NotFound => AppError::NotFound("notification.not.found".into()),
            NotificationError::Repository(e) => e,
        }
    }
}

pub struct NotificationServiceImpl {
    repo: Arc<dyn NotificationRepository>,
}

impl NotificationServiceImpl {
    pub fn new(repo: Arc<dyn NotificationRepository>) -> Self {
        Self { repo }
    }

    async fn find_owned(&self, member_id: i64, notification_id: i64) -> Result<Notification, NotificationError> {
        self.repo
            .find_by_id(notification_id)
            .await?
            .filter(|n| n.receiver_id == member_id)
            .ok_or(NotificationError::NotFound)
    }
}

#[async_trait]
impl NotificationService for NotificationServiceImpl {
    async fn find_mine(
        &self,
        member_id: i64,
        request: &SearchRequest,
    ) -> Result<SearchResult<NotificationResponse>, NotificationError> {
        let (notifications, total) = self.repo.find_by_receiver(member_id, request).await?;
        Ok(SearchResult::new(notifications, total, request).map(NotificationResponse::from))
    }

    async fn count_unread(&self, member_id: i64) -> Result<i64, NotificationError> {
        Ok(self.repo.count_unread(member_id).await?)
    }

    #[instrument(skip(self))]
    async fn mark_as_read(&self, member_id: i64, notification_id: i64) -> Result<(), NotificationError> {
        let notification = self.find_owned(member_id, notification_id).await?;
        if !notification.is_read {
            self.repo.mark_as_read(notification.id, Utc::now()).await?;
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn mark_all_as_read(&self, member_id: i64) -> Result<u64, NotificationError> {
        let updated = self.repo.mark_all_as_read(member_id, Utc::now()).await?;
        info!(member_id, updated, "Notifications marked as read");
        Ok(updated)
    }

    #[instrument(skip(self))]
    async fn delete(&self, member_id: i64, notification_id: i64) -> Result<(), NotificationError> {
        let notification = self.find_owned(member_id, notification_id).await?;
        self.repo.delete(notification.id).await?;
        info!(member_id, notification_id, "Notification deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MockNotificationRepository;
    use serde_json::json;

    fn notification(receiver_id: i64) -> Notification {
        Notification {
            id: 9,
            receiver_id,
            initiator_id: Some(1),
            notification_type: NotificationType::FollowedYou,
            parent_type: None,
            parent_id: None,
            params: json!({ "name": "Ada" }),
            is_read: false,
            read_on: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_notifier_skips_self_notifications() {
        let repo = MockNotificationRepository::new();
        let notifier = Notifier::new(Arc::new(repo), Arc::new(SnowflakeGenerator::new(1, 1)));
        notifier
            .notify(NewNotification {
                receiver_id: 5,
                initiator_id: Some(5),
                notification_type: NotificationType::FollowedYou,
                parent: None,
                params: json!({}),
            })
            .await;
    }

    #[tokio::test]
    async fn test_notifier_swallows_storage_errors() {
        let mut repo = MockNotificationRepository::new();
        repo.expect_create()
            .times(1)
            .returning(|_| Err(AppError::Internal("db down".into())));
        let notifier = Notifier::new(Arc::new(repo), Arc::new(SnowflakeGenerator::new(1, 1)));

        notifier
            .notify(NewNotification {
                receiver_id: 5,
                initiator_id: Some(6),
                notification_type: NotificationType::StreamCancelled,
                parent: Some((ParentType::Stream, 77)),
                params: json!({ "title": "Launch" }),
            })
            .await;
    }

    #[tokio::test]
    async fn test_mark_as_read_rejects_other_receivers() {
        let mut repo = MockNotificationRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(Some(notification(2))));

        let err = NotificationServiceImpl::new(Arc::new(repo))
            .mark_as_read(1, 9)
            .await
            .unwrap_err();
        assert!(matches!(err, NotificationError::NotFound));
    }

    #[tokio::test]
    async fn test_mark_as_read_skips_read_notifications() {
        let mut repo = MockNotificationRepository::new();
        repo.expect_find_by_id().returning(|_| {
            let mut n = notification(1);
            n.is_read = true;
            Ok(Some(n))
        });
        repo.expect_mark_as_read().never();

        NotificationServiceImpl::new(Arc::new(repo)).mark_as_read(1, 9).await.unwrap();
    }

    #[tokio::test]
    async fn test_find_mine_renders_messages() {
        let mut repo = MockNotificationRepository::new();
        repo.expect_find_by_receiver()
            .returning(|_, _| Ok((vec![notification(1)], 1)));

        let page = NotificationServiceImpl::new(Arc::new(repo))
            .find_mine(1, &SearchRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total_entries, 1);
        assert_eq!(page.values[0].message, "Ada started following you");
        assert_eq!(page.values[0].notification_type.value, "FOLLOWED_YOU");
    }
}
