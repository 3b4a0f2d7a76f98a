//! Notification DTOs

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{EnumInfo, Notification};
use crate::shared::i18n;

/// Notification with its message rendered in the request locale.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationResponse {
    pub id: String,
    pub notification_type: EnumInfo,
    pub message: String,
    pub initiator_id: Option<String>,
    pub parent_type: Option<EnumInfo>,
    pub parent_id: Option<String>,
    pub is_read: bool,
    pub read_on: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Notification> for NotificationResponse {
    fn from(notification: Notification) -> Self {
        let message = i18n::render(
            &notification.notification_type.message_key(),
            i18n::current_locale(),
            &notification.params,
        );
        Self {
            id: notification.id.to_string(),
            notification_type: notification.notification_type.info(),
            message,
            initiator_id: notification.initiator_id.map(|id| id.to_string()),
            parent_type: notification.parent_type.map(|p| p.info()),
            parent_id: notification.parent_id.map(|id| id.to_string()),
            is_read: notification.is_read,
            read_on: notification.read_on,
            created_at: notification.created_at,
        }
    }
}
