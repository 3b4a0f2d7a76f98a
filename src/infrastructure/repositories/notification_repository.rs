//! Notification Repository Implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{Notification, NotificationRepository, NotificationType, ParentType};
use crate::shared::error::AppError;
use crate::shared::pagination::SearchRequest;

const NOTIFICATION_COLUMNS: &str = r#"
    id, receiver_id, initiator_id, notification_type, parent_type, parent_id, params,
    is_read, read_on, created_at
"#;

#[derive(Debug, sqlx::FromRow)]
struct NotificationRow {
    id: i64,
    receiver_id: i64,
    initiator_id: Option<i64>,
    notification_type: String,
    parent_type: Option<String>,
    parent_id: Option<i64>,
    params: serde_json::Value,
    is_read: bool,
    read_on: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = AppError;

    fn try_from(row: NotificationRow) -> Result<Self, Self::Error> {
        Ok(Notification {
            id: row.id,
            receiver_id: row.receiver_id,
            initiator_id: row.initiator_id,
            notification_type: NotificationType::from_db(&row.notification_type)?,
            parent_type: row.parent_type.as_deref().map(ParentType::from_db).transpose()?,
            parent_id: row.parent_id,
            params: row.params,
            is_read: row.is_read,
            read_on: row.read_on,
            created_at: row.created_at,
        })
    }
}

#[derive(Clone)]
pub struct PgNotificationRepository {
    pool: PgPool,
}

impl PgNotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationRepository for PgNotificationRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Notification>, AppError> {
        let row = sqlx::query_as::<_, NotificationRow>(&format!(
            "SELECT {} FROM notifications WHERE id = $1",
            NOTIFICATION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Notification::try_from).transpose()
    }

    async fn create(&self, notification: &Notification) -> Result<Notification, AppError> {
        let row = sqlx::query_as::<_, NotificationRow>(&format!(
            r#"
            INSERT INTO notifications (
                id, receiver_id, initiator_id, notification_type, parent_type, parent_id, params,
                is_read, read_on, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            NOTIFICATION_COLUMNS
        ))
        .bind(notification.id)
        .bind(notification.receiver_id)
        .bind(notification.initiator_id)
        .bind(notification.notification_type.as_str())
        .bind(notification.parent_type.map(|p| p.as_str()))
        .bind(notification.parent_id)
        .bind(&notification.params)
        .bind(notification.is_read)
        .bind(notification.read_on)
        .bind(notification.created_at)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn find_by_receiver(
        &self,
        receiver_id: i64,
        request: &SearchRequest,
    ) -> Result<(Vec<Notification>, i64), AppError> {
        let rows = sqlx::query_as::<_, NotificationRow>(&format!(
            "SELECT {} FROM notifications WHERE receiver_id = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3",
            NOTIFICATION_COLUMNS
        ))
        .bind(receiver_id)
        .bind(request.limit())
        .bind(request.offset())
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM notifications WHERE receiver_id = $1")
            .bind(receiver_id)
            .fetch_one(&self.pool)
            .await?;

        let notifications = rows.into_iter().map(Notification::try_from).collect::<Result<Vec<_>, _>>()?;
        Ok((notifications, total))
    }

    async fn count_unread(&self, receiver_id: i64) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE receiver_id = $1 AND is_read = FALSE",
        )
        .bind(receiver_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn mark_as_read(&self, id: i64, read_on: DateTime<Utc>) -> Result<(), AppError> {
        sqlx::query("UPDATE notifications SET is_read = TRUE, read_on = $2 WHERE id = $1 AND is_read = FALSE")
            .bind(id)
            .bind(read_on)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn mark_all_as_read(&self, receiver_id: i64, read_on: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE, read_on = $2 WHERE receiver_id = $1 AND is_read = FALSE",
        )
        .bind(receiver_id)
        .bind(read_on)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        sqlx::query("DELETE FROM notifications WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
