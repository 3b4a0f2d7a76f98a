//! Calendar Repository Implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{Calendar, CalendarRepository};
use crate::shared::error::AppError;
use crate::shared::pagination::SearchRequest;

const CALENDAR_COLUMNS: &str =
    "id, title, description, external_id, code, timezone, is_active, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct CalendarRow {
    id: i64,
    title: String,
    description: String,
    external_id: Option<String>,
    code: String,
    timezone: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CalendarRow> for Calendar {
    fn from(row: CalendarRow) -> Self {
        Calendar {
            id: row.id,
            title: row.title,
            description: row.description,
            external_id: row.external_id,
            code: row.code,
            timezone: row.timezone,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Clone)]
pub struct PgCalendarRepository {
    pool: PgPool,
}

impl PgCalendarRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CalendarRepository for PgCalendarRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Calendar>, AppError> {
        let row = sqlx::query_as::<_, CalendarRow>(&format!("SELECT {} FROM calendars WHERE id = $1", CALENDAR_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Calendar::from))
    }

    async fn find_active_by_code(&self, code: &str) -> Result<Option<Calendar>, AppError> {
        let row = sqlx::query_as::<_, CalendarRow>(&format!(
            "SELECT {} FROM calendars WHERE code = UPPER($1) AND is_active = TRUE",
            CALENDAR_COLUMNS
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Calendar::from))
    }

    async fn code_exists(&self, code: &str) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM calendars WHERE code = UPPER($1))")
            .bind(code)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn create(&self, calendar: &Calendar) -> Result<Calendar, AppError> {
        let row = sqlx::query_as::<_, CalendarRow>(&format!(
            r#"
            INSERT INTO calendars (id, title, description, external_id, code, timezone, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, UPPER($5), $6, $7, $8, $9)
            RETURNING {}
            "#,
            CALENDAR_COLUMNS
        ))
        .bind(calendar.id)
        .bind(&calendar.title)
        .bind(&calendar.description)
        .bind(&calendar.external_id)
        .bind(&calendar.code)
        .bind(&calendar.timezone)
        .bind(calendar.is_active)
        .bind(calendar.created_at)
        .bind(calendar.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_unique_violation(e, "calendar.already.exists"))?;

        Ok(row.into())
    }

    async fn update(&self, calendar: &Calendar) -> Result<Calendar, AppError> {
        let row = sqlx::query_as::<_, CalendarRow>(&format!(
            r#"
            UPDATE calendars
            SET title = $2, description = $3, external_id = $4, timezone = $5, is_active = $6, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            CALENDAR_COLUMNS
        ))
        .bind(calendar.id)
        .bind(&calendar.title)
        .bind(&calendar.description)
        .bind(&calendar.external_id)
        .bind(&calendar.timezone)
        .bind(calendar.is_active)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("calendar.not.found".into()))?;

        Ok(row.into())
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        sqlx::query("DELETE FROM calendars WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn search(&self, request: &SearchRequest) -> Result<(Vec<Calendar>, i64), AppError> {
        let pattern = request.pattern();
        let rows = sqlx::query_as::<_, CalendarRow>(&format!(
            "SELECT {} FROM calendars WHERE title ILIKE $1 OR code ILIKE $1 ORDER BY code ASC LIMIT $2 OFFSET $3",
            CALENDAR_COLUMNS
        ))
        .bind(&pattern)
        .bind(request.limit())
        .bind(request.offset())
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM calendars WHERE title ILIKE $1 OR code ILIKE $1")
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await?;

        Ok((rows.into_iter().map(Calendar::from).collect(), total))
    }
}
