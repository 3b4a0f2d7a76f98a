//! Stream Repository Implementation
//!
//! PostgreSQL implementation of the StreamRepository trait, covering both
//! `streams` and `stream_attendees`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{
    RequestToJoinStatus, Stream, StreamAttendee, StreamAttendeeView, StreamRepository, StreamSource, StreamStatus,
    StreamTimeFilter, StreamType, Visibility,
};
use crate::shared::error::AppError;
use crate::shared::pagination::SearchRequest;

const STREAM_COLUMNS: &str = r#"
    s.id, s.title, s.description, s.tags, s.location, s.timezone, s.scheduled_start_date,
    s.scheduled_end_date, s.stream_type, s.stream_source, s.visibility, s.stream_status,
    s.organizer_id, s.organizer_alias, s.organizer_email, s.organizer_phone, s.chat_space_id,
    s.external_id, s.stream_link, s.made_for_kids, s.total_attendees, s.total_likes,
    s.is_deleted, s.created_at, s.updated_at
"#;

const ATTENDEE_COLUMNS: &str = r#"
    sa.id, sa.stream_id, sa.member_id, sa.request_to_join_status, sa.is_attending,
    sa.attendee_comment, sa.organizer_comment, sa.created_at, sa.updated_at
"#;

#[derive(Debug, sqlx::FromRow)]
struct StreamRow {
    id: i64,
    title: String,
    description: String,
    tags: Option<String>,
    location: String,
    timezone: String,
    scheduled_start_date: DateTime<Utc>,
    scheduled_end_date: DateTime<Utc>,
    stream_type: String,
    stream_source: String,
    visibility: String,
    stream_status: String,
    organizer_id: i64,
    organizer_alias: Option<String>,
    organizer_email: Option<String>,
    organizer_phone: Option<String>,
    chat_space_id: Option<i64>,
    external_id: Option<String>,
    stream_link: Option<String>,
    made_for_kids: bool,
    total_attendees: i64,
    total_likes: i64,
    is_deleted: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<StreamRow> for Stream {
    type Error = AppError;

    fn try_from(row: StreamRow) -> Result<Self, Self::Error> {
        Ok(Stream {
            id: row.id,
            title: row.title,
            description: row.description,
            tags: row.tags,
            location: row.location,
            timezone: row.timezone,
            scheduled_start_date: row.scheduled_start_date,
            scheduled_end_date: row.scheduled_end_date,
            stream_type: StreamType::from_db(&row.stream_type)?,
            stream_source: StreamSource::from_db(&row.stream_source)?,
            visibility: Visibility::from_db(&row.visibility)?,
            stream_status: StreamStatus::from_db(&row.stream_status)?,
            organizer_id: row.organizer_id,
            organizer_alias: row.organizer_alias,
            organizer_email: row.organizer_email,
            organizer_phone: row.organizer_phone,
            chat_space_id: row.chat_space_id,
            external_id: row.external_id,
            stream_link: row.stream_link,
            made_for_kids: row.made_for_kids,
            total_attendees: row.total_attendees,
            total_likes: row.total_likes,
            is_deleted: row.is_deleted,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AttendeeRow {
    id: i64,
    stream_id: i64,
    member_id: i64,
    request_to_join_status: String,
    is_attending: bool,
    attendee_comment: Option<String>,
    organizer_comment: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AttendeeRow> for StreamAttendee {
    type Error = AppError;

    fn try_from(row: AttendeeRow) -> Result<Self, Self::Error> {
        Ok(StreamAttendee {
            id: row.id,
            stream_id: row.stream_id,
            member_id: row.member_id,
            request_to_join_status: RequestToJoinStatus::from_db(&row.request_to_join_status)?,
            is_attending: row.is_attending,
            attendee_comment: row.attendee_comment,
            organizer_comment: row.organizer_comment,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AttendeeViewRow {
    #[sqlx(flatten)]
    attendee: AttendeeRow,
    first_name: String,
    last_name: String,
    username: String,
    email_address: String,
}

impl TryFrom<AttendeeViewRow> for StreamAttendeeView {
    type Error = AppError;

    fn try_from(row: AttendeeViewRow) -> Result<Self, Self::Error> {
        Ok(StreamAttendeeView {
            attendee: row.attendee.try_into()?,
            full_name: format!("{} {}", row.first_name, row.last_name).trim().to_string(),
            username: row.username,
            email_address: row.email_address,
        })
    }
}

fn into_streams(rows: Vec<StreamRow>) -> Result<Vec<Stream>, AppError> {
    rows.into_iter().map(Stream::try_from).collect()
}

/// SQL condition for a time filter; `$2` is the reference instant.
fn time_condition(filter: Option<StreamTimeFilter>) -> &'static str {
    match filter {
        Some(StreamTimeFilter::Upcoming) => "s.scheduled_start_date > $2",
        Some(StreamTimeFilter::Past) => "s.scheduled_end_date <= $2",
        Some(StreamTimeFilter::Live) => "s.scheduled_start_date <= $2 AND s.scheduled_end_date > $2",
        None => "$2::timestamptz IS NOT NULL",
    }
}

#[derive(Clone)]
pub struct PgStreamRepository {
    pool: PgPool,
}

impl PgStreamRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_streams(
        &self,
        member_id: i64,
        filter: &str,
        request: &SearchRequest,
    ) -> Result<(Vec<Stream>, i64), AppError> {
        let pattern = request.pattern();
        let rows = sqlx::query_as::<_, StreamRow>(&format!(
            r#"
            SELECT {} FROM streams s
            WHERE s.is_deleted = FALSE AND s.title ILIKE $2 AND {}
            ORDER BY s.scheduled_start_date DESC
            LIMIT $3 OFFSET $4
            "#,
            STREAM_COLUMNS, filter
        ))
        .bind(member_id)
        .bind(&pattern)
        .bind(request.limit())
        .bind(request.offset())
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM streams s WHERE s.is_deleted = FALSE AND s.title ILIKE $2 AND {}",
            filter
        ))
        .bind(member_id)
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        Ok((into_streams(rows)?, total))
    }

    async fn find_attendee_views(
        &self,
        stream_id: i64,
        filter: &str,
        request: &SearchRequest,
    ) -> Result<(Vec<StreamAttendeeView>, i64), AppError> {
        let from = format!(
            r#"
            FROM stream_attendees sa
            JOIN members m ON m.id = sa.member_id
            WHERE sa.stream_id = $1 AND {}
              AND (m.first_name || ' ' || m.last_name ILIKE $2 OR m.username ILIKE $2)
            "#,
            filter
        );
        let pattern = request.pattern();

        let rows = sqlx::query_as::<_, AttendeeViewRow>(&format!(
            "SELECT {}, m.first_name, m.last_name, m.username, m.email_address {} \
             ORDER BY sa.created_at ASC LIMIT $3 OFFSET $4",
            ATTENDEE_COLUMNS, from
        ))
        .bind(stream_id)
        .bind(&pattern)
        .bind(request.limit())
        .bind(request.offset())
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) {}", from))
            .bind(stream_id)
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await?;

        let views = rows
            .into_iter()
            .map(StreamAttendeeView::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((views, total))
    }
}

#[async_trait]
impl StreamRepository for PgStreamRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Stream>, AppError> {
        let row = sqlx::query_as::<_, StreamRow>(&format!(
            "SELECT {} FROM streams s WHERE s.id = $1 AND s.is_deleted = FALSE",
            STREAM_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Stream::try_from).transpose()
    }

    async fn create(&self, stream: &Stream, organizer: &StreamAttendee) -> Result<Stream, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO streams (
                id, title, description, tags, location, timezone, scheduled_start_date,
                scheduled_end_date, stream_type, stream_source, visibility, stream_status,
                organizer_id, organizer_alias, organizer_email, organizer_phone, chat_space_id,
                external_id, stream_link, made_for_kids, total_attendees, total_likes, is_deleted,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17,
                    $18, $19, $20, $21, 0, FALSE, $22, $23)
            "#,
        )
        .bind(stream.id)
        .bind(&stream.title)
        .bind(&stream.description)
        .bind(&stream.tags)
        .bind(&stream.location)
        .bind(&stream.timezone)
        .bind(stream.scheduled_start_date)
        .bind(stream.scheduled_end_date)
        .bind(stream.stream_type.as_str())
        .bind(stream.stream_source.as_str())
        .bind(stream.visibility.as_str())
        .bind(stream.stream_status.as_str())
        .bind(stream.organizer_id)
        .bind(&stream.organizer_alias)
        .bind(&stream.organizer_email)
        .bind(&stream.organizer_phone)
        .bind(stream.chat_space_id)
        .bind(&stream.external_id)
        .bind(&stream.stream_link)
        .bind(stream.made_for_kids)
        .bind(stream.total_attendees)
        .bind(stream.created_at)
        .bind(stream.updated_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO stream_attendees (
                id, stream_id, member_id, request_to_join_status, is_attending, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(organizer.id)
        .bind(organizer.stream_id)
        .bind(organizer.member_id)
        .bind(organizer.request_to_join_status.as_str())
        .bind(organizer.is_attending)
        .bind(organizer.created_at)
        .bind(organizer.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.find_by_id(stream.id)
            .await?
            .ok_or_else(|| AppError::Internal("stream missing after insert".into()))
    }

    async fn update(&self, stream: &Stream) -> Result<Stream, AppError> {
        let row = sqlx::query_as::<_, StreamRow>(&format!(
            r#"
            UPDATE streams s
            SET title = $2, description = $3, tags = $4, location = $5, timezone = $6,
                scheduled_start_date = $7, scheduled_end_date = $8, visibility = $9,
                stream_status = $10, organizer_alias = $11, organizer_email = $12,
                organizer_phone = $13, external_id = $14, stream_link = $15, made_for_kids = $16,
                updated_at = NOW()
            WHERE s.id = $1 AND s.is_deleted = FALSE
            RETURNING {}
            "#,
            STREAM_COLUMNS
        ))
        .bind(stream.id)
        .bind(&stream.title)
        .bind(&stream.description)
        .bind(&stream.tags)
        .bind(&stream.location)
        .bind(&stream.timezone)
        .bind(stream.scheduled_start_date)
        .bind(stream.scheduled_end_date)
        .bind(stream.visibility.as_str())
        .bind(stream.stream_status.as_str())
        .bind(&stream.organizer_alias)
        .bind(&stream.organizer_email)
        .bind(&stream.organizer_phone)
        .bind(&stream.external_id)
        .bind(&stream.stream_link)
        .bind(stream.made_for_kids)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("stream.not.found".into()))?;

        row.try_into()
    }

    async fn soft_delete(&self, id: i64) -> Result<(), AppError> {
        sqlx::query("UPDATE streams SET is_deleted = TRUE, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn search(
        &self,
        filter: Option<StreamTimeFilter>,
        now: DateTime<Utc>,
        request: &SearchRequest,
    ) -> Result<(Vec<Stream>, i64), AppError> {
        let condition = format!(
            r#"
            s.is_deleted = FALSE AND s.stream_status = 'ACTIVE'
            AND (s.title ILIKE $1 OR s.description ILIKE $1 OR COALESCE(s.tags, '') ILIKE $1)
            AND {}
            "#,
            time_condition(filter)
        );
        let pattern = request.pattern();

        let rows = sqlx::query_as::<_, StreamRow>(&format!(
            "SELECT {} FROM streams s WHERE {} ORDER BY s.scheduled_start_date ASC LIMIT $3 OFFSET $4",
            STREAM_COLUMNS, condition
        ))
        .bind(&pattern)
        .bind(now)
        .bind(request.limit())
        .bind(request.offset())
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM streams s WHERE {}", condition))
            .bind(&pattern)
            .bind(now)
            .fetch_one(&self.pool)
            .await?;

        Ok((into_streams(rows)?, total))
    }

    async fn find_by_organizer(&self, organizer_id: i64, request: &SearchRequest) -> Result<(Vec<Stream>, i64), AppError> {
        self.find_streams(organizer_id, "s.organizer_id = $1", request).await
    }

    async fn find_attending(&self, member_id: i64, request: &SearchRequest) -> Result<(Vec<Stream>, i64), AppError> {
        self.find_streams(
            member_id,
            r#"EXISTS (
                SELECT 1 FROM stream_attendees sa
                WHERE sa.stream_id = s.id AND sa.member_id = $1
                  AND sa.request_to_join_status = 'APPROVED' AND sa.is_attending = TRUE
            )"#,
            request,
        )
        .await
    }

    async fn adjust_attendees(&self, id: i64, delta: i64) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE streams SET total_attendees = GREATEST(total_attendees + $2, 0), updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(delta)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_attendee(&self, stream_id: i64, member_id: i64) -> Result<Option<StreamAttendee>, AppError> {
        let row = sqlx::query_as::<_, AttendeeRow>(&format!(
            "SELECT {} FROM stream_attendees sa WHERE sa.stream_id = $1 AND sa.member_id = $2",
            ATTENDEE_COLUMNS
        ))
        .bind(stream_id)
        .bind(member_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(StreamAttendee::try_from).transpose()
    }

    async fn save_attendee(&self, attendee: &StreamAttendee) -> Result<StreamAttendee, AppError> {
        let row = sqlx::query_as::<_, AttendeeRow>(
            r#"
            INSERT INTO stream_attendees (
                id, stream_id, member_id, request_to_join_status, is_attending, attendee_comment,
                organizer_comment, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW())
            ON CONFLICT (stream_id, member_id) DO UPDATE
            SET request_to_join_status = EXCLUDED.request_to_join_status,
                is_attending = EXCLUDED.is_attending,
                attendee_comment = EXCLUDED.attendee_comment,
                organizer_comment = EXCLUDED.organizer_comment,
                updated_at = NOW()
            RETURNING id, stream_id, member_id, request_to_join_status, is_attending,
                      attendee_comment, organizer_comment, created_at, updated_at
            "#,
        )
        .bind(attendee.id)
        .bind(attendee.stream_id)
        .bind(attendee.member_id)
        .bind(attendee.request_to_join_status.as_str())
        .bind(attendee.is_attending)
        .bind(&attendee.attendee_comment)
        .bind(&attendee.organizer_comment)
        .bind(attendee.created_at)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn find_attendees(
        &self,
        stream_id: i64,
        request: &SearchRequest,
    ) -> Result<(Vec<StreamAttendeeView>, i64), AppError> {
        self.find_attendee_views(
            stream_id,
            "sa.request_to_join_status = 'APPROVED' AND sa.is_attending = TRUE",
            request,
        )
        .await
    }

    async fn find_join_requests(
        &self,
        stream_id: i64,
        request: &SearchRequest,
    ) -> Result<(Vec<StreamAttendeeView>, i64), AppError> {
        self.find_attendee_views(stream_id, "sa.request_to_join_status = 'PENDING'", request)
            .await
    }

    async fn find_attending_member_ids(&self, stream_id: i64) -> Result<Vec<i64>, AppError> {
        let ids = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT member_id FROM stream_attendees
            WHERE stream_id = $1 AND request_to_join_status = 'APPROVED' AND is_attending = TRUE
            "#,
        )
        .bind(stream_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_condition_binds_reference_instant() {
        for filter in [None, Some(StreamTimeFilter::Upcoming), Some(StreamTimeFilter::Past), Some(StreamTimeFilter::Live)] {
            assert!(time_condition(filter).contains("$2"));
        }
    }
}
