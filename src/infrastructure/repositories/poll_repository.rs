//! Poll Repository Implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{ParentType, Poll, PollOption, PollRepository, PollVoter, Visibility};
use crate::shared::error::AppError;
use crate::shared::pagination::SearchRequest;

const POLL_COLUMNS: &str = r#"
    id, question, description, author_id, parent_type, parent_id, visibility, is_multiple_choice,
    is_anonymous, expires_at, is_ended, total_votes, is_deleted, created_at, updated_at
"#;

#[derive(Debug, sqlx::FromRow)]
struct PollRow {
    id: i64,
    question: String,
    description: Option<String>,
    author_id: i64,
    parent_type: Option<String>,
    parent_id: Option<i64>,
    visibility: String,
    is_multiple_choice: bool,
    is_anonymous: bool,
    expires_at: DateTime<Utc>,
    is_ended: bool,
    total_votes: i64,
    is_deleted: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PollRow> for Poll {
    type Error = AppError;

    fn try_from(row: PollRow) -> Result<Self, Self::Error> {
        Ok(Poll {
            id: row.id,
            question: row.question,
            description: row.description,
            author_id: row.author_id,
            parent_type: row.parent_type.as_deref().map(ParentType::from_db).transpose()?,
            parent_id: row.parent_id,
            visibility: Visibility::from_db(&row.visibility)?,
            is_multiple_choice: row.is_multiple_choice,
            is_anonymous: row.is_anonymous,
            expires_at: row.expires_at,
            is_ended: row.is_ended,
            total_votes: row.total_votes,
            is_deleted: row.is_deleted,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OptionRow {
    id: i64,
    poll_id: i64,
    text: String,
    vote_count: i64,
    position: i32,
}

impl From<OptionRow> for PollOption {
    fn from(row: OptionRow) -> Self {
        PollOption {
            id: row.id,
            poll_id: row.poll_id,
            text: row.text,
            vote_count: row.vote_count,
            position: row.position,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct VoterRow {
    option_id: i64,
    member_id: i64,
    first_name: String,
    last_name: String,
}

impl From<VoterRow> for PollVoter {
    fn from(row: VoterRow) -> Self {
        PollVoter {
            option_id: row.option_id,
            member_id: row.member_id,
            full_name: format!("{} {}", row.first_name, row.last_name).trim().to_string(),
        }
    }
}

#[derive(Clone)]
pub struct PgPollRepository {
    pool: PgPool,
}

impl PgPollRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PollRepository for PgPollRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Poll>, AppError> {
        let row = sqlx::query_as::<_, PollRow>(&format!(
            "SELECT {} FROM polls WHERE id = $1 AND is_deleted = FALSE",
            POLL_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Poll::try_from).transpose()
    }

    async fn create(&self, poll: &Poll, options: &[PollOption]) -> Result<Poll, AppError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, PollRow>(&format!(
            r#"
            INSERT INTO polls (
                id, question, description, author_id, parent_type, parent_id, visibility,
                is_multiple_choice, is_anonymous, expires_at, is_ended, total_votes, is_deleted,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, FALSE, 0, FALSE, $11, $12)
            RETURNING {}
            "#,
            POLL_COLUMNS
        ))
        .bind(poll.id)
        .bind(&poll.question)
        .bind(&poll.description)
        .bind(poll.author_id)
        .bind(poll.parent_type.map(|p| p.as_str()))
        .bind(poll.parent_id)
        .bind(poll.visibility.as_str())
        .bind(poll.is_multiple_choice)
        .bind(poll.is_anonymous)
        .bind(poll.expires_at)
        .bind(poll.created_at)
        .bind(poll.updated_at)
        .fetch_one(&mut *tx)
        .await?;

        for option in options {
            sqlx::query("INSERT INTO poll_options (id, poll_id, text, vote_count, position) VALUES ($1, $2, $3, 0, $4)")
                .bind(option.id)
                .bind(poll.id)
                .bind(&option.text)
                .bind(option.position)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        row.try_into()
    }

    async fn find_options(&self, poll_id: i64) -> Result<Vec<PollOption>, AppError> {
        let rows = sqlx::query_as::<_, OptionRow>(
            "SELECT id, poll_id, text, vote_count, position FROM poll_options WHERE poll_id = $1 ORDER BY position",
        )
        .bind(poll_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(PollOption::from).collect())
    }

    async fn find_member_votes(&self, poll_id: i64, member_id: i64) -> Result<Vec<i64>, AppError> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT option_id FROM poll_votes WHERE poll_id = $1 AND member_id = $2 ORDER BY option_id",
        )
        .bind(poll_id)
        .bind(member_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    async fn find_voters(&self, poll_id: i64) -> Result<Vec<PollVoter>, AppError> {
        let rows = sqlx::query_as::<_, VoterRow>(
            r#"
            SELECT v.option_id, v.member_id, m.first_name, m.last_name
            FROM poll_votes v JOIN members m ON m.id = v.member_id
            WHERE v.poll_id = $1
            ORDER BY v.created_at ASC
            "#,
        )
        .bind(poll_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(PollVoter::from).collect())
    }

    async fn replace_votes(&self, poll_id: i64, member_id: i64, option_ids: &[i64]) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let previous = sqlx::query_scalar::<_, i64>(
            "DELETE FROM poll_votes WHERE poll_id = $1 AND member_id = $2 RETURNING option_id",
        )
        .bind(poll_id)
        .bind(member_id)
        .fetch_all(&mut *tx)
        .await?;

        if !previous.is_empty() {
            sqlx::query("UPDATE poll_options SET vote_count = GREATEST(vote_count - 1, 0) WHERE id = ANY($1)")
                .bind(&previous)
                .execute(&mut *tx)
                .await?;
        }

        for option_id in option_ids {
            sqlx::query("INSERT INTO poll_votes (poll_id, option_id, member_id, created_at) VALUES ($1, $2, $3, NOW())")
                .bind(poll_id)
                .bind(option_id)
                .bind(member_id)
                .execute(&mut *tx)
                .await?;
        }

        if !option_ids.is_empty() {
            sqlx::query("UPDATE poll_options SET vote_count = vote_count + 1 WHERE poll_id = $1 AND id = ANY($2)")
                .bind(poll_id)
                .bind(option_ids)
                .execute(&mut *tx)
                .await?;
        }

        // total_votes counts distinct voters, not ballots
        sqlx::query(
            r#"
            UPDATE polls
            SET total_votes = (SELECT COUNT(DISTINCT member_id) FROM poll_votes WHERE poll_id = $1),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(poll_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn close(&self, id: i64) -> Result<(), AppError> {
        sqlx::query("UPDATE polls SET is_ended = TRUE, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn soft_delete(&self, id: i64) -> Result<(), AppError> {
        sqlx::query("UPDATE polls SET is_deleted = TRUE, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_by_parent(
        &self,
        parent_type: ParentType,
        parent_id: i64,
        request: &SearchRequest,
    ) -> Result<(Vec<Poll>, i64), AppError> {
        let rows = sqlx::query_as::<_, PollRow>(&format!(
            r#"
            SELECT {} FROM polls
            WHERE parent_type = $1 AND parent_id = $2 AND is_deleted = FALSE
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
            POLL_COLUMNS
        ))
        .bind(parent_type.as_str())
        .bind(parent_id)
        .bind(request.limit())
        .bind(request.offset())
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM polls WHERE parent_type = $1 AND parent_id = $2 AND is_deleted = FALSE",
        )
        .bind(parent_type.as_str())
        .bind(parent_id)
        .fetch_one(&self.pool)
        .await?;

        let polls = rows.into_iter().map(Poll::try_from).collect::<Result<Vec<_>, _>>()?;
        Ok((polls, total))
    }
}
