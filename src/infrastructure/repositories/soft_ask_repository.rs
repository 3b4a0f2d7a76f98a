//! Soft ask aggregate repository: asks, answers, replies and votes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{
    ParentType, SoftAsk, SoftAskAnswer, SoftAskReply, SoftAskRepository, SoftAskVote, SoftAskVoteParent,
    SoftAskVoteType, Visibility,
};
use crate::shared::error::AppError;
use crate::shared::pagination::SearchRequest;

const SOFT_ASK_COLUMNS: &str = r#"
    id, title, description, tags, author_id, parent_type, parent_id, visibility, is_closed,
    deadline, total_answers, total_votes, is_deleted, created_at, updated_at
"#;

const ANSWER_COLUMNS: &str =
    "id, soft_ask_id, author_id, content, total_replies, total_votes, is_deleted, created_at, updated_at";

const REPLY_COLUMNS: &str = r#"
    id, soft_ask_id, answer_id, parent_reply_id, author_id, content, total_votes, is_deleted,
    created_at, updated_at
"#;

const VOTE_COLUMNS: &str = "id, member_id, parent_type, parent_id, vote_type, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct SoftAskRow {
    id: i64,
    title: String,
    description: String,
    tags: Option<String>,
    author_id: i64,
    parent_type: Option<String>,
    parent_id: Option<i64>,
    visibility: String,
    is_closed: bool,
    deadline: Option<DateTime<Utc>>,
    total_answers: i64,
    total_votes: i64,
    is_deleted: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SoftAskRow> for SoftAsk {
    type Error = AppError;

    fn try_from(row: SoftAskRow) -> Result<Self, Self::Error> {
        Ok(SoftAsk {
            id: row.id,
            title: row.title,
            description: row.description,
            tags: row.tags,
            author_id: row.author_id,
            parent_type: row.parent_type.as_deref().map(ParentType::from_db).transpose()?,
            parent_id: row.parent_id,
            visibility: Visibility::from_db(&row.visibility)?,
            is_closed: row.is_closed,
            deadline: row.deadline,
            total_answers: row.total_answers,
            total_votes: row.total_votes,
            is_deleted: row.is_deleted,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AnswerRow {
    id: i64,
    soft_ask_id: i64,
    author_id: i64,
    content: String,
    total_replies: i64,
    total_votes: i64,
    is_deleted: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<AnswerRow> for SoftAskAnswer {
    fn from(row: AnswerRow) -> Self {
        SoftAskAnswer {
            id: row.id,
            soft_ask_id: row.soft_ask_id,
            author_id: row.author_id,
            content: row.content,
            total_replies: row.total_replies,
            total_votes: row.total_votes,
            is_deleted: row.is_deleted,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ReplyRow {
    id: i64,
    soft_ask_id: i64,
    answer_id: i64,
    parent_reply_id: Option<i64>,
    author_id: i64,
    content: String,
    total_votes: i64,
    is_deleted: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ReplyRow> for SoftAskReply {
    fn from(row: ReplyRow) -> Self {
        SoftAskReply {
            id: row.id,
            soft_ask_id: row.soft_ask_id,
            answer_id: row.answer_id,
            parent_reply_id: row.parent_reply_id,
            author_id: row.author_id,
            content: row.content,
            total_votes: row.total_votes,
            is_deleted: row.is_deleted,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct VoteRow {
    id: i64,
    member_id: i64,
    parent_type: String,
    parent_id: i64,
    vote_type: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<VoteRow> for SoftAskVote {
    type Error = AppError;

    fn try_from(row: VoteRow) -> Result<Self, Self::Error> {
        Ok(SoftAskVote {
            id: row.id,
            member_id: row.member_id,
            parent_type: SoftAskVoteParent::from_db(&row.parent_type)?,
            parent_id: row.parent_id,
            vote_type: SoftAskVoteType::from_db(&row.vote_type)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Table whose `total_votes` a vote on `parent` counts towards.
fn vote_table(parent: SoftAskVoteParent) -> &'static str {
    match parent {
        SoftAskVoteParent::SoftAsk => "soft_asks",
        SoftAskVoteParent::Answer => "soft_ask_answers",
        SoftAskVoteParent::Reply => "soft_ask_replies",
    }
}

const INSERT_VOTE: &str = r#"
    INSERT INTO soft_ask_votes (id, member_id, parent_type, parent_id, vote_type, created_at, updated_at)
    VALUES ($1, $2, $3, $4, $5, NOW(), NOW())
    ON CONFLICT (member_id, parent_type, parent_id) DO NOTHING
"#;

const LOCK_VOTE: &str = r#"
    SELECT vote_type FROM soft_ask_votes
    WHERE member_id = $1 AND parent_type = $2 AND parent_id = $3
    FOR UPDATE
"#;

/// Change in vote total when moving from `previous` to `next`.
fn vote_delta(previous: Option<SoftAskVoteType>, next: SoftAskVoteType) -> i64 {
    let was_voted = matches!(previous, Some(SoftAskVoteType::Voted));
    match (was_voted, next) {
        (false, SoftAskVoteType::Voted) => 1,
        (true, SoftAskVoteType::NotVoted) => -1,
        _ => 0,
    }
}

#[derive(Clone)]
pub struct PgSoftAskRepository {
    pool: PgPool,
}

impl PgSoftAskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SoftAskRepository for PgSoftAskRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<SoftAsk>, AppError> {
        let row = sqlx::query_as::<_, SoftAskRow>(&format!(
            "SELECT {} FROM soft_asks WHERE id = $1 AND is_deleted = FALSE",
            SOFT_ASK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(SoftAsk::try_from).transpose()
    }

    async fn create(&self, soft_ask: &SoftAsk) -> Result<SoftAsk, AppError> {
        let row = sqlx::query_as::<_, SoftAskRow>(&format!(
            r#"
            INSERT INTO soft_asks (
                id, title, description, tags, author_id, parent_type, parent_id, visibility, is_closed,
                deadline, total_answers, total_votes, is_deleted, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, FALSE, $9, 0, 0, FALSE, $10, $11)
            RETURNING {}
            "#,
            SOFT_ASK_COLUMNS
        ))
        .bind(soft_ask.id)
        .bind(&soft_ask.title)
        .bind(&soft_ask.description)
        .bind(&soft_ask.tags)
        .bind(soft_ask.author_id)
        .bind(soft_ask.parent_type.map(|p| p.as_str()))
        .bind(soft_ask.parent_id)
        .bind(soft_ask.visibility.as_str())
        .bind(soft_ask.deadline)
        .bind(soft_ask.created_at)
        .bind(soft_ask.updated_at)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn update(&self, soft_ask: &SoftAsk) -> Result<SoftAsk, AppError> {
        let row = sqlx::query_as::<_, SoftAskRow>(&format!(
            r#"
            UPDATE soft_asks
            SET title = $2, description = $3, tags = $4, visibility = $5, is_closed = $6,
                deadline = $7, updated_at = NOW()
            WHERE id = $1 AND is_deleted = FALSE
            RETURNING {}
            "#,
            SOFT_ASK_COLUMNS
        ))
        .bind(soft_ask.id)
        .bind(&soft_ask.title)
        .bind(&soft_ask.description)
        .bind(&soft_ask.tags)
        .bind(soft_ask.visibility.as_str())
        .bind(soft_ask.is_closed)
        .bind(soft_ask.deadline)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("soft.ask.not.found".into()))?;

        row.try_into()
    }

    async fn soft_delete(&self, id: i64) -> Result<(), AppError> {
        sqlx::query("UPDATE soft_asks SET is_deleted = TRUE, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn search(
        &self,
        parent: Option<(ParentType, i64)>,
        request: &SearchRequest,
    ) -> Result<(Vec<SoftAsk>, i64), AppError> {
        let filter = r#"
            is_deleted = FALSE AND (title ILIKE $1 OR description ILIKE $1)
            AND ($2::varchar IS NULL OR (parent_type = $2 AND parent_id = $3))
        "#;
        let pattern = request.pattern();
        let parent_type = parent.map(|(p, _)| p.as_str());
        let parent_id = parent.map(|(_, id)| id);

        let rows = sqlx::query_as::<_, SoftAskRow>(&format!(
            "SELECT {} FROM soft_asks WHERE {} ORDER BY created_at DESC LIMIT $4 OFFSET $5",
            SOFT_ASK_COLUMNS, filter
        ))
        .bind(&pattern)
        .bind(parent_type)
        .bind(parent_id)
        .bind(request.limit())
        .bind(request.offset())
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM soft_asks WHERE {}", filter))
            .bind(&pattern)
            .bind(parent_type)
            .bind(parent_id)
            .fetch_one(&self.pool)
            .await?;

        let asks = rows.into_iter().map(SoftAsk::try_from).collect::<Result<Vec<_>, _>>()?;
        Ok((asks, total))
    }

    async fn find_answer(&self, id: i64) -> Result<Option<SoftAskAnswer>, AppError> {
        let row = sqlx::query_as::<_, AnswerRow>(&format!(
            "SELECT {} FROM soft_ask_answers WHERE id = $1 AND is_deleted = FALSE",
            ANSWER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(SoftAskAnswer::from))
    }

    async fn create_answer(&self, answer: &SoftAskAnswer) -> Result<SoftAskAnswer, AppError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, AnswerRow>(&format!(
            r#"
            INSERT INTO soft_ask_answers (
                id, soft_ask_id, author_id, content, total_replies, total_votes, is_deleted, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, 0, 0, FALSE, $5, $6)
            RETURNING {}
            "#,
            ANSWER_COLUMNS
        ))
        .bind(answer.id)
        .bind(answer.soft_ask_id)
        .bind(answer.author_id)
        .bind(&answer.content)
        .bind(answer.created_at)
        .bind(answer.updated_at)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE soft_asks SET total_answers = total_answers + 1 WHERE id = $1")
            .bind(answer.soft_ask_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(row.into())
    }

    async fn delete_answer(&self, answer: &SoftAskAnswer) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE soft_ask_answers SET is_deleted = TRUE, updated_at = NOW() WHERE id = $1 AND is_deleted = FALSE",
        )
        .bind(answer.id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() > 0 {
            sqlx::query("UPDATE soft_asks SET total_answers = GREATEST(total_answers - 1, 0) WHERE id = $1")
                .bind(answer.soft_ask_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn find_answers(
        &self,
        soft_ask_id: i64,
        request: &SearchRequest,
    ) -> Result<(Vec<SoftAskAnswer>, i64), AppError> {
        let rows = sqlx::query_as::<_, AnswerRow>(&format!(
            r#"
            SELECT {} FROM soft_ask_answers
            WHERE soft_ask_id = $1 AND is_deleted = FALSE
            ORDER BY total_votes DESC, created_at ASC
            LIMIT $2 OFFSET $3
            "#,
            ANSWER_COLUMNS
        ))
        .bind(soft_ask_id)
        .bind(request.limit())
        .bind(request.offset())
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM soft_ask_answers WHERE soft_ask_id = $1 AND is_deleted = FALSE",
        )
        .bind(soft_ask_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((rows.into_iter().map(SoftAskAnswer::from).collect(), total))
    }

    async fn find_reply(&self, id: i64) -> Result<Option<SoftAskReply>, AppError> {
        let row = sqlx::query_as::<_, ReplyRow>(&format!(
            "SELECT {} FROM soft_ask_replies WHERE id = $1 AND is_deleted = FALSE",
            REPLY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(SoftAskReply::from))
    }

    async fn create_reply(&self, reply: &SoftAskReply) -> Result<SoftAskReply, AppError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ReplyRow>(&format!(
            r#"
            INSERT INTO soft_ask_replies (
                id, soft_ask_id, answer_id, parent_reply_id, author_id, content, total_votes,
                is_deleted, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, 0, FALSE, $7, $8)
            RETURNING {}
            "#,
            REPLY_COLUMNS
        ))
        .bind(reply.id)
        .bind(reply.soft_ask_id)
        .bind(reply.answer_id)
        .bind(reply.parent_reply_id)
        .bind(reply.author_id)
        .bind(&reply.content)
        .bind(reply.created_at)
        .bind(reply.updated_at)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE soft_ask_answers SET total_replies = total_replies + 1 WHERE id = $1")
            .bind(reply.answer_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(row.into())
    }

    async fn delete_reply(&self, reply: &SoftAskReply) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE soft_ask_replies SET is_deleted = TRUE, updated_at = NOW() WHERE id = $1 AND is_deleted = FALSE",
        )
        .bind(reply.id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() > 0 {
            sqlx::query("UPDATE soft_ask_answers SET total_replies = GREATEST(total_replies - 1, 0) WHERE id = $1")
                .bind(reply.answer_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn find_replies(
        &self,
        answer_id: i64,
        request: &SearchRequest,
    ) -> Result<(Vec<SoftAskReply>, i64), AppError> {
        let rows = sqlx::query_as::<_, ReplyRow>(&format!(
            r#"
            SELECT {} FROM soft_ask_replies
            WHERE answer_id = $1 AND is_deleted = FALSE
            ORDER BY created_at ASC
            LIMIT $2 OFFSET $3
            "#,
            REPLY_COLUMNS
        ))
        .bind(answer_id)
        .bind(request.limit())
        .bind(request.offset())
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM soft_ask_replies WHERE answer_id = $1 AND is_deleted = FALSE",
        )
        .bind(answer_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((rows.into_iter().map(SoftAskReply::from).collect(), total))
    }

    async fn find_vote(
        &self,
        member_id: i64,
        parent_type: SoftAskVoteParent,
        parent_id: i64,
    ) -> Result<Option<SoftAskVote>, AppError> {
        let row = sqlx::query_as::<_, VoteRow>(&format!(
            "SELECT {} FROM soft_ask_votes WHERE member_id = $1 AND parent_type = $2 AND parent_id = $3",
            VOTE_COLUMNS
        ))
        .bind(member_id)
        .bind(parent_type.as_str())
        .bind(parent_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(SoftAskVote::try_from).transpose()
    }

    async fn save_vote(&self, vote: &SoftAskVote) -> Result<i64, AppError> {
        let mut tx = self.pool.begin().await?;

        // A racing first vote blocks on the unique index and then sees the winner's row.
        let inserted = sqlx::query(INSERT_VOTE)
            .bind(vote.id)
            .bind(vote.member_id)
            .bind(vote.parent_type.as_str())
            .bind(vote.parent_id)
            .bind(vote.vote_type.as_str())
            .execute(&mut *tx)
            .await?
            .rows_affected()
            == 1;

        let previous = if inserted {
            None
        } else {
            let previous = sqlx::query_scalar::<_, String>(LOCK_VOTE)
                .bind(vote.member_id)
                .bind(vote.parent_type.as_str())
                .bind(vote.parent_id)
                .fetch_one(&mut *tx)
                .await?;

            sqlx::query(
                r#"
                UPDATE soft_ask_votes SET vote_type = $4, updated_at = NOW()
                WHERE member_id = $1 AND parent_type = $2 AND parent_id = $3
                "#,
            )
            .bind(vote.member_id)
            .bind(vote.parent_type.as_str())
            .bind(vote.parent_id)
            .bind(vote.vote_type.as_str())
            .execute(&mut *tx)
            .await?;

            Some(SoftAskVoteType::from_db(&previous)?)
        };

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "UPDATE {} SET total_votes = GREATEST(total_votes + $2, 0) WHERE id = $1 RETURNING total_votes",
            vote_table(vote.parent_type)
        ))
        .bind(vote.parent_id)
        .bind(vote_delta(previous, vote.vote_type))
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("soft.ask.vote.parent.not.found".into()))?;

        tx.commit().await?;
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(None, SoftAskVoteType::Voted, 1 ; "first vote")]
    #[test_case(None, SoftAskVoteType::NotVoted, 0 ; "first unvote")]
    #[test_case(Some(SoftAskVoteType::Voted), SoftAskVoteType::Voted, 0 ; "repeated vote")]
    #[test_case(Some(SoftAskVoteType::Voted), SoftAskVoteType::NotVoted, -1 ; "withdrawn vote")]
    #[test_case(Some(SoftAskVoteType::NotVoted), SoftAskVoteType::Voted, 1 ; "restored vote")]
    #[test_case(Some(SoftAskVoteType::Voted), SoftAskVoteType::Voted, 0 ; "lost race for first vote")]
    fn test_vote_delta(previous: Option<SoftAskVoteType>, next: SoftAskVoteType, expected: i64) {
        assert_eq!(vote_delta(previous, next), expected);
    }

    #[test]
    fn test_first_vote_insert_never_overwrites() {
        assert!(INSERT_VOTE.contains("DO NOTHING"));
        assert!(!INSERT_VOTE.contains("DO UPDATE"));
        assert!(LOCK_VOTE.contains("FOR UPDATE"));
    }

    #[test]
    fn test_vote_table() {
        assert_eq!(vote_table(SoftAskVoteParent::SoftAsk), "soft_asks");
        assert_eq!(vote_table(SoftAskVoteParent::Answer), "soft_ask_answers");
        assert_eq!(vote_table(SoftAskVoteParent::Reply), "soft_ask_replies");
    }
}
