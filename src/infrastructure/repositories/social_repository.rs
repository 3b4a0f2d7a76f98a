//! Member relationship repositories: contacts, followers and blocks.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{
    BlockStatus, BlockUser, BlockUserRepository, Contact, ContactRepository, ContactType, Follower,
    FollowerRepository, MemberSummary,
};
use crate::shared::error::AppError;
use crate::shared::pagination::SearchRequest;

#[derive(Debug, sqlx::FromRow)]
struct ContactRow {
    id: i64,
    member_id: i64,
    contact_type: String,
    value: String,
}

impl TryFrom<ContactRow> for Contact {
    type Error = AppError;

    fn try_from(row: ContactRow) -> Result<Self, Self::Error> {
        Ok(Contact {
            id: row.id,
            member_id: row.member_id,
            contact_type: ContactType::from_db(&row.contact_type)?,
            value: row.value,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SummaryRow {
    member_id: i64,
    first_name: String,
    last_name: String,
    username: String,
    profile_photo_url: Option<String>,
    since: DateTime<Utc>,
}

impl From<SummaryRow> for MemberSummary {
    fn from(row: SummaryRow) -> Self {
        MemberSummary {
            member_id: row.member_id,
            full_name: format!("{} {}", row.first_name, row.last_name).trim().to_string(),
            username: row.username,
            profile_photo_url: row.profile_photo_url,
            since: row.since,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct BlockRow {
    id: i64,
    initiator_id: i64,
    recipient_id: i64,
    block_status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BlockRow> for BlockUser {
    type Error = AppError;

    fn try_from(row: BlockRow) -> Result<Self, Self::Error> {
        Ok(BlockUser {
            id: row.id,
            initiator_id: row.initiator_id,
            recipient_id: row.recipient_id,
            block_status: BlockStatus::from_db(&row.block_status)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Page of member summaries reached through `join_column` of `table`,
/// filtered on `owner_column = $1`.
async fn find_summaries(
    pool: &PgPool,
    table: &str,
    owner_column: &str,
    join_column: &str,
    extra_filter: &str,
    owner_id: i64,
    request: &SearchRequest,
) -> Result<(Vec<MemberSummary>, i64), AppError> {
    let from = format!(
        "FROM {table} t JOIN members m ON m.id = t.{join_column} WHERE t.{owner_column} = $1 {extra_filter}"
    );

    let rows = sqlx::query_as::<_, SummaryRow>(&format!(
        "SELECT m.id AS member_id, m.first_name, m.last_name, m.username, m.profile_photo_url, \
         t.created_at AS since {from} ORDER BY t.created_at DESC LIMIT $2 OFFSET $3"
    ))
    .bind(owner_id)
    .bind(request.limit())
    .bind(request.offset())
    .fetch_all(pool)
    .await?;

    let total = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) {from}"))
        .bind(owner_id)
        .fetch_one(pool)
        .await?;

    Ok((rows.into_iter().map(MemberSummary::from).collect(), total))
}

#[derive(Clone)]
pub struct PgContactRepository {
    pool: PgPool,
}

impl PgContactRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContactRepository for PgContactRepository {
    async fn find_by_member(&self, member_id: i64) -> Result<Vec<Contact>, AppError> {
        let rows = sqlx::query_as::<_, ContactRow>(
            "SELECT id, member_id, contact_type, value FROM contacts WHERE member_id = $1 ORDER BY contact_type",
        )
        .bind(member_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Contact::try_from).collect()
    }

    async fn replace_all(&self, member_id: i64, contacts: &[Contact]) -> Result<Vec<Contact>, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM contacts WHERE member_id = $1")
            .bind(member_id)
            .execute(&mut *tx)
            .await?;

        for contact in contacts {
            sqlx::query("INSERT INTO contacts (id, member_id, contact_type, value) VALUES ($1, $2, $3, $4)")
                .bind(contact.id)
                .bind(member_id)
                .bind(contact.contact_type.as_str())
                .bind(&contact.value)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        self.find_by_member(member_id).await
    }
}

#[derive(Clone)]
pub struct PgFollowerRepository {
    pool: PgPool,
}

impl PgFollowerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FollowerRepository for PgFollowerRepository {
    async fn exists(&self, follower_id: i64, followed_id: i64) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM followers WHERE follower_id = $1 AND followed_id = $2)",
        )
        .bind(follower_id)
        .bind(followed_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn create(&self, follower: &Follower) -> Result<Follower, AppError> {
        sqlx::query("INSERT INTO followers (id, follower_id, followed_id, created_at) VALUES ($1, $2, $3, $4)")
            .bind(follower.id)
            .bind(follower.follower_id)
            .bind(follower.followed_id)
            .bind(follower.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::from_unique_violation(e, "follower.already.following"))?;

        Ok(follower.clone())
    }

    async fn delete(&self, follower_id: i64, followed_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM followers WHERE follower_id = $1 AND followed_id = $2")
            .bind(follower_id)
            .bind(followed_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_between(&self, a: i64, b: i64) -> Result<(), AppError> {
        sqlx::query(
            "DELETE FROM followers WHERE (follower_id = $1 AND followed_id = $2) OR (follower_id = $2 AND followed_id = $1)",
        )
        .bind(a)
        .bind(b)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_followers(&self, member_id: i64, request: &SearchRequest) -> Result<(Vec<MemberSummary>, i64), AppError> {
        find_summaries(&self.pool, "followers", "followed_id", "follower_id", "", member_id, request).await
    }

    async fn find_followings(&self, member_id: i64, request: &SearchRequest) -> Result<(Vec<MemberSummary>, i64), AppError> {
        find_summaries(&self.pool, "followers", "follower_id", "followed_id", "", member_id, request).await
    }

    async fn counts(&self, member_id: i64) -> Result<(i64, i64), AppError> {
        let counts = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM followers WHERE followed_id = $1),
                (SELECT COUNT(*) FROM followers WHERE follower_id = $1)
            "#,
        )
        .bind(member_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(counts)
    }
}

#[derive(Clone)]
pub struct PgBlockUserRepository {
    pool: PgPool,
}

impl PgBlockUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BlockUserRepository for PgBlockUserRepository {
    async fn upsert(&self, block: &BlockUser) -> Result<BlockUser, AppError> {
        let row = sqlx::query_as::<_, BlockRow>(
            r#"
            INSERT INTO block_users (id, initiator_id, recipient_id, block_status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, NOW(), NOW())
            ON CONFLICT (initiator_id, recipient_id) DO UPDATE
            SET block_status = EXCLUDED.block_status, updated_at = NOW()
            RETURNING id, initiator_id, recipient_id, block_status, created_at, updated_at
            "#,
        )
        .bind(block.id)
        .bind(block.initiator_id)
        .bind(block.recipient_id)
        .bind(block.block_status.as_str())
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn is_blocked(&self, initiator_id: i64, recipient_id: i64) -> Result<bool, AppError> {
        let blocked = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM block_users
                WHERE initiator_id = $1 AND recipient_id = $2 AND block_status = 'BLOCKED'
            )
            "#,
        )
        .bind(initiator_id)
        .bind(recipient_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(blocked)
    }

    async fn is_blocked_either_way(&self, a: i64, b: i64) -> Result<bool, AppError> {
        let blocked = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM block_users
                WHERE block_status = 'BLOCKED'
                  AND ((initiator_id = $1 AND recipient_id = $2) OR (initiator_id = $2 AND recipient_id = $1))
            )
            "#,
        )
        .bind(a)
        .bind(b)
        .fetch_one(&self.pool)
        .await?;
        Ok(blocked)
    }

    async fn find_blocked(&self, initiator_id: i64, request: &SearchRequest) -> Result<(Vec<MemberSummary>, i64), AppError> {
        find_summaries(
            &self.pool,
            "block_users",
            "initiator_id",
            "recipient_id",
            "AND t.block_status = 'BLOCKED'",
            initiator_id,
            request,
        )
        .await
    }
}
