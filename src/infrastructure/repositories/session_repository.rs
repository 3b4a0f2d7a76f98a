//! Session Repository Implementation
//!
//! PostgreSQL implementation of the SessionRepository trait.
//! Handles member sessions for JWT refresh token management.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Session, SessionRepository};
use crate::shared::error::AppError;

/// Database row representation matching the member_sessions table schema.
#[derive(Debug, sqlx::FromRow)]
struct SessionRow {
    id: Uuid,
    member_id: i64,
    refresh_token_hash: String,
    user_agent: Option<String>,
    ip_address: Option<String>,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    last_used_at: DateTime<Utc>,
    revoked_at: Option<DateTime<Utc>>,
}

impl SessionRow {
    fn into_session(self) -> Session {
        Session {
            id: self.id,
            member_id: self.member_id,
            refresh_token_hash: self.refresh_token_hash,
            user_agent: self.user_agent,
            ip_address: self.ip_address,
            expires_at: self.expires_at,
            created_at: self.created_at,
            last_used_at: self.last_used_at,
            revoked_at: self.revoked_at,
        }
    }
}

/// PostgreSQL session repository implementation.
#[derive(Clone)]
pub struct PgSessionRepository {
    pool: PgPool,
}

impl PgSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    async fn find_by_token_hash(&self, token_hash: &str) -> Result<Option<Session>, AppError> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT id, member_id, refresh_token_hash, user_agent, ip_address,
                   expires_at, created_at, last_used_at, revoked_at
            FROM member_sessions
            WHERE refresh_token_hash = $1 AND revoked_at IS NULL
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_session()))
    }

    async fn create(&self, session: &Session) -> Result<Session, AppError> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            INSERT INTO member_sessions (
                id, member_id, refresh_token_hash, user_agent, ip_address,
                expires_at, created_at, last_used_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, member_id, refresh_token_hash, user_agent, ip_address,
                      expires_at, created_at, last_used_at, revoked_at
            "#,
        )
        .bind(session.id)
        .bind(session.member_id)
        .bind(&session.refresh_token_hash)
        .bind(&session.user_agent)
        .bind(&session.ip_address)
        .bind(session.expires_at)
        .bind(session.created_at)
        .bind(session.last_used_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_session())
    }

    async fn rotate(&self, id: Uuid, new_token_hash: &str, expires_at: DateTime<Utc>) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE member_sessions
            SET refresh_token_hash = $2, expires_at = $3, last_used_at = NOW()
            WHERE id = $1 AND revoked_at IS NULL
            "#,
        )
        .bind(id)
        .bind(new_token_hash)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Unauthorized("invalid.refresh.token".into()));
        }
        Ok(())
    }

    async fn revoke(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE member_sessions SET revoked_at = NOW() WHERE id = $1 AND revoked_at IS NULL")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn revoke_all_for_member(&self, member_id: i64, except_session_id: Option<Uuid>) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE member_sessions
            SET revoked_at = NOW()
            WHERE member_id = $1 AND revoked_at IS NULL AND ($2::uuid IS NULL OR id <> $2)
            "#,
        )
        .bind(member_id)
        .bind(except_session_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
