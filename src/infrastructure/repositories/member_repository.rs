//! Member Repository Implementation
//!
//! PostgreSQL implementation of the MemberRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use crate::domain::{Gender, Member, MemberRepository, ProfileStatus, Role, VerificationStatus};
use crate::shared::error::AppError;
use crate::shared::pagination::SearchRequest;

const MEMBER_COLUMNS: &str = r#"
    id, email_address, username, first_name, last_name, password_hash, phone_number,
    profile_photo_url, country, date_of_birth, gender, profile_status, verification_status,
    roles, created_at, updated_at
"#;

/// Database row representation matching the members table schema.
#[derive(Debug, sqlx::FromRow)]
struct MemberRow {
    id: i64,
    email_address: String,
    username: String,
    first_name: String,
    last_name: String,
    password_hash: String,
    phone_number: Option<String>,
    profile_photo_url: Option<String>,
    country: Option<String>,
    date_of_birth: Option<NaiveDate>,
    gender: Option<String>,
    profile_status: String,
    verification_status: String,
    roles: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<MemberRow> for Member {
    type Error = AppError;

    fn try_from(row: MemberRow) -> Result<Self, Self::Error> {
        Ok(Member {
            id: row.id,
            email_address: row.email_address,
            username: row.username,
            first_name: row.first_name,
            last_name: row.last_name,
            password_hash: row.password_hash,
            phone_number: row.phone_number,
            profile_photo_url: row.profile_photo_url,
            country: row.country,
            date_of_birth: row.date_of_birth,
            gender: row.gender.as_deref().map(Gender::from_db).transpose()?,
            profile_status: ProfileStatus::from_db(&row.profile_status)?,
            verification_status: VerificationStatus::from_db(&row.verification_status)?,
            roles: row
                .roles
                .iter()
                .map(|r| Role::from_db(r))
                .collect::<Result<Vec<_>, _>>()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// PostgreSQL member repository implementation.
#[derive(Clone)]
pub struct PgMemberRepository {
    pool: PgPool,
}

impl PgMemberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_by(&self, column: &str, value: &str) -> Result<Option<Member>, AppError> {
        let sql = format!("SELECT {} FROM members WHERE {} = $1", MEMBER_COLUMNS, column);
        let row = sqlx::query_as::<_, MemberRow>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Member::try_from).transpose()
    }
}

#[async_trait]
impl MemberRepository for PgMemberRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Member>, AppError> {
        let sql = format!("SELECT {} FROM members WHERE id = $1", MEMBER_COLUMNS);
        let row = sqlx::query_as::<_, MemberRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Member::try_from).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Member>, AppError> {
        self.fetch_one_by("LOWER(email_address)", &email.to_lowercase()).await
    }

    async fn email_exists(&self, email: &str) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM members WHERE LOWER(email_address) = LOWER($1))",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn username_exists(&self, username: &str) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM members WHERE LOWER(username) = LOWER($1))",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn create(&self, member: &Member) -> Result<Member, AppError> {
        let sql = format!(
            r#"
            INSERT INTO members (
                id, email_address, username, first_name, last_name, password_hash, phone_number,
                profile_photo_url, country, date_of_birth, gender, profile_status,
                verification_status, roles, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING {}
            "#,
            MEMBER_COLUMNS
        );
        let roles: Vec<&str> = member.roles.iter().map(|r| r.as_str()).collect();

        let row = sqlx::query_as::<_, MemberRow>(&sql)
            .bind(member.id)
            .bind(&member.email_address)
            .bind(&member.username)
            .bind(&member.first_name)
            .bind(&member.last_name)
            .bind(&member.password_hash)
            .bind(&member.phone_number)
            .bind(&member.profile_photo_url)
            .bind(&member.country)
            .bind(member.date_of_birth)
            .bind(member.gender.map(|g| g.as_str()))
            .bind(member.profile_status.as_str())
            .bind(member.verification_status.as_str())
            .bind(&roles)
            .bind(member.created_at)
            .bind(member.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::from_unique_violation(e, "member.email.or.username.exists"))?;

        row.try_into()
    }

    async fn update_profile(&self, member: &Member) -> Result<Member, AppError> {
        let sql = format!(
            r#"
            UPDATE members
            SET first_name = $2, last_name = $3, phone_number = $4, profile_photo_url = $5,
                country = $6, date_of_birth = $7, gender = $8, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            MEMBER_COLUMNS
        );

        let row = sqlx::query_as::<_, MemberRow>(&sql)
            .bind(member.id)
            .bind(&member.first_name)
            .bind(&member.last_name)
            .bind(&member.phone_number)
            .bind(&member.profile_photo_url)
            .bind(&member.country)
            .bind(member.date_of_birth)
            .bind(member.gender.map(|g| g.as_str()))
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("member.not.found".into()))?;

        row.try_into()
    }

    async fn update_password(&self, id: i64, password_hash: &str) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE members SET password_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("member.not.found".into()));
        }
        Ok(())
    }

    async fn search(&self, request: &SearchRequest) -> Result<(Vec<Member>, i64), AppError> {
        let filter = r#"
            profile_status <> 'BANNED'
            AND (first_name || ' ' || last_name ILIKE $1 OR username ILIKE $1 OR email_address ILIKE $1)
        "#;
        let sql = format!(
            "SELECT {} FROM members WHERE {} ORDER BY created_at DESC LIMIT $2 OFFSET $3",
            MEMBER_COLUMNS, filter
        );
        let pattern = request.pattern();

        let rows = sqlx::query_as::<_, MemberRow>(&sql)
            .bind(&pattern)
            .bind(request.limit())
            .bind(request.offset())
            .fetch_all(&self.pool)
            .await?;

        let total = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM members WHERE {}", filter))
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await?;

        let members = rows.into_iter().map(Member::try_from).collect::<Result<Vec<_>, _>>()?;
        Ok((members, total))
    }
}
