//! Business Repository Implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{Business, BusinessChannel, BusinessRepository, BusinessStatus};
use crate::shared::error::AppError;
use crate::shared::pagination::SearchRequest;

const BUSINESS_COLUMNS: &str = r#"
    id, owner_id, title, motto, description, channel, business_type, country, address,
    founding_year, registration_number, status, is_deleted, created_at, updated_at
"#;

#[derive(Debug, sqlx::FromRow)]
struct BusinessRow {
    id: i64,
    owner_id: i64,
    title: String,
    motto: Option<String>,
    description: String,
    channel: String,
    business_type: String,
    country: String,
    address: Option<String>,
    founding_year: Option<i32>,
    registration_number: Option<String>,
    status: String,
    is_deleted: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BusinessRow> for Business {
    type Error = AppError;

    fn try_from(row: BusinessRow) -> Result<Self, Self::Error> {
        Ok(Business {
            id: row.id,
            owner_id: row.owner_id,
            title: row.title,
            motto: row.motto,
            description: row.description,
            channel: BusinessChannel::from_db(&row.channel)?,
            business_type: row.business_type,
            country: row.country,
            address: row.address,
            founding_year: row.founding_year,
            registration_number: row.registration_number,
            status: BusinessStatus::from_db(&row.status)?,
            is_deleted: row.is_deleted,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Clone)]
pub struct PgBusinessRepository {
    pool: PgPool,
}

impl PgBusinessRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BusinessRepository for PgBusinessRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Business>, AppError> {
        let row = sqlx::query_as::<_, BusinessRow>(&format!(
            "SELECT {} FROM businesses WHERE id = $1 AND is_deleted = FALSE",
            BUSINESS_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Business::try_from).transpose()
    }

    async fn create(&self, business: &Business) -> Result<Business, AppError> {
        let row = sqlx::query_as::<_, BusinessRow>(&format!(
            r#"
            INSERT INTO businesses (
                id, owner_id, title, motto, description, channel, business_type, country, address,
                founding_year, registration_number, status, is_deleted, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, FALSE, $13, $14)
            RETURNING {}
            "#,
            BUSINESS_COLUMNS
        ))
        .bind(business.id)
        .bind(business.owner_id)
        .bind(&business.title)
        .bind(&business.motto)
        .bind(&business.description)
        .bind(business.channel.as_str())
        .bind(&business.business_type)
        .bind(&business.country)
        .bind(&business.address)
        .bind(business.founding_year)
        .bind(&business.registration_number)
        .bind(business.status.as_str())
        .bind(business.created_at)
        .bind(business.updated_at)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn update(&self, business: &Business) -> Result<Business, AppError> {
        let row = sqlx::query_as::<_, BusinessRow>(&format!(
            r#"
            UPDATE businesses
            SET title = $2, motto = $3, description = $4, channel = $5, business_type = $6,
                country = $7, address = $8, founding_year = $9, registration_number = $10,
                status = $11, updated_at = NOW()
            WHERE id = $1 AND is_deleted = FALSE
            RETURNING {}
            "#,
            BUSINESS_COLUMNS
        ))
        .bind(business.id)
        .bind(&business.title)
        .bind(&business.motto)
        .bind(&business.description)
        .bind(business.channel.as_str())
        .bind(&business.business_type)
        .bind(&business.country)
        .bind(&business.address)
        .bind(business.founding_year)
        .bind(&business.registration_number)
        .bind(business.status.as_str())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("business.not.found".into()))?;

        row.try_into()
    }

    async fn soft_delete(&self, id: i64) -> Result<(), AppError> {
        sqlx::query("UPDATE businesses SET is_deleted = TRUE, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn search(&self, request: &SearchRequest) -> Result<(Vec<Business>, i64), AppError> {
        let filter = "is_deleted = FALSE AND status = 'ACTIVE' AND (title ILIKE $1 OR business_type ILIKE $1)";
        let pattern = request.pattern();

        let rows = sqlx::query_as::<_, BusinessRow>(&format!(
            "SELECT {} FROM businesses WHERE {} ORDER BY created_at DESC LIMIT $2 OFFSET $3",
            BUSINESS_COLUMNS, filter
        ))
        .bind(&pattern)
        .bind(request.limit())
        .bind(request.offset())
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM businesses WHERE {}", filter))
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await?;

        let businesses = rows.into_iter().map(Business::try_from).collect::<Result<Vec<_>, _>>()?;
        Ok((businesses, total))
    }

    async fn find_by_owner(&self, owner_id: i64, request: &SearchRequest) -> Result<(Vec<Business>, i64), AppError> {
        let rows = sqlx::query_as::<_, BusinessRow>(&format!(
            "SELECT {} FROM businesses WHERE owner_id = $1 AND is_deleted = FALSE ORDER BY created_at DESC LIMIT $2 OFFSET $3",
            BUSINESS_COLUMNS
        ))
        .bind(owner_id)
        .bind(request.limit())
        .bind(request.offset())
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM businesses WHERE owner_id = $1 AND is_deleted = FALSE")
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await?;

        let businesses = rows.into_iter().map(Business::try_from).collect::<Result<Vec<_>, _>>()?;
        Ok((businesses, total))
    }
}
