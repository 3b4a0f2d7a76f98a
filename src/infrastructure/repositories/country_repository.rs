//! Country Repository Implementation

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::{Country, CountryRepository};
use crate::shared::error::AppError;
use crate::shared::pagination::SearchRequest;

#[derive(Debug, sqlx::FromRow)]
struct CountryRow {
    id: i64,
    title: String,
    code: String,
    timezone: String,
}

impl From<CountryRow> for Country {
    fn from(row: CountryRow) -> Self {
        Country {
            id: row.id,
            title: row.title,
            code: row.code,
            timezone: row.timezone,
        }
    }
}

#[derive(Clone)]
pub struct PgCountryRepository {
    pool: PgPool,
}

impl PgCountryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CountryRepository for PgCountryRepository {
    async fn find_by_code(&self, code: &str) -> Result<Option<Country>, AppError> {
        let row = sqlx::query_as::<_, CountryRow>(
            "SELECT id, title, code, timezone FROM countries WHERE code = UPPER($1)",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Country::from))
    }

    async fn search(&self, request: &SearchRequest) -> Result<(Vec<Country>, i64), AppError> {
        let pattern = request.pattern();
        let rows = sqlx::query_as::<_, CountryRow>(
            r#"
            SELECT id, title, code, timezone FROM countries
            WHERE title ILIKE $1
            ORDER BY title ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(&pattern)
        .bind(request.limit())
        .bind(request.offset())
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM countries WHERE title ILIKE $1")
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await?;

        Ok((rows.into_iter().map(Country::from).collect(), total))
    }
}
