//! OAuth2 Authorization Repository Implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{Oauth2Authorization, Oauth2AuthorizationRepository, Oauth2ServiceType};
use crate::shared::error::AppError;

const AUTHORIZATION_COLUMNS: &str = r#"
    id, member_id, service_type, access_token, refresh_token, scope, token_type,
    token_expiration_time_in_millis, created_at, updated_at
"#;

#[derive(Debug, sqlx::FromRow)]
struct AuthorizationRow {
    id: i64,
    member_id: i64,
    service_type: String,
    access_token: String,
    refresh_token: Option<String>,
    scope: String,
    token_type: String,
    token_expiration_time_in_millis: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AuthorizationRow> for Oauth2Authorization {
    type Error = AppError;

    fn try_from(row: AuthorizationRow) -> Result<Self, Self::Error> {
        Ok(Oauth2Authorization {
            id: row.id,
            member_id: row.member_id,
            service_type: Oauth2ServiceType::from_db(&row.service_type)?,
            access_token: row.access_token,
            refresh_token: row.refresh_token,
            scope: row.scope,
            token_type: row.token_type,
            token_expiration_time_in_millis: row.token_expiration_time_in_millis,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Clone)]
pub struct PgOauth2AuthorizationRepository {
    pool: PgPool,
}

impl PgOauth2AuthorizationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Oauth2AuthorizationRepository for PgOauth2AuthorizationRepository {
    async fn find_by_member_and_service(
        &self,
        member_id: i64,
        service_type: Oauth2ServiceType,
    ) -> Result<Option<Oauth2Authorization>, AppError> {
        let row = sqlx::query_as::<_, AuthorizationRow>(&format!(
            "SELECT {} FROM oauth2_authorizations WHERE member_id = $1 AND service_type = $2",
            AUTHORIZATION_COLUMNS
        ))
        .bind(member_id)
        .bind(service_type.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Oauth2Authorization::try_from).transpose()
    }

    async fn find_latest_by_service(&self, service_type: Oauth2ServiceType) -> Result<Option<Oauth2Authorization>, AppError> {
        let row = sqlx::query_as::<_, AuthorizationRow>(&format!(
            "SELECT {} FROM oauth2_authorizations WHERE service_type = $1 ORDER BY updated_at DESC LIMIT 1",
            AUTHORIZATION_COLUMNS
        ))
        .bind(service_type.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Oauth2Authorization::try_from).transpose()
    }

    async fn upsert(&self, authorization: &Oauth2Authorization) -> Result<Oauth2Authorization, AppError> {
        let row = sqlx::query_as::<_, AuthorizationRow>(&format!(
            r#"
            INSERT INTO oauth2_authorizations (
                id, member_id, service_type, access_token, refresh_token, scope, token_type,
                token_expiration_time_in_millis, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW(), NOW())
            ON CONFLICT (member_id, service_type) DO UPDATE
            SET access_token = EXCLUDED.access_token,
                refresh_token = COALESCE(EXCLUDED.refresh_token, oauth2_authorizations.refresh_token),
                scope = EXCLUDED.scope,
                token_type = EXCLUDED.token_type,
                token_expiration_time_in_millis = EXCLUDED.token_expiration_time_in_millis,
                updated_at = NOW()
            RETURNING {}
            "#,
            AUTHORIZATION_COLUMNS
        ))
        .bind(authorization.id)
        .bind(authorization.member_id)
        .bind(authorization.service_type.as_str())
        .bind(&authorization.access_token)
        .bind(&authorization.refresh_token)
        .bind(&authorization.scope)
        .bind(&authorization.token_type)
        .bind(authorization.token_expiration_time_in_millis)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        sqlx::query("DELETE FROM oauth2_authorizations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
