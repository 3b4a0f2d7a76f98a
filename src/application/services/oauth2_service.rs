//! OAuth2 Service
//!
//! Authorization-code flow that lets platform administrators grant the
//! server access to Google Calendar, Chat and YouTube, plus the token
//! provider the Google gateways draw access tokens from.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tracing::{info, instrument, warn};

use crate::application::dto::oauth2::{AuthorizationUriResponse, Oauth2AuthorizationResponse};
use crate::domain::gateways::{AccessTokenProvider, OAuth2Client, OAuthStateStore, PendingAuthorization, TokenResponse};
use crate::domain::{Oauth2Authorization, Oauth2AuthorizationRepository, Oauth2ServiceType};
use crate::shared::error::AppError;
use crate::shared::random;
use crate::shared::snowflake::SnowflakeGenerator;

/// Access tokens expiring within this many seconds are refreshed before use.
pub const REFRESH_MARGIN_SECS: i64 = 60;

#[async_trait]
pub trait Oauth2Service: Send + Sync {
    /// Consent URL for `service`, bound to a one-time state value.
    async fn authorization_uri(
        &self,
        member_id: i64,
        service: Oauth2ServiceType,
    ) -> Result<AuthorizationUriResponse, Oauth2Error>;

    async fn verify_authorization_code(&self, code: &str, state: &str) -> Result<Oauth2AuthorizationResponse, Oauth2Error>;

    async fn refresh(&self, member_id: i64, service: Oauth2ServiceType) -> Result<Oauth2AuthorizationResponse, Oauth2Error>;

    async fn revoke(&self, member_id: i64, service: Oauth2ServiceType) -> Result<(), Oauth2Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum Oauth2Error {
    #[error("Unknown or expired state")]
    InvalidState,

    #[error("No authorization stored for {0}")]
    NotFound(Oauth2ServiceType),

    #[error("No refresh token stored for {0}")]
    NoRefreshToken(Oauth2ServiceType),

    #[error(transparent)]
    Repository(#[from] AppError),
}

impl From<Oauth2Error> for AppError {
    fn from(err: Oauth2Error) -> Self {
        match err {
            Oauth2Error::InvalidState => AppError::BadRequest("oauth2.invalid.state".into()),
            Oauth2Error::NotFound(_) => AppError::NotFound("oauth2.authorization.not.found".into()),
            Oauth2Error::NoRefreshToken(_) => AppError::NotFound("oauth2.refresh.token.not.found".into()),
            Oauth2Error::Repository(e) => e,
        }
    }
}

/// Copy a token endpoint answer onto a stored authorization. A refresh
/// token is only replaced when Google sends a new one.
fn apply_tokens(authorization: &mut Oauth2Authorization, tokens: TokenResponse, now: DateTime<Utc>) {
    authorization.access_token = tokens.access_token;
    if tokens.refresh_token.is_some() {
        authorization.refresh_token = tokens.refresh_token;
    }
    if !tokens.scope.is_empty() {
        authorization.scope = tokens.scope;
    }
    authorization.token_type = tokens.token_type;
    authorization.token_expiration_time_in_millis = (now + Duration::seconds(tokens.expires_in)).timestamp_millis();
    authorization.updated_at = now;
}

pub struct Oauth2ServiceImpl {
    repo: Arc<dyn Oauth2AuthorizationRepository>,
    client: Arc<dyn OAuth2Client>,
    states: Arc<dyn OAuthStateStore>,
    state_ttl_secs: u64,
    id_generator: Arc<SnowflakeGenerator>,
}

impl Oauth2ServiceImpl {
    pub fn new(
        repo: Arc<dyn Oauth2AuthorizationRepository>,
        client: Arc<dyn OAuth2Client>,
        states: Arc<dyn OAuthStateStore>,
        state_ttl_secs: u64,
        id_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            repo,
            client,
            states,
            state_ttl_secs,
            id_generator,
        }
    }

    async fn find(&self, member_id: i64, service: Oauth2ServiceType) -> Result<Oauth2Authorization, Oauth2Error> {
        self.repo
            .find_by_member_and_service(member_id, service)
            .await?
            .ok_or(Oauth2Error::NotFound(service))
    }
}

#[async_trait]
impl Oauth2Service for Oauth2ServiceImpl {
    #[instrument(skip(self))]
    async fn authorization_uri(
        &self,
        member_id: i64,
        service: Oauth2ServiceType,
    ) -> Result<AuthorizationUriResponse, Oauth2Error> {
        let state = random::alphanumeric(32);
        let pending = PendingAuthorization {
            member_id,
            service_type: service,
        };
        self.states.save(&state, &pending, self.state_ttl_secs).await?;

        Ok(AuthorizationUriResponse {
            authorization_uri: self.client.authorization_uri(service, &state),
        })
    }

    #[instrument(skip_all)]
    async fn verify_authorization_code(&self, code: &str, state: &str) -> Result<Oauth2AuthorizationResponse, Oauth2Error> {
        let pending = self.states.consume(state).await?.ok_or(Oauth2Error::InvalidState)?;
        let tokens = self.client.exchange_code(code).await?;
        let now = Utc::now();

        let mut authorization = match self
            .repo
            .find_by_member_and_service(pending.member_id, pending.service_type)
            .await?
        {
            Some(existing) => existing,
            None => Oauth2Authorization {
                id: self.id_generator.generate(),
                member_id: pending.member_id,
                service_type: pending.service_type,
                access_token: String::new(),
                refresh_token: None,
                scope: String::new(),
                token_type: String::new(),
                token_expiration_time_in_millis: 0,
                created_at: now,
                updated_at: now,
            },
        };
        apply_tokens(&mut authorization, tokens, now);
        let saved = self.repo.upsert(&authorization).await?;

        info!(
            member_id = saved.member_id,
            service = %saved.service_type,
            has_refresh_token = saved.refresh_token.is_some(),
            "OAuth2 authorization stored"
        );
        Ok(saved.into())
    }

    #[instrument(skip(self))]
    async fn refresh(&self, member_id: i64, service: Oauth2ServiceType) -> Result<Oauth2AuthorizationResponse, Oauth2Error> {
        let mut authorization = self.find(member_id, service).await?;
        let refresh_token = authorization
            .refresh_token
            .clone()
            .ok_or(Oauth2Error::NoRefreshToken(service))?;

        let tokens = self.client.refresh(&refresh_token).await?;
        apply_tokens(&mut authorization, tokens, Utc::now());
        let saved = self.repo.upsert(&authorization).await?;

        info!(member_id, %service, "OAuth2 access token refreshed");
        Ok(saved.into())
    }

    #[instrument(skip(self))]
    async fn revoke(&self, member_id: i64, service: Oauth2ServiceType) -> Result<(), Oauth2Error> {
        let authorization = self.find(member_id, service).await?;
        let token = authorization
            .refresh_token
            .as_deref()
            .unwrap_or(&authorization.access_token);
        if let Err(e) = self.client.revoke(token).await {
            warn!(member_id, %service, error = %e, "Remote token revocation failed");
        }
        self.repo.delete(authorization.id).await?;

        info!(member_id, %service, "OAuth2 authorization revoked");
        Ok(())
    }
}

/// Hands out access tokens from the most recently updated authorization of a
/// service, refreshing it first when it is about to expire.
pub struct Oauth2TokenProvider {
    repo: Arc<dyn Oauth2AuthorizationRepository>,
    client: Arc<dyn OAuth2Client>,
}

impl Oauth2TokenProvider {
    pub fn new(repo: Arc<dyn Oauth2AuthorizationRepository>, client: Arc<dyn OAuth2Client>) -> Self {
        Self { repo, client }
    }
}

#[async_trait]
impl AccessTokenProvider for Oauth2TokenProvider {
    async fn valid_access_token(&self, service: Oauth2ServiceType) -> Result<String, AppError> {
        let mut authorization = self.repo.find_latest_by_service(service).await?.ok_or_else(|| {
            warn!(%service, "No OAuth2 authorization stored for service");
            AppError::Upstream("oauth2.authorization.not.found".into())
        })?;

        let now = Utc::now();
        if !authorization.expires_within(now, REFRESH_MARGIN_SECS) {
            return Ok(authorization.access_token);
        }

        let Some(refresh_token) = authorization.refresh_token.clone() else {
            warn!(%service, "Access token expired and no refresh token is stored");
            return Err(AppError::Upstream("oauth2.refresh.token.not.found".into()));
        };
        let tokens = self.client.refresh(&refresh_token).await?;
        apply_tokens(&mut authorization, tokens, now);
        let saved = self.repo.upsert(&authorization).await?;

        info!(member_id = saved.member_id, %service, "Access token refreshed before use");
        Ok(saved.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::gateways::{MockOAuth2Client, MockOAuthStateStore};
    use crate::domain::MockOauth2AuthorizationRepository;
    use pretty_assertions::assert_eq;

    fn stored(expires_in_secs: i64, refresh_token: Option<&str>) -> Oauth2Authorization {
        let now = Utc::now();
        Oauth2Authorization {
            id: 1,
            member_id: 7,
            service_type: Oauth2ServiceType::GoogleCalendar,
            access_token: "old-access".into(),
            refresh_token: refresh_token.map(str::to_string),
            scope: "https://www.googleapis.com/auth/calendar".into(),
            token_type: "Bearer".into(),
            token_expiration_time_in_millis: (now + Duration::seconds(expires_in_secs)).timestamp_millis(),
            created_at: now,
            updated_at: now,
        }
    }

    fn tokens(refresh_token: Option<&str>) -> TokenResponse {
        TokenResponse {
            access_token: "new-access".into(),
            refresh_token: refresh_token.map(str::to_string),
            expires_in: 3599,
            scope: String::new(),
            token_type: "Bearer".into(),
        }
    }

    fn service(
        repo: MockOauth2AuthorizationRepository,
        client: MockOAuth2Client,
        states: MockOAuthStateStore,
    ) -> Oauth2ServiceImpl {
        Oauth2ServiceImpl::new(
            Arc::new(repo),
            Arc::new(client),
            Arc::new(states),
            600,
            Arc::new(SnowflakeGenerator::new(1, 1)),
        )
    }

    #[tokio::test]
    async fn test_authorization_uri_saves_state() {
        let mut states = MockOAuthStateStore::new();
        states
            .expect_save()
            .withf(|state, pending, ttl| {
                state.len() == 32 && pending.member_id == 7 && pending.service_type == Oauth2ServiceType::Youtube && *ttl == 600
            })
            .times(1)
            .returning(|_, _, _| Ok(()));
        let mut client = MockOAuth2Client::new();
        client
            .expect_authorization_uri()
            .returning(|_, state| format!("https://accounts.google.com/o/oauth2/v2/auth?state={state}"));

        let response = service(MockOauth2AuthorizationRepository::new(), client, states)
            .authorization_uri(7, Oauth2ServiceType::Youtube)
            .await
            .unwrap();
        assert!(response.authorization_uri.contains("state="));
    }

    #[tokio::test]
    async fn test_unknown_state_rejected() {
        let mut states = MockOAuthStateStore::new();
        states.expect_consume().returning(|_| Ok(None));

        let err = service(MockOauth2AuthorizationRepository::new(), MockOAuth2Client::new(), states)
            .verify_authorization_code("code", "forged")
            .await
            .unwrap_err();
        assert_eq!(AppError::from(err).message_key(), "oauth2.invalid.state");
    }

    #[tokio::test]
    async fn test_verify_keeps_existing_refresh_token() {
        let mut states = MockOAuthStateStore::new();
        states.expect_consume().returning(|_| {
            Ok(Some(PendingAuthorization {
                member_id: 7,
                service_type: Oauth2ServiceType::GoogleCalendar,
            }))
        });
        let mut client = MockOAuth2Client::new();
        client.expect_exchange_code().returning(|_| Ok(tokens(None)));
        let mut repo = MockOauth2AuthorizationRepository::new();
        repo.expect_find_by_member_and_service()
            .returning(|_, _| Ok(Some(stored(-10, Some("keep-me")))));
        repo.expect_upsert()
            .withf(|a| a.access_token == "new-access" && a.refresh_token.as_deref() == Some("keep-me"))
            .times(1)
            .returning(|a| Ok(a.clone()));

        let response = service(repo, client, states)
            .verify_authorization_code("code", "state")
            .await
            .unwrap();
        assert!(response.has_refresh_token);
    }

    #[tokio::test]
    async fn test_refresh_without_refresh_token() {
        let mut repo = MockOauth2AuthorizationRepository::new();
        repo.expect_find_by_member_and_service()
            .returning(|_, _| Ok(Some(stored(100, None))));

        let err = service(repo, MockOAuth2Client::new(), MockOAuthStateStore::new())
            .refresh(7, Oauth2ServiceType::GoogleCalendar)
            .await
            .unwrap_err();
        assert!(matches!(err, Oauth2Error::NoRefreshToken(_)));
    }

    #[tokio::test]
    async fn test_revoke_deletes_even_when_remote_fails() {
        let mut repo = MockOauth2AuthorizationRepository::new();
        repo.expect_find_by_member_and_service()
            .returning(|_, _| Ok(Some(stored(100, Some("refresh")))));
        repo.expect_delete().times(1).returning(|_| Ok(()));
        let mut client = MockOAuth2Client::new();
        client
            .expect_revoke()
            .returning(|_| Err(AppError::Upstream("google.request.failed".into())));

        service(repo, client, MockOAuthStateStore::new())
            .revoke(7, Oauth2ServiceType::GoogleCalendar)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_token_provider_returns_fresh_token_untouched() {
        let mut repo = MockOauth2AuthorizationRepository::new();
        repo.expect_find_latest_by_service()
            .returning(|_| Ok(Some(stored(3600, Some("refresh")))));
        repo.expect_upsert().never();

        let provider = Oauth2TokenProvider::new(Arc::new(repo), Arc::new(MockOAuth2Client::new()));
        let token = provider
            .valid_access_token(Oauth2ServiceType::GoogleCalendar)
            .await
            .unwrap();
        assert_eq!(token, "old-access");
    }

    #[tokio::test]
    async fn test_token_provider_refreshes_expiring_token() {
        let mut repo = MockOauth2AuthorizationRepository::new();
        repo.expect_find_latest_by_service()
            .returning(|_| Ok(Some(stored(30, Some("refresh")))));
        repo.expect_upsert().times(1).returning(|a| Ok(a.clone()));
        let mut client = MockOAuth2Client::new();
        client
            .expect_refresh()
            .withf(|token| token == "refresh")
            .returning(|_| Ok(tokens(None)));

        let provider = Oauth2TokenProvider::new(Arc::new(repo), Arc::new(client));
        let token = provider
            .valid_access_token(Oauth2ServiceType::GoogleCalendar)
            .await
            .unwrap();
        assert_eq!(token, "new-access");
    }
}
