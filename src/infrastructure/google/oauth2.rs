//! Google OAuth2 authorization-code flow.

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{instrument, warn};
use url::Url;

use super::{GoogleClient, REQUEST_FAILED};
use crate::domain::entities::Oauth2ServiceType;
use crate::domain::gateways::{OAuth2Client, TokenResponse};
use crate::infrastructure::metrics::record_external_call;
use crate::shared::error::AppError;

const SERVICE: &str = "google_oauth2";

#[derive(Clone)]
pub struct GoogleOAuth2Client {
    client: GoogleClient,
}

impl GoogleOAuth2Client {
    pub fn new(client: GoogleClient) -> Self {
        Self { client }
    }

    /// POST a form to the token endpoint. A 400/401 answer means the grant
    /// itself was rejected and maps to `rejected`.
    async fn token_request(&self, form: &[(&str, &str)], rejected: &'static str) -> Result<TokenResponse, AppError> {
        let settings = self.client.settings();
        let request = self.client.http().post(&settings.token_uri).form(form);
        let response = self.client.dispatch(SERVICE, request).await?;
        let status = response.status();
        record_external_call(SERVICE, status.is_success());

        if matches!(status, StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED) {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, body = %body, "Google rejected the OAuth2 grant");
            return Err(AppError::BadRequest(rejected.into()));
        }
        if !status.is_success() {
            warn!(%status, "Google token endpoint failed");
            return Err(AppError::Upstream(REQUEST_FAILED.into()));
        }

        response.json::<TokenResponse>().await.map_err(|e| {
            warn!(error = %e, "Token response could not be decoded");
            AppError::Upstream(REQUEST_FAILED.into())
        })
    }
}

#[async_trait]
impl OAuth2Client for GoogleOAuth2Client {
    fn authorization_uri(&self, service: Oauth2ServiceType, state: &str) -> String {
        let settings = self.client.settings();
        let scope = service.scopes().join(" ");
        let params = [
            ("client_id", settings.client_id.as_str()),
            ("redirect_uri", settings.redirect_uri.as_str()),
            ("response_type", "code"),
            ("scope", scope.as_str()),
            ("access_type", "offline"),
            ("prompt", "consent"),
            ("include_granted_scopes", "true"),
            ("state", state),
        ];

        match Url::parse_with_params(&settings.authorization_uri, &params) {
            Ok(url) => url.to_string(),
            // Misconfigured base: fall back to plain concatenation
            Err(_) => {
                let query: String = url::form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(params)
                    .finish();
                format!("{}?{}", settings.authorization_uri, query)
            }
        }
    }

    #[instrument(skip_all)]
    async fn exchange_code(&self, code: &str) -> Result<TokenResponse, AppError> {
        let settings = self.client.settings();
        self.token_request(
            &[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", settings.client_id.as_str()),
                ("client_secret", settings.client_secret.as_str()),
                ("redirect_uri", settings.redirect_uri.as_str()),
            ],
            "oauth2.invalid.authorization.code",
        )
        .await
    }

    #[instrument(skip_all)]
    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, AppError> {
        let settings = self.client.settings();
        self.token_request(
            &[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("client_id", settings.client_id.as_str()),
                ("client_secret", settings.client_secret.as_str()),
            ],
            "oauth2.invalid.refresh.token",
        )
        .await
    }

    #[instrument(skip_all)]
    async fn revoke(&self, token: &str) -> Result<(), AppError> {
        let request = self
            .client
            .http()
            .post(&self.client.settings().revoke_uri)
            .form(&[("token", token)]);
        self.client.send(SERVICE, request).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::google::test_settings;

    #[test]
    fn test_authorization_uri_contains_consent_parameters() {
        let client = GoogleOAuth2Client::new(GoogleClient::new(reqwest::Client::new(), test_settings()));
        let uri = client.authorization_uri(Oauth2ServiceType::GoogleCalendar, "state-123");
        let parsed = Url::parse(&uri).unwrap();
        let pairs: Vec<(String, String)> = parsed.query_pairs().into_owned().collect();

        assert!(uri.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(pairs.contains(&("access_type".into(), "offline".into())));
        assert!(pairs.contains(&("prompt".into(), "consent".into())));
        assert!(pairs.contains(&("state".into(), "state-123".into())));
        assert!(pairs.contains(&("scope".into(), "https://www.googleapis.com/auth/calendar".into())));
        assert!(pairs.contains(&("client_id".into(), "client-id.apps.googleusercontent.com".into())));
    }

    #[test]
    fn test_authorization_uri_joins_scopes_with_spaces() {
        let client = GoogleOAuth2Client::new(GoogleClient::new(reqwest::Client::new(), test_settings()));
        let uri = client.authorization_uri(Oauth2ServiceType::GoogleChat, "s");
        let parsed = Url::parse(&uri).unwrap();
        let scope = parsed
            .query_pairs()
            .find(|(k, _)| k == "scope")
            .map(|(_, v)| v.into_owned())
            .unwrap();
        assert_eq!(scope.split(' ').count(), 2);
    }
}
