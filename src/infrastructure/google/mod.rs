//! # Google REST Clients
//!
//! Thin `reqwest` wrappers for the Google endpoints the platform mirrors
//! data to: OAuth2 tokens, Calendar, Chat and the YouTube Data API.
//!
//! Every gateway short-circuits when `google.sync_enabled` is false, so a
//! development deployment never needs Google credentials.

mod calendar;
mod chat;
mod oauth2;
mod youtube;

pub use calendar::GoogleCalendarGateway;
pub use chat::GoogleChatGateway;
pub use oauth2::GoogleOAuth2Client;
pub use youtube::YoutubeBroadcastGateway;

use std::sync::Arc;

use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::config::GoogleSettings;
use crate::infrastructure::metrics::record_external_call;
use crate::shared::error::AppError;

const REQUEST_FAILED: &str = "google.request.failed";

/// Shared HTTP client and Google configuration.
#[derive(Clone)]
pub struct GoogleClient {
    http: reqwest::Client,
    settings: Arc<GoogleSettings>,
}

impl GoogleClient {
    pub fn new(http: reqwest::Client, settings: GoogleSettings) -> Self {
        Self {
            http,
            settings: Arc::new(settings),
        }
    }

    pub fn settings(&self) -> &GoogleSettings {
        &self.settings
    }

    pub fn sync_enabled(&self) -> bool {
        self.settings.sync_enabled
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Send a request; transport failures become `Upstream`.
    async fn dispatch(&self, service: &'static str, request: RequestBuilder) -> Result<Response, AppError> {
        request.send().await.map_err(|e| {
            record_external_call(service, false);
            warn!(service, error = %e, "Google request could not be sent");
            AppError::Upstream(REQUEST_FAILED.into())
        })
    }

    /// Send a request and require a 2xx status.
    async fn send(&self, service: &'static str, request: RequestBuilder) -> Result<Response, AppError> {
        let response = self.dispatch(service, request).await?;
        let status = response.status();
        record_external_call(service, status.is_success());

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        warn!(service, %status, body = %body, "Google request failed");
        Err(AppError::Upstream(REQUEST_FAILED.into()))
    }

    /// Send a request and decode the JSON body.
    async fn send_json<T: DeserializeOwned>(&self, service: &'static str, request: RequestBuilder) -> Result<T, AppError> {
        let response = self.send(service, request).await?;
        response.json::<T>().await.map_err(|e| {
            warn!(service, error = %e, "Google response could not be decoded");
            AppError::Upstream(REQUEST_FAILED.into())
        })
    }
}

/// Join an API base and a path without doubling slashes.
fn endpoint(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Percent-encode a single path segment.
fn segment(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

#[cfg(test)]
pub(crate) fn test_settings() -> GoogleSettings {
    GoogleSettings {
        client_id: "client-id.apps.googleusercontent.com".into(),
        client_secret: "client-secret".into(),
        redirect_uri: "http://localhost:8080/api/oauth2/verify-authorization-code".into(),
        authorization_uri: "https://accounts.google.com/o/oauth2/v2/auth".into(),
        token_uri: "https://oauth2.googleapis.com/token".into(),
        revoke_uri: "https://oauth2.googleapis.com/revoke".into(),
        calendar_api_base: "https://www.googleapis.com/calendar/v3".into(),
        chat_api_base: "https://chat.googleapis.com/v1".into(),
        youtube_api_base: "https://www.googleapis.com/youtube/v3".into(),
        sync_enabled: false,
        state_ttl_secs: 600,
        request_timeout_secs: 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("https://a.test/v1", "calendars", "https://a.test/v1/calendars")]
    #[test_case("https://a.test/v1/", "/calendars", "https://a.test/v1/calendars")]
    fn test_endpoint(base: &str, path: &str, expected: &str) {
        assert_eq!(endpoint(base, path), expected);
    }

    #[test]
    fn test_segment_encodes_reserved_characters() {
        assert_eq!(segment("abc@group.calendar.google.com"), "abc%40group.calendar.google.com");
    }
}
