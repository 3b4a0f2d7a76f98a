//! # reCAPTCHA Verification
//!
//! Verifies client tokens against Google's siteverify endpoint and throttles
//! clients that keep failing.

mod attempts;

pub use attempts::ReCaptchaAttemptService;

use std::sync::Arc;

use serde::Deserialize;
use tracing::{instrument, warn};

use crate::config::ReCaptchaSettings;
use crate::infrastructure::metrics::record_external_call;
use crate::shared::error::AppError;

const SERVICE: &str = "recaptcha";

/// Response body of the siteverify endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct SiteVerifyResponse {
    success: bool,
    #[serde(default)]
    score: Option<f64>,
    #[serde(default)]
    error_codes: Vec<String>,
}

impl SiteVerifyResponse {
    fn is_acceptable(&self, minimum_score: f64) -> bool {
        // v2 tokens carry no score
        self.success && self.score.map_or(true, |score| score >= minimum_score)
    }
}

#[derive(Clone)]
pub struct ReCaptchaService {
    http: reqwest::Client,
    settings: Arc<ReCaptchaSettings>,
    attempts: Arc<ReCaptchaAttemptService>,
}

impl ReCaptchaService {
    pub fn new(http: reqwest::Client, settings: ReCaptchaSettings) -> Self {
        let attempts = Arc::new(ReCaptchaAttemptService::from_settings(&settings));
        Self {
            http,
            settings: Arc::new(settings),
            attempts,
        }
    }

    pub fn attempts(&self) -> &ReCaptchaAttemptService {
        &self.attempts
    }

    /// Verify `token` for the client at `client_ip`.
    ///
    /// # Errors
    ///
    /// - `TooManyRequests("recaptcha.too.many.attempts")` while the client is blocked
    /// - `BadRequest("recaptcha.invalid")` for missing, rejected or low-score tokens
    #[instrument(skip(self, token))]
    pub async fn verify(&self, token: Option<&str>, client_ip: &str) -> Result<(), AppError> {
        if !self.settings.enabled {
            return Ok(());
        }

        if self.attempts.is_blocked(client_ip) {
            return Err(AppError::TooManyRequests("recaptcha.too.many.attempts".into()));
        }

        let token = match token.map(str::trim).filter(|t| !t.is_empty()) {
            Some(token) => token,
            None => {
                self.attempts.record_failure(client_ip);
                return Err(AppError::BadRequest("recaptcha.invalid".into()));
            }
        };

        let response = self
            .http
            .post(&self.settings.verify_uri)
            .form(&[
                ("secret", self.settings.secret.as_str()),
                ("response", token),
                ("remoteip", client_ip),
            ])
            .send()
            .await
            .and_then(|r| r.error_for_status());

        let body = match response {
            Ok(response) => response.json::<SiteVerifyResponse>().await.ok(),
            Err(e) => {
                warn!(error = %e, "reCAPTCHA siteverify request failed");
                None
            }
        };
        record_external_call(SERVICE, body.is_some());

        match body {
            Some(body) if body.is_acceptable(self.settings.minimum_score) => {
                self.attempts.record_success(client_ip);
                Ok(())
            }
            Some(body) => {
                warn!(error_codes = ?body.error_codes, score = ?body.score, "reCAPTCHA token rejected");
                self.attempts.record_failure(client_ip);
                Err(AppError::BadRequest("recaptcha.invalid".into()))
            }
            None => {
                self.attempts.record_failure(client_ip);
                Err(AppError::BadRequest("recaptcha.invalid".into()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(enabled: bool) -> ReCaptchaSettings {
        ReCaptchaSettings {
            enabled,
            secret: "secret".into(),
            // Unroutable so a real call fails fast if ever attempted
            verify_uri: "http://127.0.0.1:9/siteverify".into(),
            minimum_score: 0.5,
            max_attempts: 2,
            attempt_ttl_secs: 60,
            max_tracked_clients: 10,
        }
    }

    #[test]
    fn test_acceptable_response() {
        let ok = SiteVerifyResponse { success: true, score: Some(0.9), error_codes: vec![] };
        let low = SiteVerifyResponse { success: true, score: Some(0.1), error_codes: vec![] };
        let v2 = SiteVerifyResponse { success: true, score: None, error_codes: vec![] };
        let failed = SiteVerifyResponse { success: false, score: None, error_codes: vec!["invalid-input-response".into()] };

        assert!(ok.is_acceptable(0.5));
        assert!(!low.is_acceptable(0.5));
        assert!(v2.is_acceptable(0.5));
        assert!(!failed.is_acceptable(0.5));
    }

    #[test]
    fn test_decodes_kebab_case_error_codes() {
        let body: SiteVerifyResponse =
            serde_json::from_str(r#"{"success":false,"error-codes":["timeout-or-duplicate"]}"#).unwrap();
        assert_eq!(body.error_codes, vec!["timeout-or-duplicate".to_string()]);
    }

    #[tokio::test]
    async fn test_disabled_accepts_everything() {
        let service = ReCaptchaService::new(reqwest::Client::new(), settings(false));
        assert!(service.verify(None, "10.0.0.1").await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_token_counts_as_failure_then_blocks() {
        let service = ReCaptchaService::new(reqwest::Client::new(), settings(true));

        let first = service.verify(None, "10.0.0.1").await.unwrap_err();
        assert!(matches!(first, AppError::BadRequest(ref code) if code == "recaptcha.invalid"));
        let _ = service.verify(Some("  "), "10.0.0.1").await;

        let blocked = service.verify(Some("token"), "10.0.0.1").await.unwrap_err();
        assert!(matches!(blocked, AppError::TooManyRequests(ref code) if code == "recaptcha.too.many.attempts"));
    }
}
