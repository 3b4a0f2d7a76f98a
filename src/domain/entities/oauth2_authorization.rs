//! Stored Google OAuth2 authorizations.
//!
//! Maps to the `oauth2_authorizations` table, unique per (member_id, service_type).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::string_enum;
use crate::shared::error::AppError;

string_enum! {
    /// Google API a platform account has granted access to.
    pub enum Oauth2ServiceType {
        GoogleCalendar = "GOOGLE_CALENDAR",
        GoogleChat = "GOOGLE_CHAT",
        Youtube = "YOUTUBE",
    }
}

impl Oauth2ServiceType {
    /// OAuth2 scopes requested for this service.
    pub fn scopes(&self) -> &'static [&'static str] {
        match self {
            Oauth2ServiceType::GoogleCalendar => &["https://www.googleapis.com/auth/calendar"],
            Oauth2ServiceType::GoogleChat => &[
                "https://www.googleapis.com/auth/chat.spaces",
                "https://www.googleapis.com/auth/chat.memberships",
            ],
            Oauth2ServiceType::Youtube => &[
                "https://www.googleapis.com/auth/youtube",
                "https://www.googleapis.com/auth/youtube.force-ssl",
            ],
        }
    }

    /// Parse the kebab-case path segment used by the API (`google-calendar`).
    pub fn from_path(segment: &str) -> Option<Self> {
        Self::parse(&segment.replace('-', "_").to_uppercase())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Oauth2Authorization {
    pub id: i64,
    pub member_id: i64,
    pub service_type: Oauth2ServiceType,
    #[serde(skip_serializing)]
    pub access_token: String,
    #[serde(skip_serializing)]
    pub refresh_token: Option<String>,
    pub scope: String,
    pub token_type: String,
    pub token_expiration_time_in_millis: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Oauth2Authorization {
    /// Whether the access token expires within `margin_secs` of `now`.
    pub fn expires_within(&self, now: DateTime<Utc>, margin_secs: i64) -> bool {
        self.token_expiration_time_in_millis <= now.timestamp_millis() + margin_secs * 1000
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Oauth2AuthorizationRepository: Send + Sync {
    async fn find_by_member_and_service(
        &self,
        member_id: i64,
        service_type: Oauth2ServiceType,
    ) -> Result<Option<Oauth2Authorization>, AppError>;

    /// Most recently updated authorization for a service, across members.
    async fn find_latest_by_service(
        &self,
        service_type: Oauth2ServiceType,
    ) -> Result<Option<Oauth2Authorization>, AppError>;

    /// Insert or update keyed by (member_id, service_type).
    async fn upsert(&self, authorization: &Oauth2Authorization) -> Result<Oauth2Authorization, AppError>;

    async fn delete(&self, id: i64) -> Result<(), AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("google-calendar", Some(Oauth2ServiceType::GoogleCalendar) ; "calendar")]
    #[test_case("google-chat", Some(Oauth2ServiceType::GoogleChat) ; "chat")]
    #[test_case("youtube", Some(Oauth2ServiceType::Youtube) ; "youtube")]
    #[test_case("gmail", None ; "unknown")]
    fn test_from_path(segment: &str, expected: Option<Oauth2ServiceType>) {
        assert_eq!(Oauth2ServiceType::from_path(segment), expected);
    }

    #[test]
    fn test_expires_within_margin() {
        let now = Utc::now();
        let authorization = Oauth2Authorization {
            id: 1,
            member_id: 1,
            service_type: Oauth2ServiceType::Youtube,
            access_token: "a".into(),
            refresh_token: None,
            scope: String::new(),
            token_type: "Bearer".into(),
            token_expiration_time_in_millis: now.timestamp_millis() + 30_000,
            created_at: now,
            updated_at: now,
        };
        assert!(authorization.expires_within(now, 60));
        assert!(!authorization.expires_within(now, 10));
    }
}
