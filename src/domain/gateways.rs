//! # External Gateways
//!
//! Contracts for everything outside the database: Google APIs, the Redis
//! event channel and the short-lived OAuth2 state store. Implementations live
//! in `infrastructure`; services only see these traits.
//!
//! Remote mirroring calls return `Ok(None)` when synchronisation is switched
//! off, so callers treat "disabled" and "nothing created" the same way.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::Oauth2ServiceType;
use crate::shared::error::AppError;

/// A remote resource created on a Google service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteResource {
    pub external_id: String,
    pub link: Option<String>,
}

/// Fields sent when mirroring a stream to a calendar or broadcast.
#[derive(Debug, Clone)]
pub struct RemoteSchedule {
    pub title: String,
    pub description: String,
    pub location: String,
    pub timezone: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub made_for_kids: bool,
    pub is_private: bool,
}

/// Provides a currently valid access token for a Google service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    async fn valid_access_token(&self, service: Oauth2ServiceType) -> Result<String, AppError>;
}

/// Google Chat spaces.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatSpaceGateway: Send + Sync {
    async fn create_space(&self, display_name: &str, description: &str) -> Result<Option<RemoteResource>, AppError>;

    async fn update_space(&self, space_name: &str, display_name: &str, description: &str) -> Result<(), AppError>;

    async fn delete_space(&self, space_name: &str) -> Result<(), AppError>;

    async fn add_member(&self, space_name: &str, email_address: &str) -> Result<(), AppError>;

    async fn remove_member(&self, space_name: &str, email_address: &str) -> Result<(), AppError>;
}

/// Google Calendar: country calendars and their events.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CalendarGateway: Send + Sync {
    async fn create_calendar(&self, title: &str, description: &str, timezone: &str) -> Result<Option<String>, AppError>;

    async fn update_calendar(&self, calendar_id: &str, title: &str, description: &str) -> Result<(), AppError>;

    async fn delete_calendar(&self, calendar_id: &str) -> Result<(), AppError>;

    async fn share_calendar(&self, calendar_id: &str, email_address: &str) -> Result<(), AppError>;

    async fn create_event(
        &self,
        calendar_id: &str,
        schedule: &RemoteSchedule,
        organizer_email: &str,
    ) -> Result<Option<RemoteResource>, AppError>;

    async fn update_event(&self, calendar_id: &str, event_id: &str, schedule: &RemoteSchedule) -> Result<(), AppError>;

    async fn cancel_event(&self, calendar_id: &str, event_id: &str) -> Result<(), AppError>;

    async fn add_attendee(&self, calendar_id: &str, event_id: &str, email_address: &str) -> Result<(), AppError>;
}

/// YouTube live broadcasts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LiveBroadcastGateway: Send + Sync {
    async fn create_broadcast(&self, schedule: &RemoteSchedule) -> Result<Option<RemoteResource>, AppError>;

    async fn update_broadcast(&self, broadcast_id: &str, schedule: &RemoteSchedule) -> Result<(), AppError>;

    async fn delete_broadcast(&self, broadcast_id: &str) -> Result<(), AppError>;
}

/// Payload broadcast when a stream is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamCreatedEvent {
    pub stream_id: String,
    pub title: String,
    pub organizer_id: String,
    pub stream_type: String,
    pub scheduled_start_date: String,
}

/// Vote/answer counters pushed to clients watching a soft ask.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftAskCounters {
    pub soft_ask_id: String,
    pub parent_type: String,
    pub parent_id: String,
    pub total_votes: i64,
}

/// Fire-and-forget event channel.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn stream_created(&self, event: StreamCreatedEvent) -> Result<(), AppError>;

    async fn soft_ask_counters(&self, counters: SoftAskCounters) -> Result<(), AppError>;
}

/// What an OAuth2 `state` value is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAuthorization {
    pub member_id: i64,
    pub service_type: Oauth2ServiceType,
}

/// Short-lived storage for OAuth2 `state` values.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OAuthStateStore: Send + Sync {
    async fn save(&self, state: &str, pending: &PendingAuthorization, ttl_secs: u64) -> Result<(), AppError>;

    /// Return and delete the pending authorization; None if unknown or expired.
    async fn consume(&self, state: &str) -> Result<Option<PendingAuthorization>, AppError>;
}

/// Tokens returned by the Google token endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub expires_in: i64,
    #[serde(default)]
    pub scope: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// Google OAuth2 endpoints.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OAuth2Client: Send + Sync {
    fn authorization_uri(&self, service: Oauth2ServiceType, state: &str) -> String;

    async fn exchange_code(&self, code: &str) -> Result<TokenResponse, AppError>;

    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, AppError>;

    async fn revoke(&self, token: &str) -> Result<(), AppError>;
}
