//! Google Calendar v3: country calendars and their events.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::instrument;
use uuid::Uuid;

use super::{endpoint, segment, GoogleClient};
use crate::domain::entities::Oauth2ServiceType;
use crate::domain::gateways::{AccessTokenProvider, CalendarGateway, RemoteResource, RemoteSchedule};
use crate::shared::error::AppError;

const SERVICE: &str = "google_calendar";

#[derive(Debug, Deserialize)]
struct CalendarResource {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventResource {
    id: String,
    #[serde(default)]
    hangout_link: Option<String>,
    #[serde(default)]
    html_link: Option<String>,
    #[serde(default)]
    attendees: Vec<Value>,
}

/// Event body shared by create and update.
fn event_body(schedule: &RemoteSchedule) -> Value {
    json!({
        "summary": schedule.title,
        "description": schedule.description,
        "location": schedule.location,
        "visibility": if schedule.is_private { "private" } else { "public" },
        "start": { "dateTime": schedule.start.to_rfc3339(), "timeZone": schedule.timezone },
        "end": { "dateTime": schedule.end.to_rfc3339(), "timeZone": schedule.timezone },
    })
}

#[derive(Clone)]
pub struct GoogleCalendarGateway {
    client: GoogleClient,
    tokens: Arc<dyn AccessTokenProvider>,
}

impl GoogleCalendarGateway {
    pub fn new(client: GoogleClient, tokens: Arc<dyn AccessTokenProvider>) -> Self {
        Self { client, tokens }
    }

    fn url(&self, path: &str) -> String {
        endpoint(&self.client.settings().calendar_api_base, path)
    }

    async fn token(&self) -> Result<String, AppError> {
        self.tokens.valid_access_token(Oauth2ServiceType::GoogleCalendar).await
    }

    async fn fetch_event(&self, calendar_id: &str, event_id: &str) -> Result<EventResource, AppError> {
        let token = self.token().await?;
        let request = self
            .client
            .http()
            .get(self.url(&format!("calendars/{}/events/{}", segment(calendar_id), segment(event_id))))
            .bearer_auth(token);
        self.client.send_json(SERVICE, request).await
    }

    async fn patch_event(&self, calendar_id: &str, event_id: &str, body: Value) -> Result<(), AppError> {
        let token = self.token().await?;
        let request = self
            .client
            .http()
            .patch(self.url(&format!("calendars/{}/events/{}", segment(calendar_id), segment(event_id))))
            .query(&[("sendUpdates", "all")])
            .bearer_auth(token)
            .json(&body);
        self.client.send(SERVICE, request).await?;
        Ok(())
    }
}

#[async_trait]
impl CalendarGateway for GoogleCalendarGateway {
    #[instrument(skip(self, description))]
    async fn create_calendar(&self, title: &str, description: &str, timezone: &str) -> Result<Option<String>, AppError> {
        if !self.client.sync_enabled() {
            return Ok(None);
        }

        let token = self.token().await?;
        let request = self
            .client
            .http()
            .post(self.url("calendars"))
            .bearer_auth(token)
            .json(&json!({ "summary": title, "description": description, "timeZone": timezone }));
        let calendar: CalendarResource = self.client.send_json(SERVICE, request).await?;
        Ok(Some(calendar.id))
    }

    #[instrument(skip(self, description))]
    async fn update_calendar(&self, calendar_id: &str, title: &str, description: &str) -> Result<(), AppError> {
        if !self.client.sync_enabled() {
            return Ok(());
        }

        let token = self.token().await?;
        let request = self
            .client
            .http()
            .patch(self.url(&format!("calendars/{}", segment(calendar_id))))
            .bearer_auth(token)
            .json(&json!({ "summary": title, "description": description }));
        self.client.send(SERVICE, request).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_calendar(&self, calendar_id: &str) -> Result<(), AppError> {
        if !self.client.sync_enabled() {
            return Ok(());
        }

        let token = self.token().await?;
        let request = self
            .client
            .http()
            .delete(self.url(&format!("calendars/{}", segment(calendar_id))))
            .bearer_auth(token);
        self.client.send(SERVICE, request).await?;
        Ok(())
    }

    #[instrument(skip(self, email_address))]
    async fn share_calendar(&self, calendar_id: &str, email_address: &str) -> Result<(), AppError> {
        if !self.client.sync_enabled() {
            return Ok(());
        }

        let token = self.token().await?;
        let request = self
            .client
            .http()
            .post(self.url(&format!("calendars/{}/acl", segment(calendar_id))))
            .bearer_auth(token)
            .json(&json!({ "role": "reader", "scope": { "type": "user", "value": email_address } }));
        self.client.send(SERVICE, request).await?;
        Ok(())
    }

    #[instrument(skip(self, schedule, organizer_email))]
    async fn create_event(
        &self,
        calendar_id: &str,
        schedule: &RemoteSchedule,
        organizer_email: &str,
    ) -> Result<Option<RemoteResource>, AppError> {
        if !self.client.sync_enabled() {
            return Ok(None);
        }

        let mut body = event_body(schedule);
        body["attendees"] = json!([{ "email": organizer_email, "organizer": true, "responseStatus": "accepted" }]);
        body["conferenceData"] = json!({
            "createRequest": {
                "requestId": Uuid::new_v4().to_string(),
                "conferenceSolutionKey": { "type": "hangoutsMeet" }
            }
        });

        let token = self.token().await?;
        let request = self
            .client
            .http()
            .post(self.url(&format!("calendars/{}/events", segment(calendar_id))))
            .query(&[("conferenceDataVersion", "1"), ("sendUpdates", "all")])
            .bearer_auth(token)
            .json(&body);
        let event: EventResource = self.client.send_json(SERVICE, request).await?;

        Ok(Some(RemoteResource {
            external_id: event.id,
            link: event.hangout_link.or(event.html_link),
        }))
    }

    #[instrument(skip(self, schedule))]
    async fn update_event(&self, calendar_id: &str, event_id: &str, schedule: &RemoteSchedule) -> Result<(), AppError> {
        if !self.client.sync_enabled() {
            return Ok(());
        }
        self.patch_event(calendar_id, event_id, event_body(schedule)).await
    }

    #[instrument(skip(self))]
    async fn cancel_event(&self, calendar_id: &str, event_id: &str) -> Result<(), AppError> {
        if !self.client.sync_enabled() {
            return Ok(());
        }
        self.patch_event(calendar_id, event_id, json!({ "status": "cancelled" })).await
    }

    #[instrument(skip(self, email_address))]
    async fn add_attendee(&self, calendar_id: &str, event_id: &str, email_address: &str) -> Result<(), AppError> {
        if !self.client.sync_enabled() {
            return Ok(());
        }

        let event = self.fetch_event(calendar_id, event_id).await?;
        let already_invited = event
            .attendees
            .iter()
            .any(|a| a.get("email").and_then(Value::as_str) == Some(email_address));
        if already_invited {
            return Ok(());
        }

        let mut attendees = event.attendees;
        attendees.push(json!({ "email": email_address }));
        self.patch_event(calendar_id, &event.id, json!({ "attendees": attendees })).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::gateways::MockAccessTokenProvider;
    use crate::infrastructure::google::test_settings;
    use chrono::{Duration, Utc};

    fn schedule(is_private: bool) -> RemoteSchedule {
        let start = Utc::now() + Duration::days(1);
        RemoteSchedule {
            title: "Lagos Tech Meetup".into(),
            description: "Monthly meetup".into(),
            location: "Yaba".into(),
            timezone: "Africa/Lagos".into(),
            start,
            end: start + Duration::hours(2),
            made_for_kids: false,
            is_private,
        }
    }

    #[test]
    fn test_event_body_carries_schedule() {
        let body = event_body(&schedule(true));
        assert_eq!(body["summary"], "Lagos Tech Meetup");
        assert_eq!(body["visibility"], "private");
        assert_eq!(body["start"]["timeZone"], "Africa/Lagos");
        assert!(body["end"]["dateTime"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_disabled_sync_skips_remote_calls() {
        // No expectations: any token request would panic
        let tokens = MockAccessTokenProvider::new();
        let gateway = GoogleCalendarGateway::new(
            GoogleClient::new(reqwest::Client::new(), test_settings()),
            Arc::new(tokens),
        );

        assert_eq!(gateway.create_calendar("NG", "Nigeria", "Africa/Lagos").await.unwrap(), None);
        assert!(gateway
            .create_event("cal", &schedule(false), "organizer@fleenfeen.test")
            .await
            .unwrap()
            .is_none());
        gateway.cancel_event("cal", "evt").await.unwrap();
    }
}
