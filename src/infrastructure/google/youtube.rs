//! YouTube Data API v3 live broadcasts.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::instrument;

use super::{endpoint, GoogleClient};
use crate::domain::entities::Oauth2ServiceType;
use crate::domain::gateways::{AccessTokenProvider, LiveBroadcastGateway, RemoteResource, RemoteSchedule};
use crate::shared::error::AppError;

const SERVICE: &str = "youtube";
const WATCH_URL: &str = "https://www.youtube.com/watch?v=";

#[derive(Debug, Deserialize)]
struct BroadcastResource {
    id: String,
}

fn broadcast_body(id: Option<&str>, schedule: &RemoteSchedule) -> Value {
    let mut body = json!({
        "snippet": {
            "title": schedule.title,
            "description": schedule.description,
            "scheduledStartTime": schedule.start.to_rfc3339(),
            "scheduledEndTime": schedule.end.to_rfc3339(),
        },
        "status": {
            "privacyStatus": if schedule.is_private { "private" } else { "public" },
            "selfDeclaredMadeForKids": schedule.made_for_kids,
        },
        "contentDetails": { "enableAutoStart": false, "enableAutoStop": false },
    });
    if let Some(id) = id {
        body["id"] = json!(id);
    }
    body
}

#[derive(Clone)]
pub struct YoutubeBroadcastGateway {
    client: GoogleClient,
    tokens: Arc<dyn AccessTokenProvider>,
}

impl YoutubeBroadcastGateway {
    pub fn new(client: GoogleClient, tokens: Arc<dyn AccessTokenProvider>) -> Self {
        Self { client, tokens }
    }

    fn url(&self) -> String {
        endpoint(&self.client.settings().youtube_api_base, "liveBroadcasts")
    }

    async fn token(&self) -> Result<String, AppError> {
        self.tokens.valid_access_token(Oauth2ServiceType::Youtube).await
    }
}

#[async_trait]
impl LiveBroadcastGateway for YoutubeBroadcastGateway {
    #[instrument(skip_all)]
    async fn create_broadcast(&self, schedule: &RemoteSchedule) -> Result<Option<RemoteResource>, AppError> {
        if !self.client.sync_enabled() {
            return Ok(None);
        }

        let token = self.token().await?;
        let request = self
            .client
            .http()
            .post(self.url())
            .query(&[("part", "snippet,status,contentDetails")])
            .bearer_auth(token)
            .json(&broadcast_body(None, schedule));
        let broadcast: BroadcastResource = self.client.send_json(SERVICE, request).await?;

        Ok(Some(RemoteResource {
            link: Some(format!("{}{}", WATCH_URL, broadcast.id)),
            external_id: broadcast.id,
        }))
    }

    #[instrument(skip(self, schedule))]
    async fn update_broadcast(&self, broadcast_id: &str, schedule: &RemoteSchedule) -> Result<(), AppError> {
        if !self.client.sync_enabled() {
            return Ok(());
        }

        let token = self.token().await?;
        let request = self
            .client
            .http()
            .put(self.url())
            .query(&[("part", "snippet,status,contentDetails")])
            .bearer_auth(token)
            .json(&broadcast_body(Some(broadcast_id), schedule));
        self.client.send(SERVICE, request).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_broadcast(&self, broadcast_id: &str) -> Result<(), AppError> {
        if !self.client.sync_enabled() {
            return Ok(());
        }

        let token = self.token().await?;
        let request = self
            .client
            .http()
            .delete(self.url())
            .query(&[("id", broadcast_id)])
            .bearer_auth(token);
        self.client.send(SERVICE, request).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn test_broadcast_body_sets_privacy_and_kids_flag() {
        let start = Utc::now() + Duration::hours(3);
        let schedule = RemoteSchedule {
            title: "Live coding".into(),
            description: "Building a parser".into(),
            location: String::new(),
            timezone: "Europe/Paris".into(),
            start,
            end: start + Duration::hours(1),
            made_for_kids: true,
            is_private: false,
        };

        let body = broadcast_body(Some("abc123"), &schedule);
        assert_eq!(body["id"], "abc123");
        assert_eq!(body["status"]["privacyStatus"], "public");
        assert_eq!(body["status"]["selfDeclaredMadeForKids"], true);

        let body = broadcast_body(None, &schedule);
        assert!(body.get("id").is_none());
    }
}
