//! Google Chat spaces and memberships.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use super::{endpoint, segment, GoogleClient};
use crate::domain::entities::Oauth2ServiceType;
use crate::domain::gateways::{AccessTokenProvider, ChatSpaceGateway, RemoteResource};
use crate::shared::error::AppError;

const SERVICE: &str = "google_chat";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpaceResource {
    /// `spaces/{space}`
    name: String,
    #[serde(default)]
    space_uri: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MembershipResource {
    name: String,
    #[serde(default)]
    member: Option<MemberResource>,
}

#[derive(Debug, Deserialize)]
struct MemberResource {
    /// `users/{email or id}`
    name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MembershipPage {
    #[serde(default)]
    memberships: Vec<MembershipResource>,
    #[serde(default)]
    next_page_token: Option<String>,
}

/// Space names already carry the `spaces/` prefix; bare ids get it added.
fn space_path(space_name: &str) -> String {
    if space_name.starts_with("spaces/") {
        space_name.to_string()
    } else {
        format!("spaces/{}", segment(space_name))
    }
}

#[derive(Clone)]
pub struct GoogleChatGateway {
    client: GoogleClient,
    tokens: Arc<dyn AccessTokenProvider>,
}

impl GoogleChatGateway {
    pub fn new(client: GoogleClient, tokens: Arc<dyn AccessTokenProvider>) -> Self {
        Self { client, tokens }
    }

    fn url(&self, path: &str) -> String {
        endpoint(&self.client.settings().chat_api_base, path)
    }

    async fn token(&self) -> Result<String, AppError> {
        self.tokens.valid_access_token(Oauth2ServiceType::GoogleChat).await
    }

    async fn find_membership(&self, space_name: &str, email_address: &str) -> Result<Option<String>, AppError> {
        let wanted = format!("users/{}", email_address);
        let mut page_token: Option<String> = None;

        loop {
            let token = self.token().await?;
            let mut request = self
                .client
                .http()
                .get(self.url(&format!("{}/members", space_path(space_name))))
                .bearer_auth(token)
                .query(&[("pageSize", "100")]);
            if let Some(page) = &page_token {
                request = request.query(&[("pageToken", page.as_str())]);
            }

            let page: MembershipPage = self.client.send_json(SERVICE, request).await?;
            if let Some(found) = page
                .memberships
                .into_iter()
                .find(|m| m.member.as_ref().is_some_and(|u| u.name.eq_ignore_ascii_case(&wanted)))
            {
                return Ok(Some(found.name));
            }

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(next) => page_token = Some(next),
                None => return Ok(None),
            }
        }
    }
}

#[async_trait]
impl ChatSpaceGateway for GoogleChatGateway {
    #[instrument(skip(self, description))]
    async fn create_space(&self, display_name: &str, description: &str) -> Result<Option<RemoteResource>, AppError> {
        if !self.client.sync_enabled() {
            return Ok(None);
        }

        let token = self.token().await?;
        let request = self
            .client
            .http()
            .post(self.url("spaces"))
            .bearer_auth(token)
            .json(&json!({
                "spaceType": "SPACE",
                "displayName": display_name,
                "spaceDetails": { "description": description },
                "externalUserAllowed": true,
            }));
        let space: SpaceResource = self.client.send_json(SERVICE, request).await?;

        Ok(Some(RemoteResource {
            external_id: space.name,
            link: space.space_uri,
        }))
    }

    #[instrument(skip(self, description))]
    async fn update_space(&self, space_name: &str, display_name: &str, description: &str) -> Result<(), AppError> {
        if !self.client.sync_enabled() {
            return Ok(());
        }

        let token = self.token().await?;
        let request = self
            .client
            .http()
            .patch(self.url(&space_path(space_name)))
            .query(&[("updateMask", "displayName,spaceDetails")])
            .bearer_auth(token)
            .json(&json!({
                "displayName": display_name,
                "spaceDetails": { "description": description },
            }));
        self.client.send(SERVICE, request).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_space(&self, space_name: &str) -> Result<(), AppError> {
        if !self.client.sync_enabled() {
            return Ok(());
        }

        let token = self.token().await?;
        let request = self.client.http().delete(self.url(&space_path(space_name))).bearer_auth(token);
        self.client.send(SERVICE, request).await?;
        Ok(())
    }

    #[instrument(skip(self, email_address))]
    async fn add_member(&self, space_name: &str, email_address: &str) -> Result<(), AppError> {
        if !self.client.sync_enabled() {
            return Ok(());
        }

        let token = self.token().await?;
        let request = self
            .client
            .http()
            .post(self.url(&format!("{}/members", space_path(space_name))))
            .bearer_auth(token)
            .json(&json!({ "member": { "name": format!("users/{}", email_address), "type": "HUMAN" } }));
        self.client.send(SERVICE, request).await?;
        Ok(())
    }

    #[instrument(skip(self, email_address))]
    async fn remove_member(&self, space_name: &str, email_address: &str) -> Result<(), AppError> {
        if !self.client.sync_enabled() {
            return Ok(());
        }

        let Some(membership) = self.find_membership(space_name, email_address).await? else {
            return Ok(());
        };

        let token = self.token().await?;
        let request = self.client.http().delete(self.url(&membership)).bearer_auth(token);
        self.client.send(SERVICE, request).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::gateways::MockAccessTokenProvider;
    use crate::infrastructure::google::test_settings;

    #[test]
    fn test_space_path_keeps_prefixed_names() {
        assert_eq!(space_path("spaces/AAAA123"), "spaces/AAAA123");
        assert_eq!(space_path("AAAA123"), "spaces/AAAA123");
    }

    #[tokio::test]
    async fn test_disabled_sync_returns_none() {
        let gateway = GoogleChatGateway::new(
            GoogleClient::new(reqwest::Client::new(), test_settings()),
            Arc::new(MockAccessTokenProvider::new()),
        );
        assert_eq!(gateway.create_space("Rustaceans", "Weekly chat").await.unwrap(), None);
        gateway.remove_member("spaces/AAAA", "ada@fleenfeen.test").await.unwrap();
    }
}
