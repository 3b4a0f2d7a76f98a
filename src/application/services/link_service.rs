//! Link Service
//!
//! External links of chat spaces (managed by their admins) and businesses
//! (managed by their owners).

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument};

use crate::application::dto::engagement::{LinkResponse, UpdateLinksRequest};
use crate::domain::{BusinessRepository, ChatSpaceRepository, Link, LinkRepository, ParentType};
use crate::shared::error::AppError;
use crate::shared::snowflake::SnowflakeGenerator;

#[async_trait]
pub trait LinkService: Send + Sync {
    async fn update_chat_space_links(
        &self,
        member_id: i64,
        chat_space_id: i64,
        request: UpdateLinksRequest,
    ) -> Result<Vec<LinkResponse>, LinkError>;

    async fn update_business_links(
        &self,
        member_id: i64,
        business_id: i64,
        request: UpdateLinksRequest,
    ) -> Result<Vec<LinkResponse>, LinkError>;

    async fn find_links(&self, parent_type: ParentType, parent_id: i64) -> Result<Vec<LinkResponse>, LinkError>;
}

#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error("Link type listed twice")]
    DuplicateType,

    #[error("Chat space not found")]
    ChatSpaceNotFound,

    #[error("Business not found")]
    BusinessNotFound,

    #[error("Links of {0} are not supported")]
    UnsupportedParent(ParentType),

    #[error("Not allowed to manage these links")]
    NotAllowed,

    #[error(transparent)]
    Repository(#[from] AppError),
}

impl From<LinkError> for AppError {
    fn from(err: LinkError) -> Self {
        match err {
            LinkError::DuplicateType => AppError::BadRequest("link.type.duplicate".into()),
            LinkError::ChatSpaceNotFound => AppError::NotFound("chat.space.not.found".into()),
            LinkError::BusinessNotFound => AppError::NotFound("business.not.found".into()),
            LinkError::UnsupportedParent(_) => AppError::BadRequest("link.parent.type.unsupported".into()),
            LinkError::NotAllowed => AppError::Forbidden("link.not.allowed".into()),
            LinkError::Repository(e) => e,
        }
    }
}

pub struct LinkServiceImpl {
    links: Arc<dyn LinkRepository>,
    chat_spaces: Arc<dyn ChatSpaceRepository>,
    businesses: Arc<dyn BusinessRepository>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl LinkServiceImpl {
    pub fn new(
        links: Arc<dyn LinkRepository>,
        chat_spaces: Arc<dyn ChatSpaceRepository>,
        businesses: Arc<dyn BusinessRepository>,
        id_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            links,
            chat_spaces,
            businesses,
            id_generator,
        }
    }

    async fn replace(
        &self,
        parent_type: ParentType,
        parent_id: i64,
        request: UpdateLinksRequest,
    ) -> Result<Vec<LinkResponse>, LinkError> {
        let mut seen = HashSet::new();
        if !request.links.iter().all(|l| seen.insert(l.link_type)) {
            return Err(LinkError::DuplicateType);
        }

        let links: Vec<Link> = request
            .links
            .into_iter()
            .map(|entry| Link {
                id: self.id_generator.generate(),
                parent_type,
                parent_id,
                link_type: entry.link_type,
                url: entry.url,
            })
            .collect();

        let saved = self.links.replace_all(parent_type, parent_id, &links).await?;
        info!(%parent_type, parent_id, total = saved.len(), "Links updated");
        Ok(saved.into_iter().map(LinkResponse::from).collect())
    }
}

#[async_trait]
impl LinkService for LinkServiceImpl {
    #[instrument(skip(self, request))]
    async fn update_chat_space_links(
        &self,
        member_id: i64,
        chat_space_id: i64,
        request: UpdateLinksRequest,
    ) -> Result<Vec<LinkResponse>, LinkError> {
        self.chat_spaces
            .find_by_id(chat_space_id)
            .await?
            .ok_or(LinkError::ChatSpaceNotFound)?;
        let is_admin = self
            .chat_spaces
            .find_member(chat_space_id, member_id)
            .await?
            .is_some_and(|m| m.is_admin());
        if !is_admin {
            return Err(LinkError::NotAllowed);
        }
        self.replace(ParentType::ChatSpace, chat_space_id, request).await
    }

    #[instrument(skip(self, request))]
    async fn update_business_links(
        &self,
        member_id: i64,
        business_id: i64,
        request: UpdateLinksRequest,
    ) -> Result<Vec<LinkResponse>, LinkError> {
        let business = self
            .businesses
            .find_by_id(business_id)
            .await?
            .ok_or(LinkError::BusinessNotFound)?;
        if !business.is_owner(member_id) {
            return Err(LinkError::NotAllowed);
        }
        self.replace(ParentType::Business, business_id, request).await
    }

    async fn find_links(&self, parent_type: ParentType, parent_id: i64) -> Result<Vec<LinkResponse>, LinkError> {
        if !matches!(parent_type, ParentType::ChatSpace | ParentType::Business) {
            return Err(LinkError::UnsupportedParent(parent_type));
        }
        let links = self.links.find_by_parent(parent_type, parent_id).await?;
        Ok(links.into_iter().map(LinkResponse::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dto::engagement::LinkEntry;
    use crate::application::services::fixtures;
    use crate::domain::{
        LinkType, MockBusinessRepository, MockChatSpaceRepository, MockLinkRepository, RequestToJoinStatus,
    };

    fn links(types: &[LinkType]) -> UpdateLinksRequest {
        UpdateLinksRequest {
            links: types
                .iter()
                .map(|t| LinkEntry {
                    link_type: *t,
                    url: "https://fleenfeen.test".into(),
                })
                .collect(),
        }
    }

    fn service(
        links: MockLinkRepository,
        chat_spaces: MockChatSpaceRepository,
        businesses: MockBusinessRepository,
    ) -> LinkServiceImpl {
        LinkServiceImpl::new(
            Arc::new(links),
            Arc::new(chat_spaces),
            Arc::new(businesses),
            Arc::new(SnowflakeGenerator::new(1, 1)),
        )
    }

    #[tokio::test]
    async fn test_only_owner_updates_business_links() {
        let mut businesses = MockBusinessRepository::new();
        businesses.expect_find_by_id().returning(|_| Ok(Some(fixtures::business(3, 1))));

        let err = service(MockLinkRepository::new(), MockChatSpaceRepository::new(), businesses)
            .update_business_links(2, 3, links(&[LinkType::Website]))
            .await
            .unwrap_err();
        assert!(matches!(err, LinkError::NotAllowed));
    }

    #[tokio::test]
    async fn test_duplicate_link_types_rejected() {
        let mut businesses = MockBusinessRepository::new();
        businesses.expect_find_by_id().returning(|_| Ok(Some(fixtures::business(3, 1))));

        let err = service(MockLinkRepository::new(), MockChatSpaceRepository::new(), businesses)
            .update_business_links(1, 3, links(&[LinkType::X, LinkType::X]))
            .await
            .unwrap_err();
        assert!(matches!(err, LinkError::DuplicateType));
    }

    #[tokio::test]
    async fn test_plain_member_cannot_update_chat_space_links() {
        let mut chat_spaces = MockChatSpaceRepository::new();
        chat_spaces.expect_find_by_id().returning(|_| Ok(Some(fixtures::chat_space(10, 1))));
        chat_spaces
            .expect_find_member()
            .returning(|cs, m| Ok(Some(fixtures::membership(cs, m, RequestToJoinStatus::Approved))));

        let err = service(MockLinkRepository::new(), chat_spaces, MockBusinessRepository::new())
            .update_chat_space_links(5, 10, links(&[LinkType::Website]))
            .await
            .unwrap_err();
        assert!(matches!(err, LinkError::NotAllowed));
    }

    #[tokio::test]
    async fn test_admin_replaces_chat_space_links() {
        let mut chat_spaces = MockChatSpaceRepository::new();
        chat_spaces.expect_find_by_id().returning(|_| Ok(Some(fixtures::chat_space(10, 1))));
        chat_spaces.expect_find_member().returning(|cs, m| Ok(Some(fixtures::admin(cs, m))));
        let mut link_repo = MockLinkRepository::new();
        link_repo
            .expect_replace_all()
            .withf(|pt, id, links| *pt == ParentType::ChatSpace && *id == 10 && links.len() == 2)
            .returning(|_, _, links| Ok(links.to_vec()));

        let saved = service(link_repo, chat_spaces, MockBusinessRepository::new())
            .update_chat_space_links(5, 10, links(&[LinkType::Website, LinkType::Youtube]))
            .await
            .unwrap();
        assert_eq!(saved.len(), 2);
    }
}
