//! Bookmark Service

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, instrument};

use crate::application::dto::engagement::{BookmarkResponse, ParentRequest};
use crate::domain::{Bookmark, BookmarkRepository, ParentType};
use crate::shared::error::AppError;
use crate::shared::pagination::{SearchRequest, SearchResult};
use crate::shared::snowflake::SnowflakeGenerator;

/// Parent types that can be bookmarked.
pub const BOOKMARKABLE: &[ParentType] = &[ParentType::ChatSpace, ParentType::Stream, ParentType::SoftAsk];

#[async_trait]
pub trait BookmarkService: Send + Sync {
    async fn bookmark(&self, member_id: i64, request: ParentRequest) -> Result<(), BookmarkError>;

    async fn unbookmark(&self, member_id: i64, request: ParentRequest) -> Result<(), BookmarkError>;

    async fn find_bookmarks(
        &self,
        member_id: i64,
        parent_type: Option<ParentType>,
        request: &SearchRequest,
    ) -> Result<SearchResult<BookmarkResponse>, BookmarkError>;
}

#[derive(Debug, thiserror::Error)]
pub enum BookmarkError {
    #[error("{0} cannot be bookmarked")]
    UnsupportedParent(ParentType),

    #[error("Parent not found")]
    ParentNotFound,

    #[error("Already bookmarked")]
    AlreadyBookmarked,

    #[error("Bookmark not found")]
    NotFound,

    #[error(transparent)]
    Repository(#[from] AppError),
}

impl From<BookmarkError> for AppError {
    fn from(err: BookmarkError) -> Self {
        match err {
            BookmarkError::UnsupportedParent(_) => AppError::BadRequest("bookmark.parent.type.unsupported".into()),
            BookmarkError::ParentNotFound => AppError::NotFound("bookmark.parent.not.found".into()),
            BookmarkError::AlreadyBookmarked => AppError::Conflict("bookmark.already.exists".into()),
            BookmarkError::NotFound => AppError::NotFound("bookmark.not.found".into()),
            BookmarkError::Repository(e) => e,
        }
    }
}

pub struct BookmarkServiceImpl {
    repo: Arc<dyn BookmarkRepository>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl BookmarkServiceImpl {
    pub fn new(repo: Arc<dyn BookmarkRepository>, id_generator: Arc<SnowflakeGenerator>) -> Self {
        Self { repo, id_generator }
    }
}

#[async_trait]
impl BookmarkService for BookmarkServiceImpl {
    #[instrument(skip(self))]
    async fn bookmark(&self, member_id: i64, request: ParentRequest) -> Result<(), BookmarkError> {
        let ParentRequest { parent_type, parent_id } = request;
        if !BOOKMARKABLE.contains(&parent_type) {
            return Err(BookmarkError::UnsupportedParent(parent_type));
        }
        if !self.repo.parent_exists(parent_type, parent_id).await? {
            return Err(BookmarkError::ParentNotFound);
        }
        if self.repo.exists(member_id, parent_type, parent_id).await? {
            return Err(BookmarkError::AlreadyBookmarked);
        }

        let bookmark = Bookmark {
            id: self.id_generator.generate(),
            member_id,
            parent_type,
            parent_id,
            parent_title: None,
            created_at: Utc::now(),
        };
        self.repo.create(&bookmark).await?;
        info!(member_id, %parent_type, parent_id, "Bookmarked");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn unbookmark(&self, member_id: i64, request: ParentRequest) -> Result<(), BookmarkError> {
        if !self.repo.delete(member_id, request.parent_type, request.parent_id).await? {
            return Err(BookmarkError::NotFound);
        }
        info!(member_id, parent_type = %request.parent_type, parent_id = request.parent_id, "Bookmark removed");
        Ok(())
    }

    async fn find_bookmarks(
        &self,
        member_id: i64,
        parent_type: Option<ParentType>,
        request: &SearchRequest,
    ) -> Result<SearchResult<BookmarkResponse>, BookmarkError> {
        let (bookmarks, total) = self.repo.find_by_member(member_id, parent_type, request).await?;
        Ok(SearchResult::new(bookmarks, total, request).map(BookmarkResponse::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MockBookmarkRepository;
    use test_case::test_case;

    fn service(repo: MockBookmarkRepository) -> BookmarkServiceImpl {
        BookmarkServiceImpl::new(Arc::new(repo), Arc::new(SnowflakeGenerator::new(1, 1)))
    }

    #[test_case(ParentType::ChatSpace ; "chat space")]
    #[test_case(ParentType::Stream ; "stream")]
    #[test_case(ParentType::SoftAsk ; "soft ask")]
    #[tokio::test]
    async fn test_bookmark_supported_parents(parent_type: ParentType) {
        let mut repo = MockBookmarkRepository::new();
        repo.expect_parent_exists().returning(|_, _| Ok(true));
        repo.expect_exists().returning(|_, _, _| Ok(false));
        repo.expect_create()
            .withf(move |b| b.parent_type == parent_type && b.parent_id == 9)
            .times(1)
            .returning(|b| Ok(b.clone()));

        service(repo)
            .bookmark(1, ParentRequest { parent_type, parent_id: 9 })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_businesses_cannot_be_bookmarked() {
        let request = ParentRequest {
            parent_type: ParentType::Business,
            parent_id: 9,
        };
        let err = service(MockBookmarkRepository::new()).bookmark(1, request).await.unwrap_err();
        assert!(matches!(err, BookmarkError::UnsupportedParent(_)));
    }

    #[tokio::test]
    async fn test_duplicate_bookmark_conflicts() {
        let mut repo = MockBookmarkRepository::new();
        repo.expect_parent_exists().returning(|_, _| Ok(true));
        repo.expect_exists().returning(|_, _, _| Ok(true));

        let request = ParentRequest {
            parent_type: ParentType::Stream,
            parent_id: 9,
        };
        let err = service(repo).bookmark(1, request).await.unwrap_err();
        assert_eq!(AppError::from(err).status(), axum::http::StatusCode::CONFLICT);
    }
}
