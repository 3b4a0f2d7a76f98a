//! Like Service
//!
//! Likes are an idempotent toggle per (member, parent). Only chat spaces and
//! streams carry a `total_likes` counter, so only they can be liked.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, instrument};

use crate::application::dto::engagement::{LikeResponse, LikedEntryResponse, ParentRequest};
use crate::domain::{Like, LikeRepository, LikeType, ParentType};
use crate::shared::error::AppError;
use crate::shared::pagination::{SearchRequest, SearchResult};
use crate::shared::snowflake::SnowflakeGenerator;

/// Parent types that can be liked.
pub const LIKEABLE: &[ParentType] = &[ParentType::ChatSpace, ParentType::Stream];

#[async_trait]
pub trait LikeService: Send + Sync {
    async fn like(&self, member_id: i64, request: ParentRequest) -> Result<LikeResponse, LikeError>;

    async fn unlike(&self, member_id: i64, request: ParentRequest) -> Result<LikeResponse, LikeError>;

    async fn has_liked(&self, member_id: i64, parent_type: ParentType, parent_id: i64) -> Result<bool, LikeError>;

    async fn find_liked(
        &self,
        member_id: i64,
        parent_type: ParentType,
        request: &SearchRequest,
    ) -> Result<SearchResult<LikedEntryResponse>, LikeError>;
}

#[derive(Debug, thiserror::Error)]
pub enum LikeError {
    #[error("{0} cannot be liked")]
    UnsupportedParent(ParentType),

    #[error("Parent not found")]
    ParentNotFound,

    #[error(transparent)]
    Repository(#[from] AppError),
}

impl From<LikeError> for AppError {
    fn from(err: LikeError) -> Self {
        match err {
            LikeError::UnsupportedParent(_) => AppError::BadRequest("like.parent.type.unsupported".into()),
            LikeError::ParentNotFound => AppError::NotFound("like.parent.not.found".into()),
            LikeError::Repository(e) => e,
        }
    }
}

pub struct LikeServiceImpl {
    repo: Arc<dyn LikeRepository>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl LikeServiceImpl {
    pub fn new(repo: Arc<dyn LikeRepository>, id_generator: Arc<SnowflakeGenerator>) -> Self {
        Self { repo, id_generator }
    }

    fn check_parent_type(parent_type: ParentType) -> Result<(), LikeError> {
        if LIKEABLE.contains(&parent_type) {
            Ok(())
        } else {
            Err(LikeError::UnsupportedParent(parent_type))
        }
    }

    async fn toggle(&self, member_id: i64, request: ParentRequest, like_type: LikeType) -> Result<LikeResponse, LikeError> {
        let ParentRequest { parent_type, parent_id } = request;
        Self::check_parent_type(parent_type)?;
        if !self.repo.parent_exists(parent_type, parent_id).await? {
            return Err(LikeError::ParentNotFound);
        }

        let existing = self.repo.find(member_id, parent_type, parent_id).await?;
        let currently_liked = matches!(existing.as_ref().map(|l| l.like_type), Some(LikeType::Like));
        let wants_like = like_type == LikeType::Like;

        if currently_liked == wants_like {
            let total_likes = self.repo.adjust_parent_total(parent_type, parent_id, 0).await?;
            return Ok(LikeResponse {
                liked: currently_liked,
                total_likes,
            });
        }

        let now = Utc::now();
        let like = match existing {
            Some(mut like) => {
                like.like_type = like_type;
                like.updated_at = now;
                like
            }
            None => Like {
                id: self.id_generator.generate(),
                member_id,
                parent_type,
                parent_id,
                like_type,
                created_at: now,
                updated_at: now,
            },
        };
        self.repo.upsert(&like).await?;

        let delta = if wants_like { 1 } else { -1 };
        let total_likes = self.repo.adjust_parent_total(parent_type, parent_id, delta).await?;
        info!(member_id, %parent_type, parent_id, like_type = %like_type, total_likes, "Like toggled");

        Ok(LikeResponse {
            liked: wants_like,
            total_likes,
        })
    }
}

#[async_trait]
impl LikeService for LikeServiceImpl {
    #[instrument(skip(self))]
    async fn like(&self, member_id: i64, request: ParentRequest) -> Result<LikeResponse, LikeError> {
        self.toggle(member_id, request, LikeType::Like).await
    }

    #[instrument(skip(self))]
    async fn unlike(&self, member_id: i64, request: ParentRequest) -> Result<LikeResponse, LikeError> {
        self.toggle(member_id, request, LikeType::Unlike).await
    }

    async fn has_liked(&self, member_id: i64, parent_type: ParentType, parent_id: i64) -> Result<bool, LikeError> {
        let like = self.repo.find(member_id, parent_type, parent_id).await?;
        Ok(matches!(like.map(|l| l.like_type), Some(LikeType::Like)))
    }

    async fn find_liked(
        &self,
        member_id: i64,
        parent_type: ParentType,
        request: &SearchRequest,
    ) -> Result<SearchResult<LikedEntryResponse>, LikeError> {
        Self::check_parent_type(parent_type)?;
        let (likes, total) = self.repo.find_liked(member_id, parent_type, request).await?;
        Ok(SearchResult::new(likes, total, request).map(LikedEntryResponse::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MockLikeRepository;
    use mockall::predicate::eq;

    fn service(repo: MockLikeRepository) -> LikeServiceImpl {
        LikeServiceImpl::new(Arc::new(repo), Arc::new(SnowflakeGenerator::new(1, 1)))
    }

    fn request(parent_type: ParentType) -> ParentRequest {
        ParentRequest {
            parent_type,
            parent_id: 42,
        }
    }

    fn existing(like_type: LikeType) -> Like {
        let now = Utc::now();
        Like {
            id: 1,
            member_id: 7,
            parent_type: ParentType::Stream,
            parent_id: 42,
            like_type,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_soft_asks_cannot_be_liked() {
        let err = service(MockLikeRepository::new())
            .like(7, request(ParentType::SoftAsk))
            .await
            .unwrap_err();
        assert!(matches!(err, LikeError::UnsupportedParent(ParentType::SoftAsk)));
    }

    #[tokio::test]
    async fn test_first_like_increments_total() {
        let mut repo = MockLikeRepository::new();
        repo.expect_parent_exists().returning(|_, _| Ok(true));
        repo.expect_find().returning(|_, _, _| Ok(None));
        repo.expect_upsert()
            .withf(|l| l.like_type == LikeType::Like && l.member_id == 7)
            .returning(|l| Ok(l.clone()));
        repo.expect_adjust_parent_total()
            .with(eq(ParentType::Stream), eq(42), eq(1))
            .returning(|_, _, _| Ok(5));

        let response = service(repo).like(7, request(ParentType::Stream)).await.unwrap();
        assert!(response.liked);
        assert_eq!(response.total_likes, 5);
    }

    #[tokio::test]
    async fn test_repeated_like_is_idempotent() {
        let mut repo = MockLikeRepository::new();
        repo.expect_parent_exists().returning(|_, _| Ok(true));
        repo.expect_find().returning(|_, _, _| Ok(Some(existing(LikeType::Like))));
        repo.expect_upsert().never();
        repo.expect_adjust_parent_total()
            .with(eq(ParentType::Stream), eq(42), eq(0))
            .returning(|_, _, _| Ok(4));

        let response = service(repo).like(7, request(ParentType::Stream)).await.unwrap();
        assert!(response.liked);
        assert_eq!(response.total_likes, 4);
    }

    #[tokio::test]
    async fn test_unlike_decrements_total() {
        let mut repo = MockLikeRepository::new();
        repo.expect_parent_exists().returning(|_, _| Ok(true));
        repo.expect_find().returning(|_, _, _| Ok(Some(existing(LikeType::Like))));
        repo.expect_upsert()
            .withf(|l| l.id == 1 && l.like_type == LikeType::Unlike)
            .returning(|l| Ok(l.clone()));
        repo.expect_adjust_parent_total()
            .with(eq(ParentType::Stream), eq(42), eq(-1))
            .returning(|_, _, _| Ok(3));

        let response = service(repo).unlike(7, request(ParentType::Stream)).await.unwrap();
        assert!(!response.liked);
        assert_eq!(response.total_likes, 3);
    }

    #[tokio::test]
    async fn test_like_missing_parent() {
        let mut repo = MockLikeRepository::new();
        repo.expect_parent_exists().returning(|_, _| Ok(false));

        let err = service(repo).like(7, request(ParentType::ChatSpace)).await.unwrap_err();
        assert!(matches!(err, LikeError::ParentNotFound));
    }
}
