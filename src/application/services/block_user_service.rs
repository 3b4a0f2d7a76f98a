//! Block User Service
//!
//! Blocking is an upsert on (initiator, recipient); a block also drops
//! follow links in both directions.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, instrument};

use crate::application::dto::response::MemberSummaryResponse;
use crate::application::dto::social::BlockUnblockRequest;
use crate::domain::{BlockStatus, BlockUser, BlockUserRepository, FollowerRepository, MemberRepository};
use crate::shared::error::AppError;
use crate::shared::pagination::{SearchRequest, SearchResult};
use crate::shared::snowflake::SnowflakeGenerator;

#[async_trait]
pub trait BlockUserService: Send + Sync {
    async fn block_or_unblock(&self, initiator_id: i64, request: BlockUnblockRequest) -> Result<(), BlockUserError>;

    async fn find_blocked_members(
        &self,
        initiator_id: i64,
        request: &SearchRequest,
    ) -> Result<SearchResult<MemberSummaryResponse>, BlockUserError>;

    async fn is_blocked_either_way(&self, a: i64, b: i64) -> Result<bool, BlockUserError>;
}

#[derive(Debug, thiserror::Error)]
pub enum BlockUserError {
    #[error("Members cannot block themselves")]
    SelfBlock,

    #[error("Member not found")]
    MemberNotFound,

    #[error(transparent)]
    Repository(#[from] AppError),
}

impl From<BlockUserError> for AppError {
    fn from(err: BlockUserError) -> Self {
        match err {
            BlockUserError::SelfBlock => AppError::BadRequest("block.user.cannot.block.self".into()),
            BlockUserError::MemberNotFound => AppError::NotFound("member.not.found".into()),
            BlockUserError::Repository(e) => e,
        }
    }
}

pub struct BlockUserServiceImpl {
    blocks: Arc<dyn BlockUserRepository>,
    followers: Arc<dyn FollowerRepository>,
    members: Arc<dyn MemberRepository>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl BlockUserServiceImpl {
    pub fn new(
        blocks: Arc<dyn BlockUserRepository>,
        followers: Arc<dyn FollowerRepository>,
        members: Arc<dyn MemberRepository>,
        id_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            blocks,
            followers,
            members,
            id_generator,
        }
    }
}

#[async_trait]
impl BlockUserService for BlockUserServiceImpl {
    #[instrument(skip(self))]
    async fn block_or_unblock(&self, initiator_id: i64, request: BlockUnblockRequest) -> Result<(), BlockUserError> {
        let recipient_id = request.member_id;
        if initiator_id == recipient_id {
            return Err(BlockUserError::SelfBlock);
        }
        if self.members.find_by_id(recipient_id).await?.is_none() {
            return Err(BlockUserError::MemberNotFound);
        }

        let now = Utc::now();
        let block = BlockUser {
            id: self.id_generator.generate(),
            initiator_id,
            recipient_id,
            block_status: request.block_status,
            created_at: now,
            updated_at: now,
        };
        self.blocks.upsert(&block).await?;

        if request.block_status == BlockStatus::Blocked {
            self.followers.delete_between(initiator_id, recipient_id).await?;
        }

        info!(initiator_id, recipient_id, status = %request.block_status, "Block status changed");
        Ok(())
    }

    async fn find_blocked_members(
        &self,
        initiator_id: i64,
        request: &SearchRequest,
    ) -> Result<SearchResult<MemberSummaryResponse>, BlockUserError> {
        let (values, total) = self.blocks.find_blocked(initiator_id, request).await?;
        Ok(SearchResult::new(values, total, request).map(MemberSummaryResponse::from))
    }

    async fn is_blocked_either_way(&self, a: i64, b: i64) -> Result<bool, BlockUserError> {
        Ok(self.blocks.is_blocked_either_way(a, b).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Member, MockBlockUserRepository, MockFollowerRepository, MockMemberRepository};
    use test_case::test_case;

    fn service(
        blocks: MockBlockUserRepository,
        followers: MockFollowerRepository,
    ) -> BlockUserServiceImpl {
        let mut members = MockMemberRepository::new();
        members
            .expect_find_by_id()
            .returning(|id| Ok(Some(Member { id, ..Default::default() })));
        BlockUserServiceImpl::new(
            Arc::new(blocks),
            Arc::new(followers),
            Arc::new(members),
            Arc::new(SnowflakeGenerator::new(1, 1)),
        )
    }

    #[tokio::test]
    async fn test_cannot_block_self() {
        let request = BlockUnblockRequest {
            member_id: 4,
            block_status: BlockStatus::Blocked,
        };
        let err = service(MockBlockUserRepository::new(), MockFollowerRepository::new())
            .block_or_unblock(4, request)
            .await
            .unwrap_err();
        assert!(matches!(err, BlockUserError::SelfBlock));
    }

    #[test_case(BlockStatus::Blocked, 1 ; "blocking drops follows")]
    #[test_case(BlockStatus::Unblocked, 0 ; "unblocking keeps follows")]
    #[tokio::test]
    async fn test_block_status_and_follow_links(status: BlockStatus, follow_deletes: usize) {
        let mut blocks = MockBlockUserRepository::new();
        blocks
            .expect_upsert()
            .withf(move |b| b.initiator_id == 1 && b.recipient_id == 2 && b.block_status == status)
            .returning(|b| Ok(b.clone()));
        let mut followers = MockFollowerRepository::new();
        followers
            .expect_delete_between()
            .times(follow_deletes)
            .returning(|_, _| Ok(()));

        let request = BlockUnblockRequest {
            member_id: 2,
            block_status: status,
        };
        service(blocks, followers).block_or_unblock(1, request).await.unwrap();
    }
}
