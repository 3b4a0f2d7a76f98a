//! Follower Service

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use tracing::{info, instrument};

use crate::application::dto::response::MemberSummaryResponse;
use crate::application::dto::social::FollowCountsResponse;
use crate::application::services::notification_service::{NewNotification, Notifier};
use crate::domain::{BlockUserRepository, Follower, FollowerRepository, MemberRepository, NotificationType};
use crate::shared::error::AppError;
use crate::shared::pagination::{SearchRequest, SearchResult};
use crate::shared::snowflake::SnowflakeGenerator;

#[async_trait]
pub trait FollowerService: Send + Sync {
    async fn follow(&self, follower_id: i64, followed_id: i64) -> Result<(), FollowerError>;

    async fn unfollow(&self, follower_id: i64, followed_id: i64) -> Result<(), FollowerError>;

    async fn find_followers(
        &self,
        member_id: i64,
        request: &SearchRequest,
    ) -> Result<SearchResult<MemberSummaryResponse>, FollowerError>;

    async fn find_followings(
        &self,
        member_id: i64,
        request: &SearchRequest,
    ) -> Result<SearchResult<MemberSummaryResponse>, FollowerError>;

    async fn counts(&self, member_id: i64) -> Result<FollowCountsResponse, FollowerError>;
}

#[derive(Debug, thiserror::Error)]
pub enum FollowerError {
    #[error("Members cannot follow themselves")]
    SelfFollow,

    #[error("Member not found")]
    MemberNotFound,

    #[error("Blocked")]
    Blocked,

    #[error("Already following")]
    AlreadyFollowing,

    #[error("Not following")]
    NotFollowing,

    #[error(transparent)]
    Repository(#[from] AppError),
}

impl From<FollowerError> for AppError {
    fn from(err: FollowerError) -> Self {
        match err {
            FollowerError::SelfFollow => AppError::BadRequest("follower.cannot.follow.self".into()),
            FollowerError::MemberNotFound => AppError::NotFound("member.not.found".into()),
            FollowerError::Blocked => AppError::Forbidden("follower.blocked".into()),
            FollowerError::AlreadyFollowing => AppError::Conflict("follower.already.following".into()),
            FollowerError::NotFollowing => AppError::NotFound("follower.not.following".into()),
            FollowerError::Repository(e) => e,
        }
    }
}

pub struct FollowerServiceImpl {
    followers: Arc<dyn FollowerRepository>,
    members: Arc<dyn MemberRepository>,
    blocks: Arc<dyn BlockUserRepository>,
    notifier: Notifier,
    id_generator: Arc<SnowflakeGenerator>,
}

impl FollowerServiceImpl {
    pub fn new(
        followers: Arc<dyn FollowerRepository>,
        members: Arc<dyn MemberRepository>,
        blocks: Arc<dyn BlockUserRepository>,
        notifier: Notifier,
        id_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            followers,
            members,
            blocks,
            notifier,
            id_generator,
        }
    }
}

#[async_trait]
impl FollowerService for FollowerServiceImpl {
    #[instrument(skip(self))]
    async fn follow(&self, follower_id: i64, followed_id: i64) -> Result<(), FollowerError> {
        if follower_id == followed_id {
            return Err(FollowerError::SelfFollow);
        }
        let follower = self
            .members
            .find_by_id(follower_id)
            .await?
            .ok_or(FollowerError::MemberNotFound)?;
        self.members
            .find_by_id(followed_id)
            .await?
            .filter(|m| !m.is_banned())
            .ok_or(FollowerError::MemberNotFound)?;

        if self.blocks.is_blocked_either_way(follower_id, followed_id).await? {
            return Err(FollowerError::Blocked);
        }
        if self.followers.exists(follower_id, followed_id).await? {
            return Err(FollowerError::AlreadyFollowing);
        }

        let follow = Follower {
            id: self.id_generator.generate(),
            follower_id,
            followed_id,
            created_at: Utc::now(),
        };
        self.followers.create(&follow).await?;

        self.notifier
            .notify(NewNotification {
                receiver_id: followed_id,
                initiator_id: Some(follower_id),
                notification_type: NotificationType::FollowedYou,
                parent: None,
                params: json!({ "name": follower.full_name() }),
            })
            .await;

        info!(follower_id, followed_id, "Member followed");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn unfollow(&self, follower_id: i64, followed_id: i64) -> Result<(), FollowerError> {
        if !self.followers.delete(follower_id, followed_id).await? {
            return Err(FollowerError::NotFollowing);
        }
        info!(follower_id, followed_id, "Member unfollowed");
        Ok(())
    }

    async fn find_followers(
        &self,
        member_id: i64,
        request: &SearchRequest,
    ) -> Result<SearchResult<MemberSummaryResponse>, FollowerError> {
        let (values, total) = self.followers.find_followers(member_id, request).await?;
        Ok(SearchResult::new(values, total, request).map(MemberSummaryResponse::from))
    }

    async fn find_followings(
        &self,
        member_id: i64,
        request: &SearchRequest,
    ) -> Result<SearchResult<MemberSummaryResponse>, FollowerError> {
        let (values, total) = self.followers.find_followings(member_id, request).await?;
        Ok(SearchResult::new(values, total, request).map(MemberSummaryResponse::from))
    }

    async fn counts(&self, member_id: i64) -> Result<FollowCountsResponse, FollowerError> {
        let (total_followers, total_following) = self.followers.counts(member_id).await?;
        Ok(FollowCountsResponse {
            total_followers,
            total_following,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Member, MockBlockUserRepository, MockFollowerRepository, MockMemberRepository, MockNotificationRepository,
    };
    use mockall::predicate::eq;

    struct Mocks {
        followers: MockFollowerRepository,
        members: MockMemberRepository,
        blocks: MockBlockUserRepository,
        notifications: MockNotificationRepository,
    }

    impl Mocks {
        fn new() -> Self {
            let mut members = MockMemberRepository::new();
            members.expect_find_by_id().returning(|id| {
                Ok(Some(Member {
                    id,
                    first_name: "Linus".into(),
                    last_name: "T".into(),
                    ..Default::default()
                }))
            });
            Self {
                followers: MockFollowerRepository::new(),
                members,
                blocks: MockBlockUserRepository::new(),
                notifications: MockNotificationRepository::new(),
            }
        }

        fn build(self) -> FollowerServiceImpl {
            let ids = Arc::new(SnowflakeGenerator::new(1, 1));
            FollowerServiceImpl::new(
                Arc::new(self.followers),
                Arc::new(self.members),
                Arc::new(self.blocks),
                Notifier::new(Arc::new(self.notifications), ids.clone()),
                ids,
            )
        }
    }

    #[tokio::test]
    async fn test_cannot_follow_self() {
        let err = Mocks::new().build().follow(3, 3).await.unwrap_err();
        assert!(matches!(err, FollowerError::SelfFollow));
    }

    #[tokio::test]
    async fn test_blocked_members_cannot_follow() {
        let mut mocks = Mocks::new();
        mocks.blocks.expect_is_blocked_either_way().returning(|_, _| Ok(true));
        mocks.followers.expect_create().never();

        let err = mocks.build().follow(1, 2).await.unwrap_err();
        assert!(matches!(err, FollowerError::Blocked));
    }

    #[tokio::test]
    async fn test_follow_twice_conflicts() {
        let mut mocks = Mocks::new();
        mocks.blocks.expect_is_blocked_either_way().returning(|_, _| Ok(false));
        mocks.followers.expect_exists().returning(|_, _| Ok(true));

        let err = mocks.build().follow(1, 2).await.unwrap_err();
        assert!(matches!(err, FollowerError::AlreadyFollowing));
    }

    #[tokio::test]
    async fn test_follow_notifies_followed_member() {
        let mut mocks = Mocks::new();
        mocks.blocks.expect_is_blocked_either_way().returning(|_, _| Ok(false));
        mocks.followers.expect_exists().returning(|_, _| Ok(false));
        mocks
            .followers
            .expect_create()
            .withf(|f| f.follower_id == 1 && f.followed_id == 2)
            .returning(|f| Ok(f.clone()));
        mocks
            .notifications
            .expect_create()
            .withf(|n| {
                n.receiver_id == 2
                    && n.notification_type == NotificationType::FollowedYou
                    && n.params["name"] == "Linus T"
            })
            .times(1)
            .returning(|n| Ok(n.clone()));

        mocks.build().follow(1, 2).await.unwrap();
    }

    #[tokio::test]
    async fn test_unfollow_when_not_following() {
        let mut mocks = Mocks::new();
        mocks.followers.expect_delete().with(eq(1), eq(2)).returning(|_, _| Ok(false));

        let err = mocks.build().unfollow(1, 2).await.unwrap_err();
        assert!(matches!(err, FollowerError::NotFollowing));
    }
}
