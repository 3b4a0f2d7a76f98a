//! Soft Ask Service
//!
//! Community questions, their answers, threaded replies and votes. Every
//! vote change pushes the new counter to subscribers of
//! `soft-ask:{id}:counters` from a background task.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::application::dto::soft_ask::{
    AddAnswerRequest, AddReplyRequest, CreateSoftAskRequest, SoftAskAnswerResponse, SoftAskReplyResponse,
    SoftAskResponse, SoftAskVoteRequest, SoftAskVoteResponse, UpdateSoftAskRequest,
};
use crate::application::services::notification_service::{NewNotification, Notifier};
use crate::domain::gateways::{EventPublisher, SoftAskCounters};
use crate::domain::{
    ChatSpaceRepository, MemberRepository, NotificationType, ParentType, SoftAsk, SoftAskAnswer, SoftAskReply,
    SoftAskRepository, SoftAskVote, SoftAskVoteParent, SoftAskVoteType, StreamRepository,
};
use crate::shared::error::AppError;
use crate::shared::pagination::{SearchRequest, SearchResult};
use crate::shared::snowflake::SnowflakeGenerator;

#[async_trait]
pub trait SoftAskService: Send + Sync {
    async fn create(&self, author_id: i64, request: CreateSoftAskRequest) -> Result<SoftAskResponse, SoftAskError>;

    async fn update(
        &self,
        member_id: i64,
        soft_ask_id: i64,
        request: UpdateSoftAskRequest,
    ) -> Result<SoftAskResponse, SoftAskError>;

    async fn close(&self, member_id: i64, soft_ask_id: i64) -> Result<SoftAskResponse, SoftAskError>;

    async fn delete(&self, member_id: i64, soft_ask_id: i64) -> Result<(), SoftAskError>;

    async fn get(&self, soft_ask_id: i64) -> Result<SoftAskResponse, SoftAskError>;

    async fn search(
        &self,
        parent: Option<(ParentType, i64)>,
        request: &SearchRequest,
    ) -> Result<SearchResult<SoftAskResponse>, SoftAskError>;

    async fn add_answer(
        &self,
        author_id: i64,
        soft_ask_id: i64,
        request: AddAnswerRequest,
    ) -> Result<SoftAskAnswerResponse, SoftAskError>;

    async fn delete_answer(&self, member_id: i64, answer_id: i64) -> Result<(), SoftAskError>;

    async fn find_answers(
        &self,
        soft_ask_id: i64,
        request: &SearchRequest,
    ) -> Result<SearchResult<SoftAskAnswerResponse>, SoftAskError>;

    async fn add_reply(
        &self,
        author_id: i64,
        answer_id: i64,
        request: AddReplyRequest,
    ) -> Result<SoftAskReplyResponse, SoftAskError>;

    async fn delete_reply(&self, member_id: i64, reply_id: i64) -> Result<(), SoftAskError>;

    async fn find_replies(
        &self,
        answer_id: i64,
        request: &SearchRequest,
    ) -> Result<SearchResult<SoftAskReplyResponse>, SoftAskError>;

    async fn vote(&self, member_id: i64, request: SoftAskVoteRequest) -> Result<SoftAskVoteResponse, SoftAskError>;

    async fn unvote(&self, member_id: i64, request: SoftAskVoteRequest) -> Result<SoftAskVoteResponse, SoftAskError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SoftAskError {
    #[error("Soft ask not found")]
    NotFound,

    #[error("Answer not found")]
    AnswerNotFound,

    #[error("Reply not found")]
    ReplyNotFound,

    #[error("Not the author")]
    NotAuthor,

    #[error("Soft ask no longer accepts answers")]
    Closed,

    #[error("Parent type and id must be given together")]
    IncompleteParent,

    #[error("Soft asks cannot be attached to {0}")]
    UnsupportedParent(ParentType),

    #[error("Parent not found")]
    ParentNotFound,

    #[error("Only chat space members can ask in a chat space")]
    NotChatSpaceMember,

    #[error("Deadline is in the past")]
    DeadlineInPast,

    #[error("Reply belongs to another answer")]
    ReplyParentMismatch,

    #[error(transparent)]
    Repository(#[from] AppError),
}

impl From<SoftAskError> for AppError {
    fn from(err: SoftAskError) -> Self {
        use SoftAskError::*;
        match err {
            NotFound => AppError::NotFound("soft.ask.not.found".into()),
            AnswerNotFound => AppError::NotFound("soft.ask.answer.not.found".into()),
            ReplyNotFound => AppError::NotFound("soft.ask.reply.not.found".into()),
            NotAuthor => AppError::Forbidden("soft.ask.not.author".into()),
            Closed => AppError::Conflict("soft.ask.closed".into()),
            IncompleteParent => AppError::BadRequest("soft.ask.parent.incomplete".into()),
            UnsupportedParent(_) => AppError::BadRequest("soft.ask.parent.type.unsupported".into()),
            ParentNotFound => AppError::NotFound("soft.ask.parent.not.found".into()),
            NotChatSpaceMember => AppError::Forbidden("soft.ask.not.chat.space.member".into()),
            DeadlineInPast => AppError::BadRequest("soft.ask.deadline.in.past".into()),
            ReplyParentMismatch => AppError::BadRequest("soft.ask.reply.parent.mismatch".into()),
            Repository(e) => e,
        }
    }
}

pub struct SoftAskServiceImpl {
    repo: Arc<dyn SoftAskRepository>,
    chat_spaces: Arc<dyn ChatSpaceRepository>,
    streams: Arc<dyn StreamRepository>,
    members: Arc<dyn MemberRepository>,
    events: Arc<dyn EventPublisher>,
    notifier: Notifier,
    id_generator: Arc<SnowflakeGenerator>,
}

fn clean(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

impl SoftAskServiceImpl {
    pub fn new(
        repo: Arc<dyn SoftAskRepository>,
        chat_spaces: Arc<dyn ChatSpaceRepository>,
        streams: Arc<dyn StreamRepository>,
        members: Arc<dyn MemberRepository>,
        events: Arc<dyn EventPublisher>,
        notifier: Notifier,
        id_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            repo,
            chat_spaces,
            streams,
            members,
            events,
            notifier,
            id_generator,
        }
    }

    async fn find(&self, soft_ask_id: i64) -> Result<SoftAsk, SoftAskError> {
        self.repo.find_by_id(soft_ask_id).await?.ok_or(SoftAskError::NotFound)
    }

    async fn find_as_author(&self, member_id: i64, soft_ask_id: i64) -> Result<SoftAsk, SoftAskError> {
        let ask = self.find(soft_ask_id).await?;
        if !ask.is_author(member_id) {
            return Err(SoftAskError::NotAuthor);
        }
        Ok(ask)
    }

    async fn find_answer(&self, answer_id: i64) -> Result<SoftAskAnswer, SoftAskError> {
        self.repo.find_answer(answer_id).await?.ok_or(SoftAskError::AnswerNotFound)
    }

    async fn find_reply(&self, reply_id: i64) -> Result<SoftAskReply, SoftAskError> {
        self.repo.find_reply(reply_id).await?.ok_or(SoftAskError::ReplyNotFound)
    }

    async fn display_name(&self, member_id: i64) -> Result<String, SoftAskError> {
        Ok(self
            .members
            .find_by_id(member_id)
            .await?
            .map(|m| m.full_name())
            .unwrap_or_default())
    }

    /// Check the parent a new soft ask is attached to.
    async fn verify_parent(&self, author_id: i64, parent: Option<(ParentType, i64)>) -> Result<(), SoftAskError> {
        match parent {
            None => Ok(()),
            Some((ParentType::ChatSpace, id)) => {
                self.chat_spaces
                    .find_by_id(id)
                    .await?
                    .ok_or(SoftAskError::ParentNotFound)?;
                let is_member = self
                    .chat_spaces
                    .find_member(id, author_id)
                    .await?
                    .is_some_and(|m| m.is_active_member());
                if !is_member {
                    return Err(SoftAskError::NotChatSpaceMember);
                }
                Ok(())
            }
            Some((ParentType::Stream, id)) => {
                self.streams.find_by_id(id).await?.ok_or(SoftAskError::ParentNotFound)?;
                Ok(())
            }
            Some((other, _)) => Err(SoftAskError::UnsupportedParent(other)),
        }
    }

    /// Soft ask a vote target belongs to, and the target's current total.
    async fn vote_target(&self, parent_type: SoftAskVoteParent, parent_id: i64) -> Result<(i64, i64), SoftAskError> {
        Ok(match parent_type {
            SoftAskVoteParent::SoftAsk => {
                let ask = self.find(parent_id).await?;
                (ask.id, ask.total_votes)
            }
            SoftAskVoteParent::Answer => {
                let answer = self.find_answer(parent_id).await?;
                (answer.soft_ask_id, answer.total_votes)
            }
            SoftAskVoteParent::Reply => {
                let reply = self.find_reply(parent_id).await?;
                (reply.soft_ask_id, reply.total_votes)
            }
        })
    }

    async fn set_vote(
        &self,
        member_id: i64,
        request: SoftAskVoteRequest,
        vote_type: SoftAskVoteType,
    ) -> Result<SoftAskVoteResponse, SoftAskError> {
        let (soft_ask_id, current_total) = self.vote_target(request.parent_type, request.parent_id).await?;
        let voted = matches!(vote_type, SoftAskVoteType::Voted);
        let existing = self
            .repo
            .find_vote(member_id, request.parent_type, request.parent_id)
            .await?;

        let already = match &existing {
            Some(v) => v.vote_type == vote_type,
            None => !voted,
        };
        if already {
            return Ok(SoftAskVoteResponse {
                voted,
                total_votes: current_total,
            });
        }

        let now = Utc::now();
        let vote = match existing {
            Some(mut v) => {
                v.vote_type = vote_type;
                v.updated_at = now;
                v
            }
            None => SoftAskVote {
                id: self.id_generator.generate(),
                member_id,
                parent_type: request.parent_type,
                parent_id: request.parent_id,
                vote_type,
                created_at: now,
                updated_at: now,
            },
        };
        let total_votes = self.repo.save_vote(&vote).await?;

        self.publish_counters(SoftAskCounters {
            soft_ask_id: soft_ask_id.to_string(),
            parent_type: request.parent_type.to_string(),
            parent_id: request.parent_id.to_string(),
            total_votes,
        });

        info!(
            member_id,
            soft_ask_id,
            parent_type = %request.parent_type,
            parent_id = request.parent_id,
            %vote_type,
            "Soft ask vote changed"
        );
        Ok(SoftAskVoteResponse { voted, total_votes })
    }

    fn publish_counters(&self, counters: SoftAskCounters) {
        let events = self.events.clone();
        tokio::spawn(async move {
            let soft_ask_id = counters.soft_ask_id.clone();
            if let Err(e) = events.soft_ask_counters(counters).await {
                warn!(soft_ask_id = %soft_ask_id, error = %e, "Failed to publish soft ask counters");
            }
        });
    }
}

#[async_trait]
impl SoftAskService for SoftAskServiceImpl {
    #[instrument(skip(self, request))]
    async fn create(&self, author_id: i64, request: CreateSoftAskRequest) -> Result<SoftAskResponse, SoftAskError> {
        let parent = match (request.parent_type, request.parent_id) {
            (Some(t), Some(id)) => Some((t, id)),
            (None, None) => None,
            _ => return Err(SoftAskError::IncompleteParent),
        };
        let now = Utc::now();
        if request.deadline.is_some_and(|d| d <= now) {
            return Err(SoftAskError::DeadlineInPast);
        }
        self.verify_parent(author_id, parent).await?;

        let ask = SoftAsk {
            id: self.id_generator.generate(),
            title: request.title.trim().to_string(),
            description: request.description.trim().to_string(),
            tags: clean(request.tags),
            author_id,
            parent_type: parent.map(|(t, _)| t),
            parent_id: parent.map(|(_, id)| id),
            visibility: request.visibility,
            is_closed: false,
            deadline: request.deadline,
            total_answers: 0,
            total_votes: 0,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        };
        let created = self.repo.create(&ask).await?;

        info!(soft_ask_id = created.id, author_id, "Soft ask created");
        Ok(created.into())
    }

    #[instrument(skip(self, request))]
    async fn update(
        &self,
        member_id: i64,
        soft_ask_id: i64,
        request: UpdateSoftAskRequest,
    ) -> Result<SoftAskResponse, SoftAskError> {
        let mut ask = self.find_as_author(member_id, soft_ask_id).await?;
        let now = Utc::now();
        if request.deadline.is_some_and(|d| d <= now) {
            return Err(SoftAskError::DeadlineInPast);
        }
        ask.title = request.title.trim().to_string();
        ask.description = request.description.trim().to_string();
        ask.tags = clean(request.tags);
        ask.deadline = request.deadline;
        ask.updated_at = now;

        let updated = self.repo.update(&ask).await?;
        info!(soft_ask_id, member_id, "Soft ask updated");
        Ok(updated.into())
    }

    #[instrument(skip(self))]
    async fn close(&self, member_id: i64, soft_ask_id: i64) -> Result<SoftAskResponse, SoftAskError> {
        let mut ask = self.find_as_author(member_id, soft_ask_id).await?;
        if ask.is_closed {
            return Ok(ask.into());
        }
        ask.is_closed = true;
        ask.updated_at = Utc::now();

        let updated = self.repo.update(&ask).await?;
        info!(soft_ask_id, member_id, "Soft ask closed");
        Ok(updated.into())
    }

    #[instrument(skip(self))]
    async fn delete(&self, member_id: i64, soft_ask_id: i64) -> Result<(), SoftAskError> {
        self.find_as_author(member_id, soft_ask_id).await?;
        self.repo.soft_delete(soft_ask_id).await?;
        info!(soft_ask_id, member_id, "Soft ask deleted");
        Ok(())
    }

    async fn get(&self, soft_ask_id: i64) -> Result<SoftAskResponse, SoftAskError> {
        Ok(self.find(soft_ask_id).await?.into())
    }

    async fn search(
        &self,
        parent: Option<(ParentType, i64)>,
        request: &SearchRequest,
    ) -> Result<SearchResult<SoftAskResponse>, SoftAskError> {
        let (asks, total) = self.repo.search(parent, request).await?;
        Ok(SearchResult::new(asks, total, request).map(SoftAskResponse::from))
    }

    #[instrument(skip(self, request))]
    async fn add_answer(
        &self,
        author_id: i64,
        soft_ask_id: i64,
        request: AddAnswerRequest,
    ) -> Result<SoftAskAnswerResponse, SoftAskError> {
        let ask = self.find(soft_ask_id).await?;
        let now = Utc::now();
        if !ask.accepts_answers(now) {
            return Err(SoftAskError::Closed);
        }

        let answer = SoftAskAnswer {
            id: self.id_generator.generate(),
            soft_ask_id,
            author_id,
            content: request.content.trim().to_string(),
            total_replies: 0,
            total_votes: 0,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        };
        let created = self.repo.create_answer(&answer).await?;

        self.notifier
            .notify(NewNotification {
                receiver_id: ask.author_id,
                initiator_id: Some(author_id),
                notification_type: NotificationType::SoftAskAnswered,
                parent: Some((ParentType::SoftAsk, soft_ask_id)),
                params: json!({ "name": self.display_name(author_id).await?, "title": ask.title }),
            })
            .await;

        info!(soft_ask_id, answer_id = created.id, author_id, "Soft ask answered");
        Ok(created.into())
    }

    #[instrument(skip(self))]
    async fn delete_answer(&self, member_id: i64, answer_id: i64) -> Result<(), SoftAskError> {
        let answer = self.find_answer(answer_id).await?;
        if answer.author_id != member_id {
            return Err(SoftAskError::NotAuthor);
        }
        self.repo.delete_answer(&answer).await?;
        info!(answer_id, member_id, "Soft ask answer deleted");
        Ok(())
    }

    async fn find_answers(
        &self,
        soft_ask_id: i64,
        request: &SearchRequest,
    ) -> Result<SearchResult<SoftAskAnswerResponse>, SoftAskError> {
        self.find(soft_ask_id).await?;
        let (answers, total) = self.repo.find_answers(soft_ask_id, request).await?;
        Ok(SearchResult::new(answers, total, request).map(SoftAskAnswerResponse::from))
    }

    #[instrument(skip(self, request))]
    async fn add_reply(
        &self,
        author_id: i64,
        answer_id: i64,
        request: AddReplyRequest,
    ) -> Result<SoftAskReplyResponse, SoftAskError> {
        let answer = self.find_answer(answer_id).await?;
        let ask = self.find(answer.soft_ask_id).await?;
        let now = Utc::now();
        if !ask.accepts_answers(now) {
            return Err(SoftAskError::Closed);
        }
        if let Some(parent_reply_id) = request.parent_reply_id {
            let parent = self.find_reply(parent_reply_id).await?;
            if parent.answer_id != answer_id {
                return Err(SoftAskError::ReplyParentMismatch);
            }
        }

        let reply = SoftAskReply {
            id: self.id_generator.generate(),
            soft_ask_id: ask.id,
            answer_id,
            parent_reply_id: request.parent_reply_id,
            author_id,
            content: request.content.trim().to_string(),
            total_votes: 0,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        };
        let created = self.repo.create_reply(&reply).await?;

        self.notifier
            .notify(NewNotification {
                receiver_id: answer.author_id,
                initiator_id: Some(author_id),
                notification_type: NotificationType::SoftAskReplied,
                parent: Some((ParentType::SoftAsk, ask.id)),
                params: json!({ "name": self.display_name(author_id).await?, "title": ask.title }),
            })
            .await;

        info!(answer_id, reply_id = created.id, author_id, "Soft ask reply added");
        Ok(created.into())
    }

    #[instrument(skip(self))]
    async fn delete_reply(&self, member_id: i64, reply_id: i64) -> Result<(), SoftAskError> {
        let reply = self.find_reply(reply_id).await?;
        if reply.author_id != member_id {
            return Err(SoftAskError::NotAuthor);
        }
        self.repo.delete_reply(&reply).await?;
        info!(reply_id, member_id, "Soft ask reply deleted");
        Ok(())
    }

    async fn find_replies(
        &self,
        answer_id: i64,
        request: &SearchRequest,
    ) -> Result<SearchResult<SoftAskReplyResponse>, SoftAskError> {
        self.find_answer(answer_id).await?;
        let (replies, total) = self.repo.find_replies(answer_id, request).await?;
        Ok(SearchResult::new(replies, total, request).map(SoftAskReplyResponse::from))
    }

    #[instrument(skip(self, request))]
    async fn vote(&self, member_id: i64, request: SoftAskVoteRequest) -> Result<SoftAskVoteResponse, SoftAskError> {
        self.set_vote(member_id, request, SoftAskVoteType::Voted).await
    }

    #[instrument(skip(self, request))]
    async fn unvote(&self, member_id: i64, request: SoftAskVoteRequest) -> Result<SoftAskVoteResponse, SoftAskError> {
        self.set_vote(member_id, request, SoftAskVoteType::NotVoted).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::fixtures;
    use crate::domain::gateways::MockEventPublisher;
    use crate::domain::{
        Member, MockChatSpaceRepository, MockMemberRepository, MockNotificationRepository, MockSoftAskRepository,
        MockStreamRepository, RequestToJoinStatus, Visibility,
    };
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    struct Mocks {
        repo: MockSoftAskRepository,
        chat_spaces: MockChatSpaceRepository,
        streams: MockStreamRepository,
        members: MockMemberRepository,
        events: MockEventPublisher,
        notifications: MockNotificationRepository,
    }

    impl Mocks {
        fn new() -> Self {
            let mut members = MockMemberRepository::new();
            members.expect_find_by_id().returning(|id| {
                Ok(Some(Member {
                    id,
                    first_name: "Femi".into(),
                    last_name: "Ade".into(),
                    ..Default::default()
                }))
            });
            let mut events = MockEventPublisher::new();
            events.expect_soft_ask_counters().returning(|_| Ok(()));
            Self {
                repo: MockSoftAskRepository::new(),
                chat_spaces: MockChatSpaceRepository::new(),
                streams: MockStreamRepository::new(),
                members,
                events,
                notifications: MockNotificationRepository::new(),
            }
        }

        fn build(self) -> SoftAskServiceImpl {
            let ids = Arc::new(SnowflakeGenerator::new(1, 1));
            SoftAskServiceImpl::new(
                Arc::new(self.repo),
                Arc::new(self.chat_spaces),
                Arc::new(self.streams),
                Arc::new(self.members),
                Arc::new(self.events),
                Notifier::new(Arc::new(self.notifications), ids.clone()),
                ids,
            )
        }
    }

    fn create_request(parent_type: Option<ParentType>, parent_id: Option<i64>) -> CreateSoftAskRequest {
        CreateSoftAskRequest {
            title: "Best venue in Accra?".into(),
            description: "Looking for a 50 seat room".into(),
            tags: None,
            parent_type,
            parent_id,
            visibility: Visibility::Public,
            deadline: None,
        }
    }

    fn answer(id: i64, soft_ask_id: i64, author_id: i64) -> SoftAskAnswer {
        SoftAskAnswer {
            id,
            soft_ask_id,
            author_id,
            content: "Try the Alliance Francaise".into(),
            total_replies: 0,
            total_votes: 4,
            is_deleted: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_requires_complete_parent() {
        let err = Mocks::new()
            .build()
            .create(1, create_request(Some(ParentType::ChatSpace), None))
            .await
            .unwrap_err();
        assert!(matches!(err, SoftAskError::IncompleteParent));
    }

    #[tokio::test]
    async fn test_create_in_chat_space_requires_membership() {
        let mut mocks = Mocks::new();
        mocks
            .chat_spaces
            .expect_find_by_id()
            .returning(|id| Ok(Some(fixtures::chat_space(id, 9))));
        mocks
            .chat_spaces
            .expect_find_member()
            .returning(|cs, m| Ok(Some(fixtures::membership(cs, m, RequestToJoinStatus::Pending))));

        let err = mocks
            .build()
            .create(1, create_request(Some(ParentType::ChatSpace), Some(10)))
            .await
            .unwrap_err();
        assert!(matches!(err, SoftAskError::NotChatSpaceMember));
    }

    #[tokio::test]
    async fn test_business_parent_unsupported() {
        let err = Mocks::new()
            .build()
            .create(1, create_request(Some(ParentType::Business), Some(3)))
            .await
            .unwrap_err();
        assert_eq!(AppError::from(err).message_key(), "soft.ask.parent.type.unsupported");
    }

    #[tokio::test]
    async fn test_answer_after_deadline_conflicts() {
        let mut mocks = Mocks::new();
        mocks.repo.expect_find_by_id().returning(|id| {
            Ok(Some(SoftAsk {
                deadline: Some(Utc::now() - Duration::minutes(1)),
                ..fixtures::soft_ask(id, 1)
            }))
        });

        let request = AddAnswerRequest {
            content: "Too late".into(),
        };
        let err = mocks.build().add_answer(2, 5, request).await.unwrap_err();
        assert!(matches!(err, SoftAskError::Closed));
    }

    #[tokio::test]
    async fn test_answer_notifies_author() {
        let mut mocks = Mocks::new();
        mocks
            .repo
            .expect_find_by_id()
            .returning(|id| Ok(Some(fixtures::soft_ask(id, 1))));
        mocks.repo.expect_create_answer().returning(|a| Ok(a.clone()));
        mocks
            .notifications
            .expect_create()
            .withf(|n| {
                n.receiver_id == 1
                    && n.notification_type == NotificationType::SoftAskAnswered
                    && n.params["name"] == "Femi Ade"
            })
            .times(1)
            .returning(|n| Ok(n.clone()));

        let request = AddAnswerRequest {
            content: "  Try the Alliance Francaise ".into(),
        };
        let created = mocks.build().add_answer(2, 5, request).await.unwrap();
        assert_eq!(created.content, "Try the Alliance Francaise");
    }

    #[tokio::test]
    async fn test_reply_to_reply_of_other_answer_rejected() {
        let mut mocks = Mocks::new();
        mocks.repo.expect_find_answer().returning(|id| Ok(Some(answer(id, 5, 3))));
        mocks
            .repo
            .expect_find_by_id()
            .returning(|id| Ok(Some(fixtures::soft_ask(id, 1))));
        mocks.repo.expect_find_reply().returning(|id| {
            Ok(Some(SoftAskReply {
                id,
                soft_ask_id: 5,
                answer_id: 99,
                parent_reply_id: None,
                author_id: 4,
                content: "Other thread".into(),
                total_votes: 0,
                is_deleted: false,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            }))
        });

        let request = AddReplyRequest {
            content: "Agreed".into(),
            parent_reply_id: Some(70),
        };
        let err = mocks.build().add_reply(2, 50, request).await.unwrap_err();
        assert!(matches!(err, SoftAskError::ReplyParentMismatch));
    }

    #[tokio::test]
    async fn test_vote_is_idempotent() {
        let mut mocks = Mocks::new();
        mocks.repo.expect_find_answer().returning(|id| Ok(Some(answer(id, 5, 3))));
        mocks.repo.expect_find_vote().returning(|member_id, parent_type, parent_id| {
            Ok(Some(SoftAskVote {
                id: 1,
                member_id,
                parent_type,
                parent_id,
                vote_type: SoftAskVoteType::Voted,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            }))
        });
        mocks.repo.expect_save_vote().never();

        let request = SoftAskVoteRequest {
            parent_type: SoftAskVoteParent::Answer,
            parent_id: 50,
        };
        let response = mocks.build().vote(2, request).await.unwrap();
        assert!(response.voted);
        assert_eq!(response.total_votes, 4);
    }

    #[tokio::test]
    async fn test_first_vote_saves_and_returns_new_total() {
        let mut mocks = Mocks::new();
        mocks
            .repo
            .expect_find_by_id()
            .returning(|id| Ok(Some(fixtures::soft_ask(id, 1))));
        mocks.repo.expect_find_vote().returning(|_, _, _| Ok(None));
        mocks
            .repo
            .expect_save_vote()
            .withf(|v| v.vote_type == SoftAskVoteType::Voted && v.parent_type == SoftAskVoteParent::SoftAsk)
            .times(1)
            .returning(|_| Ok(1));

        let request = SoftAskVoteRequest {
            parent_type: SoftAskVoteParent::SoftAsk,
            parent_id: 5,
        };
        let response = mocks.build().vote(2, request).await.unwrap();
        assert_eq!(response.total_votes, 1);
    }

    #[tokio::test]
    async fn test_unvote_without_vote_is_noop() {
        let mut mocks = Mocks::new();
        mocks
            .repo
            .expect_find_by_id()
            .returning(|id| Ok(Some(fixtures::soft_ask(id, 1))));
        mocks.repo.expect_find_vote().returning(|_, _, _| Ok(None));
        mocks.repo.expect_save_vote().never();

        let request = SoftAskVoteRequest {
            parent_type: SoftAskVoteParent::SoftAsk,
            parent_id: 5,
        };
        let response = mocks.build().unvote(2, request).await.unwrap();
        assert!(!response.voted);
        assert_eq!(response.total_votes, 0);
    }

    #[tokio::test]
    async fn test_only_answer_author_deletes_answer() {
        let mut mocks = Mocks::new();
        mocks.repo.expect_find_answer().returning(|id| Ok(Some(answer(id, 5, 3))));

        let err = mocks.build().delete_answer(2, 50).await.unwrap_err();
        assert!(matches!(err, SoftAskError::NotAuthor));
    }
}
