//! Chat Space Service
//!
//! Chat spaces, their memberships and join requests. A chat space may be
//! mirrored to a Google Chat space; mirroring is best-effort and never fails
//! the local operation.
//!
//! Counters are moved by deltas in the repository and never drop below zero:
//!
//! | transition                    | members | requests |
//! |-------------------------------|---------|----------|
//! | join (stranger or left)       | +1      | 0        |
//! | request to join (private)     | 0       | +1       |
//! | approve pending request       | +1      | -1       |
//! | disapprove pending request    | 0       | -1       |
//! | leave / removal of a member   | -1      | 0        |
//! | restore removed member        | +1      | 0        |

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use tracing::{info, instrument};

use crate::application::dto::chat_space::{
    ChatSpaceDetailResponse, ChatSpaceMemberResponse, ChatSpaceResponse, CreateChatSpaceRequest,
    ProcessJoinRequest, RequestToJoinRequest, UpdateChatSpaceRequest,
};
use crate::application::services::log_remote_failure;
use crate::application::services::notification_service::{NewNotification, Notifier};
use crate::domain::gateways::ChatSpaceGateway;
use crate::domain::services::resolve_join_status;
use crate::domain::{
    ChatSpace, ChatSpaceMember, ChatSpaceRepository, ChatSpaceRole, ChatSpaceStatus, JoinDecision, LikeRepository,
    LikeType, MemberRepository, NotificationType, ParentType, RequestToJoinStatus, Visibility,
};
use crate::shared::error::AppError;
use crate::shared::pagination::{SearchRequest, SearchResult};
use crate::shared::snowflake::SnowflakeGenerator;

#[async_trait]
pub trait ChatSpaceService: Send + Sync {
    async fn create(&self, organizer_id: i64, request: CreateChatSpaceRequest) -> Result<ChatSpaceResponse, ChatSpaceError>;

    async fn update(
        &self,
        member_id: i64,
        chat_space_id: i64,
        request: UpdateChatSpaceRequest,
    ) -> Result<ChatSpaceResponse, ChatSpaceError>;

    async fn update_visibility(
        &self,
        member_id: i64,
        chat_space_id: i64,
        visibility: Visibility,
    ) -> Result<ChatSpaceResponse, ChatSpaceError>;

    async fn enable(&self, member_id: i64, chat_space_id: i64) -> Result<ChatSpaceResponse, ChatSpaceError>;

    async fn disable(&self, member_id: i64, chat_space_id: i64) -> Result<ChatSpaceResponse, ChatSpaceError>;

    async fn delete(&self, member_id: i64, chat_space_id: i64) -> Result<(), ChatSpaceError>;

    async fn get(&self, viewer_id: i64, chat_space_id: i64) -> Result<ChatSpaceDetailResponse, ChatSpaceError>;

    async fn search(&self, request: &SearchRequest) -> Result<SearchResult<ChatSpaceResponse>, ChatSpaceError>;

    /// Spaces the member organizes or belongs to.
    async fn find_mine(
        &self,
        member_id: i64,
        request: &SearchRequest,
    ) -> Result<SearchResult<ChatSpaceResponse>, ChatSpaceError>;

    async fn join(&self, member_id: i64, chat_space_id: i64) -> Result<(), ChatSpaceError>;

    async fn request_to_join(
        &self,
        member_id: i64,
        chat_space_id: i64,
        request: RequestToJoinRequest,
    ) -> Result<(), ChatSpaceError>;

    async fn process_join_request(
        &self,
        admin_id: i64,
        chat_space_id: i64,
        request: ProcessJoinRequest,
    ) -> Result<(), ChatSpaceError>;

    async fn leave(&self, member_id: i64, chat_space_id: i64) -> Result<(), ChatSpaceError>;

    async fn remove_member(&self, admin_id: i64, chat_space_id: i64, member_id: i64) -> Result<(), ChatSpaceError>;

    async fn restore_member(&self, admin_id: i64, chat_space_id: i64, member_id: i64) -> Result<(), ChatSpaceError>;

    async fn promote_to_admin(&self, admin_id: i64, chat_space_id: i64, member_id: i64) -> Result<(), ChatSpaceError>;

    async fn demote_admin(&self, admin_id: i64, chat_space_id: i64, member_id: i64) -> Result<(), ChatSpaceError>;

    async fn find_members(
        &self,
        viewer_id: i64,
        chat_space_id: i64,
        request: &SearchRequest,
    ) -> Result<SearchResult<ChatSpaceMemberResponse>, ChatSpaceError>;

    async fn find_join_requests(
        &self,
        admin_id: i64,
        chat_space_id: i64,
        request: &SearchRequest,
    ) -> Result<SearchResult<ChatSpaceMemberResponse>, ChatSpaceError>;
}

/// Chat space service errors
#[derive(Debug, thiserror::Error)]
pub enum ChatSpaceError {
    #[error("Chat space not found")]
    NotFound,

    #[error("Chat space is inactive")]
    Inactive,

    #[error("Not a chat space admin")]
    NotAdmin,

    #[error("Not the chat space organizer")]
    NotOrganizer,

    #[error("Private chat spaces require a join request")]
    PrivateRequestToJoin,

    #[error("Already a member")]
    AlreadyJoined,

    #[error("Join request already pending")]
    AlreadyRequested,

    #[error("Member was removed from the chat space")]
    Removed,

    #[error("Join request not found")]
    JoinRequestNotFound,

    #[error("Not a member of the chat space")]
    NotAMember,

    #[error("Organizer cannot leave the chat space")]
    OrganizerCannotLeave,

    #[error("Organizer cannot be removed")]
    CannotRemoveOrganizer,

    #[error("Organizer cannot be demoted")]
    CannotDemoteOrganizer,

    #[error("Member is not removed")]
    NotRemoved,

    #[error("Member is already an admin")]
    AlreadyAdmin,

    #[error("Member is not an admin")]
    NotAnAdmin,

    #[error("Members of private chat spaces are only visible to members")]
    MembersOnly,

    #[error(transparent)]
    Repository(#[from] AppError),
}

impl From<ChatSpaceError> for AppError {
    fn from(err: ChatSpaceError) -> Self {
        use ChatSpaceError::*;
        match err {
            NotFound => AppError::NotFound("chat.space.not.found".into()),
            Inactive => AppError::Forbidden("chat.space.inactive".into()),
            NotAdmin => AppError::Forbidden("chat.space.not.admin".into()),
            NotOrganizer => AppError::Forbidden("chat.space.not.organizer".into()),
            PrivateRequestToJoin => AppError::Forbidden("chat.space.private.request.to.join".into()),
            AlreadyJoined => AppError::Conflict("chat.space.already.joined".into()),
            AlreadyRequested => AppError::Conflict("chat.space.join.request.already.pending".into()),
            Removed => AppError::Forbidden("chat.space.member.removed".into()),
            JoinRequestNotFound => AppError::NotFound("chat.space.join.request.not.found".into()),
            NotAMember => AppError::NotFound("chat.space.not.a.member".into()),
            OrganizerCannotLeave => AppError::Conflict("chat.space.organizer.cannot.leave".into()),
            CannotRemoveOrganizer => AppError::Forbidden("chat.space.cannot.remove.organizer".into()),
            CannotDemoteOrganizer => AppError::Forbidden("chat.space.cannot.demote.organizer".into()),
            NotRemoved => AppError::Conflict("chat.space.member.not.removed".into()),
            AlreadyAdmin => AppError::Conflict("chat.space.member.already.admin".into()),
            NotAnAdmin => AppError::Conflict("chat.space.member.not.admin".into()),
            MembersOnly => AppError::Forbidden("chat.space.members.only".into()),
            Repository(e) => e,
        }
    }
}

pub struct ChatSpaceServiceImpl {
    repo: Arc<dyn ChatSpaceRepository>,
    members: Arc<dyn MemberRepository>,
    likes: Arc<dyn LikeRepository>,
    gateway: Arc<dyn ChatSpaceGateway>,
    notifier: Notifier,
    id_generator: Arc<SnowflakeGenerator>,
}

impl ChatSpaceServiceImpl {
    pub fn new(
        repo: Arc<dyn ChatSpaceRepository>,
        members: Arc<dyn MemberRepository>,
        likes: Arc<dyn LikeRepository>,
        gateway: Arc<dyn ChatSpaceGateway>,
        notifier: Notifier,
        id_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            repo,
            members,
            likes,
            gateway,
            notifier,
            id_generator,
        }
    }

    async fn find(&self, chat_space_id: i64) -> Result<ChatSpace, ChatSpaceError> {
        self.repo
            .find_by_id(chat_space_id)
            .await?
            .ok_or(ChatSpaceError::NotFound)
    }

    /// Load the space and check `member_id` is one of its admins.
    async fn find_as_admin(&self, member_id: i64, chat_space_id: i64) -> Result<ChatSpace, ChatSpaceError> {
        let cs = self.find(chat_space_id).await?;
        let is_admin = self
            .repo
            .find_member(chat_space_id, member_id)
            .await?
            .is_some_and(|m| m.is_admin());
        if !is_admin {
            return Err(ChatSpaceError::NotAdmin);
        }
        Ok(cs)
    }

    async fn find_active_member(&self, chat_space_id: i64, member_id: i64) -> Result<ChatSpaceMember, ChatSpaceError> {
        self.repo
            .find_member(chat_space_id, member_id)
            .await?
            .filter(|m| m.is_active_member())
            .ok_or(ChatSpaceError::NotAMember)
    }

    async fn save_space(&self, cs: &mut ChatSpace) -> Result<ChatSpaceResponse, ChatSpaceError> {
        cs.updated_at = Utc::now();
        Ok(self.repo.update(cs).await?.into())
    }

    async fn display_name(&self, member_id: i64) -> Result<String, ChatSpaceError> {
        Ok(self
            .members
            .find_by_id(member_id)
            .await?
            .map(|m| m.full_name())
            .unwrap_or_default())
    }

    async fn mirror_add_member(&self, cs: &ChatSpace, member_id: i64) -> Result<(), ChatSpaceError> {
        let Some(space_name) = cs.external_id_or_name.as_deref() else {
            return Ok(());
        };
        if let Some(member) = self.members.find_by_id(member_id).await? {
            log_remote_failure(
                self.gateway.add_member(space_name, &member.email_address).await,
                "chat_space.add_member",
                cs.id,
            );
        }
        Ok(())
    }

    async fn mirror_remove_member(&self, cs: &ChatSpace, member_id: i64) -> Result<(), ChatSpaceError> {
        let Some(space_name) = cs.external_id_or_name.as_deref() else {
            return Ok(());
        };
        if let Some(member) = self.members.find_by_id(member_id).await? {
            log_remote_failure(
                self.gateway.remove_member(space_name, &member.email_address).await,
                "chat_space.remove_member",
                cs.id,
            );
        }
        Ok(())
    }

    async fn mirror_update(&self, cs: &ChatSpace) {
        if let Some(space_name) = cs.external_id_or_name.as_deref() {
            log_remote_failure(
                self.gateway.update_space(space_name, &cs.title, &cs.description).await,
                "chat_space.update",
                cs.id,
            );
        }
    }

    async fn set_status(
        &self,
        member_id: i64,
        chat_space_id: i64,
        status: ChatSpaceStatus,
    ) -> Result<ChatSpaceResponse, ChatSpaceError> {
        let mut cs = self.find_as_admin(member_id, chat_space_id).await?;
        cs.status = status;
        let response = self.save_space(&mut cs).await?;
        info!(chat_space_id, member_id, %status, "Chat space status changed");
        Ok(response)
    }
}

fn clean(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

#[async_trait]
impl ChatSpaceService for ChatSpaceServiceImpl {
    #[instrument(skip(self, request))]
    async fn create(&self, organizer_id: i64, request: CreateChatSpaceRequest) -> Result<ChatSpaceResponse, ChatSpaceError> {
        let now = Utc::now();
        let mut cs = ChatSpace {
            id: self.id_generator.generate(),
            title: request.title.trim().to_string(),
            description: request.description.trim().to_string(),
            tags: clean(request.tags),
            guidelines_or_rules: clean(request.guidelines_or_rules),
            visibility: request.visibility,
            status: ChatSpaceStatus::Active,
            organizer_id,
            external_id_or_name: None,
            space_link: None,
            total_members: 1,
            total_request_to_join: 0,
            total_likes: 0,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        };

        let remote = self.gateway.create_space(&cs.title, &cs.description).await;
        if let Some(Some(remote)) = log_remote_failure(remote, "chat_space.create", cs.id) {
            cs.external_id_or_name = Some(remote.external_id);
            cs.space_link = remote.link;
        }

        let mut organizer = ChatSpaceMember::new(
            self.id_generator.generate(),
            cs.id,
            organizer_id,
            RequestToJoinStatus::Approved,
        );
        organizer.role = ChatSpaceRole::Admin;

        let created = self.repo.create(&cs, &organizer).await?;
        self.mirror_add_member(&created, organizer_id).await?;

        info!(chat_space_id = created.id, organizer_id, visibility = %created.visibility, "Chat space created");
        Ok(created.into())
    }

    #[instrument(skip(self, request))]
    async fn update(
        &self,
        member_id: i64,
        chat_space_id: i64,
        request: UpdateChatSpaceRequest,
    ) -> Result<ChatSpaceResponse, ChatSpaceError> {
        let mut cs = self.find_as_admin(member_id, chat_space_id).await?;
        cs.title = request.title.trim().to_string();
        cs.description = request.description.trim().to_string();
        cs.tags = clean(request.tags);
        cs.guidelines_or_rules = clean(request.guidelines_or_rules);

        let response = self.save_space(&mut cs).await?;
        self.mirror_update(&cs).await;
        info!(chat_space_id, member_id, "Chat space updated");
        Ok(response)
    }

    #[instrument(skip(self))]
    async fn update_visibility(
        &self,
        member_id: i64,
        chat_space_id: i64,
        visibility: Visibility,
    ) -> Result<ChatSpaceResponse, ChatSpaceError> {
        let mut cs = self.find_as_admin(member_id, chat_space_id).await?;
        cs.visibility = visibility;
        let response = self.save_space(&mut cs).await?;
        info!(chat_space_id, member_id, %visibility, "Chat space visibility changed");
        Ok(response)
    }

    async fn enable(&self, member_id: i64, chat_space_id: i64) -> Result<ChatSpaceResponse, ChatSpaceError> {
        self.set_status(member_id, chat_space_id, ChatSpaceStatus::Active).await
    }

    async fn disable(&self, member_id: i64, chat_space_id: i64) -> Result<ChatSpaceResponse, ChatSpaceError> {
        self.set_status(member_id, chat_space_id, ChatSpaceStatus::Inactive).await
    }

    #[instrument(skip(self))]
    async fn delete(&self, member_id: i64, chat_space_id: i64) -> Result<(), ChatSpaceError> {
        let cs = self.find(chat_space_id).await?;
        if !cs.is_organizer(member_id) {
            return Err(ChatSpaceError::NotOrganizer);
        }
        self.repo.soft_delete(cs.id).await?;
        if let Some(space_name) = cs.external_id_or_name.as_deref() {
            log_remote_failure(self.gateway.delete_space(space_name).await, "chat_space.delete", cs.id);
        }
        info!(chat_space_id, member_id, "Chat space deleted");
        Ok(())
    }

    async fn get(&self, viewer_id: i64, chat_space_id: i64) -> Result<ChatSpaceDetailResponse, ChatSpaceError> {
        let cs = self.find(chat_space_id).await?;
        let membership = self.repo.find_member(chat_space_id, viewer_id).await?;
        let is_admin = membership.as_ref().is_some_and(|m| m.is_admin());
        if !cs.is_active() && !is_admin {
            return Err(ChatSpaceError::Inactive);
        }

        let join_status = resolve_join_status(membership.map(|m| m.snapshot()), cs.visibility);
        let has_liked = matches!(
            self.likes
                .find(viewer_id, ParentType::ChatSpace, chat_space_id)
                .await?
                .map(|l| l.like_type),
            Some(LikeType::Like)
        );

        Ok(ChatSpaceDetailResponse {
            is_organizer: cs.is_organizer(viewer_id),
            is_admin,
            has_liked,
            join_status: join_status.info(),
            chat_space: cs.into(),
        })
    }

    async fn search(&self, request: &SearchRequest) -> Result<SearchResult<ChatSpaceResponse>, ChatSpaceError> {
        let (spaces, total) = self.repo.search(request).await?;
        Ok(SearchResult::new(spaces, total, request).map(ChatSpaceResponse::from))
    }

    async fn find_mine(
        &self,
        member_id: i64,
        request: &SearchRequest,
    ) -> Result<SearchResult<ChatSpaceResponse>, ChatSpaceError> {
        let (spaces, total) = self.repo.find_by_member(member_id, request).await?;
        Ok(SearchResult::new(spaces, total, request).map(ChatSpaceResponse::from))
    }

    #[instrument(skip(self))]
    async fn join(&self, member_id: i64, chat_space_id: i64) -> Result<(), ChatSpaceError> {
        let cs = self.find(chat_space_id).await?;
        if !cs.is_active() {
            return Err(ChatSpaceError::Inactive);
        }
        if cs.visibility.is_private() {
            return Err(ChatSpaceError::PrivateRequestToJoin);
        }

        let (membership, requests_delta) = match self.repo.find_member(chat_space_id, member_id).await? {
            Some(m) if m.removed => return Err(ChatSpaceError::Removed),
            Some(m) if m.is_active_member() => return Err(ChatSpaceError::AlreadyJoined),
            Some(mut m) => {
                let delta = if m.request_to_join_status.is_pending() { -1 } else { 0 };
                m.request_to_join_status = RequestToJoinStatus::Approved;
                m.left = false;
                m.updated_at = Utc::now();
                (m, delta)
            }
            None => (
                ChatSpaceMember::new(self.id_generator.generate(), chat_space_id, member_id, RequestToJoinStatus::Approved),
                0,
            ),
        };

        self.repo.save_member(&membership).await?;
        self.repo.adjust_counters(chat_space_id, 1, requests_delta).await?;
        self.mirror_add_member(&cs, member_id).await?;

        info!(chat_space_id, member_id, "Joined chat space");
        Ok(())
    }

    #[instrument(skip(self, request))]
    async fn request_to_join(
        &self,
        member_id: i64,
        chat_space_id: i64,
        request: RequestToJoinRequest,
    ) -> Result<(), ChatSpaceError> {
        let cs = self.find(chat_space_id).await?;
        if !cs.visibility.is_private() {
            return self.join(member_id, chat_space_id).await;
        }
        if !cs.is_active() {
            return Err(ChatSpaceError::Inactive);
        }

        let comment = clean(request.comment);
        let membership = match self.repo.find_member(chat_space_id, member_id).await? {
            Some(m) if m.removed => return Err(ChatSpaceError::Removed),
            Some(m) if m.is_active_member() => return Err(ChatSpaceError::AlreadyJoined),
            Some(m) if m.request_to_join_status.is_pending() => return Err(ChatSpaceError::AlreadyRequested),
            Some(mut m) => {
                m.request_to_join_status = RequestToJoinStatus::Pending;
                m.left = false;
                m.join_reason = comment;
                m.decision_reason = None;
                m.updated_at = Utc::now();
                m
            }
            None => {
                let mut m = ChatSpaceMember::new(
                    self.id_generator.generate(),
                    chat_space_id,
                    member_id,
                    RequestToJoinStatus::Pending,
                );
                m.join_reason = comment;
                m
            }
        };

        self.repo.save_member(&membership).await?;
        self.repo.adjust_counters(chat_space_id, 0, 1).await?;

        self.notifier
            .notify(NewNotification {
                receiver_id: cs.organizer_id,
                initiator_id: Some(member_id),
                notification_type: NotificationType::ChatSpaceJoinRequest,
                parent: Some((ParentType::ChatSpace, cs.id)),
                params: json!({ "name": self.display_name(member_id).await?, "title": cs.title }),
            })
            .await;

        info!(chat_space_id, member_id, "Requested to join chat space");
        Ok(())
    }

    #[instrument(skip(self, request), fields(member_id = request.member_id))]
    async fn process_join_request(
        &self,
        admin_id: i64,
        chat_space_id: i64,
        request: ProcessJoinRequest,
    ) -> Result<(), ChatSpaceError> {
        let cs = self.find_as_admin(admin_id, chat_space_id).await?;
        let mut membership = self
            .repo
            .find_member(chat_space_id, request.member_id)
            .await?
            .filter(|m| m.request_to_join_status.is_pending() && !m.removed)
            .ok_or(ChatSpaceError::JoinRequestNotFound)?;

        membership.request_to_join_status = request.join_status.into();
        membership.decision_reason = clean(request.comment);
        membership.updated_at = Utc::now();
        self.repo.save_member(&membership).await?;

        let notification_type = match request.join_status {
            JoinDecision::Approved => {
                self.repo.adjust_counters(chat_space_id, 1, -1).await?;
                self.mirror_add_member(&cs, request.member_id).await?;
                NotificationType::ChatSpaceJoinApproved
            }
            JoinDecision::Disapproved => {
                self.repo.adjust_counters(chat_space_id, 0, -1).await?;
                NotificationType::ChatSpaceJoinDisapproved
            }
        };

        self.notifier
            .notify(NewNotification {
                receiver_id: request.member_id,
                initiator_id: Some(admin_id),
                notification_type,
                parent: Some((ParentType::ChatSpace, cs.id)),
                params: json!({ "title": cs.title }),
            })
            .await;

        info!(chat_space_id, admin_id, decision = %request.join_status, "Join request processed");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn leave(&self, member_id: i64, chat_space_id: i64) -> Result<(), ChatSpaceError> {
        let cs = self.find(chat_space_id).await?;
        if cs.is_organizer(member_id) {
            return Err(ChatSpaceError::OrganizerCannotLeave);
        }
        let mut membership = self.find_active_member(chat_space_id, member_id).await?;
        membership.left = true;
        membership.role = ChatSpaceRole::Member;
        membership.updated_at = Utc::now();

        self.repo.save_member(&membership).await?;
        self.repo.adjust_counters(chat_space_id, -1, 0).await?;
        self.mirror_remove_member(&cs, member_id).await?;

        info!(chat_space_id, member_id, "Left chat space");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove_member(&self, admin_id: i64, chat_space_id: i64, member_id: i64) -> Result<(), ChatSpaceError> {
        let cs = self.find_as_admin(admin_id, chat_space_id).await?;
        if cs.is_organizer(member_id) {
            return Err(ChatSpaceError::CannotRemoveOrganizer);
        }
        let mut membership = self
            .repo
            .find_member(chat_space_id, member_id)
            .await?
            .filter(|m| !m.removed)
            .ok_or(ChatSpaceError::NotAMember)?;

        let was_active = membership.is_active_member();
        let was_pending = membership.request_to_join_status.is_pending();
        membership.removed = true;
        membership.role = ChatSpaceRole::Member;
        membership.updated_at = Utc::now();
        self.repo.save_member(&membership).await?;

        let members_delta = if was_active { -1 } else { 0 };
        let requests_delta = if was_pending { -1 } else { 0 };
        if members_delta != 0 || requests_delta != 0 {
            self.repo.adjust_counters(chat_space_id, members_delta, requests_delta).await?;
        }
        if was_active {
            self.mirror_remove_member(&cs, member_id).await?;
        }

        info!(chat_space_id, admin_id, member_id, "Member removed from chat space");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn restore_member(&self, admin_id: i64, chat_space_id: i64, member_id: i64) -> Result<(), ChatSpaceError> {
        let cs = self.find_as_admin(admin_id, chat_space_id).await?;
        let mut membership = self
            .repo
            .find_member(chat_space_id, member_id)
            .await?
            .ok_or(ChatSpaceError::NotAMember)?;
        if !membership.removed {
            return Err(ChatSpaceError::NotRemoved);
        }

        membership.removed = false;
        membership.left = false;
        membership.request_to_join_status = RequestToJoinStatus::Approved;
        membership.updated_at = Utc::now();
        self.repo.save_member(&membership).await?;
        self.repo.adjust_counters(chat_space_id, 1, 0).await?;
        self.mirror_add_member(&cs, member_id).await?;

        info!(chat_space_id, admin_id, member_id, "Member restored to chat space");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn promote_to_admin(&self, admin_id: i64, chat_space_id: i64, member_id: i64) -> Result<(), ChatSpaceError> {
        self.find_as_admin(admin_id, chat_space_id).await?;
        let mut membership = self.find_active_member(chat_space_id, member_id).await?;
        if membership.is_admin() {
            return Err(ChatSpaceError::AlreadyAdmin);
        }
        membership.role = ChatSpaceRole::Admin;
        membership.updated_at = Utc::now();
        self.repo.save_member(&membership).await?;

        info!(chat_space_id, admin_id, member_id, "Member promoted to admin");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn demote_admin(&self, admin_id: i64, chat_space_id: i64, member_id: i64) -> Result<(), ChatSpaceError> {
        let cs = self.find_as_admin(admin_id, chat_space_id).await?;
        if cs.is_organizer(member_id) {
            return Err(ChatSpaceError::CannotDemoteOrganizer);
        }
        let mut membership = self.find_active_member(chat_space_id, member_id).await?;
        if !membership.is_admin() {
            return Err(ChatSpaceError::NotAnAdmin);
        }
        membership.role = ChatSpaceRole::Member;
        membership.updated_at = Utc::now();
        self.repo.save_member(&membership).await?;

        info!(chat_space_id, admin_id, member_id, "Admin demoted");
        Ok(())
    }

    async fn find_members(
        &self,
        viewer_id: i64,
        chat_space_id: i64,
        request: &SearchRequest,
    ) -> Result<SearchResult<ChatSpaceMemberResponse>, ChatSpaceError> {
        let cs = self.find(chat_space_id).await?;
        if cs.visibility.is_private() {
            let is_member = self
                .repo
                .find_member(chat_space_id, viewer_id)
                .await?
                .is_some_and(|m| m.is_active_member());
            if !is_member {
                return Err(ChatSpaceError::MembersOnly);
            }
        }
        let (views, total) = self.repo.find_members(chat_space_id, request).await?;
        Ok(SearchResult::new(views, total, request).map(ChatSpaceMemberResponse::from))
    }

    async fn find_join_requests(
        &self,
        admin_id: i64,
        chat_space_id: i64,
        request: &SearchRequest,
    ) -> Result<SearchResult<ChatSpaceMemberResponse>, ChatSpaceError> {
        self.find_as_admin(admin_id, chat_space_id).await?;
        let (views, total) = self.repo.find_join_requests(chat_space_id, request).await?;
        Ok(SearchResult::new(views, total, request).map(ChatSpaceMemberResponse::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::fixtures;
    use crate::domain::gateways::{MockChatSpaceGateway, RemoteResource};
    use crate::domain::{Member, MockChatSpaceRepository, MockLikeRepository, MockMemberRepository, MockNotificationRepository};
    use mockall::predicate::eq;
    use pretty_assertions::assert_eq;

    struct Mocks {
        repo: MockChatSpaceRepository,
        members: MockMemberRepository,
        likes: MockLikeRepository,
        gateway: MockChatSpaceGateway,
        notifications: MockNotificationRepository,
    }

    impl Mocks {
        fn new() -> Self {
            let mut members = MockMemberRepository::new();
            members.expect_find_by_id().returning(|id| {
                Ok(Some(Member {
                    id,
                    email_address: format!("m{id}@fleenfeen.test"),
                    first_name: "Kofi".into(),
                    last_name: "Mensah".into(),
                    ..Default::default()
                }))
            });
            Self {
                repo: MockChatSpaceRepository::new(),
                members,
                likes: MockLikeRepository::new(),
                gateway: MockChatSpaceGateway::new(),
                notifications: MockNotificationRepository::new(),
            }
        }

        fn space(&mut self, visibility: Visibility) {
            self.repo.expect_find_by_id().returning(move |id| {
                Ok(Some(ChatSpace {
                    visibility,
                    ..fixtures::chat_space(id, 1)
                }))
            });
        }

        fn synced_space(&mut self) {
            self.repo.expect_find_by_id().returning(|id| {
                Ok(Some(ChatSpace {
                    external_id_or_name: Some("spaces/AAA".into()),
                    ..fixtures::chat_space(id, 1)
                }))
            });
        }

        /// Member 1 administers space 10; `target` is what the repository holds for member 2.
        fn admin_and(&mut self, target: Option<ChatSpaceMember>) {
            self.repo
                .expect_find_member()
                .with(eq(10), eq(1))
                .returning(|cs, m| Ok(Some(fixtures::admin(cs, m))));
            self.repo
                .expect_find_member()
                .with(eq(10), eq(2))
                .returning(move |_, _| Ok(target.clone()));
        }

        fn build(self) -> ChatSpaceServiceImpl {
            let ids = Arc::new(SnowflakeGenerator::new(1, 1));
            ChatSpaceServiceImpl::new(
                Arc::new(self.repo),
                Arc::new(self.members),
                Arc::new(self.likes),
                Arc::new(self.gateway),
                Notifier::new(Arc::new(self.notifications), ids.clone()),
                ids,
            )
        }
    }

    #[tokio::test]
    async fn test_create_makes_organizer_an_admin_and_stores_remote_space() {
        let mut mocks = Mocks::new();
        mocks.gateway.expect_create_space().returning(|_, _| {
            Ok(Some(RemoteResource {
                external_id: "spaces/AAA".into(),
                link: Some("https://chat.google.com/room/AAA".into()),
            }))
        });
        mocks.gateway.expect_add_member().returning(|_, _| Ok(()));
        mocks
            .repo
            .expect_create()
            .withf(|cs, organizer| {
                cs.external_id_or_name.as_deref() == Some("spaces/AAA")
                    && cs.total_members == 1
                    && organizer.is_admin()
                    && organizer.member_id == 1
            })
            .returning(|cs, _| Ok(cs.clone()));

        let request = CreateChatSpaceRequest {
            title: " Rust Lagos ".into(),
            description: "Monthly meetup".into(),
            tags: Some("  ".into()),
            guidelines_or_rules: None,
            visibility: Visibility::Public,
        };
        let created = mocks.build().create(1, request).await.unwrap();
        assert_eq!(created.title, "Rust Lagos");
        assert_eq!(created.tags, None);
        assert_eq!(created.space_link.as_deref(), Some("https://chat.google.com/room/AAA"));
    }

    #[tokio::test]
    async fn test_create_survives_remote_failure() {
        let mut mocks = Mocks::new();
        mocks
            .gateway
            .expect_create_space()
            .returning(|_, _| Err(AppError::Upstream("google.chat.unavailable".into())));
        mocks.repo.expect_create().returning(|cs, _| Ok(cs.clone()));

        let request = CreateChatSpaceRequest {
            title: "Rust Lagos".into(),
            description: "Monthly meetup".into(),
            tags: None,
            guidelines_or_rules: None,
            visibility: Visibility::Private,
        };
        let created = mocks.build().create(1, request).await.unwrap();
        assert_eq!(created.space_link, None);
    }

    #[tokio::test]
    async fn test_private_space_cannot_be_joined_directly() {
        let mut mocks = Mocks::new();
        mocks.space(Visibility::Private);

        let err = mocks.build().join(2, 10).await.unwrap_err();
        assert!(matches!(err, ChatSpaceError::PrivateRequestToJoin));
        assert_eq!(AppError::from(err).message_key(), "chat.space.private.request.to.join");
    }

    #[tokio::test]
    async fn test_join_public_space_increments_members() {
        let mut mocks = Mocks::new();
        mocks.space(Visibility::Public);
        mocks.repo.expect_find_member().returning(|_, _| Ok(None));
        mocks
            .repo
            .expect_save_member()
            .withf(|m| m.member_id == 2 && m.is_active_member())
            .returning(|m| Ok(m.clone()));
        mocks
            .repo
            .expect_adjust_counters()
            .with(eq(10), eq(1), eq(0))
            .times(1)
            .returning(|_, _, _| Ok(()));

        mocks.build().join(2, 10).await.unwrap();
    }

    #[tokio::test]
    async fn test_left_member_is_restored_on_join() {
        let mut mocks = Mocks::new();
        mocks.space(Visibility::Public);
        mocks.repo.expect_find_member().returning(|cs, m| {
            let mut membership = fixtures::membership(cs, m, RequestToJoinStatus::Approved);
            membership.left = true;
            Ok(Some(membership))
        });
        mocks
            .repo
            .expect_save_member()
            .withf(|m| !m.left && m.id == 200)
            .returning(|m| Ok(m.clone()));
        mocks.repo.expect_adjust_counters().returning(|_, _, _| Ok(()));

        mocks.build().join(2, 10).await.unwrap();
    }

    #[tokio::test]
    async fn test_removed_member_cannot_join() {
        let mut mocks = Mocks::new();
        mocks.space(Visibility::Public);
        mocks.repo.expect_find_member().returning(|cs, m| {
            let mut membership = fixtures::membership(cs, m, RequestToJoinStatus::Approved);
            membership.removed = true;
            Ok(Some(membership))
        });

        let err = mocks.build().join(2, 10).await.unwrap_err();
        assert!(matches!(err, ChatSpaceError::Removed));
    }

    #[tokio::test]
    async fn test_duplicate_join_request_conflicts() {
        let mut mocks = Mocks::new();
        mocks.space(Visibility::Private);
        mocks
            .repo
            .expect_find_member()
            .returning(|cs, m| Ok(Some(fixtures::membership(cs, m, RequestToJoinStatus::Pending))));

        let err = mocks
            .build()
            .request_to_join(2, 10, RequestToJoinRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ChatSpaceError::AlreadyRequested));
    }

    #[tokio::test]
    async fn test_request_to_join_private_space_notifies_organizer() {
        let mut mocks = Mocks::new();
        mocks.space(Visibility::Private);
        mocks.repo.expect_find_member().returning(|_, _| Ok(None));
        mocks
            .repo
            .expect_save_member()
            .withf(|m| m.request_to_join_status.is_pending() && m.join_reason.as_deref() == Some("Let me in"))
            .returning(|m| Ok(m.clone()));
        mocks
            .repo
            .expect_adjust_counters()
            .with(eq(10), eq(0), eq(1))
            .returning(|_, _, _| Ok(()));
        mocks
            .notifications
            .expect_create()
            .withf(|n| {
                n.receiver_id == 1
                    && n.notification_type == NotificationType::ChatSpaceJoinRequest
                    && n.params["name"] == "Kofi Mensah"
            })
            .times(1)
            .returning(|n| Ok(n.clone()));

        let request = RequestToJoinRequest {
            comment: Some("Let me in".into()),
        };
        mocks.build().request_to_join(2, 10, request).await.unwrap();
    }

    #[tokio::test]
    async fn test_approving_request_moves_counters_and_notifies() {
        let mut mocks = Mocks::new();
        mocks.space(Visibility::Private);
        mocks
            .repo
            .expect_find_member()
            .with(eq(10), eq(1))
            .returning(|cs, m| Ok(Some(fixtures::admin(cs, m))));
        mocks
            .repo
            .expect_find_member()
            .with(eq(10), eq(2))
            .returning(|cs, m| Ok(Some(fixtures::membership(cs, m, RequestToJoinStatus::Pending))));
        mocks
            .repo
            .expect_save_member()
            .withf(|m| m.is_active_member() && m.decision_reason.as_deref() == Some("Welcome"))
            .returning(|m| Ok(m.clone()));
        mocks
            .repo
            .expect_adjust_counters()
            .with(eq(10), eq(1), eq(-1))
            .times(1)
            .returning(|_, _, _| Ok(()));
        mocks
            .notifications
            .expect_create()
            .withf(|n| n.receiver_id == 2 && n.notification_type == NotificationType::ChatSpaceJoinApproved)
            .times(1)
            .returning(|n| Ok(n.clone()));

        let request = ProcessJoinRequest {
            member_id: 2,
            join_status: JoinDecision::Approved,
            comment: Some("Welcome".into()),
        };
        mocks.build().process_join_request(1, 10, request).await.unwrap();
    }

    #[tokio::test]
    async fn test_removing_active_member_decrements_members_and_remote_space() {
        let mut mocks = Mocks::new();
        mocks.synced_space();
        mocks.admin_and(Some(fixtures::membership(10, 2, RequestToJoinStatus::Approved)));
        mocks
            .repo
            .expect_save_member()
            .withf(|m| m.member_id == 2 && m.removed && !m.is_active_member())
            .times(1)
            .returning(|m| Ok(m.clone()));
        mocks
            .repo
            .expect_adjust_counters()
            .with(eq(10), eq(-1), eq(0))
            .times(1)
            .returning(|_, _, _| Ok(()));
        mocks
            .gateway
            .expect_remove_member()
            .withf(|space, email| space == "spaces/AAA" && email == "m2@fleenfeen.test")
            .times(1)
            .returning(|_, _| Ok(()));

        mocks.build().remove_member(1, 10, 2).await.unwrap();
    }

    #[tokio::test]
    async fn test_removing_pending_requester_only_drops_request_count() {
        let mut mocks = Mocks::new();
        mocks.synced_space();
        mocks.admin_and(Some(fixtures::membership(10, 2, RequestToJoinStatus::Pending)));
        mocks
            .repo
            .expect_save_member()
            .withf(|m| m.removed)
            .times(1)
            .returning(|m| Ok(m.clone()));
        mocks
            .repo
            .expect_adjust_counters()
            .with(eq(10), eq(0), eq(-1))
            .times(1)
            .returning(|_, _, _| Ok(()));
        mocks.gateway.expect_remove_member().times(0);

        mocks.build().remove_member(1, 10, 2).await.unwrap();
    }

    #[tokio::test]
    async fn test_restoring_removed_member_increments_members() {
        let mut mocks = Mocks::new();
        mocks.synced_space();
        let mut removed = fixtures::membership(10, 2, RequestToJoinStatus::Approved);
        removed.removed = true;
        mocks.admin_and(Some(removed));
        mocks
            .repo
            .expect_save_member()
            .withf(|m| m.member_id == 2 && m.is_active_member())
            .times(1)
            .returning(|m| Ok(m.clone()));
        mocks
            .repo
            .expect_adjust_counters()
            .with(eq(10), eq(1), eq(0))
            .times(1)
            .returning(|_, _, _| Ok(()));
        mocks
            .gateway
            .expect_add_member()
            .withf(|space, _| space == "spaces/AAA")
            .times(1)
            .returning(|_, _| Ok(()));

        mocks.build().restore_member(1, 10, 2).await.unwrap();
    }

    #[tokio::test]
    async fn test_restoring_member_who_was_never_removed_fails() {
        let mut mocks = Mocks::new();
        mocks.space(Visibility::Public);
        mocks.admin_and(Some(fixtures::membership(10, 2, RequestToJoinStatus::Approved)));

        let err = mocks.build().restore_member(1, 10, 2).await.unwrap_err();
        assert!(matches!(err, ChatSpaceError::NotRemoved));
    }

    #[tokio::test]
    async fn test_disapproving_request_only_drops_request_count_and_notifies() {
        let mut mocks = Mocks::new();
        mocks.synced_space();
        mocks.admin_and(Some(fixtures::membership(10, 2, RequestToJoinStatus::Pending)));
        mocks
            .repo
            .expect_save_member()
            .withf(|m| {
                m.request_to_join_status == RequestToJoinStatus::Disapproved
                    && !m.is_active_member()
                    && m.decision_reason.as_deref() == Some("Full")
            })
            .times(1)
            .returning(|m| Ok(m.clone()));
        mocks
            .repo
            .expect_adjust_counters()
            .with(eq(10), eq(0), eq(-1))
            .times(1)
            .returning(|_, _, _| Ok(()));
        mocks.gateway.expect_add_member().times(0);
        mocks
            .notifications
            .expect_create()
            .withf(|n| n.receiver_id == 2 && n.notification_type == NotificationType::ChatSpaceJoinDisapproved)
            .times(1)
            .returning(|n| Ok(n.clone()));

        let request = ProcessJoinRequest {
            member_id: 2,
            join_status: JoinDecision::Disapproved,
            comment: Some("Full".into()),
        };
        mocks.build().process_join_request(1, 10, request).await.unwrap();
    }

    #[tokio::test]
    async fn test_member_who_left_cannot_be_promoted() {
        let mut mocks = Mocks::new();
        mocks.space(Visibility::Public);
        let mut departed = fixtures::membership(10, 2, RequestToJoinStatus::Approved);
        departed.left = true;
        mocks.admin_and(Some(departed));
        mocks.repo.expect_save_member().times(0);

        let err = mocks.build().promote_to_admin(1, 10, 2).await.unwrap_err();
        assert!(matches!(err, ChatSpaceError::NotAMember));
    }

    #[tokio::test]
    async fn test_promote_active_member_to_admin() {
        let mut mocks = Mocks::new();
        mocks.space(Visibility::Public);
        mocks.admin_and(Some(fixtures::membership(10, 2, RequestToJoinStatus::Approved)));
        mocks
            .repo
            .expect_save_member()
            .withf(|m| m.member_id == 2 && m.is_admin())
            .times(1)
            .returning(|m| Ok(m.clone()));

        mocks.build().promote_to_admin(1, 10, 2).await.unwrap();
    }

    #[tokio::test]
    async fn test_non_admin_cannot_update() {
        let mut mocks = Mocks::new();
        mocks.space(Visibility::Public);
        mocks
            .repo
            .expect_find_member()
            .returning(|cs, m| Ok(Some(fixtures::membership(cs, m, RequestToJoinStatus::Approved))));

        let request = UpdateChatSpaceRequest {
            title: "New".into(),
            description: "New".into(),
            tags: None,
            guidelines_or_rules: None,
        };
        let err = mocks.build().update(2, 10, request).await.unwrap_err();
        assert!(matches!(err, ChatSpaceError::NotAdmin));
    }

    #[tokio::test]
    async fn test_organizer_cannot_leave() {
        let mut mocks = Mocks::new();
        mocks.space(Visibility::Public);

        let err = mocks.build().leave(1, 10).await.unwrap_err();
        assert!(matches!(err, ChatSpaceError::OrganizerCannotLeave));
    }

    #[tokio::test]
    async fn test_organizer_cannot_be_demoted() {
        let mut mocks = Mocks::new();
        mocks.space(Visibility::Public);
        mocks.repo.expect_find_member().returning(|cs, m| Ok(Some(fixtures::admin(cs, m))));

        let err = mocks.build().demote_admin(5, 10, 1).await.unwrap_err();
        assert!(matches!(err, ChatSpaceError::CannotDemoteOrganizer));
    }

    #[tokio::test]
    async fn test_inactive_space_hidden_from_non_admins() {
        let mut mocks = Mocks::new();
        mocks.repo.expect_find_by_id().returning(|id| {
            Ok(Some(ChatSpace {
                status: ChatSpaceStatus::Inactive,
                ..fixtures::chat_space(id, 1)
            }))
        });
        mocks.repo.expect_find_member().returning(|_, _| Ok(None));

        let err = mocks.build().get(2, 10).await.unwrap_err();
        assert!(matches!(err, ChatSpaceError::Inactive));
    }

    #[tokio::test]
    async fn test_get_resolves_join_status() {
        let mut mocks = Mocks::new();
        mocks.space(Visibility::Private);
        mocks.repo.expect_find_member().returning(|_, _| Ok(None));
        mocks.likes.expect_find().returning(|_, _, _| Ok(None));

        let detail = mocks.build().get(2, 10).await.unwrap();
        assert_eq!(detail.join_status.value, "REQUEST_TO_JOIN");
        assert!(!detail.is_admin);
        assert!(!detail.has_liked);
    }
}
