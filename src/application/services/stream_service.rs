//! Stream Service
//!
//! Events and live broadcasts and their attendees.
//!
//! Events are mirrored to the Google Calendar of the organizer's country and
//! live streams to a YouTube broadcast. Mirroring is best-effort: a remote
//! failure is logged and the stream is kept locally without a link.
//! `total_attendees` counts approved attendees that are still attending.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::application::dto::stream::{
    CreateStreamRequest, JoinStreamRequest, ProcessAttendeeRequest, RescheduleStreamRequest, StreamAttendeeResponse,
    StreamDetailResponse, StreamResponse, UpdateStreamRequest,
};
use crate::application::services::log_remote_failure;
use crate::application::services::notification_service::{NewNotification, Notifier};
use crate::domain::gateways::{
    CalendarGateway, EventPublisher, LiveBroadcastGateway, RemoteSchedule, StreamCreatedEvent,
};
use crate::domain::services::{resolve_attendance, validate_schedule, ScheduleViolation};
use crate::domain::{
    CalendarRepository, ChatSpaceRepository, JoinDecision, MemberRepository, NotificationType, ParentType,
    RequestToJoinStatus, Stream, StreamAttendee, StreamAttendeeView, StreamRepository, StreamSource, StreamStatus,
    StreamTimeFilter, StreamType, Visibility,
};
use crate::shared::error::AppError;
use crate::shared::pagination::{SearchRequest, SearchResult};
use crate::shared::snowflake::SnowflakeGenerator;

#[async_trait]
pub trait StreamService: Send + Sync {
    async fn create_event(&self, organizer_id: i64, request: CreateStreamRequest) -> Result<StreamResponse, StreamError>;

    async fn create_live_stream(
        &self,
        organizer_id: i64,
        request: CreateStreamRequest,
    ) -> Result<StreamResponse, StreamError>;

    async fn update(
        &self,
        member_id: i64,
        stream_id: i64,
        request: UpdateStreamRequest,
    ) -> Result<StreamResponse, StreamError>;

    async fn reschedule(
        &self,
        member_id: i64,
        stream_id: i64,
        request: RescheduleStreamRequest,
    ) -> Result<StreamResponse, StreamError>;

    async fn update_visibility(
        &self,
        member_id: i64,
        stream_id: i64,
        visibility: Visibility,
    ) -> Result<StreamResponse, StreamError>;

    /// Cancel an upcoming stream and tell its attendees.
    async fn cancel(&self, member_id: i64, stream_id: i64) -> Result<StreamResponse, StreamError>;

    async fn delete(&self, member_id: i64, stream_id: i64) -> Result<(), StreamError>;

    async fn get(&self, viewer_id: i64, stream_id: i64) -> Result<StreamDetailResponse, StreamError>;

    async fn search(
        &self,
        filter: Option<StreamTimeFilter>,
        request: &SearchRequest,
    ) -> Result<SearchResult<StreamResponse>, StreamError>;

    async fn find_mine(&self, member_id: i64, request: &SearchRequest) -> Result<SearchResult<StreamResponse>, StreamError>;

    async fn find_attending(
        &self,
        member_id: i64,
        request: &SearchRequest,
    ) -> Result<SearchResult<StreamResponse>, StreamError>;

    async fn join(&self, member_id: i64, stream_id: i64) -> Result<(), StreamError>;

    async fn request_to_join(&self, member_id: i64, stream_id: i64, request: JoinStreamRequest) -> Result<(), StreamError>;

    async fn process_join_request(
        &self,
        organizer_id: i64,
        stream_id: i64,
        request: ProcessAttendeeRequest,
    ) -> Result<(), StreamError>;

    async fn not_attending(&self, member_id: i64, stream_id: i64) -> Result<(), StreamError>;

    async fn find_attendees(
        &self,
        viewer_id: i64,
        stream_id: i64,
        request: &SearchRequest,
    ) -> Result<SearchResult<StreamAttendeeResponse>, StreamError>;

    async fn find_join_requests(
        &self,
        organizer_id: i64,
        stream_id: i64,
        request: &SearchRequest,
    ) -> Result<SearchResult<StreamAttendeeResponse>, StreamError>;
}

/// Stream service errors
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("Stream not found")]
    NotFound,

    #[error("Member not found")]
    MemberNotFound,

    #[error("Not the stream organizer")]
    NotOrganizer,

    #[error("Invalid schedule: {0:?}")]
    InvalidSchedule(ScheduleViolation),

    #[error("Stream was cancelled")]
    Cancelled,

    #[error("Stream has ended")]
    Ended,

    #[error("Private streams require a join request")]
    PrivateRequestToJoin,

    #[error("Already attending")]
    AlreadyAttending,

    #[error("Join request already pending")]
    AlreadyRequested,

    #[error("Join request not found")]
    JoinRequestNotFound,

    #[error("Not attending the stream")]
    NotAttending,

    #[error("Organizer cannot leave the stream")]
    OrganizerCannotLeave,

    #[error("Attendees of private streams are only visible to attendees")]
    AttendeesOnly,

    #[error("Chat space not found")]
    ChatSpaceNotFound,

    #[error("Not a chat space admin")]
    NotChatSpaceAdmin,

    #[error(transparent)]
    Repository(#[from] AppError),
}

impl From<StreamError> for AppError {
    fn from(err: StreamError) -> Self {
        use StreamError::*;
        match err {
            NotFound => AppError::NotFound("stream.not.found".into()),
            MemberNotFound => AppError::NotFound("member.not.found".into()),
            NotOrganizer => AppError::Forbidden("stream.not.organizer".into()),
            InvalidSchedule(v) => AppError::BadRequest(v.message_key().into()),
            Cancelled => AppError::Forbidden("stream.cancelled".into()),
            Ended => AppError::Conflict("stream.ended".into()),
            PrivateRequestToJoin => AppError::Forbidden("stream.private.request.to.join".into()),
            AlreadyAttending => AppError::Conflict("stream.already.attending".into()),
            AlreadyRequested => AppError::Conflict("stream.join.request.already.pending".into()),
            JoinRequestNotFound => AppError::NotFound("stream.join.request.not.found".into()),
            NotAttending => AppError::NotFound("stream.not.attending".into()),
            OrganizerCannotLeave => AppError::Conflict("stream.organizer.cannot.leave".into()),
            AttendeesOnly => AppError::Forbidden("stream.attendees.only".into()),
            ChatSpaceNotFound => AppError::NotFound("chat.space.not.found".into()),
            NotChatSpaceAdmin => AppError::Forbidden("chat.space.not.admin".into()),
            Repository(e) => e,
        }
    }
}

/// Remote side of streams: calendars, broadcasts and the event channel.
#[derive(Clone)]
pub struct StreamGateways {
    pub calendar: Arc<dyn CalendarGateway>,
    pub broadcast: Arc<dyn LiveBroadcastGateway>,
    pub events: Arc<dyn EventPublisher>,
}

pub struct StreamServiceImpl {
    repo: Arc<dyn StreamRepository>,
    members: Arc<dyn MemberRepository>,
    chat_spaces: Arc<dyn ChatSpaceRepository>,
    calendars: Arc<dyn CalendarRepository>,
    gateways: StreamGateways,
    notifier: Notifier,
    id_generator: Arc<SnowflakeGenerator>,
}

fn schedule_of(stream: &Stream) -> RemoteSchedule {
    RemoteSchedule {
        title: stream.title.clone(),
        description: stream.description.clone(),
        location: stream.location.clone(),
        timezone: stream.timezone.clone(),
        start: stream.scheduled_start_date,
        end: stream.scheduled_end_date,
        made_for_kids: stream.made_for_kids,
        is_private: stream.visibility.is_private(),
    }
}

fn clean(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

impl StreamServiceImpl {
    pub fn new(
        repo: Arc<dyn StreamRepository>,
        members: Arc<dyn MemberRepository>,
        chat_spaces: Arc<dyn ChatSpaceRepository>,
        calendars: Arc<dyn CalendarRepository>,
        gateways: StreamGateways,
        notifier: Notifier,
        id_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            repo,
            members,
            chat_spaces,
            calendars,
            gateways,
            notifier,
            id_generator,
        }
    }

    async fn find(&self, stream_id: i64) -> Result<Stream, StreamError> {
        self.repo.find_by_id(stream_id).await?.ok_or(StreamError::NotFound)
    }

    async fn find_as_organizer(&self, member_id: i64, stream_id: i64) -> Result<Stream, StreamError> {
        let stream = self.find(stream_id).await?;
        if !stream.is_organizer(member_id) {
            return Err(StreamError::NotOrganizer);
        }
        Ok(stream)
    }

    /// Streams accept attendees only while active and not over.
    fn ensure_joinable(stream: &Stream) -> Result<(), StreamError> {
        if stream.is_cancelled() {
            return Err(StreamError::Cancelled);
        }
        if stream.has_ended(Utc::now()) {
            return Err(StreamError::Ended);
        }
        Ok(())
    }

    /// Remote id of the active calendar of a country.
    async fn calendar_for_country(&self, country: Option<&str>) -> Result<Option<String>, StreamError> {
        let Some(country) = country else {
            return Ok(None);
        };
        Ok(self
            .calendars
            .find_active_by_code(country)
            .await?
            .and_then(|c| c.external_id))
    }

    /// Remote calendar of the organizer's country, if one is active.
    async fn organizer_calendar_id(&self, organizer_id: i64) -> Result<Option<String>, StreamError> {
        let member = self.members.find_by_id(organizer_id).await?;
        self.calendar_for_country(member.as_ref().and_then(|m| m.country.as_deref()))
            .await
    }

    async fn display_name(&self, member_id: i64) -> Result<String, StreamError> {
        Ok(self
            .members
            .find_by_id(member_id)
            .await?
            .map(|m| m.full_name())
            .unwrap_or_default())
    }

    async fn create(
        &self,
        organizer_id: i64,
        request: CreateStreamRequest,
        stream_type: StreamType,
    ) -> Result<StreamResponse, StreamError> {
        let now = Utc::now();
        validate_schedule(
            request.scheduled_start_date,
            request.scheduled_end_date,
            &request.timezone,
            now,
        )
        .map_err(StreamError::InvalidSchedule)?;

        if let Some(chat_space_id) = request.chat_space_id {
            self.chat_spaces
                .find_by_id(chat_space_id)
                .await?
                .ok_or(StreamError::ChatSpaceNotFound)?;
            let is_admin = self
                .chat_spaces
                .find_member(chat_space_id, organizer_id)
                .await?
                .is_some_and(|m| m.is_admin());
            if !is_admin {
                return Err(StreamError::NotChatSpaceAdmin);
            }
        }

        let organizer = self
            .members
            .find_by_id(organizer_id)
            .await?
            .ok_or(StreamError::MemberNotFound)?;

        let mut stream = Stream {
            id: self.id_generator.generate(),
            title: request.title.trim().to_string(),
            description: request.description.trim().to_string(),
            tags: clean(request.tags),
            location: request.location.trim().to_string(),
            timezone: request.timezone.trim().to_string(),
            scheduled_start_date: request.scheduled_start_date,
            scheduled_end_date: request.scheduled_end_date,
            stream_source: match stream_type {
                StreamType::Event => StreamSource::GoogleMeet,
                StreamType::LiveStream => StreamSource::Youtube,
            },
            stream_type,
            visibility: request.visibility,
            stream_status: StreamStatus::Active,
            organizer_id,
            organizer_alias: clean(request.organizer_alias),
            organizer_email: clean(request.organizer_email).or_else(|| Some(organizer.email_address.clone())),
            organizer_phone: clean(request.organizer_phone),
            chat_space_id: request.chat_space_id,
            external_id: None,
            stream_link: None,
            made_for_kids: request.made_for_kids,
            total_attendees: 1,
            total_likes: 0,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        };

        let schedule = schedule_of(&stream);
        let remote = match stream_type {
            StreamType::Event => match self.calendar_for_country(organizer.country.as_deref()).await? {
                Some(calendar_id) => log_remote_failure(
                    self.gateways
                        .calendar
                        .create_event(&calendar_id, &schedule, &organizer.email_address)
                        .await,
                    "stream.create_event",
                    stream.id,
                )
                .flatten(),
                None => None,
            },
            StreamType::LiveStream => log_remote_failure(
                self.gateways.broadcast.create_broadcast(&schedule).await,
                "stream.create_broadcast",
                stream.id,
            )
            .flatten(),
        };
        if let Some(remote) = remote {
            stream.external_id = Some(remote.external_id);
            stream.stream_link = remote.link;
        }

        let attendee = StreamAttendee::new(
            self.id_generator.generate(),
            stream.id,
            organizer_id,
            RequestToJoinStatus::Approved,
        );
        let created = self.repo.create(&stream, &attendee).await?;

        let event = StreamCreatedEvent {
            stream_id: created.id.to_string(),
            title: created.title.clone(),
            organizer_id: created.organizer_id.to_string(),
            stream_type: created.stream_type.to_string(),
            scheduled_start_date: created.scheduled_start_date.to_rfc3339(),
        };
        let events = self.gateways.events.clone();
        tokio::spawn(async move {
            let stream_id = event.stream_id.clone();
            if let Err(e) = events.stream_created(event).await {
                warn!(stream_id = %stream_id, error = %e, "Failed to broadcast stream creation");
            }
        });

        info!(stream_id = created.id, organizer_id, %stream_type, "Stream created");
        Ok(created.into())
    }

    async fn mirror_update(&self, stream: &Stream) -> Result<(), StreamError> {
        let Some(external_id) = stream.external_id.as_deref() else {
            return Ok(());
        };
        let schedule = schedule_of(stream);
        match stream.stream_type {
            StreamType::Event => {
                if let Some(calendar_id) = self.organizer_calendar_id(stream.organizer_id).await? {
                    log_remote_failure(
                        self.gateways.calendar.update_event(&calendar_id, external_id, &schedule).await,
                        "stream.update_event",
                        stream.id,
                    );
                }
            }
            StreamType::LiveStream => {
                log_remote_failure(
                    self.gateways.broadcast.update_broadcast(external_id, &schedule).await,
                    "stream.update_broadcast",
                    stream.id,
                );
            }
        }
        Ok(())
    }

    async fn mirror_cancel(&self, stream: &Stream) -> Result<(), StreamError> {
        let Some(external_id) = stream.external_id.as_deref() else {
            return Ok(());
        };
        match stream.stream_type {
            StreamType::Event => {
                if let Some(calendar_id) = self.organizer_calendar_id(stream.organizer_id).await? {
                    log_remote_failure(
                        self.gateways.calendar.cancel_event(&calendar_id, external_id).await,
                        "stream.cancel_event",
                        stream.id,
                    );
                }
            }
            StreamType::LiveStream => {
                log_remote_failure(
                    self.gateways.broadcast.delete_broadcast(external_id).await,
                    "stream.delete_broadcast",
                    stream.id,
                );
            }
        }
        Ok(())
    }

    async fn mirror_add_attendee(&self, stream: &Stream, member_id: i64) -> Result<(), StreamError> {
        let (StreamType::Event, Some(event_id)) = (stream.stream_type, stream.external_id.as_deref()) else {
            return Ok(());
        };
        let Some(calendar_id) = self.organizer_calendar_id(stream.organizer_id).await? else {
            return Ok(());
        };
        if let Some(member) = self.members.find_by_id(member_id).await? {
            log_remote_failure(
                self.gateways
                    .calendar
                    .add_attendee(&calendar_id, event_id, &member.email_address)
                    .await,
                "stream.add_attendee",
                stream.id,
            );
        }
        Ok(())
    }

    async fn save_stream(&self, stream: &mut Stream) -> Result<Stream, StreamError> {
        stream.updated_at = Utc::now();
        Ok(self.repo.update(stream).await?)
    }

}

fn attendee_page(page: (Vec<StreamAttendeeView>, i64), request: &SearchRequest) -> SearchResult<StreamAttendeeResponse> {
    let (values, total) = page;
    SearchResult::new(values, total, request).map(StreamAttendeeResponse::from)
}

#[async_trait]
impl StreamService for StreamServiceImpl {
    #[instrument(skip(self, request))]
    async fn create_event(&self, organizer_id: i64, request: CreateStreamRequest) -> Result<StreamResponse, StreamError> {
        self.create(organizer_id, request, StreamType::Event).await
    }

    #[instrument(skip(self, request))]
    async fn create_live_stream(
        &self,
        organizer_id: i64,
        request: CreateStreamRequest,
    ) -> Result<StreamResponse, StreamError> {
        self.create(organizer_id, request, StreamType::LiveStream).await
    }

    #[instrument(skip(self, request))]
    async fn update(
        &self,
        member_id: i64,
        stream_id: i64,
        request: UpdateStreamRequest,
    ) -> Result<StreamResponse, StreamError> {
        let mut stream = self.find_as_organizer(member_id, stream_id).await?;
        stream.title = request.title.trim().to_string();
        stream.description = request.description.trim().to_string();
        stream.tags = clean(request.tags);
        stream.location = request.location.trim().to_string();
        stream.organizer_alias = clean(request.organizer_alias);
        stream.organizer_email = clean(request.organizer_email).or(stream.organizer_email);
        stream.organizer_phone = clean(request.organizer_phone);
        stream.made_for_kids = request.made_for_kids;

        let updated = self.save_stream(&mut stream).await?;
        self.mirror_update(&updated).await?;
        info!(stream_id, member_id, "Stream updated");
        Ok(updated.into())
    }

    #[instrument(skip(self, request))]
    async fn reschedule(
        &self,
        member_id: i64,
        stream_id: i64,
        request: RescheduleStreamRequest,
    ) -> Result<StreamResponse, StreamError> {
        let mut stream = self.find_as_organizer(member_id, stream_id).await?;
        if stream.is_cancelled() {
            return Err(StreamError::Cancelled);
        }
        validate_schedule(
            request.scheduled_start_date,
            request.scheduled_end_date,
            &request.timezone,
            Utc::now(),
        )
        .map_err(StreamError::InvalidSchedule)?;

        stream.timezone = request.timezone.trim().to_string();
        stream.scheduled_start_date = request.scheduled_start_date;
        stream.scheduled_end_date = request.scheduled_end_date;

        let updated = self.save_stream(&mut stream).await?;
        self.mirror_update(&updated).await?;
        info!(stream_id, member_id, start = %updated.scheduled_start_date, "Stream rescheduled");
        Ok(updated.into())
    }

    #[instrument(skip(self))]
    async fn update_visibility(
        &self,
        member_id: i64,
        stream_id: i64,
        visibility: Visibility,
    ) -> Result<StreamResponse, StreamError> {
        let mut stream = self.find_as_organizer(member_id, stream_id).await?;
        stream.visibility = visibility;
        let updated = self.save_stream(&mut stream).await?;
        self.mirror_update(&updated).await?;
        info!(stream_id, member_id, %visibility, "Stream visibility changed");
        Ok(updated.into())
    }

    #[instrument(skip(self))]
    async fn cancel(&self, member_id: i64, stream_id: i64) -> Result<StreamResponse, StreamError> {
        let mut stream = self.find_as_organizer(member_id, stream_id).await?;
        Self::ensure_joinable(&stream)?;

        stream.stream_status = StreamStatus::Cancelled;
        let updated = self.save_stream(&mut stream).await?;
        self.mirror_cancel(&updated).await?;

        let attendees = self.repo.find_attending_member_ids(stream_id).await?;
        for receiver_id in attendees {
            self.notifier
                .notify(NewNotification {
                    receiver_id,
                    initiator_id: Some(member_id),
                    notification_type: NotificationType::StreamCancelled,
                    parent: Some((ParentType::Stream, stream_id)),
                    params: json!({ "title": updated.title }),
                })
                .await;
        }

        info!(stream_id, member_id, "Stream cancelled");
        Ok(updated.into())
    }

    #[instrument(skip(self))]
    async fn delete(&self, member_id: i64, stream_id: i64) -> Result<(), StreamError> {
        let stream = self.find_as_organizer(member_id, stream_id).await?;
        self.repo.soft_delete(stream_id).await?;
        if !stream.is_cancelled() {
            self.mirror_cancel(&stream).await?;
        }
        info!(stream_id, member_id, "Stream deleted");
        Ok(())
    }

    async fn get(&self, viewer_id: i64, stream_id: i64) -> Result<StreamDetailResponse, StreamError> {
        let stream = self.find(stream_id).await?;
        let attendee = self.repo.find_attendee(stream_id, viewer_id).await?;
        let attendance = resolve_attendance(attendee.map(|a| (a.request_to_join_status, a.is_attending)));
        let now = Utc::now();

        Ok(StreamDetailResponse {
            attendance_status: attendance.info(),
            is_organizer: stream.is_organizer(viewer_id),
            has_ended: stream.has_ended(now),
            is_ongoing: stream.is_ongoing(now),
            stream: stream.into(),
        })
    }

    async fn search(
        &self,
        filter: Option<StreamTimeFilter>,
        request: &SearchRequest,
    ) -> Result<SearchResult<StreamResponse>, StreamError> {
        let (streams, total) = self.repo.search(filter, Utc::now(), request).await?;
        Ok(SearchResult::new(streams, total, request).map(StreamResponse::from))
    }

    async fn find_mine(&self, member_id: i64, request: &SearchRequest) -> Result<SearchResult<StreamResponse>, StreamError> {
        let (streams, total) = self.repo.find_by_organizer(member_id, request).await?;
        Ok(SearchResult::new(streams, total, request).map(StreamResponse::from))
    }

    async fn find_attending(
        &self,
        member_id: i64,
        request: &SearchRequest,
    ) -> Result<SearchResult<StreamResponse>, StreamError> {
        let (streams, total) = self.repo.find_attending(member_id, request).await?;
        Ok(SearchResult::new(streams, total, request).map(StreamResponse::from))
    }

    #[instrument(skip(self))]
    async fn join(&self, member_id: i64, stream_id: i64) -> Result<(), StreamError> {
        let stream = self.find(stream_id).await?;
        Self::ensure_joinable(&stream)?;
        if stream.visibility.is_private() {
            return Err(StreamError::PrivateRequestToJoin);
        }

        let attendee = match self.repo.find_attendee(stream_id, member_id).await? {
            Some(a) if a.request_to_join_status.is_approved() && a.is_attending => {
                return Err(StreamError::AlreadyAttending)
            }
            Some(mut a) => {
                a.request_to_join_status = RequestToJoinStatus::Approved;
                a.is_attending = true;
                a.updated_at = Utc::now();
                a
            }
            None => StreamAttendee::new(self.id_generator.generate(), stream_id, member_id, RequestToJoinStatus::Approved),
        };

        self.repo.save_attendee(&attendee).await?;
        self.repo.adjust_attendees(stream_id, 1).await?;
        self.mirror_add_attendee(&stream, member_id).await?;

        info!(stream_id, member_id, "Joined stream");
        Ok(())
    }

    #[instrument(skip(self, request))]
    async fn request_to_join(&self, member_id: i64, stream_id: i64, request: JoinStreamRequest) -> Result<(), StreamError> {
        let stream = self.find(stream_id).await?;
        if !stream.visibility.is_private() {
            return self.join(member_id, stream_id).await;
        }
        Self::ensure_joinable(&stream)?;

        let comment = clean(request.comment);
        let attendee = match self.repo.find_attendee(stream_id, member_id).await? {
            Some(a) if a.request_to_join_status.is_approved() && a.is_attending => {
                return Err(StreamError::AlreadyAttending)
            }
            Some(a) if a.request_to_join_status.is_pending() => return Err(StreamError::AlreadyRequested),
            Some(mut a) => {
                a.request_to_join_status = RequestToJoinStatus::Pending;
                a.is_attending = false;
                a.attendee_comment = comment;
                a.organizer_comment = None;
                a.updated_at = Utc::now();
                a
            }
            None => {
                let mut a =
                    StreamAttendee::new(self.id_generator.generate(), stream_id, member_id, RequestToJoinStatus::Pending);
                a.attendee_comment = comment;
                a
            }
        };
        self.repo.save_attendee(&attendee).await?;

        self.notifier
            .notify(NewNotification {
                receiver_id: stream.organizer_id,
                initiator_id: Some(member_id),
                notification_type: NotificationType::StreamJoinRequest,
                parent: Some((ParentType::Stream, stream_id)),
                params: json!({ "name": self.display_name(member_id).await?, "title": stream.title }),
            })
            .await;

        info!(stream_id, member_id, "Requested to join stream");
        Ok(())
    }

    #[instrument(skip(self, request), fields(attendee_id = request.attendee_id))]
    async fn process_join_request(
        &self,
        organizer_id: i64,
        stream_id: i64,
        request: ProcessAttendeeRequest,
    ) -> Result<(), StreamError> {
        let stream = self.find_as_organizer(organizer_id, stream_id).await?;
        let mut attendee = self
            .repo
            .find_attendee(stream_id, request.attendee_id)
            .await?
            .filter(|a| a.request_to_join_status.is_pending())
            .ok_or(StreamError::JoinRequestNotFound)?;

        let approved = matches!(request.join_status, JoinDecision::Approved);
        if approved {
            Self::ensure_joinable(&stream)?;
        }

        attendee.request_to_join_status = request.join_status.into();
        attendee.is_attending = approved;
        attendee.organizer_comment = clean(request.comment);
        attendee.updated_at = Utc::now();
        self.repo.save_attendee(&attendee).await?;

        let notification_type = if approved {
            self.repo.adjust_attendees(stream_id, 1).await?;
            self.mirror_add_attendee(&stream, request.attendee_id).await?;
            NotificationType::StreamJoinApproved
        } else {
            NotificationType::StreamJoinDisapproved
        };

        self.notifier
            .notify(NewNotification {
                receiver_id: request.attendee_id,
                initiator_id: Some(organizer_id),
                notification_type,
                parent: Some((ParentType::Stream, stream_id)),
                params: json!({ "title": stream.title }),
            })
            .await;

        info!(stream_id, organizer_id, decision = %request.join_status, "Stream join request processed");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn not_attending(&self, member_id: i64, stream_id: i64) -> Result<(), StreamError> {
        let stream = self.find(stream_id).await?;
        if stream.is_organizer(member_id) {
            return Err(StreamError::OrganizerCannotLeave);
        }
        let mut attendee = self
            .repo
            .find_attendee(stream_id, member_id)
            .await?
            .filter(|a| a.request_to_join_status.is_approved() && a.is_attending)
            .ok_or(StreamError::NotAttending)?;

        attendee.is_attending = false;
        attendee.updated_at = Utc::now();
        self.repo.save_attendee(&attendee).await?;
        self.repo.adjust_attendees(stream_id, -1).await?;

        info!(stream_id, member_id, "No longer attending stream");
        Ok(())
    }

    async fn find_attendees(
        &self,
        viewer_id: i64,
        stream_id: i64,
        request: &SearchRequest,
    ) -> Result<SearchResult<StreamAttendeeResponse>, StreamError> {
        let stream = self.find(stream_id).await?;
        if stream.visibility.is_private() && !stream.is_organizer(viewer_id) {
            let attending = self
                .repo
                .find_attendee(stream_id, viewer_id)
                .await?
                .is_some_and(|a| a.request_to_join_status.is_approved() && a.is_attending);
            if !attending {
                return Err(StreamError::AttendeesOnly);
            }
        }
        let page = self.repo.find_attendees(stream_id, request).await?;
        Ok(attendee_page(page, request))
    }

    async fn find_join_requests(
        &self,
        organizer_id: i64,
        stream_id: i64,
        request: &SearchRequest,
    ) -> Result<SearchResult<StreamAttendeeResponse>, StreamError> {
        self.find_as_organizer(organizer_id, stream_id).await?;
        let page = self.repo.find_join_requests(stream_id, request).await?;
        Ok(attendee_page(page, request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::fixtures;
    use crate::domain::gateways::{MockCalendarGateway, MockEventPublisher, MockLiveBroadcastGateway, RemoteResource};
    use crate::domain::{
        Calendar, Member, MockCalendarRepository, MockChatSpaceRepository, MockMemberRepository,
        MockNotificationRepository, MockStreamRepository,
    };
    use chrono::Duration;
    use mockall::predicate::eq;
    use pretty_assertions::assert_eq;

    struct Mocks {
        repo: MockStreamRepository,
        members: MockMemberRepository,
        chat_spaces: MockChatSpaceRepository,
        calendars: MockCalendarRepository,
        calendar: MockCalendarGateway,
        broadcast: MockLiveBroadcastGateway,
        events: MockEventPublisher,
        notifications: MockNotificationRepository,
    }

    impl Mocks {
        fn new() -> Self {
            let mut members = MockMemberRepository::new();
            members.expect_find_by_id().returning(|id| {
                Ok(Some(Member {
                    id,
                    email_address: format!("m{id}@fleenfeen.test"),
                    first_name: "Amaka".into(),
                    last_name: "Obi".into(),
                    country: Some("NG".into()),
                    ..Default::default()
                }))
            });
            let mut events = MockEventPublisher::new();
            events.expect_stream_created().returning(|_| Ok(()));
            Self {
                repo: MockStreamRepository::new(),
                members,
                chat_spaces: MockChatSpaceRepository::new(),
                calendars: MockCalendarRepository::new(),
                calendar: MockCalendarGateway::new(),
                broadcast: MockLiveBroadcastGateway::new(),
                events,
                notifications: MockNotificationRepository::new(),
            }
        }

        fn stream(&mut self, stream: Stream) {
            self.repo.expect_find_by_id().returning(move |_| Ok(Some(stream.clone())));
        }

        fn build(self) -> StreamServiceImpl {
            let ids = Arc::new(SnowflakeGenerator::new(1, 1));
            StreamServiceImpl::new(
                Arc::new(self.repo),
                Arc::new(self.members),
                Arc::new(self.chat_spaces),
                Arc::new(self.calendars),
                StreamGateways {
                    calendar: Arc::new(self.calendar),
                    broadcast: Arc::new(self.broadcast),
                    events: Arc::new(self.events),
                },
                Notifier::new(Arc::new(self.notifications), ids.clone()),
                ids,
            )
        }
    }

    fn create_request(start_in_hours: i64) -> CreateStreamRequest {
        let start = Utc::now() + Duration::hours(start_in_hours);
        CreateStreamRequest {
            title: "Launch party".into(),
            description: "Product launch".into(),
            tags: None,
            location: "Lagos".into(),
            timezone: "Africa/Lagos".into(),
            scheduled_start_date: start,
            scheduled_end_date: start + Duration::hours(2),
            visibility: Visibility::Public,
            organizer_alias: None,
            organizer_email: None,
            organizer_phone: None,
            chat_space_id: None,
            made_for_kids: false,
        }
    }

    fn nigeria_calendar() -> Calendar {
        Calendar {
            id: 1,
            title: "Nigeria".into(),
            description: String::new(),
            external_id: Some("ng@group.calendar.google.com".into()),
            code: "NG".into(),
            timezone: "Africa/Lagos".into(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_event_rejects_past_start() {
        let err = Mocks::new().build().create_event(1, create_request(-2)).await.unwrap_err();
        assert!(matches!(err, StreamError::InvalidSchedule(ScheduleViolation::StartInPast)));
        assert_eq!(AppError::from(err).message_key(), "stream.start.in.past");
    }

    #[tokio::test]
    async fn test_create_event_mirrors_to_country_calendar() {
        let mut mocks = Mocks::new();
        mocks
            .calendars
            .expect_find_active_by_code()
            .withf(|code| code == "NG")
            .returning(|_| Ok(Some(nigeria_calendar())));
        mocks
            .calendar
            .expect_create_event()
            .withf(|calendar_id, _, organizer| calendar_id == "ng@group.calendar.google.com" && organizer == "m1@fleenfeen.test")
            .returning(|_, _, _| {
                Ok(Some(RemoteResource {
                    external_id: "evt123".into(),
                    link: Some("https://meet.google.com/abc".into()),
                }))
            });
        mocks
            .repo
            .expect_create()
            .withf(|stream, attendee| {
                stream.external_id.as_deref() == Some("evt123")
                    && stream.stream_source == StreamSource::GoogleMeet
                    && attendee.member_id == 1
                    && attendee.is_attending
            })
            .returning(|stream, _| Ok(stream.clone()));

        let created = mocks.build().create_event(1, create_request(24)).await.unwrap();
        assert_eq!(created.stream_link.as_deref(), Some("https://meet.google.com/abc"));
        assert_eq!(created.organizer_email.as_deref(), Some("m1@fleenfeen.test"));
    }

    #[tokio::test]
    async fn test_create_in_chat_space_requires_admin() {
        let mut mocks = Mocks::new();
        mocks
            .chat_spaces
            .expect_find_by_id()
            .returning(|id| Ok(Some(fixtures::chat_space(id, 9))));
        mocks
            .chat_spaces
            .expect_find_member()
            .returning(|cs, m| Ok(Some(fixtures::membership(cs, m, RequestToJoinStatus::Approved))));

        let request = CreateStreamRequest {
            chat_space_id: Some(10),
            ..create_request(24)
        };
        let err = mocks.build().create_live_stream(1, request).await.unwrap_err();
        assert!(matches!(err, StreamError::NotChatSpaceAdmin));
    }

    #[tokio::test]
    async fn test_join_private_stream_forbidden() {
        let mut mocks = Mocks::new();
        mocks.stream(Stream {
            visibility: Visibility::Private,
            ..fixtures::stream(5, 1)
        });

        let err = mocks.build().join(2, 5).await.unwrap_err();
        assert!(matches!(err, StreamError::PrivateRequestToJoin));
    }

    #[tokio::test]
    async fn test_join_ended_stream_conflicts() {
        let mut mocks = Mocks::new();
        mocks.stream(fixtures::ended_stream(5, 1));

        let err = mocks.build().join(2, 5).await.unwrap_err();
        assert_eq!(AppError::from(err).status(), axum::http::StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_join_cancelled_stream_forbidden() {
        let mut mocks = Mocks::new();
        mocks.stream(Stream {
            stream_status: StreamStatus::Cancelled,
            ..fixtures::stream(5, 1)
        });

        let err = mocks.build().join(2, 5).await.unwrap_err();
        assert!(matches!(err, StreamError::Cancelled));
    }

    #[tokio::test]
    async fn test_join_public_stream_counts_attendee() {
        let mut mocks = Mocks::new();
        mocks.stream(fixtures::stream(5, 1));
        mocks.repo.expect_find_attendee().returning(|_, _| Ok(None));
        mocks
            .repo
            .expect_save_attendee()
            .withf(|a| a.member_id == 2 && a.is_attending)
            .returning(|a| Ok(a.clone()));
        mocks
            .repo
            .expect_adjust_attendees()
            .with(eq(5), eq(1))
            .times(1)
            .returning(|_, _| Ok(()));

        mocks.build().join(2, 5).await.unwrap();
    }

    #[tokio::test]
    async fn test_request_to_join_private_stream_notifies_organizer() {
        let mut mocks = Mocks::new();
        mocks.stream(Stream {
            visibility: Visibility::Private,
            ..fixtures::stream(5, 1)
        });
        mocks.repo.expect_find_attendee().returning(|_, _| Ok(None));
        mocks
            .repo
            .expect_save_attendee()
            .withf(|a| a.request_to_join_status.is_pending() && !a.is_attending)
            .returning(|a| Ok(a.clone()));
        mocks
            .notifications
            .expect_create()
            .withf(|n| n.receiver_id == 1 && n.notification_type == NotificationType::StreamJoinRequest)
            .times(1)
            .returning(|n| Ok(n.clone()));

        mocks
            .build()
            .request_to_join(2, 5, JoinStreamRequest::default())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_only_organizer_processes_requests() {
        let mut mocks = Mocks::new();
        mocks.stream(fixtures::stream(5, 1));

        let request = ProcessAttendeeRequest {
            attendee_id: 3,
            join_status: JoinDecision::Approved,
            comment: None,
        };
        let err = mocks.build().process_join_request(2, 5, request).await.unwrap_err();
        assert!(matches!(err, StreamError::NotOrganizer));
    }

    #[tokio::test]
    async fn test_organizer_cannot_leave() {
        let mut mocks = Mocks::new();
        mocks.stream(fixtures::stream(5, 1));

        let err = mocks.build().not_attending(1, 5).await.unwrap_err();
        assert!(matches!(err, StreamError::OrganizerCannotLeave));
    }

    #[tokio::test]
    async fn test_not_attending_decrements() {
        let mut mocks = Mocks::new();
        mocks.stream(fixtures::stream(5, 1));
        mocks
            .repo
            .expect_find_attendee()
            .returning(|s, m| Ok(Some(StreamAttendee::new(50, s, m, RequestToJoinStatus::Approved))));
        mocks
            .repo
            .expect_save_attendee()
            .withf(|a| !a.is_attending)
            .returning(|a| Ok(a.clone()));
        mocks
            .repo
            .expect_adjust_attendees()
            .with(eq(5), eq(-1))
            .times(1)
            .returning(|_, _| Ok(()));

        mocks.build().not_attending(2, 5).await.unwrap();
    }

    #[tokio::test]
    async fn test_cancel_notifies_attendees() {
        let mut mocks = Mocks::new();
        mocks.stream(fixtures::stream(5, 1));
        mocks.repo.expect_update().returning(|s| Ok(s.clone()));
        mocks
            .repo
            .expect_find_attending_member_ids()
            .returning(|_| Ok(vec![1, 2, 3]));
        mocks
            .notifications
            .expect_create()
            .withf(|n| n.notification_type == NotificationType::StreamCancelled)
            .times(2)
            .returning(|n| Ok(n.clone()));

        let cancelled = mocks.build().cancel(1, 5).await.unwrap();
        assert_eq!(cancelled.stream_status.value, "CANCELLED");
    }

    #[tokio::test]
    async fn test_get_reports_attendance() {
        let mut mocks = Mocks::new();
        mocks.stream(fixtures::stream(5, 1));
        mocks
            .repo
            .expect_find_attendee()
            .returning(|s, m| Ok(Some(StreamAttendee::new(50, s, m, RequestToJoinStatus::Pending))));

        let detail = mocks.build().get(2, 5).await.unwrap();
        assert_eq!(detail.attendance_status.value, "PENDING");
        assert!(!detail.is_organizer);
        assert!(!detail.has_ended);
    }
}
