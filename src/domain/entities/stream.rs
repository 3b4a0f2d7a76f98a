//! Stream (event or live broadcast) entity, attendees, and repository trait.
//!
//! Maps to the `streams` and `stream_attendees` tables.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{string_enum, RequestToJoinStatus, Visibility};
use crate::shared::error::AppError;
use crate::shared::pagination::SearchRequest;

string_enum! {
    pub enum StreamType {
        Event = "EVENT",
        LiveStream = "LIVE_STREAM",
    }
}

string_enum! {
    pub enum StreamSource {
        GoogleMeet = "GOOGLE_MEET",
        Youtube = "YOUTUBE",
    }
}

string_enum! {
    pub enum StreamStatus {
        Active = "ACTIVE",
        Cancelled = "CANCELLED",
    }
}

string_enum! {
    /// Time-based filter for stream searches.
    pub enum StreamTimeFilter {
        Upcoming = "UPCOMING",
        Past = "PAST",
        Live = "LIVE",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stream {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub tags: Option<String>,
    pub location: String,
    pub timezone: String,
    pub scheduled_start_date: DateTime<Utc>,
    pub scheduled_end_date: DateTime<Utc>,
    pub stream_type: StreamType,
    pub stream_source: StreamSource,
    pub visibility: Visibility,
    pub stream_status: StreamStatus,
    pub organizer_id: i64,
    pub organizer_alias: Option<String>,
    pub organizer_email: Option<String>,
    pub organizer_phone: Option<String>,
    pub chat_space_id: Option<i64>,
    /// Remote calendar event or broadcast id
    pub external_id: Option<String>,
    pub stream_link: Option<String>,
    pub made_for_kids: bool,
    pub total_attendees: i64,
    pub total_likes: i64,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Stream {
    pub fn is_organizer(&self, member_id: i64) -> bool {
        self.organizer_id == member_id
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.stream_status, StreamStatus::Cancelled)
    }

    pub fn has_ended(&self, now: DateTime<Utc>) -> bool {
        self.scheduled_end_date <= now
    }

    pub fn is_ongoing(&self, now: DateTime<Utc>) -> bool {
        self.scheduled_start_date <= now && now < self.scheduled_end_date
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamAttendee {
    pub id: i64,
    pub stream_id: i64,
    pub member_id: i64,
    pub request_to_join_status: RequestToJoinStatus,
    pub is_attending: bool,
    pub attendee_comment: Option<String>,
    pub organizer_comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StreamAttendee {
    pub fn new(id: i64, stream_id: i64, member_id: i64, status: RequestToJoinStatus) -> Self {
        let now = Utc::now();
        Self {
            id,
            stream_id,
            member_id,
            is_attending: status.is_approved(),
            request_to_join_status: status,
            attendee_comment: None,
            organizer_comment: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Attendee joined with the member's display fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamAttendeeView {
    pub attendee: StreamAttendee,
    pub full_name: String,
    pub username: String,
    pub email_address: String,
}

/// Repository trait for streams and their attendees.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StreamRepository: Send + Sync {
    /// Find a stream that is not deleted.
    async fn find_by_id(&self, id: i64) -> Result<Option<Stream>, AppError>;

    async fn create(&self, stream: &Stream, organizer: &StreamAttendee) -> Result<Stream, AppError>;

    async fn update(&self, stream: &Stream) -> Result<Stream, AppError>;

    async fn soft_delete(&self, id: i64) -> Result<(), AppError>;

    async fn search(
        &self,
        filter: Option<StreamTimeFilter>,
        now: DateTime<Utc>,
        request: &SearchRequest,
    ) -> Result<(Vec<Stream>, i64), AppError>;

    async fn find_by_organizer(
        &self,
        organizer_id: i64,
        request: &SearchRequest,
    ) -> Result<(Vec<Stream>, i64), AppError>;

    /// Streams the member is an approved, attending attendee of.
    async fn find_attending(
        &self,
        member_id: i64,
        request: &SearchRequest,
    ) -> Result<(Vec<Stream>, i64), AppError>;

    /// Adjust `total_attendees` by a delta, never below zero.
    async fn adjust_attendees(&self, id: i64, delta: i64) -> Result<(), AppError>;

    async fn find_attendee(&self, stream_id: i64, member_id: i64) -> Result<Option<StreamAttendee>, AppError>;

    /// Insert or update the attendee row keyed by (stream_id, member_id).
    async fn save_attendee(&self, attendee: &StreamAttendee) -> Result<StreamAttendee, AppError>;

    async fn find_attendees(
        &self,
        stream_id: i64,
        request: &SearchRequest,
    ) -> Result<(Vec<StreamAttendeeView>, i64), AppError>;

    async fn find_join_requests(
        &self,
        stream_id: i64,
        request: &SearchRequest,
    ) -> Result<(Vec<StreamAttendeeView>, i64), AppError>;

    /// Member ids of every approved attendee still attending.
    async fn find_attending_member_ids(&self, stream_id: i64) -> Result<Vec<i64>, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_stream_time_state() {
        let now = Utc::now();
        let stream = Stream {
            id: 1,
            title: "Launch".into(),
            description: String::new(),
            tags: None,
            location: "Online".into(),
            timezone: "Africa/Lagos".into(),
            scheduled_start_date: now - Duration::minutes(10),
            scheduled_end_date: now + Duration::minutes(50),
            stream_type: StreamType::Event,
            stream_source: StreamSource::GoogleMeet,
            visibility: Visibility::Public,
            stream_status: StreamStatus::Active,
            organizer_id: 7,
            organizer_alias: None,
            organizer_email: None,
            organizer_phone: None,
            chat_space_id: None,
            external_id: None,
            stream_link: None,
            made_for_kids: false,
            total_attendees: 1,
            total_likes: 0,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        };

        assert!(stream.is_ongoing(now));
        assert!(!stream.has_ended(now));
        assert!(stream.has_ended(now + Duration::hours(1)));
    }

    #[test]
    fn test_new_attendee_attends_only_when_approved() {
        assert!(StreamAttendee::new(1, 2, 3, RequestToJoinStatus::Approved).is_attending);
        assert!(!StreamAttendee::new(1, 2, 3, RequestToJoinStatus::Pending).is_attending);
    }
}
