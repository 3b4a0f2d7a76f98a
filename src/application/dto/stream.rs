//! Stream and attendee DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::{EnumInfo, JoinDecision, Stream, StreamAttendeeView, StreamTimeFilter, Visibility};

/// Body of both event and live stream creation; the route picks the type.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateStreamRequest {
    #[validate(length(min = 1, max = 500, message = "stream.title.length"))]
    pub title: String,

    #[validate(length(min = 1, max = 3000, message = "stream.description.length"))]
    pub description: String,

    #[validate(length(max = 300, message = "tags.too.long"))]
    pub tags: Option<String>,

    #[validate(length(min = 1, max = 400, message = "stream.location.length"))]
    pub location: String,

    #[validate(length(min = 1, max = 64, message = "stream.invalid.timezone"))]
    pub timezone: String,

    pub scheduled_start_date: DateTime<Utc>,
    pub scheduled_end_date: DateTime<Utc>,
    pub visibility: Visibility,

    #[validate(length(max = 100, message = "stream.organizer.alias.too.long"))]
    pub organizer_alias: Option<String>,

    #[validate(email(message = "email.invalid"))]
    pub organizer_email: Option<String>,

    #[validate(length(max = 20, message = "phone.number.too.long"))]
    pub organizer_phone: Option<String>,

    #[serde(default, with = "super::id_format::option")]
    pub chat_space_id: Option<i64>,

    #[serde(default)]
    pub made_for_kids: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateStreamRequest {
    #[validate(length(min = 1, max = 500, message = "stream.title.length"))]
    pub title: String,

    #[validate(length(min = 1, max = 3000, message = "stream.description.length"))]
    pub description: String,

    #[validate(length(max = 300, message = "tags.too.long"))]
    pub tags: Option<String>,

    #[validate(length(min = 1, max = 400, message = "stream.location.length"))]
    pub location: String,

    #[validate(length(max = 100, message = "stream.organizer.alias.too.long"))]
    pub organizer_alias: Option<String>,

    #[validate(email(message = "email.invalid"))]
    pub organizer_email: Option<String>,

    #[validate(length(max = 20, message = "phone.number.too.long"))]
    pub organizer_phone: Option<String>,

    #[serde(default)]
    pub made_for_kids: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RescheduleStreamRequest {
    #[validate(length(min = 1, max = 64, message = "stream.invalid.timezone"))]
    pub timezone: String,
    pub scheduled_start_date: DateTime<Utc>,
    pub scheduled_end_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct JoinStreamRequest {
    #[validate(length(max = 500, message = "comment.too.long"))]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProcessAttendeeRequest {
    #[serde(with = "super::id_format")]
    pub attendee_id: i64,

    pub join_status: JoinDecision,

    #[validate(length(max = 500, message = "comment.too.long"))]
    pub comment: Option<String>,
}

/// `?filter=UPCOMING|PAST|LIVE` on stream searches.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StreamFilterQuery {
    pub filter: Option<StreamTimeFilter>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StreamResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub tags: Option<String>,
    pub location: String,
    pub timezone: String,
    pub scheduled_start_date: DateTime<Utc>,
    pub scheduled_end_date: DateTime<Utc>,
    pub stream_type: EnumInfo,
    pub stream_source: EnumInfo,
    pub visibility: EnumInfo,
    pub stream_status: EnumInfo,
    pub organizer_id: String,
    pub organizer_alias: Option<String>,
    pub organizer_email: Option<String>,
    pub organizer_phone: Option<String>,
    pub chat_space_id: Option<String>,
    pub stream_link: Option<String>,
    pub made_for_kids: bool,
    pub total_attendees: i64,
    pub total_likes: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Stream> for StreamResponse {
    fn from(s: Stream) -> Self {
        Self {
            id: s.id.to_string(),
            title: s.title,
            description: s.description,
            tags: s.tags,
            location: s.location,
            timezone: s.timezone,
            scheduled_start_date: s.scheduled_start_date,
            scheduled_end_date: s.scheduled_end_date,
            stream_type: s.stream_type.info(),
            stream_source: s.stream_source.info(),
            visibility: s.visibility.info(),
            stream_status: s.stream_status.info(),
            organizer_id: s.organizer_id.to_string(),
            organizer_alias: s.organizer_alias,
            organizer_email: s.organizer_email,
            organizer_phone: s.organizer_phone,
            chat_space_id: s.chat_space_id.map(|id| id.to_string()),
            stream_link: s.stream_link,
            made_for_kids: s.made_for_kids,
            total_attendees: s.total_attendees,
            total_likes: s.total_likes,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

/// Stream as seen by a particular viewer.
#[derive(Debug, Clone, Serialize)]
pub struct StreamDetailResponse {
    #[serde(flatten)]
    pub stream: StreamResponse,
    pub attendance_status: EnumInfo,
    pub is_organizer: bool,
    pub has_ended: bool,
    pub is_ongoing: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct StreamAttendeeResponse {
    pub id: String,
    pub member_id: String,
    pub full_name: String,
    pub username: String,
    pub request_to_join_status: EnumInfo,
    pub is_attending: bool,
    pub attendee_comment: Option<String>,
    pub organizer_comment: Option<String>,
}

impl From<StreamAttendeeView> for StreamAttendeeResponse {
    fn from(view: StreamAttendeeView) -> Self {
        let a = view.attendee;
        Self {
            id: a.id.to_string(),
            member_id: a.member_id.to_string(),
            full_name: view.full_name,
            username: view.username,
            request_to_join_status: a.request_to_join_status.info(),
            is_attending: a.is_attending,
            attendee_comment: a.attendee_comment,
            organizer_comment: a.organizer_comment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::validation::validate;

    fn body(email: &str) -> String {
        format!(
            r#"{{
                "title": "Launch",
                "description": "Product launch",
                "location": "Lagos",
                "timezone": "Africa/Lagos",
                "scheduled_start_date": "2030-05-01T10:00:00Z",
                "scheduled_end_date": "2030-05-01T12:00:00Z",
                "visibility": "PUBLIC",
                "organizer_email": "{email}",
                "chat_space_id": "42"
            }}"#
        )
    }

    #[test]
    fn test_create_request_parses_ids_and_defaults() {
        let request: CreateStreamRequest = serde_json::from_str(&body("host@fleenfeen.test")).unwrap();
        assert_eq!(request.chat_space_id, Some(42));
        assert!(!request.made_for_kids);
        assert!(validate(&request).is_ok());
    }

    #[test]
    fn test_invalid_organizer_email() {
        let request: CreateStreamRequest = serde_json::from_str(&body("not-an-email")).unwrap();
        let err = validate(&request).unwrap_err();
        assert_eq!(err.message_key(), "validation.failed");
    }

    #[test]
    fn test_filter_query() {
        let query: StreamFilterQuery = serde_json::from_str(r#"{"filter":"LIVE"}"#).unwrap();
        assert_eq!(query.filter, Some(StreamTimeFilter::Live));
    }
}
