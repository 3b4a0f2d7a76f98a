//! Country calendar DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::Calendar;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCalendarRequest {
    #[validate(length(min = 1, max = 300, message = "calendar.title.length"))]
    pub title: String,

    #[validate(length(max = 1000, message = "calendar.description.too.long"))]
    #[serde(default)]
    pub description: String,

    /// ISO alpha-2 country code
    #[validate(length(equal = 2, message = "country.code.invalid"))]
    pub code: String,

    #[validate(length(min = 1, max = 64, message = "calendar.timezone.invalid"))]
    pub timezone: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateCalendarRequest {
    #[validate(length(min = 1, max = 300, message = "calendar.title.length"))]
    pub title: String,

    #[validate(length(max = 1000, message = "calendar.description.too.long"))]
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ShareCalendarRequest {
    #[validate(email(message = "email.invalid"))]
    pub email_address: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CalendarResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub external_id: Option<String>,
    pub code: String,
    pub timezone: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Calendar> for CalendarResponse {
    fn from(calendar: Calendar) -> Self {
        Self {
            id: calendar.id.to_string(),
            title: calendar.title,
            description: calendar.description,
            external_id: calendar.external_id,
            code: calendar.code,
            timezone: calendar.timezone,
            is_active: calendar.is_active,
            created_at: calendar.created_at,
            updated_at: calendar.updated_at,
        }
    }
}
