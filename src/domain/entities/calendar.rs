//! Country calendar entity and repository trait.
//!
//! Maps to the `calendars` table. One calendar per country code; events
//! created by members of that country are mirrored to it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;
use crate::shared::pagination::SearchRequest;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Calendar {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub external_id: Option<String>,
    /// Country code, unique
    pub code: String,
    pub timezone: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Calendar {
    pub fn verify_calendar_is_not_already_active(&self) -> Result<(), AppError> {
        if self.is_active {
            return Err(AppError::Conflict("calendar.already.active".into()));
        }
        Ok(())
    }

    pub fn verify_calendar_is_not_already_inactive(&self) -> Result<(), AppError> {
        if !self.is_active {
            return Err(AppError::Conflict("calendar.already.inactive".into()));
        }
        Ok(())
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CalendarRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Calendar>, AppError>;

    async fn find_active_by_code(&self, code: &str) -> Result<Option<Calendar>, AppError>;

    async fn code_exists(&self, code: &str) -> Result<bool, AppError>;

    async fn create(&self, calendar: &Calendar) -> Result<Calendar, AppError>;

    async fn update(&self, calendar: &Calendar) -> Result<Calendar, AppError>;

    async fn delete(&self, id: i64) -> Result<(), AppError>;

    async fn search(&self, request: &SearchRequest) -> Result<(Vec<Calendar>, i64), AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calendar(is_active: bool) -> Calendar {
        Calendar {
            id: 1,
            title: "Nigeria".into(),
            description: String::new(),
            external_id: None,
            code: "NG".into(),
            timezone: "Africa/Lagos".into(),
            is_active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_activation_guards() {
        assert!(calendar(true).verify_calendar_is_not_already_active().is_err());
        assert!(calendar(false).verify_calendar_is_not_already_active().is_ok());
        assert!(calendar(false).verify_calendar_is_not_already_inactive().is_err());
        assert!(calendar(true).verify_calendar_is_not_already_inactive().is_ok());
    }
}
