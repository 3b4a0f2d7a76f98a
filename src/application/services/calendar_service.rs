//! Calendar Service
//!
//! Administrator management of country calendars. Creation goes to Google
//! first when synchronisation is enabled, so a calendar never exists locally
//! with a remote id that was never created.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, instrument};

use crate::application::dto::calendar::{
    CalendarResponse, CreateCalendarRequest, ShareCalendarRequest, UpdateCalendarRequest,
};
use crate::application::services::log_remote_failure;
use crate::domain::gateways::CalendarGateway;
use crate::domain::{Calendar, CalendarRepository, CountryRepository};
use crate::shared::error::AppError;
use crate::shared::pagination::{SearchRequest, SearchResult};
use crate::shared::snowflake::SnowflakeGenerator;

#[async_trait]
pub trait CalendarService: Send + Sync {
    async fn create(&self, request: CreateCalendarRequest) -> Result<CalendarResponse, CalendarError>;

    async fn update(&self, calendar_id: i64, request: UpdateCalendarRequest) -> Result<CalendarResponse, CalendarError>;

    async fn reactivate(&self, calendar_id: i64) -> Result<CalendarResponse, CalendarError>;

    async fn deactivate(&self, calendar_id: i64) -> Result<CalendarResponse, CalendarError>;

    async fn delete(&self, calendar_id: i64) -> Result<(), CalendarError>;

    async fn share_with_email(&self, calendar_id: i64, request: ShareCalendarRequest) -> Result<(), CalendarError>;

    async fn get(&self, calendar_id: i64) -> Result<CalendarResponse, CalendarError>;

    async fn search(&self, request: &SearchRequest) -> Result<SearchResult<CalendarResponse>, CalendarError>;
}

#[derive(Debug, thiserror::Error)]
pub enum CalendarError {
    #[error("Calendar not found")]
    NotFound,

    #[error("Calendar already exists for country {0}")]
    DuplicateCode(String),

    #[error("Unknown country {0}")]
    UnknownCountry(String),

    #[error("Calendar has no remote counterpart")]
    NotSynced,

    #[error(transparent)]
    Repository(#[from] AppError),
}

impl From<CalendarError> for AppError {
    fn from(err: CalendarError) -> Self {
        match err {
            CalendarError::NotFound => AppError::NotFound("calendar.not.found".into()),
            CalendarError::DuplicateCode(_) => AppError::Conflict("calendar.code.exists".into()),
            CalendarError::UnknownCountry(_) => AppError::BadRequest("country.not.found".into()),
            CalendarError::NotSynced => AppError::Conflict("calendar.not.synced".into()),
            CalendarError::Repository(e) => e,
        }
    }
}

pub struct CalendarServiceImpl {
    repo: Arc<dyn CalendarRepository>,
    countries: Arc<dyn CountryRepository>,
    gateway: Arc<dyn CalendarGateway>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl CalendarServiceImpl {
    pub fn new(
        repo: Arc<dyn CalendarRepository>,
        countries: Arc<dyn CountryRepository>,
        gateway: Arc<dyn CalendarGateway>,
        id_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            repo,
            countries,
            gateway,
            id_generator,
        }
    }

    async fn find(&self, calendar_id: i64) -> Result<Calendar, CalendarError> {
        self.repo.find_by_id(calendar_id).await?.ok_or(CalendarError::NotFound)
    }

    async fn save(&self, mut calendar: Calendar) -> Result<CalendarResponse, CalendarError> {
        calendar.updated_at = Utc::now();
        Ok(self.repo.update(&calendar).await?.into())
    }
}

#[async_trait]
impl CalendarService for CalendarServiceImpl {
    #[instrument(skip(self, request), fields(code = %request.code))]
    async fn create(&self, request: CreateCalendarRequest) -> Result<CalendarResponse, CalendarError> {
        let code = request.code.trim().to_uppercase();
        if self.countries.find_by_code(&code).await?.is_none() {
            return Err(CalendarError::UnknownCountry(code));
        }
        if self.repo.code_exists(&code).await? {
            return Err(CalendarError::DuplicateCode(code));
        }

        let title = request.title.trim().to_string();
        let description = request.description.trim().to_string();
        let timezone = request.timezone.trim().to_string();
        let external_id = self.gateway.create_calendar(&title, &description, &timezone).await?;

        let now = Utc::now();
        let calendar = Calendar {
            id: self.id_generator.generate(),
            title,
            description,
            external_id,
            code,
            timezone,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let created = self.repo.create(&calendar).await?;

        info!(calendar_id = created.id, code = %created.code, synced = created.external_id.is_some(), "Calendar created");
        Ok(created.into())
    }

    #[instrument(skip(self, request))]
    async fn update(&self, calendar_id: i64, request: UpdateCalendarRequest) -> Result<CalendarResponse, CalendarError> {
        let mut calendar = self.find(calendar_id).await?;
        calendar.title = request.title.trim().to_string();
        calendar.description = request.description.trim().to_string();

        if let Some(external_id) = calendar.external_id.as_deref() {
            log_remote_failure(
                self.gateway
                    .update_calendar(external_id, &calendar.title, &calendar.description)
                    .await,
                "calendar.update",
                calendar_id,
            );
        }

        let response = self.save(calendar).await?;
        info!(calendar_id, "Calendar updated");
        Ok(response)
    }

    #[instrument(skip(self))]
    async fn reactivate(&self, calendar_id: i64) -> Result<CalendarResponse, CalendarError> {
        let mut calendar = self.find(calendar_id).await?;
        calendar.verify_calendar_is_not_already_active()?;
        calendar.is_active = true;
        let response = self.save(calendar).await?;
        info!(calendar_id, "Calendar reactivated");
        Ok(response)
    }

    #[instrument(skip(self))]
    async fn deactivate(&self, calendar_id: i64) -> Result<CalendarResponse, CalendarError> {
        let mut calendar = self.find(calendar_id).await?;
        calendar.verify_calendar_is_not_already_inactive()?;
        calendar.is_active = false;
        let response = self.save(calendar).await?;
        info!(calendar_id, "Calendar deactivated");
        Ok(response)
    }

    #[instrument(skip(self))]
    async fn delete(&self, calendar_id: i64) -> Result<(), CalendarError> {
        let calendar = self.find(calendar_id).await?;
        if let Some(external_id) = calendar.external_id.as_deref() {
            log_remote_failure(self.gateway.delete_calendar(external_id).await, "calendar.delete", calendar_id);
        }
        self.repo.delete(calendar_id).await?;
        info!(calendar_id, code = %calendar.code, "Calendar deleted");
        Ok(())
    }

    #[instrument(skip(self, request))]
    async fn share_with_email(&self, calendar_id: i64, request: ShareCalendarRequest) -> Result<(), CalendarError> {
        let calendar = self.find(calendar_id).await?;
        let external_id = calendar.external_id.as_deref().ok_or(CalendarError::NotSynced)?;
        self.gateway
            .share_calendar(external_id, request.email_address.trim())
            .await?;
        info!(calendar_id, "Calendar shared");
        Ok(())
    }

    async fn get(&self, calendar_id: i64) -> Result<CalendarResponse, CalendarError> {
        Ok(self.find(calendar_id).await?.into())
    }

    async fn search(&self, request: &SearchRequest) -> Result<SearchResult<CalendarResponse>, CalendarError> {
        let (calendars, total) = self.repo.search(request).await?;
        Ok(SearchResult::new(calendars, total, request).map(CalendarResponse::from))
    }
}
