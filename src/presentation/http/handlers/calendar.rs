//! Calendar Handlers
//!
//! Shared Google calendars, one per country. Administrators only.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::calendar::{
    CalendarResponse, CreateCalendarRequest, ShareCalendarRequest, UpdateCalendarRequest,
};
use crate::application::dto::response::MessageResponse;
use crate::domain::Role;
use crate::presentation::http::extractors::{PathId, ValidatedJson};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::pagination::{SearchRequest, SearchResult};
use crate::startup::AppState;

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(body): ValidatedJson<CreateCalendarRequest>,
) -> Result<(StatusCode, Json<CalendarResponse>), AppError> {
    auth.require_role(Role::Administrator)?;
    let created = state.services.calendars.create(body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(calendar_id): PathId,
    ValidatedJson(body): ValidatedJson<UpdateCalendarRequest>,
) -> Result<Json<CalendarResponse>, AppError> {
    auth.require_role(Role::Administrator)?;
    Ok(Json(state.services.calendars.update(calendar_id, body).await?))
}

pub async fn reactivate(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(calendar_id): PathId,
) -> Result<Json<CalendarResponse>, AppError> {
    auth.require_role(Role::Administrator)?;
    Ok(Json(state.services.calendars.reactivate(calendar_id).await?))
}

pub async fn deactivate(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(calendar_id): PathId,
) -> Result<Json<CalendarResponse>, AppError> {
    auth.require_role(Role::Administrator)?;
    Ok(Json(state.services.calendars.deactivate(calendar_id).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(calendar_id): PathId,
) -> Result<StatusCode, AppError> {
    auth.require_role(Role::Administrator)?;
    state.services.calendars.delete(calendar_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Grant an email address writer access on the remote calendar
pub async fn share_with_email(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(calendar_id): PathId,
    ValidatedJson(body): ValidatedJson<ShareCalendarRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    auth.require_role(Role::Administrator)?;
    state.services.calendars.share_with_email(calendar_id, body).await?;
    Ok(Json(MessageResponse::new("calendar.shared")))
}

pub async fn get(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(calendar_id): PathId,
) -> Result<Json<CalendarResponse>, AppError> {
    auth.require_role(Role::Administrator)?;
    Ok(Json(state.services.calendars.get(calendar_id).await?))
}

pub async fn find_entries(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(request): Query<SearchRequest>,
) -> Result<Json<SearchResult<CalendarResponse>>, AppError> {
    auth.require_role(Role::Administrator)?;
    Ok(Json(state.services.calendars.search(&request).await?))
}
