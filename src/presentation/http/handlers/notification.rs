//! Notification Handlers

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::notification::NotificationResponse;
use crate::application::dto::response::CountResponse;
use crate::presentation::http::extractors::PathId;
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::pagination::{SearchRequest, SearchResult};
use crate::startup::AppState;

/// Newest first
pub async fn find_mine(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(request): Query<SearchRequest>,
) -> Result<Json<SearchResult<NotificationResponse>>, AppError> {
    Ok(Json(state.services.notifications.find_mine(auth.member_id, &request).await?))
}

pub async fn count_unread(State(state): State<AppState>, auth: AuthUser) -> Result<Json<CountResponse>, AppError> {
    let total = state.services.notifications.count_unread(auth.member_id).await?;
    Ok(Json(CountResponse { total }))
}

pub async fn mark_as_read(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(notification_id): PathId,
) -> Result<StatusCode, AppError> {
    state
        .services
        .notifications
        .mark_as_read(auth.member_id, notification_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Returns how many notifications flipped to read
pub async fn mark_all_as_read(State(state): State<AppState>, auth: AuthUser) -> Result<Json<CountResponse>, AppError> {
    let updated = state.services.notifications.mark_all_as_read(auth.member_id).await?;
    Ok(Json(CountResponse {
        total: i64::try_from(updated).unwrap_or(i64::MAX),
    }))
}

pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(notification_id): PathId,
) -> Result<StatusCode, AppError> {
    state.services.notifications.delete(auth.member_id, notification_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
