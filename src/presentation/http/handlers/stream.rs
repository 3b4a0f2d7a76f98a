//! Stream Handlers
//!
//! Events (Google Calendar) and live streams (YouTube) with their attendees.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::chat_space::UpdateVisibilityRequest;
use crate::application::dto::response::MessageResponse;
use crate::application::dto::stream::{
    CreateStreamRequest, JoinStreamRequest, ProcessAttendeeRequest, RescheduleStreamRequest, StreamAttendeeResponse,
    StreamDetailResponse, StreamFilterQuery, StreamResponse, UpdateStreamRequest,
};
use crate::presentation::http::extractors::{AppJson, PathId, ValidatedJson};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::pagination::{SearchRequest, SearchResult};
use crate::startup::AppState;

pub async fn create_event(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(body): ValidatedJson<CreateStreamRequest>,
) -> Result<(StatusCode, Json<StreamResponse>), AppError> {
    let created = state.services.streams.create_event(auth.member_id, body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn create_live_stream(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(body): ValidatedJson<CreateStreamRequest>,
) -> Result<(StatusCode, Json<StreamResponse>), AppError> {
    let created = state.services.streams.create_live_stream(auth.member_id, body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(stream_id): PathId,
    ValidatedJson(body): ValidatedJson<UpdateStreamRequest>,
) -> Result<Json<StreamResponse>, AppError> {
    Ok(Json(state.services.streams.update(auth.member_id, stream_id, body).await?))
}

pub async fn reschedule(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(stream_id): PathId,
    ValidatedJson(body): ValidatedJson<RescheduleStreamRequest>,
) -> Result<Json<StreamResponse>, AppError> {
    Ok(Json(state.services.streams.reschedule(auth.member_id, stream_id, body).await?))
}

pub async fn update_visibility(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(stream_id): PathId,
    AppJson(body): AppJson<UpdateVisibilityRequest>,
) -> Result<Json<StreamResponse>, AppError> {
    Ok(Json(
        state
            .services
            .streams
            .update_visibility(auth.member_id, stream_id, body.visibility)
            .await?,
    ))
}

/// Cancel; attendees are notified and no further joins are accepted
pub async fn cancel(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(stream_id): PathId,
) -> Result<Json<StreamResponse>, AppError> {
    Ok(Json(state.services.streams.cancel(auth.member_id, stream_id).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(stream_id): PathId,
) -> Result<StatusCode, AppError> {
    state.services.streams.delete(auth.member_id, stream_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(stream_id): PathId,
) -> Result<Json<StreamDetailResponse>, AppError> {
    Ok(Json(state.services.streams.get(auth.member_id, stream_id).await?))
}

/// Search with an optional `UPCOMING|PAST|LIVE` filter
pub async fn search(
    State(state): State<AppState>,
    Query(filter): Query<StreamFilterQuery>,
    Query(request): Query<SearchRequest>,
) -> Result<Json<SearchResult<StreamResponse>>, AppError> {
    Ok(Json(state.services.streams.search(filter.filter, &request).await?))
}

pub async fn find_mine(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(request): Query<SearchRequest>,
) -> Result<Json<SearchResult<StreamResponse>>, AppError> {
    Ok(Json(state.services.streams.find_mine(auth.member_id, &request).await?))
}

pub async fn find_attending(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(request): Query<SearchRequest>,
) -> Result<Json<SearchResult<StreamResponse>>, AppError> {
    Ok(Json(state.services.streams.find_attending(auth.member_id, &request).await?))
}

pub async fn join(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(stream_id): PathId,
) -> Result<Json<MessageResponse>, AppError> {
    state.services.streams.join(auth.member_id, stream_id).await?;
    Ok(Json(MessageResponse::new("stream.joined")))
}

pub async fn request_to_join(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(stream_id): PathId,
    ValidatedJson(body): ValidatedJson<JoinStreamRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    state
        .services
        .streams
        .request_to_join(auth.member_id, stream_id, body)
        .await?;
    Ok(Json(MessageResponse::new("stream.join.requested")))
}

/// Approve or disapprove an attendee (organizer)
pub async fn process_join_request(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(stream_id): PathId,
    ValidatedJson(body): ValidatedJson<ProcessAttendeeRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    state
        .services
        .streams
        .process_join_request(auth.member_id, stream_id, body)
        .await?;
    Ok(Json(MessageResponse::new("stream.join.request.processed")))
}

pub async fn not_attending(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(stream_id): PathId,
) -> Result<Json<MessageResponse>, AppError> {
    state.services.streams.not_attending(auth.member_id, stream_id).await?;
    Ok(Json(MessageResponse::new("stream.attendance.withdrawn")))
}

pub async fn find_attendees(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(stream_id): PathId,
    Query(request): Query<SearchRequest>,
) -> Result<Json<SearchResult<StreamAttendeeResponse>>, AppError> {
    Ok(Json(
        state
            .services
            .streams
            .find_attendees(auth.member_id, stream_id, &request)
            .await?,
    ))
}

pub async fn find_join_requests(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(stream_id): PathId,
    Query(request): Query<SearchRequest>,
) -> Result<Json<SearchResult<StreamAttendeeResponse>>, AppError> {
    Ok(Json(
        state
            .services
            .streams
            .find_join_requests(auth.member_id, stream_id, &request)
            .await?,
    ))
}
