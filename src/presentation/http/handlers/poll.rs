//! Poll Handlers

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::poll::{CreatePollRequest, PollDetailResponse, PollParentQuery, PollResponse, PollVoteRequest};
use crate::presentation::http::extractors::{PathId, ValidatedJson};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::pagination::{SearchRequest, SearchResult};
use crate::startup::AppState;

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(body): ValidatedJson<CreatePollRequest>,
) -> Result<(StatusCode, Json<PollDetailResponse>), AppError> {
    let created = state.services.polls.create(auth.member_id, body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Poll with results and the caller's own selection
pub async fn get(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(poll_id): PathId,
) -> Result<Json<PollDetailResponse>, AppError> {
    Ok(Json(state.services.polls.get(auth.member_id, poll_id).await?))
}

pub async fn vote(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(poll_id): PathId,
    ValidatedJson(body): ValidatedJson<PollVoteRequest>,
) -> Result<Json<PollDetailResponse>, AppError> {
    Ok(Json(state.services.polls.vote(auth.member_id, poll_id, body).await?))
}

pub async fn retract_vote(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(poll_id): PathId,
) -> Result<Json<PollDetailResponse>, AppError> {
    Ok(Json(state.services.polls.retract_vote(auth.member_id, poll_id).await?))
}

pub async fn close(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(poll_id): PathId,
) -> Result<StatusCode, AppError> {
    state.services.polls.close(auth.member_id, poll_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(poll_id): PathId,
) -> Result<StatusCode, AppError> {
    state.services.polls.delete(auth.member_id, poll_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn find_by_parent(
    State(state): State<AppState>,
    Query(parent): Query<PollParentQuery>,
    Query(request): Query<SearchRequest>,
) -> Result<Json<SearchResult<PollResponse>>, AppError> {
    Ok(Json(
        state
            .services
            .polls
            .find_by_parent(parent.parent_type, parent.parent_id, &request)
            .await?,
    ))
}
