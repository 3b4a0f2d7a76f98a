//! Soft Ask Handlers
//!
//! Questions under a chat space or stream, their answers, threaded replies
//! and up/down votes.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::soft_ask::{
    AddAnswerRequest, AddReplyRequest, CreateSoftAskRequest, SoftAskAnswerResponse, SoftAskParentQuery,
    SoftAskReplyResponse, SoftAskResponse, SoftAskVoteRequest, SoftAskVoteResponse, UpdateSoftAskRequest,
};
use crate::presentation::http::extractors::{AppJson, PathId, ValidatedJson};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::pagination::{SearchRequest, SearchResult};
use crate::startup::AppState;

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(body): ValidatedJson<CreateSoftAskRequest>,
) -> Result<(StatusCode, Json<SoftAskResponse>), AppError> {
    let created = state.services.soft_asks.create(auth.member_id, body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(soft_ask_id): PathId,
    ValidatedJson(body): ValidatedJson<UpdateSoftAskRequest>,
) -> Result<Json<SoftAskResponse>, AppError> {
    Ok(Json(state.services.soft_asks.update(auth.member_id, soft_ask_id, body).await?))
}

/// Stop accepting answers
pub async fn close(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(soft_ask_id): PathId,
) -> Result<Json<SoftAskResponse>, AppError> {
    Ok(Json(state.services.soft_asks.close(auth.member_id, soft_ask_id).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(soft_ask_id): PathId,
) -> Result<StatusCode, AppError> {
    state.services.soft_asks.delete(auth.member_id, soft_ask_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get(State(state): State<AppState>, PathId(soft_ask_id): PathId) -> Result<Json<SoftAskResponse>, AppError> {
    Ok(Json(state.services.soft_asks.get(soft_ask_id).await?))
}

pub async fn search(
    State(state): State<AppState>,
    Query(parent): Query<SoftAskParentQuery>,
    Query(request): Query<SearchRequest>,
) -> Result<Json<SearchResult<SoftAskResponse>>, AppError> {
    Ok(Json(state.services.soft_asks.search(parent.parent(), &request).await?))
}

pub async fn add_answer(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(soft_ask_id): PathId,
    ValidatedJson(body): ValidatedJson<AddAnswerRequest>,
) -> Result<(StatusCode, Json<SoftAskAnswerResponse>), AppError> {
    let created = state
        .services
        .soft_asks
        .add_answer(auth.member_id, soft_ask_id, body)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn delete_answer(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(answer_id): PathId,
) -> Result<StatusCode, AppError> {
    state.services.soft_asks.delete_answer(auth.member_id, answer_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn find_answers(
    State(state): State<AppState>,
    PathId(soft_ask_id): PathId,
    Query(request): Query<SearchRequest>,
) -> Result<Json<SearchResult<SoftAskAnswerResponse>>, AppError> {
    Ok(Json(state.services.soft_asks.find_answers(soft_ask_id, &request).await?))
}

pub async fn add_reply(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(answer_id): PathId,
    ValidatedJson(body): ValidatedJson<AddReplyRequest>,
) -> Result<(StatusCode, Json<SoftAskReplyResponse>), AppError> {
    let created = state
        .services
        .soft_asks
        .add_reply(auth.member_id, answer_id, body)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn delete_reply(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(reply_id): PathId,
) -> Result<StatusCode, AppError> {
    state.services.soft_asks.delete_reply(auth.member_id, reply_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn find_replies(
    State(state): State<AppState>,
    PathId(answer_id): PathId,
    Query(request): Query<SearchRequest>,
) -> Result<Json<SearchResult<SoftAskReplyResponse>>, AppError> {
    Ok(Json(state.services.soft_asks.find_replies(answer_id, &request).await?))
}

/// Vote on a soft ask, answer or reply
pub async fn vote(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(body): AppJson<SoftAskVoteRequest>,
) -> Result<Json<SoftAskVoteResponse>, AppError> {
    Ok(Json(state.services.soft_asks.vote(auth.member_id, body).await?))
}

pub async fn unvote(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(body): AppJson<SoftAskVoteRequest>,
) -> Result<Json<SoftAskVoteResponse>, AppError> {
    Ok(Json(state.services.soft_asks.unvote(auth.member_id, body).await?))
}
