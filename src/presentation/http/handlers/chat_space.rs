//! Chat Space Handlers

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::chat_space::{
    ChatSpaceDetailResponse, ChatSpaceMemberResponse, ChatSpaceResponse, CreateChatSpaceRequest, MemberActionRequest,
    ProcessJoinRequest, RequestToJoinRequest, UpdateChatSpaceRequest, UpdateVisibilityRequest,
};
use crate::application::dto::response::MessageResponse;
use crate::presentation::http::extractors::{AppJson, PathId, ValidatedJson};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::pagination::{SearchRequest, SearchResult};
use crate::startup::AppState;

/// Create a chat space; the caller becomes its organizer
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(body): ValidatedJson<CreateChatSpaceRequest>,
) -> Result<(StatusCode, Json<ChatSpaceResponse>), AppError> {
    let created = state.services.chat_spaces.create(auth.member_id, body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(chat_space_id): PathId,
    ValidatedJson(body): ValidatedJson<UpdateChatSpaceRequest>,
) -> Result<Json<ChatSpaceResponse>, AppError> {
    Ok(Json(
        state
            .services
            .chat_spaces
            .update(auth.member_id, chat_space_id, body)
            .await?,
    ))
}

pub async fn update_visibility(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(chat_space_id): PathId,
    AppJson(body): AppJson<UpdateVisibilityRequest>,
) -> Result<Json<ChatSpaceResponse>, AppError> {
    Ok(Json(
        state
            .services
            .chat_spaces
            .update_visibility(auth.member_id, chat_space_id, body.visibility)
            .await?,
    ))
}

pub async fn enable(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(chat_space_id): PathId,
) -> Result<Json<ChatSpaceResponse>, AppError> {
    Ok(Json(state.services.chat_spaces.enable(auth.member_id, chat_space_id).await?))
}

pub async fn disable(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(chat_space_id): PathId,
) -> Result<Json<ChatSpaceResponse>, AppError> {
    Ok(Json(state.services.chat_spaces.disable(auth.member_id, chat_space_id).await?))
}

/// Soft-delete (organizer only)
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(chat_space_id): PathId,
) -> Result<StatusCode, AppError> {
    state.services.chat_spaces.delete(auth.member_id, chat_space_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Details with the caller's join status
pub async fn get(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(chat_space_id): PathId,
) -> Result<Json<ChatSpaceDetailResponse>, AppError> {
    Ok(Json(state.services.chat_spaces.get(auth.member_id, chat_space_id).await?))
}

pub async fn search(
    State(state): State<AppState>,
    Query(request): Query<SearchRequest>,
) -> Result<Json<SearchResult<ChatSpaceResponse>>, AppError> {
    Ok(Json(state.services.chat_spaces.search(&request).await?))
}

/// Chat spaces the caller organizes or has joined
pub async fn find_mine(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(request): Query<SearchRequest>,
) -> Result<Json<SearchResult<ChatSpaceResponse>>, AppError> {
    Ok(Json(state.services.chat_spaces.find_mine(auth.member_id, &request).await?))
}

pub async fn join(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(chat_space_id): PathId,
) -> Result<Json<MessageResponse>, AppError> {
    state.services.chat_spaces.join(auth.member_id, chat_space_id).await?;
    Ok(Json(MessageResponse::new("chat.space.joined")))
}

pub async fn request_to_join(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(chat_space_id): PathId,
    ValidatedJson(body): ValidatedJson<RequestToJoinRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    state
        .services
        .chat_spaces
        .request_to_join(auth.member_id, chat_space_id, body)
        .await?;
    Ok(Json(MessageResponse::new("chat.space.join.requested")))
}

/// Approve or disapprove a pending request (admins)
pub async fn process_join_request(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(chat_space_id): PathId,
    ValidatedJson(body): ValidatedJson<ProcessJoinRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    state
        .services
        .chat_spaces
        .process_join_request(auth.member_id, chat_space_id, body)
        .await?;
    Ok(Json(MessageResponse::new("chat.space.join.request.processed")))
}

pub async fn leave(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(chat_space_id): PathId,
) -> Result<Json<MessageResponse>, AppError> {
    state.services.chat_spaces.leave(auth.member_id, chat_space_id).await?;
    Ok(Json(MessageResponse::new("chat.space.left")))
}

pub async fn remove_member(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(chat_space_id): PathId,
    AppJson(body): AppJson<MemberActionRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    state
        .services
        .chat_spaces
        .remove_member(auth.member_id, chat_space_id, body.member_id)
        .await?;
    Ok(Json(MessageResponse::new("chat.space.member.removal.done")))
}

pub async fn restore_member(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(chat_space_id): PathId,
    AppJson(body): AppJson<MemberActionRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    state
        .services
        .chat_spaces
        .restore_member(auth.member_id, chat_space_id, body.member_id)
        .await?;
    Ok(Json(MessageResponse::new("chat.space.member.restored")))
}

pub async fn promote_to_admin(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(chat_space_id): PathId,
    AppJson(body): AppJson<MemberActionRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    state
        .services
        .chat_spaces
        .promote_to_admin(auth.member_id, chat_space_id, body.member_id)
        .await?;
    Ok(Json(MessageResponse::new("chat.space.admin.promoted")))
}

pub async fn demote_admin(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(chat_space_id): PathId,
    AppJson(body): AppJson<MemberActionRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    state
        .services
        .chat_spaces
        .demote_admin(auth.member_id, chat_space_id, body.member_id)
        .await?;
    Ok(Json(MessageResponse::new("chat.space.admin.demoted")))
}

pub async fn find_members(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(chat_space_id): PathId,
    Query(request): Query<SearchRequest>,
) -> Result<Json<SearchResult<ChatSpaceMemberResponse>>, AppError> {
    Ok(Json(
        state
            .services
            .chat_spaces
            .find_members(auth.member_id, chat_space_id, &request)
            .await?,
    ))
}

/// Pending join requests (admins)
pub async fn find_join_requests(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(chat_space_id): PathId,
    Query(request): Query<SearchRequest>,
) -> Result<Json<SearchResult<ChatSpaceMemberResponse>>, AppError> {
    Ok(Json(
        state
            .services
            .chat_spaces
            .find_join_requests(auth.member_id, chat_space_id, &request)
            .await?,
    ))
}
