//! Contact, Follower and Blocking Handlers

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::response::{MemberSummaryResponse, MessageResponse};
use crate::application::dto::social::{BlockUnblockRequest, ContactResponse, FollowCountsResponse, UpdateContactsRequest};
use crate::domain::BlockStatus;
use crate::presentation::http::extractors::{AppJson, PathId, ValidatedJson};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::pagination::{SearchRequest, SearchResult};
use crate::startup::AppState;

/// Replace the caller's contacts
pub async fn update_contacts(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(body): ValidatedJson<UpdateContactsRequest>,
) -> Result<Json<Vec<ContactResponse>>, AppError> {
    Ok(Json(state.services.contacts.update_contacts(auth.member_id, body).await?))
}

pub async fn find_my_contacts(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<ContactResponse>>, AppError> {
    Ok(Json(state.services.contacts.find_contacts(auth.member_id).await?))
}

/// Contacts of another member; empty when either side blocked the other
pub async fn find_contacts_of(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(member_id): PathId,
) -> Result<Json<Vec<ContactResponse>>, AppError> {
    Ok(Json(
        state
            .services
            .contacts
            .find_contacts_of(auth.member_id, member_id)
            .await?,
    ))
}

pub async fn follow(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(member_id): PathId,
) -> Result<StatusCode, AppError> {
    state.services.followers.follow(auth.member_id, member_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn unfollow(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(member_id): PathId,
) -> Result<StatusCode, AppError> {
    state.services.followers.unfollow(auth.member_id, member_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn find_my_followers(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(request): Query<SearchRequest>,
) -> Result<Json<SearchResult<MemberSummaryResponse>>, AppError> {
    Ok(Json(state.services.followers.find_followers(auth.member_id, &request).await?))
}

pub async fn find_my_followings(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(request): Query<SearchRequest>,
) -> Result<Json<SearchResult<MemberSummaryResponse>>, AppError> {
    Ok(Json(state.services.followers.find_followings(auth.member_id, &request).await?))
}

pub async fn my_follow_counts(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<FollowCountsResponse>, AppError> {
    Ok(Json(state.services.followers.counts(auth.member_id).await?))
}

pub async fn find_followers(
    State(state): State<AppState>,
    PathId(member_id): PathId,
    Query(request): Query<SearchRequest>,
) -> Result<Json<SearchResult<MemberSummaryResponse>>, AppError> {
    Ok(Json(state.services.followers.find_followers(member_id, &request).await?))
}

pub async fn find_followings(
    State(state): State<AppState>,
    PathId(member_id): PathId,
    Query(request): Query<SearchRequest>,
) -> Result<Json<SearchResult<MemberSummaryResponse>>, AppError> {
    Ok(Json(state.services.followers.find_followings(member_id, &request).await?))
}

pub async fn follow_counts(
    State(state): State<AppState>,
    PathId(member_id): PathId,
) -> Result<Json<FollowCountsResponse>, AppError> {
    Ok(Json(state.services.followers.counts(member_id).await?))
}

/// Block or unblock a member. Blocking also drops follows both ways.
pub async fn block_or_unblock(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(body): AppJson<BlockUnblockRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let key = if body.block_status == BlockStatus::Blocked {
        "member.blocked"
    } else {
        "member.unblocked"
    };
    state.services.blocks.block_or_unblock(auth.member_id, body).await?;
    Ok(Json(MessageResponse::new(key)))
}

pub async fn find_blocked_members(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(request): Query<SearchRequest>,
) -> Result<Json<SearchResult<MemberSummaryResponse>>, AppError> {
    Ok(Json(
        state
            .services
            .blocks
            .find_blocked_members(auth.member_id, &request)
            .await?,
    ))
}
