//! Member Handlers
//!
//! The caller's own account under `/member/me`, other members by id.

use axum::extract::{Query, State};
use axum::Json;

use crate::application::dto::request::{UpdatePhotoRequest, UpdateProfileRequest};
use crate::application::dto::response::{MemberResponse, MemberSummaryResponse, PublicProfileResponse};
use crate::presentation::http::extractors::{PathId, ValidatedJson};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::pagination::{SearchRequest, SearchResult};
use crate::startup::AppState;

/// Get the current member
pub async fn get_me(State(state): State<AppState>, auth: AuthUser) -> Result<Json<MemberResponse>, AppError> {
    Ok(Json(state.services.members.get_me(auth.member_id).await?))
}

/// Update names, phone, country, birth date or gender
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(body): ValidatedJson<UpdateProfileRequest>,
) -> Result<Json<MemberResponse>, AppError> {
    Ok(Json(state.services.members.update_profile(auth.member_id, body).await?))
}

pub async fn update_photo(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(body): ValidatedJson<UpdatePhotoRequest>,
) -> Result<Json<MemberResponse>, AppError> {
    Ok(Json(state.services.members.update_photo(auth.member_id, body).await?))
}

pub async fn remove_photo(State(state): State<AppState>, auth: AuthUser) -> Result<Json<MemberResponse>, AppError> {
    Ok(Json(state.services.members.remove_photo(auth.member_id).await?))
}

/// Public profile of another member
pub async fn get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(member_id): PathId,
) -> Result<Json<PublicProfileResponse>, AppError> {
    Ok(Json(state.services.members.get_profile(auth.member_id, member_id).await?))
}

/// Search members by name or username
pub async fn search(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(request): Query<SearchRequest>,
) -> Result<Json<SearchResult<MemberSummaryResponse>>, AppError> {
    Ok(Json(state.services.members.search(auth.member_id, &request).await?))
}
