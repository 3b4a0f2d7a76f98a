//! Like, Bookmark, Link and Review Handlers

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::engagement::{
    BookmarkFilter, BookmarkResponse, CreateReviewRequest, LikeResponse, LikedEntriesQuery, LikedEntryResponse,
    LinkResponse, ParentRequest, ReviewResponse, StreamReviewsResponse, UpdateLinksRequest, UpdateReviewRequest,
};
use crate::domain::ParentType;
use crate::presentation::http::extractors::{AppJson, PathId, ValidatedJson};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::pagination::{SearchRequest, SearchResult};
use crate::startup::AppState;

// ===== Likes =====

pub async fn like(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(body): AppJson<ParentRequest>,
) -> Result<Json<LikeResponse>, AppError> {
    Ok(Json(state.services.likes.like(auth.member_id, body).await?))
}

pub async fn unlike(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(body): AppJson<ParentRequest>,
) -> Result<Json<LikeResponse>, AppError> {
    Ok(Json(state.services.likes.unlike(auth.member_id, body).await?))
}

pub async fn find_liked(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(filter): Query<LikedEntriesQuery>,
    Query(request): Query<SearchRequest>,
) -> Result<Json<SearchResult<LikedEntryResponse>>, AppError> {
    Ok(Json(
        state
            .services
            .likes
            .find_liked(auth.member_id, filter.parent_type, &request)
            .await?,
    ))
}

// ===== Bookmarks =====

pub async fn bookmark(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(body): AppJson<ParentRequest>,
) -> Result<StatusCode, AppError> {
    state.services.bookmarks.bookmark(auth.member_id, body).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn unbookmark(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(body): AppJson<ParentRequest>,
) -> Result<StatusCode, AppError> {
    state.services.bookmarks.unbookmark(auth.member_id, body).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn find_bookmarks(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(filter): Query<BookmarkFilter>,
    Query(request): Query<SearchRequest>,
) -> Result<Json<SearchResult<BookmarkResponse>>, AppError> {
    Ok(Json(
        state
            .services
            .bookmarks
            .find_bookmarks(auth.member_id, filter.parent_type, &request)
            .await?,
    ))
}

// ===== Links =====

/// Replace the links of a chat space (organizer or admins)
pub async fn update_chat_space_links(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(chat_space_id): PathId,
    ValidatedJson(body): ValidatedJson<UpdateLinksRequest>,
) -> Result<Json<Vec<LinkResponse>>, AppError> {
    Ok(Json(
        state
            .services
            .links
            .update_chat_space_links(auth.member_id, chat_space_id, body)
            .await?,
    ))
}

pub async fn find_chat_space_links(
    State(state): State<AppState>,
    PathId(chat_space_id): PathId,
) -> Result<Json<Vec<LinkResponse>>, AppError> {
    Ok(Json(
        state
            .services
            .links
            .find_links(ParentType::ChatSpace, chat_space_id)
            .await?,
    ))
}

/// Replace the links of a business (owner)
pub async fn update_business_links(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(business_id): PathId,
    ValidatedJson(body): ValidatedJson<UpdateLinksRequest>,
) -> Result<Json<Vec<LinkResponse>>, AppError> {
    Ok(Json(
        state
            .services
            .links
            .update_business_links(auth.member_id, business_id, body)
            .await?,
    ))
}

pub async fn find_business_links(
    State(state): State<AppState>,
    PathId(business_id): PathId,
) -> Result<Json<Vec<LinkResponse>>, AppError> {
    Ok(Json(
        state
            .services
            .links
            .find_links(ParentType::Business, business_id)
            .await?,
    ))
}

// ===== Reviews =====

pub async fn create_review(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(body): ValidatedJson<CreateReviewRequest>,
) -> Result<(StatusCode, Json<ReviewResponse>), AppError> {
    let created = state.services.reviews.create(auth.member_id, body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_review(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(review_id): PathId,
    ValidatedJson(body): ValidatedJson<UpdateReviewRequest>,
) -> Result<Json<ReviewResponse>, AppError> {
    Ok(Json(state.services.reviews.update(auth.member_id, review_id, body).await?))
}

pub async fn delete_review(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(review_id): PathId,
) -> Result<StatusCode, AppError> {
    state.services.reviews.delete(auth.member_id, review_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Reviews of a stream with the average rating
pub async fn find_stream_reviews(
    State(state): State<AppState>,
    PathId(stream_id): PathId,
    Query(request): Query<SearchRequest>,
) -> Result<Json<StreamReviewsResponse>, AppError> {
    Ok(Json(state.services.reviews.find_reviews(stream_id, &request).await?))
}

pub async fn find_my_reviews(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(request): Query<SearchRequest>,
) -> Result<Json<SearchResult<ReviewResponse>>, AppError> {
    Ok(Json(state.services.reviews.find_mine(auth.member_id, &request).await?))
}
