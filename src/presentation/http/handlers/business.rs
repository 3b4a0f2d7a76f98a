//! Business Handlers

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::business::{BusinessRequest, BusinessResponse, UpdateBusinessStatusRequest};
use crate::presentation::http::extractors::{AppJson, PathId, ValidatedJson};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::pagination::{SearchRequest, SearchResult};
use crate::startup::AppState;

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(body): ValidatedJson<BusinessRequest>,
) -> Result<(StatusCode, Json<BusinessResponse>), AppError> {
    let created = state.services.businesses.create(auth.member_id, body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(business_id): PathId,
    ValidatedJson(body): ValidatedJson<BusinessRequest>,
) -> Result<Json<BusinessResponse>, AppError> {
    Ok(Json(state.services.businesses.update(auth.member_id, business_id, body).await?))
}

pub async fn update_status(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(business_id): PathId,
    AppJson(body): AppJson<UpdateBusinessStatusRequest>,
) -> Result<Json<BusinessResponse>, AppError> {
    Ok(Json(
        state
            .services
            .businesses
            .update_status(auth.member_id, business_id, body.status)
            .await?,
    ))
}

pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(business_id): PathId,
) -> Result<StatusCode, AppError> {
    state.services.businesses.delete(auth.member_id, business_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get(State(state): State<AppState>, PathId(business_id): PathId) -> Result<Json<BusinessResponse>, AppError> {
    Ok(Json(state.services.businesses.get(business_id).await?))
}

pub async fn search(
    State(state): State<AppState>,
    Query(request): Query<SearchRequest>,
) -> Result<Json<SearchResult<BusinessResponse>>, AppError> {
    Ok(Json(state.services.businesses.search(&request).await?))
}

pub async fn find_mine(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(request): Query<SearchRequest>,
) -> Result<Json<SearchResult<BusinessResponse>>, AppError> {
    Ok(Json(state.services.businesses.find_mine(auth.member_id, &request).await?))
}
