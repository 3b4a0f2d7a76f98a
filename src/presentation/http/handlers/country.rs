//! Country Handlers

use axum::extract::{Path, Query, State};
use axum::Json;

use crate::application::dto::response::CountryResponse;
use crate::shared::error::AppError;
use crate::shared::pagination::{SearchRequest, SearchResult};
use crate::startup::AppState;

/// Paginated countries, optionally filtered by title
pub async fn find_entries(
    State(state): State<AppState>,
    Query(request): Query<SearchRequest>,
) -> Result<Json<SearchResult<CountryResponse>>, AppError> {
    Ok(Json(state.services.countries.search(&request).await?))
}

/// Country by ISO alpha-2 code
pub async fn find_by_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<CountryResponse>, AppError> {
    Ok(Json(state.services.countries.find_by_code(&code).await?))
}
