//! OAuth2 Handlers
//!
//! Google consent per service. The `{service}` path segment is kebab-case:
//! `google-calendar`, `google-chat` or `youtube`.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::oauth2::{
    AuthorizationUriResponse, Oauth2AuthorizationResponse, VerifyAuthorizationCodeQuery,
};
use crate::domain::{Oauth2ServiceType, Role};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::startup::AppState;

fn service_type(segment: &str) -> Result<Oauth2ServiceType, AppError> {
    Oauth2ServiceType::from_path(segment).ok_or_else(|| AppError::BadRequest("oauth2.service.invalid".into()))
}

/// Consent URL for the given Google service (administrators)
pub async fn authorization_uri(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(service): Path<String>,
) -> Result<Json<AuthorizationUriResponse>, AppError> {
    auth.require_role(Role::Administrator)?;
    let service = service_type(&service)?;
    Ok(Json(
        state
            .services
            .oauth2
            .authorization_uri(auth.member_id, service)
            .await?,
    ))
}

/// Google redirect target; the state value identifies the requester.
pub async fn verify_authorization_code(
    State(state): State<AppState>,
    Query(query): Query<VerifyAuthorizationCodeQuery>,
) -> Result<Json<Oauth2AuthorizationResponse>, AppError> {
    Ok(Json(
        state
            .services
            .oauth2
            .verify_authorization_code(&query.code, &query.state)
            .await?,
    ))
}

pub async fn refresh(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(service): Path<String>,
) -> Result<Json<Oauth2AuthorizationResponse>, AppError> {
    auth.require_role(Role::Administrator)?;
    let service = service_type(&service)?;
    Ok(Json(state.services.oauth2.refresh(auth.member_id, service).await?))
}

pub async fn revoke(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(service): Path<String>,
) -> Result<StatusCode, AppError> {
    auth.require_role(Role::Administrator)?;
    let service = service_type(&service)?;
    state.services.oauth2.revoke(auth.member_id, service).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_service_segments() {
        tokio_test::assert_ok!(service_type("google-calendar"));
        tokio_test::assert_ok!(service_type("youtube"));
    }

    #[test]
    fn test_unknown_service_segment_is_bad_request() {
        let err = tokio_test::assert_err!(service_type("dropbox"));
        assert!(matches!(err, AppError::BadRequest(ref key) if key == "oauth2.service.invalid"));
    }
}
