//! Authentication Handlers

use axum::{extract::State, http::HeaderMap, http::StatusCode, Json};

use crate::application::dto::request::{ChangePasswordRequest, RefreshTokenRequest, SignInRequest, SignUpRequest};
use crate::application::dto::response::{MessageResponse, SignInResponse, TokenResponse};
use crate::presentation::http::extractors::{ClientInfo, ValidatedJson};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Header carrying the reCAPTCHA token on sign-up.
pub const RECAPTCHA_TOKEN_HEADER: &str = "x-recaptcha-token";

/// Register a new member
pub async fn sign_up(
    State(state): State<AppState>,
    client: ClientInfo,
    headers: HeaderMap,
    ValidatedJson(body): ValidatedJson<SignUpRequest>,
) -> Result<(StatusCode, Json<SignInResponse>), AppError> {
    let token = headers.get(RECAPTCHA_TOKEN_HEADER).and_then(|v| v.to_str().ok());
    state.recaptcha.verify(token, &client.ip_string()).await?;

    let (member, tokens) = state.services.auth.sign_up(body, client.into()).await?;

    Ok((
        StatusCode::CREATED,
        Json(SignInResponse {
            member: member.into(),
            tokens: tokens.into(),
        }),
    ))
}

/// Sign in with email and password
pub async fn sign_in(
    State(state): State<AppState>,
    client: ClientInfo,
    ValidatedJson(body): ValidatedJson<SignInRequest>,
) -> Result<Json<SignInResponse>, AppError> {
    let (member, tokens) = state
        .services
        .auth
        .sign_in(&body.email_address, &body.password, client.into())
        .await?;

    Ok(Json(SignInResponse {
        member: member.into(),
        tokens: tokens.into(),
    }))
}

/// Rotate a refresh token
pub async fn refresh_token(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<RefreshTokenRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let tokens = state.services.auth.refresh_token(&body.refresh_token).await?;
    Ok(Json(tokens.into()))
}

/// Revoke the session behind a refresh token
pub async fn sign_out(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<RefreshTokenRequest>,
) -> Result<StatusCode, AppError> {
    state.services.auth.sign_out(&body.refresh_token).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Change password; every other session is revoked
pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(body): ValidatedJson<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    state
        .services
        .auth
        .change_password(auth.member_id, auth.session_id, body)
        .await?;
    Ok(Json(MessageResponse::new("password.changed")))
}
