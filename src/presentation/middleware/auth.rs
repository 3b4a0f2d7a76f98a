//! Authentication Middleware
//!
//! JWT validation middleware for protected routes.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};
use uuid::Uuid;

use crate::application::services::{auth_service::decode_access_token, AuthError, Claims};
use crate::domain::Role;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Authenticated member extension
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub member_id: i64,
    pub roles: Vec<Role>,
    /// Session that issued the access token
    pub session_id: Option<Uuid>,
}

impl AuthUser {
    fn from_claims(claims: &Claims) -> Result<Self, AuthError> {
        Ok(Self {
            member_id: claims.member_id()?,
            roles: claims.roles.clone(),
            session_id: claims.session_id(),
        })
    }

    pub fn has_role(&self, required: Role) -> bool {
        self.roles.iter().any(|r| r.satisfies(required))
    }

    /// Fail with 403 unless the member holds `required` (or a stronger role).
    pub fn require_role(&self, required: Role) -> Result<(), AppError> {
        if self.has_role(required) {
            Ok(())
        } else {
            Err(AppError::Forbidden("not.allowed".into()))
        }
    }
}

fn bearer_token(request: &Request) -> Option<String> {
    request
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .map(|Authorization(bearer)| bearer.token().trim().to_owned())
        .filter(|t| !t.is_empty())
}

fn authenticate(state: &AppState, token: &str) -> Result<AuthUser, AuthError> {
    let claims = decode_access_token(&state.settings.jwt.secret, token)?;
    AuthUser::from_claims(&claims)
}

/// Authentication middleware that validates JWT tokens
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&request).ok_or_else(|| AppError::Unauthorized("authentication.required".into()))?;
    let user = authenticate(&state, &token)?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Optional authentication middleware (doesn't fail if no token)
pub async fn optional_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let user = bearer_token(&request).and_then(|token| authenticate(&state, &token).ok());
    if let Some(user) = user {
        request.extensions_mut().insert(user);
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(roles: Vec<Role>) -> AuthUser {
        AuthUser {
            member_id: 1,
            roles,
            session_id: None,
        }
    }

    #[test]
    fn test_require_role() {
        assert!(user(vec![Role::User]).require_role(Role::User).is_ok());
        assert!(user(vec![Role::SuperAdministrator])
            .require_role(Role::Administrator)
            .is_ok());

        let err = user(vec![Role::User]).require_role(Role::Administrator).unwrap_err();
        assert_eq!(err.message_key(), "not.allowed");
    }

    #[test]
    fn test_from_claims_rejects_non_numeric_subject() {
        let claims = Claims {
            sub: "abc".into(),
            roles: vec![],
            exp: 0,
            iat: 0,
            jti: None,
        };
        assert!(AuthUser::from_claims(&claims).is_err());
    }
}
