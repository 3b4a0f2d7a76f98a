//! Application Error Types
//!
//! Centralized error handling with Axum integration. Client-facing messages
//! are message codes (`chat.space.not.found`) that are resolved against the
//! message catalog in the request locale when the response is rendered.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use super::i18n;

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Too many requests: {0}")]
    TooManyRequests(String),

    #[error("Upstream service error: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Validation failed")]
    Validation(Vec<FieldError>),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message_key: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

/// Field-level validation error
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl AppError {
    /// HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::RateLimited | AppError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) | AppError::Database(_) | AppError::Redis(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message code sent to the client. Internal details never leave the server.
    pub fn message_key(&self) -> &str {
        match self {
            AppError::NotFound(key)
            | AppError::BadRequest(key)
            | AppError::Unauthorized(key)
            | AppError::Forbidden(key)
            | AppError::Conflict(key)
            | AppError::TooManyRequests(key) => key,
            AppError::RateLimited => "rate.limited",
            AppError::Validation(_) => "validation.failed",
            AppError::Upstream(_) => "external.service.unavailable",
            AppError::Internal(_) | AppError::Database(_) | AppError::Redis(_) => {
                "internal.server.error"
            }
        }
    }

    fn numeric_code(&self) -> u16 {
        match self {
            AppError::Internal(_) | AppError::Database(_) | AppError::Redis(_) => 10000,
            AppError::NotFound(_) => 10001,
            AppError::BadRequest(_) => 10002,
            AppError::Unauthorized(_) => 10003,
            AppError::Forbidden(_) => 10004,
            AppError::Conflict(_) => 10005,
            AppError::RateLimited | AppError::TooManyRequests(_) => 10006,
            AppError::Validation(_) => 10007,
            AppError::Upstream(_) => 10008,
        }
    }

    /// Map a unique-constraint violation to a conflict, pass everything else through.
    pub fn from_unique_violation(err: sqlx::Error, conflict_key: &str) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(conflict_key.to_string())
            }
            _ => AppError::Database(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Internal(msg) => tracing::error!("Internal error: {}", msg),
            AppError::Database(e) => tracing::error!("Database error: {}", e),
            AppError::Redis(e) => tracing::error!("Redis error: {}", e),
            AppError::Upstream(msg) => tracing::warn!("Upstream error: {}", msg),
            _ => {}
        }

        let locale = i18n::current_locale();
        let status = self.status();
        let code = self.numeric_code();
        let key = self.message_key().to_string();
        let message = i18n::resolve(&key, locale);

        let errors = match self {
            AppError::Validation(fields) => Some(
                fields
                    .into_iter()
                    .map(|f| FieldError {
                        message: i18n::resolve(&f.message, locale),
                        field: f.field,
                    })
                    .collect(),
            ),
            _ => None,
        };

        let body = ErrorResponse {
            code,
            message_key: key,
            message,
            errors,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(AppError::NotFound("member.not.found".into()), StatusCode::NOT_FOUND ; "not found")]
    #[test_case(AppError::Conflict("already.following".into()), StatusCode::CONFLICT ; "conflict")]
    #[test_case(AppError::Forbidden("not.allowed".into()), StatusCode::FORBIDDEN ; "forbidden")]
    #[test_case(AppError::TooManyRequests("recaptcha.too.many.attempts".into()), StatusCode::TOO_MANY_REQUESTS ; "too many")]
    #[test_case(AppError::Upstream("timeout".into()), StatusCode::BAD_GATEWAY ; "upstream")]
    #[test_case(AppError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR ; "internal")]
    fn test_status_mapping(err: AppError, expected: StatusCode) {
        assert_eq!(err.status(), expected);
        assert_eq!(err.into_response().status(), expected);
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err = AppError::Internal("secret connection string".into());
        assert_eq!(err.message_key(), "internal.server.error");
    }

    #[test]
    fn test_validation_and_bad_request_codes_differ() {
        assert_eq!(AppError::Validation(vec![]).numeric_code(), 10007);
        assert_eq!(AppError::BadRequest("x".into()).numeric_code(), 10002);
    }
}
