//! OAuth2 authorization DTOs

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{EnumInfo, Oauth2Authorization};

#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationUriResponse {
    pub authorization_uri: String,
}

/// Query string Google redirects back with.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyAuthorizationCodeQuery {
    pub code: String,
    pub state: String,
}

/// Stored authorization; tokens never leave the server.
#[derive(Debug, Clone, Serialize)]
pub struct Oauth2AuthorizationResponse {
    pub service_type: EnumInfo,
    pub scope: String,
    pub token_type: String,
    pub access_token_expires_at: Option<DateTime<Utc>>,
    pub has_refresh_token: bool,
    pub updated_at: DateTime<Utc>,
}

impl From<Oauth2Authorization> for Oauth2AuthorizationResponse {
    fn from(authorization: Oauth2Authorization) -> Self {
        Self {
            service_type: authorization.service_type.info(),
            scope: authorization.scope,
            token_type: authorization.token_type,
            access_token_expires_at: Utc
                .timestamp_millis_opt(authorization.token_expiration_time_in_millis)
                .single(),
            has_refresh_token: authorization.refresh_token.is_some(),
            updated_at: authorization.updated_at,
        }
    }
}
