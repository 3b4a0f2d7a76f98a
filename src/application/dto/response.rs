//! Response DTOs
//!
//! Account, profile and reference-data response bodies, plus the small
//! shapes shared by several slices.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::application::services::AuthTokens;
use crate::domain::{Country, EnumInfo, Member, MemberSummary};

/// Authentication tokens response
#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub token_type: String,
}

impl From<AuthTokens> for TokenResponse {
    fn from(tokens: AuthTokens) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_in: tokens.expires_in,
            token_type: tokens.token_type,
        }
    }
}

/// Member as seen by the member themself.
#[derive(Debug, Clone, Serialize)]
pub struct MemberResponse {
    pub id: String,
    pub email_address: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub phone_number: Option<String>,
    pub profile_photo_url: Option<String>,
    pub country: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<EnumInfo>,
    pub profile_status: EnumInfo,
    pub verification_status: EnumInfo,
    pub roles: Vec<EnumInfo>,
    pub created_at: DateTime<Utc>,
}

impl From<Member> for MemberResponse {
    fn from(member: Member) -> Self {
        Self {
            id: member.id.to_string(),
            full_name: member.full_name(),
            email_address: member.email_address,
            username: member.username,
            first_name: member.first_name,
            last_name: member.last_name,
            phone_number: member.phone_number,
            profile_photo_url: member.profile_photo_url,
            country: member.country,
            date_of_birth: member.date_of_birth,
            gender: member.gender.map(|g| g.info()),
            profile_status: member.profile_status.info(),
            verification_status: member.verification_status.info(),
            roles: member.roles.iter().map(|r| r.info()).collect(),
            created_at: member.created_at,
        }
    }
}

/// Sign-up / sign-in response (member and tokens)
#[derive(Debug, Clone, Serialize)]
pub struct SignInResponse {
    pub member: MemberResponse,
    #[serde(flatten)]
    pub tokens: TokenResponse,
}

/// Member as seen by somebody else.
#[derive(Debug, Clone, Serialize)]
pub struct PublicProfileResponse {
    pub id: String,
    pub username: String,
    pub full_name: String,
    pub profile_photo_url: Option<String>,
    pub country: Option<String>,
    pub total_followers: i64,
    pub total_following: i64,
    pub is_following: bool,
    /// Whether the viewer blocks this member
    pub is_blocked: bool,
    pub joined_on: DateTime<Utc>,
}

/// A related member in follower, following and blocked lists.
#[derive(Debug, Clone, Serialize)]
pub struct MemberSummaryResponse {
    pub member_id: String,
    pub full_name: String,
    pub username: String,
    pub profile_photo_url: Option<String>,
    pub since: DateTime<Utc>,
}

impl From<MemberSummary> for MemberSummaryResponse {
    fn from(summary: MemberSummary) -> Self {
        Self {
            member_id: summary.member_id.to_string(),
            full_name: summary.full_name,
            username: summary.username,
            profile_photo_url: summary.profile_photo_url,
            since: summary.since,
        }
    }
}

/// Country response
#[derive(Debug, Clone, Serialize)]
pub struct CountryResponse {
    pub id: String,
    pub title: String,
    pub code: String,
    pub timezone: String,
}

impl From<Country> for CountryResponse {
    fn from(country: Country) -> Self {
        Self {
            id: country.id.to_string(),
            title: country.title,
            code: country.code,
            timezone: country.timezone,
        }
    }
}

/// Confirmation body for mutations that return no entity.
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message_key: String,
    pub message: String,
}

impl MessageResponse {
    /// Resolve `key` in the request locale.
    pub fn new(key: &str) -> Self {
        Self {
            message_key: key.to_string(),
            message: crate::shared::i18n::resolve(key, crate::shared::i18n::current_locale()),
        }
    }
}

/// Counter returned by toggles (likes, votes) and unread counts.
#[derive(Debug, Clone, Serialize)]
pub struct CountResponse {
    pub total: i64,
}
