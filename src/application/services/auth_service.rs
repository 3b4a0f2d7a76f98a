//! Authentication Service
//!
//! Handles sign-up, sign-in, JWT token management, and session handling.
//!
//! Access tokens are short-lived HS256 JWTs whose `jti` is the id of the
//! session that issued them. Refresh tokens are opaque random strings; only
//! their SHA-256 hash is stored, and every refresh rotates them.

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::application::dto::request::{ChangePasswordRequest, SignUpRequest};
use crate::config::JwtSettings;
use crate::domain::{Member, MemberRepository, ProfileStatus, Role, Session, SessionRepository, VerificationStatus};
use crate::shared::error::AppError;
use crate::shared::random;
use crate::shared::snowflake::SnowflakeGenerator;

const REFRESH_TOKEN_LENGTH: usize = 64;

/// Authentication service trait for dependency injection
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new member and open a session
    async fn sign_up(&self, request: SignUpRequest, client: SessionClient) -> Result<(Member, AuthTokens), AuthError>;

    /// Authenticate with email and password
    async fn sign_in(&self, email: &str, password: &str, client: SessionClient) -> Result<(Member, AuthTokens), AuthError>;

    /// Rotate a refresh token and issue a new access token
    async fn refresh_token(&self, refresh_token: &str) -> Result<AuthTokens, AuthError>;

    /// Revoke the session behind a refresh token
    async fn sign_out(&self, refresh_token: &str) -> Result<(), AuthError>;

    /// Verify the old password, store the new one and revoke every other session
    async fn change_password(
        &self,
        member_id: i64,
        current_session: Option<Uuid>,
        request: ChangePasswordRequest,
    ) -> Result<(), AuthError>;
}

/// Where a session was opened from.
#[derive(Debug, Clone, Default)]
pub struct SessionClient {
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

/// Authentication tokens response
#[derive(Debug, Clone, Serialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub token_type: String,
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (member ID)
    pub sub: String,
    /// Roles held when the token was issued
    #[serde(default)]
    pub roles: Vec<Role>,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at time (Unix timestamp)
    pub iat: i64,
    /// Session that issued the token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

impl Claims {
    pub fn member_id(&self) -> Result<i64, AuthError> {
        self.sub.parse().map_err(|_| AuthError::InvalidToken)
    }

    pub fn session_id(&self) -> Option<Uuid> {
        self.jti.as_deref().and_then(|jti| Uuid::parse_str(jti).ok())
    }
}

/// Authentication errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Member is banned")]
    Banned,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("Member not found")]
    MemberNotFound,

    #[error("Email already exists")]
    EmailExists,

    #[error("Username already exists")]
    UsernameExists,

    #[error("Old password is incorrect")]
    IncorrectPassword,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Repository(#[from] AppError),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => AppError::Unauthorized("invalid.credentials".into()),
            AuthError::Banned => AppError::Forbidden("member.banned".into()),
            AuthError::TokenExpired => AppError::Unauthorized("token.expired".into()),
            AuthError::InvalidToken => AppError::Unauthorized("invalid.token".into()),
            AuthError::InvalidRefreshToken => AppError::Unauthorized("invalid.refresh.token".into()),
            AuthError::MemberNotFound => AppError::NotFound("member.not.found".into()),
            AuthError::EmailExists => AppError::Conflict("email.address.already.exists".into()),
            AuthError::UsernameExists => AppError::Conflict("username.already.exists".into()),
            AuthError::IncorrectPassword => AppError::BadRequest("password.incorrect".into()),
            AuthError::Internal(msg) => AppError::Internal(msg),
            AuthError::Repository(e) => e,
        }
    }
}

/// Hash a password using Argon2id
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Internal(format!("Password hashing failed: {}", e)))
}

/// Verify a password against its hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AuthError::Internal(format!("Invalid password hash: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Hash refresh token for storage
pub fn hash_refresh_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Decode and validate an access token
pub fn decode_access_token(secret: &str, token: &str) -> Result<Claims, AuthError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    })?;

    Ok(token_data.claims)
}

/// AuthService implementation
pub struct AuthServiceImpl<M, S>
where
    M: MemberRepository,
    S: SessionRepository,
{
    member_repo: Arc<M>,
    session_repo: Arc<S>,
    id_generator: Arc<SnowflakeGenerator>,
    jwt_settings: JwtSettings,
}

impl<M, S> AuthServiceImpl<M, S>
where
    M: MemberRepository,
    S: SessionRepository,
{
    /// Create a new AuthServiceImpl
    pub fn new(
        member_repo: Arc<M>,
        session_repo: Arc<S>,
        id_generator: Arc<SnowflakeGenerator>,
        jwt_settings: JwtSettings,
    ) -> Self {
        Self {
            member_repo,
            session_repo,
            id_generator,
            jwt_settings,
        }
    }

    /// Generate access and refresh tokens bound to `session_id`
    fn generate_tokens(&self, member: &Member, session_id: Uuid) -> Result<AuthTokens, AuthError> {
        let now = Utc::now();
        let access_expiry = now + Duration::minutes(self.jwt_settings.access_token_expiry_minutes);

        let access_claims = Claims {
            sub: member.id.to_string(),
            roles: member.roles.clone(),
            exp: access_expiry.timestamp(),
            iat: now.timestamp(),
            jti: Some(session_id.to_string()),
        };

        let access_token = encode(
            &Header::default(),
            &access_claims,
            &EncodingKey::from_secret(self.jwt_settings.secret.as_bytes()),
        )
        .map_err(|e| AuthError::Internal(format!("Token generation failed: {}", e)))?;

        // Opaque refresh token; carries no member data
        let refresh_token = random::alphanumeric(REFRESH_TOKEN_LENGTH);

        Ok(AuthTokens {
            access_token,
            refresh_token,
            expires_in: self.jwt_settings.access_token_expiry_minutes * 60,
            token_type: "Bearer".to_string(),
        })
    }

    fn refresh_expiry(&self) -> chrono::DateTime<Utc> {
        Utc::now() + Duration::days(self.jwt_settings.refresh_token_expiry_days)
    }

    /// Open a session for `member` and return its tokens.
    async fn open_session(&self, member: &Member, client: SessionClient) -> Result<AuthTokens, AuthError> {
        let mut session = Session::new(member.id, String::new(), self.refresh_expiry());
        let tokens = self.generate_tokens(member, session.id)?;
        session.refresh_token_hash = hash_refresh_token(&tokens.refresh_token);
        session.user_agent = client.user_agent;
        session.ip_address = client.ip_address;

        self.session_repo.create(&session).await?;
        Ok(tokens)
    }
}

#[async_trait]
impl<M, S> AuthService for AuthServiceImpl<M, S>
where
    M: MemberRepository + 'static,
    S: SessionRepository + 'static,
{
    #[instrument(skip(self, request, client), fields(username = %request.username))]
    async fn sign_up(&self, request: SignUpRequest, client: SessionClient) -> Result<(Member, AuthTokens), AuthError> {
        let email = request.email_address.trim().to_lowercase();
        if self.member_repo.email_exists(&email).await? {
            return Err(AuthError::EmailExists);
        }
        if self.member_repo.username_exists(request.username.trim()).await? {
            return Err(AuthError::UsernameExists);
        }

        let now = Utc::now();
        let member = Member {
            id: self.id_generator.generate(),
            email_address: email,
            username: request.username.trim().to_string(),
            first_name: request.first_name.trim().to_string(),
            last_name: request.last_name.trim().to_string(),
            password_hash: hash_password(&request.password)?,
            phone_number: request.phone_number,
            profile_photo_url: None,
            country: request.country.map(|c| c.to_uppercase()),
            date_of_birth: request.date_of_birth,
            gender: request.gender,
            profile_status: ProfileStatus::Active,
            verification_status: VerificationStatus::Pending,
            roles: vec![Role::User],
            created_at: now,
            updated_at: now,
        };

        let created = self.member_repo.create(&member).await?;
        let tokens = self.open_session(&created, client).await?;

        info!(member_id = created.id, "Member signed up");
        Ok((created, tokens))
    }

    #[instrument(skip(self, password, client))]
    async fn sign_in(&self, email: &str, password: &str, client: SessionClient) -> Result<(Member, AuthTokens), AuthError> {
        let member = self
            .member_repo
            .find_by_email(&email.trim().to_lowercase())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &member.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }
        if member.is_banned() {
            warn!(member_id = member.id, "Banned member attempted to sign in");
            return Err(AuthError::Banned);
        }

        let tokens = self.open_session(&member, client).await?;
        info!(member_id = member.id, "Member signed in");
        Ok((member, tokens))
    }

    #[instrument(skip_all)]
    async fn refresh_token(&self, refresh_token: &str) -> Result<AuthTokens, AuthError> {
        let session = self
            .session_repo
            .find_by_token_hash(&hash_refresh_token(refresh_token))
            .await?
            .ok_or(AuthError::InvalidRefreshToken)?;

        if !session.is_active() {
            return Err(AuthError::InvalidRefreshToken);
        }

        let member = self
            .member_repo
            .find_by_id(session.member_id)
            .await?
            .ok_or(AuthError::MemberNotFound)?;
        if member.is_banned() {
            self.session_repo.revoke(session.id).await?;
            return Err(AuthError::Banned);
        }

        // Token rotation: the old refresh token stops working
        let tokens = self.generate_tokens(&member, session.id)?;
        self.session_repo
            .rotate(session.id, &hash_refresh_token(&tokens.refresh_token), self.refresh_expiry())
            .await?;

        Ok(tokens)
    }

    #[instrument(skip_all)]
    async fn sign_out(&self, refresh_token: &str) -> Result<(), AuthError> {
        let session = self
            .session_repo
            .find_by_token_hash(&hash_refresh_token(refresh_token))
            .await?
            .ok_or(AuthError::InvalidRefreshToken)?;

        self.session_repo.revoke(session.id).await?;
        info!(member_id = session.member_id, "Member signed out");
        Ok(())
    }

    #[instrument(skip(self, request))]
    async fn change_password(
        &self,
        member_id: i64,
        current_session: Option<Uuid>,
        request: ChangePasswordRequest,
    ) -> Result<(), AuthError> {
        let member = self
            .member_repo
            .find_by_id(member_id)
            .await?
            .ok_or(AuthError::MemberNotFound)?;

        if !verify_password(&request.old_password, &member.password_hash)? {
            return Err(AuthError::IncorrectPassword);
        }

        let new_hash = hash_password(&request.new_password)?;
        self.member_repo.update_password(member_id, &new_hash).await?;
        let revoked = self
            .session_repo
            .revoke_all_for_member(member_id, current_session)
            .await?;

        info!(member_id, revoked, "Password changed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MockMemberRepository, MockSessionRepository};
    use fake::faker::internet::en::{FreeEmail, Password, Username};
    use fake::Fake;

    const SECRET: &str = "a-test-secret-that-is-long-enough-for-hs256";

    fn settings() -> JwtSettings {
        JwtSettings {
            secret: SECRET.into(),
            access_token_expiry_minutes: 15,
            refresh_token_expiry_days: 7,
        }
    }

    fn service(
        members: MockMemberRepository,
        sessions: MockSessionRepository,
    ) -> AuthServiceImpl<MockMemberRepository, MockSessionRepository> {
        AuthServiceImpl::new(
            Arc::new(members),
            Arc::new(sessions),
            Arc::new(SnowflakeGenerator::new(1, 1)),
            settings(),
        )
    }

    fn member_with_password(password: &str) -> Member {
        Member {
            id: 42,
            email_address: FreeEmail().fake(),
            username: Username().fake(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            password_hash: hash_password(password).unwrap(),
            roles: vec![Role::User, Role::Administrator],
            ..Default::default()
        }
    }

    #[test]
    fn test_password_hash_roundtrip() {
        let password: String = Password(8..20).fake();
        let hash = hash_password(&password).unwrap();
        assert!(verify_password(&password, &hash).unwrap());
        assert!(!verify_password("something-else", &hash).unwrap());
    }

    #[test]
    fn test_access_token_carries_roles_and_session() {
        let svc = service(MockMemberRepository::new(), MockSessionRepository::new());
        let member = Member {
            id: 42,
            roles: vec![Role::User, Role::Administrator],
            ..Default::default()
        };
        let session_id = Uuid::new_v4();

        let tokens = svc.generate_tokens(&member, session_id).unwrap();
        let claims = decode_access_token(SECRET, &tokens.access_token).unwrap();

        assert_eq!(claims.member_id().unwrap(), 42);
        assert_eq!(claims.roles, vec![Role::User, Role::Administrator]);
        assert_eq!(claims.session_id(), Some(session_id));
        assert_eq!(tokens.expires_in, 900);
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let svc = service(MockMemberRepository::new(), MockSessionRepository::new());
        let tokens = svc.generate_tokens(&Member::default(), Uuid::new_v4()).unwrap();
        let err = decode_access_token("another-secret-that-is-also-long-enough", &tokens.access_token).unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken));
    }

    #[test]
    fn test_refresh_token_hash_is_stable_hex() {
        let hash = hash_refresh_token("abc");
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, hash_refresh_token("abc"));
    }

    #[tokio::test]
    async fn test_sign_in_with_wrong_password() {
        let member = member_with_password("correct-horse");
        let mut members = MockMemberRepository::new();
        members
            .expect_find_by_email()
            .returning(move |_| Ok(Some(member.clone())));

        let err = service(members, MockSessionRepository::new())
            .sign_in("ada@fleenfeen.test", "wrong-horse", SessionClient::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_sign_in_banned_member_is_forbidden() {
        let mut member = member_with_password("correct-horse");
        member.profile_status = ProfileStatus::Banned;
        let mut members = MockMemberRepository::new();
        members
            .expect_find_by_email()
            .returning(move |_| Ok(Some(member.clone())));

        let err = service(members, MockSessionRepository::new())
            .sign_in("ada@fleenfeen.test", "correct-horse", SessionClient::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Banned));
        assert_eq!(AppError::from(err).status(), axum::http::StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_sign_in_opens_session() {
        let member = member_with_password("correct-horse");
        let mut members = MockMemberRepository::new();
        members
            .expect_find_by_email()
            .returning(move |_| Ok(Some(member.clone())));
        let mut sessions = MockSessionRepository::new();
        sessions
            .expect_create()
            .withf(|s| s.member_id == 42 && s.refresh_token_hash.len() == 64)
            .times(1)
            .returning(|s| Ok(s.clone()));

        let (member, tokens) = service(members, sessions)
            .sign_in("ADA@fleenfeen.test", "correct-horse", SessionClient::default())
            .await
            .unwrap();
        assert_eq!(member.id, 42);
        assert_eq!(tokens.token_type, "Bearer");
    }

    #[tokio::test]
    async fn test_sign_up_duplicate_email() {
        let mut members = MockMemberRepository::new();
        members.expect_email_exists().returning(|_| Ok(true));

        let request = SignUpRequest {
            email_address: "ada@fleenfeen.test".into(),
            username: "ada".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            password: "correct-horse".into(),
            country: None,
            phone_number: None,
            date_of_birth: None,
            gender: None,
        };
        let err = service(members, MockSessionRepository::new())
            .sign_up(request, SessionClient::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::EmailExists));
    }

    #[tokio::test]
    async fn test_refresh_with_revoked_session() {
        let mut sessions = MockSessionRepository::new();
        sessions.expect_find_by_token_hash().returning(|hash| {
            let mut session = Session::new(42, hash.to_string(), Utc::now() + Duration::days(1));
            session.revoked_at = Some(Utc::now());
            Ok(Some(session))
        });

        let err = service(MockMemberRepository::new(), sessions)
            .refresh_token("old.token")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidRefreshToken));
    }

    #[tokio::test]
    async fn test_refresh_rotates_token() {
        let member = member_with_password("correct-horse");
        let mut members = MockMemberRepository::new();
        members
            .expect_find_by_id()
            .returning(move |_| Ok(Some(member.clone())));
        let mut sessions = MockSessionRepository::new();
        sessions
            .expect_find_by_token_hash()
            .returning(|hash| Ok(Some(Session::new(42, hash.to_string(), Utc::now() + Duration::days(1)))));
        sessions
            .expect_rotate()
            .withf(|_, new_hash, _| new_hash != hash_refresh_token("old.token"))
            .times(1)
            .returning(|_, _, _| Ok(()));

        let tokens = service(members, sessions).refresh_token("old.token").await.unwrap();
        assert_ne!(tokens.refresh_token, "old.token");
    }

    #[tokio::test]
    async fn test_change_password_keeps_current_session() {
        let member = member_with_password("correct-horse");
        let current = Uuid::new_v4();
        let mut members = MockMemberRepository::new();
        members
            .expect_find_by_id()
            .returning(move |_| Ok(Some(member.clone())));
        members.expect_update_password().times(1).returning(|_, _| Ok(()));
        let mut sessions = MockSessionRepository::new();
        sessions
            .expect_revoke_all_for_member()
            .withf(move |id, keep| *id == 42 && *keep == Some(current))
            .times(1)
            .returning(|_, _| Ok(2));

        service(members, sessions)
            .change_password(
                42,
                Some(current),
                ChangePasswordRequest {
                    old_password: "correct-horse".into(),
                    new_password: "battery-staple".into(),
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_change_password_rejects_wrong_old_password() {
        let member = member_with_password("correct-horse");
        let mut members = MockMemberRepository::new();
        members
            .expect_find_by_id()
            .returning(move |_| Ok(Some(member.clone())));

        let err = service(members, MockSessionRepository::new())
            .change_password(
                42,
                None,
                ChangePasswordRequest {
                    old_password: "nope".into(),
                    new_password: "battery-staple".into(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::IncorrectPassword));
    }
}
