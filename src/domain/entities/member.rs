//! Member entity and repository trait.
//!
//! Maps to the `members` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::string_enum;
use crate::shared::error::AppError;
use crate::shared::pagination::SearchRequest;

string_enum! {
    /// Authorization role carried in access tokens.
    pub enum Role {
        User = "USER",
        Administrator = "ADMINISTRATOR",
        SuperAdministrator = "SUPER_ADMINISTRATOR",
    }
}

impl Role {
    /// Whether holding `self` satisfies a requirement for `required`.
    pub fn satisfies(&self, required: Role) -> bool {
        match required {
            Role::User => true,
            Role::Administrator => matches!(self, Role::Administrator | Role::SuperAdministrator),
            Role::SuperAdministrator => matches!(self, Role::SuperAdministrator),
        }
    }
}

string_enum! {
    pub enum ProfileStatus {
        Active = "ACTIVE",
        Inactive = "INACTIVE",
        Banned = "BANNED",
    }
}

string_enum! {
    pub enum VerificationStatus {
        Pending = "PENDING",
        Approved = "APPROVED",
        Disapproved = "DISAPPROVED",
    }
}

string_enum! {
    pub enum Gender {
        Male = "MALE",
        Female = "FEMALE",
        Other = "OTHER",
    }
}

/// Represents a registered user account.
///
/// Maps to the `members` table:
/// - id: BIGINT PRIMARY KEY (Snowflake ID)
/// - email_address: VARCHAR(150) NOT NULL UNIQUE
/// - username: VARCHAR(50) NOT NULL UNIQUE
/// - password_hash: VARCHAR(255) NOT NULL
/// - roles: TEXT[] NOT NULL
/// - profile_status / verification_status: VARCHAR NOT NULL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: i64,
    pub email_address: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,

    /// Argon2 password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    pub phone_number: Option<String>,
    pub profile_photo_url: Option<String>,
    /// ISO alpha-2 country code
    pub country: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub profile_status: ProfileStatus,
    pub verification_status: VerificationStatus,
    pub roles: Vec<Role>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Member {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }

    pub fn has_role(&self, required: Role) -> bool {
        self.roles.iter().any(|r| r.satisfies(required))
    }

    pub fn is_banned(&self) -> bool {
        matches!(self.profile_status, ProfileStatus::Banned)
    }
}

impl Default for Member {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            email_address: String::new(),
            username: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            password_hash: String::new(),
            phone_number: None,
            profile_photo_url: None,
            country: None,
            date_of_birth: None,
            gender: None,
            profile_status: ProfileStatus::Active,
            verification_status: VerificationStatus::Pending,
            roles: vec![Role::User],
            created_at: now,
            updated_at: now,
        }
    }
}

/// Repository trait for Member data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MemberRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Member>, AppError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Member>, AppError>;

    async fn email_exists(&self, email: &str) -> Result<bool, AppError>;

    async fn username_exists(&self, username: &str) -> Result<bool, AppError>;

    async fn create(&self, member: &Member) -> Result<Member, AppError>;

    /// Update profile fields (names, phone, country, birth date, gender, photo).
    async fn update_profile(&self, member: &Member) -> Result<Member, AppError>;

    async fn update_password(&self, id: i64, password_hash: &str) -> Result<(), AppError>;

    /// Search by name, username or email; returns the page and the total count.
    async fn search(&self, request: &SearchRequest) -> Result<(Vec<Member>, i64), AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_satisfies_hierarchy() {
        assert!(Role::SuperAdministrator.satisfies(Role::Administrator));
        assert!(Role::Administrator.satisfies(Role::User));
        assert!(!Role::User.satisfies(Role::Administrator));
        assert!(!Role::Administrator.satisfies(Role::SuperAdministrator));
    }

    #[test]
    fn test_full_name_trims_missing_parts() {
        let member = Member {
            first_name: "Ada".into(),
            last_name: String::new(),
            ..Default::default()
        };
        assert_eq!(member.full_name(), "Ada");
    }
}
