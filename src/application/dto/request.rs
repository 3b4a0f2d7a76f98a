//! Request DTOs
//!
//! Data structures for account and profile request bodies. Slice-specific
//! requests live next to their responses in the sibling modules.

use chrono::NaiveDate;
use serde::Deserialize;
use validator::Validate;

use crate::domain::Gender;

/// Sign-up request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignUpRequest {
    #[validate(email(message = "email.address.invalid"), length(max = 150, message = "email.address.too.long"))]
    pub email_address: String,

    #[validate(length(min = 3, max = 50, message = "username.length"))]
    pub username: String,

    #[validate(length(min = 1, max = 100, message = "first.name.length"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "last.name.length"))]
    pub last_name: String,

    #[validate(length(min = 8, max = 128, message = "password.length"))]
    pub password: String,

    #[validate(length(min = 2, max = 2, message = "country.code.length"))]
    pub country: Option<String>,

    #[validate(length(min = 4, max = 20, message = "phone.number.length"))]
    pub phone_number: Option<String>,

    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
}

/// Sign-in request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignInRequest {
    #[validate(email(message = "email.address.invalid"))]
    pub email_address: String,

    #[validate(length(min = 1, message = "password.required"))]
    pub password: String,
}

/// Refresh token / sign-out request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1, message = "refresh.token.required"))]
    pub refresh_token: String,
}

/// Change password request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "password.required"))]
    pub old_password: String,

    #[validate(length(min = 8, max = 128, message = "password.length"))]
    pub new_password: String,
}

/// Update profile request; omitted fields keep their value.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100, message = "first.name.length"))]
    pub first_name: Option<String>,

    #[validate(length(min = 1, max = 100, message = "last.name.length"))]
    pub last_name: Option<String>,

    #[validate(length(min = 4, max = 20, message = "phone.number.length"))]
    pub phone_number: Option<String>,

    #[validate(length(min = 2, max = 2, message = "country.code.length"))]
    pub country: Option<String>,

    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
}

/// Update profile photo request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdatePhotoRequest {
    #[validate(url(message = "url.invalid"), length(max = 1000, message = "url.too.long"))]
    pub profile_photo_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::validation::validate;

    fn sign_up() -> SignUpRequest {
        SignUpRequest {
            email_address: "ada@fleenfeen.test".into(),
            username: "ada".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            password: "correct-horse".into(),
            country: Some("NG".into()),
            phone_number: None,
            date_of_birth: None,
            gender: None,
        }
    }

    #[test]
    fn test_valid_sign_up() {
        assert!(validate(&sign_up()).is_ok());
    }

    #[test]
    fn test_sign_up_rejects_bad_email_and_short_password() {
        let mut request = sign_up();
        request.email_address = "ada".into();
        request.password = "short".into();
        let err = validate(&request).unwrap_err();
        match err {
            crate::shared::error::AppError::Validation(fields) => {
                let names: Vec<_> = fields.iter().map(|f| f.field.as_str()).collect();
                assert_eq!(names, vec!["email_address", "password"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_photo_requires_url() {
        let request = UpdatePhotoRequest { profile_photo_url: "not a url".into() };
        assert!(validate(&request).is_err());
    }
}
