//! Business DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::{Business, BusinessChannel, BusinessStatus, EnumInfo};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BusinessRequest {
    #[validate(length(min = 1, max = 300, message = "business.title.length"))]
    pub title: String,

    #[validate(length(max = 500, message = "business.motto.too.long"))]
    pub motto: Option<String>,

    #[validate(length(min = 1, max = 3000, message = "business.description.length"))]
    pub description: String,

    pub channel: BusinessChannel,

    #[validate(length(min = 1, max = 100, message = "business.type.length"))]
    pub business_type: String,

    #[validate(length(equal = 2, message = "country.code.invalid"))]
    pub country: String,

    #[validate(length(max = 500, message = "business.address.too.long"))]
    pub address: Option<String>,

    #[validate(range(min = 1800, max = 2100, message = "business.founding.year.invalid"))]
    pub founding_year: Option<i32>,

    #[validate(length(max = 100, message = "business.registration.number.too.long"))]
    pub registration_number: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateBusinessStatusRequest {
    pub status: BusinessStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct BusinessResponse {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub motto: Option<String>,
    pub description: String,
    pub channel: EnumInfo,
    pub business_type: String,
    pub country: String,
    pub address: Option<String>,
    pub founding_year: Option<i32>,
    pub registration_number: Option<String>,
    pub status: EnumInfo,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Business> for BusinessResponse {
    fn from(business: Business) -> Self {
        Self {
            id: business.id.to_string(),
            owner_id: business.owner_id.to_string(),
            title: business.title,
            motto: business.motto,
            description: business.description,
            channel: business.channel.info(),
            business_type: business.business_type,
            country: business.country,
            address: business.address,
            founding_year: business.founding_year,
            registration_number: business.registration_number,
            status: business.status.info(),
            created_at: business.created_at,
            updated_at: business.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn request(country: &str, founding_year: Option<i32>) -> BusinessRequest {
        BusinessRequest {
            title: "Mama Put Bakery".into(),
            motto: None,
            description: "Bread and pastries".into(),
            channel: BusinessChannel::Physical,
            business_type: "FOOD".into(),
            country: country.into(),
            address: None,
            founding_year,
            registration_number: None,
        }
    }

    #[test_case("NG", Some(2019) => true ; "valid")]
    #[test_case("NGA", None => false ; "three letter country")]
    #[test_case("NG", Some(1066) => false ; "founding year too early")]
    fn test_business_request_validation(country: &str, founding_year: Option<i32>) -> bool {
        request(country, founding_year).validate().is_ok()
    }
}
