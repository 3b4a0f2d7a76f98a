//! Business Service
//!
//! Member-owned business profiles. Links are managed by the link service.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, instrument};

use crate::application::dto::business::{BusinessRequest, BusinessResponse};
use crate::domain::{Business, BusinessRepository, BusinessStatus, CountryRepository};
use crate::shared::error::AppError;
use crate::shared::pagination::{SearchRequest, SearchResult};
use crate::shared::snowflake::SnowflakeGenerator;

#[async_trait]
pub trait BusinessService: Send + Sync {
    async fn create(&self, owner_id: i64, request: BusinessRequest) -> Result<BusinessResponse, BusinessError>;

    async fn update(
        &self,
        member_id: i64,
        business_id: i64,
        request: BusinessRequest,
    ) -> Result<BusinessResponse, BusinessError>;

    async fn update_status(
        &self,
        member_id: i64,
        business_id: i64,
        status: BusinessStatus,
    ) -> Result<BusinessResponse, BusinessError>;

    async fn delete(&self, member_id: i64, business_id: i64) -> Result<(), BusinessError>;

    async fn get(&self, business_id: i64) -> Result<BusinessResponse, BusinessError>;

    async fn search(&self, request: &SearchRequest) -> Result<SearchResult<BusinessResponse>, BusinessError>;

    async fn find_mine(
        &self,
        owner_id: i64,
        request: &SearchRequest,
    ) -> Result<SearchResult<BusinessResponse>, BusinessError>;
}

#[derive(Debug, thiserror::Error)]
pub enum BusinessError {
    #[error("Business not found")]
    NotFound,

    #[error("Not the business owner")]
    NotOwner,

    #[error("Unknown country {0}")]
    UnknownCountry(String),

    #[error(transparent)]
    Repository(#[from] AppError),
}

impl From<BusinessError> for AppError {
    fn from(err: BusinessError) -> Self {
        match err {
            BusinessError::NotFound => AppError::NotFound("business.not.found".into()),
            BusinessError::NotOwner => AppError::Forbidden("business.not.owner".into()),
            BusinessError::UnknownCountry(_) => AppError::BadRequest("country.not.found".into()),
            BusinessError::Repository(e) => e,
        }
    }
}

pub struct BusinessServiceImpl {
    repo: Arc<dyn BusinessRepository>,
    countries: Arc<dyn CountryRepository>,
    id_generator: Arc<SnowflakeGenerator>,
}

fn clean(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

impl BusinessServiceImpl {
    pub fn new(
        repo: Arc<dyn BusinessRepository>,
        countries: Arc<dyn CountryRepository>,
        id_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            repo,
            countries,
            id_generator,
        }
    }

    async fn find_as_owner(&self, member_id: i64, business_id: i64) -> Result<Business, BusinessError> {
        let business = self
            .repo
            .find_by_id(business_id)
            .await?
            .ok_or(BusinessError::NotFound)?;
        if !business.is_owner(member_id) {
            return Err(BusinessError::NotOwner);
        }
        Ok(business)
    }

    async fn country_code(&self, code: &str) -> Result<String, BusinessError> {
        let code = code.trim().to_uppercase();
        self.countries
            .find_by_code(&code)
            .await?
            .map(|c| c.code)
            .ok_or(BusinessError::UnknownCountry(code))
    }

    fn apply(business: &mut Business, request: BusinessRequest, country: String) {
        business.title = request.title.trim().to_string();
        business.motto = clean(request.motto);
        business.description = request.description.trim().to_string();
        business.channel = request.channel;
        business.business_type = request.business_type.trim().to_uppercase();
        business.country = country;
        business.address = clean(request.address);
        business.founding_year = request.founding_year;
        business.registration_number = clean(request.registration_number);
    }
}

#[async_trait]
impl BusinessService for BusinessServiceImpl {
    #[instrument(skip(self, request))]
    async fn create(&self, owner_id: i64, request: BusinessRequest) -> Result<BusinessResponse, BusinessError> {
        let country = self.country_code(&request.country).await?;
        let now = Utc::now();
        let mut business = Business {
            id: self.id_generator.generate(),
            owner_id,
            title: String::new(),
            motto: None,
            description: String::new(),
            channel: request.channel,
            business_type: String::new(),
            country: String::new(),
            address: None,
            founding_year: None,
            registration_number: None,
            status: BusinessStatus::Active,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        };
        Self::apply(&mut business, request, country);

        let created = self.repo.create(&business).await?;
        info!(business_id = created.id, owner_id, "Business created");
        Ok(created.into())
    }

    #[instrument(skip(self, request))]
    async fn update(
        &self,
        member_id: i64,
        business_id: i64,
        request: BusinessRequest,
    ) -> Result<BusinessResponse, BusinessError> {
        let mut business = self.find_as_owner(member_id, business_id).await?;
        let country = self.country_code(&request.country).await?;
        Self::apply(&mut business, request, country);
        business.updated_at = Utc::now();

        let updated = self.repo.update(&business).await?;
        info!(business_id, member_id, "Business updated");
        Ok(updated.into())
    }

    #[instrument(skip(self))]
    async fn update_status(
        &self,
        member_id: i64,
        business_id: i64,
        status: BusinessStatus,
    ) -> Result<BusinessResponse, BusinessError> {
        let mut business = self.find_as_owner(member_id, business_id).await?;
        business.status = status;
        business.updated_at = Utc::now();

        let updated = self.repo.update(&business).await?;
        info!(business_id, member_id, %status, "Business status updated");
        Ok(updated.into())
    }

    #[instrument(skip(self))]
    async fn delete(&self, member_id: i64, business_id: i64) -> Result<(), BusinessError> {
        self.find_as_owner(member_id, business_id).await?;
        self.repo.soft_delete(business_id).await?;
        info!(business_id, member_id, "Business deleted");
        Ok(())
    }

    async fn get(&self, business_id: i64) -> Result<BusinessResponse, BusinessError> {
        self.repo
            .find_by_id(business_id)
            .await?
            .map(BusinessResponse::from)
            .ok_or(BusinessError::NotFound)
    }

    async fn search(&self, request: &SearchRequest) -> Result<SearchResult<BusinessResponse>, BusinessError> {
        let (businesses, total) = self.repo.search(request).await?;
        Ok(SearchResult::new(businesses, total, request).map(BusinessResponse::from))
    }

    async fn find_mine(
        &self,
        owner_id: i64,
        request: &SearchRequest,
    ) -> Result<SearchResult<BusinessResponse>, BusinessError> {
        let (businesses, total) = self.repo.find_by_owner(owner_id, request).await?;
        Ok(SearchResult::new(businesses, total, request).map(BusinessResponse::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::fixtures;
    use crate::domain::{BusinessChannel, Country, MockBusinessRepository, MockCountryRepository};
    use pretty_assertions::assert_eq;

    struct Mocks {
        repo: MockBusinessRepository,
        countries: MockCountryRepository,
    }

    impl Mocks {
        fn new() -> Self {
            let mut countries = MockCountryRepository::new();
            countries.expect_find_by_code().returning(|code| {
                Ok((code == "NG").then(|| Country {
                    id: 1,
                    title: "Nigeria".into(),
                    code: "NG".into(),
                    timezone: "Africa/Lagos".into(),
                }))
            });
            Self {
                repo: MockBusinessRepository::new(),
                countries,
            }
        }

        fn build(self) -> BusinessServiceImpl {
            BusinessServiceImpl::new(
                Arc::new(self.repo),
                Arc::new(self.countries),
                Arc::new(SnowflakeGenerator::new(1, 1)),
            )
        }
    }

    fn request(country: &str) -> BusinessRequest {
        BusinessRequest {
            title: " Mama Put Bakery ".into(),
            motto: Some("  ".into()),
            description: "Bread and pastries".into(),
            channel: BusinessChannel::Hybrid,
            business_type: "food".into(),
            country: country.into(),
            address: None,
            founding_year: Some(2019),
            registration_number: None,
        }
    }

    #[tokio::test]
    async fn test_create_normalizes_fields() {
        let mut mocks = Mocks::new();
        mocks
            .repo
            .expect_create()
            .withf(|b| b.owner_id == 1 && b.status == BusinessStatus::Active)
            .times(1)
            .returning(|b| Ok(b.clone()));

        let created = mocks.build().create(1, request("ng")).await.unwrap();
        assert_eq!(created.title, "Mama Put Bakery");
        assert_eq!(created.motto, None);
        assert_eq!(created.business_type, "FOOD");
        assert_eq!(created.country, "NG");
    }

    #[tokio::test]
    async fn test_unknown_country_rejected() {
        let err = Mocks::new().build().create(1, request("ZZ")).await.unwrap_err();
        assert_eq!(AppError::from(err).message_key(), "country.not.found");
    }

    #[tokio::test]
    async fn test_only_owner_updates_status() {
        let mut mocks = Mocks::new();
        mocks
            .repo
            .expect_find_by_id()
            .returning(|id| Ok(Some(fixtures::business(id, 1))));
        mocks.repo.expect_update().never();

        let err = mocks
            .build()
            .update_status(2, 8, BusinessStatus::Inactive)
            .await
            .unwrap_err();
        assert!(matches!(err, BusinessError::NotOwner));
    }

    #[tokio::test]
    async fn test_owner_deletes() {
        let mut mocks = Mocks::new();
        mocks
            .repo
            .expect_find_by_id()
            .returning(|id| Ok(Some(fixtures::business(id, 1))));
        mocks.repo.expect_soft_delete().times(1).returning(|_| Ok(()));

        mocks.build().delete(1, 8).await.unwrap();
    }
}
