//! Country Service

use std::sync::Arc;

use async_trait::async_trait;

use crate::application::dto::response::CountryResponse;
use crate::domain::CountryRepository;
use crate::shared::error::AppError;
use crate::shared::pagination::{SearchRequest, SearchResult};

#[async_trait]
pub trait CountryService: Send + Sync {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResult<CountryResponse>, AppError>;

    async fn find_by_code(&self, code: &str) -> Result<CountryResponse, AppError>;
}

pub struct CountryServiceImpl {
    repo: Arc<dyn CountryRepository>,
}

impl CountryServiceImpl {
    pub fn new(repo: Arc<dyn CountryRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl CountryService for CountryServiceImpl {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResult<CountryResponse>, AppError> {
        let (countries, total) = self.repo.search(request).await?;
        Ok(SearchResult::new(countries, total, request).map(CountryResponse::from))
    }

    async fn find_by_code(&self, code: &str) -> Result<CountryResponse, AppError> {
        self.repo
            .find_by_code(&code.to_uppercase())
            .await?
            .map(CountryResponse::from)
            .ok_or_else(|| AppError::NotFound("country.not.found".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Country, MockCountryRepository};
    use mockall::predicate::eq;

    #[tokio::test]
    async fn test_find_by_code_is_case_insensitive() {
        let mut repo = MockCountryRepository::new();
        repo.expect_find_by_code().with(eq("NG")).returning(|code| {
            Ok(Some(Country {
                id: 566,
                title: "Nigeria".into(),
                code: code.to_string(),
                timezone: "Africa/Lagos".into(),
            }))
        });

        let country = CountryServiceImpl::new(Arc::new(repo)).find_by_code("ng").await.unwrap();
        assert_eq!(country.id, "566");
        assert_eq!(country.timezone, "Africa/Lagos");
    }

    #[tokio::test]
    async fn test_unknown_code_is_not_found() {
        let mut repo = MockCountryRepository::new();
        repo.expect_find_by_code().returning(|_| Ok(None));

        let err = CountryServiceImpl::new(Arc::new(repo)).find_by_code("zz").await.unwrap_err();
        assert_eq!(err.message_key(), "country.not.found");
    }
}
