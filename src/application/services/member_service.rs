//! Member Service
//!
//! Own-profile reads and updates, public profiles and member search.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, instrument};

use crate::application::dto::request::{UpdatePhotoRequest, UpdateProfileRequest};
use crate::application::dto::response::{MemberResponse, MemberSummaryResponse, PublicProfileResponse};
use crate::domain::{BlockUserRepository, CountryRepository, FollowerRepository, Member, MemberRepository};
use crate::shared::error::AppError;
use crate::shared::pagination::{SearchRequest, SearchResult};

/// Member service trait
#[async_trait]
pub trait MemberService: Send + Sync {
    async fn get_me(&self, member_id: i64) -> Result<MemberResponse, MemberError>;

    async fn update_profile(
        &self,
        member_id: i64,
        request: UpdateProfileRequest,
    ) -> Result<MemberResponse, MemberError>;

    async fn update_photo(&self, member_id: i64, request: UpdatePhotoRequest) -> Result<MemberResponse, MemberError>;

    async fn remove_photo(&self, member_id: i64) -> Result<MemberResponse, MemberError>;

    /// Profile of `member_id` as seen by `viewer_id`.
    async fn get_profile(&self, viewer_id: i64, member_id: i64) -> Result<PublicProfileResponse, MemberError>;

    async fn search(
        &self,
        viewer_id: i64,
        request: &SearchRequest,
    ) -> Result<SearchResult<MemberSummaryResponse>, MemberError>;
}

/// Member service errors
#[derive(Debug, thiserror::Error)]
pub enum MemberError {
    #[error("Member not found")]
    NotFound,

    #[error("Unknown country: {0}")]
    UnknownCountry(String),

    #[error(transparent)]
    Repository(#[from] AppError),
}

impl From<MemberError> for AppError {
    fn from(err: MemberError) -> Self {
        match err {
            MemberError::NotFound => AppError::NotFound("member.not.found".into()),
            MemberError::UnknownCountry(_) => AppError::BadRequest("country.not.found".into()),
            MemberError::Repository(e) => e,
        }
    }
}

pub struct MemberServiceImpl {
    members: Arc<dyn MemberRepository>,
    followers: Arc<dyn FollowerRepository>,
    blocks: Arc<dyn BlockUserRepository>,
    countries: Arc<dyn CountryRepository>,
}

impl MemberServiceImpl {
    pub fn new(
        members: Arc<dyn MemberRepository>,
        followers: Arc<dyn FollowerRepository>,
        blocks: Arc<dyn BlockUserRepository>,
        countries: Arc<dyn CountryRepository>,
    ) -> Self {
        Self {
            members,
            followers,
            blocks,
            countries,
        }
    }

    async fn find(&self, member_id: i64) -> Result<Member, MemberError> {
        self.members
            .find_by_id(member_id)
            .await?
            .ok_or(MemberError::NotFound)
    }
}

#[async_trait]
impl MemberService for MemberServiceImpl {
    async fn get_me(&self, member_id: i64) -> Result<MemberResponse, MemberError> {
        Ok(self.find(member_id).await?.into())
    }

    #[instrument(skip(self, request))]
    async fn update_profile(
        &self,
        member_id: i64,
        request: UpdateProfileRequest,
    ) -> Result<MemberResponse, MemberError> {
        let mut member = self.find(member_id).await?;

        if let Some(code) = request.country {
            let code = code.to_uppercase();
            if self.countries.find_by_code(&code).await?.is_none() {
                return Err(MemberError::UnknownCountry(code));
            }
            member.country = Some(code);
        }
        if let Some(first_name) = request.first_name {
            member.first_name = first_name.trim().to_string();
        }
        if let Some(last_name) = request.last_name {
            member.last_name = last_name.trim().to_string();
        }
        if request.phone_number.is_some() {
            member.phone_number = request.phone_number;
        }
        if request.date_of_birth.is_some() {
            member.date_of_birth = request.date_of_birth;
        }
        if request.gender.is_some() {
            member.gender = request.gender;
        }
        member.updated_at = Utc::now();

        let updated = self.members.update_profile(&member).await?;
        info!(member_id, "Profile updated");
        Ok(updated.into())
    }

    #[instrument(skip(self, request))]
    async fn update_photo(&self, member_id: i64, request: UpdatePhotoRequest) -> Result<MemberResponse, MemberError> {
        let mut member = self.find(member_id).await?;
        member.profile_photo_url = Some(request.profile_photo_url);
        member.updated_at = Utc::now();
        Ok(self.members.update_profile(&member).await?.into())
    }

    #[instrument(skip(self))]
    async fn remove_photo(&self, member_id: i64) -> Result<MemberResponse, MemberError> {
        let mut member = self.find(member_id).await?;
        member.profile_photo_url = None;
        member.updated_at = Utc::now();
        Ok(self.members.update_profile(&member).await?.into())
    }

    async fn get_profile(&self, viewer_id: i64, member_id: i64) -> Result<PublicProfileResponse, MemberError> {
        // A member who blocked the viewer is invisible to them
        if viewer_id != member_id && self.blocks.is_blocked(member_id, viewer_id).await? {
            return Err(MemberError::NotFound);
        }
        let member = self.find(member_id).await?;
        if member.is_banned() {
            return Err(MemberError::NotFound);
        }

        let (total_followers, total_following) = self.followers.counts(member_id).await?;
        let (is_following, is_blocked) = if viewer_id == member_id {
            (false, false)
        } else {
            (
                self.followers.exists(viewer_id, member_id).await?,
                self.blocks.is_blocked(viewer_id, member_id).await?,
            )
        };

        Ok(PublicProfileResponse {
            id: member.id.to_string(),
            full_name: member.full_name(),
            username: member.username,
            profile_photo_url: member.profile_photo_url,
            country: member.country,
            total_followers,
            total_following,
            is_following,
            is_blocked,
            joined_on: member.created_at,
        })
    }

    async fn search(
        &self,
        viewer_id: i64,
        request: &SearchRequest,
    ) -> Result<SearchResult<MemberSummaryResponse>, MemberError> {
        let (members, total) = self.members.search(request).await?;
        let values = members
            .into_iter()
            .filter(|m| m.id != viewer_id)
            .map(|m| MemberSummaryResponse {
                member_id: m.id.to_string(),
                full_name: m.full_name(),
                username: m.username,
                profile_photo_url: m.profile_photo_url,
                since: m.created_at,
            })
            .collect();
        Ok(SearchResult::new(values, total, request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Country, MockBlockUserRepository, MockCountryRepository, MockFollowerRepository, MockMemberRepository,
        ProfileStatus,
    };
    use mockall::predicate::eq;
    use pretty_assertions::assert_eq;

    struct Mocks {
        members: MockMemberRepository,
        followers: MockFollowerRepository,
        blocks: MockBlockUserRepository,
        countries: MockCountryRepository,
    }

    impl Mocks {
        fn new() -> Self {
            Self {
                members: MockMemberRepository::new(),
                followers: MockFollowerRepository::new(),
                blocks: MockBlockUserRepository::new(),
                countries: MockCountryRepository::new(),
            }
        }

        fn build(self) -> MemberServiceImpl {
            MemberServiceImpl::new(
                Arc::new(self.members),
                Arc::new(self.followers),
                Arc::new(self.blocks),
                Arc::new(self.countries),
            )
        }
    }

    fn member(id: i64) -> Member {
        Member {
            id,
            email_address: format!("m{id}@fleenfeen.test"),
            username: format!("member{id}"),
            first_name: "Grace".into(),
            last_name: "Hopper".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_profile_hidden_when_target_blocks_viewer() {
        let mut mocks = Mocks::new();
        mocks.blocks.expect_is_blocked().with(eq(2), eq(1)).returning(|_, _| Ok(true));

        let err = mocks.build().get_profile(1, 2).await.unwrap_err();
        assert!(matches!(err, MemberError::NotFound));
    }

    #[tokio::test]
    async fn test_profile_reports_relationship() {
        let mut mocks = Mocks::new();
        mocks.blocks.expect_is_blocked().with(eq(2), eq(1)).returning(|_, _| Ok(false));
        mocks.blocks.expect_is_blocked().with(eq(1), eq(2)).returning(|_, _| Ok(false));
        mocks.members.expect_find_by_id().returning(|id| Ok(Some(member(id))));
        mocks.followers.expect_counts().returning(|_| Ok((12, 3)));
        mocks.followers.expect_exists().with(eq(1), eq(2)).returning(|_, _| Ok(true));

        let profile = mocks.build().get_profile(1, 2).await.unwrap();
        assert_eq!(profile.full_name, "Grace Hopper");
        assert_eq!(profile.total_followers, 12);
        assert!(profile.is_following);
        assert!(!profile.is_blocked);
    }

    #[tokio::test]
    async fn test_banned_member_profile_is_not_found() {
        let mut mocks = Mocks::new();
        mocks.blocks.expect_is_blocked().returning(|_, _| Ok(false));
        mocks.members.expect_find_by_id().returning(|id| {
            Ok(Some(Member {
                profile_status: ProfileStatus::Banned,
                ..member(id)
            }))
        });

        let err = mocks.build().get_profile(1, 2).await.unwrap_err();
        assert!(matches!(err, MemberError::NotFound));
    }

    #[tokio::test]
    async fn test_update_profile_rejects_unknown_country() {
        let mut mocks = Mocks::new();
        mocks.members.expect_find_by_id().returning(|id| Ok(Some(member(id))));
        mocks.countries.expect_find_by_code().with(eq("ZZ")).returning(|_| Ok(None));
        mocks.members.expect_update_profile().never();

        let request = UpdateProfileRequest {
            country: Some("zz".into()),
            ..Default::default()
        };
        let err = mocks.build().update_profile(1, request).await.unwrap_err();
        assert!(matches!(err, MemberError::UnknownCountry(code) if code == "ZZ"));
    }

    #[tokio::test]
    async fn test_update_profile_keeps_omitted_fields() {
        let mut mocks = Mocks::new();
        mocks.members.expect_find_by_id().returning(|id| Ok(Some(member(id))));
        mocks.countries.expect_find_by_code().returning(|code| {
            Ok(Some(Country {
                id: 1,
                title: "Ghana".into(),
                code: code.to_string(),
                timezone: "Africa/Accra".into(),
            }))
        });
        mocks
            .members
            .expect_update_profile()
            .withf(|m| m.first_name == "Ada" && m.last_name == "Hopper" && m.country.as_deref() == Some("GH"))
            .returning(|m| Ok(m.clone()));

        let request = UpdateProfileRequest {
            first_name: Some(" Ada ".into()),
            country: Some("gh".into()),
            ..Default::default()
        };
        let updated = mocks.build().update_profile(1, request).await.unwrap();
        assert_eq!(updated.full_name, "Ada Hopper");
    }
}
