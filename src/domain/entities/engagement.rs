//! Likes, bookmarks, links and reviews attached to a parent entity.
//!
//! Maps to the `likes`, `bookmarks`, `links` and `reviews` tables. Each row
//! points at its parent through `(parent_type, parent_id)`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{string_enum, ParentType};
use crate::shared::error::AppError;
use crate::shared::pagination::SearchRequest;

string_enum! {
    pub enum LikeType {
        Like = "LIKE",
        Unlike = "UNLIKE",
    }
}

string_enum! {
    pub enum LinkType {
        Website = "WEBSITE",
        Facebook = "FACEBOOK",
        Instagram = "INSTAGRAM",
        X = "X",
        Linkedin = "LINKEDIN",
        Youtube = "YOUTUBE",
        Tiktok = "TIKTOK",
        Whatsapp = "WHATSAPP",
    }
}

pub const MIN_RATING: i16 = 1;
pub const MAX_RATING: i16 = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Like {
    pub id: i64,
    pub member_id: i64,
    pub parent_type: ParentType,
    pub parent_id: i64,
    pub like_type: LikeType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: i64,
    pub member_id: i64,
    pub parent_type: ParentType,
    pub parent_id: i64,
    /// Title of the bookmarked parent, filled on reads
    pub parent_title: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub id: i64,
    pub parent_type: ParentType,
    pub parent_id: i64,
    pub link_type: LinkType,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub reviewer_id: i64,
    pub parent_type: ParentType,
    pub parent_id: i64,
    pub rating: i16,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Review joined with the reviewer's display fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewView {
    pub review: Review,
    pub reviewer_name: String,
    pub reviewer_photo_url: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LikeRepository: Send + Sync {
    async fn find(&self, member_id: i64, parent_type: ParentType, parent_id: i64) -> Result<Option<Like>, AppError>;

    /// Insert or update keyed by (member_id, parent_type, parent_id).
    async fn upsert(&self, like: &Like) -> Result<Like, AppError>;

    /// Add `delta` to the parent's `total_likes` (never below zero) and return the new value.
    async fn adjust_parent_total(&self, parent_type: ParentType, parent_id: i64, delta: i64) -> Result<i64, AppError>;

    async fn parent_exists(&self, parent_type: ParentType, parent_id: i64) -> Result<bool, AppError>;

    async fn find_liked(
        &self,
        member_id: i64,
        parent_type: ParentType,
        request: &SearchRequest,
    ) -> Result<(Vec<Like>, i64), AppError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookmarkRepository: Send + Sync {
    async fn exists(&self, member_id: i64, parent_type: ParentType, parent_id: i64) -> Result<bool, AppError>;

    async fn create(&self, bookmark: &Bookmark) -> Result<Bookmark, AppError>;

    /// Returns whether a row was removed.
    async fn delete(&self, member_id: i64, parent_type: ParentType, parent_id: i64) -> Result<bool, AppError>;

    async fn parent_exists(&self, parent_type: ParentType, parent_id: i64) -> Result<bool, AppError>;

    async fn find_by_member(
        &self,
        member_id: i64,
        parent_type: Option<ParentType>,
        request: &SearchRequest,
    ) -> Result<(Vec<Bookmark>, i64), AppError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    async fn find_by_parent(&self, parent_type: ParentType, parent_id: i64) -> Result<Vec<Link>, AppError>;

    /// Replace every link of the parent in one transaction.
    async fn replace_all(&self, parent_type: ParentType, parent_id: i64, links: &[Link]) -> Result<Vec<Link>, AppError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Review>, AppError>;

    async fn exists(&self, reviewer_id: i64, parent_type: ParentType, parent_id: i64) -> Result<bool, AppError>;

    async fn create(&self, review: &Review) -> Result<Review, AppError>;

    async fn update(&self, review: &Review) -> Result<Review, AppError>;

    async fn delete(&self, id: i64) -> Result<(), AppError>;

    async fn find_by_parent(
        &self,
        parent_type: ParentType,
        parent_id: i64,
        request: &SearchRequest,
    ) -> Result<(Vec<ReviewView>, i64), AppError>;

    /// Mean rating of the parent's reviews, None when there are none.
    async fn average_rating(&self, parent_type: ParentType, parent_id: i64) -> Result<Option<f64>, AppError>;

    async fn find_by_reviewer(
        &self,
        reviewer_id: i64,
        request: &SearchRequest,
    ) -> Result<(Vec<ReviewView>, i64), AppError>;
}
