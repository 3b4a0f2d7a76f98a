//! Like, bookmark, link and review DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::{Bookmark, EnumInfo, Like, Link, LinkType, ParentType, ReviewView};
use crate::shared::pagination::SearchResult;

/// Target of a like or bookmark.
#[derive(Debug, Clone, Deserialize)]
pub struct ParentRequest {
    pub parent_type: ParentType,
    #[serde(with = "super::id_format")]
    pub parent_id: i64,
}

/// Outcome of a like toggle.
#[derive(Debug, Clone, Serialize)]
pub struct LikeResponse {
    pub liked: bool,
    pub total_likes: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LikedEntryResponse {
    pub parent_type: EnumInfo,
    pub parent_id: String,
    pub liked_on: DateTime<Utc>,
}

impl From<Like> for LikedEntryResponse {
    fn from(like: Like) -> Self {
        Self {
            parent_type: like.parent_type.info(),
            parent_id: like.parent_id.to_string(),
            liked_on: like.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BookmarkResponse {
    pub id: String,
    pub parent_type: EnumInfo,
    pub parent_id: String,
    pub parent_title: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Bookmark> for BookmarkResponse {
    fn from(bookmark: Bookmark) -> Self {
        Self {
            id: bookmark.id.to_string(),
            parent_type: bookmark.parent_type.info(),
            parent_id: bookmark.parent_id.to_string(),
            parent_title: bookmark.parent_title,
            created_at: bookmark.created_at,
        }
    }
}

/// `?parent_type=` on liked-entry lists.
#[derive(Debug, Clone, Deserialize)]
pub struct LikedEntriesQuery {
    pub parent_type: ParentType,
}

/// Optional filter for bookmark lists.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookmarkFilter {
    pub parent_type: Option<ParentType>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LinkEntry {
    pub link_type: LinkType,

    #[validate(url(message = "url.invalid"), length(max = 1000, message = "url.too.long"))]
    pub url: String,
}

/// Replaces every link of a chat space or business.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateLinksRequest {
    #[validate(length(max = 20, message = "links.too.many"), nested)]
    pub links: Vec<LinkEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkResponse {
    pub link_type: EnumInfo,
    pub url: String,
}

impl From<Link> for LinkResponse {
    fn from(link: Link) -> Self {
        Self {
            link_type: link.link_type.info(),
            url: link.url,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateReviewRequest {
    #[serde(with = "super::id_format")]
    pub stream_id: i64,

    #[validate(range(min = 1, max = 5, message = "review.rating.range"))]
    pub rating: i16,

    #[validate(length(max = 1000, message = "review.comment.too.long"))]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateReviewRequest {
    #[validate(range(min = 1, max = 5, message = "review.rating.range"))]
    pub rating: i16,

    #[validate(length(max = 1000, message = "review.comment.too.long"))]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewResponse {
    pub id: String,
    pub reviewer_id: String,
    pub reviewer_name: String,
    pub reviewer_photo_url: Option<String>,
    pub parent_type: EnumInfo,
    pub parent_id: String,
    pub rating: i16,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ReviewView> for ReviewResponse {
    fn from(view: ReviewView) -> Self {
        let review = view.review;
        Self {
            id: review.id.to_string(),
            reviewer_id: review.reviewer_id.to_string(),
            reviewer_name: view.reviewer_name,
            reviewer_photo_url: view.reviewer_photo_url,
            parent_type: review.parent_type.info(),
            parent_id: review.parent_id.to_string(),
            rating: review.rating,
            comment: review.comment,
            created_at: review.created_at,
            updated_at: review.updated_at,
        }
    }
}

/// Reviews of a stream with their average rating.
#[derive(Debug, Clone, Serialize)]
pub struct StreamReviewsResponse {
    /// Rounded to one decimal; None when unreviewed
    pub average_rating: Option<f64>,
    pub reviews: SearchResult<ReviewResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::validation::validate;
    use test_case::test_case;

    #[test_case(0, false ; "below range")]
    #[test_case(1, true ; "lowest")]
    #[test_case(5, true ; "highest")]
    #[test_case(6, false ; "above range")]
    fn test_review_rating_range(rating: i16, valid: bool) {
        let request = UpdateReviewRequest { rating, comment: None };
        assert_eq!(validate(&request).is_ok(), valid);
    }

    #[test]
    fn test_link_urls_are_validated() {
        let request = UpdateLinksRequest {
            links: vec![LinkEntry {
                link_type: LinkType::Website,
                url: "fleenfeen dot com".into(),
            }],
        };
        assert!(validate(&request).is_err());
    }

    #[test]
    fn test_links_list_is_bounded() {
        let request = UpdateLinksRequest {
            links: (0..21)
                .map(|i| LinkEntry {
                    link_type: LinkType::Website,
                    url: format!("https://fleenfeen.com/{i}"),
                })
                .collect(),
        };
        assert!(validate(&request).is_err());
    }

    #[test]
    fn test_parent_request_accepts_string_id() {
        let request: ParentRequest =
            serde_json::from_str(r#"{"parent_type":"STREAM","parent_id":"1234567890"}"#).unwrap();
        assert_eq!(request.parent_type, ParentType::Stream);
        assert_eq!(request.parent_id, 1234567890);
    }
}
