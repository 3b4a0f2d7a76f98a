//! Review Service
//!
//! Ratings left by attendees of a finished stream.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use tracing::{info, instrument};

use crate::application::dto::engagement::{
    CreateReviewRequest, ReviewResponse, StreamReviewsResponse, UpdateReviewRequest,
};
use crate::application::services::notification_service::{NewNotification, Notifier};
use crate::domain::{
    MemberRepository, NotificationType, ParentType, Review, ReviewRepository, ReviewView, StreamRepository,
};
use crate::shared::error::AppError;
use crate::shared::pagination::{SearchRequest, SearchResult};
use crate::shared::snowflake::SnowflakeGenerator;

#[async_trait]
pub trait ReviewService: Send + Sync {
    async fn create(&self, reviewer_id: i64, request: CreateReviewRequest) -> Result<ReviewResponse, ReviewError>;

    async fn update(
        &self,
        reviewer_id: i64,
        review_id: i64,
        request: UpdateReviewRequest,
    ) -> Result<ReviewResponse, ReviewError>;

    async fn delete(&self, reviewer_id: i64, review_id: i64) -> Result<(), ReviewError>;

    async fn find_reviews(&self, stream_id: i64, request: &SearchRequest) -> Result<StreamReviewsResponse, ReviewError>;

    async fn find_mine(
        &self,
        reviewer_id: i64,
        request: &SearchRequest,
    ) -> Result<SearchResult<ReviewResponse>, ReviewError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    #[error("Review not found")]
    NotFound,

    #[error("Stream not found")]
    StreamNotFound,

    #[error("Stream has not ended")]
    StreamNotEnded,

    #[error("Organizers cannot review their own stream")]
    OrganizerCannotReview,

    #[error("Only attendees can review")]
    NotAnAttendee,

    #[error("Already reviewed")]
    AlreadyReviewed,

    #[error("Not the reviewer")]
    NotReviewer,

    #[error(transparent)]
    Repository(#[from] AppError),
}

impl From<ReviewError> for AppError {
    fn from(err: ReviewError) -> Self {
        match err {
            ReviewError::NotFound => AppError::NotFound("review.not.found".into()),
            ReviewError::StreamNotFound => AppError::NotFound("stream.not.found".into()),
            ReviewError::StreamNotEnded => AppError::Conflict("review.stream.not.ended".into()),
            ReviewError::OrganizerCannotReview => AppError::Forbidden("review.organizer.cannot.review".into()),
            ReviewError::NotAnAttendee => AppError::Forbidden("review.not.an.attendee".into()),
            ReviewError::AlreadyReviewed => AppError::Conflict("review.already.exists".into()),
            ReviewError::NotReviewer => AppError::Forbidden("review.not.reviewer".into()),
            ReviewError::Repository(e) => e,
        }
    }
}

pub struct ReviewServiceImpl {
    reviews: Arc<dyn ReviewRepository>,
    streams: Arc<dyn StreamRepository>,
    members: Arc<dyn MemberRepository>,
    notifier: Notifier,
    id_generator: Arc<SnowflakeGenerator>,
}

impl ReviewServiceImpl {
    pub fn new(
        reviews: Arc<dyn ReviewRepository>,
        streams: Arc<dyn StreamRepository>,
        members: Arc<dyn MemberRepository>,
        notifier: Notifier,
        id_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            reviews,
            streams,
            members,
            notifier,
            id_generator,
        }
    }

    async fn find_own(&self, reviewer_id: i64, review_id: i64) -> Result<Review, ReviewError> {
        let review = self
            .reviews
            .find_by_id(review_id)
            .await?
            .ok_or(ReviewError::NotFound)?;
        if review.reviewer_id != reviewer_id {
            return Err(ReviewError::NotReviewer);
        }
        Ok(review)
    }

    async fn view(&self, review: Review) -> Result<ReviewResponse, ReviewError> {
        let reviewer = self.members.find_by_id(review.reviewer_id).await?;
        Ok(ReviewView {
            reviewer_name: reviewer.as_ref().map(|m| m.full_name()).unwrap_or_default(),
            reviewer_photo_url: reviewer.and_then(|m| m.profile_photo_url),
            review,
        }
        .into())
    }
}

fn normalize_comment(comment: Option<String>) -> Option<String> {
    comment.map(|c| c.trim().to_string()).filter(|c| !c.is_empty())
}

#[async_trait]
impl ReviewService for ReviewServiceImpl {
    #[instrument(skip(self, request), fields(stream_id = request.stream_id))]
    async fn create(&self, reviewer_id: i64, request: CreateReviewRequest) -> Result<ReviewResponse, ReviewError> {
        let stream = self
            .streams
            .find_by_id(request.stream_id)
            .await?
            .ok_or(ReviewError::StreamNotFound)?;

        if stream.is_organizer(reviewer_id) {
            return Err(ReviewError::OrganizerCannotReview);
        }
        let now = Utc::now();
        if !stream.has_ended(now) {
            return Err(ReviewError::StreamNotEnded);
        }
        let attended = self
            .streams
            .find_attendee(stream.id, reviewer_id)
            .await?
            .is_some_and(|a| a.request_to_join_status.is_approved());
        if !attended {
            return Err(ReviewError::NotAnAttendee);
        }
        if self.reviews.exists(reviewer_id, ParentType::Stream, stream.id).await? {
            return Err(ReviewError::AlreadyReviewed);
        }

        let review = Review {
            id: self.id_generator.generate(),
            reviewer_id,
            parent_type: ParentType::Stream,
            parent_id: stream.id,
            rating: request.rating,
            comment: normalize_comment(request.comment),
            created_at: now,
            updated_at: now,
        };
        let review = self
            .reviews
            .create(&review)
            .await
            .map_err(|e| match e {
                AppError::Conflict(_) => ReviewError::AlreadyReviewed,
                other => ReviewError::Repository(other),
            })?;
        info!(review_id = review.id, reviewer_id, stream_id = stream.id, rating = review.rating, "Review created");

        let response = self.view(review).await?;
        self.notifier
            .notify(NewNotification {
                receiver_id: stream.organizer_id,
                initiator_id: Some(reviewer_id),
                notification_type: NotificationType::ReviewReceived,
                parent: Some((ParentType::Stream, stream.id)),
                params: json!({ "name": response.reviewer_name, "title": stream.title }),
            })
            .await;

        Ok(response)
    }

    #[instrument(skip(self, request))]
    async fn update(
        &self,
        reviewer_id: i64,
        review_id: i64,
        request: UpdateReviewRequest,
    ) -> Result<ReviewResponse, ReviewError> {
        let mut review = self.find_own(reviewer_id, review_id).await?;
        review.rating = request.rating;
        review.comment = normalize_comment(request.comment);
        review.updated_at = Utc::now();

        let review = self.reviews.update(&review).await?;
        info!(review_id, reviewer_id, "Review updated");
        self.view(review).await
    }

    #[instrument(skip(self))]
    async fn delete(&self, reviewer_id: i64, review_id: i64) -> Result<(), ReviewError> {
        let review = self.find_own(reviewer_id, review_id).await?;
        self.reviews.delete(review.id).await?;
        info!(review_id, reviewer_id, "Review deleted");
        Ok(())
    }

    async fn find_reviews(&self, stream_id: i64, request: &SearchRequest) -> Result<StreamReviewsResponse, ReviewError> {
        if self.streams.find_by_id(stream_id).await?.is_none() {
            return Err(ReviewError::StreamNotFound);
        }
        let (views, total) = self.reviews.find_by_parent(ParentType::Stream, stream_id, request).await?;
        let average_rating = self
            .reviews
            .average_rating(ParentType::Stream, stream_id)
            .await?
            .map(|avg| (avg * 10.0).round() / 10.0);

        Ok(StreamReviewsResponse {
            average_rating,
            reviews: SearchResult::new(views, total, request).map(ReviewResponse::from),
        })
    }

    async fn find_mine(
        &self,
        reviewer_id: i64,
        request: &SearchRequest,
    ) -> Result<SearchResult<ReviewResponse>, ReviewError> {
        let (views, total) = self.reviews.find_by_reviewer(reviewer_id, request).await?;
        Ok(SearchResult::new(views, total, request).map(ReviewResponse::from))
    }
}
