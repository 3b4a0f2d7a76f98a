//! Repository Implementations
//!
//! PostgreSQL implementations of domain repository traits.
//!
//! Aggregates that change together share one repository: a chat space and
//! its members, a stream and its attendees, a soft ask with its answers,
//! replies and votes, a poll with its options and votes.
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use sqlx::PgPool;
//! use crate::infrastructure::repositories::{PgMemberRepository, PgStreamRepository};
//!
//! async fn setup_repositories(pool: PgPool) {
//!     let members = PgMemberRepository::new(pool.clone());
//!     let streams = PgStreamRepository::new(pool);
//! }
//! ```

// Identity
pub mod member_repository;
pub mod session_repository;
pub mod country_repository;
pub mod oauth2_repository;

// Spaces and events
pub mod chat_space_repository;
pub mod stream_repository;
pub mod calendar_repository;

// Social graph and engagement
pub mod social_repository;
pub mod engagement_repository;
pub mod notification_repository;
pub mod soft_ask_repository;
pub mod poll_repository;
pub mod business_repository;

pub use member_repository::PgMemberRepository;
pub use session_repository::PgSessionRepository;
pub use country_repository::PgCountryRepository;
pub use oauth2_repository::PgOauth2AuthorizationRepository;

pub use chat_space_repository::PgChatSpaceRepository;
pub use stream_repository::PgStreamRepository;
pub use calendar_repository::PgCalendarRepository;

pub use social_repository::{PgBlockUserRepository, PgContactRepository, PgFollowerRepository};
pub use engagement_repository::{PgBookmarkRepository, PgLikeRepository, PgLinkRepository, PgReviewRepository};
pub use notification_repository::PgNotificationRepository;
pub use soft_ask_repository::PgSoftAskRepository;
pub use poll_repository::PgPollRepository;
pub use business_repository::PgBusinessRepository;
