//! Application Services
//!
//! Business logic services that coordinate domain operations.
//!
//! ## Available Services
//!
//! - **AuthService**: Sign-up, sign-in, JWT tokens and refresh-token sessions
//! - **MemberService**: Profiles, photos and member search
//! - **ChatSpaceService**: Chat spaces, membership and join requests
//! - **StreamService**: Events and live streams with their attendees
//! - **CalendarService**: Per-country Google calendars (administrators)
//! - **Oauth2Service**: Google account authorization for the platform
//! - **SoftAskService** / **PollService**: Community questions and polls
//! - **BusinessService**: Member-owned business profiles
//! - Social graph: contact, follower, block user
//! - Engagement: like, bookmark, link, review
//! - **NotificationService**: In-app notifications

pub mod auth_service;
pub mod block_user_service;
pub mod bookmark_service;
pub mod business_service;
pub mod calendar_service;
pub mod chat_space_service;
pub mod contact_service;
pub mod country_service;
pub mod follower_service;
pub mod like_service;
pub mod link_service;
pub mod member_service;
pub mod notification_service;
pub mod oauth2_service;
pub mod poll_service;
pub mod review_service;
pub mod soft_ask_service;
pub mod stream_service;

#[cfg(test)]
pub mod fixtures;

use tracing::warn;

use crate::shared::error::AppError;

pub use auth_service::{AuthError, AuthService, AuthServiceImpl, AuthTokens, Claims, SessionClient};
pub use block_user_service::{BlockUserError, BlockUserService, BlockUserServiceImpl};
pub use bookmark_service::{BookmarkError, BookmarkService, BookmarkServiceImpl};
pub use business_service::{BusinessError, BusinessService, BusinessServiceImpl};
pub use calendar_service::{CalendarError, CalendarService, CalendarServiceImpl};
pub use chat_space_service::{ChatSpaceError, ChatSpaceService, ChatSpaceServiceImpl};
pub use contact_service::{ContactError, ContactService, ContactServiceImpl};
pub use country_service::{CountryService, CountryServiceImpl};
pub use follower_service::{FollowerError, FollowerService, FollowerServiceImpl};
pub use like_service::{LikeError, LikeService, LikeServiceImpl};
pub use link_service::{LinkError, LinkService, LinkServiceImpl};
pub use member_service::{MemberError, MemberService, MemberServiceImpl};
pub use notification_service::{NewNotification, NotificationError, NotificationService, NotificationServiceImpl, Notifier};
pub use oauth2_service::{Oauth2Error, Oauth2Service, Oauth2ServiceImpl, Oauth2TokenProvider};
pub use poll_service::{PollError, PollService, PollServiceImpl};
pub use review_service::{ReviewError, ReviewService, ReviewServiceImpl};
pub use soft_ask_service::{SoftAskError, SoftAskService, SoftAskServiceImpl};
pub use stream_service::{StreamError, StreamGateways, StreamService, StreamServiceImpl};

/// Outcome of a best-effort call to a Google mirror. Failures are logged
/// and turned into `None`; the local operation carries on.
pub(crate) fn log_remote_failure<T>(result: Result<T, AppError>, action: &str, id: i64) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(action, id, error = %e, "Remote sync failed");
            None
        }
    }
}
