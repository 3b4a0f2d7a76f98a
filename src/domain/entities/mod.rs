//! # Domain Entities
//!
//! Core domain entities of the FleenFeen platform. All entities map directly
//! to their corresponding database tables.
//!
//! ## Core Entities
//!
//! - **Member**: Account with credentials, profile and roles
//! - **ChatSpace**: A discussion space and its memberships
//! - **Stream**: An event or live broadcast and its attendees
//! - **SoftAsk**: A community question with answers, replies and votes
//! - **Poll**: A question with options and votes
//! - **Business**: A member-owned business profile
//!
//! ## Supporting Entities
//!
//! - **Session**: Refresh token sessions
//! - **Country**, **Calendar**: Country reference data and country calendars
//! - **Oauth2Authorization**: Stored Google tokens
//! - **Contact**, **Follower**, **BlockUser**: Member relationships
//! - **Like**, **Bookmark**, **Link**, **Review**: Records attached to a parent
//! - **Notification**: In-app notifications
//!
//! ## Repository Traits
//!
//! Each aggregate has an associated repository trait defining data access
//! operations, implemented in the infrastructure layer.

mod business;
mod calendar;
mod chat_space;
mod country;
mod engagement;
mod member;
mod notification;
mod oauth2_authorization;
mod poll;
mod session;
mod social;
mod soft_ask;
mod stream;

pub use business::{Business, BusinessChannel, BusinessRepository, BusinessStatus};
pub use calendar::{Calendar, CalendarRepository};
pub use chat_space::{ChatSpace, ChatSpaceMember, ChatSpaceMemberView, ChatSpaceRepository, ChatSpaceRole, ChatSpaceStatus};
pub use country::{Country, CountryRepository};
pub use engagement::{
    Bookmark, BookmarkRepository, Like, LikeRepository, LikeType, Link, LinkRepository, LinkType, Review,
    ReviewRepository, ReviewView, MAX_RATING, MIN_RATING,
};
pub use member::{Gender, Member, MemberRepository, ProfileStatus, Role, VerificationStatus};
pub use notification::{Notification, NotificationRepository, NotificationType};
pub use oauth2_authorization::{Oauth2Authorization, Oauth2AuthorizationRepository, Oauth2ServiceType};
pub use poll::{Poll, PollOption, PollRepository, PollVote, PollVoter, MAX_POLL_OPTIONS, MIN_POLL_OPTIONS};
pub use session::{Session, SessionRepository};
pub use social::{
    BlockStatus, BlockUser, BlockUserRepository, Contact, ContactRepository, ContactType, Follower,
    FollowerRepository, MemberSummary,
};
pub use soft_ask::{SoftAsk, SoftAskAnswer, SoftAskReply, SoftAskRepository, SoftAskVote, SoftAskVoteParent, SoftAskVoteType};
pub use stream::{
    Stream, StreamAttendee, StreamAttendeeView, StreamRepository, StreamSource, StreamStatus, StreamTimeFilter,
    StreamType,
};

#[cfg(test)]
pub use business::MockBusinessRepository;
#[cfg(test)]
pub use calendar::MockCalendarRepository;
#[cfg(test)]
pub use chat_space::MockChatSpaceRepository;
#[cfg(test)]
pub use country::MockCountryRepository;
#[cfg(test)]
pub use engagement::{MockBookmarkRepository, MockLikeRepository, MockLinkRepository, MockReviewRepository};
#[cfg(test)]
pub use member::MockMemberRepository;
#[cfg(test)]
pub use notification::MockNotificationRepository;
#[cfg(test)]
pub use oauth2_authorization::MockOauth2AuthorizationRepository;
#[cfg(test)]
pub use poll::MockPollRepository;
#[cfg(test)]
pub use session::MockSessionRepository;
#[cfg(test)]
pub use social::{MockBlockUserRepository, MockContactRepository, MockFollowerRepository};
#[cfg(test)]
pub use soft_ask::MockSoftAskRepository;
#[cfg(test)]
pub use stream::MockStreamRepository;
