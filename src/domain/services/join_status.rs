//! Chat space join status resolution.
//!
//! Maps what is known about a viewer's membership record to the action or
//! state the client should present. This is a pure lookup with no I/O.

use crate::domain::value_objects::{string_enum, RequestToJoinStatus, Visibility};

string_enum! {
    /// Membership state of a viewer relative to a chat space.
    pub enum JoinStatus {
        /// Not a member; the space is public and can be joined directly
        JoinChatSpace = "JOIN_CHAT_SPACE",
        /// Not a member; the space is private and needs an approved request
        RequestToJoin = "REQUEST_TO_JOIN",
        Pending = "PENDING",
        Disapproved = "DISAPPROVED",
        Joined = "JOINED",
        Removed = "REMOVED",
    }
}

/// What is known about the viewer's membership row, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MembershipSnapshot {
    pub request_status: RequestToJoinStatus,
    pub left: bool,
    pub removed: bool,
}

/// Resolve the join status of a viewer.
///
/// A removed member stays removed whatever the request status; a member who
/// left is treated as a stranger again.
pub fn resolve_join_status(
    membership: Option<MembershipSnapshot>,
    visibility: Visibility,
) -> JoinStatus {
    let not_member = match visibility {
        Visibility::Public => JoinStatus::JoinChatSpace,
        Visibility::Private => JoinStatus::RequestToJoin,
    };

    let Some(m) = membership else {
        return not_member;
    };

    if m.removed {
        return JoinStatus::Removed;
    }

    match m.request_status {
        RequestToJoinStatus::Pending => JoinStatus::Pending,
        RequestToJoinStatus::Disapproved => JoinStatus::Disapproved,
        RequestToJoinStatus::Approved if m.left => not_member,
        RequestToJoinStatus::Approved => JoinStatus::Joined,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn snapshot(status: RequestToJoinStatus, left: bool, removed: bool) -> Option<MembershipSnapshot> {
        Some(MembershipSnapshot {
            request_status: status,
            left,
            removed,
        })
    }

    #[test_case(None, Visibility::Public, JoinStatus::JoinChatSpace ; "stranger public")]
    #[test_case(None, Visibility::Private, JoinStatus::RequestToJoin ; "stranger private")]
    #[test_case(snapshot(RequestToJoinStatus::Pending, false, false), Visibility::Private, JoinStatus::Pending ; "pending")]
    #[test_case(snapshot(RequestToJoinStatus::Pending, false, false), Visibility::Public, JoinStatus::Pending ; "pending public")]
    #[test_case(snapshot(RequestToJoinStatus::Disapproved, false, false), Visibility::Private, JoinStatus::Disapproved ; "disapproved")]
    #[test_case(snapshot(RequestToJoinStatus::Approved, false, false), Visibility::Public, JoinStatus::Joined ; "joined public")]
    #[test_case(snapshot(RequestToJoinStatus::Approved, false, false), Visibility::Private, JoinStatus::Joined ; "joined private")]
    #[test_case(snapshot(RequestToJoinStatus::Approved, true, false), Visibility::Public, JoinStatus::JoinChatSpace ; "left public")]
    #[test_case(snapshot(RequestToJoinStatus::Approved, true, false), Visibility::Private, JoinStatus::RequestToJoin ; "left private")]
    #[test_case(snapshot(RequestToJoinStatus::Approved, false, true), Visibility::Public, JoinStatus::Removed ; "removed")]
    #[test_case(snapshot(RequestToJoinStatus::Pending, true, true), Visibility::Private, JoinStatus::Removed ; "removed wins")]
    fn test_resolve_join_status(
        membership: Option<MembershipSnapshot>,
        visibility: Visibility,
        expected: JoinStatus,
    ) {
        assert_eq!(resolve_join_status(membership, visibility), expected);
    }
}
