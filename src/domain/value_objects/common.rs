//! Enumerations shared by several feature slices.

use super::string_enum;

string_enum! {
    /// Who can see and join a chat space, stream, soft ask or poll.
    pub enum Visibility {
        Public = "PUBLIC",
        Private = "PRIVATE",
    }
}

impl Visibility {
    pub fn is_private(&self) -> bool {
        matches!(self, Visibility::Private)
    }
}

string_enum! {
    /// Kind of entity a polymorphic record (like, link, review, ...) hangs off.
    pub enum ParentType {
        ChatSpace = "CHAT_SPACE",
        Stream = "STREAM",
        SoftAsk = "SOFT_ASK",
        Business = "BUSINESS",
    }
}

string_enum! {
    /// Outcome of a request to join a private chat space or stream.
    pub enum RequestToJoinStatus {
        Pending = "PENDING",
        Approved = "APPROVED",
        Disapproved = "DISAPPROVED",
    }
}

impl RequestToJoinStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, RequestToJoinStatus::Pending)
    }

    pub fn is_approved(&self) -> bool {
        matches!(self, RequestToJoinStatus::Approved)
    }
}

string_enum! {
    /// Decision an organizer or admin can take on a pending join request.
    pub enum JoinDecision {
        Approved = "APPROVED",
        Disapproved = "DISAPPROVED",
    }
}

impl From<JoinDecision> for RequestToJoinStatus {
    fn from(decision: JoinDecision) -> Self {
        match decision {
            JoinDecision::Approved => RequestToJoinStatus::Approved,
            JoinDecision::Disapproved => RequestToJoinStatus::Disapproved,
        }
    }
}
