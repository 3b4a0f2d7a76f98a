//! Entity builders shared by service tests.

use chrono::{Duration, Utc};

use crate::domain::{
    Business, BusinessChannel, BusinessStatus, ChatSpace, ChatSpaceMember, ChatSpaceRole, ChatSpaceStatus, Poll,
    PollOption, RequestToJoinStatus, SoftAsk, Stream, StreamSource, StreamStatus, StreamType, Visibility,
};

pub fn chat_space(id: i64, organizer_id: i64) -> ChatSpace {
    let now = Utc::now();
    ChatSpace {
        id,
        title: "Rustaceans".into(),
        description: "Weekly meetup".into(),
        tags: None,
        guidelines_or_rules: None,
        visibility: Visibility::Public,
        status: ChatSpaceStatus::Active,
        organizer_id,
        external_id_or_name: None,
        space_link: None,
        total_members: 1,
        total_request_to_join: 0,
        total_likes: 0,
        is_deleted: false,
        created_at: now,
        updated_at: now,
    }
}

pub fn membership(chat_space_id: i64, member_id: i64, status: RequestToJoinStatus) -> ChatSpaceMember {
    ChatSpaceMember::new(member_id * 100, chat_space_id, member_id, status)
}

pub fn admin(chat_space_id: i64, member_id: i64) -> ChatSpaceMember {
    let mut m = membership(chat_space_id, member_id, RequestToJoinStatus::Approved);
    m.role = ChatSpaceRole::Admin;
    m
}

/// An active public event starting in a day.
pub fn stream(id: i64, organizer_id: i64) -> Stream {
    let now = Utc::now();
    Stream {
        id,
        title: "Launch party".into(),
        description: "Product launch".into(),
        tags: None,
        location: "Lagos".into(),
        timezone: "Africa/Lagos".into(),
        scheduled_start_date: now + Duration::days(1),
        scheduled_end_date: now + Duration::days(1) + Duration::hours(2),
        stream_type: StreamType::Event,
        stream_source: StreamSource::GoogleMeet,
        visibility: Visibility::Public,
        stream_status: StreamStatus::Active,
        organizer_id,
        organizer_alias: None,
        organizer_email: Some("organizer@fleenfeen.test".into()),
        organizer_phone: None,
        chat_space_id: None,
        external_id: None,
        stream_link: None,
        made_for_kids: false,
        total_attendees: 1,
        total_likes: 0,
        is_deleted: false,
        created_at: now,
        updated_at: now,
    }
}

/// A stream that finished an hour ago.
pub fn ended_stream(id: i64, organizer_id: i64) -> Stream {
    let now = Utc::now();
    Stream {
        scheduled_start_date: now - Duration::hours(3),
        scheduled_end_date: now - Duration::hours(1),
        ..stream(id, organizer_id)
    }
}

pub fn soft_ask(id: i64, author_id: i64) -> SoftAsk {
    let now = Utc::now();
    SoftAsk {
        id,
        title: "Best venue in Accra?".into(),
        description: "Looking for a 50 seat room".into(),
        tags: None,
        author_id,
        parent_type: None,
        parent_id: None,
        visibility: Visibility::Public,
        is_closed: false,
        deadline: None,
        total_answers: 0,
        total_votes: 0,
        is_deleted: false,
        created_at: now,
        updated_at: now,
    }
}

pub fn poll(id: i64, author_id: i64) -> Poll {
    let now = Utc::now();
    Poll {
        id,
        question: "Next meetup day?".into(),
        description: None,
        author_id,
        parent_type: None,
        parent_id: None,
        visibility: Visibility::Public,
        is_multiple_choice: false,
        is_anonymous: false,
        expires_at: now + Duration::days(2),
        is_ended: false,
        total_votes: 0,
        is_deleted: false,
        created_at: now,
        updated_at: now,
    }
}

pub fn poll_options(poll_id: i64, texts: &[&str]) -> Vec<PollOption> {
    texts
        .iter()
        .enumerate()
        .map(|(i, text)| PollOption {
            id: poll_id * 10 + i as i64 + 1,
            poll_id,
            text: text.to_string(),
            vote_count: 0,
            position: i as i32,
        })
        .collect()
}

pub fn business(id: i64, owner_id: i64) -> Business {
    let now = Utc::now();
    Business {
        id,
        owner_id,
        title: "Mama Put Bakery".into(),
        motto: Some("Fresh every morning".into()),
        description: "Bread and pastries".into(),
        channel: BusinessChannel::Physical,
        business_type: "FOOD".into(),
        country: "NG".into(),
        address: None,
        founding_year: Some(2019),
        registration_number: None,
        status: BusinessStatus::Active,
        is_deleted: false,
        created_at: now,
        updated_at: now,
    }
}
