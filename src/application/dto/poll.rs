//! Poll DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::{EnumInfo, ParentType, Poll, PollOption, PollVoter, Visibility};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePollRequest {
    #[validate(length(min = 1, max = 500, message = "poll.question.length"))]
    pub question: String,

    #[validate(length(max = 3000, message = "poll.description.too.long"))]
    pub description: Option<String>,

    pub parent_type: Option<ParentType>,

    #[serde(default, with = "super::id_format::option")]
    pub parent_id: Option<i64>,

    pub visibility: Visibility,

    #[serde(default)]
    pub is_multiple_choice: bool,

    #[serde(default)]
    pub is_anonymous: bool,

    pub expires_at: DateTime<Utc>,

    #[validate(length(min = 2, max = 10, message = "poll.options.count"))]
    pub options: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PollVoteRequest {
    #[validate(length(min = 1, message = "poll.option.required"))]
    #[serde(with = "super::id_format::list")]
    pub option_ids: Vec<i64>,
}

/// `?parent_type=STREAM&parent_id=...` on poll lists.
#[derive(Debug, Clone, Deserialize)]
pub struct PollParentQuery {
    pub parent_type: ParentType,
    #[serde(with = "super::id_format")]
    pub parent_id: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PollResponse {
    pub id: String,
    pub question: String,
    pub description: Option<String>,
    pub author_id: String,
    pub parent_type: Option<EnumInfo>,
    pub parent_id: Option<String>,
    pub visibility: EnumInfo,
    pub is_multiple_choice: bool,
    pub is_anonymous: bool,
    pub expires_at: DateTime<Utc>,
    pub is_ended: bool,
    pub total_votes: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Poll> for PollResponse {
    fn from(poll: Poll) -> Self {
        Self {
            id: poll.id.to_string(),
            question: poll.question,
            description: poll.description,
            author_id: poll.author_id.to_string(),
            parent_type: poll.parent_type.map(|t| t.info()),
            parent_id: poll.parent_id.map(|id| id.to_string()),
            visibility: poll.visibility.info(),
            is_multiple_choice: poll.is_multiple_choice,
            is_anonymous: poll.is_anonymous,
            expires_at: poll.expires_at,
            is_ended: poll.is_ended,
            total_votes: poll.total_votes,
            created_at: poll.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PollVoterResponse {
    pub member_id: String,
    pub full_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PollOptionResult {
    pub id: String,
    pub text: String,
    pub vote_count: i64,
    /// Share of all option votes, one decimal place
    pub percentage: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voters: Option<Vec<PollVoterResponse>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PollDetailResponse {
    #[serde(flatten)]
    pub poll: PollResponse,
    pub is_open: bool,
    pub is_author: bool,
    pub options: Vec<PollOptionResult>,
    /// Options the viewer voted for
    pub my_votes: Vec<String>,
}

fn percentage(count: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    (count as f64 * 1000.0 / total as f64).round() / 10.0
}

/// Per-option results; `voters` is `None` for anonymous polls.
pub fn option_results(mut options: Vec<PollOption>, voters: Option<&[PollVoter]>) -> Vec<PollOptionResult> {
    options.sort_by_key(|o| o.position);
    let total: i64 = options.iter().map(|o| o.vote_count).sum();

    options
        .into_iter()
        .map(|option| PollOptionResult {
            id: option.id.to_string(),
            percentage: percentage(option.vote_count, total),
            vote_count: option.vote_count,
            voters: voters.map(|all| {
                all.iter()
                    .filter(|v| v.option_id == option.id)
                    .map(|v| PollVoterResponse {
                        member_id: v.member_id.to_string(),
                        full_name: v.full_name.clone(),
                    })
                    .collect()
            }),
            text: option.text,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn option(id: i64, position: i32, vote_count: i64) -> PollOption {
        PollOption {
            id,
            poll_id: 1,
            text: format!("Option {id}"),
            vote_count,
            position,
        }
    }

    #[test_case(0, 0 => 0.0 ; "no votes")]
    #[test_case(1, 3 => 33.3 ; "one third")]
    #[test_case(2, 3 => 66.7 ; "two thirds")]
    #[test_case(4, 4 => 100.0 ; "all votes")]
    fn test_percentage(count: i64, total: i64) -> f64 {
        percentage(count, total)
    }

    #[test]
    fn test_results_ordered_by_position_with_voters() {
        let options = vec![option(12, 1, 1), option(11, 0, 3)];
        let voters = vec![PollVoter {
            option_id: 12,
            member_id: 7,
            full_name: "Ada Obi".into(),
        }];

        let results = option_results(options, Some(&voters));
        assert_eq!(results[0].id, "11");
        assert_eq!(results[0].percentage, 75.0);
        assert_eq!(results[0].voters, Some(vec![]));
        assert_eq!(
            results[1].voters,
            Some(vec![PollVoterResponse {
                member_id: "7".into(),
                full_name: "Ada Obi".into(),
            }])
        );
    }

    #[test]
    fn test_anonymous_results_hide_voters() {
        let results = option_results(vec![option(11, 0, 2)], None);
        assert_eq!(results[0].voters, None);
    }

    #[test]
    fn test_create_rejects_single_option() {
        let request: CreatePollRequest = serde_json::from_value(serde_json::json!({
            "question": "Tea or coffee?",
            "visibility": "PUBLIC",
            "expires_at": "2030-01-01T00:00:00Z",
            "options": ["Tea"]
        }))
        .unwrap();
        assert!(request.validate().is_err());
    }
}
