//! Poll Service
//!
//! Polls with fixed options, optionally attached to a chat space or stream.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, instrument};

use crate::application::dto::poll::{option_results, CreatePollRequest, PollDetailResponse, PollResponse, PollVoteRequest};
use crate::domain::{
    ChatSpaceRepository, ParentType, Poll, PollOption, PollRepository, PollVoter, StreamRepository, MAX_POLL_OPTIONS,
    MIN_POLL_OPTIONS,
};
use crate::shared::error::AppError;
use crate::shared::pagination::{SearchRequest, SearchResult};
use crate::shared::snowflake::SnowflakeGenerator;

#[async_trait]
pub trait PollService: Send + Sync {
    async fn create(&self, author_id: i64, request: CreatePollRequest) -> Result<PollDetailResponse, PollError>;

    async fn get(&self, viewer_id: i64, poll_id: i64) -> Result<PollDetailResponse, PollError>;

    async fn vote(&self, member_id: i64, poll_id: i64, request: PollVoteRequest)
        -> Result<PollDetailResponse, PollError>;

    async fn retract_vote(&self, member_id: i64, poll_id: i64) -> Result<PollDetailResponse, PollError>;

    async fn close(&self, member_id: i64, poll_id: i64) -> Result<(), PollError>;

    async fn delete(&self, member_id: i64, poll_id: i64) -> Result<(), PollError>;

    async fn find_by_parent(
        &self,
        parent_type: ParentType,
        parent_id: i64,
        request: &SearchRequest,
    ) -> Result<SearchResult<PollResponse>, PollError>;
}

#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error("Poll not found")]
    NotFound,

    #[error("Not the poll author")]
    NotAuthor,

    #[error("Poll has ended")]
    Ended,

    #[error("Poll options must be distinct and within the allowed count")]
    InvalidOptions,

    #[error("Expiry is in the past")]
    ExpiryInPast,

    #[error("Unknown option {0}")]
    UnknownOption(i64),

    #[error("Poll accepts a single option")]
    SingleChoice,

    #[error("Parent type and id must be given together")]
    IncompleteParent,

    #[error("Polls cannot be attached to {0}")]
    UnsupportedParent(ParentType),

    #[error("Parent not found")]
    ParentNotFound,

    #[error("Only chat space members can create polls in a chat space")]
    NotChatSpaceMember,

    #[error(transparent)]
    Repository(#[from] AppError),
}

impl From<PollError> for AppError {
    fn from(err: PollError) -> Self {
        use PollError::*;
        match err {
            NotFound => AppError::NotFound("poll.not.found".into()),
            NotAuthor => AppError::Forbidden("poll.not.author".into()),
            Ended => AppError::Conflict("poll.ended".into()),
            InvalidOptions => AppError::BadRequest("poll.options.invalid".into()),
            ExpiryInPast => AppError::BadRequest("poll.expiry.in.past".into()),
            UnknownOption(_) => AppError::BadRequest("poll.option.unknown".into()),
            SingleChoice => AppError::BadRequest("poll.single.choice".into()),
            IncompleteParent => AppError::BadRequest("poll.parent.incomplete".into()),
            UnsupportedParent(_) => AppError::BadRequest("poll.parent.type.unsupported".into()),
            ParentNotFound => AppError::NotFound("poll.parent.not.found".into()),
            NotChatSpaceMember => AppError::Forbidden("poll.not.chat.space.member".into()),
            Repository(e) => e,
        }
    }
}

/// Trim the option texts; rejects blanks, case-insensitive duplicates and
/// counts outside the allowed range.
fn normalize_options(options: Vec<String>) -> Result<Vec<String>, PollError> {
    let texts: Vec<String> = options.into_iter().map(|o| o.trim().to_string()).collect();
    if !(MIN_POLL_OPTIONS..=MAX_POLL_OPTIONS).contains(&texts.len()) || texts.iter().any(|t| t.is_empty()) {
        return Err(PollError::InvalidOptions);
    }
    let mut seen = HashSet::new();
    if !texts.iter().all(|t| seen.insert(t.to_lowercase())) {
        return Err(PollError::InvalidOptions);
    }
    Ok(texts)
}

pub struct PollServiceImpl {
    repo: Arc<dyn PollRepository>,
    chat_spaces: Arc<dyn ChatSpaceRepository>,
    streams: Arc<dyn StreamRepository>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl PollServiceImpl {
    pub fn new(
        repo: Arc<dyn PollRepository>,
        chat_spaces: Arc<dyn ChatSpaceRepository>,
        streams: Arc<dyn StreamRepository>,
        id_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            repo,
            chat_spaces,
            streams,
            id_generator,
        }
    }

    async fn find(&self, poll_id: i64) -> Result<Poll, PollError> {
        self.repo.find_by_id(poll_id).await?.ok_or(PollError::NotFound)
    }

    async fn find_as_author(&self, member_id: i64, poll_id: i64) -> Result<Poll, PollError> {
        let poll = self.find(poll_id).await?;
        if poll.author_id != member_id {
            return Err(PollError::NotAuthor);
        }
        Ok(poll)
    }

    async fn verify_parent(&self, author_id: i64, parent: Option<(ParentType, i64)>) -> Result<(), PollError> {
        match parent {
            None => Ok(()),
            Some((ParentType::ChatSpace, id)) => {
                self.chat_spaces.find_by_id(id).await?.ok_or(PollError::ParentNotFound)?;
                let is_member = self
                    .chat_spaces
                    .find_member(id, author_id)
                    .await?
                    .is_some_and(|m| m.is_active_member());
                if !is_member {
                    return Err(PollError::NotChatSpaceMember);
                }
                Ok(())
            }
            Some((ParentType::Stream, id)) => {
                self.streams.find_by_id(id).await?.ok_or(PollError::ParentNotFound)?;
                Ok(())
            }
            Some((other, _)) => Err(PollError::UnsupportedParent(other)),
        }
    }

    async fn detail(&self, viewer_id: i64, poll: Poll) -> Result<PollDetailResponse, PollError> {
        let options = self.repo.find_options(poll.id).await?;
        let my_votes = self.repo.find_member_votes(poll.id, viewer_id).await?;
        let voters = if poll.is_anonymous {
            None
        } else {
            Some(self.repo.find_voters(poll.id).await?)
        };

        Ok(PollDetailResponse {
            is_open: poll.is_open(Utc::now()),
            is_author: poll.author_id == viewer_id,
            options: option_results(options, voters.as_deref()),
            my_votes: my_votes.iter().map(|id| id.to_string()).collect(),
            poll: poll.into(),
        })
    }

    async fn find_open(&self, poll_id: i64) -> Result<Poll, PollError> {
        let poll = self.find(poll_id).await?;
        if !poll.is_open(Utc::now()) {
            return Err(PollError::Ended);
        }
        Ok(poll)
    }
}

#[async_trait]
impl PollService for PollServiceImpl {
    #[instrument(skip(self, request))]
    async fn create(&self, author_id: i64, request: CreatePollRequest) -> Result<PollDetailResponse, PollError> {
        let parent = match (request.parent_type, request.parent_id) {
            (Some(t), Some(id)) => Some((t, id)),
            (None, None) => None,
            _ => return Err(PollError::IncompleteParent),
        };
        let now = Utc::now();
        if request.expires_at <= now {
            return Err(PollError::ExpiryInPast);
        }
        let texts = normalize_options(request.options)?;
        self.verify_parent(author_id, parent).await?;

        let poll = Poll {
            id: self.id_generator.generate(),
            question: request.question.trim().to_string(),
            description: request
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            author_id,
            parent_type: parent.map(|(t, _)| t),
            parent_id: parent.map(|(_, id)| id),
            visibility: request.visibility,
            is_multiple_choice: request.is_multiple_choice,
            is_anonymous: request.is_anonymous,
            expires_at: request.expires_at,
            is_ended: false,
            total_votes: 0,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        };
        let options: Vec<PollOption> = texts
            .into_iter()
            .enumerate()
            .map(|(position, text)| PollOption {
                id: self.id_generator.generate(),
                poll_id: poll.id,
                text,
                vote_count: 0,
                position: position as i32,
            })
            .collect();

        let created = self.repo.create(&poll, &options).await?;
        info!(poll_id = created.id, author_id, options = options.len(), "Poll created");

        let no_voters: Vec<PollVoter> = Vec::new();
        Ok(PollDetailResponse {
            is_open: true,
            is_author: true,
            options: option_results(options, (!created.is_anonymous).then_some(no_voters.as_slice())),
            my_votes: Vec::new(),
            poll: created.into(),
        })
    }

    async fn get(&self, viewer_id: i64, poll_id: i64) -> Result<PollDetailResponse, PollError> {
        let poll = self.find(poll_id).await?;
        self.detail(viewer_id, poll).await
    }

    #[instrument(skip(self, request))]
    async fn vote(
        &self,
        member_id: i64,
        poll_id: i64,
        request: PollVoteRequest,
    ) -> Result<PollDetailResponse, PollError> {
        let poll = self.find_open(poll_id).await?;

        let mut option_ids = request.option_ids;
        option_ids.sort_unstable();
        option_ids.dedup();
        if option_ids.is_empty() {
            return Err(PollError::InvalidOptions);
        }
        if !poll.is_multiple_choice && option_ids.len() > 1 {
            return Err(PollError::SingleChoice);
        }

        let known: HashSet<i64> = self.repo.find_options(poll_id).await?.iter().map(|o| o.id).collect();
        if let Some(unknown) = option_ids.iter().find(|id| !known.contains(id)) {
            return Err(PollError::UnknownOption(*unknown));
        }

        self.repo.replace_votes(poll_id, member_id, &option_ids).await?;
        info!(poll_id, member_id, options = ?option_ids, "Poll vote recorded");

        let poll = self.find(poll.id).await?;
        self.detail(member_id, poll).await
    }

    #[instrument(skip(self))]
    async fn retract_vote(&self, member_id: i64, poll_id: i64) -> Result<PollDetailResponse, PollError> {
        let poll = self.find_open(poll_id).await?;

        if !self.repo.find_member_votes(poll_id, member_id).await?.is_empty() {
            self.repo.replace_votes(poll_id, member_id, &[]).await?;
            info!(poll_id, member_id, "Poll vote retracted");
        }

        let poll = self.find(poll.id).await?;
        self.detail(member_id, poll).await
    }

    #[instrument(skip(self))]
    async fn close(&self, member_id: i64, poll_id: i64) -> Result<(), PollError> {
        let poll = self.find_as_author(member_id, poll_id).await?;
        if poll.is_ended {
            return Ok(());
        }
        self.repo.close(poll_id).await?;
        info!(poll_id, member_id, "Poll closed");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, member_id: i64, poll_id: i64) -> Result<(), PollError> {
        self.find_as_author(member_id, poll_id).await?;
        self.repo.soft_delete(poll_id).await?;
        info!(poll_id, member_id, "Poll deleted");
        Ok(())
    }

    async fn find_by_parent(
        &self,
        parent_type: ParentType,
        parent_id: i64,
        request: &SearchRequest,
    ) -> Result<SearchResult<PollResponse>, PollError> {
        let (polls, total) = self.repo.find_by_parent(parent_type, parent_id, request).await?;
        Ok(SearchResult::new(polls, total, request).map(PollResponse::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::fixtures;
    use crate::domain::{MockChatSpaceRepository, MockPollRepository, MockStreamRepository, Visibility};
    use chrono::Duration;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    struct Mocks {
        repo: MockPollRepository,
        chat_spaces: MockChatSpaceRepository,
        streams: MockStreamRepository,
    }

    impl Mocks {
        fn new() -> Self {
            Self {
                repo: MockPollRepository::new(),
                chat_spaces: MockChatSpaceRepository::new(),
                streams: MockStreamRepository::new(),
            }
        }

        fn build(self) -> PollServiceImpl {
            PollServiceImpl::new(
                Arc::new(self.repo),
                Arc::new(self.chat_spaces),
                Arc::new(self.streams),
                Arc::new(SnowflakeGenerator::new(1, 1)),
            )
        }

        fn with_poll(mut self, poll: Poll) -> Self {
            self.repo.expect_find_by_id().returning(move |_| Ok(Some(poll.clone())));
            self.repo
                .expect_find_options()
                .returning(|id| Ok(fixtures::poll_options(id, &["Saturday", "Sunday", "Monday"])));
            self
        }
    }

    fn create_request(options: &[&str]) -> CreatePollRequest {
        CreatePollRequest {
            question: "Next meetup day?".into(),
            description: None,
            parent_type: None,
            parent_id: None,
            visibility: Visibility::Public,
            is_multiple_choice: false,
            is_anonymous: false,
            expires_at: Utc::now() + Duration::days(1),
            options: options.iter().map(|o| o.to_string()).collect(),
        }
    }

    #[test_case(&["Tea"] ; "too few")]
    #[test_case(&["Tea", "  "] ; "blank option")]
    #[test_case(&["Tea", "tea "] ; "duplicate ignoring case")]
    fn test_invalid_options(options: &[&str]) {
        let result = normalize_options(options.iter().map(|o| o.to_string()).collect());
        assert!(matches!(result, Err(PollError::InvalidOptions)));
    }

    #[test]
    fn test_options_are_trimmed() {
        let texts = normalize_options(vec![" Tea ".into(), "Coffee".into()]).unwrap();
        assert_eq!(texts, vec!["Tea".to_string(), "Coffee".to_string()]);
    }

    #[tokio::test]
    async fn test_create_stores_options_in_order() {
        let mut mocks = Mocks::new();
        mocks
            .repo
            .expect_create()
            .withf(|_, options| {
                options.len() == 2 && options[0].text == "Saturday" && options[1].position == 1
            })
            .times(1)
            .returning(|poll, _| Ok(poll.clone()));

        let created = mocks.build().create(1, create_request(&["Saturday", "Sunday"])).await.unwrap();
        assert!(created.is_author);
        assert_eq!(created.options.len(), 2);
        assert_eq!(created.options[0].percentage, 0.0);
    }

    #[tokio::test]
    async fn test_create_rejects_past_expiry() {
        let mut request = create_request(&["Saturday", "Sunday"]);
        request.expires_at = Utc::now() - Duration::minutes(5);

        let err = Mocks::new().build().create(1, request).await.unwrap_err();
        assert_eq!(AppError::from(err).message_key(), "poll.expiry.in.past");
    }

    #[tokio::test]
    async fn test_vote_on_ended_poll_conflicts() {
        let poll = Poll {
            is_ended: true,
            ..fixtures::poll(5, 1)
        };
        let mocks = Mocks::new().with_poll(poll);

        let err = mocks
            .build()
            .vote(2, 5, PollVoteRequest { option_ids: vec![51] })
            .await
            .unwrap_err();
        assert!(matches!(err, PollError::Ended));
    }

    #[tokio::test]
    async fn test_single_choice_rejects_two_options() {
        let mocks = Mocks::new().with_poll(fixtures::poll(5, 1));

        let err = mocks
            .build()
            .vote(2, 5, PollVoteRequest { option_ids: vec![51, 52] })
            .await
            .unwrap_err();
        assert!(matches!(err, PollError::SingleChoice));
    }

    #[tokio::test]
    async fn test_unknown_option_rejected() {
        let mocks = Mocks::new().with_poll(fixtures::poll(5, 1));

        let err = mocks
            .build()
            .vote(2, 5, PollVoteRequest { option_ids: vec![99] })
            .await
            .unwrap_err();
        assert!(matches!(err, PollError::UnknownOption(99)));
    }

    #[tokio::test]
    async fn test_vote_replaces_previous_choice() {
        let mut mocks = Mocks::new().with_poll(Poll {
            is_multiple_choice: true,
            ..fixtures::poll(5, 1)
        });
        mocks
            .repo
            .expect_replace_votes()
            .withf(|poll_id, member_id, ids| *poll_id == 5 && *member_id == 2 && ids.to_vec() == vec![51, 53])
            .times(1)
            .returning(|_, _, _| Ok(()));
        mocks.repo.expect_find_member_votes().returning(|_, _| Ok(vec![51, 53]));
        mocks.repo.expect_find_voters().returning(|_| {
            Ok(vec![PollVoter {
                option_id: 51,
                member_id: 2,
                full_name: "Femi Ade".into(),
            }])
        });

        let detail = mocks
            .build()
            .vote(2, 5, PollVoteRequest { option_ids: vec![53, 51, 51] })
            .await
            .unwrap();
        assert_eq!(detail.my_votes, vec!["51".to_string(), "53".to_string()]);
        assert_eq!(detail.options[0].voters.as_ref().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn test_anonymous_poll_hides_voters() {
        let mut mocks = Mocks::new().with_poll(Poll {
            is_anonymous: true,
            ..fixtures::poll(5, 1)
        });
        mocks.repo.expect_find_member_votes().returning(|_, _| Ok(vec![]));
        mocks.repo.expect_find_voters().never();

        let detail = mocks.build().get(2, 5).await.unwrap();
        assert!(detail.options.iter().all(|o| o.voters.is_none()));
    }

    #[tokio::test]
    async fn test_retract_without_vote_skips_write() {
        let mut mocks = Mocks::new().with_poll(fixtures::poll(5, 1));
        mocks.repo.expect_find_member_votes().returning(|_, _| Ok(vec![]));
        mocks.repo.expect_find_voters().returning(|_| Ok(vec![]));
        mocks.repo.expect_replace_votes().never();

        let detail = mocks.build().retract_vote(2, 5).await.unwrap();
        assert!(detail.my_votes.is_empty());
    }

    #[tokio::test]
    async fn test_only_author_closes() {
        let mocks = Mocks::new().with_poll(fixtures::poll(5, 1));

        let err = mocks.build().close(2, 5).await.unwrap_err();
        assert!(matches!(err, PollError::NotAuthor));
    }
}
