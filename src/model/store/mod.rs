//! The single shared mutable resource in the process: the current poll and
//! its answers, behind one short-held lock.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::model::api::{AnswerRequest, CreatePollRequest, PollData};
use crate::model::common::{can_create, vet_answer, Answer, Poll};

/// Owner of the current poll and its answers. All mutation goes through
/// [`PollStore::create`] and [`PollStore::submit`]; both hold the write lock
/// for the whole check-then-act sequence, so two near-simultaneous
/// submissions from one participant cannot both land, and a create cannot
/// interleave with a submission against the poll it replaces. Readers take
/// the read lock and clone, so they see either the pre- or post-mutation
/// state, never a torn one.
#[derive(Debug, Default)]
pub struct PollStore {
    state: RwLock<PollData>,
    next_id: AtomicU32,
}

impl PollStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new poll, replacing the previous one and discarding its
    /// answers entirely.
    pub fn create(&self, request: CreatePollRequest, now: DateTime<Utc>) -> Result<Poll> {
        let question = request.question.trim().to_string();
        if question.is_empty() {
            return Err(Error::Validation("question must not be empty".to_string()));
        }

        // The same cleanup the observed clients apply before sending: trim
        // entries, drop empties and repeats.
        let mut options: Vec<String> = Vec::new();
        for option in &request.options {
            let option = option.trim();
            if !option.is_empty() && !options.iter().any(|o| o == option) {
                options.push(option.to_string());
            }
        }
        if options.len() < 2 {
            return Err(Error::Validation(
                "a poll needs at least 2 distinct non-empty options".to_string(),
            ));
        }

        if request.time_limit_seconds <= 0 {
            return Err(Error::Validation(
                "time limit must be a positive number of seconds".to_string(),
            ));
        }
        let time_limit_seconds = u32::try_from(request.time_limit_seconds)
            .map_err(|_| Error::Validation("time limit is too large".to_string()))?;

        let mut state = self.state.write().expect("poll store lock poisoned");
        if !can_create(state.poll.as_ref(), now) {
            return Err(Error::Conflict(
                "the current poll has not finished yet".to_string(),
            ));
        }

        let poll = Poll {
            id: self.next_id.fetch_add(1, Ordering::Relaxed) + 1,
            question,
            options,
            time_limit_seconds,
            created_at: now,
            active: true,
        };
        *state = PollData {
            poll: Some(poll.clone()),
            answers: Vec::new(),
        };
        Ok(poll)
    }

    /// A consistent point-in-time snapshot of the current poll and its
    /// answers.
    pub fn current(&self) -> PollData {
        self.state.read().expect("poll store lock poisoned").clone()
    }

    /// Record one participant's answer to the current poll.
    pub fn submit(&self, request: AnswerRequest, now: DateTime<Utc>) -> Result<Answer> {
        let candidate = Answer {
            option: request.option,
            participant: request.participant,
        };

        let mut state = self.state.write().expect("poll store lock poisoned");
        let answer = vet_answer(state.poll.as_ref(), &state.answers, candidate, now)?;
        state.answers.push(answer.clone());
        Ok(answer)
    }
}

#[cfg(test)]
impl PollStore {
    /// Build a store already holding the given state, for tests that need
    /// an expired or inactive poll without waiting out a real window.
    pub fn with_state(data: PollData) -> Self {
        let next_id = data.poll.as_ref().map(|p| p.id).unwrap_or(0);
        Self {
            state: RwLock::new(data),
            next_id: AtomicU32::new(next_id),
        }
    }
}
