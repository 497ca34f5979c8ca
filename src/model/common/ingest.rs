use chrono::{DateTime, Utc};

use crate::error::{Error, Result};

use super::poll::{Answer, Poll};

/// Vet a candidate answer against the current poll state, returning the
/// cleaned-up answer to commit.
///
/// The caller must hold the store's write lock across this check and the
/// append, so the duplicate check can never race a concurrent submission
/// from the same participant.
pub fn vet_answer(
    poll: Option<&Poll>,
    answers: &[Answer],
    candidate: Answer,
    now: DateTime<Utc>,
) -> Result<Answer> {
    let poll = poll.ok_or_else(|| Error::NotFound("no poll is currently running".to_string()))?;

    if poll.is_expired(now) {
        return Err(Error::Expired);
    }

    let participant = candidate.participant.trim();
    if participant.is_empty() {
        return Err(Error::Validation(
            "participant name must not be empty".to_string(),
        ));
    }

    if !poll.options.iter().any(|o| o == &candidate.option) {
        return Err(Error::Validation(format!(
            "'{}' is not an option of the current poll",
            candidate.option
        )));
    }

    if answers.iter().any(|a| a.participant == participant) {
        return Err(Error::Duplicate(format!(
            "'{participant}' has already answered this poll"
        )));
    }

    Ok(Answer {
        option: candidate.option,
        participant: participant.to_string(),
    })
}
