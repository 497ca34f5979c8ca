use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Our poll IDs are integers, minted sequentially by the store.
pub type PollId = u32;

/// The single live poll: one question, its options, and a time-boxed voting
/// window opening at `created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Poll {
    /// Poll unique ID.
    pub id: PollId,
    /// Question text.
    pub question: String,
    /// Possible answers, in presentation order. Distinct and non-empty.
    pub options: Vec<String>,
    /// Length of the voting window in seconds.
    pub time_limit_seconds: u32,
    /// When the window opened.
    pub created_at: DateTime<Utc>,
    /// Moderator-side flag, set at creation. Expiry of the voting window is
    /// derived from the clock and never written back to this field.
    pub active: bool,
}

impl Poll {
    /// Seconds left in the voting window at `now`, rounded up so a partially
    /// elapsed second still counts. Zero exactly when the window has closed;
    /// never negative.
    pub fn time_remaining(&self, now: DateTime<Utc>) -> u64 {
        let deadline = self.created_at + Duration::seconds(i64::from(self.time_limit_seconds));
        let left_ms = deadline.signed_duration_since(now).num_milliseconds();
        if left_ms <= 0 {
            0
        } else {
            (left_ms as u64 + 999) / 1000
        }
    }

    /// True once the voting window has closed.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.time_remaining(now) == 0
    }
}

/// One participant's recorded choice for the current poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    /// The chosen option; always one of the owning poll's options.
    pub option: String,
    /// Display name the voter supplied. Unique within the current poll's
    /// answer set only; not a durable identity.
    pub participant: String,
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_remaining_decreases_monotonically() {
        let poll = Poll::example();
        let samples = (0..=70).map(|s| poll.created_at + Duration::seconds(s));
        let remaining: Vec<u64> = samples.map(|t| poll.time_remaining(t)).collect();
        for pair in remaining.windows(2) {
            assert!(pair[0] >= pair[1]);
        }
    }

    #[test]
    fn time_remaining_is_zero_from_the_deadline_onwards() {
        let poll = Poll::example();
        let deadline = poll.created_at + Duration::seconds(60);
        assert_eq!(poll.time_remaining(deadline), 0);
        assert_eq!(poll.time_remaining(deadline + Duration::seconds(1)), 0);
        assert_eq!(poll.time_remaining(deadline + Duration::days(1)), 0);
        assert!(poll.is_expired(deadline));
    }

    #[test]
    fn time_remaining_counts_partial_seconds_as_whole() {
        let poll = Poll::example();
        let just_opened = poll.created_at + Duration::milliseconds(500);
        assert_eq!(poll.time_remaining(just_opened), 60);
        let nearly_over = poll.created_at + Duration::milliseconds(59_500);
        assert_eq!(poll.time_remaining(nearly_over), 1);
        assert!(!poll.is_expired(nearly_over));
    }
}
