use chrono::{DateTime, Utc};

use super::poll::{Answer, Poll};

/// Whether the moderator may open a new poll at `now`.
///
/// Two independent gates: the stored `active` flag and the clock-derived
/// expiry. Either one releases the slot. The flag is not rewritten when the
/// window runs out; expiry is always recomputed from the clock.
pub fn can_create(current: Option<&Poll>, now: DateTime<Utc>) -> bool {
    match current {
        None => true,
        Some(poll) => !poll.active || poll.is_expired(now),
    }
}

/// Whether `participant`'s view should show aggregated results instead of
/// the voting form: they have already answered, or the window has closed.
pub fn results_phase(
    poll: &Poll,
    answers: &[Answer],
    participant: &str,
    now: DateTime<Utc>,
) -> bool {
    answers.iter().any(|a| a.participant == participant) || poll.is_expired(now)
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Duration;

    #[test]
    fn can_create_with_no_poll() {
        assert!(can_create(None, Utc::now()));
    }

    #[test]
    fn cannot_create_while_active_and_unexpired() {
        let poll = Poll::example();
        assert!(!can_create(Some(&poll), poll.created_at + Duration::seconds(30)));
    }

    #[test]
    fn can_create_once_expired() {
        let poll = Poll::example();
        assert!(can_create(Some(&poll), poll.created_at + Duration::seconds(60)));
    }

    #[test]
    fn can_create_when_inactive_even_inside_the_window() {
        let poll = Poll::inactive_example();
        assert!(can_create(Some(&poll), poll.created_at + Duration::seconds(5)));
    }

    #[test]
    fn results_phase_after_answering() {
        let poll = Poll::example();
        let answers = vec![Answer::example()];
        let now = poll.created_at + Duration::seconds(5);
        assert!(results_phase(&poll, &answers, "S1", now));
        assert!(!results_phase(&poll, &answers, "S2", now));
    }

    #[test]
    fn results_phase_for_everyone_once_expired() {
        let poll = Poll::expired_example();
        assert!(results_phase(&poll, &[], "S1", Utc::now()));
        assert!(results_phase(&poll, &[], "S2", Utc::now()));
    }
}
