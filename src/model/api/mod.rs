//! Wire-level request and response types. Field names follow the frontend's
//! JSON contract (camelCase where the two differ).

use serde::{Deserialize, Serialize};

use super::common::{Answer, Poll};

/// Everything a viewer needs to render the current poll: the poll itself,
/// if any, and all recorded answers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollData {
    pub poll: Option<Poll>,
    pub answers: Vec<Answer>,
}

/// Moderator request to open a new poll.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePollRequest {
    pub question: String,
    /// Option texts; entries are trimmed and empties discarded server-side.
    pub options: Vec<String>,
    /// Signed on the wire so a non-positive value is rejected with a
    /// validation error rather than a parse failure.
    pub time_limit_seconds: i64,
}

/// Participant request to record an answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerRequest {
    pub participant: String,
    pub option: String,
}

/// Response to a successful create.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollCreated {
    pub poll: Poll,
}

/// Response to a successful answer submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitReceipt {
    pub ok: bool,
}
