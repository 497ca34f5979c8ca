use rocket::{
    http::Status,
    response::{self, Responder},
    serde::json::Json,
    Request,
};
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong with a poll operation.
///
/// All variants are local, recoverable conditions reported back to the
/// caller that triggered them; none is fatal to the process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Malformed create/submit input. The caller corrects it and retries.
    #[error("Invalid input: {0}")]
    Validation(String),
    /// A create arrived while an active, unexpired poll is running.
    #[error("Conflict: {0}")]
    Conflict(String),
    /// A submission arrived after the voting window closed.
    #[error("The voting window has closed")]
    Expired,
    /// A submission arrived while no poll is running.
    #[error("Not found: {0}")]
    NotFound(String),
    /// The participant has already answered the current poll.
    #[error("Duplicate answer: {0}")]
    Duplicate(String),
}

impl Error {
    /// Stable identifier clients use to distinguish failure classes.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Conflict(_) => "conflict",
            Self::Expired => "expired",
            Self::NotFound(_) => "not_found",
            Self::Duplicate(_) => "duplicate",
        }
    }

    fn status(&self) -> Status {
        match self {
            Self::Validation(_) => Status::BadRequest,
            Self::Conflict(_) | Self::Duplicate(_) => Status::Conflict,
            Self::Expired => Status::Gone,
            Self::NotFound(_) => Status::NotFound,
        }
    }
}

/// Wire form of an error: `{ "kind": ..., "message": ... }`.
#[derive(Debug, Serialize)]
struct ErrorBody {
    kind: &'static str,
    message: String,
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'o> {
        let status = self.status();
        let body = Json(ErrorBody {
            kind: self.kind(),
            message: self.to_string(),
        });
        (status, body).respond_to(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_and_statuses() {
        let cases = [
            (Error::Validation("x".into()), "validation", Status::BadRequest),
            (Error::Conflict("x".into()), "conflict", Status::Conflict),
            (Error::Expired, "expired", Status::Gone),
            (Error::NotFound("x".into()), "not_found", Status::NotFound),
            (Error::Duplicate("x".into()), "duplicate", Status::Conflict),
        ];
        for (err, kind, status) in cases {
            assert_eq!(err.kind(), kind);
            assert_eq!(err.status(), status);
        }
    }
}
