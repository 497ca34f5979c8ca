//! Pure domain logic: the poll itself, lifecycle decisions, answer vetting,
//! and result aggregation. Nothing in here holds state or takes locks.

mod ingest;
mod lifecycle;
mod poll;
mod tally;

pub use ingest::vet_answer;
pub use lifecycle::{can_create, results_phase};
pub use poll::{Answer, Poll, PollId};
pub use tally::{tally, OptionTally};
