use serde::Serialize;

use super::poll::{Answer, Poll};

/// Aggregated standing of a single option.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionTally {
    pub option: String,
    pub count: usize,
    /// Share of all answers, rounded to one decimal for display.
    pub percentage: f64,
}

/// Count answers per option, in the poll's option order.
///
/// Ingestion guarantees every answer names one of the poll's options, so
/// each answer lands in exactly one bucket and the counts sum to
/// `answers.len()`.
pub fn tally(poll: &Poll, answers: &[Answer]) -> Vec<OptionTally> {
    let total = answers.len();
    poll.options
        .iter()
        .map(|option| {
            let count = answers.iter().filter(|a| &a.option == option).count();
            let percentage = if total > 0 {
                round_one_decimal(100.0 * count as f64 / total as f64)
            } else {
                0.0
            };
            OptionTally {
                option: option.clone(),
                count,
                percentage,
            }
        })
        .collect()
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
