use chrono::Utc;
use log::info;
use rocket::{serde::json::Json, Route, State};

use crate::error::Result;
use crate::model::{
    api::{AnswerRequest, CreatePollRequest, PollCreated, PollData, SubmitReceipt},
    store::PollStore,
};

pub fn routes() -> Vec<Route> {
    routes![current_poll, create_poll, submit_answer]
}

/// Snapshot of the current poll and every recorded answer. Viewers refetch
/// this on a fixed period; there is no push channel.
#[get("/poll")]
async fn current_poll(store: &State<PollStore>) -> Json<PollData> {
    Json(store.current())
}

/// Open a new poll. Fails while the previous one is still active and
/// unexpired; succeeding discards the previous poll and its answers.
#[post("/create-poll", data = "<request>", format = "json")]
async fn create_poll(
    request: Json<CreatePollRequest>,
    store: &State<PollStore>,
) -> Result<Json<PollCreated>> {
    let poll = store.create(request.into_inner(), Utc::now())?;
    info!(
        "Opened poll {} with {} options and a {}s window",
        poll.id,
        poll.options.len(),
        poll.time_limit_seconds
    );
    Ok(Json(PollCreated { poll }))
}

/// Record one participant's answer to the current poll.
#[post("/answer", data = "<request>", format = "json")]
async fn submit_answer(
    request: Json<AnswerRequest>,
    store: &State<PollStore>,
) -> Result<Json<SubmitReceipt>> {
    let answer = store.submit(request.into_inner(), Utc::now())?;
    info!("Recorded an answer from '{}'", answer.participant);
    Ok(Json(SubmitReceipt { ok: true }))
}
