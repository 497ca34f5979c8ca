//! Per-viewer synchronisation with the poll store.
//!
//! Each open page runs one [`PollWatcher`]: a periodic task that refetches
//! the current poll on a fixed interval, replaces its cached snapshot
//! wholesale, and derives whether its participant should see the voting form
//! or the results. Watchers are independent of each other and never block
//! the server; a failed refresh keeps the previous snapshot and is retried
//! on the next scheduled tick.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::Utc;
use log::{error, warn};
use rocket::tokio::{
    self,
    sync::Notify,
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};
use thiserror::Error;

use crate::model::api::PollData;
use crate::model::common::results_phase;

/// A refresh attempt failed. Always transient: the watcher logs it and the
/// next tick supersedes it.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("feed unavailable: {0}")]
    Unavailable(String),
}

/// Source of poll snapshots. This is the transport seam: a feed only has to
/// honour the `/api/poll` message contract, not any particular framing.
#[rocket::async_trait]
pub trait PollFeed: Send + Sync + 'static {
    async fn fetch(&self) -> Result<PollData, FeedError>;
}

/// [`PollFeed`] over HTTP, against a running poll server.
pub struct HttpPollFeed {
    client: reqwest::Client,
    url: String,
}

impl HttpPollFeed {
    /// `base` is the server root, e.g. `http://localhost:8000`.
    pub fn new(base: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: format!("{}/api/poll", base.trim_end_matches('/')),
        }
    }
}

#[rocket::async_trait]
impl PollFeed for HttpPollFeed {
    async fn fetch(&self) -> Result<PollData, FeedError> {
        let response = self.client.get(&self.url).send().await?.error_for_status()?;
        Ok(response.json().await?)
    }
}

/// How a watcher paces itself and when it stops being quiet about failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatcherSettings {
    /// Period between two refreshes.
    pub interval: Duration,
    /// Consecutive failed refreshes before the snapshot is flagged stale.
    pub failure_threshold: u32,
}

impl Default for WatcherSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            failure_threshold: 5,
        }
    }
}

/// What a viewer currently knows: the latest fetched state, the phase their
/// page should be in, and whether the data is known to be going stale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewerSnapshot {
    pub data: PollData,
    /// True once this viewer should see aggregated results instead of the
    /// voting form: they have answered, or the window has closed.
    pub results_phase: bool,
    /// Set after `failure_threshold` consecutive failed refreshes; cleared
    /// by the next successful one.
    pub degraded: bool,
}

/// A cancellable fixed-interval refresh loop for a single viewer.
///
/// The loop yields between ticks and does no other work. Once cancellation
/// is requested no further tick starts, and because a tick publishes its
/// result as one assignment of a fully-built [`ViewerSnapshot`], no partial
/// tick is ever observable.
pub struct PollWatcher {
    snapshot: Arc<RwLock<ViewerSnapshot>>,
    cancel: Arc<Notify>,
    handle: JoinHandle<()>,
}

impl PollWatcher {
    /// Spawn the refresh loop for one viewer. `participant` is the display
    /// name this viewer answers under, used to derive its phase.
    pub fn spawn(feed: impl PollFeed, participant: String, settings: WatcherSettings) -> Self {
        let snapshot = Arc::new(RwLock::new(ViewerSnapshot::default()));
        let cancel = Arc::new(Notify::new());

        let task_snapshot = Arc::clone(&snapshot);
        let task_cancel = Arc::clone(&cancel);
        let handle = tokio::spawn(async move {
            let mut ticks = interval(settings.interval);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut failures: u32 = 0;
            loop {
                tokio::select! {
                    // Checked first: a tick that becomes due at the same
                    // moment as cancellation must not start.
                    biased;
                    _ = task_cancel.notified() => break,
                    _ = ticks.tick() => {}
                }
                match feed.fetch().await {
                    Ok(data) => {
                        failures = 0;
                        let in_results = match &data.poll {
                            Some(poll) => {
                                results_phase(poll, &data.answers, &participant, Utc::now())
                            }
                            None => false,
                        };
                        let next = ViewerSnapshot {
                            data,
                            results_phase: in_results,
                            degraded: false,
                        };
                        *task_snapshot.write().expect("snapshot lock poisoned") = next;
                    }
                    Err(err) => {
                        failures += 1;
                        if failures >= settings.failure_threshold {
                            error!(
                                "Poll refresh for '{participant}' failed {failures} times in a row, \
                                 view is stale: {err}"
                            );
                            task_snapshot
                                .write()
                                .expect("snapshot lock poisoned")
                                .degraded = true;
                        } else {
                            warn!("Poll refresh for '{participant}' failed, retrying next tick: {err}");
                        }
                    }
                }
            }
        });

        Self {
            snapshot,
            cancel,
            handle,
        }
    }

    /// The latest state this viewer has observed.
    pub fn snapshot(&self) -> ViewerSnapshot {
        self.snapshot
            .read()
            .expect("snapshot lock poisoned")
            .clone()
    }

    /// Stop the refresh loop. No tick starts after this; an in-flight tick
    /// finishes (and publishes in full) before the loop winds down.
    pub async fn cancel(self) {
        self.cancel.notify_one();
        let _ = self.handle.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use rocket::tokio::time::sleep;

    use crate::model::common::{Answer, Poll};

    /// A feed producing a fixed response, counting how often it is asked.
    struct FixedFeed {
        response: Option<PollData>,
        fetches: Arc<AtomicUsize>,
    }

    impl FixedFeed {
        fn new(response: Option<PollData>) -> (Self, Arc<AtomicUsize>) {
            let fetches = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    response,
                    fetches: Arc::clone(&fetches),
                },
                fetches,
            )
        }
    }

    #[rocket::async_trait]
    impl PollFeed for FixedFeed {
        async fn fetch(&self) -> Result<PollData, FeedError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.response
                .clone()
                .ok_or_else(|| FeedError::Unavailable("offline".to_string()))
        }
    }

    fn fast_settings() -> WatcherSettings {
        WatcherSettings {
            interval: Duration::from_millis(10),
            failure_threshold: 3,
        }
    }

    /// Poll the watcher until `pred` holds, or give up after ~1s.
    async fn wait_for(watcher: &PollWatcher, pred: impl Fn(&ViewerSnapshot) -> bool) {
        for _ in 0..100 {
            if pred(&watcher.snapshot()) {
                return;
            }
            sleep(Duration::from_millis(10)).await;
        }
        panic!("watcher never reached the expected state");
    }

    #[rocket::async_test]
    async fn replaces_the_snapshot_and_derives_the_phase() {
        let data = PollData {
            poll: Some(Poll::example()),
            answers: vec![Answer::example()],
        };
        let (feed, _) = FixedFeed::new(Some(data.clone()));

        // S1 has answered, so their view flips to results.
        let watcher = PollWatcher::spawn(feed, "S1".to_string(), fast_settings());
        wait_for(&watcher, |snap| snap.data == data).await;
        assert!(watcher.snapshot().results_phase);
        watcher.cancel().await;
    }

    #[rocket::async_test]
    async fn a_viewer_who_has_not_answered_stays_in_the_voting_phase() {
        let data = PollData {
            poll: Some(Poll::example()),
            answers: vec![Answer::example()],
        };
        let (feed, _) = FixedFeed::new(Some(data.clone()));

        let watcher = PollWatcher::spawn(feed, "S2".to_string(), fast_settings());
        wait_for(&watcher, |snap| snap.data == data).await;
        assert!(!watcher.snapshot().results_phase);
        watcher.cancel().await;
    }

    #[rocket::async_test]
    async fn an_expired_poll_puts_everyone_in_the_results_phase() {
        let data = PollData {
            poll: Some(Poll::expired_example()),
            answers: Vec::new(),
        };
        let (feed, _) = FixedFeed::new(Some(data.clone()));

        let watcher = PollWatcher::spawn(feed, "S2".to_string(), fast_settings());
        wait_for(&watcher, |snap| snap.data == data).await;
        assert!(watcher.snapshot().results_phase);
        watcher.cancel().await;
    }

    #[rocket::async_test]
    async fn repeated_failures_flag_the_snapshot_as_stale() {
        let (feed, fetches) = FixedFeed::new(None);

        let watcher = PollWatcher::spawn(feed, "S1".to_string(), fast_settings());
        wait_for(&watcher, |snap| snap.degraded).await;
        // It took at least `failure_threshold` attempts to get there.
        assert!(fetches.load(Ordering::SeqCst) >= 3);
        watcher.cancel().await;
    }

    #[rocket::async_test]
    async fn no_tick_starts_after_cancellation() {
        let (feed, fetches) = FixedFeed::new(Some(PollData::default()));

        let watcher = PollWatcher::spawn(feed, "S1".to_string(), fast_settings());
        // Let at least one tick complete before cancelling.
        for _ in 0..100 {
            if fetches.load(Ordering::SeqCst) > 0 {
                break;
            }
            sleep(Duration::from_millis(10)).await;
        }
        watcher.cancel().await;

        let after_cancel = fetches.load(Ordering::SeqCst);
        sleep(Duration::from_millis(100)).await;
        assert_eq!(fetches.load(Ordering::SeqCst), after_cancel);
    }
}
