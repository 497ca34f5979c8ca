use log::error;
use rocket::{
    fairing::{self, Fairing, Info, Kind},
    Build, Rocket,
};
use serde::Deserialize;
use std::time::Duration;

use crate::watch::WatcherSettings;

/// Application configuration, derived from `Rocket.toml` and `ROCKET_*`
/// environment variables. This struct becomes managed state and can be
/// inspected by any endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    sync_interval: u32,
    sync_failure_threshold: u32,
}

impl Config {
    /// Period between two poll refreshes of a single viewer.
    /// Configured via `SYNC_INTERVAL`.
    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval.into())
    }

    /// Consecutive failed refreshes after which a viewer's snapshot is
    /// flagged stale. Configured via `SYNC_FAILURE_THRESHOLD`.
    pub fn sync_failure_threshold(&self) -> u32 {
        self.sync_failure_threshold
    }

    /// Settings for a [`crate::watch::PollWatcher`] following this server's
    /// configuration.
    pub fn watcher_settings(&self) -> WatcherSettings {
        WatcherSettings {
            interval: self.sync_interval(),
            failure_threshold: self.sync_failure_threshold(),
        }
    }
}

/// A fairing that loads the application config and puts it in managed state.
/// This could easily be achieved using `AdHoc::config`, but is written out
/// explicitly for control over the error message.
pub struct ConfigFairing;

#[rocket::async_trait]
impl Fairing for ConfigFairing {
    fn info(&self) -> Info {
        Info {
            name: "Config",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, rocket: Rocket<Build>) -> fairing::Result {
        match rocket.figment().extract::<Config>() {
            Ok(config) => Ok(rocket.manage(config)),
            Err(err) => {
                error!("Failed to load config: {err}");
                Err(rocket)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_convert_units() {
        let config = Config {
            sync_interval: 2,
            sync_failure_threshold: 5,
        };
        assert_eq!(config.sync_interval(), Duration::from_secs(2));

        let settings = config.watcher_settings();
        assert_eq!(settings.interval, Duration::from_secs(2));
        assert_eq!(settings.failure_threshold, 5);
    }
}
