#[macro_use]
extern crate rocket;

use rocket::{Build, Rocket};

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod watch;

use config::ConfigFairing;
use logging::LoggerFairing;
use model::store::PollStore;

/// Construct the Rocket instance: API routes, config, request logging, and
/// the in-memory poll store as managed state.
///
/// The store is the only shared mutable state in the process; everything a
/// handler needs beyond it comes from the figment-derived [`config::Config`].
pub fn build() -> Rocket<Build> {
    rocket::build()
        .mount("/api", api::routes())
        .attach(ConfigFairing)
        .attach(LoggerFairing)
        .manage(PollStore::new())
}
