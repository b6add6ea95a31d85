// src/state.rs

use axum::extract::FromRef;
use std::sync::Arc;

use crate::clock::Clock;
use crate::config::Config;
use crate::notify::Notifier;
use crate::store::QuizStore;

/// Shared application state passed to all handlers.
///
/// The store, clock and notifier are trait objects so tests can run the full
/// HTTP surface against the in-memory store and a manual clock.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn QuizStore>,
    pub config: Config,
    pub clock: Arc<dyn Clock>,
    pub notifier: Arc<dyn Notifier>,
}

/// Lets the auth middleware extract `State<Config>` directly.
impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Config {
        state.config.clone()
    }
}
