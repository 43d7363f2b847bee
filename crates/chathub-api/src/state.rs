//! Application state shared across all handlers.

use std::sync::Arc;

use chathub_core::config::AppConfig;
use chathub_realtime::ChatEngine;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Realtime chat engine
    pub engine: Arc<ChatEngine>,
}

impl AppState {
    /// Assemble the shared state.
    pub fn new(config: Arc<AppConfig>, engine: Arc<ChatEngine>) -> Self {
        Self { config, engine }
    }
}
