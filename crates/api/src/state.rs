use std::sync::Arc;

use hookecho_core::clock::Clock;
use hookecho_events::CallbackScheduler;
use hookecho_store::CallbackStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Callback record storage.
    pub store: Arc<dyn CallbackStore>,
    /// Deferred delivery scheduler.
    pub scheduler: Arc<dyn CallbackScheduler>,
    /// Clock used to age records in listings.
    pub clock: Arc<dyn Clock>,
}
