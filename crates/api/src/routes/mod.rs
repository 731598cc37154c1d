pub mod callbacks;
pub mod echo;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /callback-register                   register async callback (POST)
/// /async-callback                      same, legacy path (POST)
/// /callback, /callback/               ingest (POST), list all (GET)
/// /callback/{id}                       ingest with status (POST), query by id (GET)
///
/// /hello                               connectivity check (GET)
/// /echo                                echo request (any method)
/// /echo/{status}                       echo request with status (any method)
/// /data/array/integer                  [1..=elements] (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Async callback dispatcher and callback log.
        .merge(callbacks::router())
        // Stateless request transformers.
        .merge(echo::router())
}
