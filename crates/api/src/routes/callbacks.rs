//! Route definitions for async callbacks and the callback log.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{async_callback, callback_log};
use crate::state::AppState;

/// Callback routes mounted at `/api`.
///
/// ```text
/// POST   /callback-register   -> register_async_callback
/// POST   /async-callback      -> register_async_callback
/// GET    /callback            -> list_callbacks
/// POST   /callback            -> record_callback
/// GET    /callback/           -> list_callbacks
/// POST   /callback/           -> record_callback
/// GET    /callback/{id}       -> query_callbacks
/// POST   /callback/{id}       -> record_callback_with_status (id is the status)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/callback-register",
            post(async_callback::register_async_callback),
        )
        .route(
            "/async-callback",
            post(async_callback::register_async_callback),
        )
        .route(
            "/callback",
            get(callback_log::list_callbacks).post(callback_log::record_callback),
        )
        .route(
            "/callback/",
            get(callback_log::list_callbacks).post(callback_log::record_callback),
        )
        .route(
            "/callback/{id}",
            get(callback_log::query_callbacks).post(callback_log::record_callback_with_status),
        )
}
