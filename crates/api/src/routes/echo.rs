//! Route definitions for the stateless request transformers.

use axum::routing::{any, get};
use axum::Router;

use crate::handlers::echo;
use crate::state::AppState;

/// Echo routes mounted at `/api`.
///
/// ```text
/// GET    /hello                -> hello
/// ANY    /echo                 -> echo
/// ANY    /echo/{status}        -> echo_with_status
/// GET    /data/array/integer   -> integer_array
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/hello", get(echo::hello))
        .route("/echo", any(echo::echo))
        .route("/echo/{status}", any(echo::echo_with_status))
        .route("/data/array/integer", get(echo::integer_array))
}
