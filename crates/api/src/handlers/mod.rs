//! Request handlers.
//!
//! - [`async_callback`] -- register an async operation, deliver the receipt later.
//! - [`callback_log`] -- ingest, list and query stored callbacks.
//! - [`echo`] -- stateless request transformers.

pub mod async_callback;
pub mod callback_log;
pub mod echo;
