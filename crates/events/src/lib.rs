//! Deferred callback delivery.
//!
//! - [`delivery`]: the outbound HTTP POST ([`CallbackSender`],
//!   [`HttpCallbackSender`]). Single attempt, no retry.
//! - [`scheduler`]: one-shot timers that fire a delivery after a fixed delay
//!   ([`CallbackScheduler`], [`TokioScheduler`]).

pub mod delivery;
pub mod scheduler;

pub use delivery::{CallbackSender, DeliveryError, HttpCallbackSender};
pub use scheduler::{CallbackScheduler, DeferredDelivery, TokioScheduler};
