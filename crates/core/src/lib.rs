//! Domain building blocks for the hookecho mock callback service.
//!
//! No internal dependencies. Used by both the store and the HTTP layer.

pub mod age;
pub mod clock;
pub mod correlation;
pub mod error;
pub mod receipt;
pub mod record;
