//! Domain layer: core business types and the ports around them.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{QaError, QaResult};
