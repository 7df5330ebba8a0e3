//! CLI output formatting.

pub mod table;

pub use table::{TableFormatter, print_session};
