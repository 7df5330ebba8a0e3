//! Infrastructure adapters: configuration, persistence, reporting, and
//! built-in agents.

pub mod agents;
pub mod config;
pub mod report;
pub mod store;

pub use config::ConfigLoader;
pub use store::FsQaStore;
