//! Built-in agent implementations.

pub mod http_probe;

pub use http_probe::HttpProbeAgent;
