//! Service layer: decision policies and session analytics.

pub mod aggregator;
pub mod coverage_tracker;
pub mod depth_selector;
pub mod dispatch_table;
pub mod regression_detector;
pub mod session_extension;

pub use coverage_tracker::CoverageTracker;
pub use depth_selector::DepthSelector;
pub use dispatch_table::DispatchTable;
pub use regression_detector::RegressionDetector;
pub use session_extension::{SessionAnalysis, SessionExtension};
