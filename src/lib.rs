//! QaSwarm - Adaptive QA Testing Orchestrator
//!
//! QaSwarm coordinates pluggable test agents against a running service,
//! choosing how hard to test based on trigger, target risk, and remaining
//! cost/time budget, and tracking coverage and regressions across sessions.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Pure models, errors, and ports
//! - **Service Layer** (`services`): Depth selection, aggregation, and
//!   cross-session analytics
//! - **Application Layer** (`application`): The orchestrator and agent registry
//! - **Infrastructure Layer** (`infrastructure`): Configuration, persistence,
//!   reporting, and the built-in HTTP probe
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use qaswarm::application::{AgentRegistry, QaOrchestrator};
//! use qaswarm::domain::models::{QaConfig, Trigger};
//! use qaswarm::infrastructure::FsQaStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = QaConfig::default();
//!     let store = Arc::new(FsQaStore::new(&config.qa_root));
//!     let orchestrator = QaOrchestrator::new(config, AgentRegistry::new(), store);
//!     let session = orchestrator
//!         .test("/api/users", None, Trigger::UserCommand, None, None)
//!         .await?;
//!     println!("{}: {}", session.session_id, session.status);
//!     Ok(())
//! }
//! ```

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use application::{AgentRegistry, QaOrchestrator};
pub use domain::errors::{QaError, QaResult};
pub use domain::models::{
    Depth, Finding, QaConfig, QaContext, Recommendation, Session, SessionResult, SessionStatus,
    Severity, Trigger,
};
pub use domain::ports::{
    AgentContext, AgentError, AgentOutput, AgentRole, BaselineStore, SessionStore, TestAgent,
};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use infrastructure::FsQaStore;
pub use services::{CoverageTracker, DepthSelector, DispatchTable, RegressionDetector, SessionExtension};
