//! Domain models: pure value types shared across the orchestrator.

pub mod config;
pub mod context;
pub mod coverage;
pub mod finding;
pub mod limits;
pub mod regression;
pub mod result;
pub mod session;

pub use config::{DepthEstimate, DepthEstimates, QaConfig, SelectorConfig};
pub use context::{EndpointTarget, QaContext};
pub use coverage::{coverage_pct, CoverageBaseline, CoverageReport};
pub use finding::{BugInvestigation, Finding, Recommendation, Severity};
pub use limits::{EndpointCaps, Limits};
pub use regression::{RegressionBaseline, RegressionReport, RegressionSeverity};
pub use result::SessionResult;
pub use session::{Depth, Session, SessionStatus, Trigger};
