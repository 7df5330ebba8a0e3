//! Persistence ports for sessions and cross-session baselines.
//!
//! Write failures propagate loudly; read failures (missing file, invalid
//! JSON, shape mismatch) are treated as "not found" and surface as `None`.

use crate::domain::errors::QaResult;
use crate::domain::models::{CoverageBaseline, RegressionBaseline, Session};

/// Port for persisting sessions and their human-readable companions.
pub trait SessionStore: Send + Sync {
    /// Persist a full session snapshot atomically.
    fn save_session(&self, session: &Session) -> QaResult<()>;

    /// Load a session by id; `None` for missing or unreadable state.
    fn load_session(&self, session_id: &str) -> QaResult<Option<Session>>;

    /// Most recent session ids, newest first, up to `limit`.
    fn list_session_ids(&self, limit: usize) -> QaResult<Vec<String>>;

    /// Write the markdown findings report for a terminal session.
    fn write_report(&self, session_id: &str, markdown: &str) -> QaResult<()>;

    /// Write the bug-investigation seed document for a session.
    fn write_bugs_doc(&self, session_id: &str, markdown: &str) -> QaResult<()>;
}

/// Port for coverage and regression baselines.
///
/// "Latest" baselines are last-write-wins with no locking; concurrent
/// writers are assumed to be coordinated by the integration layer.
pub trait BaselineStore: Send + Sync {
    /// Persist a coverage snapshot as latest and append it to the capped
    /// history.
    fn save_coverage_baseline(&self, baseline: &CoverageBaseline) -> QaResult<()>;

    /// Latest coverage baseline, if one was ever captured.
    fn load_coverage_baseline(&self) -> QaResult<Option<CoverageBaseline>>;

    /// Coverage history, oldest first.
    fn coverage_history(&self) -> QaResult<Vec<CoverageBaseline>>;

    /// Persist a finding-set baseline as latest and under its session id.
    fn save_regression_baseline(&self, baseline: &RegressionBaseline) -> QaResult<()>;

    /// Latest regression baseline, if one was ever established.
    fn load_regression_baseline(&self) -> QaResult<Option<RegressionBaseline>>;
}
