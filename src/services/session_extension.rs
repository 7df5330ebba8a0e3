//! Session analytics composition.
//!
//! Wraps [`CoverageTracker`] and [`RegressionDetector`] around a session's
//! start/complete boundary and turns cross-session comparisons into a
//! blocking decision, independent of the orchestrator's own recommendation.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::domain::errors::QaResult;
use crate::domain::models::{CoverageReport, Finding, RegressionReport, RegressionSeverity};
use crate::domain::ports::BaselineStore;
use crate::services::coverage_tracker::CoverageTracker;
use crate::services::regression_detector::RegressionDetector;

/// Coverage delta below which a session blocks, in percentage points.
const COVERAGE_DROP_THRESHOLD: f64 = -10.0;

/// Outcome of the post-session analytics pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionAnalysis {
    /// Coverage comparison against the latest baseline.
    pub coverage_report: CoverageReport,

    /// Regression comparison, present only once a baseline exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regression_report: Option<RegressionReport>,

    /// Whether the change should be blocked regardless of the session's
    /// own recommendation.
    pub should_block: bool,

    /// Why the block was raised; when both checks fire, the coverage
    /// reason wins (last writer).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_reason: Option<String>,
}

/// Composes coverage and regression analytics around QA sessions.
pub struct SessionExtension {
    coverage: CoverageTracker,
    regressions: RegressionDetector,
    // Discovered endpoints recorded at session start, held for the lifetime
    // of this extension instance.
    discovered: Mutex<HashMap<String, Vec<String>>>,
}

impl SessionExtension {
    /// Create an extension over the given baseline store.
    pub fn new(store: Arc<dyn BaselineStore>) -> Self {
        Self {
            coverage: CoverageTracker::new(Arc::clone(&store)),
            regressions: RegressionDetector::new(store),
            discovered: Mutex::new(HashMap::new()),
        }
    }

    /// Record the discovered endpoint set for a session about to run.
    pub async fn on_session_start(&self, session_id: &str, discovered_endpoints: Vec<String>) {
        self.discovered
            .lock()
            .await
            .insert(session_id.to_string(), discovered_endpoints);
    }

    /// Run the analytics pass for a finished session and derive the
    /// blocking decision.
    pub async fn on_session_complete(
        &self,
        session_id: &str,
        tested_endpoints: &[String],
        findings: &[Finding],
    ) -> QaResult<SessionAnalysis> {
        let discovered = self
            .discovered
            .lock()
            .await
            .remove(session_id)
            .unwrap_or_else(|| tested_endpoints.to_vec());

        let coverage_report =
            self.coverage
                .compare_to_baseline(session_id, &discovered, tested_endpoints)?;
        let regression_report = self.regressions.detect_regressions(session_id, findings)?;

        let mut should_block = false;
        let mut block_reason = None;

        if let Some(report) = &regression_report {
            if report.severity == RegressionSeverity::Critical {
                should_block = true;
                block_reason = Some(format!(
                    "Critical regressions detected: {} new issues",
                    report.regression_count
                ));
            }
        }

        // Evaluated after the regression check on purpose: when both fire,
        // the coverage reason is the one reported.
        if coverage_report.delta < COVERAGE_DROP_THRESHOLD {
            should_block = true;
            block_reason = Some(format!(
                "Coverage dropped significantly: {:.1}%",
                coverage_report.delta
            ));
        }

        if should_block {
            warn!(
                session_id,
                reason = block_reason.as_deref().unwrap_or(""),
                "session analytics forcing a block"
            );
        } else {
            info!(
                session_id,
                coverage_pct = coverage_report.coverage_pct,
                "session analytics complete"
            );
        }

        Ok(SessionAnalysis {
            coverage_report,
            regression_report,
            should_block,
            block_reason,
        })
    }

    /// Persist both a coverage baseline and a regression baseline from the
    /// same session.
    ///
    /// Called by integration layers once a feature or bug is verified
    /// fixed; fully replaces the previous "latest" baselines.
    pub async fn set_as_baseline(
        &self,
        session_id: &str,
        tested_endpoints: &[String],
        findings: &[Finding],
    ) -> QaResult<()> {
        let discovered = self
            .discovered
            .lock()
            .await
            .get(session_id)
            .cloned()
            .unwrap_or_else(|| tested_endpoints.to_vec());

        self.coverage
            .capture_baseline(session_id, discovered, tested_endpoints.to_vec())?;
        self.regressions.establish_baseline(session_id, findings)?;
        Ok(())
    }
}
