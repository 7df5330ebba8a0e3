//! Endpoint-coverage tracking across sessions.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::info;

use crate::domain::errors::QaResult;
use crate::domain::models::{coverage_pct, CoverageBaseline, CoverageReport};
use crate::domain::ports::BaselineStore;

/// Captures and compares endpoint-coverage snapshots.
pub struct CoverageTracker {
    store: Arc<dyn BaselineStore>,
}

impl CoverageTracker {
    /// Create a tracker over the given baseline store.
    pub fn new(store: Arc<dyn BaselineStore>) -> Self {
        Self { store }
    }

    /// Record a coverage snapshot as the latest baseline and append it to
    /// the capped history.
    pub fn capture_baseline(
        &self,
        session_id: &str,
        discovered: Vec<String>,
        tested: Vec<String>,
    ) -> QaResult<CoverageBaseline> {
        let baseline = CoverageBaseline::capture(session_id, discovered, tested);
        self.store.save_coverage_baseline(&baseline)?;
        info!(
            session_id,
            coverage_pct = baseline.coverage_pct,
            discovered = baseline.discovered.len(),
            tested = baseline.tested.len(),
            "coverage baseline captured"
        );
        Ok(baseline)
    }

    /// Compare a session's coverage against the latest baseline.
    ///
    /// Without a stored baseline the delta is `0` and the comparison sets
    /// are computed against an empty baseline.
    pub fn compare_to_baseline(
        &self,
        session_id: &str,
        discovered: &[String],
        tested: &[String],
    ) -> QaResult<CoverageReport> {
        let baseline = self.store.load_coverage_baseline()?;
        let current_pct = coverage_pct(discovered.len(), tested.len());

        let (baseline_pct, baseline_tested) = baseline.map_or((None, HashSet::new()), |b| {
            (Some(b.coverage_pct), b.tested.into_iter().collect())
        });
        let delta = baseline_pct.map_or(0.0, |pct| current_pct - pct);

        let tested_set: HashSet<&String> = tested.iter().collect();
        let newly_tested = tested
            .iter()
            .filter(|ep| !baseline_tested.contains(*ep))
            .cloned()
            .collect();
        let untested = discovered
            .iter()
            .filter(|ep| !tested_set.contains(*ep))
            .cloned()
            .collect();

        Ok(CoverageReport {
            session_id: session_id.to_string(),
            coverage_pct: current_pct,
            baseline_pct,
            delta,
            newly_tested,
            untested,
        })
    }
}
