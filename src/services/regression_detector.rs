//! Cross-session regression detection over finding sets.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::domain::errors::QaResult;
use crate::domain::models::{
    Finding, RegressionBaseline, RegressionReport, RegressionSeverity, Severity,
};
use crate::domain::ports::BaselineStore;

/// Diffs finding sets between a stored baseline and a current session.
pub struct RegressionDetector {
    store: Arc<dyn BaselineStore>,
}

impl RegressionDetector {
    /// Create a detector over the given baseline store.
    pub fn new(store: Arc<dyn BaselineStore>) -> Self {
        Self { store }
    }

    /// Persist a session's finding set as the latest regression baseline.
    pub fn establish_baseline(&self, session_id: &str, findings: &[Finding]) -> QaResult<()> {
        let baseline = RegressionBaseline {
            session_id: session_id.to_string(),
            findings: findings.to_vec(),
            established_at: Utc::now(),
        };
        self.store.save_regression_baseline(&baseline)?;
        info!(
            session_id,
            findings = findings.len(),
            "regression baseline established"
        );
        Ok(())
    }

    /// Compare a session's findings against the latest baseline.
    ///
    /// Returns `None` until a baseline has been established. Findings are
    /// keyed by `endpoint:category:test_type` — severity is deliberately
    /// excluded from the key.
    pub fn detect_regressions(
        &self,
        session_id: &str,
        findings: &[Finding],
    ) -> QaResult<Option<RegressionReport>> {
        let Some(baseline) = self.store.load_regression_baseline()? else {
            return Ok(None);
        };

        let baseline_keys: HashSet<String> = baseline
            .findings
            .iter()
            .map(Finding::regression_key)
            .collect();
        let current_keys: HashSet<String> =
            findings.iter().map(Finding::regression_key).collect();

        let new_findings: Vec<Finding> = findings
            .iter()
            .filter(|f| !baseline_keys.contains(&f.regression_key()))
            .cloned()
            .collect();
        let mut fixed_findings: Vec<String> = baseline_keys
            .difference(&current_keys)
            .cloned()
            .collect();
        fixed_findings.sort();

        let severity = if new_findings
            .iter()
            .any(|f| f.severity == Severity::Critical)
        {
            RegressionSeverity::Critical
        } else if new_findings.is_empty() {
            RegressionSeverity::None
        } else {
            RegressionSeverity::Moderate
        };

        Ok(Some(RegressionReport {
            session_id: session_id.to_string(),
            baseline_session_id: baseline.session_id,
            regression_count: new_findings.len(),
            fixed_count: fixed_findings.len(),
            new_findings,
            fixed_findings,
            severity,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::CoverageBaseline;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryStore {
        regression: Mutex<Option<RegressionBaseline>>,
    }

    impl BaselineStore for MemoryStore {
        fn save_coverage_baseline(&self, _baseline: &CoverageBaseline) -> QaResult<()> {
            Ok(())
        }

        fn load_coverage_baseline(&self) -> QaResult<Option<CoverageBaseline>> {
            Ok(None)
        }

        fn coverage_history(&self) -> QaResult<Vec<CoverageBaseline>> {
            Ok(Vec::new())
        }

        fn save_regression_baseline(&self, baseline: &RegressionBaseline) -> QaResult<()> {
            *self.regression.lock().unwrap() = Some(baseline.clone());
            Ok(())
        }

        fn load_regression_baseline(&self) -> QaResult<Option<RegressionBaseline>> {
            Ok(self.regression.lock().unwrap().clone())
        }
    }

    fn finding(severity: Severity, endpoint: &str, category: &str) -> Finding {
        Finding::new(severity, category, endpoint, "behavioral", "t")
    }

    #[test]
    fn test_no_baseline_yields_no_report() {
        let detector = RegressionDetector::new(Arc::new(MemoryStore::default()));
        let report = detector
            .detect_regressions("qa-1", &[finding(Severity::Critical, "/x", "error")])
            .unwrap();
        assert!(report.is_none());
    }

    #[test]
    fn test_round_trip_from_empty_baseline() {
        let detector = RegressionDetector::new(Arc::new(MemoryStore::default()));
        detector.establish_baseline("qa-base", &[]).unwrap();

        let report = detector
            .detect_regressions("qa-2", &[finding(Severity::Critical, "/api/x", "error")])
            .unwrap()
            .expect("baseline exists");

        assert_eq!(report.regression_count, 1);
        assert_eq!(report.severity, RegressionSeverity::Critical);
        assert_eq!(report.baseline_session_id, "qa-base");
        assert!(report.fixed_findings.is_empty());
    }

    #[test]
    fn test_fixed_findings_detected() {
        let detector = RegressionDetector::new(Arc::new(MemoryStore::default()));
        detector
            .establish_baseline("qa-base", &[finding(Severity::Moderate, "/api/a", "contract")])
            .unwrap();

        let report = detector.detect_regressions("qa-2", &[]).unwrap().unwrap();
        assert_eq!(report.regression_count, 0);
        assert_eq!(report.fixed_count, 1);
        assert_eq!(report.severity, RegressionSeverity::None);
        assert_eq!(report.fixed_findings, vec!["/api/a:contract:behavioral"]);
    }

    #[test]
    fn test_severity_collision_under_key() {
        // Two findings identical except for severity collide under the
        // regression key, so no regression is reported.
        let detector = RegressionDetector::new(Arc::new(MemoryStore::default()));
        detector
            .establish_baseline("qa-base", &[finding(Severity::Minor, "/api/a", "error")])
            .unwrap();

        let report = detector
            .detect_regressions("qa-2", &[finding(Severity::Critical, "/api/a", "error")])
            .unwrap()
            .unwrap();
        assert_eq!(report.regression_count, 0);
        assert_eq!(report.severity, RegressionSeverity::None);
    }

    #[test]
    fn test_non_critical_new_findings_are_moderate() {
        let detector = RegressionDetector::new(Arc::new(MemoryStore::default()));
        detector.establish_baseline("qa-base", &[]).unwrap();

        let report = detector
            .detect_regressions("qa-2", &[finding(Severity::Minor, "/api/b", "behavioral")])
            .unwrap()
            .unwrap();
        assert_eq!(report.severity, RegressionSeverity::Moderate);
    }
}
