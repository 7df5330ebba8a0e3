//! Endpoint-coverage snapshots and comparisons.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot of which endpoints were discovered vs tested at some session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageBaseline {
    /// Session that produced the snapshot.
    pub session_id: String,

    /// All endpoints known at snapshot time.
    pub discovered: Vec<String>,

    /// Endpoints actually exercised.
    pub tested: Vec<String>,

    /// `tested / discovered * 100`; `0` when nothing was discovered.
    pub coverage_pct: f64,

    /// When the snapshot was taken.
    pub captured_at: DateTime<Utc>,
}

impl CoverageBaseline {
    /// Build a snapshot, computing the percentage with a zero-discovered guard.
    pub fn capture(session_id: impl Into<String>, discovered: Vec<String>, tested: Vec<String>) -> Self {
        let coverage_pct = coverage_pct(discovered.len(), tested.len());
        Self {
            session_id: session_id.into(),
            discovered,
            tested,
            coverage_pct,
            captured_at: Utc::now(),
        }
    }
}

/// Comparison of a current session's coverage against the latest baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageReport {
    /// Session being compared.
    pub session_id: String,

    /// Current coverage percentage.
    pub coverage_pct: f64,

    /// Baseline percentage, if a baseline existed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline_pct: Option<f64>,

    /// `current - baseline`, in percentage points; `0` without a baseline.
    pub delta: f64,

    /// Endpoints tested now that were absent from the baseline's tested set.
    pub newly_tested: Vec<String>,

    /// Discovered endpoints absent from the current tested set.
    pub untested: Vec<String>,
}

/// Coverage percentage with the divide-by-zero guard.
pub fn coverage_pct(discovered: usize, tested: usize) -> f64 {
    if discovered == 0 {
        0.0
    } else {
        #[allow(clippy::cast_precision_loss)]
        {
            tested as f64 / discovered as f64 * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coverage_pct_zero_discovered() {
        assert_eq!(coverage_pct(0, 0), 0.0);
        assert_eq!(coverage_pct(0, 5), 0.0);
    }

    #[test]
    fn test_coverage_pct() {
        assert!((coverage_pct(10, 2) - 20.0).abs() < f64::EPSILON);
        assert!((coverage_pct(10, 10) - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_capture_computes_pct() {
        let baseline = CoverageBaseline::capture(
            "qa-x",
            vec!["/a".into(), "/b".into(), "/c".into(), "/d".into()],
            vec!["/a".into()],
        );
        assert!((baseline.coverage_pct - 25.0).abs() < f64::EPSILON);
    }
}
