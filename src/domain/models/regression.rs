//! Finding-set baselines and regression comparisons.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::finding::Finding;

/// Stored snapshot of a session's finding set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionBaseline {
    /// Session the snapshot was taken from.
    pub session_id: String,

    /// Findings in a uniform shape.
    pub findings: Vec<Finding>,

    /// When the baseline was established.
    pub established_at: DateTime<Utc>,
}

/// Severity of a regression comparison as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegressionSeverity {
    /// At least one new finding is critical.
    Critical,
    /// New findings exist, none critical.
    Moderate,
    /// No new findings.
    None,
}

impl std::fmt::Display for RegressionSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Critical => "critical",
            Self::Moderate => "moderate",
            Self::None => "none",
        };
        write!(f, "{s}")
    }
}

/// Comparison of a baseline's finding set against a current session's.
///
/// Can only exist if a baseline was previously established — absence of a
/// baseline yields no report, not a zero-valued one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionReport {
    /// Session being compared.
    pub session_id: String,

    /// Baseline session compared against.
    pub baseline_session_id: String,

    /// Findings present now but not in the baseline.
    pub new_findings: Vec<Finding>,

    /// Regression keys present in the baseline but not now.
    pub fixed_findings: Vec<String>,

    /// Count of new findings.
    pub regression_count: usize,

    /// Count of fixed findings.
    pub fixed_count: usize,

    /// Overall severity of the comparison.
    pub severity: RegressionSeverity,
}
