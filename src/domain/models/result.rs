//! Aggregated session results.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::finding::{Finding, Recommendation, Severity};

/// Aggregated outcome of one QA session.
///
/// Built exclusively by the aggregator; `recommendation` is always derived
/// from the severity counts, never set independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResult {
    /// Total tests executed across all agents.
    pub tests_run: u64,
    /// Tests that passed.
    pub tests_passed: u64,
    /// Tests that failed.
    pub tests_failed: u64,
    /// Tests skipped by agents.
    pub tests_skipped: u64,

    /// Deduplicated findings, in dispatch order.
    pub findings: Vec<Finding>,

    /// Count of critical findings after dedup.
    pub critical_count: usize,
    /// Count of moderate findings after dedup.
    pub moderate_count: usize,
    /// Count of minor findings after dedup.
    pub minor_count: usize,

    /// Session verdict, derived from the counts above.
    pub recommendation: Recommendation,

    /// Agent role -> reason it was skipped or failed.
    #[serde(default)]
    pub skipped_reasons: BTreeMap<String, String>,

    /// Set only when the session stopped early due to budget/timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partial_completion_reason: Option<String>,
}

impl SessionResult {
    /// An empty result carrying only a partial-completion reason.
    ///
    /// Used when pre-dispatch guards fire and no agents run at all.
    pub fn partial(reason: impl Into<String>) -> Self {
        Self {
            partial_completion_reason: Some(reason.into()),
            ..Self::empty()
        }
    }

    /// A zero-valued result with a PASS recommendation.
    pub fn empty() -> Self {
        Self {
            tests_run: 0,
            tests_passed: 0,
            tests_failed: 0,
            tests_skipped: 0,
            findings: Vec::new(),
            critical_count: 0,
            moderate_count: 0,
            minor_count: 0,
            recommendation: Recommendation::Pass,
            skipped_reasons: BTreeMap::new(),
            partial_completion_reason: None,
        }
    }

    /// Findings at or above `threshold` severity rank.
    pub fn findings_at_or_above(&self, threshold: Severity) -> Vec<&Finding> {
        self.findings
            .iter()
            .filter(|f| f.severity.rank() <= threshold.rank())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_result_is_empty_pass() {
        let result = SessionResult::partial("cost_limit: exceeded");
        assert_eq!(result.tests_run, 0);
        assert!(result.findings.is_empty());
        assert_eq!(result.recommendation, Recommendation::Pass);
        assert_eq!(
            result.partial_completion_reason.as_deref(),
            Some("cost_limit: exceeded")
        );
    }

    #[test]
    fn test_findings_at_or_above() {
        let mut result = SessionResult::empty();
        result.findings = vec![
            Finding::new(Severity::Critical, "behavioral", "/a", "behavioral", "a"),
            Finding::new(Severity::Moderate, "contract", "/b", "contract", "b"),
            Finding::new(Severity::Minor, "semantic", "/c", "semantic", "c"),
        ];

        assert_eq!(result.findings_at_or_above(Severity::Critical).len(), 1);
        assert_eq!(result.findings_at_or_above(Severity::Moderate).len(), 2);
        assert_eq!(result.findings_at_or_above(Severity::Minor).len(), 3);
    }
}
