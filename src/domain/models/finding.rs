//! Findings: individual discrepancies reported by test agents.
//!
//! A finding is the atomic unit of QA evidence. Agents return findings in
//! heterogeneous shapes; the aggregator normalizes them into [`Finding`]
//! before deduplication and severity counting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Severity of a single finding.
///
/// Ordinal rank runs critical < moderate < minor, i.e. `Critical` is the
/// highest-priority rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Must be fixed before the change proceeds.
    Critical,
    /// Should be fixed; does not block on its own.
    Moderate,
    /// Cosmetic or low-impact.
    Minor,
}

impl Severity {
    /// Ordinal rank with `Critical` at 0.
    pub fn rank(self) -> u8 {
        match self {
            Self::Critical => 0,
            Self::Moderate => 1,
            Self::Minor => 2,
        }
    }

    /// Parse a severity from an agent-supplied string, defaulting unknown
    /// values to `Minor`.
    pub fn parse_lenient(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "critical" => Self::Critical,
            "moderate" | "major" | "medium" => Self::Moderate,
            _ => Self::Minor,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Critical => "critical",
            Self::Moderate => "moderate",
            Self::Minor => "minor",
        };
        write!(f, "{s}")
    }
}

/// Session-level verdict, derived purely from finding severity counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Recommendation {
    /// No findings of consequence.
    Pass,
    /// Moderate findings present; proceed with caution.
    Warn,
    /// Critical findings present; the change must not proceed.
    Block,
}

impl Recommendation {
    /// Derive the verdict from severity counts.
    ///
    /// Any critical finding blocks; otherwise any moderate finding warns;
    /// otherwise pass. This is the only way a recommendation is produced.
    pub fn derive(critical: usize, moderate: usize) -> Self {
        if critical > 0 {
            Self::Block
        } else if moderate > 0 {
            Self::Warn
        } else {
            Self::Pass
        }
    }
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pass => "PASS",
            Self::Warn => "WARN",
            Self::Block => "BLOCK",
        };
        write!(f, "{s}")
    }
}

/// A single detected discrepancy between expected and actual behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    /// Stable identifier for cross-referencing.
    pub finding_id: String,

    /// Severity rank.
    pub severity: Severity,

    /// Category string (behavioral|contract|regression|semantic, or any
    /// agent-supplied tag).
    pub category: String,

    /// Endpoint or file the finding applies to.
    pub endpoint: String,

    /// The kind of test that produced this finding.
    pub test_type: String,

    /// Short human-readable title.
    pub title: String,

    /// Longer description of the discrepancy.
    #[serde(default)]
    pub description: String,

    /// Expected behavior, as an opaque structured blob.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<serde_json::Value>,

    /// Observed behavior, as an opaque structured blob.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<serde_json::Value>,

    /// Supporting evidence (request/response captures, diffs, logs).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<serde_json::Value>,

    /// Suggested remediation text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,

    /// Session that produced this finding, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    /// When the finding was recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Finding {
    /// Create a finding with a generated id and the current timestamp.
    pub fn new(
        severity: Severity,
        category: impl Into<String>,
        endpoint: impl Into<String>,
        test_type: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            finding_id: format!("finding-{}", Uuid::new_v4()),
            severity,
            category: category.into(),
            endpoint: endpoint.into(),
            test_type: test_type.into(),
            title: title.into(),
            description: String::new(),
            expected: None,
            actual: None,
            evidence: None,
            recommendation: None,
            session_id: None,
            created_at: Some(Utc::now()),
        }
    }

    /// Deduplication key: (endpoint, stringified actual, title).
    ///
    /// Two findings with the same key count once during aggregation.
    pub fn dedup_key(&self) -> (String, String, String) {
        let actual = self
            .actual
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default();
        (self.endpoint.clone(), actual, self.title.clone())
    }

    /// Regression key: `endpoint:category:test_type`.
    ///
    /// Severity and title are intentionally excluded — two findings that
    /// differ only in severity collide under this key.
    pub fn regression_key(&self) -> String {
        format!("{}:{}:{}", self.endpoint, self.category, self.test_type)
    }
}

/// Seed for a bug investigation derived from a session's findings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BugInvestigation {
    /// Deterministic id: `qa-bug-<last6(session_id)>-<3-digit index>`.
    pub bug_id: String,

    /// Session the finding came from.
    pub session_id: String,

    /// The finding seeding the investigation.
    pub finding: Finding,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_recommendation_derivation() {
        assert_eq!(Recommendation::derive(0, 0), Recommendation::Pass);
        assert_eq!(Recommendation::derive(0, 3), Recommendation::Warn);
        assert_eq!(Recommendation::derive(1, 0), Recommendation::Block);
        // Critical wins regardless of moderate count
        assert_eq!(Recommendation::derive(1, 99), Recommendation::Block);
    }

    #[test]
    fn test_severity_rank_ordering() {
        assert!(Severity::Critical.rank() < Severity::Moderate.rank());
        assert!(Severity::Moderate.rank() < Severity::Minor.rank());
    }

    #[test]
    fn test_severity_lenient_parse() {
        assert_eq!(Severity::parse_lenient("CRITICAL"), Severity::Critical);
        assert_eq!(Severity::parse_lenient("major"), Severity::Moderate);
        assert_eq!(Severity::parse_lenient("whatever"), Severity::Minor);
    }

    #[test]
    fn test_dedup_key_uses_stringified_actual() {
        let mut a = Finding::new(
            Severity::Moderate,
            "behavioral",
            "/api/users",
            "behavioral",
            "status mismatch",
        );
        a.actual = Some(json!({"status": 500}));

        let mut b = a.clone();
        b.finding_id = "finding-other".to_string();
        assert_eq!(a.dedup_key(), b.dedup_key());

        b.actual = Some(json!({"status": 404}));
        assert_ne!(a.dedup_key(), b.dedup_key());
    }

    #[test]
    fn test_regression_key_ignores_severity() {
        let a = Finding::new(
            Severity::Critical,
            "error",
            "/api/x",
            "behavioral",
            "boom",
        );
        let mut b = a.clone();
        b.severity = Severity::Minor;
        b.title = "different title".to_string();
        assert_eq!(a.regression_key(), b.regression_key());
        assert_eq!(a.regression_key(), "/api/x:error:behavioral");
    }
}
