//! Result aggregation: merge agent outputs into one [`SessionResult`].
//!
//! Agents return heterogeneous shapes — structured `findings` arrays or bare
//! semantic `issues` — which are normalized into [`Finding`]s, deduplicated
//! by the (endpoint, stringified actual, title) triple, and rolled up into
//! severity counts and a derived recommendation.

use std::collections::{BTreeMap, HashSet};

use chrono::Utc;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::domain::models::{Finding, Recommendation, SessionResult, Severity};
use crate::domain::ports::{AgentOutput, AgentRole};

/// Merge agent outputs, in dispatch order, into a session result.
///
/// `skipped_reasons` carries the per-agent failures recorded by the
/// dispatch wrapper; it is passed through untouched.
pub fn aggregate(
    session_id: &str,
    outputs: &[(AgentRole, AgentOutput)],
    skipped_reasons: BTreeMap<String, String>,
) -> SessionResult {
    let mut result = SessionResult::empty();
    result.skipped_reasons = skipped_reasons;

    let mut findings = Vec::new();
    for (role, output) in outputs {
        result.tests_run += output.count("tests_run");
        result.tests_passed += output.count("tests_passed");
        result.tests_failed += output.count("tests_failed");
        result.tests_skipped += output.count("tests_skipped");

        for raw in output.raw_findings() {
            if let Some(finding) = normalize_structured(&raw, *role, session_id) {
                findings.push(finding);
            }
        }
        for raw in output.raw_issues() {
            findings.push(synthesize_semantic(&raw, session_id));
        }
    }

    result.findings = dedup(findings);

    for finding in &result.findings {
        match finding.severity {
            Severity::Critical => result.critical_count += 1,
            Severity::Moderate => result.moderate_count += 1,
            Severity::Minor => result.minor_count += 1,
        }
    }
    result.recommendation = Recommendation::derive(result.critical_count, result.moderate_count);

    debug!(
        session_id,
        findings = result.findings.len(),
        critical = result.critical_count,
        moderate = result.moderate_count,
        recommendation = %result.recommendation,
        "aggregated agent outputs"
    );
    result
}

/// Drop duplicate findings by the dedup triple; first occurrence wins.
pub fn dedup(findings: Vec<Finding>) -> Vec<Finding> {
    let mut seen = HashSet::new();
    findings
        .into_iter()
        .filter(|f| seen.insert(f.dedup_key()))
        .collect()
}

/// Normalize one structured finding value, tolerating missing fields.
///
/// Non-object values are discarded — a malformed entry from an agent must
/// not abort aggregation of the rest.
fn normalize_structured(raw: &Value, role: AgentRole, session_id: &str) -> Option<Finding> {
    let obj = raw.as_object()?;
    let str_field = |key: &str| obj.get(key).and_then(Value::as_str).map(ToString::to_string);

    let severity = str_field("severity")
        .map_or(Severity::Minor, |s| Severity::parse_lenient(&s));
    let description = str_field("description").unwrap_or_default();
    let title = str_field("title")
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| {
            if description.is_empty() {
                "untitled finding".to_string()
            } else {
                description.clone()
            }
        });

    Some(Finding {
        finding_id: str_field("finding_id")
            .unwrap_or_else(|| format!("finding-{}", Uuid::new_v4())),
        severity,
        category: str_field("category").unwrap_or_else(|| role.as_str().to_string()),
        endpoint: str_field("endpoint").unwrap_or_default(),
        test_type: str_field("test_type").unwrap_or_else(|| role.as_str().to_string()),
        title,
        description,
        expected: obj.get("expected").cloned(),
        actual: obj.get("actual").cloned(),
        evidence: obj.get("evidence").cloned(),
        recommendation: str_field("recommendation"),
        session_id: Some(session_id.to_string()),
        created_at: Some(Utc::now()),
    })
}

/// Synthesize a finding from a bare semantic issue
/// (severity/description/suggestion only).
fn synthesize_semantic(raw: &Value, session_id: &str) -> Finding {
    let str_field = |key: &str| {
        raw.get(key)
            .and_then(Value::as_str)
            .map(ToString::to_string)
    };

    let description = str_field("description").unwrap_or_else(|| "semantic issue".to_string());
    let mut finding = Finding::new(
        str_field("severity").map_or(Severity::Minor, |s| Severity::parse_lenient(&s)),
        "semantic",
        str_field("endpoint").unwrap_or_default(),
        "semantic",
        description.clone(),
    );
    finding.description = description;
    finding.recommendation = str_field("suggestion");
    finding.session_id = Some(session_id.to_string());
    finding
}
