//! Markdown rendering for session reports and bug-investigation documents.
//!
//! Reports are companions to the machine-readable `state.json`: regenerated
//! from it, never the other way around.

use std::fmt::Write as _;

use crate::domain::models::{BugInvestigation, Finding, Session, SessionResult};

/// Render the per-session findings report (`qa-report.md`).
pub fn render_session_report(session: &Session) -> String {
    let mut doc = String::new();

    let _ = writeln!(doc, "# QA Report: {}", session.session_id);
    let _ = writeln!(doc);
    let _ = writeln!(doc, "- **Trigger:** {}", session.trigger);
    let _ = writeln!(doc, "- **Depth:** {}", session.depth);
    let _ = writeln!(doc, "- **Status:** {}", session.status);
    let _ = writeln!(doc, "- **Cost:** ${:.2}", session.cost_usd);
    let _ = writeln!(
        doc,
        "- **Created:** {}",
        session.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    let Some(result) = &session.result else {
        let _ = writeln!(doc);
        let _ = writeln!(doc, "_No result recorded._");
        return doc;
    };

    let _ = writeln!(doc, "- **Recommendation:** {}", result.recommendation);
    let _ = writeln!(doc);

    render_summary(&mut doc, result);
    render_skips(&mut doc, result);

    if result.findings.is_empty() {
        let _ = writeln!(doc, "## Findings");
        let _ = writeln!(doc);
        let _ = writeln!(doc, "None.");
    } else {
        let _ = writeln!(doc, "## Findings ({})", result.findings.len());
        for finding in &result.findings {
            let _ = writeln!(doc);
            render_finding(&mut doc, finding);
        }
    }

    doc
}

/// Render the bug-investigation seed document (`qa-bugs.md`).
pub fn render_bugs_doc(session: &Session, bugs: &[BugInvestigation]) -> String {
    let mut doc = String::new();

    let _ = writeln!(doc, "# Bug Investigations: {}", session.session_id);
    let _ = writeln!(doc);
    let _ = writeln!(
        doc,
        "{} investigation(s) seeded from session findings.",
        bugs.len()
    );

    for bug in bugs {
        let _ = writeln!(doc);
        let _ = writeln!(doc, "## {}", bug.bug_id);
        let _ = writeln!(doc);
        render_finding(&mut doc, &bug.finding);
    }

    doc
}

fn render_summary(doc: &mut String, result: &SessionResult) {
    let _ = writeln!(doc, "## Summary");
    let _ = writeln!(doc);
    let _ = writeln!(
        doc,
        "| Run | Passed | Failed | Skipped | Critical | Moderate | Minor |"
    );
    let _ = writeln!(doc, "|----:|-------:|-------:|--------:|---------:|---------:|------:|");
    let _ = writeln!(
        doc,
        "| {} | {} | {} | {} | {} | {} | {} |",
        result.tests_run,
        result.tests_passed,
        result.tests_failed,
        result.tests_skipped,
        result.critical_count,
        result.moderate_count,
        result.minor_count,
    );
    let _ = writeln!(doc);

    if let Some(reason) = &result.partial_completion_reason {
        let _ = writeln!(doc, "> Partial completion: {reason}");
        let _ = writeln!(doc);
    }
}

fn render_skips(doc: &mut String, result: &SessionResult) {
    if result.skipped_reasons.is_empty() {
        return;
    }
    let _ = writeln!(doc, "## Skipped Agents");
    let _ = writeln!(doc);
    for (agent, reason) in &result.skipped_reasons {
        let _ = writeln!(doc, "- `{agent}`: {reason}");
    }
    let _ = writeln!(doc);
}

fn render_finding(doc: &mut String, finding: &Finding) {
    let _ = writeln!(
        doc,
        "### [{}] {}",
        finding.severity.to_string().to_uppercase(),
        finding.title
    );
    let _ = writeln!(doc);
    let _ = writeln!(doc, "- **Endpoint:** `{}`", finding.endpoint);
    let _ = writeln!(doc, "- **Category:** {}", finding.category);
    let _ = writeln!(doc, "- **Test type:** {}", finding.test_type);
    if !finding.description.is_empty() {
        let _ = writeln!(doc);
        let _ = writeln!(doc, "{}", finding.description);
    }

    for (label, value) in [
        ("Expected", &finding.expected),
        ("Actual", &finding.actual),
        ("Evidence", &finding.evidence),
    ] {
        if let Some(value) = value {
            let pretty =
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
            let _ = writeln!(doc);
            let _ = writeln!(doc, "**{label}:**");
            let _ = writeln!(doc);
            let _ = writeln!(doc, "```json");
            let _ = writeln!(doc, "{pretty}");
            let _ = writeln!(doc, "```");
        }
    }

    if let Some(rec) = &finding.recommendation {
        let _ = writeln!(doc);
        let _ = writeln!(doc, "**Suggested fix:** {rec}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{
        Depth, QaContext, Recommendation, Severity, Trigger,
    };
    use serde_json::json;

    fn completed_session() -> Session {
        let mut session = Session::new(Trigger::UserCommand, Depth::Standard, QaContext::default());

        let mut finding = Finding::new(
            Severity::Critical,
            "behavioral",
            "/api/users",
            "behavioral",
            "500 on GET",
        );
        finding.expected = Some(json!({"status": 200}));
        finding.actual = Some(json!({"status": 500, "body": "boom"}));

        let mut result = SessionResult::empty();
        result.tests_run = 3;
        result.tests_passed = 2;
        result.tests_failed = 1;
        result.findings = vec![finding];
        result.critical_count = 1;
        result.recommendation = Recommendation::Block;
        result
            .skipped_reasons
            .insert("contract".to_string(), "no agent registered".to_string());
        session.complete(result);
        session
    }

    #[test]
    fn test_report_contains_verdict_and_finding() {
        let session = completed_session();
        let report = render_session_report(&session);

        assert!(report.contains(&session.session_id));
        assert!(report.contains("**Recommendation:** BLOCK"));
        assert!(report.contains("[CRITICAL] 500 on GET"));
        assert!(report.contains("`/api/users`"));
        assert!(report.contains("\"status\": 500"));
        assert!(report.contains("`contract`: no agent registered"));
    }

    #[test]
    fn test_partial_reason_is_surfaced() {
        let mut session =
            Session::new(Trigger::UserCommand, Depth::Shallow, QaContext::default());
        session.complete_partial(SessionResult::partial("cost_limit: exceeded max_cost_usd"));

        let report = render_session_report(&session);
        assert!(report.contains("> Partial completion: cost_limit"));
        assert!(report.contains("None."));
    }

    #[test]
    fn test_bugs_doc_lists_every_investigation() {
        let session = completed_session();
        let finding = session.result.as_ref().unwrap().findings[0].clone();
        let bugs = vec![BugInvestigation {
            bug_id: "qa-bug-abc123-001".to_string(),
            session_id: session.session_id.clone(),
            finding,
        }];

        let doc = render_bugs_doc(&session, &bugs);
        assert!(doc.contains("## qa-bug-abc123-001"));
        assert!(doc.contains("1 investigation(s)"));
        assert!(doc.contains("[CRITICAL] 500 on GET"));
    }
}
