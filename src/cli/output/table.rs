//! Table output formatting for CLI commands
//!
//! Provides formatted table output for sessions and findings using
//! comfy-table. Supports color-coded cells and automatic column sizing.

use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table, presets};
use std::env;

use crate::domain::models::{Finding, Session, SessionStatus, Severity};

/// Table formatter for CLI output
pub struct TableFormatter {
    /// Whether to use colors in output
    use_colors: bool,
}

impl TableFormatter {
    /// Create a new table formatter
    pub fn new() -> Self {
        Self {
            use_colors: supports_color(),
        }
    }

    /// Format a list of sessions as a table
    pub fn format_sessions(&self, sessions: &[Session]) -> String {
        let mut table = self.create_base_table();

        table.set_header(vec![
            Cell::new("Session").add_attribute(Attribute::Bold),
            Cell::new("Trigger").add_attribute(Attribute::Bold),
            Cell::new("Depth").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
            Cell::new("Verdict").add_attribute(Attribute::Bold),
            Cell::new("Findings").add_attribute(Attribute::Bold),
            Cell::new("Cost").add_attribute(Attribute::Bold),
        ]);

        for session in sessions {
            let status_cell = if self.use_colors {
                Cell::new(session.status.to_string()).fg(status_color(session.status))
            } else {
                Cell::new(session.status.to_string())
            };

            let (verdict, findings) = session.result.as_ref().map_or_else(
                || ("-".to_string(), 0),
                |r| (r.recommendation.to_string(), r.findings.len()),
            );

            table.add_row(vec![
                Cell::new(&session.session_id),
                Cell::new(session.trigger.to_string()),
                Cell::new(session.depth.to_string()),
                status_cell,
                Cell::new(verdict),
                Cell::new(findings.to_string()),
                Cell::new(format!("${:.2}", session.cost_usd)),
            ]);
        }

        table.to_string()
    }

    /// Format a list of findings as a table
    pub fn format_findings(&self, findings: &[Finding]) -> String {
        let mut table = self.create_base_table();

        table.set_header(vec![
            Cell::new("Severity").add_attribute(Attribute::Bold),
            Cell::new("Endpoint").add_attribute(Attribute::Bold),
            Cell::new("Category").add_attribute(Attribute::Bold),
            Cell::new("Title").add_attribute(Attribute::Bold),
        ]);

        for finding in findings {
            let severity_cell = if self.use_colors {
                Cell::new(finding.severity.to_string()).fg(severity_color(finding.severity))
            } else {
                Cell::new(finding.severity.to_string())
            };

            table.add_row(vec![
                severity_cell,
                Cell::new(&finding.endpoint),
                Cell::new(&finding.category),
                Cell::new(truncate_text(&finding.title, 60)),
            ]);
        }

        table.to_string()
    }

    fn create_base_table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        table
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// Print a one-screen summary of a finished session to stdout.
pub fn print_session(session: &Session) {
    println!("  trigger: {}  depth: {}  cost: ${:.2}", session.trigger, session.depth, session.cost_usd);

    let Some(result) = &session.result else {
        if let Some(error) = &session.error {
            println!("  error: {error}");
        }
        return;
    };

    println!(
        "  tests: {} run, {} passed, {} failed  verdict: {}",
        result.tests_run, result.tests_passed, result.tests_failed, result.recommendation
    );

    if let Some(reason) = &result.partial_completion_reason {
        println!("  partial: {reason}");
    }
    for (agent, reason) in &result.skipped_reasons {
        println!("  skipped {agent}: {reason}");
    }
    if !result.findings.is_empty() {
        println!("{}", TableFormatter::new().format_findings(&result.findings));
    }
}

/// Check if the terminal supports color output
fn supports_color() -> bool {
    if env::var("NO_COLOR").is_ok() {
        return false;
    }
    if let Ok(term) = env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }
    true
}

fn status_color(status: SessionStatus) -> Color {
    match status {
        SessionStatus::Completed => Color::Green,
        SessionStatus::Running | SessionStatus::Pending => Color::Cyan,
        SessionStatus::CompletedPartial => Color::Yellow,
        SessionStatus::Failed | SessionStatus::Blocked => Color::Red,
    }
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Critical => Color::Red,
        Severity::Moderate => Color::Yellow,
        Severity::Minor => Color::Grey,
    }
}

/// Truncate text to a maximum byte length with ellipsis, cutting on a
/// char boundary so multibyte titles cannot split mid-character.
fn truncate_text(text: &str, max_len: usize) -> String {
    if text.len() <= max_len {
        return text.to_string();
    }
    let mut cut = max_len.saturating_sub(3);
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...", &text[..cut])
}
