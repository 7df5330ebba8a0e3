//! `qaswarm create-bugs` command: seed bug investigations from findings.

use anyhow::Result;
use clap::Args;
use console::style;

use crate::domain::models::Severity;

use super::build_orchestrator;

#[derive(Args, Debug)]
pub struct CreateBugsArgs {
    /// Session to seed investigations from
    pub session_id: String,

    /// Minimum severity included (critical|moderate|minor)
    #[arg(long, default_value = "moderate")]
    pub severity: String,
}

pub async fn execute(args: CreateBugsArgs, json_mode: bool) -> Result<()> {
    let threshold = Severity::parse_lenient(&args.severity);
    let orchestrator = build_orchestrator()?;
    let bugs = orchestrator.create_bug_investigations(&args.session_id, threshold)?;

    if json_mode {
        println!("{}", serde_json::to_string_pretty(&bugs)?);
        return Ok(());
    }

    if bugs.is_empty() {
        println!("No findings at or above {threshold} severity.");
        return Ok(());
    }

    println!(
        "{} {} investigation(s):",
        style("Seeded").green().bold(),
        bugs.len()
    );
    for bug in &bugs {
        println!("  {} [{}] {}", bug.bug_id, bug.finding.severity, bug.finding.title);
    }
    Ok(())
}
