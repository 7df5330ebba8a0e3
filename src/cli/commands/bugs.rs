//! `qaswarm bugs` command: list findings across sessions.

use anyhow::Result;
use clap::Args;

use crate::cli::output::TableFormatter;
use crate::domain::models::Severity;

use super::build_orchestrator;

#[derive(Args, Debug)]
pub struct BugsArgs {
    /// Restrict to one session
    #[arg(short, long)]
    pub session: Option<String>,

    /// Minimum severity (critical|moderate|minor)
    #[arg(long)]
    pub severity: Option<String>,
}

pub async fn execute(args: BugsArgs, json_mode: bool) -> Result<()> {
    let severity = args.severity.as_deref().map(Severity::parse_lenient);
    let orchestrator = build_orchestrator()?;
    let findings = orchestrator.get_findings(args.session.as_deref(), severity)?;

    if json_mode {
        println!("{}", serde_json::to_string_pretty(&findings)?);
    } else if findings.is_empty() {
        println!("No findings.");
    } else {
        println!("{}", TableFormatter::new().format_findings(&findings));
    }
    Ok(())
}
