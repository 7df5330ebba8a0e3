//! `qaswarm sessions` command.

use anyhow::Result;
use clap::Args;

use crate::cli::output::TableFormatter;

use super::build_orchestrator;

#[derive(Args, Debug)]
pub struct SessionsArgs {
    /// Maximum number of sessions to display
    #[arg(short, long, default_value = "20")]
    pub limit: usize,
}

pub async fn execute(args: SessionsArgs, json_mode: bool) -> Result<()> {
    let orchestrator = build_orchestrator()?;
    let sessions = orchestrator.list_sessions(args.limit)?;

    if json_mode {
        println!("{}", serde_json::to_string_pretty(&sessions)?);
    } else if sessions.is_empty() {
        println!("No sessions recorded.");
    } else {
        println!("{}", TableFormatter::new().format_sessions(&sessions));
    }
    Ok(())
}
