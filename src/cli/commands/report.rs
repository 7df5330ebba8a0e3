//! `qaswarm report` command.

use anyhow::{Context, Result};
use clap::Args;

use crate::infrastructure::report::render_session_report;

use super::build_orchestrator;

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Session to report on
    pub session_id: String,
}

pub async fn execute(args: ReportArgs, json_mode: bool) -> Result<()> {
    let orchestrator = build_orchestrator()?;
    let session = orchestrator
        .get_session(&args.session_id)?
        .with_context(|| format!("session not found: {}", args.session_id))?;

    if json_mode {
        println!("{}", serde_json::to_string_pretty(&session)?);
    } else {
        print!("{}", render_session_report(&session));
    }
    Ok(())
}
