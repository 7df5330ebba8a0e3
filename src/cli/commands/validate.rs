//! `qaswarm validate` command.

use anyhow::Result;
use clap::Args;
use console::style;

use crate::domain::models::Depth;

use super::build_orchestrator;
use crate::cli::output::print_session;

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Feature being validated
    pub feature_id: String,

    /// Issue number the feature closes
    pub issue_number: u64,

    /// Force a depth instead of letting the selector choose
    #[arg(short, long)]
    pub depth: Option<Depth>,
}

pub async fn execute(args: ValidateArgs, json_mode: bool) -> Result<()> {
    let orchestrator = build_orchestrator()?;
    let session = orchestrator
        .validate_issue(&args.feature_id, args.issue_number, args.depth)
        .await?;

    if json_mode {
        println!("{}", serde_json::to_string_pretty(&session)?);
    } else {
        println!(
            "{} {} / issue #{} -> session {}",
            style("Validated").green().bold(),
            args.feature_id,
            args.issue_number,
            session.session_id
        );
        print_session(&session);
    }
    Ok(())
}
