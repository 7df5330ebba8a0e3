//! `qaswarm test` command.

use anyhow::Result;
use clap::Args;
use console::style;

use crate::domain::models::{Depth, Trigger};

use super::build_orchestrator;
use crate::cli::output::print_session;

#[derive(Args, Debug)]
pub struct TestArgs {
    /// Endpoint (`/`-prefixed path) or source file to test
    pub target: String,

    /// Force a depth instead of letting the selector choose
    #[arg(short, long)]
    pub depth: Option<Depth>,

    /// What initiated this session
    #[arg(short, long, default_value = "user-command")]
    pub trigger: String,

    /// Base URL of the system under test
    #[arg(short, long)]
    pub base_url: Option<String>,

    /// Per-request agent timeout in seconds
    #[arg(long)]
    pub timeout_seconds: Option<u64>,
}

pub async fn execute(args: TestArgs, json_mode: bool) -> Result<()> {
    let trigger = parse_trigger(&args.trigger)?;
    let orchestrator = build_orchestrator()?;

    let session = orchestrator
        .test(
            &args.target,
            args.depth,
            trigger,
            args.base_url,
            args.timeout_seconds,
        )
        .await?;

    if json_mode {
        println!("{}", serde_json::to_string_pretty(&session)?);
    } else {
        println!(
            "{} {} ({})",
            style("Session").bold(),
            session.session_id,
            session.status
        );
        print_session(&session);
    }
    Ok(())
}

fn parse_trigger(s: &str) -> Result<Trigger> {
    match s {
        "post-verification" => Ok(Trigger::PostVerification),
        "bug-reproduction" => Ok(Trigger::BugReproduction),
        "user-command" => Ok(Trigger::UserCommand),
        "pre-merge" => Ok(Trigger::PreMerge),
        other => anyhow::bail!(
            "unknown trigger: {other} (expected post-verification|bug-reproduction|user-command|pre-merge)"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_parsing() {
        assert_eq!(parse_trigger("pre-merge").unwrap(), Trigger::PreMerge);
        assert_eq!(
            parse_trigger("bug-reproduction").unwrap(),
            Trigger::BugReproduction
        );
        assert!(parse_trigger("nope").is_err());
    }
}
