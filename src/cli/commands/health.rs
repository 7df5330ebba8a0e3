//! `qaswarm health` command.

use anyhow::Result;
use clap::Args;
use console::style;

use super::build_orchestrator;
use crate::cli::output::print_session;
use crate::domain::models::Recommendation;

#[derive(Args, Debug)]
pub struct HealthArgs {
    /// Base URL of the system under test
    #[arg(short, long)]
    pub base_url: Option<String>,
}

pub async fn execute(args: HealthArgs, json_mode: bool) -> Result<()> {
    let orchestrator = build_orchestrator()?;
    let session = orchestrator.health_check(args.base_url).await?;

    if json_mode {
        println!("{}", serde_json::to_string_pretty(&session)?);
        return Ok(());
    }

    let verdict = session
        .result
        .as_ref()
        .map_or(Recommendation::Block, |r| r.recommendation);
    let label = match verdict {
        Recommendation::Pass => style("healthy").green().bold(),
        Recommendation::Warn => style("degraded").yellow().bold(),
        Recommendation::Block => style("unhealthy").red().bold(),
    };
    println!("Service is {label} (session {})", session.session_id);
    print_session(&session);
    Ok(())
}
