//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};

use crate::cli::commands::{
    bugs::BugsArgs, create_bugs::CreateBugsArgs, health::HealthArgs, report::ReportArgs,
    sessions::SessionsArgs, test::TestArgs, validate::ValidateArgs,
};

#[derive(Parser)]
#[command(name = "qaswarm")]
#[command(about = "QaSwarm - Adaptive QA Testing Orchestrator", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a QA session against an endpoint or file target
    Test(TestArgs),

    /// Validate a verified feature/issue pair
    Validate(ValidateArgs),

    /// Probe the well-known health endpoints
    Health(HealthArgs),

    /// Show the findings report for a session
    Report(ReportArgs),

    /// List findings across sessions
    Bugs(BugsArgs),

    /// Seed bug investigations from a session's findings
    CreateBugs(CreateBugsArgs),

    /// List recent QA sessions
    Sessions(SessionsArgs),
}
