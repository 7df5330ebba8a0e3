//! QaSwarm CLI entry point.

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use qaswarm::cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Test(args) => qaswarm::cli::commands::test::execute(args, cli.json).await,
        Commands::Validate(args) => qaswarm::cli::commands::validate::execute(args, cli.json).await,
        Commands::Health(args) => qaswarm::cli::commands::health::execute(args, cli.json).await,
        Commands::Report(args) => qaswarm::cli::commands::report::execute(args, cli.json).await,
        Commands::Bugs(args) => qaswarm::cli::commands::bugs::execute(args, cli.json).await,
        Commands::CreateBugs(args) => {
            qaswarm::cli::commands::create_bugs::execute(args, cli.json).await
        }
        Commands::Sessions(args) => qaswarm::cli::commands::sessions::execute(args, cli.json).await,
    };

    if let Err(err) = result {
        qaswarm::cli::handle_error(err, cli.json);
    }
}
