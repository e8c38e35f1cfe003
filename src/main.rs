//! Cadence CLI entry point.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cadence::cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init(args) => cadence::cli::commands::init::execute(args, cli.json).await,
        Commands::Serve(args) => cadence::cli::commands::serve::execute(args, cli.json).await,
        Commands::User(command) => cadence::cli::commands::user::execute(command, cli.json).await,
        Commands::Pair(args) => cadence::cli::commands::pair::execute(args, cli.json).await,
        Commands::Label(command) => cadence::cli::commands::label::execute(command, cli.json).await,
    };

    if let Err(err) = result {
        cadence::cli::handle_error(err, cli.json);
    }
}
