//! Implementation of the `cadence serve` command.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use crate::adapters::http::{serve, AppState};
use crate::adapters::sqlite::initialize_database;
use crate::infrastructure::config::ConfigLoader;

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Config file to load instead of the hierarchical default
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override the configured port
    #[arg(long, short)]
    pub port: Option<u16>,
}

pub async fn execute(args: ServeArgs, _json_mode: bool) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let db_url = format!("sqlite:{}", config.database.path);
    let pool = initialize_database(&db_url)
        .await
        .context("Failed to initialize database")?;
    tracing::info!(path = %config.database.path, "database ready");

    let state = AppState::new(pool);
    serve(&config.server, state).await
}
