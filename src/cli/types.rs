//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};

use crate::cli::commands::{
    init::InitArgs, label::LabelCommands, pair::PairArgs, serve::ServeArgs, user::UserCommands,
};

#[derive(Parser)]
#[command(name = "cadence")]
#[command(about = "Cadence - 1:1 meeting management server", long_about = None)]
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
    /// Initialize Cadence configuration and database
    Init(InitArgs),

    /// Run the HTTP API server
    Serve(ServeArgs),

    /// User administration commands
    #[command(subcommand)]
    User(UserCommands),

    /// Pair a leader with an IC
    Pair(PairArgs),

    /// Label administration commands
    #[command(subcommand)]
    Label(LabelCommands),
}
