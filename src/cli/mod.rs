//! Command line interface: the `serve` entry point plus the administrative
//! commands that create users, pairings, and labels.

pub mod commands;
pub mod output;
pub mod types;

pub use output::{handle_error, output, CommandOutput};
pub use types::{Cli, Commands};
