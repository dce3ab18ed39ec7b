//! CLI module
//!
//! Subcommands:
//! - `serve`: run the API server
//! - `check-config`: load and validate configuration without serving

pub mod check;
pub mod serve;

use clap::{Parser, Subcommand};

/// Private API server with request monitoring and database log shipping
#[derive(Parser)]
#[command(name = "private-api")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the API server (default)
    Serve,

    /// Validate configuration and print the resolved settings
    CheckConfig,
}
