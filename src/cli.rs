//! CLI argument definitions.
//!
//! A single entry point that starts the HTTP listener; no subcommands.

use clap::Parser;

use crate::config::{DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT};

/// Bootstrap Identity - identity API over PostgreSQL
#[derive(Parser, Debug)]
#[command(name = "bootstrap-identity")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Host to bind to
    #[arg(short = 'H', long, default_value = DEFAULT_SERVER_HOST, env = "SERVER_HOST")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_SERVER_PORT, env = "SERVER_PORT")]
    pub port: u16,
}
