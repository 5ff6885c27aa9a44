//! CLI command definitions.

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Arguments for running the web server.
#[derive(Debug, Args)]
pub struct ServeCommand {
    /// Address to listen on (overrides `server.host`)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides `server.port`)
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Log command arguments.
#[derive(Debug, Args)]
pub struct LogCommand {
    /// Show at most this many entries
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}
