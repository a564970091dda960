//! Command-line argument parsing for taskrouter
//!
//! Provides clap-based CLI with subcommands and verbosity control.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// taskrouter - route free-text requests to agents and deterministic tools
#[derive(Parser, Debug)]
#[command(name = "taskrouter")]
#[command(version)]
#[command(about = "Route free-text requests to agents and deterministic tools", long_about = None)]
pub struct Args {
    /// Configuration file path (default: ~/.taskrouter/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level: default (info), -v (debug), -vv (trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the HTTP API
    Serve {
        /// Listen address, overrides server.bind
        #[arg(long)]
        bind: Option<String>,
    },

    /// Dispatch a single request and print the result
    Run {
        #[arg(value_name = "PROMPT")]
        prompt: String,
    },

    /// Interactive console
    Chat {
        /// Talk to the orchestrator or one agent directly
        #[arg(long, value_enum, default_value_t = ChatTarget::All)]
        agent: ChatTarget,
    },

    /// Create the employees table
    InitDb,

    /// Display current configuration (secrets masked)
    Config,
}

/// Who receives chat input
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ChatTarget {
    /// Route through the orchestrator
    All,
    /// Content agent only
    Content,
    /// Employee agent only
    Employee,
}

impl Args {
    /// Default tracing filter for the verbosity flags
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "taskrouter=info",
            1 => "taskrouter=debug",
            _ => "taskrouter=trace",
        }
    }
}
