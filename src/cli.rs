//! CLI argument definitions.

use clap::{Parser, Subcommand};

/// Top-level CLI parser for `osport`.
#[derive(Debug, Parser)]
#[command(name = "osport", version, about = "Read files and query the OS through swappable ports")]
pub struct Cli {
    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the full content of a file.
    Read {
        /// File to read.
        name: String,
        /// Reject files smaller than this many bytes.
        #[arg(long)]
        min_size: Option<u64>,
    },
    /// Print the value of an environment variable.
    Env {
        /// Variable name.
        key: String,
    },
    /// Print host name, process id, working directory and executable path.
    Info,
}
