//! Testable operating-system access.
//!
//! Every OS call the crate makes goes through the [`ports::Os`] and
//! [`ports::File`] traits. Adapters under [`adapters`] either talk to the
//! real system, record the calls to a YAML cassette, or replay a cassette
//! without touching the system. [`reader::ContentReader`] is the one piece of
//! logic built on top of them.

pub mod adapters;
pub mod cassette;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod logging;
pub mod ports;
pub mod reader;

use clap::Parser;

use crate::adapters::live::LiveOs;
use crate::config::Config;

pub use crate::reader::{read_content, ContentReader, ErrorKind, ReadContentError};

/// Run the CLI with the provided arguments.
///
/// # Errors
///
/// Returns an error string when argument parsing, configuration, or command
/// execution fails.
pub fn run<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = cli::Cli::try_parse_from(args).map_err(|err| err.to_string())?;
    let config = Config::from_os(&LiveOs)?;
    logging::init(&config.log_filter);
    tracing::debug!(?config, "configuration loaded");
    commands::dispatch(&cli.command, &config)
}
