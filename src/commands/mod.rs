//! Command dispatch and handlers.

pub mod env;
pub mod info;
pub mod read;

use std::io::Write;
use std::path::Path;

use crate::cassette::config::CassetteConfig;
use crate::cassette::session::RecordingSession;
use crate::cli::Command;
use crate::config::{Config, Mode};
use crate::context::ServiceContext;

/// Dispatch a parsed command to its handler, writing results to stdout.
///
/// In record mode all port interactions are recorded to per-port cassette
/// files in a fresh session directory; in replay mode they are served from
/// the configured cassette.
///
/// # Errors
///
/// Returns an error string if the context cannot be built or the selected
/// command handler fails.
pub fn dispatch(command: &Command, config: &Config) -> Result<(), String> {
    let (ctx, session) = match &config.mode {
        Mode::Live => (ServiceContext::live(), None),
        Mode::Record(root) => {
            let (ctx, session) = ServiceContext::recording_at(root)?;
            (ctx, Some(session))
        }
        Mode::Replay(path) => (replaying(path)?, None),
    };

    let stdout = std::io::stdout();
    let result = dispatch_with_context(command, &ctx, config, &mut stdout.lock());

    // Finish recording after command completes (even on error)
    if let Some(session) = session {
        drop(ctx);
        finish_recording(session)?;
    }

    result
}

/// Dispatch a command with the given service context and output sink.
///
/// # Errors
///
/// Returns an error string if the selected command handler fails.
pub fn dispatch_with_context(
    command: &Command,
    ctx: &ServiceContext,
    config: &Config,
    out: &mut dyn Write,
) -> Result<(), String> {
    match command {
        Command::Read { name, min_size } => {
            read::run_with_context(ctx, name, min_size.unwrap_or(config.min_size), out)
        }
        Command::Env { key } => env::run_with_context(ctx, key, out),
        Command::Info => info::run_with_context(ctx, out),
    }
}

/// Build a replaying context from a cassette file or a session directory.
fn replaying(path: &Path) -> Result<ServiceContext, String> {
    if path.is_dir() {
        ServiceContext::replaying_from(&CassetteConfig::from_dir(path))
    } else {
        ServiceContext::replaying(path)
    }
}

/// Finish a recording session and print the output directory.
fn finish_recording(session: RecordingSession) -> Result<(), String> {
    let output_dir = session.finish()?;
    eprintln!("Recording saved to: {}", output_dir.display());
    Ok(())
}
