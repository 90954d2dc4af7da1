//! Runtime configuration read from the environment.
//!
//! | Variable | Meaning |
//! |---|---|
//! | `OSPORT_RECORD` | directory to record per-port cassettes into |
//! | `OSPORT_REPLAY` | cassette file, or session directory, to replay from |
//! | `OSPORT_MIN_SIZE` | minimum file size accepted by `read` |
//! | `OSPORT_LOG` | `tracing` filter directive, default `warn` |
//!
//! The binary loads a `.env` file first, so any of these can live there.

use std::path::PathBuf;

use crate::ports::Os;
use crate::reader::DEFAULT_MIN_SIZE;

/// Environment variable naming the recording directory.
pub const RECORD_VAR: &str = "OSPORT_RECORD";
/// Environment variable naming the cassette to replay.
pub const REPLAY_VAR: &str = "OSPORT_REPLAY";
/// Environment variable overriding the reader's minimum size.
pub const MIN_SIZE_VAR: &str = "OSPORT_MIN_SIZE";
/// Environment variable holding the log filter.
pub const LOG_VAR: &str = "OSPORT_LOG";

const DEFAULT_LOG_FILTER: &str = "warn";

/// Where port interactions come from and go to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Mode {
    /// Talk to the real OS.
    #[default]
    Live,
    /// Talk to the real OS and record every call under this directory.
    Record(PathBuf),
    /// Serve every call from this cassette file or session directory.
    Replay(PathBuf),
}

/// Settings for one run of the binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Adapter selection.
    pub mode: Mode,
    /// Minimum file size accepted by the reader.
    pub min_size: u64,
    /// `tracing` filter directive.
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self { mode: Mode::Live, min_size: DEFAULT_MIN_SIZE, log_filter: DEFAULT_LOG_FILTER.into() }
    }
}

impl Config {
    /// Reads the configuration through `os`.
    ///
    /// Empty variables count as unset.
    ///
    /// # Errors
    ///
    /// Returns an error if both recording and replaying are requested or if
    /// the minimum size is not a non-negative integer.
    pub fn from_os(os: &dyn Os) -> Result<Self, String> {
        let var = |key: &str| os.lookup_env(key).filter(|v| !v.trim().is_empty());

        let mode = match (var(RECORD_VAR), var(REPLAY_VAR)) {
            (Some(_), Some(_)) => {
                return Err(format!("{RECORD_VAR} and {REPLAY_VAR} cannot both be set"));
            }
            (Some(dir), None) => Mode::Record(PathBuf::from(dir)),
            (None, Some(path)) => Mode::Replay(PathBuf::from(path)),
            (None, None) => Mode::Live,
        };

        let min_size = match var(MIN_SIZE_VAR) {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|e| format!("Invalid {MIN_SIZE_VAR} value {raw:?}: {e}"))?,
            None => DEFAULT_MIN_SIZE,
        };

        let log_filter = var(LOG_VAR).unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        Ok(Self { mode, min_size, log_filter })
    }
}
