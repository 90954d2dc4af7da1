//! Cassette configuration for composable per-port replay.

use std::path::{Path, PathBuf};

use super::format::Cassette;
use super::replayer::CassetteReplayer;

/// File name of the `os` port cassette inside a session directory.
pub const OS_CASSETTE: &str = "os.cassette.yaml";
/// File name of the `file` port cassette inside a session directory.
pub const FILE_CASSETTE: &str = "file.cassette.yaml";

/// Per-port cassette file paths. Ports without a cassette path replay
/// nothing, so any call on them panics with a descriptive message.
#[derive(Debug, Clone, Default)]
pub struct CassetteConfig {
    /// Path to the system-access port cassette file.
    pub os: Option<PathBuf>,
    /// Path to the file-handle port cassette file.
    pub file: Option<PathBuf>,
}

/// Per-port replayers, each with its own interaction stream.
#[derive(Debug)]
pub struct PortReplayers {
    /// Replayer for the system-access port.
    pub os: CassetteReplayer,
    /// Replayer for the file-handle port.
    pub file: CassetteReplayer,
}

impl CassetteConfig {
    /// Returns a config where all port paths are `None`. Any port called
    /// during replay will panic because no cassette is loaded.
    #[must_use]
    pub fn panic_on_unspecified() -> Self {
        Self::default()
    }

    /// Config for a directory written by a recording session.
    ///
    /// Only cassette files that exist in `dir` are configured.
    #[must_use]
    pub fn from_dir(dir: &Path) -> Self {
        let existing = |name: &str| Some(dir.join(name)).filter(|p| p.is_file());
        Self { os: existing(OS_CASSETTE), file: existing(FILE_CASSETTE) }
    }

    /// Load a monolithic cassette file and create a single replayer.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_monolithic(path: &Path) -> Result<CassetteReplayer, String> {
        let cassette = Cassette::load(path)?;
        Ok(CassetteReplayer::new(&cassette))
    }

    /// Load all configured per-port cassette files and create replayers.
    ///
    /// # Errors
    ///
    /// Returns an error if any configured cassette file cannot be read or parsed.
    pub fn load_all(&self) -> Result<PortReplayers, String> {
        let load = |path: Option<&Path>| match path {
            Some(path) => Self::load_monolithic(path),
            None => Ok(CassetteReplayer::from_interactions(Vec::new())),
        };
        Ok(PortReplayers { os: load(self.os.as_deref())?, file: load(self.file.as_deref())? })
    }
}
