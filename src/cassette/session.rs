//! Recording session managing per-port cassette recorders.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::Utc;

use super::config::{FILE_CASSETTE, OS_CASSETTE};
use super::recorder::CassetteRecorder;

/// Manages per-port `CassetteRecorder` instances for a recording session.
///
/// Each port gets its own recorder writing to a separate cassette file.
/// All cassettes are stored in a timestamped directory.
#[derive(Debug)]
pub struct RecordingSession {
    /// Recorder for system-access interactions.
    pub os: Arc<Mutex<CassetteRecorder>>,
    /// Recorder for file-handle interactions.
    pub file: Arc<Mutex<CassetteRecorder>>,
    /// Output directory containing all cassette files.
    output_dir: PathBuf,
}

impl RecordingSession {
    /// Create a new recording session in a timestamped directory under `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The cassette directory already exists
    /// - The directory cannot be created
    pub fn new(root: &Path) -> Result<Self, String> {
        let timestamp = Utc::now().format("%Y-%m-%dT%H-%M-%S%.3f").to_string();
        let output_dir = root.join(&timestamp);

        if output_dir.exists() {
            return Err(format!("Cassette directory already exists: {}", output_dir.display()));
        }

        std::fs::create_dir_all(&output_dir)
            .map_err(|e| format!("Failed to create cassette directory: {e}"))?;

        let commit = get_commit_hash();

        let make_recorder = |port: &str, file_name: &str| -> Arc<Mutex<CassetteRecorder>> {
            let path = output_dir.join(file_name);
            let name = format!("{timestamp}-{port}");
            Arc::new(Mutex::new(CassetteRecorder::new(path, name, &commit)))
        };

        Ok(Self {
            os: make_recorder("os", OS_CASSETTE),
            file: make_recorder("file", FILE_CASSETTE),
            output_dir,
        })
    }

    /// Directory the cassettes are written to.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Finish all recorders and write cassette files to disk.
    ///
    /// Adapters still holding the recorders may outlive the session; their
    /// later interactions are not written.
    ///
    /// # Errors
    ///
    /// Returns an error if any cassette file cannot be written.
    pub fn finish(self) -> Result<PathBuf, String> {
        fn finish_one(recorder: &Mutex<CassetteRecorder>, port: &str) -> Result<(), String> {
            let recorder =
                recorder.lock().map_err(|e| format!("Recorder lock for {port} poisoned: {e}"))?;
            recorder.flush().map_err(|e| format!("Failed to write {port} cassette: {e}"))
        }

        finish_one(&self.os, "os")?;
        finish_one(&self.file, "file")?;

        Ok(self.output_dir)
    }
}

/// Get the current git commit hash, or "unknown" with a warning if unavailable.
pub(crate) fn get_commit_hash() -> String {
    let hash = std::process::Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string());

    if let Some(h) = hash {
        h
    } else {
        tracing::warn!("could not get git commit hash, using 'unknown'");
        "unknown".to_string()
    }
}
