//! Service context owning the system-access port.

use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::adapters::live::LiveOs;
use crate::adapters::recording::RecordingOs;
use crate::adapters::replaying::ReplayingOs;
use crate::cassette::config::CassetteConfig;
use crate::cassette::format::Cassette;
use crate::cassette::recorder::CassetteRecorder;
use crate::cassette::session::{get_commit_hash, RecordingSession};
use crate::ports::os::Os;

/// Bundles the port trait object handed to commands.
///
/// Constructors wire up different adapter implementations (live, replaying,
/// recording). Code under test receives `&ctx.os` instead of reaching for a
/// process-wide handle.
pub struct ServiceContext {
    /// System access; files opened through it come from the same adapter
    /// family.
    pub os: Box<dyn Os>,
    /// Optional cassette recorder; written to disk on drop.
    recorder: Option<Arc<Mutex<CassetteRecorder>>>,
}

impl ServiceContext {
    /// Creates a live context talking to the real OS.
    #[must_use]
    pub fn live() -> Self {
        Self::with_os(Box::new(LiveOs))
    }

    /// Creates a context around any `Os` implementation.
    #[must_use]
    pub fn with_os(os: Box<dyn Os>) -> Self {
        Self { os, recorder: None }
    }

    /// Creates a recording context that writes one cassette file on drop.
    ///
    /// Uses live adapters for actual work. Both ports record into the file
    /// at `path`.
    #[must_use]
    pub fn recording(path: &Path) -> Self {
        let recorder =
            Arc::new(Mutex::new(CassetteRecorder::new(path, "osport-session", get_commit_hash())));
        let os = RecordingOs::new(Box::new(LiveOs), Arc::clone(&recorder), Arc::clone(&recorder));
        Self { os: Box::new(os), recorder: Some(recorder) }
    }

    /// Creates a recording context backed by a per-port session under `root`.
    ///
    /// The caller finishes the returned session once the context is done.
    ///
    /// # Errors
    ///
    /// Returns an error if the session directory cannot be created.
    pub fn recording_at(root: &Path) -> Result<(Self, RecordingSession), String> {
        let session = RecordingSession::new(root)?;
        let os = RecordingOs::new(
            Box::new(LiveOs),
            Arc::clone(&session.os),
            Arc::clone(&session.file),
        );
        Ok((Self::with_os(Box::new(os)), session))
    }

    /// Creates a replaying context from a monolithic cassette file.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be read or parsed.
    pub fn replaying(path: &Path) -> Result<Self, String> {
        let cassette = Cassette::load(path)?;
        Ok(Self::with_os(Box::new(ReplayingOs::from_cassette(&cassette))))
    }

    /// Creates a replaying context from per-port cassette files.
    ///
    /// Ports without a configured cassette panic with a clear message when
    /// called.
    ///
    /// # Errors
    ///
    /// Returns an error if any configured cassette file cannot be read or parsed.
    pub fn replaying_from(config: &CassetteConfig) -> Result<Self, String> {
        let replayers = config.load_all()?;
        Ok(Self::with_os(Box::new(ReplayingOs::new(replayers.os, replayers.file))))
    }
}

impl Drop for ServiceContext {
    fn drop(&mut self) {
        if let Some(recorder) = self.recorder.take() {
            let written = recorder
                .lock()
                .map_err(|e| e.to_string())
                .and_then(|r| r.flush().map_err(|e| e.to_string()));
            if let Err(e) = written {
                tracing::warn!(error = %e, "failed to write cassette");
            }
        }
    }
}
