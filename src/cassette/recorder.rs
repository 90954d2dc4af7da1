//! Records interactions into a cassette file.

use std::path::{Path, PathBuf};

use chrono::Utc;

use super::format::{Cassette, Interaction};

/// Records interactions and writes them as a YAML cassette file.
#[derive(Debug)]
pub struct CassetteRecorder {
    path: PathBuf,
    name: String,
    commit: String,
    interactions: Vec<Interaction>,
    next_seq: u64,
}

impl CassetteRecorder {
    /// Create a new recorder that will write to the given path.
    pub fn new(
        path: impl Into<PathBuf>,
        name: impl Into<String>,
        commit: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            commit: commit.into(),
            interactions: Vec::new(),
            next_seq: 0,
        }
    }

    /// Path the cassette is written to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of interactions recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.interactions.len()
    }

    /// Whether nothing has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.interactions.is_empty()
    }

    /// Record an interaction. The `seq` field is assigned automatically.
    pub fn record(
        &mut self,
        port: impl Into<String>,
        method: impl Into<String>,
        input: serde_json::Value,
        output: serde_json::Value,
    ) {
        let interaction = Interaction {
            seq: self.next_seq,
            port: port.into(),
            method: method.into(),
            input,
            output,
        };
        self.next_seq += 1;
        self.interactions.push(interaction);
    }

    /// Write everything recorded so far to disk, keeping the recorder open.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn flush(&self) -> Result<(), std::io::Error> {
        let cassette = Cassette {
            name: self.name.clone(),
            recorded_at: Utc::now(),
            commit: self.commit.clone(),
            interactions: self.interactions.clone(),
        };
        let yaml = serde_yaml::to_string(&cassette).map_err(std::io::Error::other)?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, yaml)?;
        tracing::debug!(
            path = %self.path.display(),
            interactions = self.interactions.len(),
            "cassette written"
        );
        Ok(())
    }

    /// Finish recording and write the cassette YAML file to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn finish(self) -> Result<PathBuf, std::io::Error> {
        self.flush()?;
        Ok(self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_and_finish() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.cassette.yaml");

        let mut recorder = CassetteRecorder::new(&path, "test-recording", "deadbeef");
        recorder.record("os", "stat", json!({"path": "/a"}), json!({"ok": {"size": 1}}));
        recorder.record("os", "open", json!({"path": "/a"}), json!({"ok": "/a"}));
        recorder.record("file", "close", json!({}), json!({"ok": null}));
        assert_eq!(recorder.len(), 3);

        let result_path = recorder.finish().expect("finish should succeed");
        assert_eq!(result_path, path);

        let cassette = Cassette::load(&path).unwrap();
        assert_eq!(cassette.name, "test-recording");
        assert_eq!(cassette.commit, "deadbeef");
        assert_eq!(cassette.interactions.len(), 3);
        assert_eq!(cassette.interactions[0].seq, 0);
        assert_eq!(cassette.interactions[2].seq, 2);
        assert_eq!(cassette.interactions[0].port, "os");
        assert_eq!(cassette.interactions[2].port, "file");
    }

    #[test]
    fn flush_can_repeat_as_interactions_accumulate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("os.cassette.yaml");

        let mut recorder = CassetteRecorder::new(&path, "partial", "unknown");
        assert!(recorder.is_empty());
        recorder.flush().unwrap();
        assert!(Cassette::load(&path).unwrap().interactions.is_empty());

        recorder.record("os", "getpid", json!({}), json!(42));
        recorder.flush().unwrap();
        assert_eq!(Cassette::load(&path).unwrap().interactions.len(), 1);
    }
}
