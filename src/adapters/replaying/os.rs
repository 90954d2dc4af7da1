//! Replaying adapter for the `Os` port.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};

use super::file::ReplayingFile;
use super::{next_output, replay_result, replay_unit};
use crate::cassette::format::Cassette;
use crate::cassette::replayer::CassetteReplayer;
use crate::ports::{File, FileInfo, OpenFlags, Os};

/// Replays recorded system-access calls from a cassette.
///
/// Handles opened through this adapter replay `file` interactions from a
/// replayer shared by every handle.
pub struct ReplayingOs {
    replayer: Arc<Mutex<CassetteReplayer>>,
    file_replayer: Arc<Mutex<CassetteReplayer>>,
}

impl ReplayingOs {
    /// Creates a replaying adapter from separate `os` and `file` streams.
    #[must_use]
    pub fn new(replayer: CassetteReplayer, file_replayer: CassetteReplayer) -> Self {
        Self {
            replayer: Arc::new(Mutex::new(replayer)),
            file_replayer: Arc::new(Mutex::new(file_replayer)),
        }
    }

    /// Creates a replaying adapter serving both ports from one cassette.
    #[must_use]
    pub fn from_cassette(cassette: &Cassette) -> Self {
        let port = |name: &str| {
            CassetteReplayer::from_interactions(
                cassette.interactions.iter().filter(|i| i.port == name).cloned(),
            )
        };
        Self::new(port("os"), port("file"))
    }

    /// Interactions not yet replayed on either port.
    ///
    /// # Panics
    ///
    /// Panics if a replayer lock is poisoned.
    #[must_use]
    pub fn remaining(&self) -> Vec<String> {
        let mut pending = self.replayer.lock().expect("replayer lock poisoned").remaining();
        pending.extend(self.file_replayer.lock().expect("replayer lock poisoned").remaining());
        pending
    }

    fn output(&self, method: &str, input: &Value) -> Value {
        next_output(&self.replayer, "os", method, input)
    }

    fn opened(&self, path: &Path, method: &str, input: &Value) -> io::Result<Box<dyn File>> {
        let output = self.output(method, input);
        replay_result::<serde_json::Value>(&output, method)?;
        Ok(Box::new(ReplayingFile::new(path.display().to_string(), Arc::clone(&self.file_replayer))))
    }
}

fn path_input(path: &Path) -> Value {
    json!({ "path": path.display().to_string() })
}

impl Os for ReplayingOs {
    fn getenv(&self, key: &str) -> String {
        let output = self.output("getenv", &json!({ "key": key }));
        serde_json::from_value(output).expect("os::getenv: expected string output")
    }

    fn lookup_env(&self, key: &str) -> Option<String> {
        let output = self.output("lookup_env", &json!({ "key": key }));
        serde_json::from_value(output).expect("os::lookup_env: expected string or null output")
    }

    fn hostname(&self) -> io::Result<String> {
        replay_result(&self.output("hostname", &Value::Null), "os::hostname")
    }

    fn create(&self, path: &Path) -> io::Result<Box<dyn File>> {
        self.opened(path, "create", &path_input(path))
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn File>> {
        self.opened(path, "open", &path_input(path))
    }

    fn open_file(&self, path: &Path, flags: OpenFlags, mode: u32) -> io::Result<Box<dyn File>> {
        let input = json!({ "path": path.display().to_string(), "flags": flags, "mode": mode });
        self.opened(path, "open_file", &input)
    }

    fn stat(&self, path: &Path) -> io::Result<FileInfo> {
        replay_result(&self.output("stat", &path_input(path)), "os::stat")
    }

    fn chdir(&self, path: &Path) -> io::Result<()> {
        replay_unit(&self.output("chdir", &path_input(path)))
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        replay_unit(&self.output("remove", &path_input(path)))
    }

    fn getwd(&self) -> io::Result<PathBuf> {
        replay_result(&self.output("getwd", &Value::Null), "os::getwd")
    }

    fn getpid(&self) -> u32 {
        let output = self.output("getpid", &Value::Null);
        serde_json::from_value(output).expect("os::getpid: expected integer output")
    }

    fn executable(&self) -> io::Result<PathBuf> {
        replay_result(&self.output("executable", &Value::Null), "os::executable")
    }

    fn exit(&self, code: i32) -> ! {
        let _ = self.output("exit", &json!({ "code": code }));
        panic!("process exit requested with code {code}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cassette::format::Interaction;
    use chrono::Utc;

    fn make_os(interactions: Vec<(&str, &str, serde_json::Value)>) -> ReplayingOs {
        let cassette = Cassette {
            name: "test".into(),
            recorded_at: Utc::now(),
            commit: "abc".into(),
            interactions: interactions
                .into_iter()
                .enumerate()
                .map(|(seq, (port, method, output))| Interaction {
                    seq: seq as u64,
                    port: port.into(),
                    method: method.into(),
                    input: json!({}),
                    output,
                })
                .collect(),
        };
        ReplayingOs::from_cassette(&cassette)
    }

    #[test]
    fn replaying_stat_serves_recorded_metadata() {
        let os = make_os(vec![(
            "os",
            "stat",
            json!({"ok": {"name": "test.txt", "size": 11, "mode": 420, "is_dir": false}}),
        )]);
        let info = os.stat(Path::new("test.txt")).unwrap();
        assert_eq!(info.size, 11);
        assert!(os.remaining().is_empty());
    }

    #[test]
    fn replaying_stat_error() {
        let os = make_os(vec![("os", "stat", json!({"err": "stat error"}))]);
        let err = os.stat(Path::new("test.txt")).unwrap_err();
        assert_eq!(err.to_string(), "stat error");
    }

    #[test]
    fn opened_handles_replay_file_stream() {
        let os = make_os(vec![
            ("os", "open", json!({"ok": "test.txt"})),
            ("file", "read", json!({"ok": {"data": "hello"}})),
            ("file", "close", json!({"ok": null})),
        ]);

        let mut file = os.open(Path::new("test.txt")).unwrap();
        assert_eq!(file.name(), "test.txt");
        let mut buf = [0u8; 8];
        assert_eq!(file.read(&mut buf).unwrap(), 5);
        assert_eq!(os.remaining(), vec!["file::close#2"]);
        file.close().unwrap();
        assert!(os.remaining().is_empty());
    }

    #[test]
    fn replaying_env_and_process_queries() {
        let os = make_os(vec![
            ("os", "getenv", json!("")),
            ("os", "lookup_env", json!(null)),
            ("os", "lookup_env", json!("/home/test")),
            ("os", "hostname", json!({"ok": "build-box"})),
            ("os", "getpid", json!(4242)),
            ("os", "getwd", json!({"ok": "/work"})),
        ]);

        assert_eq!(os.getenv("MISSING"), "");
        assert_eq!(os.lookup_env("MISSING"), None);
        assert_eq!(os.lookup_env("HOME").as_deref(), Some("/home/test"));
        assert_eq!(os.hostname().unwrap(), "build-box");
        assert_eq!(os.getpid(), 4242);
        assert_eq!(os.getwd().unwrap(), PathBuf::from("/work"));
    }

    #[test]
    #[should_panic(expected = "process exit requested with code 3")]
    fn replaying_exit_panics_instead_of_exiting() {
        let os = make_os(vec![("os", "exit", json!(null))]);
        os.exit(3);
    }

    #[test]
    #[should_panic(expected = "os::open#1 was recorded with path=\"test.txt\"")]
    fn open_of_a_different_path_panics() {
        let cassette = Cassette {
            name: "test".into(),
            recorded_at: Utc::now(),
            commit: "abc".into(),
            interactions: vec![
                Interaction {
                    seq: 0,
                    port: "os".into(),
                    method: "stat".into(),
                    input: json!({"path": "test.txt"}),
                    output: json!({"ok": {"name": "test.txt", "size": 11, "mode": 420, "is_dir": false}}),
                },
                Interaction {
                    seq: 1,
                    port: "os".into(),
                    method: "open".into(),
                    input: json!({"path": "test.txt"}),
                    output: json!({"ok": "test.txt"}),
                },
            ],
        };
        let os = ReplayingOs::from_cassette(&cassette);
        os.stat(Path::new("test.txt")).unwrap();
        let _ = os.open(Path::new("elsewhere.txt"));
    }

    #[test]
    #[should_panic(expected = "Cassette exhausted")]
    fn unexpected_call_panics() {
        let os = make_os(vec![("os", "stat", json!({"err": "stat error"}))]);
        let _ = os.open(Path::new("test.txt"));
    }
}
