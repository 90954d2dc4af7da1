//! Replaying adapter for the `File` port.

use std::io::{self, SeekFrom};
use std::sync::{Arc, Mutex};

use serde::Deserialize;
use serde_json::{json, Value};

use super::{next_output, replay_result, replay_unit};
use crate::cassette::format::Payload;
use crate::cassette::replayer::CassetteReplayer;
use crate::ports::{File, FileInfo};

/// Replays recorded file-handle calls from a cassette.
pub struct ReplayingFile {
    name: String,
    replayer: Arc<Mutex<CassetteReplayer>>,
}

impl ReplayingFile {
    /// Creates a handle named `name` replaying from a shared `file` stream.
    #[must_use]
    pub fn new(name: impl Into<String>, replayer: Arc<Mutex<CassetteReplayer>>) -> Self {
        Self { name: name.into(), replayer }
    }

    fn output(&self, method: &str, input: &Value) -> Value {
        next_output(&self.replayer, "file", method, input)
    }

    /// Copies replayed read data into `buf`, returning the bytes copied.
    fn fill(&self, method: &str, input: &Value, buf: &mut [u8]) -> io::Result<usize> {
        #[derive(Deserialize)]
        struct ReadOutput {
            data: Payload,
        }

        let output: ReadOutput = replay_result(&self.output(method, input), &format!("file::{method}"))?;
        let data = output.data.into_bytes();
        let n = data.len().min(buf.len());
        buf[..n].copy_from_slice(&data[..n]);
        Ok(n)
    }
}

impl File for ReplayingFile {
    fn close(&mut self) -> io::Result<()> {
        replay_unit(&self.output("close", &Value::Null))
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.fill("read", &json!({ "len": buf.len() }), buf)
    }

    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        self.fill("read_at", &json!({ "len": buf.len(), "offset": offset }), buf)
    }

    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let input = match pos {
            SeekFrom::Start(n) => json!({ "start": n }),
            SeekFrom::End(n) => json!({ "end": n }),
            SeekFrom::Current(n) => json!({ "current": n }),
        };
        replay_result(&self.output("seek", &input), "file::seek")
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let input = json!({ "data": Payload::from_bytes(buf) });
        replay_result(&self.output("write", &input), "file::write")
    }

    fn write_at(&self, buf: &[u8], offset: u64) -> io::Result<usize> {
        let input = json!({ "data": Payload::from_bytes(buf), "offset": offset });
        replay_result(&self.output("write_at", &input), "file::write_at")
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn chdir(&self) -> io::Result<()> {
        replay_unit(&self.output("chdir", &Value::Null))
    }

    fn chmod(&self, mode: u32) -> io::Result<()> {
        replay_unit(&self.output("chmod", &json!({ "mode": mode })))
    }

    fn chown(&self, uid: u32, gid: u32) -> io::Result<()> {
        replay_unit(&self.output("chown", &json!({ "uid": uid, "gid": gid })))
    }

    fn stat(&self) -> io::Result<FileInfo> {
        replay_result(&self.output("stat", &Value::Null), "file::stat")
    }

    fn write_string(&mut self, s: &str) -> io::Result<usize> {
        replay_result(&self.output("write_string", &json!({ "data": s })), "file::write_string")
    }

    fn sync(&mut self) -> io::Result<()> {
        replay_unit(&self.output("sync", &Value::Null))
    }

    fn truncate(&mut self, size: u64) -> io::Result<()> {
        replay_unit(&self.output("truncate", &json!({ "size": size })))
    }

    fn read_dir(&mut self, count: Option<usize>) -> io::Result<Vec<FileInfo>> {
        replay_result(&self.output("read_dir", &json!({ "count": count })), "file::read_dir")
    }

    fn read_dir_names(&mut self, count: Option<usize>) -> io::Result<Vec<String>> {
        let output = self.output("read_dir_names", &json!({ "count": count }));
        replay_result(&output, "file::read_dir_names")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cassette::format::Interaction;

    fn make_file(interactions: Vec<(&str, Value)>) -> ReplayingFile {
        make_file_with_inputs(
            interactions.into_iter().map(|(method, output)| (method, json!({}), output)).collect(),
        )
    }

    fn make_file_with_inputs(interactions: Vec<(&str, Value, Value)>) -> ReplayingFile {
        let replayer = CassetteReplayer::from_interactions(interactions.into_iter().enumerate().map(
            |(seq, (method, input, output))| Interaction {
                seq: seq as u64,
                port: "file".into(),
                method: method.into(),
                input,
                output,
            },
        ));
        ReplayingFile::new("test.txt", Arc::new(Mutex::new(replayer)))
    }

    #[test]
    fn read_fills_buffer_with_recorded_bytes() {
        let mut file = make_file(vec![("read", json!({"ok": {"data": "helloworldworldhello"}}))]);
        let mut buf = vec![0u8; 20];
        assert_eq!(file.read(&mut buf).unwrap(), 20);
        assert_eq!(buf, b"helloworldworldhello");
    }

    #[test]
    fn short_read_leaves_tail_untouched() {
        let mut file = make_file(vec![("read", json!({"ok": {"data": [104, 105]}}))]);
        let mut buf = vec![0u8; 4];
        assert_eq!(file.read(&mut buf).unwrap(), 2);
        assert_eq!(buf, vec![104, 105, 0, 0]);
    }

    #[test]
    fn read_error_carries_recorded_message() {
        let mut file = make_file(vec![("read", json!({"err": "read failed"}))]);
        let mut buf = [0u8; 4];
        assert_eq!(file.read(&mut buf).unwrap_err().to_string(), "read failed");
    }

    #[test]
    fn replays_listing_and_metadata() {
        let mut file = make_file(vec![
            ("read_dir_names", json!({"ok": ["a", "b"]})),
            ("stat", json!({"ok": {"name": "dir", "size": 0, "mode": 493, "is_dir": true}})),
            ("close", json!({"err": "file already closed"})),
        ]);

        assert_eq!(file.read_dir_names(None).unwrap(), vec!["a", "b"]);
        assert!(file.stat().unwrap().is_dir);
        assert_eq!(file.close().unwrap_err().to_string(), "file already closed");
    }

    #[test]
    fn recorded_arguments_are_checked() {
        let mut file = make_file_with_inputs(vec![
            ("read", json!({"len": 4}), json!({"ok": {"data": "abcd"}})),
            ("seek", json!({"start": 2}), json!({"ok": 2})),
            ("write_string", json!({"data": "hi"}), json!({"ok": 2})),
        ]);
        let mut buf = [0u8; 4];
        assert_eq!(file.read(&mut buf).unwrap(), 4);
        assert_eq!(file.seek(SeekFrom::Start(2)).unwrap(), 2);
        assert_eq!(file.write_string("hi").unwrap(), 2);
    }

    #[test]
    #[should_panic(expected = "file::read#0 was recorded with len=20 but called with len=27")]
    fn read_with_a_different_buffer_length_panics() {
        let mut file =
            make_file_with_inputs(vec![("read", json!({"len": 20}), json!({"ok": {"data": "x"}}))]);
        let mut buf = vec![0u8; 27];
        let _ = file.read(&mut buf);
    }
}
