//! Recording adapter for the `File` port.

use std::io::{self, SeekFrom};
use std::sync::{Arc, Mutex};

use serde::Serialize;

use super::{record_interaction, record_result};
use crate::cassette::format::Payload;
use crate::cassette::recorder::CassetteRecorder;
use crate::ports::{File, FileInfo};

/// Records file-handle interactions while delegating to an inner handle.
///
/// `name` is answered by the inner handle without being recorded; replaying
/// handles know their name from the open call.
pub struct RecordingFile {
    inner: Box<dyn File>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingFile {
    /// Creates a new recording handle wrapping the given implementation.
    pub fn new(inner: Box<dyn File>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

#[derive(Serialize)]
struct LenInput {
    len: usize,
}

#[derive(Serialize)]
struct LenAtInput {
    len: usize,
    offset: u64,
}

#[derive(Serialize)]
struct DataInput {
    data: Payload,
}

#[derive(Serialize)]
struct DataAtInput {
    data: Payload,
    offset: u64,
}

#[derive(Serialize)]
struct ReadOutput {
    data: Payload,
}

#[derive(Serialize)]
struct CountInput {
    count: Option<usize>,
}

fn read_output(result: &io::Result<usize>, buf: &[u8]) -> Result<ReadOutput, String> {
    match result {
        Ok(n) => Ok(ReadOutput { data: Payload::from_bytes(&buf[..*n]) }),
        Err(e) => Err(e.to_string()),
    }
}

impl File for RecordingFile {
    fn close(&mut self) -> io::Result<()> {
        let result = self.inner.close();
        record_result(&self.recorder, "file", "close", &(), &result);
        result
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let result = self.inner.read(buf);
        let input = LenInput { len: buf.len() };
        record_result(&self.recorder, "file", "read", &input, &read_output(&result, buf));
        result
    }

    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        let result = self.inner.read_at(buf, offset);
        let input = LenAtInput { len: buf.len(), offset };
        record_result(&self.recorder, "file", "read_at", &input, &read_output(&result, buf));
        result
    }

    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let result = self.inner.seek(pos);
        let input = match pos {
            SeekFrom::Start(n) => serde_json::json!({ "start": n }),
            SeekFrom::End(n) => serde_json::json!({ "end": n }),
            SeekFrom::Current(n) => serde_json::json!({ "current": n }),
        };
        record_result(&self.recorder, "file", "seek", &input, &result);
        result
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let result = self.inner.write(buf);
        let input = DataInput { data: Payload::from_bytes(buf) };
        record_result(&self.recorder, "file", "write", &input, &result);
        result
    }

    fn write_at(&self, buf: &[u8], offset: u64) -> io::Result<usize> {
        let result = self.inner.write_at(buf, offset);
        let input = DataAtInput { data: Payload::from_bytes(buf), offset };
        record_result(&self.recorder, "file", "write_at", &input, &result);
        result
    }

    fn name(&self) -> String {
        self.inner.name()
    }

    fn chdir(&self) -> io::Result<()> {
        let result = self.inner.chdir();
        record_result(&self.recorder, "file", "chdir", &(), &result);
        result
    }

    fn chmod(&self, mode: u32) -> io::Result<()> {
        let result = self.inner.chmod(mode);
        record_result(&self.recorder, "file", "chmod", &serde_json::json!({ "mode": mode }), &result);
        result
    }

    fn chown(&self, uid: u32, gid: u32) -> io::Result<()> {
        let result = self.inner.chown(uid, gid);
        let input = serde_json::json!({ "uid": uid, "gid": gid });
        record_result(&self.recorder, "file", "chown", &input, &result);
        result
    }

    fn stat(&self) -> io::Result<FileInfo> {
        let result = self.inner.stat();
        record_result(&self.recorder, "file", "stat", &(), &result);
        result
    }

    fn write_string(&mut self, s: &str) -> io::Result<usize> {
        let result = self.inner.write_string(s);
        let input = DataInput { data: Payload::Text(s.to_string()) };
        record_result(&self.recorder, "file", "write_string", &input, &result);
        result
    }

    fn sync(&mut self) -> io::Result<()> {
        let result = self.inner.sync();
        record_result(&self.recorder, "file", "sync", &(), &result);
        result
    }

    fn truncate(&mut self, size: u64) -> io::Result<()> {
        let result = self.inner.truncate(size);
        record_result(&self.recorder, "file", "truncate", &serde_json::json!({ "size": size }), &result);
        result
    }

    fn read_dir(&mut self, count: Option<usize>) -> io::Result<Vec<FileInfo>> {
        let result = self.inner.read_dir(count);
        record_result(&self.recorder, "file", "read_dir", &CountInput { count }, &result);
        result
    }

    fn read_dir_names(&mut self, count: Option<usize>) -> io::Result<Vec<String>> {
        let result = self.inner.read_dir_names(count);
        record_result(&self.recorder, "file", "read_dir_names", &CountInput { count }, &result);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::live::LiveFile;
    use crate::cassette::format::Cassette;
    use serde_json::json;

    #[test]
    fn records_writes_and_close() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let cassette_path = dir.path().join("file.cassette.yaml");
        let native = std::fs::File::create(&path).unwrap();

        let recorder = Arc::new(Mutex::new(CassetteRecorder::new(&cassette_path, "test", "abc")));

        // Scope the adapter so it's dropped before we try to unwrap
        {
            let mut file =
                RecordingFile::new(Box::new(LiveFile::new(&path, native)), Arc::clone(&recorder));
            assert_eq!(file.write_string("hi there").unwrap(), 8);
            file.write(&[0xff, 0xfe]).unwrap();
            file.close().unwrap();
        }

        let recorder = Arc::try_unwrap(recorder).unwrap().into_inner().unwrap();
        recorder.finish().unwrap();

        let cassette = Cassette::load(&cassette_path).unwrap();
        let methods: Vec<&str> = cassette.interactions.iter().map(|i| i.method.as_str()).collect();
        assert_eq!(methods, vec!["write_string", "write", "close"]);
        assert_eq!(cassette.interactions[0].input, json!({"data": "hi there"}));
        assert_eq!(cassette.interactions[0].output, json!({"ok": 8}));
        assert_eq!(cassette.interactions[1].input, json!({"data": [255, 254]}));
        assert_eq!(cassette.interactions[2].output, json!({"ok": null}));
        assert_eq!(std::fs::read(&path).unwrap(), b"hi there\xff\xfe");
    }

    #[test]
    fn records_read_failures() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.txt");
        std::fs::write(&path, "abc").unwrap();
        let native = std::fs::File::open(&path).unwrap();
        let recorder = Arc::new(Mutex::new(CassetteRecorder::new(
            dir.path().join("file.cassette.yaml"),
            "test",
            "abc",
        )));

        let mut file = RecordingFile::new(Box::new(LiveFile::new(&path, native)), Arc::clone(&recorder));
        file.close().unwrap();
        let mut buf = [0u8; 3];
        assert!(file.read(&mut buf).is_err());

        assert_eq!(recorder.lock().unwrap().len(), 2);
    }
}
