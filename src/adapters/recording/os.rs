//! Recording adapter for the `Os` port.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::Serialize;

use super::file::RecordingFile;
use super::{record_interaction, record_result};
use crate::cassette::recorder::CassetteRecorder;
use crate::ports::{File, FileInfo, OpenFlags, Os};

/// Records system-access interactions while delegating to an inner
/// implementation.
///
/// Handles returned by `create`, `open` and `open_file` are wrapped in a
/// `RecordingFile` writing to the file recorder.
pub struct RecordingOs {
    inner: Box<dyn Os>,
    recorder: Arc<Mutex<CassetteRecorder>>,
    file_recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingOs {
    /// Creates a recording wrapper writing `os` and `file` interactions to
    /// separate recorders. Pass the same recorder twice for one cassette.
    pub fn new(
        inner: Box<dyn Os>,
        recorder: Arc<Mutex<CassetteRecorder>>,
        file_recorder: Arc<Mutex<CassetteRecorder>>,
    ) -> Self {
        Self { inner, recorder, file_recorder }
    }

    fn wrap(&self, result: io::Result<Box<dyn File>>) -> io::Result<Box<dyn File>> {
        result.map(|file| {
            Box::new(RecordingFile::new(file, Arc::clone(&self.file_recorder))) as Box<dyn File>
        })
    }

    fn flush_all(&self) {
        for recorder in [&self.recorder, &self.file_recorder] {
            if let Ok(recorder) = recorder.lock() {
                if let Err(e) = recorder.flush() {
                    tracing::warn!(error = %e, "failed to write cassette before exit");
                }
            }
        }
    }
}

#[derive(Serialize)]
struct KeyInput<'a> {
    key: &'a str,
}

#[derive(Serialize)]
struct PathInput<'a> {
    path: &'a str,
}

#[derive(Serialize)]
struct OpenFileInput<'a> {
    path: &'a str,
    flags: OpenFlags,
    mode: u32,
}

#[derive(Serialize)]
struct ExitInput {
    code: i32,
}

fn opened_name(result: &io::Result<Box<dyn File>>) -> Result<String, &io::Error> {
    result.as_ref().map(|file| file.name())
}

impl Os for RecordingOs {
    fn getenv(&self, key: &str) -> String {
        let result = self.inner.getenv(key);
        record_interaction(&self.recorder, "os", "getenv", &KeyInput { key }, &result);
        result
    }

    fn lookup_env(&self, key: &str) -> Option<String> {
        let result = self.inner.lookup_env(key);
        record_interaction(&self.recorder, "os", "lookup_env", &KeyInput { key }, &result);
        result
    }

    fn hostname(&self) -> io::Result<String> {
        let result = self.inner.hostname();
        record_result(&self.recorder, "os", "hostname", &(), &result);
        result
    }

    fn create(&self, path: &Path) -> io::Result<Box<dyn File>> {
        let result = self.inner.create(path);
        let input = PathInput { path: &path.display().to_string() };
        record_result(&self.recorder, "os", "create", &input, &opened_name(&result));
        self.wrap(result)
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn File>> {
        let result = self.inner.open(path);
        let input = PathInput { path: &path.display().to_string() };
        record_result(&self.recorder, "os", "open", &input, &opened_name(&result));
        self.wrap(result)
    }

    fn open_file(&self, path: &Path, flags: OpenFlags, mode: u32) -> io::Result<Box<dyn File>> {
        let result = self.inner.open_file(path, flags, mode);
        let input = OpenFileInput { path: &path.display().to_string(), flags, mode };
        record_result(&self.recorder, "os", "open_file", &input, &opened_name(&result));
        self.wrap(result)
    }

    fn stat(&self, path: &Path) -> io::Result<FileInfo> {
        let result = self.inner.stat(path);
        let input = PathInput { path: &path.display().to_string() };
        record_result(&self.recorder, "os", "stat", &input, &result);
        result
    }

    fn chdir(&self, path: &Path) -> io::Result<()> {
        let result = self.inner.chdir(path);
        let input = PathInput { path: &path.display().to_string() };
        record_result(&self.recorder, "os", "chdir", &input, &result);
        result
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        let result = self.inner.remove(path);
        let input = PathInput { path: &path.display().to_string() };
        record_result(&self.recorder, "os", "remove", &input, &result);
        result
    }

    fn getwd(&self) -> io::Result<PathBuf> {
        let result = self.inner.getwd();
        record_result(&self.recorder, "os", "getwd", &(), &result);
        result
    }

    fn getpid(&self) -> u32 {
        let result = self.inner.getpid();
        record_interaction(&self.recorder, "os", "getpid", &(), &result);
        result
    }

    fn executable(&self) -> io::Result<PathBuf> {
        let result = self.inner.executable();
        record_result(&self.recorder, "os", "executable", &(), &result);
        result
    }

    fn exit(&self, code: i32) -> ! {
        record_interaction(&self.recorder, "os", "exit", &ExitInput { code }, &());
        // Nothing runs after exit, so the cassettes are written now.
        self.flush_all();
        self.inner.exit(code)
    }
}
