//! Live system-access adapter using `std`.

use std::io;
use std::path::{Path, PathBuf};

use super::file::LiveFile;
use crate::ports::file::{File, FileInfo};
use crate::ports::os::{OpenFlags, Os};

/// Mode applied to files created through `Os::create`.
const CREATE_MODE: u32 = 0o666;

/// Live system access that passes every call to the host OS.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiveOs;

impl Os for LiveOs {
    fn getenv(&self, key: &str) -> String {
        self.lookup_env(key).unwrap_or_default()
    }

    fn lookup_env(&self, key: &str) -> Option<String> {
        std::env::var_os(key).map(|v| v.to_string_lossy().into_owned())
    }

    fn hostname(&self) -> io::Result<String> {
        gethostname::gethostname().into_string().map_err(|name| {
            io::Error::new(io::ErrorKind::InvalidData, format!("non-UTF-8 host name {name:?}"))
        })
    }

    fn create(&self, path: &Path) -> io::Result<Box<dyn File>> {
        self.open_file(path, OpenFlags::create(), CREATE_MODE)
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn File>> {
        self.open_file(path, OpenFlags::read_only(), 0)
    }

    fn open_file(&self, path: &Path, flags: OpenFlags, mode: u32) -> io::Result<Box<dyn File>> {
        let file = flags.to_open_options(mode).open(path)?;
        Ok(Box::new(LiveFile::new(path, file)))
    }

    fn stat(&self, path: &Path) -> io::Result<FileInfo> {
        let metadata = std::fs::metadata(path)?;
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        Ok(FileInfo::from_metadata(name, &metadata))
    }

    fn chdir(&self, path: &Path) -> io::Result<()> {
        std::env::set_current_dir(path)
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        if std::fs::symlink_metadata(path)?.is_dir() {
            std::fs::remove_dir(path)
        } else {
            std::fs::remove_file(path)
        }
    }

    fn getwd(&self) -> io::Result<PathBuf> {
        std::env::current_dir()
    }

    fn getpid(&self) -> u32 {
        std::process::id()
    }

    fn executable(&self) -> io::Result<PathBuf> {
        std::env::current_exe()
    }

    fn exit(&self, code: i32) -> ! {
        std::process::exit(code)
    }
}
