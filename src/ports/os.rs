//! System-access port for process-wide operating-system calls.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::file::{File, FileInfo};

/// How `Os::open_file` should open a path.
///
/// Mirrors the flag word accepted by the native open call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct OpenFlags {
    /// Open for reading.
    pub read: bool,
    /// Open for writing.
    pub write: bool,
    /// Append on each write.
    pub append: bool,
    /// Create the file if it does not exist.
    pub create: bool,
    /// Create the file, failing if it already exists.
    pub create_new: bool,
    /// Truncate an existing file on open.
    pub truncate: bool,
}

impl OpenFlags {
    /// Flags used by `Os::open`.
    #[must_use]
    pub fn read_only() -> Self {
        Self { read: true, ..Self::default() }
    }

    /// Flags used by `Os::create`: read-write, created or truncated.
    #[must_use]
    pub fn create() -> Self {
        Self { read: true, write: true, create: true, truncate: true, ..Self::default() }
    }

    /// Translates the flags into native open options with the given mode.
    #[must_use]
    pub fn to_open_options(self, mode: u32) -> std::fs::OpenOptions {
        let mut options = std::fs::OpenOptions::new();
        options
            .read(self.read)
            .write(self.write)
            .append(self.append)
            .create(self.create)
            .create_new(self.create_new)
            .truncate(self.truncate);
        set_mode(&mut options, mode);
        options
    }
}

#[cfg(unix)]
fn set_mode(options: &mut std::fs::OpenOptions, mode: u32) {
    use std::os::unix::fs::OpenOptionsExt;
    options.mode(mode);
}

#[cfg(not(unix))]
fn set_mode(_options: &mut std::fs::OpenOptions, _mode: u32) {}

/// Provides access to the operating system.
///
/// Abstracting system access lets the same code run against the real OS,
/// a recording wrapper, or a replayed cassette in tests.
pub trait Os: Send + Sync {
    /// Returns the value of an environment variable, or an empty string if
    /// it is unset.
    fn getenv(&self, key: &str) -> String;

    /// Returns the value of an environment variable, or `None` if it is
    /// unset.
    fn lookup_env(&self, key: &str) -> Option<String>;

    /// Returns the host name reported by the kernel.
    ///
    /// # Errors
    ///
    /// Returns an error if the host name cannot be determined.
    fn hostname(&self) -> io::Result<String>;

    /// Creates or truncates `path` and opens it for reading and writing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created.
    fn create(&self, path: &Path) -> io::Result<Box<dyn File>>;

    /// Opens `path` for reading.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or cannot be opened.
    fn open(&self, path: &Path) -> io::Result<Box<dyn File>>;

    /// Opens `path` with explicit flags and a permission mode used on
    /// creation.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened with those flags.
    fn open_file(&self, path: &Path, flags: OpenFlags, mode: u32) -> io::Result<Box<dyn File>>;

    /// Returns metadata for `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the path does not exist or cannot be queried.
    fn stat(&self, path: &Path) -> io::Result<FileInfo>;

    /// Changes the working directory.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` is not an accessible directory.
    fn chdir(&self, path: &Path) -> io::Result<()>;

    /// Removes a file or an empty directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the path does not exist or cannot be removed.
    fn remove(&self, path: &Path) -> io::Result<()>;

    /// Returns the working directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the working directory is unavailable.
    fn getwd(&self) -> io::Result<PathBuf>;

    /// Returns the current process id.
    fn getpid(&self) -> u32;

    /// Returns the path of the running executable.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be resolved.
    fn executable(&self) -> io::Result<PathBuf>;

    /// Terminates the process with `code`.
    fn exit(&self, code: i32) -> !;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_match_native_open_modes() {
        let read = OpenFlags::read_only();
        assert!(read.read && !read.write && !read.create);

        let create = OpenFlags::create();
        assert!(create.write && create.create && create.truncate);
        assert!(!create.create_new && !create.append);
    }

    #[test]
    fn flags_round_trip_through_json() {
        let flags = OpenFlags { write: true, append: true, ..OpenFlags::default() };
        let value = serde_json::to_value(flags).unwrap();
        assert_eq!(value["append"], serde_json::json!(true));
        let back: OpenFlags = serde_json::from_value(value).unwrap();
        assert_eq!(back, flags);
    }
}
