//! File-handle port for operations on a single open file.

use std::io::{self, SeekFrom};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata describing a file or directory.
///
/// Obtained from `Os::stat`, `File::stat` or a directory listing. It is a
/// one-shot snapshot and is not kept in sync with the filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    /// Base name of the file.
    pub name: String,
    /// Length in bytes.
    pub size: u64,
    /// Permission bits.
    pub mode: u32,
    /// Whether the entry is a directory.
    pub is_dir: bool,
    /// Last modification time, when the platform reports one.
    #[serde(default)]
    pub modified: Option<DateTime<Utc>>,
}

impl FileInfo {
    /// Builds a `FileInfo` for `name` from native metadata.
    #[must_use]
    pub fn from_metadata(name: impl Into<String>, metadata: &std::fs::Metadata) -> Self {
        Self {
            name: name.into(),
            size: metadata.len(),
            mode: permission_bits(metadata),
            is_dir: metadata.is_dir(),
            modified: metadata.modified().ok().map(DateTime::<Utc>::from),
        }
    }
}

#[cfg(unix)]
fn permission_bits(metadata: &std::fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn permission_bits(metadata: &std::fs::Metadata) -> u32 {
    if metadata.permissions().readonly() {
        0o444
    } else {
        0o666
    }
}

/// An open file handle.
///
/// Every method maps onto one native operation on the handle obtained at
/// open time. Once `close` has succeeded, further calls fail.
pub trait File: Send {
    /// Releases the handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle was already closed or the flush fails.
    fn close(&mut self) -> io::Result<()>;

    /// Reads up to `buf.len()` bytes from the current position.
    ///
    /// A single call may return fewer bytes than requested.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying read fails.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Reads up to `buf.len()` bytes starting at `offset`, leaving the
    /// cursor untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying read fails or positional reads are
    /// unsupported on this platform.
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize>;

    /// Moves the cursor and returns the new absolute position.
    ///
    /// # Errors
    ///
    /// Returns an error if the seek target is invalid.
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64>;

    /// Writes `buf` at the current position and returns the bytes written.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying write fails.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Writes `buf` starting at `offset`, leaving the cursor untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying write fails or positional writes
    /// are unsupported on this platform.
    fn write_at(&self, buf: &[u8], offset: u64) -> io::Result<usize>;

    /// The name the file was opened with.
    fn name(&self) -> String;

    /// Makes this file, which must be a directory, the working directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is not a directory.
    fn chdir(&self) -> io::Result<()>;

    /// Changes the permission bits.
    ///
    /// # Errors
    ///
    /// Returns an error if the change is not permitted.
    fn chmod(&self, mode: u32) -> io::Result<()>;

    /// Changes the owning user and group.
    ///
    /// # Errors
    ///
    /// Returns an error if the change is not permitted or unsupported.
    fn chown(&self, uid: u32, gid: u32) -> io::Result<()>;

    /// Returns the handle's metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata cannot be read.
    fn stat(&self) -> io::Result<FileInfo>;

    /// Writes the UTF-8 bytes of `s` and returns the bytes written.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying write fails.
    fn write_string(&mut self, s: &str) -> io::Result<usize>;

    /// Flushes file contents and metadata to stable storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the flush fails.
    fn sync(&mut self) -> io::Result<()>;

    /// Truncates or extends the file to `size` bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is not writable.
    fn truncate(&mut self, size: u64) -> io::Result<()>;

    /// Lists directory entries, continuing where the previous call stopped.
    ///
    /// `None` returns every remaining entry. `Some(n)` returns at most `n`
    /// entries and fails with `UnexpectedEof` once nothing is left.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is not a directory or the listing is
    /// exhausted.
    fn read_dir(&mut self, count: Option<usize>) -> io::Result<Vec<FileInfo>>;

    /// Like `read_dir`, returning only entry names.
    ///
    /// # Errors
    ///
    /// Same as `read_dir`.
    fn read_dir_names(&mut self, count: Option<usize>) -> io::Result<Vec<String>>;
}

/// Error for operations on a handle that has already been closed.
pub(crate) fn closed_error() -> io::Error {
    io::Error::other("file already closed")
}
