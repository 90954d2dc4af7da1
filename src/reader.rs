//! Whole-file content reader.
//!
//! Reads a named file through the `Os` port after a fixed chain of checks:
//!
//! 1. the name must not be empty,
//! 2. the file must be stat-able,
//! 3. it must be at least `min_size` bytes long,
//! 4. it must open,
//! 5. one read must fill a buffer of exactly the reported size.
//!
//! The first failing check decides the error. Short reads are not retried.

use std::io;
use std::path::Path;

use crate::ports::{File, Os};

/// Files smaller than this are rejected with [`ReadContentError::TooSmall`].
pub const DEFAULT_MIN_SIZE: u64 = 10;

/// Failure kinds of [`ContentReader::read`], without their payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The file name was empty.
    NoName,
    /// Metadata lookup failed.
    StatFailed,
    /// The file is below the minimum size.
    TooSmall,
    /// The file could not be opened.
    OpenFailed,
    /// The read call failed.
    ReadFailed,
    /// The read returned fewer bytes than the file size.
    PartialRead,
}

/// Why a file's content could not be returned.
///
/// Variants carrying an `io::Error` display exactly the underlying message.
#[derive(Debug, thiserror::Error)]
pub enum ReadContentError {
    /// The file name was empty.
    #[error("no name")]
    NoName,
    /// Metadata lookup failed.
    #[error("{0}")]
    StatFailed(#[source] io::Error),
    /// The file is below the minimum size.
    #[error("too small")]
    TooSmall,
    /// The file could not be opened.
    #[error("{0}")]
    OpenFailed(#[source] io::Error),
    /// The read call failed.
    #[error("{0}")]
    ReadFailed(#[source] io::Error),
    /// The read returned fewer bytes than the file size.
    #[error("partial read")]
    PartialRead,
}

impl ReadContentError {
    /// The failure kind.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoName => ErrorKind::NoName,
            Self::StatFailed(_) => ErrorKind::StatFailed,
            Self::TooSmall => ErrorKind::TooSmall,
            Self::OpenFailed(_) => ErrorKind::OpenFailed,
            Self::ReadFailed(_) => ErrorKind::ReadFailed,
            Self::PartialRead => ErrorKind::PartialRead,
        }
    }
}

/// Reads whole files through an injected `Os`.
#[derive(Clone, Copy)]
pub struct ContentReader<'a> {
    os: &'a dyn Os,
    min_size: u64,
}

impl<'a> ContentReader<'a> {
    /// Creates a reader using [`DEFAULT_MIN_SIZE`].
    #[must_use]
    pub fn new(os: &'a dyn Os) -> Self {
        Self { os, min_size: DEFAULT_MIN_SIZE }
    }

    /// Overrides the minimum accepted file size.
    #[must_use]
    pub fn with_min_size(mut self, min_size: u64) -> Self {
        self.min_size = min_size;
        self
    }

    /// The minimum accepted file size.
    #[must_use]
    pub fn min_size(&self) -> u64 {
        self.min_size
    }

    /// Returns the full content of `name`.
    ///
    /// The opened handle is closed before returning, whatever the outcome.
    ///
    /// # Errors
    ///
    /// Returns the first failed check as a [`ReadContentError`]. No partial
    /// content is ever returned.
    pub fn read(&self, name: &str) -> Result<Vec<u8>, ReadContentError> {
        if name.is_empty() {
            return Err(ReadContentError::NoName);
        }
        let path = Path::new(name);

        let info = self.os.stat(path).map_err(ReadContentError::StatFailed)?;
        tracing::debug!(name, size = info.size, "stat");
        if info.size < self.min_size {
            return Err(ReadContentError::TooSmall);
        }

        let mut file = OpenFile(self.os.open(path).map_err(ReadContentError::OpenFailed)?);

        let mut content = buffer(info.size).map_err(ReadContentError::ReadFailed)?;
        let size = content.len();
        let n = file.0.read(&mut content).map_err(ReadContentError::ReadFailed)?;
        if n < size {
            tracing::debug!(name, read = n, expected = size, "short read");
            return Err(ReadContentError::PartialRead);
        }

        Ok(content)
    }
}

/// Allocates a zeroed buffer of `size` bytes without aborting on failure.
fn buffer(size: u64) -> io::Result<Vec<u8>> {
    let len = usize::try_from(size).map_err(|_| {
        io::Error::new(io::ErrorKind::OutOfMemory, format!("{size} bytes do not fit in memory"))
    })?;
    let mut content = Vec::new();
    content
        .try_reserve_exact(len)
        .map_err(|e| io::Error::new(io::ErrorKind::OutOfMemory, e))?;
    content.resize(len, 0);
    Ok(content)
}

/// Closes the wrapped handle when it goes out of scope.
struct OpenFile(Box<dyn File>);

impl Drop for OpenFile {
    fn drop(&mut self) {
        if let Err(e) = self.0.close() {
            tracing::warn!(name = %self.0.name(), error = %e, "failed to close file");
        }
    }
}

/// Reads `name` with a default [`ContentReader`].
///
/// # Errors
///
/// See [`ContentReader::read`].
pub fn read_content(os: &dyn Os, name: &str) -> Result<Vec<u8>, ReadContentError> {
    ContentReader::new(os).read(name)
}
