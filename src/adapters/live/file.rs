//! Live file handle backed by `std::fs::File`.

use std::io::{self, SeekFrom};
use std::path::PathBuf;

use crate::ports::file::{closed_error, File, FileInfo};

/// Live file handle delegating to the native handle obtained at open time.
#[derive(Debug)]
pub struct LiveFile {
    name: String,
    path: PathBuf,
    inner: Option<std::fs::File>,
    dir_cursor: usize,
}

impl LiveFile {
    /// Wraps a native handle opened from `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, file: std::fs::File) -> Self {
        let path = path.into();
        Self { name: path.display().to_string(), path, inner: Some(file), dir_cursor: 0 }
    }

    fn handle(&self) -> io::Result<&std::fs::File> {
        self.inner.as_ref().ok_or_else(closed_error)
    }

    fn handle_mut(&mut self) -> io::Result<&mut std::fs::File> {
        self.inner.as_mut().ok_or_else(closed_error)
    }

    fn list(&mut self, count: Option<usize>) -> io::Result<Vec<FileInfo>> {
        self.handle()?;
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(&self.path)? {
            let entry = entry?;
            let metadata = entry.metadata()?;
            entries.push(FileInfo::from_metadata(entry.file_name().to_string_lossy(), &metadata));
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        let remaining = entries.into_iter().skip(self.dir_cursor);
        let taken: Vec<FileInfo> = match count.filter(|&n| n > 0) {
            None => remaining.collect(),
            Some(n) => {
                let taken: Vec<FileInfo> = remaining.take(n).collect();
                if taken.is_empty() {
                    return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "end of directory"));
                }
                taken
            }
        };
        self.dir_cursor += taken.len();
        Ok(taken)
    }
}

impl File for LiveFile {
    fn close(&mut self) -> io::Result<()> {
        match self.inner.take() {
            Some(file) => {
                drop(file);
                Ok(())
            }
            None => Err(closed_error()),
        }
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        io::Read::read(self.handle_mut()?, buf)
    }

    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        native::read_at(self.handle()?, buf, offset)
    }

    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        io::Seek::seek(self.handle_mut()?, pos)
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::Write::write(self.handle_mut()?, buf)
    }

    fn write_at(&self, buf: &[u8], offset: u64) -> io::Result<usize> {
        native::write_at(self.handle()?, buf, offset)
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn chdir(&self) -> io::Result<()> {
        self.handle()?;
        std::env::set_current_dir(&self.path)
    }

    fn chmod(&self, mode: u32) -> io::Result<()> {
        native::chmod(self.handle()?, mode)
    }

    fn chown(&self, uid: u32, gid: u32) -> io::Result<()> {
        native::chown(self.handle()?, uid, gid)
    }

    fn stat(&self) -> io::Result<FileInfo> {
        let metadata = self.handle()?.metadata()?;
        let name = self
            .path
            .file_name()
            .map_or_else(|| self.name.clone(), |n| n.to_string_lossy().into_owned());
        Ok(FileInfo::from_metadata(name, &metadata))
    }

    fn write_string(&mut self, s: &str) -> io::Result<usize> {
        io::Write::write_all(self.handle_mut()?, s.as_bytes())?;
        Ok(s.len())
    }

    fn sync(&mut self) -> io::Result<()> {
        self.handle()?.sync_all()
    }

    fn truncate(&mut self, size: u64) -> io::Result<()> {
        self.handle()?.set_len(size)
    }

    fn read_dir(&mut self, count: Option<usize>) -> io::Result<Vec<FileInfo>> {
        self.list(count)
    }

    fn read_dir_names(&mut self, count: Option<usize>) -> io::Result<Vec<String>> {
        Ok(self.list(count)?.into_iter().map(|info| info.name).collect())
    }
}

/// Platform-specific handle operations.
#[cfg(unix)]
mod native {
    use std::io;
    use std::os::unix::fs::{FileExt, PermissionsExt};

    pub(super) fn read_at(file: &std::fs::File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        file.read_at(buf, offset)
    }

    pub(super) fn write_at(file: &std::fs::File, buf: &[u8], offset: u64) -> io::Result<usize> {
        file.write_at(buf, offset)
    }

    pub(super) fn chmod(file: &std::fs::File, mode: u32) -> io::Result<()> {
        file.set_permissions(std::fs::Permissions::from_mode(mode))
    }

    pub(super) fn chown(file: &std::fs::File, uid: u32, gid: u32) -> io::Result<()> {
        std::os::unix::fs::fchown(file, Some(uid), Some(gid))
    }
}

#[cfg(not(unix))]
mod native {
    use std::io;

    fn unsupported(op: &str) -> io::Error {
        io::Error::new(io::ErrorKind::Unsupported, format!("{op} is not supported on this platform"))
    }

    pub(super) fn read_at(_file: &std::fs::File, _buf: &mut [u8], _offset: u64) -> io::Result<usize> {
        Err(unsupported("read_at"))
    }

    pub(super) fn write_at(_file: &std::fs::File, _buf: &[u8], _offset: u64) -> io::Result<usize> {
        Err(unsupported("write_at"))
    }

    pub(super) fn chmod(file: &std::fs::File, mode: u32) -> io::Result<()> {
        let mut permissions = file.metadata()?.permissions();
        permissions.set_readonly(mode & 0o222 == 0);
        file.set_permissions(permissions)
    }

    pub(super) fn chown(_file: &std::fs::File, _uid: u32, _gid: u32) -> io::Result<()> {
        Err(unsupported("chown"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_rw(path: &std::path::Path) -> LiveFile {
        let file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .unwrap();
        LiveFile::new(path, file)
    }

    #[test]
    fn write_string_writes_the_whole_string() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.txt");
        let text = "0123456789".repeat(100_000);

        let mut file = open_rw(&path);
        assert_eq!(file.write_string(&text).unwrap(), text.len());
        file.close().unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), text);
    }

    #[test]
    fn write_seek_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.bin");
        let mut file = open_rw(&path);

        assert_eq!(file.write_string("hello world").unwrap(), 11);
        assert_eq!(file.seek(SeekFrom::Start(6)).unwrap(), 6);

        let mut buf = [0u8; 5];
        assert_eq!(file.read(&mut buf).unwrap(), 5);
        assert_eq!(&buf, b"world");
        file.close().unwrap();
    }

    #[test]
    fn truncate_and_stat() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grow.bin");
        let mut file = open_rw(&path);

        file.truncate(32).unwrap();
        file.sync().unwrap();
        let info = file.stat().unwrap();

        assert_eq!(info.name, "grow.bin");
        assert_eq!(info.size, 32);
    }

    #[cfg(unix)]
    #[test]
    fn positional_io_leaves_cursor_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pos.bin");
        let mut file = open_rw(&path);

        file.write(b"abcdef").unwrap();
        file.write_at(b"XY", 2).unwrap();

        let mut buf = [0u8; 4];
        assert_eq!(file.read_at(&mut buf, 1).unwrap(), 4);
        assert_eq!(&buf, b"bXYe");
        assert_eq!(file.seek(SeekFrom::Current(0)).unwrap(), 6);
    }

    #[test]
    fn operations_fail_after_close() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("closed.bin");
        let mut file = open_rw(&path);

        file.close().unwrap();

        let mut buf = [0u8; 1];
        let err = file.read(&mut buf).unwrap_err();
        assert_eq!(err.to_string(), "file already closed");
        assert!(file.close().is_err());
    }

    #[test]
    fn read_dir_pages_through_entries() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.txt", "b.txt", "c.txt"] {
            std::fs::write(dir.path().join(name), name).unwrap();
        }
        let handle = std::fs::File::open(dir.path()).unwrap();
        let mut listing = LiveFile::new(dir.path(), handle);

        assert_eq!(listing.read_dir_names(Some(2)).unwrap(), vec!["a.txt", "b.txt"]);
        let rest = listing.read_dir(None).unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].name, "c.txt");

        let err = listing.read_dir_names(Some(1)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[cfg(unix)]
    #[test]
    fn chmod_changes_permission_bits() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mode.bin");
        let file = open_rw(&path);

        file.chmod(0o600).unwrap();
        assert_eq!(file.stat().unwrap().mode, 0o600);
    }
}
