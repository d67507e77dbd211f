use super::{check_offset, check_size, read_past_end, BackingStore};
use crate::storage::error::{StorageError, StorageResult};
use log::debug;
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Backing store over a regular file.
pub struct FileStore {
    file: Option<File>,
    path: PathBuf,
}

impl FileStore {
    /// Opens `path` read-write, creating it when missing. Returns the store and
    /// whether the file was created. An existing file is left untouched.
    pub fn open_or_create(path: &Path) -> StorageResult<(Self, bool)> {
        let is_new = !path.exists();

        let mut options = OpenOptions::new();
        options.read(true).write(true).create(is_new);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let file = options.open(path)?;
        debug!("Opened {:?} (new: {})", path, is_new);

        Ok((
            Self {
                file: Some(file),
                path: path.to_path_buf(),
            },
            is_new,
        ))
    }

    fn file(&mut self) -> StorageResult<&mut File> {
        self.file.as_mut().ok_or(StorageError::Closed)
    }
}

impl BackingStore for FileStore {
    fn read_at(&mut self, buf: &mut [u8], offset: i64) -> StorageResult<usize> {
        let offset = check_offset(offset)?;
        let file = self.file()?;
        let len = file.metadata()?.len();
        if offset >= len {
            return Err(read_past_end(offset, len));
        }

        file.seek(SeekFrom::Start(offset))?;
        let mut n = 0;
        while n < buf.len() {
            match file.read(&mut buf[n..]) {
                Ok(0) => break,
                Ok(read) => n += read,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        if n < buf.len() {
            return Err(StorageError::ShortRead {
                expected: buf.len(),
                actual: n,
            });
        }
        Ok(n)
    }

    fn write_at(&mut self, buf: &[u8], offset: i64) -> StorageResult<usize> {
        let offset = check_offset(offset)?;
        let file = self.file()?;
        // Writing past the end leaves a zero-filled gap.
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(buf)?;
        Ok(buf.len())
    }

    fn truncate(&mut self, size: i64) -> StorageResult<()> {
        let size = check_size(size)?;
        self.file()?.set_len(size)?;
        Ok(())
    }

    fn close(&mut self) -> StorageResult<()> {
        let file = self.file.take().ok_or(StorageError::Closed)?;
        file.sync_all()?;
        debug!("Closed {:?}", self.path);
        Ok(())
    }
}
