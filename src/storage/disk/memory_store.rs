use super::{check_offset, check_size, read_past_end, BackingStore};
use crate::storage::error::{StorageError, StorageResult};
use std::io;

/// Growable in-memory buffer with file semantics.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    data: Vec<u8>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }


    /// Resizes the buffer to `len` bytes, zero-filling any growth. Fails
    /// instead of aborting when the allocation cannot be made.
    fn resize(&mut self, len: u64) -> StorageResult<()> {
        let len = usize::try_from(len).map_err(|_| {
            StorageError::invalid_argument(format!("size {} exceeds address space", len))
        })?;
        if len > self.data.len() {
            self.data
                .try_reserve_exact(len - self.data.len())
                .map_err(|e| io::Error::new(io::ErrorKind::OutOfMemory, e))?;
        }
        self.data.resize(len, 0);
        Ok(())
    }
}

impl BackingStore for MemoryStore {
    fn read_at(&mut self, buf: &mut [u8], offset: i64) -> StorageResult<usize> {
        let offset = check_offset(offset)?;
        if offset >= self.data.len() as u64 {
            return Err(read_past_end(offset, self.data.len() as u64));
        }

        let available = &self.data[offset as usize..];
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);

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
        let end = offset
            .checked_add(buf.len() as u64)
            .filter(|&end| end <= i64::MAX as u64)
            .ok_or_else(|| {
                StorageError::invalid_argument(format!(
                    "write of {} bytes at {} overflows",
                    buf.len(),
                    offset
                ))
            })?;
        if end > self.data.len() as u64 {
            self.resize(end)?;
        }
        self.data[offset as usize..end as usize].copy_from_slice(buf);
        Ok(buf.len())
    }

    fn truncate(&mut self, size: i64) -> StorageResult<()> {
        let size = check_size(size)?;
        self.resize(size)
    }

    fn close(&mut self) -> StorageResult<()> {
        Ok(())
    }
}
