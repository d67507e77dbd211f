//! Backing stores and the page manager built on them.
//!
//! A [`BackingStore`] is random-access byte storage with file-like edge
//! semantics. [`FileStore`] and [`MemoryStore`] behave identically so that a
//! [`PageManager`] can be exercised in-process without touching the
//! filesystem.

pub mod file_store;
pub mod memory_store;
pub mod page_manager;

pub use file_store::FileStore;
pub use memory_store::MemoryStore;
pub use page_manager::PageManager;

use crate::storage::error::{StorageError, StorageResult};

/// Random-access byte storage owned by a single [`PageManager`].
///
/// Offsets and sizes are signed; a negative value is rejected with
/// [`StorageError::InvalidArgument`].
pub trait BackingStore {
    /// Reads into `buf` starting at `offset`.
    ///
    /// Fails with `InvalidArgument` when `offset` is at or past the end. When
    /// the read starts inside the store but runs past its end, the available
    /// bytes are copied to the front of `buf` and
    /// [`StorageError::ShortRead`] reports how many.
    fn read_at(&mut self, buf: &mut [u8], offset: i64) -> StorageResult<usize>;

    /// Writes `buf` at `offset`, zero-extending the store when `offset` lies
    /// past the current end.
    fn write_at(&mut self, buf: &[u8], offset: i64) -> StorageResult<usize>;

    /// Shrinks or zero-extends the store to exactly `size` bytes.
    fn truncate(&mut self, size: i64) -> StorageResult<()>;

    fn close(&mut self) -> StorageResult<()>;
}

fn check_offset(offset: i64) -> StorageResult<u64> {
    u64::try_from(offset)
        .map_err(|_| StorageError::invalid_argument(format!("negative offset {}", offset)))
}

fn check_size(size: i64) -> StorageResult<u64> {
    u64::try_from(size)
        .map_err(|_| StorageError::invalid_argument(format!("negative size {}", size)))
}

fn read_past_end(offset: u64, len: u64) -> StorageError {
    StorageError::invalid_argument(format!(
        "read offset {} at or beyond end of store ({} bytes)",
        offset, len
    ))
}
