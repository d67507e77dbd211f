//! Storage configuration and on-disk format constants.

use std::path::{Path, PathBuf};

/// Identifies files of this format. Stored in the first six header bytes.
pub const MAGIC: &[u8; 6] = b"COREDB";

/// The only header version this crate reads and writes.
pub const VERSION: u16 = 1;

/// Size of the header region at the start of every store, independent of the
/// configured page size.
pub const HEADER_REGION_SIZE: usize = 4096;

pub const MIN_PAGE_SIZE: u32 = 512;
pub const MAX_PAGE_SIZE: u32 = 65536;
pub const DEFAULT_PAGE_SIZE: u32 = 4096;

/// Path sentinel that selects a non-persistent, memory-backed store.
pub const MEMORY_PATH: &str = ":memory";

/// Page manager configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Database file path, or [`MEMORY_PATH`] for an in-memory store.
    pub path: PathBuf,
    /// Page size in bytes. Must lie in `[MIN_PAGE_SIZE, MAX_PAGE_SIZE]`.
    pub page_size: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            path: PathBuf::from(MEMORY_PATH),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl StorageConfig {
    pub fn new(path: impl AsRef<Path>, page_size: u32) -> Self {
        StorageConfig {
            path: path.as_ref().to_path_buf(),
            page_size,
        }
    }

    pub fn with_path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = path.as_ref().to_path_buf();
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn is_memory(&self) -> bool {
        is_memory_path(&self.path)
    }
}

pub(crate) fn is_memory_path(path: &Path) -> bool {
    path.as_os_str() == MEMORY_PATH
}
