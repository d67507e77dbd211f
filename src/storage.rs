//! Page-oriented storage layer for coredb.
//!
//! A store starts with a fixed 4096 byte header region followed by
//! fixed-size pages. Key components:
//!
//! - **BackingStore**: random-access bytes with file semantics, backed by a
//!   file ([`FileStore`]) or by memory ([`MemoryStore`])
//! - **DbHeader**: magic, version, page size, free list root and page count
//! - **RawPage**: type tag, free space offset and payload of a single page
//! - **PageManager**: allocates, reads, writes and frees pages
//!
//! There is no page cache, no locking and no write-ahead log; every call goes
//! straight to the backing store.

pub mod config;
pub mod disk;
pub mod error;
pub mod header;
pub mod page;

pub use config::{
    StorageConfig, DEFAULT_PAGE_SIZE, HEADER_REGION_SIZE, MAGIC, MAX_PAGE_SIZE, MEMORY_PATH,
    MIN_PAGE_SIZE, VERSION,
};
pub use disk::{BackingStore, FileStore, MemoryStore, PageManager};
pub use error::{StorageError, StorageResult};
pub use header::{DbHeader, HEADER_SIZE};
pub use page::{PageId, PageType, RawPage, PAGE_HEADER_SIZE};
