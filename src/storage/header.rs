//! Database file header.
//!
//! Layout (little-endian, 20 bytes at offset 0 of the header region):
//!
//! ```text
//! 0..6    magic              b"COREDB"
//! 6..8    version            u16
//! 8..12   page_size          u32
//! 12..16  free_list_page_id  u32
//! 16..20  page_count         u32
//! ```
//!
//! The remainder of the [`HEADER_REGION_SIZE`](crate::storage::HEADER_REGION_SIZE)
//! bytes is zero.

use crate::storage::config::{MAGIC, MAX_PAGE_SIZE, MIN_PAGE_SIZE, VERSION};
use crate::storage::error::{StorageError, StorageResult};
use byteorder::{ByteOrder, LittleEndian};

/// Encoded size of a header with a six byte magic.
pub const HEADER_SIZE: usize = 20;

const MAGIC_LEN: usize = 6;
const VERSION_OFFSET: usize = 6;
const PAGE_SIZE_OFFSET: usize = 8;
const FREE_LIST_OFFSET: usize = 12;
const PAGE_COUNT_OFFSET: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbHeader {
    pub magic: Vec<u8>,
    pub version: u16,
    pub page_size: u32,
    /// Root page of the free list. Declared but not maintained yet.
    pub free_list_page_id: u32,
    /// Number of allocated data pages.
    pub page_count: u32,
}

impl DbHeader {
    /// Header for a freshly created store.
    pub fn new(page_size: u32) -> Self {
        DbHeader {
            magic: MAGIC.to_vec(),
            version: VERSION,
            page_size,
            free_list_page_id: 1,
            page_count: 0,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut fields = [0u8; HEADER_SIZE - MAGIC_LEN];
        LittleEndian::write_u16(&mut fields[0..2], self.version);
        LittleEndian::write_u32(&mut fields[2..6], self.page_size);
        LittleEndian::write_u32(&mut fields[6..10], self.free_list_page_id);
        LittleEndian::write_u32(&mut fields[10..14], self.page_count);

        let mut buf = Vec::with_capacity(self.magic.len() + fields.len());
        buf.extend_from_slice(&self.magic);
        buf.extend_from_slice(&fields);
        buf
    }

    /// Decodes the fixed fields from the front of `data`. Bytes past the
    /// first [`HEADER_SIZE`] are ignored.
    pub fn decode(data: &[u8]) -> StorageResult<Self> {
        if data.len() < HEADER_SIZE {
            return Err(StorageError::invalid_format(format!(
                "header needs {} bytes, got {}",
                HEADER_SIZE,
                data.len()
            )));
        }

        Ok(DbHeader {
            magic: data[..MAGIC_LEN].to_vec(),
            version: LittleEndian::read_u16(&data[VERSION_OFFSET..PAGE_SIZE_OFFSET]),
            page_size: LittleEndian::read_u32(&data[PAGE_SIZE_OFFSET..FREE_LIST_OFFSET]),
            free_list_page_id: LittleEndian::read_u32(&data[FREE_LIST_OFFSET..PAGE_COUNT_OFFSET]),
            page_count: LittleEndian::read_u32(&data[PAGE_COUNT_OFFSET..HEADER_SIZE]),
        })
    }

    pub fn validate(&self) -> StorageResult<()> {
        if self.magic.len() != MAGIC_LEN {
            return Err(StorageError::invalid_format(format!(
                "magic must be {} bytes, got {}",
                MAGIC_LEN,
                self.magic.len()
            )));
        }
        if self.magic.as_slice() != MAGIC {
            return Err(StorageError::invalid_format(format!(
                "bad magic {:?}",
                String::from_utf8_lossy(&self.magic)
            )));
        }
        if self.version != VERSION {
            return Err(StorageError::invalid_format(format!(
                "unsupported version {}",
                self.version
            )));
        }
        if !(MIN_PAGE_SIZE..=MAX_PAGE_SIZE).contains(&self.page_size) {
            return Err(StorageError::invalid_format(format!(
                "page size {} outside [{}, {}]",
                self.page_size, MIN_PAGE_SIZE, MAX_PAGE_SIZE
            )));
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}
