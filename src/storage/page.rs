//! Raw page codec.
//!
//! Every data page is `page_size` bytes:
//!
//! ```text
//! 0       page type tag
//! 1..5    free space offset (u32, little-endian)
//! 5..     payload, zero padded
//! ```
//!
//! The page id is not stored in the page; it is derived from the page's
//! position in the store.

use crate::storage::error::{StorageError, StorageResult};
use byteorder::{ByteOrder, LittleEndian};
use std::fmt;

/// Bytes in front of the payload.
pub const PAGE_HEADER_SIZE: usize = 5;

const TYPE_OFFSET: usize = 0;
const FREE_SPACE_OFFSET: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PageId(pub u32);

impl PageId {
    /// Reserved sentinel, never assigned to a real page.
    pub const INVALID: PageId = PageId(0);

    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Page type tag stored in byte 0. Tags this crate does not know are kept
/// as-is so that a decode/encode cycle never rewrites them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageType {
    Header,
    Freelist,
    BTreeInternal,
    BTreeLeaf,
    Unknown(u8),
}

impl PageType {
    pub fn tag(self) -> u8 {
        match self {
            PageType::Header => 1,
            PageType::Freelist => 2,
            PageType::BTreeInternal => 3,
            PageType::BTreeLeaf => 4,
            PageType::Unknown(tag) => tag,
        }
    }
}

impl From<u8> for PageType {
    fn from(tag: u8) -> Self {
        match tag {
            1 => PageType::Header,
            2 => PageType::Freelist,
            3 => PageType::BTreeInternal,
            4 => PageType::BTreeLeaf,
            other => PageType::Unknown(other),
        }
    }
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageType::Header => write!(f, "header"),
            PageType::Freelist => write!(f, "freelist"),
            PageType::BTreeInternal => write!(f, "btree-internal"),
            PageType::BTreeLeaf => write!(f, "btree-leaf"),
            PageType::Unknown(tag) => write!(f, "unknown({})", tag),
        }
    }
}

/// A page as read from or written to the store. Not cached by the manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPage {
    pub id: PageId,
    pub page_type: PageType,
    /// Interpreted by the layer that owns the page.
    pub free_space_offset: u32,
    pub data: Vec<u8>,
}

impl RawPage {
    pub fn new(id: PageId, page_type: PageType, data: Vec<u8>) -> Self {
        RawPage {
            id,
            page_type,
            free_space_offset: 0,
            data,
        }
    }

    /// Payload bytes that fit in a page of `page_size` bytes.
    pub fn capacity(page_size: u32) -> usize {
        (page_size as usize).saturating_sub(PAGE_HEADER_SIZE)
    }

    /// Serializes the page into exactly `page_size` bytes.
    ///
    /// A payload longer than [`RawPage::capacity`] is accepted only when the
    /// excess is all zeros, since it would be dropped.
    pub fn encode(&self, page_size: u32) -> StorageResult<Vec<u8>> {
        let page_size = page_size as usize;
        if page_size < PAGE_HEADER_SIZE {
            return Err(StorageError::invalid_argument(format!(
                "page size {} cannot hold the {} byte page header",
                page_size, PAGE_HEADER_SIZE
            )));
        }

        let capacity = page_size - PAGE_HEADER_SIZE;
        if self.data.len() > capacity && self.data[capacity..].iter().any(|&b| b != 0) {
            return Err(StorageError::PageOverflow {
                size: self.data.len(),
                capacity,
            });
        }

        let mut buf = vec![0u8; page_size];
        buf[TYPE_OFFSET] = self.page_type.tag();
        LittleEndian::write_u32(
            &mut buf[FREE_SPACE_OFFSET..PAGE_HEADER_SIZE],
            self.free_space_offset,
        );
        let len = self.data.len().min(capacity);
        buf[PAGE_HEADER_SIZE..PAGE_HEADER_SIZE + len].copy_from_slice(&self.data[..len]);

        Ok(buf)
    }

    pub fn decode(id: PageId, data: &[u8]) -> StorageResult<Self> {
        if data.len() < PAGE_HEADER_SIZE {
            return Err(StorageError::invalid_format(format!(
                "page {} needs at least {} bytes, got {}",
                id,
                PAGE_HEADER_SIZE,
                data.len()
            )));
        }

        Ok(RawPage {
            id,
            page_type: PageType::from(data[TYPE_OFFSET]),
            free_space_offset: LittleEndian::read_u32(&data[FREE_SPACE_OFFSET..PAGE_HEADER_SIZE]),
            data: data[PAGE_HEADER_SIZE..].to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_page_type_tags() {
        assert_eq!(PageType::Header.tag(), 1);
        assert_eq!(PageType::Freelist.tag(), 2);
        assert_eq!(PageType::BTreeInternal.tag(), 3);
        assert_eq!(PageType::BTreeLeaf.tag(), 4);

        for tag in 0..=u8::MAX {
            assert_eq!(PageType::from(tag).tag(), tag);
        }
        assert_eq!(PageType::from(0), PageType::Unknown(0));
    }

    #[test]
    fn test_page_id() {
        assert!(!PageId::INVALID.is_valid());
        assert!(PageId(1).is_valid());
        assert_eq!(PageId(42).to_string(), "42");
    }

    #[test]
    fn test_encode_layout() {
        let mut page = RawPage::new(PageId(3), PageType::BTreeInternal, b"abc".to_vec());
        page.free_space_offset = 0x0A0B_0C0D;

        let buf = page.encode(512).unwrap();
        assert_eq!(buf.len(), 512);
        assert_eq!(buf[0], 3);
        assert_eq!(&buf[1..5], &[0x0D, 0x0C, 0x0B, 0x0A]);
        assert_eq!(&buf[5..8], b"abc");
        assert!(buf[8..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_decode_uses_caller_id() {
        let page = RawPage::new(PageId(9), PageType::Freelist, vec![1, 2, 3]);
        let buf = page.encode(1024).unwrap();

        let decoded = RawPage::decode(PageId(77), &buf).unwrap();
        assert_eq!(decoded.id, PageId(77));
        assert_eq!(decoded.page_type, PageType::Freelist);
        assert_eq!(decoded.data.len(), RawPage::capacity(1024));
        assert_eq!(&decoded.data[..3], &[1, 2, 3]);
    }

    #[test]
    fn test_round_trip_random_payloads() {
        let mut rng = rand::thread_rng();
        let mut sizes = vec![512u32, 513, 4096, 65535, 65536];
        for _ in 0..16 {
            sizes.push(rng.gen_range(512..=65536));
        }

        for page_size in sizes {
            let capacity = RawPage::capacity(page_size);
            let mut payload = vec![0u8; rng.gen_range(0..=capacity)];
            rng.fill(&mut payload[..]);

            let page = RawPage {
                id: PageId(rng.gen_range(1..=u32::MAX)),
                page_type: PageType::from(rng.gen::<u8>()),
                free_space_offset: rng.gen(),
                data: payload.clone(),
            };

            let buf = page.encode(page_size).unwrap();
            assert_eq!(buf.len(), page_size as usize);

            let decoded = RawPage::decode(page.id, &buf).unwrap();
            assert_eq!(decoded.id, page.id);
            assert_eq!(decoded.page_type, page.page_type);
            assert_eq!(decoded.free_space_offset, page.free_space_offset);
            assert_eq!(decoded.data.len(), capacity);
            assert_eq!(&decoded.data[..payload.len()], payload.as_slice());
            assert!(decoded.data[payload.len()..].iter().all(|&b| b == 0));
        }
    }

    #[test]
    fn test_full_page_zero_payload_is_accepted() {
        // Freshly allocated pages carry a page_size-long zero payload.
        let page = RawPage::new(PageId(1), PageType::BTreeLeaf, vec![0u8; 4096]);
        let buf = page.encode(4096).unwrap();
        assert_eq!(buf.len(), 4096);
    }

    #[test]
    fn test_overflow_rejected() {
        let mut data = vec![0u8; 4096];
        data[4095] = 1;
        let page = RawPage::new(PageId(1), PageType::BTreeLeaf, data);

        let err = page.encode(4096).unwrap_err();
        assert!(matches!(
            err,
            StorageError::PageOverflow {
                size: 4096,
                capacity: 4091
            }
        ));
    }

    #[test]
    fn test_decode_too_short() {
        let err = RawPage::decode(PageId(1), &[4, 0, 0]).unwrap_err();
        assert!(err.is_invalid_file_format());
    }

    #[test]
    fn test_encode_tiny_page_size() {
        let page = RawPage::new(PageId(1), PageType::BTreeLeaf, Vec::new());
        assert!(matches!(
            page.encode(4),
            Err(StorageError::InvalidArgument(_))
        ));
    }
}
