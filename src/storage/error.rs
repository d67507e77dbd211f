//! Storage layer error types.

use crate::storage::page::PageId;
use thiserror::Error;

/// Errors that can occur in the storage layer.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Missing, undersized or mismatched header, or an operation attempted
    /// on a manager that no longer holds a store.
    #[error("Invalid file format: {0}")]
    InvalidFileFormat(String),

    #[error("Invalid page ID: {0}")]
    InvalidPageId(PageId),

    /// Negative offset or size passed to a backing store.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A read ran past the end of the store. The first `actual` bytes of the
    /// caller's buffer hold the data that was available.
    #[error("Short read: expected {expected} bytes, got {actual}")]
    ShortRead { expected: usize, actual: usize },

    #[error("Page overflow: payload of {size} bytes exceeds capacity {capacity}")]
    PageOverflow { size: usize, capacity: usize },

    #[error("Backing store is closed")]
    Closed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    pub(crate) fn invalid_format(reason: impl Into<String>) -> Self {
        Self::InvalidFileFormat(reason.into())
    }

    pub(crate) fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument(reason.into())
    }

    pub fn is_invalid_file_format(&self) -> bool {
        matches!(self, Self::InvalidFileFormat(_))
    }

    pub fn is_invalid_page_id(&self) -> bool {
        matches!(self, Self::InvalidPageId(_))
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(StorageError::invalid_format("bad magic").is_invalid_file_format());
        assert!(StorageError::InvalidPageId(PageId(0)).is_invalid_page_id());
        assert!(!StorageError::Closed.is_invalid_file_format());
        assert!(!StorageError::invalid_argument("negative offset").is_invalid_page_id());
    }

    #[test]
    fn test_io_error_from_std() {
        let std_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: StorageError = std_err.into();
        assert!(matches!(err, StorageError::Io(_)));
    }

    #[test]
    fn test_display() {
        let err = StorageError::ShortRead {
            expected: 4096,
            actual: 20,
        };
        assert_eq!(err.to_string(), "Short read: expected 4096 bytes, got 20");
        assert_eq!(
            StorageError::InvalidPageId(PageId(0)).to_string(),
            "Invalid page ID: 0"
        );
    }
}
