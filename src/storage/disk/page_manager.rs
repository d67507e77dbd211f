use super::{BackingStore, FileStore, MemoryStore};
use crate::storage::config::{StorageConfig, HEADER_REGION_SIZE};
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::header::DbHeader;
use crate::storage::page::{PageId, PageType, RawPage};
use log::{debug, info, warn};
use std::path::Path;

/// Reads, writes and allocates fixed-size pages on a [`BackingStore`].
///
/// Page `id` (1-based) lives at `id * page_size`. Page sizes smaller than the
/// header region would put page 1 inside it, so for those pages are packed
/// directly after the region instead: `HEADER_REGION_SIZE + (id - 1) * page_size`.
///
/// The manager is open while it holds a store. After [`PageManager::close`]
/// every operation fails with [`StorageError::InvalidFileFormat`].
pub struct PageManager {
    store: Option<Box<dyn BackingStore>>,
    header: DbHeader,
    page_size: u32,
}

impl PageManager {
    /// Opens or creates the store at `path`, or an in-memory store when `path`
    /// is [`MEMORY_PATH`](crate::storage::MEMORY_PATH).
    pub fn init(path: impl AsRef<Path>, page_size: u32) -> StorageResult<Self> {
        Self::open(&StorageConfig::new(path, page_size))
    }

    pub fn open(config: &StorageConfig) -> StorageResult<Self> {
        let (mut store, is_new) = open_store(config)?;

        let header = if is_new {
            initialize_header(store.as_mut(), config.page_size)?
        } else {
            read_header(store.as_mut())?
        };
        header.validate()?;

        if header.page_size != config.page_size {
            return Err(StorageError::invalid_format(format!(
                "store has page size {}, requested {}",
                header.page_size, config.page_size
            )));
        }

        if is_new {
            info!(
                "Created store {} with page size {}",
                config.path.display(),
                config.page_size
            );
        } else {
            info!(
                "Opened store {} ({} pages of {} bytes)",
                config.path.display(),
                header.page_count,
                header.page_size
            );
        }

        Self::with_store(store, header)
    }

    /// Builds an open manager over an already prepared store. The page size
    /// comes from `header`, which must pass [`DbHeader::validate`].
    pub fn with_store(store: Box<dyn BackingStore>, header: DbHeader) -> StorageResult<Self> {
        header.validate()?;
        let page_size = header.page_size;

        Ok(Self {
            store: Some(store),
            header,
            page_size,
        })
    }

    pub fn header(&self) -> &DbHeader {
        &self.header
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Number of pages allocated so far, including allocations not yet
    /// persisted by [`PageManager::flush_header`].
    pub fn page_count(&self) -> u32 {
        self.header.page_count
    }

    pub fn is_open(&self) -> bool {
        self.store.is_some()
    }

    pub fn read(&mut self, page_id: PageId) -> StorageResult<RawPage> {
        if !page_id.is_valid() {
            return Err(StorageError::InvalidPageId(page_id));
        }

        let offset = self.page_offset(page_id);
        let mut buf = vec![0u8; self.page_size as usize];
        self.store()?.read_at(&mut buf, offset)?;

        RawPage::decode(page_id, &buf)
    }

    pub fn write(&mut self, page: &RawPage) -> StorageResult<()> {
        if !page.id.is_valid() {
            return Err(StorageError::InvalidPageId(page.id));
        }
        self.store()?;

        let offset = self.page_offset(page.id);
        let data = page.encode(self.page_size)?;
        self.store()?.write_at(&data, offset)?;

        Ok(())
    }

    /// Appends a zeroed B-tree leaf page and returns it.
    ///
    /// The page count is only updated in memory; call
    /// [`PageManager::flush_header`] to persist it. A store reopened without
    /// a flush starts again from its last persisted count, and the next
    /// allocation truncates the store to the end of that page, destroying
    /// every page written after it.
    pub fn allocate(&mut self) -> StorageResult<RawPage> {
        self.store()?;

        let next_count = self
            .header
            .page_count
            .checked_add(1)
            .ok_or_else(|| StorageError::invalid_argument("page id space exhausted"))?;
        let page_id = PageId(next_count);
        let page = RawPage::new(
            page_id,
            PageType::BTreeLeaf,
            vec![0u8; self.page_size as usize],
        );

        let end = self.page_offset(page_id) + self.page_size as i64;
        self.store()?.truncate(end)?;
        self.write(&page)?;

        self.header.page_count = next_count;
        debug!("Allocated page {}", page_id);

        Ok(page)
    }

    /// Checks that `page_id` can be read.
    ///
    /// Nothing is reclaimed: the page stays allocated, the header is not
    /// touched and no free list entry is written.
    pub fn free(&mut self, page_id: PageId) -> StorageResult<()> {
        if !page_id.is_valid() {
            return Err(StorageError::InvalidPageId(page_id));
        }
        self.store()?;

        self.read(page_id)?;
        Ok(())
    }

    /// Writes the in-memory header to the start of the store.
    pub fn flush_header(&mut self) -> StorageResult<()> {
        let data = self.header.encode();
        self.store()?.write_at(&data, 0)?;
        debug!("Flushed header (page_count = {})", self.header.page_count);
        Ok(())
    }

    /// Closes the backing store. Closing an already closed manager does
    /// nothing.
    pub fn close(&mut self) -> StorageResult<()> {
        if let Some(mut store) = self.store.take() {
            store.close()?;
            debug!("Closed page manager");
        }
        Ok(())
    }

    fn store(&mut self) -> StorageResult<&mut (dyn BackingStore + 'static)> {
        self.store
            .as_deref_mut()
            .ok_or_else(|| StorageError::invalid_format("page manager has no backing store"))
    }

    fn page_offset(&self, page_id: PageId) -> i64 {
        let page_size = self.page_size as i64;
        if self.page_size as usize >= HEADER_REGION_SIZE {
            page_id.0 as i64 * page_size
        } else {
            HEADER_REGION_SIZE as i64 + (page_id.0 as i64 - 1) * page_size
        }
    }
}

impl Drop for PageManager {
    fn drop(&mut self) {
        if let Some(mut store) = self.store.take() {
            if let Err(e) = store.close() {
                warn!("Failed to close backing store: {}", e);
            }
        }
    }
}

fn open_store(config: &StorageConfig) -> StorageResult<(Box<dyn BackingStore>, bool)> {
    if config.is_memory() {
        return Ok((Box::new(MemoryStore::new()), true));
    }

    // Refuse to create a file whose header would fail validation.
    if !config.path.exists() {
        DbHeader::new(config.page_size).validate()?;
    }

    let (store, is_new) = FileStore::open_or_create(&config.path)?;
    Ok((Box::new(store), is_new))
}

fn initialize_header(store: &mut dyn BackingStore, page_size: u32) -> StorageResult<DbHeader> {
    let header = DbHeader::new(page_size);
    header.validate()?;

    store.truncate(HEADER_REGION_SIZE as i64)?;
    store.write_at(&header.encode(), 0)?;

    Ok(header)
}

fn read_header(store: &mut dyn BackingStore) -> StorageResult<DbHeader> {
    let mut region = vec![0u8; HEADER_REGION_SIZE];
    let len = match store.read_at(&mut region, 0) {
        Ok(n) => n,
        Err(StorageError::ShortRead { actual, .. }) => actual,
        // Empty file.
        Err(StorageError::InvalidArgument(_)) => 0,
        Err(e) => return Err(e),
    };

    DbHeader::decode(&region[..len])
}
