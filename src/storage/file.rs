//! File-backed page storage.
//!
//! The [`FileStorage`] keeps every page in one file of fixed-size slots and
//! serves buffer pool fetches from a blocking thread.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::Arc;

use log::{info, warn};
use parking_lot::Mutex;

use crate::common::config::{PAGE_SIZE, SLOT_SIZE};
use crate::common::{Error, PageId, Result};
use crate::storage::{Page, PageStorage};

/// Page storage in a single file.
///
/// # File Layout
/// ```text
/// ┌────────────────┬────────────────┬─────┬────────────────┐
/// │ Slot 0         │ Slot 1         │ ... │ Slot N         │
/// │ page | crc32   │ page | crc32   │     │ page | crc32   │
/// └────────────────┴────────────────┴─────┴────────────────┘
/// Offset:  0        SLOT_SIZE              N×SLOT_SIZE
/// ```
///
/// Each slot holds the page followed by the little-endian CRC32 of the page
/// bytes. A fetch verifies the checksum before touching the caller's buffer,
/// so a corrupt or short slot never leaks into a frame.
///
/// # Durability
/// `allocate_page` and `write_page` fsync before returning.
pub struct FileStorage {
    inner: Arc<Mutex<FileInner>>,
}

struct FileInner {
    file: File,
    /// Number of complete slots in the file.
    page_count: u32,
}

impl FileStorage {
    /// Create a new page file.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path.as_ref())?;

        info!("created page file {}", path.as_ref().display());
        Ok(Self::from_parts(file, 0))
    }

    /// Open an existing page file.
    ///
    /// A trailing partial slot (from a torn allocation) is ignored.
    ///
    /// # Errors
    /// Returns an error if the file doesn't exist or cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path.as_ref())?;

        let file_size = file.metadata()?.len();
        let page_count = (file_size / SLOT_SIZE as u64) as u32;
        if file_size % SLOT_SIZE as u64 != 0 {
            warn!(
                "page file {} has {} trailing bytes, ignoring partial slot",
                path.as_ref().display(),
                file_size % SLOT_SIZE as u64
            );
        }

        info!(
            "opened page file {} with {} pages",
            path.as_ref().display(),
            page_count
        );
        Ok(Self::from_parts(file, page_count))
    }

    /// Open an existing page file, or create it if it doesn't exist.
    pub fn open_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::open(path)
        } else {
            Self::create(path)
        }
    }

    fn from_parts(file: File, page_count: u32) -> Self {
        Self {
            inner: Arc::new(Mutex::new(FileInner { file, page_count })),
        }
    }

    /// Append a zeroed page and return its id.
    pub fn allocate_page(&self) -> Result<PageId> {
        let mut inner = self.inner.lock();
        let page_id = PageId::new(inner.page_count);

        inner.write_slot(page_id, &Page::new())?;
        inner.page_count += 1;
        Ok(page_id)
    }

    /// Overwrite an allocated page.
    ///
    /// # Errors
    /// Returns `Error::InvalidPageId` if the page hasn't been allocated.
    pub fn write_page(&self, page_id: PageId, page: &Page) -> Result<()> {
        let mut inner = self.inner.lock();
        if page_id.0 >= inner.page_count {
            return Err(Error::InvalidPageId(page_id));
        }
        inner.write_slot(page_id, page)
    }

    /// Number of allocated pages.
    pub fn page_count(&self) -> u32 {
        self.inner.lock().page_count
    }

    /// Size of the page file in bytes.
    pub fn file_size(&self) -> u64 {
        self.page_count() as u64 * SLOT_SIZE as u64
    }
}

impl FileInner {
    fn write_slot(&mut self, page_id: PageId, page: &Page) -> Result<()> {
        let checksum = crc32fast::hash(page.as_slice());

        self.file
            .seek(SeekFrom::Start(page_id.index() * SLOT_SIZE as u64))?;
        self.file.write_all(page.as_slice())?;
        self.file.write_all(&checksum.to_le_bytes())?;
        self.file.sync_all()?;
        Ok(())
    }

    /// Read and verify one slot. `None` if the page was never allocated.
    fn read_slot(&mut self, page_id: PageId) -> Result<Option<Box<[u8]>>> {
        if page_id.0 >= self.page_count {
            return Ok(None);
        }

        let mut slot = vec![0u8; SLOT_SIZE].into_boxed_slice();
        self.file
            .seek(SeekFrom::Start(page_id.index() * SLOT_SIZE as u64))?;
        self.file.read_exact(&mut slot)?;

        let (data, stored) = slot.split_at(PAGE_SIZE);
        let stored = u32::from_le_bytes([stored[0], stored[1], stored[2], stored[3]]);
        if crc32fast::hash(data) != stored {
            warn!("checksum mismatch for {}", page_id);
            return Err(Error::Corrupted(page_id));
        }

        Ok(Some(slot))
    }
}

impl PageStorage for FileStorage {
    async fn fetch_page(&self, page_id: PageId, page: &mut Page) -> Result<bool> {
        let inner = Arc::clone(&self.inner);
        let slot = tokio::task::spawn_blocking(move || {
            let mut inner = inner.lock();
            inner.read_slot(page_id)
        })
        .await
        .map_err(std::io::Error::other)??;

        match slot {
            Some(slot) => {
                page.as_mut_slice().copy_from_slice(&slot[..PAGE_SIZE]);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
