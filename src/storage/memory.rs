//! In-memory page storage.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::common::{PageId, Result};
use crate::storage::{Page, PageStorage};

/// Page storage backed by a hash map, for tests and embedding.
///
/// Pages are inserted explicitly; fetching an id that was never inserted
/// reports the page as absent. Fetches never suspend.
#[derive(Default)]
pub struct MemoryStorage {
    pages: Mutex<HashMap<PageId, Box<Page>>>,
    fetches: AtomicU64,
}

impl MemoryStorage {
    /// Create an empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a storage holding `pages`.
    pub fn with_pages<I>(pages: I) -> Self
    where
        I: IntoIterator<Item = (PageId, Page)>,
    {
        let storage = Self::new();
        for (page_id, page) in pages {
            storage.insert(page_id, page);
        }
        storage
    }

    /// Store `page` under `page_id`, replacing any previous content.
    pub fn insert(&self, page_id: PageId, page: Page) {
        self.pages.lock().insert(page_id, Box::new(page));
    }

    /// Remove `page_id`. Returns whether it was present.
    pub fn remove(&self, page_id: PageId) -> bool {
        self.pages.lock().remove(&page_id).is_some()
    }

    /// Whether `page_id` is stored.
    pub fn contains(&self, page_id: PageId) -> bool {
        self.pages.lock().contains_key(&page_id)
    }

    /// Number of stored pages.
    pub fn page_count(&self) -> usize {
        self.pages.lock().len()
    }

    /// Number of `fetch_page` calls served so far, hits and misses alike.
    pub fn fetch_count(&self) -> u64 {
        self.fetches.load(Ordering::Relaxed)
    }
}

impl PageStorage for MemoryStorage {
    async fn fetch_page(&self, page_id: PageId, page: &mut Page) -> Result<bool> {
        self.fetches.fetch_add(1, Ordering::Relaxed);

        let pages = self.pages.lock();
        match pages.get(&page_id) {
            Some(stored) => {
                page.copy_from(stored);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
