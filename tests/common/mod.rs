//! Shared helpers for integration tests: logging and storage doubles.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Once;

use pagepool::{MemoryStorage, Page, PageId, PageStorage, Result};
use parking_lot::Mutex;
use tokio::sync::Semaphore;

static SETUP_LOGS: Once = Once::new();

/// Install env_logger once per test binary. `RUST_LOG` overrides the
/// default `info` level.
pub fn setup_logger() {
    SETUP_LOGS.call_once(|| {
        let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .is_test(true)
            .try_init();
    });
}

/// Storage holding `ids`, each page filled with its id's low byte.
pub fn storage_with(ids: &[u32]) -> MemoryStorage {
    MemoryStorage::with_pages(
        ids.iter()
            .map(|&id| (PageId::new(id), Page::filled(id as u8))),
    )
}

/// Storage whose fetches park until the test opens the gate.
pub struct GatedStorage {
    inner: MemoryStorage,
    gate: Semaphore,
    waiting: AtomicUsize,
}

impl GatedStorage {
    pub fn new(inner: MemoryStorage) -> Self {
        Self {
            inner,
            gate: Semaphore::new(0),
            waiting: AtomicUsize::new(0),
        }
    }

    /// Let `n` parked (or future) fetches through.
    pub fn open(&self, n: usize) {
        self.gate.add_permits(n);
    }

    /// Number of fetches currently parked at the gate.
    pub fn waiting(&self) -> usize {
        self.waiting.load(Ordering::SeqCst)
    }

    /// Yield until at least `n` fetches are parked.
    pub async fn wait_for_waiters(&self, n: usize) {
        while self.waiting() < n {
            tokio::task::yield_now().await;
        }
    }

    pub fn inner(&self) -> &MemoryStorage {
        &self.inner
    }
}

impl PageStorage for GatedStorage {
    async fn fetch_page(&self, page_id: PageId, page: &mut Page) -> Result<bool> {
        self.waiting.fetch_add(1, Ordering::SeqCst);
        let permit = self.gate.acquire().await.map_err(std::io::Error::other)?;
        permit.forget();
        self.waiting.fetch_sub(1, Ordering::SeqCst);

        self.inner.fetch_page(page_id, page).await
    }
}

/// Storage that reports an I/O error for selected pages.
pub struct FlakyStorage {
    inner: MemoryStorage,
    failing: Mutex<HashSet<PageId>>,
}

impl FlakyStorage {
    pub fn new(inner: MemoryStorage) -> Self {
        Self {
            inner,
            failing: Mutex::new(HashSet::new()),
        }
    }

    pub fn fail(&self, page_id: PageId) {
        self.failing.lock().insert(page_id);
    }

    pub fn heal(&self, page_id: PageId) {
        self.failing.lock().remove(&page_id);
    }
}

impl PageStorage for FlakyStorage {
    async fn fetch_page(&self, page_id: PageId, page: &mut Page) -> Result<bool> {
        if self.failing.lock().contains(&page_id) {
            return Err(std::io::Error::other("injected read failure").into());
        }
        self.inner.fetch_page(page_id, page).await
    }
}
