//! pagepool - a pin-counting page buffer pool with pluggable eviction.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          callers                            │
//! │            acquire(PageId).await  /  release(PageId)        │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │  BufferPool<C, S>  (buffer/)                                │
//! │    frames + page table + pin counts                         │
//! │   ┌───────────────────────────┐                             │
//! │   │ C: Cache                  │  FIFO | LRU | CLOCK          │
//! │   │ add/remove/peek/evict/... │  (chosen by type parameter)  │
//! │   └───────────────────────────┘                             │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │  S: PageStorage  (storage/)                                 │
//! │    fetch_page(PageId, &mut Page).await                      │
//! │    MemoryStorage | FileStorage | your own                   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (PageId, FrameId, Error, config)
//! - [`buffer`] - The buffer pool and eviction caches
//! - [`storage`] - Pages and the storage capability
//!
//! # Quick Start
//! ```
//! use pagepool::{BufferPool, LruCache, MemoryStorage, Page, PageId};
//!
//! # async fn demo() -> pagepool::Result<()> {
//! let storage = MemoryStorage::with_pages([(PageId::new(0), Page::from_prefix(b"hello"))]);
//! let pool: BufferPool<LruCache, _> = BufferPool::new(8, storage)?;
//!
//! let page = pool.acquire(PageId::new(0)).await?;
//! assert_eq!(&page.as_slice()[..5], b"hello");
//! pool.release_ref(page)?;
//! # Ok(())
//! # }
//! ```

pub mod buffer;
pub mod common;
pub mod storage;

pub use common::config::PAGE_SIZE;
pub use common::{Error, FrameId, PageId, Result};

pub use buffer::{
    BufferPool, BufferPoolStats, Cache, ClockCache, FifoCache, FrameState, LruCache, PageRef,
    StatsSnapshot,
};
pub use storage::{FileStorage, MemoryStorage, Page, PageStorage};
