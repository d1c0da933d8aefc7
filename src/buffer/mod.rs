//! Buffer pool management.
//!
//! The buffer pool is the in-memory cache layer between storage and its
//! users. It manages a fixed pool of frames, each holding one page.
//!
//! # Components
//! - [`BufferPool`] - The page cache: `acquire` / `release`
//! - [`PageRef`] - Read access to a pinned page
//! - [`FrameState`] - Per-frame snapshot for inspection
//! - [`BufferPoolStats`] - Performance statistics
//! - [`cache`] - The eviction capability and its policies

mod buffer_pool;
pub mod cache;
mod frame;
mod page_ref;
mod stats;

pub use buffer_pool::BufferPool;
pub use cache::{Cache, ClockCache, FifoCache, LruCache};
pub use frame::FrameState;
pub use page_ref::PageRef;
pub use stats::{BufferPoolStats, StatsSnapshot};
