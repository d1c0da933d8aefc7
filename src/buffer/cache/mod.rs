//! Eviction caches: which frames may be evicted, and which one goes next.
//!
//! Implements:
//! - [`FifoCache`] - Evicts in order of first release after a load
//! - [`LruCache`] - Evicts the frame released longest ago
//! - [`ClockCache`] - Second-chance clock sweep

mod clock;
mod fifo;
mod lru;

pub use clock::ClockCache;
pub use fifo::FifoCache;
pub use lru::LruCache;

use crate::common::FrameId;

/// The eviction capability consumed by [`BufferPool`].
///
/// A cache tracks the set of *evictable* frames (pin count zero) and
/// chooses a victim from it. Choosing is split in two steps so the pool
/// can load a new page into the victim before giving up the old one:
///
/// 1. [`peek`](Cache::peek) selects a candidate and **reserves** it. A
///    reserved frame is no longer evictable: it is not counted by
///    [`size`](Cache::size), not reported by [`contains`](Cache::contains)
///    and never returned by another `peek`, so two loads in flight always
///    get different frames.
/// 2. The reservation ends with either [`evict`](Cache::evict) (the load
///    succeeded, the old page is gone) or [`unpeek`](Cache::unpeek) (the
///    load failed, the frame is evictable again as if never peeked).
///
/// `add` and `remove` are idempotent. The pool never calls `add`,
/// `remove` or `peek` for a reserved frame, and never calls `peek` when
/// `size() == 0`.
///
/// [`BufferPool`]: crate::buffer::BufferPool
pub trait Cache: Send {
    /// Create a cache for frames `0..capacity`, with none evictable.
    fn with_capacity(capacity: usize) -> Self
    where
        Self: Sized;

    /// Mark a frame evictable.
    fn add(&mut self, frame_id: FrameId);

    /// Mark a frame non-evictable.
    fn remove(&mut self, frame_id: FrameId);

    /// Number of evictable frames, reservations excluded.
    fn size(&self) -> usize;

    /// Select an evictable frame and reserve it.
    ///
    /// Returns `None` only when `size() == 0`.
    fn peek(&mut self) -> Option<FrameId>;

    /// Commit the eviction of a reserved frame.
    fn evict(&mut self, frame_id: FrameId);

    /// Cancel a reservation, making the frame evictable again.
    fn unpeek(&mut self, frame_id: FrameId);

    /// Whether a frame is currently evictable.
    fn contains(&self, frame_id: FrameId) -> bool;
}
