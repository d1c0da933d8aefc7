//! Frame - a slot in the buffer pool.
//!
//! A frame is split in two halves:
//! - [`Frame`] holds the page buffer behind its own lock, so page readers
//!   never contend with pool bookkeeping.
//! - [`FrameMeta`] holds which page is resident and how many pins it has;
//!   it lives in the pool state, under the pool mutex, next to the cache.

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::common::{FrameId, PageId};
use crate::storage::Page;

/// Page buffer of one frame.
///
/// # Locking
/// Read locks are held by [`PageRef`](super::PageRef)s of pinned frames.
/// The write lock is only ever taken with [`Frame::try_write`], by the load
/// that reserved this frame, and held across the storage fetch. A reserved
/// frame is unpinned and unmapped, so the two never meet unless a caller
/// keeps a `PageRef` past `release`.
pub(crate) struct Frame {
    page: RwLock<Page>,
}

impl Frame {
    pub fn new() -> Self {
        Self {
            page: RwLock::new(Page::new()),
        }
    }

    #[inline]
    pub fn read(&self) -> RwLockReadGuard<'_, Page> {
        self.page.read()
    }

    #[inline]
    pub fn try_write(&self) -> Option<RwLockWriteGuard<'_, Page>> {
        self.page.try_write()
    }
}

/// Bookkeeping for one frame.
#[derive(Debug, Default)]
pub(crate) struct FrameMeta {
    /// Resident page, or None if the frame was never filled.
    pub page_id: Option<PageId>,

    /// Number of holders. Never evicted while > 0.
    pub pin_count: usize,

    /// Reserved by an in-flight load. `page_id` still names the old
    /// page, but it is no longer reachable through the page table.
    pub loading: bool,
}

impl FrameMeta {
    /// Increment the pin count. Returns the new pin count.
    #[inline]
    pub fn pin(&mut self) -> usize {
        self.pin_count += 1;
        self.pin_count
    }

    /// Decrement the pin count. Returns the new pin count.
    ///
    /// # Panics
    /// Panics if pin count is already 0.
    #[inline]
    pub fn unpin(&mut self) -> usize {
        assert!(self.pin_count > 0, "pin count underflow");
        self.pin_count -= 1;
        self.pin_count
    }

    #[inline]
    pub fn is_pinned(&self) -> bool {
        self.pin_count > 0
    }
}

/// Point-in-time view of one frame, for inspection and invariant checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameState {
    pub frame_id: FrameId,
    /// Page the frame holds (for a loading frame: the page being replaced).
    pub page_id: Option<PageId>,
    pub pin_count: usize,
    /// Whether the cache currently considers the frame evictable.
    pub evictable: bool,
    pub loading: bool,
}
