//! Borrowed access to a pinned page.

use std::fmt;
use std::ops::Deref;

use parking_lot::RwLockReadGuard;

use crate::common::{FrameId, PageId};
use crate::storage::Page;

/// Shared, read-only access to a page pinned by [`BufferPool::acquire`].
///
/// A `PageRef` does **not** release its pin when dropped: every successful
/// `acquire` is matched by exactly one [`BufferPool::release`] (or
/// [`BufferPool::release_ref`], which also drops the reference).
///
/// Keep the `PageRef` no longer than the pin. A reference that outlives
/// its `release` blocks reuse of its frame: a load that picks the frame as
/// victim fails with [`Error::FrameInUse`](crate::Error::FrameInUse).
///
/// # Example
/// ```ignore
/// let page = pool.acquire(page_id).await?;
/// let first = page.as_slice()[0];   // Deref to &Page
/// pool.release_ref(page)?;
/// ```
///
/// [`BufferPool::acquire`]: super::BufferPool::acquire
/// [`BufferPool::release`]: super::BufferPool::release
/// [`BufferPool::release_ref`]: super::BufferPool::release_ref
pub struct PageRef<'a> {
    frame_id: FrameId,
    page_id: PageId,
    page: RwLockReadGuard<'a, Page>,
}

impl<'a> PageRef<'a> {
    pub(crate) fn new(frame_id: FrameId, page_id: PageId, page: RwLockReadGuard<'a, Page>) -> Self {
        Self {
            frame_id,
            page_id,
            page,
        }
    }

    /// Get the page ID.
    #[inline]
    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    /// Get the frame holding the page.
    #[inline]
    pub fn frame_id(&self) -> FrameId {
        self.frame_id
    }
}

impl Deref for PageRef<'_> {
    type Target = Page;

    #[inline]
    fn deref(&self) -> &Page {
        &self.page
    }
}

impl fmt::Debug for PageRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageRef")
            .field("frame_id", &self.frame_id)
            .field("page_id", &self.page_id)
            .finish()
    }
}
