//! Error types for pagepool.

use thiserror::Error;

use super::{FrameId, PageId};

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// All errors reported by the buffer pool and its storage backends.
///
/// Exhaustion ([`Error::NoEvictableFrame`]) and a missing page
/// ([`Error::PageNotFound`]) are separate variants: the first is cleared by
/// releasing pins and retrying, the second will not go away on its own.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from a storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The storage backend has no page with this id.
    #[error("{0} not found in storage")]
    PageNotFound(PageId),

    /// Every frame is pinned or reserved by an in-flight load.
    #[error("No evictable frames available in buffer pool")]
    NoEvictableFrame,

    /// Stored checksum does not match the page contents.
    #[error("{0} failed checksum verification")]
    Corrupted(PageId),

    /// Write to a page the storage never allocated.
    #[error("Invalid page ID: {0}")]
    InvalidPageId(PageId),

    /// A pool needs at least one frame.
    #[error("Buffer pool size must be > 0")]
    InvalidPoolSize,

    /// `release` called for a page that is not in the pool.
    #[error("{0} is not resident in the buffer pool")]
    PageNotResident(PageId),

    /// `release` called more times than `acquire`.
    ///
    /// This indicates a bug - releases should match acquires.
    #[error("{0} is not pinned")]
    PageNotPinned(PageId),

    /// Every evictable frame is still borrowed through a `PageRef` whose pin
    /// was already released. Retrying succeeds only once such a reference
    /// is dropped or another frame becomes evictable.
    #[error("{0} is still borrowed after its page was released")]
    FrameInUse(FrameId),
}

impl Error {
    /// Whether the same request can succeed later without any change to
    /// storage, i.e. once other holders release their pins.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::NoEvictableFrame | Error::FrameInUse(_))
    }
}
