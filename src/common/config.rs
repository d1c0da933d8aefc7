//! Configuration constants for pagepool.

/// Size of a page in bytes (4KB).
///
/// Matches the OS page size on most systems, so a frame maps onto exactly
/// one page of memory and page buffers can be 4KB-aligned.
pub const PAGE_SIZE: usize = 4096;

/// Frame count used by callers that do not size the pool themselves.
pub const DEFAULT_POOL_SIZE: usize = 64;

/// Bytes of CRC32 stored after each page by [`FileStorage`].
///
/// [`FileStorage`]: crate::storage::FileStorage
pub const CHECKSUM_SIZE: usize = 4;

/// On-disk size of one page slot in a [`FileStorage`] file.
///
/// ```text
/// ┌──────────────────────────┬──────────┐
/// │ page data (PAGE_SIZE)    │ crc32 LE │
/// └──────────────────────────┴──────────┘
/// ```
///
/// [`FileStorage`]: crate::storage::FileStorage
pub const SLOT_SIZE: usize = PAGE_SIZE + CHECKSUM_SIZE;
