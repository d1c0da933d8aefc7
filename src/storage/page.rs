//! Page - the fundamental 4KB unit of storage.
//!
//! A [`Page`] is a raw 4KB byte array. The buffer pool never looks inside
//! it; only [`PageStorage`](super::PageStorage) implementations fill it.

use crate::common::config::PAGE_SIZE;

/// A page of data (4KB, 4KB-aligned).
///
/// `Page` does not implement `Clone`: copying 4KB should be explicit, see
/// [`Page::copy_from`].
///
/// # Example
/// ```
/// use pagepool::Page;
///
/// let mut page = Page::new();
/// page.as_mut_slice()[0] = 0xFF;
/// assert_eq!(page.as_slice()[0], 0xFF);
/// ```
#[repr(align(4096))]
pub struct Page {
    data: [u8; PAGE_SIZE],
}

impl Page {
    /// Create a new zeroed page.
    #[inline]
    pub fn new() -> Self {
        Self {
            data: [0u8; PAGE_SIZE],
        }
    }

    /// Create a page with every byte set to `byte`.
    pub fn filled(byte: u8) -> Self {
        Self {
            data: [byte; PAGE_SIZE],
        }
    }

    /// Create a page whose prefix is `bytes` and the rest zero.
    ///
    /// # Panics
    /// Panics if `bytes` is longer than a page.
    pub fn from_prefix(bytes: &[u8]) -> Self {
        assert!(bytes.len() <= PAGE_SIZE, "prefix longer than a page");
        let mut page = Self::new();
        page.data[..bytes.len()].copy_from_slice(bytes);
        page
    }

    /// Get immutable slice of page data.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Get mutable slice of page data.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Overwrite this page with the contents of `other`.
    #[inline]
    pub fn copy_from(&mut self, other: &Page) {
        self.data.copy_from_slice(&other.data);
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("head", &&self.data[..8])
            .finish_non_exhaustive()
    }
}
