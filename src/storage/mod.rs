//! Storage layer - the pages the buffer pool caches and where they come from.
//!
//! This module provides:
//! - [`Page`] - The raw 4KB data container
//! - [`PageStorage`] - The capability the pool fetches pages through
//! - [`MemoryStorage`] - Hash-map backed storage for tests and embedding
//! - [`FileStorage`] - Checksummed single-file storage

mod file;
mod memory;
mod page;
mod traits;

pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use page::Page;
pub use traits::PageStorage;
