//! Frame identifier type.

use std::fmt;

/// Index of a frame in the buffer pool, in `[0, capacity)`.
///
/// Caches are handed frame ids, never page ids: eviction decisions are
/// about slots, not about which page currently sits in them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(pub usize);

impl FrameId {
    /// Create a new FrameId.
    #[inline]
    pub fn new(id: usize) -> Self {
        FrameId(id)
    }

    /// The frame's position in the pool's frame array.
    #[inline]
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame({})", self.0)
    }
}
