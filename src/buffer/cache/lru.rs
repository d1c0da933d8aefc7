//! LRU (Least Recently Used) eviction.

use std::collections::{BTreeMap, HashMap};

use crate::buffer::cache::Cache;
use crate::common::FrameId;

/// Evicts the frame that became evictable longest ago.
///
/// A frame becomes evictable when its last pin is released, so this is
/// "least recently used" measured at release time.
pub struct LruCache {
    /// Logical time, bumped on every `add` of a non-evictable frame.
    clock: u64,

    /// Evictable frames by the time they were added (first = oldest).
    order: BTreeMap<u64, FrameId>,

    /// Add time of each evictable frame.
    stamps: HashMap<FrameId, u64>,

    /// Reserved frames and the add time they had when peeked.
    reserved: HashMap<FrameId, u64>,
}

impl Cache for LruCache {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            clock: 0,
            order: BTreeMap::new(),
            stamps: HashMap::with_capacity(capacity),
            reserved: HashMap::new(),
        }
    }

    fn add(&mut self, frame_id: FrameId) {
        if self.stamps.contains_key(&frame_id) {
            return;
        }
        self.clock += 1;
        self.order.insert(self.clock, frame_id);
        self.stamps.insert(frame_id, self.clock);
    }

    fn remove(&mut self, frame_id: FrameId) {
        if let Some(stamp) = self.stamps.remove(&frame_id) {
            self.order.remove(&stamp);
        }
    }

    fn size(&self) -> usize {
        self.stamps.len()
    }

    fn peek(&mut self) -> Option<FrameId> {
        let (stamp, frame_id) = self.order.pop_first()?;
        self.stamps.remove(&frame_id);
        self.reserved.insert(frame_id, stamp);
        Some(frame_id)
    }

    fn evict(&mut self, frame_id: FrameId) {
        self.reserved.remove(&frame_id);
    }

    fn unpeek(&mut self, frame_id: FrameId) {
        if let Some(stamp) = self.reserved.remove(&frame_id) {
            self.order.insert(stamp, frame_id);
            self.stamps.insert(frame_id, stamp);
        }
    }

    fn contains(&self, frame_id: FrameId) -> bool {
        self.stamps.contains_key(&frame_id)
    }
}
