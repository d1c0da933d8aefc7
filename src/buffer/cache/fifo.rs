//! FIFO (First-In-First-Out) eviction.

use std::collections::{HashSet, VecDeque};

use crate::buffer::cache::Cache;
use crate::common::FrameId;

/// Evicts frames in the order they were first released after a load.
///
/// A frame joins the queue the first time it is added after being loaded
/// (or at pool start), so a page loaded earlier but released later is
/// evicted later. Pinning and releasing it again does not move it.
/// Pinned frames keep their place and are skipped by `peek`.
pub struct FifoCache {
    /// Frame IDs in first-release order (front = oldest).
    queue: VecDeque<FrameId>,

    /// Set for O(1) membership check.
    in_queue: HashSet<FrameId>,

    /// Frames that are currently evictable (pin_count == 0).
    evictable: HashSet<FrameId>,
}

impl Cache for FifoCache {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            queue: VecDeque::with_capacity(capacity),
            in_queue: HashSet::with_capacity(capacity),
            evictable: HashSet::with_capacity(capacity),
        }
    }

    fn add(&mut self, frame_id: FrameId) {
        if self.in_queue.insert(frame_id) {
            self.queue.push_back(frame_id);
        }
        self.evictable.insert(frame_id);
    }

    fn remove(&mut self, frame_id: FrameId) {
        self.evictable.remove(&frame_id);
    }

    fn size(&self) -> usize {
        self.evictable.len()
    }

    fn peek(&mut self) -> Option<FrameId> {
        let frame_id = self
            .queue
            .iter()
            .copied()
            .find(|f| self.evictable.contains(f))?;
        self.evictable.remove(&frame_id);
        Some(frame_id)
    }

    fn evict(&mut self, frame_id: FrameId) {
        // The frame re-enters at the back when its new page is released.
        if self.in_queue.remove(&frame_id) {
            self.queue.retain(|&f| f != frame_id);
        }
    }

    fn unpeek(&mut self, frame_id: FrameId) {
        self.evictable.insert(frame_id);
    }

    fn contains(&self, frame_id: FrameId) -> bool {
        self.evictable.contains(&frame_id)
    }
}
