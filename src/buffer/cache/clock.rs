//! CLOCK (second chance) eviction.

use std::collections::HashMap;

use crate::buffer::cache::Cache;
use crate::common::FrameId;

/// Approximates LRU with one reference bit per frame.
///
/// `add` sets the frame's reference bit. `peek` sweeps the hand over the
/// frames: an evictable frame with its bit set gets a second chance (the
/// bit is cleared), the first evictable frame with a clear bit is chosen.
///
/// A reservation remembers where the hand started and which bits its sweep
/// cleared; `unpeek` puts both back.
pub struct ClockCache {
    evictable: Vec<bool>,
    referenced: Vec<bool>,
    hand: usize,
    /// Number of `true` entries in `evictable`.
    len: usize,
    reserved: HashMap<FrameId, Sweep>,
}

/// What one `peek` changed.
struct Sweep {
    hand: usize,
    cleared: Vec<usize>,
}

impl ClockCache {
    fn advance(&mut self) -> usize {
        let frame = self.hand;
        self.hand = (self.hand + 1) % self.evictable.len();
        frame
    }
}

impl Cache for ClockCache {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            evictable: vec![false; capacity],
            referenced: vec![false; capacity],
            hand: 0,
            len: 0,
            reserved: HashMap::new(),
        }
    }

    fn add(&mut self, frame_id: FrameId) {
        let i = frame_id.index();
        if !self.evictable[i] {
            self.evictable[i] = true;
            self.referenced[i] = true;
            self.len += 1;
        }
    }

    fn remove(&mut self, frame_id: FrameId) {
        let i = frame_id.index();
        if self.evictable[i] {
            self.evictable[i] = false;
            self.len -= 1;
        }
    }

    fn size(&self) -> usize {
        self.len
    }

    fn peek(&mut self) -> Option<FrameId> {
        if self.len == 0 {
            return None;
        }

        let mut sweep = Sweep {
            hand: self.hand,
            cleared: Vec::new(),
        };

        // At most two sweeps: the first clears every bit it passes.
        loop {
            let i = self.advance();
            if !self.evictable[i] {
                continue;
            }
            if self.referenced[i] {
                self.referenced[i] = false;
                sweep.cleared.push(i);
            } else {
                self.evictable[i] = false;
                self.len -= 1;
                let frame_id = FrameId::new(i);
                self.reserved.insert(frame_id, sweep);
                return Some(frame_id);
            }
        }
    }

    fn evict(&mut self, frame_id: FrameId) {
        self.reserved.remove(&frame_id);
        self.referenced[frame_id.index()] = false;
    }

    fn unpeek(&mut self, frame_id: FrameId) {
        let i = frame_id.index();
        if !self.evictable[i] {
            self.evictable[i] = true;
            self.len += 1;
        }
        if let Some(sweep) = self.reserved.remove(&frame_id) {
            for j in sweep.cleared {
                self.referenced[j] = true;
            }
            self.hand = sweep.hand;
        }
    }

    fn contains(&self, frame_id: FrameId) -> bool {
        self.evictable[frame_id.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fid(i: usize) -> FrameId {
        FrameId::new(i)
    }

    #[test]
    fn test_clock_sweeps_in_order() {
        let mut cache = ClockCache::with_capacity(3);
        for i in 0..3 {
            cache.add(fid(i));
        }

        assert_eq!(cache.peek(), Some(fid(0)));
        assert_eq!(cache.peek(), Some(fid(1)));
        assert_eq!(cache.peek(), Some(fid(2)));
        assert_eq!(cache.peek(), None);
    }

    #[test]
    fn test_clock_second_chance() {
        let mut cache = ClockCache::with_capacity(3);
        for i in 0..3 {
            cache.add(fid(i));
        }

        // First sweep clears all bits and takes frame 0
        let victim = cache.peek().unwrap();
        assert_eq!(victim, fid(0));
        cache.evict(victim);

        // Frame 1 is released again: fresh reference bit
        cache.remove(fid(1));
        cache.add(fid(1));

        // Hand is at 1: skip it (second chance), take 2
        assert_eq!(cache.peek(), Some(fid(2)));
    }

    #[test]
    fn test_clock_unpeek_restores_sweep() {
        let mut cache = ClockCache::with_capacity(3);
        for i in 0..3 {
            cache.add(fid(i));
        }

        // The sweep clears every bit before taking frame 0
        assert_eq!(cache.peek(), Some(fid(0)));
        cache.unpeek(fid(0));

        // Bits and hand are back: frame 1 released again still loses to 0
        cache.remove(fid(1));
        cache.add(fid(1));
        assert_eq!(cache.peek(), Some(fid(0)));
        assert_eq!(cache.peek(), Some(fid(1)));
    }

    #[test]
    fn test_clock_skips_pinned() {
        let mut cache = ClockCache::with_capacity(3);
        for i in 0..3 {
            cache.add(fid(i));
        }
        cache.remove(fid(0));
        cache.remove(fid(1));

        assert_eq!(cache.size(), 1);
        assert_eq!(cache.peek(), Some(fid(2)));
        assert_eq!(cache.peek(), None);
    }
}
