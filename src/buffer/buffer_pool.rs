//! Buffer Pool - the core page caching layer.
//!
//! The [`BufferPool`] provides:
//! - Page caching between storage and memory
//! - Pin-based reference counting
//! - Pluggable eviction caches
//! - Load-before-evict: a victim keeps its page until the new one arrives

use std::collections::HashMap;

use log::{debug, info, trace, warn};
use parking_lot::Mutex;

use crate::buffer::cache::Cache;
use crate::buffer::frame::{Frame, FrameMeta, FrameState};
use crate::buffer::{BufferPoolStats, PageRef};
use crate::common::{Error, FrameId, PageId, Result};
use crate::storage::{Page, PageStorage};

/// Caches pages from a [`PageStorage`] in a fixed number of frames.
///
/// # Architecture
/// ```text
/// ┌──────────────────────────────────────────────────────────────┐
/// │                         BufferPool                           │
/// │  state: Mutex<PoolState>          frames: Vec<Frame>         │
/// │  ┌──────────────┐                 ┌────────────────────────┐ │
/// │  │ page_table   │── FrameId ─────▶│ [RwLock<Page>] ...     │ │
/// │  │PageId → Fid  │                 └────────────────────────┘ │
/// │  ├──────────────┤                 ┌────────────────────────┐ │
/// │  │ meta[i]      │ page_id, pins   │ storage: S             │ │
/// │  ├──────────────┤                 │  fetch_page(id, &mut)  │ │
/// │  │ cache: C     │ evictable set   └────────────────────────┘ │
/// │  └──────────────┘                                            │
/// └──────────────────────────────────────────────────────────────┘
/// ```
///
/// # Invariants
/// Outside of `acquire`/`release`:
/// - `meta[i].pin_count > 0` ⇒ the cache does not contain `i`;
/// - `meta[i].pin_count == 0` and not loading ⇒ the cache contains `i`;
/// - the page table maps each resident page to exactly one frame.
///
/// # Concurrency
/// All bookkeeping sits behind one mutex that is never held across an
/// `.await`. The storage fetch in the miss path is the only suspension
/// point. The frame being loaded is reserved in the cache before the fetch
/// and unmapped from the page table, so concurrent misses always load into
/// different frames and nobody can read a frame while it is overwritten.
/// Dropping an `acquire` future mid-fetch hands the frame back untouched.
///
/// # Usage
/// ```ignore
/// let pool: BufferPool<LruCache, _> = BufferPool::new(64, storage)?;
///
/// let page = pool.acquire(PageId::new(7)).await?;
/// let header = &page.as_slice()[..16];
/// pool.release_ref(page)?;
/// ```
pub struct BufferPool<C: Cache, S: PageStorage> {
    /// Fixed pool of page buffers allocated at startup.
    frames: Vec<Frame>,

    /// Page table, frame metadata and eviction cache.
    state: Mutex<PoolState<C>>,

    /// Where missing pages are fetched from.
    storage: S,

    /// Performance statistics.
    stats: BufferPoolStats,
}

struct PoolState<C> {
    /// Resident, non-loading pages.
    page_table: HashMap<PageId, FrameId>,

    /// Indexed by frame.
    meta: Vec<FrameMeta>,

    cache: C,
}

impl<C: Cache, S: PageStorage> BufferPool<C, S> {
    /// Create a buffer pool with `pool_size` empty frames.
    ///
    /// Every frame starts evictable, registered with the cache in index
    /// order.
    ///
    /// # Errors
    /// `Error::InvalidPoolSize` if `pool_size` is 0.
    pub fn new(pool_size: usize, storage: S) -> Result<Self> {
        if pool_size == 0 {
            return Err(Error::InvalidPoolSize);
        }

        let frames = (0..pool_size).map(|_| Frame::new()).collect();
        let meta = (0..pool_size).map(|_| FrameMeta::default()).collect();

        let mut cache = C::with_capacity(pool_size);
        for i in 0..pool_size {
            cache.add(FrameId::new(i));
        }

        info!("buffer pool initialized with {} frames", pool_size);

        Ok(Self {
            frames,
            state: Mutex::new(PoolState {
                page_table: HashMap::with_capacity(pool_size),
                meta,
                cache,
            }),
            storage,
            stats: BufferPoolStats::new(),
        })
    }

    /// Number of frames. Fixed for the lifetime of the pool.
    pub fn capacity(&self) -> usize {
        self.frames.len()
    }

    // ========================================================================
    // Public API: acquire / release
    // ========================================================================

    /// Pin `page_id` and return a reference to its content.
    ///
    /// A resident page is pinned again without suspending. Otherwise an
    /// evictable frame is reserved and the page is fetched into it; the
    /// frame's previous page is only dropped once the fetch succeeds.
    ///
    /// # Errors
    /// - `Error::InvalidPageId` for `PageId::INVALID`
    /// - `Error::NoEvictableFrame` if every frame is pinned or loading
    /// - `Error::PageNotFound` if storage has no such page
    /// - `Error::FrameInUse` if every evictable frame is still borrowed by a
    ///   released `PageRef`
    /// - any error from the storage fetch
    ///
    /// On error nothing changes: pins, resident pages and evictable frames
    /// are as before the call.
    pub async fn acquire(&self, page_id: PageId) -> Result<PageRef<'_>> {
        if !page_id.is_valid() {
            return Err(Error::InvalidPageId(page_id));
        }

        let frame_id = {
            let mut state = self.state.lock();

            if let Some(frame_id) = state.pin_resident(page_id) {
                drop(state);
                BufferPoolStats::bump(&self.stats.cache_hits);
                trace!("hit {} in {}", page_id, frame_id);
                return Ok(self.page_ref(frame_id, page_id));
            }

            BufferPoolStats::bump(&self.stats.cache_misses);
            match state.reserve_victim() {
                Ok(frame_id) => frame_id,
                Err(e) => {
                    BufferPoolStats::bump(&self.stats.exhaustions);
                    debug!("cannot load {}: {}", page_id, e);
                    return Err(e);
                }
            }
        };

        let mut reservation = Reservation::new(&self.state, frame_id);

        // Skip victims still borrowed by a released PageRef.
        let mut borrowed = Vec::new();
        let mut page = loop {
            let frame_id = reservation.frame_id;
            if let Some(page) = self.frames[frame_id.index()].try_write() {
                break page;
            }
            warn!("{} is still borrowed after release, skipping it for {}", frame_id, page_id);

            let next = self.state.lock().reserve_victim();
            match next {
                Ok(next) => borrowed.push(std::mem::replace(
                    &mut reservation,
                    Reservation::new(&self.state, next),
                )),
                Err(_) => {
                    BufferPoolStats::bump(&self.stats.fetch_failures);
                    reservation.cancel();
                    Reservation::cancel_all(borrowed);
                    return Err(Error::FrameInUse(frame_id));
                }
            }
        };
        Reservation::cancel_all(borrowed);

        if let Err(e) = self.load(&mut page, page_id).await {
            BufferPoolStats::bump(&self.stats.fetch_failures);
            debug!("loading {} into {} failed: {}", page_id, reservation.frame_id, e);
            drop(page);
            reservation.cancel();
            return Err(e);
        }
        drop(page);

        let (frame_id, displaced) = reservation.commit(page_id);
        if let Some(old) = displaced {
            BufferPoolStats::bump(&self.stats.evictions);
            debug!("evicted {} from {} for {}", old, frame_id, page_id);
        } else {
            debug!("loaded {} into {}", page_id, frame_id);
        }

        Ok(self.page_ref(frame_id, page_id))
    }

    /// Drop one pin on `page_id`.
    ///
    /// When the last pin goes, the frame becomes evictable.
    ///
    /// # Errors
    /// - `Error::PageNotResident` if the page is not in the pool
    /// - `Error::PageNotPinned` if the page has no pins left
    pub fn release(&self, page_id: PageId) -> Result<()> {
        let mut state = self.state.lock();

        let frame_id = *state
            .page_table
            .get(&page_id)
            .ok_or(Error::PageNotResident(page_id))?;

        let meta = &mut state.meta[frame_id.index()];
        if !meta.is_pinned() {
            return Err(Error::PageNotPinned(page_id));
        }
        if meta.unpin() == 0 {
            state.cache.add(frame_id);
            trace!("{} in {} is evictable", page_id, frame_id);
        }

        Ok(())
    }

    /// Drop `page` and release its pin.
    pub fn release_ref(&self, page: PageRef<'_>) -> Result<()> {
        let page_id = page.page_id();
        drop(page);
        self.release(page_id)
    }

    // ========================================================================
    // Public API: introspection
    // ========================================================================

    /// Pin count of a resident page, or None if the page is not resident.
    pub fn pin_count(&self, page_id: PageId) -> Option<usize> {
        let state = self.state.lock();
        let frame_id = state.page_table.get(&page_id)?;
        Some(state.meta[frame_id.index()].pin_count)
    }

    /// Whether `page_id` is resident.
    pub fn is_resident(&self, page_id: PageId) -> bool {
        self.state.lock().page_table.contains_key(&page_id)
    }

    /// Number of resident pages.
    pub fn resident_count(&self) -> usize {
        self.state.lock().page_table.len()
    }

    /// Number of frames the cache could evict right now.
    pub fn evictable_count(&self) -> usize {
        self.state.lock().cache.size()
    }

    /// Snapshot of every frame, in frame order.
    pub fn frame_states(&self) -> Vec<FrameState> {
        let state = self.state.lock();
        state
            .meta
            .iter()
            .enumerate()
            .map(|(i, meta)| {
                let frame_id = FrameId::new(i);
                FrameState {
                    frame_id,
                    page_id: meta.page_id,
                    pin_count: meta.pin_count,
                    evictable: state.cache.contains(frame_id),
                    loading: meta.loading,
                }
            })
            .collect()
    }

    /// Get buffer pool statistics.
    pub fn stats(&self) -> &BufferPoolStats {
        &self.stats
    }

    /// The storage pages are fetched from.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    // ========================================================================
    // Internal
    // ========================================================================

    /// Fetch `page_id` into a reserved frame's buffer.
    async fn load(&self, page: &mut Page, page_id: PageId) -> Result<()> {
        if self.storage.fetch_page(page_id, page).await? {
            Ok(())
        } else {
            Err(Error::PageNotFound(page_id))
        }
    }

    fn page_ref(&self, frame_id: FrameId, page_id: PageId) -> PageRef<'_> {
        PageRef::new(frame_id, page_id, self.frames[frame_id.index()].read())
    }
}

impl<C: Cache> PoolState<C> {
    /// Pin a resident page. None on a miss.
    fn pin_resident(&mut self, page_id: PageId) -> Option<FrameId> {
        let frame_id = *self.page_table.get(&page_id)?;
        if self.meta[frame_id.index()].pin() == 1 {
            self.cache.remove(frame_id);
        }
        Some(frame_id)
    }

    /// Reserve a victim frame and unmap its page.
    fn reserve_victim(&mut self) -> Result<FrameId> {
        if self.cache.size() == 0 {
            return Err(Error::NoEvictableFrame);
        }
        let frame_id = self.cache.peek().ok_or(Error::NoEvictableFrame)?;

        let meta = &mut self.meta[frame_id.index()];
        debug_assert!(!meta.is_pinned(), "cache offered pinned {}", frame_id);
        meta.loading = true;
        if let Some(old) = meta.page_id {
            self.page_table.remove(&old);
        }

        Ok(frame_id)
    }

    /// Undo `reserve_victim`. The frame's buffer is untouched.
    fn cancel(&mut self, frame_id: FrameId) {
        let meta = &mut self.meta[frame_id.index()];
        meta.loading = false;
        if let Some(old) = meta.page_id {
            if self.page_table.contains_key(&old) {
                // Reloaded elsewhere while we held the frame: keep one copy.
                meta.page_id = None;
            } else {
                self.page_table.insert(old, frame_id);
            }
        }
        self.cache.unpeek(frame_id);
    }

    /// Make a reserved frame the home of `page_id`, pinned once.
    ///
    /// Returns the frame now holding the page and the page displaced from
    /// the reserved frame, if any.
    fn commit(&mut self, frame_id: FrameId, page_id: PageId) -> (FrameId, Option<PageId>) {
        let meta = &mut self.meta[frame_id.index()];
        meta.loading = false;
        let displaced = meta.page_id.take();
        self.cache.evict(frame_id);

        // A concurrent acquire loaded the same page first. Use its frame;
        // ours now holds a duplicate and goes back empty.
        if let Some(existing) = self.pin_resident(page_id) {
            self.cache.add(frame_id);
            return (existing, displaced);
        }

        let meta = &mut self.meta[frame_id.index()];
        meta.page_id = Some(page_id);
        meta.pin_count = 1;
        self.page_table.insert(page_id, frame_id);

        (frame_id, displaced)
    }
}

/// A frame reserved for a load.
///
/// Ends with [`commit`](Reservation::commit) or
/// [`cancel`](Reservation::cancel); if dropped before either (the acquire
/// future was abandoned mid-fetch) it cancels.
struct Reservation<'a, C: Cache> {
    state: &'a Mutex<PoolState<C>>,
    frame_id: FrameId,
    armed: bool,
}

impl<'a, C: Cache> Reservation<'a, C> {
    fn new(state: &'a Mutex<PoolState<C>>, frame_id: FrameId) -> Self {
        Self {
            state,
            frame_id,
            armed: true,
        }
    }

    fn commit(mut self, page_id: PageId) -> (FrameId, Option<PageId>) {
        self.armed = false;
        let mut state = self.state.lock();
        state.commit(self.frame_id, page_id)
    }

    fn cancel(mut self) {
        self.armed = false;
        let mut state = self.state.lock();
        state.cancel(self.frame_id);
    }

    /// Cancel newest first, so each cache sees its reservations unwound in
    /// reverse order.
    fn cancel_all(reservations: Vec<Self>) {
        for reservation in reservations.into_iter().rev() {
            reservation.cancel();
        }
    }
}

impl<C: Cache> Drop for Reservation<'_, C> {
    fn drop(&mut self) {
        if self.armed {
            debug!("load into {} abandoned, releasing reservation", self.frame_id);
            self.state.lock().cancel(self.frame_id);
        }
    }
}
