//! Concurrent acquire tests. `GatedStorage` parks fetches so each test can
//! inspect the pool while loads are in flight.

mod common;

use std::sync::Arc;

use common::{setup_logger, storage_with, GatedStorage};
use pagepool::{BufferPool, ClockCache, Error, FifoCache, FrameId, LruCache, PageId};

type GatedPool<C> = Arc<BufferPool<C, GatedStorage>>;

fn gated_pool<C: pagepool::Cache>(capacity: usize, ids: &[u32]) -> GatedPool<C> {
    setup_logger();
    let storage = GatedStorage::new(storage_with(ids));
    Arc::new(BufferPool::new(capacity, storage).unwrap())
}

/// Acquire `page_id` on a task and keep the pin. Resolves to the frame and
/// the first byte of the page.
fn spawn_acquire<C: pagepool::Cache + 'static>(
    pool: &GatedPool<C>,
    page_id: PageId,
) -> tokio::task::JoinHandle<pagepool::Result<(FrameId, u8)>> {
    let pool = Arc::clone(pool);
    tokio::spawn(async move {
        let page = pool.acquire(page_id).await?;
        Ok((page.frame_id(), page.as_slice()[0]))
    })
}

// ============================================================================
// Concurrent misses
// ============================================================================

#[tokio::test]
async fn test_concurrent_misses_use_distinct_frames() {
    let pool = gated_pool::<FifoCache>(2, &[1, 2, 3]);

    let first = spawn_acquire(&pool, PageId::new(1));
    let second = spawn_acquire(&pool, PageId::new(2));
    pool.storage().wait_for_waiters(2).await;

    // Both frames are reserved for loads
    let states = pool.frame_states();
    assert!(states.iter().all(|s| s.loading && !s.evictable));
    assert_eq!(pool.evictable_count(), 0);

    // A third miss has nowhere to go and does not wait
    assert!(matches!(
        pool.acquire(PageId::new(3)).await,
        Err(Error::NoEvictableFrame)
    ));

    pool.storage().open(2);
    let (f1, b1) = first.await.unwrap().unwrap();
    let (f2, b2) = second.await.unwrap().unwrap();

    assert_ne!(f1, f2);
    assert_eq!((b1, b2), (1, 2));
    assert_eq!(pool.pin_count(PageId::new(1)), Some(1));
    assert_eq!(pool.pin_count(PageId::new(2)), Some(1));
    assert!(pool.frame_states().iter().all(|s| !s.loading));
}

#[tokio::test]
async fn test_hit_does_not_wait_for_other_load() {
    let pool = gated_pool::<LruCache>(2, &[1, 2]);

    pool.storage().open(1);
    let page = pool.acquire(PageId::new(1)).await.unwrap();
    pool.release_ref(page).unwrap();

    let pending = spawn_acquire(&pool, PageId::new(2));
    pool.storage().wait_for_waiters(1).await;

    // Page 1 is served while page 2 is parked
    let page = pool.acquire(PageId::new(1)).await.unwrap();
    assert_eq!(page.as_slice()[0], 1);
    pool.release_ref(page).unwrap();

    pool.storage().open(1);
    assert_eq!(pending.await.unwrap().unwrap().1, 2);
    assert_eq!(pool.storage().inner().fetch_count(), 2);
}

#[tokio::test]
async fn test_same_page_concurrent_miss_keeps_one_copy() {
    let pool = gated_pool::<ClockCache>(2, &[7]);

    let first = spawn_acquire(&pool, PageId::new(7));
    let second = spawn_acquire(&pool, PageId::new(7));
    pool.storage().wait_for_waiters(2).await;
    assert!(!pool.is_resident(PageId::new(7)));

    pool.storage().open(2);
    let (f1, _) = first.await.unwrap().unwrap();
    let (f2, _) = second.await.unwrap().unwrap();

    assert_eq!(f1, f2);
    assert_eq!(pool.pin_count(PageId::new(7)), Some(2));
    assert_eq!(pool.resident_count(), 1);
    assert_eq!(pool.evictable_count(), 1);

    let spare = pool.frame_states().into_iter().find(|s| s.frame_id != f1).unwrap();
    assert_eq!(spare.page_id, None);
    assert!(spare.evictable);

    pool.release(PageId::new(7)).unwrap();
    pool.release(PageId::new(7)).unwrap();
    assert_eq!(pool.evictable_count(), 2);
}

// ============================================================================
// Cancellation
// ============================================================================

#[tokio::test]
async fn test_aborted_acquire_returns_frame() {
    let pool = gated_pool::<LruCache>(1, &[1, 2]);

    pool.storage().open(1);
    let page = pool.acquire(PageId::new(1)).await.unwrap();
    pool.release_ref(page).unwrap();

    let pending = spawn_acquire(&pool, PageId::new(2));
    pool.storage().wait_for_waiters(1).await;

    // The victim's page is unmapped while the load is in flight
    assert!(!pool.is_resident(PageId::new(1)));
    assert!(pool.frame_states()[0].loading);

    pending.abort();
    assert!(pending.await.unwrap_err().is_cancelled());

    let state = pool.frame_states()[0];
    assert!(!state.loading);
    assert!(state.evictable);
    assert_eq!(state.page_id, Some(PageId::new(1)));
    assert_eq!(pool.pin_count(PageId::new(1)), Some(0));

    // Page 1 is still served without another fetch
    let page = pool.acquire(PageId::new(1)).await.unwrap();
    assert_eq!(page.as_slice()[0], 1);
    assert_eq!(pool.storage().inner().fetch_count(), 1);
}

// ============================================================================
// Stress
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_acquire_release() {
    setup_logger();
    const PAGES: u32 = 16;
    const TASKS: u32 = 8;
    const ROUNDS: u32 = 200;

    let ids: Vec<u32> = (0..PAGES).collect();
    let pool = Arc::new(BufferPool::<LruCache, _>::new(4, storage_with(&ids)).unwrap());

    let mut handles = Vec::new();
    for task in 0..TASKS {
        let pool = Arc::clone(&pool);
        handles.push(tokio::spawn(async move {
            for round in 0..ROUNDS {
                let page_id = PageId::new((task * 7 + round * 13) % PAGES);
                let page = loop {
                    match pool.acquire(page_id).await {
                        Ok(page) => break page,
                        Err(e) if e.is_retryable() => tokio::task::yield_now().await,
                        Err(e) => panic!("acquire {} failed: {}", page_id, e),
                    }
                };
                assert_eq!(page.as_slice()[0], page_id.0 as u8);
                pool.release_ref(page).unwrap();
            }
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(pool.evictable_count(), pool.capacity());
    assert!(pool
        .frame_states()
        .iter()
        .all(|s| s.pin_count == 0 && !s.loading));

    let stats = pool.stats().snapshot();
    let failed = stats.exhaustions + stats.fetch_failures;
    assert_eq!(stats.cache_hits + stats.cache_misses, u64::from(TASKS * ROUNDS) + failed);
}
