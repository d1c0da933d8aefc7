use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pagepool::common::config::DEFAULT_POOL_SIZE;
use pagepool::{BufferPool, Cache, ClockCache, FifoCache, LruCache, MemoryStorage, Page, PageId};
use tokio::runtime::{Builder, Runtime};

const PAGES: u32 = 256;

fn runtime() -> Runtime {
    Builder::new_current_thread().build().unwrap()
}

fn storage() -> MemoryStorage {
    MemoryStorage::with_pages((0..PAGES).map(|id| (PageId::new(id), Page::filled(id as u8))))
}

/// Acquire and release one resident page.
fn bench_hit<C: Cache>(c: &mut Criterion, name: &str) {
    let rt = runtime();
    let pool: BufferPool<C, _> = BufferPool::new(DEFAULT_POOL_SIZE, storage()).unwrap();
    rt.block_on(async {
        let page = pool.acquire(PageId::new(0)).await.unwrap();
        pool.release_ref(page).unwrap();
    });

    c.bench_function(&format!("acquire_hit_{}", name), |b| {
        b.iter(|| {
            rt.block_on(async {
                let page = pool.acquire(black_box(PageId::new(0))).await.unwrap();
                black_box(page.as_slice()[0]);
                pool.release_ref(page).unwrap();
            })
        })
    });
}

/// Cycle through more pages than frames so every acquire evicts.
fn bench_miss<C: Cache>(c: &mut Criterion, name: &str) {
    let rt = runtime();
    let pool: BufferPool<C, _> = BufferPool::new(DEFAULT_POOL_SIZE, storage()).unwrap();
    let mut next = 0u32;

    c.bench_function(&format!("acquire_miss_{}", name), |b| {
        b.iter(|| {
            let page_id = PageId::new(next);
            next = (next + 1) % PAGES;
            rt.block_on(async {
                let page = pool.acquire(page_id).await.unwrap();
                black_box(page.as_slice()[0]);
                pool.release_ref(page).unwrap();
            })
        })
    });
}

fn acquire_benches(c: &mut Criterion) {
    bench_hit::<FifoCache>(c, "fifo");
    bench_hit::<LruCache>(c, "lru");
    bench_hit::<ClockCache>(c, "clock");

    bench_miss::<FifoCache>(c, "fifo");
    bench_miss::<LruCache>(c, "lru");
    bench_miss::<ClockCache>(c, "clock");
}

criterion_group!(benches, acquire_benches);
criterion_main!(benches);
