//! The page storage capability consumed by the buffer pool.

use std::future::Future;

use crate::common::{PageId, Result};
use crate::storage::Page;

/// Durable page storage: maps a [`PageId`] to the content of a [`Page`].
///
/// The buffer pool only ever reads through this trait. How pages get into
/// storage, and how they are persisted, is the implementation's business.
///
/// # Contract
/// `fetch_page` loads `page_id` into `page` and reports:
/// - `Ok(true)` if the page exists and `page` now holds its content;
/// - `Ok(false)` if the page does not exist;
/// - `Err(_)` if the page could not be read.
///
/// **On anything but `Ok(true)` the buffer must be left untouched.** The
/// pool fetches straight into a resident frame and relies on this to keep
/// the old page intact when a load fails.
///
/// `fetch_page` may suspend for I/O. Timeouts, if wanted, belong here and
/// not in the pool.
pub trait PageStorage: Send + Sync {
    /// Load `page_id` into `page`.
    fn fetch_page(
        &self,
        page_id: PageId,
        page: &mut Page,
    ) -> impl Future<Output = Result<bool>> + Send;
}
