//! Page index clamping against the latest known total.
//!
//! The guard stays idle while a fetch is in flight: the total it would use
//! belongs to the previous snapshot, and moving the page would supersede the
//! very fetch that is about to report the correct total.

use crate::store::PagerStore;

/// Highest valid page index for `total` rows split into pages of `page_size`.
///
/// Always at least 1.
pub fn max_page_index(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size.max(1)).max(1)
}

/// Page index `page_index` should be moved to, if any.
///
/// Only ever lowers the index.
pub fn clamped_page_index(page_index: usize, page_size: usize, total: usize) -> Option<usize> {
    if total == 0 {
        return (page_index != 1).then_some(1);
    }
    let max = max_page_index(total, page_size);
    (page_index > max).then_some(max)
}

/// Apply the clamp to `store`. Returns whether the page moved.
pub fn clamp_page(store: &mut PagerStore, total: usize, loading: bool) -> bool {
    if loading {
        return false;
    }
    let page = store.page();
    match clamped_page_index(page.page_index, page.page_size, total) {
        Some(index) => {
            tracing::debug!(
                from = page.page_index,
                to = index,
                total,
                "Clamping page index"
            );
            store.set_page(index)
        }
        None => false,
    }
}
