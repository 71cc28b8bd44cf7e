//! Per-list loading flags.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::operation::CachedList;

#[derive(Debug, Default)]
pub(crate) struct LoadingFlags {
    collections: AtomicBool,
    collection_items: AtomicBool,
    wishlist_items: AtomicBool,
}

impl LoadingFlags {
    fn flag(&self, list: CachedList) -> &AtomicBool {
        match list {
            CachedList::Collections => &self.collections,
            CachedList::CollectionItems => &self.collection_items,
            CachedList::WishlistItems => &self.wishlist_items,
        }
    }

    pub fn is_set(&self, list: CachedList) -> bool {
        self.flag(list).load(Ordering::Acquire)
    }

    /// Raise the flag until the returned guard is dropped.
    pub fn begin(&self, list: CachedList) -> LoadingGuard<'_> {
        let flag = self.flag(list);
        flag.store(true, Ordering::Release);
        LoadingGuard { flag }
    }
}

/// Clears its flag on drop, whichever way the fetch ends.
pub(crate) struct LoadingGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
