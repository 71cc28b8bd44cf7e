//! Display status of a record relative to the user's lists.

use crate::model::{CollectionItem, WishlistItem};
use crate::types::{CollectionItemId, RecordIdentity, WishlistItemId};

/// Where a record currently sits. Exactly one of these holds at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordStatus {
    NotAdded,
    InCollection {
        /// Number of owned copies.
        copies: usize,
        /// The first matching copy in list order.
        first_item: CollectionItemId,
    },
    InWishlist {
        item: WishlistItemId,
    },
}

impl RecordStatus {
    pub fn is_in_collection(&self) -> bool {
        matches!(self, RecordStatus::InCollection { .. })
    }

    pub fn is_in_wishlist(&self) -> bool {
        matches!(self, RecordStatus::InWishlist { .. })
    }
}

/// Derive the status of a record from the cached lists.
///
/// A record matches an item when either its catalog id or its internal id
/// equals the item's. The collection is checked first; the backend never
/// lets a record be on both lists.
pub fn derive_status(
    record: &RecordIdentity,
    collection: &[CollectionItem],
    wishlist: &[WishlistItem],
) -> RecordStatus {
    if record.is_empty() {
        return RecordStatus::NotAdded;
    }

    let mut copies = collection.iter().filter(|i| record.matches(&i.identity()));
    if let Some(first) = copies.next() {
        return RecordStatus::InCollection {
            copies: 1 + copies.count(),
            first_item: first.id,
        };
    }

    wishlist
        .iter()
        .find(|i| record.matches(&i.identity()))
        .map(|i| RecordStatus::InWishlist { item: i.id })
        .unwrap_or(RecordStatus::NotAdded)
}
