//! Which cached lists each mutation invalidates.

use std::fmt;

/// A list the synchronizer keeps in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CachedList {
    /// All of the user's collections.
    Collections,
    /// Items of the default collection.
    CollectionItems,
    /// Items of the wishlist.
    WishlistItems,
}

impl CachedList {
    pub fn as_str(self) -> &'static str {
        match self {
            CachedList::Collections => "collections",
            CachedList::CollectionItems => "collection_items",
            CachedList::WishlistItems => "wishlist_items",
        }
    }
}

impl fmt::Display for CachedList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A mutating synchronizer operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    AddToCollection,
    AddToWishlist,
    RemoveFromCollection,
    RemoveFromWishlist,
    MoveToCollection,
    MoveToWishlist,
}

impl Operation {
    /// Lists to refetch after this operation succeeds.
    ///
    /// Adding a copy may drop the record from the wishlist on the backend
    /// side, so every operation that puts a record into the collection
    /// refreshes both lists. Removing a copy never puts a record on the
    /// wishlist.
    pub fn refreshes(self) -> &'static [CachedList] {
        use CachedList::*;
        match self {
            Operation::AddToCollection => &[CollectionItems, WishlistItems],
            Operation::AddToWishlist => &[WishlistItems],
            Operation::RemoveFromCollection => &[CollectionItems],
            Operation::RemoveFromWishlist => &[WishlistItems],
            Operation::MoveToCollection => &[CollectionItems, WishlistItems],
            Operation::MoveToWishlist => &[CollectionItems, WishlistItems],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Operation::AddToCollection => "add_to_collection",
            Operation::AddToWishlist => "add_to_wishlist",
            Operation::RemoveFromCollection => "remove_from_collection",
            Operation::RemoveFromWishlist => "remove_from_wishlist",
            Operation::MoveToCollection => "move_to_collection",
            Operation::MoveToWishlist => "move_to_wishlist",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
