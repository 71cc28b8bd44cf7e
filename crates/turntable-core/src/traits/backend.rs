//! Backend trait.

use async_trait::async_trait;

use crate::Result;
use crate::model::{Collection, CollectionItem, Wishlist, WishlistItem};
use crate::types::{CollectionId, CollectionItemId, RecordRef, WishlistItemId};

/// Optional endpoints a backend may or may not expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// `POST /wishlists/items/{id}/move-to-collection` exists and moves a
    /// wishlist entry into a collection in one transaction.
    pub atomic_move: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self { atomic_move: true }
    }
}

/// The remote source of truth for collections and the wishlist.
///
/// Every method is one round trip. Implementations enforce the membership
/// invariant (a record is never in the collection and on the wishlist at
/// the same time); callers trust it.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Which optional endpoints are available.
    fn capabilities(&self) -> Capabilities {
        Capabilities::default()
    }

    /// `GET /collections`
    async fn list_collections(&self) -> Result<Vec<Collection>>;

    /// `POST /collections`
    async fn create_collection(&self, name: &str) -> Result<Collection>;

    /// `GET /collections/{id}`, returning the embedded items.
    async fn collection_items(&self, collection: &CollectionId) -> Result<Vec<CollectionItem>>;

    /// `POST /collections/{id}/items`. Always adds a new copy.
    async fn add_collection_item(
        &self,
        collection: &CollectionId,
        record: &RecordRef,
    ) -> Result<CollectionItem>;

    /// `DELETE /collections/{id}/items/{item_id}`. Not found if absent.
    async fn remove_collection_item(
        &self,
        collection: &CollectionId,
        item: &CollectionItemId,
    ) -> Result<()>;

    /// `GET /wishlists`
    async fn wishlist(&self) -> Result<Wishlist>;

    /// `POST /wishlists/items`
    async fn add_wishlist_item(&self, record: &RecordRef) -> Result<WishlistItem>;

    /// `DELETE /wishlists/records/{item_id}`
    async fn remove_wishlist_item(&self, item: &WishlistItemId) -> Result<()>;

    /// `POST /wishlists/items/{id}/move-to-collection`. Only meaningful when
    /// [`Capabilities::atomic_move`] is set.
    async fn move_to_collection(
        &self,
        item: &WishlistItemId,
        collection: &CollectionId,
    ) -> Result<CollectionItem>;
}
