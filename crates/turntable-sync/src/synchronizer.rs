//! The collection/wishlist synchronizer.

use std::fmt;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use turntable_core::error::{ApiError, InvalidInputError};
use turntable_core::{
    Backend, Collection, CollectionItem, CollectionItemId, ConflictKind, Error, RecordIdentity,
    RecordRef, RecordStatus, Result, WishlistItem, WishlistItemId, derive_status,
};

use crate::config::SyncConfig;
use crate::loading::LoadingFlags;
use crate::operation::{CachedList, Operation};
use crate::strategy::{self, MoveStrategy};

/// A point-in-time copy of the cached lists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub collections: Vec<Collection>,
    /// Lowest `sort_order` collection; every operation targets it.
    pub default_collection: Option<Collection>,
    pub collection_items: Vec<CollectionItem>,
    pub wishlist_items: Vec<WishlistItem>,
}

impl Snapshot {
    /// Where `record` sits according to this snapshot.
    pub fn status(&self, record: &RecordIdentity) -> RecordStatus {
        derive_status(record, &self.collection_items, &self.wishlist_items)
    }
}

/// Caches what the user owns and wants, and mutates both through a
/// [`Backend`].
///
/// Each successful mutation refetches the lists named by
/// [`Operation::refreshes`]. Errors are returned as the backend reported
/// them; nothing is retried. If a refetch fails the remaining lists are
/// still refetched and the first error is returned. Concurrent calls are not serialised: the
/// response that lands last replaces the cached list.
pub struct Synchronizer<B> {
    backend: Arc<B>,
    strategy: Arc<dyn MoveStrategy>,
    config: SyncConfig,
    state: RwLock<Snapshot>,
    loading: LoadingFlags,
}

impl<B: Backend> Synchronizer<B> {
    /// Create a synchronizer with an empty cache. The move strategy is
    /// chosen from the backend's capabilities.
    pub fn new(backend: Arc<B>) -> Self {
        let strategy = strategy::for_capabilities(backend.capabilities());
        debug!(strategy = strategy.name(), "Selected move strategy");
        Self {
            backend,
            strategy,
            config: SyncConfig::default(),
            state: RwLock::new(Snapshot::default()),
            loading: LoadingFlags::default(),
        }
    }

    pub fn with_config(mut self, config: SyncConfig) -> Self {
        self.config = config;
        self
    }

    /// Override the capability-selected move strategy.
    pub fn with_strategy(mut self, strategy: impl MoveStrategy + 'static) -> Self {
        self.strategy = Arc::new(strategy);
        self
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn move_strategy(&self) -> &dyn MoveStrategy {
        self.strategy.as_ref()
    }

    // ========================================================================
    // Read access
    // ========================================================================

    pub async fn snapshot(&self) -> Snapshot {
        self.state.read().await.clone()
    }

    pub async fn default_collection(&self) -> Option<Collection> {
        self.state.read().await.default_collection.clone()
    }

    pub async fn collection_items(&self) -> Vec<CollectionItem> {
        self.state.read().await.collection_items.clone()
    }

    pub async fn wishlist_items(&self) -> Vec<WishlistItem> {
        self.state.read().await.wishlist_items.clone()
    }

    /// Derived status of a record against the cached lists.
    pub async fn status(&self, record: &RecordIdentity) -> RecordStatus {
        self.state.read().await.status(record)
    }

    /// True while a fetch of `list` is in flight.
    pub fn is_loading(&self, list: CachedList) -> bool {
        self.loading.is_set(list)
    }

    // ========================================================================
    // Fetching
    // ========================================================================

    /// Load all collections and select the default one.
    #[instrument(skip(self))]
    pub async fn fetch_collections(&self) -> Result<()> {
        let _loading = self.loading.begin(CachedList::Collections);

        let collections = self.backend.list_collections().await?;
        let default_collection = Collection::pick_default(&collections).cloned();
        debug!(
            count = collections.len(),
            default = ?default_collection.as_ref().map(|c| c.id),
            "Fetched collections"
        );

        let mut state = self.state.write().await;
        state.collections = collections;
        state.default_collection = default_collection;
        Ok(())
    }

    /// Replace the cached items of the default collection. Does nothing
    /// until a default collection is known.
    #[instrument(skip(self))]
    pub async fn fetch_collection_items(&self) -> Result<()> {
        let Some(collection) = self.default_collection().await else {
            debug!("No default collection, skipping item fetch");
            return Ok(());
        };

        let _loading = self.loading.begin(CachedList::CollectionItems);
        let items = self.backend.collection_items(&collection.id).await?;
        debug!(collection = %collection.id, count = items.len(), "Fetched collection items");

        self.state.write().await.collection_items = items;
        Ok(())
    }

    /// Replace the cached wishlist items.
    #[instrument(skip(self))]
    pub async fn fetch_wishlist_items(&self) -> Result<()> {
        let _loading = self.loading.begin(CachedList::WishlistItems);
        let wishlist = self.backend.wishlist().await?;
        debug!(count = wishlist.items.len(), "Fetched wishlist items");

        self.state.write().await.wishlist_items = wishlist.items;
        Ok(())
    }

    /// Fetch collections, then both item lists.
    pub async fn fetch_all(&self) -> Result<()> {
        self.fetch_collections().await?;
        self.fetch_collection_items().await?;
        self.fetch_wishlist_items().await
    }

    /// Refetch every list `operation` touches. A failed refetch does not
    /// stop the others; the first error is returned once all have run.
    async fn refresh_after(&self, operation: Operation) -> Result<()> {
        let mut first_error = None;
        for list in operation.refreshes() {
            debug!(%operation, %list, "Refreshing");
            let result = match list {
                CachedList::Collections => self.fetch_collections().await,
                CachedList::CollectionItems => self.fetch_collection_items().await,
                CachedList::WishlistItems => self.fetch_wishlist_items().await,
            };
            if let Err(e) = result {
                warn!(%operation, %list, error = %e, "Refresh failed");
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Return the default collection, creating one if the user has none.
    async fn ensure_default_collection(&self) -> Result<Collection> {
        if let Some(collection) = self.default_collection().await {
            return Ok(collection);
        }

        self.fetch_collections().await?;
        if let Some(collection) = self.default_collection().await {
            return Ok(collection);
        }

        info!(name = %self.config.default_collection_name, "Creating default collection");
        self.backend
            .create_collection(&self.config.default_collection_name)
            .await?;
        self.fetch_collections().await?;

        self.default_collection().await.ok_or_else(|| {
            Error::malformed(200, "created collection is missing from the collection list")
        })
    }

    /// Add `record` to the default collection as a new copy.
    #[instrument(skip(self), fields(%record))]
    pub async fn add_to_collection(&self, record: &RecordRef) -> Result<CollectionItem> {
        info!("Adding record to collection");
        let collection = self.ensure_default_collection().await?;

        let copy = self
            .backend
            .add_collection_item(&collection.id, record)
            .await?;
        debug!(copy = %copy.id, collection = %collection.id, "Added copy");

        self.refresh_after(Operation::AddToCollection).await?;
        Ok(copy)
    }

    /// Put `record` on the wishlist.
    #[instrument(skip(self), fields(%record))]
    pub async fn add_to_wishlist(&self, record: &RecordRef) -> Result<WishlistItem> {
        info!("Adding record to wishlist");
        let item = self.backend.add_wishlist_item(record).await?;
        debug!(item = %item.id, "Added wishlist item");

        self.refresh_after(Operation::AddToWishlist).await?;
        Ok(item)
    }

    /// Delete one copy from the default collection.
    #[instrument(skip(self), fields(%item))]
    pub async fn remove_from_collection(&self, item: &CollectionItemId) -> Result<()> {
        info!("Removing copy from collection");
        let collection = self
            .default_collection()
            .await
            .ok_or(InvalidInputError::NoDefaultCollection)?;

        self.backend
            .remove_collection_item(&collection.id, item)
            .await?;
        self.state
            .write()
            .await
            .collection_items
            .retain(|i| i.id != *item);

        self.refresh_after(Operation::RemoveFromCollection).await
    }

    /// Delete one wishlist entry.
    #[instrument(skip(self), fields(%item))]
    pub async fn remove_from_wishlist(&self, item: &WishlistItemId) -> Result<()> {
        info!("Removing record from wishlist");
        self.backend.remove_wishlist_item(item).await?;
        self.state
            .write()
            .await
            .wishlist_items
            .retain(|i| i.id != *item);

        self.refresh_after(Operation::RemoveFromWishlist).await
    }

    /// Move a wishlist entry into the default collection using the
    /// configured [`MoveStrategy`].
    #[instrument(skip(self), fields(%item, strategy = self.strategy.name()))]
    pub async fn move_to_collection(&self, item: &WishlistItemId) -> Result<CollectionItem> {
        info!("Moving record to collection");
        let wanted = self.find_wishlist_item(item).await?;
        let collection = self.ensure_default_collection().await?;

        let copy = self
            .strategy
            .move_to_collection(self.backend.as_ref(), &wanted, &collection.id)
            .await?;
        debug!(copy = %copy.id, "Moved to collection");

        self.refresh_after(Operation::MoveToCollection).await?;
        Ok(copy)
    }

    /// Move an owned copy back to the wishlist.
    ///
    /// The record is put on the wishlist first. If it is already there the
    /// move carries on and deletes the copy from the collection it belongs
    /// to.
    ///
    /// A backend that refuses to wishlist owned records, such as the
    /// deployed API or `MemoryBackend` with default options, rejects the
    /// add with [`ConflictKind::AlreadyInCollection`] while the copy still
    /// exists. Against such a backend this always fails and the copy is
    /// kept.
    #[instrument(skip(self, item), fields(item = %item.id, collection = %item.collection_id))]
    pub async fn move_to_wishlist(&self, item: &CollectionItem) -> Result<()> {
        info!("Moving record to wishlist");

        match self
            .backend
            .add_wishlist_item(&RecordRef::Id(item.record_id))
            .await
        {
            Ok(wanted) => debug!(wanted = %wanted.id, "Added wishlist item"),
            Err(e) if e.is_conflict(ConflictKind::AlreadyInWishlist) => {
                warn!("Record already on the wishlist, continuing");
            }
            Err(e) => return Err(e),
        }

        if let Err(e) = self
            .backend
            .remove_collection_item(&item.collection_id, &item.id)
            .await
        {
            warn!(error = %e, "Record on the wishlist but copy not removed");
            return Err(e);
        }
        self.state
            .write()
            .await
            .collection_items
            .retain(|i| i.id != item.id);

        self.refresh_after(Operation::MoveToWishlist).await
    }

    /// Look up a wishlist entry, refetching once if it is not cached.
    async fn find_wishlist_item(&self, id: &WishlistItemId) -> Result<WishlistItem> {
        if let Some(found) = self.cached_wishlist_item(id).await {
            return Ok(found);
        }

        debug!(item = %id, "Wishlist item not cached, refetching");
        self.fetch_wishlist_items().await?;
        self.cached_wishlist_item(id).await.ok_or_else(|| {
            Error::NotFound(ApiError::new(
                404,
                None,
                Some(format!("wishlist item {} not found", id)),
            ))
        })
    }

    async fn cached_wishlist_item(&self, id: &WishlistItemId) -> Option<WishlistItem> {
        self.state
            .read()
            .await
            .wishlist_items
            .iter()
            .find(|i| i.id == *id)
            .cloned()
    }
}

impl<B> fmt::Debug for Synchronizer<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Synchronizer")
            .field("strategy", &self.strategy.name())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
