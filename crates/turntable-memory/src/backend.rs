//! In-memory backend implementation.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use turntable_core::error::ApiError;
use turntable_core::{
    Backend, Capabilities, Collection, CollectionId, CollectionItem, CollectionItemId, Error,
    Record, RecordRef, Result, Wishlist, WishlistItem, WishlistItemId,
};

use crate::fault::{BackendOp, Fault};
use crate::store::MemoryStore;

/// Behaviour switches for [`MemoryBackend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryOptions {
    /// Serve the one-step move endpoint.
    pub atomic_move: bool,
    /// Enforce the deployed backend's membership rules: adding a copy
    /// drops the record from the wishlist, and owned records cannot be
    /// wished for. When off, only duplicate wishlist entries are refused.
    pub strict_membership: bool,
}

impl Default for MemoryOptions {
    fn default() -> Self {
        Self {
            atomic_move: true,
            strict_membership: true,
        }
    }
}

impl MemoryOptions {
    pub fn atomic_move(mut self, enabled: bool) -> Self {
        self.atomic_move = enabled;
        self
    }

    pub fn strict_membership(mut self, enabled: bool) -> Self {
        self.strict_membership = enabled;
        self
    }
}

/// [`Backend`] that lives entirely in process memory.
///
/// Cheap to clone; clones share the same data.
#[derive(Debug, Clone)]
pub struct MemoryBackend {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    store: Mutex<MemoryStore>,
    journal: Mutex<Journal>,
    options: MemoryOptions,
}

#[derive(Debug, Default)]
struct Journal {
    calls: Vec<BackendOp>,
    faults: Vec<(BackendOp, Fault)>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    /// Create an empty backend with default options.
    pub fn new() -> Self {
        Self::with_options(MemoryOptions::default())
    }

    pub fn with_options(options: MemoryOptions) -> Self {
        Self {
            inner: Arc::new(Inner {
                store: Mutex::new(MemoryStore::new(options.strict_membership)),
                journal: Mutex::new(Journal::default()),
                options,
            }),
        }
    }

    pub fn options(&self) -> MemoryOptions {
        self.inner.options
    }

    /// Add a fully described record to the catalog.
    pub async fn insert_record(&self, record: Record) {
        self.inner.store.lock().await.insert_record(record);
    }

    /// Create a collection at an explicit position, bypassing the journal.
    pub async fn seed_collection(&self, name: &str, sort_order: i32) -> Collection {
        self.inner
            .store
            .lock()
            .await
            .create_collection(name, Some(sort_order))
    }

    /// Make the next call to `op` fail with `fault`. Faults queue up per
    /// operation and are consumed in order.
    pub async fn fail_next(&self, op: BackendOp, fault: Fault) {
        debug!(%op, ?fault, "Injecting failure");
        self.inner.journal.lock().await.faults.push((op, fault));
    }

    /// Every operation invoked so far, including failed ones.
    pub async fn calls(&self) -> Vec<BackendOp> {
        self.inner.journal.lock().await.calls.clone()
    }

    /// Number of times `op` was invoked.
    pub async fn call_count(&self, op: BackendOp) -> usize {
        self.inner
            .journal
            .lock()
            .await
            .calls
            .iter()
            .filter(|c| **c == op)
            .count()
    }

    /// Record the call and return an injected failure, if one is queued.
    async fn enter(&self, op: BackendOp) -> Result<()> {
        let mut journal = self.inner.journal.lock().await;
        journal.calls.push(op);
        match journal.faults.iter().position(|(o, _)| *o == op) {
            Some(index) => {
                let (_, fault) = journal.faults.remove(index);
                debug!(%op, ?fault, "Returning injected failure");
                Err(fault.into_error(op))
            }
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    fn capabilities(&self) -> Capabilities {
        Capabilities {
            atomic_move: self.inner.options.atomic_move,
        }
    }

    #[instrument(skip(self))]
    async fn list_collections(&self) -> Result<Vec<Collection>> {
        self.enter(BackendOp::ListCollections).await?;
        Ok(self.inner.store.lock().await.collections())
    }

    #[instrument(skip(self))]
    async fn create_collection(&self, name: &str) -> Result<Collection> {
        self.enter(BackendOp::CreateCollection).await?;
        let collection = self.inner.store.lock().await.create_collection(name, None);
        debug!(id = %collection.id, "Created collection");
        Ok(collection)
    }

    #[instrument(skip(self), fields(%collection))]
    async fn collection_items(&self, collection: &CollectionId) -> Result<Vec<CollectionItem>> {
        self.enter(BackendOp::CollectionItems).await?;
        self.inner.store.lock().await.collection_items(collection)
    }

    #[instrument(skip(self), fields(%collection, %record))]
    async fn add_collection_item(
        &self,
        collection: &CollectionId,
        record: &RecordRef,
    ) -> Result<CollectionItem> {
        self.enter(BackendOp::AddCollectionItem).await?;
        let item = self
            .inner
            .store
            .lock()
            .await
            .add_collection_item(collection, record)?;
        debug!(item = %item.id, "Added collection item");
        Ok(item)
    }

    #[instrument(skip(self), fields(%collection, %item))]
    async fn remove_collection_item(
        &self,
        collection: &CollectionId,
        item: &CollectionItemId,
    ) -> Result<()> {
        self.enter(BackendOp::RemoveCollectionItem).await?;
        self.inner
            .store
            .lock()
            .await
            .remove_collection_item(collection, item)
    }

    #[instrument(skip(self))]
    async fn wishlist(&self) -> Result<Wishlist> {
        self.enter(BackendOp::Wishlist).await?;
        Ok(self.inner.store.lock().await.wishlist())
    }

    #[instrument(skip(self), fields(%record))]
    async fn add_wishlist_item(&self, record: &RecordRef) -> Result<WishlistItem> {
        self.enter(BackendOp::AddWishlistItem).await?;
        let item = self.inner.store.lock().await.add_wishlist_item(record)?;
        debug!(item = %item.id, "Added wishlist item");
        Ok(item)
    }

    #[instrument(skip(self), fields(%item))]
    async fn remove_wishlist_item(&self, item: &WishlistItemId) -> Result<()> {
        self.enter(BackendOp::RemoveWishlistItem).await?;
        self.inner
            .store
            .lock()
            .await
            .remove_wishlist_item(item)
            .map(|_| ())
    }

    #[instrument(skip(self), fields(%item, %collection))]
    async fn move_to_collection(
        &self,
        item: &WishlistItemId,
        collection: &CollectionId,
    ) -> Result<CollectionItem> {
        self.enter(BackendOp::MoveToCollection).await?;
        if !self.inner.options.atomic_move {
            return Err(Error::Api(ApiError::new(
                405,
                None,
                Some("move endpoint not available".to_string()),
            )));
        }
        self.inner
            .store
            .lock()
            .await
            .move_to_collection(item, collection)
    }
}
