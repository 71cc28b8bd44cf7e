//! Moving a wishlist entry into a collection.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use turntable_core::{
    Backend, Capabilities, CollectionId, CollectionItem, Error, ErrorKind, RecordRef, Result,
    WishlistItem,
};

/// How a wanted record becomes an owned copy.
#[async_trait]
pub trait MoveStrategy: Send + Sync + fmt::Debug {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Put `item`'s record into `collection` and take `item` off the
    /// wishlist. Returns the new copy.
    async fn move_to_collection(
        &self,
        backend: &dyn Backend,
        item: &WishlistItem,
        collection: &CollectionId,
    ) -> Result<CollectionItem>;
}

/// Pick the strategy a backend supports.
pub(crate) fn for_capabilities(capabilities: Capabilities) -> Arc<dyn MoveStrategy> {
    if capabilities.atomic_move {
        Arc::new(AtomicMove::new())
    } else {
        Arc::new(AddThenDeleteMove)
    }
}

/// Single backend call that moves the entry server-side.
///
/// If the backend answers 405 or 501 the endpoint is taken to be missing:
/// the move is redone with [`AddThenDeleteMove`], and every later move goes
/// straight to it.
#[derive(Debug, Default)]
pub struct AtomicMove {
    endpoint_missing: AtomicBool,
}

impl AtomicMove {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once the backend has reported the move endpoint missing.
    pub fn is_falling_back(&self) -> bool {
        self.endpoint_missing.load(Ordering::Relaxed)
    }
}

/// Statuses meaning the server has no move endpoint.
fn endpoint_missing(error: &Error) -> bool {
    matches!(error, Error::Api(e) | Error::Server(e) if matches!(e.status, 405 | 501))
}

#[async_trait]
impl MoveStrategy for AtomicMove {
    fn name(&self) -> &'static str {
        "atomic"
    }

    #[instrument(skip(self, backend, item), fields(item = %item.id, %collection))]
    async fn move_to_collection(
        &self,
        backend: &dyn Backend,
        item: &WishlistItem,
        collection: &CollectionId,
    ) -> Result<CollectionItem> {
        if self.is_falling_back() {
            return AddThenDeleteMove
                .move_to_collection(backend, item, collection)
                .await;
        }

        match backend.move_to_collection(&item.id, collection).await {
            Err(e) if endpoint_missing(&e) => {
                warn!(error = %e, "Move endpoint missing, switching to add-then-delete");
                self.endpoint_missing.store(true, Ordering::Relaxed);
                AddThenDeleteMove
                    .move_to_collection(backend, item, collection)
                    .await
            }
            result => result,
        }
    }
}

/// Add the record as a new copy, then delete the wishlist entry.
///
/// The add goes first so the record is never lost. If the delete fails the
/// record stays on both lists and the error is returned; retrying the
/// removal is up to the caller. A delete that finds the entry already gone
/// counts as success, since the backend may drop it as part of the add.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddThenDeleteMove;

#[async_trait]
impl MoveStrategy for AddThenDeleteMove {
    fn name(&self) -> &'static str {
        "add-then-delete"
    }

    #[instrument(skip(self, backend, item), fields(item = %item.id, %collection))]
    async fn move_to_collection(
        &self,
        backend: &dyn Backend,
        item: &WishlistItem,
        collection: &CollectionId,
    ) -> Result<CollectionItem> {
        let copy = backend
            .add_collection_item(collection, &RecordRef::Id(item.record_id))
            .await?;
        debug!(copy = %copy.id, "Added copy, removing wishlist item");

        match backend.remove_wishlist_item(&item.id).await {
            Ok(()) => Ok(copy),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Wishlist item already removed by the backend");
                Ok(copy)
            }
            Err(e) => {
                warn!(copy = %copy.id, error = %e, "Record added but still on the wishlist");
                Err(e)
            }
        }
    }
}
