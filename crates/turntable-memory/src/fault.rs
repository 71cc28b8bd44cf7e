//! Failure injection.

use std::fmt;

use turntable_core::error::{ApiError, AuthError, ConflictError, TransportError};
use turntable_core::{ConflictKind, Error};

/// One method of the [`Backend`](turntable_core::Backend) contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendOp {
    ListCollections,
    CreateCollection,
    CollectionItems,
    AddCollectionItem,
    RemoveCollectionItem,
    Wishlist,
    AddWishlistItem,
    RemoveWishlistItem,
    MoveToCollection,
}

impl BackendOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BackendOp::ListCollections => "list_collections",
            BackendOp::CreateCollection => "create_collection",
            BackendOp::CollectionItems => "collection_items",
            BackendOp::AddCollectionItem => "add_collection_item",
            BackendOp::RemoveCollectionItem => "remove_collection_item",
            BackendOp::Wishlist => "wishlist",
            BackendOp::AddWishlistItem => "add_wishlist_item",
            BackendOp::RemoveWishlistItem => "remove_wishlist_item",
            BackendOp::MoveToCollection => "move_to_collection",
        }
    }
}

impl fmt::Display for BackendOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure returned instead of performing an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    NotFound,
    Conflict(ConflictKind),
    Server { status: u16 },
    Network,
    Timeout,
    SessionExpired,
}

impl Fault {
    pub(crate) fn into_error(self, op: BackendOp) -> Error {
        let message = format!("injected failure in {}", op);
        match self {
            Fault::NotFound => Error::NotFound(ApiError::new(404, None, Some(message))),
            Fault::Conflict(kind) => ConflictError::new(kind, 409, Some(message)).into(),
            Fault::Server { status } => Error::Server(ApiError::new(status, None, Some(message))),
            Fault::Network => TransportError::Connection { message }.into(),
            Fault::Timeout => TransportError::Timeout { message }.into(),
            Fault::SessionExpired => AuthError::SessionExpired.into(),
        }
    }
}
