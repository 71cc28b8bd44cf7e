//! turntable-core - Core types and traits for the turntable record
//! collection client.
//!
//! Defines the backend entities, validated identifiers, the error
//! taxonomy, the [`Backend`] contract and the pure status derivation used
//! to decide whether a record is owned, wanted or neither.

pub mod auth;
pub mod error;
pub mod model;
pub mod status;
pub mod traits;
pub mod types;

pub use auth::{AccessToken, CredentialStore, Credentials, MemoryCredentialStore, RefreshToken, Tokens};
pub use error::{ConflictKind, Error, ErrorKind};
pub use model::{Collection, CollectionItem, Record, Track, Wishlist, WishlistItem};
pub use status::{RecordStatus, derive_status};
pub use traits::{Backend, Capabilities};
pub use types::{
    ApiUrl, CollectionId, CollectionItemId, DiscogsId, RecordId, RecordIdentity, RecordRef,
    WishlistId, WishlistItemId,
};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
