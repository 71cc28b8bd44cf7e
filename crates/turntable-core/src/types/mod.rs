//! Validated identifier and address types.
//!
//! These types check their invariants at construction time, so an empty or
//! malformed identifier never reaches the network layer.

mod api_url;
mod discogs_id;
mod ids;
mod record_ref;

pub use api_url::ApiUrl;
pub use discogs_id::DiscogsId;
pub use ids::{CollectionId, CollectionItemId, RecordId, WishlistId, WishlistItemId};
pub use record_ref::{RecordIdentity, RecordRef};
