//! Wishlist and wanted records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{RecordId, RecordIdentity, WishlistId, WishlistItemId};

use super::Record;
use super::de;

/// The user's wishlist with its entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wishlist {
    pub id: WishlistId,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub share_token: Option<String>,
    #[serde(default)]
    pub custom_message: Option<String>,
    #[serde(default)]
    pub items: Vec<WishlistItem>,
}

/// A record the user wants but does not own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WishlistItem {
    pub id: WishlistItemId,
    pub wishlist_id: WishlistId,
    pub record_id: RecordId,
    pub record: Record,
    #[serde(default)]
    pub priority: Option<u8>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub is_purchased: bool,
    #[serde(deserialize_with = "de::timestamp")]
    pub added_at: DateTime<Utc>,
}

impl WishlistItem {
    /// Identifiers of the referenced record.
    pub fn identity(&self) -> RecordIdentity {
        RecordIdentity::new(self.record.discogs_id.clone(), Some(self.record_id))
    }
}
