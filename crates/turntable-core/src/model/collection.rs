//! Collections and owned copies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{CollectionId, CollectionItemId, RecordId, RecordIdentity};

use super::Record;
use super::de;

/// A named container of owned copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub id: CollectionId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default)]
    pub items_count: u32,
    #[serde(default, deserialize_with = "de::timestamp_opt")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de::timestamp_opt")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Only present on the single-collection endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<CollectionItem>>,
}

impl Collection {
    /// Picks the default collection: lowest `sort_order`, first on ties.
    pub fn pick_default(collections: &[Collection]) -> Option<&Collection> {
        collections
            .iter()
            .enumerate()
            .min_by_key(|(index, c)| (c.sort_order, *index))
            .map(|(_, c)| c)
    }
}

/// One physical copy of a record in a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionItem {
    pub id: CollectionItemId,
    pub collection_id: CollectionId,
    pub record_id: RecordId,
    pub record: Record,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub sleeve_condition: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub shelf_position: Option<i32>,
    #[serde(default, deserialize_with = "de::decimal_opt")]
    pub purchase_price: Option<f64>,
    #[serde(default)]
    pub purchase_date: Option<String>,
    #[serde(deserialize_with = "de::timestamp")]
    pub added_at: DateTime<Utc>,
}

impl CollectionItem {
    /// Identifiers of the referenced record.
    pub fn identity(&self) -> RecordIdentity {
        RecordIdentity::new(self.record.discogs_id.clone(), Some(self.record_id))
    }
}
