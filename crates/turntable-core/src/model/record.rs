//! Catalog record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{DiscogsId, RecordId, RecordIdentity};

use super::de;

/// A catalog entry. Created by the backend, read-only to the client.
///
/// List endpoints embed an abbreviated record, so everything beyond the id,
/// title and artist is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    #[serde(default)]
    pub discogs_id: Option<DiscogsId>,
    #[serde(default)]
    pub discogs_master_id: Option<String>,
    pub title: String,
    pub artist: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub catalog_number: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub format_type: Option<String>,
    #[serde(default)]
    pub format_description: Option<String>,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default, deserialize_with = "de::decimal_opt")]
    pub estimated_price_min: Option<f64>,
    #[serde(default, deserialize_with = "de::decimal_opt")]
    pub estimated_price_median: Option<f64>,
    #[serde(default, deserialize_with = "de::decimal_opt")]
    pub estimated_price_max: Option<f64>,
    #[serde(default)]
    pub price_currency: Option<String>,
    #[serde(default)]
    pub cover_image_url: Option<String>,
    #[serde(default)]
    pub thumb_image_url: Option<String>,
    #[serde(default)]
    pub tracklist: Vec<Track>,
    #[serde(default, deserialize_with = "de::timestamp_opt")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de::timestamp_opt")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Record {
    /// Returns both identifiers of this record.
    pub fn identity(&self) -> RecordIdentity {
        RecordIdentity::new(self.discogs_id.clone(), Some(self.id))
    }
}

/// One track on a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub position: String,
    pub title: String,
    #[serde(default)]
    pub duration: Option<String>,
}
