//! In-memory state of the backend and its membership rules.

use chrono::Utc;
use tracing::debug;

use turntable_core::error::{ApiError, ConflictError};
use turntable_core::{
    Collection, CollectionId, CollectionItem, CollectionItemId, ConflictKind, DiscogsId, Error,
    Record, RecordId, RecordRef, Result, Wishlist, WishlistId, WishlistItem, WishlistItemId,
};

fn not_found(message: impl Into<String>) -> Error {
    Error::NotFound(ApiError::new(404, None, Some(message.into())))
}

fn conflict(kind: ConflictKind, message: &str) -> Error {
    ConflictError::new(kind, 409, Some(message.to_string())).into()
}

/// Catalog, collections and wishlist of a single user.
#[derive(Debug)]
pub(crate) struct MemoryStore {
    records: Vec<Record>,
    collections: Vec<Collection>,
    items: Vec<CollectionItem>,
    wishlist: Wishlist,
    /// Keep a record off the wishlist while any copy is owned.
    strict: bool,
}

impl MemoryStore {
    pub fn new(strict: bool) -> Self {
        Self {
            records: Vec::new(),
            collections: Vec::new(),
            items: Vec::new(),
            wishlist: Wishlist {
                id: WishlistId::random(),
                is_public: false,
                share_token: None,
                custom_message: None,
                items: Vec::new(),
            },
            strict,
        }
    }

    /// Add a record to the catalog, replacing one with the same id.
    pub fn insert_record(&mut self, record: Record) {
        self.records.retain(|r| r.id != record.id);
        self.records.push(record);
    }

    /// Look up a referenced record. Unknown catalog ids are imported on
    /// first use; unknown internal ids are an error.
    fn resolve(&mut self, record: &RecordRef) -> Result<Record> {
        let found = self.records.iter().find(|r| match record {
            RecordRef::Discogs(d) => r.discogs_id.as_ref() == Some(d),
            RecordRef::Id(id) => r.id == *id,
        });
        if let Some(found) = found {
            return Ok(found.clone());
        }

        match record {
            RecordRef::Discogs(d) => {
                debug!(discogs_id = %d, "Importing record into catalog");
                let imported = imported_record(d);
                self.records.push(imported.clone());
                Ok(imported)
            }
            RecordRef::Id(id) => Err(not_found(format!("record {} not found", id))),
        }
    }

    fn collection_exists(&self, id: &CollectionId) -> bool {
        self.collections.iter().any(|c| c.id == *id)
    }

    /// Collections ordered by `sort_order`, creation order on ties.
    pub fn collections(&self) -> Vec<Collection> {
        let mut collections: Vec<Collection> = self
            .collections
            .iter()
            .map(|c| Collection {
                items_count: self.items.iter().filter(|i| i.collection_id == c.id).count() as u32,
                ..c.clone()
            })
            .collect();
        collections.sort_by_key(|c| c.sort_order);
        collections
    }

    /// Create a collection. Without an explicit order it goes last.
    pub fn create_collection(&mut self, name: &str, sort_order: Option<i32>) -> Collection {
        let sort_order = sort_order.unwrap_or_else(|| {
            self.collections
                .iter()
                .map(|c| c.sort_order + 1)
                .max()
                .unwrap_or(0)
        });
        let now = Utc::now();
        let collection = Collection {
            id: CollectionId::random(),
            name: name.to_string(),
            description: None,
            sort_order,
            items_count: 0,
            created_at: Some(now),
            updated_at: Some(now),
            items: None,
        };
        self.collections.push(collection.clone());
        collection
    }

    pub fn collection_items(&self, collection: &CollectionId) -> Result<Vec<CollectionItem>> {
        if !self.collection_exists(collection) {
            return Err(not_found(format!("collection {} not found", collection)));
        }
        Ok(self
            .items
            .iter()
            .filter(|i| i.collection_id == *collection)
            .cloned()
            .collect())
    }

    /// Add a new copy. Duplicate copies are allowed.
    pub fn add_collection_item(
        &mut self,
        collection: &CollectionId,
        record: &RecordRef,
    ) -> Result<CollectionItem> {
        if !self.collection_exists(collection) {
            return Err(not_found(format!("collection {} not found", collection)));
        }
        let record = self.resolve(record)?;

        if self.strict {
            let before = self.wishlist.items.len();
            self.wishlist.items.retain(|i| i.record_id != record.id);
            if self.wishlist.items.len() != before {
                debug!(record_id = %record.id, "Removed owned record from wishlist");
            }
        }

        Ok(self.push_item(*collection, record))
    }

    fn push_item(&mut self, collection: CollectionId, record: Record) -> CollectionItem {
        let item = CollectionItem {
            id: CollectionItemId::random(),
            collection_id: collection,
            record_id: record.id,
            record,
            condition: None,
            sleeve_condition: None,
            notes: None,
            shelf_position: None,
            purchase_price: None,
            purchase_date: None,
            added_at: Utc::now(),
        };
        self.items.push(item.clone());
        item
    }

    pub fn remove_collection_item(
        &mut self,
        collection: &CollectionId,
        item: &CollectionItemId,
    ) -> Result<()> {
        let index = self
            .items
            .iter()
            .position(|i| i.id == *item && i.collection_id == *collection)
            .ok_or_else(|| not_found(format!("collection item {} not found", item)))?;
        self.items.remove(index);
        Ok(())
    }

    pub fn wishlist(&self) -> Wishlist {
        self.wishlist.clone()
    }

    pub fn add_wishlist_item(&mut self, record: &RecordRef) -> Result<WishlistItem> {
        let record = self.resolve(record)?;

        if self.strict && self.items.iter().any(|i| i.record_id == record.id) {
            return Err(conflict(
                ConflictKind::AlreadyInCollection,
                "record is already in the collection",
            ));
        }
        if self.wishlist.items.iter().any(|i| i.record_id == record.id) {
            return Err(conflict(
                ConflictKind::AlreadyInWishlist,
                "record is already on the wishlist",
            ));
        }

        let item = WishlistItem {
            id: WishlistItemId::random(),
            wishlist_id: self.wishlist.id,
            record_id: record.id,
            record,
            priority: None,
            notes: None,
            is_purchased: false,
            added_at: Utc::now(),
        };
        self.wishlist.items.push(item.clone());
        Ok(item)
    }

    pub fn remove_wishlist_item(&mut self, item: &WishlistItemId) -> Result<WishlistItem> {
        let index = self
            .wishlist
            .items
            .iter()
            .position(|i| i.id == *item)
            .ok_or_else(|| not_found(format!("wishlist item {} not found", item)))?;
        Ok(self.wishlist.items.remove(index))
    }

    /// Move a wishlist entry into a collection in one step.
    pub fn move_to_collection(
        &mut self,
        item: &WishlistItemId,
        collection: &CollectionId,
    ) -> Result<CollectionItem> {
        if !self.collection_exists(collection) {
            return Err(not_found(format!("collection {} not found", collection)));
        }
        let wanted = self.remove_wishlist_item(item)?;
        Ok(self.push_item(*collection, wanted.record))
    }
}

/// Placeholder catalog entry for a release nobody has looked up yet.
fn imported_record(discogs_id: &DiscogsId) -> Record {
    let now = Utc::now();
    Record {
        id: RecordId::random(),
        discogs_id: Some(discogs_id.clone()),
        discogs_master_id: None,
        title: format!("Release {}", discogs_id),
        artist: "Unknown Artist".to_string(),
        label: None,
        catalog_number: None,
        year: None,
        country: None,
        genre: None,
        style: None,
        format_type: None,
        format_description: None,
        barcode: None,
        estimated_price_min: None,
        estimated_price_median: None,
        estimated_price_max: None,
        price_currency: None,
        cover_image_url: None,
        thumb_image_url: None,
        tracklist: Vec::new(),
        created_at: Some(now),
        updated_at: Some(now),
    }
}
