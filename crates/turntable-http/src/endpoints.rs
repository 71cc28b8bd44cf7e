//! Endpoint paths and request/response bodies.

use serde::{Deserialize, Serialize};

use turntable_core::{CollectionId, CollectionItemId, WishlistItemId};

// ============================================================================
// Paths
// ============================================================================

pub const LOGIN: &str = "/auth/login";
pub const REGISTER: &str = "/auth/register";
pub const REFRESH: &str = "/auth/refresh";
pub const COLLECTIONS: &str = "/collections/";
pub const WISHLIST: &str = "/wishlists/";
pub const WISHLIST_ITEMS: &str = "/wishlists/items";

pub fn collection(id: &CollectionId) -> String {
    format!("/collections/{}", id)
}

pub fn collection_items(id: &CollectionId) -> String {
    format!("/collections/{}/items", id)
}

pub fn collection_item(id: &CollectionId, item: &CollectionItemId) -> String {
    format!("/collections/{}/items/{}", id, item)
}

pub fn wishlist_item(item: &WishlistItemId) -> String {
    format!("/wishlists/records/{}", item)
}

pub fn move_to_collection(item: &WishlistItemId) -> String {
    format!("/wishlists/items/{}/move-to-collection", item)
}

// ============================================================================
// Bodies
// ============================================================================

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub email: &'a str,
    pub username: &'a str,
    pub password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

/// Response of login, registration and refresh.
#[derive(Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateCollectionRequest<'a> {
    pub name: &'a str,
}

#[derive(Debug, Serialize)]
pub struct MoveToCollectionRequest<'a> {
    pub collection_id: &'a CollectionId,
}

/// Error body. `detail` is a string for most errors and a list for
/// request validation failures.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorResponse {
    pub fn message(&self) -> Option<String> {
        match &self.detail {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
            None => self.message.clone(),
        }
    }
}
