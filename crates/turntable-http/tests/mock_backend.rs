//! Mock backend tests for the HTTP client.
//!
//! These tests use wiremock to simulate the catalog API and check request
//! shapes, bearer handling, token refresh and error classification.

use std::sync::Arc;

use serde_json::{Value, json};
use turntable_core::{
    AccessToken, ApiUrl, Backend, CollectionId, CollectionItemId, ConflictKind, CredentialStore,
    Credentials, DiscogsId, ErrorKind, MemoryCredentialStore, RecordRef, RefreshToken, Tokens,
    WishlistItemId,
};
use turntable_http::{ClientConfig, HttpBackend};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const COLLECTION_ID: &str = "11111111-1111-4111-8111-111111111111";
const ITEM_ID: &str = "33333333-3333-4333-8333-333333333333";
const RECORD_ID: &str = "44444444-4444-4444-8444-444444444444";
const WISHLIST_ID: &str = "55555555-5555-4555-8555-555555555555";
const WISHLIST_ITEM_ID: &str = "66666666-6666-4666-8666-666666666666";

/// API URL pointing at the mock server.
fn mock_api_url(server: &MockServer) -> ApiUrl {
    ApiUrl::new(format!("http://127.0.0.1:{}/api", server.address().port())).unwrap()
}

fn logged_in_store(access: &str) -> Arc<MemoryCredentialStore> {
    Arc::new(MemoryCredentialStore::with_tokens(Tokens::new(
        AccessToken::new(access),
        Some(RefreshToken::new("refresh-token")),
    )))
}

fn backend(server: &MockServer, store: Arc<MemoryCredentialStore>) -> HttpBackend {
    HttpBackend::new(ClientConfig::new(mock_api_url(server)), store).unwrap()
}

fn record_json() -> Value {
    json!({
        "id": RECORD_ID,
        "title": "Kind of Blue",
        "artist": "Miles Davis",
        "year": 1959,
        "cover_image_url": null,
        "thumb_image_url": null,
        "estimated_price_median": "35.00",
        "price_currency": "USD"
    })
}

fn collection_item_json() -> Value {
    json!({
        "id": ITEM_ID,
        "collection_id": COLLECTION_ID,
        "record_id": RECORD_ID,
        "condition": null,
        "sleeve_condition": null,
        "notes": null,
        "shelf_position": null,
        "added_at": "2024-03-02T08:00:00.000001",
        "record": record_json()
    })
}

// ============================================================================
// Authentication Tests
// ============================================================================

#[tokio::test]
async fn test_login_stores_tokens() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({
            "email": "alice@example.com",
            "password": "secret123"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "test-access-token",
            "refresh_token": "test-refresh-token",
            "token_type": "bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryCredentialStore::new());
    let backend = backend(&server, store.clone());
    backend
        .login(Credentials::new("alice@example.com", "secret123"))
        .await
        .unwrap();

    let tokens = store.load().await.unwrap().unwrap();
    assert_eq!(tokens.access.as_str(), "test-access-token");
    assert_eq!(
        tokens.refresh.as_ref().map(|t| t.as_str()),
        Some("test-refresh-token")
    );
    assert!(backend.is_logged_in().await.unwrap());

    backend.logout().await.unwrap();
    assert!(!backend.is_logged_in().await.unwrap());
}

#[tokio::test]
async fn test_login_invalid_credentials() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "Неверный email или пароль"
        })))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryCredentialStore::new());
    let backend = backend(&server, store.clone());
    let err = backend
        .login(Credentials::new("bad@example.com", "wrongpass"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Auth);
    assert!(store.load().await.unwrap().is_none());
}

#[tokio::test]
async fn test_register_stores_tokens() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .and(body_json(json!({
            "email": "alice@example.com",
            "username": "alice",
            "password": "secret123"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "access_token": "new-access-token",
            "refresh_token": "new-refresh-token",
            "token_type": "bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryCredentialStore::new());
    let backend = backend(&server, store.clone());
    backend
        .register(Credentials::new("alice@example.com", "secret123"), "alice", None)
        .await
        .unwrap();

    let tokens = store.load().await.unwrap().unwrap();
    assert_eq!(tokens.access.as_str(), "new-access-token");
    assert_eq!(
        tokens.refresh.as_ref().map(|t| t.as_str()),
        Some("new-refresh-token")
    );
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .and(body_json(json!({
            "email": "alice@example.com",
            "username": "alice",
            "password": "secret123",
            "display_name": "Alice"
        })))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "detail": "Пользователь с таким email уже существует"
        })))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryCredentialStore::new());
    let backend = backend(&server, store.clone());
    let err = backend
        .register(
            Credentials::new("alice@example.com", "secret123"),
            "alice",
            Some("Alice"),
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Rejected);
    assert_eq!(err.status(), Some(400));
    assert!(store.load().await.unwrap().is_none());
}

#[tokio::test]
async fn test_missing_token_fails_before_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/collections/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let backend = backend(&server, Arc::new(MemoryCredentialStore::new()));
    let err = backend.list_collections().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Auth);
}

#[tokio::test]
async fn test_refresh_and_retry_once() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/collections/"))
        .and(header("authorization", "Bearer old-access-token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "Could not validate credentials"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .and(body_json(json!({"refresh_token": "refresh-token"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "new-access-token",
            "refresh_token": "new-refresh-token",
            "token_type": "bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/collections/"))
        .and(header("authorization", "Bearer new-access-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let store = logged_in_store("old-access-token");
    let backend = backend(&server, store.clone());

    let collections = backend.list_collections().await.unwrap();
    assert!(collections.is_empty());

    let tokens = store.load().await.unwrap().unwrap();
    assert_eq!(tokens.access.as_str(), "new-access-token");
    assert_eq!(
        tokens.refresh.as_ref().map(|t| t.as_str()),
        Some("new-refresh-token")
    );
}

#[tokio::test]
async fn test_refresh_keeps_refresh_token_when_not_rotated() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/wishlists/"))
        .and(header("authorization", "Bearer old-access-token"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "new-access-token",
            "token_type": "bearer"
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/wishlists/"))
        .and(header("authorization", "Bearer new-access-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": WISHLIST_ID,
            "items": []
        })))
        .mount(&server)
        .await;

    let store = logged_in_store("old-access-token");
    let backend = backend(&server, store.clone());
    backend.wishlist().await.unwrap();

    let tokens = store.load().await.unwrap().unwrap();
    assert_eq!(
        tokens.refresh.as_ref().map(|t| t.as_str()),
        Some("refresh-token")
    );
}

#[tokio::test]
async fn test_failed_refresh_clears_credentials() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/collections/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "Invalid refresh token"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = logged_in_store("old-access-token");
    let backend = backend(&server, store.clone());

    let err = backend.list_collections().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Auth);
    assert!(err.to_string().contains("session expired"));
    assert!(store.load().await.unwrap().is_none());
}

#[tokio::test]
async fn test_second_rejection_clears_credentials() {
    let server = MockServer::start().await;

    // Rejects both the old and the refreshed token.
    Mock::given(method("GET"))
        .and(path("/api/collections/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "new-access-token",
            "refresh_token": "new-refresh-token"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = logged_in_store("old-access-token");
    let backend = backend(&server, store.clone());

    let err = backend.list_collections().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Auth);
    assert!(store.load().await.unwrap().is_none());
}

// ============================================================================
// Collection Tests
// ============================================================================

#[tokio::test]
async fn test_list_and_create_collections() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/collections/"))
        .and(header("authorization", "Bearer access-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": COLLECTION_ID,
                "user_id": "22222222-2222-4222-8222-222222222222",
                "name": "Моя коллекция",
                "description": null,
                "sort_order": 0,
                "created_at": "2024-03-01T12:30:45.123456",
                "updated_at": "2024-03-01T12:30:45.123456",
                "items_count": 3
            }
        ])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/collections/"))
        .and(body_json(json!({"name": "Jazz"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "77777777-7777-4777-8777-777777777777",
            "name": "Jazz",
            "sort_order": 1,
            "items_count": 0
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = backend(&server, logged_in_store("access-token"));

    let collections = backend.list_collections().await.unwrap();
    assert_eq!(collections.len(), 1);
    assert_eq!(collections[0].items_count, 3);

    let created = backend.create_collection("Jazz").await.unwrap();
    assert_eq!(created.name, "Jazz");
    assert_eq!(created.sort_order, 1);
}

#[tokio::test]
async fn test_collection_items_are_embedded() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/api/collections/{}", COLLECTION_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": COLLECTION_ID,
            "name": "Моя коллекция",
            "sort_order": 0,
            "items_count": 1,
            "items": [collection_item_json()]
        })))
        .mount(&server)
        .await;

    let backend = backend(&server, logged_in_store("access-token"));
    let items = backend
        .collection_items(&CollectionId::new(COLLECTION_ID).unwrap())
        .await
        .unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id.to_string(), ITEM_ID);
    assert_eq!(items[0].record.estimated_price_median, Some(35.0));
}

#[tokio::test]
async fn test_add_collection_item_by_catalog_id() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/api/collections/{}/items", COLLECTION_ID)))
        .and(body_json(json!({"discogs_id": "249504"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(collection_item_json()))
        .expect(1)
        .mount(&server)
        .await;

    let backend = backend(&server, logged_in_store("access-token"));
    let record = RecordRef::Discogs(DiscogsId::new("249504").unwrap());
    let item = backend
        .add_collection_item(&CollectionId::new(COLLECTION_ID).unwrap(), &record)
        .await
        .unwrap();

    assert_eq!(item.record.title, "Kind of Blue");
}

#[tokio::test]
async fn test_remove_missing_collection_item_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path(format!(
            "/api/collections/{}/items/{}",
            COLLECTION_ID, ITEM_ID
        )))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "detail": "Элемент не найден в коллекции"
        })))
        .mount(&server)
        .await;

    let backend = backend(&server, logged_in_store("access-token"));
    let err = backend
        .remove_collection_item(
            &CollectionId::new(COLLECTION_ID).unwrap(),
            &CollectionItemId::new(ITEM_ID).unwrap(),
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(err.to_string().contains("Элемент не найден в коллекции"));
}

// ============================================================================
// Wishlist Tests
// ============================================================================

#[tokio::test]
async fn test_add_wishlist_item_conflict() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/wishlists/items"))
        .and(body_json(json!({"discogs_id": "249504"})))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "detail": "Пластинка уже в вишлисте"
        })))
        .mount(&server)
        .await;

    let backend = backend(&server, logged_in_store("access-token"));
    let err = backend
        .add_wishlist_item(&RecordRef::Discogs(DiscogsId::new("249504").unwrap()))
        .await
        .unwrap_err();

    assert_eq!(
        err.kind(),
        ErrorKind::Conflict(ConflictKind::AlreadyInWishlist)
    );
}

#[tokio::test]
async fn test_remove_wishlist_item() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path(format!("/api/wishlists/records/{}", WISHLIST_ITEM_ID)))
        .and(header("authorization", "Bearer access-token"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let backend = backend(&server, logged_in_store("access-token"));
    backend
        .remove_wishlist_item(&WishlistItemId::new(WISHLIST_ITEM_ID).unwrap())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_move_to_collection() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!(
            "/api/wishlists/items/{}/move-to-collection",
            WISHLIST_ITEM_ID
        )))
        .and(body_json(json!({"collection_id": COLLECTION_ID})))
        .respond_with(ResponseTemplate::new(200).set_body_json(collection_item_json()))
        .expect(1)
        .mount(&server)
        .await;

    let backend = backend(&server, logged_in_store("access-token"));
    let item = backend
        .move_to_collection(
            &WishlistItemId::new(WISHLIST_ITEM_ID).unwrap(),
            &CollectionId::new(COLLECTION_ID).unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(item.collection_id.to_string(), COLLECTION_ID);
}

#[tokio::test]
async fn test_capabilities_follow_config() {
    let server = MockServer::start().await;
    let config = ClientConfig::new(mock_api_url(&server)).atomic_move(false);
    let backend = HttpBackend::new(config, logged_in_store("access-token")).unwrap();
    assert!(!backend.capabilities().atomic_move);
}

// ============================================================================
// Error Handling Tests
// ============================================================================

#[tokio::test]
async fn test_non_json_error_response() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/wishlists/"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_string("Internal Server Error")
                .insert_header("content-type", "text/plain"),
        )
        .mount(&server)
        .await;

    let backend = backend(&server, logged_in_store("access-token"));
    let err = backend.wishlist().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Server);
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn test_malformed_success_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/collections/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"unexpected": true})))
        .mount(&server)
        .await;

    let backend = backend(&server, logged_in_store("access-token"));
    let err = backend.list_collections().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Server);
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    // Reserve a port and release it so nothing is listening there.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let api = ApiUrl::new(format!("http://127.0.0.1:{}/api", port)).unwrap();

    let backend =
        HttpBackend::new(ClientConfig::new(api), logged_in_store("access-token")).unwrap();
    let err = backend.list_collections().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Network);
}
