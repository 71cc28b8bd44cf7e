//! Authenticated HTTP backend.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use turntable_core::error::AuthError;
use turntable_core::{
    AccessToken, Backend, Capabilities, Collection, CollectionId, CollectionItem,
    CollectionItemId, CredentialStore, Credentials, RecordRef, RefreshToken, Result, Tokens,
    Wishlist, WishlistItem, WishlistItemId,
};

use crate::client::{ApiClient, ApiRequest};
use crate::config::ClientConfig;
use crate::endpoints::{
    self, COLLECTIONS, CreateCollectionRequest, LOGIN, LoginRequest, MoveToCollectionRequest,
    REFRESH, REGISTER, RefreshRequest, RegisterRequest, TokenResponse, WISHLIST, WISHLIST_ITEMS,
};

/// [`Backend`] talking to the catalog REST API.
///
/// Cheap to clone; clones share the HTTP connection pool, the credential
/// store and the refresh lock.
#[derive(Clone)]
pub struct HttpBackend {
    inner: Arc<BackendInner>,
}

struct BackendInner {
    client: ApiClient,
    credentials: Arc<dyn CredentialStore>,
    capabilities: Capabilities,
    /// Serialises token refreshes so concurrent 401s refresh only once.
    refresh_lock: Mutex<()>,
}

impl HttpBackend {
    /// Create a backend for the configured API.
    ///
    /// Tokens are read from and written to `credentials`.
    pub fn new(config: ClientConfig, credentials: Arc<dyn CredentialStore>) -> Result<Self> {
        let client = ApiClient::new(&config)?;
        Ok(Self {
            inner: Arc::new(BackendInner {
                client,
                credentials,
                capabilities: Capabilities {
                    atomic_move: config.atomic_move,
                },
                refresh_lock: Mutex::new(()),
            }),
        })
    }

    /// Log in and store the returned tokens.
    #[instrument(skip(self, credentials), fields(api = %self.inner.client.api(), email = %credentials.email()))]
    pub async fn login(&self, credentials: Credentials) -> Result<()> {
        info!("Logging in");

        let request = ApiRequest::post(
            LOGIN,
            &LoginRequest {
                email: credentials.email(),
                password: credentials.password(),
            },
        )?;
        self.open_session(&request).await?;

        debug!("Logged in");
        Ok(())
    }

    /// Create an account and store the returned tokens.
    ///
    /// `display_name` defaults to `username` on the backend.
    #[instrument(skip(self, credentials), fields(api = %self.inner.client.api(), email = %credentials.email()))]
    pub async fn register(
        &self,
        credentials: Credentials,
        username: &str,
        display_name: Option<&str>,
    ) -> Result<()> {
        info!("Registering account");

        let request = ApiRequest::post(
            REGISTER,
            &RegisterRequest {
                email: credentials.email(),
                username,
                password: credentials.password(),
                display_name,
            },
        )?;
        self.open_session(&request).await?;

        debug!("Registered");
        Ok(())
    }

    /// Send an unauthenticated request that answers with a token pair and
    /// store the tokens.
    async fn open_session(&self, request: &ApiRequest) -> Result<()> {
        let response = self.inner.client.send(request, None).await?;
        let tokens: TokenResponse = ApiClient::read_json(response).await?;

        self.inner
            .credentials
            .save(Tokens::new(
                AccessToken::new(tokens.access_token),
                tokens.refresh_token.map(RefreshToken::new),
            ))
            .await
    }

    /// Forget the stored tokens.
    pub async fn logout(&self) -> Result<()> {
        info!("Logging out");
        self.inner.credentials.clear().await
    }

    /// Returns true if an access token is stored.
    pub async fn is_logged_in(&self) -> Result<bool> {
        Ok(self.inner.credentials.load().await?.is_some())
    }

    async fn current_tokens(&self) -> Result<Tokens> {
        self.inner
            .credentials
            .load()
            .await?
            .ok_or_else(|| AuthError::MissingToken.into())
    }

    /// Send an authenticated request. A 401 triggers one refresh and one
    /// retry; if that fails too the stored credentials are cleared.
    async fn execute(&self, request: ApiRequest) -> Result<reqwest::Response> {
        let tokens = self.current_tokens().await?;
        let response = self
            .inner
            .client
            .send(&request, Some(tokens.access.as_str()))
            .await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        debug!(path = %request.path, "Access token rejected, refreshing");
        self.refresh_after_rejection(&tokens.access).await?;

        let tokens = self.current_tokens().await?;
        let response = self
            .inner
            .client
            .send(&request, Some(tokens.access.as_str()))
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            warn!(path = %request.path, "Request rejected after refresh, clearing credentials");
            self.inner.credentials.clear().await?;
            return Err(AuthError::SessionExpired.into());
        }

        Ok(response)
    }

    /// Refresh the access token unless another caller already replaced the
    /// rejected one while we waited for the lock.
    async fn refresh_after_rejection(&self, rejected: &AccessToken) -> Result<()> {
        let _guard = self.inner.refresh_lock.lock().await;

        let tokens = match self.inner.credentials.load().await? {
            Some(tokens) if tokens.access != *rejected => {
                debug!("Token already refreshed by a concurrent request");
                return Ok(());
            }
            Some(tokens) => tokens,
            None => return Err(AuthError::SessionExpired.into()),
        };

        match self.refresh(&tokens).await {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!(error = %e, "Token refresh failed, clearing credentials");
                self.inner.credentials.clear().await?;
                Err(AuthError::SessionExpired.into())
            }
        }
    }

    #[instrument(skip(self, tokens), fields(api = %self.inner.client.api()))]
    async fn refresh(&self, tokens: &Tokens) -> Result<()> {
        info!("Refreshing session");

        let refresh_token = tokens
            .refresh
            .as_ref()
            .ok_or(AuthError::RefreshTokenInvalid)?;

        let request = ApiRequest::post(
            REFRESH,
            &RefreshRequest {
                refresh_token: refresh_token.as_str(),
            },
        )?;
        let response = self.inner.client.send(&request, None).await?;
        let fresh: TokenResponse = ApiClient::read_json(response).await?;

        // The backend may keep the refresh token and only rotate the access one.
        let refresh = fresh
            .refresh_token
            .map(RefreshToken::new)
            .unwrap_or_else(|| refresh_token.clone());

        self.inner
            .credentials
            .save(Tokens::new(AccessToken::new(fresh.access_token), Some(refresh)))
            .await?;

        debug!("Session refreshed successfully");
        Ok(())
    }
}

#[async_trait]
impl Backend for HttpBackend {
    fn capabilities(&self) -> Capabilities {
        self.inner.capabilities
    }

    #[instrument(skip(self))]
    async fn list_collections(&self) -> Result<Vec<Collection>> {
        debug!("Listing collections");
        let response = self.execute(ApiRequest::get(COLLECTIONS)).await?;
        ApiClient::read_json(response).await
    }

    #[instrument(skip(self))]
    async fn create_collection(&self, name: &str) -> Result<Collection> {
        debug!("Creating collection");
        let request = ApiRequest::post(COLLECTIONS, &CreateCollectionRequest { name })?;
        let response = self.execute(request).await?;
        ApiClient::read_json(response).await
    }

    #[instrument(skip(self), fields(%collection))]
    async fn collection_items(&self, collection: &CollectionId) -> Result<Vec<CollectionItem>> {
        debug!("Fetching collection items");
        let response = self
            .execute(ApiRequest::get(endpoints::collection(collection)))
            .await?;
        let collection: Collection = ApiClient::read_json(response).await?;
        Ok(collection.items.unwrap_or_default())
    }

    #[instrument(skip(self), fields(%collection, %record))]
    async fn add_collection_item(
        &self,
        collection: &CollectionId,
        record: &RecordRef,
    ) -> Result<CollectionItem> {
        debug!("Adding record to collection");
        let request = ApiRequest::post(endpoints::collection_items(collection), record)?;
        let response = self.execute(request).await?;
        ApiClient::read_json(response).await
    }

    #[instrument(skip(self), fields(%collection, %item))]
    async fn remove_collection_item(
        &self,
        collection: &CollectionId,
        item: &CollectionItemId,
    ) -> Result<()> {
        debug!("Removing collection item");
        let response = self
            .execute(ApiRequest::delete(endpoints::collection_item(
                collection, item,
            )))
            .await?;
        ApiClient::read_empty(response).await
    }

    #[instrument(skip(self))]
    async fn wishlist(&self) -> Result<Wishlist> {
        debug!("Fetching wishlist");
        let response = self.execute(ApiRequest::get(WISHLIST)).await?;
        ApiClient::read_json(response).await
    }

    #[instrument(skip(self), fields(%record))]
    async fn add_wishlist_item(&self, record: &RecordRef) -> Result<WishlistItem> {
        debug!("Adding record to wishlist");
        let request = ApiRequest::post(WISHLIST_ITEMS, record)?;
        let response = self.execute(request).await?;
        ApiClient::read_json(response).await
    }

    #[instrument(skip(self), fields(%item))]
    async fn remove_wishlist_item(&self, item: &WishlistItemId) -> Result<()> {
        debug!("Removing wishlist item");
        let response = self
            .execute(ApiRequest::delete(endpoints::wishlist_item(item)))
            .await?;
        ApiClient::read_empty(response).await
    }

    #[instrument(skip(self), fields(%item, %collection))]
    async fn move_to_collection(
        &self,
        item: &WishlistItemId,
        collection: &CollectionId,
    ) -> Result<CollectionItem> {
        debug!("Moving wishlist item to collection");
        let request = ApiRequest::post(
            endpoints::move_to_collection(item),
            &MoveToCollectionRequest {
                collection_id: collection,
            },
        )?;
        let response = self.execute(request).await?;
        ApiClient::read_json(response).await
    }
}

impl std::fmt::Debug for HttpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBackend")
            .field("api", self.inner.client.api())
            .field("capabilities", &self.inner.capabilities)
            .field("credentials", &"[REDACTED]")
            .finish()
    }
}
