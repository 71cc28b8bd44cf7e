//! HTTP client configuration.

use std::time::Duration;

use turntable_core::ApiUrl;

/// Catalog lookups can make the backend call out to Discogs, so requests
/// are allowed to take a while.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for [`HttpBackend`](crate::HttpBackend).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub(crate) api_url: ApiUrl,
    pub(crate) timeout: Duration,
    pub(crate) user_agent: String,
    pub(crate) atomic_move: bool,
}

impl ClientConfig {
    /// Defaults for the given API base URL.
    pub fn new(api_url: ApiUrl) -> Self {
        Self {
            api_url,
            timeout: DEFAULT_TIMEOUT,
            user_agent: concat!("turntable/", env!("CARGO_PKG_VERSION")).to_string(),
            atomic_move: true,
        }
    }

    /// Per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Whether the backend exposes the atomic move-to-collection endpoint.
    pub fn atomic_move(mut self, available: bool) -> Self {
        self.atomic_move = available;
        self
    }

    /// Returns the API base URL.
    pub fn api_url(&self) -> &ApiUrl {
        &self.api_url
    }
}
