//! turntable-http - HTTP backend for the turntable client.
//!
//! Implements [`turntable_core::Backend`] against the catalog REST API,
//! attaching bearer tokens from a [`turntable_core::CredentialStore`] and
//! refreshing them once when the backend answers 401.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use turntable_core::{ApiUrl, Backend, Credentials, MemoryCredentialStore};
//! use turntable_http::{ClientConfig, HttpBackend};
//!
//! # async fn example() -> Result<(), turntable_core::Error> {
//! let config = ClientConfig::new(ApiUrl::new("https://api.example.com/api")?);
//! let backend = HttpBackend::new(config, Arc::new(MemoryCredentialStore::new()))?;
//! backend.login(Credentials::new("alice@example.com", "secret")).await?;
//!
//! for collection in backend.list_collections().await? {
//!     println!("{} ({} records)", collection.name, collection.items_count);
//! }
//! # Ok(())
//! # }
//! ```

mod backend;
mod client;
mod config;
mod endpoints;

pub use backend::HttpBackend;
pub use config::ClientConfig;
