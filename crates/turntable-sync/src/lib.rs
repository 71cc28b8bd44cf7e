//! turntable-sync - Keeps the user's collection and wishlist in step with
//! the backend.
//!
//! The [`Synchronizer`] caches the default collection's items and the
//! wishlist items, performs add, remove and move operations against a
//! [`Backend`](turntable_core::Backend), and refreshes every list an
//! operation could have changed. The backend stays the source of truth;
//! cached lists are replaced wholesale on each fetch.
//!
//! ```no_run
//! use std::sync::Arc;
//! use turntable_core::{RecordIdentity, RecordRef};
//! use turntable_memory::MemoryBackend;
//! use turntable_sync::Synchronizer;
//!
//! # async fn example() -> turntable_core::Result<()> {
//! let sync = Synchronizer::new(Arc::new(MemoryBackend::new()));
//! sync.fetch_collections().await?;
//!
//! let record = RecordRef::parse("249504")?;
//! let copy = sync.add_to_collection(&record).await?;
//!
//! let status = sync.status(&copy.identity()).await;
//! assert!(status.is_in_collection());
//! # Ok(())
//! # }
//! ```

mod config;
mod loading;
mod operation;
mod strategy;
mod synchronizer;

pub use config::{DEFAULT_COLLECTION_NAME, SyncConfig};
pub use operation::{CachedList, Operation};
pub use strategy::{AddThenDeleteMove, AtomicMove, MoveStrategy};
pub use synchronizer::{Snapshot, Synchronizer};
