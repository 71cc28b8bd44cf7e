//! Authentication primitives.
//!
//! Token persistence is an external capability: callers plug in their own
//! [`CredentialStore`]. [`MemoryCredentialStore`] is the bundled one.

mod credentials;
mod store;
mod tokens;

pub use credentials::Credentials;
pub use store::{CredentialStore, MemoryCredentialStore};
pub use tokens::{AccessToken, RefreshToken, Tokens};
