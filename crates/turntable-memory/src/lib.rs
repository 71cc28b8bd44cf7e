//! turntable-memory - In-process backend for turntable.
//!
//! [`MemoryBackend`] keeps collections and the wishlist in memory and
//! enforces the same membership rules as the REST backend. Individual
//! operations can be made to fail on demand, which is what the
//! synchronizer tests lean on.

mod backend;
mod fault;
mod store;

pub use backend::{MemoryBackend, MemoryOptions};
pub use fault::{BackendOp, Fault};
