//! Core traits for backend access.

mod backend;

pub use backend::{Backend, Capabilities};
