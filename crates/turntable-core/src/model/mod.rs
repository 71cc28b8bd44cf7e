//! Backend entities as the client sees them.
//!
//! All of these are owned by the backend. The client only ever holds
//! read-only copies decoded from responses.

mod collection;
mod de;
mod record;
mod wishlist;

pub use collection::{Collection, CollectionItem};
pub use record::{Record, Track};
pub use wishlist::{Wishlist, WishlistItem};
