//! Backend-assigned UUID identifiers.
//!
//! Each entity gets its own type so a wishlist item id cannot be passed
//! where a collection item id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{Error, InvalidInputError};

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident, $what:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Parse an id, rejecting empty or malformed values.
            pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
                let s = s.as_ref();
                if s.trim().is_empty() {
                    return Err(InvalidInputError::Identifier {
                        what: $what,
                        value: s.to_string(),
                        reason: "cannot be empty".to_string(),
                    }
                    .into());
                }
                Uuid::parse_str(s).map(Self).map_err(|e| {
                    InvalidInputError::Identifier {
                        what: $what,
                        value: s.to_string(),
                        reason: e.to_string(),
                    }
                    .into()
                })
            }

            /// Generate a fresh random id.
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Returns the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }
    };
}

uuid_id!(
    /// Identifier of a collection.
    CollectionId,
    "collection id"
);
uuid_id!(
    /// Identifier of one owned copy in a collection.
    CollectionItemId,
    "collection item id"
);
uuid_id!(
    /// Identifier of the user's wishlist.
    WishlistId,
    "wishlist id"
);
uuid_id!(
    /// Identifier of a wishlist entry.
    WishlistItemId,
    "wishlist item id"
);
uuid_id!(
    /// Backend-internal identifier of a catalog record.
    RecordId,
    "record id"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_uuid() {
        let id = CollectionItemId::new("6f1c4a52-3a55-4a4e-9d8f-0c0b2f1d6e11").unwrap();
        assert_eq!(id.to_string(), "6f1c4a52-3a55-4a4e-9d8f-0c0b2f1d6e11");
    }

    #[test]
    fn empty_id_is_validation_error() {
        let err = WishlistItemId::new("").unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Validation);
        assert!(err.to_string().contains("wishlist item id"));
    }

    #[test]
    fn malformed_id_is_rejected() {
        assert!(RecordId::new("not-a-uuid").is_err());
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = CollectionId::new("6f1c4a52-3a55-4a4e-9d8f-0c0b2f1d6e11").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"6f1c4a52-3a55-4a4e-9d8f-0c0b2f1d6e11\"");
    }
}
