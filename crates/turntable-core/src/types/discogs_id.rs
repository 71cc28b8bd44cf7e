//! External catalog identifier.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, InvalidInputError};

/// A Discogs release identifier, as used by the backend to look up or
/// import a record.
///
/// Must be non-empty and contain neither whitespace nor `/`, since it is
/// sent both in request bodies and in URL paths.
///
/// # Example
///
/// ```
/// use turntable_core::DiscogsId;
///
/// let id = DiscogsId::new("249504").unwrap();
/// assert_eq!(id.as_str(), "249504");
/// assert!(DiscogsId::new("  ").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DiscogsId(String);

impl DiscogsId {
    /// Create a new catalog id, validating the format.
    pub fn new(s: impl Into<String>) -> Result<Self, Error> {
        let s = s.into();
        Self::validate(&s)?;
        Ok(Self(s))
    }

    /// Returns the id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(s: &str) -> Result<(), Error> {
        let invalid = |reason: String| -> Error {
            InvalidInputError::Identifier {
                what: "Discogs id",
                value: s.to_string(),
                reason,
            }
            .into()
        };

        if s.is_empty() {
            return Err(invalid("cannot be empty".to_string()));
        }

        if s.len() > 64 {
            return Err(invalid("exceeds maximum length of 64 characters".to_string()));
        }

        if let Some(c) = s.chars().find(|c| c.is_whitespace() || *c == '/') {
            return Err(invalid(format!("contains invalid character '{}'", c)));
        }

        Ok(())
    }
}

impl fmt::Display for DiscogsId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DiscogsId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for DiscogsId {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<DiscogsId> for String {
    fn from(id: DiscogsId) -> Self {
        id.0
    }
}

impl AsRef<str> for DiscogsId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
