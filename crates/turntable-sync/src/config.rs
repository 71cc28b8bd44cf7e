//! Synchronizer configuration.

/// Name given to the collection created on the first add when the user
/// has none. Matches the name the backend uses for its own default.
pub const DEFAULT_COLLECTION_NAME: &str = "Моя коллекция";

/// Configuration for a [`Synchronizer`](crate::Synchronizer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    pub default_collection_name: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            default_collection_name: DEFAULT_COLLECTION_NAME.to_string(),
        }
    }
}

impl SyncConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name of the collection provisioned when none exists.
    pub fn default_collection_name(mut self, name: impl Into<String>) -> Self {
        self.default_collection_name = name.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_backend_name() {
        assert_eq!(SyncConfig::new().default_collection_name, "Моя коллекция");
        assert_eq!(
            SyncConfig::new()
                .default_collection_name("Shelf")
                .default_collection_name,
            "Shelf"
        );
    }
}
