//! Engine and database configuration.

use crate::storage::StorageConfig;

/// Statement execution settings.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Run the required/cardinality/distinctness checks after `modify`.
    ///
    /// Insert always validates. With this off, a modify may leave instances
    /// that a later insert-time check would reject.
    pub validate_modify: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            validate_modify: true,
        }
    }
}

impl EngineConfig {
    /// Set whether modify statements are validated.
    pub fn validate_modify(mut self, validate: bool) -> Self {
        self.validate_modify = validate;
        self
    }
}

/// Everything needed to open a [`Database`](crate::Database).
#[derive(Debug, Clone, Default)]
pub struct DatabaseConfig {
    pub storage: StorageConfig,
    pub engine: EngineConfig,
}

impl DatabaseConfig {
    /// Configuration for an on-disk database at `path`.
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self {
            storage: StorageConfig::new(path),
            engine: EngineConfig::default(),
        }
    }

    /// Configuration for a throwaway in-memory database.
    pub fn temporary() -> Self {
        Self {
            storage: StorageConfig::temporary(),
            engine: EngineConfig::default(),
        }
    }

    /// Replace the storage configuration.
    pub fn with_storage(mut self, storage: StorageConfig) -> Self {
        self.storage = storage;
        self
    }

    /// Replace the engine configuration.
    pub fn with_engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DatabaseConfig::temporary();
        assert!(config.storage.temporary);
        assert!(config.engine.validate_modify);

        let config = config.with_engine(EngineConfig::default().validate_modify(false));
        assert!(!config.engine.validate_modify);
    }
}
