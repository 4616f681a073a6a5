//! Storage configuration.

use std::path::PathBuf;

/// Vertex label of class anchor vertices.
pub const CLASS_LABEL: &str = "@class";

/// Property holding a class anchor's name.
pub const CLASS_NAME_PROPERTY: &str = "name";

/// Configuration for the graph store.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Path to the database directory.
    pub path: PathBuf,

    /// Page cache capacity in bytes.
    pub cache_capacity: u64,

    /// Background flush interval in milliseconds. `None` disables background
    /// flushing; writes reach disk on [`GraphStore::flush`](super::GraphStore::flush).
    pub flush_every_ms: Option<u64>,

    /// Enable zstd compression.
    pub compression: bool,

    /// Temporary database (deleted on drop).
    pub temporary: bool,

    /// `(vertex label, property)` pairs maintained in the property index.
    pub indexed_properties: Vec<(String, String)>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./wdb_data"),
            cache_capacity: 256 * 1024 * 1024, // 256MB
            flush_every_ms: Some(500),
            compression: true,
            temporary: false,
            indexed_properties: vec![(CLASS_LABEL.to_string(), CLASS_NAME_PROPERTY.to_string())],
        }
    }
}

impl StorageConfig {
    /// Create a new configuration with the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Create a temporary in-memory configuration for testing.
    pub fn temporary() -> Self {
        Self {
            path: PathBuf::from(""),
            temporary: true,
            ..Default::default()
        }
    }

    /// Set the page cache capacity.
    pub fn with_cache_capacity(mut self, bytes: u64) -> Self {
        self.cache_capacity = bytes;
        self
    }

    /// Set the flush interval. `None` flushes only on explicit request.
    pub fn with_flush_every_ms(mut self, ms: Option<u64>) -> Self {
        self.flush_every_ms = ms;
        self
    }

    /// Enable or disable compression.
    pub fn with_compression(mut self, compression: bool) -> Self {
        self.compression = compression;
        self
    }

    /// Index an additional `(vertex label, property)` pair.
    pub fn with_indexed_property(
        mut self,
        label: impl Into<String>,
        property: impl Into<String>,
    ) -> Self {
        self.indexed_properties.push((label.into(), property.into()));
        self
    }

    /// Whether `(label, property)` is maintained in the property index.
    pub fn is_indexed(&self, label: &str, property: &str) -> bool {
        self.indexed_properties
            .iter()
            .any(|(l, p)| l == label && p == property)
    }

    /// Convert to sled configuration.
    pub(crate) fn to_sled_config(&self) -> sled::Config {
        let mut config = sled::Config::new()
            .cache_capacity(self.cache_capacity)
            .use_compression(self.compression);

        if self.temporary {
            config = config.temporary(true);
        } else {
            config = config.path(&self.path);
        }

        config.flush_every_ms(self.flush_every_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::GraphStore;

    #[test]
    fn test_class_names_are_indexed_by_default() {
        let config = StorageConfig::temporary();
        assert!(config.is_indexed(CLASS_LABEL, CLASS_NAME_PROPERTY));
        assert!(!config.is_indexed("instance", "name"));

        let config = config.with_indexed_property("instance", "name");
        assert!(config.is_indexed("instance", "name"));
    }

    #[test]
    fn test_explicit_flush_without_background_flushing() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig::new(dir.path()).with_flush_every_ms(None);
        assert_eq!(config.flush_every_ms, None);
        {
            let store = GraphStore::open(config.clone()).unwrap();
            let mut tx = store.begin();
            tx.put_meta("catalog", vec![1]);
            tx.commit().unwrap();
            store.flush().unwrap();
        }

        let store = GraphStore::open(config).unwrap();
        assert_eq!(store.get_meta("catalog").unwrap(), Some(vec![1]));
    }
}
