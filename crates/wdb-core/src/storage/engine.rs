//! Graph store implementation on top of sled.

use super::key::{self, EdgeId, VertexId};
use super::{EdgeRecord, StorageConfig, Transaction, VertexRecord};
use crate::error::Error;
use sled::{Db, Tree};
use wdb_proto::Value;

/// Tree name for vertex and edge records.
const GRAPH_TREE: &str = "graph";

/// Tree name for the adjacency and property indexes.
const INDEX_TREE: &str = "index";

/// Tree name for metadata (the catalog).
const META_TREE: &str = "meta";

/// A property graph persisted in sled.
///
/// Reads go straight to the committed state. All writes go through a
/// [`Transaction`] obtained from [`GraphStore::begin`].
pub struct GraphStore {
    /// The underlying sled database.
    db: Db,

    /// Vertex and edge records.
    graph_tree: Tree,

    /// Adjacency and property index entries.
    index_tree: Tree,

    /// Metadata records.
    meta_tree: Tree,

    config: StorageConfig,
}

impl GraphStore {
    /// Open or create a graph store with the given configuration.
    pub fn open(config: StorageConfig) -> Result<Self, Error> {
        let sled_config = config.to_sled_config();
        let db = sled_config.open()?;
        let graph_tree = db.open_tree(GRAPH_TREE)?;
        let index_tree = db.open_tree(INDEX_TREE)?;
        let meta_tree = db.open_tree(META_TREE)?;

        Ok(Self {
            db,
            graph_tree,
            index_tree,
            meta_tree,
            config,
        })
    }

    /// Check if the database was recovered from a previous run.
    pub fn was_recovered(&self) -> bool {
        self.db.was_recovered()
    }

    /// The configuration this store was opened with.
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Whether `(label, property)` is maintained in the property index.
    pub fn is_indexed(&self, label: &str, property: &str) -> bool {
        self.config.is_indexed(label, property)
    }

    /// Begin a new transaction.
    pub fn begin(&self) -> Transaction<'_> {
        Transaction::new(self)
    }

    /// Get a committed vertex.
    pub fn get_vertex(&self, id: VertexId) -> Result<Option<VertexRecord>, Error> {
        match self.graph_tree.get(key::vertex_key(id))? {
            Some(bytes) => Ok(Some(VertexRecord::from_bytes(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Get a committed edge.
    pub fn get_edge(&self, id: EdgeId) -> Result<Option<EdgeRecord>, Error> {
        match self.graph_tree.get(key::edge_key(id))? {
            Some(bytes) => Ok(Some(EdgeRecord::from_bytes(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Committed outgoing edges of `from` as `(label, edge, to)`, in edge id
    /// order per label.
    pub fn scan_adjacency(
        &self,
        from: VertexId,
        label: Option<&str>,
    ) -> Result<Vec<(String, EdgeId, VertexId)>, Error> {
        let prefix = key::adjacency_prefix(from, label);
        let mut edges = Vec::new();
        for result in self.index_tree.scan_prefix(&prefix) {
            let (k, v) = result?;
            let entry = key::decode_adjacency(&k, &v)
                .ok_or_else(|| Error::Corrupted(format!("bad adjacency entry for {}", from)))?;
            edges.push(entry);
        }
        Ok(edges)
    }

    /// Committed vertices whose indexed `label.property` equals `value`.
    pub fn scan_property_index(
        &self,
        label: &str,
        property: &str,
        value: &Value,
    ) -> Result<Vec<VertexId>, Error> {
        let prefix = key::property_prefix(label, property, value);
        let prefix_len = prefix.len();
        let mut ids = Vec::new();
        for result in self.index_tree.scan_prefix(&prefix) {
            let (k, _) = result?;
            // A longer value sharing this prefix is a different entry.
            if k.len() != prefix_len + key::ID_SIZE {
                continue;
            }
            if let Some(id) = key::decode_id(&k[prefix_len..]) {
                ids.push(VertexId(id));
            }
        }
        Ok(ids)
    }

    /// Get a committed metadata record.
    pub fn get_meta(&self, name: &str) -> Result<Option<Vec<u8>>, Error> {
        Ok(self.meta_tree.get(name.as_bytes())?.map(|v| v.to_vec()))
    }

    /// Allocate a new vertex or edge id. Ids are unique across restarts.
    pub fn generate_id(&self) -> Result<u64, Error> {
        Ok(self.db.generate_id()?)
    }

    /// Flush all pending writes to disk.
    pub fn flush(&self) -> Result<(), Error> {
        self.db.flush()?;
        Ok(())
    }

    /// Get database size in bytes.
    pub fn size_on_disk(&self) -> Result<u64, Error> {
        Ok(self.db.size_on_disk()?)
    }

    pub(crate) fn graph_tree(&self) -> &Tree {
        &self.graph_tree
    }

    pub(crate) fn index_tree(&self) -> &Tree {
        &self.index_tree
    }

    pub(crate) fn meta_tree(&self) -> &Tree {
        &self.meta_tree
    }
}
