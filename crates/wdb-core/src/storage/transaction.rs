//! Buffered transactions over the graph store.
//!
//! A transaction collects every write in memory and reads its own writes.
//! Nothing reaches sled until [`Transaction::commit`], which applies the
//! buffered changes to all three trees in one sled transaction. Dropping a
//! transaction without committing discards it.

use std::collections::{BTreeMap, HashMap};

use super::key::{self, EdgeId, VertexId};
use super::{EdgeRecord, GraphStore, Property, VertexRecord};
use crate::error::Error;
use sled::transaction::{ConflictableTransactionError, TransactionalTree};
use sled::Transactional;
use tracing::debug;
use wdb_proto::Value;

/// A pending operation in a transaction.
#[derive(Debug, Clone, PartialEq)]
pub enum TransactionOp {
    NewVertex(VertexId),
    NewEdge(EdgeId),
    SetProperty { vertex: VertexId, name: String },
    RemoveEdge(EdgeId),
    PutMeta(String),
}

/// An outgoing edge as seen from inside a transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeRef {
    pub id: EdgeId,
    pub label: String,
    pub target: VertexId,
    pub properties: Vec<Property>,
}

#[derive(Debug, Clone)]
enum EdgeChange {
    Created(EdgeRecord),
    Removed(EdgeRecord),
}

/// Key/value writes for one tree. `None` removes the key.
type TreeWrites = Vec<(Vec<u8>, Option<Vec<u8>>)>;

#[derive(Debug, Default)]
struct PendingWrites {
    graph: TreeWrites,
    index: TreeWrites,
    meta: TreeWrites,
}

/// A transaction for atomic graph mutations.
pub struct Transaction<'a> {
    store: &'a GraphStore,
    ops: Vec<TransactionOp>,
    /// Vertices written in this transaction (created or modified).
    vertex_cache: HashMap<VertexId, VertexRecord>,
    /// Edges created or removed in this transaction.
    edge_cache: HashMap<EdgeId, EdgeChange>,
    /// Created edges by source vertex.
    created_from: HashMap<VertexId, Vec<EdgeId>>,
    meta_cache: BTreeMap<String, Vec<u8>>,
}

impl<'a> Transaction<'a> {
    /// Create a new transaction.
    pub(crate) fn new(store: &'a GraphStore) -> Self {
        Self {
            store,
            ops: Vec::new(),
            vertex_cache: HashMap::new(),
            edge_cache: HashMap::new(),
            created_from: HashMap::new(),
            meta_cache: BTreeMap::new(),
        }
    }

    /// Create a vertex.
    pub fn new_vertex(
        &mut self,
        label: impl Into<String>,
        properties: Vec<Property>,
    ) -> Result<VertexId, Error> {
        let id = VertexId(self.store.generate_id()?);
        self.vertex_cache
            .insert(id, VertexRecord::new(label, properties));
        self.ops.push(TransactionOp::NewVertex(id));
        Ok(id)
    }

    /// Create a directed edge `from -label-> to`.
    pub fn new_edge(
        &mut self,
        from: VertexId,
        label: impl Into<String>,
        to: VertexId,
        properties: Vec<Property>,
    ) -> Result<EdgeId, Error> {
        self.require_vertex(from)?;
        self.require_vertex(to)?;

        let id = EdgeId(self.store.generate_id()?);
        let record = EdgeRecord {
            from,
            label: label.into(),
            to,
            properties,
        };
        self.edge_cache.insert(id, EdgeChange::Created(record));
        self.created_from.entry(from).or_default().push(id);
        self.ops.push(TransactionOp::NewEdge(id));
        Ok(id)
    }

    /// Read a vertex, including uncommitted writes.
    pub fn get_vertex(&self, id: VertexId) -> Result<Option<VertexRecord>, Error> {
        if let Some(record) = self.vertex_cache.get(&id) {
            return Ok(Some(record.clone()));
        }
        self.store.get_vertex(id)
    }

    /// Read one property of a vertex.
    pub fn get_property(&self, vertex: VertexId, name: &str) -> Result<Option<Value>, Error> {
        Ok(self
            .get_vertex(vertex)?
            .and_then(|record| record.get(name).cloned()))
    }

    /// Set a property. Setting `Value::Null` removes it.
    pub fn set_property(
        &mut self,
        vertex: VertexId,
        name: &str,
        value: impl Into<Value>,
    ) -> Result<(), Error> {
        let mut record = self.require_vertex(vertex)?;
        record.set(name, value.into());
        self.vertex_cache.insert(vertex, record);
        self.ops.push(TransactionOp::SetProperty {
            vertex,
            name: name.to_string(),
        });
        Ok(())
    }

    /// Outgoing edges of `vertex`, optionally restricted to one label,
    /// ordered by edge id.
    pub fn outgoing_edges(
        &self,
        vertex: VertexId,
        label: Option<&str>,
    ) -> Result<Vec<EdgeRef>, Error> {
        let mut edges = Vec::new();

        for (edge_label, id, target) in self.store.scan_adjacency(vertex, label)? {
            if matches!(self.edge_cache.get(&id), Some(EdgeChange::Removed(_))) {
                continue;
            }
            let properties = match self.store.get_edge(id)? {
                Some(record) => record.properties,
                None => return Err(Error::Corrupted(format!("dangling adjacency entry {}", id))),
            };
            edges.push(EdgeRef {
                id,
                label: edge_label,
                target,
                properties,
            });
        }

        for id in self.created_from.get(&vertex).into_iter().flatten() {
            if let Some(EdgeChange::Created(record)) = self.edge_cache.get(id) {
                if label.map_or(true, |l| l == record.label) {
                    edges.push(EdgeRef {
                        id: *id,
                        label: record.label.clone(),
                        target: record.to,
                        properties: record.properties.clone(),
                    });
                }
            }
        }

        edges.sort_by_key(|e| e.id);
        Ok(edges)
    }

    /// Remove an edge.
    pub fn remove_edge(&mut self, id: EdgeId) -> Result<(), Error> {
        match self.edge_cache.get(&id) {
            Some(EdgeChange::Created(record)) => {
                // Never reached sled, forget it.
                if let Some(ids) = self.created_from.get_mut(&record.from) {
                    ids.retain(|e| *e != id);
                }
                self.edge_cache.remove(&id);
            }
            Some(EdgeChange::Removed(_)) => return Ok(()),
            None => {
                let record = self
                    .store
                    .get_edge(id)?
                    .ok_or_else(|| Error::Corrupted(format!("edge {} not found", id)))?;
                self.edge_cache.insert(id, EdgeChange::Removed(record));
            }
        }
        self.ops.push(TransactionOp::RemoveEdge(id));
        Ok(())
    }

    /// Vertices labelled `label` whose `property` equals `value`.
    ///
    /// Only pairs configured in `StorageConfig::indexed_properties` can be
    /// looked up.
    pub fn lookup_by_index(
        &self,
        label: &str,
        property: &str,
        value: &Value,
    ) -> Result<Vec<VertexId>, Error> {
        if !self.store.is_indexed(label, property) {
            return Err(Error::Unsupported(format!(
                "lookup on unindexed property {}.{}",
                label, property
            )));
        }

        let mut hits: Vec<VertexId> = self
            .store
            .scan_property_index(label, property, value)?
            .into_iter()
            .filter(|id| !self.vertex_cache.contains_key(id))
            .collect();

        for (id, record) in &self.vertex_cache {
            if record.label == label && record.get(property) == Some(value) {
                hits.push(*id);
            }
        }

        hits.sort();
        Ok(hits)
    }

    /// Read a metadata record, including uncommitted writes.
    pub fn get_meta(&self, name: &str) -> Result<Option<Vec<u8>>, Error> {
        if let Some(bytes) = self.meta_cache.get(name) {
            return Ok(Some(bytes.clone()));
        }
        self.store.get_meta(name)
    }

    /// Write a metadata record.
    pub fn put_meta(&mut self, name: impl Into<String>, bytes: Vec<u8>) {
        let name = name.into();
        self.meta_cache.insert(name.clone(), bytes);
        self.ops.push(TransactionOp::PutMeta(name));
    }

    /// Get the number of pending operations.
    pub fn operation_count(&self) -> usize {
        self.ops.len()
    }

    /// Commit the transaction atomically.
    ///
    /// All buffered writes succeed or none do.
    pub fn commit(self) -> Result<(), Error> {
        if self.ops.is_empty() {
            return Ok(());
        }

        let writes = self.collect_writes()?;

        let graph_tree = self.store.graph_tree();
        let index_tree = self.store.index_tree();
        let meta_tree = self.store.meta_tree();

        let result: Result<(), sled::transaction::TransactionError<Error>> =
            (graph_tree, index_tree, meta_tree).transaction(|(graph_tx, index_tx, meta_tx)| {
                Self::apply(graph_tx, &writes.graph)?;
                Self::apply(index_tx, &writes.index)?;
                Self::apply(meta_tx, &writes.meta)?;
                Ok(())
            });

        match result {
            Ok(()) => {
                debug!(ops = self.ops.len(), "transaction committed");
                Ok(())
            }
            Err(sled::transaction::TransactionError::Abort(e)) => Err(e),
            Err(sled::transaction::TransactionError::Storage(e)) => Err(Error::Storage(e)),
        }
    }

    /// Rollback the transaction (discard all pending operations).
    pub fn rollback(self) {
        debug!(ops = self.ops.len(), "transaction rolled back");
    }

    fn require_vertex(&self, id: VertexId) -> Result<VertexRecord, Error> {
        self.get_vertex(id)?
            .ok_or_else(|| Error::Corrupted(format!("vertex {} not found", id)))
    }

    /// Turn the buffered state into per-tree writes, diffing indexed
    /// properties against the committed vertices.
    fn collect_writes(&self) -> Result<PendingWrites, Error> {
        let mut writes = PendingWrites::default();

        for (id, after) in &self.vertex_cache {
            let before = self.store.get_vertex(*id)?;
            writes
                .graph
                .push((key::vertex_key(*id).to_vec(), Some(after.to_bytes()?)));

            for (label, property) in &self.store.config().indexed_properties {
                let old = before
                    .as_ref()
                    .filter(|r| &r.label == label)
                    .and_then(|r| r.get(property));
                let new = Some(after)
                    .filter(|r| &r.label == label)
                    .and_then(|r| r.get(property));
                if old == new {
                    continue;
                }
                if let Some(value) = old {
                    writes
                        .index
                        .push((key::property_key(label, property, value, *id), None));
                }
                if let Some(value) = new {
                    writes.index.push((
                        key::property_key(label, property, value, *id),
                        Some(Vec::new()),
                    ));
                }
            }
        }

        for (id, change) in &self.edge_cache {
            match change {
                EdgeChange::Created(record) => {
                    writes
                        .graph
                        .push((key::edge_key(*id).to_vec(), Some(record.to_bytes()?)));
                    writes.index.push((
                        key::adjacency_key(record.from, &record.label, *id),
                        Some(record.to.0.to_be_bytes().to_vec()),
                    ));
                }
                EdgeChange::Removed(record) => {
                    writes.graph.push((key::edge_key(*id).to_vec(), None));
                    writes
                        .index
                        .push((key::adjacency_key(record.from, &record.label, *id), None));
                }
            }
        }

        for (name, bytes) in &self.meta_cache {
            writes
                .meta
                .push((name.as_bytes().to_vec(), Some(bytes.clone())));
        }

        Ok(writes)
    }

    fn apply(
        tx: &TransactionalTree,
        writes: &TreeWrites,
    ) -> Result<(), ConflictableTransactionError<Error>> {
        for (k, v) in writes {
            match v {
                Some(v) => {
                    tx.insert(k.as_slice(), v.as_slice())?;
                }
                None => {
                    tx.remove(k.as_slice())?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageConfig;

    fn test_store() -> GraphStore {
        GraphStore::open(StorageConfig::temporary()).unwrap()
    }

    #[test]
    fn test_transaction_commit() {
        let store = test_store();
        let mut tx = store.begin();
        let a = tx.new_vertex("instance", Vec::new()).unwrap();
        let b = tx.new_vertex("instance", Vec::new()).unwrap();
        tx.new_edge(a, "friend", b, Vec::new()).unwrap();
        assert_eq!(tx.operation_count(), 3);
        tx.commit().unwrap();

        let tx = store.begin();
        let edges = tx.outgoing_edges(a, Some("friend")).unwrap();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].target, b);
    }

    #[test]
    fn test_transaction_rollback() {
        let store = test_store();
        let mut tx = store.begin();
        let a = tx.new_vertex("instance", Vec::new()).unwrap();
        tx.rollback();

        assert!(store.get_vertex(a).unwrap().is_none());
    }

    #[test]
    fn test_drop_discards_writes() {
        let store = test_store();
        let a = {
            let mut tx = store.begin();
            tx.new_vertex("instance", Vec::new()).unwrap()
        };
        assert!(store.get_vertex(a).unwrap().is_none());
    }

    #[test]
    fn test_empty_transaction() {
        let store = test_store();
        let tx = store.begin();
        assert_eq!(tx.operation_count(), 0);
        tx.commit().unwrap();
    }

    #[test]
    fn test_read_uncommitted_write() {
        let store = test_store();
        let mut tx = store.begin();
        let a = tx
            .new_vertex("instance", vec![Property::new("age", 1)])
            .unwrap();
        tx.set_property(a, "age", 2).unwrap();
        assert_eq!(tx.get_property(a, "age").unwrap(), Some(Value::Int(2)));

        tx.set_property(a, "age", Value::Null).unwrap();
        assert_eq!(tx.get_property(a, "age").unwrap(), None);
    }

    #[test]
    fn test_set_property_on_missing_vertex() {
        let store = test_store();
        let mut tx = store.begin();
        assert!(matches!(
            tx.set_property(VertexId(999), "age", 1),
            Err(Error::Corrupted(_))
        ));
    }

    #[test]
    fn test_remove_committed_edge() {
        let store = test_store();
        let mut tx = store.begin();
        let a = tx.new_vertex("instance", Vec::new()).unwrap();
        let b = tx.new_vertex("instance", Vec::new()).unwrap();
        let e = tx.new_edge(a, "friend", b, Vec::new()).unwrap();
        tx.commit().unwrap();

        let mut tx = store.begin();
        tx.remove_edge(e).unwrap();
        assert!(tx.outgoing_edges(a, None).unwrap().is_empty());
        // Still visible outside the transaction until commit.
        assert_eq!(store.scan_adjacency(a, None).unwrap().len(), 1);
        tx.commit().unwrap();

        assert!(store.scan_adjacency(a, None).unwrap().is_empty());
        assert!(store.get_edge(e).unwrap().is_none());
    }

    #[test]
    fn test_remove_uncommitted_edge() {
        let store = test_store();
        let mut tx = store.begin();
        let a = tx.new_vertex("instance", Vec::new()).unwrap();
        let b = tx.new_vertex("instance", Vec::new()).unwrap();
        let e = tx.new_edge(a, "friend", b, Vec::new()).unwrap();
        let kept = tx.new_edge(a, "friend", b, Vec::new()).unwrap();
        tx.remove_edge(e).unwrap();
        let ids: Vec<EdgeId> = tx.outgoing_edges(a, None).unwrap().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![kept]);
        tx.remove_edge(kept).unwrap();
        tx.commit().unwrap();

        assert!(store.scan_adjacency(a, None).unwrap().is_empty());
        assert!(store.get_edge(e).unwrap().is_none());
    }

    #[test]
    fn test_outgoing_edges_merges_committed_and_new() {
        let store = test_store();
        let mut tx = store.begin();
        let a = tx.new_vertex("instance", Vec::new()).unwrap();
        let b = tx.new_vertex("instance", Vec::new()).unwrap();
        let first = tx.new_edge(a, "friend", b, Vec::new()).unwrap();
        tx.commit().unwrap();

        let mut tx = store.begin();
        let second = tx
            .new_edge(a, "friend", b, vec![Property::new("since", 2020)])
            .unwrap();
        tx.new_edge(a, "enemy", b, Vec::new()).unwrap();

        let friends = tx.outgoing_edges(a, Some("friend")).unwrap();
        let ids: Vec<EdgeId> = friends.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![first, second]);
        assert_eq!(friends[1].properties, vec![Property::new("since", 2020)]);
        assert_eq!(tx.outgoing_edges(a, None).unwrap().len(), 3);
    }

    #[test]
    fn test_lookup_by_index_sees_writes() {
        let store = test_store();
        let mut tx = store.begin();
        let dept = tx
            .new_vertex("@class", vec![Property::new("name", "dept")])
            .unwrap();
        assert_eq!(
            tx.lookup_by_index("@class", "name", &Value::from("dept"))
                .unwrap(),
            vec![dept]
        );
        tx.commit().unwrap();

        let mut tx = store.begin();
        tx.set_property(dept, "name", "division").unwrap();
        assert!(tx
            .lookup_by_index("@class", "name", &Value::from("dept"))
            .unwrap()
            .is_empty());
        tx.commit().unwrap();

        let tx = store.begin();
        assert_eq!(
            tx.lookup_by_index("@class", "name", &Value::from("division"))
                .unwrap(),
            vec![dept]
        );
        assert!(tx
            .lookup_by_index("@class", "name", &Value::from("dept"))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_lookup_on_unindexed_property() {
        let store = test_store();
        let tx = store.begin();
        assert!(matches!(
            tx.lookup_by_index("instance", "name", &Value::from("x")),
            Err(Error::Unsupported(_))
        ));
    }

    #[test]
    fn test_meta_read_your_writes() {
        let store = test_store();
        let mut tx = store.begin();
        tx.put_meta("catalog", vec![9]);
        assert_eq!(tx.get_meta("catalog").unwrap(), Some(vec![9]));
        assert_eq!(store.get_meta("catalog").unwrap(), None);
        tx.commit().unwrap();
        assert_eq!(store.get_meta("catalog").unwrap(), Some(vec![9]));
    }
}
