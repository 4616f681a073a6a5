//! Storage layer for WDB.
//!
//! This module provides a sled-based property-graph store: vertices and
//! directed edges carrying named properties, an adjacency index keyed by
//! (vertex, edge label), a property index for configured
//! (vertex label, property) pairs, and buffered transactions.

mod config;
mod engine;
mod record;
mod transaction;

pub mod key;

pub use config::{StorageConfig, CLASS_LABEL, CLASS_NAME_PROPERTY};
pub use engine::GraphStore;
pub use key::{EdgeId, VertexId};
pub use record::{EdgeRecord, Property, VertexRecord};
pub use transaction::{EdgeRef, Transaction, TransactionOp};
