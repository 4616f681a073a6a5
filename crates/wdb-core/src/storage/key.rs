//! Identifier types and key encoding for the graph store.
//!
//! Graph tree:
//! - `v` + vertex id (8 bytes, big-endian) -> vertex record
//! - `e` + edge id (8 bytes, big-endian) -> edge record
//!
//! Index tree:
//! - `a` + from id + label + `0x00` + edge id -> to id (adjacency)
//! - `p` + vertex label + `0x00` + property + `0x00` + encoded value + `0x00` + vertex id -> empty
//!
//! Big-endian ids keep adjacency scans in edge creation order.

use std::fmt;

use rkyv::{Archive, Deserialize, Serialize};
use wdb_proto::Value;

/// Size of an encoded id in bytes.
pub const ID_SIZE: usize = 8;

const VERTEX_TAG: u8 = b'v';
const EDGE_TAG: u8 = b'e';
const ADJACENCY_TAG: u8 = b'a';
const PROPERTY_TAG: u8 = b'p';

/// Identifier of a stored vertex.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Archive, Serialize, Deserialize,
)]
pub struct VertexId(pub u64);

/// Identifier of a stored edge.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Archive, Serialize, Deserialize,
)]
pub struct EdgeId(pub u64);

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// Graph-tree key of a vertex record.
pub fn vertex_key(id: VertexId) -> [u8; 1 + ID_SIZE] {
    tagged_id(VERTEX_TAG, id.0)
}

/// Graph-tree key of an edge record.
pub fn edge_key(id: EdgeId) -> [u8; 1 + ID_SIZE] {
    tagged_id(EDGE_TAG, id.0)
}

fn tagged_id(tag: u8, id: u64) -> [u8; 1 + ID_SIZE] {
    let mut buf = [0u8; 1 + ID_SIZE];
    buf[0] = tag;
    buf[1..].copy_from_slice(&id.to_be_bytes());
    buf
}

/// Prefix for scanning the outgoing edges of `from`, optionally under one label.
pub fn adjacency_prefix(from: VertexId, label: Option<&str>) -> Vec<u8> {
    let mut prefix = Vec::with_capacity(1 + ID_SIZE + label.map_or(0, |l| l.len() + 1));
    prefix.push(ADJACENCY_TAG);
    prefix.extend_from_slice(&from.0.to_be_bytes());
    if let Some(label) = label {
        prefix.extend_from_slice(label.as_bytes());
        prefix.push(0);
    }
    prefix
}

/// Adjacency key of one edge.
pub fn adjacency_key(from: VertexId, label: &str, edge: EdgeId) -> Vec<u8> {
    let mut key = adjacency_prefix(from, Some(label));
    key.extend_from_slice(&edge.0.to_be_bytes());
    key
}

/// Split an adjacency entry into `(label, edge, to)`.
pub fn decode_adjacency(key: &[u8], value: &[u8]) -> Option<(String, EdgeId, VertexId)> {
    let header = 1 + ID_SIZE;
    if key.len() < header + 1 + ID_SIZE || key[0] != ADJACENCY_TAG {
        return None;
    }
    let separator = key.len() - ID_SIZE - 1;
    if key[separator] != 0 {
        return None;
    }
    let label = std::str::from_utf8(&key[header..separator]).ok()?.to_string();
    let edge = EdgeId(decode_id(&key[separator + 1..])?);
    let to = VertexId(decode_id(value)?);
    Some((label, edge, to))
}

/// Prefix shared by every vertex whose `label.property` equals `value`.
pub fn property_prefix(label: &str, property: &str, value: &Value) -> Vec<u8> {
    let encoded = encode_value(value);
    let mut prefix =
        Vec::with_capacity(1 + label.len() + property.len() + encoded.len() + 3 + ID_SIZE);
    prefix.push(PROPERTY_TAG);
    prefix.extend_from_slice(label.as_bytes());
    prefix.push(0);
    prefix.extend_from_slice(property.as_bytes());
    prefix.push(0);
    prefix.extend_from_slice(&encoded);
    prefix.push(0);
    prefix
}

/// Property-index key of one vertex.
pub fn property_key(label: &str, property: &str, value: &Value, vertex: VertexId) -> Vec<u8> {
    let mut key = property_prefix(label, property, value);
    key.extend_from_slice(&vertex.0.to_be_bytes());
    key
}

/// Decode a big-endian id.
pub fn decode_id(bytes: &[u8]) -> Option<u64> {
    let buf: [u8; ID_SIZE] = bytes.try_into().ok()?;
    Some(u64::from_be_bytes(buf))
}

fn encode_value(value: &Value) -> Vec<u8> {
    let (tag, text) = match value {
        Value::Null => (b'n', String::new()),
        Value::Bool(b) => (b'b', b.to_string()),
        Value::Int(i) => (b'i', i.to_string()),
        Value::String(s) => (b's', s.clone()),
    };
    let mut buf = Vec::with_capacity(1 + text.len());
    buf.push(tag);
    buf.extend_from_slice(text.as_bytes());
    buf
}
