//! Stored vertex and edge records.

use super::key::VertexId;
use crate::error::Error;
use rkyv::{Archive, Deserialize, Serialize};
use wdb_proto::Value;

/// A named property value.
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub value: Value,
}

impl Property {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A stored vertex.
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
pub struct VertexRecord {
    pub label: String,
    /// Properties in insertion order. Null values are never stored.
    pub properties: Vec<Property>,
}

impl VertexRecord {
    pub fn new(label: impl Into<String>, properties: Vec<Property>) -> Self {
        Self {
            label: label.into(),
            properties: properties
                .into_iter()
                .filter(|p| !p.value.is_null())
                .collect(),
        }
    }

    /// Current value of a property.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.properties
            .iter()
            .find(|p| p.name == name)
            .map(|p| &p.value)
    }

    /// Set a property. A null value removes it.
    pub fn set(&mut self, name: &str, value: Value) {
        let position = self.properties.iter().position(|p| p.name == name);
        match (position, value.is_null()) {
            (Some(i), true) => {
                self.properties.remove(i);
            }
            (Some(i), false) => self.properties[i].value = value,
            (None, true) => {}
            (None, false) => self.properties.push(Property::new(name, value)),
        }
    }

    /// Serialize the record to bytes using rkyv.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        rkyv::to_bytes::<rkyv::rancor::Error>(self)
            .map(|v| v.to_vec())
            .map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserialize a record from bytes using rkyv.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        rkyv::from_bytes::<Self, rkyv::rancor::Error>(bytes)
            .map_err(|e| Error::Deserialization(e.to_string()))
    }
}

/// A stored directed edge.
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub from: VertexId,
    pub label: String,
    pub to: VertexId,
    pub properties: Vec<Property>,
}

impl EdgeRecord {
    /// Serialize the record to bytes using rkyv.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        rkyv::to_bytes::<rkyv::rancor::Error>(self)
            .map(|v| v.to_vec())
            .map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserialize a record from bytes using rkyv.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        rkyv::from_bytes::<Self, rkyv::rancor::Error>(bytes)
            .map_err(|e| Error::Deserialization(e.to_string()))
    }
}
