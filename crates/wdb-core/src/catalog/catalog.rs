//! The class registry and its persisted form.

use std::collections::HashMap;

use super::class::ClassDefinition;
use crate::error::{Error, SchemaError};
use rkyv::{Archive, Deserialize, Serialize};

/// Name of the implicit superclass of every top-level class.
///
/// The space keeps it from colliding with any parsed class name.
pub const ROOT_CLASS: &str = "root node";

/// Metadata key under which the catalog is stored.
pub const CATALOG_KEY: &str = "catalog";

/// Serialized form of the catalog.
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
struct CatalogSnapshot {
    classes: Vec<ClassDefinition>,
}

/// Registry of class definitions.
///
/// Lookups never touch instance data. Class names are stored lower-cased.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    classes: Vec<ClassDefinition>,
    by_name: HashMap<String, usize>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    /// A catalog holding only the root class.
    pub fn new() -> Self {
        let mut catalog = Self {
            classes: Vec::new(),
            by_name: HashMap::new(),
        };
        catalog.insert(ClassDefinition::new(ROOT_CLASS));
        catalog
    }

    /// Get a class by name.
    pub fn get(&self, name: &str) -> Option<&ClassDefinition> {
        self.by_name.get(name).map(|&i| &self.classes[i])
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut ClassDefinition> {
        match self.by_name.get(name) {
            Some(&i) => Some(&mut self.classes[i]),
            None => None,
        }
    }

    /// Whether a class with this name exists (the root class included).
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// The root class.
    pub fn root(&self) -> &ClassDefinition {
        &self.classes[0]
    }

    /// User-defined classes in definition order.
    pub fn classes(&self) -> impl Iterator<Item = &ClassDefinition> {
        self.classes.iter().skip(1)
    }

    /// Number of user-defined classes.
    pub fn len(&self) -> usize {
        self.classes.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn insert(&mut self, class: ClassDefinition) {
        self.by_name.insert(class.name.clone(), self.classes.len());
        self.classes.push(class);
    }

    /// Serialize the catalog to bytes using rkyv.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        let snapshot = CatalogSnapshot {
            classes: self.classes.clone(),
        };
        rkyv::to_bytes::<rkyv::rancor::Error>(&snapshot)
            .map(|v| v.to_vec())
            .map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserialize a catalog from bytes using rkyv.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let snapshot = rkyv::from_bytes::<CatalogSnapshot, rkyv::rancor::Error>(bytes)
            .map_err(|e| Error::Deserialization(e.to_string()))?;

        match snapshot.classes.first() {
            Some(root) if root.name == ROOT_CLASS => {}
            _ => return Err(Error::Corrupted("catalog has no root class".to_string())),
        }

        let by_name = snapshot
            .classes
            .iter()
            .enumerate()
            .map(|(i, c)| (c.name.clone(), i))
            .collect();
        Ok(Self {
            classes: snapshot.classes,
            by_name,
        })
    }

    /// Get a class or fail with `UnknownClass`.
    pub fn require(&self, name: &str) -> Result<&ClassDefinition, SchemaError> {
        self.get(name)
            .ok_or_else(|| SchemaError::UnknownClass(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::AttributeDefinition;
    use wdb_proto::ScalarType;

    #[test]
    fn test_new_catalog_has_only_root() {
        let catalog = Catalog::new();
        assert!(catalog.is_empty());
        assert!(catalog.contains(ROOT_CLASS));
        assert_eq!(catalog.root().name, ROOT_CLASS);
        assert_eq!(catalog.classes().count(), 0);
    }

    #[test]
    fn test_bytes_roundtrip() {
        let mut catalog = Catalog::new();
        let mut person = ClassDefinition::new("person");
        person.attributes.push(AttributeDefinition::scalar(
            "name",
            "person",
            ScalarType::String,
            None,
        ));
        person.superclasses.push(ROOT_CLASS.to_string());
        catalog.insert(person);

        let restored = Catalog::from_bytes(&catalog.to_bytes().unwrap()).unwrap();
        assert_eq!(restored, catalog);
        assert!(restored.get("person").unwrap().has_attribute("name"));
    }

    #[test]
    fn test_require_unknown() {
        let catalog = Catalog::new();
        assert_eq!(
            catalog.require("ghost").unwrap_err(),
            SchemaError::UnknownClass("ghost".to_string())
        );
    }
}
