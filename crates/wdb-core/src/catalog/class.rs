//! Class and attribute definitions.

use rkyv::{Archive, Deserialize, Serialize};
use wdb_proto::{Cardinality, ScalarType, Value};

/// What an attribute holds.
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
pub enum AttributeKind {
    /// A typed literal stored on the instance.
    Scalar {
        ty: ScalarType,
        default: Option<Value>,
    },
    /// Edges to instances of `target`, mirrored under `inverse` on the target.
    Relationship {
        target: String,
        cardinality: Cardinality,
        distinct: bool,
        inverse: String,
    },
}

/// Borrowed view of a relationship attribute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Relationship<'a> {
    pub name: &'a str,
    pub target: &'a str,
    pub cardinality: Cardinality,
    pub distinct: bool,
    pub inverse: &'a str,
    pub required: bool,
}

/// An attribute of a class, either declared on it or inherited.
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
pub struct AttributeDefinition {
    pub name: String,
    pub comment: Option<String>,
    pub required: bool,
    /// Class whose statement (or inverse wiring) introduced the attribute.
    pub declared_in: String,
    pub kind: AttributeKind,
}

impl AttributeDefinition {
    /// A scalar attribute.
    pub fn scalar(
        name: impl Into<String>,
        declared_in: impl Into<String>,
        ty: ScalarType,
        default: Option<Value>,
    ) -> Self {
        Self {
            name: name.into(),
            comment: None,
            required: false,
            declared_in: declared_in.into(),
            kind: AttributeKind::Scalar { ty, default },
        }
    }

    /// A relationship attribute.
    pub fn relationship(
        name: impl Into<String>,
        declared_in: impl Into<String>,
        target: impl Into<String>,
        cardinality: Cardinality,
        inverse: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            comment: None,
            required: false,
            declared_in: declared_in.into(),
            kind: AttributeKind::Relationship {
                target: target.into(),
                cardinality,
                distinct: false,
                inverse: inverse.into(),
            },
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self.kind, AttributeKind::Scalar { .. })
    }

    pub fn is_relationship(&self) -> bool {
        matches!(self.kind, AttributeKind::Relationship { .. })
    }

    /// Declared scalar type, `None` for relationships.
    pub fn scalar_type(&self) -> Option<ScalarType> {
        match &self.kind {
            AttributeKind::Scalar { ty, .. } => Some(*ty),
            AttributeKind::Relationship { .. } => None,
        }
    }

    /// Relationship view of this attribute, `None` for scalars.
    pub fn as_relationship(&self) -> Option<Relationship<'_>> {
        match &self.kind {
            AttributeKind::Relationship {
                target,
                cardinality,
                distinct,
                inverse,
            } => Some(Relationship {
                name: &self.name,
                target,
                cardinality: *cardinality,
                distinct: *distinct,
                inverse,
                required: self.required,
            }),
            AttributeKind::Scalar { .. } => None,
        }
    }

    /// Default value of a scalar attribute.
    pub fn default_value(&self) -> Option<&Value> {
        match &self.kind {
            AttributeKind::Scalar { default, .. } => default.as_ref(),
            AttributeKind::Relationship { .. } => None,
        }
    }

    /// Same definition, ignoring where it was declared.
    pub fn same_shape(&self, other: &AttributeDefinition) -> bool {
        self.name == other.name && self.required == other.required && self.kind == other.kind
    }

    /// Type as written in a class statement, e.g. `integer` or `dept[*]`.
    pub fn type_label(&self) -> String {
        match &self.kind {
            AttributeKind::Scalar { ty, .. } => ty.name().to_string(),
            AttributeKind::Relationship {
                target,
                cardinality,
                ..
            } => format!("{}{}", target, cardinality),
        }
    }
}

/// A class in the catalog.
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
pub struct ClassDefinition {
    pub name: String,
    pub comment: Option<String>,
    /// Own and inherited attributes, in declaration order.
    pub attributes: Vec<AttributeDefinition>,
    /// Direct superclasses. Top-level classes list the root class.
    pub superclasses: Vec<String>,
    /// Direct subclasses, in definition order.
    pub subclasses: Vec<String>,
}

impl ClassDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            comment: None,
            attributes: Vec::new(),
            superclasses: Vec::new(),
            subclasses: Vec::new(),
        }
    }

    /// Look up an attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&AttributeDefinition> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    /// Relationship attributes only.
    pub fn relationships(&self) -> impl Iterator<Item = &AttributeDefinition> {
        self.attributes.iter().filter(|a| a.is_relationship())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_label() {
        let age = AttributeDefinition::scalar("age", "person", ScalarType::Integer, None);
        assert_eq!(age.type_label(), "integer");

        let staff =
            AttributeDefinition::relationship("staff", "dept", "worker", Cardinality::many(), "dept");
        assert_eq!(staff.type_label(), "worker[*]");
        assert!(staff.is_relationship());
        let view = staff.as_relationship().unwrap();
        assert_eq!(view.target, "worker");
        assert_eq!(view.inverse, "dept");
        assert!(age.as_relationship().is_none());
        assert_eq!(staff.scalar_type(), None);
    }

    #[test]
    fn test_same_shape_ignores_origin() {
        let a = AttributeDefinition::scalar("name", "a", ScalarType::String, None);
        let b = AttributeDefinition::scalar("name", "b", ScalarType::String, None);
        let c = AttributeDefinition::scalar("name", "a", ScalarType::Integer, None);
        assert!(a.same_shape(&b));
        assert!(!a.same_shape(&c));
    }

    #[test]
    fn test_attribute_lookup() {
        let mut class = ClassDefinition::new("person");
        class.attributes.push(AttributeDefinition::scalar(
            "name",
            "person",
            ScalarType::String,
            None,
        ));
        assert!(class.has_attribute("name"));
        assert!(class.attribute("age").is_none());
        assert_eq!(class.relationships().count(), 0);
    }
}
