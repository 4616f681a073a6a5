//! Class-definition statement types.

use crate::value::{ScalarType, Value};
use rkyv::{Archive, Deserialize, Serialize};
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

/// How many targets a relationship attribute may reference.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Archive,
    Serialize,
    Deserialize,
    SerdeSerialize,
    SerdeDeserialize,
)]
pub enum Cardinality {
    /// At most one target.
    Single,
    /// Many targets, optionally bounded.
    Multi {
        /// Maximum number of targets. `None` is unbounded.
        max: Option<u32>,
    },
}

impl Cardinality {
    /// Unbounded multi-valued cardinality.
    pub fn many() -> Self {
        Cardinality::Multi { max: None }
    }

    /// Bounded multi-valued cardinality.
    pub fn at_most(max: u32) -> Self {
        Cardinality::Multi { max: Some(max) }
    }

    /// Whether this attribute holds at most one target.
    pub fn is_single(&self) -> bool {
        matches!(self, Cardinality::Single)
    }

    /// Effective maximum number of outgoing edges, `None` if unbounded.
    pub fn max_edges(&self) -> Option<usize> {
        match self {
            Cardinality::Single => Some(1),
            Cardinality::Multi { max } => max.map(|m| m as usize),
        }
    }
}

impl std::fmt::Display for Cardinality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cardinality::Single => Ok(()),
            Cardinality::Multi { max: None } => f.write_str("[*]"),
            Cardinality::Multi { max: Some(max) } => write!(f, "[{}]", max),
        }
    }
}

/// A scalar attribute declared in a class statement.
#[derive(Debug, Clone, PartialEq, SerdeSerialize, SerdeDeserialize)]
pub struct ScalarSpec {
    pub name: String,
    pub ty: ScalarType,
    pub default: Option<Value>,
    pub required: bool,
    pub comment: Option<String>,
}

impl ScalarSpec {
    /// Create an optional scalar attribute.
    pub fn new(name: impl Into<String>, ty: ScalarType) -> Self {
        Self {
            name: name.into(),
            ty,
            default: None,
            required: false,
            comment: None,
        }
    }

    /// Mark the attribute as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the default value applied on insert.
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Set the comment.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// A relationship attribute declared in a class statement.
///
/// The inverse attribute is created on the target class. Its cardinality
/// defaults to unbounded multi-valued when not given.
#[derive(Debug, Clone, PartialEq, SerdeSerialize, SerdeDeserialize)]
pub struct RelationshipSpec {
    pub name: String,
    pub target: String,
    pub cardinality: Cardinality,
    pub distinct: bool,
    pub inverse: String,
    pub inverse_cardinality: Option<Cardinality>,
    pub inverse_distinct: bool,
    pub required: bool,
    pub comment: Option<String>,
}

impl RelationshipSpec {
    /// Create a single-valued, optional relationship.
    pub fn new(
        name: impl Into<String>,
        target: impl Into<String>,
        inverse: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            cardinality: Cardinality::Single,
            distinct: false,
            inverse: inverse.into(),
            inverse_cardinality: None,
            inverse_distinct: false,
            required: false,
            comment: None,
        }
    }

    /// Set the forward cardinality.
    pub fn with_cardinality(mut self, cardinality: Cardinality) -> Self {
        self.cardinality = cardinality;
        self
    }

    /// Forbid duplicate targets.
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Set the cardinality of the inverse attribute.
    pub fn with_inverse_cardinality(mut self, cardinality: Cardinality) -> Self {
        self.inverse_cardinality = Some(cardinality);
        self
    }

    /// Forbid duplicate targets on the inverse side.
    pub fn inverse_distinct(mut self) -> Self {
        self.inverse_distinct = true;
        self
    }

    /// Mark the attribute as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the comment.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// An attribute declared in a class statement.
#[derive(Debug, Clone, PartialEq, SerdeSerialize, SerdeDeserialize)]
pub enum AttributeSpec {
    Scalar(ScalarSpec),
    Relationship(RelationshipSpec),
}

impl AttributeSpec {
    /// Declared attribute name.
    pub fn name(&self) -> &str {
        match self {
            AttributeSpec::Scalar(s) => &s.name,
            AttributeSpec::Relationship(r) => &r.name,
        }
    }
}

impl From<ScalarSpec> for AttributeSpec {
    fn from(spec: ScalarSpec) -> Self {
        AttributeSpec::Scalar(spec)
    }
}

impl From<RelationshipSpec> for AttributeSpec {
    fn from(spec: RelationshipSpec) -> Self {
        AttributeSpec::Relationship(spec)
    }
}

/// `class` / `subclass` statement.
#[derive(Debug, Clone, PartialEq, SerdeSerialize, SerdeDeserialize)]
pub struct ClassDef {
    pub name: String,
    pub comment: Option<String>,
    pub attributes: Vec<AttributeSpec>,
    /// Empty means a direct subclass of the root.
    pub superclasses: Vec<String>,
}

impl ClassDef {
    /// Create a top-level class with no attributes.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            comment: None,
            attributes: Vec::new(),
            superclasses: Vec::new(),
        }
    }

    /// Add an attribute.
    pub fn with_attribute(mut self, attribute: impl Into<AttributeSpec>) -> Self {
        self.attributes.push(attribute.into());
        self
    }

    /// Add a superclass.
    pub fn with_superclass(mut self, superclass: impl Into<String>) -> Self {
        self.superclasses.push(superclass.into());
        self
    }

    /// Set the comment.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// `index` statement. Parsed but not executed.
#[derive(Debug, Clone, PartialEq, SerdeSerialize, SerdeDeserialize)]
pub struct IndexDef {
    pub name: String,
    pub class_name: String,
    pub attributes: Vec<String>,
}
