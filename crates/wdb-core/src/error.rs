//! Core error types.
//!
//! Errors are grouped into families that mirror the stages of statement
//! execution. The top-level [`Error`] wraps each family so callers can match
//! on the family or on a single variant.

use thiserror::Error;

/// Class-level schema errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A class with this name is already defined.
    #[error("class '{0}' is already defined")]
    DuplicateClass(String),

    /// A declared superclass does not exist.
    #[error("superclass '{superclass}' of '{class}' is not defined")]
    UnknownSuperclass { class: String, superclass: String },

    /// A class names itself as a superclass.
    #[error("class '{0}' cannot be a subclass of itself")]
    SelfSubclass(String),

    /// A statement refers to a class that does not exist.
    #[error("class '{0}' is not defined")]
    UnknownClass(String),

    /// A relationship targets a class that does not exist.
    #[error("attribute '{attribute}' targets undefined class '{target}'")]
    UnknownTargetClass { attribute: String, target: String },

    /// Re-parenting into a class that does not descend from the source class.
    #[error("class '{class}' is not a subclass of '{superclass}'")]
    NotASubclass { class: String, superclass: String },
}

/// Attribute lookup and typing errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttributeError {
    #[error("class '{class}' has no scalar attribute '{attribute}'")]
    UnknownScalarAttribute { class: String, attribute: String },

    #[error("class '{class}' has no relationship attribute '{attribute}'")]
    UnknownRelationshipAttribute { class: String, attribute: String },

    /// The class named in a relationship assignment is not the declared
    /// target class or one of its subclasses.
    #[error("attribute '{attribute}' expects instances of '{expected}', got '{actual}'")]
    TargetClassMismatch {
        attribute: String,
        expected: String,
        actual: String,
    },

    #[error("attribute '{attribute}' has type {expected}, got {actual}")]
    TypeMismatch {
        attribute: String,
        expected: String,
        actual: String,
    },

    /// An attribute name is declared twice on the same class, directly or
    /// through inheritance.
    #[error("class '{class}' already has an attribute '{attribute}'")]
    DuplicateAttribute { class: String, attribute: String },
}

/// Constraint violations detected after assignments are applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstraintError {
    #[error("required attribute '{attribute}' of class '{class}' has no value")]
    MissingRequiredAttribute { class: String, attribute: String },

    #[error("attribute '{attribute}' of class '{class}' allows at most {max} targets, found {actual}")]
    CardinalityExceeded {
        class: String,
        attribute: String,
        max: usize,
        actual: usize,
    },

    #[error("attribute '{attribute}' of class '{class}' is distinct but references the same instance twice")]
    DistinctnessViolated { class: String, attribute: String },
}

/// Predicate evaluation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluationError {
    /// Ordering comparison on an attribute whose declared type is not integer.
    #[error("type mismatch: operator '{op}' needs an integer attribute, '{attribute}' is {actual}")]
    OrderingOnNonInteger {
        attribute: String,
        op: String,
        actual: String,
    },

    /// Ordering comparison against a literal that is not an integer.
    #[error("operator '{op}' on '{attribute}' needs an integer literal, got '{literal}'")]
    NonIntegerOperand {
        attribute: String,
        op: String,
        literal: String,
    },
}

/// Core database errors.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Attribute(#[from] AttributeError),

    #[error(transparent)]
    Constraint(#[from] ConstraintError),

    #[error(transparent)]
    Evaluation(#[from] EvaluationError),

    /// Storage layer error.
    #[error("storage error: {0}")]
    Storage(#[from] sled::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Deserialization error.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// Stored data does not match the expected layout.
    #[error("corrupted store: {0}")]
    Corrupted(String),

    /// A sourced script could not be read.
    #[error("cannot read '{path}': {source}")]
    Script {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Statement kind that is recognised but not executed.
    #[error("{0} is not supported")]
    Unsupported(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_conversion() {
        let err: Error = SchemaError::UnknownClass("person".to_string()).into();
        assert!(matches!(err, Error::Schema(SchemaError::UnknownClass(_))));
        assert_eq!(err.to_string(), "class 'person' is not defined");
    }

    #[test]
    fn test_constraint_message() {
        let err = ConstraintError::CardinalityExceeded {
            class: "employee".to_string(),
            attribute: "dept".to_string(),
            max: 1,
            actual: 2,
        };
        assert_eq!(
            err.to_string(),
            "attribute 'dept' of class 'employee' allows at most 1 targets, found 2"
        );
    }
}
