//! Constraint enforcement module.
//!
//! Instances are checked after every insert (and, by default, every modify):
//! - Required attributes (a scalar value, or at least one edge)
//! - Relationship cardinality on both the forward and inverse side
//! - Distinct targets for multi-valued relationships

mod validator;

pub use validator::ConstraintValidator;
