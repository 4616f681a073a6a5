//! WDB statement IR and shared types.
//!
//! This crate defines the statements the parser produces and the engine
//! executes, together with runtime values and result types.
//!
//! # Modules
//!
//! - [`value`] - Scalar values and scalar types
//! - [`schema`] - Class-definition statements
//! - [`query`] - Insert/modify/retrieve statements and predicates
//! - [`result`] - Update counters and retrieve rows
//! - [`error`] - Protocol error types
//!
//! # Serialization
//!
//! Values, scalar types, and cardinalities derive `rkyv` traits so the engine
//! can store them directly. Every type derives `serde` for JSON output.

pub mod error;
pub mod query;
pub mod result;
pub mod schema;
pub mod value;

pub use error::Error;

pub use query::{
    AssignMode, Assignment, AttributePath, CompareOp, InsertQuery, ModifyQuery, PathTerminal,
    Predicate, RetrieveQuery, SourceQuery, Statement,
};
pub use result::{RetrieveResult, RetrievedRow, RetrievedValue, UpdateCounts};
pub use schema::{AttributeSpec, Cardinality, ClassDef, IndexDef, RelationshipSpec, ScalarSpec};
pub use value::{ScalarType, Value};
