//! Class catalog for WDB.
//!
//! The catalog holds class definitions, their attributes (own and
//! inherited), inheritance links, and relationship/inverse pairings. It is
//! persisted as one metadata record in the graph store.

mod builder;
#[allow(clippy::module_inception)]
mod catalog;
mod class;
mod hierarchy;

pub use builder::SchemaBuilder;
pub use catalog::{Catalog, CATALOG_KEY, ROOT_CLASS};
pub use class::{AttributeDefinition, AttributeKind, ClassDefinition, Relationship};
