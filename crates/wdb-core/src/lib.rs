//! WDB Core - Graph storage, class catalog, and statement execution.
//!
//! This crate provides the engine of WDB, a semantic-network database whose
//! instances and relationships live in a property-graph store and whose
//! classes live in an in-memory catalog persisted alongside them.
//!
//! # Usage
//!
//! ```rust
//! use wdb_core::{Database, DatabaseConfig, StatementOutcome};
//! use wdb_core::proto::{ClassDef, ScalarSpec, ScalarType};
//!
//! let db = Database::open(DatabaseConfig::temporary()).unwrap();
//! let def = ClassDef::new("person").with_attribute(ScalarSpec::new("name", ScalarType::String));
//! let outcome = db.execute(&def.into()).unwrap();
//! assert_eq!(outcome, StatementOutcome::ClassDefined("person".into()));
//! ```

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

pub mod catalog;
pub mod config;
pub mod constraint;
pub mod database;
pub mod error;
pub mod graph;
pub mod mutation;
pub mod normalize;
pub mod query;
pub mod session;
pub mod storage;

pub use catalog::{AttributeDefinition, AttributeKind, Catalog, ClassDefinition, ROOT_CLASS};
pub use config::{DatabaseConfig, EngineConfig};
pub use constraint::ConstraintValidator;
pub use database::{Database, StatementOutcome};
pub use error::{AttributeError, ConstraintError, Error, EvaluationError, SchemaError};
pub use session::{ScriptReader, Session, SourceFailure, SourceReport};
pub use storage::{GraphStore, StorageConfig, Transaction};

/// Re-export protocol types.
pub use wdb_proto as proto;
