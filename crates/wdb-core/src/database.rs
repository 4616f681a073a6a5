//! Database handle combining the graph store and the class catalog.

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};

use crate::catalog::{Catalog, ClassDefinition, SchemaBuilder, CATALOG_KEY, ROOT_CLASS};
use crate::config::{DatabaseConfig, EngineConfig};
use crate::error::Error;
use crate::graph;
use crate::mutation::{InsertProcessor, ModifyProcessor};
use crate::normalize::normalize;
use crate::query::RetrieveProcessor;
use crate::session::SourceReport;
use crate::storage::{GraphStore, Transaction};
use wdb_proto::{ClassDef, RetrieveQuery, RetrieveResult, Statement, UpdateCounts};

/// Result of executing one statement.
#[derive(Debug, Clone, PartialEq)]
pub enum StatementOutcome {
    /// A class was added to the catalog.
    ClassDefined(String),
    /// Counters of an insert or modify.
    Updated(UpdateCounts),
    Retrieved(RetrieveResult),
    Sourced(SourceReport),
}

/// An open WDB database.
///
/// Statements run one at a time. Each runs in a single store transaction
/// against a working copy of the catalog; both are committed together or
/// both discarded.
pub struct Database {
    store: GraphStore,
    catalog: RwLock<Catalog>,
    /// Serializes writing statements.
    writer: Mutex<()>,
    engine: EngineConfig,
}

impl Database {
    /// Open or create a database.
    pub fn open(config: DatabaseConfig) -> Result<Self, Error> {
        let store = GraphStore::open(config.storage)?;

        let catalog = match store.get_meta(CATALOG_KEY)? {
            Some(bytes) => Catalog::from_bytes(&bytes)?,
            None => Catalog::new(),
        };

        let mut tx = store.begin();
        if graph::find_anchor(&tx, ROOT_CLASS)?.is_none() {
            graph::create_anchor(&mut tx, ROOT_CLASS)?;
            tx.put_meta(CATALOG_KEY, catalog.to_bytes()?);
        }
        tx.commit()?;

        info!(
            classes = catalog.classes().count(),
            recovered = store.was_recovered(),
            "database opened"
        );

        Ok(Self {
            store,
            catalog: RwLock::new(catalog),
            writer: Mutex::new(()),
            engine: config.engine,
        })
    }

    /// Execute one statement.
    ///
    /// `source` statements need a [`Session`](crate::Session) and fail here.
    pub fn execute(&self, statement: &Statement) -> Result<StatementOutcome, Error> {
        let statement = normalize(statement.clone());
        debug!(kind = statement.kind(), "executing statement");

        let outcome = match &statement {
            Statement::ClassDef(def) => self.define_class(def),
            Statement::Insert(query) => self
                .update(|catalog, tx| InsertProcessor::new(catalog).execute(tx, query))
                .map(StatementOutcome::Updated),
            Statement::Modify(query) => self
                .update(|catalog, tx| {
                    ModifyProcessor::new(catalog, self.engine.validate_modify).execute(tx, query)
                })
                .map(StatementOutcome::Updated),
            Statement::Retrieve(query) => self.retrieve(query).map(StatementOutcome::Retrieved),
            Statement::Source(source) => Err(Error::Unsupported(format!(
                "source \"{}\" outside a session",
                source.filename
            ))),
            Statement::IndexDef(def) => {
                Err(Error::Unsupported(format!("index definition '{}'", def.name)))
            }
        };

        if let Err(e) = &outcome {
            debug!(kind = statement.kind(), error = %e, "statement failed");
        }
        outcome
    }

    fn define_class(&self, def: &ClassDef) -> Result<StatementOutcome, Error> {
        let _writer = self.writer.lock();
        let mut working = self.catalog.read().clone();
        SchemaBuilder::new(&mut working).define(def)?;

        let mut tx = self.store.begin();
        graph::create_anchor(&mut tx, &def.name)?;
        tx.put_meta(CATALOG_KEY, working.to_bytes()?);
        tx.commit()?;

        *self.catalog.write() = working;
        info!(class = %def.name, "class defined");
        Ok(StatementOutcome::ClassDefined(def.name.clone()))
    }

    /// Run a writing statement in one transaction.
    fn update<F>(&self, apply: F) -> Result<UpdateCounts, Error>
    where
        F: FnOnce(&Catalog, &mut Transaction<'_>) -> Result<UpdateCounts, Error>,
    {
        let _writer = self.writer.lock();
        let catalog = self.catalog.read();
        let mut tx = self.store.begin();
        match apply(&*catalog, &mut tx) {
            Ok(counts) => {
                tx.commit()?;
                Ok(counts)
            }
            Err(e) => {
                tx.rollback();
                Err(e)
            }
        }
    }

    fn retrieve(&self, query: &RetrieveQuery) -> Result<RetrieveResult, Error> {
        let catalog = self.catalog.read();
        let tx = self.store.begin();
        let result = RetrieveProcessor::new(&catalog).execute(&tx, query);
        tx.rollback();
        result
    }

    /// Committed user classes in definition order.
    pub fn classes(&self) -> Vec<ClassDefinition> {
        self.catalog.read().classes().cloned().collect()
    }

    /// A committed class by name (case-insensitive).
    pub fn class(&self, name: &str) -> Option<ClassDefinition> {
        self.catalog.read().get(&name.to_lowercase()).cloned()
    }

    /// Flush pending writes to disk.
    pub fn flush(&self) -> Result<(), Error> {
        self.store.flush()
    }

    /// Size of the store on disk in bytes.
    pub fn size_on_disk(&self) -> Result<u64, Error> {
        self.store.size_on_disk()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wdb_proto::{Assignment, AttributePath, InsertQuery, ScalarSpec, ScalarType, Value};

    fn person() -> ClassDef {
        ClassDef::new("Person")
            .with_attribute(ScalarSpec::new("name", ScalarType::String).required())
            .with_attribute(ScalarSpec::new("age", ScalarType::Integer))
    }

    #[test]
    fn test_define_and_describe() {
        let db = Database::open(DatabaseConfig::temporary()).unwrap();
        let outcome = db.execute(&person().into()).unwrap();
        assert_eq!(outcome, StatementOutcome::ClassDefined("person".into()));

        let class = db.class("PERSON").unwrap();
        assert_eq!(class.attributes.len(), 2);
        assert_eq!(db.classes().len(), 1);
    }

    #[test]
    fn test_insert_and_retrieve() {
        let db = Database::open(DatabaseConfig::temporary()).unwrap();
        db.execute(&person().into()).unwrap();

        let insert = InsertQuery::new("person")
            .with_assignment(Assignment::scalar("name", "Alice"))
            .with_assignment(Assignment::scalar("age", 30));
        let outcome = db.execute(&insert.into()).unwrap();
        let StatementOutcome::Updated(counts) = outcome else {
            panic!("expected counters");
        };
        assert_eq!(counts.vertices_inserted, 1);

        let query = RetrieveQuery::new("person").with_path(AttributePath::attribute("name"));
        let outcome = db.execute(&query.into()).unwrap();
        let StatementOutcome::Retrieved(result) = outcome else {
            panic!("expected rows");
        };
        assert_eq!(result.len(), 1);
        assert_eq!(result.rows[0].get("name"), Some(&Value::from("Alice")));
    }

    #[test]
    fn test_failed_class_leaves_catalog() {
        let db = Database::open(DatabaseConfig::temporary()).unwrap();
        db.execute(&person().into()).unwrap();
        let err = db.execute(&person().into()).unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
        assert_eq!(db.classes().len(), 1);
    }

    #[test]
    fn test_source_needs_session() {
        let db = Database::open(DatabaseConfig::temporary()).unwrap();
        let stmt = Statement::Source(wdb_proto::SourceQuery {
            filename: "x.wdb".into(),
        });
        assert!(matches!(db.execute(&stmt), Err(Error::Unsupported(_))));
    }
}
