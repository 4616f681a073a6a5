//! Retrieve statement execution.

use super::select::instances_of;
use crate::catalog::{Catalog, ClassDefinition};
use crate::error::Error;
use crate::graph;
use crate::storage::{Transaction, VertexId};
use wdb_proto::{
    AttributePath, PathTerminal, Predicate, RetrieveQuery, RetrieveResult, RetrievedRow,
    RetrievedValue, Value,
};

/// Executes retrieve statements. Never writes.
pub struct RetrieveProcessor<'c> {
    catalog: &'c Catalog,
}

impl<'c> RetrieveProcessor<'c> {
    pub fn new(catalog: &'c Catalog) -> Self {
        Self { catalog }
    }

    /// Select instances and project the requested paths, one row per instance.
    ///
    /// An empty path list projects every attribute (`*`).
    pub fn execute(
        &self,
        tx: &Transaction<'_>,
        query: &RetrieveQuery,
    ) -> Result<RetrieveResult, Error> {
        let class = self.catalog.require(&query.class_name)?;

        let wildcard = [AttributePath::wildcard()];
        let paths: &[AttributePath] = if query.attribute_paths.is_empty() {
            &wildcard
        } else {
            &query.attribute_paths
        };
        for path in paths {
            self.check_path(class, path)?;
        }

        let predicate = query.predicate.clone().unwrap_or(Predicate::True);
        let mut result = RetrieveResult::new(&class.name);
        for selected in instances_of(tx, self.catalog, &class.name, &predicate)? {
            let mut row = RetrievedRow::default();
            for path in paths {
                self.project(tx, selected.id, path, &mut row)?;
            }
            result.rows.push(row);
        }
        Ok(result)
    }

    /// Every hop must be a relationship of the class reached so far and the
    /// terminal a scalar attribute of the last one.
    fn check_path(&self, class: &ClassDefinition, path: &AttributePath) -> Result<(), Error> {
        let mut current = class;
        for hop in &path.hops {
            let relationship = self.catalog.relationship_attribute(current, hop)?;
            current = self.catalog.require(relationship.target)?;
        }
        if let PathTerminal::Attribute(name) = &path.terminal {
            self.catalog.scalar_attribute(current, name)?;
        }
        Ok(())
    }

    fn project(
        &self,
        tx: &Transaction<'_>,
        start: VertexId,
        path: &AttributePath,
        row: &mut RetrievedRow,
    ) -> Result<(), Error> {
        let label = path.label();
        let mut current = Some(start);
        for hop in &path.hops {
            current = match current {
                Some(id) => graph::related(tx, id, hop)?.first().copied(),
                None => None,
            };
        }

        match (&path.terminal, current) {
            (PathTerminal::Attribute(name), None) => row.values.push(RetrievedValue {
                path: label,
                attribute: name.clone(),
                value: Value::Null,
            }),
            (PathTerminal::Attribute(name), Some(id)) => {
                let value = tx.get_property(id, name)?.unwrap_or(Value::Null);
                row.values.push(RetrievedValue {
                    path: label,
                    attribute: name.clone(),
                    value,
                });
            }
            (PathTerminal::Wildcard, None) => {}
            (PathTerminal::Wildcard, Some(id)) => {
                let class_name = graph::class_of(tx, id)?;
                let class = self.catalog.require(&class_name)?;
                let record = graph::instance(tx, id)?;
                for attribute in class.attributes.iter().filter(|a| a.is_scalar()) {
                    if let Some(value) = record.get(&attribute.name) {
                        row.values.push(RetrievedValue {
                            path: label.clone(),
                            attribute: attribute.name.clone(),
                            value: value.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}
