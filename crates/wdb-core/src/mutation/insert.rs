//! Insert statement execution.

use super::assign::Assigner;
use crate::catalog::Catalog;
use crate::constraint::ConstraintValidator;
use crate::error::{Error, SchemaError};
use crate::graph;
use crate::query::instances_of;
use crate::storage::{Transaction, VertexId};
use tracing::debug;
use wdb_proto::{InsertQuery, Predicate, UpdateCounts};

/// Creates instances, or moves existing ones into a subclass.
pub struct InsertProcessor<'c> {
    catalog: &'c Catalog,
}

impl<'c> InsertProcessor<'c> {
    pub fn new(catalog: &'c Catalog) -> Self {
        Self { catalog }
    }

    /// Run an insert inside `tx`. On error the caller must drop `tx`.
    pub fn execute(
        &self,
        tx: &mut Transaction<'_>,
        query: &InsertQuery,
    ) -> Result<UpdateCounts, Error> {
        let class = self.catalog.require(&query.class_name)?;
        let mut vertices_inserted = 0;

        let instances: Vec<VertexId> = match &query.from_class_name {
            None => {
                vertices_inserted += 1;
                vec![graph::create_instance(tx, &class.name)?]
            }
            Some(source) => {
                self.catalog.require(source)?;
                if !self.catalog.is_subclass(&class.name, source) {
                    return Err(SchemaError::NotASubclass {
                        class: class.name.clone(),
                        superclass: source.clone(),
                    }
                    .into());
                }
                let predicate = query.predicate.clone().unwrap_or(Predicate::True);
                let selected: Vec<VertexId> = instances_of(tx, self.catalog, source, &predicate)?
                    .into_iter()
                    .map(|s| s.id)
                    .collect();
                for id in &selected {
                    graph::reparent(tx, *id, &class.name)?;
                }
                debug!(from = %source, to = %class.name, count = selected.len(), "instances re-parented");
                selected
            }
        };

        let mut assigner = Assigner::new(self.catalog);
        for &instance in &instances {
            assigner.apply_defaults(tx, instance, class)?;
            for assignment in &query.assignments {
                assigner.apply(tx, instance, class, assignment)?;
            }
        }

        let validator = ConstraintValidator::new(self.catalog);
        for &instance in &instances {
            validator.validate(tx, instance, class)?;
        }
        for &instance in assigner.detached() {
            validator.validate_instance(tx, instance)?;
        }

        let mut counts = assigner.counts();
        counts.vertices_inserted = vertices_inserted;
        Ok(counts)
    }
}
