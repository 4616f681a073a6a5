//! Modify statement execution.

use super::assign::Assigner;
use crate::catalog::Catalog;
use crate::constraint::ConstraintValidator;
use crate::error::Error;
use crate::query::instances_of;
use crate::storage::Transaction;
use tracing::debug;
use wdb_proto::{ModifyQuery, UpdateCounts};

/// Applies assignments to existing instances.
pub struct ModifyProcessor<'c> {
    catalog: &'c Catalog,
    validate: bool,
}

impl<'c> ModifyProcessor<'c> {
    /// With `validate` off, modified instances are not re-checked.
    pub fn new(catalog: &'c Catalog, validate: bool) -> Self {
        Self { catalog, validate }
    }

    pub fn execute(
        &self,
        tx: &mut Transaction<'_>,
        query: &ModifyQuery,
    ) -> Result<UpdateCounts, Error> {
        let class = self.catalog.require(&query.class_name)?;
        let selected = instances_of(tx, self.catalog, &class.name, &query.predicate)?;
        debug!(class = %class.name, count = selected.len(), "modify selected instances");

        let mut assigner = Assigner::new(self.catalog);
        for instance in &selected {
            for assignment in &query.assignments {
                assigner.apply(tx, instance.id, class, assignment)?;
            }
        }

        if self.validate {
            let validator = ConstraintValidator::new(self.catalog);
            for instance in &selected {
                validator.validate(tx, instance.id, instance.class)?;
            }
            for &instance in assigner.detached() {
                validator.validate_instance(tx, instance)?;
            }
        }

        Ok(assigner.counts())
    }
}
