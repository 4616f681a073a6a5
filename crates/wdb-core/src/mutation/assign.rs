//! Applying assignments to an instance.

use crate::catalog::{Catalog, ClassDefinition};
use crate::error::{AttributeError, Error};
use crate::graph;
use crate::query::instances_of;
use crate::storage::{Transaction, VertexId};
use wdb_proto::{AssignMode, Assignment, Predicate, UpdateCounts, Value};

/// Applies assignments and tallies the edge counters.
pub struct Assigner<'c> {
    catalog: &'c Catalog,
    counts: UpdateCounts,
    /// Instances that lost an edge to an assigned instance.
    detached: Vec<VertexId>,
}

impl<'c> Assigner<'c> {
    pub fn new(catalog: &'c Catalog) -> Self {
        Self {
            catalog,
            counts: UpdateCounts::default(),
            detached: Vec::new(),
        }
    }

    /// Apply one assignment to `instance`, resolving attributes on `class`.
    pub fn apply(
        &mut self,
        tx: &mut Transaction<'_>,
        instance: VertexId,
        class: &ClassDefinition,
        assignment: &Assignment,
    ) -> Result<(), Error> {
        match assignment {
            Assignment::Scalar { attribute, value } => {
                self.assign_scalar(tx, instance, class, attribute, value)
            }
            Assignment::Relationship {
                attribute,
                mode,
                target_class,
                predicate,
            } => self.assign_relationship(
                tx,
                instance,
                class,
                attribute,
                *mode,
                target_class,
                predicate,
            ),
        }
    }

    /// Store declared defaults for scalar attributes that have no value.
    pub fn apply_defaults(
        &mut self,
        tx: &mut Transaction<'_>,
        instance: VertexId,
        class: &ClassDefinition,
    ) -> Result<(), Error> {
        for attribute in &class.attributes {
            if let Some(default) = attribute.default_value() {
                if tx.get_property(instance, &attribute.name)?.is_none() {
                    tx.set_property(instance, &attribute.name, default.clone())?;
                }
            }
        }
        Ok(())
    }

    fn assign_scalar(
        &mut self,
        tx: &mut Transaction<'_>,
        instance: VertexId,
        class: &ClassDefinition,
        attribute: &str,
        value: &Value,
    ) -> Result<(), Error> {
        let definition = self.catalog.scalar_attribute(class, attribute)?;
        let Some(ty) = definition.scalar_type() else {
            return Err(AttributeError::UnknownScalarAttribute {
                class: class.name.clone(),
                attribute: attribute.to_string(),
            }
            .into());
        };
        if !value.conforms_to(ty) {
            return Err(AttributeError::TypeMismatch {
                attribute: attribute.to_string(),
                expected: ty.to_string(),
                actual: value
                    .scalar_type()
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| "null".to_string()),
            }
            .into());
        }
        tx.set_property(instance, attribute, value.clone())
    }

    #[allow(clippy::too_many_arguments)]
    fn assign_relationship(
        &mut self,
        tx: &mut Transaction<'_>,
        instance: VertexId,
        class: &ClassDefinition,
        attribute: &str,
        mode: AssignMode,
        target_class: &str,
        predicate: &Predicate,
    ) -> Result<(), Error> {
        let relationship = self.catalog.relationship_attribute(class, attribute)?;
        self.catalog.require(target_class)?;
        if !self
            .catalog
            .is_same_or_subclass(target_class, relationship.target)
        {
            return Err(AttributeError::TargetClassMismatch {
                attribute: attribute.to_string(),
                expected: relationship.target.to_string(),
                actual: target_class.to_string(),
            }
            .into());
        }

        let targets: Vec<VertexId> = instances_of(tx, self.catalog, target_class, predicate)?
            .into_iter()
            .map(|s| s.id)
            .collect();
        let inverse = relationship.inverse;

        for target in targets {
            match mode {
                AssignMode::Replace => {
                    self.counts.edges_replaced +=
                        graph::disconnect(tx, instance, attribute, target, inverse)?;
                    graph::connect(tx, instance, attribute, target, inverse)?;
                    self.counts.edges_inserted += 1;
                }
                AssignMode::Insert => {
                    graph::connect(tx, instance, attribute, target, inverse)?;
                    self.counts.edges_inserted += 1;
                }
                AssignMode::Exclude => {
                    let removed = graph::disconnect(tx, instance, attribute, target, inverse)?;
                    if removed > 0 {
                        self.counts.edges_removed += removed;
                        self.detached.push(target);
                    }
                }
            }
        }
        Ok(())
    }

    /// Instances that lost an edge, to be re-validated.
    pub fn detached(&self) -> &[VertexId] {
        &self.detached
    }

    pub fn counts(&self) -> UpdateCounts {
        self.counts
    }
}
