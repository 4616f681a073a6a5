//! Required, cardinality and distinctness checks.

use std::collections::HashSet;

use crate::catalog::{Catalog, ClassDefinition, Relationship};
use crate::error::{ConstraintError, Error};
use crate::graph;
use crate::storage::{Transaction, VertexId};

/// Validates instances against their class after assignments are applied.
pub struct ConstraintValidator<'c> {
    catalog: &'c Catalog,
}

impl<'c> ConstraintValidator<'c> {
    pub fn new(catalog: &'c Catalog) -> Self {
        Self { catalog }
    }

    /// Check every constraint of `instance` as an instance of `class`.
    ///
    /// Relationship edges are checked on both sides: the instance's own
    /// attribute rule, then the inverse rule on each target it references.
    pub fn validate(
        &self,
        tx: &Transaction<'_>,
        instance: VertexId,
        class: &ClassDefinition,
    ) -> Result<(), Error> {
        self.check_required(tx, instance, class)?;

        for attribute in class.relationships() {
            let Some(relationship) = attribute.as_relationship() else {
                continue;
            };
            let targets = graph::related(tx, instance, relationship.name)?;
            Self::check_edges(&class.name, &relationship, &targets)?;

            let mut checked = HashSet::new();
            for target in targets {
                if checked.insert(target) {
                    self.check_inverse(tx, target, relationship.inverse)?;
                }
            }
        }
        Ok(())
    }

    /// Check an instance whose class must first be looked up in the store.
    pub fn validate_instance(&self, tx: &Transaction<'_>, instance: VertexId) -> Result<(), Error> {
        let class_name = graph::class_of(tx, instance)?;
        let class = self.catalog.require(&class_name)?;
        self.validate(tx, instance, class)
    }

    fn check_required(
        &self,
        tx: &Transaction<'_>,
        instance: VertexId,
        class: &ClassDefinition,
    ) -> Result<(), Error> {
        let record = graph::instance(tx, instance)?;
        for attribute in class.attributes.iter().filter(|a| a.required) {
            let satisfied = if attribute.is_scalar() {
                record.get(&attribute.name).is_some()
            } else {
                !graph::related(tx, instance, &attribute.name)?.is_empty()
            };
            if !satisfied {
                return Err(ConstraintError::MissingRequiredAttribute {
                    class: class.name.clone(),
                    attribute: attribute.name.clone(),
                }
                .into());
            }
        }
        Ok(())
    }

    /// Apply the rule of the inverse attribute to the target's own edges.
    fn check_inverse(&self, tx: &Transaction<'_>, target: VertexId, inverse: &str) -> Result<(), Error> {
        let class_name = graph::class_of(tx, target)?;
        let class = self.catalog.require(&class_name)?;
        let relationship = self.catalog.relationship_attribute(class, inverse)?;
        let edges = graph::related(tx, target, inverse)?;
        Self::check_edges(&class.name, &relationship, &edges)
    }

    fn check_edges(
        class: &str,
        relationship: &Relationship<'_>,
        targets: &[VertexId],
    ) -> Result<(), Error> {
        if let Some(max) = relationship.cardinality.max_edges() {
            if targets.len() > max {
                return Err(ConstraintError::CardinalityExceeded {
                    class: class.to_string(),
                    attribute: relationship.name.to_string(),
                    max,
                    actual: targets.len(),
                }
                .into());
            }
        }

        if relationship.distinct && !relationship.cardinality.is_single() {
            let mut seen = HashSet::new();
            if !targets.iter().all(|t| seen.insert(*t)) {
                return Err(ConstraintError::DistinctnessViolated {
                    class: class.to_string(),
                    attribute: relationship.name.to_string(),
                }
                .into());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SchemaBuilder;
    use crate::storage::{GraphStore, StorageConfig};
    use wdb_proto::{Cardinality, ClassDef, RelationshipSpec, ScalarSpec, ScalarType};

    fn setup() -> (GraphStore, Catalog) {
        let mut catalog = Catalog::new();
        let store = GraphStore::open(StorageConfig::temporary()).unwrap();
        let mut tx = store.begin();
        for def in [
            ClassDef::new("dept").with_attribute(ScalarSpec::new("name", ScalarType::String)),
            ClassDef::new("worker")
                .with_attribute(ScalarSpec::new("name", ScalarType::String).required())
                .with_attribute(RelationshipSpec::new("dept", "dept", "staff"))
                .with_attribute(
                    RelationshipSpec::new("teams", "dept", "members")
                        .with_cardinality(Cardinality::many())
                        .distinct()
                        .with_inverse_cardinality(Cardinality::at_most(1)),
                ),
        ] {
            SchemaBuilder::new(&mut catalog).define(&def).unwrap();
            graph::create_anchor(&mut tx, &def.name).unwrap();
        }
        tx.commit().unwrap();
        (store, catalog)
    }

    fn worker(tx: &mut Transaction<'_>) -> VertexId {
        let w = graph::create_instance(tx, "worker").unwrap();
        tx.set_property(w, "name", "Bob").unwrap();
        w
    }

    #[test]
    fn test_missing_required_scalar() {
        let (store, catalog) = setup();
        let mut tx = store.begin();
        let w = graph::create_instance(&mut tx, "worker").unwrap();
        let validator = ConstraintValidator::new(&catalog);
        assert!(matches!(
            validator.validate_instance(&tx, w),
            Err(Error::Constraint(ConstraintError::MissingRequiredAttribute { .. }))
        ));
        tx.set_property(w, "name", "Bob").unwrap();
        validator.validate_instance(&tx, w).unwrap();
    }

    #[test]
    fn test_single_valued_cardinality() {
        let (store, catalog) = setup();
        let mut tx = store.begin();
        let w = worker(&mut tx);
        let a = graph::create_instance(&mut tx, "dept").unwrap();
        let b = graph::create_instance(&mut tx, "dept").unwrap();
        graph::connect(&mut tx, w, "dept", a, "staff").unwrap();
        let validator = ConstraintValidator::new(&catalog);
        validator.validate_instance(&tx, w).unwrap();

        graph::connect(&mut tx, w, "dept", b, "staff").unwrap();
        assert!(matches!(
            validator.validate_instance(&tx, w),
            Err(Error::Constraint(ConstraintError::CardinalityExceeded { max: 1, actual: 2, .. }))
        ));
    }

    #[test]
    fn test_distinct_targets() {
        let (store, catalog) = setup();
        let mut tx = store.begin();
        let w = worker(&mut tx);
        let d = graph::create_instance(&mut tx, "dept").unwrap();
        graph::connect(&mut tx, w, "teams", d, "members").unwrap();
        graph::connect(&mut tx, w, "teams", d, "members").unwrap();
        assert!(matches!(
            ConstraintValidator::new(&catalog).validate_instance(&tx, w),
            Err(Error::Constraint(ConstraintError::DistinctnessViolated { .. }))
        ));
    }

    #[test]
    fn test_inverse_side_checked() {
        let (store, catalog) = setup();
        let mut tx = store.begin();
        let first = worker(&mut tx);
        let second = worker(&mut tx);
        let d = graph::create_instance(&mut tx, "dept").unwrap();
        graph::connect(&mut tx, first, "teams", d, "members").unwrap();
        graph::connect(&mut tx, second, "teams", d, "members").unwrap();

        // `members` allows one worker per dept.
        let err = ConstraintValidator::new(&catalog)
            .validate_instance(&tx, second)
            .unwrap_err();
        match err {
            Error::Constraint(ConstraintError::CardinalityExceeded { class, attribute, .. }) => {
                assert_eq!(class, "dept");
                assert_eq!(attribute, "members");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
