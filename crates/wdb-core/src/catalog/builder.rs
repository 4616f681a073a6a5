//! Processing class-definition statements.

use super::catalog::{Catalog, ROOT_CLASS};
use super::class::{AttributeDefinition, AttributeKind, ClassDefinition};
use crate::error::{AttributeError, Error, SchemaError};
use tracing::debug;
use wdb_proto::{AttributeSpec, Cardinality, ClassDef, RelationshipSpec, ScalarSpec};

/// Applies class definitions to a catalog.
///
/// The builder mutates the catalog it is given in place. Callers pass a
/// working copy and keep it only if [`SchemaBuilder::define`] succeeds, which
/// makes a failed definition leave no partial changes behind.
pub struct SchemaBuilder<'c> {
    catalog: &'c mut Catalog,
}

impl<'c> SchemaBuilder<'c> {
    pub fn new(catalog: &'c mut Catalog) -> Self {
        Self { catalog }
    }

    /// Define a new class. Names in `def` are expected to be lower-cased.
    pub fn define(&mut self, def: &ClassDef) -> Result<(), Error> {
        let name = def.name.as_str();
        if self.catalog.contains(name) {
            return Err(SchemaError::DuplicateClass(name.to_string()).into());
        }

        let superclasses = self.resolve_superclasses(def)?;

        let mut class = ClassDefinition::new(name);
        class.comment = def.comment.clone();
        self.inherit(&mut class, &superclasses)?;

        let mut inverses = Vec::new();
        for spec in &def.attributes {
            let attribute = match spec {
                AttributeSpec::Scalar(scalar) => Self::scalar(name, scalar)?,
                AttributeSpec::Relationship(rel) => {
                    let attribute = self.relationship(name, rel)?;
                    inverses.push(Self::inverse_of(name, rel));
                    attribute
                }
            };
            if class.has_attribute(&attribute.name) {
                return Err(AttributeError::DuplicateAttribute {
                    class: name.to_string(),
                    attribute: attribute.name,
                }
                .into());
            }
            class.attributes.push(attribute);
        }

        let parents = if superclasses.is_empty() {
            vec![ROOT_CLASS.to_string()]
        } else {
            superclasses
        };
        for parent in &parents {
            if let Some(parent) = self.catalog.get_mut(parent) {
                parent.subclasses.push(name.to_string());
            }
        }
        class.superclasses = parents;
        self.catalog.insert(class);

        for (target, inverse) in inverses {
            self.add_inverse(&target, inverse)?;
        }

        debug!(class = %name, "class defined");
        Ok(())
    }

    fn resolve_superclasses(&self, def: &ClassDef) -> Result<Vec<String>, Error> {
        let mut resolved: Vec<String> = Vec::new();
        for superclass in &def.superclasses {
            if superclass == &def.name {
                return Err(SchemaError::SelfSubclass(def.name.clone()).into());
            }
            if !self.catalog.contains(superclass) || superclass == ROOT_CLASS {
                return Err(SchemaError::UnknownSuperclass {
                    class: def.name.clone(),
                    superclass: superclass.clone(),
                }
                .into());
            }
            if !resolved.contains(superclass) {
                resolved.push(superclass.clone());
            }
        }
        Ok(resolved)
    }

    /// Copy every attribute of the superclasses onto `class`.
    fn inherit(&self, class: &mut ClassDefinition, superclasses: &[String]) -> Result<(), Error> {
        for superclass in superclasses {
            let Some(parent) = self.catalog.get(superclass) else {
                continue;
            };
            for attribute in &parent.attributes {
                match class.attribute(&attribute.name) {
                    // Reached through two superclasses with the same shape.
                    Some(existing) if existing.same_shape(attribute) => {}
                    Some(_) => {
                        return Err(AttributeError::DuplicateAttribute {
                            class: class.name.clone(),
                            attribute: attribute.name.clone(),
                        }
                        .into())
                    }
                    None => class.attributes.push(attribute.clone()),
                }
            }
        }
        Ok(())
    }

    fn scalar(class: &str, spec: &ScalarSpec) -> Result<AttributeDefinition, Error> {
        if let Some(default) = &spec.default {
            if !default.conforms_to(spec.ty) {
                return Err(AttributeError::TypeMismatch {
                    attribute: spec.name.clone(),
                    expected: spec.ty.to_string(),
                    actual: value_type_name(default),
                }
                .into());
            }
        }

        let mut attribute =
            AttributeDefinition::scalar(&spec.name, class, spec.ty, spec.default.clone());
        attribute.required = spec.required;
        attribute.comment = spec.comment.clone();
        Ok(attribute)
    }

    fn relationship(&self, class: &str, spec: &RelationshipSpec) -> Result<AttributeDefinition, Error> {
        if spec.target != class && (!self.catalog.contains(&spec.target) || spec.target == ROOT_CLASS)
        {
            return Err(SchemaError::UnknownTargetClass {
                attribute: spec.name.clone(),
                target: spec.target.clone(),
            }
            .into());
        }

        let mut attribute = AttributeDefinition::relationship(
            &spec.name,
            class,
            &spec.target,
            spec.cardinality,
            &spec.inverse,
        );
        if let AttributeKind::Relationship { distinct, .. } = &mut attribute.kind {
            *distinct = spec.distinct;
        }
        attribute.required = spec.required;
        attribute.comment = spec.comment.clone();
        Ok(attribute)
    }

    /// The inverse attribute created on the target class, keyed by target.
    fn inverse_of(class: &str, spec: &RelationshipSpec) -> (String, AttributeDefinition) {
        let mut inverse = AttributeDefinition::relationship(
            &spec.inverse,
            &spec.target,
            class,
            spec.inverse_cardinality.unwrap_or_else(Cardinality::many),
            &spec.name,
        );
        if let AttributeKind::Relationship { distinct, .. } = &mut inverse.kind {
            *distinct = spec.inverse_distinct;
        }
        (spec.target.clone(), inverse)
    }

    /// Add `inverse` to `target` and every class below it.
    fn add_inverse(&mut self, target: &str, inverse: AttributeDefinition) -> Result<(), Error> {
        let classes: Vec<String> = self
            .catalog
            .descendants(target)
            .iter()
            .map(|c| c.name.clone())
            .collect();

        for name in classes {
            let Some(class) = self.catalog.get_mut(&name) else {
                continue;
            };
            if class.has_attribute(&inverse.name) {
                return Err(AttributeError::DuplicateAttribute {
                    class: name,
                    attribute: inverse.name,
                }
                .into());
            }
            class.attributes.push(inverse.clone());
        }
        Ok(())
    }
}

fn value_type_name(value: &wdb_proto::Value) -> String {
    value
        .scalar_type()
        .map(|t| t.to_string())
        .unwrap_or_else(|| "null".to_string())
}
