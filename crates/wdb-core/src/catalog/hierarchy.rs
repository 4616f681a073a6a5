//! Walking the class hierarchy.

use std::collections::HashSet;

use super::catalog::Catalog;
use super::class::{AttributeDefinition, ClassDefinition, Relationship};
use crate::error::AttributeError;

impl Catalog {
    /// Whether `class` is a strict descendant of `ancestor`.
    pub fn is_subclass(&self, class: &str, ancestor: &str) -> bool {
        let mut visited = HashSet::new();
        let mut stack: Vec<&str> = match self.get(class) {
            Some(c) => c.superclasses.iter().map(String::as_str).collect(),
            None => return false,
        };
        while let Some(current) = stack.pop() {
            if current == ancestor {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            if let Some(c) = self.get(current) {
                stack.extend(c.superclasses.iter().map(String::as_str));
            }
        }
        false
    }

    /// Whether `class` is `ancestor` or one of its descendants.
    pub fn is_same_or_subclass(&self, class: &str, ancestor: &str) -> bool {
        class == ancestor || self.is_subclass(class, ancestor)
    }

    /// `name` followed by all of its descendants in depth-first preorder.
    ///
    /// A class reachable through several superclasses appears once, at its
    /// first visit.
    pub fn descendants(&self, name: &str) -> Vec<&ClassDefinition> {
        let mut out = Vec::new();
        let mut visited = HashSet::new();
        let mut stack = vec![name];
        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            if let Some(class) = self.get(current) {
                out.push(class);
                stack.extend(class.subclasses.iter().rev().map(String::as_str));
            }
        }
        out
    }

    /// A scalar attribute of `class`, or `UnknownScalarAttribute`.
    pub fn scalar_attribute<'c>(
        &self,
        class: &'c ClassDefinition,
        attribute: &str,
    ) -> Result<&'c AttributeDefinition, AttributeError> {
        class
            .attribute(attribute)
            .filter(|a| a.is_scalar())
            .ok_or_else(|| AttributeError::UnknownScalarAttribute {
                class: class.name.clone(),
                attribute: attribute.to_string(),
            })
    }

    /// A relationship attribute of `class`, or `UnknownRelationshipAttribute`.
    pub fn relationship_attribute<'c>(
        &self,
        class: &'c ClassDefinition,
        attribute: &str,
    ) -> Result<Relationship<'c>, AttributeError> {
        class
            .attribute(attribute)
            .and_then(|a| a.as_relationship())
            .ok_or_else(|| AttributeError::UnknownRelationshipAttribute {
                class: class.name.clone(),
                attribute: attribute.to_string(),
            })
    }
}
