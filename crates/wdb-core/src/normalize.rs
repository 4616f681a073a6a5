//! Identifier case folding.
//!
//! Class and attribute names are case-insensitive. Statements are folded to
//! lower case before execution; literal values and file names are kept as
//! written.

use wdb_proto::{
    Assignment, AttributePath, AttributeSpec, ClassDef, PathTerminal, Predicate, Statement,
};

fn fold(name: &mut String) {
    if name.chars().any(|c| c.is_uppercase()) {
        *name = name.to_lowercase();
    }
}

/// Lower-case every identifier in `statement`.
pub fn normalize(mut statement: Statement) -> Statement {
    match &mut statement {
        Statement::ClassDef(def) => class_def(def),
        Statement::Insert(query) => {
            fold(&mut query.class_name);
            if let Some(from) = &mut query.from_class_name {
                fold(from);
            }
            if let Some(predicate) = &mut query.predicate {
                self::predicate(predicate);
            }
            query.assignments.iter_mut().for_each(assignment);
        }
        Statement::Modify(query) => {
            fold(&mut query.class_name);
            predicate(&mut query.predicate);
            query.assignments.iter_mut().for_each(assignment);
        }
        Statement::Retrieve(query) => {
            fold(&mut query.class_name);
            if let Some(predicate) = &mut query.predicate {
                self::predicate(predicate);
            }
            query.attribute_paths.iter_mut().for_each(path);
        }
        Statement::IndexDef(def) => {
            fold(&mut def.name);
            fold(&mut def.class_name);
            def.attributes.iter_mut().for_each(fold);
        }
        Statement::Source(_) => {}
    }
    statement
}

fn class_def(def: &mut ClassDef) {
    fold(&mut def.name);
    def.superclasses.iter_mut().for_each(fold);
    for attribute in &mut def.attributes {
        match attribute {
            AttributeSpec::Scalar(spec) => fold(&mut spec.name),
            AttributeSpec::Relationship(spec) => {
                fold(&mut spec.name);
                fold(&mut spec.target);
                fold(&mut spec.inverse);
            }
        }
    }
}

fn predicate(predicate: &mut Predicate) {
    match predicate {
        Predicate::And(children) | Predicate::Or(children) => {
            children.iter_mut().for_each(self::predicate)
        }
        Predicate::Not(inner) => self::predicate(inner),
        Predicate::Cond { attribute, .. } => fold(attribute),
        Predicate::True | Predicate::False => {}
    }
}

fn assignment(assignment: &mut Assignment) {
    match assignment {
        Assignment::Scalar { attribute, .. } => fold(attribute),
        Assignment::Relationship {
            attribute,
            target_class,
            predicate,
            ..
        } => {
            fold(attribute);
            fold(target_class);
            self::predicate(predicate);
        }
    }
}

fn path(path: &mut AttributePath) {
    path.hops.iter_mut().for_each(fold);
    if let PathTerminal::Attribute(name) = &mut path.terminal {
        fold(name);
    }
}
