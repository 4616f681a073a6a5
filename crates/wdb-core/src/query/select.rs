//! Polymorphic instance selection.

use std::collections::HashSet;

use super::filter::PredicateEvaluator;
use crate::catalog::{Catalog, ClassDefinition};
use crate::error::Error;
use crate::graph;
use crate::storage::{Transaction, VertexId};
use wdb_proto::Predicate;

/// A selected instance together with the class it belongs to.
#[derive(Debug, Clone, Copy)]
pub struct Selected<'c> {
    pub id: VertexId,
    pub class: &'c ClassDefinition,
}

/// Instances of `class` and of every class below it that match `predicate`.
///
/// Each instance is tested against its own class definition. Results come
/// class by class in depth-first order, each class's instances in creation
/// order, and an instance appears at most once.
pub fn instances_of<'c>(
    tx: &Transaction<'_>,
    catalog: &'c Catalog,
    class: &str,
    predicate: &Predicate,
) -> Result<Vec<Selected<'c>>, Error> {
    catalog.require(class)?;

    let mut seen = HashSet::new();
    let mut selected = Vec::new();
    for class in catalog.descendants(class) {
        for id in graph::direct_instances(tx, &class.name)? {
            if !seen.insert(id) {
                continue;
            }
            let record = graph::instance(tx, id)?;
            if PredicateEvaluator::evaluate(predicate, class, &record.properties)? {
                selected.push(Selected { id, class });
            }
        }
    }
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SchemaBuilder;
    use crate::error::SchemaError;
    use crate::storage::{GraphStore, StorageConfig};
    use wdb_proto::{ClassDef, ScalarSpec, ScalarType};

    fn setup() -> (GraphStore, Catalog) {
        let mut catalog = Catalog::new();
        let store = GraphStore::open(StorageConfig::temporary()).unwrap();
        let mut tx = store.begin();
        for def in [
            ClassDef::new("person").with_attribute(ScalarSpec::new("name", ScalarType::String)),
            ClassDef::new("employee")
                .with_superclass("person")
                .with_attribute(ScalarSpec::new("salary", ScalarType::Integer)),
            ClassDef::new("student").with_superclass("person"),
        ] {
            SchemaBuilder::new(&mut catalog).define(&def).unwrap();
            graph::create_anchor(&mut tx, &def.name).unwrap();
        }
        for (class, name) in [("person", "p"), ("employee", "e"), ("student", "s")] {
            let id = graph::create_instance(&mut tx, class).unwrap();
            tx.set_property(id, "name", name).unwrap();
        }
        tx.commit().unwrap();
        (store, catalog)
    }

    fn names(tx: &Transaction<'_>, selected: &[Selected<'_>]) -> Vec<String> {
        selected
            .iter()
            .map(|s| tx.get_property(s.id, "name").unwrap().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_superclass_includes_subclasses() {
        let (store, catalog) = setup();
        let tx = store.begin();
        let all = instances_of(&tx, &catalog, "person", &Predicate::True).unwrap();
        assert_eq!(names(&tx, &all), vec!["p", "e", "s"]);
        assert_eq!(all[1].class.name, "employee");
    }

    #[test]
    fn test_sibling_excluded() {
        let (store, catalog) = setup();
        let tx = store.begin();
        let students = instances_of(&tx, &catalog, "student", &Predicate::True).unwrap();
        assert_eq!(names(&tx, &students), vec!["s"]);
    }

    #[test]
    fn test_predicate_filters() {
        let (store, catalog) = setup();
        let tx = store.begin();
        let hits = instances_of(&tx, &catalog, "person", &Predicate::ne("name", "p")).unwrap();
        assert_eq!(names(&tx, &hits), vec!["e", "s"]);
    }

    #[test]
    fn test_unknown_class() {
        let (store, catalog) = setup();
        let tx = store.begin();
        assert!(matches!(
            instances_of(&tx, &catalog, "ghost", &Predicate::True),
            Err(Error::Schema(SchemaError::UnknownClass(_)))
        ));
    }
}
