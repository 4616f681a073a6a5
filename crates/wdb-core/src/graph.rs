//! Instances, class membership and relationship edges in the graph store.
//!
//! Every class has an anchor vertex labelled `@class`. An instance is a vertex
//! labelled `instance` joined to its class anchor by an `@instance` edge
//! (anchor to instance) and a `@member` edge (instance to anchor). A
//! relationship edge is labelled with the attribute name and always has a
//! mirror labelled with the inverse attribute name.

use crate::error::Error;
use crate::storage::{
    EdgeId, Property, Transaction, VertexId, VertexRecord, CLASS_LABEL, CLASS_NAME_PROPERTY,
};
use wdb_proto::Value;

/// Vertex label of instances.
pub const INSTANCE_LABEL: &str = "instance";

/// Edge label from a class anchor to each of its instances.
pub const INSTANCE_EDGE: &str = "@instance";

/// Edge label from an instance to its class anchor.
pub const MEMBER_EDGE: &str = "@member";

/// Property of a `@member` edge holding the id of its paired `@instance` edge.
const ENTRY_PROPERTY: &str = "entry";

/// Anchor vertex of `class`, if one exists.
pub fn find_anchor(tx: &Transaction<'_>, class: &str) -> Result<Option<VertexId>, Error> {
    let hits = tx.lookup_by_index(CLASS_LABEL, CLASS_NAME_PROPERTY, &Value::from(class))?;
    Ok(hits.first().copied())
}

/// Anchor vertex of `class`. A class in the catalog without an anchor means
/// the store and catalog disagree.
pub fn anchor_of(tx: &Transaction<'_>, class: &str) -> Result<VertexId, Error> {
    find_anchor(tx, class)?
        .ok_or_else(|| Error::Corrupted(format!("class '{}' has no anchor vertex", class)))
}

/// Create the anchor vertex of a new class.
pub fn create_anchor(tx: &mut Transaction<'_>, class: &str) -> Result<VertexId, Error> {
    tx.new_vertex(
        CLASS_LABEL,
        vec![Property::new(CLASS_NAME_PROPERTY, class)],
    )
}

/// Create an instance of `class` with no attribute values.
pub fn create_instance(tx: &mut Transaction<'_>, class: &str) -> Result<VertexId, Error> {
    let anchor = anchor_of(tx, class)?;
    let instance = tx.new_vertex(INSTANCE_LABEL, Vec::new())?;
    attach(tx, anchor, instance)?;
    Ok(instance)
}

fn attach(tx: &mut Transaction<'_>, anchor: VertexId, instance: VertexId) -> Result<(), Error> {
    let entry = tx.new_edge(anchor, INSTANCE_EDGE, instance, Vec::new())?;
    tx.new_edge(
        instance,
        MEMBER_EDGE,
        anchor,
        vec![Property::new(ENTRY_PROPERTY, entry.0 as i64)],
    )?;
    Ok(())
}

/// Name of the class an instance currently belongs to.
pub fn class_of(tx: &Transaction<'_>, instance: VertexId) -> Result<String, Error> {
    let membership = tx.outgoing_edges(instance, Some(MEMBER_EDGE))?;
    let anchor = membership
        .first()
        .map(|e| e.target)
        .ok_or_else(|| Error::Corrupted(format!("instance {} has no class", instance)))?;
    match tx.get_property(anchor, CLASS_NAME_PROPERTY)? {
        Some(Value::String(name)) => Ok(name),
        _ => Err(Error::Corrupted(format!("anchor {} has no name", anchor))),
    }
}

/// Instances whose class is exactly `class`, in creation order.
pub fn direct_instances(tx: &Transaction<'_>, class: &str) -> Result<Vec<VertexId>, Error> {
    let anchor = anchor_of(tx, class)?;
    Ok(tx
        .outgoing_edges(anchor, Some(INSTANCE_EDGE))?
        .into_iter()
        .map(|e| e.target)
        .collect())
}

/// Move an instance to another class.
pub fn reparent(tx: &mut Transaction<'_>, instance: VertexId, class: &str) -> Result<(), Error> {
    for member in tx.outgoing_edges(instance, Some(MEMBER_EDGE))? {
        let entry = member
            .properties
            .iter()
            .find(|p| p.name == ENTRY_PROPERTY)
            .map(|p| &p.value);
        match entry {
            Some(Value::Int(id)) => tx.remove_edge(EdgeId(*id as u64))?,
            _ => {
                return Err(Error::Corrupted(format!(
                    "membership edge {} has no entry",
                    member.id
                )))
            }
        }
        tx.remove_edge(member.id)?;
    }

    let anchor = anchor_of(tx, class)?;
    attach(tx, anchor, instance)
}

/// Current record of an instance.
pub fn instance(tx: &Transaction<'_>, id: VertexId) -> Result<VertexRecord, Error> {
    tx.get_vertex(id)?
        .ok_or_else(|| Error::Corrupted(format!("instance {} not found", id)))
}

/// Targets of `attribute` edges leaving `instance`, in edge order.
pub fn related(
    tx: &Transaction<'_>,
    instance: VertexId,
    attribute: &str,
) -> Result<Vec<VertexId>, Error> {
    Ok(tx
        .outgoing_edges(instance, Some(attribute))?
        .into_iter()
        .map(|e| e.target)
        .collect())
}

/// Add `from -attribute-> to` and its mirror `to -inverse-> from`.
pub fn connect(
    tx: &mut Transaction<'_>,
    from: VertexId,
    attribute: &str,
    to: VertexId,
    inverse: &str,
) -> Result<(), Error> {
    tx.new_edge(from, attribute, to, Vec::new())?;
    tx.new_edge(to, inverse, from, Vec::new())?;
    Ok(())
}

/// Remove every `from -attribute-> to` edge and every mirror
/// `to -inverse-> from`. Returns the number of forward edges removed.
pub fn disconnect(
    tx: &mut Transaction<'_>,
    from: VertexId,
    attribute: &str,
    to: VertexId,
    inverse: &str,
) -> Result<u64, Error> {
    let mut removed = 0;
    for edge in tx.outgoing_edges(from, Some(attribute))? {
        if edge.target == to {
            tx.remove_edge(edge.id)?;
            removed += 1;
        }
    }
    for edge in tx.outgoing_edges(to, Some(inverse))? {
        if edge.target == from {
            tx.remove_edge(edge.id)?;
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{GraphStore, StorageConfig};

    fn store_with_classes(classes: &[&str]) -> GraphStore {
        let store = GraphStore::open(StorageConfig::temporary()).unwrap();
        let mut tx = store.begin();
        for class in classes {
            create_anchor(&mut tx, class).unwrap();
        }
        tx.commit().unwrap();
        store
    }

    #[test]
    fn test_create_instance_and_class_of() {
        let store = store_with_classes(&["person"]);
        let mut tx = store.begin();
        let alice = create_instance(&mut tx, "person").unwrap();
        assert_eq!(class_of(&tx, alice).unwrap(), "person");
        assert_eq!(direct_instances(&tx, "person").unwrap(), vec![alice]);
    }

    #[test]
    fn test_missing_anchor_is_corruption() {
        let store = store_with_classes(&[]);
        let mut tx = store.begin();
        assert!(matches!(
            create_instance(&mut tx, "ghost"),
            Err(Error::Corrupted(_))
        ));
    }

    #[test]
    fn test_reparent() {
        let store = store_with_classes(&["person", "employee"]);
        let mut tx = store.begin();
        let bob = create_instance(&mut tx, "person").unwrap();
        tx.commit().unwrap();

        let mut tx = store.begin();
        reparent(&mut tx, bob, "employee").unwrap();
        tx.commit().unwrap();

        let mut tx = store.begin();
        assert_eq!(class_of(&tx, bob).unwrap(), "employee");
        assert!(direct_instances(&tx, "person").unwrap().is_empty());
        assert_eq!(direct_instances(&tx, "employee").unwrap(), vec![bob]);

        // Only the moved instance's entry leaves the old anchor.
        let carol = create_instance(&mut tx, "employee").unwrap();
        reparent(&mut tx, bob, "person").unwrap();
        assert_eq!(direct_instances(&tx, "employee").unwrap(), vec![carol]);
        assert_eq!(direct_instances(&tx, "person").unwrap(), vec![bob]);
        assert_eq!(tx.outgoing_edges(bob, Some(MEMBER_EDGE)).unwrap().len(), 1);
    }

    #[test]
    fn test_connect_and_disconnect_mirror() {
        let store = store_with_classes(&["worker", "dept"]);
        let mut tx = store.begin();
        let w = create_instance(&mut tx, "worker").unwrap();
        let d = create_instance(&mut tx, "dept").unwrap();
        connect(&mut tx, w, "dept", d, "staff").unwrap();
        assert_eq!(related(&tx, w, "dept").unwrap(), vec![d]);
        assert_eq!(related(&tx, d, "staff").unwrap(), vec![w]);

        assert_eq!(disconnect(&mut tx, w, "dept", d, "staff").unwrap(), 1);
        assert!(related(&tx, w, "dept").unwrap().is_empty());
        assert!(related(&tx, d, "staff").unwrap().is_empty());
        assert_eq!(disconnect(&mut tx, w, "dept", d, "staff").unwrap(), 0);
    }
}
