//! Result types for statement execution.

use crate::value::Value;
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

/// Counters reported after an insert or modify.
///
/// Edge counters count logical relationship edges: a forward edge and its
/// mirrored inverse edge count once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, SerdeSerialize, SerdeDeserialize)]
pub struct UpdateCounts {
    pub vertices_inserted: u64,
    pub edges_replaced: u64,
    pub edges_inserted: u64,
    pub edges_removed: u64,
}

impl UpdateCounts {
    /// Whether every counter is zero.
    pub fn is_empty(&self) -> bool {
        *self == UpdateCounts::default()
    }

    /// Human-readable lines for the non-zero counters only.
    pub fn summary(&self) -> Vec<String> {
        [
            (self.vertices_inserted, "vertices inserted"),
            (self.edges_replaced, "edges replaced"),
            (self.edges_inserted, "edges inserted"),
            (self.edges_removed, "edges removed"),
        ]
        .into_iter()
        .filter(|(count, _)| *count > 0)
        .map(|(count, label)| format!("{} {}", count, label))
        .collect()
    }
}

/// One projected value of a retrieved instance.
#[derive(Debug, Clone, PartialEq, SerdeSerialize, SerdeDeserialize)]
pub struct RetrievedValue {
    /// Path as requested, e.g. `dept.name` or `dept.*`.
    pub path: String,
    /// Scalar attribute that produced the value.
    pub attribute: String,
    pub value: Value,
}

/// Projected values of one selected instance, in request order.
#[derive(Debug, Clone, Default, PartialEq, SerdeSerialize, SerdeDeserialize)]
pub struct RetrievedRow {
    pub values: Vec<RetrievedValue>,
}

impl RetrievedRow {
    /// Look up the first value produced for `path`.
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.values.iter().find(|v| v.path == path).map(|v| &v.value)
    }

    /// Render as `label->value` pairs joined by ` | `.
    ///
    /// Wildcard values are labelled with their attribute name.
    pub fn to_line(&self) -> String {
        self.values
            .iter()
            .map(|v| {
                let label = if v.path.ends_with('*') {
                    &v.attribute
                } else {
                    &v.path
                };
                format!("{}->{}", label, v.value)
            })
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

/// Rows produced by a retrieve statement.
#[derive(Debug, Clone, Default, PartialEq, SerdeSerialize, SerdeDeserialize)]
pub struct RetrieveResult {
    pub class_name: String,
    pub rows: Vec<RetrievedRow>,
}

impl RetrieveResult {
    /// Create an empty result for a class.
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            rows: Vec::new(),
        }
    }

    /// Number of selected instances.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no instance was selected.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_skips_zero_counters() {
        let counts = UpdateCounts {
            vertices_inserted: 1,
            edges_inserted: 2,
            ..Default::default()
        };
        assert_eq!(
            counts.summary(),
            vec!["1 vertices inserted".to_string(), "2 edges inserted".to_string()]
        );
        assert!(UpdateCounts::default().summary().is_empty());
    }

    #[test]
    fn test_row_line() {
        let row = RetrievedRow {
            values: vec![
                RetrievedValue {
                    path: "name".into(),
                    attribute: "name".into(),
                    value: Value::from("Alice"),
                },
                RetrievedValue {
                    path: "dept.*".into(),
                    attribute: "title".into(),
                    value: Value::from("R&D"),
                },
            ],
        };
        assert_eq!(row.to_line(), "name->Alice | title->R&D");
        assert_eq!(row.get("name"), Some(&Value::from("Alice")));
    }
}
