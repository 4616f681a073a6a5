//! Statement IR for updates, retrievals, and predicates.

use crate::error::Error;
use crate::schema::{ClassDef, IndexDef};
use crate::value::Value;
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};
use std::fmt;
use std::str::FromStr;

/// Comparison operator in a predicate condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, SerdeSerialize, SerdeDeserialize)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    /// Operator symbol as written in statements.
    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "<>",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }

    /// Whether the operator requires an ordering (integer operands).
    pub fn is_ordering(&self) -> bool {
        !matches!(self, CompareOp::Eq | CompareOp::Ne)
    }
}

impl FromStr for CompareOp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "=" => Ok(CompareOp::Eq),
            "<>" | "!=" => Ok(CompareOp::Ne),
            "<" => Ok(CompareOp::Lt),
            "<=" => Ok(CompareOp::Le),
            ">" => Ok(CompareOp::Gt),
            ">=" => Ok(CompareOp::Ge),
            other => Err(Error::UnknownOperator(other.to_string())),
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Boolean predicate over an instance's scalar attributes.
#[derive(Debug, Clone, PartialEq, SerdeSerialize, SerdeDeserialize)]
pub enum Predicate {
    /// All children hold. Empty is true.
    And(Vec<Predicate>),
    /// Any child holds. Empty is false.
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
    True,
    False,
    /// `attribute op value`
    Cond {
        attribute: String,
        op: CompareOp,
        value: Value,
    },
}

impl Predicate {
    /// Build a comparison condition.
    pub fn cond(attribute: impl Into<String>, op: CompareOp, value: impl Into<Value>) -> Self {
        Predicate::Cond {
            attribute: attribute.into(),
            op,
            value: value.into(),
        }
    }

    /// `attribute = value`
    pub fn eq(attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::cond(attribute, CompareOp::Eq, value)
    }

    /// `attribute <> value`
    pub fn ne(attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::cond(attribute, CompareOp::Ne, value)
    }

    /// `attribute > value`
    pub fn gt(attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::cond(attribute, CompareOp::Gt, value)
    }

    /// `attribute < value`
    pub fn lt(attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::cond(attribute, CompareOp::Lt, value)
    }

    /// Negate a predicate.
    #[allow(clippy::should_implement_trait)]
    pub fn not(predicate: Predicate) -> Self {
        Predicate::Not(Box::new(predicate))
    }
}

impl Default for Predicate {
    fn default() -> Self {
        Predicate::True
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::True => f.write_str("true"),
            Predicate::False => f.write_str("false"),
            Predicate::Not(inner) => write!(f, "not ({})", inner),
            Predicate::Cond {
                attribute,
                op,
                value,
            } => match value {
                Value::String(s) => write!(f, "{} {} \"{}\"", attribute, op, s),
                other => write!(f, "{} {} {}", attribute, op, other),
            },
            Predicate::And(children) | Predicate::Or(children) => {
                let joiner = if matches!(self, Predicate::And(_)) {
                    " and "
                } else {
                    " or "
                };
                f.write_str("(")?;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        f.write_str(joiner)?;
                    }
                    write!(f, "{}", child)?;
                }
                f.write_str(")")
            }
        }
    }
}

/// How a relationship assignment combines with existing edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, SerdeSerialize, SerdeDeserialize)]
pub enum AssignMode {
    /// Disconnect each selected target, then insert.
    Replace,
    /// Add an edge to each selected target.
    Insert,
    /// Remove edges to each selected target.
    Exclude,
}

/// One assignment inside an insert or modify statement.
#[derive(Debug, Clone, PartialEq, SerdeSerialize, SerdeDeserialize)]
pub enum Assignment {
    Scalar {
        attribute: String,
        value: Value,
    },
    Relationship {
        attribute: String,
        mode: AssignMode,
        target_class: String,
        predicate: Predicate,
    },
}

impl Assignment {
    /// Assign a scalar value.
    pub fn scalar(attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        Assignment::Scalar {
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    /// Assign a relationship to instances of `target_class` matching `predicate`.
    pub fn relationship(
        attribute: impl Into<String>,
        mode: AssignMode,
        target_class: impl Into<String>,
        predicate: Predicate,
    ) -> Self {
        Assignment::Relationship {
            attribute: attribute.into(),
            mode,
            target_class: target_class.into(),
            predicate,
        }
    }

    /// Attribute being assigned.
    pub fn attribute(&self) -> &str {
        match self {
            Assignment::Scalar { attribute, .. } | Assignment::Relationship { attribute, .. } => {
                attribute
            }
        }
    }
}

/// `insert` statement.
///
/// With `from_class_name` set, existing instances of that class matching
/// `predicate` are moved into `class_name` instead of creating a new one.
#[derive(Debug, Clone, PartialEq, SerdeSerialize, SerdeDeserialize)]
pub struct InsertQuery {
    pub class_name: String,
    pub from_class_name: Option<String>,
    pub predicate: Option<Predicate>,
    pub assignments: Vec<Assignment>,
}

impl InsertQuery {
    /// Insert a fresh instance of `class_name`.
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            from_class_name: None,
            predicate: None,
            assignments: Vec::new(),
        }
    }

    /// Re-parent instances of `from` matching `predicate`.
    pub fn from_class(mut self, from: impl Into<String>, predicate: Predicate) -> Self {
        self.from_class_name = Some(from.into());
        self.predicate = Some(predicate);
        self
    }

    /// Add an assignment.
    pub fn with_assignment(mut self, assignment: Assignment) -> Self {
        self.assignments.push(assignment);
        self
    }
}

/// `modify` statement.
#[derive(Debug, Clone, PartialEq, SerdeSerialize, SerdeDeserialize)]
pub struct ModifyQuery {
    pub class_name: String,
    pub predicate: Predicate,
    pub assignments: Vec<Assignment>,
}

impl ModifyQuery {
    /// Modify instances of `class_name` matching `predicate`.
    pub fn new(class_name: impl Into<String>, predicate: Predicate) -> Self {
        Self {
            class_name: class_name.into(),
            predicate,
            assignments: Vec::new(),
        }
    }

    /// Add an assignment.
    pub fn with_assignment(mut self, assignment: Assignment) -> Self {
        self.assignments.push(assignment);
        self
    }
}

/// Final element of an attribute path.
#[derive(Debug, Clone, PartialEq, Eq, SerdeSerialize, SerdeDeserialize)]
pub enum PathTerminal {
    /// A single scalar attribute.
    Attribute(String),
    /// Every scalar attribute present on the reached instance.
    Wildcard,
}

/// Relationship hops followed by a scalar projection, e.g. `dept.manager.name`.
#[derive(Debug, Clone, PartialEq, Eq, SerdeSerialize, SerdeDeserialize)]
pub struct AttributePath {
    pub hops: Vec<String>,
    pub terminal: PathTerminal,
}

impl AttributePath {
    /// A path projecting one attribute of the selected instance.
    pub fn attribute(name: impl Into<String>) -> Self {
        Self {
            hops: Vec::new(),
            terminal: PathTerminal::Attribute(name.into()),
        }
    }

    /// A path projecting every attribute of the selected instance.
    pub fn wildcard() -> Self {
        Self {
            hops: Vec::new(),
            terminal: PathTerminal::Wildcard,
        }
    }

    /// Prepend relationship hops.
    pub fn through<I, S>(mut self, hops: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hops = hops.into_iter().map(Into::into).collect();
        self
    }

    /// Label used when printing results, e.g. `dept.name`.
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for AttributePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for hop in &self.hops {
            write!(f, "{}.", hop)?;
        }
        match &self.terminal {
            PathTerminal::Attribute(name) => f.write_str(name),
            PathTerminal::Wildcard => f.write_str("*"),
        }
    }
}

/// `retrieve` statement.
#[derive(Debug, Clone, PartialEq, SerdeSerialize, SerdeDeserialize)]
pub struct RetrieveQuery {
    pub class_name: String,
    pub predicate: Option<Predicate>,
    pub attribute_paths: Vec<AttributePath>,
}

impl RetrieveQuery {
    /// Retrieve every instance of `class_name`.
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            predicate: None,
            attribute_paths: Vec::new(),
        }
    }

    /// Restrict to instances matching `predicate`.
    pub fn with_predicate(mut self, predicate: Predicate) -> Self {
        self.predicate = Some(predicate);
        self
    }

    /// Add a projected path.
    pub fn with_path(mut self, path: AttributePath) -> Self {
        self.attribute_paths.push(path);
        self
    }
}

/// `source` statement.
#[derive(Debug, Clone, PartialEq, Eq, SerdeSerialize, SerdeDeserialize)]
pub struct SourceQuery {
    pub filename: String,
}

/// A parsed statement.
#[derive(Debug, Clone, PartialEq, SerdeSerialize, SerdeDeserialize)]
pub enum Statement {
    ClassDef(ClassDef),
    Insert(InsertQuery),
    Modify(ModifyQuery),
    Retrieve(RetrieveQuery),
    Source(SourceQuery),
    IndexDef(IndexDef),
}

impl Statement {
    /// Short statement kind, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Statement::ClassDef(_) => "class",
            Statement::Insert(_) => "insert",
            Statement::Modify(_) => "modify",
            Statement::Retrieve(_) => "retrieve",
            Statement::Source(_) => "source",
            Statement::IndexDef(_) => "index",
        }
    }
}

impl From<ClassDef> for Statement {
    fn from(value: ClassDef) -> Self {
        Statement::ClassDef(value)
    }
}

impl From<InsertQuery> for Statement {
    fn from(value: InsertQuery) -> Self {
        Statement::Insert(value)
    }
}

impl From<ModifyQuery> for Statement {
    fn from(value: ModifyQuery) -> Self {
        Statement::Modify(value)
    }
}

impl From<RetrieveQuery> for Statement {
    fn from(value: RetrieveQuery) -> Self {
        Statement::Retrieve(value)
    }
}
