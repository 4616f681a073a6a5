//! Predicate evaluation against instance attributes.

use crate::catalog::ClassDefinition;
use crate::error::{AttributeError, Error, EvaluationError};
use crate::storage::Property;
use wdb_proto::{CompareOp, Predicate, ScalarType, Value};

/// Evaluates predicates against the current attribute values of an instance.
pub struct PredicateEvaluator;

impl PredicateEvaluator {
    /// Evaluate `predicate` for an instance of `class` holding `properties`.
    ///
    /// `and`/`or` short-circuit, so an invalid condition after a deciding
    /// operand is never checked.
    pub fn evaluate(
        predicate: &Predicate,
        class: &ClassDefinition,
        properties: &[Property],
    ) -> Result<bool, Error> {
        match predicate {
            Predicate::True => Ok(true),
            Predicate::False => Ok(false),
            Predicate::Not(inner) => Ok(!Self::evaluate(inner, class, properties)?),
            Predicate::And(children) => {
                for child in children {
                    if !Self::evaluate(child, class, properties)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Predicate::Or(children) => {
                for child in children {
                    if Self::evaluate(child, class, properties)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Predicate::Cond {
                attribute,
                op,
                value,
            } => Self::compare(class, attribute, *op, value, properties),
        }
    }

    fn compare(
        class: &ClassDefinition,
        attribute: &str,
        op: CompareOp,
        literal: &Value,
        properties: &[Property],
    ) -> Result<bool, Error> {
        let ty = class
            .attribute(attribute)
            .and_then(|a| a.scalar_type())
            .ok_or_else(|| AttributeError::UnknownScalarAttribute {
                class: class.name.clone(),
                attribute: attribute.to_string(),
            })?;
        let current = properties
            .iter()
            .find(|p| p.name == attribute)
            .map(|p| &p.value);

        match op {
            CompareOp::Eq => Ok(Self::equals(current, literal)),
            CompareOp::Ne => Ok(!Self::equals(current, literal)),
            _ => {
                if ty != ScalarType::Integer {
                    return Err(EvaluationError::OrderingOnNonInteger {
                        attribute: attribute.to_string(),
                        op: op.symbol().to_string(),
                        actual: ty.to_string(),
                    }
                    .into());
                }
                let Some(rhs) = literal.as_i64() else {
                    return Err(EvaluationError::NonIntegerOperand {
                        attribute: attribute.to_string(),
                        op: op.symbol().to_string(),
                        literal: literal.to_string(),
                    }
                    .into());
                };
                let Some(lhs) = current.and_then(Value::as_i64) else {
                    return Ok(false);
                };
                let ordering = lhs.cmp(&rhs);
                Ok(match op {
                    CompareOp::Lt => ordering.is_lt(),
                    CompareOp::Le => ordering.is_le(),
                    CompareOp::Gt => ordering.is_gt(),
                    CompareOp::Ge => ordering.is_ge(),
                    CompareOp::Eq => ordering.is_eq(),
                    CompareOp::Ne => ordering.is_ne(),
                })
            }
        }
    }

    /// Absent matches only `NULL`; present values compare by text.
    fn equals(current: Option<&Value>, literal: &Value) -> bool {
        match (current, literal) {
            (None, Value::Null) => true,
            (None, _) | (Some(_), Value::Null) => false,
            (Some(value), literal) => value.to_string() == literal.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::AttributeDefinition;

    fn person() -> ClassDefinition {
        let mut class = ClassDefinition::new("person");
        class.attributes = vec![
            AttributeDefinition::scalar("name", "person", ScalarType::String, None),
            AttributeDefinition::scalar("age", "person", ScalarType::Integer, None),
            AttributeDefinition::scalar("active", "person", ScalarType::Boolean, None),
        ];
        class
    }

    fn alice() -> Vec<Property> {
        vec![Property::new("name", "Alice"), Property::new("age", 30)]
    }

    fn eval(predicate: Predicate, properties: &[Property]) -> Result<bool, Error> {
        PredicateEvaluator::evaluate(&predicate, &person(), properties)
    }

    #[test]
    fn test_equality() {
        assert!(eval(Predicate::eq("name", "Alice"), &alice()).unwrap());
        assert!(!eval(Predicate::eq("name", "Bob"), &alice()).unwrap());
        assert!(eval(Predicate::ne("name", "Bob"), &alice()).unwrap());
        // Compared as text.
        assert!(eval(Predicate::eq("age", "30"), &alice()).unwrap());
    }

    #[test]
    fn test_null_semantics() {
        let props = alice();
        assert!(eval(Predicate::eq("active", Value::Null), &props).unwrap());
        assert!(!eval(Predicate::ne("active", Value::Null), &props).unwrap());
        assert!(!eval(Predicate::eq("name", Value::Null), &props).unwrap());
        assert!(eval(Predicate::ne("name", Value::Null), &props).unwrap());
        // An absent attribute differs from every non-null literal.
        assert!(!eval(Predicate::eq("active", true), &props).unwrap());
        assert!(eval(Predicate::ne("active", true), &props).unwrap());
    }

    #[test]
    fn test_ordering() {
        let props = alice();
        assert!(eval(Predicate::gt("age", 18), &props).unwrap());
        assert!(!eval(Predicate::lt("age", 18), &props).unwrap());
        assert!(eval(Predicate::cond("age", CompareOp::Ge, 30), &props).unwrap());
        assert!(eval(Predicate::cond("age", CompareOp::Le, 30), &props).unwrap());
        assert!(!eval(Predicate::gt("age", 18), &[]).unwrap());
        assert!(!eval(Predicate::lt("age", 18), &[]).unwrap());
    }

    #[test]
    fn test_ordering_errors() {
        assert!(matches!(
            eval(Predicate::gt("name", 3), &alice()),
            Err(Error::Evaluation(EvaluationError::OrderingOnNonInteger { .. }))
        ));
        assert!(matches!(
            eval(Predicate::gt("age", "x"), &alice()),
            Err(Error::Evaluation(EvaluationError::NonIntegerOperand { .. }))
        ));
    }

    #[test]
    fn test_unknown_attribute() {
        assert!(matches!(
            eval(Predicate::eq("salary", 3), &alice()),
            Err(Error::Attribute(AttributeError::UnknownScalarAttribute { .. }))
        ));
    }

    #[test]
    fn test_connectives() {
        let props = alice();
        assert!(eval(Predicate::And(vec![]), &props).unwrap());
        assert!(!eval(Predicate::Or(vec![]), &props).unwrap());
        assert!(eval(
            Predicate::And(vec![Predicate::gt("age", 18), Predicate::not(Predicate::eq("name", "Bob"))]),
            &props
        )
        .unwrap());
        // Short-circuit skips the invalid condition.
        assert!(eval(
            Predicate::Or(vec![Predicate::True, Predicate::eq("salary", 1)]),
            &props
        )
        .unwrap());
        assert!(!eval(
            Predicate::And(vec![Predicate::False, Predicate::eq("salary", 1)]),
            &props
        )
        .unwrap());
    }
}
