//! Record inclusion predicates.
//!
//! A [`Predicate`] is an immutable boolean expression tree over a record's
//! fixed attributes and dynamic field map, built through value-level
//! combinators so a host-supplied base predicate can be extended by
//! conjunction without string manipulation:
//!
//! ```ignore
//! use logs2records::{Attribute, Predicate};
//!
//! let base = Predicate::attribute_equals(Attribute::Logger, "app-server");
//! let predicate = base.and(Predicate::field_equals("Type", "request.summary"));
//! let accepted = predicate.evaluate(&record)?;
//! ```
//!
//! Evaluation is pure and never mutates the record. Referencing a missing
//! attribute or field makes the enclosing comparison false rather than an
//! error; only comparisons whose operand types cannot be reconciled fail.

use std::fmt;

use crate::error::{Error, Result};
use crate::record::{Attribute, Record};
use crate::schema::ScalarValue;

/// Where a predicate operand reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldRef {
    /// A fixed record attribute.
    Attribute(Attribute),
    /// A dynamic field, by key.
    Field(String),
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldRef::Attribute(attribute) => write!(f, "attribute {attribute}"),
            FieldRef::Field(key) => write!(f, "Fields[{key}]"),
        }
    }
}

/// Comparison operator for predicate leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// Equal.
    Eq,
    /// Not equal.
    Ne,
    /// Less than.
    Lt,
    /// Less than or equal.
    Le,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Ge,
}

impl CompareOp {
    fn apply<T: Ord + ?Sized>(&self, left: &T, right: &T) -> bool {
        match self {
            CompareOp::Eq => left == right,
            CompareOp::Ne => left != right,
            CompareOp::Lt => left < right,
            CompareOp::Le => left <= right,
            CompareOp::Gt => left > right,
            CompareOp::Ge => left >= right,
        }
    }
}

/// Immutable boolean expression tree deciding record inclusion.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Matches every record; the neutral element for conjunction.
    Always,
    /// Both sub-predicates must hold.
    And(Box<Predicate>, Box<Predicate>),
    /// At least one sub-predicate must hold.
    Or(Box<Predicate>, Box<Predicate>),
    /// Inverts its sub-predicate.
    Not(Box<Predicate>),
    /// True when the referenced attribute or field is present.
    Defined(FieldRef),
    /// Compares a referenced value against a literal.
    Compare {
        /// Operand source.
        field: FieldRef,
        /// Comparison operator.
        op: CompareOp,
        /// Literal to compare against.
        value: ScalarValue,
    },
}

impl Predicate {
    /// A predicate that accepts every record.
    pub fn always() -> Self {
        Predicate::Always
    }

    /// Conjunction: both `self` and `other` must hold.
    pub fn and(self, other: Predicate) -> Self {
        Predicate::And(Box::new(self), Box::new(other))
    }

    /// Disjunction: `self` or `other` must hold.
    pub fn or(self, other: Predicate) -> Self {
        Predicate::Or(Box::new(self), Box::new(other))
    }

    /// Negation of `self`.
    pub fn not(self) -> Self {
        Predicate::Not(Box::new(self))
    }

    /// Comparison leaf over an attribute or dynamic field.
    pub fn compare(field: FieldRef, op: CompareOp, value: impl Into<ScalarValue>) -> Self {
        Predicate::Compare {
            field,
            op,
            value: value.into(),
        }
    }

    /// Presence check for an attribute or dynamic field.
    pub fn defined(field: FieldRef) -> Self {
        Predicate::Defined(field)
    }

    /// Equality against a dynamic field value.
    pub fn field_equals(key: impl Into<String>, value: impl Into<ScalarValue>) -> Self {
        Predicate::compare(FieldRef::Field(key.into()), CompareOp::Eq, value)
    }

    /// Equality against a fixed attribute value.
    pub fn attribute_equals(attribute: Attribute, value: impl Into<ScalarValue>) -> Self {
        Predicate::compare(FieldRef::Attribute(attribute), CompareOp::Eq, value)
    }

    /// Evaluate against a record.
    ///
    /// Missing operands make their comparison false. Comparisons whose
    /// operand types cannot be reconciled (a numeric attribute against a
    /// string literal, or a field value that does not parse as an integer
    /// when compared against an integer literal) return
    /// [`Error::Predicate`]; callers drop that record and continue.
    pub fn evaluate(&self, record: &Record) -> Result<bool> {
        match self {
            Predicate::Always => Ok(true),
            Predicate::And(left, right) => Ok(left.evaluate(record)? && right.evaluate(record)?),
            Predicate::Or(left, right) => Ok(left.evaluate(record)? || right.evaluate(record)?),
            Predicate::Not(inner) => Ok(!inner.evaluate(record)?),
            Predicate::Defined(field) => Ok(resolve(field, record).is_some()),
            Predicate::Compare { field, op, value } => match resolve(field, record) {
                Some(actual) => compare_values(field, &actual, *op, value),
                None => Ok(false),
            },
        }
    }
}

fn resolve(field: &FieldRef, record: &Record) -> Option<ScalarValue> {
    match field {
        FieldRef::Attribute(attribute) => record.attribute(*attribute),
        FieldRef::Field(key) => record.fields.get(key).map(ScalarValue::from),
    }
}

fn compare_values(
    field: &FieldRef,
    actual: &ScalarValue,
    op: CompareOp,
    expected: &ScalarValue,
) -> Result<bool> {
    match (actual, expected) {
        (ScalarValue::Int64(a), ScalarValue::Int64(b)) => Ok(op.apply(a, b)),
        (ScalarValue::Utf8(a), ScalarValue::Utf8(b)) => Ok(op.apply(a.as_str(), b.as_str())),
        // Dynamic field values are strings; against an integer literal they
        // parse first and compare numerically.
        (ScalarValue::Utf8(a), ScalarValue::Int64(b)) => match a.parse::<i64>() {
            Ok(parsed) => Ok(op.apply(&parsed, b)),
            Err(_) => Err(Error::Predicate(format!(
                "{field} value '{a}' is not comparable to integer {b}"
            ))),
        },
        (ScalarValue::Int64(a), ScalarValue::Utf8(b)) => Err(Error::Predicate(format!(
            "{field} is numeric ({a}) and cannot be compared to string '{b}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_record() -> Record {
        Record::new(1000)
            .with_type("request.summary")
            .with_logger("app-server")
            .with_severity(6)
            .with_field("Type", "request.summary")
            .with_field("t", "700")
    }

    #[test]
    fn field_equality() {
        let predicate = Predicate::field_equals("Type", "request.summary");
        assert!(predicate.evaluate(&request_record()).unwrap());

        let other = request_record().with_field("Type", "other");
        assert!(!predicate.evaluate(&other).unwrap());
    }

    #[test]
    fn missing_field_is_false_not_error() {
        let predicate = Predicate::field_equals("nope", "x");
        assert!(!predicate.evaluate(&request_record()).unwrap());
    }

    #[test]
    fn defined_checks_presence() {
        let record = request_record();
        assert!(Predicate::defined(FieldRef::Field("t".to_string()))
            .evaluate(&record)
            .unwrap());
        assert!(Predicate::defined(FieldRef::Field("nope".to_string()))
            .not()
            .evaluate(&record)
            .unwrap());
        assert!(
            !Predicate::defined(FieldRef::Attribute(Attribute::Hostname))
                .evaluate(&record)
                .unwrap()
        );
    }

    #[test]
    fn conjunction_with_base_predicate() {
        let base = Predicate::attribute_equals(Attribute::Logger, "app-server");
        let predicate = base.and(Predicate::field_equals("Type", "request.summary"));

        assert!(predicate.evaluate(&request_record()).unwrap());

        let wrong_logger = request_record().with_logger("other");
        assert!(!predicate.evaluate(&wrong_logger).unwrap());
    }

    #[test]
    fn conjunction_result_is_order_independent() {
        let a = Predicate::field_equals("Type", "request.summary");
        let b = Predicate::attribute_equals(Attribute::Severity, 6);
        let record = request_record();

        let left = a.clone().and(b.clone()).evaluate(&record).unwrap();
        let right = b.and(a).evaluate(&record).unwrap();
        assert_eq!(left, right);
        assert!(left);
    }

    #[test]
    fn disjunction_and_negation() {
        let record = request_record();
        let either = Predicate::field_equals("Type", "other")
            .or(Predicate::field_equals("Type", "request.summary"));
        assert!(either.evaluate(&record).unwrap());

        let negated = Predicate::field_equals("Type", "request.summary").not();
        assert!(!negated.evaluate(&record).unwrap());
    }

    #[test]
    fn numeric_attribute_comparison() {
        let record = request_record();
        let predicate = Predicate::compare(
            FieldRef::Attribute(Attribute::Severity),
            CompareOp::Ge,
            5i64,
        );
        assert!(predicate.evaluate(&record).unwrap());

        let stricter = Predicate::compare(
            FieldRef::Attribute(Attribute::Severity),
            CompareOp::Gt,
            6i64,
        );
        assert!(!stricter.evaluate(&record).unwrap());
    }

    #[test]
    fn field_parses_before_integer_comparison() {
        let record = request_record();
        let predicate =
            Predicate::compare(FieldRef::Field("t".to_string()), CompareOp::Gt, 500i64);
        assert!(predicate.evaluate(&record).unwrap());
    }

    #[test]
    fn unparsable_field_against_integer_is_an_error() {
        let record = request_record().with_field("t", "abc");
        let predicate =
            Predicate::compare(FieldRef::Field("t".to_string()), CompareOp::Gt, 500i64);
        let err = predicate.evaluate(&record).unwrap_err();
        assert!(matches!(err, Error::Predicate(_)));
    }

    #[test]
    fn numeric_attribute_against_string_is_an_error() {
        let record = request_record();
        let predicate = Predicate::attribute_equals(Attribute::Severity, "high");
        let err = predicate.evaluate(&record).unwrap_err();
        assert!(matches!(err, Error::Predicate(_)));
    }

    #[test]
    fn always_matches_everything() {
        assert!(Predicate::always().evaluate(&Record::default()).unwrap());
    }
}
