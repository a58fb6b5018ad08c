//! Classification Rules
//!
//! A rule is a single predicate over one fact path: `fact_path operator
//! expected-value`. Rules never carry logic across facts; groups combine
//! rules with ALL/ANY semantics.

use crate::error::ModelError;
use crate::facts::FactPath;
use crate::value::{RuleValue, Scalar};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Comparison operators available to classification rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Eq,
    Ne,
    RegexMatch,
    RegexNotMatch,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    NotIn,
    Exists,
    NotExists,
}

impl Operator {
    /// Whether this operator compares numerically.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Operator::Gt | Operator::Gte | Operator::Lt | Operator::Lte)
    }

    /// Whether this operator only tests for presence.
    pub fn is_existence(&self) -> bool {
        matches!(self, Operator::Exists | Operator::NotExists)
    }

    /// Whether this operator matches against a regular expression.
    pub fn is_regex(&self) -> bool {
        matches!(self, Operator::RegexMatch | Operator::RegexNotMatch)
    }

    /// Whether this operator tests sequence membership.
    pub fn is_membership(&self) -> bool {
        matches!(self, Operator::In | Operator::NotIn)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Ne => "ne",
            Operator::RegexMatch => "regex_match",
            Operator::RegexNotMatch => "regex_not_match",
            Operator::Gt => "gt",
            Operator::Gte => "gte",
            Operator::Lt => "lt",
            Operator::Lte => "lte",
            Operator::In => "in",
            Operator::NotIn => "not_in",
            Operator::Exists => "exists",
            Operator::NotExists => "not_exists",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single classification predicate.
///
/// Shape invariants (`in`/`not_in` need a sequence, `regex_*` need a
/// string pattern, everything else needs a scalar) are enforced by
/// [`ClassificationRule::new`] and re-checked by
/// [`ClassificationRule::validate_shape`] for rules that arrive through
/// deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationRule {
    pub id: String,
    pub fact_path: FactPath,
    pub operator: Operator,
    #[serde(default)]
    pub value: RuleValue,
}

impl ClassificationRule {
    /// Create a rule, validating the fact path and the operator/value
    /// shape. The existence operators ignore their value entirely; it is
    /// canonicalized to null.
    pub fn new(
        id: impl Into<String>,
        fact_path: &str,
        operator: Operator,
        value: RuleValue,
    ) -> Result<Self, ModelError> {
        let fact_path = FactPath::parse(fact_path)?;
        let value = if operator.is_existence() {
            RuleValue::Scalar(Scalar::Null)
        } else {
            value
        };
        let rule = ClassificationRule {
            id: id.into(),
            fact_path,
            operator,
            value,
        };
        rule.validate_shape()?;
        Ok(rule)
    }

    /// Check the operator/value shape invariant.
    pub fn validate_shape(&self) -> Result<(), ModelError> {
        let shape_error = |reason: &str| ModelError::InvalidRuleShape {
            operator: self.operator.as_str().to_string(),
            reason: reason.to_string(),
        };

        if self.operator.is_existence() {
            return Ok(());
        }
        if self.operator.is_membership() {
            return match self.value.as_list() {
                Some(_) => Ok(()),
                None => Err(shape_error("expected a sequence of scalars")),
            };
        }
        let scalar = self
            .value
            .as_scalar()
            .ok_or_else(|| shape_error("expected a single scalar"))?;
        if self.operator.is_regex() && !matches!(scalar, Scalar::String(_)) {
            return Err(shape_error("expected a pattern string"));
        }
        Ok(())
    }
}
