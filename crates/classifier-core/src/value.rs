//! Rule Value Types
//!
//! Expected values carried by classification rules. Scalars follow the
//! JSON scalar set; `in`/`not_in` carry a sequence of scalars. The shape
//! a given operator accepts is enforced at rule construction, not at
//! evaluation time.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Scalar literal in a rule's expected value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Number(i64),
    Float(f64),
    String(String),
    Boolean(bool),
}

impl Scalar {
    /// Coerce to a number: integers and floats directly, strings when
    /// they parse as a float. Booleans and null do not coerce.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) => Some(*n as f64),
            Scalar::Float(f) => Some(*f),
            Scalar::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Coerce to text: strings, numbers, and booleans. Null is not
    /// string-coercible.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Scalar::String(s) => Some(s.clone()),
            Scalar::Number(n) => Some(n.to_string()),
            Scalar::Float(f) => Some(f.to_string()),
            Scalar::Boolean(b) => Some(b.to_string()),
            Scalar::Null => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => write!(f, "null"),
            Scalar::Number(n) => write!(f, "{}", n),
            Scalar::Float(v) => write!(f, "{}", v),
            Scalar::String(s) => write!(f, "{}", s),
            Scalar::Boolean(b) => write!(f, "{}", b),
        }
    }
}

/// Expected value of a classification rule: a single scalar or, for the
/// membership operators, a sequence of scalars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleValue {
    Scalar(Scalar),
    List(Vec<Scalar>),
}

impl RuleValue {
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            RuleValue::Scalar(s) => Some(s),
            RuleValue::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Scalar]> {
        match self {
            RuleValue::List(items) => Some(items),
            RuleValue::Scalar(_) => None,
        }
    }
}

impl Default for RuleValue {
    fn default() -> Self {
        RuleValue::Scalar(Scalar::Null)
    }
}

impl From<&str> for RuleValue {
    fn from(s: &str) -> Self {
        RuleValue::Scalar(Scalar::String(s.to_string()))
    }
}

impl From<i64> for RuleValue {
    fn from(n: i64) -> Self {
        RuleValue::Scalar(Scalar::Number(n))
    }
}

impl From<f64> for RuleValue {
    fn from(f: f64) -> Self {
        RuleValue::Scalar(Scalar::Float(f))
    }
}

impl From<bool> for RuleValue {
    fn from(b: bool) -> Self {
        RuleValue::Scalar(Scalar::Boolean(b))
    }
}

impl From<Vec<Scalar>> for RuleValue {
    fn from(items: Vec<Scalar>) -> Self {
        RuleValue::List(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_untagged_serde() {
        let decoded: Scalar = serde_json::from_str("42").unwrap();
        assert_eq!(decoded, Scalar::Number(42));
        let decoded: Scalar = serde_json::from_str("4.5").unwrap();
        assert_eq!(decoded, Scalar::Float(4.5));
        let decoded: Scalar = serde_json::from_str("\"RedHat\"").unwrap();
        assert_eq!(decoded, Scalar::String("RedHat".to_string()));
        let decoded: Scalar = serde_json::from_str("true").unwrap();
        assert_eq!(decoded, Scalar::Boolean(true));
        let decoded: Scalar = serde_json::from_str("null").unwrap();
        assert_eq!(decoded, Scalar::Null);
    }

    #[test]
    fn test_rule_value_untagged_serde() {
        let decoded: RuleValue = serde_json::from_str("\"RedHat\"").unwrap();
        assert_eq!(decoded.as_scalar(), Some(&Scalar::String("RedHat".to_string())));
        let decoded: RuleValue = serde_json::from_str("[\"a\", 2]").unwrap();
        assert_eq!(
            decoded.as_list(),
            Some(&[Scalar::String("a".to_string()), Scalar::Number(2)][..])
        );
    }

    #[test]
    fn test_scalar_number_coercion() {
        assert_eq!(Scalar::Number(3).as_number(), Some(3.0));
        assert_eq!(Scalar::Float(3.5).as_number(), Some(3.5));
        assert_eq!(Scalar::String("3".to_string()).as_number(), Some(3.0));
        assert_eq!(Scalar::Boolean(true).as_number(), None);
        assert_eq!(Scalar::Null.as_number(), None);
    }

    #[test]
    fn test_scalar_text_coercion() {
        assert_eq!(
            Scalar::String("x".to_string()).as_text(),
            Some("x".to_string())
        );
        assert_eq!(Scalar::Number(5).as_text(), Some("5".to_string()));
        assert_eq!(Scalar::Boolean(false).as_text(), Some("false".to_string()));
        assert_eq!(Scalar::Null.as_text(), None);
    }
}
