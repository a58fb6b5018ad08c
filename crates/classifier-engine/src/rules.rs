//! Compiled Rule Evaluation
//!
//! Rules are compiled once per snapshot: the fact path is already parsed
//! in the data model, and regex patterns are compiled here and cached on
//! the compiled rule so repeated per-node evaluation never recompiles.
//! A rule that cannot be compiled (bad pattern, bad value shape) is kept
//! in a broken state: it evaluates as non-matching and reports the same
//! failure on every evaluation instead of aborting the snapshot.

use crate::result::EvalErrorKind;
use classifier_core::{number_of, text_of, ClassificationRule, Operator, Scalar};
use regex::Regex;
use serde_json::Value;

/// Failure of a single rule evaluation, before group/rule attribution.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationFailure {
    pub kind: EvalErrorKind,
    pub detail: String,
}

#[derive(Debug, Clone)]
enum RuleMatcher {
    /// Operator dispatch over the rule's own value
    Standard,
    /// Pre-compiled regular expression
    Pattern { regex: Regex, negate: bool },
    /// Compile-time defect, reported on every evaluation
    Broken(EvaluationFailure),
}

/// A classification rule with its evaluation state pre-compiled.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub rule: ClassificationRule,
    matcher: RuleMatcher,
}

impl CompiledRule {
    /// Compile a rule. Never fails: defective rules become broken
    /// matchers that surface their defect as a rule evaluation error.
    pub fn compile(rule: ClassificationRule) -> Self {
        let matcher = match rule.validate_shape() {
            Err(e) => RuleMatcher::Broken(EvaluationFailure {
                kind: EvalErrorKind::InvalidRuleShape,
                detail: e.to_string(),
            }),
            Ok(()) if rule.operator.is_regex() => {
                // Shape validation guarantees a string scalar here.
                let pattern = match rule.value.as_scalar() {
                    Some(Scalar::String(p)) => p.as_str(),
                    _ => "",
                };
                match Regex::new(pattern) {
                    Ok(regex) => RuleMatcher::Pattern {
                        regex,
                        negate: rule.operator == Operator::RegexNotMatch,
                    },
                    Err(e) => RuleMatcher::Broken(EvaluationFailure {
                        kind: EvalErrorKind::BadRegex,
                        detail: e.to_string(),
                    }),
                }
            }
            Ok(()) => RuleMatcher::Standard,
        };
        CompiledRule { rule, matcher }
    }

    /// Evaluate against a resolved fact value (`None` = absent).
    ///
    /// Total for well-formed rules. An absent fact makes every operator
    /// except `not_exists` evaluate to `false`; it is never an error.
    pub fn evaluate(&self, resolved: Option<&Value>) -> Result<bool, EvaluationFailure> {
        if let RuleMatcher::Broken(failure) = &self.matcher {
            return Err(failure.clone());
        }

        match self.rule.operator {
            Operator::Exists => return Ok(resolved.is_some()),
            Operator::NotExists => return Ok(resolved.is_none()),
            _ => {}
        }

        let Some(fact) = resolved else {
            return Ok(false);
        };

        match self.rule.operator {
            Operator::Eq => Ok(self.expected_scalar().is_some_and(|s| scalar_eq(fact, s))),
            Operator::Ne => Ok(self.expected_scalar().is_some_and(|s| !scalar_eq(fact, s))),
            Operator::Gt | Operator::Gte | Operator::Lt | Operator::Lte => {
                self.compare_numeric(fact)
            }
            Operator::In => Ok(self.expected_list_contains(fact)),
            Operator::NotIn => Ok(!self.expected_list_contains(fact)),
            Operator::RegexMatch | Operator::RegexNotMatch => {
                let RuleMatcher::Pattern { regex, negate } = &self.matcher else {
                    unreachable!("regex operators always compile to a pattern matcher");
                };
                match text_of(fact) {
                    Some(text) => Ok(regex.is_match(&text) != *negate),
                    // Non-string-coercible facts never match a pattern
                    None => Ok(false),
                }
            }
            Operator::Exists | Operator::NotExists => unreachable!("handled above"),
        }
    }

    fn expected_scalar(&self) -> Option<&Scalar> {
        self.rule.value.as_scalar()
    }

    fn expected_list_contains(&self, fact: &Value) -> bool {
        self.rule
            .value
            .as_list()
            .is_some_and(|items| items.iter().any(|s| scalar_eq(fact, s)))
    }

    fn compare_numeric(&self, fact: &Value) -> Result<bool, EvaluationFailure> {
        let non_numeric = |side: &str, shown: String| EvaluationFailure {
            kind: EvalErrorKind::NonNumericComparison,
            detail: format!("{} value '{}' is not numeric", side, shown),
        };

        let left = number_of(fact)
            .ok_or_else(|| non_numeric("fact", fact.to_string()))?;
        let right = self
            .expected_scalar()
            .and_then(Scalar::as_number)
            .ok_or_else(|| {
                non_numeric(
                    "expected",
                    self.expected_scalar()
                        .map(|s| s.to_string())
                        .unwrap_or_default(),
                )
            })?;

        Ok(match self.rule.operator {
            Operator::Gt => left > right,
            Operator::Gte => left >= right,
            Operator::Lt => left < right,
            Operator::Lte => left <= right,
            _ => unreachable!("non-numeric operator in compare_numeric"),
        })
    }
}

/// Structural equality with numeric normalization: `1`, `1.0` and `"1"`
/// are equal because both sides coerce to the same number. Otherwise
/// null equals only null, booleans compare as booleans, and the
/// remaining scalar pairs compare by string coercion. Structured fact
/// values are unequal to every scalar.
pub(crate) fn scalar_eq(fact: &Value, expected: &Scalar) -> bool {
    if let (Some(a), Some(b)) = (number_of(fact), expected.as_number()) {
        return a == b;
    }
    match (fact, expected) {
        (Value::Null, Scalar::Null) => true,
        (Value::Bool(a), Scalar::Boolean(b)) => a == b,
        _ => match (text_of(fact), expected.as_text()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use classifier_core::{ClassificationRule, RuleValue};
    use serde_json::json;

    fn compiled(path: &str, operator: Operator, value: RuleValue) -> CompiledRule {
        CompiledRule::compile(
            ClassificationRule::new("test-rule", path, operator, value).unwrap(),
        )
    }

    #[test]
    fn test_eq_numeric_normalization() {
        let rule = compiled("cpus", Operator::Eq, RuleValue::from(4));
        assert!(rule.evaluate(Some(&json!(4))).unwrap());
        assert!(rule.evaluate(Some(&json!(4.0))).unwrap());
        assert!(rule.evaluate(Some(&json!("4"))).unwrap());
        assert!(!rule.evaluate(Some(&json!("5"))).unwrap());

        let rule = compiled("cpus", Operator::Eq, RuleValue::from("4"));
        assert!(rule.evaluate(Some(&json!(4))).unwrap());
    }

    #[test]
    fn test_eq_string_and_bool() {
        let rule = compiled("os.family", Operator::Eq, RuleValue::from("RedHat"));
        assert!(rule.evaluate(Some(&json!("RedHat"))).unwrap());
        assert!(!rule.evaluate(Some(&json!("Debian"))).unwrap());

        let rule = compiled("is_virtual", Operator::Eq, RuleValue::from(true));
        assert!(rule.evaluate(Some(&json!(true))).unwrap());
        assert!(!rule.evaluate(Some(&json!(false))).unwrap());
    }

    #[test]
    fn test_eq_null_only_equals_null() {
        let rule = compiled("gpu", Operator::Eq, RuleValue::Scalar(Scalar::Null));
        assert!(rule.evaluate(Some(&json!(null))).unwrap());
        assert!(!rule.evaluate(Some(&json!(""))).unwrap());
        assert!(!rule.evaluate(Some(&json!(0))).unwrap());
    }

    #[test]
    fn test_eq_structured_fact_never_equal() {
        let rule = compiled("os", Operator::Eq, RuleValue::from("RedHat"));
        assert!(!rule.evaluate(Some(&json!({"family": "RedHat"}))).unwrap());
        assert!(!rule.evaluate(Some(&json!(["RedHat"]))).unwrap());
    }

    #[test]
    fn test_ne() {
        let rule = compiled("os.family", Operator::Ne, RuleValue::from("RedHat"));
        assert!(rule.evaluate(Some(&json!("Debian"))).unwrap());
        assert!(!rule.evaluate(Some(&json!("RedHat"))).unwrap());
        // Absent facts fail every operator except not_exists
        assert!(!rule.evaluate(None).unwrap());
    }

    #[test]
    fn test_numeric_comparisons() {
        let rule = compiled("memory_mb", Operator::Gte, RuleValue::from(8192));
        assert!(rule.evaluate(Some(&json!(8192))).unwrap());
        assert!(rule.evaluate(Some(&json!(16384))).unwrap());
        assert!(!rule.evaluate(Some(&json!(4096))).unwrap());
        assert!(rule.evaluate(Some(&json!("9000"))).unwrap());

        let rule = compiled("load", Operator::Lt, RuleValue::from(1.5));
        assert!(rule.evaluate(Some(&json!(1.0))).unwrap());
        assert!(!rule.evaluate(Some(&json!(2.0))).unwrap());
    }

    #[test]
    fn test_numeric_comparison_errors() {
        let rule = compiled("os.family", Operator::Gt, RuleValue::from(4));
        let err = rule.evaluate(Some(&json!("RedHat"))).unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::NonNumericComparison);

        let rule = compiled("cpus", Operator::Gt, RuleValue::from("not-a-number"));
        let err = rule.evaluate(Some(&json!(4))).unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::NonNumericComparison);

        // Booleans are not numerically coercible
        let rule = compiled("flag", Operator::Gt, RuleValue::from(0));
        let err = rule.evaluate(Some(&json!(true))).unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::NonNumericComparison);
    }

    #[test]
    fn test_numeric_comparison_absent_is_false_not_error() {
        let rule = compiled("memory_mb", Operator::Gte, RuleValue::from(8192));
        assert!(!rule.evaluate(None).unwrap());
    }

    #[test]
    fn test_regex_match() {
        let rule = compiled("kernel", Operator::RegexMatch, RuleValue::from("^Linux"));
        assert!(rule.evaluate(Some(&json!("Linux 6.1"))).unwrap());
        assert!(!rule.evaluate(Some(&json!("Darwin"))).unwrap());
        // Numbers are string-coercible for pattern matching
        let rule = compiled("release", Operator::RegexMatch, RuleValue::from("^9"));
        assert!(rule.evaluate(Some(&json!(9))).unwrap());
        // Structured values are not
        assert!(!rule.evaluate(Some(&json!({"major": 9}))).unwrap());
    }

    #[test]
    fn test_regex_not_match() {
        let rule = compiled("kernel", Operator::RegexNotMatch, RuleValue::from("^Linux"));
        assert!(rule.evaluate(Some(&json!("Darwin"))).unwrap());
        assert!(!rule.evaluate(Some(&json!("Linux 6.1"))).unwrap());
        // Absent fact: false, not true
        assert!(!rule.evaluate(None).unwrap());
    }

    #[test]
    fn test_bad_regex_is_evaluation_error() {
        let rule = compiled("kernel", Operator::RegexMatch, RuleValue::from("([unclosed"));
        let err = rule.evaluate(Some(&json!("Linux"))).unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::BadRegex);
        // Reported every evaluation, not just once
        let err = rule.evaluate(None).unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::BadRegex);
    }

    #[test]
    fn test_membership() {
        let rule = compiled(
            "os.family",
            Operator::In,
            RuleValue::from(vec![
                Scalar::String("RedHat".to_string()),
                Scalar::String("CentOS".to_string()),
            ]),
        );
        assert!(rule.evaluate(Some(&json!("RedHat"))).unwrap());
        assert!(!rule.evaluate(Some(&json!("Debian"))).unwrap());
        assert!(!rule.evaluate(None).unwrap());

        let rule = compiled(
            "os.family",
            Operator::NotIn,
            RuleValue::from(vec![Scalar::String("RedHat".to_string())]),
        );
        assert!(rule.evaluate(Some(&json!("Debian"))).unwrap());
        assert!(!rule.evaluate(Some(&json!("RedHat"))).unwrap());
        assert!(!rule.evaluate(None).unwrap());
    }

    #[test]
    fn test_membership_uses_eq_semantics() {
        let rule = compiled(
            "os.release.major",
            Operator::In,
            RuleValue::from(vec![Scalar::Number(8), Scalar::Number(9)]),
        );
        assert!(rule.evaluate(Some(&json!("9"))).unwrap());
        assert!(!rule.evaluate(Some(&json!("10"))).unwrap());
    }

    #[test]
    fn test_existence() {
        let exists = compiled("gpu", Operator::Exists, RuleValue::default());
        let not_exists = compiled("gpu", Operator::NotExists, RuleValue::default());
        assert!(exists.evaluate(Some(&json!(null))).unwrap());
        assert!(!exists.evaluate(None).unwrap());
        assert!(not_exists.evaluate(None).unwrap());
        assert!(!not_exists.evaluate(Some(&json!("nvidia"))).unwrap());
    }

    #[test]
    fn test_invalid_shape_survives_compile() {
        // Bypass the validating constructor, as deserialized input can.
        let rule = ClassificationRule {
            id: "bad".to_string(),
            fact_path: classifier_core::FactPath::parse("os.family").unwrap(),
            operator: Operator::In,
            value: RuleValue::from("not-a-list"),
        };
        let compiled = CompiledRule::compile(rule);
        let err = compiled.evaluate(Some(&json!("RedHat"))).unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::InvalidRuleShape);
    }
}
