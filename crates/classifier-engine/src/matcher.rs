//! Group Matcher
//!
//! Decides whether one node belongs to one group. Pure function of
//! (node, compiled group, config): pin-list membership first, then the
//! environment pre-filter, then rule evaluation combined with ALL/ANY
//! semantics.

use crate::engine::{ClassifierConfig, CompiledGroup};
use crate::result::RuleEvaluationError;
use classifier_core::{Node, RuleMatchType};

/// Match verdict for one (node, group) pair, with any rule-level
/// evaluation failures encountered along the way.
#[derive(Debug, Clone)]
pub struct GroupMatch {
    pub matched: bool,
    pub errors: Vec<RuleEvaluationError>,
}

impl GroupMatch {
    fn matched() -> Self {
        GroupMatch {
            matched: true,
            errors: Vec::new(),
        }
    }

    fn unmatched() -> Self {
        GroupMatch {
            matched: false,
            errors: Vec::new(),
        }
    }
}

/// Match a node against a compiled group.
///
/// A pin is an unconditional override: rule evaluation and the
/// environment filter are both skipped, so a pinned group contributes no
/// rule diagnostics. The environment filter is a pre-filter, not a rule:
/// an environment-scoped group never matches a node reporting a
/// different (or no) environment, regardless of its rules.
pub fn match_group(node: &Node, group: &CompiledGroup, config: &ClassifierConfig) -> GroupMatch {
    if group.group.is_pinned(&node.certname) {
        return GroupMatch::matched();
    }

    if let Some(environment) = &group.group.environment {
        if node.environment.as_deref() != Some(environment.as_str()) {
            return GroupMatch::unmatched();
        }
    }

    if group.rules.is_empty() {
        let matched =
            config.empty_rules_match_all && group.group.rule_match_type == RuleMatchType::All;
        return GroupMatch {
            matched,
            errors: Vec::new(),
        };
    }

    // Every rule is evaluated, never short-circuited: diagnostics must
    // not depend on the position of an earlier verdict.
    let mut errors = Vec::new();
    let mut verdicts = Vec::with_capacity(group.rules.len());
    for rule in &group.rules {
        let resolved = rule.rule.fact_path.resolve(&node.facts);
        let verdict = match rule.evaluate(resolved) {
            Ok(verdict) => verdict,
            Err(failure) => {
                // A failed rule counts as non-matching; the failure is
                // surfaced, not swallowed.
                errors.push(RuleEvaluationError {
                    group_id: group.group.id,
                    rule_id: rule.rule.id.clone(),
                    kind: failure.kind,
                    detail: failure.detail,
                });
                false
            }
        };
        verdicts.push(verdict);
    }

    let matched = match group.group.rule_match_type {
        RuleMatchType::All => verdicts.iter().all(|&v| v),
        RuleMatchType::Any => verdicts.iter().any(|&v| v),
    };

    GroupMatch { matched, errors }
}
