//! Classification Result Types

use classifier_core::GroupId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// What went wrong inside a single rule evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvalErrorKind {
    BadRegex,
    NonNumericComparison,
    InvalidRuleShape,
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalErrorKind::BadRegex => write!(f, "bad_regex"),
            EvalErrorKind::NonNumericComparison => write!(f, "non_numeric_comparison"),
            EvalErrorKind::InvalidRuleShape => write!(f, "invalid_rule_shape"),
        }
    }
}

/// Rule-level evaluation failure, local to one rule in one group.
///
/// Never aborts a classification run: the offending rule counts as
/// non-matching and the failure is surfaced here for operator
/// visibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleEvaluationError {
    pub group_id: GroupId,
    pub rule_id: String,
    pub kind: EvalErrorKind,
    pub detail: String,
}

/// Which payload map a conflict occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictScope {
    Parameters,
    Variables,
}

/// Recorded merge ambiguity: two or more matched groups at the same
/// hierarchy depth set the same key to different values. The merge still
/// picks a deterministic winner; the conflict is informational.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterConflict {
    pub scope: ConflictScope,
    pub key: String,
    /// The groups supplying values at the winning depth, ascending id order.
    pub group_ids: Vec<GroupId>,
    pub chosen_value: Value,
}

/// The effective configuration of one node against one group snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedConfiguration {
    pub certname: String,
    /// Matched groups, ordered by (depth, id).
    pub matched_group_ids: Vec<GroupId>,
    pub classes: BTreeSet<String>,
    pub parameters: BTreeMap<String, Value>,
    pub variables: BTreeMap<String, Value>,
    pub conflicts: Vec<ParameterConflict>,
    pub rule_errors: Vec<RuleEvaluationError>,
    /// Timestamp (RFC-3339)
    pub evaluated_at: String,
    /// Evaluation time in ms
    pub evaluation_time_ms: u64,
}

impl ResolvedConfiguration {
    /// Whether any group matched this node.
    pub fn is_classified(&self) -> bool {
        !self.matched_group_ids.is_empty()
    }

    /// Whether the merge recorded any same-depth disagreement.
    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }
}
