//! Node Groups and Classification Inputs
//!
//! A group is a named classification unit: match rules, a manual pin
//! list, and a configuration payload (classes, parameters, variables).
//! Groups form a single-parent hierarchy through `parent_id`; depth in
//! that hierarchy is the merge precedence key.

use crate::error::ModelError;
use crate::rule::ClassificationRule;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use uuid::Uuid;

/// Group identifier.
pub type GroupId = Uuid;

/// How a group combines its rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum RuleMatchType {
    /// Logical AND over all rules
    #[default]
    All,
    /// Logical OR over all rules
    Any,
}

/// A node group definition.
///
/// Immutable to the engine: the administrative layer creates and edits
/// groups, the engine only reads a snapshot of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeGroup {
    pub id: GroupId,
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<GroupId>,
    #[serde(default)]
    pub environment: Option<String>,
    #[serde(default)]
    pub rule_match_type: RuleMatchType,
    #[serde(default)]
    pub rules: Vec<ClassificationRule>,
    #[serde(default)]
    pub pinned_nodes: BTreeSet<String>,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub parameters: BTreeMap<String, Value>,
    #[serde(default)]
    pub variables: BTreeMap<String, Value>,
}

impl NodeGroup {
    /// Create an empty group with ALL match semantics and no payload.
    pub fn new(id: GroupId, name: impl Into<String>) -> Self {
        NodeGroup {
            id,
            name: name.into(),
            parent_id: None,
            environment: None,
            rule_match_type: RuleMatchType::All,
            rules: Vec::new(),
            pinned_nodes: BTreeSet::new(),
            classes: Vec::new(),
            parameters: BTreeMap::new(),
            variables: BTreeMap::new(),
        }
    }

    /// Set the parent group.
    pub fn with_parent(mut self, parent_id: GroupId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Scope the group to an environment.
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    /// Set the rule combination semantics.
    pub fn with_match_type(mut self, match_type: RuleMatchType) -> Self {
        self.rule_match_type = match_type;
        self
    }

    /// Append a rule.
    pub fn with_rule(mut self, rule: ClassificationRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Pin a node to this group.
    pub fn with_pinned_node(mut self, certname: impl Into<String>) -> Self {
        self.pinned_nodes.insert(certname.into());
        self
    }

    /// Append a class to the payload.
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Set a parameter in the payload.
    pub fn with_parameter(mut self, key: impl Into<String>, value: Value) -> Self {
        self.parameters.insert(key.into(), value);
        self
    }

    /// Set a variable in the payload.
    pub fn with_variable(mut self, key: impl Into<String>, value: Value) -> Self {
        self.variables.insert(key.into(), value);
        self
    }

    /// Whether the named node is pinned to this group.
    pub fn is_pinned(&self, certname: &str) -> bool {
        self.pinned_nodes.contains(certname)
    }

    /// Validate per-group invariants: unique rule ids, unique classes,
    /// well-shaped rule values.
    pub fn validate(&self) -> Result<(), ModelError> {
        let mut rule_ids = HashSet::new();
        for rule in &self.rules {
            if !rule_ids.insert(rule.id.as_str()) {
                return Err(ModelError::DuplicateRuleId(rule.id.clone()));
            }
            rule.validate_shape()?;
        }
        let mut classes = HashSet::new();
        for class in &self.classes {
            if !classes.insert(class.as_str()) {
                return Err(ModelError::DuplicateClass(class.clone()));
            }
        }
        Ok(())
    }
}

/// Classification input: one managed node and its reported facts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub certname: String,
    pub facts: Value,
    #[serde(default)]
    pub environment: Option<String>,
}

impl Node {
    pub fn new(certname: impl Into<String>, facts: Value) -> Self {
        Node {
            certname: certname.into(),
            facts,
            environment: None,
        }
    }

    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }
}
