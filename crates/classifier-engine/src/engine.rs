//! Classification Orchestrator
//!
//! `Classifier` owns one validated, compiled group snapshot and answers
//! classification queries against it. Construction validates the
//! hierarchy (fail fast: a cyclic group set refuses every node) and
//! compiles every rule once, so `classify` itself is total: per-rule
//! defects degrade to diagnostics, never to an error.
//!
//! The classifier is immutable after construction and holds no interior
//! mutability: classifying many nodes concurrently against the same
//! snapshot needs no synchronization. Snapshot changes are modeled by
//! building a new `Classifier`.

use crate::error::StructuralError;
use crate::hierarchy::{validate_hierarchy, DepthMap};
use crate::matcher::match_group;
use crate::merge::merge_groups;
use crate::result::ResolvedConfiguration;
use crate::rules::CompiledRule;
use classifier_core::{GroupId, Node, NodeGroup};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, info};

/// Engine behavior toggles.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassifierConfig {
    /// Whether a group with zero rules and ALL semantics matches every
    /// node (vacuous truth). Off by default: an empty rule list matches
    /// nothing, and such groups only gather nodes through pins.
    pub empty_rules_match_all: bool,
}

/// A group with its hierarchy depth and pre-compiled rules.
#[derive(Debug, Clone)]
pub struct CompiledGroup {
    pub group: NodeGroup,
    pub depth: u32,
    pub rules: Vec<CompiledRule>,
}

impl CompiledGroup {
    pub fn compile(group: NodeGroup, depth: u32) -> Self {
        let rules = group
            .rules
            .iter()
            .cloned()
            .map(CompiledRule::compile)
            .collect();
        CompiledGroup {
            group,
            depth,
            rules,
        }
    }
}

/// Classification engine over one immutable group snapshot.
#[derive(Debug)]
pub struct Classifier {
    groups: BTreeMap<GroupId, CompiledGroup>,
    config: ClassifierConfig,
}

impl Classifier {
    /// Build a classifier from a group snapshot with default config.
    pub fn new(groups: Vec<NodeGroup>) -> Result<Self, StructuralError> {
        Self::with_config(groups, ClassifierConfig::default())
    }

    /// Build a classifier from a group snapshot.
    ///
    /// Validates the hierarchy and per-group invariants; a structural
    /// defect rejects the whole snapshot.
    pub fn with_config(
        groups: Vec<NodeGroup>,
        config: ClassifierConfig,
    ) -> Result<Self, StructuralError> {
        let depths = validate_hierarchy(&groups)?;

        for group in &groups {
            group
                .validate()
                .map_err(|source| StructuralError::InvalidGroup {
                    group_id: group.id,
                    source,
                })?;
        }

        let groups: BTreeMap<GroupId, CompiledGroup> = groups
            .into_iter()
            .map(|group| {
                let depth = depths[&group.id];
                (group.id, CompiledGroup::compile(group, depth))
            })
            .collect();

        info!("Classifier built with {} groups", groups.len());
        Ok(Classifier { groups, config })
    }

    /// Classify one node: which groups apply, and what is the node's
    /// merged effective configuration.
    ///
    /// Total and deterministic for a given (node, snapshot) pair.
    pub fn classify(&self, node: &Node) -> ResolvedConfiguration {
        let start = Instant::now();
        debug!("Classifying node {}", node.certname);

        let mut matched: Vec<&CompiledGroup> = Vec::new();
        let mut rule_errors = Vec::new();
        for group in self.groups.values() {
            let verdict = match_group(node, group, &self.config);
            rule_errors.extend(verdict.errors);
            if verdict.matched {
                matched.push(group);
            }
        }

        matched.sort_by(|a, b| (a.depth, a.group.id).cmp(&(b.depth, b.group.id)));
        let payload = merge_groups(&matched);

        let evaluation_time_ms = start.elapsed().as_millis() as u64;
        info!(
            "Node {} matched {}/{} groups ({}ms)",
            node.certname,
            matched.len(),
            self.groups.len(),
            evaluation_time_ms
        );

        ResolvedConfiguration {
            certname: node.certname.clone(),
            matched_group_ids: matched.iter().map(|g| g.group.id).collect(),
            classes: payload.classes,
            parameters: payload.parameters,
            variables: payload.variables,
            conflicts: payload.conflicts,
            rule_errors,
            evaluated_at: chrono::Utc::now().to_rfc3339(),
            evaluation_time_ms,
        }
    }

    /// Number of groups in the snapshot.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Look up a group by id.
    pub fn group(&self, id: &GroupId) -> Option<&NodeGroup> {
        self.groups.get(id).map(|g| &g.group)
    }

    /// Hierarchy depth of a group.
    pub fn depth_of(&self, id: &GroupId) -> Option<u32> {
        self.groups.get(id).map(|g| g.depth)
    }

    /// Iterate the snapshot's groups in id order.
    pub fn groups(&self) -> impl Iterator<Item = &NodeGroup> {
        self.groups.values().map(|g| &g.group)
    }

    /// Depths of every group, keyed by id.
    pub fn depths(&self) -> DepthMap {
        self.groups.iter().map(|(id, g)| (*id, g.depth)).collect()
    }
}

/// One-shot classification: validate the snapshot, compile it, classify.
///
/// A cyclic or otherwise defective group set fails the whole run before
/// any matching is attempted. Callers classifying many nodes against the
/// same snapshot should build a [`Classifier`] once and reuse it.
pub fn classify(node: &Node, groups: Vec<NodeGroup>) -> Result<ResolvedConfiguration, StructuralError> {
    Ok(Classifier::new(groups)?.classify(node))
}
