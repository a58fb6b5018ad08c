//! Configuration Merge Engine
//!
//! Merges the payloads of all groups matched by a node into one
//! effective configuration. Classes are unioned; parameters and
//! variables are merged with depth precedence: deeper groups overwrite
//! shallower ones. Two groups at the same depth disagreeing on a key is
//! recorded as a conflict, never silently resolved — though the merge
//! still picks a deterministic winner (the last writer in ascending
//! (depth, id) order).

use crate::engine::CompiledGroup;
use crate::result::{ConflictScope, ParameterConflict};
use classifier_core::GroupId;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Merged payload of all matched groups.
#[derive(Debug, Clone, Default)]
pub struct MergedPayload {
    pub classes: BTreeSet<String>,
    pub parameters: BTreeMap<String, Value>,
    pub variables: BTreeMap<String, Value>,
    pub conflicts: Vec<ParameterConflict>,
}

/// Merge matched groups. `matched` must be sorted by ascending
/// (depth, id); the orchestrator guarantees this.
pub fn merge_groups(matched: &[&CompiledGroup]) -> MergedPayload {
    let mut payload = MergedPayload::default();

    for group in matched {
        payload
            .classes
            .extend(group.group.classes.iter().cloned());
    }

    payload.parameters = merge_maps(
        matched,
        ConflictScope::Parameters,
        |g| &g.group.parameters,
        &mut payload.conflicts,
    );
    payload.variables = merge_maps(
        matched,
        ConflictScope::Variables,
        |g| &g.group.variables,
        &mut payload.conflicts,
    );

    payload
}

fn merge_maps<'a>(
    matched: &[&'a CompiledGroup],
    scope: ConflictScope,
    map_of: impl Fn(&'a CompiledGroup) -> &'a BTreeMap<String, Value>,
    conflicts: &mut Vec<ParameterConflict>,
) -> BTreeMap<String, Value> {
    // Last writer per key is at the deepest depth that defines the key;
    // ascending order means a plain insert-overwrite computes it.
    let mut winning_depth: BTreeMap<&str, u32> = BTreeMap::new();
    for &group in matched {
        for key in map_of(group).keys() {
            winning_depth.insert(key, group.depth);
        }
    }

    let mut merged = BTreeMap::new();
    let mut contributors: BTreeMap<&str, Vec<(GroupId, &Value)>> = BTreeMap::new();
    for &group in matched {
        for (key, value) in map_of(group) {
            merged.insert(key.clone(), value.clone());
            if group.depth == winning_depth[key.as_str()] {
                contributors
                    .entry(key)
                    .or_default()
                    .push((group.group.id, value));
            }
        }
    }

    for (key, entries) in contributors {
        // Same-depth writers that agree are not a conflict.
        let disagreement = entries
            .iter()
            .any(|(_, value)| *value != entries[0].1);
        if entries.len() > 1 && disagreement {
            conflicts.push(ParameterConflict {
                scope,
                key: key.to_string(),
                group_ids: entries.iter().map(|(id, _)| *id).collect(),
                chosen_value: merged[key].clone(),
            });
        }
    }

    merged
}
