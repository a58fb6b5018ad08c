//! Group Hierarchy Resolver
//!
//! Groups form a forest through `parent_id` edges. Validation computes
//! every group's depth (roots are depth 0) and rejects duplicate ids,
//! dangling parents, and cycles. Depth is the precedence key of the
//! merge engine, so validation must succeed before any matching or
//! merging happens; the orchestrator runs it once per snapshot.

use crate::error::StructuralError;
use classifier_core::{GroupId, NodeGroup};
use std::collections::BTreeMap;

/// Depth of every group, keyed by id.
pub type DepthMap = BTreeMap<GroupId, u32>;

/// Validate the hierarchy of a group set and compute depths.
///
/// Fails fast on the first structural defect. Cycle errors name every
/// group id on the cycle, sorted, so the group-editing workflow can
/// point at all offending groups at once.
pub fn validate_hierarchy(groups: &[NodeGroup]) -> Result<DepthMap, StructuralError> {
    let mut parents: BTreeMap<GroupId, Option<GroupId>> = BTreeMap::new();
    for group in groups {
        if parents.insert(group.id, group.parent_id).is_some() {
            return Err(StructuralError::DuplicateGroupId(group.id));
        }
    }

    let mut depths: DepthMap = BTreeMap::new();
    for &id in parents.keys() {
        if depths.contains_key(&id) {
            continue;
        }

        // Walk ancestors until a known depth or a root, collecting the
        // unresolved chain along the way.
        let mut chain: Vec<GroupId> = Vec::new();
        let mut current = id;
        let base: i64 = loop {
            if let Some(&depth) = depths.get(&current) {
                break depth as i64;
            }
            if chain.contains(&current) {
                let start = chain
                    .iter()
                    .position(|&g| g == current)
                    .expect("current was just found in chain");
                let mut group_ids: Vec<GroupId> = chain[start..].to_vec();
                group_ids.sort();
                return Err(StructuralError::CycleDetected { group_ids });
            }
            chain.push(current);
            match parents.get(&current) {
                None => {
                    // `current` was reached as someone's parent but is not
                    // in the group set; the child is the previous chain
                    // entry.
                    return Err(StructuralError::UnknownParent {
                        group_id: chain[chain.len() - 2],
                        parent_id: current,
                    });
                }
                Some(None) => break -1,
                Some(Some(parent)) => current = *parent,
            }
        };

        for (offset, group_id) in chain.iter().rev().enumerate() {
            depths.insert(*group_id, (base + 1 + offset as i64) as u32);
        }
    }

    Ok(depths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn group(id: GroupId, parent: Option<GroupId>) -> NodeGroup {
        let mut g = NodeGroup::new(id, format!("group-{}", id));
        g.parent_id = parent;
        g
    }

    #[test]
    fn test_single_root_depths() {
        let root = Uuid::new_v4();
        let child = Uuid::new_v4();
        let grandchild = Uuid::new_v4();
        let groups = vec![
            group(root, None),
            group(child, Some(root)),
            group(grandchild, Some(child)),
        ];
        let depths = validate_hierarchy(&groups).unwrap();
        assert_eq!(depths[&root], 0);
        assert_eq!(depths[&child], 1);
        assert_eq!(depths[&grandchild], 2);
    }

    #[test]
    fn test_forest_of_roots() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let b_child = Uuid::new_v4();
        let groups = vec![group(a, None), group(b, None), group(b_child, Some(b))];
        let depths = validate_hierarchy(&groups).unwrap();
        assert_eq!(depths[&a], 0);
        assert_eq!(depths[&b], 0);
        assert_eq!(depths[&b_child], 1);
    }

    #[test]
    fn test_two_node_cycle_rejected() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let groups = vec![group(a, Some(b)), group(b, Some(a))];
        match validate_hierarchy(&groups) {
            Err(StructuralError::CycleDetected { group_ids }) => {
                let mut expected = vec![a, b];
                expected.sort();
                assert_eq!(group_ids, expected);
            }
            other => panic!("expected cycle error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_self_cycle_rejected() {
        let a = Uuid::new_v4();
        let groups = vec![group(a, Some(a))];
        match validate_hierarchy(&groups) {
            Err(StructuralError::CycleDetected { group_ids }) => {
                assert_eq!(group_ids, vec![a]);
            }
            other => panic!("expected cycle error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_cycle_names_only_cycle_members() {
        // A straight chain hanging off a cycle: the chain members are not
        // part of the reported cycle.
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let hanger = Uuid::new_v4();
        let groups = vec![group(a, Some(b)), group(b, Some(a)), group(hanger, Some(a))];
        match validate_hierarchy(&groups) {
            Err(StructuralError::CycleDetected { group_ids }) => {
                assert_eq!(group_ids.len(), 2);
                assert!(!group_ids.contains(&hanger));
            }
            other => panic!("expected cycle error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_unknown_parent_rejected() {
        let a = Uuid::new_v4();
        let ghost = Uuid::new_v4();
        let groups = vec![group(a, Some(ghost))];
        match validate_hierarchy(&groups) {
            Err(StructuralError::UnknownParent {
                group_id,
                parent_id,
            }) => {
                assert_eq!(group_id, a);
                assert_eq!(parent_id, ghost);
            }
            other => panic!("expected unknown-parent error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_duplicate_group_id_rejected() {
        let a = Uuid::new_v4();
        let groups = vec![group(a, None), group(a, None)];
        assert!(matches!(
            validate_hierarchy(&groups),
            Err(StructuralError::DuplicateGroupId(id)) if id == a
        ));
    }

    #[test]
    fn test_empty_group_set() {
        let depths = validate_hierarchy(&[]).unwrap();
        assert!(depths.is_empty());
    }
}
