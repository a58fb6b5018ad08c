//! Classifier Engine Error Module

use classifier_core::{GroupId, ModelError};
use thiserror::Error;

/// Group-set-level defects. Fatal to snapshot construction: no node can
/// be classified against a group set that carries one of these.
#[derive(Error, Debug)]
pub enum StructuralError {
    #[error("Cycle detected in group hierarchy: {}", join_ids(.group_ids))]
    CycleDetected { group_ids: Vec<GroupId> },

    #[error("Group {group_id} references unknown parent {parent_id}")]
    UnknownParent {
        group_id: GroupId,
        parent_id: GroupId,
    },

    #[error("Duplicate group id: {0}")]
    DuplicateGroupId(GroupId),

    #[error("Invalid group {group_id}: {source}")]
    InvalidGroup {
        group_id: GroupId,
        source: ModelError,
    },
}

fn join_ids(ids: &[GroupId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl serde::Serialize for StructuralError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_cycle_message_names_ids() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let err = StructuralError::CycleDetected {
            group_ids: vec![a, b],
        };
        let msg = err.to_string();
        assert!(msg.contains(&a.to_string()));
        assert!(msg.contains(&b.to_string()));
    }

    #[test]
    fn test_error_serialization() {
        let err = StructuralError::DuplicateGroupId(Uuid::new_v4());
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("Duplicate group id"));
    }
}
