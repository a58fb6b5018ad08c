//! API Models

use classifier_core::{GroupId, NodeGroup};
use classifier_engine::{ParameterConflict, RuleEvaluationError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

/// Component status for readiness check
#[derive(Debug, Serialize)]
pub struct ComponentStatus {
    pub classifier: String,
}

/// Readiness check response
#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    pub ready: bool,
    pub components: ComponentStatus,
    pub timestamp: String,
}

/// Classification request (POST)
#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    pub certname: String,
    #[serde(default)]
    pub environment: Option<String>,
    pub facts: Value,
}

/// Classification response
#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    pub request_id: String,
    pub certname: String,
    pub matched_group_ids: Vec<GroupId>,
    pub classes: BTreeSet<String>,
    pub parameters: BTreeMap<String, Value>,
    pub variables: BTreeMap<String, Value>,
    pub conflicts: Vec<ParameterConflict>,
    pub rule_errors: Vec<RuleEvaluationError>,
    pub evaluated_at: String,
    pub evaluation_time_ms: u64,
}

/// Hierarchy validation request
#[derive(Debug, Deserialize)]
pub struct GroupsValidateRequest {
    pub groups: Vec<NodeGroup>,
}

/// Hierarchy validation response
#[derive(Debug, Serialize)]
pub struct GroupsValidateResponse {
    pub valid: bool,
    pub group_count: usize,
    pub depths: BTreeMap<GroupId, u32>,
}

/// Snapshot replacement response
#[derive(Debug, Serialize)]
pub struct GroupsReplaceResponse {
    pub group_count: usize,
    pub loaded_at: String,
}

/// One group in the snapshot listing
#[derive(Debug, Serialize)]
pub struct GroupSummary {
    pub id: GroupId,
    pub name: String,
    pub parent_id: Option<GroupId>,
    pub environment: Option<String>,
    pub depth: u32,
    pub rule_count: usize,
    pub pinned_node_count: usize,
    pub class_count: usize,
}

/// Snapshot listing response
#[derive(Debug, Serialize)]
pub struct GroupsResponse {
    pub groups: Vec<GroupSummary>,
}

/// Metrics response
#[derive(Debug, Serialize)]
pub struct MetricsResponse {
    pub total_classifications: u64,
    pub classified: u64,
    pub unclassified: u64,
    pub avg_evaluation_time_ms: f64,
}
