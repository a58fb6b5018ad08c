//! API Handlers

use axum::{extract::State, response::Json};
use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::error::ApiError;
use crate::models::*;
use crate::AppState;
use classifier_core::Node;
use classifier_engine::{validate_hierarchy, Classifier};

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: "1.0.0".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Readiness check endpoint - confirms service can handle requests
pub async fn ready_check(State(state): State<Arc<AppState>>) -> Json<ReadyResponse> {
    // A classifier with zero groups still answers requests; it is only
    // reported as such.
    let group_count = state.classifier.read().await.group_count();

    Json(ReadyResponse {
        ready: true,
        components: ComponentStatus {
            classifier: if group_count > 0 {
                "ready".to_string()
            } else {
                "ready (empty snapshot)".to_string()
            },
        },
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Classify one node against the current group snapshot
pub async fn classify(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ClassifyRequest>,
) -> Result<Json<ClassifyResponse>, ApiError> {
    tracing::debug!("Classifying node: {}", payload.certname);

    let node = Node {
        certname: payload.certname,
        facts: payload.facts,
        environment: payload.environment,
    };

    let result = state.classifier.read().await.classify(&node);

    state.metrics.total.fetch_add(1, Ordering::Relaxed);
    if result.is_classified() {
        state.metrics.classified.fetch_add(1, Ordering::Relaxed);
    }
    state
        .metrics
        .evaluation_time_ms
        .fetch_add(result.evaluation_time_ms, Ordering::Relaxed);

    Ok(Json(ClassifyResponse {
        request_id: uuid::Uuid::new_v4().to_string(),
        certname: result.certname,
        matched_group_ids: result.matched_group_ids,
        classes: result.classes,
        parameters: result.parameters,
        variables: result.variables,
        conflicts: result.conflicts,
        rule_errors: result.rule_errors,
        evaluated_at: result.evaluated_at,
        evaluation_time_ms: result.evaluation_time_ms,
    }))
}

/// Validate a group hierarchy without installing it
///
/// Used by group-editing workflows to reject cycle-introducing edits
/// synchronously, before anything is persisted.
pub async fn validate_groups(
    Json(payload): Json<GroupsValidateRequest>,
) -> Result<Json<GroupsValidateResponse>, ApiError> {
    let depths =
        validate_hierarchy(&payload.groups).map_err(|e| ApiError::unprocessable(e.to_string()))?;

    Ok(Json(GroupsValidateResponse {
        valid: true,
        group_count: payload.groups.len(),
        depths,
    }))
}

/// Replace the group snapshot
pub async fn replace_groups(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<GroupsValidateRequest>,
) -> Result<Json<GroupsReplaceResponse>, ApiError> {
    let group_count = payload.groups.len();
    let classifier = Classifier::with_config(payload.groups, state.config)
        .map_err(|e| ApiError::unprocessable(e.to_string()))?;

    *state.classifier.write().await = classifier;
    tracing::info!("Group snapshot replaced ({} groups)", group_count);

    Ok(Json(GroupsReplaceResponse {
        group_count,
        loaded_at: chrono::Utc::now().to_rfc3339(),
    }))
}

/// List the current group snapshot
pub async fn list_groups(State(state): State<Arc<AppState>>) -> Json<GroupsResponse> {
    let classifier = state.classifier.read().await;
    let groups = classifier
        .groups()
        .map(|group| GroupSummary {
            id: group.id,
            name: group.name.clone(),
            parent_id: group.parent_id,
            environment: group.environment.clone(),
            depth: classifier.depth_of(&group.id).unwrap_or(0),
            rule_count: group.rules.len(),
            pinned_node_count: group.pinned_nodes.len(),
            class_count: group.classes.len(),
        })
        .collect();

    Json(GroupsResponse { groups })
}

/// Service metrics
pub async fn metrics(State(state): State<Arc<AppState>>) -> Json<MetricsResponse> {
    let total = state.metrics.total.load(Ordering::Relaxed);
    let classified = state.metrics.classified.load(Ordering::Relaxed);
    let evaluation_time_ms = state.metrics.evaluation_time_ms.load(Ordering::Relaxed);

    Json(MetricsResponse {
        total_classifications: total,
        classified,
        unclassified: total - classified,
        avg_evaluation_time_ms: if total > 0 {
            evaluation_time_ms as f64 / total as f64
        } else {
            0.0
        },
    })
}
