//! Node Classifier - Classification API Service
//!
//! HTTP facade over the classification engine:
//! - Node classification against the loaded group snapshot
//! - Synchronous hierarchy validation for group-editing workflows
//! - Snapshot replacement
//! - Health, readiness, and metrics endpoints

mod error;
mod handlers;
mod models;

use axum::{
    routing::{get, post, put},
    Router,
};
use classifier_engine::{Classifier, ClassifierConfig};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Classification counters, shared across handlers.
#[derive(Default)]
pub struct Metrics {
    pub total: AtomicU64,
    pub classified: AtomicU64,
    pub evaluation_time_ms: AtomicU64,
}

pub struct AppState {
    pub classifier: RwLock<Classifier>,
    pub config: ClassifierConfig,
    pub metrics: Metrics,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,api_service=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Node Classifier API service");

    let config = ClassifierConfig {
        empty_rules_match_all: std::env::var("EMPTY_RULES_MATCH_ALL").unwrap_or_default() == "true",
    };
    if config.empty_rules_match_all {
        tracing::info!("Vacuous-match enabled: empty ALL groups match every node");
    }

    // Load the initial group snapshot
    let groups_file = std::env::var("GROUPS_FILE")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from);

    let groups = match &groups_file {
        Some(path) => {
            let raw = std::fs::read_to_string(path).map_err(|e| {
                tracing::error!("Failed to read {}: {}", path.display(), e);
                e
            })?;
            let groups: Vec<classifier_core::NodeGroup> = serde_json::from_str(&raw)?;
            tracing::info!("Loaded {} groups from {}", groups.len(), path.display());
            groups
        }
        None => {
            tracing::warn!("GROUPS_FILE not configured; starting with an empty group snapshot.");
            Vec::new()
        }
    };

    // Structural errors in the boot snapshot are fatal: refuse to serve
    // classifications against a defective group set.
    let classifier = Classifier::with_config(groups, config).map_err(|e| {
        tracing::error!("Group snapshot rejected: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
    })?;
    tracing::info!("Classifier initialized with {} groups", classifier.group_count());

    let state = Arc::new(AppState {
        classifier: RwLock::new(classifier),
        config,
        metrics: Metrics::default(),
    });

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = Router::new()
        // Health checks
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::ready_check))
        // API routes
        .route("/api/v1/classify", post(handlers::classify))
        .route("/api/v1/groups", get(handlers::list_groups))
        .route("/api/v1/groups", put(handlers::replace_groups))
        .route("/api/v1/groups/validate", post(handlers::validate_groups))
        // Metrics
        .route("/metrics", get(handlers::metrics))
        // Apply middleware
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(tower::limit::ConcurrencyLimitLayer::new(100))
        .with_state(state);

    // Start server
    let addr: SocketAddr = std::env::var("BIND_ADDR")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 8080)));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        tracing::error!("Failed to bind to {}: {}", addr, e);
        e
    })?;

    axum::serve(listener, app).await.map_err(|e| {
        tracing::error!("Server error: {}", e);
        e
    })?;

    Ok(())
}
