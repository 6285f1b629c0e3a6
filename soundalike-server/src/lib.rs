//! soundalike-server library interface
//!
//! Exposes the router, state, and service internals for integration
//! testing.

pub mod api;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use std::sync::Arc;

use axum::Router;
use chrono::{DateTime, Utc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::services::enrichment::EnrichmentPipeline;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// The enrichment pipeline over the three provider clients
    pub pipeline: Arc<EnrichmentPipeline>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(pipeline: Arc<EnrichmentPipeline>) -> Self {
        Self {
            pipeline,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // UI route (HTML page)
        .merge(api::ui_routes())
        // API routes
        .merge(api::similar_routes())
        .merge(api::health_routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
