//! Similar-tracks API handler

use axum::{extract::State, routing::post, Json, Router};
use soundalike_common::types::{SimilarRequest, SimilarResponse};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// POST /api/similar
///
/// Resolve the seed reference, run the enrichment pipeline, and return the
/// enriched seed plus its similar tracks. Error kinds distinguish bad input
/// (400) from upstream failure (502).
pub async fn find_similar(
    State(state): State<AppState>,
    Json(request): Json<SimilarRequest>,
) -> ApiResult<Json<SimilarResponse>> {
    if request.reference.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Track reference must not be empty".to_string(),
        ));
    }

    let response = state
        .pipeline
        .find_similar(&request.reference, request.limit)
        .await?;

    info!(
        seed = %response.seed_track.name,
        results = response.similar_tracks.len(),
        "Similar-tracks request complete"
    );
    Ok(Json(response))
}

/// Build similar-tracks routes
pub fn similar_routes() -> Router<AppState> {
    Router::new().route("/api/similar", post(find_similar))
}
