//! Integration tests for soundalike-server API endpoints
//!
//! Runs the real router against stub provider implementations, covering:
//! - Health endpoint
//! - Similar-tracks happy path (matched + fallback candidates)
//! - Error mapping: invalid reference (400) vs upstream failure (502)
//! - Web UI page

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot` method

use soundalike_server::models::{SeedTrack, SimilarCandidate, TrackAttributes};
use soundalike_server::services::enrichment::{EnrichmentPipeline, PipelineConfig};
use soundalike_server::services::{
    AttributeProvider, MetadataProvider, ProviderError, SimilarityProvider,
};
use soundalike_server::{build_router, AppState};

const SEED_REF: &str = "spotify:track:4uLU6hMCjMI75M1A2tKUQC";

struct StubMetadata {
    seed: Option<SeedTrack>,
    matches: HashMap<String, SeedTrack>,
}

#[async_trait]
impl MetadataProvider for StubMetadata {
    async fn track(&self, id: &str) -> Result<SeedTrack, ProviderError> {
        self.seed
            .clone()
            .ok_or_else(|| ProviderError::NotFound(id.to_string()))
    }

    async fn search_track(&self, _artist: &str, track: &str) -> Option<SeedTrack> {
        self.matches.get(track).cloned()
    }
}

struct StubSimilarity {
    candidates: Result<Vec<SimilarCandidate>, &'static str>,
}

#[async_trait]
impl SimilarityProvider for StubSimilarity {
    async fn similar_tracks(
        &self,
        _artist: &str,
        _track: &str,
        count: usize,
    ) -> Result<Vec<SimilarCandidate>, ProviderError> {
        match &self.candidates {
            Ok(candidates) => {
                let mut pool = candidates.clone();
                pool.truncate(count);
                Ok(pool)
            }
            Err(message) => Err(ProviderError::Network((*message).to_string())),
        }
    }

    async fn top_tags(&self, _artist: &str, track: &str) -> Vec<String> {
        if track == "Matched Song" {
            vec!["indie".to_string(), "electronic".to_string()]
        } else {
            Vec::new()
        }
    }
}

struct StubAttributes;

#[async_trait]
impl AttributeProvider for StubAttributes {
    async fn track_attributes(&self, _artist: &str, track: &str) -> TrackAttributes {
        match track {
            "Matched Song" => TrackAttributes {
                tempo: Some(124.0),
                preview_url: Some("https://p/deezer".to_string()),
            },
            "Seed Song" => TrackAttributes {
                tempo: Some(113.0),
                preview_url: Some("https://p/deezer-seed".to_string()),
            },
            _ => TrackAttributes::default(),
        }
    }
}

fn seed() -> SeedTrack {
    SeedTrack {
        id: "4uLU6hMCjMI75M1A2tKUQC".to_string(),
        name: "Seed Song".to_string(),
        artists: vec!["Seed Artist".to_string()],
        album: Some("Seed Album".to_string()),
        artwork_url: Some("https://img/seed".to_string()),
        preview_url: Some("https://p/seed".to_string()),
        external_url: Some("https://open.spotify.com/track/seed".to_string()),
    }
}

fn candidate(artist: &str, name: &str, score: f64) -> SimilarCandidate {
    SimilarCandidate {
        artist: artist.to_string(),
        name: name.to_string(),
        match_score: score,
        artwork_url: None,
        external_url: None,
    }
}

/// Test helper: app with stub providers behind the real pipeline
fn setup_app(metadata: StubMetadata, similarity: StubSimilarity) -> axum::Router {
    let pipeline = EnrichmentPipeline::new(
        Arc::new(metadata),
        Arc::new(similarity),
        Arc::new(StubAttributes),
        PipelineConfig {
            overfetch_count: 50,
            max_results: 50,
        },
    );
    build_router(AppState::new(Arc::new(pipeline)))
}

fn default_app() -> axum::Router {
    let mut matches = HashMap::new();
    matches.insert(
        "Matched Song".to_string(),
        SeedTrack {
            id: "m1".to_string(),
            name: "Matched Song".to_string(),
            artists: vec!["Matched Artist".to_string()],
            album: Some("Matched Album".to_string()),
            artwork_url: Some("https://img/matched".to_string()),
            preview_url: None,
            external_url: Some("https://open.spotify.com/track/m1".to_string()),
        },
    );

    setup_app(
        StubMetadata {
            seed: Some(seed()),
            matches,
        },
        StubSimilarity {
            candidates: Ok(vec![
                candidate("Matched Artist", "Matched Song", 0.95),
                candidate("Unknown Artist", "Unknown Song", 0.60),
            ]),
        },
    )
}

/// Test helper: POST request with JSON body
fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Test helper: extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

// =============================================================================
// Health Endpoint
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = default_app();

    let request = Request::builder()
        .method("GET")
        .uri("/api/health")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "soundalike-server");
    assert!(body["version"].is_string());
    assert!(body["uptime_seconds"].is_number());
}

// =============================================================================
// Similar Tracks
// =============================================================================

#[tokio::test]
async fn test_similar_happy_path() {
    let app = default_app();

    let request = post_json("/api/similar", json!({"reference": SEED_REF, "limit": 10}));
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["seed_track"]["name"], "Seed Song");
    assert_eq!(body["seed_track"]["artists"][0], "Seed Artist");
    // Seed already has a preview; the enrichment fallback must not
    // overwrite it, while tempo still attaches.
    assert_eq!(body["seed_track"]["preview_url"], "https://p/seed");
    assert_eq!(body["seed_track"]["tempo"], 113.0);

    let similar = body["similar_tracks"].as_array().unwrap();
    assert_eq!(similar.len(), 2);

    // Matched candidate: metadata-provider record plus enrichment.
    assert_eq!(similar[0]["name"], "Matched Song");
    assert_eq!(similar[0]["album"], "Matched Album");
    assert_eq!(similar[0]["match_score"], 0.95);
    assert_eq!(similar[0]["tempo"], 124.0);
    assert_eq!(similar[0]["preview_url"], "https://p/deezer");
    assert_eq!(similar[0]["tags"][0], "indie");

    // Missed candidate: fallback record from similarity data alone.
    assert_eq!(similar[1]["name"], "Unknown Song");
    assert_eq!(similar[1]["artists"][0], "Unknown Artist");
    assert_eq!(similar[1]["match_score"], 0.6);
    assert!(similar[1].get("album").is_none());
    assert!(similar[1].get("tempo").is_none());
}

#[tokio::test]
async fn test_similar_respects_limit() {
    let candidates: Vec<_> = (0..30)
        .map(|i| candidate("A", &format!("T{}", i), 0.5))
        .collect();
    let app = setup_app(
        StubMetadata {
            seed: Some(seed()),
            matches: HashMap::new(),
        },
        StubSimilarity {
            candidates: Ok(candidates),
        },
    );

    let request = post_json("/api/similar", json!({"reference": SEED_REF, "limit": 5}));
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["similar_tracks"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_invalid_reference_returns_400() {
    let app = default_app();

    let request = post_json(
        "/api/similar",
        json!({"reference": "not-a-valid-id!!", "limit": 10}),
    );
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_empty_reference_returns_400() {
    let app = default_app();

    let request = post_json("/api/similar", json!({"reference": "   "}));
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_seed_lookup_failure_returns_502() {
    let app = setup_app(
        StubMetadata {
            seed: None,
            matches: HashMap::new(),
        },
        StubSimilarity {
            candidates: Ok(Vec::new()),
        },
    );

    let request = post_json("/api/similar", json!({"reference": SEED_REF}));
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "UPSTREAM_FAILURE");
}

#[tokio::test]
async fn test_similarity_failure_returns_502() {
    let app = setup_app(
        StubMetadata {
            seed: Some(seed()),
            matches: HashMap::new(),
        },
        StubSimilarity {
            candidates: Err("simulated timeout"),
        },
    );

    let request = post_json("/api/similar", json!({"reference": SEED_REF}));
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "UPSTREAM_FAILURE");
    // Provider internals are not leaked verbatim as the error code.
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .starts_with("Similar tracks lookup failed"));
}

// =============================================================================
// Web UI
// =============================================================================

#[tokio::test]
async fn test_ui_page_serves_html() {
    let app = default_app();

    let request = Request::builder()
        .method("GET")
        .uri("/")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let page = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(page.contains("<!DOCTYPE html>"));
    assert!(page.contains("soundalike"));
}
