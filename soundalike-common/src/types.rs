//! Shared API request/response types
//!
//! Wire types for the similar-tracks endpoint. Everything here is
//! request-scoped: built while handling one request and discarded with the
//! response.

use serde::{Deserialize, Serialize};

fn default_limit() -> usize {
    10
}

/// POST /api/similar request body
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimilarRequest {
    /// Spotify track URL, `spotify:track:` URI, or raw track id
    pub reference: String,

    /// Number of similar tracks to return (clamped server-side)
    #[serde(default = "default_limit")]
    pub limit: usize,
}

/// One fully merged track record: seed or candidate.
///
/// `name` and `artists` are always populated, even when the metadata
/// provider had no match for a candidate; every other field degrades
/// independently to absent when its provider was unavailable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedTrack {
    /// Display name of the track
    pub name: String,

    /// All credited artist names, primary artist first
    pub artists: Vec<String>,

    /// Album name, when the metadata provider resolved one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,

    /// Artwork image URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artwork_url: Option<String>,

    /// Short preview-audio URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,

    /// Public page for the track on whichever provider supplied the record
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,

    /// Similarity score in [0, 1]; absent for the seed itself
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_score: Option<f64>,

    /// Tempo in BPM; never zero, absent when the provider had no usable value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tempo: Option<f64>,

    /// Descriptive tags, most popular first; may be empty
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// POST /api/similar response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarResponse {
    /// The resolved and enriched seed track
    pub seed_track: EnrichedTrack,

    /// Enriched candidates in the similarity provider's original order
    pub similar_tracks: Vec<EnrichedTrack>,
}
