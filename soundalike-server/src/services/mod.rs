//! Provider clients and the enrichment pipeline
//!
//! Each external provider is wrapped by one client module behind the trait
//! seams below. Load-bearing operations return `Result` and abort the
//! request on failure; best-effort operations return their payload type
//! directly, degrading every failure to the "unavailable" value.

pub mod deezer_client;
pub mod enrichment;
pub mod gate;
pub mod lastfm_client;
pub mod spotify_client;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{SeedTrack, SimilarCandidate, TrackAttributes};

/// Errors from load-bearing provider calls.
///
/// Carries enough to distinguish failure classes without leaking provider
/// response bodies to callers.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network-level failure (connect, timeout, transport)
    #[error("network error: {0}")]
    Network(String),

    /// The provider has no record for the query
    #[error("not found: {0}")]
    NotFound(String),

    /// Non-success HTTP status
    #[error("provider returned status {0}")]
    Status(u16),

    /// Provider-reported application error
    #[error("provider error: {0}")]
    Api(String),

    /// Response body did not match the expected shape
    #[error("unexpected response shape: {0}")]
    Parse(String),
}

/// Primary metadata provider: canonical track metadata and text search.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Resolve a track id to canonical metadata. Load-bearing: the whole
    /// request is meaningless without it, so errors propagate.
    async fn track(&self, id: &str) -> Result<SeedTrack, ProviderError>;

    /// Free-text artist/track search returning the first match.
    /// Best-effort: any failure or empty result set is `None`, never an
    /// error.
    async fn search_track(&self, artist: &str, track: &str) -> Option<SeedTrack>;
}

/// Similarity provider: ranked candidates and descriptive tags.
#[async_trait]
pub trait SimilarityProvider: Send + Sync {
    /// Ranked candidate list for a seed. Load-bearing: errors propagate.
    async fn similar_tracks(
        &self,
        artist: &str,
        track: &str,
        count: usize,
    ) -> Result<Vec<SimilarCandidate>, ProviderError>;

    /// Top tags for a track. Best-effort: failures collapse to an empty
    /// list.
    async fn top_tags(&self, artist: &str, track: &str) -> Vec<String>;
}

/// Secondary enrichment provider: tempo and fallback preview audio.
#[async_trait]
pub trait AttributeProvider: Send + Sync {
    /// Auxiliary attributes for an artist/track pair. Best-effort: failures
    /// collapse to the default (all-unavailable) value.
    async fn track_attributes(&self, artist: &str, track: &str) -> TrackAttributes;
}
