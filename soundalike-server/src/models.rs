//! Domain records flowing through the enrichment pipeline
//!
//! All of these are request-scoped: produced while handling one request and
//! dropped with the response.

/// Canonical track metadata resolved from the primary metadata provider.
///
/// Immutable once resolved; enrichment fields (tempo, tags, preview
/// fallback) are attached to the merged record, never written back here.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedTrack {
    /// Provider-assigned opaque track id
    pub id: String,
    /// Display name
    pub name: String,
    /// All credited artist names, primary artist first
    pub artists: Vec<String>,
    pub album: Option<String>,
    pub artwork_url: Option<String>,
    pub preview_url: Option<String>,
    /// Public track page on the provider
    pub external_url: Option<String>,
}

impl SeedTrack {
    /// The primary (first-credited) artist name
    pub fn primary_artist(&self) -> &str {
        self.artists.first().map(String::as_str).unwrap_or_default()
    }
}

/// One entry of the similarity provider's ranked candidate list.
/// Read-only input to enrichment; the list order is authoritative.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarCandidate {
    pub artist: String,
    pub name: String,
    /// Similarity score in [0, 1] as reported by the provider
    pub match_score: f64,
    pub artwork_url: Option<String>,
    pub external_url: Option<String>,
}

/// Auxiliary attributes from the secondary enrichment provider.
///
/// The default value is the "unavailable" outcome: best-effort fetchers
/// return this type directly and never an error. A tempo of zero never
/// occurs; sub-zero and zero readings are normalized to `None` upstream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackAttributes {
    pub tempo: Option<f64>,
    pub preview_url: Option<String>,
}
