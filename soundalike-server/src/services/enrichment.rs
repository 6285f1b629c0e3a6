//! Concurrent multi-source enrichment pipeline
//!
//! The core of the service. One call resolves the seed, retrieves the
//! ranked candidate pool, fans best-effort enrichment out across providers
//! and candidates, merges each candidate's results once they have all
//! settled, and assembles the final response.
//!
//! Failure semantics: seed resolution and candidate retrieval are
//! load-bearing and abort the request; every other fetch degrades to an
//! absent field and never drops a candidate.

use std::sync::Arc;

use futures::future::join_all;
use soundalike_common::types::{EnrichedTrack, SimilarResponse};
use soundalike_common::{Error, Result};
use tracing::{debug, info, warn};

use crate::models::{SeedTrack, SimilarCandidate, TrackAttributes};
use crate::services::spotify_client::extract_track_id;
use crate::services::{AttributeProvider, MetadataProvider, SimilarityProvider};

/// Pipeline tunables. Knobs, not constants: the defaults live in the
/// configuration layer.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Candidates requested from the similarity provider; larger than any
    /// user-visible result count so limiting has a pool to draw from
    pub overfetch_count: usize,
    /// Hard ceiling on the user-requested result count
    pub max_results: usize,
}

/// The enrichment pipeline over the three provider seams.
///
/// Holds no request state; one instance serves the whole process. The only
/// shared mutable state behind it is the per-provider gates inside the
/// clients.
pub struct EnrichmentPipeline {
    metadata: Arc<dyn MetadataProvider>,
    similarity: Arc<dyn SimilarityProvider>,
    attributes: Arc<dyn AttributeProvider>,
    config: PipelineConfig,
}

impl EnrichmentPipeline {
    pub fn new(
        metadata: Arc<dyn MetadataProvider>,
        similarity: Arc<dyn SimilarityProvider>,
        attributes: Arc<dyn AttributeProvider>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            metadata,
            similarity,
            attributes,
            config,
        }
    }

    /// Full seed → enriched-similar-tracks flow.
    pub async fn find_similar(&self, reference: &str, limit: usize) -> Result<SimilarResponse> {
        let track_id = extract_track_id(reference)?;
        let limit = limit.clamp(1, self.config.max_results);

        let seed = self.metadata.track(&track_id).await.map_err(|e| {
            warn!(track_id = %track_id, error = %e, "Seed lookup failed");
            Error::SeedLookup(e.to_string())
        })?;
        info!(track = %seed.name, artist = %seed.primary_artist(), "Resolved seed track");

        // Candidate retrieval and seed-side enrichment share no data, so
        // they run together; both must settle before the fan-out begins.
        let (candidates, seed_record) = tokio::join!(
            self.similarity.similar_tracks(
                seed.primary_artist(),
                &seed.name,
                self.config.overfetch_count,
            ),
            self.enrich_seed(&seed),
        );
        let candidates = candidates.map_err(|e| {
            warn!(error = %e, "Similarity lookup failed");
            Error::SimilarityLookup(e.to_string())
        })?;
        debug!(count = candidates.len(), "Retrieved candidate pool");

        // Fan out across the whole pool; concurrency is bounded only by
        // the per-provider gates.
        let enriched = join_all(
            candidates
                .iter()
                .map(|candidate| self.enrich_candidate(candidate)),
        )
        .await;

        Ok(assemble(seed_record, enriched, limit))
    }

    /// Seed-side enrichment: tags and auxiliary attributes, concurrently.
    async fn enrich_seed(&self, seed: &SeedTrack) -> EnrichedTrack {
        let (attributes, tags) = tokio::join!(
            self.attributes
                .track_attributes(seed.primary_artist(), &seed.name),
            self.similarity.top_tags(seed.primary_artist(), &seed.name),
        );

        let base = EnrichedTrack {
            name: seed.name.clone(),
            artists: seed.artists.clone(),
            album: seed.album.clone(),
            artwork_url: seed.artwork_url.clone(),
            preview_url: seed.preview_url.clone(),
            external_url: seed.external_url.clone(),
            match_score: None,
            tempo: None,
            tags: Vec::new(),
        };
        attach_enrichment(base, attributes, tags)
    }

    /// One candidate's enrichment. All three best-effort fetches settle
    /// before the merge; any of them failing costs only its own fields.
    async fn enrich_candidate(&self, candidate: &SimilarCandidate) -> EnrichedTrack {
        let (matched, attributes, tags) = tokio::join!(
            self.metadata.search_track(&candidate.artist, &candidate.name),
            self.attributes
                .track_attributes(&candidate.artist, &candidate.name),
            self.similarity.top_tags(&candidate.artist, &candidate.name),
        );

        let base = match matched {
            Some(found) => matched_record(found, candidate),
            None => fallback_record(candidate),
        };
        attach_enrichment(base, attributes, tags)
    }
}

/// Base record from a confirmed metadata match, carrying the candidate's
/// similarity score.
fn matched_record(found: SeedTrack, candidate: &SimilarCandidate) -> EnrichedTrack {
    EnrichedTrack {
        name: found.name,
        artists: found.artists,
        album: found.album,
        artwork_url: found.artwork_url,
        preview_url: found.preview_url,
        external_url: found.external_url,
        match_score: Some(candidate.match_score),
        tempo: None,
        tags: Vec::new(),
    }
}

/// Candidates are never dropped: when metadata search misses, the record is
/// synthesized from the similarity provider's own data.
fn fallback_record(candidate: &SimilarCandidate) -> EnrichedTrack {
    EnrichedTrack {
        name: candidate.name.clone(),
        artists: vec![candidate.artist.clone()],
        album: None,
        artwork_url: candidate.artwork_url.clone(),
        preview_url: None,
        external_url: candidate.external_url.clone(),
        match_score: Some(candidate.match_score),
        tempo: None,
        tags: Vec::new(),
    }
}

/// Merge tail shared by seed and candidates: preview fallback, tempo, tags.
fn attach_enrichment(
    mut record: EnrichedTrack,
    attributes: TrackAttributes,
    tags: Vec<String>,
) -> EnrichedTrack {
    if record.preview_url.is_none() {
        record.preview_url = attributes.preview_url;
    }
    record.tempo = attributes.tempo;
    record.tags = tags;
    record
}

/// The similarity provider's ranking is authoritative: truncate, never
/// re-sort.
fn assemble(
    seed_track: EnrichedTrack,
    mut similar_tracks: Vec<EnrichedTrack>,
    limit: usize,
) -> SimilarResponse {
    similar_tracks.truncate(limit);
    SimilarResponse {
        seed_track,
        similar_tracks,
    }
}
