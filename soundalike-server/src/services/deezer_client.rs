//! Deezer API client
//!
//! Secondary enrichment provider: tempo (BPM) and fallback preview audio
//! for an artist/track pair. Requires no credentials. Entirely best-effort:
//! every failure collapses to the all-unavailable attribute value.
//!
//! One query costs two sequential sub-calls under a single gate slot: a
//! search for the track id and preview, then a detail lookup for the BPM.
//! When the search yields nothing, the detail call is skipped.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::models::TrackAttributes;
use crate::services::gate::ProviderGate;
use crate::services::{AttributeProvider, ProviderError};

const SEARCH_URL: &str = "https://api.deezer.com/search";
const TRACK_URL: &str = "https://api.deezer.com/track";

/// Best-effort enrichment gets the shortest per-call timeout.
const CALL_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct DzSearchResponse {
    #[serde(default)]
    data: Vec<DzSearchHit>,
}

#[derive(Debug, Deserialize)]
struct DzSearchHit {
    id: Option<i64>,
    preview: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DzTrack {
    bpm: Option<f64>,
}

/// Zero and sub-zero BPM readings are provider shorthand for "unknown" and
/// must never surface as a value.
fn normalize_tempo(bpm: Option<f64>) -> Option<f64> {
    bpm.filter(|value| *value > 0.0)
}

/// Deezer API client
pub struct DeezerClient {
    http_client: reqwest::Client,
    gate: ProviderGate,
}

impl DeezerClient {
    pub fn new(gate: ProviderGate) -> Result<Self, ProviderError> {
        let http_client = reqwest::Client::builder()
            .timeout(CALL_TIMEOUT)
            .build()
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(Self { http_client, gate })
    }

    async fn fetch_attributes(
        &self,
        artist: &str,
        track: &str,
    ) -> Result<TrackAttributes, ProviderError> {
        let query = format!("artist:\"{}\" track:\"{}\"", artist, track);
        let response = self
            .http_client
            .get(SEARCH_URL)
            .query(&[("q", query.as_str())])
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }

        let body: DzSearchResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        let Some(hit) = body.data.into_iter().next() else {
            return Ok(TrackAttributes::default());
        };

        let preview_url = hit.preview.filter(|url| !url.is_empty());
        let tempo = match hit.id {
            Some(id) => self.fetch_tempo(id).await?,
            None => None,
        };

        Ok(TrackAttributes { tempo, preview_url })
    }

    async fn fetch_tempo(&self, id: i64) -> Result<Option<f64>, ProviderError> {
        let response = self
            .http_client
            .get(format!("{}/{}", TRACK_URL, id))
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }

        let track: DzTrack = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;
        Ok(normalize_tempo(track.bpm))
    }
}

#[async_trait]
impl AttributeProvider for DeezerClient {
    async fn track_attributes(&self, artist: &str, track: &str) -> TrackAttributes {
        let _slot = self.gate.acquire().await;
        match self.fetch_attributes(artist, track).await {
            Ok(attributes) => attributes,
            Err(e) => {
                debug!(artist, track, error = %e, "Deezer lookup degraded to unavailable");
                TrackAttributes::default()
            }
        }
    }
}
