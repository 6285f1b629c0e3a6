//! Last.fm API client
//!
//! Similarity provider: load-bearing `track.getsimilar` for the ranked
//! candidate pool, best-effort `track.gettoptags` for descriptive tags.
//! Last.fm publishes a requests-per-second policy, so this client carries
//! the strictest gate.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::models::SimilarCandidate;
use crate::services::gate::ProviderGate;
use crate::services::{ProviderError, SimilarityProvider};

const API_BASE_URL: &str = "https://ws.audioscrobbler.com/2.0/";

/// The similar-tracks call is load-bearing and tolerates a longer timeout
/// than the best-effort tag lookup.
const SIMILAR_TIMEOUT: Duration = Duration::from_secs(15);
const TAGS_TIMEOUT: Duration = Duration::from_secs(10);

/// `track.getsimilar` artist entries are an object in the common case but a
/// bare string in some provider responses; both shapes must parse.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LfmArtist {
    Named { name: String },
    Plain(String),
}

impl LfmArtist {
    fn name(&self) -> &str {
        match self {
            LfmArtist::Named { name } => name,
            LfmArtist::Plain(name) => name,
        }
    }
}

#[derive(Debug, Deserialize)]
struct LfmImage {
    #[serde(rename = "#text", default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct LfmSimilarTrack {
    #[serde(default)]
    name: String,
    artist: Option<LfmArtist>,
    #[serde(rename = "match")]
    match_score: Option<f64>,
    #[serde(default)]
    image: Vec<LfmImage>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LfmSimilarTracks {
    #[serde(default)]
    track: Vec<LfmSimilarTrack>,
}

/// Last.fm reports application errors inside an HTTP 200 envelope.
#[derive(Debug, Deserialize)]
struct GetSimilarResponse {
    similartracks: Option<LfmSimilarTracks>,
    error: Option<i64>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LfmTag {
    name: String,
    #[serde(default)]
    count: i64,
}

#[derive(Debug, Deserialize)]
struct LfmTopTags {
    #[serde(default)]
    tag: Vec<LfmTag>,
}

#[derive(Debug, Deserialize)]
struct GetTopTagsResponse {
    toptags: Option<LfmTopTags>,
}

/// Last.fm "track not found" application error code.
const ERROR_NOT_FOUND: i64 = 6;

/// Map the `track.getsimilar` body to ranked candidates, preserving the
/// provider's order. Entries without a usable artist or name are skipped;
/// the display artwork is the last (largest) non-empty image entry.
fn candidates_from_response(body: GetSimilarResponse) -> Vec<SimilarCandidate> {
    body.similartracks
        .map(|similar| similar.track)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|track| {
            let artist = track
                .artist
                .as_ref()
                .map(LfmArtist::name)
                .unwrap_or_default()
                .to_string();
            if artist.is_empty() || track.name.is_empty() {
                return None;
            }
            Some(SimilarCandidate {
                artist,
                name: track.name,
                match_score: track.match_score.unwrap_or(0.0).clamp(0.0, 1.0),
                artwork_url: track
                    .image
                    .iter()
                    .rev()
                    .find(|image| !image.text.is_empty())
                    .map(|image| image.text.clone()),
                external_url: track.url.filter(|url| !url.is_empty()),
            })
        })
        .collect()
}

/// Keep tags the community actually applied (count > 0), lowercased, up to
/// the configured limit.
fn tags_from_response(body: GetTopTagsResponse, limit: usize) -> Vec<String> {
    body.toptags
        .map(|toptags| toptags.tag)
        .unwrap_or_default()
        .into_iter()
        .filter(|tag| tag.count > 0)
        .take(limit)
        .map(|tag| tag.name.to_lowercase())
        .collect()
}

/// Last.fm API client
pub struct LastfmClient {
    http_client: reqwest::Client,
    gate: ProviderGate,
    api_key: String,
    tag_limit: usize,
}

impl LastfmClient {
    pub fn new(api_key: String, tag_limit: usize, gate: ProviderGate) -> Result<Self, ProviderError> {
        let http_client = reqwest::Client::builder()
            .timeout(SIMILAR_TIMEOUT)
            .build()
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            gate,
            api_key,
            tag_limit,
        })
    }

    async fn fetch_similar(
        &self,
        artist: &str,
        track: &str,
        count: usize,
    ) -> Result<Vec<SimilarCandidate>, ProviderError> {
        let count = count.to_string();
        let response = self
            .http_client
            .get(API_BASE_URL)
            .query(&[
                ("method", "track.getsimilar"),
                ("artist", artist),
                ("track", track),
                ("api_key", self.api_key.as_str()),
                ("format", "json"),
                ("limit", count.as_str()),
            ])
            .timeout(SIMILAR_TIMEOUT)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }

        let body: GetSimilarResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        if let Some(code) = body.error {
            let message = body.message.unwrap_or_else(|| format!("error code {}", code));
            return match code {
                ERROR_NOT_FOUND => Err(ProviderError::NotFound(format!("{} - {}", artist, track))),
                _ => Err(ProviderError::Api(message)),
            };
        }

        Ok(candidates_from_response(body))
    }

    async fn fetch_top_tags(&self, artist: &str, track: &str) -> Result<Vec<String>, ProviderError> {
        let response = self
            .http_client
            .get(API_BASE_URL)
            .query(&[
                ("method", "track.gettoptags"),
                ("artist", artist),
                ("track", track),
                ("api_key", self.api_key.as_str()),
                ("format", "json"),
            ])
            .timeout(TAGS_TIMEOUT)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }

        let body: GetTopTagsResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;
        Ok(tags_from_response(body, self.tag_limit))
    }
}

#[async_trait]
impl SimilarityProvider for LastfmClient {
    async fn similar_tracks(
        &self,
        artist: &str,
        track: &str,
        count: usize,
    ) -> Result<Vec<SimilarCandidate>, ProviderError> {
        let _slot = self.gate.acquire().await;
        debug!(artist, track, count, "Querying Last.fm for similar tracks");
        self.fetch_similar(artist, track, count).await
    }

    async fn top_tags(&self, artist: &str, track: &str) -> Vec<String> {
        let _slot = self.gate.acquire().await;
        match self.fetch_top_tags(artist, track).await {
            Ok(tags) => tags,
            Err(e) => {
                warn!(artist, track, error = %e, "Tag lookup degraded to empty");
                Vec::new()
            }
        }
    }
}
