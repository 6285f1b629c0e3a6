//! Spotify Web API client
//!
//! Primary metadata provider: load-bearing track lookup for seed
//! resolution, best-effort free-text search for candidate matching.
//! Authenticates with the client-credentials flow; the bearer token is
//! cached in-process and refreshed shortly before the provider-reported
//! expiry.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Deserialize;
use soundalike_common::Error;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::models::SeedTrack;
use crate::services::gate::ProviderGate;
use crate::services::{MetadataProvider, ProviderError};

const ACCOUNTS_URL: &str = "https://accounts.spotify.com/api/token";
const API_BASE_URL: &str = "https://api.spotify.com/v1";

/// Seed resolution is fatal to the whole request, so this adapter tolerates
/// a longer per-call timeout than the best-effort ones.
const CALL_TIMEOUT: Duration = Duration::from_secs(15);

/// Refresh the cached token this long before its reported expiry.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

const TRACK_URL_MARKER: &str = "open.spotify.com/track/";
const TRACK_URI_MARKER: &str = "spotify:track:";
const RAW_ID_LEN: usize = 22;

/// Extract the track id from a share URL, a `spotify:track:` URI, or a raw
/// 22-character alphanumeric id. Fails before any network call when none of
/// the shapes match.
pub fn extract_track_id(reference: &str) -> Result<String, Error> {
    let reference = reference.trim();

    for marker in [TRACK_URL_MARKER, TRACK_URI_MARKER] {
        if let Some(position) = reference.find(marker) {
            let id: String = reference[position + marker.len()..]
                .chars()
                .take_while(char::is_ascii_alphanumeric)
                .collect();
            if !id.is_empty() {
                return Ok(id);
            }
        }
    }

    if reference.len() == RAW_ID_LEN && reference.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Ok(reference.to_string());
    }

    Err(Error::InvalidTrackReference(reference.to_string()))
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct SpTrack {
    id: String,
    name: String,
    #[serde(default)]
    artists: Vec<SpArtist>,
    album: Option<SpAlbum>,
    preview_url: Option<String>,
    #[serde(default)]
    external_urls: SpExternalUrls,
}

#[derive(Debug, Deserialize)]
struct SpArtist {
    name: String,
}

#[derive(Debug, Deserialize)]
struct SpAlbum {
    name: String,
    #[serde(default)]
    images: Vec<SpImage>,
}

#[derive(Debug, Deserialize)]
struct SpImage {
    url: String,
}

#[derive(Debug, Default, Deserialize)]
struct SpExternalUrls {
    spotify: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SpSearchResponse {
    tracks: Option<SpTrackPage>,
}

#[derive(Debug, Deserialize)]
struct SpTrackPage {
    #[serde(default)]
    items: Vec<SpTrack>,
}

/// Map a provider track payload to the domain record. Image lists arrive
/// largest-first; the first entry is the display artwork.
fn seed_from_track(track: SpTrack) -> SeedTrack {
    let (album, artwork_url) = match track.album {
        Some(album) => {
            let artwork = album.images.first().map(|image| image.url.clone());
            let name = if album.name.is_empty() { None } else { Some(album.name) };
            (name, artwork)
        }
        None => (None, None),
    };

    SeedTrack {
        id: track.id,
        name: track.name,
        artists: track.artists.into_iter().map(|artist| artist.name).collect(),
        album,
        artwork_url,
        preview_url: track.preview_url.filter(|url| !url.is_empty()),
        external_url: track.external_urls.spotify.filter(|url| !url.is_empty()),
    }
}

/// First search hit, if the result page has one.
fn first_match(response: SpSearchResponse) -> Option<SpTrack> {
    response
        .tracks
        .map(|page| page.items)
        .unwrap_or_default()
        .into_iter()
        .next()
}

struct CachedToken {
    value: String,
    refresh_after: Instant,
}

/// Spotify API client
pub struct SpotifyClient {
    http_client: reqwest::Client,
    gate: ProviderGate,
    client_id: String,
    client_secret: String,
    token: Mutex<Option<CachedToken>>,
}

impl SpotifyClient {
    pub fn new(
        client_id: String,
        client_secret: String,
        gate: ProviderGate,
    ) -> Result<Self, ProviderError> {
        let http_client = reqwest::Client::builder()
            .timeout(CALL_TIMEOUT)
            .build()
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            gate,
            client_id,
            client_secret,
            token: Mutex::new(None),
        })
    }

    /// Current bearer token, requesting a fresh one when the cache is empty
    /// or close to expiry.
    async fn bearer_token(&self) -> Result<String, ProviderError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.refresh_after {
                return Ok(token.value.clone());
            }
        }

        debug!("Requesting new Spotify access token");
        let response = self
            .http_client
            .post(ACCOUNTS_URL)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        let lifetime = Duration::from_secs(token.expires_in);
        let refresh_after = Instant::now() + lifetime.saturating_sub(TOKEN_EXPIRY_MARGIN);
        let value = token.access_token.clone();
        *cached = Some(CachedToken {
            value: token.access_token,
            refresh_after,
        });
        Ok(value)
    }

    async fn fetch_track(&self, id: &str) -> Result<SeedTrack, ProviderError> {
        let token = self.bearer_token().await?;
        let url = format!("{}/tracks/{}", API_BASE_URL, id);

        debug!(track_id = %id, "Looking up Spotify track");
        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ProviderError::NotFound(id.to_string()));
        }
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }

        let track: SpTrack = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;
        Ok(seed_from_track(track))
    }

    async fn fetch_first_match(
        &self,
        artist: &str,
        track: &str,
    ) -> Result<Option<SeedTrack>, ProviderError> {
        let token = self.bearer_token().await?;
        let query = format!("artist:\"{}\" track:\"{}\"", artist, track);

        let response = self
            .http_client
            .get(format!("{}/search", API_BASE_URL))
            .bearer_auth(&token)
            .query(&[("q", query.as_str()), ("type", "track"), ("limit", "1")])
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }

        let page: SpSearchResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;
        Ok(first_match(page).map(seed_from_track))
    }
}

#[async_trait]
impl MetadataProvider for SpotifyClient {
    async fn track(&self, id: &str) -> Result<SeedTrack, ProviderError> {
        let _slot = self.gate.acquire().await;
        self.fetch_track(id).await
    }

    async fn search_track(&self, artist: &str, track: &str) -> Option<SeedTrack> {
        let _slot = self.gate.acquire().await;
        match self.fetch_first_match(artist, track).await {
            Ok(found) => found,
            Err(e) => {
                warn!(artist, track, error = %e, "Spotify search degraded to no match");
                None
            }
        }
    }
}
