//! soundalike-server - similar-tracks enrichment service
//!
//! Resolves a seed track against the primary metadata provider, retrieves a
//! ranked candidate pool from the similarity provider, and enriches every
//! candidate concurrently from all providers under per-provider gates.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use soundalike_common::config::Config;
use soundalike_server::services::deezer_client::DeezerClient;
use soundalike_server::services::enrichment::{EnrichmentPipeline, PipelineConfig};
use soundalike_server::services::gate::ProviderGate;
use soundalike_server::services::lastfm_client::LastfmClient;
use soundalike_server::services::spotify_client::SpotifyClient;
use soundalike_server::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting soundalike-server");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Credentials resolve before any network call; a missing one is fatal
    // here, not mid-request.
    let config = Config::load()?;

    // One gate per provider, owned here and injected into the clients.
    let spotify_gate = ProviderGate::new(config.spotify_concurrency);
    let lastfm_gate = ProviderGate::new(config.lastfm_concurrency);
    let deezer_gate = ProviderGate::new(config.deezer_concurrency);

    let spotify = SpotifyClient::new(
        config.spotify_client_id.clone(),
        config.spotify_client_secret.clone(),
        spotify_gate,
    )?;
    let lastfm = LastfmClient::new(config.lastfm_api_key.clone(), config.tag_limit, lastfm_gate)?;
    let deezer = DeezerClient::new(deezer_gate)?;

    let pipeline = EnrichmentPipeline::new(
        Arc::new(spotify),
        Arc::new(lastfm),
        Arc::new(deezer),
        PipelineConfig {
            overfetch_count: config.overfetch_count,
            max_results: config.max_results,
        },
    );

    let state = AppState::new(Arc::new(pipeline));
    let app = soundalike_server::build_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("Listening on http://{}", config.bind_addr);
    info!("Health check: http://{}/api/health", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
