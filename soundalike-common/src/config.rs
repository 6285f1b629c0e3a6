//! Configuration loading and credential resolution
//!
//! Two-tier resolution with environment variables taking priority over the
//! TOML config file. Credentials are resolved once at startup, before any
//! network call; a missing credential is a fatal `Error::Config`.

use crate::{Error, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default listen address
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8650";

/// Default candidate over-fetch requested from the similarity provider
pub const DEFAULT_OVERFETCH_COUNT: usize = 50;

/// Default cap on tags attached per track
pub const DEFAULT_TAG_LIMIT: usize = 15;

/// Default ceiling on the user-requested result count
pub const DEFAULT_MAX_RESULTS: usize = 50;

// Default in-flight call limits per provider. Last.fm publishes a
// requests-per-second policy, so its gate is the strictest; Deezer and
// Spotify publish no hard quota.

/// Default concurrent calls admitted to Spotify
pub const DEFAULT_SPOTIFY_CONCURRENCY: usize = 8;
/// Default concurrent calls admitted to Last.fm
pub const DEFAULT_LASTFM_CONCURRENCY: usize = 4;
/// Default concurrent calls admitted to Deezer
pub const DEFAULT_DEEZER_CONCURRENCY: usize = 8;

/// Raw contents of the optional TOML config file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub spotify_client_id: Option<String>,
    pub spotify_client_secret: Option<String>,
    pub lastfm_api_key: Option<String>,
    pub bind_addr: Option<String>,
    pub overfetch_count: Option<usize>,
    pub tag_limit: Option<usize>,
    pub max_results: Option<usize>,
    pub spotify_concurrency: Option<usize>,
    pub lastfm_concurrency: Option<usize>,
    pub deezer_concurrency: Option<usize>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub spotify_client_id: String,
    pub spotify_client_secret: String,
    pub lastfm_api_key: String,
    pub bind_addr: SocketAddr,
    /// Candidates requested from the similarity provider, larger than any
    /// user-visible result count so deduplication/limiting has a pool
    pub overfetch_count: usize,
    /// Tags kept per track
    pub tag_limit: usize,
    /// Ceiling for the per-request result count
    pub max_results: usize,
    pub spotify_concurrency: usize,
    pub lastfm_concurrency: usize,
    pub deezer_concurrency: usize,
}

/// Config file location: `SOUNDALIKE_CONFIG` override, then the platform
/// config directory (`~/.config/soundalike/config.toml` on Linux).
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("SOUNDALIKE_CONFIG") {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|d| d.join("soundalike").join("config.toml"))
}

/// Read and parse the TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Validate a credential value (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Resolve one credential with ENV → TOML priority.
///
/// Warns when both sources carry a value (potential misconfiguration) and
/// uses the environment variable.
fn resolve_credential(
    env_name: &str,
    toml_key: &str,
    toml_value: Option<&String>,
    hint: &str,
) -> Result<String> {
    let env_value = std::env::var(env_name).ok().filter(|v| is_valid_key(v));
    let toml_value = toml_value.filter(|v| is_valid_key(v));

    if env_value.is_some() && toml_value.is_some() {
        warn!(
            "{} found in both environment and TOML. Using environment (highest priority).",
            env_name
        );
    }

    if let Some(value) = env_value {
        info!("{} loaded from environment variable", env_name);
        return Ok(value.trim().to_string());
    }
    if let Some(value) = toml_value {
        info!("{} loaded from TOML config", env_name);
        return Ok(value.trim().to_string());
    }

    Err(Error::Config(format!(
        "{} not configured. Please configure using one of:\n\
         1. Environment: {}=your-value-here\n\
         2. TOML config: ~/.config/soundalike/config.toml ({} = \"your-value\")\n\
         \n\
         {}",
        env_name, env_name, toml_key, hint
    )))
}

impl Config {
    /// Load the config file (if any) and resolve the full configuration
    pub fn load() -> Result<Self> {
        let toml_config = match config_file_path() {
            Some(path) if path.exists() => {
                info!("Loading config file: {}", path.display());
                load_toml_config(&path)?
            }
            _ => TomlConfig::default(),
        };
        Self::resolve(toml_config)
    }

    /// Resolve configuration from the given TOML contents plus environment
    pub fn resolve(toml_config: TomlConfig) -> Result<Self> {
        let spotify_client_id = resolve_credential(
            "SPOTIFY_CLIENT_ID",
            "spotify_client_id",
            toml_config.spotify_client_id.as_ref(),
            "Obtain credentials at: https://developer.spotify.com/dashboard",
        )?;
        let spotify_client_secret = resolve_credential(
            "SPOTIFY_CLIENT_SECRET",
            "spotify_client_secret",
            toml_config.spotify_client_secret.as_ref(),
            "Obtain credentials at: https://developer.spotify.com/dashboard",
        )?;
        let lastfm_api_key = resolve_credential(
            "LASTFM_API_KEY",
            "lastfm_api_key",
            toml_config.lastfm_api_key.as_ref(),
            "Obtain an API key at: https://www.last.fm/api/account/create",
        )?;

        let bind_addr = std::env::var("SOUNDALIKE_BIND")
            .ok()
            .or(toml_config.bind_addr)
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr: SocketAddr = bind_addr
            .parse()
            .map_err(|e| Error::Config(format!("Invalid bind address {}: {}", bind_addr, e)))?;

        let config = Self {
            spotify_client_id,
            spotify_client_secret,
            lastfm_api_key,
            bind_addr,
            overfetch_count: toml_config.overfetch_count.unwrap_or(DEFAULT_OVERFETCH_COUNT),
            tag_limit: toml_config.tag_limit.unwrap_or(DEFAULT_TAG_LIMIT),
            max_results: toml_config.max_results.unwrap_or(DEFAULT_MAX_RESULTS),
            spotify_concurrency: toml_config
                .spotify_concurrency
                .unwrap_or(DEFAULT_SPOTIFY_CONCURRENCY),
            lastfm_concurrency: toml_config
                .lastfm_concurrency
                .unwrap_or(DEFAULT_LASTFM_CONCURRENCY),
            deezer_concurrency: toml_config
                .deezer_concurrency
                .unwrap_or(DEFAULT_DEEZER_CONCURRENCY),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.overfetch_count == 0 {
            return Err(Error::Config("overfetch_count must be at least 1".to_string()));
        }
        if self.max_results == 0 {
            return Err(Error::Config("max_results must be at least 1".to_string()));
        }
        for (name, limit) in [
            ("spotify_concurrency", self.spotify_concurrency),
            ("lastfm_concurrency", self.lastfm_concurrency),
            ("deezer_concurrency", self.deezer_concurrency),
        ] {
            if limit == 0 {
                return Err(Error::Config(format!("{} must be at least 1", name)));
            }
        }
        Ok(())
    }
}
