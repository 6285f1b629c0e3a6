//! Common error types for soundalike

use thiserror::Error;

/// Common result type for soundalike operations
pub type Result<T> = std::result::Result<T, Error>;

/// Request-scoped error taxonomy.
///
/// Best-effort provider failures never appear here: they degrade to absent
/// fields inside the enrichment pipeline. Only malformed input, load-bearing
/// provider failures, and startup misconfiguration surface to callers.
#[derive(Error, Debug)]
pub enum Error {
    /// Seed reference that matches none of the accepted shapes
    #[error("Invalid track reference: {0}")]
    InvalidTrackReference(String),

    /// Load-bearing seed metadata lookup failed upstream
    #[error("Seed track lookup failed: {0}")]
    SeedLookup(String),

    /// Load-bearing similarity lookup failed upstream
    #[error("Similar tracks lookup failed: {0}")]
    SimilarityLookup(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
