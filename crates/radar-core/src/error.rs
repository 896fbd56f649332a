//! Error types for the radar-mosaic pipeline.

use thiserror::Error;

/// Result type alias using RadarError.
pub type RadarResult<T> = Result<T, RadarError>;

/// Primary error type for radar pipeline operations.
///
/// Only catalog-level failures abort a fetch cycle; tile and cache
/// failures are absorbed by the orchestrator and degrade output quality
/// instead of availability.
#[derive(Debug, Error)]
pub enum RadarError {
    // === Catalog Errors (cycle-level, surfaced to the caller) ===
    #[error("Catalog fetch failed: {0}")]
    CatalogFetch(String),

    #[error("Catalog returned an empty body")]
    EmptyResponse,

    #[error("Malformed catalog document: {0}")]
    MalformedCatalog(String),

    // === Tile Errors (absorbed, tile degrades to blank) ===
    #[error("Tile fetch failed for {url}: {message}")]
    TileFetch { url: String, message: String },

    // === Cache Errors (absorbed, frame delivered unpersisted) ===
    #[error("Cache I/O error: {0}")]
    CacheIo(String),

    // === Composition Errors ===
    #[error("Mosaic composition failed: {0}")]
    Compose(String),

    // === Consumer contract ===
    #[error("Viewport not configured; call configure_viewport first")]
    NotConfigured,
}

impl RadarError {
    /// Whether this error aborts the whole fetch cycle.
    pub fn is_cycle_fatal(&self) -> bool {
        matches!(
            self,
            RadarError::CatalogFetch(_)
                | RadarError::EmptyResponse
                | RadarError::MalformedCatalog(_)
                | RadarError::NotConfigured
        )
    }
}

impl From<std::io::Error> for RadarError {
    fn from(err: std::io::Error) -> Self {
        RadarError::CacheIo(err.to_string())
    }
}

impl From<image::ImageError> for RadarError {
    fn from(err: image::ImageError) -> Self {
        RadarError::Compose(err.to_string())
    }
}
