//! Configuration loading for the radar export service.
//!
//! Loads the viewport, tile options and cache settings from a YAML file.

use std::path::{Path, PathBuf};

use anyhow::{ensure, Context, Result};
use serde::Deserialize;
use tracing::debug;

use radar_core::{GeoPoint, TileParams, Viewport, DEFAULT_FRAME_COUNT, MAX_ZOOM};

/// Root configuration for the export service.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    pub viewport: ViewportConfig,
    #[serde(default)]
    pub tiles: TileConfig,
    /// Number of frames retained for animation.
    #[serde(default = "default_frame_count")]
    pub frame_count: usize,
    /// Minutes between fetch cycles in continuous mode.
    #[serde(default = "default_refresh_minutes")]
    pub refresh_minutes: u64,
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
    /// TTF font for the frame label; labels are skipped when unset.
    #[serde(default)]
    pub font_path: Option<PathBuf>,
    #[serde(default = "default_attribution")]
    pub attribution: String,
    #[serde(default = "default_catalog_url")]
    pub catalog_url: String,
}

/// Geographic window the composites cover.
#[derive(Debug, Clone, Deserialize)]
pub struct ViewportConfig {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: u32,
    pub width: u32,
    pub height: u32,
}

impl ViewportConfig {
    pub fn to_viewport(&self) -> Viewport {
        Viewport::new(
            GeoPoint::new(self.latitude, self.longitude),
            self.zoom,
            self.width,
            self.height,
        )
    }
}

/// Provider tile rendering options.
#[derive(Debug, Clone, Deserialize)]
pub struct TileConfig {
    #[serde(default = "default_color_scheme")]
    pub color_scheme: u8,
    #[serde(default = "default_smoothing")]
    pub smoothing: bool,
    #[serde(default)]
    pub snow: bool,
}

impl Default for TileConfig {
    fn default() -> Self {
        Self {
            color_scheme: default_color_scheme(),
            smoothing: default_smoothing(),
            snow: false,
        }
    }
}

impl TileConfig {
    pub fn to_params(&self) -> TileParams {
        TileParams {
            color_scheme: self.color_scheme,
            smoothing: self.smoothing,
            snow: self.snow,
        }
    }
}

fn default_frame_count() -> usize {
    DEFAULT_FRAME_COUNT
}

fn default_refresh_minutes() -> u64 {
    10
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("/data/radar-cache")
}

fn default_attribution() -> String {
    "rainviewer.com".to_string()
}

fn default_catalog_url() -> String {
    pipeline::DEFAULT_CATALOG_URL.to_string()
}

fn default_color_scheme() -> u8 {
    4
}

fn default_smoothing() -> bool {
    true
}

impl ExportConfig {
    /// Load the service configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: ExportConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;

        debug!(path = %path.display(), "Loaded export config");
        Ok(config)
    }

    /// Reject values the pipeline cannot run with.
    fn validate(&self) -> Result<()> {
        ensure!(
            self.refresh_minutes >= 1,
            "refresh_minutes must be at least 1"
        );
        ensure!(
            self.viewport.zoom <= MAX_ZOOM,
            "zoom {} exceeds the provider maximum of {}",
            self.viewport.zoom,
            MAX_ZOOM
        );
        Ok(())
    }
}
