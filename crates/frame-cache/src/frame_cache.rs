//! Composite frame persistence keyed by the full viewport tuple.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use image::{ImageFormat, RgbaImage};
use tracing::{debug, warn};

use radar_core::{RadarError, RadarResult, Viewport};

/// Entries older than this (measured from the embedded timestamp, not
/// file mtime) are eligible for removal.
pub const DEFAULT_TTL: Duration = Duration::from_secs(2 * 60 * 60);

/// Cache key for one composite frame.
///
/// At most one file exists per key; a lookup miss triggers exactly one
/// fetch-compose-store cycle for that key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameKey {
    pub timestamp: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: u32,
    pub width: u32,
    pub height: u32,
}

impl FrameKey {
    pub fn new(timestamp: i64, viewport: &Viewport) -> Self {
        Self {
            timestamp,
            latitude: viewport.center.latitude,
            longitude: viewport.center.longitude,
            zoom: viewport.zoom,
            width: viewport.width,
            height: viewport.height,
        }
    }

    /// Cache file name, `{timestamp}_{lat}_{lng}_{zoom}_{w}x{h}.png`.
    pub fn file_name(&self) -> String {
        format!(
            "{}_{}_{}_{}_{}x{}.png",
            self.timestamp, self.latitude, self.longitude, self.zoom, self.width, self.height
        )
    }
}

impl std::fmt::Display for FrameKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.file_name())
    }
}

/// File-backed frame cache under a dedicated directory.
///
/// Writes are idempotent (same key, same content) and go through a
/// temp-file rename, so concurrent cycles never observe a partial file.
#[derive(Debug, Clone)]
pub struct FrameCache {
    dir: PathBuf,
}

impl FrameCache {
    /// Open a cache rooted at `dir`, creating the directory on first use.
    pub fn open(dir: impl Into<PathBuf>) -> RadarResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .map_err(|e| RadarError::CacheIo(format!("create {}: {}", dir.display(), e)))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &FrameKey) -> PathBuf {
        self.dir.join(key.file_name())
    }

    pub fn contains(&self, key: &FrameKey) -> bool {
        self.path_for(key).exists()
    }

    /// Load the cached composite for a key.
    pub fn load(&self, key: &FrameKey) -> RadarResult<RgbaImage> {
        let path = self.path_for(key);
        let img = image::open(&path)
            .map_err(|e| RadarError::CacheIo(format!("read {}: {}", path.display(), e)))?;
        Ok(img.to_rgba8())
    }

    /// Persist a composite, returning the final file path.
    ///
    /// Encodes into a `.tmp` sibling and renames into place.
    pub fn store(&self, key: &FrameKey, image: &RgbaImage) -> RadarResult<PathBuf> {
        let path = self.path_for(key);
        let tmp = path.with_extension("png.tmp");

        image
            .save_with_format(&tmp, ImageFormat::Png)
            .map_err(|e| RadarError::CacheIo(format!("write {}: {}", tmp.display(), e)))?;
        fs::rename(&tmp, &path)
            .map_err(|e| RadarError::CacheIo(format!("rename {}: {}", path.display(), e)))?;

        debug!(key = %key, "Cached composite frame");
        Ok(path)
    }

    /// Delete the entry for a key. Missing files are not an error.
    pub fn remove(&self, key: &FrameKey) {
        let path = self.path_for(key);
        if let Err(e) = fs::remove_file(&path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %path.display(), error = %e, "Failed to remove cache entry");
            }
        }
    }

    /// Remove entries whose embedded timestamp is older than `ttl`
    /// relative to `now` (unix seconds). File names that do not start
    /// with a parseable timestamp are left alone. Returns the number of
    /// entries removed.
    pub fn prune_older_than(&self, ttl: Duration, now: i64) -> usize {
        let cutoff = now - ttl.as_secs() as i64;
        let mut removed = 0;

        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = %self.dir.display(), error = %e, "Failed to scan cache directory");
                return 0;
            }
        };

        for entry in entries.flatten() {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            let Some(ts) = name
                .split('_')
                .next()
                .and_then(|s| s.parse::<i64>().ok())
            else {
                continue;
            };

            if ts < cutoff {
                match fs::remove_file(entry.path()) {
                    Ok(()) => {
                        debug!(file = %name, "Pruned expired cache entry");
                        removed += 1;
                    }
                    Err(e) => {
                        warn!(file = %name, error = %e, "Failed to prune cache entry")
                    }
                }
            }
        }

        removed
    }
}
