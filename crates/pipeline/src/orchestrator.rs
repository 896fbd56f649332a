//! The fetch-cycle state machine tying catalog, fetcher, composer and
//! cache together.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use frame_cache::{FrameCache, FrameKey, DEFAULT_TTL};
use mosaic::{compose, decode_tile, LabelStyle};
use radar_core::{
    FrameWindow, RadarError, RadarFrame, RadarResult, TileParams, Viewport, DEFAULT_FRAME_COUNT,
};

use crate::catalog::{TimestampCatalog, DEFAULT_CATALOG_URL};
use crate::fetch::{fetch_tile, RetryPolicy, TileTransport};

/// Pipeline tunables.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub catalog_url: String,
    /// Number of frames retained for animation.
    pub frame_count: usize,
    pub params: TileParams,
    /// Cache retention, measured from each entry's embedded timestamp.
    pub cache_ttl: Duration,
    pub retry: RetryPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            frame_count: DEFAULT_FRAME_COUNT,
            params: TileParams::default(),
            cache_ttl: DEFAULT_TTL,
            retry: RetryPolicy::default(),
        }
    }
}

/// The frame orchestrator.
///
/// One cycle: refresh catalog, then per timestamp oldest to newest
/// either skip (window or cache hit) or fetch tiles, compose, cache and
/// accumulate; finally deliver the capped ascending frame list.
///
/// `request_frames` takes `&mut self`, so overlapping cycles on one
/// pipeline cannot exist; starting a new cycle means the previous future
/// was dropped, which aborts its outstanding network request. All other
/// per-cycle state lives inside the invocation.
pub struct RadarPipeline {
    transport: Arc<dyn TileTransport>,
    catalog: TimestampCatalog,
    cache: FrameCache,
    window: FrameWindow,
    label: LabelStyle,
    viewport: Option<Viewport>,
    params: TileParams,
    cache_ttl: Duration,
    retry: RetryPolicy,
}

impl RadarPipeline {
    pub fn new(
        config: PipelineConfig,
        transport: Arc<dyn TileTransport>,
        cache: FrameCache,
        label: LabelStyle,
    ) -> Self {
        Self {
            transport,
            catalog: TimestampCatalog::new(config.catalog_url, config.frame_count),
            cache,
            window: FrameWindow::new(config.frame_count),
            label,
            viewport: None,
            params: config.params,
            cache_ttl: config.cache_ttl,
            retry: config.retry,
        }
    }

    /// Set the viewport for subsequent cycles. Must be called before the
    /// first `request_frames`. A changed viewport clears the accumulated
    /// window, since every cache key embeds the viewport tuple.
    pub fn configure_viewport(&mut self, viewport: Viewport) {
        if self.viewport != Some(viewport) {
            self.window.clear();
        }
        self.viewport = Some(viewport);
    }

    /// The last delivered frame window. Unchanged by failed cycles.
    pub fn frames(&self) -> &[RadarFrame] {
        self.window.frames()
    }

    /// Run one fetch cycle and deliver the full ordered frame list.
    ///
    /// Completes exactly once with either frames or an error. Only
    /// catalog-level failures surface here; tile and cache failures
    /// degrade the output instead.
    pub async fn request_frames(&mut self) -> RadarResult<Vec<RadarFrame>> {
        let viewport = self.viewport.ok_or(RadarError::NotConfigured)?;

        let dropped = self.catalog.refresh(self.transport.as_ref()).await?;
        for timestamp in dropped {
            self.window.remove(timestamp);
            self.cache.remove(&FrameKey::new(timestamp, &viewport));
        }

        let pruned = self.cache.prune_older_than(self.cache_ttl, Utc::now().timestamp());
        if pruned > 0 {
            debug!(pruned, "Pruned expired cache entries");
        }

        let grid = projection::viewport_grid(&viewport);
        let entries = self.catalog.entries().to_vec();

        for entry in &entries {
            if self.window.contains(entry.timestamp) {
                debug!(timestamp = entry.timestamp, "Frame already delivered, skipping");
                continue;
            }

            let key = FrameKey::new(entry.timestamp, &viewport);
            if self.cache.contains(&key) {
                match self.cache.load(&key) {
                    Ok(image) => {
                        debug!(timestamp = entry.timestamp, "Cache hit");
                        self.accumulate(RadarFrame::new(
                            entry.timestamp,
                            image,
                            Some(self.cache.path_for(&key)),
                        ));
                        continue;
                    }
                    Err(e) => {
                        warn!(key = %key, error = %e, "Cached frame unreadable, re-fetching");
                        self.cache.remove(&key);
                    }
                }
            }

            let urls = self.catalog.urls_for(entry, &grid, &self.params);
            let mut tiles = Vec::with_capacity(urls.len());
            for url in &urls {
                let tile = match fetch_tile(self.transport.as_ref(), url, &self.retry).await {
                    Some(bytes) => match decode_tile(&bytes) {
                        Ok(image) => Some(image),
                        Err(e) => {
                            warn!(url, error = %e, "Tile decode failed; using blank tile");
                            None
                        }
                    },
                    None => None,
                };
                tiles.push(tile);
            }

            let mut image = match compose(&tiles, &grid, &viewport) {
                Ok(image) => image,
                Err(e) => {
                    warn!(timestamp = entry.timestamp, error = %e, "Composition failed, dropping frame");
                    continue;
                }
            };
            self.label.draw(&mut image, entry.timestamp);

            let path = match self.cache.store(&key, &image) {
                Ok(path) => Some(path),
                Err(e) => {
                    warn!(key = %key, error = %e, "Cache write failed; frame delivered unpersisted");
                    None
                }
            };

            self.accumulate(RadarFrame::new(entry.timestamp, image, path));
        }

        info!(frames = self.window.len(), "Fetch cycle complete");
        Ok(self.window.frames().to_vec())
    }

    fn accumulate(&mut self, frame: RadarFrame) {
        let Some(viewport) = self.viewport else { return };
        for old in self.window.insert(frame) {
            self.cache.remove(&FrameKey::new(old.timestamp, &viewport));
        }
    }
}
