//! Rolling catalog of available radar snapshot timestamps.

use serde::Deserialize;
use tracing::{debug, info};

use radar_core::{RadarError, RadarResult, TileGrid, TileParams, TILE_SIZE};

use crate::fetch::TileTransport;

/// Default catalog endpoint.
pub const DEFAULT_CATALOG_URL: &str = "https://api.rainviewer.com/public/weather-maps.json";

/// Catalog document, `{ host, radar: { past: [{time, path}] } }` with
/// past entries ordered oldest to newest.
#[derive(Debug, Deserialize)]
struct CatalogDocument {
    host: String,
    radar: RadarSection,
}

#[derive(Debug, Deserialize)]
struct RadarSection {
    past: Vec<PastEntry>,
}

#[derive(Debug, Deserialize)]
struct PastEntry {
    time: i64,
    path: String,
}

/// One known snapshot: timestamp plus the provider path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TilePath {
    pub timestamp: i64,
    pub path: String,
}

/// The rolling set of available snapshot timestamps and their tile-path
/// templates, ascending and deduplicated, truncated to the newest N.
#[derive(Debug, Clone)]
pub struct TimestampCatalog {
    url: String,
    capacity: usize,
    host: String,
    entries: Vec<TilePath>,
}

impl TimestampCatalog {
    pub fn new(url: impl Into<String>, capacity: usize) -> Self {
        Self {
            url: url.into(),
            capacity: capacity.max(1),
            host: String::new(),
            entries: Vec::new(),
        }
    }

    /// Snapshot entries, oldest first.
    pub fn entries(&self) -> &[TilePath] {
        &self.entries
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Fetch the catalog document and merge new timestamps into the
    /// entry list, truncating to the newest N. Returns the timestamps
    /// dropped by truncation so their cache entries can be deleted.
    ///
    /// On any failure the previous catalog state is left untouched; the
    /// caller keeps animating from the last good catalog.
    pub async fn refresh(&mut self, transport: &dyn TileTransport) -> RadarResult<Vec<i64>> {
        let bytes = transport
            .get(&self.url)
            .await
            .map_err(|e| RadarError::CatalogFetch(e.to_string()))?;

        if bytes.is_empty() {
            return Err(RadarError::EmptyResponse);
        }

        let doc: CatalogDocument = serde_json::from_slice(&bytes)
            .map_err(|e| RadarError::MalformedCatalog(e.to_string()))?;

        let mut merged = self.entries.clone();
        let mut added = 0;
        for item in doc.radar.past {
            if !merged.iter().any(|e| e.timestamp == item.time) {
                merged.push(TilePath {
                    timestamp: item.time,
                    path: item.path,
                });
                added += 1;
            }
        }
        merged.sort_by_key(|e| e.timestamp);

        let mut dropped = Vec::new();
        while merged.len() > self.capacity {
            dropped.push(merged.remove(0).timestamp);
        }

        info!(
            added,
            dropped = dropped.len(),
            known = merged.len(),
            "Catalog refreshed"
        );
        debug!(host = %doc.host, "Catalog host");

        self.host = doc.host;
        self.entries = merged;
        Ok(dropped)
    }

    /// Build one tile URL per grid coordinate, in the grid's fixed
    /// row-major order. The mosaic composer assumes tiles arrive in this
    /// exact order.
    pub fn urls_for(&self, entry: &TilePath, grid: &TileGrid, params: &TileParams) -> Vec<String> {
        grid.coords()
            .into_iter()
            .map(|(x, y)| {
                format!(
                    "{}{}/{}/{}/{}/{}/{}/{}.png",
                    self.host,
                    entry.path,
                    TILE_SIZE,
                    grid.zoom,
                    x,
                    y,
                    params.color_scheme,
                    params.flags()
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_follow_row_major_order() {
        let mut catalog = TimestampCatalog::new(DEFAULT_CATALOG_URL, 10);
        catalog.host = "https://tilecache.example".into();

        let entry = TilePath {
            timestamp: 100,
            path: "/v2/radar/100".into(),
        };
        let grid = TileGrid::new((4.5, 7.5), (5.5, 8.5), 6);
        let params = TileParams {
            color_scheme: 4,
            smoothing: true,
            snow: false,
        };

        let urls = catalog.urls_for(&entry, &grid, &params);
        assert_eq!(
            urls,
            vec![
                "https://tilecache.example/v2/radar/100/256/6/4/7/4/1_0.png",
                "https://tilecache.example/v2/radar/100/256/6/5/7/4/1_0.png",
                "https://tilecache.example/v2/radar/100/256/6/4/8/4/1_0.png",
                "https://tilecache.example/v2/radar/100/256/6/5/8/4/1_0.png",
            ]
        );
    }
}
