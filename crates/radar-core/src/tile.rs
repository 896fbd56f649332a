//! Slippy-tile grid enumeration for a viewport.

use serde::{Deserialize, Serialize};

/// Standard web-mapping tile edge length in pixels.
pub const TILE_SIZE: u32 = 256;

/// Deepest zoom level the tile provider serves. Also keeps the
/// 2^zoom tile-count arithmetic well inside i64 range.
pub const MAX_ZOOM: u32 = 20;

/// Fixed rendering parameters appended to every tile URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileParams {
    /// Provider color scheme index.
    pub color_scheme: u8,
    /// Apply provider-side smoothing.
    pub smoothing: bool,
    /// Render snow in a distinct color.
    pub snow: bool,
}

impl Default for TileParams {
    fn default() -> Self {
        Self {
            color_scheme: 4,
            smoothing: false,
            snow: false,
        }
    }
}

impl TileParams {
    /// URL suffix flags, `{smoothing}_{snow}` as 0/1.
    pub fn flags(&self) -> String {
        format!("{}_{}", self.smoothing as u8, self.snow as u8)
    }
}

/// The inclusive tile-index bounding box covering a viewport, plus the
/// fractional NW index needed for pixel-exact cropping.
///
/// Built from fractional corner tile indices; callers must not round the
/// projector output before constructing the grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileGrid {
    pub zoom: u32,
    x_start: i64,
    y_start: i64,
    columns: u32,
    rows: u32,
    nw_x: f64,
    nw_y: f64,
}

impl TileGrid {
    /// Build a grid from the fractional tile indices of the viewport's
    /// NW and SE corners.
    pub fn new(nw: (f64, f64), se: (f64, f64), zoom: u32) -> Self {
        let x_start = nw.0.floor() as i64;
        let y_start = nw.1.floor() as i64;
        let x_end = se.0.floor() as i64;
        let y_end = se.1.floor() as i64;

        Self {
            zoom,
            x_start,
            y_start,
            columns: (x_end - x_start + 1).max(1) as u32,
            rows: (y_end - y_start + 1).max(1) as u32,
            nw_x: nw.0,
            nw_y: nw.1,
        }
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Total number of tiles in the grid.
    pub fn tile_count(&self) -> usize {
        (self.columns * self.rows) as usize
    }

    /// Pixel offset of the viewport's NW corner within the NW tile,
    /// from the fractional part of the NW tile index.
    pub fn pixel_offset(&self) -> (u32, u32) {
        let x = ((self.nw_x - self.nw_x.floor()) * TILE_SIZE as f64) as u32;
        let y = ((self.nw_y - self.nw_y.floor()) * TILE_SIZE as f64) as u32;
        (x, y)
    }

    /// Integer tile coordinates in fixed row-major order: rows
    /// north to south, columns west to east. The mosaic composer relies
    /// on this exact order.
    ///
    /// X indices wrap modulo 2^zoom since longitude wraps; y does not.
    pub fn coords(&self) -> Vec<(u32, u32)> {
        let n = 1_i64 << self.zoom;
        let mut out = Vec::with_capacity(self.tile_count());

        for row in 0..self.rows as i64 {
            let y = (self.y_start + row).clamp(0, n - 1) as u32;
            for col in 0..self.columns as i64 {
                let x = (self.x_start + col).rem_euclid(n) as u32;
                out.push((x, y));
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_params_flags() {
        assert_eq!(TileParams::default().flags(), "0_0");
        let params = TileParams {
            color_scheme: 2,
            smoothing: true,
            snow: false,
        };
        assert_eq!(params.flags(), "1_0");
    }

    #[test]
    fn test_grid_dimensions() {
        // NW corner in tile (31, 31), SE in tile (32, 32): a 2x2 grid.
        let grid = TileGrid::new((31.02, 31.10), (32.97, 32.90), 6);
        assert_eq!(grid.columns(), 2);
        assert_eq!(grid.rows(), 2);
        assert_eq!(grid.tile_count(), 4);
    }

    #[test]
    fn test_grid_single_tile() {
        let grid = TileGrid::new((10.2, 10.3), (10.8, 10.9), 5);
        assert_eq!(grid.columns(), 1);
        assert_eq!(grid.rows(), 1);
    }

    #[test]
    fn test_row_major_order() {
        let grid = TileGrid::new((4.5, 7.5), (6.5, 8.5), 4);
        // Rows north->south, columns west->east.
        assert_eq!(
            grid.coords(),
            vec![(4, 7), (5, 7), (6, 7), (4, 8), (5, 8), (6, 8)]
        );
    }

    #[test]
    fn test_pixel_offset_truncates_fraction() {
        let grid = TileGrid::new((31.0233, 31.5), (32.9, 32.9), 6);
        let (x, y) = grid.pixel_offset();
        assert_eq!(x, 5); // 0.0233 * 256 = 5.96.. truncated
        assert_eq!(y, 128);
    }

    #[test]
    fn test_grid_at_max_zoom() {
        let n = 1_u32 << MAX_ZOOM;
        let grid = TileGrid::new((100.25, 100.25), (101.75, 101.75), MAX_ZOOM);
        assert_eq!(grid.tile_count(), 4);
        assert!(grid.coords().iter().all(|&(x, y)| x < n && y < n));
    }

    #[test]
    fn test_x_wraps_at_antimeridian() {
        // Grid straddling the date line at zoom 3 (n = 8).
        let grid = TileGrid::new((7.5, 3.2), (8.5, 3.8), 3);
        assert_eq!(grid.coords(), vec![(7, 3), (0, 3)]);
    }
}
