//! Web Mercator projection and slippy-tile indexing.
//!
//! World coordinates are pixels at zoom 0, where the whole world spans a
//! single 256-pixel tile. Screen-pixel offsets at zoom z map back into
//! this space after dividing by 2^z.

use std::f64::consts::PI;

use radar_core::{GeoPoint, TileGrid, Viewport};

/// Pixel extent of the zoom-0 world tile.
pub const MERCATOR_RANGE: f64 = 256.0;

/// Latitude clamp for sin(lat), keeping the log term finite within about
/// a third of a tile past the edge of the world tile (~89.19 degrees).
const SIN_LAT_BOUND: f64 = 0.9999;

/// Lat/lng to zoom-0 pixel projection and its exact inverse.
#[derive(Debug, Clone, Copy)]
pub struct MercatorProjection {
    origin_x: f64,
    origin_y: f64,
    pixels_per_degree: f64,
    pixels_per_radian: f64,
}

impl Default for MercatorProjection {
    fn default() -> Self {
        Self::new()
    }
}

impl MercatorProjection {
    pub fn new() -> Self {
        Self {
            origin_x: MERCATOR_RANGE / 2.0,
            origin_y: MERCATOR_RANGE / 2.0,
            pixels_per_degree: MERCATOR_RANGE / 360.0,
            pixels_per_radian: MERCATOR_RANGE / (2.0 * PI),
        }
    }

    /// Project a geographic point to zoom-0 pixel coordinates.
    pub fn from_lat_lng(&self, point: GeoPoint) -> (f64, f64) {
        let x = self.origin_x + point.longitude * self.pixels_per_degree;

        let sin_y = point
            .latitude
            .to_radians()
            .sin()
            .clamp(-SIN_LAT_BOUND, SIN_LAT_BOUND);
        let y = self.origin_y
            + 0.5 * ((1.0 + sin_y) / (1.0 - sin_y)).ln() * -self.pixels_per_radian;

        (x, y)
    }

    /// Exact inverse of [`from_lat_lng`](Self::from_lat_lng).
    pub fn to_lat_lng(&self, x: f64, y: f64) -> GeoPoint {
        let longitude = (x - self.origin_x) / self.pixels_per_degree;
        let lat_radians = (y - self.origin_y) / -self.pixels_per_radian;
        let latitude = (2.0 * lat_radians.exp().atan() - PI / 2.0).to_degrees();
        GeoPoint::new(latitude, longitude)
    }
}

/// Geographic bounds of a viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Corners {
    pub north: f64,
    pub east: f64,
    pub south: f64,
    pub west: f64,
}

/// Compute the geographic bounds of a viewport from its center, zoom and
/// pixel dimensions.
pub fn viewport_corners(viewport: &Viewport) -> Corners {
    let scale = 2_f64.powi(viewport.zoom as i32);
    let projection = MercatorProjection::new();
    let (cx, cy) = projection.from_lat_lng(viewport.center);

    let half_w = viewport.width as f64 / 2.0 / scale;
    let half_h = viewport.height as f64 / 2.0 / scale;

    let ne = projection.to_lat_lng(cx + half_w, cy - half_h);
    let sw = projection.to_lat_lng(cx - half_w, cy + half_h);

    Corners {
        north: ne.latitude,
        east: ne.longitude,
        south: sw.latitude,
        west: sw.longitude,
    }
}

/// Fractional slippy-tile indices for a point at a zoom level.
///
/// Callers must not round until tile enumeration; the fractional part
/// carries the sub-tile pixel offset needed for exact cropping.
pub fn tile_xy(point: GeoPoint, zoom: u32) -> (f64, f64) {
    let lat_radians = point.latitude.to_radians();
    let n = 2_f64.powi(zoom as i32);

    let x = (point.longitude + 180.0) / 360.0 * n;
    let y = (1.0 - (lat_radians.tan() + 1.0 / lat_radians.cos()).ln() / PI) / 2.0 * n;
    (x, y)
}

/// The tile grid covering a viewport: corner bounds, then NW/SE tile
/// indices, kept fractional until the grid enumerates them.
pub fn viewport_grid(viewport: &Viewport) -> TileGrid {
    let corners = viewport_corners(viewport);
    let nw = tile_xy(GeoPoint::new(corners.north, corners.west), viewport.zoom);
    let se = tile_xy(GeoPoint::new(corners.south, corners.east), viewport.zoom);
    TileGrid::new(nw, se, viewport.zoom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_within_tolerance() {
        let projection = MercatorProjection::new();

        for lat_step in -84..=84 {
            for lng_step in [-179, -120, -45, 0, 45, 120, 179] {
                let p = GeoPoint::new(lat_step as f64 + 0.5, lng_step as f64 + 0.25);
                let (x, y) = projection.from_lat_lng(p);
                let back = projection.to_lat_lng(x, y);

                assert!(
                    (back.latitude - p.latitude).abs() < 1e-6,
                    "latitude drift at {}",
                    p
                );
                assert!(
                    (back.longitude - p.longitude).abs() < 1e-6,
                    "longitude drift at {}",
                    p
                );
            }
        }
    }

    #[test]
    fn test_polar_latitudes_stay_finite() {
        let projection = MercatorProjection::new();
        for lat in [89.9, 90.0, -89.9, -90.0] {
            let (_, y) = projection.from_lat_lng(GeoPoint::new(lat, 0.0));
            assert!(y.is_finite());
        }
    }
}
