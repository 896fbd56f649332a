//! Tile stitching and viewport-exact cropping.

use image::{imageops, RgbaImage};
use radar_core::{RadarError, RadarResult, TileGrid, Viewport, TILE_SIZE};

/// Decode a fetched tile payload into RGBA pixels.
pub fn decode_tile(bytes: &[u8]) -> RadarResult<RgbaImage> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| RadarError::Compose(format!("tile decode failed: {}", e)))?;
    Ok(img.to_rgba8())
}

/// Stitch an ordered tile buffer into a single composite sized exactly to
/// the viewport.
///
/// Tiles must be in the grid's row-major order; `None` entries (failed
/// fetches) are left transparent. The canvas is placed at the negative
/// fractional NW pixel offset inside a fresh viewport-sized image, so the
/// output is always exactly `width x height` regardless of where tile
/// boundaries fall.
pub fn compose(
    tiles: &[Option<RgbaImage>],
    grid: &TileGrid,
    viewport: &Viewport,
) -> RadarResult<RgbaImage> {
    if tiles.len() != grid.tile_count() {
        return Err(RadarError::Compose(format!(
            "expected {} tiles for a {}x{} grid, got {}",
            grid.tile_count(),
            grid.columns(),
            grid.rows(),
            tiles.len()
        )));
    }

    let columns = grid.columns();
    let mut canvas = RgbaImage::new(columns * TILE_SIZE, grid.rows() * TILE_SIZE);

    for (i, tile) in tiles.iter().enumerate() {
        let Some(tile) = tile else { continue };

        let col = (i as u32 % columns) as i64;
        let row = (i as u32 / columns) as i64;
        imageops::replace(
            &mut canvas,
            tile,
            col * TILE_SIZE as i64,
            row * TILE_SIZE as i64,
        );
    }

    let (offset_x, offset_y) = grid.pixel_offset();
    let mut composite = RgbaImage::new(viewport.width, viewport.height);
    imageops::replace(
        &mut composite,
        &canvas,
        -(offset_x as i64),
        -(offset_y as i64),
    );

    Ok(composite)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use radar_core::GeoPoint;

    fn solid_tile(pixel: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(TILE_SIZE, TILE_SIZE, Rgba(pixel))
    }

    #[test]
    fn test_tile_count_mismatch_rejected() {
        let grid = TileGrid::new((4.0, 4.0), (5.5, 5.5), 6);
        let viewport = Viewport::new(GeoPoint::new(0.0, 0.0), 6, 300, 300);
        let tiles = vec![Some(solid_tile([255, 0, 0, 255]))];

        assert!(compose(&tiles, &grid, &viewport).is_err());
    }

    #[test]
    fn test_missing_tile_stays_transparent() {
        let grid = TileGrid::new((4.0, 4.0), (5.5, 5.5), 6);
        let viewport = Viewport::new(GeoPoint::new(0.0, 0.0), 6, 512, 512);
        let tiles = vec![
            Some(solid_tile([255, 0, 0, 255])),
            None,
            Some(solid_tile([0, 255, 0, 255])),
            Some(solid_tile([0, 0, 255, 255])),
        ];

        let out = compose(&tiles, &grid, &viewport).unwrap();
        // Offset is zero here, so the NE quadrant is the missing tile.
        assert_eq!(out.get_pixel(10, 10), &Rgba([255, 0, 0, 255]));
        assert_eq!(out.get_pixel(300, 10), &Rgba([0, 0, 0, 0]));
        assert_eq!(out.get_pixel(10, 300), &Rgba([0, 255, 0, 255]));
        assert_eq!(out.get_pixel(300, 300), &Rgba([0, 0, 255, 255]));
    }
}
