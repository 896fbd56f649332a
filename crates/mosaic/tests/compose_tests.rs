//! Tests for mosaic composition and cropping.

use image::{Rgba, RgbaImage};
use mosaic::{compose, decode_tile};
use radar_core::{GeoPoint, TileGrid, Viewport, TILE_SIZE};

fn solid_tile(pixel: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(TILE_SIZE, TILE_SIZE, Rgba(pixel))
}

fn tiles(count: usize, pixel: [u8; 4]) -> Vec<Option<RgbaImage>> {
    (0..count).map(|_| Some(solid_tile(pixel))).collect()
}

#[test]
fn test_output_is_exactly_viewport_sized() {
    // Odd viewport sizes and fractional offsets must not change the
    // output dimensions.
    for (w, h) in [(500, 500), (480, 272), (257, 511), (512, 512)] {
        let grid = TileGrid::new((31.0234375, 31.0234375), (32.9765625, 32.9765625), 6);
        let viewport = Viewport::new(GeoPoint::new(0.0, 0.0), 6, w, h);

        let out = compose(&tiles(4, [10, 20, 30, 255]), &grid, &viewport).unwrap();
        assert_eq!(out.width(), w);
        assert_eq!(out.height(), h);
    }
}

#[test]
fn test_crop_respects_fractional_offset() {
    // NW fraction 0.5 puts the viewport origin 128 px into the NW tile.
    let grid = TileGrid::new((4.5, 4.5), (5.9, 5.9), 6);
    let viewport = Viewport::new(GeoPoint::new(0.0, 0.0), 6, 256, 256);

    let buffer = vec![
        Some(solid_tile([255, 0, 0, 255])),
        Some(solid_tile([0, 255, 0, 255])),
        Some(solid_tile([0, 0, 255, 255])),
        Some(solid_tile([255, 255, 0, 255])),
    ];
    let out = compose(&buffer, &grid, &viewport).unwrap();

    // The 256x256 viewport straddles all four tiles around the shared
    // corner at canvas (256, 256), which maps to output (128, 128).
    assert_eq!(out.get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
    assert_eq!(out.get_pixel(255, 0), &Rgba([0, 255, 0, 255]));
    assert_eq!(out.get_pixel(0, 255), &Rgba([0, 0, 255, 255]));
    assert_eq!(out.get_pixel(255, 255), &Rgba([255, 255, 0, 255]));
}

#[test]
fn test_all_tiles_missing_yields_transparent_frame() {
    let grid = TileGrid::new((4.0, 4.0), (5.5, 5.5), 6);
    let viewport = Viewport::new(GeoPoint::new(0.0, 0.0), 6, 300, 200);

    let out = compose(&vec![None, None, None, None], &grid, &viewport).unwrap();
    assert_eq!(out.width(), 300);
    assert_eq!(out.height(), 200);
    assert!(out.pixels().all(|p| p.0 == [0, 0, 0, 0]));
}

#[test]
fn test_decode_tile_round_trip() {
    let tile = solid_tile([90, 120, 200, 255]);
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgba8(tile.clone())
        .write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageFormat::Png,
        )
        .unwrap();

    let decoded = decode_tile(&bytes).unwrap();
    assert_eq!(decoded, tile);
}

#[test]
fn test_decode_tile_rejects_garbage() {
    assert!(decode_tile(b"not a png").is_err());
}
