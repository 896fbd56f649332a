//! Coordinate transformations for slippy-tile mapping.
//!
//! Implements the Web Mercator projection from scratch without external
//! dependencies.

pub mod mercator;

pub use mercator::{tile_xy, viewport_corners, viewport_grid, Corners, MercatorProjection};
