//! Common types shared across the radar-mosaic workspace.

pub mod error;
pub mod frame;
pub mod geo;
pub mod tile;

pub use error::{RadarError, RadarResult};
pub use frame::{FrameWindow, RadarFrame, DEFAULT_FRAME_COUNT};
pub use geo::{GeoPoint, Viewport};
pub use tile::{TileGrid, TileParams, MAX_ZOOM, TILE_SIZE};
