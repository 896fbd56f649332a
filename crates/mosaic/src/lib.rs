//! Mosaic composition for radar tile grids.
//!
//! Stitches a timestamp's ordered tile buffer into one image, crops to
//! exact viewport pixel dimensions, and overlays a timestamp label.

pub mod compose;
pub mod label;

pub use compose::{compose, decode_tile};
pub use label::LabelStyle;
