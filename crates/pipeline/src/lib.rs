//! Radar frame pipeline: timestamp catalog, serialized tile fetching,
//! and the orchestrator that turns a viewport into a bounded,
//! time-ordered frame window.

pub mod catalog;
pub mod fetch;
pub mod orchestrator;

pub use catalog::{TilePath, TimestampCatalog, DEFAULT_CATALOG_URL};
pub use fetch::{fetch_tile, HttpTransport, RetryPolicy, TileTransport};
pub use orchestrator::{PipelineConfig, RadarPipeline};
