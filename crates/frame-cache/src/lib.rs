//! File-based cache for composite radar frames.

pub mod frame_cache;

pub use frame_cache::{FrameCache, FrameKey, DEFAULT_TTL};
