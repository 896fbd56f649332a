//! Composite radar frames and the bounded animation window.

use std::path::PathBuf;

use image::RgbaImage;

/// Default number of frames retained for animation.
pub const DEFAULT_FRAME_COUNT: usize = 10;

/// One composite radar image for a single snapshot timestamp.
#[derive(Debug, Clone)]
pub struct RadarFrame {
    /// Snapshot time, unix seconds.
    pub timestamp: i64,
    /// The composite, sized exactly to the viewport.
    pub image: RgbaImage,
    /// Cache file backing this frame. `None` when the cache write
    /// failed; the frame is still delivered but re-fetched next cycle.
    pub path: Option<PathBuf>,
}

impl RadarFrame {
    pub fn new(timestamp: i64, image: RgbaImage, path: Option<PathBuf>) -> Self {
        Self {
            timestamp,
            image,
            path,
        }
    }
}

/// Bounded, time-ordered frame sequence.
///
/// Invariants: at most `capacity` entries, strictly ascending timestamps,
/// no duplicates. Inserting past capacity evicts the oldest entries and
/// hands them back so the caller can delete their cache files.
#[derive(Debug, Clone)]
pub struct FrameWindow {
    frames: Vec<RadarFrame>,
    capacity: usize,
}

impl FrameWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            frames: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn contains(&self, timestamp: i64) -> bool {
        self.frames.iter().any(|f| f.timestamp == timestamp)
    }

    pub fn frames(&self) -> &[RadarFrame] {
        &self.frames
    }

    /// Insert a frame, keeping ascending timestamp order. A duplicate
    /// timestamp replaces the existing frame. Returns the frames evicted
    /// to stay within capacity (oldest first).
    pub fn insert(&mut self, frame: RadarFrame) -> Vec<RadarFrame> {
        match self
            .frames
            .binary_search_by_key(&frame.timestamp, |f| f.timestamp)
        {
            Ok(i) => self.frames[i] = frame,
            Err(i) => self.frames.insert(i, frame),
        }

        let mut evicted = Vec::new();
        while self.frames.len() > self.capacity {
            evicted.push(self.frames.remove(0));
        }
        evicted
    }

    /// Remove the frame for a timestamp dropped from the catalog.
    pub fn remove(&mut self, timestamp: i64) -> Option<RadarFrame> {
        let i = self
            .frames
            .iter()
            .position(|f| f.timestamp == timestamp)?;
        Some(self.frames.remove(i))
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

impl Default for FrameWindow {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_COUNT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(ts: i64) -> RadarFrame {
        RadarFrame::new(ts, RgbaImage::new(1, 1), None)
    }

    fn timestamps(window: &FrameWindow) -> Vec<i64> {
        window.frames().iter().map(|f| f.timestamp).collect()
    }

    #[test]
    fn test_insert_keeps_ascending_order() {
        let mut window = FrameWindow::new(5);
        for ts in [300, 100, 200] {
            window.insert(frame(ts));
        }
        assert_eq!(timestamps(&window), vec![100, 200, 300]);
    }

    #[test]
    fn test_duplicate_replaces() {
        let mut window = FrameWindow::new(5);
        window.insert(frame(100));
        window.insert(frame(100));
        assert_eq!(window.len(), 1);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut window = FrameWindow::new(3);
        for ts in [100, 200, 300] {
            assert!(window.insert(frame(ts)).is_empty());
        }

        let evicted = window.insert(frame(400));
        assert_eq!(evicted.len(), 1);
        assert_eq!(evicted[0].timestamp, 100);
        assert_eq!(timestamps(&window), vec![200, 300, 400]);
    }

    #[test]
    fn test_invariants_after_arbitrary_insertions() {
        let mut window = FrameWindow::new(4);
        for ts in [50, 10, 90, 10, 70, 30, 80, 20, 60] {
            window.insert(frame(ts));
        }

        let ts = timestamps(&window);
        assert!(ts.len() <= 4);
        assert!(ts.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_remove() {
        let mut window = FrameWindow::new(3);
        window.insert(frame(100));
        window.insert(frame(200));

        assert_eq!(window.remove(100).map(|f| f.timestamp), Some(100));
        assert!(window.remove(100).is_none());
        assert_eq!(timestamps(&window), vec![200]);
    }
}
