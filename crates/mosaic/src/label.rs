//! Timestamp/attribution label overlay.

use std::path::Path;

use chrono::{Local, TimeZone};
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use rusttype::{Font, Scale};
use tracing::warn;

/// Fixed top-left label position.
const LABEL_X: i32 = 5;
const LABEL_Y: i32 = 2;

/// Label rendering configuration for composite frames.
///
/// The font is loaded from a TTF file at startup. Without a usable font
/// the label is skipped; a degraded frame beats a dropped one.
#[derive(Debug, Clone)]
pub struct LabelStyle {
    font: Option<Font<'static>>,
    scale: Scale,
    color: Rgba<u8>,
    attribution: String,
}

impl LabelStyle {
    /// A label style with no font; `draw` is a no-op until one is loaded.
    pub fn new(attribution: impl Into<String>) -> Self {
        Self {
            font: None,
            scale: Scale::uniform(13.0),
            color: Rgba([255, 255, 255, 255]),
            attribution: attribution.into(),
        }
    }

    /// Load the label font from a TTF file. A missing or unparseable
    /// font logs a warning and leaves the label disabled.
    pub fn with_font_path(mut self, path: &Path) -> Self {
        match std::fs::read(path) {
            Ok(bytes) => match Font::try_from_vec(bytes) {
                Some(font) => self.font = Some(font),
                None => warn!(path = %path.display(), "Font file is not a usable TTF; labels disabled"),
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read label font; labels disabled")
            }
        }
        self
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Format the label text for a snapshot timestamp: local wall-clock
    /// time plus the attribution string.
    pub fn text_for(&self, timestamp: i64) -> Option<String> {
        let local = Local.timestamp_opt(timestamp, 0).single()?;
        Some(format!("{} {}", local.format("%H:%M"), self.attribution))
    }

    /// Draw the label onto a composite at the fixed top-left position.
    pub fn draw(&self, image: &mut RgbaImage, timestamp: i64) {
        let Some(font) = &self.font else { return };
        let Some(text) = self.text_for(timestamp) else {
            warn!(timestamp, "Timestamp out of range; skipping label");
            return;
        };

        draw_text_mut(image, self.color, LABEL_X, LABEL_Y, self.scale, font, &text);
    }
}
