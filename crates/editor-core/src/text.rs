//! Text measurement and glyph outlines
//!
//! Text and date values are laid out inside their field box, and typed
//! signatures are painted from glyph outlines. Both go through the traits here
//! so the engine does not depend on a particular font backend.

use crate::error::EditorError;
use std::path::Path;
use tiny_skia::PathBuilder;
use ttf_parser::{Face, OutlineBuilder};

/// DejaVu Serif Italic, used for typed signatures when no font is configured
const BUNDLED_SIGNATURE_FONT: &[u8] = include_bytes!("../assets/fonts/DejaVuSerif-Italic.ttf");

/// Horizontal advance and vertical extent of a run of text
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextExtent {
    pub width: f64,
    /// Distance from the baseline up to the top of the line box
    pub ascent: f64,
    /// Distance from the baseline down to the bottom of the line box (positive)
    pub descent: f64,
}

impl TextExtent {
    pub fn height(&self) -> f64 {
        self.ascent + self.descent
    }
}

pub trait TextMetrics {
    fn measure(&self, text: &str, font_size: f64) -> TextExtent;
}

/// Fonts that can also produce painted outlines
pub trait GlyphSource: TextMetrics {
    /// Outline of `text` with its baseline starting at `(x, y)`, in pixels
    ///
    /// Returns `None` when the text has no visible glyphs.
    fn outline(&self, text: &str, font_size: f64, x: f64, y: f64) -> Option<tiny_skia::Path>;
}

/// Metrics from a fixed average advance, used when no font is configured
#[derive(Debug, Clone, Copy)]
pub struct AverageAdvanceMetrics {
    /// Advance per character, in ems
    pub advance: f64,
    pub ascent: f64,
    pub descent: f64,
}

impl Default for AverageAdvanceMetrics {
    fn default() -> Self {
        Self {
            advance: 0.5,
            ascent: 0.8,
            descent: 0.2,
        }
    }
}

impl TextMetrics for AverageAdvanceMetrics {
    fn measure(&self, text: &str, font_size: f64) -> TextExtent {
        TextExtent {
            width: text.chars().count() as f64 * self.advance * font_size,
            ascent: self.ascent * font_size,
            descent: self.descent * font_size,
        }
    }
}

/// TrueType/OpenType font backed by `ttf-parser`
#[derive(Clone)]
pub struct TrueTypeFont {
    data: Vec<u8>,
}

impl std::fmt::Debug for TrueTypeFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrueTypeFont")
            .field("bytes", &self.data.len())
            .finish()
    }
}

impl TrueTypeFont {
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, EditorError> {
        if data.is_empty() {
            return Err(EditorError::FontError("Font file is empty".to_string()));
        }
        Face::parse(&data, 0).map_err(|e| EditorError::FontError(e.to_string()))?;
        Ok(Self { data })
    }

    /// The font shipped with the crate for typed signatures
    pub fn bundled() -> Self {
        Self {
            data: BUNDLED_SIGNATURE_FONT.to_vec(),
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, EditorError> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| {
            EditorError::FontError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        tracing::debug!("Loaded font {} ({} bytes)", path.display(), data.len());
        Self::from_bytes(data)
    }

    fn face(&self) -> Option<Face<'_>> {
        Face::parse(&self.data, 0).ok()
    }
}

impl TextMetrics for TrueTypeFont {
    fn measure(&self, text: &str, font_size: f64) -> TextExtent {
        let Some(face) = self.face() else {
            return TextExtent::default();
        };
        let units = face.units_per_em() as f64;
        let scale = font_size / units;
        let advance: f64 = text
            .chars()
            .filter_map(|c| face.glyph_index(c))
            .map(|gid| face.glyph_hor_advance(gid).unwrap_or(0) as f64)
            .sum();
        TextExtent {
            width: advance * scale,
            ascent: face.ascender() as f64 * scale,
            descent: -(face.descender() as f64) * scale,
        }
    }
}

impl GlyphSource for TrueTypeFont {
    fn outline(&self, text: &str, font_size: f64, x: f64, y: f64) -> Option<tiny_skia::Path> {
        let face = self.face()?;
        let scale = (font_size / face.units_per_em() as f64) as f32;
        let mut pen = Pen {
            builder: PathBuilder::new(),
            scale,
            x: x as f32,
            y: y as f32,
        };
        for c in text.chars() {
            let Some(gid) = face.glyph_index(c) else {
                continue;
            };
            face.outline_glyph(gid, &mut pen);
            pen.x += face.glyph_hor_advance(gid).unwrap_or(0) as f32 * scale;
        }
        pen.builder.finish()
    }
}

/// Collects glyph outlines into pixel space, flipping the font's y-up axis
struct Pen {
    builder: PathBuilder,
    scale: f32,
    x: f32,
    y: f32,
}

impl Pen {
    fn map(&self, x: f32, y: f32) -> (f32, f32) {
        (self.x + x * self.scale, self.y - y * self.scale)
    }
}

impl OutlineBuilder for Pen {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.builder.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.builder.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x, y) = self.map(x, y);
        self.builder.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x2, y2) = self.map(x2, y2);
        let (x, y) = self.map(x, y);
        self.builder.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.builder.close();
    }
}


#[cfg(test)]
mod tests {
    use super::testing::BlockFont;
    use super::*;

    #[test]
    fn test_average_metrics_scale_with_font_size() {
        let metrics = AverageAdvanceMetrics::default();
        let extent = metrics.measure("abcd", 12.0);
        assert_eq!(extent.width, 24.0);
        assert!((extent.height() - 12.0).abs() < 1e-9);
        assert_eq!(metrics.measure("abcd", 24.0).width, 48.0);
    }

    #[test]
    fn test_average_metrics_count_chars_not_bytes() {
        let metrics = AverageAdvanceMetrics::default();
        assert_eq!(metrics.measure("été", 10.0).width, 15.0);
    }

    #[test]
    fn test_font_rejects_empty_and_garbage() {
        assert!(matches!(
            TrueTypeFont::from_bytes(Vec::new()),
            Err(EditorError::FontError(_))
        ));
        assert!(matches!(
            TrueTypeFont::from_bytes(b"definitely not a font".to_vec()),
            Err(EditorError::FontError(_))
        ));
    }

    #[test]
    fn test_missing_font_file() {
        let err = TrueTypeFont::from_file("/no/such/font.ttf").unwrap_err();
        assert!(err.to_string().contains("/no/such/font.ttf"));
    }

    #[test]
    fn test_bundled_font_parses() {
        assert!(TrueTypeFont::from_bytes(BUNDLED_SIGNATURE_FONT.to_vec()).is_ok());
    }

    #[test]
    fn test_bundled_font_measure_grows_with_size() {
        let font = TrueTypeFont::bundled();
        let small = font.measure("Jane Roe", 12.0);
        let large = font.measure("Jane Roe", 24.0);
        assert!(small.width > 0.0);
        assert!((large.width - small.width * 2.0).abs() < 1e-9);
        assert!(small.ascent > 0.0);
        assert!(small.descent > 0.0);
        assert!(font.measure("Jane", 12.0).width < small.width);
    }

    #[test]
    fn test_bundled_font_outline_sits_on_baseline() {
        let font = TrueTypeFont::bundled();
        let extent = font.measure("Jane Roe", 24.0);
        let path = font.outline("Jane Roe", 24.0, 10.0, 40.0).unwrap();
        let bounds = path.bounds();
        // Glyphs rise above the baseline and stay within the ascent
        assert!(bounds.top() < 40.0);
        assert!(bounds.top() as f64 >= 40.0 - extent.ascent - 1.0);
        assert!((bounds.right() as f64) < 10.0 + extent.width + 5.0);
        assert!(font.outline("   ", 24.0, 0.0, 0.0).is_none());
    }

    #[test]
    fn test_block_font_outline_bounds() {
        let path = BlockFont.outline("ab", 10.0, 5.0, 20.0).unwrap();
        let bounds = path.bounds();
        assert!((bounds.left() - 5.0).abs() < 1e-4);
        assert!((bounds.top() - 13.0).abs() < 1e-4);
        assert!(BlockFont.outline("  ", 10.0, 0.0, 0.0).is_none());
    }
}
