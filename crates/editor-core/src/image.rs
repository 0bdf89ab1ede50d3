//! Encoded images used as field values and image annotations

use crate::error::EditorError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::io::Cursor;
use tiny_skia::{Color, FillRule, Paint, PathBuilder, Pixmap, Transform};

/// Check mark outline in a 24×24 box, as `x, y` pairs
const CHECK_PATH: [f32; 14] = [
    6.375, 8.61538, 3.0, 12.0769, 9.75, 19.0, 21.0, 7.46154, 17.625, 4.0, 9.75, 12.0769, 6.375,
    8.61538,
];
const CHECK_BOX: f32 = 24.0;

/// PNG payload with its pixel dimensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    png: Vec<u8>,
    width: u32,
    height: u32,
    blank: bool,
}

impl EncodedImage {
    /// Encode a rendered surface
    pub fn from_pixmap(pixmap: &Pixmap) -> Result<Self, EditorError> {
        let png = pixmap
            .encode_png()
            .map_err(|e| EditorError::ImageError(e.to_string()))?;
        let blank = pixmap.pixels().iter().all(|px| px.alpha() == 0);
        Ok(Self {
            png,
            width: pixmap.width(),
            height: pixmap.height(),
            blank,
        })
    }

    /// Wrap PNG bytes from elsewhere (an uploaded file, a saved field value)
    pub fn from_png(png: Vec<u8>) -> Result<Self, EditorError> {
        let decoder = png::Decoder::new(Cursor::new(&png));
        let reader = decoder
            .read_info()
            .map_err(|e| EditorError::ImageError(format!("Invalid PNG: {}", e)))?;
        let (width, height) = {
            let info = reader.info();
            (info.width, info.height)
        };
        Ok(Self {
            png,
            width,
            height,
            blank: false,
        })
    }

    pub fn from_base64(encoded: &str) -> Result<Self, EditorError> {
        let png = STANDARD
            .decode(encoded.trim().as_bytes())
            .map_err(|e| EditorError::ImageError(format!("Invalid base64: {}", e)))?;
        Self::from_png(png)
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.png)
    }

    pub fn png(&self) -> &[u8] {
        &self.png
    }

    pub fn into_png(self) -> Vec<u8> {
        self.png
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// True when every pixel is transparent (an empty signature capture)
    pub fn is_blank(&self) -> bool {
        self.blank
    }
}

/// Parse `#rrggbb` (or `rrggbb`) into an opaque color, black when malformed
pub fn parse_hex_color(color: &str) -> Color {
    let hex = color.trim_start_matches('#');
    if hex.len() >= 6 && hex.is_char_boundary(6) {
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).unwrap_or(0);
        Color::from_rgba8(channel(0..2), channel(2..4), channel(4..6), 255)
    } else {
        Color::BLACK
    }
}

/// Render the check glyph centered in a `width`×`height` box
pub fn checkbox_glyph(width: f64, height: f64) -> Result<EncodedImage, EditorError> {
    let w = width.round().max(1.0) as u32;
    let h = height.round().max(1.0) as u32;
    let mut pixmap = Pixmap::new(w, h)
        .ok_or_else(|| EditorError::ImageError(format!("Invalid glyph size {}x{}", w, h)))?;

    let mut pb = PathBuilder::new();
    for (i, xy) in CHECK_PATH.chunks_exact(2).enumerate() {
        if i == 0 {
            pb.move_to(xy[0], xy[1]);
        } else {
            pb.line_to(xy[0], xy[1]);
        }
    }
    pb.close();
    let path = pb
        .finish()
        .ok_or_else(|| EditorError::ImageError("Empty check path".to_string()))?;

    let scale = w.min(h) as f32 / CHECK_BOX;
    let offset = CHECK_BOX * scale / 2.0;
    let transform = Transform::from_translate(w as f32 / 2.0 - offset, h as f32 / 2.0 - offset)
        .pre_scale(scale, scale);

    let mut paint = Paint::default();
    paint.set_color(Color::BLACK);
    paint.anti_alias = true;
    pixmap.fill_path(&path, &paint, FillRule::Winding, transform, None);

    EncodedImage::from_pixmap(&pixmap)
}
