//! Freehand and typed signature capture
//!
//! A capture session moves `Idle -> Drawing -> (Idle | Committed)`. Pointer
//! moves only buffer samples; `render_frame` (driven by the frame scheduler)
//! paints the samples buffered since the previous frame. On pointer up the
//! stroke is simplified, smoothed and kept as a committed path.

use crate::config::SignatureConfig;
use crate::error::EditorError;
use crate::image::{parse_hex_color, EncodedImage};
use crate::simplify::{simplify_points, smooth_path, svg_path_data, to_skia_path, PathSegment};
use crate::text::GlyphSource;
use shared_types::{Point, Rect};
use tiny_skia::{
    Color, FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, PixmapPaint, Stroke, Transform,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    Drawing,
    Committed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMode {
    Draw,
    Typed,
}

/// One committed stroke
#[derive(Debug, Clone)]
pub struct StrokePath {
    pub segments: Vec<PathSegment>,
    /// Bounds of the simplified samples
    pub bounds: Rect,
}

impl StrokePath {
    pub fn svg(&self) -> String {
        svg_path_data(&self.segments)
    }
}

pub struct SignaturePad {
    config: SignatureConfig,
    font: Option<Box<dyn GlyphSource>>,
    width: u32,
    height: u32,
    surface: Option<Pixmap>,
    samples: Vec<Point>,
    drawn: usize,
    mid_point: Option<Point>,
    paths: Vec<StrokePath>,
    typed_text: String,
    mode: CaptureMode,
    state: CaptureState,
    frame_requested: bool,
}

impl std::fmt::Debug for SignaturePad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignaturePad")
            .field("size", &(self.width, self.height))
            .field("mode", &self.mode)
            .field("state", &self.state)
            .field("paths", &self.paths.len())
            .field("samples", &self.samples.len())
            .finish()
    }
}

impl SignaturePad {
    pub fn new(config: &SignatureConfig, font: Option<Box<dyn GlyphSource>>) -> Self {
        Self {
            config: config.clone(),
            font,
            width: config.canvas_width,
            height: config.canvas_height,
            surface: None,
            samples: Vec::new(),
            drawn: 0,
            mid_point: None,
            paths: Vec::new(),
            typed_text: String::new(),
            mode: CaptureMode::Draw,
            state: CaptureState::Idle,
            frame_requested: false,
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn mode(&self) -> CaptureMode {
        self.mode
    }

    pub fn paths(&self) -> &[StrokePath] {
        &self.paths
    }

    pub fn surface(&self) -> Option<&Pixmap> {
        self.surface.as_ref()
    }

    pub fn typed_text(&self) -> &str {
        &self.typed_text
    }

    /// Whether a stroke frame is waiting to be drawn
    pub fn frame_requested(&self) -> bool {
        self.frame_requested
    }

    /// Nothing captured yet
    pub fn is_empty(&self) -> bool {
        match self.mode {
            CaptureMode::Draw => self.paths.is_empty(),
            CaptureMode::Typed => self.typed_text.trim().is_empty(),
        }
    }

    /// Start a stroke, allocating the drawing surface on first use
    pub fn pointer_down(&mut self) -> Result<(), EditorError> {
        if self.mode == CaptureMode::Typed {
            return Ok(());
        }
        if self.surface.is_none() {
            let surface = Pixmap::new(self.width, self.height).ok_or_else(|| {
                EditorError::ImageError(format!(
                    "Invalid signature surface {}x{}",
                    self.width, self.height
                ))
            })?;
            self.surface = Some(surface);
        }
        self.state = CaptureState::Drawing;
        Ok(())
    }

    /// Buffer a sample in surface pixels; returns whether a frame is needed
    pub fn pointer_move(&mut self, point: Point) -> bool {
        if self.state != CaptureState::Drawing {
            return false;
        }
        self.samples.push(point);
        self.frame_requested = true;
        true
    }

    /// Paint samples buffered since the previous frame, two at a time
    ///
    /// Each pair becomes a quadratic segment with the first sample as control
    /// and the pair's midpoint as end, starting from the previous frame's last
    /// midpoint. Returns the number of segments painted.
    pub fn render_frame(&mut self) -> usize {
        self.frame_requested = false;
        let Some(surface) = self.surface.as_mut() else {
            return 0;
        };

        let paired = self.samples.len() - self.samples.len() % 2;
        let pending = paired.saturating_sub(self.drawn);
        let paint = stroke_paint(&self.config.stroke_color);
        let stroke = stroke_style(self.config.stroke_width);

        let mut painted = 0;
        for pair in self.samples[self.drawn..self.drawn + pending].chunks_exact(2) {
            let (p1, p2) = (pair[0], pair[1]);
            let start = self.mid_point.unwrap_or(p1);
            let mid = p1.midpoint(p2);
            self.mid_point = Some(mid);

            let mut pb = PathBuilder::new();
            pb.move_to(start.x as f32, start.y as f32);
            pb.quad_to(p1.x as f32, p1.y as f32, mid.x as f32, mid.y as f32);
            if let Some(path) = pb.finish() {
                surface.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
            }
            painted += 1;
        }
        self.drawn += pending;
        painted
    }

    /// Finish the stroke
    pub fn pointer_up(&mut self) {
        if self.state != CaptureState::Drawing {
            return;
        }
        self.mid_point = None;
        self.drawn = 0;
        self.frame_requested = false;

        if self.samples.is_empty() {
            self.state = if self.paths.is_empty() {
                CaptureState::Idle
            } else {
                CaptureState::Committed
            };
            return;
        }

        let points = simplify_points(&self.samples, self.config.simplify_tolerance);
        let equal_tolerance = self.config.equal_point_tolerance / self.config.device_pixel_ratio;
        if let Some(bounds) = Rect::bounding(&points) {
            self.paths.push(StrokePath {
                segments: smooth_path(&points, equal_tolerance),
                bounds,
            });
        }
        tracing::trace!(
            "Committed stroke: {} samples simplified to {}",
            self.samples.len(),
            points.len()
        );
        self.samples.clear();
        self.redraw();
        self.state = CaptureState::Committed;
    }

    /// Repaint the surface from the committed paths
    fn redraw(&mut self) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        surface.fill(Color::TRANSPARENT);
        let paint = stroke_paint(&self.config.stroke_color);
        let stroke = stroke_style(self.config.stroke_width);
        for path in &self.paths {
            if let Some(path) = to_skia_path(&path.segments) {
                surface.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
            }
        }
    }

    /// Clear paths, samples and typed text and blank the surface
    pub fn reset(&mut self) {
        self.samples.clear();
        self.paths.clear();
        self.typed_text.clear();
        self.drawn = 0;
        self.mid_point = None;
        self.frame_requested = false;
        self.state = CaptureState::Idle;
        if let Some(surface) = self.surface.as_mut() {
            surface.fill(Color::TRANSPARENT);
        }
    }

    /// Track the host surface size; a width change discards the capture
    ///
    /// A new height takes effect when the surface is next allocated.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width != self.width {
            self.reset();
            self.surface = None;
        }
        self.width = width;
        self.height = height;
    }

    /// Switch between drawing and typing; entering typed mode resets the pad
    pub fn set_draw_mode(&mut self, draw: bool) {
        if draw {
            self.mode = CaptureMode::Draw;
        } else {
            self.reset();
            self.mode = CaptureMode::Typed;
        }
    }

    pub fn set_typed_text(&mut self, text: &str) {
        self.typed_text = text.to_string();
        self.state = if self.typed_text.is_empty() {
            CaptureState::Idle
        } else {
            CaptureState::Committed
        };
    }

    /// Rasterize the capture
    ///
    /// Draw mode crops the committed strokes out of the surface; typed mode
    /// paints the text at its natural size. An empty capture yields a blank
    /// 1×1 image.
    pub fn value(&self) -> Result<EncodedImage, EditorError> {
        match self.mode {
            CaptureMode::Draw => self.drawn_value(),
            CaptureMode::Typed => self.typed_value(),
        }
    }

    fn drawn_value(&self) -> Result<EncodedImage, EditorError> {
        let (Some(surface), Some(first)) = (self.surface.as_ref(), self.paths.first()) else {
            return blank_image();
        };

        let bounds = self.paths[1..]
            .iter()
            .fold(first.bounds, |acc, path| acc.union(&path.bounds))
            .inflate(self.config.stroke_width as f64 / 2.0);

        let x0 = bounds.x.floor().max(0.0);
        let y0 = bounds.y.floor().max(0.0);
        let x1 = bounds.right().ceil().min(surface.width() as f64);
        let y1 = bounds.bottom().ceil().min(surface.height() as f64);
        if x1 <= x0 || y1 <= y0 {
            return blank_image();
        }

        let mut cropped = new_pixmap((x1 - x0) as u32, (y1 - y0) as u32)?;
        cropped.draw_pixmap(
            -(x0 as i32),
            -(y0 as i32),
            surface.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
        EncodedImage::from_pixmap(&cropped)
    }

    fn typed_value(&self) -> Result<EncodedImage, EditorError> {
        let text = self.typed_text.trim();
        if text.is_empty() {
            return blank_image();
        }
        let font = self.font.as_deref().ok_or_else(|| {
            EditorError::FontError("No font configured for typed signatures".to_string())
        })?;

        let size = self.config.typed_font_size;
        let padding = self.config.typed_padding;
        let extent = font.measure(text, size);
        let width = (extent.width + padding * 2.0).ceil() as u32;
        let height = (extent.height() + padding * 2.0).ceil() as u32;

        let mut pixmap = new_pixmap(width, height)?;
        if let Some(path) = font.outline(text, size, padding, padding + extent.ascent) {
            let paint = stroke_paint(&self.config.stroke_color);
            pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
        }
        EncodedImage::from_pixmap(&pixmap)
    }
}

fn new_pixmap(width: u32, height: u32) -> Result<Pixmap, EditorError> {
    Pixmap::new(width, height)
        .ok_or_else(|| EditorError::ImageError(format!("Invalid image size {}x{}", width, height)))
}

fn blank_image() -> Result<EncodedImage, EditorError> {
    EncodedImage::from_pixmap(&new_pixmap(1, 1)?)
}

fn stroke_paint(color: &str) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(parse_hex_color(color));
    paint.anti_alias = true;
    paint
}

fn stroke_style(width: f32) -> Stroke {
    Stroke {
        width,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    }
}
