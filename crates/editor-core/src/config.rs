//! Editor configuration
//!
//! Every knob has a default matching the stock editor, so an empty TOML
//! document (or `EditorConfig::default()`) is a complete configuration.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure loaded from TOML files
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Page layout and render window
    #[serde(default)]
    pub viewport: ViewportConfig,
    /// Zoom limits
    #[serde(default)]
    pub zoom: ZoomConfig,
    /// Field placement and presentation
    #[serde(default)]
    pub fields: FieldConfig,
    /// Signature capture
    #[serde(default)]
    pub signature: SignatureConfig,
}

impl EditorConfig {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the TOML is malformed
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string
    ///
    /// # Example
    ///
    /// ```
    /// use editor_core::config::EditorConfig;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let config = EditorConfig::from_str(r#"
    ///     [zoom]
    ///     max = 4.0
    /// "#)?;
    /// assert_eq!(config.zoom.max, 4.0);
    /// assert_eq!(config.zoom.min, 0.5);
    /// # Ok(())
    /// # }
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        toml::from_str(s).context("Failed to parse TOML configuration")
    }
}

/// Page layout parameters, all in screen pixels unless noted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewportConfig {
    /// Horizontal space kept free around a page when fitting (default: 40)
    #[serde(default = "default_horizontal_padding")]
    pub horizontal_padding: f64,
    /// Vertical space kept free around a page when fitting (default: 80)
    #[serde(default = "default_vertical_padding")]
    pub vertical_padding: f64,
    /// Widest a fitted page may get (default: 1000)
    #[serde(default = "default_max_page_width")]
    pub max_page_width: f64,
    /// Below this available height pages fit to width instead (default: 800)
    #[serde(default = "default_min_usable_height")]
    pub min_usable_height: f64,
    /// Offset of the first page from the top of the scroll surface (default: 30)
    #[serde(default = "default_content_top")]
    pub content_top: f64,
    /// Space between consecutive pages (default: 20)
    #[serde(default = "default_page_gap")]
    pub page_gap: f64,
    /// Render margin around the visible region, as a fraction of the viewport height (default: 0.5)
    #[serde(default = "default_overdraw_ratio")]
    pub overdraw_ratio: f64,
    /// Rendered pages further than this many viewport heights are evicted (default: 5.0)
    #[serde(default = "default_evict_ratio")]
    pub evict_ratio: f64,
    /// Pages rasterized per frame while a render pass drains (default: 1)
    #[serde(default = "default_pages_per_frame")]
    pub pages_per_frame: usize,
}

fn default_horizontal_padding() -> f64 {
    40.0
}

fn default_vertical_padding() -> f64 {
    80.0
}

fn default_max_page_width() -> f64 {
    1000.0
}

fn default_min_usable_height() -> f64 {
    800.0
}

fn default_content_top() -> f64 {
    30.0
}

fn default_page_gap() -> f64 {
    20.0
}

fn default_overdraw_ratio() -> f64 {
    0.5
}

fn default_evict_ratio() -> f64 {
    5.0
}

fn default_pages_per_frame() -> usize {
    1
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            horizontal_padding: default_horizontal_padding(),
            vertical_padding: default_vertical_padding(),
            max_page_width: default_max_page_width(),
            min_usable_height: default_min_usable_height(),
            content_top: default_content_top(),
            page_gap: default_page_gap(),
            overdraw_ratio: default_overdraw_ratio(),
            evict_ratio: default_evict_ratio(),
            pages_per_frame: default_pages_per_frame(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoomConfig {
    #[serde(default = "default_zoom_min")]
    pub min: f64,
    #[serde(default = "default_zoom_max")]
    pub max: f64,
    /// Increment used by the zoom in/out buttons
    #[serde(default = "default_zoom_step")]
    pub step: f64,
}

fn default_zoom_min() -> f64 {
    0.5
}

fn default_zoom_max() -> f64 {
    3.0
}

fn default_zoom_step() -> f64 {
    0.5
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            min: default_zoom_min(),
            max: default_zoom_max(),
            step: default_zoom_step(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldConfig {
    /// Swatch color of new fields
    #[serde(default = "default_field_color")]
    pub color: String,
    /// Width of a new field, in pixels at the page scale of placement
    #[serde(default = "default_field_width")]
    pub width: f64,
    #[serde(default = "default_checkbox_width")]
    pub checkbox_width: f64,
    #[serde(default = "default_field_height")]
    pub height: f64,
    /// Font size of text and date values at render scale 1.0
    #[serde(default = "default_base_font_size")]
    pub base_font_size: f64,
    /// Left inset of text values inside their box, at render scale 1.0
    #[serde(default = "default_text_inset")]
    pub text_inset: f64,
    /// Hit slop of the selection outline's resize grips
    #[serde(default = "default_grip_size")]
    pub grip_size: f64,
}

fn default_field_color() -> String {
    "#f9e39d".to_string()
}

fn default_field_width() -> f64 {
    200.0
}

fn default_checkbox_width() -> f64 {
    60.0
}

fn default_field_height() -> f64 {
    60.0
}

fn default_base_font_size() -> f64 {
    12.0
}

fn default_text_inset() -> f64 {
    4.0
}

fn default_grip_size() -> f64 {
    8.0
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            color: default_field_color(),
            width: default_field_width(),
            checkbox_width: default_checkbox_width(),
            height: default_field_height(),
            base_font_size: default_base_font_size(),
            text_inset: default_text_inset(),
            grip_size: default_grip_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignatureConfig {
    /// Drawing surface size in pixels
    #[serde(default = "default_canvas_width")]
    pub canvas_width: u32,
    #[serde(default = "default_canvas_height")]
    pub canvas_height: u32,
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f32,
    /// Stroke color as `#rrggbb`
    #[serde(default = "default_stroke_color")]
    pub stroke_color: String,
    /// Maximum deviation, in pixels, dropped by stroke simplification
    #[serde(default = "default_simplify_tolerance")]
    pub simplify_tolerance: f64,
    /// Consecutive points closer than this (CSS pixels) collapse when smoothing
    #[serde(default = "default_equal_point_tolerance")]
    pub equal_point_tolerance: f64,
    #[serde(default = "default_device_pixel_ratio")]
    pub device_pixel_ratio: f64,
    /// Font size of typed signatures
    #[serde(default = "default_typed_font_size")]
    pub typed_font_size: f64,
    /// Margin around typed signature text
    #[serde(default = "default_typed_padding")]
    pub typed_padding: f64,
    /// TrueType font used for typed signatures
    #[serde(default)]
    pub font_path: Option<PathBuf>,
}

fn default_canvas_width() -> u32 {
    600
}

fn default_canvas_height() -> u32 {
    200
}

fn default_stroke_width() -> f32 {
    4.0
}

fn default_stroke_color() -> String {
    "#000000".to_string()
}

fn default_simplify_tolerance() -> f64 {
    2.1
}

fn default_equal_point_tolerance() -> f64 {
    3.0
}

fn default_device_pixel_ratio() -> f64 {
    1.0
}

fn default_typed_font_size() -> f64 {
    48.0
}

fn default_typed_padding() -> f64 {
    30.0
}

impl Default for SignatureConfig {
    fn default() -> Self {
        Self {
            canvas_width: default_canvas_width(),
            canvas_height: default_canvas_height(),
            stroke_width: default_stroke_width(),
            stroke_color: default_stroke_color(),
            simplify_tolerance: default_simplify_tolerance(),
            equal_point_tolerance: default_equal_point_tolerance(),
            device_pixel_ratio: default_device_pixel_ratio(),
            typed_font_size: default_typed_font_size(),
            typed_padding: default_typed_padding(),
            font_path: None,
        }
    }
}
