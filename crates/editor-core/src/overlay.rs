//! Overlay presentation of placed fields
//!
//! `render_field` turns a definition and the owning page's current scale into
//! everything a host needs to draw the field: its box, icon, label, swatch
//! and value. It is a pure function of its inputs, so rendering twice without
//! changes yields equal overlays.

use crate::config::FieldConfig;
use crate::state::{DragEdges, EditorState, FieldValue, HEdge, VEdge};
use crate::text::TextMetrics;
use shared_types::{FieldDef, FieldType, Point, Rect, Tool};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldIcon {
    Signature,
    Initials,
    Date,
    Text,
    CheckboxChecked,
    CheckboxUnchecked,
}

/// A text value positioned inside its field box
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextLayout {
    pub text: String,
    /// Font size before shrinking to fit
    pub font_size: f64,
    /// Shrink factor applied so the text fits the box width (1.0 when it fits)
    pub fit: f64,
    /// Top-left of the text's bounding box, relative to the field box
    pub offset: Point,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ValuePresentation {
    #[default]
    Empty,
    /// Captured image stretched over the box
    Image,
    Text(TextLayout),
    Checkbox { checked: bool },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldOverlay {
    /// Page-local box in screen pixels
    pub bounds: Rect,
    pub line_height: f64,
    pub icon: Option<FieldIcon>,
    /// Label text, when shown
    pub label: Option<String>,
    /// Color swatch, when shown
    pub swatch: Option<String>,
    pub value: ValuePresentation,
}

/// Compute a field's overlay at `page_scale`
pub fn render_field(
    def: &FieldDef,
    value: Option<&FieldValue>,
    page_scale: f64,
    metrics: &dyn TextMetrics,
    config: &FieldConfig,
) -> FieldOverlay {
    let bounds = def.rect_at(page_scale);
    let filled = value.is_some_and(FieldValue::is_filled);

    let icon = match def.field_type {
        FieldType::Signature => FieldIcon::Signature,
        FieldType::Initials => FieldIcon::Initials,
        FieldType::Date => FieldIcon::Date,
        FieldType::Text => FieldIcon::Text,
        FieldType::Checkbox if filled => FieldIcon::CheckboxChecked,
        FieldType::Checkbox => FieldIcon::CheckboxUnchecked,
    };

    let presentation = match (def.field_type, value) {
        (FieldType::Checkbox, _) => ValuePresentation::Checkbox { checked: filled },
        (_, None) => ValuePresentation::Empty,
        (_, Some(v)) if !v.is_filled() => ValuePresentation::Empty,
        (FieldType::Signature | FieldType::Initials, Some(_)) => ValuePresentation::Image,
        (FieldType::Date | FieldType::Text, Some(v)) => ValuePresentation::Text(layout_text(
            v.as_text().unwrap_or_default(),
            bounds,
            page_scale,
            metrics,
            config,
        )),
    };

    let show_label = !def.label.is_empty() && def.field_type != FieldType::Checkbox && !filled;

    FieldOverlay {
        bounds,
        line_height: bounds.height,
        icon: Some(icon),
        label: show_label.then(|| def.label.clone()),
        swatch: (!filled).then(|| def.color.clone()),
        value: presentation,
    }
}

/// Lay out a single line of text, vertically centered and shrunk to fit
pub fn layout_text(
    text: &str,
    bounds: Rect,
    page_scale: f64,
    metrics: &dyn TextMetrics,
    config: &FieldConfig,
) -> TextLayout {
    let font_size = config.base_font_size * page_scale;
    let inset = config.text_inset * page_scale;
    let extent = metrics.measure(text, font_size);

    let available = (bounds.width - inset).max(0.0);
    let fit = if extent.width > available && extent.width > 0.0 {
        available / extent.width
    } else {
        1.0
    };

    let width = extent.width * fit;
    let height = extent.height() * fit;
    TextLayout {
        text: text.to_string(),
        font_size,
        fit,
        offset: Point::new(inset, (bounds.height - height) / 2.0),
        width,
        height,
    }
}

/// The single outline drawn around the selected field
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectionOutline {
    /// Page the selected field lives on, as stored in its definition
    pub page: Option<i32>,
    pub bounds: Option<Rect>,
    pub grip: f64,
}

impl SelectionOutline {
    pub fn new(grip: f64) -> Self {
        Self {
            page: None,
            bounds: None,
            grip,
        }
    }

    /// Copy the selected field's current box
    pub fn update(&mut self, state: &EditorState) {
        match state.selected_field() {
            Some(field) => {
                self.page = Some(field.def.page);
                self.bounds = Some(field.overlay.bounds);
            }
            None => {
                self.page = None;
                self.bounds = None;
            }
        }
    }

    pub fn is_visible(&self) -> bool {
        self.bounds.is_some()
    }

    /// Resolve a page-local point to the drag it starts
    ///
    /// Points within `grip` of an edge grab that edge, corners grab both, the
    /// interior moves the field. Returns `None` outside the outline.
    pub fn hit(&self, point: Point) -> Option<DragEdges> {
        let bounds = self.bounds?;
        if !bounds.inflate(self.grip).contains(point) {
            return None;
        }

        let to_left = (point.x - bounds.x).abs();
        let to_right = (point.x - bounds.right()).abs();
        let x = if to_left <= self.grip && to_left <= to_right {
            Some(HEdge::Left)
        } else if to_right <= self.grip {
            Some(HEdge::Right)
        } else {
            None
        };

        let to_top = (point.y - bounds.y).abs();
        let to_bottom = (point.y - bounds.bottom()).abs();
        let y = if to_top <= self.grip && to_top <= to_bottom {
            Some(VEdge::Top)
        } else if to_bottom <= self.grip {
            Some(VEdge::Bottom)
        } else {
            None
        };

        Some(DragEdges { x, y })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Default,
    /// Shown over pages while a placing tool is active
    Copy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ToolbarState {
    /// Tool buttons, shown when nothing is selected
    pub main_visible: bool,
    /// Edit/remove buttons, shown for a selection
    pub selection_visible: bool,
    /// Clear-value button
    pub clear_visible: bool,
    pub active_tool: Tool,
    pub cursor: Cursor,
}

impl ToolbarState {
    pub fn from_state(state: &EditorState) -> Self {
        let selected = state.selected_field();
        let clear_visible = selected.is_some_and(|field| {
            field.def.field_type != FieldType::Checkbox && field.has_value()
        });
        let tool = state.tool();
        Self {
            main_visible: selected.is_none(),
            selection_visible: selected.is_some(),
            clear_visible,
            active_tool: tool,
            cursor: match tool {
                Tool::Move => Cursor::Default,
                Tool::Place(_) => Cursor::Copy,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::AverageAdvanceMetrics;
    use pretty_assertions::assert_eq;

    fn def(field_type: FieldType) -> FieldDef {
        FieldDef {
            field_type,
            page: 1,
            scale: 1.0,
            x: 50.0,
            y: 50.0,
            width: 200.0,
            height: 60.0,
            color: "#f9e39d".to_string(),
            label: field_type.default_label().to_string(),
            signee: String::new(),
            optional: None,
            value: None,
        }
    }

    fn render(def: &FieldDef, value: Option<&FieldValue>, scale: f64) -> FieldOverlay {
        render_field(
            def,
            value,
            scale,
            &AverageAdvanceMetrics::default(),
            &FieldConfig::default(),
        )
    }

    #[test]
    fn test_empty_signature_shows_label_and_swatch() {
        let overlay = render(&def(FieldType::Signature), None, 1.0);
        assert_eq!(overlay.bounds, Rect::new(50.0, 50.0, 200.0, 60.0));
        assert_eq!(overlay.line_height, 60.0);
        assert_eq!(overlay.icon, Some(FieldIcon::Signature));
        assert_eq!(overlay.label.as_deref(), Some("Sign"));
        assert_eq!(overlay.swatch.as_deref(), Some("#f9e39d"));
        assert_eq!(overlay.value, ValuePresentation::Empty);
    }

    #[test]
    fn test_box_follows_page_scale() {
        let overlay = render(&def(FieldType::Date), None, 2.0);
        assert_eq!(overlay.bounds, Rect::new(100.0, 100.0, 400.0, 120.0));
        assert_eq!(overlay.line_height, 120.0);
    }

    #[test]
    fn test_text_value_hides_label_and_swatch() {
        let value = FieldValue::Text("Hello".to_string());
        let overlay = render(&def(FieldType::Text), Some(&value), 1.0);
        assert_eq!(overlay.label, None);
        assert_eq!(overlay.swatch, None);
        let ValuePresentation::Text(layout) = overlay.value else {
            panic!("expected a text layout");
        };
        assert_eq!(layout.text, "Hello");
        assert_eq!(layout.font_size, 12.0);
        assert_eq!(layout.fit, 1.0);
        assert_eq!(layout.offset.x, 4.0);
        assert!((layout.offset.y - 24.0).abs() < 1e-9);
    }

    #[test]
    fn test_long_text_shrinks_to_fit() {
        let value = FieldValue::Text("x".repeat(100));
        let overlay = render(&def(FieldType::Text), Some(&value), 1.0);
        let ValuePresentation::Text(layout) = overlay.value else {
            panic!("expected a text layout");
        };
        assert!(layout.fit < 1.0);
        assert!((layout.width - 196.0).abs() < 1e-9);
    }

    #[test]
    fn test_checkbox_never_shows_label() {
        let mut checkbox = def(FieldType::Checkbox);
        checkbox.label = "Agree".to_string();
        let unchecked = render(&checkbox, None, 1.0);
        assert_eq!(unchecked.label, None);
        assert_eq!(unchecked.icon, Some(FieldIcon::CheckboxUnchecked));
        assert_eq!(unchecked.value, ValuePresentation::Checkbox { checked: false });

        let checked = render(&checkbox, Some(&FieldValue::Checked), 1.0);
        assert_eq!(checked.icon, Some(FieldIcon::CheckboxChecked));
        assert_eq!(checked.swatch, None);
    }

    #[test]
    fn test_render_is_idempotent() {
        let d = def(FieldType::Date);
        let value = FieldValue::Text("01/02/2024".to_string());
        assert_eq!(render(&d, Some(&value), 1.7), render(&d, Some(&value), 1.7));
    }

    #[test]
    fn test_outline_hit_regions() {
        let outline = SelectionOutline {
            page: Some(1),
            bounds: Some(Rect::new(100.0, 100.0, 200.0, 60.0)),
            grip: 8.0,
        };
        assert_eq!(outline.hit(Point::new(200.0, 130.0)), Some(DragEdges::default()));
        assert_eq!(
            outline.hit(Point::new(98.0, 130.0)),
            Some(DragEdges {
                x: Some(HEdge::Left),
                y: None
            })
        );
        assert_eq!(
            outline.hit(Point::new(303.0, 163.0)),
            Some(DragEdges {
                x: Some(HEdge::Right),
                y: Some(VEdge::Bottom)
            })
        );
        assert_eq!(
            outline.hit(Point::new(200.0, 101.0)),
            Some(DragEdges {
                x: None,
                y: Some(VEdge::Top)
            })
        );
        assert_eq!(outline.hit(Point::new(50.0, 50.0)), None);
        assert_eq!(SelectionOutline::new(8.0).hit(Point::new(0.0, 0.0)), None);
    }
}
