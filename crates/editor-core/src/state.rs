//! Field list, tool, selection and in-progress drags
//!
//! All mutation goes through the named operations here so the selection
//! invariant (at most one selected field) holds everywhere. Operations that
//! need a selection panic without one: the editor only exposes them while a
//! field is selected.

use crate::config::FieldConfig;
use crate::error::EditorError;
use crate::image::EncodedImage;
use crate::overlay::FieldOverlay;
use shared_types::{FieldDef, FieldType, Point, Rect, Tool};
use std::fmt;
use uuid::Uuid;

/// Value stored in `FieldDef::value` for a ticked checkbox
pub const CHECKED: &str = "checked";

/// Stable identity of a placed field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(Uuid);

impl FieldId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FieldId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// In-memory value of a field, before serialization
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Image(EncodedImage),
    Text(String),
    Checked,
}

impl FieldValue {
    /// Whether the value counts as filled in (blank captures do not)
    pub fn is_filled(&self) -> bool {
        match self {
            FieldValue::Image(image) => !image.is_blank(),
            FieldValue::Text(text) => !text.is_empty(),
            FieldValue::Checked => true,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_image(&self) -> Option<&EncodedImage> {
        match self {
            FieldValue::Image(image) => Some(image),
            _ => None,
        }
    }

    /// Serialized form stored in `FieldDef::value`
    pub fn serialize(&self) -> String {
        match self {
            FieldValue::Image(image) => image.to_base64(),
            FieldValue::Text(text) => text.clone(),
            FieldValue::Checked => CHECKED.to_string(),
        }
    }

    /// Decode a serialized value for a field of `field_type`
    ///
    /// Empty strings and unticked checkboxes decode to no value.
    pub fn deserialize(field_type: FieldType, raw: &str) -> Result<Option<Self>, EditorError> {
        if raw.is_empty() {
            return Ok(None);
        }
        let value = match field_type {
            FieldType::Signature | FieldType::Initials => {
                FieldValue::Image(EncodedImage::from_base64(raw)?)
            }
            FieldType::Checkbox if raw == CHECKED => FieldValue::Checked,
            FieldType::Checkbox => return Ok(None),
            FieldType::Date | FieldType::Text => FieldValue::Text(raw.to_string()),
        };
        Ok(Some(value))
    }
}

/// A placed field with its live overlay and transient value
#[derive(Debug, Clone)]
pub struct FieldHandle {
    pub id: FieldId,
    pub def: FieldDef,
    pub overlay: FieldOverlay,
    pub value: Option<FieldValue>,
}

impl FieldHandle {
    pub fn has_value(&self) -> bool {
        self.value.as_ref().is_some_and(FieldValue::is_filled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HEdge {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VEdge {
    Top,
    Bottom,
}

/// Edges grabbed by a drag; no edges means the whole field moves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DragEdges {
    pub x: Option<HEdge>,
    pub y: Option<VEdge>,
}

impl DragEdges {
    pub fn is_move(&self) -> bool {
        self.x.is_none() && self.y.is_none()
    }
}

/// An in-progress move or resize
#[derive(Debug, Clone)]
pub struct FieldTransform {
    pub field: FieldId,
    /// Pointer position when the drag started
    pub origin: Point,
    /// Definition at drag start
    pub initial: FieldDef,
    pub edges: DragEdges,
}

#[derive(Debug, Default)]
pub struct EditorState {
    fields: Vec<FieldHandle>,
    tool: Tool,
    selected: Option<FieldId>,
    transform: Option<FieldTransform>,
}

impl EditorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fields(&self) -> &[FieldHandle] {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> impl Iterator<Item = &mut FieldHandle> {
        self.fields.iter_mut()
    }

    pub fn field(&self, id: FieldId) -> Option<&FieldHandle> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn field_mut(&mut self, id: FieldId) -> Option<&mut FieldHandle> {
        self.fields.iter_mut().find(|f| f.id == id)
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
    }

    pub fn selected(&self) -> Option<FieldId> {
        self.selected
    }

    pub fn selected_field(&self) -> Option<&FieldHandle> {
        self.selected.and_then(|id| self.field(id))
    }

    pub fn selected_field_mut(&mut self) -> Option<&mut FieldHandle> {
        let id = self.selected?;
        self.field_mut(id)
    }

    pub fn transform(&self) -> Option<&FieldTransform> {
        self.transform.as_ref()
    }

    /// Append an existing definition, e.g. one supplied with the document
    pub fn insert(&mut self, def: FieldDef, value: Option<FieldValue>) -> FieldId {
        let id = FieldId::new();
        self.fields.push(FieldHandle {
            id,
            def,
            overlay: FieldOverlay::default(),
            value,
        });
        id
    }

    /// Create a field at a page-local pointer position
    ///
    /// The field records `page_scale` as its creation scale, the tool returns
    /// to `Move` and the new field becomes the selection.
    pub fn place_field(
        &mut self,
        field_type: FieldType,
        page: i32,
        at: Point,
        page_scale: f64,
        config: &FieldConfig,
    ) -> FieldId {
        let width = if field_type == FieldType::Checkbox {
            config.checkbox_width
        } else {
            config.width
        };
        let def = FieldDef {
            field_type,
            page,
            scale: page_scale,
            x: at.x,
            y: at.y,
            width,
            height: config.height,
            color: config.color.clone(),
            label: field_type.default_label().to_string(),
            signee: String::new(),
            optional: None,
            value: None,
        };
        let id = self.insert(def, None);
        tracing::debug!(
            "Placed {} field {} on page {} at ({:.1}, {:.1})",
            field_type,
            id,
            page,
            at.x,
            at.y
        );
        self.tool = Tool::Move;
        self.select(id);
        id
    }

    /// Select `id`, replacing any previous selection
    ///
    /// # Panics
    ///
    /// Panics if no field has this id.
    pub fn select(&mut self, id: FieldId) {
        assert!(self.field(id).is_some(), "select: unknown field {}", id);
        self.selected = Some(id);
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
        self.transform = None;
    }

    /// Start dragging the selected field
    ///
    /// # Panics
    ///
    /// Panics if nothing is selected.
    pub fn begin_transform(&mut self, pointer: Point, edges: DragEdges) {
        let field = self
            .selected_field()
            .expect("begin_transform requires a selected field");
        self.transform = Some(FieldTransform {
            field: field.id,
            origin: pointer,
            initial: field.def.clone(),
            edges,
        });
    }

    /// Apply the pointer position to the field being dragged
    ///
    /// Deltas are measured at `page_scale` and written back at the field's
    /// creation scale. Width and height stop at zero with the opposite edge
    /// held in place. Returns the updated field, if a drag is active.
    pub fn update_transform(&mut self, pointer: Point, page_scale: f64) -> Option<FieldId> {
        let transform = self.transform.as_ref()?;
        let init = &transform.initial;
        let ratio = init.scale / page_scale;

        let px = (pointer.x - transform.origin.x) * ratio;
        let py = (pointer.y - transform.origin.y) * ratio;

        let (dx, dw) = match transform.edges.x {
            Some(HEdge::Left) => (px, -px),
            Some(HEdge::Right) => (0.0, px),
            None if transform.edges.is_move() => (px, 0.0),
            None => (0.0, 0.0),
        };
        let (dy, dh) = match transform.edges.y {
            Some(VEdge::Top) => (py, -py),
            Some(VEdge::Bottom) => (0.0, py),
            None if transform.edges.is_move() => (py, 0.0),
            None => (0.0, 0.0),
        };

        let (x, width) = clamp_span(init.x + dx, init.width + dw, transform.edges.x == Some(HEdge::Left));
        let (y, height) = clamp_span(init.y + dy, init.height + dh, transform.edges.y == Some(VEdge::Top));

        let id = transform.field;
        let field = self.field_mut(id)?;
        field.def.set_rect(Rect::new(x, y, width, height));
        Some(id)
    }

    pub fn end_transform(&mut self) -> Option<FieldTransform> {
        self.transform.take()
    }

    /// Remove the selected field and clear the selection
    ///
    /// # Panics
    ///
    /// Panics if nothing is selected.
    pub fn remove_selected(&mut self) -> FieldHandle {
        let id = self
            .selected
            .take()
            .expect("remove_selected requires a selected field");
        self.transform = None;
        let index = self
            .fields
            .iter()
            .position(|f| f.id == id)
            .expect("selected field is in the field list");
        let removed = self.fields.remove(index);
        tracing::debug!("Removed {} field {}", removed.def.field_type, id);
        removed
    }

    /// Topmost field on `page` whose box at `page_scale` contains `point`
    pub fn field_at(
        &self,
        page: u32,
        page_count: u32,
        point: Point,
        page_scale: f64,
    ) -> Option<FieldId> {
        self.fields_on_page(page, page_count)
            .rev()
            .find(|f| f.def.rect_at(page_scale).contains(point))
            .map(|f| f.id)
    }

    pub fn fields_on_page(
        &self,
        page: u32,
        page_count: u32,
    ) -> impl DoubleEndedIterator<Item = &FieldHandle> + '_ {
        self.fields
            .iter()
            .filter(move |f| resolve_page(f.def.page, page_count) == Some(page))
    }
}

/// Resolve a stored page index (1-based, `-1` for the last page)
pub fn resolve_page(index: i32, page_count: u32) -> Option<u32> {
    if index == -1 {
        return (page_count > 0).then_some(page_count);
    }
    u32::try_from(index)
        .ok()
        .filter(|&page| page >= 1 && page <= page_count)
}

/// Clamp a span to non-negative length, keeping the far edge fixed when the
/// near edge is the one being dragged
fn clamp_span(start: f64, length: f64, near_edge: bool) -> (f64, f64) {
    if length >= 0.0 {
        (start, length)
    } else if near_edge {
        (start + length, 0.0)
    } else {
        (start, 0.0)
    }
}
