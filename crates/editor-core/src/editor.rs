//! Top-level editor
//!
//! Routes host input to the viewport, the field state and the value editor,
//! and runs deferred work from the display-refresh callback (`tick`).

use crate::config::{EditorConfig, FieldConfig};
use crate::error::EditorError;
use crate::export::export_annotations;
use crate::overlay::{render_field, SelectionOutline, ToolbarState};
use crate::provider::PageProvider;
use crate::scheduler::{FrameScheduler, PassKind};
use crate::state::{resolve_page, EditorState, FieldId, FieldValue};
use crate::text::{AverageAdvanceMetrics, GlyphSource, TextMetrics, TrueTypeFont};
use crate::value_editor::{EditOutcome, SignatureMethod, ValueEditor};
use crate::viewport::Viewport;
use shared_types::{Annotation, FieldDef, Point, Tool};
use std::collections::VecDeque;

/// A document payload with the fields to show on it
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub pdf: Vec<u8>,
    pub fields: Vec<FieldDef>,
}

/// Notifications for the host
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    /// A value edit session opened for the field; show its input
    EditRequested(FieldId),
    /// The field's value changed
    FieldChanged(FieldId),
    /// The user finished; carries the serialized field definitions
    Submitted { fields_json: String },
}

pub struct Editor<P: PageProvider> {
    config: EditorConfig,
    viewport: Viewport<P>,
    state: EditorState,
    scheduler: FrameScheduler,
    outline: SelectionOutline,
    toolbar: ToolbarState,
    values: ValueEditor,
    metrics: Box<dyn TextMetrics>,
    drag_pointer: Option<Point>,
    events: VecDeque<EditorEvent>,
}

impl<P: PageProvider> std::fmt::Debug for Editor<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("viewport", &self.viewport)
            .field("state", &self.state)
            .field("scheduler", &self.scheduler)
            .field("events", &self.events.len())
            .finish()
    }
}

impl<P: PageProvider> Editor<P> {
    /// Create an editor
    ///
    /// Typed signatures use the configured font file, or the bundled font
    /// when none is set.
    pub fn new(provider: P, config: EditorConfig) -> Result<Self, EditorError> {
        let font: Box<dyn GlyphSource> = match &config.signature.font_path {
            Some(path) => Box::new(TrueTypeFont::from_file(path)?),
            None => Box::new(TrueTypeFont::bundled()),
        };
        let viewport = Viewport::new(provider, config.viewport.clone(), config.zoom.clone());
        Ok(Self {
            viewport,
            state: EditorState::new(),
            scheduler: FrameScheduler::new(),
            outline: SelectionOutline::new(config.fields.grip_size),
            toolbar: ToolbarState::default(),
            values: ValueEditor::new(&config.signature, Some(font)),
            metrics: Box::new(AverageAdvanceMetrics::default()),
            drag_pointer: None,
            events: VecDeque::new(),
            config,
        })
    }

    /// Measure text values with `metrics` instead of average advances
    pub fn with_text_metrics(mut self, metrics: Box<dyn TextMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Paint typed signatures with `font`
    pub fn with_signature_font(mut self, font: Box<dyn GlyphSource>) -> Self {
        self.values = ValueEditor::new(&self.config.signature, Some(font));
        self
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn viewport(&self) -> &Viewport<P> {
        &self.viewport
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    pub fn selection_outline(&self) -> &SelectionOutline {
        &self.outline
    }

    pub fn toolbar(&self) -> &ToolbarState {
        &self.toolbar
    }

    pub fn value_editor(&self) -> &ValueEditor {
        &self.values
    }

    /// Load a document, replacing the current one
    ///
    /// Serialized field values (base64 PNG for signatures) are decoded. On
    /// error the previous document and fields are kept.
    pub fn load(&mut self, document: Document) -> Result<(), EditorError> {
        let mut state = EditorState::new();
        for mut def in document.fields {
            let value = match def.value.take() {
                Some(raw) => FieldValue::deserialize(def.field_type, &raw)?,
                None => None,
            };
            state.insert(def, value);
        }

        self.viewport.load_checked(&document.pdf, |count| {
            for field in state.fields() {
                resolve_page(field.def.page, count).ok_or(EditorError::PageOutOfRange {
                    index: field.def.page,
                    count,
                })?;
            }
            Ok(())
        })?;

        self.state = state;
        self.values.cancel();
        self.drag_pointer = None;
        self.rerender_all();
        self.refresh_selection();
        self.scheduler.request(PassKind::RenderPages);
        tracing::info!(
            "Editor loaded {} pages with {} fields",
            self.viewport.page_count(),
            self.state.fields().len()
        );
        Ok(())
    }

    pub fn set_viewport_size(&mut self, width: f64, height: f64) {
        if self.viewport.set_viewport_size(width, height) {
            self.scheduler.request(PassKind::Relayout);
        }
    }

    pub fn set_scroll(&mut self, top: f64) {
        self.viewport.set_scroll(top);
        self.scheduler.request(PassKind::RenderPages);
    }

    pub fn set_zoom(&mut self, factor: f64) {
        if self.viewport.set_zoom(factor) {
            self.scheduler.request(PassKind::Relayout);
        }
    }

    pub fn zoom_in(&mut self) {
        if self.viewport.zoom_in() {
            self.scheduler.request(PassKind::Relayout);
        }
    }

    pub fn zoom_out(&mut self) {
        if self.viewport.zoom_out() {
            self.scheduler.request(PassKind::Relayout);
        }
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.state.set_tool(tool);
        self.refresh_selection();
    }

    /// Pointer pressed at a viewport position
    ///
    /// Grabs the selection outline, selects a field, or clears the selection
    /// and places a new field when a placing tool is active.
    pub fn pointer_down(&mut self, point: Point) {
        if let Some(edges) = self.outline_hit(point) {
            self.state.begin_transform(point, edges);
            return;
        }

        let page = self.viewport.page_at(point).copied();
        if let Some(page) = page {
            let local = self.viewport.project_pointer_to_page(point, &page);
            let hit = self.state.field_at(
                page.number,
                self.viewport.page_count(),
                local,
                page.scale,
            );
            if let Some(id) = hit {
                self.state.select(id);
                self.refresh_selection();
                return;
            }
        }

        self.state.clear_selection();

        match (page, self.state.tool().placing()) {
            (Some(page), Some(field_type)) => {
                let local = self.viewport.project_pointer_to_page(point, &page);
                let id = self.state.place_field(
                    field_type,
                    page.number as i32,
                    local,
                    page.scale,
                    &self.config.fields,
                );
                self.rerender(id);
                self.refresh_selection();
                self.edit_selected();
            }
            _ => self.refresh_selection(),
        }
    }

    fn outline_hit(&self, point: Point) -> Option<crate::state::DragEdges> {
        let page_index = self.outline.page?;
        let page = self.viewport.get_page(page_index).ok()?;
        let local = self.viewport.project_pointer_to_page(point, page);
        self.outline.hit(local)
    }

    /// Pointer moved; drags are applied on the next frame
    pub fn pointer_move(&mut self, point: Point) {
        if self.state.transform().is_some() {
            self.drag_pointer = Some(point);
            self.scheduler.request(PassKind::Overlay);
        }
    }

    /// Pointer released; applies any pending drag and ends it
    pub fn pointer_up(&mut self) {
        if self.state.transform().is_some() {
            self.apply_drag();
            self.scheduler.cancel(PassKind::Overlay);
            self.state.end_transform();
        }
    }

    pub fn signature_pointer_down(&mut self) -> Result<(), EditorError> {
        self.values.pad_mut().pointer_down()
    }

    /// Stroke sample in signature surface pixels
    pub fn signature_pointer_move(&mut self, point: Point) {
        if self.values.pad_mut().pointer_move(point) {
            self.scheduler.request(PassKind::Stroke);
        }
    }

    pub fn signature_pointer_up(&mut self) {
        self.scheduler.cancel(PassKind::Stroke);
        self.values.pad_mut().pointer_up();
    }

    pub fn resize_signature_pad(&mut self, width: u32, height: u32) {
        self.values.pad_mut().resize(width, height);
    }

    pub fn set_signature_method(&mut self, method: SignatureMethod) {
        self.values.set_signature_method(method);
    }

    pub fn set_typed_signature(&mut self, text: &str) {
        self.values.pad_mut().set_typed_text(text);
    }

    pub fn reset_signature_pad(&mut self) {
        self.values.pad_mut().reset();
    }

    /// Display-refresh callback; returns whether another frame is wanted
    pub fn tick(&mut self) -> bool {
        for pass in self.scheduler.fire() {
            match pass {
                PassKind::Relayout => {
                    self.viewport.relayout();
                    self.rerender_all();
                    self.refresh_selection();
                    self.scheduler.request(PassKind::RenderPages);
                }
                PassKind::RenderPages => {
                    self.viewport.start_render_pass();
                    if self.viewport.is_rasterizing() {
                        self.scheduler.begin(PassKind::RenderPages);
                    }
                }
                PassKind::Overlay => self.apply_drag(),
                PassKind::Stroke => {
                    self.values.pad_mut().render_frame();
                }
            }
        }

        if self.scheduler.is_running(PassKind::RenderPages) {
            let budget = self.config.viewport.pages_per_frame.max(1);
            if !self.viewport.pump_raster(budget) {
                self.scheduler.finish(PassKind::RenderPages);
            }
        }
        self.scheduler.wants_frame()
    }

    fn apply_drag(&mut self) {
        let Some(pointer) = self.drag_pointer.take() else {
            return;
        };
        let Some(page_index) = self.state.transform().map(|t| t.initial.page) else {
            return;
        };
        let Ok(page) = self.viewport.get_page(page_index) else {
            return;
        };
        if let Some(id) = self.state.update_transform(pointer, page.scale) {
            self.rerender(id);
            self.refresh_selection();
        }
    }

    /// Start editing the selected field's value
    ///
    /// # Panics
    ///
    /// Panics if nothing is selected.
    pub fn edit_selected(&mut self) -> EditOutcome {
        let today = chrono::Local::now().date_naive();
        let outcome = self.values.edit(&mut self.state, today);
        let id = self
            .state
            .selected()
            .expect("edit_selected requires a selected field");
        match outcome {
            EditOutcome::Opened => self.events.push_back(EditorEvent::EditRequested(id)),
            EditOutcome::Toggled { .. } | EditOutcome::Reused => self.field_changed(id),
        }
        outcome
    }

    pub fn cancel_edit(&mut self) {
        self.values.cancel();
    }

    pub fn submit_text(&mut self, text: &str) {
        if let Some(id) = self.values.submit_text(&mut self.state, text) {
            self.field_changed(id);
        }
    }

    /// Submit a `YYYY-MM-DD` date
    pub fn submit_date(&mut self, iso: &str) -> Result<(), EditorError> {
        if let Some(id) = self.values.submit_date(&mut self.state, iso)? {
            self.field_changed(id);
        }
        Ok(())
    }

    pub fn submit_signature(&mut self) -> Result<(), EditorError> {
        if let Some(id) = self.values.submit_signature(&mut self.state)? {
            self.field_changed(id);
        }
        Ok(())
    }

    pub fn upload_signature(&mut self, png: Vec<u8>) -> Result<(), EditorError> {
        if let Some(id) = self.values.upload_signature(&mut self.state, png)? {
            self.field_changed(id);
        }
        Ok(())
    }

    /// # Panics
    ///
    /// Panics if nothing is selected.
    pub fn clear_selected_value(&mut self) {
        let id = self.values.clear(&mut self.state);
        self.field_changed(id);
    }

    /// # Panics
    ///
    /// Panics if nothing is selected.
    pub fn remove_selected(&mut self) {
        let removed = self.state.remove_selected();
        if self.values.session().is_some_and(|s| s.field() == removed.id) {
            self.values.cancel();
        }
        self.refresh_selection();
    }

    /// Page-space annotations for every filled field
    pub fn annotations(&self) -> Result<Vec<Annotation>, EditorError> {
        let sizes: Vec<_> = self.viewport.pages().iter().map(|p| p.size).collect();
        export_annotations(
            self.state.fields(),
            &sizes,
            self.metrics.as_ref(),
            &self.config.fields,
        )
    }

    /// Serialize every field definition with its value and emit `Submitted`
    pub fn submit(&mut self) -> Result<String, EditorError> {
        for field in self.state.fields_mut() {
            field.def.value = field
                .value
                .as_ref()
                .filter(|v| v.is_filled())
                .map(FieldValue::serialize);
        }
        let defs: Vec<&FieldDef> = self.state.fields().iter().map(|f| &f.def).collect();
        let fields_json = serde_json::to_string_pretty(&defs)?;
        tracing::info!("Submitting {} fields", defs.len());
        self.events.push_back(EditorEvent::Submitted {
            fields_json: fields_json.clone(),
        });
        Ok(fields_json)
    }

    pub fn poll_event(&mut self) -> Option<EditorEvent> {
        self.events.pop_front()
    }

    pub fn drain_events(&mut self) -> Vec<EditorEvent> {
        self.events.drain(..).collect()
    }

    fn field_changed(&mut self, id: FieldId) {
        self.rerender(id);
        self.refresh_selection();
        self.events.push_back(EditorEvent::FieldChanged(id));
    }

    fn rerender(&mut self, id: FieldId) {
        rerender_field(
            &mut self.state,
            id,
            &self.viewport,
            self.metrics.as_ref(),
            &self.config.fields,
        );
    }

    fn rerender_all(&mut self) {
        let ids: Vec<FieldId> = self.state.fields().iter().map(|f| f.id).collect();
        for id in ids {
            self.rerender(id);
        }
    }

    fn refresh_selection(&mut self) {
        self.outline.update(&self.state);
        self.toolbar = ToolbarState::from_state(&self.state);
    }
}

fn rerender_field<P: PageProvider>(
    state: &mut EditorState,
    id: FieldId,
    viewport: &Viewport<P>,
    metrics: &dyn TextMetrics,
    config: &FieldConfig,
) {
    let Some(field) = state.field_mut(id) else {
        return;
    };
    match viewport.get_page(field.def.page) {
        Ok(page) => {
            field.overlay =
                render_field(&field.def, field.value.as_ref(), page.scale, metrics, config);
        }
        Err(e) => tracing::warn!("Cannot render field {}: {}", id, e),
    }
}
