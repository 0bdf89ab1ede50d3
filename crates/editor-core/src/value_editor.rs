//! Filling in field values
//!
//! Editing a checkbox toggles it and editing an empty signature reuses the
//! most recent signature of the same kind. Everything else opens a session
//! that a later `submit_*` call completes.

use crate::config::SignatureConfig;
use crate::error::EditorError;
use crate::image::EncodedImage;
use crate::signature::SignaturePad;
use crate::state::{EditorState, FieldId, FieldValue};
use crate::text::GlyphSource;
use chrono::NaiveDate;
use shared_types::FieldType;

/// How a signature is being provided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignatureMethod {
    #[default]
    Draw,
    Type,
    Upload,
}

/// An open edit of one field's value
#[derive(Debug, Clone, PartialEq)]
pub enum ValueEditSession {
    Signature {
        field: FieldId,
        method: SignatureMethod,
    },
    Text {
        field: FieldId,
        current: String,
        placeholder: String,
    },
    Date {
        field: FieldId,
        /// Prefilled input, `YYYY-MM-DD`
        initial: String,
    },
}

impl ValueEditSession {
    pub fn field(&self) -> FieldId {
        match self {
            ValueEditSession::Signature { field, .. }
            | ValueEditSession::Text { field, .. }
            | ValueEditSession::Date { field, .. } => *field,
        }
    }
}

/// What `edit` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// Checkbox flipped in place
    Toggled { checked: bool },
    /// Empty signature filled from an earlier one
    Reused,
    /// A session is waiting for input
    Opened,
}

#[derive(Debug)]
pub struct ValueEditor {
    pad: SignaturePad,
    session: Option<ValueEditSession>,
}

impl ValueEditor {
    pub fn new(config: &SignatureConfig, font: Option<Box<dyn GlyphSource>>) -> Self {
        Self {
            pad: SignaturePad::new(config, font),
            session: None,
        }
    }

    pub fn pad(&self) -> &SignaturePad {
        &self.pad
    }

    pub fn pad_mut(&mut self) -> &mut SignaturePad {
        &mut self.pad
    }

    pub fn session(&self) -> Option<&ValueEditSession> {
        self.session.as_ref()
    }

    /// Edit the selected field's value
    ///
    /// # Panics
    ///
    /// Panics if nothing is selected.
    pub fn edit(&mut self, state: &mut EditorState, today: NaiveDate) -> EditOutcome {
        let (id, field_type, empty) = {
            let field = state
                .selected_field()
                .expect("edit requires a selected field");
            (field.id, field.def.field_type, !field.has_value())
        };

        if field_type == FieldType::Checkbox {
            let field = state
                .selected_field_mut()
                .expect("edit requires a selected field");
            let checked = field.value.is_none();
            field.value = checked.then_some(FieldValue::Checked);
            return EditOutcome::Toggled { checked };
        }

        if empty && field_type.holds_image() {
            let existing = state
                .fields()
                .iter()
                .rev()
                .find(|f| f.def.field_type == field_type && f.has_value())
                .and_then(|f| f.value.clone());
            if let Some(value) = existing {
                if let Some(field) = state.field_mut(id) {
                    field.value = Some(value);
                }
                return EditOutcome::Reused;
            }
        }

        let field = state.field(id).expect("selected field exists");
        let session = match field_type {
            FieldType::Signature | FieldType::Initials => {
                self.pad.reset();
                self.pad.set_draw_mode(true);
                ValueEditSession::Signature {
                    field: id,
                    method: SignatureMethod::Draw,
                }
            }
            FieldType::Text => ValueEditSession::Text {
                field: id,
                current: field
                    .value
                    .as_ref()
                    .and_then(FieldValue::as_text)
                    .unwrap_or_default()
                    .to_string(),
                placeholder: if field.def.label.is_empty() {
                    "Start typing...".to_string()
                } else {
                    field.def.label.clone()
                },
            },
            FieldType::Date => ValueEditSession::Date {
                field: id,
                initial: today.format("%Y-%m-%d").to_string(),
            },
            FieldType::Checkbox => unreachable!("checkboxes toggle in place"),
        };
        self.session = Some(session);
        EditOutcome::Opened
    }

    /// Close the session without changing the field
    pub fn cancel(&mut self) -> Option<ValueEditSession> {
        self.session.take()
    }

    /// Switch how the open signature session captures its value
    pub fn set_signature_method(&mut self, method: SignatureMethod) {
        if let Some(ValueEditSession::Signature { method: current, .. }) = self.session.as_mut() {
            *current = method;
            match method {
                SignatureMethod::Draw => self.pad.set_draw_mode(true),
                SignatureMethod::Type => self.pad.set_draw_mode(false),
                SignatureMethod::Upload => {}
            }
        }
    }

    /// Complete a text session; returns the updated field
    pub fn submit_text(&mut self, state: &mut EditorState, text: &str) -> Option<FieldId> {
        let Some(ValueEditSession::Text { field, .. }) = self.session else {
            return None;
        };
        self.session = None;
        set_value(state, field, FieldValue::Text(text.to_string()))
    }

    /// Complete a date session from a `YYYY-MM-DD` input
    ///
    /// The stored text follows the field's label format.
    pub fn submit_date(
        &mut self,
        state: &mut EditorState,
        iso: &str,
    ) -> Result<Option<FieldId>, EditorError> {
        let Some(ValueEditSession::Date { field, .. }) = self.session else {
            return Ok(None);
        };
        let date = NaiveDate::parse_from_str(iso.trim(), "%Y-%m-%d")
            .map_err(|e| EditorError::InvalidDate(format!("{}: {}", iso, e)))?;
        let label = state.field(field).map(|f| f.def.label.clone()).unwrap_or_default();
        self.session = None;
        Ok(set_value(state, field, FieldValue::Text(format_date(&label, date))))
    }

    /// Complete a signature session from the pad
    ///
    /// A blank capture leaves the field empty.
    pub fn submit_signature(
        &mut self,
        state: &mut EditorState,
    ) -> Result<Option<FieldId>, EditorError> {
        let Some(ValueEditSession::Signature { field, .. }) = self.session else {
            return Ok(None);
        };
        let image = self.pad.value()?;
        self.session = None;
        if image.is_blank() {
            tracing::debug!("Blank signature submitted for field {}", field);
            return Ok(clear_value(state, field));
        }
        Ok(set_value(state, field, FieldValue::Image(image)))
    }

    /// Complete a signature session with an uploaded PNG
    pub fn upload_signature(
        &mut self,
        state: &mut EditorState,
        png: Vec<u8>,
    ) -> Result<Option<FieldId>, EditorError> {
        let Some(ValueEditSession::Signature { field, .. }) = self.session else {
            return Ok(None);
        };
        let image = EncodedImage::from_png(png)?;
        self.session = None;
        Ok(set_value(state, field, FieldValue::Image(image)))
    }

    /// Remove the selected field's value
    ///
    /// # Panics
    ///
    /// Panics if nothing is selected.
    pub fn clear(&mut self, state: &mut EditorState) -> FieldId {
        let id = state
            .selected()
            .expect("clear requires a selected field");
        clear_value(state, id);
        id
    }
}

fn set_value(state: &mut EditorState, id: FieldId, value: FieldValue) -> Option<FieldId> {
    let field = state.field_mut(id)?;
    field.value = Some(value);
    Some(id)
}

fn clear_value(state: &mut EditorState, id: FieldId) -> Option<FieldId> {
    let field = state.field_mut(id)?;
    field.value = None;
    Some(id)
}

/// Format a date the way a date field's label asks for
pub fn format_date(label: &str, date: NaiveDate) -> String {
    let pattern = match label {
        "DD/MM/YYYY" => "%d/%m/%Y",
        "MM.DD.YYYY" => "%m.%d.%Y",
        "DD.MM.YYYY" => "%d.%m.%Y",
        "YYYY-MM-DD" => "%Y-%m-%d",
        _ => "%m/%d/%Y",
    };
    date.format(pattern).to_string()
}
