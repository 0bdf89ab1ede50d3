//! Field definitions placed on document pages

use crate::geometry::Rect;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Signature,
    Initials,
    Date,
    Text,
    Checkbox,
}

impl FieldType {
    pub const ALL: [FieldType; 5] = [
        FieldType::Signature,
        FieldType::Initials,
        FieldType::Date,
        FieldType::Text,
        FieldType::Checkbox,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::Signature => "signature",
            FieldType::Initials => "initials",
            FieldType::Date => "date",
            FieldType::Text => "text",
            FieldType::Checkbox => "checkbox",
        }
    }

    /// Label shown inside a freshly placed field
    pub fn default_label(self) -> &'static str {
        match self {
            FieldType::Signature => "Sign",
            FieldType::Initials => "Initial",
            FieldType::Date => "MM/DD/YYYY",
            FieldType::Text | FieldType::Checkbox => "",
        }
    }

    /// Whether the field's value is a captured image
    pub fn holds_image(self) -> bool {
        matches!(self, FieldType::Signature | FieldType::Initials)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown field type: {0}")]
pub struct ParseFieldTypeError(pub String);

impl FromStr for FieldType {
    type Err = ParseFieldTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "signature" => Ok(FieldType::Signature),
            "initials" => Ok(FieldType::Initials),
            "date" => Ok(FieldType::Date),
            "text" => Ok(FieldType::Text),
            "checkbox" => Ok(FieldType::Checkbox),
            _ => Err(ParseFieldTypeError(s.to_string())),
        }
    }
}

/// Active editor tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tool {
    #[default]
    Move,
    /// Clicking a page places a new field of this type
    Place(FieldType),
}

impl Tool {
    pub fn placing(self) -> Option<FieldType> {
        match self {
            Tool::Move => None,
            Tool::Place(field_type) => Some(field_type),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tool::Move => "move",
            Tool::Place(field_type) => field_type.as_str(),
        }
    }
}

impl FromStr for Tool {
    type Err = ParseFieldTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("move") {
            return Ok(Tool::Move);
        }
        s.parse().map(Tool::Place)
    }
}

/// Durable record of a placed field
///
/// Geometry is stored in pixels at `scale`, the page render scale in effect
/// when the field was created. Serialized keys match the host's fields JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// 1-based page number, `-1` for the last page
    pub page: i32,
    pub scale: f64,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: String,
    pub label: String,
    #[serde(default)]
    pub signee: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optional: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl FieldDef {
    /// Geometry at the creation scale
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn set_rect(&mut self, rect: Rect) {
        self.x = rect.x;
        self.y = rect.y;
        self.width = rect.width;
        self.height = rect.height;
    }

    /// Geometry in pixels at `page_scale`
    pub fn rect_at(&self, page_scale: f64) -> Rect {
        self.rect().scaled(page_scale / self.scale)
    }
}
