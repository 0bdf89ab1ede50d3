//! Page-space annotations handed to the flattening step

use crate::geometry::PdfRect;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AnnotationContent {
    /// PNG image stamped into the rect
    Image {
        #[serde(with = "png_base64")]
        png: Vec<u8>,
    },
    /// Free text drawn at the rect origin
    Text { value: String },
}

/// One filled field, positioned in PDF page space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// 1-based page number
    pub page: u32,
    pub rect: PdfRect,
    #[serde(flatten)]
    pub content: AnnotationContent,
}

impl Annotation {
    pub fn is_image(&self) -> bool {
        matches!(self.content, AnnotationContent::Image { .. })
    }

    pub fn text(&self) -> Option<&str> {
        match &self.content {
            AnnotationContent::Text { value } => Some(value),
            AnnotationContent::Image { .. } => None,
        }
    }
}

mod png_base64 {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}
