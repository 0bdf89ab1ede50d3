use shared_pdf::PdfError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Failed to load document: {0}")]
    LoadError(#[from] PdfError),

    #[error("Document has no pages")]
    EmptyDocument,

    #[error("Page {index} out of range (document has {count} pages)")]
    PageOutOfRange { index: i32, count: u32 },

    #[error("Failed to rasterize page {page}: {reason}")]
    RasterizeError { page: u32, reason: String },

    #[error("Font error: {0}")]
    FontError(String),

    #[error("Image error: {0}")]
    ImageError(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
