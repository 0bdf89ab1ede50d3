use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("Failed to parse PDF: {0}")]
    ParseError(String),

    #[error("Page {page} not found (document has {count} pages)")]
    PageNotFound { page: u32, count: u32 },

    #[error("Invalid page box: {0}")]
    InvalidBox(String),
}
