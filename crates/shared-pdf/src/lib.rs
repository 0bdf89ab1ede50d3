//! Shared PDF handling utilities
//!
//! This crate provides page geometry inspection and the coordinate
//! transformations between screen pixels and PDF page space used by the
//! editor.

pub mod coords;
pub mod document;
pub mod error;

pub use coords::{page_rect_to_screen, screen_rect_to_page};
pub use document::PdfDocument;
pub use error::PdfError;
