//! Document annotation editor engine
//!
//! Lays PDF pages out in a scrollable viewport, rasterizes only the pages near
//! the visible window, and lets a user place, move and resize form fields
//! (signature, initials, date, text, checkbox) on them. Field values are
//! captured through the value editor, including a freehand signature pad, and
//! exported as page-space annotations for flattening into the PDF.
//!
//! The host drives the engine with pointer and viewport events and calls
//! [`Editor::tick`] from its display-refresh callback.

pub mod config;
pub mod editor;
pub mod error;
pub mod export;
pub mod image;
pub mod overlay;
pub mod provider;
pub mod scheduler;
pub mod signature;
pub mod simplify;
pub mod state;
pub mod text;
pub mod value_editor;
pub mod viewport;

pub use config::EditorConfig;
pub use editor::{Document, Editor, EditorEvent};
pub use error::EditorError;
pub use export::export_annotations;
pub use image::EncodedImage;
pub use overlay::{FieldOverlay, SelectionOutline, ToolbarState};
pub use provider::{read_page_sizes, PageProvider};
pub use scheduler::{FrameScheduler, PassKind};
pub use signature::SignaturePad;
pub use state::{EditorState, FieldHandle, FieldId, FieldValue};
pub use text::{GlyphSource, TextMetrics, TrueTypeFont};
pub use value_editor::{EditOutcome, SignatureMethod, ValueEditSession, ValueEditor};
pub use viewport::{PageRef, Viewport};
