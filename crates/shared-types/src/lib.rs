//! Data model shared by the editor crates
//!
//! Geometry in the three coordinate spaces the editor juggles (screen pixels,
//! page units, PDF page space), the field definitions users place on a page,
//! and the annotations exported for flattening.

pub mod annotation;
pub mod field;
pub mod geometry;

pub use annotation::{Annotation, AnnotationContent};
pub use field::{FieldDef, FieldType, ParseFieldTypeError, Tool};
pub use geometry::{PageSize, PdfRect, Point, Rect};
