//! Page rendering collaborator
//!
//! The engine does not parse or paint PDF content itself. A host plugs in a
//! `PageProvider` (pdfium, pdf.js over wasm, a test double) that knows the
//! page geometry and can rasterize a page at a given scale.

use crate::error::EditorError;
use shared_pdf::PdfDocument;
use shared_types::PageSize;
use tiny_skia::Pixmap;

pub trait PageProvider {
    /// Parse the document and return every page's size in page units
    fn load(&mut self, bytes: &[u8]) -> Result<Vec<PageSize>, EditorError>;

    /// Rasterize a 1-based page at `scale` pixels per page unit
    fn rasterize(&mut self, page: u32, scale: f64) -> Result<Pixmap, EditorError>;

    /// Show `surface` as the page's background
    fn present(&mut self, _page: u32, _surface: &Pixmap) {}

    /// Release whatever `present` handed out for `page`
    ///
    /// Called before the rendered entry is dropped.
    fn revoke(&mut self, _page: u32) {}
}

impl<P: PageProvider + ?Sized> PageProvider for Box<P> {
    fn load(&mut self, bytes: &[u8]) -> Result<Vec<PageSize>, EditorError> {
        (**self).load(bytes)
    }

    fn rasterize(&mut self, page: u32, scale: f64) -> Result<Pixmap, EditorError> {
        (**self).rasterize(page, scale)
    }

    fn present(&mut self, page: u32, surface: &Pixmap) {
        (**self).present(page, surface)
    }

    fn revoke(&mut self, page: u32) {
        (**self).revoke(page)
    }
}

/// Page sizes read straight from the PDF's page tree
///
/// Providers whose renderer does not report geometry can use this in `load`.
pub fn read_page_sizes(bytes: &[u8]) -> Result<Vec<PageSize>, EditorError> {
    let pdf = PdfDocument::from_bytes(bytes)?;
    Ok(pdf.page_sizes()?)
}

/// Pixel dimensions of a page rendered at `scale`
pub fn raster_size(size: PageSize, scale: f64) -> (u32, u32) {
    let width = (size.width * scale).floor().max(1.0) as u32;
    let height = (size.height * scale).floor().max(1.0) as u32;
    (width, height)
}
