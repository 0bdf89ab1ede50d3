//! Shared fixtures for editor integration tests

#![allow(dead_code)]

use editor_core::provider::{raster_size, read_page_sizes};
use editor_core::{EditorError, PageProvider};
use lopdf::{dictionary, Document, Object};
use shared_types::PageSize;
use tiny_skia::Pixmap;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Build a PDF with `count` US Letter pages
pub fn letter_pdf(count: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let kids: Vec<Object> = (0..count)
        .map(|_| {
            let page = dictionary! {
                "Type" => "Page",
                "Parent" => Object::Reference(pages_id),
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            };
            Object::Reference(doc.add_object(page))
        })
        .collect();

    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => count as i64,
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// Reads real page geometry and paints blank pages, recording every call
#[derive(Debug, Default)]
pub struct RecordingProvider {
    pub sizes: Vec<PageSize>,
    pub rasterized: Vec<(u32, f64)>,
    pub presented: Vec<u32>,
    pub revoked: Vec<u32>,
}

impl PageProvider for RecordingProvider {
    fn load(&mut self, bytes: &[u8]) -> Result<Vec<PageSize>, EditorError> {
        self.sizes = read_page_sizes(bytes)?;
        Ok(self.sizes.clone())
    }

    fn rasterize(&mut self, page: u32, scale: f64) -> Result<Pixmap, EditorError> {
        self.rasterized.push((page, scale));
        let (w, h) = raster_size(self.sizes[page as usize - 1], scale);
        let mut pixmap = Pixmap::new(w, h)
            .ok_or_else(|| EditorError::ImageError(format!("Invalid page size {}x{}", w, h)))?;
        pixmap.fill(tiny_skia::Color::WHITE);
        Ok(pixmap)
    }

    fn present(&mut self, page: u32, _surface: &Pixmap) {
        self.presented.push(page);
    }

    fn revoke(&mut self, page: u32) {
        self.revoked.push(page);
    }
}
