//! Page geometry inspection using lopdf

use crate::error::PdfError;
use lopdf::{Dictionary, Document, Object, ObjectId};
use shared_types::PageSize;

/// Parent chains deeper than this are treated as malformed
const MAX_INHERITANCE_DEPTH: usize = 32;

/// Parsed PDF exposing what the editor needs to lay pages out
pub struct PdfDocument {
    doc: Document,
}

impl PdfDocument {
    /// Load a PDF from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PdfError> {
        let doc = Document::load_mem(bytes).map_err(|e| PdfError::ParseError(e.to_string()))?;
        Ok(Self { doc })
    }

    /// Get the number of pages
    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    /// Get page object ID for a given page number (1-indexed)
    fn page_id(&self, page_num: u32) -> Result<ObjectId, PdfError> {
        self.doc
            .get_pages()
            .get(&page_num)
            .copied()
            .ok_or(PdfError::PageNotFound {
                page: page_num,
                count: self.page_count(),
            })
    }

    /// Displayed size of a page (1-indexed) in points
    ///
    /// Uses the CropBox when present, otherwise the MediaBox, either of which
    /// may be inherited from the page tree. Width and height are swapped for
    /// pages rotated by 90 or 270 degrees.
    pub fn page_size(&self, page_num: u32) -> Result<PageSize, PdfError> {
        let page_id = self.page_id(page_num)?;

        let page_box = match self.inherited(page_id, b"CropBox") {
            Some(obj) => self.parse_rect(obj)?,
            None => match self.inherited(page_id, b"MediaBox") {
                Some(obj) => self.parse_rect(obj)?,
                None => {
                    tracing::debug!("Page {} has no MediaBox, assuming US Letter", page_num);
                    [0.0, 0.0, 612.0, 792.0]
                }
            },
        };
        let [_, _, width, height] = page_box;

        let rotate = self
            .inherited(page_id, b"Rotate")
            .and_then(|obj| self.extract_number(obj).ok())
            .unwrap_or(0.0) as i64;

        if rotate.rem_euclid(180) == 90 {
            Ok(PageSize::new(height, width))
        } else {
            Ok(PageSize::new(width, height))
        }
    }

    /// Sizes of every page in document order
    pub fn page_sizes(&self) -> Result<Vec<PageSize>, PdfError> {
        (1..=self.page_count()).map(|n| self.page_size(n)).collect()
    }

    /// Look up a page attribute, walking up the page tree for inheritable keys
    fn inherited(&self, page_id: ObjectId, key: &[u8]) -> Option<&Object> {
        let mut dict = self.dict(page_id)?;
        for _ in 0..MAX_INHERITANCE_DEPTH {
            if let Ok(value) = dict.get(key) {
                return Some(value);
            }
            let parent_id = dict.get(b"Parent").and_then(Object::as_reference).ok()?;
            dict = self.dict(parent_id)?;
        }
        None
    }

    fn dict(&self, id: ObjectId) -> Option<&Dictionary> {
        self.doc.get_object(id).and_then(Object::as_dict).ok()
    }

    /// Parse a PDF rectangle array into [x, y, width, height]
    fn parse_rect(&self, obj: &Object) -> Result<[f64; 4], PdfError> {
        let arr = match obj {
            Object::Array(a) => a,
            Object::Reference(id) => self
                .doc
                .get_object(*id)
                .and_then(Object::as_array)
                .map_err(|e| PdfError::InvalidBox(format!("Failed to resolve reference: {}", e)))?,
            _ => return Err(PdfError::InvalidBox("Page box is not an array".to_string())),
        };

        if arr.len() != 4 {
            return Err(PdfError::InvalidBox(format!(
                "Page box has {} elements, expected 4",
                arr.len()
            )));
        }

        let mut values = [0.0f64; 4];
        for (i, obj) in arr.iter().enumerate() {
            values[i] = self.extract_number(obj)?;
        }

        // Corners may be given in any order
        let (x0, x1) = (values[0].min(values[2]), values[0].max(values[2]));
        let (y0, y1) = (values[1].min(values[3]), values[1].max(values[3]));
        Ok([x0, y0, x1 - x0, y1 - y0])
    }

    /// Extract a number from a PDF object
    fn extract_number(&self, obj: &Object) -> Result<f64, PdfError> {
        match obj {
            Object::Integer(i) => Ok(*i as f64),
            Object::Real(r) => Ok(*r as f64),
            Object::Reference(id) => {
                let resolved = self
                    .doc
                    .get_object(*id)
                    .map_err(|e| PdfError::InvalidBox(format!("Failed to resolve: {}", e)))?;
                self.extract_number(resolved)
            }
            _ => Err(PdfError::InvalidBox("Expected number in rectangle".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    /// Build a PDF whose pages carry the given attributes; `tree_box` is set on
    /// the Pages node for inheritance tests.
    fn build_pdf(pages: Vec<Dictionary>, tree_box: Option<[i64; 4]>) -> Vec<u8> {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();

        let mut kids = Vec::new();
        for mut page in pages {
            page.set("Type", "Page");
            page.set("Parent", Object::Reference(pages_id));
            kids.push(Object::Reference(doc.add_object(page)));
        }

        let count = kids.len() as i64;
        let mut pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        };
        if let Some(b) = tree_box {
            pages_dict.set(
                "MediaBox",
                b.iter().map(|v| Object::Integer(*v)).collect::<Vec<_>>(),
            );
        }
        doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    fn media_box(w: i64, h: i64) -> Dictionary {
        dictionary! {
            "MediaBox" => vec![0.into(), 0.into(), w.into(), h.into()],
        }
    }

    #[test]
    fn test_page_count_and_sizes() {
        let bytes = build_pdf(vec![media_box(612, 792), media_box(595, 842)], None);
        let pdf = PdfDocument::from_bytes(&bytes).unwrap();
        assert_eq!(pdf.page_count(), 2);
        assert_eq!(pdf.page_size(1).unwrap(), PageSize::letter());
        assert_eq!(pdf.page_size(2).unwrap(), PageSize::a4());
    }

    #[test]
    fn test_inherited_media_box() {
        let bytes = build_pdf(vec![Dictionary::new()], Some([0, 0, 300, 400]));
        let pdf = PdfDocument::from_bytes(&bytes).unwrap();
        assert_eq!(pdf.page_size(1).unwrap(), PageSize::new(300.0, 400.0));
    }

    #[test]
    fn test_crop_box_wins_over_media_box() {
        let mut page = media_box(612, 792);
        page.set(
            "CropBox",
            vec![10.into(), 10.into(), 210.into(), 310.into()],
        );
        let bytes = build_pdf(vec![page], None);
        let pdf = PdfDocument::from_bytes(&bytes).unwrap();
        assert_eq!(pdf.page_size(1).unwrap(), PageSize::new(200.0, 300.0));
    }

    #[test]
    fn test_rotated_page_swaps_dimensions() {
        let mut page = media_box(612, 792);
        page.set("Rotate", 90);
        let bytes = build_pdf(vec![page], None);
        let pdf = PdfDocument::from_bytes(&bytes).unwrap();
        assert_eq!(pdf.page_size(1).unwrap(), PageSize::new(792.0, 612.0));
    }

    #[test]
    fn test_missing_page_is_error() {
        let bytes = build_pdf(vec![media_box(612, 792)], None);
        let pdf = PdfDocument::from_bytes(&bytes).unwrap();
        assert!(matches!(
            pdf.page_size(4),
            Err(PdfError::PageNotFound { page: 4, count: 1 })
        ));
    }

    #[test]
    fn test_from_bytes_html_fails() {
        // fetch() returning an SPA fallback instead of the PDF
        let html_bytes = b"<!DOCTYPE html><html><head></head><body>Not a PDF</body></html>";
        assert!(matches!(
            PdfDocument::from_bytes(html_bytes),
            Err(PdfError::ParseError(_))
        ));
    }

    #[test]
    fn test_from_bytes_empty_fails() {
        assert!(PdfDocument::from_bytes(&[]).is_err());
    }

    #[test]
    fn test_parse_rect_rejects_short_array() {
        let pdf = PdfDocument {
            doc: Document::new(),
        };
        let arr = Object::Array(vec![Object::Integer(0), Object::Integer(0)]);
        assert!(matches!(pdf.parse_rect(&arr), Err(PdfError::InvalidBox(_))));
    }

    #[test]
    fn test_extract_number() {
        let pdf = PdfDocument {
            doc: Document::new(),
        };
        assert_eq!(pdf.extract_number(&Object::Integer(42)).unwrap(), 42.0);
        let real = pdf.extract_number(&Object::Real(1.234)).unwrap();
        assert!((real - 1.234).abs() < 0.001);
    }
}
