//! Export filled fields as page-space annotations

use crate::config::FieldConfig;
use crate::error::EditorError;
use crate::image::checkbox_glyph;
use crate::overlay::layout_text;
use crate::state::{resolve_page, FieldHandle, FieldValue};
use crate::text::TextMetrics;
use shared_pdf::screen_rect_to_page;
use shared_types::{Annotation, AnnotationContent, FieldType, PageSize};

/// One annotation per filled field, in field order
///
/// Geometry is taken at each field's own creation scale, converted to page
/// units and flipped to a bottom-left origin. Text values are shifted by the
/// offset of their laid-out text inside the field box so the flattened text
/// lands where it was shown.
pub fn export_annotations(
    fields: &[FieldHandle],
    pages: &[PageSize],
    metrics: &dyn TextMetrics,
    config: &FieldConfig,
) -> Result<Vec<Annotation>, EditorError> {
    let page_count = pages.len() as u32;
    let mut annotations = Vec::new();

    for field in fields.iter().filter(|f| f.has_value()) {
        let def = &field.def;
        let page = resolve_page(def.page, page_count).ok_or(EditorError::PageOutOfRange {
            index: def.page,
            count: page_count,
        })?;
        let page_height = pages[page as usize - 1].height;
        let scale = def.scale;
        let mut rect = screen_rect_to_page(def.rect(), scale, page_height);

        let content = match (def.field_type, &field.value) {
            (FieldType::Checkbox, _) => AnnotationContent::Image {
                png: checkbox_glyph(def.width, def.height)?.into_png(),
            },
            (FieldType::Signature | FieldType::Initials, Some(FieldValue::Image(image))) => {
                AnnotationContent::Image {
                    png: image.png().to_vec(),
                }
            }
            (FieldType::Date | FieldType::Text, Some(FieldValue::Text(text))) => {
                let layout = layout_text(text, def.rect(), scale, metrics, config);
                rect.x += layout.offset.x / scale;
                rect.y -= layout.offset.y / scale;
                AnnotationContent::Text {
                    value: text.clone(),
                }
            }
            (field_type, _) => {
                tracing::warn!("Skipping {} field with mismatched value", field_type);
                continue;
            }
        };

        annotations.push(Annotation {
            page,
            rect,
            content,
        });
    }

    tracing::debug!(
        "Exported {} annotations from {} fields",
        annotations.len(),
        fields.len()
    );
    Ok(annotations)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::overlay::FieldOverlay;
    use crate::state::FieldId;
    use crate::text::AverageAdvanceMetrics;
    use proptest::prelude::*;
    use shared_pdf::page_rect_to_screen;
    use shared_types::{FieldDef, Rect};

    fn dimension() -> impl Strategy<Value = f64> {
        1.0f64..400.0
    }

    fn render_scale() -> impl Strategy<Value = f64> {
        0.25f64..4.0
    }

    proptest! {
        /// Property: flipping an exported image rect back at the field scale restores the box
        #[test]
        fn export_roundtrip(
            scale in render_scale(),
            x in 0.0f64..500.0,
            y in 0.0f64..700.0,
            w in dimension(),
            h in dimension(),
        ) {
            let field = FieldHandle {
                id: FieldId::new(),
                def: FieldDef {
                    field_type: FieldType::Checkbox,
                    page: 1,
                    scale,
                    x,
                    y,
                    width: w,
                    height: h,
                    color: String::new(),
                    label: String::new(),
                    signee: String::new(),
                    optional: None,
                    value: None,
                },
                overlay: FieldOverlay::default(),
                value: Some(FieldValue::Checked),
            };
            let page = PageSize::letter();
            let annotations = export_annotations(
                &[field],
                &[page],
                &AverageAdvanceMetrics::default(),
                &FieldConfig::default(),
            ).unwrap();
            let back = page_rect_to_screen(annotations[0].rect, scale, page.height);
            let original = Rect::new(x, y, w, h);
            prop_assert!((back.x - original.x).abs() < 1e-6);
            prop_assert!((back.y - original.y).abs() < 1e-6);
            prop_assert!((back.width - original.width).abs() < 1e-6);
            prop_assert!((back.height - original.height).abs() < 1e-6);
        }
    }
}
