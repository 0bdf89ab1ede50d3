//! Coordinate transformation between screen pixels and PDF page space
//!
//! Screen coordinates are page-local pixels at a render `scale` (pixels per
//! page unit) with a top-left origin. PDF page space is in page units with a
//! bottom-left origin, so the vertical axis flips against the page height.

use shared_types::{PdfRect, Rect};

/// Convert a page-local pixel rectangle to a PDF page space rectangle
///
/// The screen rect's bottom edge becomes the PDF rect's origin:
/// `[x, H·s − (y + h), x + w, H·s − y] / s`.
pub fn screen_rect_to_page(rect: Rect, scale: f64, page_height: f64) -> PdfRect {
    let viewport_height = page_height * scale;
    PdfRect::from_corners(
        rect.x / scale,
        (viewport_height - (rect.y + rect.height)) / scale,
        (rect.x + rect.width) / scale,
        (viewport_height - rect.y) / scale,
    )
}

/// Convert a PDF page space rectangle to page-local pixels at `scale`
pub fn page_rect_to_screen(rect: PdfRect, scale: f64, page_height: f64) -> Rect {
    Rect {
        x: rect.x * scale,
        y: (page_height - rect.top()) * scale,
        width: rect.width * scale,
        height: rect.height * scale,
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    // Strategy for valid positive dimensions (1.0 to 2000.0 points/pixels)
    fn dimension() -> impl Strategy<Value = f64> {
        1.0f64..2000.0
    }

    fn render_scale() -> impl Strategy<Value = f64> {
        0.1f64..6.0
    }

    // Strategy for a percentage (0.0 to 1.0)
    fn percentage() -> impl Strategy<Value = f64> {
        0.0f64..=1.0
    }

    proptest! {
        /// Property: screen->page->screen returns the original rectangle
        #[test]
        fn roundtrip_screen_rect(
            page_h in dimension(),
            scale in render_scale(),
            x_pct in percentage(),
            y_pct in percentage(),
            w in dimension(),
            h in dimension(),
        ) {
            let rect = Rect::new(x_pct * 1000.0, y_pct * page_h * scale, w, h);
            let page = screen_rect_to_page(rect, scale, page_h);
            let back = page_rect_to_screen(page, scale, page_h);

            let tolerance = 1e-6;
            prop_assert!((back.x - rect.x).abs() < tolerance);
            prop_assert!((back.y - rect.y).abs() < tolerance);
            prop_assert!((back.width - rect.width).abs() < tolerance);
            prop_assert!((back.height - rect.height).abs() < tolerance);
        }

        /// Property: the same page position rendered at two scales maps to the same page rect
        #[test]
        fn scale_preservation(
            page_h in dimension(),
            s1 in render_scale(),
            s2 in render_scale(),
            x_pct in percentage(),
            y_pct in percentage(),
        ) {
            let at = |s: f64| Rect::new(x_pct * 500.0 * s, y_pct * page_h * s, 10.0 * s, 10.0 * s);
            let a = screen_rect_to_page(at(s1), s1, page_h);
            let b = screen_rect_to_page(at(s2), s2, page_h);

            let tolerance = 1e-6;
            prop_assert!((a.x - b.x).abs() < tolerance);
            prop_assert!((a.y - b.y).abs() < tolerance);
        }

        /// Property: moving down on screen moves down in PDF space
        #[test]
        fn y_axis_movement_direction(
            page_h in dimension(),
            scale in render_scale(),
            y1_pct in 0.0f64..0.5,
        ) {
            let y1 = y1_pct * page_h * scale;
            let y2 = (y1_pct + 0.1) * page_h * scale;
            let r1 = screen_rect_to_page(Rect::new(0.0, y1, 1.0, 1.0), scale, page_h);
            let r2 = screen_rect_to_page(Rect::new(0.0, y2, 1.0, 1.0), scale, page_h);
            prop_assert!(r2.y < r1.y);
        }

        /// Property: converted rectangles keep a non-negative size in page units
        #[test]
        fn size_is_scaled_not_flipped(
            page_h in dimension(),
            scale in render_scale(),
            w in dimension(),
            h in dimension(),
        ) {
            let r = screen_rect_to_page(Rect::new(0.0, 0.0, w, h), scale, page_h);
            let tolerance = 1e-6;
            prop_assert!((r.width - w / scale).abs() < tolerance);
            prop_assert!((r.height - h / scale).abs() < tolerance);
        }
    }
}
