//! Page layout and the windowed cache of rendered pages
//!
//! Pages are stacked top to bottom in a scroll surface. Only pages near the
//! visible region are rasterized; a render pass evicts entries that drifted
//! too far from it, creates placeholders for pages entering it and queues
//! them for rasterization. The queue drains a few pages per frame.
//!
//! Pointer coordinates handed to this module are relative to the viewport's
//! top-left corner. Page containers are positioned in scroll-surface pixels.

use crate::config::{ViewportConfig, ZoomConfig};
use crate::error::EditorError;
use crate::provider::PageProvider;
use crate::state::resolve_page;
use shared_types::{PageSize, Point, Rect};
use std::collections::{BTreeMap, VecDeque};
use tiny_skia::Pixmap;

/// Smallest render scale a fit may produce
const MIN_SCALE: f64 = 0.01;

/// One document page and its container in the scroll surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageRef {
    /// 1-based page number
    pub number: u32,
    /// Size in page units
    pub size: PageSize,
    /// Pixels per page unit
    pub scale: f64,
    pub left: f64,
    pub top: f64,
}

impl PageRef {
    pub fn width(&self) -> f64 {
        self.size.width * self.scale
    }

    pub fn height(&self) -> f64 {
        self.size.height * self.scale
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height()
    }

    /// Container box in scroll-surface pixels
    pub fn bounds(&self) -> Rect {
        Rect::new(self.left, self.top, self.width(), self.height())
    }
}

/// Cache entry for a page inside the render window
#[derive(Debug)]
pub struct RenderedPage {
    pub page: u32,
    /// Vertical extent in the scroll surface when the entry was created
    pub top: f64,
    pub bottom: f64,
    /// Rasterized page, `None` while queued
    pub surface: Option<Pixmap>,
}

pub struct Viewport<P: PageProvider> {
    provider: P,
    config: ViewportConfig,
    zoom_config: ZoomConfig,
    pages: Vec<PageRef>,
    /// Bytes of the loaded document, for reloading the provider after a rejected load
    document: Vec<u8>,
    rendered: BTreeMap<u32, RenderedPage>,
    queue: VecDeque<u32>,
    base_scale: Option<f64>,
    zoom: f64,
    width: f64,
    height: f64,
    scroll_top: f64,
    content_height: f64,
}

impl<P: PageProvider> std::fmt::Debug for Viewport<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Viewport")
            .field("pages", &self.pages.len())
            .field("rendered", &self.rendered.keys().collect::<Vec<_>>())
            .field("queued", &self.queue)
            .field("zoom", &self.zoom)
            .field("size", &(self.width, self.height))
            .field("scroll_top", &self.scroll_top)
            .finish()
    }
}

impl<P: PageProvider> Viewport<P> {
    pub fn new(provider: P, config: ViewportConfig, zoom_config: ZoomConfig) -> Self {
        Self {
            provider,
            config,
            zoom_config,
            pages: Vec::new(),
            document: Vec::new(),
            rendered: BTreeMap::new(),
            queue: VecDeque::new(),
            base_scale: None,
            zoom: 1.0,
            width: 0.0,
            height: 0.0,
            scroll_top: 0.0,
            content_height: 0.0,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    pub fn pages(&self) -> &[PageRef] {
        &self.pages
    }

    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    pub fn rendered(&self) -> &BTreeMap<u32, RenderedPage> {
        &self.rendered
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    /// Height of the scroll surface
    pub fn content_height(&self) -> f64 {
        self.content_height
    }

    /// Whether rasterization work is still queued
    pub fn is_rasterizing(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Load a document and lay its pages out
    ///
    /// Nothing changes when the provider fails to load the document.
    pub fn load(&mut self, bytes: &[u8]) -> Result<(), EditorError> {
        self.load_checked(bytes, |_| Ok(()))
    }

    /// Load a document only if its page count passes `check`
    ///
    /// A rejected document leaves the current pages and rendered entries in
    /// place and the provider is reloaded with the current document.
    pub fn load_checked<F>(&mut self, bytes: &[u8], check: F) -> Result<(), EditorError>
    where
        F: FnOnce(u32) -> Result<(), EditorError>,
    {
        let sizes = self.provider.load(bytes)?;
        let accepted = if sizes.is_empty() {
            Err(EditorError::EmptyDocument)
        } else {
            check(sizes.len() as u32)
        };
        if let Err(e) = accepted {
            self.restore_provider();
            return Err(e);
        }

        self.document = bytes.to_vec();
        self.evict_all();
        self.pages = sizes
            .into_iter()
            .enumerate()
            .map(|(i, size)| PageRef {
                number: i as u32 + 1,
                size,
                scale: 1.0,
                left: 0.0,
                top: 0.0,
            })
            .collect();
        self.base_scale = None;
        self.scroll_top = 0.0;
        tracing::info!("Loaded document with {} pages", self.pages.len());
        self.relayout();
        Ok(())
    }

    fn restore_provider(&mut self) {
        if self.pages.is_empty() {
            return;
        }
        if let Err(e) = self.provider.load(&self.document) {
            tracing::warn!("Failed to reload the current document: {}", e);
        }
    }

    /// Page for a 1-based index, `-1` meaning the last page
    pub fn get_page(&self, index: i32) -> Result<&PageRef, EditorError> {
        resolve_page(index, self.page_count())
            .and_then(|n| self.pages.get(n as usize - 1))
            .ok_or(EditorError::PageOutOfRange {
                index,
                count: self.page_count(),
            })
    }

    /// Page whose container is under a viewport pointer
    pub fn page_at(&self, point: Point) -> Option<&PageRef> {
        let surface_point = Point::new(point.x, point.y + self.scroll_top);
        self.pages
            .iter()
            .find(|page| page.bounds().contains(surface_point))
    }

    /// Page-local pixel position of a viewport pointer
    pub fn project_pointer_to_page(&self, point: Point, page: &PageRef) -> Point {
        Point::new(point.x - page.left, point.y - (page.top - self.scroll_top))
    }

    pub fn set_scroll(&mut self, top: f64) {
        let max = (self.content_height - self.height).max(0.0);
        self.scroll_top = top.clamp(0.0, max);
    }

    /// Record a new viewport size; returns whether a relayout is needed
    pub fn set_viewport_size(&mut self, width: f64, height: f64) -> bool {
        if width == self.width && height == self.height {
            return false;
        }
        self.width = width;
        self.height = height;
        self.base_scale = None;
        true
    }

    /// Clamp and apply a zoom factor; returns whether it changed
    pub fn set_zoom(&mut self, factor: f64) -> bool {
        let clamped = factor.clamp(self.zoom_config.min, self.zoom_config.max);
        if (clamped - self.zoom).abs() < f64::EPSILON {
            return false;
        }
        tracing::debug!("Zoom {} -> {}", self.zoom, clamped);
        self.zoom = clamped;
        self.base_scale = None;
        true
    }

    pub fn zoom_in(&mut self) -> bool {
        self.set_zoom(self.zoom + self.zoom_config.step)
    }

    pub fn zoom_out(&mut self) -> bool {
        self.set_zoom(self.zoom - self.zoom_config.step)
    }

    /// Fit scale for the first page, preferring to fit its height
    fn fit_scale(&self) -> f64 {
        let Some(first) = self.pages.first() else {
            return 1.0;
        };
        let avail_width =
            (self.width - self.config.horizontal_padding).min(self.config.max_page_width);
        let avail_height = self.height - self.config.vertical_padding;

        let by_height = avail_height / first.size.height;
        let scale = if first.size.width * by_height > avail_width
            || avail_height < self.config.min_usable_height
        {
            avail_width / first.size.width
        } else {
            by_height
        };
        scale.max(MIN_SCALE)
    }

    /// Drop every rendered page and recompute scales and containers
    pub fn relayout(&mut self) {
        self.evict_all();
        let base = match self.base_scale {
            Some(base) => base,
            None => {
                let base = self.fit_scale();
                self.base_scale = Some(base);
                base
            }
        };
        let scale = base * self.zoom;

        let mut top = self.config.content_top;
        for page in &mut self.pages {
            page.scale = scale;
            page.top = top;
            page.left = ((self.width - page.width()) / 2.0).max(0.0);
            top = page.bottom() + self.config.page_gap;
        }
        self.content_height = self
            .pages
            .last()
            .map_or(0.0, |page| page.bottom() + self.config.content_top);
        self.set_scroll(self.scroll_top);

        tracing::debug!(
            "Relayout: base scale {:.3}, zoom {}, {} pages",
            base,
            self.zoom,
            self.pages.len()
        );
    }

    /// Evict far pages and queue the pages of the render window
    ///
    /// Returns the page numbers in the window.
    pub fn start_render_pass(&mut self) -> Vec<u32> {
        let visible_top = self.scroll_top;
        let visible_bottom = self.scroll_top + self.height;
        let evict_distance = self.config.evict_ratio * self.height;

        let far: Vec<u32> = self
            .rendered
            .values()
            .filter(|entry| {
                let distance = (entry.top - visible_top)
                    .abs()
                    .min((entry.bottom - visible_bottom).abs());
                distance > evict_distance
            })
            .map(|entry| entry.page)
            .collect();
        for page in far {
            self.evict(page);
        }

        let window = self.render_window(visible_top, visible_bottom);
        for &number in &window {
            if self.rendered.contains_key(&number) {
                continue;
            }
            let page = &self.pages[number as usize - 1];
            self.rendered.insert(
                number,
                RenderedPage {
                    page: number,
                    top: page.top,
                    bottom: page.bottom(),
                    surface: None,
                },
            );
            self.queue.push_back(number);
        }

        tracing::debug!(
            "Render pass: window {:?}, {} cached, {} queued",
            window,
            self.rendered.len(),
            self.queue.len()
        );
        window
    }

    fn render_window(&self, visible_top: f64, visible_bottom: f64) -> Vec<u32> {
        let Some(first) = self.pages.iter().position(|p| p.bottom() > visible_top) else {
            return Vec::new();
        };
        // Measured against the whole viewport height, padding included
        let overdraw = self.config.overdraw_ratio * self.height;
        let start = (visible_top - overdraw).min(self.pages[first].top);
        let end = (visible_bottom + overdraw).max(self.pages[first].bottom());

        self.pages[first..]
            .iter()
            .take_while(|p| p.top <= end && p.bottom() >= start)
            .map(|p| p.number)
            .collect()
    }

    /// Rasterize up to `budget` queued pages; returns whether work remains
    ///
    /// Pages evicted while queued are skipped. A failed page loses its entry
    /// so the next render pass queues it again.
    pub fn pump_raster(&mut self, budget: usize) -> bool {
        let mut done = 0;
        while done < budget {
            let Some(number) = self.queue.pop_front() else {
                break;
            };
            let Some(entry) = self.rendered.get(&number) else {
                continue;
            };
            if entry.surface.is_some() {
                continue;
            }
            let scale = self.pages[number as usize - 1].scale;
            done += 1;

            match self.provider.rasterize(number, scale) {
                Ok(surface) => {
                    self.provider.present(number, &surface);
                    if let Some(entry) = self.rendered.get_mut(&number) {
                        entry.surface = Some(surface);
                    }
                }
                Err(e) => {
                    tracing::warn!("Failed to rasterize page {}: {}", number, e);
                    self.rendered.remove(&number);
                }
            }
        }
        !self.queue.is_empty()
    }

    fn evict(&mut self, page: u32) {
        if let Some(entry) = self.rendered.remove(&page) {
            if entry.surface.is_some() {
                self.provider.revoke(page);
            }
            tracing::debug!("Evicted page {}", page);
        }
    }

    /// Drop every rendered page, revoking presented surfaces first
    pub fn evict_all(&mut self) {
        let pages: Vec<u32> = self.rendered.keys().copied().collect();
        for page in pages {
            self.evict(page);
        }
        self.queue.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;

    #[derive(Debug, Default)]
    struct FakeProvider {
        sizes: Vec<PageSize>,
        fail: BTreeSet<u32>,
        loads: Vec<Vec<u8>>,
        rasterized: Vec<(u32, f64)>,
        presented: Vec<u32>,
        revoked: Vec<u32>,
    }

    impl PageProvider for FakeProvider {
        fn load(&mut self, bytes: &[u8]) -> Result<Vec<PageSize>, EditorError> {
            self.loads.push(bytes.to_vec());
            Ok(self.sizes.clone())
        }

        fn rasterize(&mut self, page: u32, scale: f64) -> Result<Pixmap, EditorError> {
            self.rasterized.push((page, scale));
            if self.fail.contains(&page) {
                return Err(EditorError::RasterizeError {
                    page,
                    reason: "corrupt stream".to_string(),
                });
            }
            Pixmap::new(4, 4).ok_or_else(|| EditorError::ImageError("alloc".to_string()))
        }

        fn present(&mut self, page: u32, _surface: &Pixmap) {
            self.presented.push(page);
        }

        fn revoke(&mut self, page: u32) {
            self.revoked.push(page);
        }
    }

    fn viewport(pages: usize, width: f64, height: f64) -> Viewport<FakeProvider> {
        let provider = FakeProvider {
            sizes: vec![PageSize::letter(); pages],
            ..Default::default()
        };
        let mut viewport = Viewport::new(provider, ViewportConfig::default(), ZoomConfig::default());
        viewport.set_viewport_size(width, height);
        viewport.load(b"%PDF").unwrap();
        viewport
    }

    #[test]
    fn test_height_fit() {
        // 1000px tall viewport leaves 920px for a 792pt page
        let vp = viewport(3, 1400.0, 1000.0);
        let scale = 920.0 / 792.0;
        assert!((vp.pages()[0].scale - scale).abs() < 1e-9);
        assert!((vp.pages()[0].left - (1400.0 - 612.0 * scale) / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_width_fit_when_short() {
        // Below the minimum usable height the page fits the width instead
        let vp = viewport(1, 800.0, 700.0);
        assert!((vp.pages()[0].scale - 760.0 / 612.0).abs() < 1e-9);
    }

    #[test]
    fn test_width_fit_caps_page_width() {
        let vp = viewport(1, 3000.0, 4000.0);
        assert!((vp.pages()[0].width() - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_pages_stack_with_gap() {
        let vp = viewport(3, 800.0, 600.0);
        let pages = vp.pages();
        assert_eq!(pages[0].top, 30.0);
        assert!((pages[1].top - (pages[0].bottom() + 20.0)).abs() < 1e-9);
        assert!((vp.content_height() - (pages[2].bottom() + 30.0)).abs() < 1e-9);
    }

    #[test]
    fn test_get_page() {
        let vp = viewport(3, 800.0, 600.0);
        assert_eq!(vp.get_page(1).unwrap().number, 1);
        assert_eq!(vp.get_page(-1).unwrap().number, 3);
        assert!(matches!(
            vp.get_page(4),
            Err(EditorError::PageOutOfRange { index: 4, count: 3 })
        ));
        assert!(vp.get_page(0).is_err());
    }

    #[test]
    fn test_empty_document_rejected() {
        let mut vp = Viewport::new(
            FakeProvider::default(),
            ViewportConfig::default(),
            ZoomConfig::default(),
        );
        assert!(matches!(vp.load(b"%PDF"), Err(EditorError::EmptyDocument)));
        assert!(vp.pages().is_empty());
    }

    #[test]
    fn test_project_pointer_accounts_for_scroll() {
        let mut vp = viewport(3, 800.0, 600.0);
        vp.set_scroll(100.0);
        let page = *vp.get_page(1).unwrap();
        let local = vp.project_pointer_to_page(Point::new(page.left + 10.0, 50.0), &page);
        assert_eq!(local, Point::new(10.0, 50.0 - (30.0 - 100.0)));
        assert_eq!(vp.page_at(Point::new(page.left + 10.0, 50.0)).unwrap().number, 1);
        assert!(vp.page_at(Point::new(1.0, 1.0)).is_none());
    }

    #[test]
    fn test_render_pass_queues_window_and_rasterizes() {
        let mut vp = viewport(10, 800.0, 600.0);
        // Straddle the first two pages
        vp.set_scroll(700.0);
        let window = vp.start_render_pass();
        assert_eq!(window, vec![1, 2]);
        assert!(vp.is_rasterizing());
        assert!(vp.pump_raster(1));
        assert!(!vp.pump_raster(1));
        assert_eq!(vp.provider().presented, vec![1, 2]);
        assert!(vp.rendered().values().all(|e| e.surface.is_some()));
    }

    #[test]
    fn test_overdraw_spans_half_the_viewport_height() {
        // Pages are 983.5px tall from 30px with 20px gaps; page 3 starts at 2037
        let mut vp = viewport(10, 800.0, 600.0);
        vp.set_scroll(1150.0);
        // Visible bottom 1750 plus 300px of overdraw reaches page 3
        assert_eq!(vp.start_render_pass(), vec![2, 3]);

        vp.set_scroll(1130.0);
        // 1730 + 300 stops short of page 3
        assert_eq!(vp.start_render_pass(), vec![2]);
    }

    #[test]
    fn test_second_pass_reuses_entries() {
        let mut vp = viewport(10, 800.0, 600.0);
        vp.set_scroll(700.0);
        vp.start_render_pass();
        vp.pump_raster(10);
        vp.start_render_pass();
        assert!(!vp.pump_raster(10));
        assert_eq!(vp.provider().rasterized.len(), 2);
    }

    #[test]
    fn test_far_pages_are_evicted_and_revoked() {
        let mut vp = viewport(40, 800.0, 600.0);
        vp.set_scroll(700.0);
        vp.start_render_pass();
        vp.pump_raster(10);
        let bottom = vp.content_height();
        vp.set_scroll(bottom);
        vp.start_render_pass();
        assert_eq!(vp.provider().revoked, vec![1, 2]);
        assert!(!vp.rendered().contains_key(&1));
        assert!(vp.rendered().contains_key(&40));
    }

    #[test]
    fn test_evicted_placeholder_is_skipped() {
        let mut vp = viewport(40, 800.0, 600.0);
        vp.start_render_pass();
        let bottom = vp.content_height();
        vp.set_scroll(bottom);
        vp.start_render_pass();
        vp.pump_raster(100);
        let rasterized: Vec<u32> = vp.provider().rasterized.iter().map(|(p, _)| *p).collect();
        assert!(!rasterized.contains(&1));
        // Placeholders were never presented, so nothing to revoke
        assert!(vp.provider().revoked.is_empty());
    }

    #[test]
    fn test_failed_page_is_retried_next_pass() {
        let mut vp = viewport(3, 800.0, 600.0);
        vp.set_scroll(700.0);
        vp.provider_mut().fail.insert(1);
        vp.start_render_pass();
        vp.pump_raster(10);
        assert!(!vp.rendered().contains_key(&1));
        assert!(vp.rendered().contains_key(&2));

        vp.provider_mut().fail.clear();
        vp.start_render_pass();
        vp.pump_raster(10);
        assert!(vp.rendered()[&1].surface.is_some());
        let attempts = vp.provider().rasterized.iter().filter(|(p, _)| *p == 1).count();
        assert_eq!(attempts, 2);
    }

    #[test]
    fn test_zoom_clamps_and_reports_change() {
        let mut vp = viewport(1, 800.0, 600.0);
        assert!(vp.set_zoom(5.0));
        assert_eq!(vp.zoom(), 3.0);
        assert!(!vp.zoom_in());
        assert!(vp.set_zoom(0.1));
        assert_eq!(vp.zoom(), 0.5);
        assert!(!vp.zoom_out());
        assert!(vp.zoom_in());
        assert_eq!(vp.zoom(), 1.0);
    }

    #[test]
    fn test_relayout_after_zoom_scales_pages_and_evicts() {
        let mut vp = viewport(3, 800.0, 600.0);
        let base = vp.pages()[0].scale;
        vp.set_scroll(700.0);
        vp.start_render_pass();
        vp.pump_raster(10);

        vp.set_zoom(2.0);
        vp.relayout();
        assert!((vp.pages()[0].scale - base * 2.0).abs() < 1e-9);
        assert!(vp.rendered().is_empty());
        assert_eq!(vp.provider().revoked.len(), 2);
    }

    #[test]
    fn test_rejected_load_keeps_pages_and_cache() {
        let mut vp = viewport(3, 800.0, 600.0);
        vp.start_render_pass();
        while vp.pump_raster(1) {}
        let cached: Vec<u32> = vp.rendered().keys().copied().collect();
        assert!(!cached.is_empty());

        let result = vp.load_checked(b"%PDF-other", |count| {
            Err(EditorError::PageOutOfRange { index: 5, count })
        });
        assert!(matches!(
            result,
            Err(EditorError::PageOutOfRange { index: 5, count: 3 })
        ));
        assert_eq!(vp.page_count(), 3);
        assert_eq!(vp.rendered().keys().copied().collect::<Vec<_>>(), cached);
        assert!(vp.provider().revoked.is_empty());
        // The provider is handed the current document again
        assert_eq!(
            vp.provider().loads,
            vec![b"%PDF".to_vec(), b"%PDF-other".to_vec(), b"%PDF".to_vec()]
        );
    }

    #[test]
    fn test_load_failure_keeps_previous_document() {
        struct Broken;
        impl PageProvider for Broken {
            fn load(&mut self, _bytes: &[u8]) -> Result<Vec<PageSize>, EditorError> {
                Err(EditorError::ImageError("not a document".to_string()))
            }
            fn rasterize(&mut self, page: u32, _scale: f64) -> Result<Pixmap, EditorError> {
                Err(EditorError::RasterizeError {
                    page,
                    reason: "unreachable".to_string(),
                })
            }
        }
        let mut vp = Viewport::new(Broken, ViewportConfig::default(), ZoomConfig::default());
        assert!(vp.load(b"junk").is_err());
        assert_eq!(vp.page_count(), 0);
    }
}
