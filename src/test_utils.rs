//! In-memory PDF engine for tests
//!
//! Documents are registered under a byte key; loading any other bytes
//! fails like a corrupt file would. Pages report exactly the size and
//! rotation they were given.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::pdf::{
    LoadError, PdfBackend, PdfDocument, PdfPage, PixelBuffer, RenderError, TextItem, Viewport,
    check_page,
};

/// US Letter in points
pub const LETTER: (f64, f64) = (612.0, 792.0);

/// Build a text item with an unrotated transform at `(x, y)`
pub fn text_item(x: f64, y: f64, size: f64, width: f64, font_name: &str) -> TextItem {
    TextItem {
        transform: vec![size, 0.0, 0.0, size, x, y],
        width,
        font_name: font_name.to_string(),
    }
}

/// One page of a fake document
#[derive(Clone, Debug)]
pub struct FakePage {
    pub width: f64,
    pub height: f64,
    pub rotation: i32,
    pub text: Vec<TextItem>,
    pub render_delay: Duration,
    pub fail_render: bool,
    pub fail_text: bool,
}

impl FakePage {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            rotation: 0,
            text: Vec::new(),
            render_delay: Duration::ZERO,
            fail_render: false,
            fail_text: false,
        }
    }

    pub fn letter() -> Self {
        Self::new(LETTER.0, LETTER.1)
    }

    pub fn rotated(mut self, degrees: i32) -> Self {
        self.rotation = degrees;
        self
    }

    pub fn with_text(mut self, text: Vec<TextItem>) -> Self {
        self.text = text;
        self
    }

    /// Sleep this long on every render of the page
    pub fn slow(mut self, delay: Duration) -> Self {
        self.render_delay = delay;
        self
    }

    pub fn failing_render(mut self) -> Self {
        self.fail_render = true;
        self
    }

    pub fn failing_text(mut self) -> Self {
        self.fail_text = true;
        self
    }
}

/// Fake engine with registered documents and a shared render counter
#[derive(Clone, Debug, Default)]
pub struct FakeBackend {
    documents: HashMap<Vec<u8>, Arc<[FakePage]>>,
    renders: Arc<AtomicUsize>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a document that loads from `bytes`
    pub fn with_document(mut self, bytes: &[u8], pages: Vec<FakePage>) -> Self {
        self.documents.insert(bytes.to_vec(), Arc::from(pages));
        self
    }

    /// Number of rasterisations performed so far, across clones
    pub fn render_count(&self) -> usize {
        self.renders.load(Ordering::SeqCst)
    }

    /// Handle that keeps observing the count after the backend moves to the worker
    pub fn render_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.renders)
    }
}

impl PdfBackend for FakeBackend {
    fn open(&self, bytes: &[u8]) -> Result<Box<dyn PdfDocument>, LoadError> {
        let pages = self
            .documents
            .get(bytes)
            .ok_or_else(|| LoadError::invalid("not a PDF document"))?;
        Ok(Box::new(FakeDocument {
            pages: Arc::clone(pages),
            renders: Arc::clone(&self.renders),
        }))
    }
}

struct FakeDocument {
    pages: Arc<[FakePage]>,
    renders: Arc<AtomicUsize>,
}

impl PdfDocument for FakeDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page(&self, number: usize) -> Result<Box<dyn PdfPage + '_>, RenderError> {
        let index = check_page(number, self.pages.len())?;
        Ok(Box::new(FakePageHandle {
            page: &self.pages[index],
            renders: &self.renders,
        }))
    }
}

struct FakePageHandle<'a> {
    page: &'a FakePage,
    renders: &'a AtomicUsize,
}

impl PdfPage for FakePageHandle<'_> {
    fn viewport(&self, scale: f64) -> Result<Viewport, RenderError> {
        Ok(Viewport {
            width_px: self.page.width * scale,
            height_px: self.page.height * scale,
            rotation_deg: self.page.rotation,
            scale,
            device_pixel_ratio: 1.0,
        })
    }

    fn render(&self, viewport: &Viewport, target: &mut PixelBuffer) -> Result<(), RenderError> {
        if !self.page.render_delay.is_zero() {
            std::thread::sleep(self.page.render_delay);
        }
        if self.page.fail_render {
            return Err(RenderError::engine("injected render failure"));
        }
        target.reset(
            viewport.width_px.round() as u32,
            viewport.height_px.round() as u32,
        );
        self.renders.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn text_content(&self) -> Result<Vec<TextItem>, RenderError> {
        if self.page.fail_text {
            return Err(RenderError::engine("injected text failure"));
        }
        Ok(self.page.text.clone())
    }
}
