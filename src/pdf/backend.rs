//! Contract with the external PDF engine
//!
//! The engine parses documents, rasterises pages and extracts positioned
//! text. Everything runs on the renderer thread, so documents and pages
//! do not need to be `Send`; only the backend that opens them does.

use super::error::{LoadError, RenderError};
use super::types::{PixelBuffer, TextItem, Viewport};

/// Opens documents from raw bytes
pub trait PdfBackend: Send + 'static {
    fn open(&self, bytes: &[u8]) -> Result<Box<dyn PdfDocument>, LoadError>;
}

/// A parsed document
pub trait PdfDocument {
    fn page_count(&self) -> usize;

    /// Load a page by 1-indexed number
    fn page(&self, number: usize) -> Result<Box<dyn PdfPage + '_>, RenderError>;
}

/// A single loaded page
pub trait PdfPage {
    /// Viewport for rendering at `scale` (already including device pixel
    /// ratio). The returned `scale` and `device_pixel_ratio` fields are
    /// overwritten by the caller.
    fn viewport(&self, scale: f64) -> Result<Viewport, RenderError>;

    /// Draw the page into `target`, resizing it to the viewport
    fn render(&self, viewport: &Viewport, target: &mut PixelBuffer) -> Result<(), RenderError>;

    /// Positioned text runs in reading order, PDF-space with bottom-left origin
    fn text_content(&self) -> Result<Vec<TextItem>, RenderError>;
}

/// Check a 1-indexed page number against a page count
pub fn check_page(number: usize, page_count: usize) -> Result<usize, RenderError> {
    if number == 0 || number > page_count {
        return Err(RenderError::PageOutOfRange {
            page: number,
            page_count,
        });
    }
    Ok(number - 1)
}
