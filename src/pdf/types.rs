//! Core types for PDF rendering

use std::sync::Arc;

use crate::fonts::TextRun;

/// Rasterisation target size and rotation for a page at one scale
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    /// Pixel-buffer width (already multiplied by scale and device pixel ratio)
    pub width_px: f64,
    /// Pixel-buffer height
    pub height_px: f64,
    /// Page rotation in degrees, as reported by the renderer
    pub rotation_deg: i32,
    /// Zoom scale the viewport was computed for
    pub scale: f64,
    /// Device pixel ratio the viewport was computed for
    pub device_pixel_ratio: f64,
}

impl Viewport {
    /// Display size in CSS pixels
    pub fn css_size(&self) -> (f64, f64) {
        let dpr = self.device_pixel_ratio.max(f64::MIN_POSITIVE);
        (self.width_px / dpr, self.height_px / dpr)
    }

    /// Page size in PDF points
    pub fn page_size_pt(&self) -> (f64, f64) {
        let divisor = (self.scale * self.device_pixel_ratio).max(f64::MIN_POSITIVE);
        (self.width_px / divisor, self.height_px / divisor)
    }
}

/// One positioned glyph run as reported by the renderer's text extraction
#[derive(Clone, Debug, PartialEq)]
pub struct TextItem {
    /// Affine text-to-page transform `[a, b, c, d, e, f]`
    pub transform: Vec<f64>,
    /// Glyph-space advance width
    pub width: f64,
    pub font_name: String,
}

/// Raw rendered page pixels
#[derive(Clone, Default, PartialEq, Eq)]
pub struct PixelBuffer {
    /// Raw RGB pixel data (3 bytes per pixel: R, G, B)
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl PixelBuffer {
    /// Resize to the given dimensions, filled with white
    pub fn reset(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(width as usize * height as usize * 3, 0xFF);
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}

/// Complete result of rendering one page.
///
/// Published as a unit so the viewport, text runs and pixels always
/// belong to the same render.
#[derive(Clone, Debug)]
pub struct PageFrame {
    /// Page number (1-indexed)
    pub page: usize,
    pub viewport: Viewport,
    pub image: PixelBuffer,
    pub text_runs: Arc<[TextRun]>,
}
