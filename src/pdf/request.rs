//! Render request and response types

use std::sync::Arc;

use super::error::{LoadError, RenderError};
use super::types::PageFrame;

/// Unique, monotonically increasing identifier for renderer requests
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub u64);

impl RequestId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }
}

/// Parameters for rendering a page
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderParams {
    /// User-specified zoom scale
    pub scale: f64,
    /// Physical pixels per CSS pixel
    pub device_pixel_ratio: f64,
}

impl RenderParams {
    /// Scale the renderer rasterises at
    pub fn raster_scale(&self) -> f64 {
        self.scale * self.device_pixel_ratio
    }
}

/// Request sent to the render worker
#[derive(Debug)]
pub enum RenderRequest {
    /// Parse a new document, replacing the current one on success
    Load { id: RequestId, bytes: Arc<[u8]> },

    /// Render a page (1-indexed)
    Page {
        id: RequestId,
        page: usize,
        params: RenderParams,
    },

    /// Drop the current document
    Close,

    /// Shutdown the worker
    Shutdown,
}

/// Response from the render worker
#[derive(Debug)]
pub enum RenderResponse {
    /// Document parsed
    Loaded { id: RequestId, page_count: usize },

    /// Document could not be parsed
    LoadFailed { id: RequestId, error: LoadError },

    /// Rendered page data
    Page { id: RequestId, frame: Arc<PageFrame> },

    /// Error during rendering
    Error {
        id: RequestId,
        page: usize,
        error: RenderError,
    },
}

impl RenderResponse {
    pub fn id(&self) -> RequestId {
        match self {
            RenderResponse::Loaded { id, .. }
            | RenderResponse::LoadFailed { id, .. }
            | RenderResponse::Page { id, .. }
            | RenderResponse::Error { id, .. } => *id,
        }
    }
}
