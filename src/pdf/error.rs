//! Errors surfaced by the render pipeline
//!
//! The `Display` text of each variant is meant to be shown to the user
//! as-is.

/// Loading a document failed; retry with another file
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to load PDF file. Please ensure the file is valid. ({detail})")]
    Invalid { detail: String },

    #[error("The document has no pages")]
    Empty,

    #[error("Another document was opened before this one finished loading")]
    Superseded,

    #[error("Renderer is not running")]
    Disconnected,

    #[error("Timed out waiting for the document to load")]
    TimedOut,
}

impl LoadError {
    pub fn invalid(detail: impl Into<String>) -> Self {
        Self::Invalid {
            detail: detail.into(),
        }
    }
}

/// Rendering a specific page failed; navigation and retry remain possible
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenderError {
    #[error("Page {page} is out of range (document has {page_count} pages)")]
    PageOutOfRange { page: usize, page_count: usize },

    #[error("No document is loaded")]
    NoDocument,

    #[error("PDF engine: {detail}")]
    Engine { detail: String },

    #[error("Renderer is not running")]
    Disconnected,

    #[error("Timed out waiting for page {page} to render")]
    TimedOut { page: usize },
}

impl RenderError {
    pub fn engine(detail: impl Into<String>) -> Self {
        Self::Engine {
            detail: detail.into(),
        }
    }
}

#[cfg(feature = "pdf")]
impl From<mupdf::error::Error> for LoadError {
    fn from(err: mupdf::error::Error) -> Self {
        Self::invalid(err.to_string())
    }
}

#[cfg(feature = "pdf")]
impl From<mupdf::error::Error> for RenderError {
    fn from(err: mupdf::error::Error) -> Self {
        Self::engine(err.to_string())
    }
}
