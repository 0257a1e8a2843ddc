//! PDF rendering infrastructure

use std::time::Duration;

mod backend;
mod cache;
mod error;
#[cfg(feature = "pdf")]
mod font_names;
#[cfg(feature = "pdf")]
mod mupdf_backend;
mod request;
mod service;
mod state;
mod types;
mod worker;
mod zoom;

pub use backend::{PdfBackend, PdfDocument, PdfPage, check_page};
pub use cache::{CacheKey, PageCache};
pub use error::{LoadError, RenderError};
#[cfg(feature = "pdf")]
pub use mupdf_backend::MupdfBackend;
pub use request::{RenderParams, RenderRequest, RenderResponse, RequestId};
pub use service::{Completion, RenderService, ServiceConfig, ServiceEvent};
pub use state::{Command, Effect, Phase, RenderSession};
pub use types::*;
pub use worker::render_page;
pub use zoom::*;

/// Rendered frames kept by the worker
pub const DEFAULT_CACHE_SIZE: usize = 8;

/// How long blocking helpers wait for the renderer
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
