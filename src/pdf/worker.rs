//! PDF render worker - runs in a separate thread
//!
//! Owns the opened document. Requests are handled strictly in arrival
//! order; staleness is decided by the service, not here.

use std::sync::Arc;

use flume::{Receiver, Sender};
use log::{debug, info, warn};

use crate::fonts::TextRun;

use super::backend::{PdfBackend, PdfDocument};
use super::cache::{CacheKey, PageCache};
use super::error::{LoadError, RenderError};
use super::request::{RenderParams, RenderRequest, RenderResponse, RequestId};
use super::types::{PageFrame, PixelBuffer};

pub fn render_worker<B: PdfBackend>(
    backend: B,
    requests: Receiver<RenderRequest>,
    responses: Sender<RenderResponse>,
    cache_size: usize,
) {
    let mut document: Option<Box<dyn PdfDocument>> = None;
    let mut cache = PageCache::new(cache_size);

    for request in requests.iter() {
        match request {
            RenderRequest::Load { id, bytes } => {
                let response = match open_document(&backend, &bytes) {
                    Ok(doc) => {
                        let page_count = doc.page_count();
                        info!("Loaded document with {page_count} pages ({} bytes)", bytes.len());
                        document = Some(doc);
                        cache.invalidate_all();
                        RenderResponse::Loaded { id, page_count }
                    }
                    Err(error) => {
                        warn!("Failed to load document: {error}");
                        RenderResponse::LoadFailed { id, error }
                    }
                };
                let _ = responses.send(response);
            }

            RenderRequest::Page { id, page, params } => {
                let response = match document.as_deref() {
                    Some(doc) => handle_page_request(doc, id, page, &params, &mut cache),
                    None => RenderResponse::Error {
                        id,
                        page,
                        error: RenderError::NoDocument,
                    },
                };
                let _ = responses.send(response);
            }

            RenderRequest::Close => {
                debug!("Closing document");
                document = None;
                cache.invalidate_all();
            }

            RenderRequest::Shutdown => break,
        }
    }

    debug!("Render worker exiting");
}

fn open_document<B: PdfBackend>(
    backend: &B,
    bytes: &[u8],
) -> Result<Box<dyn PdfDocument>, LoadError> {
    let doc = backend.open(bytes)?;
    if doc.page_count() == 0 {
        return Err(LoadError::Empty);
    }
    Ok(doc)
}

fn handle_page_request(
    doc: &dyn PdfDocument,
    id: RequestId,
    page: usize,
    params: &RenderParams,
    cache: &mut PageCache,
) -> RenderResponse {
    let key = CacheKey::from_params(page, params);

    if let Some(frame) = cache.get(&key) {
        debug!("Serving page {page} from cache");
        return RenderResponse::Page { id, frame };
    }

    match render_page(doc, page, params) {
        Ok(frame) => RenderResponse::Page {
            id,
            frame: cache.insert(key, frame),
        },
        Err(error) => {
            warn!("Failed to render page {page}: {error}");
            RenderResponse::Error { id, page, error }
        }
    }
}

/// Render a single page and extract its text runs
pub fn render_page(
    doc: &dyn PdfDocument,
    page_num: usize,
    params: &RenderParams,
) -> Result<PageFrame, RenderError> {
    let page = doc.page(page_num)?;

    let mut viewport = page.viewport(params.raster_scale())?;
    viewport.scale = params.scale;
    viewport.device_pixel_ratio = params.device_pixel_ratio;

    let mut image = PixelBuffer::default();
    page.render(&viewport, &mut image)?;

    // A page whose text cannot be extracted still renders; it just has no fonts.
    let items = page.text_content().unwrap_or_else(|e| {
        warn!("Failed to extract text from page {page_num}: {e}");
        Vec::new()
    });
    let text_runs: Arc<[TextRun]> = items.iter().filter_map(TextRun::from_item).collect();

    debug!(
        "Rendered page {page_num}: {}x{} px, {} text runs",
        image.width,
        image.height,
        text_runs.len()
    );

    Ok(PageFrame {
        page: page_num,
        viewport,
        image,
        text_runs,
    })
}
