//! Render service - owns the session and talks to the render worker
//!
//! Every load and render gets a fresh [`RequestId`]. Only the most recent
//! render issued after the most recent load may update the session;
//! anything older that completes later is dropped.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use flume::{Receiver, RecvTimeoutError, Sender};
use log::{debug, info, warn};

use crate::fonts::FontDetector;

use super::backend::PdfBackend;
use super::error::{LoadError, RenderError};
use super::request::{RenderRequest, RenderResponse, RequestId};
use super::state::{Command, Effect, RenderSession};
use super::types::{PageFrame, Viewport};
use super::worker::render_worker;
use super::{DEFAULT_CACHE_SIZE, DEFAULT_TIMEOUT};

/// Service construction options
#[derive(Clone, Copy, Debug)]
pub struct ServiceConfig {
    pub device_pixel_ratio: f64,
    pub cache_size: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            device_pixel_ratio: 1.0,
            cache_size: DEFAULT_CACHE_SIZE,
        }
    }
}

/// Accepted renderer results
#[derive(Clone, Debug)]
pub enum ServiceEvent {
    DocumentLoaded { id: RequestId, page_count: usize },
    LoadFailed { id: RequestId, error: LoadError },
    PageRendered { id: RequestId, frame: Arc<PageFrame> },
    RenderFailed {
        id: RequestId,
        page: usize,
        error: RenderError,
    },
}

/// Outcome of waiting for one request
#[derive(Clone, Debug)]
pub enum Completion {
    /// The result was applied
    Applied(ServiceEvent),
    /// The result arrived but a newer request superseded it
    Superseded,
    TimedOut,
    Disconnected,
}

/// Manages document loading and page rendering on a worker thread
pub struct RenderService {
    session: RenderSession,
    fonts: FontDetector,
    frame: Option<Arc<PageFrame>>,
    request_tx: Sender<RenderRequest>,
    response_rx: Receiver<RenderResponse>,
    next_request_id: u64,
    latest_load: Option<RequestId>,
    latest_render: Option<RequestId>,
    answered_render: Option<RequestId>,
    backlog: VecDeque<ServiceEvent>,
}

impl RenderService {
    /// Create a new render service with default configuration
    #[must_use]
    pub fn new<B: PdfBackend>(backend: B) -> Self {
        Self::with_config(backend, ServiceConfig::default())
    }

    /// Create a new render service with custom configuration
    #[must_use]
    pub fn with_config<B: PdfBackend>(backend: B, config: ServiceConfig) -> Self {
        let (request_tx, request_rx) = flume::unbounded();
        let (response_tx, response_rx) = flume::unbounded();

        let cache_size = config.cache_size;
        std::thread::spawn(move || {
            render_worker(backend, request_rx, response_tx, cache_size);
        });

        Self {
            session: RenderSession::new(config.device_pixel_ratio),
            fonts: FontDetector::new(),
            frame: None,
            request_tx,
            response_rx,
            next_request_id: 1,
            latest_load: None,
            latest_render: None,
            answered_render: None,
            backlog: VecDeque::new(),
        }
    }

    /// Get current session state
    #[must_use]
    pub fn session(&self) -> &RenderSession {
        &self.session
    }

    /// Text runs of the displayed page
    #[must_use]
    pub fn fonts(&self) -> &FontDetector {
        &self.fonts
    }

    /// Last accepted render
    #[must_use]
    pub fn current_frame(&self) -> Option<&Arc<PageFrame>> {
        self.frame.as_ref()
    }

    /// Whether a load has been issued and not yet answered
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.latest_load.is_some()
    }

    /// Start loading a document. Any render still in flight is stale from
    /// this point on.
    pub fn load_document(&mut self, bytes: impl Into<Arc<[u8]>>) -> RequestId {
        let id = self.next_id();
        let bytes = bytes.into();
        debug!("Request {id:?}: load {} bytes", bytes.len());

        self.latest_load = Some(id);
        self.latest_render = None;
        self.send(RenderRequest::Load { id, bytes });
        id
    }

    /// Request a render of `page` at `scale`. Returns `None` without a
    /// loaded document or while a load is pending.
    pub fn render_page(&mut self, page: usize, scale: f64) -> Option<RequestId> {
        if !self.session.is_loaded() || self.is_loading() {
            debug!("Ignoring render of page {page}: no document");
            return None;
        }

        let id = self.next_id();
        let mut params = self.session.render_params();
        params.scale = super::Zoom::clamp_factor(scale);
        debug!("Request {id:?}: render page {page} at {:.2}", params.scale);

        self.latest_render = Some(id);
        self.send(RenderRequest::Page { id, page, params });
        Some(id)
    }

    /// Render the session's current page at the session's scale
    pub fn render_current(&mut self) -> Option<RequestId> {
        self.render_page(self.session.current_page, self.session.scale())
    }

    /// Accept `page` only when it lies in `[1, page_count]`, without rendering
    pub fn set_page(&mut self, page: usize) -> bool {
        let previous = self.session.current_page;
        let accepted = self.session.set_page(page);
        if accepted && previous != page {
            self.fonts.reset();
        }
        accepted
    }

    /// Store a clamped zoom scale, without rendering
    pub fn set_scale(&mut self, scale: f64) {
        self.session.set_scale(scale);
    }

    /// Close the document and return to the empty state
    pub fn reset(&mut self) {
        self.latest_load = None;
        self.send(RenderRequest::Close);
        self.apply_command(Command::Reset);
    }

    /// Apply a command to the session, returning the render request it
    /// triggered, if any
    pub fn apply_command(&mut self, cmd: Command) -> Option<RequestId> {
        let effects = self.session.apply(cmd);
        self.execute_effects(effects)
    }

    fn execute_effects(&mut self, effects: Vec<Effect>) -> Option<RequestId> {
        let mut render = None;
        for effect in effects {
            match effect {
                Effect::DropFrame => {
                    self.frame = None;
                    self.latest_render = None;
                }

                Effect::ClearText => {
                    self.fonts.reset();
                }

                Effect::RenderCurrentPage => {
                    render = self.render_current();
                }
            }
        }
        render
    }

    /// Apply all responses that have arrived, returning the accepted ones
    pub fn poll_responses(&mut self) -> Vec<ServiceEvent> {
        let mut events: Vec<ServiceEvent> = self.backlog.drain(..).collect();

        while let Ok(response) = self.response_rx.try_recv() {
            if let Some(event) = self.handle_response(response) {
                events.push(event);
            }
        }

        events
    }

    /// Block until the response for `id` arrives or `timeout` passes.
    /// Other responses received meanwhile are applied and queued for the
    /// next [`RenderService::poll_responses`].
    pub fn wait_for(&mut self, id: RequestId, timeout: Duration) -> Completion {
        let deadline = Instant::now() + timeout;

        loop {
            let response = match self.response_rx.recv_deadline(deadline) {
                Ok(response) => response,
                Err(RecvTimeoutError::Timeout) => return Completion::TimedOut,
                Err(RecvTimeoutError::Disconnected) => return Completion::Disconnected,
            };

            let response_id = response.id();
            let event = self.handle_response(response);

            if response_id == id {
                return match event {
                    Some(event) => Completion::Applied(event),
                    None => Completion::Superseded,
                };
            }
            if let Some(event) = event {
                self.backlog.push_back(event);
            }
        }
    }

    /// Load a document and wait for it, returning the page count
    pub fn load_document_blocking(
        &mut self,
        bytes: impl Into<Arc<[u8]>>,
        timeout: Duration,
    ) -> Result<usize, LoadError> {
        let id = self.load_document(bytes);
        self.wait_for_load(id, timeout)
    }

    /// Wait for the load issued as `id`, returning the page count
    pub fn wait_for_load(
        &mut self,
        id: RequestId,
        timeout: Duration,
    ) -> Result<usize, LoadError> {
        match self.wait_for(id, timeout) {
            Completion::Applied(ServiceEvent::DocumentLoaded { page_count, .. }) => Ok(page_count),
            Completion::Applied(ServiceEvent::LoadFailed { error, .. }) => Err(error),
            Completion::Applied(_) | Completion::Superseded => Err(LoadError::Superseded),
            Completion::TimedOut => Err(LoadError::TimedOut),
            Completion::Disconnected => Err(LoadError::Disconnected),
        }
    }

    /// Render a page and wait for it. `Ok(None)` when no document is
    /// loaded or a newer request superseded this one.
    pub fn render_page_blocking(
        &mut self,
        page: usize,
        scale: f64,
        timeout: Duration,
    ) -> Result<Option<Viewport>, RenderError> {
        let Some(id) = self.render_page(page, scale) else {
            return Ok(None);
        };
        match self.wait_for(id, timeout) {
            Completion::Applied(ServiceEvent::PageRendered { frame, .. }) => {
                Ok(Some(frame.viewport))
            }
            Completion::Applied(ServiceEvent::RenderFailed { error, .. }) => Err(error),
            Completion::Applied(_) | Completion::Superseded => Ok(None),
            Completion::TimedOut => Err(RenderError::TimedOut { page }),
            Completion::Disconnected => Err(RenderError::Disconnected),
        }
    }

    /// Wait for every outstanding request using the default timeout, then
    /// return all accepted events
    pub fn settle(&mut self) -> Vec<ServiceEvent> {
        while let Some(id) = self.outstanding() {
            match self.wait_for(id, DEFAULT_TIMEOUT) {
                Completion::Applied(event) => self.backlog.push_back(event),
                Completion::Superseded => {}
                Completion::TimedOut => {
                    warn!("Timed out waiting for request {id:?}");
                    break;
                }
                Completion::Disconnected => {
                    warn!("Render worker disconnected");
                    break;
                }
            }
        }
        self.poll_responses()
    }

    fn outstanding(&self) -> Option<RequestId> {
        self.latest_load.or(self
            .latest_render
            .filter(|id| self.answered_render != Some(*id)))
    }

    fn handle_response(&mut self, response: RenderResponse) -> Option<ServiceEvent> {
        match response {
            RenderResponse::Loaded { id, page_count } => {
                if self.latest_load != Some(id) {
                    debug!("Dropping stale load {id:?}");
                    return None;
                }
                self.latest_load = None;
                info!("Document ready: {page_count} pages");
                // Renders the first page as a follow-up request.
                let _ = self.apply_command(Command::DocumentLoaded { page_count });
                Some(ServiceEvent::DocumentLoaded { id, page_count })
            }

            RenderResponse::LoadFailed { id, error } => {
                if self.latest_load != Some(id) {
                    debug!("Dropping stale load failure {id:?}");
                    return None;
                }
                self.latest_load = None;
                Some(ServiceEvent::LoadFailed { id, error })
            }

            RenderResponse::Page { id, frame } => {
                if self.latest_render != Some(id) {
                    debug!("Dropping stale render {id:?} of page {}", frame.page);
                    return None;
                }
                self.answered_render = Some(id);
                self.publish(Arc::clone(&frame));
                Some(ServiceEvent::PageRendered { id, frame })
            }

            RenderResponse::Error { id, page, error } => {
                if self.latest_render != Some(id) {
                    debug!("Dropping stale render failure {id:?}");
                    return None;
                }
                self.answered_render = Some(id);
                Some(ServiceEvent::RenderFailed { id, page, error })
            }
        }
    }

    /// Swap in a rendered frame: viewport and text runs change together
    fn publish(&mut self, frame: Arc<PageFrame>) {
        self.session.record_viewport(frame.viewport);
        self.fonts.replace(frame.page, Arc::clone(&frame.text_runs));
        self.frame = Some(frame);
    }

    fn send(&self, request: RenderRequest) {
        if self.request_tx.send(request).is_err() {
            warn!("Render worker is gone; request dropped");
        }
    }

    /// Shutdown the worker
    pub fn shutdown(&self) {
        let _ = self.request_tx.send(RenderRequest::Shutdown);
    }

    fn next_id(&mut self) -> RequestId {
        let id = RequestId::new(self.next_request_id);
        self.next_request_id += 1;
        id
    }
}

impl Drop for RenderService {
    fn drop(&mut self) {
        self.shutdown();
    }
}
