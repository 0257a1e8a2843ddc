//! Render session state management

use crate::coords::{CoordinateMapper, OriginMode};

use super::request::RenderParams;
use super::types::Viewport;
use super::zoom::Zoom;

/// Lifecycle phase of a session
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Empty,
    Loaded,
}

/// Current page, zoom and viewport for the open document.
///
/// Only navigation and zoom commands mutate this; the coordinate mapper
/// and font detection read it.
#[derive(Clone, Debug)]
pub struct RenderSession {
    /// Current page (1-indexed)
    pub current_page: usize,

    /// Total page count, 0 when no document is open
    pub page_count: usize,

    /// User zoom
    pub zoom: Zoom,

    /// Viewport of the last accepted render
    pub viewport: Option<Viewport>,

    /// Physical pixels per CSS pixel
    pub device_pixel_ratio: f64,
}

impl Default for RenderSession {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl RenderSession {
    #[must_use]
    pub fn new(device_pixel_ratio: f64) -> Self {
        Self {
            current_page: 1,
            page_count: 0,
            zoom: Zoom::default(),
            viewport: None,
            device_pixel_ratio: sanitize_ratio(device_pixel_ratio),
        }
    }

    pub fn phase(&self) -> Phase {
        if self.page_count > 0 {
            Phase::Loaded
        } else {
            Phase::Empty
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.phase() == Phase::Loaded
    }

    pub fn scale(&self) -> f64 {
        self.zoom.factor()
    }

    /// Accept `page` only when it lies in `[1, page_count]`
    pub fn set_page(&mut self, page: usize) -> bool {
        if page >= 1 && page <= self.page_count {
            self.current_page = page;
            true
        } else {
            false
        }
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.zoom.set(scale);
    }

    /// Back to the empty state
    pub fn reset(&mut self) {
        self.current_page = 1;
        self.page_count = 0;
        self.zoom = Zoom::default();
        self.viewport = None;
    }

    /// Apply a command and return resulting effects
    #[must_use]
    pub fn apply(&mut self, cmd: Command) -> Vec<Effect> {
        match cmd {
            Command::DocumentLoaded { page_count } => {
                self.reset();
                self.page_count = page_count;
                vec![
                    Effect::DropFrame,
                    Effect::ClearText,
                    Effect::RenderCurrentPage,
                ]
            }

            Command::GoToPage(page) => self.go_to(page),

            Command::ChangePage(delta) => {
                let target = isize::try_from(delta)
                    .ok()
                    .and_then(|delta| self.current_page.checked_add_signed(delta));
                match target {
                    Some(page) => self.go_to(page),
                    None => vec![],
                }
            }

            Command::SetScale(scale) => self.zoom_to(scale),

            Command::ChangeZoom(delta) => self.zoom_to(self.scale() + delta),

            Command::FitToWidth { container_width } => {
                let Some(page_width) = self.viewport.map(|v| v.page_size_pt().0) else {
                    return vec![];
                };
                match Zoom::fit_width(container_width, page_width) {
                    Some(scale) => self.zoom_to(scale),
                    None => vec![],
                }
            }

            Command::ResetView => {
                if !self.is_loaded() {
                    return vec![];
                }
                let page_changed = self.current_page != 1;
                self.current_page = 1;
                self.zoom = Zoom::default();
                let mut effects = vec![];
                if page_changed {
                    effects.push(Effect::ClearText);
                }
                effects.push(Effect::RenderCurrentPage);
                effects
            }

            Command::SetDevicePixelRatio(ratio) => {
                let ratio = sanitize_ratio(ratio);
                if (self.device_pixel_ratio - ratio).abs() > f64::EPSILON {
                    self.device_pixel_ratio = ratio;
                    vec![Effect::DropFrame, Effect::RenderCurrentPage]
                } else {
                    vec![]
                }
            }

            Command::Reset => {
                self.reset();
                vec![Effect::DropFrame, Effect::ClearText]
            }
        }
    }

    fn go_to(&mut self, page: usize) -> Vec<Effect> {
        let previous = self.current_page;
        if !self.set_page(page) || previous == page {
            return vec![];
        }
        vec![Effect::ClearText, Effect::RenderCurrentPage]
    }

    fn zoom_to(&mut self, scale: f64) -> Vec<Effect> {
        let previous = self.scale();
        self.set_scale(scale);
        if (self.scale() - previous).abs() > f64::EPSILON && self.is_loaded() {
            vec![Effect::RenderCurrentPage]
        } else {
            vec![]
        }
    }

    /// Record the viewport of an accepted render
    pub fn record_viewport(&mut self, viewport: Viewport) {
        self.viewport = Some(viewport);
    }

    /// Get render parameters from current state
    #[must_use]
    pub fn render_params(&self) -> RenderParams {
        RenderParams {
            scale: self.scale(),
            device_pixel_ratio: self.device_pixel_ratio,
        }
    }

    /// Displayed page size in CSS pixels, `(0, 0)` before the first render
    pub fn page_dimensions(&self) -> (f64, f64) {
        self.viewport.map(|v| v.css_size()).unwrap_or((0.0, 0.0))
    }

    /// Page size in PDF points, `(0, 0)` before the first render
    pub fn page_size_pt(&self) -> (f64, f64) {
        self.viewport
            .map(|v| v.page_size_pt())
            .unwrap_or((0.0, 0.0))
    }

    pub fn page_rotation(&self) -> i32 {
        if !self.is_loaded() {
            return 0;
        }
        self.viewport.map(|v| v.rotation_deg).unwrap_or(0)
    }

    /// Coordinate mapper for the displayed render.
    ///
    /// Scale and pixel ratio come from the recorded viewport, so a zoom
    /// that has not finished rendering yet does not skew the readout.
    pub fn mapper(&self, origin: OriginMode) -> CoordinateMapper {
        let (scale, ratio) = self
            .viewport
            .map(|v| (v.scale, v.device_pixel_ratio))
            .unwrap_or((self.scale(), self.device_pixel_ratio));
        CoordinateMapper::new(scale, ratio, self.page_size_pt().1, origin)
    }
}

fn sanitize_ratio(ratio: f64) -> f64 {
    if ratio.is_finite() && ratio > 0.0 {
        ratio
    } else {
        1.0
    }
}

/// Commands that modify session state
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// A document finished loading
    DocumentLoaded { page_count: usize },
    /// Go to a specific page (1-indexed); out-of-range pages are ignored
    GoToPage(usize),
    /// Move relative to the current page
    ChangePage(i64),
    /// Set the zoom scale (clamped)
    SetScale(f64),
    /// Add to the zoom scale (clamped)
    ChangeZoom(f64),
    /// Fit the page to a container width in CSS pixels
    FitToWidth { container_width: f64 },
    /// First page at 100%
    ResetView,
    /// Update the device pixel ratio
    SetDevicePixelRatio(f64),
    /// Close the document
    Reset,
}

/// Effects produced by state changes
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Forget the displayed render and any render in flight
    DropFrame,
    /// Drop text runs of the previous page
    ClearText,
    /// Render the current page
    RenderCurrentPage,
}
