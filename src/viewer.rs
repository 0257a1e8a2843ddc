//! Viewer front end: navigation, zoom, hover readout and font detection
//!
//! Pointer positions are relative to the top-left corner of the displayed
//! page, in CSS pixels multiplied by the device pixel ratio, the same
//! space the renderer's pixel buffer uses.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::coords::{OriginMode, PdfPoint, PointerSample, ScreenPoint};
use crate::fonts::FontInfo;
use crate::pdf::{
    Command, LoadError, PdfBackend, RenderService, RenderSession, RequestId, ServiceConfig,
    ServiceEvent, Zoom,
};
use crate::units::{Unit, UnitSet};

/// Display preferences that affect formatting only
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewOptions {
    pub origin: OriginMode,
    pub units: UnitSet,
}

/// Hover readout for one pointer position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateReadout {
    pub screen: ScreenPoint,
    pub sample: PointerSample,
}

impl CoordinateReadout {
    pub fn point(&self) -> PdfPoint {
        self.sample.point
    }

    /// `"X: 72.00 pt"` style lines for every enabled unit
    pub fn lines(&self, units: &UnitSet) -> Vec<String> {
        let point = self.sample.point;
        let mut lines = Vec::new();
        for unit in units.iter() {
            lines.push(format!("X: {} {}", unit.format(point.x), unit));
            lines.push(format!("Y: {} {}", unit.format(point.y), unit));
        }
        lines
    }
}

/// Outcome of clicking on the page
#[derive(Debug, Clone, PartialEq)]
pub enum FontReport {
    Found { font: FontInfo, position: PdfPoint },
    NotFound { position: PdfPoint },
}

impl FontReport {
    pub fn font(&self) -> Option<&FontInfo> {
        match self {
            FontReport::Found { font, .. } => Some(font),
            FontReport::NotFound { .. } => None,
        }
    }

    pub fn position(&self) -> PdfPoint {
        match self {
            FontReport::Found { position, .. } | FontReport::NotFound { position } => *position,
        }
    }
}

impl fmt::Display for FontReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontReport::Found { font, position } => {
                writeln!(f, "Font Size: {:.2} pt", font.font_size)?;
                writeln!(f, "Font Family: {}", font.font_family)?;
                writeln!(f, "Font Name: {}", font.font_name)?;
                write!(f, "Position: ({:.1}, {:.1})", position.x, position.y)
            }
            FontReport::NotFound { position } => {
                writeln!(f, "No font detected at this position")?;
                write!(f, "Position: ({:.1}, {:.1})", position.x, position.y)
            }
        }
    }
}

/// Size and rotation of the displayed page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageInfo {
    /// CSS pixels
    pub width: f64,
    pub height: f64,
    pub rotation: i32,
}

impl PageInfo {
    pub fn size_label(&self) -> String {
        format!("{} × {} px", self.width.round(), self.height.round())
    }

    pub fn rotation_label(&self) -> String {
        format!("{}°", self.rotation)
    }
}

pub struct Viewer {
    service: RenderService,
    options: ViewOptions,
}

impl Viewer {
    pub fn new<B: PdfBackend>(backend: B, options: ViewOptions) -> Self {
        Self::with_config(backend, ServiceConfig::default(), options)
    }

    pub fn with_config<B: PdfBackend>(
        backend: B,
        config: ServiceConfig,
        options: ViewOptions,
    ) -> Self {
        Self {
            service: RenderService::with_config(backend, config),
            options,
        }
    }

    pub fn options(&self) -> &ViewOptions {
        &self.options
    }

    pub fn set_origin(&mut self, origin: OriginMode) {
        self.options.origin = origin;
    }

    pub fn toggle_unit(&mut self, unit: Unit) {
        self.options.units.toggle(unit);
    }

    pub fn service(&self) -> &RenderService {
        &self.service
    }

    pub fn service_mut(&mut self) -> &mut RenderService {
        &mut self.service
    }

    pub fn session(&self) -> &RenderSession {
        self.service.session()
    }

    /// Start loading a document. The first page renders once it is ready.
    pub fn open(&mut self, bytes: impl Into<Arc<[u8]>>) -> RequestId {
        self.service.load_document(bytes)
    }

    /// Load a document, wait for it and for its first page
    pub fn open_blocking(
        &mut self,
        bytes: impl Into<Arc<[u8]>>,
        timeout: Duration,
    ) -> Result<usize, LoadError> {
        let page_count = self.service.load_document_blocking(bytes, timeout)?;
        self.service.settle();
        Ok(page_count)
    }

    /// Drop the document ("upload new")
    pub fn close(&mut self) {
        self.service.reset();
    }

    pub fn render_current(&mut self) -> Option<RequestId> {
        self.service.render_current()
    }

    pub fn go_to_page(&mut self, page: usize) -> Option<RequestId> {
        self.service.apply_command(Command::GoToPage(page))
    }

    pub fn change_page(&mut self, delta: i64) -> Option<RequestId> {
        self.service.apply_command(Command::ChangePage(delta))
    }

    pub fn change_zoom(&mut self, delta: f64) -> Option<RequestId> {
        self.service.apply_command(Command::ChangeZoom(delta))
    }

    pub fn zoom_in(&mut self) -> Option<RequestId> {
        self.change_zoom(Zoom::STEP)
    }

    pub fn zoom_out(&mut self) -> Option<RequestId> {
        self.change_zoom(-Zoom::STEP)
    }

    pub fn set_zoom(&mut self, scale: f64) -> Option<RequestId> {
        self.service.apply_command(Command::SetScale(scale))
    }

    /// Fit the page into `container_width` CSS pixels
    pub fn fit_to_width(&mut self, container_width: f64) -> Option<RequestId> {
        self.service
            .apply_command(Command::FitToWidth { container_width })
    }

    pub fn reset_view(&mut self) -> Option<RequestId> {
        self.service.apply_command(Command::ResetView)
    }

    pub fn set_device_pixel_ratio(&mut self, ratio: f64) -> Option<RequestId> {
        self.service
            .apply_command(Command::SetDevicePixelRatio(ratio))
    }

    /// Apply renderer results that have arrived
    pub fn pump(&mut self) -> Vec<ServiceEvent> {
        self.service.poll_responses()
    }

    /// Wait until nothing is in flight
    pub fn settle(&mut self) -> Vec<ServiceEvent> {
        self.service.settle()
    }

    /// Coordinates under the pointer, or `None` when no page is displayed
    /// or the pointer is outside it
    pub fn pointer_moved(&self, x: f64, y: f64) -> Option<CoordinateReadout> {
        let frame = self.service.current_frame()?;
        let (width, height) = (frame.viewport.width_px, frame.viewport.height_px);
        if !(0.0..=width).contains(&x) || !(0.0..=height).contains(&y) {
            return None;
        }

        let screen = ScreenPoint::new(x, y);
        let sample = self.session().mapper(self.options.origin).sample(screen);
        Some(CoordinateReadout { screen, sample })
    }

    /// Font of the first text run containing the clicked point.
    ///
    /// Text runs live in bottom-left page space, so the hit test always
    /// uses that convention; the reported position follows the selected
    /// origin.
    pub fn clicked(&self, x: f64, y: f64) -> FontReport {
        let screen = ScreenPoint::new(x, y);
        let session = self.session();
        let position = session.mapper(self.options.origin).to_pdf(screen);
        let hit = session.mapper(OriginMode::BottomLeft).to_pdf(screen);

        match self.service.fonts().find_font(hit) {
            Some(font) => FontReport::Found { font, position },
            None => FontReport::NotFound { position },
        }
    }

    /// Distinct font families on the displayed page
    pub fn fonts(&self) -> Vec<String> {
        self.service.fonts().fonts()
    }

    pub fn page_info(&self) -> Option<PageInfo> {
        let session = self.session();
        if session.viewport.is_none() {
            return None;
        }
        let (width, height) = session.page_dimensions();
        Some(PageInfo {
            width,
            height,
            rotation: session.page_rotation(),
        })
    }

    /// `"2 / 3"`, empty without a document
    pub fn page_label(&self) -> String {
        let session = self.session();
        if !session.is_loaded() {
            return String::new();
        }
        format!("{} / {}", session.current_page, session.page_count)
    }

    pub fn zoom_label(&self) -> String {
        format!("{}%", self.session().zoom.percent())
    }
}
