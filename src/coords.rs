//! Screen to PDF user-space coordinate mapping
//!
//! Pointer positions arrive relative to the top-left corner of the
//! displayed canvas. They are divided by the zoom scale and the device
//! pixel ratio to get PDF points, then the vertical axis is flipped when
//! the bottom-left origin is selected.

use serde::{Deserialize, Serialize};

/// Where vertical coordinate 0 lies on the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OriginMode {
    #[default]
    TopLeft,
    BottomLeft,
}

impl OriginMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            OriginMode::TopLeft => "top-left",
            OriginMode::BottomLeft => "bottom-left",
        }
    }

    pub fn parse(name: &str) -> Option<OriginMode> {
        match name.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "top-left" | "top" => Some(OriginMode::TopLeft),
            "bottom-left" | "bottom" => Some(OriginMode::BottomLeft),
            _ => None,
        }
    }
}

/// Pointer position relative to the canvas top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A point in PDF user space (points)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PdfPoint {
    pub x: f64,
    pub y: f64,
}

impl PdfPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: PdfPoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Result of mapping one pointer sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    /// Final coordinates in the selected origin convention
    pub point: PdfPoint,
    /// Vertical coordinate measured downwards from the top edge
    pub top_down_y: f64,
}

/// Snapshot of everything the mapping depends on.
///
/// The mapping is a pure function of these values; build a fresh mapper
/// whenever scale, device pixel ratio, page or origin changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    pub scale: f64,
    pub device_pixel_ratio: f64,
    /// Page height in PDF units, 0 when no page is rendered
    pub page_height: f64,
    pub origin: OriginMode,
}

impl CoordinateMapper {
    pub fn new(scale: f64, device_pixel_ratio: f64, page_height: f64, origin: OriginMode) -> Self {
        Self {
            scale,
            device_pixel_ratio,
            page_height: if page_height.is_finite() {
                page_height
            } else {
                0.0
            },
            origin,
        }
    }

    fn divisor(&self) -> f64 {
        self.scale * self.device_pixel_ratio
    }

    /// Map a canvas-relative pointer position to PDF space
    pub fn sample(&self, screen: ScreenPoint) -> PointerSample {
        let x = screen.x / self.scale / self.device_pixel_ratio;
        let top_down_y = screen.y / self.scale / self.device_pixel_ratio;

        let y = match self.origin {
            OriginMode::BottomLeft => self.page_height - top_down_y,
            OriginMode::TopLeft => top_down_y,
        };

        PointerSample {
            point: PdfPoint::new(x, y),
            top_down_y,
        }
    }

    pub fn to_pdf(&self, screen: ScreenPoint) -> PdfPoint {
        self.sample(screen).point
    }

    /// Inverse of [`CoordinateMapper::to_pdf`]
    pub fn to_screen(&self, point: PdfPoint) -> ScreenPoint {
        let top_down_y = match self.origin {
            OriginMode::BottomLeft => self.page_height - point.y,
            OriginMode::TopLeft => point.y,
        };

        ScreenPoint::new(point.x * self.divisor(), top_down_y * self.divisor())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < EPS, "{a} != {b}");
    }

    #[test]
    fn divides_by_scale_and_device_pixel_ratio() {
        let mapper = CoordinateMapper::new(2.0, 1.5, 792.0, OriginMode::TopLeft);
        let point = mapper.to_pdf(ScreenPoint::new(300.0, 150.0));
        assert_close(point.x, 100.0);
        assert_close(point.y, 50.0);
    }

    #[test]
    fn bottom_left_flips_vertical_axis_only() {
        let top = CoordinateMapper::new(1.0, 1.0, 792.0, OriginMode::TopLeft);
        let bottom = CoordinateMapper::new(1.0, 1.0, 792.0, OriginMode::BottomLeft);
        let screen = ScreenPoint::new(40.0, 100.0);

        let a = top.to_pdf(screen);
        let b = bottom.to_pdf(screen);
        assert_close(a.x, b.x);
        assert_close(b.y, 792.0 - a.y);
    }

    #[test]
    fn bottom_edge_maps_to_zero_in_bottom_left_mode() {
        let mapper = CoordinateMapper::new(1.25, 2.0, 792.0, OriginMode::BottomLeft);
        let screen_y = 792.0 * 1.25 * 2.0;
        let sample = mapper.sample(ScreenPoint::new(0.0, screen_y));
        assert_close(sample.top_down_y, 792.0);
        assert_close(sample.point.y, 0.0);
    }

    #[test]
    fn round_trip_for_every_scale_step() {
        let mut scale = 0.25;
        while scale <= 4.0 {
            for origin in [OriginMode::TopLeft, OriginMode::BottomLeft] {
                let mapper = CoordinateMapper::new(scale, 2.0, 842.0, origin);
                let screen = ScreenPoint::new(123.4, 567.8);
                let back = mapper.to_screen(mapper.to_pdf(screen));
                assert!((back.x - screen.x).abs() < 1e-6);
                assert!((back.y - screen.y).abs() < 1e-6);
            }
            scale += 0.25;
        }
    }

    #[test]
    fn missing_page_uses_zero_height() {
        let mapper = CoordinateMapper::new(1.0, 1.0, f64::NAN, OriginMode::BottomLeft);
        let point = mapper.to_pdf(ScreenPoint::new(10.0, 20.0));
        assert_close(point.y, -20.0);
    }

    #[test]
    fn mapping_is_idempotent() {
        let mapper = CoordinateMapper::new(1.5, 1.0, 600.0, OriginMode::BottomLeft);
        let screen = ScreenPoint::new(33.0, 44.0);
        assert_eq!(mapper.to_pdf(screen), mapper.to_pdf(screen));
    }

    #[test]
    fn origin_parsing() {
        assert_eq!(OriginMode::parse("bottom-left"), Some(OriginMode::BottomLeft));
        assert_eq!(OriginMode::parse("top_left"), Some(OriginMode::TopLeft));
        assert_eq!(OriginMode::parse("middle"), None);
    }
}
