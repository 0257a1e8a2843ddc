//! PDF page viewer core with coordinate and font inspection

pub mod coords;
pub mod fonts;
pub mod panic_handler;
pub mod pdf;
pub mod settings;
pub mod units;
pub mod viewer;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use coords::{CoordinateMapper, OriginMode, PdfPoint, PointerSample, ScreenPoint};
pub use fonts::{FontDetector, FontInfo, TextRun};
pub use settings::Settings;
pub use units::{Unit, UnitSet, convert_all};
pub use viewer::{CoordinateReadout, FontReport, PageInfo, ViewOptions, Viewer};
