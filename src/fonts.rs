//! Font detection by hit-testing positioned text runs
//!
//! A click in PDF space is matched against the text runs extracted from
//! the current page. Runs are scanned in reading order and the first run
//! whose radius contains the point wins, even when a later run's origin
//! is closer.

use std::collections::BTreeSet;
use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::coords::PdfPoint;
use crate::pdf::TextItem;

pub const UNKNOWN_FONT: &str = "Unknown";

/// Fraction of a run's larger dimension used as the hit radius
const HIT_RADIUS_FACTOR: f64 = 0.5;

static SUBSET_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{6}\+").expect("valid subset prefix regex"));
static STYLE_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[+-]+\w+$").expect("valid style suffix regex"));

/// A positioned run of glyphs sharing one transform and font
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    /// Origin in PDF space (bottom-left convention)
    pub origin: PdfPoint,
    /// `|transform[0]|`; wrong for rotated or skewed runs
    pub font_size: f64,
    /// Advance width in glyph space, multiplied by the font size for page units
    pub advance_width: f64,
    /// Font name as reported by the renderer, empty when unknown
    pub font_name: String,
}

impl TextRun {
    /// Build a run from an extracted text item. Items without a full
    /// affine transform are skipped.
    pub fn from_item(item: &TextItem) -> Option<Self> {
        let &[a, _, _, _, e, f] = item.transform.get(..6)? else {
            return None;
        };

        Some(Self {
            origin: PdfPoint::new(e, f),
            font_size: a.abs(),
            advance_width: item.width,
            font_name: item.font_name.clone(),
        })
    }

    pub fn width(&self) -> f64 {
        self.advance_width * self.font_size
    }

    pub fn height(&self) -> f64 {
        self.font_size
    }

    pub fn hit_radius(&self) -> f64 {
        self.width().max(self.height()) * HIT_RADIUS_FACTOR
    }

    pub fn contains(&self, point: PdfPoint) -> bool {
        point.distance_to(self.origin) <= self.hit_radius()
    }
}

/// Font metrics for a matched run
#[derive(Debug, Clone, PartialEq)]
pub struct FontInfo {
    pub font_size: f64,
    pub font_name: String,
    pub font_family: String,
}

impl FontInfo {
    fn from_run(run: &TextRun) -> Self {
        if run.font_name.is_empty() {
            return Self {
                font_size: run.font_size,
                font_name: UNKNOWN_FONT.to_string(),
                font_family: UNKNOWN_FONT.to_string(),
            };
        }

        Self {
            font_size: run.font_size,
            font_name: run.font_name.clone(),
            font_family: font_family(&run.font_name),
        }
    }

    pub fn is_bold(&self) -> bool {
        self.font_name.to_lowercase().contains("bold")
    }

    pub fn is_italic(&self) -> bool {
        let name = self.font_name.to_lowercase();
        name.contains("italic") || name.contains("oblique")
    }
}

/// Derive a family name from a font name.
///
/// Drops a six-letter subset tag (`ABCDEF+`) and a trailing style suffix
/// (`-Bold`, `+Italic`). Returns the input unchanged when nothing
/// matches, and [`UNKNOWN_FONT`] for an empty name.
pub fn font_family(font_name: &str) -> String {
    if font_name.is_empty() {
        return UNKNOWN_FONT.to_string();
    }

    let unprefixed = SUBSET_PREFIX.replace(font_name, "");
    let family = STYLE_SUFFIX.replace(&unprefixed, "");

    if family.is_empty() {
        unprefixed.into_owned()
    } else {
        family.into_owned()
    }
}

/// Text runs for the current page and the lookups over them
#[derive(Debug, Default, Clone)]
pub struct FontDetector {
    page: Option<usize>,
    runs: Arc<[TextRun]>,
}

impl FontDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all runs with those of `page`
    pub fn replace(&mut self, page: usize, runs: Arc<[TextRun]>) {
        self.page = Some(page);
        self.runs = runs;
    }

    pub fn reset(&mut self) {
        self.page = None;
        self.runs = Arc::from(Vec::new());
    }

    /// Page the current runs belong to
    pub fn page(&self) -> Option<usize> {
        self.page
    }

    pub fn runs(&self) -> &[TextRun] {
        &self.runs
    }

    /// First run in reading order whose hit radius contains `point`
    pub fn hit_test(&self, point: PdfPoint) -> Option<&TextRun> {
        self.runs.iter().find(|run| run.contains(point))
    }

    pub fn find_font(&self, point: PdfPoint) -> Option<FontInfo> {
        self.hit_test(point).map(FontInfo::from_run)
    }

    /// Distinct font families on the page, sorted
    pub fn fonts(&self) -> Vec<String> {
        self.runs
            .iter()
            .filter(|run| !run.font_name.is_empty())
            .map(|run| font_family(&run.font_name))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(x: f64, y: f64, size: f64, advance: f64, name: &str) -> TextRun {
        TextRun {
            origin: PdfPoint::new(x, y),
            font_size: size,
            advance_width: advance,
            font_name: name.to_string(),
        }
    }

    fn detector(runs: Vec<TextRun>) -> FontDetector {
        let mut detector = FontDetector::new();
        detector.replace(1, Arc::from(runs));
        detector
    }

    #[test]
    fn family_strips_style_suffix() {
        assert_eq!(font_family("Helvetica-Bold"), "Helvetica");
        assert_eq!(font_family("Times-Roman"), "Times");
    }

    #[test]
    fn family_strips_subset_prefix() {
        assert_eq!(font_family("ABCDEF+Arial"), "Arial");
        assert_eq!(font_family("QWERTY+Helvetica-Oblique"), "Helvetica");
    }

    #[test]
    fn family_without_suffix_is_unchanged() {
        assert_eq!(font_family("Times"), "Times");
        assert_eq!(font_family(""), UNKNOWN_FONT);
    }

    #[test]
    fn empty_detector_never_matches() {
        let detector = FontDetector::new();
        for point in [
            PdfPoint::new(0.0, 0.0),
            PdfPoint::new(100.0, 700.0),
            PdfPoint::new(-5.0, 1e6),
        ] {
            assert!(detector.find_font(point).is_none());
        }
    }

    #[test]
    fn point_inside_radius_matches() {
        // width = 4 * 10 = 40, radius = 20
        let detector = detector(vec![run(100.0, 700.0, 10.0, 4.0, "Helvetica-Bold")]);

        let info = detector
            .find_font(PdfPoint::new(112.0, 709.0))
            .expect("point is 15 away");
        assert_eq!(info.font_size, 10.0);
        assert_eq!(info.font_name, "Helvetica-Bold");
        assert_eq!(info.font_family, "Helvetica");
        assert!(info.is_bold());
        assert!(!info.is_italic());

        assert!(detector.find_font(PdfPoint::new(121.0, 700.0)).is_none());
    }

    #[test]
    fn first_match_wins_over_closer_run() {
        let detector = detector(vec![
            run(100.0, 100.0, 12.0, 5.0, "First"),
            run(104.0, 100.0, 12.0, 5.0, "Second"),
        ]);

        let info = detector
            .find_font(PdfPoint::new(104.0, 100.0))
            .expect("both runs contain the point");
        assert_eq!(info.font_name, "First");
    }

    #[test]
    fn missing_font_name_is_unknown() {
        let detector = detector(vec![run(0.0, 0.0, 8.0, 1.0, "")]);
        let info = detector.find_font(PdfPoint::new(1.0, 1.0)).unwrap();
        assert_eq!(info.font_name, UNKNOWN_FONT);
        assert_eq!(info.font_family, UNKNOWN_FONT);
    }

    #[test]
    fn replace_drops_previous_page_runs() {
        let mut detector = detector(vec![run(10.0, 10.0, 12.0, 2.0, "Old")]);
        detector.replace(2, Arc::from(vec![run(500.0, 500.0, 12.0, 2.0, "New")]));

        assert_eq!(detector.page(), Some(2));
        assert!(detector.find_font(PdfPoint::new(10.0, 10.0)).is_none());
        assert_eq!(
            detector.find_font(PdfPoint::new(500.0, 500.0)).unwrap().font_name,
            "New"
        );
    }

    #[test]
    fn run_from_item_uses_transform() {
        let item = TextItem {
            transform: vec![-14.0, 0.0, 0.0, 14.0, 72.0, 700.0],
            width: 3.5,
            font_name: "ABCDEF+Garamond".into(),
        };
        let run = TextRun::from_item(&item).unwrap();
        assert_eq!(run.origin, PdfPoint::new(72.0, 700.0));
        assert_eq!(run.font_size, 14.0);
        assert_eq!(run.width(), 49.0);

        let short = TextItem {
            transform: vec![1.0, 0.0],
            width: 1.0,
            font_name: String::new(),
        };
        assert!(TextRun::from_item(&short).is_none());
    }

    #[test]
    fn fonts_lists_sorted_families() {
        let detector = detector(vec![
            run(0.0, 0.0, 10.0, 1.0, "Times-Bold"),
            run(0.0, 20.0, 10.0, 1.0, "ABCDEF+Arial"),
            run(0.0, 40.0, 10.0, 1.0, "Times-Italic"),
            run(0.0, 60.0, 10.0, 1.0, ""),
        ]);
        assert_eq!(detector.fonts(), vec!["Arial", "Times"]);
    }
}
