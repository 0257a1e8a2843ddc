//! Font names for MuPDF text lines
//!
//! MuPDF's structured text carries positions and sizes but no font names,
//! so the same bytes are also parsed with pdf_oxide, whose text spans know
//! the font resource each run was set in. Resource names are resolved to
//! the font's `/BaseFont` through the page resources, and a MuPDF line takes
//! the name of the span sharing its baseline and horizontal extent.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;

use log::{debug, warn};
use pdf_oxide::document::PdfDocument as OxideDocument;
use tempfile::NamedTempFile;

/// A named run of text in bottom-left page space
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpan {
    pub x: f64,
    pub baseline: f64,
    pub width: f64,
    pub size: f64,
    pub name: String,
}

/// Per-document span source. pdf_oxide only opens files, so the bytes are
/// spooled to a temporary file that lives as long as the document.
pub struct FontNames {
    doc: RefCell<OxideDocument>,
    _file: NamedTempFile,
}

impl FontNames {
    /// `None` when pdf_oxide cannot parse the bytes; lines then stay unnamed
    pub fn open(bytes: &[u8]) -> Option<Self> {
        let mut file = match NamedTempFile::new() {
            Ok(file) => file,
            Err(e) => {
                warn!("Cannot spool document for font lookup: {e}");
                return None;
            }
        };
        if let Err(e) = file.write_all(bytes).and_then(|()| file.flush()) {
            warn!("Cannot spool document for font lookup: {e}");
            return None;
        }

        match OxideDocument::open(file.path()) {
            Ok(doc) => Some(Self {
                doc: RefCell::new(doc),
                _file: file,
            }),
            Err(e) => {
                warn!("Font names unavailable: {e}");
                None
            }
        }
    }

    /// Spans of the page at `index` (0-based). Extraction failures give an
    /// empty list.
    pub fn spans(&self, index: usize) -> Vec<FontSpan> {
        let mut doc = self.doc.borrow_mut();
        let spans = match doc.extract_spans(index) {
            Ok(spans) => spans,
            Err(e) => {
                debug!("No font spans for page index {index}: {e}");
                return Vec::new();
            }
        };
        let base_fonts = base_fonts(&mut doc, index).unwrap_or_else(|e| {
            debug!("No font resources for page index {index}: {e}");
            HashMap::new()
        });

        spans
            .into_iter()
            .filter(|span| !span.font_name.is_empty() && !span.text.trim().is_empty())
            .map(|span| FontSpan {
                x: f64::from(span.bbox.x),
                baseline: f64::from(span.bbox.y),
                width: f64::from(span.bbox.width),
                size: f64::from(span.font_size),
                name: base_fonts
                    .get(span.font_name.trim_start_matches('/'))
                    .cloned()
                    .unwrap_or(span.font_name),
            })
            .collect()
    }
}

/// Resource name to `/BaseFont` for the fonts of one page
fn base_fonts(
    doc: &mut OxideDocument,
    index: usize,
) -> pdf_oxide::error::Result<HashMap<String, String>> {
    let resources = doc.get_page_resources(index)?;
    let Some(fonts) = resources.as_dict().and_then(|dict| dict.get("Font")) else {
        return Ok(HashMap::new());
    };
    let fonts = doc.resolve_object(fonts)?;

    let mut names = HashMap::new();
    for (resource, font) in fonts.as_dict().into_iter().flatten() {
        let font = doc.resolve_object(font)?;
        let base = font
            .as_dict()
            .and_then(|dict| dict.get("BaseFont"))
            .and_then(|name| name.as_name());
        if let Some(base) = base {
            names.insert(resource.clone(), base.to_string());
        }
    }
    Ok(names)
}

/// Name of the span closest to a line starting at `(x, baseline)`.
///
/// A span qualifies when its baseline is within half the line's font size
/// and `x` falls inside the span's horizontal extent, widened by the same
/// tolerance.
pub fn name_at(spans: &[FontSpan], x: f64, baseline: f64, size: f64) -> Option<&str> {
    let tolerance = (size * 0.5).max(1.0);

    spans
        .iter()
        .filter(|span| (span.baseline - baseline).abs() <= tolerance)
        .filter(|span| x >= span.x - tolerance && x <= span.x + span.width + tolerance)
        .min_by(|a, b| {
            let da = (a.baseline - baseline).abs() + (a.x - x).abs();
            let db = (b.baseline - baseline).abs() + (b.x - x).abs();
            da.total_cmp(&db)
        })
        .map(|span| span.name.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(x: f64, baseline: f64, width: f64, name: &str) -> FontSpan {
        FontSpan {
            x,
            baseline,
            width,
            size: 12.0,
            name: name.to_string(),
        }
    }

    #[test]
    fn line_takes_name_of_span_on_its_baseline() {
        let spans = vec![
            span(72.0, 700.0, 120.0, "Helvetica"),
            span(72.0, 680.0, 120.0, "Times-Bold"),
        ];
        assert_eq!(name_at(&spans, 72.0, 700.2, 12.0), Some("Helvetica"));
        assert_eq!(name_at(&spans, 72.0, 680.0, 12.0), Some("Times-Bold"));
    }

    #[test]
    fn nearest_start_wins_on_a_shared_baseline() {
        let spans = vec![
            span(72.0, 700.0, 60.0, "Helvetica"),
            span(140.0, 700.0, 60.0, "Courier"),
        ];
        assert_eq!(name_at(&spans, 139.0, 700.0, 12.0), Some("Courier"));
        assert_eq!(name_at(&spans, 80.0, 700.0, 12.0), Some("Helvetica"));
    }

    #[test]
    fn distant_line_has_no_name() {
        let spans = vec![span(72.0, 700.0, 60.0, "Helvetica")];
        assert_eq!(name_at(&spans, 72.0, 650.0, 12.0), None);
        assert_eq!(name_at(&spans, 300.0, 700.0, 12.0), None);
        assert_eq!(name_at(&[], 72.0, 700.0, 12.0), None);
    }

    #[test]
    fn unparseable_bytes_give_no_lookup() {
        assert!(FontNames::open(b"not a pdf").is_none());
    }
}
