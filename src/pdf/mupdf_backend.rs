//! MuPDF implementation of the engine contract

use mupdf::text_page::TextBlockType;
use mupdf::{Colorspace, Document, Matrix, Page, Pixmap, TextPageFlags};

use super::backend::{PdfBackend, PdfDocument, PdfPage, check_page};
use super::error::{LoadError, RenderError};
use super::font_names::{FontNames, FontSpan, name_at};
use super::types::{PixelBuffer, TextItem, Viewport};

const PDF_MIME: &str = "application/pdf";

/// Opens documents with MuPDF
#[derive(Debug, Default, Clone, Copy)]
pub struct MupdfBackend;

impl PdfBackend for MupdfBackend {
    fn open(&self, bytes: &[u8]) -> Result<Box<dyn PdfDocument>, LoadError> {
        let doc = Document::from_bytes(bytes, PDF_MIME)?;
        let page_count = doc.page_count()?.max(0) as usize;
        let fonts = FontNames::open(bytes);
        Ok(Box::new(MupdfDocument {
            doc,
            page_count,
            fonts,
        }))
    }
}

struct MupdfDocument {
    doc: Document,
    page_count: usize,
    fonts: Option<FontNames>,
}

impl PdfDocument for MupdfDocument {
    fn page_count(&self) -> usize {
        self.page_count
    }

    fn page(&self, number: usize) -> Result<Box<dyn PdfPage + '_>, RenderError> {
        let index = check_page(number, self.page_count)?;
        let page = self.doc.load_page(index as i32)?;
        Ok(Box::new(MupdfPage {
            page,
            index,
            fonts: self.fonts.as_ref(),
        }))
    }
}

struct MupdfPage<'a> {
    page: Page,
    index: usize,
    fonts: Option<&'a FontNames>,
}

impl MupdfPage<'_> {
    fn size(&self) -> Result<(f32, f32, f32, f32), RenderError> {
        let bounds = self.page.bounds()?;
        Ok((bounds.x0, bounds.y1, bounds.x1 - bounds.x0, bounds.y1 - bounds.y0))
    }
}

impl PdfPage for MupdfPage<'_> {
    /// MuPDF applies `/Rotate` to the page bounds and the raster, so the
    /// returned viewport is already upright and reports 0 degrees.
    fn viewport(&self, scale: f64) -> Result<Viewport, RenderError> {
        let (_, _, width, height) = self.size()?;
        Ok(Viewport {
            width_px: f64::from(width) * scale,
            height_px: f64::from(height) * scale,
            rotation_deg: 0,
            scale,
            device_pixel_ratio: 1.0,
        })
    }

    fn render(&self, viewport: &Viewport, target: &mut PixelBuffer) -> Result<(), RenderError> {
        let mag = (viewport.scale * viewport.device_pixel_ratio) as f32;
        let transform = Matrix::new_scale(mag, mag);
        let rgb = Colorspace::device_rgb();
        let pixmap = self.page.to_pixmap(&transform, &rgb, false, false)?;
        pixmap_to_rgb(&pixmap, target)
    }

    /// One item per text line. MuPDF's structured text is top-down, so the
    /// baseline origin is flipped into bottom-left page space. Font names
    /// come from the pdf_oxide span on the same baseline, empty when none
    /// matches.
    fn text_content(&self) -> Result<Vec<TextItem>, RenderError> {
        let (left, bottom, _, _) = self.size()?;
        let spans: Vec<FontSpan> = self
            .fonts
            .map(|fonts| fonts.spans(self.index))
            .unwrap_or_default();
        let text_page = self.page.to_text_page(TextPageFlags::empty())?;
        let mut items = Vec::new();

        for block in text_page.blocks() {
            if block.r#type() != TextBlockType::Text {
                continue;
            }

            for line in block.lines() {
                let Some(first) = line.chars().find(|ch| ch.char().is_some()) else {
                    continue;
                };

                let size = f64::from(first.size());
                if !size.is_finite() || size <= 0.0 {
                    continue;
                }

                let origin = first.origin();
                let bbox = line.bounds();
                let x = f64::from(origin.x - left);
                let y = f64::from(bottom - origin.y);

                let font_name = name_at(&spans, x, y, size).unwrap_or_default();
                items.push(TextItem {
                    transform: vec![size, 0.0, 0.0, size, x, y],
                    width: f64::from((bbox.x1 - bbox.x0).abs()) / size,
                    font_name: font_name.to_string(),
                });
            }
        }

        Ok(items)
    }
}

fn pixmap_to_rgb(pixmap: &Pixmap, target: &mut PixelBuffer) -> Result<(), RenderError> {
    let n = pixmap.n() as usize;
    if n < 3 {
        return Err(RenderError::engine(format!(
            "Unsupported pixmap format: {n} channels"
        )));
    }

    let width = pixmap.width() as usize;
    let height = pixmap.height() as usize;
    let stride = pixmap.stride() as usize;
    let samples = pixmap.samples();
    let row_bytes = width * n;
    let expected_min = stride.saturating_mul(height);
    if samples.len() < expected_min || row_bytes > stride {
        return Err(RenderError::engine("Pixmap buffer size mismatch"));
    }

    target.width = pixmap.width();
    target.height = pixmap.height();
    target.pixels.clear();
    target.pixels.reserve(width * height * 3);

    for y in 0..height {
        let row_start = y * stride;
        let row = &samples[row_start..row_start + row_bytes];
        if n == 3 {
            target.pixels.extend_from_slice(row);
        } else {
            for px in row.chunks_exact(n) {
                target.pixels.extend_from_slice(&px[..3]);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A letter-size page showing "Hello" in 12 pt Helvetica at (72, 700)
    fn hello_pdf() -> Vec<u8> {
        let content = "BT /F1 12 Tf 72 700 Td (Hello) Tj ET";
        let objects = [
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
             /Resources << /Font << /F1 5 0 R >> >> /Contents 4 0 R >>"
                .to_string(),
            format!("<< /Length {} >>\nstream\n{content}\nendstream", content.len()),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
        ];

        let mut pdf = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::new();
        for (i, body) in objects.iter().enumerate() {
            offsets.push(pdf.len());
            pdf.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", i + 1).as_bytes());
        }

        let xref = pdf.len();
        let mut tail = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
        for offset in offsets {
            tail.push_str(&format!("{offset:010} 00000 n \n"));
        }
        tail.push_str(&format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref}\n%%EOF\n",
            objects.len() + 1
        ));
        pdf.extend_from_slice(tail.as_bytes());
        pdf
    }

    fn open_hello() -> Box<dyn PdfDocument> {
        MupdfBackend.open(&hello_pdf()).unwrap()
    }

    #[test]
    fn opens_and_counts_pages() {
        let doc = open_hello();
        assert_eq!(doc.page_count(), 1);
        assert!(matches!(
            doc.page(2),
            Err(RenderError::PageOutOfRange {
                page: 2,
                page_count: 1
            })
        ));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(
            MupdfBackend.open(b"definitely not a pdf"),
            Err(LoadError::Invalid { .. })
        ));
    }

    #[test]
    fn viewport_and_raster_follow_scale() {
        let doc = open_hello();
        let page = doc.page(1).unwrap();

        let viewport = page.viewport(2.0).unwrap();
        assert_eq!((viewport.width_px, viewport.height_px), (1224.0, 1584.0));
        assert_eq!(viewport.rotation_deg, 0);

        let mut image = PixelBuffer::default();
        page.render(&viewport, &mut image).unwrap();
        assert_eq!((image.width, image.height), (1224, 1584));
        assert_eq!(image.pixels.len(), 1224 * 1584 * 3);
        assert_eq!(&image.pixels[..3], &[255, 255, 255]);
    }

    #[test]
    fn text_line_is_placed_in_bottom_left_space() {
        let doc = open_hello();
        let page = doc.page(1).unwrap();

        let items = page.text_content().unwrap();
        assert_eq!(items.len(), 1);

        let item = &items[0];
        assert!((item.transform[0] - 12.0).abs() < 0.5, "{:?}", item.transform);
        assert!((item.transform[4] - 72.0).abs() < 1.0, "{:?}", item.transform);
        assert!((item.transform[5] - 700.0).abs() < 1.0, "{:?}", item.transform);
        assert!(item.width > 0.0);
        assert_eq!(item.font_name, "Helvetica");
    }
}
