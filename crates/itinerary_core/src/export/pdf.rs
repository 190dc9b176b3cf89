//! Document capability and the built-in single-page PDF writer.
//!
//! # Invariants
//! - Output is one portrait page, `page_width_mm` wide, with a height that
//!   keeps the raster's aspect ratio.
//! - The raster fills the page width edge to edge.
//! - The image stream is the PNG IDAT payload, decoded by readers through
//!   `FlateDecode` with PNG predictors; no second codec is needed.

use crate::export::{encode_png, ExportError};
use image::{ExtendedColorType, RgbImage, RgbaImage};
use std::io::Write;

/// A4 portrait width.
pub const A4_WIDTH_MM: f64 = 210.0;

const POINTS_PER_MM: f64 = 72.0 / 25.4;
const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

/// Produces a paginated document from a raster image.
pub trait DocumentWriter {
    fn write_document(&self, image: &RgbaImage) -> Result<Vec<u8>, ExportError>;
}

/// Minimal PDF 1.4 writer embedding one raster image.
#[derive(Debug, Clone, Copy)]
pub struct PdfWriter {
    pub page_width_mm: f64,
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self {
            page_width_mm: A4_WIDTH_MM,
        }
    }
}

impl PdfWriter {
    /// Page size in points for an image of `width x height` pixels.
    pub fn page_size(&self, width: u32, height: u32) -> (f64, f64) {
        let page_width = self.page_width_mm * POINTS_PER_MM;
        let page_height = page_width * f64::from(height) / f64::from(width);
        (page_width, page_height)
    }
}

impl DocumentWriter for PdfWriter {
    fn write_document(&self, image: &RgbaImage) -> Result<Vec<u8>, ExportError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(ExportError::EmptyRaster);
        }

        let flat = flatten_onto_white(image);
        let png = encode_png(flat.as_raw(), width, height, ExtendedColorType::Rgb8)?;
        let idat = png_image_data(&png)?;
        let (page_width, page_height) = self.page_size(width, height);

        let mut pdf = PdfBuilder::default();
        pdf.object(b"<< /Type /Catalog /Pages 2 0 R >>".to_vec());
        pdf.object(b"<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_vec());
        pdf.object(
            format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {page_width:.2} {page_height:.2}] \
                 /Resources << /XObject << /Im0 4 0 R >> >> /Contents 5 0 R >>"
            )
            .into_bytes(),
        );
        pdf.stream(
            format!(
                "<< /Type /XObject /Subtype /Image /Width {width} /Height {height} \
                 /ColorSpace /DeviceRGB /BitsPerComponent 8 /Filter /FlateDecode \
                 /DecodeParms << /Predictor 15 /Colors 3 /BitsPerComponent 8 /Columns {width} >> \
                 /Length {} >>",
                idat.len()
            ),
            &idat,
        );
        let content =
            format!("q\n{page_width:.2} 0 0 {page_height:.2} 0 0 cm\n/Im0 Do\nQ\n").into_bytes();
        pdf.stream(format!("<< /Length {} >>", content.len()), &content);
        pdf.finish()
            .map_err(|err| ExportError::Document(format!("failed to assemble pdf: {err}")))
    }
}

/// Composites any transparency onto white and drops the alpha channel.
fn flatten_onto_white(image: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b, a] = image.get_pixel(x, y).0;
        let blend = |channel: u8| -> u8 {
            let alpha = u16::from(a);
            ((u16::from(channel) * alpha + 255 * (255 - alpha)) / 255) as u8
        };
        image::Rgb([blend(r), blend(g), blend(b)])
    })
}

/// Concatenates IDAT payloads of an 8-bit RGB, non-interlaced PNG.
fn png_image_data(png: &[u8]) -> Result<Vec<u8>, ExportError> {
    let malformed =
        |reason: &str| ExportError::Document(format!("unexpected png layout: {reason}"));
    if png.len() < PNG_SIGNATURE.len() || png[..PNG_SIGNATURE.len()] != PNG_SIGNATURE {
        return Err(malformed("missing signature"));
    }

    let mut offset = PNG_SIGNATURE.len();
    let mut data = Vec::new();
    while offset + 8 <= png.len() {
        let length = u32::from_be_bytes([
            png[offset],
            png[offset + 1],
            png[offset + 2],
            png[offset + 3],
        ]) as usize;
        let kind = &png[offset + 4..offset + 8];
        let body_start = offset + 8;
        let body_end = body_start
            .checked_add(length)
            .filter(|end| end + 4 <= png.len())
            .ok_or_else(|| malformed("truncated chunk"))?;
        let body = &png[body_start..body_end];

        match kind {
            b"IHDR" => {
                // bit depth 8, color type 2 (RGB), interlace 0
                if body.len() != 13 || body[8] != 8 || body[9] != 2 || body[12] != 0 {
                    return Err(malformed("expected 8-bit non-interlaced RGB"));
                }
            }
            b"IDAT" => data.extend_from_slice(body),
            b"IEND" => break,
            _ => {}
        }
        offset = body_end + 4;
    }

    if data.is_empty() {
        return Err(malformed("no image data"));
    }
    Ok(data)
}

/// Sequential object writer that tracks cross-reference offsets.
#[derive(Default)]
struct PdfBuilder {
    objects: Vec<Vec<u8>>,
}

impl PdfBuilder {
    fn object(&mut self, body: Vec<u8>) {
        self.objects.push(body);
    }

    fn stream(&mut self, dictionary: String, data: &[u8]) {
        let mut body = dictionary.into_bytes();
        body.extend_from_slice(b"\nstream\n");
        body.extend_from_slice(data);
        body.extend_from_slice(b"\nendstream");
        self.objects.push(body);
    }

    fn finish(self) -> std::io::Result<Vec<u8>> {
        let mut out = Vec::new();
        out.write_all(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n")?;

        let mut offsets = Vec::with_capacity(self.objects.len());
        for (index, body) in self.objects.iter().enumerate() {
            offsets.push(out.len());
            writeln!(out, "{} 0 obj", index + 1)?;
            out.write_all(body)?;
            out.write_all(b"\nendobj\n")?;
        }

        let xref_offset = out.len();
        write!(out, "xref\n0 {}\n", self.objects.len() + 1)?;
        out.write_all(b"0000000000 65535 f \n")?;
        for offset in offsets {
            writeln!(out, "{offset:010} 00000 n ")?;
        }
        write!(
            out,
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n",
            self.objects.len() + 1
        )?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::{png_image_data, DocumentWriter, PdfWriter};
    use crate::export::ExportError;
    use image::{Rgba, RgbaImage};

    fn contains(haystack: &[u8], needle: &str) -> bool {
        haystack
            .windows(needle.len())
            .any(|window| window == needle.as_bytes())
    }

    #[test]
    fn page_keeps_raster_aspect_ratio_at_a4_width() {
        let (width, height) = PdfWriter::default().page_size(1440, 2880);
        assert!((width - 595.28).abs() < 0.01);
        assert!((height - 1190.55).abs() < 0.01);
    }

    #[test]
    fn writes_single_page_pdf_with_embedded_image() {
        let image = RgbaImage::from_pixel(40, 20, Rgba([255, 255, 255, 255]));
        let pdf = PdfWriter::default().write_document(&image).unwrap();

        assert!(pdf.starts_with(b"%PDF-1.4"));
        assert!(pdf.ends_with(b"%%EOF\n"));
        assert!(contains(&pdf, "/Count 1"));
        assert!(contains(&pdf, "/MediaBox [0 0 595.28 297.64]"));
        assert!(contains(&pdf, "/Width 40 /Height 20"));
        assert!(contains(&pdf, "/Predictor 15"));
    }

    #[test]
    fn xref_offsets_point_at_objects() {
        let image = RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 255]));
        let pdf = PdfWriter::default().write_document(&image).unwrap();

        let marker = b"startxref\n";
        let marker_at = pdf
            .windows(marker.len())
            .rposition(|window| window == marker)
            .unwrap();
        let number: Vec<u8> = pdf[marker_at + marker.len()..]
            .iter()
            .take_while(|byte| **byte != b'\n')
            .copied()
            .collect();
        let xref_offset: usize = String::from_utf8(number).unwrap().parse().unwrap();
        assert!(pdf[xref_offset..].starts_with(b"xref"));

        let first_entry = pdf[xref_offset..].split(|byte| *byte == b'\n').nth(3).unwrap();
        let object_offset: usize = std::str::from_utf8(&first_entry[..10])
            .unwrap()
            .parse()
            .unwrap();
        assert!(pdf[object_offset..].starts_with(b"1 0 obj"));
    }

    #[test]
    fn rejects_empty_raster_and_non_png_bytes() {
        let empty = RgbaImage::new(0, 0);
        assert!(matches!(
            PdfWriter::default().write_document(&empty),
            Err(ExportError::EmptyRaster)
        ));
        assert!(matches!(
            png_image_data(b"not a png"),
            Err(ExportError::Document(_))
        ));
    }
}
