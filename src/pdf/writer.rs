//! Minimal PDF writer for pages made of raster images.
//!
//! Only what a chart book needs: a page tree, one content stream per page and
//! one image XObject per placed chart. JPEG data is embedded as-is, every
//! other format is decoded to RGB and deflated.

use super::layout::{Rect, A4_HEIGHT_MM, A4_WIDTH_MM};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::{self, Write};
use std::path::Path;
use thiserror::Error;

const POINTS_PER_MM: f64 = 72.0 / 25.4;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("unsupported or corrupt image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Image data ready to be written as an XObject stream
#[derive(Debug, Clone)]
pub struct EmbeddedImage {
    pub width: u32,
    pub height: u32,
    color_space: &'static str,
    filter: &'static str,
    data: Vec<u8>,
}

impl EmbeddedImage {
    pub fn decode(bytes: &[u8]) -> Result<Self, PdfError> {
        let format = image::guess_format(bytes)?;
        let decoded = image::load_from_memory_with_format(bytes, format)?;
        let (width, height) = (decoded.width(), decoded.height());

        if format == image::ImageFormat::Jpeg {
            let color_space = match decoded.color() {
                image::ColorType::L8 => Some("/DeviceGray"),
                image::ColorType::Rgb8 => Some("/DeviceRGB"),
                _ => None,
            };
            if let Some(color_space) = color_space {
                return Ok(Self {
                    width,
                    height,
                    color_space,
                    filter: "/DCTDecode",
                    data: bytes.to_vec(),
                });
            }
        }

        // Charts are opaque; alpha is dropped rather than carried as an SMask
        let rgb = decoded.to_rgb8().into_raw();
        Ok(Self {
            width,
            height,
            color_space: "/DeviceRGB",
            filter: "/FlateDecode",
            data: flate_compress(&rgb)?,
        })
    }

    /// Read and decode an image file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, PdfError> {
        let bytes = std::fs::read(path)?;
        Self::decode(&bytes)
    }
}

#[derive(Debug, Clone)]
pub struct PlacedImage {
    pub label: String,
    pub rect: Rect,
    pub image: EmbeddedImage,
}

#[derive(Debug, Clone, Default)]
pub struct PdfPage {
    images: Vec<PlacedImage>,
}

impl PdfPage {
    pub fn images(&self) -> &[PlacedImage] {
        &self.images
    }
}

/// In-memory document; serialized once with [`PdfDocument::to_bytes`]
#[derive(Debug, Clone)]
pub struct PdfDocument {
    width_mm: f64,
    height_mm: f64,
    pages: Vec<PdfPage>,
}

impl Default for PdfDocument {
    fn default() -> Self {
        Self::a4_portrait()
    }
}

impl PdfDocument {
    pub fn new(width_mm: f64, height_mm: f64) -> Self {
        Self {
            width_mm,
            height_mm,
            pages: Vec::new(),
        }
    }

    pub fn a4_portrait() -> Self {
        Self::new(A4_WIDTH_MM, A4_HEIGHT_MM)
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn image_count(&self) -> usize {
        self.pages.iter().map(|p| p.images.len()).sum()
    }

    /// 1-based page lookup
    pub fn page(&self, number: usize) -> Option<&PdfPage> {
        number.checked_sub(1).and_then(|i| self.pages.get(i))
    }

    /// Append a blank page and return its 1-based number
    pub fn add_page(&mut self) -> usize {
        self.pages.push(PdfPage::default());
        self.pages.len()
    }

    /// Grow the document until page `number` (1-based) exists
    pub fn ensure_page(&mut self, number: usize) {
        while self.pages.len() < number {
            self.add_page();
        }
    }

    /// Place an image on page `number`, creating pages as needed
    pub fn place_image(
        &mut self,
        number: usize,
        label: impl Into<String>,
        image: EmbeddedImage,
        rect: Rect,
    ) {
        let number = number.max(1);
        self.ensure_page(number);
        self.pages[number - 1].images.push(PlacedImage {
            label: label.into(),
            rect,
            image,
        });
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, PdfError> {
        let mut out = PdfOutput::new(self.object_count());
        out.write_raw(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");

        let page_w = self.width_mm * POINTS_PER_MM;
        let page_h = self.height_mm * POINTS_PER_MM;

        // 1: catalog, 2: page tree, then per page: page, contents, images
        let mut page_ids = Vec::with_capacity(self.pages.len());
        let mut next_id = 3;
        for page in &self.pages {
            page_ids.push(next_id);
            next_id += 2 + page.images.len();
        }

        out.write_object(1, b"<< /Type /Catalog /Pages 2 0 R >>");
        let kids: Vec<String> = page_ids.iter().map(|id| format!("{} 0 R", id)).collect();
        out.write_object(
            2,
            format!(
                "<< /Type /Pages /Kids [{}] /Count {} >>",
                kids.join(" "),
                self.pages.len()
            )
            .as_bytes(),
        );

        for (page, &page_id) in self.pages.iter().zip(&page_ids) {
            let contents_id = page_id + 1;
            let image_ids: Vec<usize> = (0..page.images.len())
                .map(|i| contents_id + 1 + i)
                .collect();

            let xobjects: Vec<String> = image_ids
                .iter()
                .enumerate()
                .map(|(i, id)| format!("/Im{} {} 0 R", i + 1, id))
                .collect();
            let resources = if xobjects.is_empty() {
                "<< >>".to_string()
            } else {
                format!("<< /XObject << {} >> >>", xobjects.join(" "))
            };
            out.write_object(
                page_id,
                format!(
                    "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] /Resources {} /Contents {} 0 R >>",
                    page_w, page_h, resources, contents_id
                )
                .as_bytes(),
            );

            let mut content = String::new();
            for (i, placed) in page.images.iter().enumerate() {
                let r = placed.rect;
                let w = r.width * POINTS_PER_MM;
                let h = r.height * POINTS_PER_MM;
                let x = r.x * POINTS_PER_MM;
                // PDF origin is bottom-left
                let y = page_h - (r.y + r.height) * POINTS_PER_MM;
                content.push_str(&format!(
                    "q {:.2} 0 0 {:.2} {:.2} {:.2} cm /Im{} Do Q\n",
                    w,
                    h,
                    x,
                    y,
                    i + 1
                ));
            }
            out.write_stream(contents_id, "", content.as_bytes());

            for (placed, &image_id) in page.images.iter().zip(&image_ids) {
                let img = &placed.image;
                let dict = format!(
                    "/Type /XObject /Subtype /Image /Width {} /Height {} /ColorSpace {} /BitsPerComponent 8 /Filter {}",
                    img.width, img.height, img.color_space, img.filter
                );
                out.write_stream(image_id, &dict, &img.data);
            }
        }

        Ok(out.finish())
    }

    fn object_count(&self) -> usize {
        2 + self
            .pages
            .iter()
            .map(|p| 2 + p.images.len())
            .sum::<usize>()
    }
}

/// Byte buffer that tracks object offsets for the cross-reference table
struct PdfOutput {
    buf: Vec<u8>,
    offsets: Vec<usize>,
}

impl PdfOutput {
    fn new(objects: usize) -> Self {
        Self {
            buf: Vec::new(),
            offsets: vec![0; objects],
        }
    }

    fn write_raw(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    fn begin(&mut self, id: usize) {
        self.offsets[id - 1] = self.buf.len();
        self.write_raw(format!("{} 0 obj\n", id).as_bytes());
    }

    fn write_object(&mut self, id: usize, body: &[u8]) {
        self.begin(id);
        self.write_raw(body);
        self.write_raw(b"\nendobj\n");
    }

    fn write_stream(&mut self, id: usize, dict: &str, data: &[u8]) {
        self.begin(id);
        let separator = if dict.is_empty() { "" } else { " " };
        self.write_raw(format!("<< {}{}/Length {} >>\nstream\n", dict, separator, data.len()).as_bytes());
        self.write_raw(data);
        self.write_raw(b"\nendstream\nendobj\n");
    }

    fn finish(mut self) -> Vec<u8> {
        let xref_offset = self.buf.len();
        let count = self.offsets.len() + 1;
        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", count);
        for offset in &self.offsets {
            xref.push_str(&format!("{:010} 00000 n \n", offset));
        }
        xref.push_str(&format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            count, xref_offset
        ));
        self.write_raw(xref.as_bytes());
        self.buf
    }
}

fn flate_compress(data: &[u8]) -> Result<Vec<u8>, io::Error> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}
