//! Native PDF rendering
//!
//! Pages are laid out top to bottom with the PDF base-14 fonts, so no font
//! files are embedded. Text is encoded as WinAnsi; characters outside it print
//! as `?`. Raster images are decoded from their data URIs, converted to RGB and
//! stored as Flate-compressed image XObjects.

use super::dimension::{CssDimensionParser, DimensionParser};
use super::layout::{layout, Block};
use super::{ArchiveFormat, Renderer};
use crate::config::{PageSize, RenderConfig};
use crate::RenderError;
use base64::{engine::general_purpose::STANDARD, Engine};
use flate2::{write::ZlibEncoder, Compression};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use std::io::Write;

const FONT_REGULAR: &str = "F1";
const FONT_BOLD: &str = "F2";
const FONT_MONO: &str = "F3";

/// Line height as a multiple of the font size
const LEADING: f32 = 1.35;

/// Helvetica advance widths for ASCII 32..=126, in 1/1000 em
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0..?
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // P.._
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // `..o
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // p..~
];

/// Renders cleaned HTML into a paginated PDF
pub struct PdfRenderer {
    page_size: PageSize,
    margin: f32,
    font_size: f32,
    dimensions: Box<dyn DimensionParser>,
}

impl PdfRenderer {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            page_size: config.page_size,
            margin: config.margin_pt as f32,
            font_size: config.font_size_pt as f32,
            dimensions: Box::new(CssDimensionParser),
        }
    }

    /// Replaces the parser used for image `width`/`height` values
    pub fn with_dimension_parser(mut self, parser: Box<dyn DimensionParser>) -> Self {
        self.dimensions = parser;
        self
    }
}

impl Renderer for PdfRenderer {
    fn format(&self) -> ArchiveFormat {
        ArchiveFormat::Pdf
    }

    fn render(&self, html: &str) -> Result<Vec<u8>, RenderError> {
        let page = layout(html, self.dimensions.as_ref());
        let (width, height) = self.page_size.dimensions();
        let mut pager = Pager::new(width as f32, height as f32, self.margin);
        let mut images: Vec<ImageXObject> = Vec::new();

        for block in &page.blocks {
            match block {
                Block::Heading { level, text } => {
                    let size = (self.font_size * heading_scale(*level)).round();
                    pager.gap(size * 0.6);
                    pager.paragraph(FONT_BOLD, size, 0.0, text);
                    pager.gap(size * 0.3);
                }
                Block::Paragraph(text) => {
                    pager.paragraph(FONT_REGULAR, self.font_size, 0.0, text);
                    pager.gap(self.font_size * 0.6);
                }
                Block::ListItem(text) => {
                    let indent = self.font_size * 1.5;
                    pager.bullet(self.font_size, indent);
                    pager.paragraph(FONT_REGULAR, self.font_size, indent, text);
                    pager.gap(self.font_size * 0.3);
                }
                Block::Preformatted(text) => {
                    let size = (self.font_size - 1.0).max(6.0);
                    for line in text.lines() {
                        pager.paragraph(FONT_MONO, size, 0.0, line);
                    }
                    pager.gap(self.font_size * 0.6);
                }
                Block::Image { src, width, height } => {
                    let Some(bytes) = decode_data_uri(src) else {
                        tracing::debug!("Skipping image that is not an inline data URI");
                        continue;
                    };
                    let image = match ImageXObject::decode(&bytes, images.len() + 1) {
                        Ok(image) => image,
                        Err(e) => {
                            tracing::warn!("Skipping undecodable image: {}", e);
                            continue;
                        }
                    };
                    let (w, h) = image.display_size(*width, *height);
                    pager.image(&image.name, w, h);
                    pager.gap(self.font_size * 0.6);
                    images.push(image);
                }
            }
        }

        build_document(pager.finish(), images, (width, height), page.title.as_deref())
    }
}

fn heading_scale(level: u8) -> f32 {
    match level {
        1 => 1.8,
        2 => 1.5,
        3 => 1.3,
        _ => 1.15,
    }
}

/// Places content on pages, top to bottom
struct Pager {
    width: f32,
    height: f32,
    margin: f32,
    y: f32,
    current: Vec<Operation>,
    pages: Vec<Vec<Operation>>,
}

impl Pager {
    fn new(width: f32, height: f32, margin: f32) -> Self {
        Self {
            width,
            height,
            margin,
            y: height - margin,
            current: Vec::new(),
            pages: Vec::new(),
        }
    }

    fn content_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    fn content_height(&self) -> f32 {
        self.height - 2.0 * self.margin
    }

    /// Starts a new page unless `needed` points still fit on this one
    fn reserve(&mut self, needed: f32) {
        if self.y - needed < self.margin && !self.current.is_empty() {
            self.pages.push(std::mem::take(&mut self.current));
            self.y = self.height - self.margin;
        }
    }

    fn gap(&mut self, amount: f32) {
        self.y -= amount;
    }

    fn paragraph(&mut self, font: &str, size: f32, indent: f32, text: &str) {
        let max_width = self.content_width() - indent;
        for line in wrap(text, max_width, |s| text_width(font, size, s)) {
            self.text_line(font, size, indent, &line);
        }
    }

    fn text_line(&mut self, font: &str, size: f32, indent: f32, text: &str) {
        let line_height = size * LEADING;
        self.reserve(line_height);
        self.y -= line_height;

        let x = (self.margin + indent).round() as i64;
        let y = self.y.round() as i64;
        self.current.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![font.into(), (size.round() as i64).into()]),
            Operation::new("Td", vec![x.into(), y.into()]),
            Operation::new("Tj", vec![Object::string_literal(to_win_ansi(text))]),
            Operation::new("ET", vec![]),
        ]);
    }

    /// Draws a bullet on the line the next text line will occupy
    fn bullet(&mut self, size: f32, indent: f32) {
        let line_height = size * LEADING;
        self.reserve(line_height);

        let x = (self.margin + indent - size).round() as i64;
        let y = (self.y - line_height).round() as i64;
        self.current.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![FONT_REGULAR.into(), (size.round() as i64).into()]),
            Operation::new("Td", vec![x.into(), y.into()]),
            Operation::new("Tj", vec![Object::string_literal(vec![0x95u8])]),
            Operation::new("ET", vec![]),
        ]);
    }

    fn image(&mut self, name: &str, width: f32, height: f32) {
        let scale = (self.content_width() / width)
            .min(self.content_height() / height)
            .min(1.0);
        let (w, h) = ((width * scale).max(1.0), (height * scale).max(1.0));

        self.reserve(h);
        self.y -= h;

        self.current.extend([
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    (w.round() as i64).into(),
                    0.into(),
                    0.into(),
                    (h.round() as i64).into(),
                    (self.margin.round() as i64).into(),
                    (self.y.round() as i64).into(),
                ],
            ),
            Operation::new("Do", vec![name.into()]),
            Operation::new("Q", vec![]),
        ]);
    }

    fn finish(mut self) -> Vec<Vec<Operation>> {
        if !self.current.is_empty() || self.pages.is_empty() {
            self.pages.push(self.current);
        }
        self.pages
    }
}

/// A decoded raster image ready to embed
struct ImageXObject {
    name: String,
    pixel_width: u32,
    pixel_height: u32,
    data: Vec<u8>,
}

impl ImageXObject {
    fn decode(bytes: &[u8], index: usize) -> Result<Self, RenderError> {
        let decoded = image::load_from_memory(bytes)
            .map_err(|e| RenderError::Image(e.to_string()))?
            .to_rgb8();
        let (pixel_width, pixel_height) = decoded.dimensions();

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder
            .write_all(decoded.as_raw())
            .map_err(|e| RenderError::Image(e.to_string()))?;
        let data = encoder
            .finish()
            .map_err(|e| RenderError::Image(e.to_string()))?;

        Ok(Self {
            name: format!("Im{}", index),
            pixel_width,
            pixel_height,
            data,
        })
    }

    /// Display size in points; a zero dimension is derived from the other one
    /// or from the pixel size
    fn display_size(&self, width: f32, height: f32) -> (f32, f32) {
        let intrinsic_w = self.pixel_width as f32 * 0.75;
        let intrinsic_h = self.pixel_height as f32 * 0.75;
        let aspect = intrinsic_h / intrinsic_w.max(f32::EPSILON);

        match (width > 0.0, height > 0.0) {
            (true, true) => (width, height),
            (true, false) => (width, width * aspect),
            (false, true) => (height / aspect.max(f32::EPSILON), height),
            (false, false) => (intrinsic_w, intrinsic_h),
        }
    }

    fn into_stream(self) -> Stream {
        Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => self.pixel_width as i64,
                "Height" => self.pixel_height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "FlateDecode",
            },
            self.data,
        )
    }
}

fn build_document(
    pages: Vec<Vec<Operation>>,
    images: Vec<ImageXObject>,
    (width, height): (u32, u32),
    title: Option<&str>,
) -> Result<Vec<u8>, RenderError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font = |doc: &mut Document, base: &str| -> ObjectId {
        doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => base,
            "Encoding" => "WinAnsiEncoding",
        })
    };
    let regular = font(&mut doc, "Helvetica");
    let bold = font(&mut doc, "Helvetica-Bold");
    let mono = font(&mut doc, "Courier");

    let mut xobjects = Dictionary::new();
    for image in images {
        let name = image.name.clone();
        xobjects.set(name, doc.add_object(image.into_stream()));
    }

    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            FONT_REGULAR => regular,
            FONT_BOLD => bold,
            FONT_MONO => mono,
        },
        "XObject" => xobjects,
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for operations in pages {
        let content = Content { operations }
            .encode()
            .map_err(|e| RenderError::Pdf(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), (width as i64).into(), (height as i64).into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    if let Some(title) = title {
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal(to_win_ansi(title)),
            "Producer" => Object::string_literal("wiki-archiver"),
        });
        doc.trailer.set("Info", info_id);
    }

    let mut out = Vec::new();
    doc.save_to(&mut out)
        .map_err(|e| RenderError::Pdf(e.to_string()))?;
    Ok(out)
}

/// Splits text into lines no wider than `max_width`
///
/// Words wider than a whole line are broken between characters.
fn wrap(text: &str, max_width: f32, measure: impl Fn(&str) -> f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        let candidate = if line.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", line, word)
        };

        if measure(&candidate) <= max_width {
            line = candidate;
            continue;
        }

        if !line.is_empty() {
            lines.push(std::mem::take(&mut line));
        }

        if measure(word) <= max_width {
            line = word.to_string();
        } else {
            for ch in word.chars() {
                line.push(ch);
                if measure(&line) > max_width && line.chars().count() > 1 {
                    line.pop();
                    lines.push(std::mem::take(&mut line));
                    line.push(ch);
                }
            }
        }
    }

    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Width of `text` in points
fn text_width(font: &str, size: f32, text: &str) -> f32 {
    let units: u32 = text
        .chars()
        .map(|ch| {
            if font == FONT_MONO {
                600
            } else {
                let base = match ch as u32 {
                    code @ 32..=126 => HELVETICA_WIDTHS[(code - 32) as usize] as u32,
                    _ => 556,
                };
                if font == FONT_BOLD {
                    base * 108 / 100
                } else {
                    base
                }
            }
        })
        .sum();
    units as f32 * size / 1000.0
}

/// Encodes text for the base-14 fonts' WinAnsi encoding
fn to_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| match ch {
            '\u{20AC}' => 0x80,
            '\u{2026}' => 0x85,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{2122}' => 0x99,
            '\u{00A0}' => b' ',
            c if (c as u32) < 0x80 || (0xA0..=0xFF).contains(&(c as u32)) => c as u32 as u8,
            _ => b'?',
        })
        .collect()
}

/// Returns the payload of a base64 data URI
fn decode_data_uri(src: &str) -> Option<Vec<u8>> {
    let rest = src.trim().strip_prefix("data:")?;
    let (meta, payload) = rest.split_once(',')?;
    if !meta.to_ascii_lowercase().ends_with(";base64") {
        return None;
    }
    let payload: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD.decode(payload).ok()
}
