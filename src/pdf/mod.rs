//! # PDF Serializer
//!
//! Takes the laid-out pages from the layout engine and writes a PDF file.
//!
//! This is a from-scratch PDF 1.7 writer. Text is drawn with the standard
//! Type1 fonts, which every viewer provides, so no font program is embedded.
//! The output carries no timestamps or random IDs: the same pages always
//! serialize to the same bytes.
//!
//! ## PDF Structure (simplified)
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- objects (fonts, images, pages, content streams)
//! 2 0 obj ... endobj
//! ...
//! xref                <- cross-reference table (byte offsets of each object)
//! trailer             <- points to the root object
//! %%EOF
//! ```

use std::collections::BTreeSet;
use std::fmt::Write as FmtWrite;
use std::io::Write as IoWrite;
use std::sync::Arc;

use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::error::VoucherError;
use crate::font::{FontContext, StandardFont};
use crate::image_loader::{ImagePixelData, JpegColorSpace, LoadedImage};
use crate::layout::*;
use crate::model::Metadata;

/// Producer string written to the document info dictionary.
const PRODUCER: &str = concat!("voucher ", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Default, Clone, Copy)]
pub struct PdfWriter;

/// Tracks allocated PDF objects during writing.
struct PdfBuilder {
    objects: Vec<PdfObject>,
    /// Fonts in resource order: `/F{index}`.
    font_objects: Vec<(StandardFont, usize)>,
    /// Distinct images in resource order: `/Im{index}`.
    image_objects: Vec<(Arc<LoadedImage>, usize)>,
}

struct PdfObject {
    data: Vec<u8>,
}

impl PdfBuilder {
    fn new() -> Self {
        // 0 = placeholder (PDF objects are 1-indexed)
        // 1 = Catalog
        // 2 = Pages (page tree root)
        let reserved = (0..3).map(|_| PdfObject { data: vec![] }).collect();
        Self {
            objects: reserved,
            font_objects: Vec::new(),
            image_objects: Vec::new(),
        }
    }

    /// Append an object and return its id.
    fn push(&mut self, data: Vec<u8>) -> usize {
        self.objects.push(PdfObject { data });
        self.objects.len() - 1
    }

    /// Append a stream object with the given dictionary entries.
    fn push_stream(&mut self, dict: &str, payload: &[u8]) -> usize {
        let mut data: Vec<u8> = Vec::with_capacity(payload.len() + dict.len() + 64);
        let _ = write!(data, "<< {} /Length {} >>\nstream\n", dict, payload.len());
        data.extend_from_slice(payload);
        data.extend_from_slice(b"\nendstream");
        self.push(data)
    }

    fn font_index(&self, font: StandardFont) -> usize {
        self.font_objects
            .iter()
            .position(|(f, _)| *f == font)
            .unwrap_or(0)
    }

    fn image_index(&self, image: &Arc<LoadedImage>) -> Option<usize> {
        self.image_objects
            .iter()
            .position(|(img, _)| Arc::ptr_eq(img, image))
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write laid-out pages to a PDF byte vector.
    ///
    /// Fails with [`VoucherError::Render`] when a character has no glyph in
    /// the standard font it is drawn with.
    pub fn write(
        &self,
        pages: &[LayoutPage],
        metadata: &Metadata,
        font_context: &FontContext,
    ) -> Result<Vec<u8>, VoucherError> {
        let mut builder = PdfBuilder::new();

        self.register_fonts(&mut builder, pages, font_context);
        self.register_images(&mut builder, pages);

        let mut page_obj_ids: Vec<usize> = Vec::with_capacity(pages.len());
        for page in pages {
            let content = self.build_content_stream(page, &builder, font_context)?;
            let compressed = compress_to_vec_zlib(content.as_bytes(), 6);
            let content_obj_id = builder.push_stream("/Filter /FlateDecode", &compressed);

            let resources = self.build_resource_dict(page, &builder);
            let page_dict = format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Contents {} 0 R /Resources << {} >> >>",
                page.width, page.height, content_obj_id, resources
            );
            page_obj_ids.push(builder.push(page_dict.into_bytes()));
        }

        builder.objects[1].data = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();

        let kids: String = page_obj_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        builder.objects[2].data = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids,
            page_obj_ids.len()
        )
        .into_bytes();

        let info_obj_id = builder.push(self.build_info_dict(metadata).into_bytes());

        Ok(self.serialize(&builder, info_obj_id))
    }

    fn build_info_dict(&self, metadata: &Metadata) -> String {
        let mut info = String::from("<< ");
        let entries = [
            ("Title", &metadata.title),
            ("Author", &metadata.author),
            ("Subject", &metadata.subject),
        ];
        for (key, value) in entries {
            if let Some(value) = value {
                let _ = write!(info, "/{} ({}) ", key, escape_pdf_string(value));
            }
        }
        let _ = write!(info, "/Producer ({}) >>", PRODUCER);
        info
    }

    /// Build the PDF content stream for a single page. Decorations are drawn
    /// first so the flowing content paints over them.
    fn build_content_stream(
        &self,
        page: &LayoutPage,
        builder: &PdfBuilder,
        font_context: &FontContext,
    ) -> Result<String, VoucherError> {
        let mut stream = String::new();
        for element in page.decorations.iter().chain(&page.elements) {
            self.write_element(&mut stream, element, page.height, builder, font_context)?;
        }
        Ok(stream)
    }

    /// Write a single layout element and its children as PDF operators.
    fn write_element(
        &self,
        stream: &mut String,
        element: &LayoutElement,
        page_height: f64,
        builder: &PdfBuilder,
        font_context: &FontContext,
    ) -> Result<(), VoucherError> {
        match &element.draw {
            DrawCommand::None => {}

            DrawCommand::Rect {
                background,
                border_width,
                border_color,
            } => {
                let x = element.x;
                let y = page_height - element.y - element.height;
                let (w, h) = (element.width, element.height);

                if let Some(bg) = background.filter(|bg| bg.a > 0.0) {
                    let _ = write!(
                        stream,
                        "q\n{:.3} {:.3} {:.3} rg\n{:.2} {:.2} {:.2} {:.2} re\nf\nQ\n",
                        bg.r, bg.g, bg.b, x, y, w, h
                    );
                }
                if *border_width > 0.0 {
                    let _ = write!(
                        stream,
                        "q\n{:.3} {:.3} {:.3} RG\n{:.2} w\n{:.2} {:.2} {:.2} {:.2} re\nS\nQ\n",
                        border_color.r, border_color.g, border_color.b, border_width, x, y, w, h
                    );
                }
            }

            DrawCommand::Text { lines, color } => {
                let _ = write!(stream, "BT\n{:.3} {:.3} {:.3} rg\n", color.r, color.g, color.b);
                for line in lines {
                    self.write_text_line(stream, line, page_height, builder, font_context)?;
                }
                let _ = writeln!(stream, "ET");
            }

            DrawCommand::Image { image } => {
                if let Some(idx) = builder.image_index(image) {
                    let y = page_height - element.y - element.height;
                    let _ = write!(
                        stream,
                        "q\n{:.4} 0 0 {:.4} {:.2} {:.2} cm\n/Im{} Do\nQ\n",
                        element.width, element.height, element.x, y, idx
                    );
                }
            }
        }

        for child in &element.children {
            self.write_element(stream, child, page_height, builder, font_context)?;
        }
        Ok(())
    }

    /// A line may mix fonts (a dingbat followed by Helvetica text). Each run
    /// of glyphs sharing a font and size is positioned on its own.
    fn write_text_line(
        &self,
        stream: &mut String,
        line: &TextLine,
        page_height: f64,
        builder: &PdfBuilder,
        font_context: &FontContext,
    ) -> Result<(), VoucherError> {
        let pdf_y = page_height - line.y;
        let mut glyphs = line.glyphs.iter().peekable();

        while let Some(first) = glyphs.next() {
            let font = font_context.resolve(&first.font_family, first.font_weight);
            let mut segment = vec![first];
            while let Some(next) = glyphs.peek() {
                let same_font = font_context.resolve(&next.font_family, next.font_weight) == font
                    && next.font_size == first.font_size;
                if !same_font {
                    break;
                }
                segment.extend(glyphs.next());
            }

            let mut encoded = String::with_capacity(segment.len());
            for glyph in &segment {
                let byte = font.encode(glyph.char_value).ok_or_else(|| {
                    VoucherError::Render(format!(
                        "Character '{}' (U+{:04X}) cannot be drawn with {}",
                        glyph.char_value,
                        glyph.char_value as u32,
                        font.pdf_name()
                    ))
                })?;
                push_escaped_byte(&mut encoded, byte);
            }

            let _ = write!(
                stream,
                "/F{} {:.1} Tf\n1 0 0 1 {:.2} {:.2} Tm\n({}) Tj\n",
                builder.font_index(font),
                first.font_size,
                line.x + first.x_offset,
                pdf_y,
                encoded
            );
        }
        Ok(())
    }

    /// Register every standard font drawn on any page, in a fixed order.
    fn register_fonts(
        &self,
        builder: &mut PdfBuilder,
        pages: &[LayoutPage],
        font_context: &FontContext,
    ) {
        let mut fonts: BTreeSet<StandardFont> = BTreeSet::new();
        for page in pages {
            for element in page.decorations.iter().chain(&page.elements) {
                element.visit(&mut |el| {
                    if let DrawCommand::Text { lines, .. } = &el.draw {
                        for glyph in lines.iter().flat_map(|l| &l.glyphs) {
                            fonts.insert(font_context.resolve(&glyph.font_family, glyph.font_weight));
                        }
                    }
                });
            }
        }
        if fonts.is_empty() {
            fonts.insert(StandardFont::Helvetica);
        }

        for font in fonts {
            let font_dict = if font.is_symbolic() {
                format!(
                    "<< /Type /Font /Subtype /Type1 /BaseFont /{} >>",
                    font.pdf_name()
                )
            } else {
                format!(
                    "<< /Type /Font /Subtype /Type1 /BaseFont /{} \
                     /Encoding /WinAnsiEncoding >>",
                    font.pdf_name()
                )
            };
            let obj_id = builder.push(font_dict.into_bytes());
            builder.font_objects.push((font, obj_id));
        }
    }

    /// Write each distinct image once, however many pages draw it.
    fn register_images(&self, builder: &mut PdfBuilder, pages: &[LayoutPage]) {
        for page in pages {
            for image in page_images(page) {
                if builder.image_index(&image).is_none() {
                    let obj_id = write_image_xobject(builder, &image);
                    builder.image_objects.push((image, obj_id));
                }
            }
        }
    }

    fn build_resource_dict(&self, page: &LayoutPage, builder: &PdfBuilder) -> String {
        let fonts = builder
            .font_objects
            .iter()
            .enumerate()
            .map(|(i, (_, obj_id))| format!("/F{} {} 0 R", i, obj_id))
            .collect::<Vec<_>>()
            .join(" ");

        let mut images: Vec<usize> = page_images(page)
            .iter()
            .filter_map(|img| builder.image_index(img))
            .collect();
        images.sort_unstable();
        images.dedup();

        if images.is_empty() {
            format!("/Font << {} >>", fonts)
        } else {
            let xobjects = images
                .iter()
                .map(|&i| format!("/Im{} {} 0 R", i, builder.image_objects[i].1))
                .collect::<Vec<_>>()
                .join(" ");
            format!("/Font << {} >> /XObject << {} >>", fonts, xobjects)
        }
    }

    /// Serialize all objects into the final PDF byte stream.
    fn serialize(&self, builder: &PdfBuilder, info_obj_id: usize) -> Vec<u8> {
        let mut output: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = vec![0; builder.objects.len()];

        output.extend_from_slice(b"%PDF-1.7\n");
        output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

        for (i, obj) in builder.objects.iter().enumerate().skip(1) {
            offsets[i] = output.len();
            let _ = write!(output, "{} 0 obj\n", i);
            output.extend_from_slice(&obj.data);
            output.extend_from_slice(b"\nendobj\n\n");
        }

        let xref_offset = output.len();
        let _ = write!(output, "xref\n0 {}\n", builder.objects.len());
        let _ = write!(output, "0000000000 65535 f \n");
        for offset in offsets.iter().skip(1) {
            let _ = write!(output, "{:010} 00000 n \n", offset);
        }

        let _ = write!(
            output,
            "trailer\n<< /Size {} /Root 1 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            builder.objects.len(),
            info_obj_id,
            xref_offset
        );

        output
    }
}

fn page_images(page: &LayoutPage) -> Vec<Arc<LoadedImage>> {
    let mut images = Vec::new();
    for element in page.decorations.iter().chain(&page.elements) {
        element.visit(&mut |el| {
            if let DrawCommand::Image { image } = &el.draw {
                images.push(Arc::clone(image));
            }
        });
    }
    images
}

/// Write a single image as one or two XObject PDF objects.
/// Returns the main XObject ID.
fn write_image_xobject(builder: &mut PdfBuilder, image: &LoadedImage) -> usize {
    match &image.pixel_data {
        ImagePixelData::Jpeg { data, color_space } => {
            let color_space = match color_space {
                JpegColorSpace::DeviceRGB => "/DeviceRGB",
                JpegColorSpace::DeviceGray => "/DeviceGray",
            };
            let dict = format!(
                "/Type /XObject /Subtype /Image /Width {} /Height {} \
                 /ColorSpace {} /BitsPerComponent 8 /Filter /DCTDecode",
                image.width_px, image.height_px, color_space
            );
            builder.push_stream(&dict, data)
        }

        ImagePixelData::Decoded { rgb, alpha } => {
            let smask_ref = alpha
                .as_ref()
                .map(|alpha| {
                    let dict = format!(
                        "/Type /XObject /Subtype /Image /Width {} /Height {} \
                         /ColorSpace /DeviceGray /BitsPerComponent 8 /Filter /FlateDecode",
                        image.width_px, image.height_px
                    );
                    let id = builder.push_stream(&dict, &compress_to_vec_zlib(alpha, 6));
                    format!(" /SMask {} 0 R", id)
                })
                .unwrap_or_default();

            let dict = format!(
                "/Type /XObject /Subtype /Image /Width {} /Height {} \
                 /ColorSpace /DeviceRGB /BitsPerComponent 8 /Filter /FlateDecode{}",
                image.width_px, image.height_px, smask_ref
            );
            builder.push_stream(&dict, &compress_to_vec_zlib(rgb, 6))
        }
    }
}

/// Escape special characters in a PDF literal string.
fn escape_pdf_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match crate::font::unicode_to_winansi(ch) {
            Some(byte) => push_escaped_byte(&mut out, byte),
            None => out.push('?'),
        }
    }
    out
}

/// Append one encoded byte to a literal string, octal-escaping anything
/// outside printable ASCII.
fn push_escaped_byte(out: &mut String, byte: u8) {
    match byte {
        b'(' | b')' | b'\\' => {
            out.push('\\');
            out.push(byte as char);
        }
        0x20..=0x7E => out.push(byte as char),
        _ => {
            let _ = write!(out, "\\{:03o}", byte);
        }
    }
}
