//! # Page Decoration
//!
//! Decorations are painted once per page, when the paginator finishes it:
//! banners, logos, page numbers. They are kept apart from the flowing content
//! and drawn behind it.

use std::sync::Arc;

use super::{DrawCommand, LayoutElement, PositionedGlyph, TextLine};
use crate::font::FontContext;
use crate::image_loader::LoadedImage;
use crate::model::Edges;
use crate::style::Color;

/// Geometry of the page being decorated.
#[derive(Debug, Clone, Copy)]
pub struct PageMeta {
    /// 1-based page number.
    pub number: usize,
    pub width: f64,
    pub height: f64,
    pub margin: Edges,
}

/// Paints fixed decorations onto finished pages.
pub trait PageDecorator {
    fn on_first_page(&self, canvas: &mut PageCanvas<'_>, page: &PageMeta);
    fn on_later_pages(&self, canvas: &mut PageCanvas<'_>, page: &PageMeta);
}

/// Leaves every page bare.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDecoration;

impl PageDecorator for NoDecoration {
    fn on_first_page(&self, _canvas: &mut PageCanvas<'_>, _page: &PageMeta) {}
    fn on_later_pages(&self, _canvas: &mut PageCanvas<'_>, _page: &PageMeta) {}
}

/// Font settings for a single decoration string.
#[derive(Debug, Clone)]
pub struct Font<'a> {
    pub family: &'a str,
    pub weight: u32,
    pub size: f64,
    pub color: Color,
}

/// Drawing surface handed to a [`PageDecorator`].
///
/// Coordinates are in points from the top-left corner of the page; text is
/// positioned by its baseline.
pub struct PageCanvas<'a> {
    font_context: &'a FontContext,
    elements: Vec<LayoutElement>,
}

impl<'a> PageCanvas<'a> {
    pub fn new(font_context: &'a FontContext) -> Self {
        Self {
            font_context,
            elements: Vec::new(),
        }
    }

    pub fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Color) {
        self.elements.push(decoration(
            x,
            y,
            width,
            height,
            DrawCommand::Rect {
                background: Some(color),
                border_width: 0.0,
                border_color: color,
            },
        ));
    }

    /// Text starting at `x`.
    pub fn draw_string(&mut self, x: f64, baseline: f64, text: &str, font: &Font<'_>) {
        self.push_text(x, baseline, text, font);
    }

    /// Text ending at `x`.
    pub fn draw_right_string(&mut self, x: f64, baseline: f64, text: &str, font: &Font<'_>) {
        let width = self.measure(text, font);
        self.push_text(x - width, baseline, text, font);
    }

    /// Text centred on `x`.
    pub fn draw_centred_string(&mut self, x: f64, baseline: f64, text: &str, font: &Font<'_>) {
        let width = self.measure(text, font);
        self.push_text(x - width / 2.0, baseline, text, font);
    }

    /// Draw an image scaled to fit the box with its aspect ratio kept,
    /// centred in the box.
    pub fn draw_image(
        &mut self,
        image: Arc<LoadedImage>,
        x: f64,
        y: f64,
        box_width: f64,
        box_height: f64,
    ) {
        let (width, height) = image.fit_within(box_width, box_height);
        self.elements.push(LayoutElement {
            node_type: Some("Image".to_string()),
            ..decoration(
                x + (box_width - width) / 2.0,
                y + (box_height - height) / 2.0,
                width,
                height,
                DrawCommand::Image { image },
            )
        });
    }

    pub fn measure(&self, text: &str, font: &Font<'_>) -> f64 {
        self.font_context
            .measure_string(text, font.family, font.weight, font.size)
    }

    pub fn into_elements(self) -> Vec<LayoutElement> {
        self.elements
    }

    fn push_text(&mut self, x: f64, baseline: f64, text: &str, font: &Font<'_>) {
        let mut offset = 0.0;
        let glyphs: Vec<PositionedGlyph> = text
            .chars()
            .map(|ch| {
                let glyph = PositionedGlyph {
                    char_value: ch,
                    x_offset: offset,
                    font_size: font.size,
                    font_family: font.family.to_string(),
                    font_weight: font.weight,
                };
                offset +=
                    self.font_context
                        .char_width(ch, font.family, font.weight, font.size);
                glyph
            })
            .collect();

        let line = TextLine {
            x,
            y: baseline,
            glyphs,
            width: offset,
            height: font.size,
        };
        self.elements.push(decoration(
            x,
            baseline - font.size,
            offset,
            font.size,
            DrawCommand::Text {
                lines: vec![line],
                color: font.color,
            },
        ));
    }
}

fn decoration(x: f64, y: f64, width: f64, height: f64, draw: DrawCommand) -> LayoutElement {
    LayoutElement {
        x,
        y,
        width,
        height,
        draw,
        children: vec![],
        node_type: Some("Decoration".to_string()),
        section: None,
    }
}
