//! # Style System
//!
//! A small, print-oriented style model. There is no cascade: every block
//! carries the full style it is drawn with, and the voucher's shared styles
//! live in one [`Stylesheet`] built at startup.

use crate::model::Edges;
use serde::{Deserialize, Serialize};

/// An RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64, // 0.0 - 1.0
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };
    /// 50% grey, the default caption/page-number color.
    pub const GREY: Color = Color {
        r: 0.5,
        g: 0.5,
        b: 0.5,
        a: 1.0,
    };

    pub fn hex(hex: &str) -> Self {
        let hex = hex.trim_start_matches('#');
        let (r, g, b) = match hex.len() {
            3 => {
                let r = u8::from_str_radix(&hex[0..1].repeat(2), 16).unwrap_or(0);
                let g = u8::from_str_radix(&hex[1..2].repeat(2), 16).unwrap_or(0);
                let b = u8::from_str_radix(&hex[2..3].repeat(2), 16).unwrap_or(0);
                (r, g, b)
            }
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).unwrap_or(0);
                let g = u8::from_str_radix(&hex[2..4], 16).unwrap_or(0);
                let b = u8::from_str_radix(&hex[4..6], 16).unwrap_or(0);
                (r, g, b)
            }
            _ => (0, 0, 0),
        };
        Self {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
            a: 1.0,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    #[default]
    Left,
    Right,
    Center,
}

/// Vertical placement of cell content inside a row taller than the cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerticalAlign {
    #[default]
    Top,
    Middle,
    Bottom,
}

/// Style of a flowing paragraph (and of text inside table cells).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphStyle {
    pub font_family: String,
    pub font_size: f64,
    pub font_weight: u32,
    /// Distance between consecutive baselines, in points.
    pub leading: f64,
    pub color: Color,
    pub text_align: TextAlign,
    pub background_color: Option<Color>,
    pub border_width: f64,
    pub border_color: Color,
    pub padding: Edges,
    /// Space above the block. Dropped when the block starts a page.
    pub space_before: f64,
    pub space_after: f64,
    /// Whether the paragraph may be split between lines across pages.
    pub breakable: bool,
}

impl Default for ParagraphStyle {
    fn default() -> Self {
        Self {
            font_family: "Helvetica".to_string(),
            font_size: 10.0,
            font_weight: 400,
            leading: 12.0,
            color: Color::BLACK,
            text_align: TextAlign::Left,
            background_color: None,
            border_width: 0.0,
            border_color: Color::BLACK,
            padding: Edges::default(),
            space_before: 0.0,
            space_after: 0.0,
            breakable: true,
        }
    }
}

impl ParagraphStyle {
    /// Total vertical space the paragraph box adds around its lines.
    pub fn box_extra_height(&self) -> f64 {
        self.padding.vertical() + 2.0 * self.border_width
    }
}

/// Style shared by every cell of a table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableStyle {
    /// Text style of body cells.
    pub text: ParagraphStyle,
    /// Padding inside every cell.
    pub cell_padding: Edges,
    pub grid_width: f64,
    pub grid_color: Color,
    /// Fill of header rows.
    pub header_background: Option<Color>,
    /// Render header rows in bold.
    pub header_bold: bool,
    /// Render the first column of body rows in bold (label/value tables).
    pub first_column_bold: bool,
    pub vertical_align: VerticalAlign,
    /// Repeat header rows at the top of each continuation page.
    pub repeat_header: bool,
}

impl Default for TableStyle {
    fn default() -> Self {
        Self {
            text: ParagraphStyle::default(),
            cell_padding: Edges {
                top: 3.0,
                right: 6.0,
                bottom: 3.0,
                left: 6.0,
            },
            grid_width: 0.5,
            grid_color: Color::hex("#BFBFBF"),
            header_background: None,
            header_bold: false,
            first_column_bold: false,
            vertical_align: VerticalAlign::Top,
            repeat_header: false,
        }
    }
}

/// The voucher's named colors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Palette {
    pub light_blue: Color,
    pub grey: Color,
    pub dark_blue: Color,
    pub address_blue: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            light_blue: Color::hex("#E6F0F8"),
            grey: Color::hex("#BFBFBF"),
            dark_blue: Color::hex("#1A5276"),
            address_blue: Color::hex("#1A75D2"),
        }
    }
}

/// Every style the voucher uses, built once and shared read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stylesheet {
    pub palette: Palette,
    /// Shared section heading style.
    pub heading: ParagraphStyle,
    /// Wrapped free text (activity cells, terms).
    pub text: ParagraphStyle,
    /// Centered contact/address footer.
    pub address: ParagraphStyle,
    /// Trip summary label/value table.
    pub summary_table: TableStyle,
    /// Hotel and activity tables.
    pub listing_table: TableStyle,
    /// Inclusion and exclusion lists.
    pub list_table: TableStyle,
    /// Terms and conditions list.
    pub terms_table: TableStyle,
    /// Spacer height above the address footer.
    pub footer_gap: f64,
}

impl Default for Stylesheet {
    fn default() -> Self {
        Self::standard()
    }
}

impl Stylesheet {
    pub fn standard() -> Self {
        let palette = Palette::default();

        let heading = ParagraphStyle {
            font_size: 12.0,
            leading: 14.4,
            text_align: TextAlign::Center,
            background_color: Some(palette.light_blue),
            border_width: 1.0,
            border_color: palette.grey,
            padding: Edges::uniform(6.0),
            space_before: 12.0,
            space_after: 6.0,
            breakable: false,
            ..ParagraphStyle::default()
        };

        let text = ParagraphStyle {
            font_size: 9.0,
            leading: 13.0,
            ..ParagraphStyle::default()
        };

        let address = ParagraphStyle {
            font_size: 9.0,
            leading: 10.8,
            color: palette.address_blue,
            text_align: TextAlign::Center,
            ..ParagraphStyle::default()
        };

        let base_table = TableStyle {
            grid_color: palette.grey,
            ..TableStyle::default()
        };

        let summary_table = TableStyle {
            first_column_bold: true,
            ..base_table.clone()
        };

        let listing_table = TableStyle {
            text: text.clone(),
            header_background: Some(palette.light_blue),
            header_bold: true,
            repeat_header: true,
            ..base_table.clone()
        };

        let terms_table = TableStyle {
            text: text.clone(),
            cell_padding: Edges {
                top: 6.0,
                right: 6.0,
                bottom: 6.0,
                left: 8.0,
            },
            ..base_table.clone()
        };

        Self {
            palette,
            heading,
            text,
            address,
            summary_table,
            listing_table,
            list_table: base_table,
            terms_table,
            footer_gap: 14.0,
        }
    }
}
