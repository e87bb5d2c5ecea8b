//! # Document Model
//!
//! The input representation for the layout engine: a flat sequence of blocks
//! (headings, paragraphs, tables, spacers) plus the page configuration they
//! flow into. The voucher composer produces it; the layout engine consumes it.
//!
//! Every block is tagged with the [`Section`] it belongs to, so the section
//! order can be checked on the laid out pages before anything is serialized.

use crate::style::{ParagraphStyle, TableStyle};
use serde::{Deserialize, Serialize};

/// A complete document ready for layout.
#[derive(Debug, Clone)]
pub struct Document {
    pub blocks: Vec<Block>,
    pub page: PageConfig,
    pub metadata: Metadata,
}

/// Document metadata embedded in the PDF.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
}

/// The voucher sections, in the order they always appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Section {
    TripSummary,
    Hotels,
    Activities,
    Inclusions,
    Exclusions,
    Terms,
    Address,
}

impl Section {
    pub const ORDER: [Section; 7] = [
        Section::TripSummary,
        Section::Hotels,
        Section::Activities,
        Section::Inclusions,
        Section::Exclusions,
        Section::Terms,
        Section::Address,
    ];

    /// Heading text shown above the section.
    pub fn title(&self) -> &'static str {
        match self {
            Section::TripSummary => "Trip Voucher",
            Section::Hotels => "Hotels",
            Section::Activities => "Activities",
            Section::Inclusions => "Inclusions",
            Section::Exclusions => "Exclusions",
            Section::Terms => "Terms & Conditions",
            Section::Address => "Address",
        }
    }
}

/// Configuration for a page: size and margins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageConfig {
    /// Page size. Defaults to A4.
    #[serde(default)]
    pub size: PageSize,

    /// Page margins in points (1/72 inch).
    #[serde(default)]
    pub margin: Edges,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            size: PageSize::A4,
            // Top margin leaves room for the first-page banner.
            margin: Edges {
                top: 140.0,
                right: 30.0,
                bottom: 50.0,
                left: 30.0,
            },
        }
    }
}

impl PageConfig {
    pub fn content_width(&self) -> f64 {
        self.size.dimensions().0 - self.margin.horizontal()
    }

    pub fn content_height(&self) -> f64 {
        self.size.dimensions().1 - self.margin.vertical()
    }
}

/// Standard page sizes in points.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub enum PageSize {
    #[default]
    A4,
    Custom {
        width: f64,
        height: f64,
    },
}

impl PageSize {
    /// Returns (width, height) in points.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (595.28, 841.89),
            PageSize::Custom { width, height } => (*width, *height),
        }
    }
}

/// Edge values (top, right, bottom, left) used for margin and padding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Edges {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Edges {
    pub fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

/// One entry of the flowing block sequence.
#[derive(Debug, Clone)]
pub struct Block {
    pub section: Section,
    pub kind: BlockKind,
    /// Do not leave this block alone at the bottom of a page: it must fit
    /// together with the leading part of the following block.
    pub keep_with_next: bool,
}

#[derive(Debug, Clone)]
pub enum BlockKind {
    /// A section heading, drawn with the shared heading style.
    Heading(Paragraph),
    Paragraph(Paragraph),
    Table(Table),
    /// Fixed vertical gap. Discarded when it falls on a page break.
    Spacer { height: f64 },
}

impl Block {
    pub fn heading(section: Section, style: &ParagraphStyle) -> Self {
        Self {
            section,
            kind: BlockKind::Heading(Paragraph::plain(section.title(), style.clone())),
            keep_with_next: true,
        }
    }

    pub fn paragraph(section: Section, paragraph: Paragraph) -> Self {
        Self {
            section,
            kind: BlockKind::Paragraph(paragraph),
            keep_with_next: false,
        }
    }

    pub fn table(section: Section, table: Table) -> Self {
        Self {
            section,
            kind: BlockKind::Table(table),
            keep_with_next: false,
        }
    }

    pub fn spacer(section: Section, height: f64) -> Self {
        Self {
            section,
            kind: BlockKind::Spacer { height },
            keep_with_next: false,
        }
    }
}

/// A styled run of text. Runs may switch font family or weight mid-line.
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub content: String,
    /// Overrides the paragraph's font family.
    pub font_family: Option<String>,
    /// Overrides the paragraph's font weight.
    pub font_weight: Option<u32>,
}

impl Run {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            font_family: None,
            font_weight: None,
        }
    }

    /// A forced line break.
    pub fn line_break() -> Self {
        Self::text("\n")
    }

    /// Text drawn with a different font family (e.g. a dingbat glyph).
    pub fn with_family(content: impl Into<String>, family: &str) -> Self {
        Self {
            content: content.into(),
            font_family: Some(family.to_string()),
            font_weight: None,
        }
    }
}

/// A block of wrapped text.
#[derive(Debug, Clone)]
pub struct Paragraph {
    pub runs: Vec<Run>,
    pub style: ParagraphStyle,
}

impl Paragraph {
    pub fn plain(content: &str, style: ParagraphStyle) -> Self {
        Self {
            runs: vec![Run::text(content)],
            style,
        }
    }

    /// The paragraph's text with runs concatenated.
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.content.as_str()).collect()
    }
}

/// A table with explicit column widths in points.
#[derive(Debug, Clone)]
pub struct Table {
    pub columns: Vec<f64>,
    pub rows: Vec<TableRow>,
    pub style: TableStyle,
}

impl Table {
    pub fn width(&self) -> f64 {
        self.columns.iter().sum()
    }
}

#[derive(Debug, Clone)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
    pub is_header: bool,
}

impl TableRow {
    pub fn header(labels: &[&str]) -> Self {
        Self {
            cells: labels.iter().map(|l| TableCell::plain(l)).collect(),
            is_header: true,
        }
    }

    pub fn body(values: Vec<TableCell>) -> Self {
        Self {
            cells: values,
            is_header: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TableCell {
    pub runs: Vec<Run>,
}

impl TableCell {
    pub fn plain(content: &str) -> Self {
        Self {
            runs: vec![Run::text(content)],
        }
    }

    pub fn runs(runs: Vec<Run>) -> Self {
        Self { runs }
    }
}
