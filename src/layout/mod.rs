//! # Page-Aware Layout Engine
//!
//! The engine never lays content out on an endless canvas and slices it
//! afterwards. It opens a page with known dimensions and, before placing each
//! block, asks whether it fits:
//!
//! 1. If it fits, place it and reduce the remaining space.
//! 2. Paragraphs that do not fit are split between lines, honouring orphan
//!    and widow limits; boxed headings move whole.
//! 3. Tables are placed row by row. A row that does not fit starts a new page
//!    and is never split. Header rows are repeated on continuation pages when
//!    the table style asks for it.
//! 4. Blocks marked keep-with-next move to a new page unless the leading part
//!    of the following block fits beside them.
//!
//! When a page is finished the [`PageDecorator`] paints its decorations.

pub mod decorate;
pub mod page_break;

use std::sync::Arc;

use crate::error::VoucherError;
use crate::font::FontContext;
use crate::image_loader::LoadedImage;
use crate::model::*;
use crate::style::{Color, ParagraphStyle, TableStyle, TextAlign, VerticalAlign};
use crate::text::{normalize_whitespace, RunBrokenLine, StyledChar, TextLayout};

use decorate::{PageCanvas, PageDecorator, PageMeta};
use page_break::{BreakDecision, LineLimits, EPSILON};

/// A finished page.
#[derive(Debug, Clone)]
pub struct LayoutPage {
    pub width: f64,
    pub height: f64,
    /// 1-based page number.
    pub number: usize,
    /// Flowing content, in placement order.
    pub elements: Vec<LayoutElement>,
    /// Elements painted by the page decorator. Drawn before the content.
    pub decorations: Vec<LayoutElement>,
}

impl LayoutPage {
    /// Text of every content line, in placement order.
    pub fn content_text(&self) -> Vec<String> {
        collect_lines(&self.elements)
    }

    /// Text of every decoration line.
    pub fn decoration_text(&self) -> Vec<String> {
        collect_lines(&self.decorations)
    }

    /// Sections with content on this page, in order of appearance.
    pub fn sections(&self) -> Vec<Section> {
        let mut sections: Vec<Section> = Vec::new();
        for section in self.elements.iter().filter_map(|el| el.section) {
            if sections.last() != Some(&section) {
                sections.push(section);
            }
        }
        sections
    }

    /// Whether any decoration draws an image.
    pub fn has_image(&self) -> bool {
        self.decorations
            .iter()
            .any(|el| matches!(el.draw, DrawCommand::Image { .. }))
    }
}

fn collect_lines(elements: &[LayoutElement]) -> Vec<String> {
    let mut out = Vec::new();
    for element in elements {
        element.visit(&mut |el| {
            if let DrawCommand::Text { lines, .. } = &el.draw {
                out.extend(lines.iter().map(TextLine::text));
            }
        });
    }
    out
}

/// A positioned box on a page. `y` grows downwards from the page top.
#[derive(Debug, Clone)]
pub struct LayoutElement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub draw: DrawCommand,
    pub children: Vec<LayoutElement>,
    /// Logical node type (Heading, TableRow, TableCell, TextLine, ...).
    pub node_type: Option<String>,
    /// Voucher section the element belongs to. `None` for decorations.
    pub section: Option<Section>,
}

impl LayoutElement {
    /// Call `f` on this element and then on every descendant, depth first.
    pub fn visit<'a>(&'a self, f: &mut dyn FnMut(&'a LayoutElement)) {
        f(self);
        for child in &self.children {
            child.visit(f);
        }
    }

    pub fn is(&self, node_type: &str) -> bool {
        self.node_type.as_deref() == Some(node_type)
    }

    /// Text drawn by this element itself, lines joined with `\n`.
    pub fn line_text(&self) -> Option<String> {
        match &self.draw {
            DrawCommand::Text { lines, .. } => Some(
                lines
                    .iter()
                    .map(TextLine::text)
                    .collect::<Vec<_>>()
                    .join("\n"),
            ),
            _ => None,
        }
    }
}

/// What to actually draw for an element.
#[derive(Debug, Clone)]
pub enum DrawCommand {
    /// Nothing to draw (just a container).
    None,
    /// Fill and/or stroke the element's rectangle.
    Rect {
        background: Option<Color>,
        border_width: f64,
        border_color: Color,
    },
    Text {
        lines: Vec<TextLine>,
        color: Color,
    },
    /// Draw an image scaled to the element's box.
    Image { image: Arc<LoadedImage> },
}

#[derive(Debug, Clone)]
pub struct TextLine {
    pub x: f64,
    /// Baseline position.
    pub y: f64,
    pub glyphs: Vec<PositionedGlyph>,
    pub width: f64,
    pub height: f64,
}

impl TextLine {
    pub fn text(&self) -> String {
        self.glyphs.iter().map(|g| g.char_value).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PositionedGlyph {
    pub char_value: char,
    /// Offset from the line's x.
    pub x_offset: f64,
    pub font_size: f64,
    pub font_family: String,
    pub font_weight: u32,
}

/// Tracks where we are on the current page during layout.
#[derive(Debug, Clone)]
struct PageCursor {
    config: PageConfig,
    number: usize,
    content_x: f64,
    content_y: f64,
    content_width: f64,
    content_height: f64,
    /// Offset from the top of the content area.
    y: f64,
    elements: Vec<LayoutElement>,
}

impl PageCursor {
    fn new(config: &PageConfig, number: usize) -> Self {
        Self {
            config: config.clone(),
            number,
            content_x: config.margin.left,
            content_y: config.margin.top,
            content_width: config.content_width(),
            content_height: config.content_height(),
            y: 0.0,
            elements: Vec::new(),
        }
    }

    fn remaining_height(&self) -> f64 {
        (self.content_height - self.y).max(0.0)
    }

    /// Nothing has been placed on the page yet.
    fn at_top(&self) -> bool {
        self.elements.is_empty()
    }

    /// Absolute y of the cursor on the page.
    fn top(&self) -> f64 {
        self.content_y + self.y
    }

    fn next_page(&self) -> Self {
        PageCursor::new(&self.config, self.number + 1)
    }

    fn finalize(self, font_context: &FontContext, decorator: &dyn PageDecorator) -> LayoutPage {
        let (width, height) = self.config.size.dimensions();
        let meta = PageMeta {
            number: self.number,
            width,
            height,
            margin: self.config.margin,
        };

        let mut canvas = PageCanvas::new(font_context);
        if self.number == 1 {
            decorator.on_first_page(&mut canvas, &meta);
        } else {
            decorator.on_later_pages(&mut canvas, &meta);
        }

        LayoutPage {
            width,
            height,
            number: self.number,
            elements: self.elements,
            decorations: canvas.into_elements(),
        }
    }
}

/// Per-call layout state: the open page plus the pages already finished.
struct Flow<'a> {
    font_context: &'a FontContext,
    decorator: &'a dyn PageDecorator,
    pages: Vec<LayoutPage>,
    cursor: PageCursor,
}

impl Flow<'_> {
    fn break_page(&mut self) {
        let next = self.cursor.next_page();
        let finished = std::mem::replace(&mut self.cursor, next);
        self.pages
            .push(finished.finalize(self.font_context, self.decorator));
    }

    fn finish(mut self) -> Vec<LayoutPage> {
        let last = self.cursor.finalize(self.font_context, self.decorator);
        self.pages.push(last);
        self.pages
    }
}

/// A table row with its cells already broken into lines.
struct MeasuredRow {
    is_header: bool,
    cells: Vec<MeasuredCell>,
    height: f64,
}

struct MeasuredCell {
    lines: Vec<RunBrokenLine>,
    content_height: f64,
}

/// The main layout engine.
#[derive(Debug, Default)]
pub struct LayoutEngine {
    text_layout: TextLayout,
    limits: LineLimits,
}

impl LayoutEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Main entry point: lay out a document into pages.
    ///
    /// Always returns at least one page.
    pub fn layout(
        &self,
        document: &Document,
        font_context: &FontContext,
        decorator: &dyn PageDecorator,
    ) -> Result<Vec<LayoutPage>, VoucherError> {
        let page = &document.page;
        if page.content_width() <= 0.0 || page.content_height() <= 0.0 {
            return Err(VoucherError::Layout(format!(
                "Page margins leave no printable area ({:.2} x {:.2}pt)",
                page.content_width(),
                page.content_height()
            )));
        }
        for block in &document.blocks {
            if let BlockKind::Table(table) = &block.kind {
                validate_table(table, block.section, page.content_width())?;
            }
        }

        let mut flow = Flow {
            font_context,
            decorator,
            pages: Vec::new(),
            cursor: PageCursor::new(page, 1),
        };

        for (i, block) in document.blocks.iter().enumerate() {
            if block.keep_with_next {
                if let Some(next) = document.blocks.get(i + 1) {
                    self.keep_with_next(block, next, &mut flow);
                }
            }

            match &block.kind {
                BlockKind::Spacer { height } => self.layout_spacer(*height, &mut flow),
                BlockKind::Heading(p) => {
                    self.layout_paragraph(p, block.section, "Heading", &mut flow)
                }
                BlockKind::Paragraph(p) => {
                    self.layout_paragraph(p, block.section, "Paragraph", &mut flow)
                }
                BlockKind::Table(t) => self.layout_table(t, block.section, &mut flow),
            }
        }

        Ok(flow.finish())
    }

    /// Start a new page now if `block` and the leading part of `next` do not
    /// fit together on this one but would on a fresh page.
    fn keep_with_next(&self, block: &Block, next: &Block, flow: &mut Flow<'_>) {
        if flow.cursor.at_top() {
            return;
        }
        let own = self.block_height(block, flow);
        let lead = self.lead_height(next, flow);
        let space_before = match &block.kind {
            BlockKind::Heading(p) | BlockKind::Paragraph(p) => p.style.space_before,
            _ => 0.0,
        };

        let needed = own + lead;
        let on_fresh_page = needed - space_before;
        if needed > flow.cursor.remaining_height() + EPSILON
            && on_fresh_page <= flow.cursor.content_height + EPSILON
        {
            flow.break_page();
        }
    }

    /// Full height of a block placed mid-page, spacing included.
    fn block_height(&self, block: &Block, flow: &Flow<'_>) -> f64 {
        match &block.kind {
            BlockKind::Spacer { height } => *height,
            BlockKind::Heading(p) | BlockKind::Paragraph(p) => {
                let lines = self.paragraph_lines(p, flow.cursor.content_width, flow.font_context);
                p.style.space_before
                    + lines.len() as f64 * p.style.leading
                    + p.style.box_extra_height()
                    + p.style.space_after
            }
            BlockKind::Table(t) => self
                .measure_table(t, flow.font_context)
                .iter()
                .map(|r| r.height)
                .sum(),
        }
    }

    /// Height of the part of a block that must accompany the block before it.
    fn lead_height(&self, block: &Block, flow: &Flow<'_>) -> f64 {
        match &block.kind {
            BlockKind::Spacer { height } => *height,
            BlockKind::Heading(_) => self.block_height(block, flow),
            BlockKind::Paragraph(p) => {
                let lines = self.paragraph_lines(p, flow.cursor.content_width, flow.font_context);
                let leading_lines = lines.len().min(self.limits.min_orphan_lines);
                p.style.space_before
                    + p.style.padding.top
                    + p.style.border_width
                    + leading_lines as f64 * p.style.leading
            }
            BlockKind::Table(t) => {
                let rows = self.measure_table(t, flow.font_context);
                let headers: f64 = rows.iter().filter(|r| r.is_header).map(|r| r.height).sum();
                let first_body = rows
                    .iter()
                    .find(|r| !r.is_header)
                    .map_or(0.0, |r| r.height);
                headers + first_body
            }
        }
    }

    /// Spacers vanish at the top of a page and at a page break.
    fn layout_spacer(&self, height: f64, flow: &mut Flow<'_>) {
        if flow.cursor.at_top() {
            return;
        }
        if height >= flow.cursor.remaining_height() {
            // Nothing else fits on this page; the next block opens a new one.
            flow.cursor.y = flow.cursor.content_height;
            return;
        }
        flow.cursor.y += height;
    }

    fn paragraph_lines(
        &self,
        paragraph: &Paragraph,
        available_width: f64,
        font_context: &FontContext,
    ) -> Vec<RunBrokenLine> {
        let style = &paragraph.style;
        let inner_width =
            (available_width - style.padding.horizontal() - 2.0 * style.border_width).max(0.0);
        let chars = styled_chars(&paragraph.runs, style, style.font_weight);
        self.text_layout
            .break_runs_into_lines(font_context, &chars, inner_width)
    }

    fn layout_paragraph(
        &self,
        paragraph: &Paragraph,
        section: Section,
        node_type: &'static str,
        flow: &mut Flow<'_>,
    ) {
        let style = &paragraph.style;
        let lines = self.paragraph_lines(paragraph, flow.cursor.content_width, flow.font_context);
        let box_top = style.padding.top + style.border_width;
        let box_bottom = style.padding.bottom + style.border_width;

        if !flow.cursor.at_top() {
            flow.cursor.y += style.space_before;
        }

        let mut start = 0;
        while start < lines.len() {
            let rest = &lines[start..];
            let mut heights = vec![style.leading; rest.len()];
            heights[0] += box_top;
            // Every fragment closes its own box, so reserve the bottom edge up front.
            let available = flow.cursor.remaining_height() - box_bottom;

            let decision = page_break::decide_break(
                available.max(0.0),
                &heights,
                style.breakable,
                self.limits,
                flow.cursor.at_top(),
            );
            let count = match decision {
                BreakDecision::Place => rest.len(),
                BreakDecision::Overflow => {
                    log::warn!(
                        "{} block in section '{}' is taller than the page; it will overflow",
                        node_type,
                        section.title()
                    );
                    rest.len()
                }
                BreakDecision::MoveToNextPage => {
                    flow.break_page();
                    continue;
                }
                BreakDecision::Split {
                    items_on_current_page,
                } => items_on_current_page,
            };

            self.place_paragraph_fragment(&rest[..count], style, section, node_type, flow);
            start += count;
            if start < lines.len() {
                flow.break_page();
            }
        }

        flow.cursor.y += style.space_after;
    }

    fn place_paragraph_fragment(
        &self,
        lines: &[RunBrokenLine],
        style: &ParagraphStyle,
        section: Section,
        node_type: &'static str,
        flow: &mut Flow<'_>,
    ) {
        let cursor = &mut flow.cursor;
        let box_y = cursor.top();
        let inner_x = cursor.content_x + style.padding.left + style.border_width;
        let inner_width =
            cursor.content_width - style.padding.horizontal() - 2.0 * style.border_width;

        let mut line_top = box_y + style.padding.top + style.border_width;
        let mut children = Vec::with_capacity(lines.len());
        for line in lines {
            children.push(text_line_element(
                line,
                inner_x,
                inner_width,
                line_top,
                style,
                section,
            ));
            line_top += style.leading;
        }

        let height = lines.len() as f64 * style.leading + style.box_extra_height();
        let draw = if style.background_color.is_some() || style.border_width > 0.0 {
            DrawCommand::Rect {
                background: style.background_color,
                border_width: style.border_width,
                border_color: style.border_color,
            }
        } else {
            DrawCommand::None
        };

        cursor.elements.push(LayoutElement {
            x: cursor.content_x,
            y: box_y,
            width: cursor.content_width,
            height,
            draw,
            children,
            node_type: Some(node_type.to_string()),
            section: Some(section),
        });
        cursor.y += height;
    }

    fn measure_table(&self, table: &Table, font_context: &FontContext) -> Vec<MeasuredRow> {
        table
            .rows
            .iter()
            .map(|row| self.measure_row(row, table, font_context))
            .collect()
    }

    fn measure_row(&self, row: &TableRow, table: &Table, font_context: &FontContext) -> MeasuredRow {
        let style = &table.style;
        let cells: Vec<MeasuredCell> = row
            .cells
            .iter()
            .zip(&table.columns)
            .enumerate()
            .map(|(col, (cell, &width))| {
                let weight = cell_weight(style, row.is_header, col);
                let inner_width = (width - style.cell_padding.horizontal()).max(0.0);
                let chars = styled_chars(&cell.runs, &style.text, weight);
                let lines = self
                    .text_layout
                    .break_runs_into_lines(font_context, &chars, inner_width);
                let content_height = lines.len() as f64 * style.text.leading;
                MeasuredCell {
                    lines,
                    content_height,
                }
            })
            .collect();

        let height = cells
            .iter()
            .map(|c| c.content_height + style.cell_padding.vertical())
            .fold(0.0, f64::max);

        MeasuredRow {
            is_header: row.is_header,
            cells,
            height,
        }
    }

    fn layout_table(&self, table: &Table, section: Section, flow: &mut Flow<'_>) {
        let rows = self.measure_table(table, flow.font_context);
        let (headers, body): (Vec<&MeasuredRow>, Vec<&MeasuredRow>) =
            rows.iter().partition(|r| r.is_header);
        let table_x =
            flow.cursor.content_x + ((flow.cursor.content_width - table.width()) / 2.0).max(0.0);

        // Keep the header rows together with the first body row.
        let lead: f64 = headers.iter().map(|r| r.height).sum::<f64>()
            + body.first().map_or(0.0, |r| r.height);
        if lead > flow.cursor.remaining_height() + EPSILON
            && !flow.cursor.at_top()
            && lead <= flow.cursor.content_height + EPSILON
        {
            flow.break_page();
        }

        let mut segment_at_top = flow.cursor.at_top();
        for row in &headers {
            self.place_row(row, table, table_x, section, flow);
        }

        let mut body_on_page = 0usize;
        for (index, row) in body.iter().enumerate() {
            let at_top = segment_at_top && body_on_page == 0;
            let decision = page_break::decide_break(
                flow.cursor.remaining_height(),
                &[row.height],
                false,
                self.limits,
                at_top,
            );

            match decision {
                BreakDecision::MoveToNextPage => {
                    flow.break_page();
                    if table.style.repeat_header {
                        for header in &headers {
                            self.place_row(header, table, table_x, section, flow);
                        }
                    }
                    segment_at_top = true;
                    body_on_page = 0;
                    if row.height > flow.cursor.remaining_height() + EPSILON {
                        warn_oversize_row(index, section, row.height, flow.cursor.content_height);
                    }
                }
                BreakDecision::Overflow => {
                    warn_oversize_row(index, section, row.height, flow.cursor.content_height);
                }
                BreakDecision::Place | BreakDecision::Split { .. } => {}
            }

            self.place_row(row, table, table_x, section, flow);
            body_on_page += 1;
        }
    }

    fn place_row(
        &self,
        row: &MeasuredRow,
        table: &Table,
        table_x: f64,
        section: Section,
        flow: &mut Flow<'_>,
    ) {
        let style = &table.style;
        let row_y = flow.cursor.top();

        let mut cell_x = table_x;
        let mut cells = Vec::with_capacity(row.cells.len());
        for (cell, &width) in row.cells.iter().zip(&table.columns) {
            let slack = row.height - style.cell_padding.vertical() - cell.content_height;
            let offset = match style.vertical_align {
                VerticalAlign::Top => 0.0,
                VerticalAlign::Middle => slack / 2.0,
                VerticalAlign::Bottom => slack,
            };
            let inner_x = cell_x + style.cell_padding.left;
            let inner_width = width - style.cell_padding.horizontal();

            let mut line_top = row_y + style.cell_padding.top + offset;
            let mut children = Vec::with_capacity(cell.lines.len());
            for line in &cell.lines {
                children.push(text_line_element(
                    line,
                    inner_x,
                    inner_width,
                    line_top,
                    &style.text,
                    section,
                ));
                line_top += style.text.leading;
            }

            cells.push(LayoutElement {
                x: cell_x,
                y: row_y,
                width,
                height: row.height,
                draw: grid_rect(style),
                children,
                node_type: Some("TableCell".to_string()),
                section: Some(section),
            });
            cell_x += width;
        }

        let background = if row.is_header {
            style.header_background
        } else {
            None
        };
        let draw = match background {
            Some(bg) => DrawCommand::Rect {
                background: Some(bg),
                border_width: 0.0,
                border_color: style.grid_color,
            },
            None => DrawCommand::None,
        };

        flow.cursor.elements.push(LayoutElement {
            x: table_x,
            y: row_y,
            width: table.width(),
            height: row.height,
            draw,
            children: cells,
            node_type: Some(if row.is_header { "TableHeaderRow" } else { "TableRow" }.to_string()),
            section: Some(section),
        });
        flow.cursor.y += row.height;
    }
}

fn warn_oversize_row(index: usize, section: Section, height: f64, page_height: f64) {
    log::warn!(
        "Row {} of the '{}' table is {:.1}pt tall, more than a page ({:.1}pt); it will overflow",
        index + 1,
        section.title(),
        height,
        page_height
    );
}

fn grid_rect(style: &TableStyle) -> DrawCommand {
    if style.grid_width > 0.0 {
        DrawCommand::Rect {
            background: None,
            border_width: style.grid_width,
            border_color: style.grid_color,
        }
    } else {
        DrawCommand::None
    }
}

fn cell_weight(style: &TableStyle, is_header: bool, col: usize) -> u32 {
    let bold = if is_header {
        style.header_bold
    } else {
        col == 0 && style.first_column_bold
    };
    if bold {
        700
    } else {
        style.text.font_weight
    }
}

fn validate_table(table: &Table, section: Section, content_width: f64) -> Result<(), VoucherError> {
    if table.columns.is_empty() || table.columns.iter().any(|w| !w.is_finite() || *w <= 0.0) {
        return Err(VoucherError::Layout(format!(
            "The '{}' table has invalid column widths {:?}",
            section.title(),
            table.columns
        )));
    }
    if table.width() > content_width + EPSILON {
        return Err(VoucherError::Layout(format!(
            "The '{}' table is {:.2}pt wide but the printable width is {:.2}pt",
            section.title(),
            table.width(),
            content_width
        )));
    }
    for (i, row) in table.rows.iter().enumerate() {
        if row.cells.len() != table.columns.len() {
            return Err(VoucherError::Layout(format!(
                "Row {} of the '{}' table has {} cells for {} columns",
                i + 1,
                section.title(),
                row.cells.len(),
                table.columns.len()
            )));
        }
    }
    Ok(())
}

/// Expand runs into per-character styles. Run overrides win over the
/// paragraph style; `weight` is the weight of runs without an override.
fn styled_chars(runs: &[Run], style: &ParagraphStyle, weight: u32) -> Vec<StyledChar> {
    runs.iter()
        .flat_map(|run| {
            let family = run
                .font_family
                .clone()
                .unwrap_or_else(|| style.font_family.clone());
            let weight = run.font_weight.unwrap_or(weight);
            normalize_whitespace(&run.content)
                .chars()
                .map(|ch| StyledChar {
                    ch,
                    font_family: family.clone(),
                    font_size: style.font_size,
                    font_weight: weight,
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

fn text_line_element(
    line: &RunBrokenLine,
    x: f64,
    available_width: f64,
    top: f64,
    style: &ParagraphStyle,
    section: Section,
) -> LayoutElement {
    let line_x = match style.text_align {
        TextAlign::Left => x,
        TextAlign::Right => x + available_width - line.width,
        TextAlign::Center => x + (available_width - line.width) / 2.0,
    };

    let glyphs: Vec<PositionedGlyph> = line
        .chars
        .iter()
        .zip(&line.char_positions)
        .map(|(sc, &x_offset)| PositionedGlyph {
            char_value: sc.ch,
            x_offset,
            font_size: sc.font_size,
            font_family: sc.font_family.clone(),
            font_weight: sc.font_weight,
        })
        .collect();

    let text_line = TextLine {
        x: line_x,
        y: top + style.font_size,
        glyphs,
        width: line.width,
        height: style.leading,
    };

    LayoutElement {
        x: line_x,
        y: top,
        width: line.width,
        height: style.leading,
        draw: DrawCommand::Text {
            lines: vec![text_line],
            color: style.color,
        },
        children: vec![],
        node_type: Some("TextLine".to_string()),
        section: Some(section),
    }
}

#[cfg(test)]
mod tests {
    use super::decorate::NoDecoration;
    use super::*;
    use crate::style::Stylesheet;
    use std::cell::RefCell;

    fn text_style() -> ParagraphStyle {
        ParagraphStyle {
            font_size: 9.0,
            leading: 13.0,
            ..ParagraphStyle::default()
        }
    }

    fn small_page() -> PageConfig {
        PageConfig {
            size: PageSize::Custom {
                width: 300.0,
                height: 200.0,
            },
            margin: Edges::uniform(20.0),
        }
    }

    fn document(blocks: Vec<Block>, page: PageConfig) -> Document {
        Document {
            blocks,
            page,
            metadata: Metadata::default(),
        }
    }

    fn table(columns: Vec<f64>, body: usize, text: &str, repeat_header: bool) -> Table {
        let mut rows = vec![TableRow::header(&vec!["H"; columns.len()])];
        for i in 0..body {
            rows.push(TableRow::body(
                columns
                    .iter()
                    .map(|_| TableCell::plain(&format!("{} {}", text, i)))
                    .collect(),
            ));
        }
        Table {
            columns,
            rows,
            style: TableStyle {
                text: text_style(),
                header_bold: true,
                repeat_header,
                ..TableStyle::default()
            },
        }
    }

    fn layout(doc: &Document) -> Vec<LayoutPage> {
        LayoutEngine::new()
            .layout(doc, &FontContext::new(), &NoDecoration)
            .unwrap()
    }

    fn rows_of<'a>(page: &'a LayoutPage, node_type: &str) -> Vec<&'a LayoutElement> {
        page.elements.iter().filter(|el| el.is(node_type)).collect()
    }

    #[test]
    fn empty_document_has_one_page() {
        let pages = layout(&document(vec![], PageConfig::default()));
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].number, 1);
        assert!(pages[0].elements.is_empty());
    }

    #[test]
    fn paragraph_lines_fit_content_width() {
        let text = "The quick brown fox jumps over the lazy dog. ".repeat(10);
        let doc = document(
            vec![Block::paragraph(
                Section::Terms,
                Paragraph::plain(&text, text_style()),
            )],
            PageConfig::default(),
        );
        let pages = layout(&doc);
        let width = PageConfig::default().content_width();
        let para = &pages[0].elements[0];
        assert!(para.children.len() > 1);
        for line in &para.children {
            assert!(line.width <= width + EPSILON);
        }
    }

    #[test]
    fn long_paragraph_splits_between_lines() {
        let text = "word ".repeat(400);
        let doc = document(
            vec![Block::paragraph(
                Section::Address,
                Paragraph::plain(&text, text_style()),
            )],
            small_page(),
        );
        let pages = layout(&doc);
        assert!(pages.len() > 1);
        for page in &pages {
            for el in &page.elements {
                assert!(el.y + el.height <= 200.0 - 20.0 + EPSILON);
            }
        }
    }

    #[test]
    fn table_wider_than_page_is_rejected() {
        let doc = document(
            vec![Block::table(
                Section::Hotels,
                table(vec![300.0, 300.0], 1, "x", false),
            )],
            PageConfig::default(),
        );
        let err = LayoutEngine::new()
            .layout(&doc, &FontContext::new(), &NoDecoration)
            .unwrap_err();
        assert!(matches!(err, VoucherError::Layout(_)));
    }

    #[test]
    fn ragged_row_is_rejected() {
        let mut t = table(vec![100.0, 100.0], 1, "x", false);
        t.rows[1].cells.pop();
        let doc = document(vec![Block::table(Section::Hotels, t)], PageConfig::default());
        assert!(LayoutEngine::new()
            .layout(&doc, &FontContext::new(), &NoDecoration)
            .is_err());
    }

    #[test]
    fn table_is_centered() {
        let doc = document(
            vec![Block::table(
                Section::Inclusions,
                table(vec![200.0], 1, "x", false),
            )],
            PageConfig::default(),
        );
        let pages = layout(&doc);
        let row = &pages[0].elements[0];
        let content_width = PageConfig::default().content_width();
        assert!((row.x - (30.0 + (content_width - 200.0) / 2.0)).abs() < EPSILON);
    }

    #[test]
    fn cell_lines_stay_inside_cells() {
        let remark = "Pickup from the hotel lobby at the agreed time ".repeat(5);
        let doc = document(
            vec![Block::table(
                Section::Activities,
                table(vec![40.0, 160.0], 3, &remark, true),
            )],
            PageConfig::default(),
        );
        let pages = layout(&doc);
        for row in rows_of(&pages[0], "TableRow") {
            for cell in &row.children {
                let inner = cell.width - 12.0;
                assert!(cell.children.iter().all(|l| l.width <= inner + EPSILON));
                assert!(cell.children.len() as f64 * 13.0 + 6.0 <= row.height + EPSILON);
            }
        }
    }

    #[test]
    fn rows_never_split_and_headers_repeat() {
        let doc = document(
            vec![Block::table(
                Section::Activities,
                table(vec![100.0, 150.0], 30, "entry", true),
            )],
            small_page(),
        );
        let pages = layout(&doc);
        assert!(pages.len() > 1);

        let mut body_rows = 0;
        for page in &pages {
            let headers = rows_of(page, "TableHeaderRow");
            assert_eq!(headers.len(), 1, "page {} has no header", page.number);
            assert!((headers[0].y - 20.0).abs() < EPSILON);
            for row in rows_of(page, "TableRow") {
                assert!(row.y + row.height <= 180.0 + EPSILON);
                body_rows += 1;
            }
        }
        assert_eq!(body_rows, 30);
    }

    #[test]
    fn headers_not_repeated_unless_asked() {
        let doc = document(
            vec![Block::table(
                Section::Terms,
                table(vec![200.0], 30, "term", false),
            )],
            small_page(),
        );
        let pages = layout(&doc);
        assert!(pages.len() > 1);
        assert!(rows_of(&pages[1], "TableHeaderRow").is_empty());
    }

    #[test]
    fn oversize_row_goes_on_its_own_page() {
        let huge = "long remark ".repeat(300);
        let mut t = table(vec![200.0], 1, "short", false);
        t.rows.push(TableRow::body(vec![TableCell::plain(&huge)]));
        let doc = document(vec![Block::table(Section::Activities, t)], small_page());
        let pages = layout(&doc);
        assert_eq!(pages.len(), 2);
        let rows = rows_of(&pages[1], "TableRow");
        assert_eq!(rows.len(), 1);
        assert!(rows[0].height > 160.0);
        assert!((rows[0].y - 20.0).abs() < EPSILON);
    }

    #[test]
    fn heading_keeps_with_following_table() {
        let heading_style = Stylesheet::standard().heading;
        let filler = "filler text ".repeat(60);
        let doc = document(
            vec![
                Block::paragraph(Section::TripSummary, Paragraph::plain(&filler, text_style())),
                Block::heading(Section::Hotels, &heading_style),
                Block::table(Section::Hotels, table(vec![200.0], 2, "hotel", true)),
            ],
            small_page(),
        );
        let pages = layout(&doc);
        let heading_page = pages
            .iter()
            .find(|p| p.elements.iter().any(|el| el.is("Heading")))
            .unwrap();
        assert!(!rows_of(heading_page, "TableRow").is_empty());
        let heading = heading_page.elements.iter().find(|el| el.is("Heading")).unwrap();
        assert!(heading.y + heading.height <= 180.0 + EPSILON);
    }

    #[test]
    fn heading_space_before_dropped_at_page_top() {
        let heading_style = Stylesheet::standard().heading;
        let doc = document(
            vec![Block::heading(Section::TripSummary, &heading_style)],
            PageConfig::default(),
        );
        let pages = layout(&doc);
        assert!((pages[0].elements[0].y - 140.0).abs() < EPSILON);
        assert_eq!(pages[0].content_text(), ["Trip Voucher"]);
    }

    #[test]
    fn spacer_dropped_at_page_top() {
        let doc = document(
            vec![
                Block::spacer(Section::Address, 14.0),
                Block::paragraph(Section::Address, Paragraph::plain("x", text_style())),
            ],
            PageConfig::default(),
        );
        let pages = layout(&doc);
        assert!((pages[0].elements[0].y - 140.0).abs() < EPSILON);
    }

    #[test]
    fn sections_reported_in_order() {
        let doc = document(
            vec![
                Block::paragraph(Section::Inclusions, Paragraph::plain("a", text_style())),
                Block::paragraph(Section::Exclusions, Paragraph::plain("b", text_style())),
            ],
            PageConfig::default(),
        );
        let pages = layout(&doc);
        assert_eq!(pages[0].sections(), [Section::Inclusions, Section::Exclusions]);
    }

    struct Recorder(RefCell<Vec<(usize, bool)>>);

    impl PageDecorator for Recorder {
        fn on_first_page(&self, _canvas: &mut PageCanvas<'_>, page: &PageMeta) {
            self.0.borrow_mut().push((page.number, true));
        }
        fn on_later_pages(&self, _canvas: &mut PageCanvas<'_>, page: &PageMeta) {
            self.0.borrow_mut().push((page.number, false));
        }
    }

    #[test]
    fn decorator_runs_once_per_page() {
        let doc = document(
            vec![Block::table(
                Section::Terms,
                table(vec![200.0], 40, "term", false),
            )],
            small_page(),
        );
        let recorder = Recorder(RefCell::new(Vec::new()));
        let pages = LayoutEngine::new()
            .layout(&doc, &FontContext::new(), &recorder)
            .unwrap();
        let calls = recorder.0.into_inner();
        assert_eq!(calls.len(), pages.len());
        assert_eq!(calls[0], (1, true));
        for (i, call) in calls.iter().enumerate().skip(1) {
            assert_eq!(*call, (i + 1, false));
        }
    }
}
