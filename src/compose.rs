//! Voucher composer.
//!
//! Turns a [`VoucherRequest`] plus the static content and stylesheet into a
//! [`Document`] whose blocks follow the fixed section order, and supplies the
//! [`VoucherDecorator`] that paints the banner and page numbers.

use std::sync::Arc;

use crate::config::VoucherConfig;
use crate::image_loader::LoadedImage;
use crate::layout::decorate::{Font, PageCanvas, PageDecorator, PageMeta};
use crate::model::*;
use crate::style::{Color, Palette, Stylesheet, TableStyle};
use crate::voucher::{StaticContent, VoucherRequest};

const TRIP_COLUMNS: [f64; 2] = [150.0, 300.0];
const HOTEL_COLUMNS: [f64; 4] = [160.0, 90.0, 90.0, 110.0];
const ACTIVITY_COLUMNS: [f64; 5] = [40.0, 60.0, 160.0, 90.0, 100.0];
const LIST_COLUMNS: [f64; 1] = [450.0];

const HOTEL_HEADER: [&str; 4] = ["Hotel", "Check-In", "Check-Out", "Room Type"];
const ACTIVITY_HEADER: [&str; 5] = ["Day", "Time", "Service", "Pax / Vehicle", "Remarks"];

/// ZapfDingbats code for the check mark glyph.
const CHECK_MARK: &str = "3";
const BULLET: &str = "\u{2022} ";

/// Build the block sequence for one voucher.
pub fn compose(request: &VoucherRequest, config: &VoucherConfig) -> Document {
    let styles = &config.styles;
    let content = &config.content;
    let mut blocks = Vec::new();

    let mut add_section = |section: Section, body: Vec<Block>| {
        blocks.push(Block::heading(section, &styles.heading));
        blocks.extend(body);
    };

    add_section(
        Section::TripSummary,
        vec![Block::table(Section::TripSummary, trip_table(request, styles))],
    );
    add_section(
        Section::Hotels,
        vec![Block::table(Section::Hotels, hotel_table(request, styles))],
    );
    add_section(
        Section::Activities,
        vec![Block::table(Section::Activities, activity_table(request, styles))],
    );
    add_section(
        Section::Inclusions,
        vec![Block::table(
            Section::Inclusions,
            checklist(&content.inclusions, styles.list_table.clone()),
        )],
    );
    add_section(
        Section::Exclusions,
        vec![Block::table(
            Section::Exclusions,
            bullet_list(&content.exclusions, styles.list_table.clone()),
        )],
    );
    add_section(
        Section::Terms,
        vec![Block::table(
            Section::Terms,
            bullet_list(&content.terms, styles.terms_table.clone()),
        )],
    );

    // The footer has no heading.
    blocks.push(Block::spacer(Section::Address, styles.footer_gap));
    blocks.push(Block::paragraph(
        Section::Address,
        address(content, styles, config.show_helpline),
    ));

    Document {
        blocks,
        page: config.page.clone(),
        metadata: Metadata {
            title: Some(content.title.clone()),
            author: None,
            subject: non_empty(&request.trip_id).map(|id| format!("Trip {}", id)),
        },
    }
}

fn non_empty(s: &str) -> Option<&str> {
    (!s.trim().is_empty()).then_some(s)
}

fn trip_table(request: &VoucherRequest, styles: &Stylesheet) -> Table {
    let rows = request
        .trip_summary_rows()
        .iter()
        .map(|(label, value)| TableRow::body(vec![TableCell::plain(label), TableCell::plain(value)]))
        .collect();
    Table {
        columns: TRIP_COLUMNS.to_vec(),
        rows,
        style: styles.summary_table.clone(),
    }
}

fn hotel_table(request: &VoucherRequest, styles: &Stylesheet) -> Table {
    let mut rows = vec![TableRow::header(&HOTEL_HEADER)];
    rows.extend(request.hotels().iter().map(|h| {
        TableRow::body(vec![
            TableCell::plain(&h.name),
            TableCell::plain(&h.check_in),
            TableCell::plain(&h.check_out),
            TableCell::plain(&h.room_type),
        ])
    }));
    Table {
        columns: HOTEL_COLUMNS.to_vec(),
        rows,
        style: styles.listing_table.clone(),
    }
}

fn activity_table(request: &VoucherRequest, styles: &Stylesheet) -> Table {
    let mut rows = vec![TableRow::header(&ACTIVITY_HEADER)];
    rows.extend(request.activities().iter().map(|a| {
        TableRow::body(vec![
            TableCell::plain(&a.day),
            TableCell::plain(&a.time),
            TableCell::plain(&a.service_description),
            TableCell::plain(&a.pax_or_vehicle),
            TableCell::plain(&a.remarks),
        ])
    }));
    Table {
        columns: ACTIVITY_COLUMNS.to_vec(),
        rows,
        style: styles.listing_table.clone(),
    }
}

fn checklist(items: &[String], style: TableStyle) -> Table {
    let rows = items
        .iter()
        .map(|item| {
            TableRow::body(vec![TableCell::runs(vec![
                Run::with_family(CHECK_MARK, "ZapfDingbats"),
                Run::text(format!(" {}", item)),
            ])])
        })
        .collect();
    Table {
        columns: LIST_COLUMNS.to_vec(),
        rows,
        style,
    }
}

fn bullet_list(items: &[String], style: TableStyle) -> Table {
    let rows = items
        .iter()
        .map(|item| TableRow::body(vec![TableCell::plain(&format!("{}{}", BULLET, item))]))
        .collect();
    Table {
        columns: LIST_COLUMNS.to_vec(),
        rows,
        style,
    }
}

fn address(content: &StaticContent, styles: &Stylesheet, show_helpline: bool) -> Paragraph {
    let mut runs = Vec::with_capacity(5);
    if show_helpline {
        runs.push(Run::text(content.helpline_line()));
        runs.push(Run::line_break());
    }
    runs.push(Run::text(content.address.clone()));
    runs.push(Run::line_break());
    runs.push(Run::text(content.website.clone()));
    Paragraph {
        runs,
        style: styles.address.clone(),
    }
}

/// Paints the first-page banner and the page numbers of later pages.
#[derive(Debug, Clone)]
pub struct VoucherDecorator<'a> {
    content: &'a StaticContent,
    palette: &'a Palette,
    logo: Option<Arc<LoadedImage>>,
}

impl<'a> VoucherDecorator<'a> {
    pub const BANNER_HEIGHT: f64 = 120.0;
    const SIDE_INSET: f64 = 30.0;
    const TEXT_BASELINE: f64 = 55.0;
    const LOGO_BOX: (f64, f64) = (110.0, 55.0);
    /// Distance from the right page edge to the left edge of the logo box.
    const LOGO_RIGHT_OFFSET: f64 = 160.0;
    const LOGO_TOP: f64 = 35.0;
    const CAPTION_BASELINE: f64 = 105.0;

    pub fn new(
        content: &'a StaticContent,
        palette: &'a Palette,
        logo: Option<Arc<LoadedImage>>,
    ) -> Self {
        Self {
            content,
            palette,
            logo,
        }
    }
}

impl PageDecorator for VoucherDecorator<'_> {
    fn on_first_page(&self, canvas: &mut PageCanvas<'_>, page: &PageMeta) {
        canvas.fill_rect(0.0, 0.0, page.width, Self::BANNER_HEIGHT, self.palette.light_blue);

        let banner_font = |size| Font {
            family: "Helvetica",
            weight: 700,
            size,
            color: self.palette.dark_blue,
        };
        canvas.draw_string(
            Self::SIDE_INSET,
            Self::TEXT_BASELINE,
            &self.content.welcome_text,
            &banner_font(11.0),
        );
        canvas.draw_centred_string(
            page.width / 2.0,
            Self::TEXT_BASELINE,
            &self.content.title,
            &banner_font(22.0),
        );

        if let Some(logo) = &self.logo {
            let (box_w, box_h) = Self::LOGO_BOX;
            canvas.draw_image(
                Arc::clone(logo),
                page.width - Self::LOGO_RIGHT_OFFSET,
                Self::LOGO_TOP,
                box_w,
                box_h,
            );
        }

        canvas.draw_right_string(
            page.width - Self::SIDE_INSET,
            Self::CAPTION_BASELINE,
            &self.content.caption,
            &Font {
                family: "Helvetica",
                weight: 400,
                size: 8.0,
                color: Color::BLACK,
            },
        );
    }

    fn on_later_pages(&self, canvas: &mut PageCanvas<'_>, page: &PageMeta) {
        canvas.draw_right_string(
            page.width - Self::SIDE_INSET,
            page.height - Self::SIDE_INSET,
            &format!("Page {}", page.number),
            &Font {
                family: "Helvetica",
                weight: 400,
                size: 9.0,
                color: Color::GREY,
            },
        );
    }
}
