//! Integration tests for the voucher rendering pipeline.
//!
//! These tests exercise the full path from a request (or form map) to PDF
//! bytes. They verify:
//! - Sections appear in the fixed order on the laid out pages
//! - Table rows wrap inside their cells and are never split across pages
//! - Page decorations: banner on page 1, page numbers on later pages
//! - The logo is optional, and a corrupt logo fails the render
//! - Output is deterministic and structurally valid

use std::io::Write;
use std::path::{Path, PathBuf};

use voucher::layout::{LayoutElement, LayoutPage};
use voucher::model::{Edges, PageConfig, PageSize, Section};
use voucher::{
    ActivityEntry, FormFields, HotelStay, ListPolicy, VoucherConfig, VoucherError,
    VoucherRenderer, VoucherRequest,
};

// ─── Helpers ────────────────────────────────────────────────────

const EPSILON: f64 = 1e-6;

fn missing_logo(dir: &Path) -> PathBuf {
    dir.join("triplogo.png")
}

fn renderer_without_logo() -> VoucherRenderer {
    let dir = tempfile::tempdir().unwrap();
    VoucherRenderer::new(VoucherConfig::new().with_logo_path(missing_logo(dir.path())))
}

fn sample_request() -> VoucherRequest {
    VoucherRequest {
        trip_id: "DXB-2026-0142".into(),
        arrival_date: "12 Mar 2026".into(),
        departure: "17 Mar 2026".into(),
        duration: "5 Nights".into(),
        guest_name: "A. Sharma".into(),
        guest_phone: "+91 98200 00000".into(),
        pax: "2".into(),
        reference_id: "REF-88421".into(),
        hotels: vec![HotelStay {
            name: "Marina View Hotel".into(),
            check_in: "12 Mar".into(),
            check_out: "17 Mar".into(),
            room_type: "Deluxe Double".into(),
        }],
        activities: vec![ActivityEntry {
            day: "1".into(),
            time: "09:00".into(),
            service_description: "Dubai city tour with Burj Khalifa tickets".into(),
            pax_or_vehicle: "2 pax SIC".into(),
            remarks: "Pickup from hotel lobby".into(),
        }],
    }
}

fn long_remark() -> String {
    "Guide meets the group at the hotel lobby with a name board. "
        .repeat(6)
        .chars()
        .take(300)
        .collect()
}

fn request_with_activities(count: usize) -> VoucherRequest {
    VoucherRequest {
        activities: (1..=count)
            .map(|day| ActivityEntry {
                day: day.to_string(),
                time: "10:00".into(),
                service_description: "Full day excursion".into(),
                pax_or_vehicle: "Private car".into(),
                remarks: long_remark(),
            })
            .collect(),
        ..sample_request()
    }
}

fn png_logo(width: u32, height: u32) -> tempfile::NamedTempFile {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([20, 80, 160, 200]));
    let mut buf = Vec::new();
    image::ImageEncoder::write_image(
        image::codecs::png::PngEncoder::new(&mut buf),
        img.as_raw(),
        width,
        height,
        image::ColorType::Rgba8,
    )
    .unwrap();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&buf).unwrap();
    file
}

fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x * 4) as u8, (y * 8) as u8, 200])
    });
    let mut buf = Vec::new();
    image::ImageEncoder::write_image(
        image::codecs::jpeg::JpegEncoder::new(&mut buf),
        img.as_raw(),
        width,
        height,
        image::ColorType::Rgb8,
    )
    .unwrap();
    buf
}

fn elements_of<'a>(page: &'a LayoutPage, node_type: &str) -> Vec<&'a LayoutElement> {
    let mut found = Vec::new();
    for element in &page.elements {
        element.visit(&mut |el| {
            if el.is(node_type) {
                found.push(el);
            }
        });
    }
    found
}

fn assert_valid_pdf(bytes: &[u8]) {
    assert!(bytes.len() > 100, "PDF too small: {} bytes", bytes.len());
    assert!(bytes.starts_with(b"%PDF-1.7"), "Missing PDF header");
    assert!(bytes.ends_with(b"%%EOF\n"), "Missing EOF marker");
    let text = String::from_utf8_lossy(bytes);
    assert!(text.contains("xref"), "Missing xref table");
    assert!(text.contains("/Type /Catalog"), "Missing catalog");
}

fn page_count(bytes: &[u8]) -> usize {
    let text = String::from_utf8_lossy(bytes);
    text.matches("/Type /Page ").count()
}

// ─── Output ─────────────────────────────────────────────────────

#[test]
fn test_sample_request_renders_valid_pdf() {
    let voucher = renderer_without_logo().render(&sample_request()).unwrap();
    assert_valid_pdf(voucher.bytes());
    assert_eq!(page_count(voucher.bytes()), voucher.page_count);
}

#[test]
fn test_empty_request_renders_valid_pdf() {
    let voucher = renderer_without_logo()
        .render(&VoucherRequest::default())
        .unwrap();
    assert_valid_pdf(voucher.bytes());
}

#[test]
fn test_rendering_is_deterministic() {
    let renderer = renderer_without_logo();
    let request = request_with_activities(8);
    let first = renderer.render(&request).unwrap();
    let second = renderer.render(&request).unwrap();
    assert_eq!(first.bytes(), second.bytes());
}

#[test]
fn test_renderer_shared_across_threads() {
    let renderer = renderer_without_logo();
    let request = sample_request();
    let expected = renderer.render(&request).unwrap();
    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| s.spawn(|| renderer.render(&request).unwrap()))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap().bytes(), expected.bytes());
        }
    });
}

// ─── Section order and content ──────────────────────────────────

#[test]
fn test_sections_in_fixed_order() {
    let pages = renderer_without_logo()
        .layout(&request_with_activities(12))
        .unwrap();
    let mut sections: Vec<Section> = pages.iter().flat_map(LayoutPage::sections).collect();
    sections.dedup();
    assert_eq!(sections, Section::ORDER);
}

#[test]
fn test_summary_values_printed_verbatim() {
    let pages = renderer_without_logo().layout(&sample_request()).unwrap();
    let text = pages[0].content_text();
    for expected in ["1. Trip ID", "DXB-2026-0142", "8. Reference ID", "REF-88421"] {
        assert!(text.iter().any(|l| l == expected), "missing {expected}");
    }
}

#[test]
fn test_empty_lists_keep_header_rows() {
    let pages = renderer_without_logo()
        .layout(&VoucherRequest::default())
        .unwrap();
    for section in [Section::Hotels, Section::Activities] {
        let headers: usize = pages
            .iter()
            .flat_map(|p| elements_of(p, "TableHeaderRow"))
            .filter(|el| el.section == Some(section))
            .count();
        let rows: usize = pages
            .iter()
            .flat_map(|p| elements_of(p, "TableRow"))
            .filter(|el| el.section == Some(section))
            .count();
        assert_eq!((headers, rows), (1, 0), "{:?}", section);
    }
}

#[test]
fn test_address_footer_last() {
    let pages = renderer_without_logo().layout(&sample_request()).unwrap();
    let text = pages.last().unwrap().content_text();
    assert_eq!(text.last().map(String::as_str), Some("www.overnetdubai.com"));
    assert!(!text.iter().any(|l| l.starts_with("24x7 Operational")));
}

#[test]
fn test_helpline_printed_when_enabled() {
    let dir = tempfile::tempdir().unwrap();
    let config = VoucherConfig::new()
        .with_logo_path(missing_logo(dir.path()))
        .with_helpline(true);
    let pages = VoucherRenderer::new(config).layout(&sample_request()).unwrap();
    let text = pages.last().unwrap().content_text();
    let helpline = text
        .iter()
        .position(|l| l.starts_with("24x7 Operational: HIREN PAREKH"))
        .unwrap();
    let address = text.iter().position(|l| l.starts_with("P.O Box")).unwrap();
    assert_eq!(address, helpline + 1);
    assert_eq!(text.last().map(String::as_str), Some("www.overnetdubai.com"));
}

// ─── Wrapping and pagination ────────────────────────────────────

#[test]
fn test_cell_lines_fit_inner_width() {
    let pages = renderer_without_logo()
        .layout(&request_with_activities(6))
        .unwrap();
    for page in &pages {
        for cell in elements_of(page, "TableCell") {
            for line in &cell.children {
                assert!(
                    line.width <= cell.width - 12.0 + EPSILON,
                    "line {:?} ({:.2}pt) overflows a {:.2}pt cell",
                    line.line_text(),
                    line.width,
                    cell.width
                );
                assert!(line.y + line.height <= cell.y + cell.height + EPSILON);
            }
        }
    }
}

#[test]
fn test_narrow_glyphs_before_a_wide_tail_stay_inside_the_cell() {
    let mut request = sample_request();
    request.activities[0].remarks = "a iiiiiiiiiiiiiiiiiiiittttttWWWW".into();
    let pages = renderer_without_logo().layout(&request).unwrap();

    let mut checked = 0;
    for cell in elements_of(&pages[0], "TableCell") {
        if cell.section != Some(Section::Activities) {
            continue;
        }
        for line in &cell.children {
            assert!(
                line.width <= cell.width - 12.0 + EPSILON,
                "line {:?} ({:.2}pt) overflows a {:.2}pt cell",
                line.line_text(),
                line.width,
                cell.width
            );
            checked += 1;
        }
    }
    assert!(checked > 0);
}

#[test]
fn test_long_remarks_paginate_without_splitting_rows() {
    let request = request_with_activities(20);
    let pages = renderer_without_logo().layout(&request).unwrap();
    assert!(pages.len() > 1);

    let mut activity_rows = 0;
    for page in &pages {
        let bottom = page.height - PageConfig::default().margin.bottom;
        for row in elements_of(page, "TableRow") {
            assert!(
                row.y + row.height <= bottom + EPSILON,
                "row crosses the bottom margin on page {}",
                page.number
            );
            if row.section == Some(Section::Activities) {
                activity_rows += 1;
            }
        }
    }
    assert_eq!(activity_rows, 20);
}

#[test]
fn test_activity_header_repeats_on_continuation_pages() {
    let pages = renderer_without_logo()
        .layout(&request_with_activities(20))
        .unwrap();
    for page in &pages {
        let has_activity_rows = elements_of(page, "TableRow")
            .iter()
            .any(|el| el.section == Some(Section::Activities));
        if has_activity_rows {
            let headers = elements_of(page, "TableHeaderRow")
                .into_iter()
                .filter(|el| el.section == Some(Section::Activities))
                .count();
            assert_eq!(headers, 1, "page {} lacks the activity header", page.number);
        }
    }
}

#[test]
fn test_headings_never_end_a_page() {
    let pages = renderer_without_logo()
        .layout(&request_with_activities(20))
        .unwrap();
    for page in &pages {
        if let Some(last) = page.elements.last() {
            assert!(!last.is("Heading"), "page {} ends with a heading", page.number);
        }
    }
}

#[test]
fn test_page_count_grows_with_activities() {
    let renderer = renderer_without_logo();
    let counts: Vec<usize> = [0, 5, 10, 20, 40]
        .iter()
        .map(|&n| renderer.render(&request_with_activities(n)).unwrap().page_count)
        .collect();
    assert!(counts.windows(2).all(|w| w[0] <= w[1]), "{:?}", counts);
    assert!(counts[4] > counts[0]);
}

// ─── Decorations ────────────────────────────────────────────────

#[test]
fn test_banner_on_first_page_only() {
    let pages = renderer_without_logo()
        .layout(&request_with_activities(20))
        .unwrap();
    let first = pages[0].decoration_text();
    assert!(first.contains(&"Welcome to Dubai".to_string()));
    assert!(first.contains(&"TRAVEL ITINERARY".to_string()));
    assert!(!first.iter().any(|t| t.starts_with("Page")));

    for page in &pages[1..] {
        assert!(!page.decoration_text().contains(&"TRAVEL ITINERARY".to_string()));
    }
}

#[test]
fn test_later_pages_numbered_consecutively() {
    let pages = renderer_without_logo()
        .layout(&request_with_activities(20))
        .unwrap();
    assert!(pages.len() >= 3);
    for (i, page) in pages.iter().enumerate().skip(1) {
        assert_eq!(page.number, i + 1);
        assert_eq!(page.decoration_text(), [format!("Page {}", i + 1)]);
    }
}

// ─── Logo ───────────────────────────────────────────────────────

#[test]
fn test_missing_logo_draws_banner_without_image() {
    let renderer = renderer_without_logo();
    let pages = renderer.layout(&sample_request()).unwrap();
    assert!(!pages[0].has_image());
    let voucher = renderer.render(&sample_request()).unwrap();
    assert!(!String::from_utf8_lossy(voucher.bytes()).contains("/Subtype /Image"));
}

#[test]
fn test_png_logo_embedded_once() {
    let logo = png_logo(40, 20);
    let renderer = VoucherRenderer::new(VoucherConfig::new().with_logo_path(logo.path()));

    let pages = renderer.layout(&request_with_activities(20)).unwrap();
    assert!(pages[0].has_image());
    assert!(pages[1..].iter().all(|p| !p.has_image()));

    let voucher = renderer.render(&sample_request()).unwrap();
    assert_valid_pdf(voucher.bytes());
    let text = String::from_utf8_lossy(voucher.bytes());
    assert!(text.contains("/Subtype /Image"));
    assert_eq!(text.matches("/SMask").count(), 1);
}

#[test]
fn test_corrupt_logo_fails_every_render() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"\x89PNG\r\n\x1a\n truncated").unwrap();
    let renderer = VoucherRenderer::new(VoucherConfig::new().with_logo_path(file.path()));

    for _ in 0..2 {
        assert!(matches!(
            renderer.render(&sample_request()),
            Err(VoucherError::Image(_))
        ));
    }
}

#[test]
fn test_truncated_jpeg_logo_fails_every_render() {
    let jpeg = jpeg_bytes(64, 32);
    let scan = jpeg.windows(2).position(|w| w == [0xFF, 0xDA]).unwrap();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&jpeg[..scan + 20]).unwrap();
    let renderer = VoucherRenderer::new(VoucherConfig::new().with_logo_path(file.path()));

    for _ in 0..2 {
        assert!(matches!(
            renderer.render(&sample_request()),
            Err(VoucherError::Image(_))
        ));
    }
}

#[test]
fn test_jpeg_logo_embedded_with_dct() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&jpeg_bytes(64, 32)).unwrap();
    let renderer = VoucherRenderer::new(VoucherConfig::new().with_logo_path(file.path()));

    let voucher = renderer.render(&sample_request()).unwrap();
    assert_valid_pdf(voucher.bytes());
    assert!(String::from_utf8_lossy(voucher.bytes()).contains("/DCTDecode"));
}

// ─── Errors ─────────────────────────────────────────────────────

#[test]
fn test_cjk_text_is_a_render_error() {
    let mut request = sample_request();
    request.activities[0].remarks = "東京タワー".into();
    match renderer_without_logo().render(&request) {
        Err(VoucherError::Render(msg)) => assert!(msg.contains("U+6771"), "{msg}"),
        other => panic!("expected a render error, got {:?}", other.map(|v| v.page_count)),
    }
}

#[test]
fn test_latin1_text_renders() {
    let mut request = sample_request();
    request.guest_name = "José Müller – “VIP”".into();
    let voucher = renderer_without_logo().render(&request).unwrap();
    assert_valid_pdf(voucher.bytes());
}

#[test]
fn test_page_too_narrow_for_tables() {
    let dir = tempfile::tempdir().unwrap();
    let config = VoucherConfig::new()
        .with_logo_path(missing_logo(dir.path()))
        .with_page(PageConfig {
            size: PageSize::Custom {
                width: 400.0,
                height: 600.0,
            },
            margin: Edges::uniform(30.0),
        });
    assert!(matches!(
        VoucherRenderer::new(config).render(&sample_request()),
        Err(VoucherError::Layout(_))
    ));
}

// ─── Form input ─────────────────────────────────────────────────

fn activity_form(days: usize, remarks: usize) -> FormFields {
    let mut form = FormFields::new();
    form.insert("trip_id", "DXB-7");
    for d in 0..days {
        form.insert("day[]", (d + 1).to_string());
        form.insert("start_time[]", "09:00");
        form.insert("service[]", "City tour");
        form.insert("pax_or_vehicle[]", "2 pax");
    }
    for _ in 0..remarks {
        form.insert("remarks[]", "Lobby pickup");
    }
    form
}

fn renderer_with_policy(policy: ListPolicy) -> VoucherRenderer {
    let dir = tempfile::tempdir().unwrap();
    VoucherRenderer::new(
        VoucherConfig::new()
            .with_logo_path(missing_logo(dir.path()))
            .with_list_policy(policy),
    )
}

#[test]
fn test_strict_policy_rejects_unequal_arrays() {
    let result = renderer_with_policy(ListPolicy::Strict).render_form(&activity_form(3, 1));
    match result {
        Err(VoucherError::MismatchedLists { section, lengths }) => {
            assert_eq!(section, "activity");
            assert_eq!(lengths, vec![3, 3, 3, 3, 1]);
        }
        other => panic!("expected mismatch, got {:?}", other.map(|v| v.page_count)),
    }
}

#[test]
fn test_truncate_and_pad_policies() {
    let form = activity_form(3, 1);
    let request = VoucherRequest::from_form(&form, ListPolicy::Truncate).unwrap();
    assert_eq!(request.activities().len(), 1);
    let request = VoucherRequest::from_form(&form, ListPolicy::Pad).unwrap();
    assert_eq!(request.activities().len(), 3);
    assert_eq!(request.activities()[2].remarks, "");

    let voucher = renderer_with_policy(ListPolicy::Pad)
        .render_form(&form)
        .unwrap();
    assert_valid_pdf(voucher.bytes());
}

#[test]
fn test_json_form_round_trip_to_pdf() {
    let form = FormFields::from_json(
        r#"{
            "trip_id": "DXB-9",
            "guest_name": "Guest",
            "hotel_name[]": ["Marina View"],
            "check_in[]": ["1 Mar"],
            "check_out[]": ["3 Mar"],
            "accommodation[]": ["Twin"]
        }"#,
    )
    .unwrap();
    let renderer = renderer_with_policy(ListPolicy::Strict);
    let request = VoucherRequest::from_form(&form, ListPolicy::Strict).unwrap();
    let pages = renderer.layout(&request).unwrap();
    assert!(pages[0].content_text().contains(&"Marina View".to_string()));
    assert_valid_pdf(renderer.render_form(&form).unwrap().bytes());
}

#[test]
fn test_malformed_json_is_a_parse_error() {
    let err = FormFields::from_json(r#"{"trip_id": "DXB-9",}"#).unwrap_err();
    assert!(matches!(err, VoucherError::Parse { .. }));
}
