//! # Voucher
//!
//! Renders travel-booking data into a paginated PDF travel voucher.
//!
//! The layout is page-native: blocks are placed into pages of known size as
//! they flow, so table rows are never sliced across a page boundary and
//! section headings never sit alone at the bottom of a page.
//!
//! ## Architecture
//!
//! ```text
//! FormFields (JSON / form map)
//!       ↓
//!   [voucher]  - VoucherRequest + fixed StaticContent
//!       ↓
//!   [compose]  - Document: headings, tables, paragraphs in section order
//!       ↓
//!   [layout]   - Page-aware layout engine + page decorator
//!       ↓
//!   [pdf]      - Serialize to PDF bytes
//! ```
//!
//! ```no_run
//! use voucher::{VoucherConfig, VoucherRenderer, VoucherRequest};
//!
//! let renderer = VoucherRenderer::new(VoucherConfig::default());
//! let voucher = renderer.render(&VoucherRequest::default())?;
//! std::fs::write(voucher.filename, voucher.bytes())?;
//! # Ok::<(), voucher::VoucherError>(())
//! ```

pub mod compose;
pub mod config;
pub mod error;
pub mod font;
pub mod image_loader;
pub mod layout;
pub mod model;
pub mod pdf;
pub mod style;
pub mod text;
pub mod voucher;

use std::io::Cursor;

pub use config::{VoucherConfig, DOWNLOAD_FILENAME};
pub use error::VoucherError;
pub use voucher::{ActivityEntry, FormFields, HotelStay, ListPolicy, VoucherRequest};

use compose::VoucherDecorator;
use font::FontContext;
use image_loader::LogoAsset;
use layout::{LayoutEngine, LayoutPage};
use model::Document;
use pdf::PdfWriter;

/// Renders vouchers with one fixed configuration.
///
/// Holds only immutable state (configuration, font metrics, the decoded
/// logo), so one renderer can serve any number of threads.
pub struct VoucherRenderer {
    config: VoucherConfig,
    fonts: FontContext,
    logo: LogoAsset,
    engine: LayoutEngine,
}

impl VoucherRenderer {
    /// Build a renderer. The logo is read and decoded here, once; a missing
    /// file is tolerated, an unreadable one fails every later render.
    pub fn new(config: VoucherConfig) -> Self {
        let logo = LogoAsset::load(&config.content.logo_path);
        Self {
            config,
            fonts: FontContext::new(),
            logo,
            engine: LayoutEngine::new(),
        }
    }

    pub fn config(&self) -> &VoucherConfig {
        &self.config
    }

    /// Lay out a voucher without serializing it.
    pub fn layout(&self, request: &VoucherRequest) -> Result<Vec<LayoutPage>, VoucherError> {
        self.lay_out(&compose::compose(request, &self.config))
    }

    /// Render a voucher to PDF. Nothing is returned unless the whole render
    /// succeeds.
    pub fn render(&self, request: &VoucherRequest) -> Result<RenderedVoucher, VoucherError> {
        let document = compose::compose(request, &self.config);
        let pages = self.lay_out(&document)?;
        let bytes = PdfWriter::new().write(&pages, &document.metadata, &self.fonts)?;
        log::debug!(
            "Rendered voucher '{}': {} page(s), {} bytes",
            request.trip_id,
            pages.len(),
            bytes.len()
        );

        Ok(RenderedVoucher {
            stream: Cursor::new(bytes),
            filename: DOWNLOAD_FILENAME,
            page_count: pages.len(),
        })
    }

    fn lay_out(&self, document: &Document) -> Result<Vec<LayoutPage>, VoucherError> {
        let decorator = VoucherDecorator::new(
            &self.config.content,
            &self.config.styles.palette,
            self.logo.image()?,
        );
        self.engine.layout(document, &self.fonts, &decorator)
    }

    /// Adapt a form map with the configured list policy, then render it.
    pub fn render_form(&self, form: &FormFields) -> Result<RenderedVoucher, VoucherError> {
        let request = VoucherRequest::from_form(form, self.config.list_policy)?;
        self.render(&request)
    }
}

/// A finished voucher, ready to be sent as a download.
#[derive(Debug, Clone)]
pub struct RenderedVoucher {
    /// The PDF bytes, positioned at the start.
    pub stream: Cursor<Vec<u8>>,
    pub filename: &'static str,
    pub page_count: usize,
}

impl RenderedVoucher {
    pub fn bytes(&self) -> &[u8] {
        self.stream.get_ref()
    }

    pub fn into_stream(self) -> Cursor<Vec<u8>> {
        self.stream
    }

    pub fn content_type(&self) -> &'static str {
        "application/pdf"
    }

    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.filename)
    }
}
