//! Renderer configuration.
//!
//! Everything a render reads besides the request itself: static content,
//! styles, page geometry and the form list policy. Built once at startup and
//! handed to [`crate::VoucherRenderer::new`]; never mutated afterwards.

use std::path::PathBuf;

use crate::model::PageConfig;
use crate::style::Stylesheet;
use crate::voucher::{ListPolicy, StaticContent};

/// Suggested download name of the rendered voucher.
pub const DOWNLOAD_FILENAME: &str = "TravelVoucher.pdf";

#[derive(Debug, Clone, Default)]
pub struct VoucherConfig {
    pub content: StaticContent,
    pub styles: Stylesheet,
    pub page: PageConfig,
    pub list_policy: ListPolicy,
    /// Print the help-line contact above the address footer.
    pub show_helpline: bool,
}

impl VoucherConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_logo_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.content.logo_path = path.into();
        self
    }

    pub fn with_list_policy(mut self, policy: ListPolicy) -> Self {
        self.list_policy = policy;
        self
    }

    pub fn with_helpline(mut self, show: bool) -> Self {
        self.show_helpline = show;
        self
    }

    pub fn with_page(mut self, page: PageConfig) -> Self {
        self.page = page;
        self
    }
}
