//! Structured error types for the voucher renderer.
//!
//! Input problems (malformed JSON, unequal parallel form arrays) are kept
//! apart from composition failures (logo, layout, PDF encoding) so a caller
//! can map the first group to a client error and the second to a server one.

use thiserror::Error;

/// The unified error type returned by all public API functions.
#[derive(Debug, Error)]
pub enum VoucherError {
    /// JSON input failed to parse as a form map.
    #[error("Failed to parse form data: {source}{}", format_hint(.hint))]
    Parse {
        #[source]
        source: serde_json::Error,
        hint: String,
    },

    /// Parallel form arrays for one section have different lengths and the
    /// active list policy does not allow reconciling them.
    #[error("Mismatched {section} fields: array lengths {lengths:?}")]
    MismatchedLists {
        section: &'static str,
        lengths: Vec<usize>,
    },

    /// The logo asset exists but could not be read or decoded.
    #[error("Image error: {0}")]
    Image(String),

    /// The document could not be laid out (e.g. a table wider than the page).
    #[error("Layout error: {0}")]
    Layout(String),

    /// PDF composition failed (e.g. a character the page fonts cannot encode).
    #[error("Render error: {0}")]
    Render(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn format_hint(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for VoucherError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "Every form value must be a string or an array of strings.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        VoucherError::Parse { source: e, hint }
    }
}
