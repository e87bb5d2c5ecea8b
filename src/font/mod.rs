//! # Font Management
//!
//! The voucher draws only with standard PDF fonts, which viewers supply
//! themselves, so nothing is embedded. This module maps a family/weight pair
//! to one of those fonts, measures text with its metrics and encodes
//! characters into the font's single-byte encoding.

pub mod metrics;

pub use metrics::StandardFontMetrics;
use std::collections::HashMap;

/// Standard PDF fonts the renderer can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    ZapfDingbats,
}

impl StandardFont {
    /// The PDF name for this font.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
            Self::ZapfDingbats => "ZapfDingbats",
        }
    }

    pub fn metrics(&self) -> &'static StandardFontMetrics {
        match self {
            Self::Helvetica => &StandardFontMetrics::HELVETICA,
            Self::HelveticaBold => &StandardFontMetrics::HELVETICA_BOLD,
            Self::ZapfDingbats => &StandardFontMetrics::ZAPF_DINGBATS,
        }
    }

    /// Symbolic fonts use their built-in encoding; text fonts use WinAnsi.
    pub fn is_symbolic(&self) -> bool {
        matches!(self, Self::ZapfDingbats)
    }

    /// Encode `ch` as the byte that selects its glyph, or `None` when the
    /// font has no glyph for it.
    pub fn encode(&self, ch: char) -> Option<u8> {
        if self.is_symbolic() {
            let cp = ch as u32;
            return (0x20..=0x7E).contains(&cp).then_some(cp as u8);
        }
        unicode_to_winansi(ch)
    }
}

#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct FontKey {
    pub family: String,
    pub weight: u32,
}

impl FontKey {
    /// Key with the weight snapped to regular (400) or bold (700).
    pub fn snapped(family: &str, weight: u32) -> Self {
        Self {
            family: family.to_string(),
            weight: snap_weight(weight),
        }
    }
}

fn snap_weight(weight: u32) -> u32 {
    if weight >= 600 {
        700
    } else {
        400
    }
}

/// Maps font family + weight to a standard font.
pub struct FontRegistry {
    fonts: HashMap<FontKey, StandardFont>,
}

impl Default for FontRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FontRegistry {
    pub fn new() -> Self {
        let standard_mappings = [
            (("Helvetica", 400), StandardFont::Helvetica),
            (("Helvetica", 700), StandardFont::HelveticaBold),
            (("ZapfDingbats", 400), StandardFont::ZapfDingbats),
            (("ZapfDingbats", 700), StandardFont::ZapfDingbats),
        ];

        let fonts = standard_mappings
            .into_iter()
            .map(|((family, weight), font)| {
                (
                    FontKey {
                        family: family.to_string(),
                        weight,
                    },
                    font,
                )
            })
            .collect();

        Self { fonts }
    }

    /// Look up a font, falling back to Helvetica if not found.
    pub fn resolve(&self, family: &str, weight: u32) -> StandardFont {
        let key = FontKey::snapped(family, weight);
        if let Some(font) = self.fonts.get(&key) {
            return *font;
        }
        if key.weight == 700 {
            StandardFont::HelveticaBold
        } else {
            StandardFont::Helvetica
        }
    }
}

/// Shared font context used by layout and PDF serialization.
#[derive(Default)]
pub struct FontContext {
    registry: FontRegistry,
}

impl FontContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the advance width of a single character in points.
    pub fn char_width(&self, ch: char, family: &str, weight: u32, font_size: f64) -> f64 {
        self.registry
            .resolve(family, weight)
            .metrics()
            .char_width(ch, font_size)
    }

    /// Measure the width of a string in points.
    pub fn measure_string(&self, text: &str, family: &str, weight: u32, font_size: f64) -> f64 {
        self.registry
            .resolve(family, weight)
            .metrics()
            .measure_string(text, font_size)
    }

    pub fn resolve(&self, family: &str, weight: u32) -> StandardFont {
        self.registry.resolve(family, weight)
    }
}

/// Map a Unicode codepoint to a WinAnsiEncoding byte value.
///
/// WinAnsiEncoding is based on Windows-1252. Most codepoints in
/// 0x20..=0x7E and 0xA0..=0xFF map directly. The 0x80..=0x9F range
/// contains special mappings for smart quotes, bullets, dashes, etc.
pub fn unicode_to_winansi(ch: char) -> Option<u8> {
    let cp = ch as u32;
    if (0x20..=0x7E).contains(&cp) || (0xA0..=0xFF).contains(&cp) {
        return Some(cp as u8);
    }
    match cp {
        0x20AC => Some(0x80), // Euro sign
        0x201A => Some(0x82), // Single low-9 quotation mark
        0x0192 => Some(0x83), // Latin small letter f with hook
        0x201E => Some(0x84), // Double low-9 quotation mark
        0x2026 => Some(0x85), // Horizontal ellipsis
        0x2020 => Some(0x86), // Dagger
        0x2021 => Some(0x87), // Double dagger
        0x02C6 => Some(0x88), // Modifier letter circumflex accent
        0x2030 => Some(0x89), // Per mille sign
        0x0160 => Some(0x8A), // Latin capital letter S with caron
        0x2039 => Some(0x8B), // Single left-pointing angle quotation
        0x0152 => Some(0x8C), // Latin capital ligature OE
        0x017D => Some(0x8E), // Latin capital letter Z with caron
        0x2018 => Some(0x91), // Left single quotation mark
        0x2019 => Some(0x92), // Right single quotation mark
        0x201C => Some(0x93), // Left double quotation mark
        0x201D => Some(0x94), // Right double quotation mark
        0x2022 => Some(0x95), // Bullet
        0x2013 => Some(0x96), // En dash
        0x2014 => Some(0x97), // Em dash
        0x02DC => Some(0x98), // Small tilde
        0x2122 => Some(0x99), // Trade mark sign
        0x0161 => Some(0x9A), // Latin small letter s with caron
        0x203A => Some(0x9B), // Single right-pointing angle quotation
        0x0153 => Some(0x9C), // Latin small ligature oe
        0x017E => Some(0x9E), // Latin small letter z with caron
        0x0178 => Some(0x9F), // Latin capital letter Y with diaeresis
        _ => None,
    }
}
