//! Advance widths of the standard PDF fonts the voucher uses.
//!
//! Widths are in 1/1000 em, taken from the Adobe Core 14 AFM files.

/// Width table for one standard font.
pub struct StandardFontMetrics {
    /// Widths for U+0020..=U+007E.
    ascii: Option<&'static [u16; 95]>,
    /// Widths for U+00A0..=U+00FF.
    latin1: Option<&'static [u16; 96]>,
    default_width: u16,
    extra: fn(char) -> Option<u16>,
}

impl StandardFontMetrics {
    pub(crate) const HELVETICA: StandardFontMetrics = StandardFontMetrics {
        ascii: Some(&HELVETICA_ASCII),
        latin1: Some(&HELVETICA_LATIN1),
        default_width: 556,
        extra: helvetica_punctuation,
    };

    pub(crate) const HELVETICA_BOLD: StandardFontMetrics = StandardFontMetrics {
        ascii: Some(&HELVETICA_BOLD_ASCII),
        latin1: Some(&HELVETICA_BOLD_LATIN1),
        default_width: 611,
        extra: helvetica_bold_punctuation,
    };

    pub(crate) const ZAPF_DINGBATS: StandardFontMetrics = StandardFontMetrics {
        ascii: None,
        latin1: None,
        default_width: 788,
        extra: dingbat_width,
    };

    /// Width of `ch` in 1/1000 em.
    pub fn glyph_width(&self, ch: char) -> u16 {
        let cp = ch as u32;
        if let Some(table) = self.ascii {
            if (0x20..=0x7E).contains(&cp) {
                return table[(cp - 0x20) as usize];
            }
        }
        if let Some(table) = self.latin1 {
            if (0xA0..=0xFF).contains(&cp) {
                return table[(cp - 0xA0) as usize];
            }
        }
        (self.extra)(ch).unwrap_or(self.default_width)
    }

    /// Advance width of `ch` in points.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        self.glyph_width(ch) as f64 / 1000.0 * font_size
    }

    pub fn measure_string(&self, text: &str, font_size: f64) -> f64 {
        text.chars().map(|ch| self.char_width(ch, font_size)).sum()
    }
}

fn helvetica_punctuation(ch: char) -> Option<u16> {
    match ch {
        '\u{2022}' => Some(350),
        '\u{2013}' => Some(556),
        '\u{2014}' => Some(1000),
        '\u{2018}' | '\u{2019}' | '\u{201A}' => Some(222),
        '\u{201C}' | '\u{201D}' | '\u{201E}' => Some(333),
        '\u{2026}' => Some(1000),
        '\u{20AC}' => Some(556),
        '\u{2122}' => Some(1000),
        _ => None,
    }
}

fn helvetica_bold_punctuation(ch: char) -> Option<u16> {
    match ch {
        '\u{2022}' => Some(350),
        '\u{2013}' => Some(556),
        '\u{2014}' => Some(1000),
        '\u{2018}' | '\u{2019}' | '\u{201A}' => Some(278),
        '\u{201C}' | '\u{201D}' | '\u{201E}' => Some(500),
        '\u{2026}' => Some(1000),
        '\u{20AC}' => Some(556),
        '\u{2122}' => Some(1000),
        _ => None,
    }
}

/// ZapfDingbats is addressed through its built-in encoding, so the widths are
/// keyed by the ASCII code that selects each glyph.
fn dingbat_width(ch: char) -> Option<u16> {
    match ch {
        ' ' => Some(278),
        '3' => Some(755),
        '4' => Some(761),
        '5' => Some(761),
        'l' => Some(791),
        'n' => Some(761),
        'u' => Some(759),
        _ => None,
    }
}

#[rustfmt::skip]
const HELVETICA_ASCII: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0..?
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // P.._
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // `..o
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,      // p..~
];

#[rustfmt::skip]
const HELVETICA_BOLD_ASCII: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

#[rustfmt::skip]
const HELVETICA_LATIN1: [u16; 96] = [
    278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333, // A0..AF
    400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611, // B0..BF
    667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278, // C0..CF
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611, // D0..DF
    556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278, // E0..EF
    556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500, // F0..FF
];

#[rustfmt::skip]
const HELVETICA_BOLD_LATIN1: [u16; 96] = [
    278, 333, 556, 556, 556, 556, 280, 556, 333, 737, 370, 556, 584, 333, 737, 333,
    400, 584, 333, 333, 333, 611, 556, 278, 333, 333, 365, 556, 834, 834, 834, 611,
    722, 722, 722, 722, 722, 722, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
    556, 556, 556, 556, 556, 556, 889, 556, 556, 556, 556, 556, 278, 278, 278, 278,
    611, 611, 611, 611, 611, 611, 611, 584, 611, 611, 611, 611, 611, 556, 611, 556,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helvetica_known_widths() {
        let m = StandardFontMetrics::HELVETICA;
        assert_eq!(m.glyph_width(' '), 278);
        assert_eq!(m.glyph_width('a'), 556);
        assert_eq!(m.glyph_width('i'), 222);
        assert_eq!(m.glyph_width('m'), 833);
        assert_eq!(m.glyph_width('W'), 944);
        assert_eq!(m.glyph_width('~'), 584);
        assert_eq!(m.glyph_width('é'), 556);
    }

    #[test]
    fn bold_known_widths() {
        let m = StandardFontMetrics::HELVETICA_BOLD;
        assert_eq!(m.glyph_width('b'), 611);
        assert_eq!(m.glyph_width('A'), 722);
        assert_eq!(m.glyph_width('~'), 584);
    }

    #[test]
    fn dingbat_check_mark() {
        let m = StandardFontMetrics::ZAPF_DINGBATS;
        assert_eq!(m.glyph_width('3'), 755);
        assert!((m.char_width('3', 10.0) - 7.55).abs() < 1e-9);
    }
}
