//! # Text Layout
//!
//! Greedy line breaking of styled text. Break opportunities come from
//! UAX #14; a word wider than the available width is broken between
//! characters so no line ever overflows its box.

use crate::font::FontContext;
use unicode_linebreak::{linebreaks, BreakOpportunity};

/// A styled character for multi-style line breaking.
#[derive(Debug, Clone, PartialEq)]
pub struct StyledChar {
    pub ch: char,
    pub font_family: String,
    pub font_size: f64,
    pub font_weight: u32,
}

/// A line of text from multi-style (runs) line breaking.
#[derive(Debug, Clone)]
pub struct RunBrokenLine {
    pub chars: Vec<StyledChar>,
    /// X position of each character relative to line start.
    pub char_positions: Vec<f64>,
    /// Width of the line without trailing spaces.
    pub width: f64,
}

impl RunBrokenLine {
    pub fn text(&self) -> String {
        self.chars.iter().map(|sc| sc.ch).collect()
    }
}

fn is_newline(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

/// Fold the line-ending and tab variants found in form input into `\n` and
/// spaces.
pub fn normalize_whitespace(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n").replace('\t', " ")
}

/// Compute UAX#14 break opportunities indexed by char position.
///
/// Returns a vec of length `text.chars().count()`. Each entry is the break
/// opportunity *before* that character position. Index 0 is always `None`.
fn compute_break_opportunities(text: &str) -> Vec<Option<BreakOpportunity>> {
    let char_count = text.chars().count();
    let mut result = vec![None; char_count];

    let mut byte_to_char = vec![0usize; text.len() + 1];
    for (char_idx, (byte_idx, _)) in text.char_indices().enumerate() {
        byte_to_char[byte_idx] = char_idx;
    }
    byte_to_char[text.len()] = char_count;

    for (byte_offset, opp) in linebreaks(text) {
        let char_idx = byte_to_char[byte_offset];
        // The break at the end of the text is implicit.
        if char_idx < char_count {
            result[char_idx] = Some(opp);
        }
    }

    result
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TextLayout;

impl TextLayout {
    pub fn new() -> Self {
        Self
    }

    /// Break multi-style text (runs) into lines that fit within `max_width`.
    ///
    /// Always returns at least one line; empty input yields one empty line.
    pub fn break_runs_into_lines(
        &self,
        font_context: &FontContext,
        chars: &[StyledChar],
        max_width: f64,
    ) -> Vec<RunBrokenLine> {
        if chars.is_empty() {
            return vec![self.make_run_line(&[], &[])];
        }

        let char_widths: Vec<f64> = chars
            .iter()
            .map(|sc| {
                if is_newline(sc.ch) {
                    0.0
                } else {
                    font_context.char_width(sc.ch, &sc.font_family, sc.font_weight, sc.font_size)
                }
            })
            .collect();

        let plain_text: String = chars.iter().map(|sc| sc.ch).collect();
        let break_opps = compute_break_opportunities(&plain_text);

        let mut lines = Vec::new();
        let mut line_start = 0;
        let mut line_width = 0.0;
        // Char index a line may start at (break before it).
        let mut last_break_point: Option<usize> = None;

        for (i, sc) in chars.iter().enumerate() {
            match break_opps[i] {
                Some(BreakOpportunity::Mandatory) => {
                    lines.push(
                        self.make_run_line(&chars[line_start..i], &char_widths[line_start..i]),
                    );
                    line_start = i;
                    line_width = 0.0;
                    last_break_point = None;
                }
                Some(BreakOpportunity::Allowed) => last_break_point = Some(i),
                None => {}
            }

            if is_newline(sc.ch) {
                continue;
            }

            let char_width = char_widths[i];

            // Spaces may hang past the edge; they are trimmed from the line.
            if line_width + char_width > max_width && line_start < i && sc.ch != ' ' {
                let break_at = match last_break_point {
                    Some(bp) if bp > line_start => bp,
                    // No opportunity on this line: break between characters.
                    _ => i,
                };
                lines.push(self.make_run_line(
                    &chars[line_start..break_at],
                    &char_widths[line_start..break_at],
                ));
                line_start = break_at;
                line_width = char_widths[break_at..=i].iter().sum();
                last_break_point = None;

                // The carried word alone may still be wider than the line.
                while line_width > max_width && line_start < i {
                    let mut end = line_start;
                    let mut fitted = 0.0;
                    while end < i && fitted + char_widths[end] <= max_width {
                        fitted += char_widths[end];
                        end += 1;
                    }
                    let end = end.max(line_start + 1);
                    lines.push(
                        self.make_run_line(&chars[line_start..end], &char_widths[line_start..end]),
                    );
                    line_start = end;
                    line_width = char_widths[line_start..=i].iter().sum();
                }
                continue;
            }

            line_width += char_width;
        }

        lines.push(self.make_run_line(&chars[line_start..], &char_widths[line_start..]));
        lines
    }

    fn make_run_line(&self, chars: &[StyledChar], widths: &[f64]) -> RunBrokenLine {
        let mut kept: Vec<(&StyledChar, f64)> = chars
            .iter()
            .zip(widths.iter().copied())
            .filter(|(sc, _)| !is_newline(sc.ch))
            .collect();
        while kept.last().is_some_and(|(sc, _)| sc.ch == ' ') {
            kept.pop();
        }

        let mut positions = Vec::with_capacity(kept.len());
        let mut x = 0.0;
        for (_, w) in &kept {
            positions.push(x);
            x += w;
        }

        RunBrokenLine {
            chars: kept.into_iter().map(|(sc, _)| sc.clone()).collect(),
            char_positions: positions,
            width: x,
        }
    }
}
