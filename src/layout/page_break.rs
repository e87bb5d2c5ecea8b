//! # Page Break Decisions
//!
//! Whether a block (a paragraph's lines, a heading box, a table row) goes on
//! the current page, moves to the next one, or is split between lines.

/// Tolerance for comparing accumulated point values.
pub const EPSILON: f64 = 1e-6;

/// Decide what to do when a block doesn't fit on the current page.
#[derive(Debug, Clone, PartialEq)]
pub enum BreakDecision {
    /// Place the entire block on the current page.
    Place,
    /// Move the entire block to the next page.
    MoveToNextPage,
    /// Place the block even though it does not fit: it is already at the top
    /// of an empty page and would not fit on any page.
    Overflow,
    /// Split the block: place some lines here, continue on the next page.
    Split {
        /// How many lines fit on the current page.
        items_on_current_page: usize,
    },
}

/// Orphan/widow limits for splitting a paragraph between pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineLimits {
    pub min_orphan_lines: usize,
    pub min_widow_lines: usize,
}

impl Default for LineLimits {
    fn default() -> Self {
        Self {
            min_orphan_lines: 2,
            min_widow_lines: 2,
        }
    }
}

/// Given the remaining space on a page and the heights of a block's lines,
/// decide how to break.
///
/// `at_page_top` is true when nothing has been placed on the page yet; a
/// block that does not fit there is never moved again.
pub fn decide_break(
    remaining_height: f64,
    item_heights: &[f64],
    is_breakable: bool,
    limits: LineLimits,
    at_page_top: bool,
) -> BreakDecision {
    let total: f64 = item_heights.iter().sum();

    if total <= remaining_height + EPSILON {
        return BreakDecision::Place;
    }

    if !is_breakable || item_heights.len() < 2 {
        return if at_page_top {
            BreakDecision::Overflow
        } else {
            BreakDecision::MoveToNextPage
        };
    }

    let mut running = 0.0;
    let mut fit_count = 0;
    for &h in item_heights {
        if running + h > remaining_height + EPSILON {
            break;
        }
        running += h;
        fit_count += 1;
    }

    if at_page_top {
        // Nothing better is available on a later page: take what fits.
        return BreakDecision::Split {
            items_on_current_page: fit_count.max(1),
        };
    }

    let total_items = item_heights.len();

    if fit_count == 0 || fit_count < limits.min_orphan_lines {
        return BreakDecision::MoveToNextPage;
    }

    let remaining_items = total_items - fit_count;
    if remaining_items < limits.min_widow_lines {
        let adjusted = fit_count.saturating_sub(limits.min_widow_lines - remaining_items);
        if adjusted == 0 || adjusted < limits.min_orphan_lines {
            return BreakDecision::MoveToNextPage;
        }
        return BreakDecision::Split {
            items_on_current_page: adjusted,
        };
    }

    BreakDecision::Split {
        items_on_current_page: fit_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMITS: LineLimits = LineLimits {
        min_orphan_lines: 2,
        min_widow_lines: 2,
    };

    #[test]
    fn everything_fits() {
        let decision = decide_break(100.0, &[20.0, 30.0, 40.0], true, LIMITS, false);
        assert_eq!(decision, BreakDecision::Place);
    }

    #[test]
    fn rounding_error_still_fits() {
        let row = 0.1 + 0.2 + 19.7;
        let decision = decide_break(20.0 - 1e-9, &[row], false, LIMITS, false);
        assert_eq!(decision, BreakDecision::Place);
    }

    #[test]
    fn unbreakable_moves() {
        let decision = decide_break(50.0, &[20.0, 30.0, 40.0], false, LIMITS, false);
        assert_eq!(decision, BreakDecision::MoveToNextPage);
    }

    #[test]
    fn unbreakable_at_page_top_overflows() {
        let decision = decide_break(50.0, &[90.0], false, LIMITS, true);
        assert_eq!(decision, BreakDecision::Overflow);
    }

    #[test]
    fn split_at_right_point() {
        let limits = LineLimits {
            min_orphan_lines: 1,
            min_widow_lines: 1,
        };
        let decision = decide_break(55.0, &[20.0, 30.0, 40.0], true, limits, false);
        assert_eq!(
            decision,
            BreakDecision::Split {
                items_on_current_page: 2,
            }
        );
    }

    #[test]
    fn orphan_control() {
        // Only 1 line would fit, but min_orphan is 2: move everything
        let decision = decide_break(25.0, &[20.0, 30.0, 40.0], true, LIMITS, false);
        assert_eq!(decision, BreakDecision::MoveToNextPage);
    }

    #[test]
    fn widow_control() {
        // 3 of 4 fit, leaving 1 widow (min=2): pull one back
        let decision = decide_break(70.0, &[20.0, 20.0, 20.0, 20.0], true, LIMITS, false);
        assert_eq!(
            decision,
            BreakDecision::Split {
                items_on_current_page: 2,
            }
        );
    }

    #[test]
    fn page_top_split_ignores_limits() {
        let decision = decide_break(25.0, &[20.0, 20.0, 20.0], true, LIMITS, true);
        assert_eq!(
            decision,
            BreakDecision::Split {
                items_on_current_page: 1,
            }
        );
    }
}
