//! Rendered line numbers for highlighted output.
//!
//! Numbers are prepended as `<span class="token comment line-number">` elements in
//! the fixed `"<digits>. "` format, padded with leading spaces to the width of
//! the largest number so the code column stays aligned.

use crate::common::patterns::NEWLINE;
use crate::office::px_to_point;

pub const LINE_NUMBER_CLASS: &str = "token comment line-number";

/// Default advance width of one monospace character in CSS pixels.
pub const DEFAULT_CHAR_WIDTH_PX: f64 = 7.8;

fn digit_count(mut n: usize) -> usize {
    let mut digits = 1;
    while n >= 10 {
        n /= 10;
        digits += 1;
    }
    digits
}

/// The prefix for line `number` out of `total` lines, e.g. `" 7. "`.
pub fn format_line_number(number: usize, total: usize) -> String {
    let width = digit_count(total);
    format!("{number:>width$}. ")
}

/// Prefix every line of `highlighted_html` with its line number.
pub fn prepend_line_numbers(highlighted_html: &str) -> String {
    let lines: Vec<&str> = NEWLINE.split(highlighted_html).collect();
    let total = lines.len();
    lines
        .iter()
        .enumerate()
        .map(|(idx, line)| {
            format!(
                "<span class=\"{LINE_NUMBER_CLASS}\">{}</span>{line}",
                format_line_number(idx + 1, total)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Rendered width in pixels of the line-number column for `line_count` lines.
pub fn line_number_column_width_px(line_count: usize, char_width_px: f64) -> f64 {
    // digits plus the period and the trailing space
    (digit_count(line_count) + 2) as f64 * char_width_px
}

/// Tab-stop offset in points for the line-number column.
pub fn line_number_offset_pt(line_count: usize, char_width_px: f64) -> f64 {
    px_to_point(line_number_column_width_px(line_count, char_width_px))
}
