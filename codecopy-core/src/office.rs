//! Rich-text layout helpers for word-processor paste targets.
//!
//! Office applications ignore stylesheets, collapse whitespace and place tabs
//! at absolute stops. The `mso-*` declarations and tab-stop lists produced
//! here keep pasted code aligned.

use crate::common::chars::NON_BREAKING_SPACE;
use crate::dom::{append_inline_style, create_span_with_text};
use markup5ever_rcdom::Handle;

/// Points per centimeter.
pub const POINTS_PER_CM: f64 = 28.3465;

pub fn px_to_point(px: f64) -> f64 {
    px * (96.0 / 72.0)
}

pub fn cm_to_point(cm: f64) -> f64 {
    cm * POINTS_PER_CM
}

/// Positions in points of `count` left tab stops one centimeter apart,
/// shifted right by `offset_pt`.
pub fn tab_stop_positions(count: usize, offset_pt: f64) -> Vec<f64> {
    (1..=count)
        .map(|i| offset_pt + cm_to_point(i as f64))
        .collect()
}

/// `tab-stops` declaration for `count` stops, or an empty string when
/// `count` is zero.
pub fn tab_stops(count: usize, offset_pt: f64) -> String {
    if count == 0 {
        return String::new();
    }
    let stops = tab_stop_positions(count, offset_pt)
        .iter()
        .map(|pt| format!("left {pt:.2}pt"))
        .collect::<Vec<_>>()
        .join(" ");
    format!("tab-stops:{stops};")
}

pub fn apply_no_margin_style(element: &Handle) {
    append_inline_style(element, "margin:0cm;");
}

/// Keep runs of spaces from being collapsed on paste.
pub fn preserve_white_space(element: &Handle) {
    append_inline_style(element, "mso-spacerun:yes");
}

/// Mark `element` as standing for `tab_count` tab characters.
pub fn apply_tab_spacing(element: &Handle, tab_count: usize) {
    append_inline_style(element, &format!("mso-tab-count:{tab_count}"));
}

/// Placeholder content for a blank line.
pub fn create_empty_line_span() -> Handle {
    let span = create_span_with_text(&NON_BREAKING_SPACE.to_string());
    preserve_white_space(&span);
    span
}
