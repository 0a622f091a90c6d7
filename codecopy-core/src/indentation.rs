//! Marker codec for leading indentation.
//!
//! Leading whitespace is replaced by [`MARKER`] characters before the text is
//! split into spans, so that indentation can be told apart from ordinary
//! whitespace no matter how the highlighter nested its spans. The markers are
//! later expanded into tabs, spaces or non-breaking spaces.

use crate::common::chars::{MARKER, NON_BREAKING_SPACE, SPACE, TAB};
use crate::common::patterns::{INDENTATION, MARKER_RUN};
use regex::Captures;

/// Replace the leading whitespace of every line with markers.
///
/// Each space or non-breaking space becomes one marker, each tab becomes
/// `tab_size` markers. Whitespace after the first visible character of a line
/// is left untouched.
pub fn mask_indentation(text: &str, tab_size: usize) -> String {
    let tab_size = tab_size.max(1);
    INDENTATION
        .replace_all(text, |caps: &Captures| {
            let mut masked = String::with_capacity(caps[0].len() * tab_size);
            for ch in caps[0].chars() {
                let width = if ch == TAB { tab_size } else { 1 };
                masked.extend(std::iter::repeat(MARKER).take(width));
            }
            masked
        })
        .into_owned()
}

/// Expand markers into tabs, one tab per complete group of `tab_size`
/// markers, with one space for each marker left over.
pub fn unmask_indentation_with_tabs(text: &str, tab_size: usize) -> String {
    let tab_size = tab_size.max(1);
    MARKER_RUN
        .replace_all(text, |caps: &Captures| {
            // MARKER is a single byte in UTF-8.
            let count = caps[0].len();
            let mut expanded = String::with_capacity(count);
            expanded.extend(std::iter::repeat(TAB).take(count / tab_size));
            expanded.extend(std::iter::repeat(SPACE).take(count % tab_size));
            expanded
        })
        .into_owned()
}

/// Expand every marker into one non-breaking space.
pub fn unmask_indentation_with_nbsp(text: &str) -> String {
    text.replace(MARKER, &NON_BREAKING_SPACE.to_string())
}

/// Number of markers at the start of `text`.
pub fn leading_marker_count(text: &str) -> usize {
    text.chars().take_while(|&ch| ch == MARKER).count()
}
