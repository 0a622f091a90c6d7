//! Reserved and special characters used across the copy pipeline.

/// Placeholder for one unit of leading indentation (U+001F, unit separator).
///
/// Input sanitization strips every control character below U+0020 other than
/// newline and tab, so this character never occurs in sanitized source.
pub const MARKER: char = '\u{1F}';

pub const NON_BREAKING_SPACE: char = '\u{A0}';
pub const SPACE: char = ' ';
pub const TAB: char = '\t';
pub const NEWLINE: char = '\n';

pub const SPAN_TAG: &str = "span";
pub const PARAGRAPH_TAG: &str = "p";
pub const STYLE_ATTRIBUTE: &str = "style";
