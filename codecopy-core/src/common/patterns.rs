//! Regular expressions shared by the codec, the collector and the sanitizer.

use once_cell::sync::Lazy;
use regex::Regex;

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|err| panic!("invalid built-in pattern {pattern:?}: {err}"))
}

/// Leading run of spaces, non-breaking spaces and tabs on every line.
pub static INDENTATION: Lazy<Regex> = Lazy::new(|| compile(r"(?m)^[ \x{A0}\t]+"));

/// Line separator, tolerating carriage returns.
pub static NEWLINE: Lazy<Regex> = Lazy::new(|| compile(r"\r?\n"));

/// Any run of indentation markers.
pub static MARKER_RUN: Lazy<Regex> = Lazy::new(|| compile(r"\x{1F}+"));

/// Run of markers at the start of a chunk.
pub static LEADING_MARKERS: Lazy<Regex> = Lazy::new(|| compile(r"^\x{1F}+"));

/// Rendered line-number prefix: optional padding, digits, a period and one space.
pub static LINE_NUMBER_PREFIX: Lazy<Regex> = Lazy::new(|| compile(r"^[ \x{A0}]*\d+\. "));

/// Characters that do not survive a trip through most paste targets.
pub static NON_PORTABLE: Lazy<Regex> = Lazy::new(|| compile(r"[^\x20-\x7E\n\x{A0}\t]"));

/// Blank lines at the very start or very end of the input.
pub static BLANK_EDGES: Lazy<Regex> = Lazy::new(|| compile(r"\A\s*\n+|\n+\s*\z"));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indentation_matches_each_line() {
        let found: Vec<_> = INDENTATION
            .find_iter("  a\n\tb\nc  d")
            .map(|m| m.as_str())
            .collect();
        assert_eq!(found, vec!["  ", "\t"]);
    }

    #[test]
    fn test_line_number_prefix_requires_space() {
        assert!(LINE_NUMBER_PREFIX.is_match("  3. foo"));
        assert!(LINE_NUMBER_PREFIX.is_match("12. "));
        assert!(!LINE_NUMBER_PREFIX.is_match("3.foo"));
        assert!(!LINE_NUMBER_PREFIX.is_match("x 1. foo"));
    }

    #[test]
    fn test_blank_edges() {
        assert_eq!(BLANK_EDGES.replace_all("\n\n  a\nb\n\n", ""), "  a\nb");
    }
}
