//! Character sanitization for pasted source and copied markup.
//!
//! Input is normalized through a substitution table (typographic quotes and
//! dashes, invisible characters), optionally has German umlauts folded to
//! ASCII, loses every remaining non-portable character and is trimmed of
//! blank lines at both ends.

use crate::common::chars::MARKER;
use crate::common::patterns::{BLANK_EDGES, NON_PORTABLE};
use std::borrow::Cow;

/// Substitutions applied to pasted source before anything else.
pub const INPUT_SUBSTITUTIONS: &[(char, &str)] = &[
    ('\u{00A0}', " "),
    ('\u{000B}', "\n"),
    ('\u{00AD}', ""),
    ('\u{200B}', ""),
    ('\u{2013}', "-"),
    ('\u{2014}', "-"),
    ('\u{2018}', "'"),
    ('\u{2019}', "'"),
    ('\u{201A}', "'"),
    ('\u{201B}', "'"),
    ('\u{2039}', "'"),
    ('\u{203A}', "'"),
    ('\u{2032}', "'"),
    ('\u{2035}', "'"),
    ('\u{201C}', "\""),
    ('\u{201D}', "\""),
    ('\u{201E}', "\""),
    ('\u{201F}', "\""),
    ('\u{00AB}', "\""),
    ('\u{00BB}', "\""),
    ('\u{2033}', "\""),
    ('\u{2034}', "\""),
    ('\u{2036}', "\""),
    ('\u{2037}', "\""),
];

/// Substitutions applied to the copied HTML.
pub const OUTPUT_SUBSTITUTIONS: &[(char, &str)] = &[(MARKER, "")];

pub const UMLAUT_SUBSTITUTIONS: &[(char, &str)] = &[
    ('Ä', "AE"),
    ('ä', "ae"),
    ('Ö', "OE"),
    ('ö', "oe"),
    ('Ü', "UE"),
    ('ü', "ue"),
    ('ẞ', "SS"),
    ('ß', "ss"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SanitizeOptions {
    pub fold_umlauts: bool,
}

impl Default for SanitizeOptions {
    fn default() -> Self {
        SanitizeOptions { fold_umlauts: true }
    }
}

/// Replace every character found in `table`. Borrows when nothing matches.
pub fn substitute<'a>(text: &'a str, table: &[(char, &str)]) -> Cow<'a, str> {
    let lookup = |ch: char| table.iter().find(|(from, _)| *from == ch).map(|(_, to)| *to);
    if !text.chars().any(|ch| lookup(ch).is_some()) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match lookup(ch) {
            Some(replacement) => out.push_str(replacement),
            None => out.push(ch),
        }
    }
    Cow::Owned(out)
}

/// Normalize pasted source code for highlighting.
pub fn sanitize_input(code: &str, options: SanitizeOptions) -> String {
    let substituted = substitute(code, INPUT_SUBSTITUTIONS);
    let folded = if options.fold_umlauts {
        Cow::Owned(substitute(&substituted, UMLAUT_SUBSTITUTIONS).into_owned())
    } else {
        substituted
    };
    let portable = NON_PORTABLE.replace_all(&folded, "");
    BLANK_EDGES.replace_all(&portable, "").into_owned()
}

/// Clean the serialized HTML before it is written to the clipboard.
pub fn sanitize_output(html: &str) -> String {
    substitute(html, OUTPUT_SUBSTITUTIONS).into_owned()
}
