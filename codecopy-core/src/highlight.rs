//! Syntax highlighter collaborator.
//!
//! Highlighting produces class-annotated `<span>` markup; colors come from a
//! theme stylesheet that is resolved separately. [`SyntectHighlighter`] is
//! the bundled implementation.

use crate::error::HighlightError;
use syntect::highlighting::{Color, ThemeSet};
use syntect::html::{css_for_theme_with_class_style, ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

pub const DEFAULT_THEME: &str = "InspiredGitHub";

/// Class carried by the root container so the theme's base rule applies.
pub const CODE_CLASS: &str = "code";

/// A tokenizer turning code into class-annotated HTML.
pub trait Highlighter {
    /// Whether a grammar for `language` is available.
    fn has_language(&self, language: &str) -> bool;

    /// Highlight `code`. The result is HTML-escaped text wrapped in spans.
    fn highlight(&self, code: &str, language: &str) -> Result<String, HighlightError>;
}

pub struct SyntectHighlighter {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
}

impl SyntectHighlighter {
    pub fn new() -> Self {
        SyntectHighlighter {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
        }
    }

    fn find_syntax(&self, language: &str) -> Option<&SyntaxReference> {
        let lang = language.trim().to_ascii_lowercase();
        if matches!(lang.as_str(), "plaintext" | "text" | "txt" | "plain") {
            return Some(self.syntax_set.find_syntax_plain_text());
        }
        // Grammar ids without a bundled syntect syntax of the same name.
        let mapped = match lang.as_str() {
            "markup" | "vue" | "angular" | "markup-templating" => "html",
            "javascript" | "typescript" | "jsx" | "tsx" | "clike" => "js",
            "csharp" => "cs",
            "bash" | "shell" => "sh",
            "scss" => "css",
            "python" => "py",
            "rust" => "rs",
            "ruby" => "rb",
            "haskell" => "hs",
            "markdown" => "md",
            other => other,
        };
        self.syntax_set
            .find_syntax_by_token(mapped)
            .or_else(|| self.syntax_set.find_syntax_by_name(language.trim()))
            .or_else(|| self.syntax_set.find_syntax_by_extension(mapped))
    }

    /// Names of the bundled themes.
    pub fn theme_names(&self) -> Vec<String> {
        self.theme_set.themes.keys().cloned().collect()
    }

    /// Stylesheet for `theme_name`, including a rule for the output container.
    pub fn theme_css(&self, theme_name: &str) -> Result<String, HighlightError> {
        let theme = self
            .theme_set
            .themes
            .get(theme_name)
            .ok_or_else(|| HighlightError::ThemeNotFound(theme_name.to_string()))?;
        let classes = css_for_theme_with_class_style(theme, ClassStyle::Spaced)
            .map_err(|e| HighlightError::Highlighter(e.to_string()))?;

        let mut css = String::from(
            "pre#highlighted-code-wrapper {\n font-family: Consolas, Menlo, monospace;\n font-size: 13px;\n",
        );
        if let Some(background) = theme.settings.background {
            css.push_str(&format!(" background-color: {};\n", css_color(background)));
        }
        if let Some(foreground) = theme.settings.foreground {
            css.push_str(&format!(" color: {};\n", css_color(foreground)));
        }
        css.push_str("}\n\n");
        css.push_str(&classes);
        Ok(css)
    }
}

impl Default for SyntectHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl Highlighter for SyntectHighlighter {
    fn has_language(&self, language: &str) -> bool {
        self.find_syntax(language).is_some()
    }

    fn highlight(&self, code: &str, language: &str) -> Result<String, HighlightError> {
        let syntax = self
            .find_syntax(language)
            .ok_or_else(|| HighlightError::UnknownLanguage(language.to_string()))?;
        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, &self.syntax_set, ClassStyle::Spaced);
        for line in LinesWithEndings::from(code) {
            generator
                .parse_html_for_line_which_includes_newline(line)
                .map_err(|e| HighlightError::Highlighter(e.to_string()))?;
        }
        Ok(generator.finalize())
    }
}

fn css_color(color: Color) -> String {
    if color.a == 0xFF {
        format!("#{:02x}{:02x}{:02x}", color.r, color.g, color.b)
    } else {
        format!(
            "#{:02x}{:02x}{:02x}{:02x}",
            color.r, color.g, color.b, color.a
        )
    }
}
