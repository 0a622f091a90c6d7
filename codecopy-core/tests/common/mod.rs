//! Shared helpers for the integration tests.

use codecopy_core::dom::{children, text_content};
use codecopy_core::{
    HighlightError, HighlightService, Highlighter, HighlightingSettings, LanguageRegistry,
    RecordingNotifier,
};
use markup5ever_rcdom::Handle;

/// Escapes code without adding any markup. Knows every language.
pub struct EscapingHighlighter;

impl Highlighter for EscapingHighlighter {
    fn has_language(&self, _language: &str) -> bool {
        true
    }

    fn highlight(&self, code: &str, _language: &str) -> Result<String, HighlightError> {
        Ok(html_escape::encode_text(code).into_owned())
    }
}

pub fn service(
    settings: HighlightingSettings,
    notifier: &RecordingNotifier,
) -> HighlightService<EscapingHighlighter, &RecordingNotifier> {
    HighlightService::with_parts(EscapingHighlighter, LanguageRegistry::with_defaults(), notifier)
        .with_settings(settings)
}

/// Text of every inline node, grouped by paragraph.
pub fn paragraph_texts(container: &Handle) -> Vec<Vec<String>> {
    children(container)
        .iter()
        .map(|p| children(p).iter().map(text_content).collect())
        .collect()
}
