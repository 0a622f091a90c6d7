//! Highlight and copy orchestration.
//!
//! [`HighlightService`] ties the collaborators together: it sanitizes and
//! highlights source code, renders the result into an output document and
//! turns that document into a clipboard payload. The copy path never panics
//! and never propagates failures to the caller; every outcome is reported
//! through the [`Notifier`] and the returned [`CopyReport`].

use crate::clipboard::{ClipboardPayload, ClipboardSink};
use crate::common::patterns::NEWLINE;
use crate::dom::{deep_clone, parse_html, query_selector, serialize_node, text_content};
use crate::error::CopyError;
use crate::formatter::{format_code, CodeFormatter, FormatOutcome, DEFAULT_PRINT_WIDTH};
use crate::highlight::{Highlighter, CODE_CLASS};
use crate::language::LanguageRegistry;
use crate::line_numbers::{line_number_offset_pt, prepend_line_numbers, DEFAULT_CHAR_WIDTH_PX};
use crate::lines::{CollectorOptions, LinesCollector};
use crate::notify::{LogNotifier, Notification, Notifier};
use crate::sanitize::{sanitize_input, sanitize_output, SanitizeOptions};
use crate::settings::HighlightingSettings;
use crate::style::StyleResolver;
use markup5ever_rcdom::{Handle, RcDom};

pub const CONTAINER_ID: &str = "highlighted-code-wrapper";
pub const CONTAINER_SELECTOR: &str = "pre#highlighted-code-wrapper";
pub const CODE_ELEMENT_CLASS: &str = "highlighted-code";

/// Grammar used when the requested language cannot be loaded.
pub const FALLBACK_LANGUAGE: &str = "plaintext";

/// Highlighted code placed in an owned output document.
pub struct RenderedOutput {
    pub dom: RcDom,
}

impl RenderedOutput {
    pub fn document(&self) -> &Handle {
        &self.dom.document
    }

    /// The `<pre>` container holding the highlighted code.
    pub fn container(&self) -> Option<Handle> {
        query_selector(&self.dom.document, CONTAINER_SELECTOR)
    }

    /// Outer HTML of the container.
    pub fn container_html(&self) -> Result<String, CopyError> {
        let container = self
            .container()
            .ok_or_else(|| CopyError::TargetNotFound(CONTAINER_SELECTOR.to_string()))?;
        serialize_node(&container)
    }
}

/// Outcome of a copy request.
#[derive(Debug, Clone, PartialEq)]
pub enum CopyReport {
    Copied { payload: ClipboardPayload },
    NothingToCopy,
    Failed { error: CopyError },
}

impl CopyReport {
    pub fn is_copied(&self) -> bool {
        matches!(self, CopyReport::Copied { .. })
    }

    pub fn payload(&self) -> Option<&ClipboardPayload> {
        match self {
            CopyReport::Copied { payload } => Some(payload),
            _ => None,
        }
    }
}

pub struct HighlightService<H: Highlighter, N: Notifier = LogNotifier> {
    highlighter: H,
    registry: LanguageRegistry,
    notifier: N,
    settings: HighlightingSettings,
    sanitize: SanitizeOptions,
    char_width_px: f64,
    print_width: usize,
}

impl<H: Highlighter> HighlightService<H, LogNotifier> {
    /// Service with the built-in languages that reports through the log.
    pub fn new(highlighter: H) -> Self {
        Self::with_parts(highlighter, LanguageRegistry::with_defaults(), LogNotifier)
    }
}

impl<H: Highlighter, N: Notifier> HighlightService<H, N> {
    pub fn with_parts(highlighter: H, registry: LanguageRegistry, notifier: N) -> Self {
        HighlightService {
            highlighter,
            registry,
            notifier,
            settings: HighlightingSettings::default(),
            sanitize: SanitizeOptions::default(),
            char_width_px: DEFAULT_CHAR_WIDTH_PX,
            print_width: DEFAULT_PRINT_WIDTH,
        }
    }

    pub fn with_settings(mut self, settings: HighlightingSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_sanitize_options(mut self, options: SanitizeOptions) -> Self {
        self.sanitize = options;
        self
    }

    /// Advance width of one character of the output font, used to size the
    /// line-number column.
    pub fn with_char_width_px(mut self, char_width_px: f64) -> Self {
        self.char_width_px = char_width_px;
        self
    }

    pub fn with_print_width(mut self, print_width: usize) -> Self {
        self.print_width = print_width;
        self
    }

    pub fn settings(&self) -> &HighlightingSettings {
        &self.settings
    }

    pub fn registry(&self) -> &LanguageRegistry {
        &self.registry
    }

    pub fn highlighter(&self) -> &H {
        &self.highlighter
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Make sure a grammar for `language` and its dependencies is available.
    ///
    /// Returns the grammar to highlight with, which is the plain-text grammar
    /// when the language cannot be loaded. Problems are notified, never
    /// returned.
    pub fn ensure_language_loaded(&self, language: &str) -> String {
        let Some(definition) = self.registry.get(language) else {
            if self.highlighter.has_language(language) {
                return language.to_string();
            }
            self.notifier
                .notify(Notification::language_load_failed(language));
            return FALLBACK_LANGUAGE.to_string();
        };

        let order = self.registry.resolve_load_order(&definition.id);
        for (dependency, required_by) in &order.missing {
            self.notifier
                .notify(Notification::missing_dependency(dependency, required_by));
        }
        log::debug!("load order for '{}': {:?}", definition.id, order.languages);

        for id in &order.languages {
            if !self.highlighter.has_language(id) && *id != definition.id {
                log::debug!("no grammar for dependency '{id}' of '{}'", definition.id);
            }
        }
        if self.highlighter.has_language(&definition.id) {
            definition.id.clone()
        } else {
            self.notifier
                .notify(Notification::language_load_failed(&definition.id));
            FALLBACK_LANGUAGE.to_string()
        }
    }

    /// Sanitize `raw_code` and highlight it as `language`.
    ///
    /// Falls back to escaped, unhighlighted code when the highlighter fails.
    pub fn highlight_code(&self, raw_code: &str, language: &str) -> String {
        let code = sanitize_input(raw_code, self.sanitize);
        let grammar = self.ensure_language_loaded(language);
        match self.highlighter.highlight(&code, &grammar) {
            Ok(html) => html,
            Err(err) => {
                log::warn!("highlighting as '{grammar}' failed: {err}");
                html_escape::encode_text(&code).into_owned()
            }
        }
    }

    /// Run `formatter` over `code` if `language` has a formatter parser.
    pub fn format<F: CodeFormatter + ?Sized>(
        &self,
        formatter: &F,
        code: &str,
        language: &str,
    ) -> FormatOutcome {
        match self.registry.get(language) {
            Some(definition) => {
                format_code(formatter, code, definition, &self.settings, self.print_width)
            }
            None => FormatOutcome {
                code: code.to_string(),
                formatting_successful: true,
            },
        }
    }

    /// Place highlighted HTML in the output container, adding line numbers
    /// when they are enabled.
    pub fn render_output(&self, highlighted_html: &str) -> RenderedOutput {
        let body = if self.settings.show_line_numbers {
            prepend_line_numbers(highlighted_html)
        } else {
            highlighted_html.to_string()
        };
        let document = format!(
            "<!DOCTYPE html><html><head></head><body>\
             <pre id=\"{CONTAINER_ID}\" class=\"{CODE_CLASS}\"><code class=\"{CODE_ELEMENT_CLASS}\">{body}</code></pre>\
             </body></html>"
        );
        RenderedOutput {
            dom: parse_html(&document),
        }
    }

    /// Build the clipboard payload for the output container under `root`.
    pub fn prepare_clipboard_payload<R: StyleResolver + ?Sized>(
        &self,
        root: &Handle,
        resolver: &R,
    ) -> Result<ClipboardPayload, CopyError> {
        let original = query_selector(root, CONTAINER_SELECTOR)
            .ok_or_else(|| CopyError::TargetNotFound(CONTAINER_SELECTOR.to_string()))?;
        self.build_payload(&original, resolver)
    }

    fn build_payload<R: StyleResolver + ?Sized>(
        &self,
        original: &Handle,
        resolver: &R,
    ) -> Result<ClipboardPayload, CopyError> {
        let cloned = deep_clone(original);
        let text = text_content(original);

        let mut options =
            CollectorOptions::new(self.settings.indentation_mode, self.settings.tab_size());
        if self.settings.show_line_numbers {
            let line_count = NEWLINE.split(&text).count();
            options =
                options.with_line_numbers(line_number_offset_pt(line_count, self.char_width_px));
        }
        LinesCollector::new(resolver, options).collect_lines_from_nodes(original, &cloned)?;

        let html = sanitize_output(&serialize_node(&cloned)?);
        Ok(ClipboardPayload { html, text })
    }

    /// Copy the output container under `root` to `sink`.
    pub fn copy_to_clipboard<R, S>(&self, root: &Handle, resolver: &R, sink: &mut S) -> CopyReport
    where
        R: StyleResolver + ?Sized,
        S: ClipboardSink + ?Sized,
    {
        let original = query_selector(root, CONTAINER_SELECTOR)
            .filter(|container| !text_content(container).trim().is_empty());
        let Some(original) = original else {
            self.notifier.notify(Notification::nothing_to_copy());
            return CopyReport::NothingToCopy;
        };

        let written = self.build_payload(&original, resolver).and_then(|payload| {
            sink.write(&payload)?;
            Ok(payload)
        });
        match written {
            Ok(payload) => {
                self.notifier.notify(Notification::copied());
                CopyReport::Copied { payload }
            }
            Err(error) => {
                log::error!("copy failed: {error}");
                self.notifier.notify(Notification::copy_failed());
                CopyReport::Failed { error }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::MemoryClipboard;
    use crate::error::{ClipboardError, HighlightError};
    use crate::language::LanguageDefinition;
    use crate::notify::{RecordingNotifier, Severity};
    use crate::settings::IndentationMode;
    use crate::style::SheetStyleResolver;
    use std::cell::RefCell;

    /// Wraps every line in a `token` span; knows a fixed set of grammars.
    struct StubHighlighter {
        languages: Vec<&'static str>,
        fail: bool,
        calls: RefCell<Vec<String>>,
    }

    impl StubHighlighter {
        fn knowing(languages: &[&'static str]) -> Self {
            StubHighlighter {
                languages: languages.to_vec(),
                fail: false,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl Highlighter for StubHighlighter {
        fn has_language(&self, language: &str) -> bool {
            self.languages.contains(&language)
        }

        fn highlight(&self, code: &str, language: &str) -> Result<String, HighlightError> {
            self.calls.borrow_mut().push(language.to_string());
            if self.fail {
                return Err(HighlightError::Highlighter("boom".to_string()));
            }
            Ok(code
                .split('\n')
                .map(|line| format!("<span class=\"token\">{}</span>", html_escape::encode_text(line)))
                .collect::<Vec<_>>()
                .join("\n"))
        }
    }

    fn service(
        highlighter: StubHighlighter,
        notifier: &RecordingNotifier,
    ) -> HighlightService<StubHighlighter, &RecordingNotifier> {
        HighlightService::with_parts(highlighter, LanguageRegistry::with_defaults(), notifier)
    }

    #[test]
    fn test_highlight_sanitizes_input() {
        let notifier = RecordingNotifier::new();
        let svc = service(StubHighlighter::knowing(&["javascript", "clike"]), &notifier);
        let html = svc.highlight_code("\n\nlet s = \u{201C}hi\u{201D};\n\n", "javascript");
        assert_eq!(html, "<span class=\"token\">let s = \"hi\";</span>");
        assert!(notifier.notifications().is_empty());
    }

    #[test]
    fn test_unknown_language_falls_back_to_plain_text() {
        let notifier = RecordingNotifier::new();
        let svc = service(StubHighlighter::knowing(&["plaintext"]), &notifier);
        svc.highlight_code("x", "cobol");
        assert_eq!(svc.highlighter().calls.borrow().as_slice(), ["plaintext"]);
        let notes = notifier.notifications();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].summary, "Language loading failed");
        assert_eq!(notes[0].severity, Severity::Warning);
    }

    #[test]
    fn test_missing_dependency_is_reported_but_highlighting_proceeds() {
        let notifier = RecordingNotifier::new();
        let mut registry = LanguageRegistry::new();
        registry.register(LanguageDefinition::new("kotlin", "Kotlin").depends_on(&["jvm"]));
        let svc = HighlightService::with_parts(
            StubHighlighter::knowing(&["kotlin"]),
            registry,
            &notifier,
        );
        let html = svc.highlight_code("val x = 1", "kotlin");
        assert!(html.contains("val x = 1"));
        assert_eq!(
            notifier.notifications(),
            vec![Notification::missing_dependency("jvm", "kotlin")]
        );
    }

    #[test]
    fn test_highlighter_failure_escapes_code() {
        let notifier = RecordingNotifier::new();
        let mut highlighter = StubHighlighter::knowing(&["markup"]);
        highlighter.fail = true;
        let svc = service(highlighter, &notifier);
        assert_eq!(svc.highlight_code("<b> & \"c\"", "html"), "&lt;b&gt; &amp; \"c\"");
    }

    #[test]
    fn test_render_output_with_line_numbers() {
        let notifier = RecordingNotifier::new();
        let settings = HighlightingSettings {
            show_line_numbers: true,
            ..Default::default()
        };
        let svc = service(StubHighlighter::knowing(&["plaintext"]), &notifier).with_settings(settings);
        let output = svc.render_output(&svc.highlight_code("a\nb", "plaintext"));
        let container = output.container().expect("container");
        assert_eq!(text_content(&container), "1. a\n2. b");
        assert!(output.container_html().unwrap().contains("class=\"token comment line-number\""));
    }

    #[test]
    fn test_copy_without_container_reports_nothing_to_copy() {
        let notifier = RecordingNotifier::new();
        let svc = service(StubHighlighter::knowing(&["plaintext"]), &notifier);
        let dom = parse_html("<p>no output yet</p>");
        let mut clipboard = MemoryClipboard::new();
        let report =
            svc.copy_to_clipboard(&dom.document, &SheetStyleResolver::default(), &mut clipboard);
        assert_eq!(report, CopyReport::NothingToCopy);
        assert!(clipboard.writes().is_empty());
        assert_eq!(notifier.notifications(), vec![Notification::nothing_to_copy()]);
    }

    #[test]
    fn test_copy_writes_payload_and_notifies() {
        let notifier = RecordingNotifier::new();
        let settings = HighlightingSettings {
            indentation_mode: IndentationMode::Tabs,
            ..Default::default()
        };
        let svc = service(StubHighlighter::knowing(&["plaintext"]), &notifier).with_settings(settings);
        let output = svc.render_output(&svc.highlight_code("if x:\n    y()", "plaintext"));
        let mut clipboard = MemoryClipboard::new();
        let report = svc.copy_to_clipboard(
            output.document(),
            &SheetStyleResolver::default(),
            &mut clipboard,
        );

        let payload = report.payload().expect("copied").clone();
        assert_eq!(payload.text, "if x:\n    y()");
        assert!(payload.html.starts_with("<pre><p style="));
        assert!(payload.html.contains("mso-tab-count:2"));
        assert!(payload.html.contains("tab-stops:left 28.35pt left 56.69pt;"));
        assert!(!payload.html.contains('\u{1F}'));
        assert_eq!(clipboard.last(), Some(&payload));
        assert_eq!(notifier.notifications(), vec![Notification::copied()]);
    }

    #[test]
    fn test_clipboard_failure_is_reported() {
        let notifier = RecordingNotifier::new();
        let svc = service(StubHighlighter::knowing(&["plaintext"]), &notifier);
        let output = svc.render_output(&svc.highlight_code("x", "plaintext"));
        let mut clipboard = MemoryClipboard::failing("denied");
        let report = svc.copy_to_clipboard(
            output.document(),
            &SheetStyleResolver::default(),
            &mut clipboard,
        );
        assert_eq!(
            report,
            CopyReport::Failed {
                error: CopyError::Clipboard(ClipboardError::Write("denied".to_string()))
            }
        );
        assert_eq!(notifier.notifications(), vec![Notification::copy_failed()]);
    }

    #[test]
    fn test_prepare_payload_requires_container() {
        let notifier = RecordingNotifier::new();
        let svc = service(StubHighlighter::knowing(&["plaintext"]), &notifier);
        let dom = parse_html("<pre>x</pre>");
        assert_eq!(
            svc.prepare_clipboard_payload(&dom.document, &SheetStyleResolver::default()),
            Err(CopyError::TargetNotFound(CONTAINER_SELECTOR.to_string()))
        );
    }
}
