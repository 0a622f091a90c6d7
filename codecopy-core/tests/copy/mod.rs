use crate::common::{paragraph_texts, service};
use codecopy_core::dom::{parse_fragment, parse_html, query_selector};
use codecopy_core::{
    CopyReport, HighlightService, HighlightingSettings, IndentationMode, LanguageRegistry,
    MemoryClipboard, Notification, RecordingNotifier, SheetStyleResolver, SyntectHighlighter,
};

const HELLO_WORLD: &str = "<span class=\"token keyword\">function</span> <span class=\"token function\">helloWorld</span><span class=\"token punctuation\">(</span><span class=\"token punctuation\">)</span> <span class=\"token punctuation\">{</span>
  console<span class=\"token punctuation\">.</span><span class=\"token function\">log</span><span class=\"token punctuation\">(</span><span class=\"token string\">\"Hi\"</span><span class=\"token punctuation\">)</span><span class=\"token punctuation\">;</span>
<span class=\"token punctuation\">}</span>";

#[test]
fn test_end_to_end_copy_in_spaces_mode() {
    let notifier = RecordingNotifier::new();
    let settings = HighlightingSettings {
        indentation_size: 2,
        indentation_mode: IndentationMode::Spaces,
        ..Default::default()
    };
    let svc = service(settings, &notifier);
    let output = svc.render_output(HELLO_WORLD);
    let mut clipboard = MemoryClipboard::new();

    let report = svc.copy_to_clipboard(
        output.document(),
        &SheetStyleResolver::default(),
        &mut clipboard,
    );
    assert!(report.is_copied());
    let payload = clipboard.last().unwrap();

    assert_eq!(
        payload.text,
        "function helloWorld() {\n  console.log(\"Hi\");\n}"
    );
    assert!(payload.html.contains(
        "<span style=\"mso-spacerun:yes\">&nbsp;&nbsp;</span><span>console</span>"
    ));

    let copied = parse_fragment(&payload.html);
    let lines = paragraph_texts(&copied[0]);
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[1][0], "\u{A0}\u{A0}");
    assert_eq!(lines[1][1], "console");
    assert_eq!(notifier.notifications(), vec![Notification::copied()]);
}

#[test]
fn test_copy_with_rendered_line_numbers_offsets_tab_stops() {
    let notifier = RecordingNotifier::new();
    let settings = HighlightingSettings {
        indentation_mode: IndentationMode::Tabs,
        show_line_numbers: true,
        ..Default::default()
    };
    let svc = service(settings, &notifier);
    let output = svc.render_output(&svc.highlight_code("a\n\tb", "plaintext"));

    let payload = svc
        .prepare_clipboard_payload(output.document(), &SheetStyleResolver::default())
        .unwrap();
    assert_eq!(payload.text, "1. a\n2. \tb");

    let copied = parse_fragment(&payload.html);
    assert_eq!(
        paragraph_texts(&copied[0]),
        vec![
            vec!["1. ".to_string(), "a".to_string()],
            vec!["2. ".to_string(), "\t".to_string(), "b".to_string()],
        ]
    );
    // 3 characters at 7.8px each, 31.2pt, plus one centimeter
    assert!(payload.html.contains("tab-stops:left 59.55pt;"));
}

#[test]
fn test_line_numbers_pick_up_token_comment_theme_rules() {
    let notifier = RecordingNotifier::new();
    let settings = HighlightingSettings {
        show_line_numbers: true,
        ..Default::default()
    };
    let svc = service(settings, &notifier);
    let output = svc.render_output(&svc.highlight_code("a", "plaintext"));
    let resolver = SheetStyleResolver::from_css(
        ".token.comment { font-style: italic; }\n\
         pre .token.comment { color: #ff0000; }\n\
         .line-number { color: #708090 !important; }",
    );

    let payload = svc.prepare_clipboard_payload(output.document(), &resolver).unwrap();
    assert!(payload.html.contains(
        "color: rgb(112, 128, 144); font-family: monospace; font-size: 13px; \
         font-style: italic;mso-spacerun:yes\">1. </span>"
    ));
}

#[test]
fn test_empty_output_is_nothing_to_copy() {
    let notifier = RecordingNotifier::new();
    let svc = service(HighlightingSettings::default(), &notifier);
    let output = svc.render_output(&svc.highlight_code("\n\n", "plaintext"));
    let mut clipboard = MemoryClipboard::new();
    let report = svc.copy_to_clipboard(
        output.document(),
        &SheetStyleResolver::default(),
        &mut clipboard,
    );
    assert_eq!(report, CopyReport::NothingToCopy);
    assert!(clipboard.writes().is_empty());
}

#[test]
fn test_each_copy_uses_fresh_root_styles() {
    let notifier = RecordingNotifier::new();
    let svc = service(HighlightingSettings::default(), &notifier);
    let red = SheetStyleResolver::from_css("pre { color: red; }");
    let plain = SheetStyleResolver::default();
    let output = svc.render_output("x");

    let first = svc.prepare_clipboard_payload(output.document(), &red).unwrap();
    let second = svc.prepare_clipboard_payload(output.document(), &plain).unwrap();
    assert!(first.html.contains("color: rgb(255, 0, 0);"));
    assert!(!second.html.contains("color:"));
}

#[test]
fn test_copy_from_syntect_output_with_theme() {
    let highlighter = SyntectHighlighter::new();
    let css = highlighter.theme_css("InspiredGitHub").unwrap();
    let notifier = RecordingNotifier::new();
    let svc = HighlightService::with_parts(highlighter, LanguageRegistry::with_defaults(), &notifier);

    let code = "function helloWorld() {\n  console.log(\"Hi\");\n}";
    let output = svc.render_output(&svc.highlight_code(code, "javascript"));
    let mut clipboard = MemoryClipboard::new();
    let report = svc.copy_to_clipboard(
        output.document(),
        &SheetStyleResolver::from_css(&css),
        &mut clipboard,
    );

    let payload = report.payload().unwrap();
    assert_eq!(payload.text, code);
    assert!(payload.html.contains("<span style=\"mso-spacerun:yes\">&nbsp;&nbsp;</span>"));
    assert!(payload.html.contains("color: rgb("));
    assert!(!payload.html.contains("class="));
    assert!(notifier
        .notifications()
        .iter()
        .all(|n| n.summary == "Copied successfully"));
}

#[test]
fn test_output_document_container_lookup() {
    let dom = parse_html("<div><pre id=\"other\">x</pre></div>");
    assert!(query_selector(&dom.document, "pre#highlighted-code-wrapper").is_none());
}
