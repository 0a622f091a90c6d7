use crate::common::paragraph_texts;
use codecopy_core::dom::{children, deep_clone, get_attribute, parse_html, query_selector};
use codecopy_core::{CollectorOptions, IndentationMode, LinesCollector, SheetStyleResolver};
use markup5ever_rcdom::Handle;

const CSS: &str = "
pre#highlighted-code-wrapper { color: #24292e; font-family: Menlo, monospace; font-size: 12px; }
.token.comment { color: #708090; font-style: italic; }
.token.keyword { color: #d73a49; font-weight: bold; }
";

fn container(inner: &str) -> (markup5ever_rcdom::RcDom, Handle) {
    let dom = parse_html(&format!(
        "<pre id=\"highlighted-code-wrapper\" class=\"code\"><code class=\"highlighted-code\">{inner}</code></pre>"
    ));
    let pre = query_selector(&dom.document, "pre#highlighted-code-wrapper").unwrap();
    (dom, pre)
}

fn collect(original: &Handle, resolver: &SheetStyleResolver, options: CollectorOptions) -> Handle {
    let cloned = deep_clone(original);
    LinesCollector::new(resolver, options)
        .collect_lines_from_nodes(original, &cloned)
        .unwrap();
    cloned
}

#[test]
fn test_nested_span_styles_reach_split_fragments() {
    let (_dom, pre) = container(
        "<span class=\"token comment\">// first\n// second</span>\n<span class=\"token keyword\">return</span>",
    );
    let resolver = SheetStyleResolver::from_css(CSS);
    let cloned = collect(&pre, &resolver, CollectorOptions::new(IndentationMode::Spaces, 2));

    let paragraphs = children(&cloned);
    assert_eq!(paragraphs.len(), 3);
    let comment = &children(&paragraphs[1])[0];
    let style = get_attribute(comment, "style").unwrap();
    assert!(style.contains("color: rgb(112, 128, 144);"), "{style}");
    assert!(style.contains("font-style: italic;"), "{style}");

    let keyword = &children(&paragraphs[2])[0];
    let style = get_attribute(keyword, "style").unwrap();
    assert!(style.contains("font-weight: 700;"), "{style}");
}

#[test]
fn test_root_styles_land_on_every_paragraph() {
    let (_dom, pre) = container("a\n\nb");
    let resolver = SheetStyleResolver::from_css(CSS);
    let cloned = collect(&pre, &resolver, CollectorOptions::new(IndentationMode::Spaces, 2));

    for paragraph in children(&cloned) {
        let style = get_attribute(&paragraph, "style").unwrap();
        assert!(style.starts_with("color: rgb(36, 41, 46); font-family: Menlo, monospace; font-size: 12px;"), "{style}");
        assert!(style.ends_with("margin:0cm;"), "{style}");
    }
    assert_eq!(
        paragraph_texts(&cloned),
        vec![vec!["a".to_string()], vec!["\u{A0}".to_string()], vec!["b".to_string()]]
    );
}

#[test]
fn test_written_line_numbers_are_separated() {
    let (_dom, pre) = container("1. First line\n2. Second line");
    let resolver = SheetStyleResolver::default();
    let options = CollectorOptions::new(IndentationMode::Spaces, 2).with_line_numbers(0.0);
    let cloned = collect(&pre, &resolver, options);

    assert_eq!(
        paragraph_texts(&cloned),
        vec![
            vec!["1. ".to_string(), "First line".to_string()],
            vec!["2. ".to_string(), "Second line".to_string()],
        ]
    );
    let number = &children(&children(&cloned)[0])[0];
    assert_eq!(get_attribute(number, "style").as_deref(), Some("mso-spacerun:yes"));
}

#[test]
fn test_nbsp_mode_matches_spaces_mode() {
    let (_dom, pre) = container("a\n   b");
    let resolver = SheetStyleResolver::default();
    let spaces = collect(&pre, &resolver, CollectorOptions::new(IndentationMode::Spaces, 4));
    let nbsp = collect(
        &pre,
        &resolver,
        CollectorOptions::new(IndentationMode::NonBreakingSpaces, 4),
    );
    assert_eq!(paragraph_texts(&spaces), paragraph_texts(&nbsp));
    assert_eq!(paragraph_texts(&nbsp)[1][0], "\u{A0}\u{A0}\u{A0}");
    assert!(get_attribute(&children(&nbsp)[1], "style")
        .unwrap()
        .ends_with("margin:0cm;"));
}

#[test]
fn test_mixed_indentation_in_tabs_mode() {
    let (_dom, pre) = container("a\n\t  b\n c");
    let resolver = SheetStyleResolver::default();
    let cloned = collect(&pre, &resolver, CollectorOptions::new(IndentationMode::Tabs, 2));

    let texts = paragraph_texts(&cloned);
    assert_eq!(texts[1], vec!["\t\t".to_string(), "b".to_string()]);
    assert_eq!(texts[2], vec![" ".to_string(), "c".to_string()]);

    let lines = children(&cloned);
    assert_eq!(
        get_attribute(&children(&lines[2])[0], "style").as_deref(),
        Some("mso-tab-count:0")
    );
    for line in &lines {
        let style = get_attribute(line, "style").unwrap();
        assert!(style.ends_with("tab-stops:left 28.35pt left 56.69pt;"), "{style}");
    }
}
