use codecopy_core::common::chars::{MARKER, NON_BREAKING_SPACE};
use codecopy_core::dom::{append_child, children, create_element, create_text, deep_clone, text_content};
use codecopy_core::indentation::{mask_indentation, unmask_indentation_with_nbsp, unmask_indentation_with_tabs};
use codecopy_core::office::{cm_to_point, tab_stop_positions, tab_stops};
use codecopy_core::{CollectorOptions, IndentationMode, LinesCollector, SheetStyleResolver};
use proptest::prelude::*;

fn visual_width(prefix: &str, tab_size: usize) -> usize {
    prefix
        .chars()
        .map(|c| if c == '\t' { tab_size } else { 1 })
        .sum()
}

fn leading_whitespace(text: &str) -> &str {
    let end = text
        .find(|c: char| !matches!(c, ' ' | '\t' | '\u{A0}'))
        .unwrap_or(text.len());
    &text[..end]
}

fn indentation_mode() -> impl Strategy<Value = IndentationMode> {
    prop_oneof![
        Just(IndentationMode::Tabs),
        Just(IndentationMode::Spaces),
        Just(IndentationMode::NonBreakingSpaces),
    ]
}

proptest! {
    #[test]
    fn prop_mask_unmask_preserves_width(
        indent in "[ \t]{0,12}",
        body in "[a-z(){};]{1,10}",
        tab_size in 1usize..=8,
    ) {
        let source = format!("{indent}{body}");
        let restored = unmask_indentation_with_tabs(&mask_indentation(&source, tab_size), tab_size);
        let restored_indent = leading_whitespace(&restored);
        prop_assert_eq!(visual_width(restored_indent, tab_size), visual_width(&indent, tab_size));
        prop_assert_eq!(&restored[restored_indent.len()..], body.as_str());
    }

    #[test]
    fn prop_nbsp_unmask_maps_each_marker(text in "[\u{1F}a-z \t]{0,30}") {
        let out = unmask_indentation_with_nbsp(&text);
        prop_assert_eq!(out.chars().count(), text.chars().count());
        for (before, after) in text.chars().zip(out.chars()) {
            if before == MARKER {
                prop_assert_eq!(after, NON_BREAKING_SPACE);
            } else {
                prop_assert_eq!(after, before);
            }
        }
    }

    #[test]
    fn prop_one_paragraph_per_line(
        text in "[a-z \t\n]{0,60}",
        mode in indentation_mode(),
        tab_size in 1usize..=8,
    ) {
        let pre = create_element("pre", vec![]);
        let code = create_element("code", vec![]);
        append_child(&code, create_text(&text));
        append_child(&pre, code);
        let cloned = deep_clone(&pre);

        let resolver = SheetStyleResolver::default();
        let summary = LinesCollector::new(&resolver, CollectorOptions::new(mode, tab_size))
            .collect_lines_from_nodes(&pre, &cloned)
            .unwrap();

        let expected = text.matches('\n').count() + 1;
        let paragraphs = children(&cloned);
        prop_assert_eq!(paragraphs.len(), expected);
        prop_assert_eq!(summary.line_count, expected);

        for (paragraph, line) in paragraphs.iter().zip(text.split('\n')) {
            let nodes = children(paragraph);
            prop_assert!(!nodes.is_empty());
            if line.is_empty() {
                prop_assert_eq!(nodes.len(), 1);
                prop_assert_eq!(text_content(&nodes[0]), NON_BREAKING_SPACE.to_string());
            }
        }
    }

    #[test]
    fn prop_tab_stops_increase_from_offset(count in 0usize..12, offset in 0.0f64..200.0) {
        let positions = tab_stop_positions(count, offset);
        prop_assert_eq!(positions.len(), count);
        for (i, position) in positions.iter().enumerate() {
            prop_assert!((position - (offset + cm_to_point((i + 1) as f64))).abs() < 1e-9);
        }
        prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
        prop_assert_eq!(tab_stops(count, offset).is_empty(), count == 0);
    }
}
