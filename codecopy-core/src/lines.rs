//! Line collector.
//!
//! Walks an original highlighted tree and its clone in lockstep, splits text
//! at newlines and rebuilds the clone as one `<p>` per source line. Nested
//! highlighter spans are flattened into a sequence of styled spans per line.
//!
//! At the start of each line the collector separates, in this order, an
//! optional rendered line number, the leading indentation and the remaining
//! text. Indentation is masked with markers and expanded according to the
//! indentation mode. In tab mode every paragraph also carries a tab-stop list
//! sized for the deepest indentation seen.

use crate::common::chars::SPAN_TAG;
use crate::common::patterns::{LINE_NUMBER_PREFIX, NEWLINE};
use crate::dom::{
    append_child, append_inline_style, children, create_paragraph, create_span_with_text,
    is_element, is_tag, is_text, node_text, remove_all_attributes_except_style, remove_children,
};
use crate::error::CopyError;
use crate::indentation::{
    leading_marker_count, mask_indentation, unmask_indentation_with_nbsp,
    unmask_indentation_with_tabs,
};
use crate::office::{
    apply_no_margin_style, apply_tab_spacing, create_empty_line_span, preserve_white_space,
    tab_stops,
};
use crate::settings::IndentationMode;
use crate::style::{apply_element_styles, RootStyleSnapshot, StyleResolver};
use markup5ever_rcdom::Handle;

/// Per-copy configuration of the collector. The tab size is at least one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollectorOptions {
    indentation_mode: IndentationMode,
    tab_size: usize,
    /// Lines start with a rendered `"<digits>. "` prefix.
    has_line_numbers: bool,
    /// Width of the line-number column in points, added to every tab stop.
    line_number_offset_pt: f64,
}

impl CollectorOptions {
    pub fn new(indentation_mode: IndentationMode, tab_size: usize) -> Self {
        CollectorOptions {
            indentation_mode,
            tab_size: tab_size.max(1),
            has_line_numbers: false,
            line_number_offset_pt: 0.0,
        }
    }

    pub fn with_line_numbers(mut self, offset_pt: f64) -> Self {
        self.has_line_numbers = true;
        self.line_number_offset_pt = offset_pt;
        self
    }

    pub fn indentation_mode(&self) -> IndentationMode {
        self.indentation_mode
    }

    pub fn tab_size(&self) -> usize {
        self.tab_size
    }

    pub fn has_line_numbers(&self) -> bool {
        self.has_line_numbers
    }

    pub fn line_number_offset_pt(&self) -> f64 {
        self.line_number_offset_pt
    }
}

/// Summary of a finished collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectedLines {
    pub line_count: usize,
    pub max_indentation_markers: usize,
    /// Tab stops written on each paragraph (always zero outside tab mode).
    pub tab_stop_count: usize,
}

pub struct LinesCollector<'r, R: StyleResolver + ?Sized> {
    resolver: &'r R,
    options: CollectorOptions,
    lines: Vec<Vec<Handle>>,
    is_line_start: bool,
    is_content_start: bool,
    max_indentation_markers: usize,
    root_styles: RootStyleSnapshot,
    path: Vec<usize>,
}

impl<'r, R: StyleResolver + ?Sized> LinesCollector<'r, R> {
    pub fn new(resolver: &'r R, options: CollectorOptions) -> Self {
        LinesCollector {
            resolver,
            options,
            lines: vec![Vec::new()],
            is_line_start: true,
            is_content_start: true,
            max_indentation_markers: 0,
            root_styles: RootStyleSnapshot::default(),
            path: Vec::new(),
        }
    }

    /// Rebuild `cloned` (a structural copy of `original`) as line paragraphs.
    ///
    /// The clone loses every attribute except `style` and all of its
    /// children, which are replaced by one `<p>` per collected line. Fails
    /// without touching the clone's children if the two trees do not line up.
    pub fn collect_lines_from_nodes(
        mut self,
        original: &Handle,
        cloned: &Handle,
    ) -> Result<CollectedLines, CopyError> {
        if is_element(cloned) {
            remove_all_attributes_except_style(cloned);
        }
        self.root_styles = RootStyleSnapshot::capture(self.resolver, original);

        self.process_children(original, cloned)?;

        remove_children(cloned);
        let summary = self.append_collected_lines_as_paragraphs(cloned);
        log::debug!(
            "collected {} lines, max indentation {} markers, {} tab stops",
            summary.line_count,
            summary.max_indentation_markers,
            summary.tab_stop_count
        );
        Ok(summary)
    }

    fn append_collected_lines_as_paragraphs(&mut self, parent: &Handle) -> CollectedLines {
        let tab_stop_count = match self.options.indentation_mode {
            IndentationMode::Tabs => self.max_indentation_markers.div_ceil(self.options.tab_size),
            _ => 0,
        };
        let tab_stop_style = tab_stops(tab_stop_count, self.options.line_number_offset_pt);
        let line_count = self.lines.len();

        for line in std::mem::take(&mut self.lines) {
            let paragraph = create_paragraph();
            self.root_styles.apply_to(&paragraph);
            apply_no_margin_style(&paragraph);

            if line.is_empty() {
                append_child(&paragraph, create_empty_line_span());
                append_child(parent, paragraph);
                continue;
            }

            for node in line {
                append_child(&paragraph, node);
            }
            if !tab_stop_style.is_empty() {
                append_inline_style(&paragraph, &tab_stop_style);
            }
            append_child(parent, paragraph);
        }

        CollectedLines {
            line_count,
            max_indentation_markers: self.max_indentation_markers,
            tab_stop_count,
        }
    }

    fn process_children(&mut self, original: &Handle, cloned: &Handle) -> Result<(), CopyError> {
        let original_children = children(original);
        let cloned_children = children(cloned);
        if original_children.len() != cloned_children.len() {
            return Err(self.mismatch(format!(
                "{} original children but {} cloned children",
                original_children.len(),
                cloned_children.len()
            )));
        }
        for (index, (orig, clone)) in original_children
            .iter()
            .zip(cloned_children.iter())
            .enumerate()
        {
            self.path.push(index);
            self.process_node(original, orig, clone)?;
            self.path.pop();
        }
        Ok(())
    }

    fn process_node(
        &mut self,
        original_parent: &Handle,
        original: &Handle,
        cloned: &Handle,
    ) -> Result<(), CopyError> {
        match (is_element(original), is_element(cloned)) {
            (true, true) => self.handle_element(original, cloned),
            (false, false) if is_text(cloned) => {
                if !is_text(original) {
                    return Err(self.mismatch("text node paired with non-text node".into()));
                }
                self.handle_text_node(original_parent, cloned);
                Ok(())
            }
            // comments, processing instructions
            (false, false) => Ok(()),
            _ => Err(self.mismatch("element paired with non-element".into())),
        }
    }

    fn handle_element(&mut self, original: &Handle, cloned: &Handle) -> Result<(), CopyError> {
        apply_element_styles(self.resolver, original, cloned);
        remove_all_attributes_except_style(cloned);
        self.process_children(original, cloned)
    }

    fn handle_text_node(&mut self, original_parent: &Handle, cloned: &Handle) {
        let text = node_text(cloned).unwrap_or_default();

        for (index, segment) in NEWLINE.split(&text).enumerate() {
            if index > 0 {
                self.start_new_line();
            }
            if segment.is_empty() {
                continue;
            }

            let mut rest = segment;
            if self.is_line_start && self.options.has_line_numbers {
                if let Some(found) = LINE_NUMBER_PREFIX.find(rest) {
                    let span = create_span_with_text(found.as_str());
                    self.apply_parent_span_styles(original_parent, &span);
                    preserve_white_space(&span);
                    self.current_line().push(span);
                    rest = &rest[found.end()..];
                }
            }
            self.is_line_start = false;
            if rest.is_empty() {
                continue;
            }

            let chunk = if self.is_content_start {
                self.is_content_start = false;
                mask_indentation(rest, self.options.tab_size)
            } else {
                rest.to_string()
            };
            self.create_spans_from_chunk(&chunk, original_parent);
        }
    }

    fn create_spans_from_chunk(&mut self, chunk: &str, original_parent: &Handle) {
        // Markers are single-byte, so the count is also a byte offset.
        let markers = leading_marker_count(chunk);
        let remainder = if markers > 0 {
            let (run, remainder) = chunk.split_at(markers);
            let span = self.create_marker_span(run);
            self.current_line().push(span);
            remainder
        } else {
            chunk
        };

        if !remainder.is_empty() {
            let span = create_span_with_text(remainder);
            self.apply_parent_span_styles(original_parent, &span);
            self.current_line().push(span);
        }
    }

    fn create_marker_span(&mut self, run: &str) -> Handle {
        let count = run.len();
        self.max_indentation_markers = self.max_indentation_markers.max(count);

        match self.options.indentation_mode {
            IndentationMode::Tabs => {
                let span =
                    create_span_with_text(&unmask_indentation_with_tabs(run, self.options.tab_size));
                apply_tab_spacing(&span, count / self.options.tab_size);
                span
            }
            IndentationMode::Spaces | IndentationMode::NonBreakingSpaces => {
                let span = create_span_with_text(&unmask_indentation_with_nbsp(run));
                preserve_white_space(&span);
                span
            }
        }
    }

    /// Carry the styles of a highlighter span over to a fragment split out
    /// of its text.
    fn apply_parent_span_styles(&self, original_parent: &Handle, child: &Handle) {
        if is_tag(original_parent, SPAN_TAG) {
            apply_element_styles(self.resolver, original_parent, child);
        }
    }

    fn start_new_line(&mut self) {
        self.lines.push(Vec::new());
        self.is_line_start = true;
        self.is_content_start = true;
    }

    fn current_line(&mut self) -> &mut Vec<Handle> {
        if self.lines.is_empty() {
            self.lines.push(Vec::new());
        }
        let last = self.lines.len() - 1;
        &mut self.lines[last]
    }

    fn mismatch(&self, detail: String) -> CopyError {
        let path = self
            .path
            .iter()
            .map(usize::to_string)
            .collect::<Vec<_>>()
            .join("/");
        CopyError::StructuralMismatch { path, detail }
    }
}
