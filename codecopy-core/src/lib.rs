//! Clipboard-faithful copies of syntax-highlighted code
//!
//!     This crate takes source code, highlights it, and turns the highlighted output into a pair of
//!     clipboard representations: a self-contained, inline-styled HTML fragment and a plain-text
//!     fallback. The HTML survives pasting into word processors that ignore stylesheets and collapse
//!     whitespace, keeping colors, fonts and indentation intact.
//!
//!     TLDR:
//!         - Highlighting, formatting and the clipboard are collaborators behind traits (Highlighter,
//!           CodeFormatter, ClipboardSink). The crate ships one implementation of each.
//!         - The interesting work happens between the highlighted tree and the clipboard: see
//!           ./lines.rs.
//!         - This is a pure lib, it powers codecopy-cli but prints nothing. Everything is reported
//!           through return values, the Notifier trait and the log facade.
//!
//! Architecture
//!
//!     .
//!     ├── common                  # Marker characters and the shared regexes
//!     ├── indentation.rs          # Marker codec for leading whitespace
//!     ├── style                   # Relevant style set, root snapshot, stylesheet resolver
//!     │   ├── css.rs              # Rules and declarations via cssparser
//!     │   └── selector.rs         # Selector matching over rcdom via selectors
//!     ├── office.rs               # Word-processor style fragments and unit conversion
//!     ├── lines.rs                # The line collector
//!     ├── dom.rs                  # Helpers over the html5ever rcdom tree
//!     ├── sanitize.rs             # Input and output substitution tables
//!     ├── line_numbers.rs         # Rendered line-number prefixes
//!     ├── language.rs             # Language registry and dependency resolution
//!     ├── highlight.rs            # Highlighter trait, syntect implementation
//!     ├── formatter.rs            # CodeFormatter trait, prettier implementation
//!     ├── clipboard.rs            # ClipboardSink trait, arboard and in-memory sinks
//!     ├── notify.rs               # User-facing notifications
//!     └── service.rs              # HighlightService, the highlight and copy sequence
//!
//! The Copy Pipeline
//!
//!     Copying starts from the rendered output container. It is deep cloned, and the clone and the
//!     original are walked in lockstep. Text is split at newlines into lines, each line made of
//!     flat spans that carry the computed styles of the element they came from. The start of every
//!     line is classified as an optional line number, then indentation, then text.
//!
//!     Indentation is masked into a run of marker characters (one per space, tab width per tab) so
//!     it can be told apart from ordinary whitespace later, then expanded into tabs or
//!     non-breaking spaces depending on the indentation mode. Tab-indented output also gets a
//!     tab-stops declaration sized for the deepest indentation seen.
//!
//!     Finally the clone's children are replaced by one paragraph per line. Styles of the root are
//!     captured once per copy and written onto each synthetic paragraph, since flattening loses
//!     normal CSS inheritance. The snapshot is a value owned by the collector, so two copies never
//!     share it.
//!
//! Computed Styles
//!
//!     Clipboard consumers only see inline styles. The collector asks a StyleResolver for the
//!     computed value of six properties (color, font family, size, style, variant and weight) and
//!     writes only the values that differ from their defaults. SheetStyleResolver evaluates a theme
//!     stylesheet against the tree. Declarations are ranked by importance, then inline style over
//!     rules, then specificity, then source order.
//!
pub mod clipboard;
pub mod common;
pub mod dom;
pub mod error;
pub mod formatter;
pub mod highlight;
pub mod indentation;
pub mod language;
pub mod line_numbers;
pub mod lines;
pub mod notify;
pub mod office;
pub mod sanitize;
pub mod service;
pub mod settings;
pub mod style;

pub use clipboard::{ClipboardPayload, ClipboardSink, MemoryClipboard, SystemClipboard};
pub use error::{ClipboardError, CopyError, FormatError, HighlightError};
pub use formatter::{format_code, CodeFormatter, FormatOptions, FormatOutcome};
pub use highlight::{Highlighter, SyntectHighlighter};
pub use language::{LanguageDefinition, LanguageRegistry};
pub use lines::{CollectedLines, CollectorOptions, LinesCollector};
pub use notify::{LogNotifier, Notification, Notifier, RecordingNotifier, Severity};
pub use sanitize::SanitizeOptions;
pub use service::{CopyReport, HighlightService, RenderedOutput};
pub use settings::{HighlightingSettings, IndentationMode};
pub use style::{SheetStyleResolver, StyleResolver};

#[cfg(feature = "external-formatter")]
pub use formatter::PrettierFormatter;
