//! Code formatter collaborator.
//!
//! Formatting is best effort: [`format_code`] never fails. When formatting is
//! disabled, the code is empty, the language has no formatter parser or the
//! formatter errors out, the original code comes back unchanged together with
//! a success flag.

use crate::error::FormatError;
use crate::language::{FormatterParser, LanguageDefinition};
use crate::settings::{HighlightingSettings, IndentationMode};

pub const DEFAULT_PRINT_WIDTH: usize = 140;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatOptions {
    pub tab_width: usize,
    pub use_tabs: bool,
    pub print_width: usize,
}

impl FormatOptions {
    pub fn from_settings(settings: &HighlightingSettings, print_width: usize) -> Self {
        FormatOptions {
            tab_width: settings.tab_size(),
            use_tabs: settings.indentation_mode == IndentationMode::Tabs,
            print_width,
        }
    }
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self::from_settings(&HighlightingSettings::default(), DEFAULT_PRINT_WIDTH)
    }
}

/// A pretty-printer for source code.
pub trait CodeFormatter {
    fn format(
        &self,
        code: &str,
        parser: &FormatterParser,
        options: &FormatOptions,
    ) -> Result<String, FormatError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOutcome {
    pub code: String,
    pub formatting_successful: bool,
}

impl FormatOutcome {
    fn unchanged(code: &str, formatting_successful: bool) -> Self {
        FormatOutcome {
            code: code.to_string(),
            formatting_successful,
        }
    }
}

/// Format `code` for `language` according to `settings`.
pub fn format_code<F: CodeFormatter + ?Sized>(
    formatter: &F,
    code: &str,
    language: &LanguageDefinition,
    settings: &HighlightingSettings,
    print_width: usize,
) -> FormatOutcome {
    if !settings.enable_formatting || code.trim().is_empty() {
        return FormatOutcome::unchanged(code, true);
    }
    let Some(parser) = &language.formatter else {
        log::debug!("no formatter parser for '{}', leaving code as is", language.id);
        return FormatOutcome::unchanged(code, true);
    };

    let options = FormatOptions::from_settings(settings, print_width);
    match formatter.format(code, parser, &options) {
        Ok(formatted) => FormatOutcome {
            code: formatted,
            formatting_successful: true,
        },
        Err(err) => {
            log::warn!("formatting '{}' code failed: {err}", language.id);
            FormatOutcome::unchanged(code, false)
        }
    }
}

#[cfg(feature = "external-formatter")]
pub use prettier::PrettierFormatter;

#[cfg(feature = "external-formatter")]
mod prettier {
    use super::{CodeFormatter, FormatOptions};
    use crate::error::FormatError;
    use crate::language::FormatterParser;
    use std::env;
    use std::io::Write;
    use std::path::{Path, PathBuf};
    use std::process::{Command, Stdio};
    use which::which;

    /// Runs the `prettier` executable, feeding code on stdin.
    #[derive(Debug, Clone)]
    pub struct PrettierFormatter {
        binary: PathBuf,
    }

    impl PrettierFormatter {
        /// Find `prettier` via `CODECOPY_PRETTIER_BIN` or the `PATH`.
        pub fn locate() -> Result<Self, FormatError> {
            resolve_prettier_binary().map(|binary| PrettierFormatter { binary })
        }

        pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
            PrettierFormatter {
                binary: binary.into(),
            }
        }

        pub fn binary(&self) -> &Path {
            &self.binary
        }
    }

    impl CodeFormatter for PrettierFormatter {
        fn format(
            &self,
            code: &str,
            parser: &FormatterParser,
            options: &FormatOptions,
        ) -> Result<String, FormatError> {
            let mut command = Command::new(&self.binary);
            command
                .arg("--parser")
                .arg(&parser.parser)
                .arg("--tab-width")
                .arg(options.tab_width.to_string())
                .arg("--print-width")
                .arg(options.print_width.to_string());
            if options.use_tabs {
                command.arg("--use-tabs");
            }
            let mut child = command
                .stdin(Stdio::piped())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .spawn()?;

            if let Some(mut stdin) = child.stdin.take() {
                stdin.write_all(code.as_bytes())?;
            }
            let output = child.wait_with_output()?;
            if !output.status.success() {
                return Err(FormatError::Failed {
                    status: output.status.to_string(),
                    stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                });
            }
            String::from_utf8(output.stdout).map_err(|e| FormatError::InvalidOutput(e.to_string()))
        }
    }

    fn resolve_prettier_binary() -> Result<PathBuf, FormatError> {
        if let Some(path) = env::var_os("CODECOPY_PRETTIER_BIN") {
            if !path.is_empty() {
                return Ok(PathBuf::from(path));
            }
        }
        which("prettier").map_err(|_| FormatError::NotFound("prettier".to_string()))
    }
}
