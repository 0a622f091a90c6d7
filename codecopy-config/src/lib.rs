//! Shared configuration loader for the codecopy toolchain.
//!
//! `defaults/codecopy.default.toml` is embedded into every binary so that docs
//! and runtime behavior stay in sync. Applications layer user-specific files on
//! top of those defaults via [`Loader`] before deserializing into
//! [`CodecopyConfig`].

use codecopy_core::{HighlightingSettings, IndentationMode, SanitizeOptions};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_TOML: &str = include_str!("../defaults/codecopy.default.toml");

/// Project-level configuration file picked up from the working directory.
pub const PROJECT_CONFIG_FILE: &str = "codecopy.toml";

/// Top-level configuration consumed by codecopy applications.
#[derive(Debug, Clone, Deserialize)]
pub struct CodecopyConfig {
    pub highlighting: HighlightingConfig,
    pub theme: ThemeConfig,
    pub formatter: FormatterConfig,
    pub layout: LayoutConfig,
    pub sanitize: SanitizeConfig,
}

impl CodecopyConfig {
    /// Validated highlighting settings.
    pub fn highlighting_settings(&self) -> Result<HighlightingSettings, ConfigError> {
        HighlightingSettings::try_from(&self.highlighting)
    }
}

/// Mirrors the user-facing highlighting settings.
#[derive(Debug, Clone, Deserialize)]
pub struct HighlightingConfig {
    pub indentation_size: usize,
    pub indentation_mode: IndentationMode,
    pub enable_formatting: bool,
    pub show_line_numbers: bool,
}

impl TryFrom<&HighlightingConfig> for HighlightingSettings {
    type Error = ConfigError;

    fn try_from(config: &HighlightingConfig) -> Result<Self, Self::Error> {
        let settings = HighlightingSettings {
            indentation_size: config.indentation_size,
            indentation_mode: config.indentation_mode,
            enable_formatting: config.enable_formatting,
            show_line_numbers: config.show_line_numbers,
        };
        settings
            .validate()
            .map_err(|e| ConfigError::Message(format!("highlighting: {e}")))?;
        Ok(settings)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThemeConfig {
    pub name: String,
}

/// External formatter knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct FormatterConfig {
    pub print_width: usize,
    #[serde(default)]
    pub command: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LayoutConfig {
    pub char_width_px: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SanitizeConfig {
    pub fold_umlauts: bool,
}

impl From<&SanitizeConfig> for SanitizeOptions {
    fn from(config: &SanitizeConfig) -> Self {
        SanitizeOptions {
            fold_umlauts: config.fold_umlauts,
        }
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<CodecopyConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<CodecopyConfig, ConfigError> {
    Loader::new().build()
}
