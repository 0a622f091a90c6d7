//! User-controlled highlighting settings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What leading indentation turns into when code is copied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IndentationMode {
    Tabs,
    #[default]
    Spaces,
    #[serde(alias = "nbsp")]
    NonBreakingSpaces,
}

impl IndentationMode {
    pub fn as_str(self) -> &'static str {
        match self {
            IndentationMode::Tabs => "tabs",
            IndentationMode::Spaces => "spaces",
            IndentationMode::NonBreakingSpaces => "non-breaking-spaces",
        }
    }
}

impl fmt::Display for IndentationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndentationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tabs" | "tab" => Ok(IndentationMode::Tabs),
            "spaces" | "space" => Ok(IndentationMode::Spaces),
            "nbsp" | "non-breaking-spaces" => Ok(IndentationMode::NonBreakingSpaces),
            other => Err(format!(
                "unknown indentation mode '{other}' (expected tabs, spaces or nbsp)"
            )),
        }
    }
}

pub const MIN_INDENTATION_SIZE: usize = 1;
pub const MAX_INDENTATION_SIZE: usize = 8;

/// Settings snapshot read by one highlight or copy cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightingSettings {
    pub indentation_size: usize,
    pub indentation_mode: IndentationMode,
    pub enable_formatting: bool,
    pub show_line_numbers: bool,
}

impl HighlightingSettings {
    /// Tab width used by the marker codec, never zero.
    pub fn tab_size(&self) -> usize {
        self.indentation_size.max(MIN_INDENTATION_SIZE)
    }

    /// Check the indentation size is within the supported range.
    pub fn validate(&self) -> Result<(), String> {
        if (MIN_INDENTATION_SIZE..=MAX_INDENTATION_SIZE).contains(&self.indentation_size) {
            Ok(())
        } else {
            Err(format!(
                "indentation size {} is outside {MIN_INDENTATION_SIZE}..={MAX_INDENTATION_SIZE}",
                self.indentation_size
            ))
        }
    }
}

impl Default for HighlightingSettings {
    fn default() -> Self {
        HighlightingSettings {
            indentation_size: 2,
            indentation_mode: IndentationMode::Spaces,
            enable_formatting: true,
            show_line_numbers: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_str() {
        assert_eq!("TABS".parse::<IndentationMode>(), Ok(IndentationMode::Tabs));
        assert_eq!(
            "nbsp".parse::<IndentationMode>(),
            Ok(IndentationMode::NonBreakingSpaces)
        );
        assert!("quads".parse::<IndentationMode>().is_err());
    }

    #[test]
    fn test_validate_range() {
        let mut settings = HighlightingSettings::default();
        assert!(settings.validate().is_ok());
        settings.indentation_size = 0;
        assert!(settings.validate().is_err());
        assert_eq!(settings.tab_size(), 1);
        settings.indentation_size = 9;
        assert!(settings.validate().is_err());
    }
}
