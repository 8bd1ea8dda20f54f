//! Optional TOML configuration for the command line.
//!
//! ```toml
//! [limits]
//! max_segments = 4096
//! max_total_decrease = 65536
//! max_multiplier_digits = 1000
//!
//! [output]
//! color = "never"
//! wrap = false
//! ```
//!
//! Every key is optional. Flags given on the command line take precedence.
use std::path::Path;

use clap::ValueEnum;
use log::debug;
use loopcore::Limits;
use serde::{Deserialize, Serialize};
use termcolor::ColorChoice;

use crate::error::{CliError, CliResult};

/// When to emit ANSI colors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    pub fn choice(self) -> ColorChoice {
        match self {
            ColorMode::Auto => ColorChoice::Auto,
            ColorMode::Always => ColorChoice::Always,
            ColorMode::Never => ColorChoice::Never,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub color: ColorMode,
    /// Wrap long numbers to the terminal width.
    pub wrap: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            color: ColorMode::Auto,
            wrap: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub limits: Limits,
    pub output: OutputConfig,
}

impl CliConfig {
    pub const DEFAULT_PATH: &'static str = "loopcli.toml";

    pub fn from_toml_str(text: &str, file: &str) -> CliResult<Self> {
        toml::from_str(text).map_err(|e| CliError::ConfigParseError {
            source: e,
            file: file.to_string(),
        })
    }

    pub fn load_from_toml(path: &Path) -> CliResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text, &path.display().to_string())
    }

    /// Loads `explicit` if given (it must exist), otherwise [`Self::DEFAULT_PATH`] if it
    /// exists in the working directory, otherwise the defaults.
    pub fn locate(explicit: Option<&Path>) -> CliResult<Self> {
        match explicit {
            Some(path) if !path.exists() => {
                Err(CliError::ConfigNotFound(path.display().to_string()))
            }
            Some(path) => Self::load_from_toml(path),
            None => {
                let path = Path::new(Self::DEFAULT_PATH);
                if path.is_file() {
                    debug!("Using configuration from {}", path.display());
                    Self::load_from_toml(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = CliConfig::from_toml_str("", "empty.toml").unwrap();
        assert_eq!(config, CliConfig::default());
        assert_eq!(config.limits, Limits::default());
        assert!(config.output.wrap);
        assert_eq!(config.output.color, ColorMode::Auto);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let text = r#"
            [limits]
            max_segments = 12
            max_multiplier_digits = 100

            [output]
            color = "never"
        "#;
        let config = CliConfig::from_toml_str(text, "partial.toml").unwrap();
        assert_eq!(config.limits.max_segments, 12);
        assert_eq!(config.limits.max_multiplier_digits, 100);
        assert_eq!(
            config.limits.max_total_decrease,
            Limits::DEFAULT_MAX_TOTAL_DECREASE
        );
        assert_eq!(config.output.color.choice(), ColorChoice::Never);
        assert!(config.output.wrap);
    }

    #[test]
    fn bad_values_name_the_file() {
        let error = CliConfig::from_toml_str("[output]\ncolor = \"sometimes\"", "bad.toml")
            .unwrap_err();
        assert!(matches!(error, CliError::ConfigParseError { ref file, .. } if file == "bad.toml"));
        assert!(error.to_string().contains("bad.toml"));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let error = CliConfig::locate(Some(Path::new("/nonexistent/loopcli.toml"))).unwrap_err();
        assert!(matches!(error, CliError::ConfigNotFound(_)));
    }
}
