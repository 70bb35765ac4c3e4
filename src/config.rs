//! Configuration for a pkgcheck run.
//!
//! Values are merged from, in increasing priority:
//! 1. Built-in defaults
//! 2. The config file (`--config PATH`, or `.pkgcheck.yaml` in the working directory)
//! 3. The `PKGCHECK_QUIET` environment variable
//! 4. Command line flags

use anyhow::{Context, Result};
use glob::Pattern;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::parse::Encoding;
use crate::report::OutputMode;

/// Config file picked up from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = ".pkgcheck.yaml";

/// Environment variable that forces quiet output.
pub const QUIET_ENV: &str = "PKGCHECK_QUIET";

fn default_pattern() -> String {
    "*".to_string()
}

/// Resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Glob matched against file names in the scanned directory
    pub pattern: Pattern,
    pub encoding: Encoding,
    pub output: OutputMode,
    /// Print the reason behind each verdict
    pub explain: bool,
}

impl Config {
    /// Load and merge configuration.
    ///
    /// An explicitly named config file must exist; the default file is
    /// optional.
    pub fn load(explicit: Option<&Path>, overrides: PartialConfig) -> Result<Self> {
        let file = match explicit {
            Some(path) => PartialConfig::load_from(path)?,
            None => {
                let path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    PartialConfig::load_from(&path)?
                } else {
                    PartialConfig::default()
                }
            }
        };

        file.merge_with(PartialConfig::from_env())
            .merge_with(overrides)
            .resolve()
    }
}

/// Partial config for merging - all fields optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartialConfig {
    pub pattern: Option<String>,
    pub encoding: Option<Encoding>,
    pub output: Option<OutputMode>,
    pub explain: Option<bool>,
}

impl PartialConfig {
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        Self::parse(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).context("Invalid config YAML")
    }

    fn from_env() -> Self {
        let quiet = std::env::var(QUIET_ENV)
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Self {
            output: quiet.then_some(OutputMode::Quiet),
            ..Self::default()
        }
    }

    /// Merge two partial configs; values set in `other` win.
    pub fn merge_with(self, other: PartialConfig) -> PartialConfig {
        PartialConfig {
            pattern: other.pattern.or(self.pattern),
            encoding: other.encoding.or(self.encoding),
            output: other.output.or(self.output),
            explain: other.explain.or(self.explain),
        }
    }

    /// Fill in defaults and validate.
    pub fn resolve(self) -> Result<Config> {
        let pattern = self.pattern.unwrap_or_else(default_pattern);
        let compiled = Pattern::new(&pattern)
            .with_context(|| format!("Invalid file pattern '{}'", pattern))?;

        Ok(Config {
            pattern: compiled,
            encoding: self.encoding.unwrap_or_default(),
            output: self.output.unwrap_or_default(),
            explain: self.explain.unwrap_or(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_config() {
        let content = r#"
pattern: "*.deps"
encoding: sectioned
output: json
explain: true
"#;
        let config = PartialConfig::parse(content).unwrap().resolve().unwrap();
        assert_eq!(config.pattern.as_str(), "*.deps");
        assert_eq!(config.encoding, Encoding::Sectioned);
        assert_eq!(config.output, OutputMode::Json);
        assert!(config.explain);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = PartialConfig::parse("").unwrap().resolve().unwrap();
        assert_eq!(config.pattern.as_str(), "*");
        assert_eq!(config.encoding, Encoding::Auto);
        assert_eq!(config.output, OutputMode::Human);
        assert!(!config.explain);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let err = PartialConfig::parse("recursive: true\n").unwrap_err();
        assert!(err.to_string().contains("Invalid config YAML"));
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let partial = PartialConfig {
            pattern: Some("[".to_string()),
            ..Default::default()
        };
        let err = partial.resolve().unwrap_err();
        assert!(err.to_string().contains("Invalid file pattern"));
    }

    #[test]
    fn test_merge_prefers_other() {
        let file = PartialConfig {
            pattern: Some("*.txt".to_string()),
            output: Some(OutputMode::Json),
            ..Default::default()
        };
        let cli = PartialConfig {
            output: Some(OutputMode::Quiet),
            explain: Some(true),
            ..Default::default()
        };

        let merged = file.merge_with(cli);
        assert_eq!(merged.pattern.as_deref(), Some("*.txt"));
        assert_eq!(merged.output, Some(OutputMode::Quiet));
        assert_eq!(merged.explain, Some(true));
        assert_eq!(merged.encoding, None);
    }

    #[test]
    fn test_load_explicit_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("pkgcheck.yaml");
        fs::write(&path, "pattern: \"*.pkg\"\nencoding: legacy\n").unwrap();

        let overrides = PartialConfig {
            encoding: Some(Encoding::Auto),
            ..Default::default()
        };
        let config = Config::load(Some(&path), overrides).unwrap();
        assert_eq!(config.pattern.as_str(), "*.pkg");
        assert_eq!(config.encoding, Encoding::Auto);
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let tmp = TempDir::new().unwrap();
        let err = Config::load(Some(&tmp.path().join("absent.yaml")), PartialConfig::default())
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read config"));
    }
}
