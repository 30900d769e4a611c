//! Configuration management for testsieve
//!
//! Parses TOML configuration files and provides typed access to settings.
//! Every section is optional; an empty file selects every test.

use crate::error::{AppError, AppResult};
use crate::selectors::{DefaultPolicy, SelectorError, SelectorList};
use crate::units::parse_bytes;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub selection: SelectionConfig,
    #[serde(default)]
    pub runner: RunnerConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Selector rules and the verdict for tests no rule matches
///
/// Fields are private; configuration is loaded via deserialization and
/// checked by `Config::validate()`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SelectionConfig {
    /// Raw selector rules, evaluated in order (`:path` loads a rule file)
    #[serde(default)]
    selectors: Vec<String>,
    #[serde(default)]
    default: DefaultPolicy,
    /// Directory relative `:path` rules are resolved against (the config
    /// file's directory when loaded with `Config::from_file`)
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

impl SelectionConfig {
    pub fn new(selectors: Vec<String>, default: DefaultPolicy) -> Self {
        Self {
            selectors,
            default,
            base_dir: None,
        }
    }

    /// Get the raw selector rules in evaluation order
    pub fn selectors(&self) -> &[String] {
        &self.selectors
    }

    /// Get the default policy for unmatched tests
    pub fn default_policy(&self) -> DefaultPolicy {
        self.default
    }

    /// Rules with relative `:path` entries resolved against the base directory
    fn resolved_selectors(&self) -> Vec<String> {
        self.selectors
            .iter()
            .map(|raw| match (raw.strip_prefix(':'), &self.base_dir) {
                (Some(path), Some(base)) if Path::new(path).is_relative() => {
                    format!(":{}", base.join(path).display())
                }
                _ => raw.clone(),
            })
            .collect()
    }
}

/// Settings handed to the test runner that consumes the selection
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RunnerConfig {
    /// Maximum heap for the test process, e.g. `"512mb"`
    #[serde(default)]
    max_heap: Option<String>,
}

impl RunnerConfig {
    pub fn new(max_heap: Option<String>) -> Self {
        Self { max_heap }
    }

    /// Get the configured heap limit as written
    pub fn max_heap(&self) -> Option<&str> {
        self.max_heap.as_deref()
    }

    /// Get the configured heap limit in bytes
    ///
    /// # Errors
    /// Returns an error if the value is not a size like `512mb`.
    pub fn max_heap_bytes(&self) -> AppResult<Option<i64>> {
        self.max_heap
            .as_deref()
            .map(parse_bytes)
            .transpose()
            .map_err(AppError::from)
    }
}

/// Observability configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let path_display = path.as_ref().display().to_string();

        let content = std::fs::read_to_string(path.as_ref()).map_err(|source| {
            AppError::ConfigFileRead {
                path: path_display.clone(),
                source,
            }
        })?;

        let mut config: Self = toml::from_str(&content).map_err(|source| {
            AppError::ConfigParseFailed {
                path: path_display.clone(),
                source,
            }
        })?;

        config.selection.base_dir = path.as_ref().parent().map(Path::to_path_buf);

        config
            .validate()
            .map_err(|e| AppError::ConfigValidationFailed {
                path: path_display,
                source: Box::new(e),
            })?;

        Ok(config)
    }

    /// Validate the configuration
    ///
    /// Parses every selector rule (reading rule files) and the heap size, so
    /// a config that validates also builds a selector list.
    pub fn validate(&self) -> AppResult<()> {
        self.selector_list(&[], None)?;
        self.runner.max_heap_bytes()?;

        let level = self.observability.log_level.to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(AppError::Config(format!(
                "observability.log_level must be one of {}, got '{}'",
                LOG_LEVELS.join(", "),
                self.observability.log_level
            )));
        }

        Ok(())
    }

    /// Build the selector list for a session
    ///
    /// `command_line` rules are evaluated before the configured ones, so a
    /// rule given on the command line overrides the config file. Relative
    /// `:path` rules from the command line resolve against the working
    /// directory; those from a config file resolve against its directory.
    /// `default_override` replaces the configured default policy.
    pub fn selector_list(
        &self,
        command_line: &[String],
        default_override: Option<DefaultPolicy>,
    ) -> Result<SelectorList, SelectorError> {
        Ok(SelectorList::builder()
            .add_raw_selectors(command_line)?
            .add_raw_selectors(self.selection.resolved_selectors())?
            .default_policy(default_override.unwrap_or(self.selection.default))
            .build())
    }
}

impl FromStr for Config {
    type Err = AppError;

    fn from_str(toml_str: &str) -> Result<Self, Self::Err> {
        let config: Config =
            toml::from_str(toml_str).map_err(|source| AppError::ConfigParseFailed {
                path: "<string>".to_string(),
                source,
            })?;

        config.validate()?;
        Ok(config)
    }
}
