//! Configuration management with TOML file support.
//!
//! Merges settings from three sources (highest precedence first):
//! 1. CLI flags
//! 2. Config file (`~/.config/logmerge/config.toml` or `$XDG_CONFIG_HOME/logmerge/config.toml`)
//! 3. Built-in defaults

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::cli::{Cli, ColorMode};
use crate::error::MergeError;
use crate::formatter::DEFAULT_PALETTE;
use crate::timestamp::TimestampRule;

/// Runtime configuration merged from defaults, config file, and CLI arguments.
///
/// Use [`Config::from_cli`] to build from parsed CLI arguments, or
/// [`Config::default`] for built-in defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Color output mode (auto/always/never).
    pub color_mode: ColorMode,
    /// Explicit prefixes, by source position.
    pub prefixes: Vec<String>,
    /// Suppress prefixes entirely.
    pub no_prefix: bool,
    /// Custom timestamp regex; paired with `timestamp_format`.
    pub timestamp_regex: Option<String>,
    /// Custom timestamp format; paired with `timestamp_regex`.
    pub timestamp_format: Option<String>,
    /// Output filename prefix, or `-` for stdout.
    pub output: String,
    /// xterm 256-color codes assigned to sources round-robin.
    pub palette: Vec<u8>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            color_mode: ColorMode::Auto,
            prefixes: Vec::new(),
            no_prefix: false,
            timestamp_regex: None,
            timestamp_format: None,
            output: "merged".to_string(),
            palette: DEFAULT_PALETTE.to_vec(),
        }
    }
}

impl Config {
    /// Build a [`Config`] from CLI arguments, loading the config file if present.
    ///
    /// Merge precedence: CLI flags > config file > defaults. The timestamp
    /// regex and format are taken as a pair: if either is given on the
    /// command line, the config file's pair is ignored.
    pub fn from_cli(cli: &Cli) -> Result<Self, MergeError> {
        let mut config = Self::default();

        let config_path = cli.config.clone().unwrap_or_else(Self::default_config_path);
        if config_path.exists() {
            let file_config = FileConfig::load(&config_path)?;
            config.apply_file_config(file_config);
        } else if cli.config.is_some() {
            return Err(MergeError::Config(format!(
                "config file not found: {}",
                config_path.display()
            )));
        }

        if let Some(color) = cli.color {
            config.color_mode = color;
        }
        if !cli.prefixes.is_empty() {
            config.prefixes.clone_from(&cli.prefixes);
        }
        config.no_prefix |= cli.no_prefix;
        if cli.regex.is_some() || cli.format.is_some() {
            config.timestamp_regex.clone_from(&cli.regex);
            config.timestamp_format.clone_from(&cli.format);
        }
        if let Some(ref output) = cli.output {
            config.output.clone_from(output);
        }

        Ok(config)
    }

    /// The timestamp rule for this run.
    pub fn timestamp_rule(&self) -> Result<TimestampRule, MergeError> {
        TimestampRule::from_parts(
            self.timestamp_regex.as_deref(),
            self.timestamp_format.as_deref(),
        )
    }

    /// Whether output goes to stdout instead of a file.
    pub fn writes_to_stdout(&self) -> bool {
        self.output == "-"
    }

    /// Default config file path: `$XDG_CONFIG_HOME/logmerge/config.toml` or `~/.config/logmerge/config.toml`.
    fn default_config_path() -> PathBuf {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(xdg).join("logmerge").join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("logmerge")
                .join("config.toml")
        } else {
            PathBuf::from(".config/logmerge/config.toml")
        }
    }

    /// Apply settings from a parsed config file.
    fn apply_file_config(&mut self, file: FileConfig) {
        if let Some(color) = file.color {
            self.color_mode = ColorMode::from_str_loose(&color);
        }
        if let Some(prefixes) = file.prefixes {
            self.prefixes = prefixes;
        }
        if let Some(no_prefix) = file.no_prefix {
            self.no_prefix = no_prefix;
        }
        if let Some(output) = file.output {
            self.output = output;
        }
        if let Some(colors) = file.colors {
            self.palette = colors;
        }
        if let Some(timestamp) = file.timestamp {
            self.timestamp_regex = timestamp.regex;
            self.timestamp_format = timestamp.format;
        }
    }
}

/// Config file structure (TOML deserialization).
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    color: Option<String>,
    prefixes: Option<Vec<String>>,
    no_prefix: Option<bool>,
    output: Option<String>,
    colors: Option<Vec<u8>>,
    timestamp: Option<TimestampConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TimestampConfig {
    regex: Option<String>,
    format: Option<String>,
}

impl FileConfig {
    fn load(path: &Path) -> Result<Self, MergeError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            MergeError::Config(format!("cannot read config file {}: {e}", path.display()))
        })?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }
}
