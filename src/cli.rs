//! Command-line argument definitions for `logmerge`.
//!
//! Uses [`clap`] derive macros for argument parsing.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use clap_complete::Shell;

/// Merge multiple log files, from different sources, preserving order.
///
/// Lines that start with a recognized timestamp open a new entry; all
/// following lines without one belong to that entry. Entries from all
/// files are interleaved by timestamp. On equal timestamps the file listed
/// first wins.
#[derive(Debug, Parser)]
#[command(name = "logmerge", version, about, long_about = None)]
pub struct Cli {
    /// Log files to merge (at least two).
    #[arg(value_name = "LOGFILE", conflicts_with = "jamf")]
    pub logfiles: Vec<PathBuf>,

    /// Prefixes for the log files, in the same order (comma-separated or repeated).
    ///
    /// Files without an explicit prefix get `log<N>`.
    #[arg(short = 'p', long = "prefix", value_delimiter = ',', value_name = "PREFIX")]
    pub prefixes: Vec<String>,

    /// Do not prefix output lines with their source.
    #[arg(long)]
    pub no_prefix: bool,

    /// Regex capturing the timestamp (group 1, or the whole match).
    ///
    /// Must be given together with `--format`; replaces the built-in patterns.
    #[arg(short = 'r', long)]
    pub regex: Option<String>,

    /// strptime-style format converting the captured timestamp.
    #[arg(short = 'f', long)]
    pub format: Option<String>,

    /// Control color output.
    ///
    /// `auto` colors only when writing to a terminal and `NO_COLOR` is unset.
    #[arg(short = 'c', long, value_enum)]
    pub color: Option<ColorMode>,

    /// Merge the primary and secondary logs of a JAMF server log folder or `.zip` bundle.
    #[arg(short = 'j', long, value_name = "PATH")]
    pub jamf: Option<PathBuf>,

    /// Output filename prefix; `.log` is appended. Use `-` for stdout.
    ///
    /// An existing file is never overwritten: a counter is added instead.
    #[arg(short = 'o', long, value_name = "NAME")]
    pub output: Option<String>,

    /// Path to configuration file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print shell completions and exit.
    #[arg(long, value_enum, value_name = "SHELL")]
    pub completions: Option<Shell>,

    /// Log diagnostics (segmentation and merge statistics) to stderr.
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

/// Color output mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Enable colors only when writing to a TTY.
    Auto,
    /// Always enable colors, also when writing to a file.
    Always,
    /// Never enable colors.
    Never,
}

impl ColorMode {
    /// Parse a config-file value; unknown values fall back to `auto`.
    pub fn from_str_loose(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "always" => Self::Always,
            "never" => Self::Never,
            _ => Self::Auto,
        }
    }
}
