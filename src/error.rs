//! Error types for `logmerge`.
//!
//! Uses [`thiserror`] for ergonomic error derivation.

use thiserror::Error;

/// Errors that can occur in `logmerge`.
///
/// Maps to exit codes: [`Config`](Self::Config), [`Decode`](Self::Decode),
/// [`Archive`](Self::Archive) and [`Toml`](Self::Toml) → exit 1,
/// [`Io`](Self::Io) → exit 2.
#[derive(Debug, Error)]
pub enum MergeError {
    /// Configuration error (too few sources, incomplete or malformed timestamp rule).
    #[error("configuration error: {0}")]
    Config(String),

    /// A source is not valid UTF-8.
    #[error("cannot decode {source_label} as UTF-8 (line {line}): {reason}")]
    Decode {
        source_label: String,
        /// 1-based line number holding the first invalid byte.
        line: usize,
        reason: std::str::Utf8Error,
    },

    /// I/O error while reading inputs or writing output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JAMF bundle archive could not be opened or extracted.
    #[error("cannot extract {path}: {reason}")]
    Archive {
        path: String,
        reason: zip::result::ZipError,
    },

    /// TOML deserialization error.
    #[error("config file error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl MergeError {
    /// Process exit code for this error.
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Io(_) => 2,
            Self::Config(_) | Self::Decode { .. } | Self::Archive { .. } | Self::Toml(_) => 1,
        }
    }
}
