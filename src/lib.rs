//! `logmerge` — merge several log files into one chronological stream.
//!
//! Each source is split into multi-line entries (a timestamped header line
//! plus its continuation lines), the per-source entry sequences are merged
//! by timestamp, and every line is rendered with its source's prefix and
//! optional color.
//!
//! # Example
//!
//! ```
//! use logmerge::{SourceSpec, TimestampRule, merge_sources};
//!
//! let sources = [
//!     SourceSpec::new("a.log", "2023-01-01 00:00:01,000 hello\n  continuation\n").with_prefix("A"),
//!     SourceSpec::new("b.log", "2023-01-01 00:00:00,500 world\n").with_prefix("B"),
//! ];
//!
//! let lines = merge_sources(&sources, &TimestampRule::BuiltIn, false).unwrap();
//! assert_eq!(lines, [
//!     "B 2023-01-01 00:00:00,500 world",
//!     "A 2023-01-01 00:00:01,000 hello",
//!     "A   continuation",
//! ]);
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod formatter;
pub mod merge;
pub mod segment;
pub mod source;
pub mod timestamp;

use tracing::debug;

// Re-export primary API types for convenience.
pub use config::Config;
pub use error::MergeError;
pub use formatter::{render, render_into};
pub use merge::{MergeKey, MergedStream, merge};
pub use segment::{Entry, segment};
pub use source::SourceSpec;
pub use timestamp::{Instant, TimestampRule};

/// Minimum number of sources a merge accepts.
pub const MIN_SOURCES: usize = 2;

/// Fail unless at least [`MIN_SOURCES`] sources were supplied.
pub fn check_source_count(count: usize) -> Result<(), MergeError> {
    if count < MIN_SOURCES {
        return Err(MergeError::Config(format!(
            "at least {MIN_SOURCES} log files are required, got {count}"
        )));
    }
    Ok(())
}

/// Segment every source and merge the entries into global order.
///
/// All sources are segmented before the first entry is produced, so a
/// malformed custom timestamp rule fails here rather than mid-output.
pub fn merge_entries(
    sources: &[SourceSpec],
    rule: &TimestampRule,
) -> Result<MergedStream, MergeError> {
    check_source_count(sources.len())?;
    let segmented = sources
        .iter()
        .enumerate()
        .map(|(index, source)| segment(&source.text, index, &source.label, rule))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(merge(segmented))
}

/// Run the whole pipeline and return the rendered output lines.
pub fn merge_sources(
    sources: &[SourceSpec],
    rule: &TimestampRule,
    use_color: bool,
) -> Result<Vec<String>, MergeError> {
    let stream = merge_entries(sources, rule)?;
    let mut lines = Vec::new();
    let mut entries = 0_usize;
    for entry in stream {
        let source = &sources[entry.source_index];
        render_into(
            &entry,
            source.prefix.as_deref(),
            source.color,
            use_color,
            &mut lines,
        );
        entries += 1;
    }
    debug!(
        sources = sources.len(),
        entries,
        lines = lines.len(),
        "merged sources"
    );
    Ok(lines)
}
