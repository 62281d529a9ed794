//! Grouping of one source's lines into multi-line entries.
//!
//! A line carrying a timestamp opens a new [`Entry`]; every other line is a
//! continuation of the entry before it. Lines that precede the first
//! timestamp are kept in an orphan entry with no timestamp.

use tracing::{debug, warn};

use crate::error::MergeError;
use crate::timestamp::{Instant, TimestampRule};

/// One logical log record: a header line plus its continuation lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Index of the source this entry came from (0-based, input order).
    pub source_index: usize,
    /// Position of the entry within its source.
    pub sequence_in_source: usize,
    /// `None` only for an orphan entry at the head of a source.
    pub timestamp: Option<Instant>,
    /// Raw lines, header first. Never empty.
    pub lines: Vec<String>,
}

impl Entry {
    pub const fn is_orphan(&self) -> bool {
        self.timestamp.is_none()
    }
}

/// Per-source segmentation state.
enum State {
    NoEntryOpen,
    EntryOpen(Entry),
}

/// Split `text` into entries.
///
/// `label` only names the source in errors. A custom timestamp rule whose
/// regex captures text its format rejects fails the whole source with a
/// configuration error pointing at the offending line.
pub fn segment(
    text: &str,
    source_index: usize,
    label: &str,
    rule: &TimestampRule,
) -> Result<Vec<Entry>, MergeError> {
    let mut entries = Vec::new();
    let mut state = State::NoEntryOpen;

    for (line_index, line) in split_lines(text).enumerate() {
        let timestamp = rule.extract(line).map_err(|mismatch| {
            MergeError::Config(format!(
                "{label}, line {}: {mismatch}",
                line_index + 1
            ))
        })?;

        state = match (state, timestamp) {
            (State::NoEntryOpen, timestamp) => State::EntryOpen(Entry {
                source_index,
                sequence_in_source: entries.len(),
                timestamp,
                lines: vec![line.to_string()],
            }),
            (State::EntryOpen(current), Some(timestamp)) => {
                entries.push(current);
                State::EntryOpen(Entry {
                    source_index,
                    sequence_in_source: entries.len(),
                    timestamp: Some(timestamp),
                    lines: vec![line.to_string()],
                })
            }
            (State::EntryOpen(mut current), None) => {
                current.lines.push(line.to_string());
                State::EntryOpen(current)
            }
        };
    }

    if let State::EntryOpen(current) = state {
        entries.push(current);
    }

    report(&entries, label);
    Ok(entries)
}

/// Split on `\n` or `\r\n`. A final newline does not produce an extra
/// empty line.
pub fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines()
}

fn report(entries: &[Entry], label: &str) {
    let orphan_lines = entries
        .first()
        .filter(|entry| entry.is_orphan())
        .map_or(0, |entry| entry.lines.len());

    if orphan_lines > 0 {
        if entries.len() == 1 {
            warn!(
                source = label,
                lines = orphan_lines,
                "no timestamped entry found; the whole source sorts first"
            );
        } else {
            warn!(
                source = label,
                lines = orphan_lines,
                "lines before the first timestamp kept as an orphan entry"
            );
        }
    }

    debug!(
        source = label,
        entries = entries.len(),
        orphan_lines,
        "segmented source"
    );
}
