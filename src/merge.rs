//! Chronological k-way merge of per-source entry sequences.
//!
//! Each source keeps one buffered head; a min-heap keyed on
//! [`MergeKey`] picks the next entry. Only a source's current head is ever
//! comparable, so entries from one source are never reordered.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::vec;

use crate::segment::Entry;
use crate::timestamp::Instant;

/// Ordering key of an entry in the merged stream.
///
/// Field order defines the ordering: timestamp first (an orphan's `None`
/// sorts before any instant), then the source listed earlier on input,
/// then position within the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MergeKey {
    pub timestamp: Option<Instant>,
    pub source_index: usize,
    pub sequence_in_source: usize,
}

impl MergeKey {
    pub const fn of(entry: &Entry) -> Self {
        Self {
            timestamp: entry.timestamp,
            source_index: entry.source_index,
            sequence_in_source: entry.sequence_in_source,
        }
    }
}

/// The merged entries, produced lazily in global order.
///
/// Consumed once; there is no way to rewind.
#[derive(Debug)]
pub struct MergedStream {
    cursors: Vec<vec::IntoIter<Entry>>,
    /// Buffered head of each cursor, taken when its key is popped.
    pending: Vec<Option<Entry>>,
    heap: BinaryHeap<Reverse<(MergeKey, usize)>>,
}

/// Merge per-source entry sequences into one chronologically ordered
/// stream.
///
/// Ties on timestamp go to the lower `source_index`. The merge itself
/// cannot fail.
pub fn merge(sources: Vec<Vec<Entry>>) -> MergedStream {
    let mut stream = MergedStream {
        cursors: Vec::with_capacity(sources.len()),
        pending: Vec::with_capacity(sources.len()),
        heap: BinaryHeap::with_capacity(sources.len()),
    };
    for (slot, entries) in sources.into_iter().enumerate() {
        stream.cursors.push(entries.into_iter());
        stream.pending.push(None);
        stream.advance(slot);
    }
    stream
}

impl MergedStream {
    /// Buffer the next entry of `slot`, if any, and queue its key.
    fn advance(&mut self, slot: usize) {
        if let Some(entry) = self.cursors[slot].next() {
            self.heap.push(Reverse((MergeKey::of(&entry), slot)));
            self.pending[slot] = Some(entry);
        }
    }
}

impl Iterator for MergedStream {
    type Item = Entry;

    fn next(&mut self) -> Option<Entry> {
        let Reverse((_, slot)) = self.heap.pop()?;
        let entry = self.pending[slot].take();
        self.advance(slot);
        entry
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let buffered: usize = self.cursors.iter().map(ExactSizeIterator::len).sum();
        let remaining = self.heap.len() + buffered;
        (remaining, Some(remaining))
    }
}
