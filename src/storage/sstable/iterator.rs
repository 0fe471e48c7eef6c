//! Index Iterator
//!
//! Sequential walk over the entries of an index file.

use crate::error::{LsmError, Result};
use crate::fileio::{self, FileReader};

use super::index::{read_entry, Index};
use super::KEY_SIZE;

/// Forward-only, non-restartable iterator over `(key, offset)` pairs
///
/// Entries come from re-reading the index file, not from the in-memory map,
/// so a key appended twice is visited twice. The offset reported for each
/// key is the latest one in the map.
pub struct IndexIterator<'a> {
    index: &'a Index,
    /// File offset of the next entry
    position: u64,
    /// Set once `Iterator::next` has yielded an error
    failed: bool,
}

impl<'a> IndexIterator<'a> {
    pub(super) fn new(index: &'a Index) -> Self {
        Self {
            index,
            position: 0,
            failed: false,
        }
    }

    /// True if a key-size field can be read at the current position.
    ///
    /// Only probes those 8 bytes: a file cut off inside an entry can report
    /// `true` here and then fail in [`IndexIterator::next_entry`].
    pub fn has_next(&self) -> bool {
        let inner = self.index.read_inner();
        let Some(file) = inner.file.as_ref() else {
            return false;
        };

        let mut probe = [0u8; KEY_SIZE];
        fileio::read_exact_at(file, &mut probe, self.position).is_ok()
    }

    /// Decode the next entry.
    ///
    /// Fails with `LsmError::Exhausted` past the last entry, or with the
    /// decode error of a torn entry.
    pub fn next_entry(&mut self) -> Result<(Vec<u8>, u64)> {
        let inner = self.index.read_inner();
        let file = inner.file.as_ref().ok_or(LsmError::Closed("Index"))?;
        let len = file.metadata()?.len();

        let mut reader = FileReader::new(file, self.position);
        let (key, stored_offset, next) =
            read_entry(&mut reader, self.position, len)?.ok_or(LsmError::Exhausted)?;
        self.position = next;

        // A key missing from the map can only come from outside this handle;
        // report what the file says.
        let offset = inner.map.get(&key).copied().unwrap_or(stored_offset);
        Ok((key, offset))
    }
}

impl Iterator for IndexIterator<'_> {
    type Item = Result<(Vec<u8>, u64)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || !self.has_next() {
            return None;
        }

        let entry = self.next_entry();
        self.failed = entry.is_err();
        Some(entry)
    }
}
