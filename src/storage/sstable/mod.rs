//! SSTable Module
//!
//! Sorted String Table - an Index file and a Segment file opened together.
//!
//! ## File Formats
//! Integers are big-endian.
//! ```text
//! Segment (data file)
//! ┌──────────────────────────────────────────────────────────────────┐
//! │ Tombstone (1) | KV Size (8) | Key Size (8) | Value Size (8)      │
//! │ Key | Value (value bytes only when Tombstone = 0)                │
//! │ ... repeated for each record ...                                 │
//! └──────────────────────────────────────────────────────────────────┘
//!
//! Index (key → segment offset log)
//! ┌──────────────────────────────────────────────────────────────────┐
//! │ Key Size (8) | Key | Offset (8)                                  │
//! │ ... repeated, in append order; later entries win on rebuild ...  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Neither file is fsynced on append. Durability waits for an explicit
//! `sync()`; the WAL is what recovers unflushed writes.

mod index;
mod iterator;
mod segment;

use std::fs::{File, OpenOptions};
use std::path::Path;

use crate::error::Result;
use crate::memtable::Value;

pub use index::Index;
pub use iterator::IndexIterator;
pub use segment::{Segment, SegmentEntry};

// =============================================================================
// Shared Constants (used by index, segment, iterator)
// =============================================================================

/// Tombstone flag (1)
pub const TOMBSTONE_SIZE: usize = 1;
/// Combined key + value length (8)
pub const KV_SIZE: usize = 8;
/// Key length (8)
pub const KEY_SIZE: usize = 8;
/// Value length (8)
pub const VALUE_SIZE: usize = 8;
/// Segment offset stored in an index entry (8)
pub const OFFSET_SIZE: usize = 8;

/// Fixed prefix of a segment record: 1 + 8 + 8 + 8 = 25 bytes
pub const SEGMENT_HEADER_SIZE: usize = TOMBSTONE_SIZE + KV_SIZE + KEY_SIZE + VALUE_SIZE;

/// Flag byte for a live record
pub(crate) const LIVE_FLAG: u8 = 0;
/// Flag byte for a tombstone record
pub(crate) const TOMBSTONE_FLAG: u8 = 1;

/// Open a backing file for append + positional reads, creating it if needed
pub(crate) fn open_backing_file(path: &Path) -> Result<File> {
    Ok(OpenOptions::new()
        .create(true)
        .read(true)
        .append(true)
        .open(path)?)
}

// =============================================================================
// SSTable
// =============================================================================

/// One Index paired with one Segment
///
/// Owns both; `close()` closes both.
pub struct SSTable {
    index: Index,
    segment: Segment,
}

impl SSTable {
    /// Build an SSTable over two open files.
    ///
    /// A non-empty index file is rebuilt by a full scan; a non-empty segment
    /// file is appended to after its current end.
    pub fn new(index_file: File, segment_file: File) -> Result<Self> {
        let index = Index::from_file(index_file)?;
        let segment = Segment::from_file(segment_file)?;
        Ok(Self { index, segment })
    }

    /// Open (or create) both files by path
    pub fn open(index_path: &Path, segment_path: &Path) -> Result<Self> {
        Self::new(open_backing_file(index_path)?, open_backing_file(segment_path)?)
    }

    /// Look up a key
    ///
    /// Returns:
    /// - `Some(Value::Live(v))`: live value read from the segment
    /// - `Some(Value::Tombstone)`: key was deleted when flushed
    /// - `None`: key not indexed, or its segment record could not be read
    pub fn get(&self, key: &[u8]) -> Option<Value> {
        let offset = self.index.get(key)?;
        self.segment.get(offset).map(|entry| entry.value)
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn segment(&self) -> &Segment {
        &self.segment
    }

    /// Force both files to durable storage
    pub fn sync(&self) -> Result<()> {
        self.index.sync()?;
        self.segment.sync()
    }

    /// Close both members. The segment is closed even if closing the index
    /// fails; the first error is returned.
    pub fn close(&self) -> Result<()> {
        let index_result = self.index.close();
        let segment_result = self.segment.close();
        index_result.and(segment_result)
    }
}
