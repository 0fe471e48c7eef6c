//! MemTable implementation
//!
//! BTreeMap-based memtable with RwLock for concurrency.

use std::collections::BTreeMap;
use std::fs::File;

use parking_lot::RwLock;

use crate::error::Result;
use crate::storage::SSTable;

use super::Value;

/// In-memory table for recent writes
///
/// ## Size accounting
/// - first insert of a key adds `len(key) + len(value)`
/// - overwriting a live value adds `len(new) - len(old)`
/// - putting over a tombstone adds `len(new)`
/// - deleting a live value subtracts `len(value)`
///
/// The key's own bytes are never refunded while the key stays in the table,
/// tombstoned or not. Only `clear()` resets the counter.
pub struct MemTable {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    data: BTreeMap<Vec<u8>, Value>,
    size: u64,
}

impl MemTable {
    /// Create a new empty MemTable
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Get the entry for a key (read lock)
    ///
    /// Returns:
    /// - `Some(Value::Live(v))`: live value
    /// - `Some(Value::Tombstone)`: key was explicitly deleted
    /// - `None`: key never written (or cleared)
    pub fn get(&self, key: &[u8]) -> Option<Value> {
        self.inner.read().data.get(key).cloned()
    }

    /// Put a key-value pair (write lock), returning the new accounted size
    pub fn put(&self, key: Vec<u8>, value: Vec<u8>) -> u64 {
        let mut inner = self.inner.write();

        let added = value.len() as u64;
        let previous = inner.data.get(key.as_slice()).map(Value::live_len);
        inner.size = match previous {
            None => inner.size + key.len() as u64 + added,
            Some(removed) => inner.size - removed + added,
        };

        inner.data.insert(key, Value::Live(value));
        inner.size
    }

    /// Delete a key (write lock, inserts tombstone), returning the new
    /// accounted size. Idempotent: absent and already-deleted keys end up
    /// tombstoned as well.
    pub fn delete(&self, key: Vec<u8>) -> u64 {
        let mut inner = self.inner.write();

        let removed = inner.data.get(key.as_slice()).map_or(0, Value::live_len);
        inner.size -= removed;

        inner.data.insert(key, Value::Tombstone);
        inner.size
    }

    /// Get accounted size in bytes
    pub fn size(&self) -> u64 {
        self.inner.read().size
    }

    /// Get entry count (tombstones included)
    pub fn entry_count(&self) -> usize {
        self.inner.read().data.len()
    }

    /// True if no key (live or tombstoned) is present
    pub fn is_empty(&self) -> bool {
        self.inner.read().data.is_empty()
    }

    /// Check if should flush (size >= limit)
    pub fn should_flush(&self, size_limit: u64) -> bool {
        self.size() >= size_limit
    }

    /// Clear all entries (after successful flush)
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.data.clear();
        inner.size = 0;
    }

    /// Write every entry, in key order, into a new SSTable over the given
    /// index and segment files.
    ///
    /// Holds the read lock for the whole scan: concurrent `get`s proceed,
    /// writers wait until the flush finishes. Each index entry is appended
    /// before its segment record, so it points at the segment length the
    /// record is about to start at.
    ///
    /// A failed flush leaves the SSTable's files in an unspecified state; the
    /// caller should discard them.
    pub fn flush(&self, index_file: File, segment_file: File) -> Result<SSTable> {
        let inner = self.inner.read();

        let sstable = SSTable::new(index_file, segment_file)?;

        for (key, value) in inner.data.iter() {
            sstable.index().append(key, sstable.segment().size())?;
            sstable.segment().append(key, value)?;
        }

        tracing::info!(
            "Flushed {} MemTable entries ({} segment bytes)",
            inner.data.len(),
            sstable.segment().size()
        );

        Ok(sstable)
    }
}

impl Default for MemTable {
    fn default() -> Self {
        Self::new()
    }
}
