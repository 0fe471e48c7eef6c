//! Storage Module
//!
//! Persistent storage layer: immutable SSTables produced by MemTable flushes.
//!
//! ## Responsibilities
//! - Persist flushed data as an Index file plus a Segment file
//! - Point lookups (key → offset → record)
//! - Rebuild the in-memory index when an SSTable is reopened
//!
//! Deciding when to flush, and reading across several SSTables, belongs to
//! whatever assembles these primitives into a store.

mod sstable;

pub use sstable::{
    Index, IndexIterator, SSTable, Segment, SegmentEntry, KEY_SIZE, KV_SIZE, OFFSET_SIZE,
    SEGMENT_HEADER_SIZE, TOMBSTONE_SIZE, VALUE_SIZE,
};
