//! MemTable Module
//!
//! In-memory data structure for recent writes.
//!
//! ## Responsibilities
//! - Fast reads and writes in memory
//! - Many readers / exclusive writer access through one RwLock
//! - Track accounted size for flush triggers
//! - Ordered scan for SSTable creation (flush)
//!
//! ## Data Structure Choice
//! BTreeMap wrapped in RwLock:
//! - Byte-lexicographic key order (required for SSTable generation)
//! - Tombstones are stored as entries, never as removed keys

mod table;

pub use table::MemTable;

/// Value stored under a key: either live bytes or a deletion marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// A live value
    Live(Vec<u8>),

    /// A tombstone (deleted key)
    Tombstone,
}

impl Value {
    /// True if this is a deletion marker
    pub fn is_tombstone(&self) -> bool {
        matches!(self, Value::Tombstone)
    }

    /// The live bytes, or `None` for a tombstone
    pub fn as_live(&self) -> Option<&[u8]> {
        match self {
            Value::Live(v) => Some(v),
            Value::Tombstone => None,
        }
    }

    /// Byte cost of the value itself (tombstones cost nothing)
    pub(crate) fn live_len(&self) -> u64 {
        self.as_live().map_or(0, |v| v.len() as u64)
    }
}
