//! WAL Recovery
//!
//! Handles crash recovery by replaying the WAL into a fresh MemTable.

use std::fs;

use crate::error::Result;
use crate::memtable::MemTable;

use super::{Operation, Wal};

/// Result of a recovery operation
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecoveryStats {
    /// Number of records replayed
    pub records: u64,

    /// Of which puts
    pub puts: u64,

    /// Of which deletes
    pub deletes: u64,

    /// Bytes decoded (offset just past the last record)
    pub bytes_read: u64,
}

impl Wal {
    /// Rebuild a MemTable by replaying every record in file order.
    ///
    /// Runs once at startup, before any append is accepted; it does not
    /// serialize against concurrent appends. Any decode failure, including a
    /// torn trailing record, aborts recovery.
    pub fn recover(&self) -> Result<MemTable> {
        self.recover_with_stats().map(|(memtable, _)| memtable)
    }

    /// Same as [`Wal::recover`], also reporting what was replayed
    pub fn recover_with_stats(&self) -> Result<(MemTable, RecoveryStats)> {
        let memtable = MemTable::new();
        let mut stats = RecoveryStats::default();

        let mut reader = self.reader()?;
        while let Some(record) = reader.next_record()? {
            match record.operation {
                Operation::Put => {
                    memtable.put(record.key, record.value);
                    stats.puts += 1;
                }
                Operation::Del => {
                    memtable.delete(record.key);
                    stats.deletes += 1;
                }
            }
            stats.records += 1;
        }
        stats.bytes_read = reader.position();

        tracing::debug!(
            "WAL recovery from {}: {} records ({} puts, {} deletes), {} bytes",
            self.path().display(),
            stats.records,
            stats.puts,
            stats.deletes,
            stats.bytes_read
        );

        Ok((memtable, stats))
    }

    /// Close the WAL and delete its backing file
    ///
    /// For tests and cleanup, not for the normal lifecycle.
    pub fn destroy(self) -> Result<()> {
        self.close()?;
        fs::remove_file(self.path())?;

        tracing::info!("Destroyed WAL {}", self.path().display());
        Ok(())
    }
}
