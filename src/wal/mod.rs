//! Write-Ahead Log (WAL) Module
//!
//! Provides durability guarantees through append-only logging.
//!
//! ## Responsibilities
//! - Append a record (and fsync it) before the caller mutates the MemTable
//! - Replay the log into a fresh MemTable after a crash
//!
//! Appending first and applying second is the caller's contract; nothing
//! here ties a WAL to a MemTable.
//!
//! ## File Format
//! Records are concatenated with no framing or checksum. Integers are
//! big-endian.
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ Record 1                                                     │
//! │ ┌────────┬─────────────┬─────────────┬─────────────┬────────┐ │
//! │ │ Op (1) │ KV Size (8) │ Key Size (8)│ Val Size (8)│Key|Val │ │
//! │ └────────┴─────────────┴─────────────┴─────────────┴────────┘ │
//! ├──────────────────────────────────────────────────────────────┤
//! │ Record 2 ...                                                 │
//! └──────────────────────────────────────────────────────────────┘
//! Op: 0 = Del, 1 = Put
//! ```

mod record;
mod writer;
mod reader;
mod recovery;

pub use record::{Operation, WalRecord, HEADER_SIZE, KEY_SIZE, KV_SIZE, OP_SIZE, VALUE_SIZE};
pub use writer::Wal;
pub use reader::WalReader;
pub use recovery::RecoveryStats;
