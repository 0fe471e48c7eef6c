//! # lsmcore
//!
//! Durability and indexing core of a log-structured-merge storage engine:
//! - Write-Ahead Logging (WAL), fsynced on every append, for crash recovery
//! - An ordered MemTable with tombstone deletes
//! - Immutable SSTables made of a key → offset Index and a data Segment
//!
//! ## Architecture Overview
//!
//! ```text
//!            write                         read
//!              │                             │
//!              ▼                             ▼
//!   ┌─────────────────┐  replay   ┌─────────────────┐
//!   │       WAL       │ ────────▶ │    MemTable     │
//!   │ (append+fsync)  │ (startup) │    (RwLock)     │
//!   └─────────────────┘           └────────┬────────┘
//!                                          │ flush
//!                                          ▼
//!                         ┌─────────────────────────────────┐
//!                         │             SSTable             │
//!                         │  ┌─────────┐      ┌──────────┐  │
//!                         │  │  Index  │ ───▶ │ Segment  │  │
//!                         │  │key→off. │      │ records  │  │
//!                         │  └─────────┘      └──────────┘  │
//!                         └─────────────────────────────────┘
//! ```
//!
//! Each structure owns its own lock; nothing here spans two of them. A write
//! path built on these types appends to the WAL first, then applies the
//! change to the MemTable.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

mod fileio;

pub mod wal;
pub mod memtable;
pub mod storage;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{LsmError, Result};
pub use config::Config;
pub use memtable::{MemTable, Value};
pub use storage::SSTable;
pub use wal::{Wal, WalRecord};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of lsmcore
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
