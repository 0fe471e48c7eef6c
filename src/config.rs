//! Configuration for lsmcore
//!
//! Centralized configuration with sensible defaults. Nothing in the core
//! opens files on its own; these settings describe where a caller keeps the
//! WAL and SSTable files and when it should flush a MemTable.

use std::path::PathBuf;

use crate::error::{LsmError, Result};

/// Main configuration for an lsmcore data directory
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for all data files
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── wal.log              (write-ahead log)
    ///     ├── sstable_000001.idx   (index of SSTable 1)
    ///     └── sstable_000001.seg   (segment of SSTable 1)
    pub data_dir: PathBuf,

    /// File name of the write-ahead log inside `data_dir`
    pub wal_file_name: String,

    // -------------------------------------------------------------------------
    // MemTable Configuration
    // -------------------------------------------------------------------------
    /// Accounted MemTable size (in bytes) at which a flush should happen
    pub memtable_size_limit: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./lsmcore_data"),
            wal_file_name: "wal.log".to_string(),
            memtable_size_limit: 4 * 1024 * 1024, // 4 MB
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Path of the write-ahead log
    pub fn wal_path(&self) -> PathBuf {
        self.data_dir.join(&self.wal_file_name)
    }

    /// Path of the index file for SSTable `id`
    pub fn index_path(&self, id: u64) -> PathBuf {
        self.data_dir.join(format!("sstable_{:06}.idx", id))
    }

    /// Path of the segment file for SSTable `id`
    pub fn segment_path(&self, id: u64) -> PathBuf {
        self.data_dir.join(format!("sstable_{:06}.seg", id))
    }

    /// Reject settings that can never work
    pub fn validate(&self) -> Result<()> {
        if self.memtable_size_limit == 0 {
            return Err(LsmError::Config(
                "memtable_size_limit must be greater than zero".to_string(),
            ));
        }
        if self.wal_file_name.is_empty() {
            return Err(LsmError::Config("wal_file_name must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root for all storage)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the WAL file name
    pub fn wal_file_name(mut self, name: impl Into<String>) -> Self {
        self.config.wal_file_name = name.into();
        self
    }

    /// Set the memtable size limit (in bytes)
    pub fn memtable_size_limit(mut self, size: u64) -> Self {
        self.config.memtable_size_limit = size;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
