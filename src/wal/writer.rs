//! WAL Writer
//!
//! Handles appending records to the WAL file.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

use crate::error::{LsmError, Result};
use crate::fileio;

use super::{WalReader, WalRecord};

/// Append-only, fsync-per-record write-ahead log
///
/// ## Concurrency:
/// - `append`/`sync`/`close` take the write lock
/// - `size` takes the read lock
pub struct Wal {
    /// Backing file path (needed by `destroy`)
    path: PathBuf,
    inner: RwLock<Inner>,
}

struct Inner {
    /// `None` once closed
    file: Option<File>,
    /// Accounted byte length of the log
    size: u64,
}

impl Wal {
    /// Open or create a WAL file
    ///
    /// Existing contents are kept; `size()` starts at the current file length.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)?;
        let size = file.metadata()?.len();

        Ok(Self {
            path,
            inner: RwLock::new(Inner {
                file: Some(file),
                size,
            }),
        })
    }

    /// Append a record to the WAL
    ///
    /// The record is written in one piece and fsynced before this returns, so
    /// a successful append survives a crash right after it.
    pub fn append(&self, record: &WalRecord) -> Result<()> {
        let mut inner = self.inner.write();
        let file = inner.file.as_ref().ok_or(LsmError::Closed("WAL"))?;

        let encoded = record.encode();
        fileio::append_all(file, &encoded)?;
        file.sync_all()?;

        inner.size += encoded.len() as u64;
        Ok(())
    }

    /// Accounted byte length of the log
    pub fn size(&self) -> u64 {
        self.inner.read().size
    }

    /// Force sync to disk
    pub fn sync(&self) -> Result<()> {
        let inner = self.inner.write();
        let file = inner.file.as_ref().ok_or(LsmError::Closed("WAL"))?;
        file.sync_all()?;
        Ok(())
    }

    /// Sync and release the file handle; size drops to 0.
    ///
    /// Closing an already-closed WAL is a no-op. Every other operation on a
    /// closed WAL fails with `LsmError::Closed`.
    pub fn close(&self) -> Result<()> {
        let mut inner = self.inner.write();
        let Some(file) = inner.file.take() else {
            return Ok(());
        };
        inner.size = 0;

        if let Err(e) = file.sync_all() {
            tracing::warn!("WAL {} failed to sync on close: {}", self.path.display(), e);
            return Err(e.into());
        }
        Ok(())
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reader over every record currently in the log, starting at offset 0
    pub fn reader(&self) -> Result<WalReader> {
        let inner = self.inner.read();
        let file = inner.file.as_ref().ok_or(LsmError::Closed("WAL"))?;
        WalReader::from_file(file.try_clone()?)
    }
}
