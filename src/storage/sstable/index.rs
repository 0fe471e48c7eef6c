//! SSTable Index
//!
//! In-memory key → segment offset map, persisted as an append-only log of
//! `key_size | key | offset` entries.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use bytes::{BufMut, BytesMut};
use parking_lot::{RwLock, RwLockReadGuard};

use crate::error::{LsmError, Result};
use crate::fileio::{self, FileReader};

use super::iterator::IndexIterator;
use super::{open_backing_file, KEY_SIZE, OFFSET_SIZE};

/// Key → offset index of one SSTable
///
/// ## Concurrency:
/// - `append`/`close` take the write lock
/// - `get`/`size`/iteration take the read lock
pub struct Index {
    inner: RwLock<Inner>,
}

pub(super) struct Inner {
    /// `None` once closed
    pub(super) file: Option<File>,
    /// Latest offset per key
    pub(super) map: HashMap<Vec<u8>, u64>,
    /// Entry count
    size: u64,
}

impl Index {
    /// Open (or create) an index file by path
    pub fn open(path: &Path) -> Result<Self> {
        Self::from_file(open_backing_file(path)?)
    }

    /// Wrap an open file. An empty file starts a fresh index; anything else
    /// is replayed entry by entry, and any decode failure aborts the open.
    pub fn from_file(file: File) -> Result<Self> {
        let len = file.metadata()?.len();

        let (map, size) = if len == 0 {
            (HashMap::new(), 0)
        } else {
            let map = rebuild(&file, len)?;
            let size = map.len() as u64;
            (map, size)
        };

        Ok(Self {
            inner: RwLock::new(Inner {
                file: Some(file),
                map,
                size,
            }),
        })
    }

    /// Record `key → offset`
    ///
    /// The entry is written to the file but not fsynced; see [`Index::sync`].
    pub fn append(&self, key: &[u8], offset: u64) -> Result<()> {
        let mut inner = self.inner.write();
        let file = inner.file.as_ref().ok_or(LsmError::Closed("Index"))?;

        let mut buf = BytesMut::with_capacity(KEY_SIZE + key.len() + OFFSET_SIZE);
        buf.put_u64(key.len() as u64);
        buf.put_slice(key);
        buf.put_u64(offset);
        fileio::append_all(file, &buf)?;

        inner.map.insert(key.to_vec(), offset);
        inner.size += 1;
        Ok(())
    }

    /// O(1) lookup of the latest offset for `key`
    pub fn get(&self, key: &[u8]) -> Option<u64> {
        self.inner.read().map.get(key).copied()
    }

    /// Entry count
    ///
    /// Counts every `append`; after a rebuild it is the number of distinct
    /// keys found in the file.
    pub fn size(&self) -> u64 {
        self.inner.read().size
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Force the index file to durable storage
    pub fn sync(&self) -> Result<()> {
        let inner = self.inner.read();
        let file = inner.file.as_ref().ok_or(LsmError::Closed("Index"))?;
        file.sync_all()?;
        Ok(())
    }

    /// Sync, release the file and clear in-memory state. A second close is a
    /// no-op.
    pub fn close(&self) -> Result<()> {
        let mut inner = self.inner.write();
        let Some(file) = inner.file.take() else {
            return Ok(());
        };
        inner.map.clear();
        inner.size = 0;

        if let Err(e) = file.sync_all() {
            tracing::warn!("Index failed to sync on close: {}", e);
            return Err(e.into());
        }
        Ok(())
    }

    /// Forward-only walk over the entries in the file, from the start
    pub fn iter(&self) -> IndexIterator<'_> {
        IndexIterator::new(self)
    }

    pub(super) fn read_inner(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read()
    }
}

/// Replay every entry of a non-empty index file
fn rebuild(file: &File, len: u64) -> Result<HashMap<Vec<u8>, u64>> {
    let mut reader = BufReader::new(FileReader::new(file, 0));
    let mut map = HashMap::new();
    let mut position = 0;
    let mut entries = 0u64;

    while let Some((key, offset, next)) = read_entry(&mut reader, position, len)? {
        map.insert(key, offset);
        position = next;
        entries += 1;
    }

    tracing::debug!(
        "Rebuilt index: {} entries, {} distinct keys, {} bytes",
        entries,
        map.len(),
        position
    );

    Ok(map)
}

/// Decode the entry starting at `position`.
///
/// Returns `(key, offset, next_position)`, or `None` at a clean end-of-file.
pub(super) fn read_entry<R: Read>(
    reader: &mut R,
    position: u64,
    len: u64,
) -> Result<Option<(Vec<u8>, u64, u64)>> {
    let mut key_size = [0u8; KEY_SIZE];
    match fileio::read_header(reader, &mut key_size) {
        Ok(false) => return Ok(None),
        Ok(true) => {}
        Err(e) => return Err(torn(position, e)),
    }
    let key_size = u64::from_be_bytes(key_size);

    let remaining = len.saturating_sub(position + KEY_SIZE as u64);
    if key_size.saturating_add(OFFSET_SIZE as u64) > remaining {
        return Err(LsmError::IndexCorruption(format!(
            "entry at offset {} declares a {}-byte key, only {} bytes remain",
            position, key_size, remaining
        )));
    }

    let mut key = vec![0u8; key_size as usize];
    reader.read_exact(&mut key).map_err(|e| torn(position, e))?;

    let mut offset = [0u8; OFFSET_SIZE];
    reader.read_exact(&mut offset).map_err(|e| torn(position, e))?;

    let next = position + (KEY_SIZE + OFFSET_SIZE) as u64 + key_size;
    Ok(Some((key, u64::from_be_bytes(offset), next)))
}

fn torn(position: u64, err: io::Error) -> LsmError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        LsmError::IndexCorruption(format!("truncated entry at offset {}: {}", position, err))
    } else {
        LsmError::Io(err)
    }
}
