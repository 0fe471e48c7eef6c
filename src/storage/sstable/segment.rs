//! SSTable Segment
//!
//! Append-only data file of encoded records, read back by byte offset.

use std::fs::File;
use std::path::Path;

use bytes::{Buf, BufMut, BytesMut};
use parking_lot::RwLock;

use crate::error::{LsmError, Result};
use crate::fileio;
use crate::memtable::Value;

use super::{open_backing_file, LIVE_FLAG, SEGMENT_HEADER_SIZE, TOMBSTONE_FLAG};

/// A record decoded from a segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentEntry {
    pub key: Vec<u8>,
    pub value: Value,
}

/// Append-only record file of one SSTable
pub struct Segment {
    inner: RwLock<Inner>,
}

struct Inner {
    /// `None` once closed
    file: Option<File>,
    /// Bytes in the file (next record offset)
    size: u64,
}

impl Segment {
    /// Open (or create) a segment file by path
    pub fn open(path: &Path) -> Result<Self> {
        Self::from_file(open_backing_file(path)?)
    }

    /// Wrap an open file; appends continue after its current end
    pub fn from_file(file: File) -> Result<Self> {
        let size = file.metadata()?.len();
        Ok(Self {
            inner: RwLock::new(Inner {
                file: Some(file),
                size,
            }),
        })
    }

    /// Append one record (not fsynced; see [`Segment::sync`]).
    ///
    /// A tombstone is written with `value_size = 0` and no value bytes.
    pub fn append(&self, key: &[u8], value: &Value) -> Result<()> {
        let mut inner = self.inner.write();
        let file = inner.file.as_ref().ok_or(LsmError::Closed("Segment"))?;

        let (flag, bytes) = match value {
            Value::Live(v) => (LIVE_FLAG, v.as_slice()),
            Value::Tombstone => (TOMBSTONE_FLAG, &[][..]),
        };
        let key_size = key.len() as u64;
        let value_size = bytes.len() as u64;

        let mut buf = BytesMut::with_capacity(SEGMENT_HEADER_SIZE + key.len() + bytes.len());
        buf.put_u8(flag);
        buf.put_u64(key_size + value_size);
        buf.put_u64(key_size);
        buf.put_u64(value_size);
        buf.put_slice(key);
        buf.put_slice(bytes);
        fileio::append_all(file, &buf)?;

        inner.size += buf.len() as u64;
        Ok(())
    }

    /// Read the record at `offset`.
    ///
    /// Any read or decode failure is reported as `None`, the same as a
    /// missing record. Use [`Segment::try_get`] to see the error.
    pub fn get(&self, offset: u64) -> Option<SegmentEntry> {
        match self.try_get(offset) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::debug!("Segment read at offset {} failed: {}", offset, e);
                None
            }
        }
    }

    /// Read the record at `offset`, surfacing failures
    pub fn try_get(&self, offset: u64) -> Result<SegmentEntry> {
        let inner = self.inner.read();
        let file = inner.file.as_ref().ok_or(LsmError::Closed("Segment"))?;

        let mut header = [0u8; SEGMENT_HEADER_SIZE];
        fileio::read_exact_at(file, &mut header, offset)?;

        let mut buf = &header[..];
        let flag = buf.get_u8();
        let _kv_size = buf.get_u64();
        let key_size = buf.get_u64();
        let value_size = buf.get_u64();

        let tombstone = match flag {
            LIVE_FLAG => false,
            TOMBSTONE_FLAG => true,
            other => {
                return Err(LsmError::SegmentCorruption(format!(
                    "invalid tombstone flag {} at offset {}",
                    other, offset
                )))
            }
        };

        let body_start = offset + SEGMENT_HEADER_SIZE as u64;
        let body_len = if tombstone {
            key_size
        } else {
            key_size.saturating_add(value_size)
        };
        if body_start.saturating_add(body_len) > inner.size {
            return Err(LsmError::SegmentCorruption(format!(
                "record at offset {} runs past end of segment ({} bytes)",
                offset, inner.size
            )));
        }

        let mut key = vec![0u8; key_size as usize];
        fileio::read_exact_at(file, &mut key, body_start)?;

        if tombstone {
            return Ok(SegmentEntry {
                key,
                value: Value::Tombstone,
            });
        }

        let mut value = vec![0u8; value_size as usize];
        fileio::read_exact_at(file, &mut value, body_start + key_size)?;

        Ok(SegmentEntry {
            key,
            value: Value::Live(value),
        })
    }

    /// Bytes written so far
    pub fn size(&self) -> u64 {
        self.inner.read().size
    }

    /// Force the segment file to durable storage
    pub fn sync(&self) -> Result<()> {
        let inner = self.inner.read();
        let file = inner.file.as_ref().ok_or(LsmError::Closed("Segment"))?;
        file.sync_all()?;
        Ok(())
    }

    /// Sync and release the file; size drops to 0. A second close is a no-op.
    pub fn close(&self) -> Result<()> {
        let mut inner = self.inner.write();
        let Some(file) = inner.file.take() else {
            return Ok(());
        };
        inner.size = 0;

        if let Err(e) = file.sync_all() {
            tracing::warn!("Segment failed to sync on close: {}", e);
            return Err(e.into());
        }
        Ok(())
    }
}
