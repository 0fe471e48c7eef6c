//! WAL record definitions
//!
//! Defines the structure and binary encoding of individual WAL records.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{LsmError, Result};

/// Operation byte (1)
pub const OP_SIZE: usize = 1;
/// Combined key + value length (8)
pub const KV_SIZE: usize = 8;
/// Key length (8)
pub const KEY_SIZE: usize = 8;
/// Value length (8)
pub const VALUE_SIZE: usize = 8;
/// Fixed prefix of every record: op + kv_size + key_size + value_size
pub const HEADER_SIZE: usize = OP_SIZE + KV_SIZE + KEY_SIZE + VALUE_SIZE;

/// Operations that can be logged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Operation {
    /// Delete a key
    Del = 0,

    /// Put a key-value pair
    Put = 1,
}

impl Operation {
    /// Decode an operation byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Operation::Del),
            1 => Some(Operation::Put),
            _ => None,
        }
    }

    pub fn as_byte(self) -> u8 {
        self as u8
    }
}

/// A single record in the WAL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalRecord {
    /// The operation to replay
    pub operation: Operation,

    pub key: Vec<u8>,

    /// Ignored on replay for `Del`
    pub value: Vec<u8>,
}

impl WalRecord {
    /// Record for a put
    pub fn put(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            operation: Operation::Put,
            key: key.into(),
            value: value.into(),
        }
    }

    /// Record for a delete (empty value)
    pub fn delete(key: impl Into<Vec<u8>>) -> Self {
        Self {
            operation: Operation::Del,
            key: key.into(),
            value: Vec::new(),
        }
    }

    /// Exact number of bytes `encode()` produces
    pub fn encoded_len(&self) -> u64 {
        (HEADER_SIZE + self.key.len() + self.value.len()) as u64
    }

    /// Encode as `op | kv_size | key_size | value_size | key | value`,
    /// integers big-endian
    pub fn encode(&self) -> Bytes {
        let key_size = self.key.len() as u64;
        let value_size = self.value.len() as u64;

        let mut buf = BytesMut::with_capacity(self.encoded_len() as usize);
        buf.put_u8(self.operation.as_byte());
        buf.put_u64(key_size + value_size);
        buf.put_u64(key_size);
        buf.put_u64(value_size);
        buf.put_slice(&self.key);
        buf.put_slice(&self.value);
        buf.freeze()
    }
}

/// Decoded fixed-width prefix of a record
#[derive(Debug, Clone, Copy)]
pub(crate) struct RecordHeader {
    pub(crate) operation: Operation,
    pub(crate) key_size: u64,
    pub(crate) value_size: u64,
}

impl RecordHeader {
    /// Decode the 25-byte prefix. `kv_size` is redundant and not checked.
    pub(crate) fn decode(header: &[u8; HEADER_SIZE]) -> Result<Self> {
        let mut buf = &header[..];

        let op = buf.get_u8();
        let operation = Operation::from_byte(op)
            .ok_or_else(|| LsmError::WalCorruption(format!("unknown operation byte {}", op)))?;
        let _kv_size = buf.get_u64();
        let key_size = buf.get_u64();
        let value_size = buf.get_u64();

        Ok(Self {
            operation,
            key_size,
            value_size,
        })
    }

    /// Bytes of key and value following the header
    pub(crate) fn body_len(&self) -> u64 {
        self.key_size.saturating_add(self.value_size)
    }
}
