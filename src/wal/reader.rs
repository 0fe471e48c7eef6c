//! WAL Reader
//!
//! Decodes records sequentially from the start of a WAL file.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use crate::error::{LsmError, Result};
use crate::fileio::{self, FileReader};

use super::record::{RecordHeader, HEADER_SIZE};
use super::WalRecord;

/// Reads records from a WAL file, front to back
///
/// Stops cleanly when the file ends exactly on a record boundary. A record cut
/// short by a crash is reported as `WalCorruption`, after which the reader
/// yields nothing more.
pub struct WalReader {
    reader: BufReader<FileReader<File>>,
    /// Byte offset of the next record
    position: u64,
    /// File length when the reader was opened
    end: u64,
    done: bool,
}

impl WalReader {
    /// Open a WAL file for reading
    pub fn open(path: &Path) -> Result<Self> {
        Self::from_file(File::open(path)?)
    }

    /// Read through an existing handle (reads are positional)
    pub fn from_file(file: File) -> Result<Self> {
        let end = file.metadata()?.len();
        Ok(Self {
            reader: BufReader::new(FileReader::new(file, 0)),
            position: 0,
            end,
            done: false,
        })
    }

    /// Offset of the next undecoded byte
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Read the next record from the WAL (`Ok(None)` at end-of-file)
    pub fn next_record(&mut self) -> Result<Option<WalRecord>> {
        if self.done {
            return Ok(None);
        }

        let result = self.read_record();
        if !matches!(result, Ok(Some(_))) {
            self.done = true;
        }
        result
    }

    fn read_record(&mut self) -> Result<Option<WalRecord>> {
        let start = self.position;

        let mut header = [0u8; HEADER_SIZE];
        match fileio::read_header(&mut self.reader, &mut header) {
            Ok(false) => return Ok(None),
            Ok(true) => {}
            Err(e) => return Err(self.torn(start, e)),
        }
        let header = RecordHeader::decode(&header)?;

        let remaining = self.end.saturating_sub(start + HEADER_SIZE as u64);
        if header.body_len() > remaining {
            return Err(LsmError::WalCorruption(format!(
                "record at offset {} needs {} body bytes, only {} remain",
                start,
                header.body_len(),
                remaining
            )));
        }

        let mut key = vec![0u8; header.key_size as usize];
        self.reader
            .read_exact(&mut key)
            .map_err(|e| self.torn(start, e))?;

        let mut value = vec![0u8; header.value_size as usize];
        self.reader
            .read_exact(&mut value)
            .map_err(|e| self.torn(start, e))?;

        self.position = start + HEADER_SIZE as u64 + header.body_len();

        Ok(Some(WalRecord {
            operation: header.operation,
            key,
            value,
        }))
    }

    /// Map a short read inside a record to a corruption error
    fn torn(&self, start: u64, err: io::Error) -> LsmError {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            LsmError::WalCorruption(format!("truncated record at offset {}: {}", start, err))
        } else {
            LsmError::Io(err)
        }
    }
}

impl Iterator for WalReader {
    type Item = Result<WalRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}
