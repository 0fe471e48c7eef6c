//! File I/O helpers
//!
//! Every backing file (WAL, Index, Segment) is a plain `std::fs::File` used in
//! two ways: appends at end-of-file under the owner's exclusive lock, and
//! positional reads that never touch the shared cursor on unix.

use std::borrow::Borrow;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};

/// Read exactly `buf.len()` bytes starting at `offset`
#[cfg(unix)]
pub(crate) fn read_exact_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<()> {
    use std::os::unix::fs::FileExt;
    file.read_exact_at(buf, offset)
}

/// Read exactly `buf.len()` bytes starting at `offset`
#[cfg(windows)]
pub(crate) fn read_exact_at(file: &File, mut buf: &mut [u8], mut offset: u64) -> io::Result<()> {
    while !buf.is_empty() {
        match read_at(file, buf, offset) {
            Ok(0) => {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "failed to fill whole buffer",
                ))
            }
            Ok(n) => {
                buf = &mut buf[n..];
                offset += n as u64;
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

/// Read up to `buf.len()` bytes at `offset`; 0 means end-of-file
#[cfg(unix)]
pub(crate) fn read_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    use std::os::unix::fs::FileExt;
    file.read_at(buf, offset)
}

/// Read up to `buf.len()` bytes at `offset`; 0 means end-of-file
#[cfg(windows)]
pub(crate) fn read_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    use std::os::windows::fs::FileExt;
    file.seek_read(buf, offset)
}

/// Append `data` at the current end of `file`.
///
/// Callers hold their exclusive lock, so seeking to the end and writing is
/// not interleaved with another append on the same handle.
pub(crate) fn append_all(file: &File, data: &[u8]) -> io::Result<()> {
    let mut handle = file;
    handle.seek(SeekFrom::End(0))?;
    handle.write_all(data)?;
    handle.flush()
}

/// Fill `buf` from `reader`.
///
/// Returns `Ok(false)` when the reader is already at end-of-file, and an
/// `UnexpectedEof` error when it ends part-way through `buf`.
pub(crate) fn read_header<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<bool> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) if filled == 0 => return Ok(false),
            Ok(0) => {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("record header truncated after {} of {} bytes", filled, buf.len()),
                ))
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(true)
}

/// Sequential `Read` over a file handle starting at a fixed offset, built on
/// positional reads so the handle's cursor is left to the appender
pub(crate) struct FileReader<F> {
    file: F,
    position: u64,
}

impl<F: Borrow<File>> FileReader<F> {
    pub(crate) fn new(file: F, position: u64) -> Self {
        Self { file, position }
    }
}

impl<F: Borrow<File>> Read for FileReader<F> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = read_at(self.file.borrow(), buf, self.position)?;
        self.position += n as u64;
        Ok(n)
    }
}
