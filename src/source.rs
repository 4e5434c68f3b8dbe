//! Sequential big-endian reader over a finite byte stream.
//!
//! The trace is written a byte at a time in network order, so every
//! multi-byte read here is big-endian. The total size is known up front;
//! a read that would run past it fails with
//! [`DecodeError::TruncatedInput`] before touching the underlying reader.

use crate::error::DecodeError;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Forward-only reader that tracks its offset within a stream of known size.
///
/// Generic over `R: Read` so tests can use `&[u8]` and the CLI can use
/// `BufReader<File>`.
#[derive(Debug)]
pub struct ByteSource<R> {
    reader: R,
    offset: u64,
    size: u64,
}

impl ByteSource<BufReader<File>> {
    /// Open a trace file, taking its size from the filesystem metadata.
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        let size = file.metadata()?.len();
        Ok(Self::new(BufReader::new(file), size))
    }
}

impl<'a> ByteSource<&'a [u8]> {
    /// Read from an in-memory buffer.
    pub fn from_slice(data: &'a [u8]) -> Self {
        Self::new(data, data.len() as u64)
    }
}

impl<R: Read> ByteSource<R> {
    /// Wrap a reader that yields exactly `size` bytes.
    pub fn new(reader: R, size: u64) -> Self {
        Self {
            reader,
            offset: 0,
            size,
        }
    }

    /// Current byte offset from the start of the stream.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Total size of the stream.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Bytes left before end of stream.
    pub fn remaining(&self) -> u64 {
        self.size.saturating_sub(self.offset)
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        let mut buf = [0u8; 1];
        self.fill(&mut buf)?;
        Ok(buf[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, DecodeError> {
        let mut buf = [0u8; 2];
        self.fill(&mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }

    pub fn read_u32(&mut self) -> Result<u32, DecodeError> {
        let mut buf = [0u8; 4];
        self.fill(&mut buf)?;
        Ok(u32::from_be_bytes(buf))
    }

    pub fn read_u64(&mut self) -> Result<u64, DecodeError> {
        let mut buf = [0u8; 8];
        self.fill(&mut buf)?;
        Ok(u64::from_be_bytes(buf))
    }

    /// Read exactly `n` bytes.
    pub fn read_bytes(&mut self, n: u64) -> Result<Vec<u8>, DecodeError> {
        self.ensure(n)?;
        // n <= remaining() from here on.
        let mut buf = vec![0u8; n as usize];
        self.fill(&mut buf)?;
        Ok(buf)
    }

    /// Read a `u32` length followed by that many bytes.
    pub fn read_length_prefixed_bytes(&mut self) -> Result<Vec<u8>, DecodeError> {
        let len = self.read_u32()?;
        self.read_bytes(u64::from(len))
    }

    /// Advance `n` bytes without materializing them.
    pub fn skip(&mut self, n: u64) -> Result<(), DecodeError> {
        self.ensure(n)?;
        let copied = io::copy(&mut (&mut self.reader).take(n), &mut io::sink())?;
        self.offset += copied;
        if copied < n {
            return Err(DecodeError::TruncatedInput {
                expected: n,
                available: copied,
            });
        }
        Ok(())
    }

    fn ensure(&self, n: u64) -> Result<(), DecodeError> {
        let available = self.remaining();
        if n > available {
            return Err(DecodeError::TruncatedInput {
                expected: n,
                available,
            });
        }
        Ok(())
    }

    fn fill(&mut self, buf: &mut [u8]) -> Result<(), DecodeError> {
        let n = buf.len() as u64;
        self.ensure(n)?;
        match self.reader.read_exact(buf) {
            Ok(()) => {
                self.offset += n;
                Ok(())
            }
            // The reader delivered less than the advertised size.
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                Err(DecodeError::TruncatedInput {
                    expected: n,
                    available: 0,
                })
            }
            Err(e) => Err(DecodeError::Io(e)),
        }
    }
}
