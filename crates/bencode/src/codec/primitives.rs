//! Byte-level reading and writing for the bencode wire format.
//!
//! The reader tracks the offset of the next unread byte so every syntax error
//! can point at its position; the writer counts bytes so write failures can
//! report how far output got.

use std::io::{self, BufRead, Write};

use crate::error::{DecodeError, EncodeError};
use crate::limits::READ_CHUNK;

// =============================================================================
// DECODING
// =============================================================================

/// Offset-tracking reader over a buffered byte stream.
///
/// Only consumes what the grammar asks for, so the underlying stream is left
/// positioned right after the last decoded value.
#[derive(Debug)]
pub struct Reader<R> {
    inner: R,
    pos: u64,
}

impl<R: BufRead> Reader<R> {
    /// Creates a new reader starting at offset 0.
    pub fn new(inner: R) -> Self {
        Self { inner, pos: 0 }
    }

    /// Returns the offset of the next unread byte.
    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Returns the underlying stream.
    pub fn into_inner(self) -> R {
        self.inner
    }

    fn fill(&mut self) -> Result<&[u8], DecodeError> {
        loop {
            match self.inner.fill_buf() {
                Ok(_) => break,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(source) => {
                    return Err(DecodeError::Io {
                        offset: self.pos,
                        source,
                    })
                }
            }
        }
        // Served from the buffer filled above.
        self.inner.fill_buf().map_err(|source| DecodeError::Io {
            offset: self.pos,
            source,
        })
    }

    /// Returns the next byte without consuming it, or `None` at end of input.
    pub fn peek_byte(&mut self) -> Result<Option<u8>, DecodeError> {
        Ok(self.fill()?.first().copied())
    }

    /// Reads a single byte.
    #[inline]
    pub fn read_byte(&mut self, context: &'static str) -> Result<u8, DecodeError> {
        let byte = self.peek_byte()?.ok_or(DecodeError::UnexpectedEof {
            offset: self.pos,
            context,
        })?;
        self.inner.consume(1);
        self.pos += 1;
        Ok(byte)
    }

    /// Reads exactly `len` bytes.
    ///
    /// The buffer grows with the data actually read, never by the declared
    /// length alone.
    pub fn read_bytes(&mut self, len: u64, context: &'static str) -> Result<Vec<u8>, DecodeError> {
        let mut remaining = len;
        let mut out = Vec::with_capacity(len.min(READ_CHUNK as u64) as usize);
        while remaining > 0 {
            let offset = self.pos;
            let available = self.fill()?;
            if available.is_empty() {
                return Err(DecodeError::UnexpectedEof { offset, context });
            }
            let take = available.len().min(remaining.min(READ_CHUNK as u64) as usize);
            out.extend_from_slice(&available[..take]);
            self.inner.consume(take);
            self.pos += take as u64;
            remaining -= take as u64;
        }
        Ok(out)
    }
}

// =============================================================================
// ENCODING
// =============================================================================

/// Byte-counting writer.
#[derive(Debug)]
pub struct Writer<W> {
    inner: W,
    written: u64,
}

impl<W: Write> Writer<W> {
    /// Creates a new writer.
    pub fn new(inner: W) -> Self {
        Self { inner, written: 0 }
    }

    /// Returns the number of bytes written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Returns the underlying stream.
    pub fn into_inner(self) -> W {
        self.inner
    }

    /// Writes raw bytes.
    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), EncodeError> {
        self.inner
            .write_all(bytes)
            .map_err(|source| EncodeError::WriteFailure {
                offset: self.written,
                source,
            })?;
        self.written += bytes.len() as u64;
        Ok(())
    }

    /// Writes a single byte.
    #[inline]
    pub fn write_byte(&mut self, byte: u8) -> Result<(), EncodeError> {
        self.write_bytes(&[byte])
    }

    /// Writes a signed decimal number without delimiters.
    pub fn write_decimal(&mut self, value: i64) -> Result<(), EncodeError> {
        if value < 0 {
            self.write_byte(b'-')?;
        }
        self.write_unsigned(value.unsigned_abs())
    }

    /// Writes a length-prefixed byte string (`<len>:<bytes>`).
    pub fn write_byte_string(&mut self, bytes: &[u8]) -> Result<(), EncodeError> {
        self.write_unsigned(bytes.len() as u64)?;
        self.write_byte(b':')?;
        self.write_bytes(bytes)
    }

    fn write_unsigned(&mut self, mut n: u64) -> Result<(), EncodeError> {
        // u64::MAX has 20 digits
        let mut buf = [0u8; 20];
        let mut pos = buf.len();
        loop {
            pos -= 1;
            buf[pos] = b'0' + (n % 10) as u8;
            n /= 10;
            if n == 0 {
                break;
            }
        }
        self.write_bytes(&buf[pos..])
    }

    /// Flushes the underlying stream.
    pub fn flush(&mut self) -> Result<(), EncodeError> {
        self.inner.flush().map_err(|source| EncodeError::WriteFailure {
            offset: self.written,
            source,
        })
    }
}
