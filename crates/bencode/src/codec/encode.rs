//! Encoding of [`Value`] trees and typed records to the bencode wire format.
//!
//! Dictionaries are written in stored order by default. For records that is
//! field declaration order, which differs from the canonical form (keys
//! sorted by raw bytes); request canonical output with
//! [`EncodeOptions::canonical`].

use std::io::Write;

use crate::bind::ToValue;
use crate::codec::primitives::Writer;
use crate::error::EncodeError;
use crate::model::Value;

/// Options for encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Enable canonical encoding mode.
    ///
    /// When enabled, dictionary entries are written sorted by raw key bytes
    /// at every nesting level. Use it when output must be byte-identical
    /// across producers, for example before hashing.
    pub canonical: bool,

    /// Write zero integers, empty byte strings and empty lists as nothing.
    ///
    /// Approximates an older producer that skipped such values. Omitted list
    /// elements are dropped and an omitted top-level value writes no bytes.
    ///
    /// Dictionaries differ from that producer. It still wrote the key of an
    /// omitted value, leaving a dangling key, and wrote empty keys as nothing.
    /// Here an omitted value drops its whole entry and keys are always written
    /// in full, so the output stays well-formed. It still does not round-trip.
    pub omit_empty_values: bool,
}

impl EncodeOptions {
    /// Creates default (stored order, no omission) encoding options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates canonical encoding options.
    pub fn canonical() -> Self {
        Self {
            canonical: true,
            ..Self::default()
        }
    }

    /// Enables the legacy empty-value omission.
    pub fn omitting_empty_values(mut self) -> Self {
        self.omit_empty_values = true;
        self
    }
}

/// Encoder writing values to a byte stream.
#[derive(Debug)]
pub struct Encoder<W> {
    writer: Writer<W>,
    options: EncodeOptions,
}

impl<W: Write> Encoder<W> {
    /// Creates an encoder with default options.
    pub fn new(inner: W) -> Self {
        Self::with_options(inner, EncodeOptions::default())
    }

    /// Creates an encoder with the given options.
    pub fn with_options(inner: W, options: EncodeOptions) -> Self {
        Self {
            writer: Writer::new(inner),
            options,
        }
    }

    /// Returns the number of bytes written so far.
    pub fn written(&self) -> u64 {
        self.writer.written()
    }

    /// Returns the underlying stream.
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    /// Flushes the underlying stream.
    pub fn flush(&mut self) -> Result<(), EncodeError> {
        self.writer.flush()
    }

    /// Encodes a value.
    pub fn encode(&mut self, value: &Value) -> Result<(), EncodeError> {
        let start = self.writer.written();
        match self.encode_item(value) {
            Ok(()) => {
                log::debug!(
                    "encoded {} ({} bytes)",
                    value.kind(),
                    self.writer.written() - start
                );
                Ok(())
            }
            Err(err) => {
                log::debug!("encode failed: {err}");
                Err(err)
            }
        }
    }

    /// Encodes a typed record through its value tree.
    pub fn encode_record<T: ToValue + ?Sized>(&mut self, record: &T) -> Result<(), EncodeError> {
        let value = record.to_value()?;
        self.encode(&value)
    }

    fn encode_item(&mut self, value: &Value) -> Result<(), EncodeError> {
        if self.omits(value) {
            return Ok(());
        }
        match value {
            Value::Integer(n) => {
                self.writer.write_byte(b'i')?;
                self.writer.write_decimal(*n)?;
                self.writer.write_byte(b'e')
            }
            Value::ByteString(bytes) => self.writer.write_byte_string(bytes),
            Value::List(items) => {
                self.writer.write_byte(b'l')?;
                for item in items {
                    self.encode_item(item)?;
                }
                self.writer.write_byte(b'e')
            }
            Value::Dictionary(dict) => {
                self.writer.write_byte(b'd')?;
                if self.options.canonical {
                    for (key, item) in dict.sorted_entries() {
                        self.encode_entry(key, item)?;
                    }
                } else {
                    for (key, item) in dict {
                        self.encode_entry(key, item)?;
                    }
                }
                self.writer.write_byte(b'e')
            }
        }
    }

    fn encode_entry(&mut self, key: &[u8], value: &Value) -> Result<(), EncodeError> {
        if self.omits(value) {
            return Ok(());
        }
        self.writer.write_byte_string(key)?;
        self.encode_item(value)
    }

    fn omits(&self, value: &Value) -> bool {
        self.options.omit_empty_values
            && match value {
                Value::Integer(n) => *n == 0,
                Value::ByteString(bytes) => bytes.is_empty(),
                Value::List(items) => items.is_empty(),
                Value::Dictionary(_) => false,
            }
    }
}

/// Encodes a value to a stream and flushes it.
pub fn encode<W: Write>(value: &Value, writer: W) -> Result<(), EncodeError> {
    encode_with_options(value, writer, EncodeOptions::default())
}

/// Encodes a value to a stream with the given options and flushes it.
pub fn encode_with_options<W: Write>(
    value: &Value,
    writer: W,
    options: EncodeOptions,
) -> Result<(), EncodeError> {
    let mut encoder = Encoder::with_options(writer, options);
    encoder.encode(value)?;
    encoder.flush()
}

/// Encodes a value to a byte vector.
pub fn to_vec(value: &Value) -> Result<Vec<u8>, EncodeError> {
    to_vec_with_options(value, EncodeOptions::default())
}

/// Encodes a value to a byte vector with the given options.
pub fn to_vec_with_options(value: &Value, options: EncodeOptions) -> Result<Vec<u8>, EncodeError> {
    let mut encoder = Encoder::with_options(Vec::new(), options);
    encoder.encode(value)?;
    Ok(encoder.into_inner())
}

/// Encodes a typed record to a stream and flushes it.
pub fn encode_record<T: ToValue + ?Sized, W: Write>(
    record: &T,
    writer: W,
) -> Result<(), EncodeError> {
    encode_record_with_options(record, writer, EncodeOptions::default())
}

/// Encodes a typed record to a stream with the given options and flushes it.
pub fn encode_record_with_options<T: ToValue + ?Sized, W: Write>(
    record: &T,
    writer: W,
    options: EncodeOptions,
) -> Result<(), EncodeError> {
    let mut encoder = Encoder::with_options(writer, options);
    encoder.encode_record(record)?;
    encoder.flush()
}
