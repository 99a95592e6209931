//! Decoding of the bencode wire format into a [`Value`] tree.
//!
//! Recursive descent with one byte of look-ahead: the leading byte of each
//! value selects the sub-parser (`i`, `l`, `d` or a length digit). Every
//! construct has a byte-consuming terminator, so well-formed input always
//! terminates.

use std::io::BufRead;

use crate::codec::primitives::Reader;
use crate::error::DecodeError;
use crate::limits::{MAX_DEPTH, MAX_STRING_LEN};
use crate::model::{Dictionary, Value};

/// Options for decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Maximum nesting depth of lists and dictionaries.
    pub max_depth: usize,
    /// Maximum length of a single byte string.
    pub max_string_len: u64,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
            max_string_len: MAX_STRING_LEN,
        }
    }
}

impl DecodeOptions {
    /// Creates options with the default limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum nesting depth.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets the maximum byte string length.
    pub fn max_string_len(mut self, max_string_len: u64) -> Self {
        self.max_string_len = max_string_len;
        self
    }
}

/// Streaming decoder reading one value at a time.
///
/// The decoder never reads past the end of the value it is decoding, so a
/// stream holding several concatenated values can be drained with repeated
/// calls to [`Decoder::decode_next`].
#[derive(Debug)]
pub struct Decoder<R> {
    reader: Reader<R>,
    options: DecodeOptions,
}

impl<R: BufRead> Decoder<R> {
    /// Creates a decoder with default limits.
    pub fn new(inner: R) -> Self {
        Self::with_options(inner, DecodeOptions::default())
    }

    /// Creates a decoder with the given limits.
    pub fn with_options(inner: R, options: DecodeOptions) -> Self {
        Self {
            reader: Reader::new(inner),
            options,
        }
    }

    /// Returns the offset of the next unread byte.
    pub fn position(&self) -> u64 {
        self.reader.position()
    }

    /// Returns true if the input is exhausted.
    pub fn is_at_end(&mut self) -> Result<bool, DecodeError> {
        Ok(self.reader.peek_byte()?.is_none())
    }

    /// Decodes the next complete value.
    pub fn decode_next(&mut self) -> Result<Value, DecodeError> {
        let start = self.reader.position();
        let tag = self.reader.read_byte("value")?;
        match self.decode_item(tag, 0) {
            Ok(value) => {
                log::debug!(
                    "decoded {} at offset {start} ({} bytes)",
                    value.kind(),
                    self.reader.position() - start
                );
                Ok(value)
            }
            Err(err) => {
                log::debug!("decode failed: {err}");
                Err(err)
            }
        }
    }

    /// Checks that no input remains and returns the underlying stream.
    pub fn finish(mut self) -> Result<R, DecodeError> {
        if self.reader.peek_byte()?.is_some() {
            return Err(DecodeError::TrailingData {
                offset: self.reader.position(),
            });
        }
        Ok(self.reader.into_inner())
    }

    /// Returns the underlying stream without checking for remaining input.
    pub fn into_inner(self) -> R {
        self.reader.into_inner()
    }

    fn decode_item(&mut self, tag: u8, depth: usize) -> Result<Value, DecodeError> {
        match tag {
            b'i' => self.decode_integer().map(Value::Integer),
            b'l' => self.decode_list(depth + 1),
            b'd' => self.decode_dict(depth + 1),
            b'0'..=b'9' => self.decode_byte_string(tag).map(Value::ByteString),
            _ => Err(DecodeError::InvalidTag {
                offset: self.reader.position() - 1,
                found: tag,
            }),
        }
    }

    fn decode_integer(&mut self) -> Result<i64, DecodeError> {
        let mut first = self.reader.read_byte("integer")?;
        let negative = first == b'-';
        if negative {
            first = self.reader.read_byte("integer")?;
        }
        let start = self.reader.position() - 1;
        let magnitude = self.read_digits(first, b'e', "integer")?;

        let overflow = DecodeError::IntegerOverflow {
            offset: start,
            context: "integer",
        };
        if negative {
            if magnitude > i64::MIN.unsigned_abs() {
                return Err(overflow);
            }
            // 2^63 wraps to i64::MIN, which is its own negation
            Ok((magnitude as i64).wrapping_neg())
        } else {
            i64::try_from(magnitude).map_err(|_| overflow)
        }
    }

    fn decode_byte_string(&mut self, first: u8) -> Result<Vec<u8>, DecodeError> {
        let start = self.reader.position() - 1;
        let len = self.read_digits(first, b':', "byte string length")?;
        if len > self.options.max_string_len {
            return Err(DecodeError::LengthExceedsLimit {
                offset: start,
                len,
                max: self.options.max_string_len,
            });
        }
        self.reader.read_bytes(len, "byte string")
    }

    fn decode_list(&mut self, depth: usize) -> Result<Value, DecodeError> {
        self.check_depth(depth)?;
        log::trace!("list at offset {}", self.reader.position() - 1);

        let mut items = Vec::new();
        loop {
            let tag = self.reader.read_byte("list")?;
            if tag == b'e' {
                break;
            }
            items.push(self.decode_item(tag, depth)?);
        }
        Ok(Value::List(items))
    }

    fn decode_dict(&mut self, depth: usize) -> Result<Value, DecodeError> {
        self.check_depth(depth)?;
        log::trace!("dictionary at offset {}", self.reader.position() - 1);

        let mut dict = Dictionary::new();
        loop {
            let tag = self.reader.read_byte("dictionary")?;
            if tag == b'e' {
                break;
            }
            if !tag.is_ascii_digit() {
                return Err(DecodeError::InvalidDigit {
                    offset: self.reader.position() - 1,
                    found: tag,
                    context: "dictionary key",
                });
            }
            let key = self.decode_byte_string(tag)?;
            let value_tag = self.reader.read_byte("dictionary value")?;
            let value = self.decode_item(value_tag, depth)?;
            if dict.insert(key, value).is_some() {
                log::debug!(
                    "duplicate dictionary key before offset {}, keeping later value",
                    self.reader.position()
                );
            }
        }
        Ok(Value::Dictionary(dict))
    }

    fn check_depth(&self, depth: usize) -> Result<(), DecodeError> {
        if depth > self.options.max_depth {
            return Err(DecodeError::DepthExceeded {
                offset: self.reader.position() - 1,
                max: self.options.max_depth,
            });
        }
        Ok(())
    }

    /// Reads a run of ASCII digits starting with the already consumed
    /// `first`, up to and including `terminator`.
    fn read_digits(
        &mut self,
        first: u8,
        terminator: u8,
        context: &'static str,
    ) -> Result<u64, DecodeError> {
        let start = self.reader.position() - 1;
        if !first.is_ascii_digit() {
            return Err(DecodeError::InvalidDigit {
                offset: start,
                found: first,
                context,
            });
        }

        let mut n = u64::from(first - b'0');
        loop {
            let byte = self.reader.read_byte(context)?;
            if byte == terminator {
                return Ok(n);
            }
            if !byte.is_ascii_digit() {
                return Err(DecodeError::InvalidDigit {
                    offset: self.reader.position() - 1,
                    found: byte,
                    context,
                });
            }
            n = n
                .checked_mul(10)
                .and_then(|n| n.checked_add(u64::from(byte - b'0')))
                .ok_or(DecodeError::IntegerOverflow {
                    offset: start,
                    context,
                })?;
        }
    }
}

/// Decodes one value from a buffered stream.
///
/// Bytes following the value are left unread.
pub fn decode<R: BufRead>(reader: R) -> Result<Value, DecodeError> {
    Decoder::new(reader).decode_next()
}

/// Decodes one value from a buffered stream with the given limits.
pub fn decode_with_options<R: BufRead>(
    reader: R,
    options: DecodeOptions,
) -> Result<Value, DecodeError> {
    Decoder::with_options(reader, options).decode_next()
}

/// Decodes a byte slice holding exactly one value.
pub fn decode_slice(data: &[u8]) -> Result<Value, DecodeError> {
    let mut decoder = Decoder::new(data);
    let value = decoder.decode_next()?;
    decoder.finish()?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dict<const N: usize>(entries: [(&str, Value); N]) -> Value {
        Value::Dictionary(entries.into_iter().collect())
    }

    #[test]
    fn test_decode_integer() {
        assert_eq!(decode_slice(b"i2e").unwrap(), Value::Integer(2));
        assert_eq!(decode_slice(b"i0e").unwrap(), Value::Integer(0));
        assert_eq!(decode_slice(b"i-17e").unwrap(), Value::Integer(-17));
        assert_eq!(
            decode_slice(b"i9223372036854775807e").unwrap(),
            Value::Integer(i64::MAX)
        );
        assert_eq!(
            decode_slice(b"i-9223372036854775808e").unwrap(),
            Value::Integer(i64::MIN)
        );
    }

    #[test]
    fn test_decode_byte_string() {
        assert_eq!(decode_slice(b"4:spam").unwrap(), Value::from("spam"));
        assert_eq!(decode_slice(b"0:").unwrap(), Value::from(""));
        // Payload bytes are taken verbatim, including grammar bytes.
        assert_eq!(decode_slice(b"3:i1e").unwrap(), Value::from("i1e"));
    }

    #[test]
    fn test_decode_list() {
        assert_eq!(
            decode_slice(b"l4:spam4:eggse").unwrap(),
            Value::List(vec![Value::from("spam"), Value::from("eggs")])
        );
        assert_eq!(decode_slice(b"le").unwrap(), Value::List(vec![]));
    }

    #[test]
    fn test_decode_dictionary() {
        assert_eq!(
            decode_slice(b"d3:cow3:moo4:spam4:eggse").unwrap(),
            dict([("cow", Value::from("moo")), ("spam", Value::from("eggs"))])
        );
        assert_eq!(
            decode_slice(b"d8:announcei2ee").unwrap(),
            dict([("announce", Value::Integer(2))])
        );
    }

    #[test]
    fn test_decode_nested() {
        let value = decode_slice(b"d4:infod5:filesld6:lengthi5eeee4:listll1:aeee").unwrap();
        let files = value.get("info").and_then(|i| i.get("files")).unwrap();
        assert_eq!(
            files.as_list().unwrap()[0].get("length"),
            Some(&Value::Integer(5))
        );
        assert_eq!(
            value.get("list"),
            Some(&Value::List(vec![Value::List(vec![Value::from("a")])]))
        );
    }

    #[test]
    fn test_duplicate_key_keeps_later_value_in_first_position() {
        let value = decode_slice(b"d1:ai1e1:bi2e1:ai3ee").unwrap();
        let d = value.as_dict().unwrap();
        assert_eq!(d.len(), 2);
        assert_eq!(d.get("a"), Some(&Value::Integer(3)));
        assert_eq!(d.keys().next(), Some(&b"a"[..]));
    }

    #[test]
    fn test_empty_input() {
        let err = decode_slice(b"").unwrap_err();
        assert!(matches!(err, DecodeError::UnexpectedEof { offset: 0, .. }));
    }

    #[test]
    fn test_invalid_digit_offsets() {
        let err = decode_slice(b"i e").unwrap_err();
        assert!(matches!(
            err,
            DecodeError::InvalidDigit { offset: 1, found: b' ', .. }
        ));

        let err = decode_slice(b"ie").unwrap_err();
        assert!(matches!(err, DecodeError::InvalidDigit { offset: 1, .. }));

        let err = decode_slice(b"i-e").unwrap_err();
        assert!(matches!(err, DecodeError::InvalidDigit { offset: 2, .. }));

        let err = decode_slice(b"i12x4e").unwrap_err();
        assert!(matches!(err, DecodeError::InvalidDigit { offset: 3, found: b'x', .. }));

        let err = decode_slice(b"3x:abc").unwrap_err();
        assert!(matches!(err, DecodeError::InvalidDigit { offset: 1, .. }));
    }

    #[test]
    fn test_dictionary_key_must_be_byte_string() {
        let err = decode_slice(b"di1ei2ee").unwrap_err();
        assert!(matches!(
            err,
            DecodeError::InvalidDigit { offset: 1, found: b'i', context: "dictionary key" }
        ));
    }

    #[test]
    fn test_invalid_tag() {
        let err = decode_slice(b"x").unwrap_err();
        assert!(matches!(err, DecodeError::InvalidTag { offset: 0, found: b'x' }));

        let err = decode_slice(b"l4:spamxe").unwrap_err();
        assert!(matches!(err, DecodeError::InvalidTag { offset: 7, .. }));
    }

    #[test]
    fn test_truncated_input() {
        for input in [&b"i42"[..], b"4:spa", b"l4:spam", b"d3:cow", b"d3:cow3:moo", b"12"] {
            let err = decode_slice(input).unwrap_err();
            assert!(
                matches!(err, DecodeError::UnexpectedEof { .. }),
                "expected EOF for {:?}, got {err:?}",
                String::from_utf8_lossy(input)
            );
        }

        let err = decode_slice(b"5:spam").unwrap_err();
        assert!(matches!(err, DecodeError::UnexpectedEof { offset: 6, context: "byte string" }));
    }

    #[test]
    fn test_integer_overflow() {
        let err = decode_slice(b"i9223372036854775808e").unwrap_err();
        assert!(matches!(err, DecodeError::IntegerOverflow { offset: 1, .. }));

        let err = decode_slice(b"i-9223372036854775809e").unwrap_err();
        assert!(matches!(err, DecodeError::IntegerOverflow { .. }));

        let err = decode_slice(b"99999999999999999999999:x").unwrap_err();
        assert!(matches!(err, DecodeError::IntegerOverflow { offset: 0, .. }));
    }

    #[test]
    fn test_string_length_limit() {
        let options = DecodeOptions::new().max_string_len(3);
        let err = decode_with_options(&b"4:spam"[..], options).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::LengthExceedsLimit { offset: 0, len: 4, max: 3 }
        ));
        assert!(decode_with_options(&b"3:egg"[..], options).is_ok());
    }

    #[test]
    fn test_depth_limit() {
        let options = DecodeOptions::new().max_depth(2);
        assert!(decode_with_options(&b"llee"[..], options).is_ok());

        let err = decode_with_options(&b"llleee"[..], options).unwrap_err();
        assert!(matches!(err, DecodeError::DepthExceeded { offset: 2, max: 2 }));

        let deep = format!("{}{}", "l".repeat(10_000), "e".repeat(10_000));
        let err = decode_slice(deep.as_bytes()).unwrap_err();
        assert!(matches!(err, DecodeError::DepthExceeded { max: MAX_DEPTH, .. }));
    }

    #[test]
    fn test_trailing_data() {
        let err = decode_slice(b"i1ei2e").unwrap_err();
        assert!(matches!(err, DecodeError::TrailingData { offset: 3 }));

        // Stream decoding stops after the first value.
        assert_eq!(decode(&b"i1ei2e"[..]).unwrap(), Value::Integer(1));
    }

    #[test]
    fn test_decoder_reads_consecutive_values() {
        let mut decoder = Decoder::new(&b"i1e4:spamle"[..]);
        assert_eq!(decoder.decode_next().unwrap(), Value::Integer(1));
        assert_eq!(decoder.position(), 3);
        assert_eq!(decoder.decode_next().unwrap(), Value::from("spam"));
        assert_eq!(decoder.decode_next().unwrap(), Value::List(vec![]));
        assert!(decoder.is_at_end().unwrap());
        assert!(decoder.finish().is_ok());
    }

    #[test]
    fn test_binary_byte_string() {
        let mut data = b"3:".to_vec();
        data.extend_from_slice(&[0x00, 0xff, b'e']);
        assert_eq!(
            decode_slice(&data).unwrap(),
            Value::ByteString(vec![0x00, 0xff, b'e'])
        );
    }
}
