//! Bencode: the compact, schema-less format used by BitTorrent metainfo files.
//!
//! This crate provides decoding to an ordered value tree, encoding back to
//! bytes, and tag-driven binding between value trees and typed records.
//!
//! # Overview
//!
//! Bencode has four primitives:
//! - **Integers**: `i42e`, `i-3e`
//! - **Byte strings**: `4:spam`
//! - **Lists**: `l4:spami42ee`
//! - **Dictionaries**: `d3:cow3:mooe` (byte-string keys)
//!
//! # Quick Start
//!
//! ```rust
//! use bencode::{decode_slice, to_vec, Value};
//!
//! let value = decode_slice(b"d3:cow3:moo4:spam4:eggse").unwrap();
//! assert_eq!(value.get("cow").and_then(Value::as_str), Some("moo"));
//!
//! // Dictionaries keep their decoded order, so re-encoding is byte-identical.
//! assert_eq!(to_vec(&value).unwrap(), b"d3:cow3:moo4:spam4:eggse");
//! ```
//!
//! Typed records are declared with [`record!`]:
//!
//! ```rust
//! bencode::record! {
//!     #[derive(Debug, Default)]
//!     pub struct Metainfo {
//!         #[tag = "announce"]
//!         pub announce: String,
//!         #[tag = "comment,omitempty"]
//!         pub comment: String,
//!     }
//! }
//!
//! let meta: Metainfo = bencode::from_slice(b"d8:announce12:http://a.come").unwrap();
//! assert_eq!(meta.announce, "http://a.com");
//! assert!(meta.comment.is_empty());
//! ```
//!
//! # Modules
//!
//! - [`model`]: Value tree types (Value, Dictionary, ByteBuf)
//! - [`codec`]: Wire format decoding and encoding
//! - [`bind`]: Record binding (FromValue, ToValue, field tags)
//! - [`hash`]: SHA-256 content hashing
//! - [`error`]: Error types
//! - [`limits`]: Security limits for decoding
//!
//! # Security
//!
//! The decoder is designed to safely handle untrusted input:
//! - Nesting depth and byte string length are bounded by configurable limits
//! - Declared lengths never trigger up-front allocations
//! - Integers are checked for 64-bit overflow

use std::io::{BufRead, Write};

pub mod bind;
pub mod codec;
pub mod error;
pub mod hash;
pub mod limits;
pub mod model;

// Re-export commonly used types at crate root
pub use bind::{bind, from_value, FieldPath, FromValue, ToValue};
pub use codec::{
    decode, decode_slice, decode_with_options, encode, encode_record, encode_with_options, to_vec,
    to_vec_with_options, DecodeOptions, Decoder, EncodeOptions, Encoder,
};
pub use error::{BindError, DecodeError, EncodeError, Error};
pub use hash::content_hash;
pub use model::{ByteBuf, Dictionary, Value, ValueKind};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Decodes a byte slice holding exactly one value and binds it to `T`.
pub fn from_slice<T: FromValue>(data: &[u8]) -> Result<T, Error> {
    let value = decode_slice(data)?;
    Ok(from_value(value)?)
}

/// Decodes one value from a buffered stream and binds it to `T`.
pub fn from_reader<T: FromValue, R: BufRead>(reader: R) -> Result<T, Error> {
    let value = decode(reader)?;
    Ok(from_value(value)?)
}

/// Encodes a record (or any [`ToValue`]) to a byte vector.
pub fn to_bytes<T: ToValue + ?Sized>(record: &T) -> Result<Vec<u8>, EncodeError> {
    to_vec(&record.to_value()?)
}

/// Encodes a record (or any [`ToValue`]) to a stream and flushes it.
pub fn to_writer<T: ToValue + ?Sized, W: Write>(record: &T, writer: W) -> Result<(), EncodeError> {
    encode_record(record, writer)
}
