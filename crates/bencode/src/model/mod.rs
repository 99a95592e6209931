//! Data model types for bencode.
//!
//! - [`Value`]: the four-variant value tree
//! - [`Dictionary`]: insertion-ordered, byte-string keyed map
//! - [`ByteBuf`]: raw byte string for record fields

pub mod bytes;
pub mod dictionary;
pub mod value;

pub use bytes::ByteBuf;
pub use dictionary::Dictionary;
pub use value::{Value, ValueKind};
