//! The bencode value tree.

use std::fmt;

use crate::model::Dictionary;

/// The four shapes a bencode value can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Integer,
    ByteString,
    List,
    Dictionary,
}

impl ValueKind {
    /// Returns a human-readable name for diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Integer => "integer",
            ValueKind::ByteString => "byte string",
            ValueKind::List => "list",
            ValueKind::Dictionary => "dictionary",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A decoded bencode value.
///
/// Value trees own all of their data. Dictionaries keep entries in the order
/// they were inserted (or decoded).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Signed 64-bit integer (`i<digits>e`).
    Integer(i64),

    /// Raw byte string (`<len>:<bytes>`), not necessarily UTF-8.
    ByteString(Vec<u8>),

    /// Ordered list (`l...e`).
    List(Vec<Value>),

    /// Byte-string keyed dictionary (`d...e`).
    Dictionary(Dictionary),
}

impl Value {
    /// Returns the kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Integer(_) => ValueKind::Integer,
            Value::ByteString(_) => ValueKind::ByteString,
            Value::List(_) => ValueKind::List,
            Value::Dictionary(_) => ValueKind::Dictionary,
        }
    }

    /// Returns the integer, if this is one.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the raw bytes, if this is a byte string.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::ByteString(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Returns the byte string as `&str`, if it is one and is valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        self.as_bytes().and_then(|b| std::str::from_utf8(b).ok())
    }

    /// Returns the elements, if this is a list.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the dictionary, if this is one.
    pub fn as_dict(&self) -> Option<&Dictionary> {
        match self {
            Value::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }

    /// Looks up `key` when this is a dictionary.
    pub fn get(&self, key: impl AsRef<[u8]>) -> Option<&Value> {
        self.as_dict().and_then(|d| d.get(key))
    }

    /// Returns true for the zero integer and for empty strings, lists and
    /// dictionaries.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Integer(n) => *n == 0,
            Value::ByteString(bytes) => bytes.is_empty(),
            Value::List(items) => items.is_empty(),
            Value::Dictionary(dict) => dict.is_empty(),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

macro_rules! impl_from_small_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(n: $ty) -> Self {
                    Value::Integer(i64::from(n))
                }
            }
        )*
    };
}

impl_from_small_int!(i8, i16, i32, u8, u16, u32);

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::ByteString(s.as_bytes().to_vec())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::ByteString(s.into_bytes())
    }
}

impl From<&[u8]> for Value {
    fn from(bytes: &[u8]) -> Self {
        Value::ByteString(bytes.to_vec())
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Value::ByteString(bytes)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Dictionary> for Value {
    fn from(dict: Dictionary) -> Self {
        Value::Dictionary(dict)
    }
}
