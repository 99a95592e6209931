//! [`FromValue`] and [`ToValue`] for standard types.

use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

use crate::bind::{mismatch, FieldPath, FromValue, Segment, ToValue};
use crate::error::{BindError, EncodeError};
use crate::model::{ByteBuf, Dictionary, Value, ValueKind};

impl FromValue for Value {
    fn from_value(value: Value, _path: &mut FieldPath) -> Result<Self, BindError> {
        Ok(value)
    }
}

impl ToValue for Value {
    fn to_value(&self) -> Result<Value, EncodeError> {
        Ok(self.clone())
    }
}

impl FromValue for Dictionary {
    fn from_value(value: Value, path: &mut FieldPath) -> Result<Self, BindError> {
        match value {
            Value::Dictionary(dict) => Ok(dict),
            other => Err(mismatch(ValueKind::Dictionary, &other, path)),
        }
    }
}

impl ToValue for Dictionary {
    fn to_value(&self) -> Result<Value, EncodeError> {
        Ok(Value::Dictionary(self.clone()))
    }
}

impl<T: ToValue + ?Sized> ToValue for &T {
    fn to_value(&self) -> Result<Value, EncodeError> {
        (**self).to_value()
    }
}

// =============================================================================
// BYTE STRINGS
// =============================================================================

impl FromValue for String {
    fn from_value(value: Value, path: &mut FieldPath) -> Result<Self, BindError> {
        match value {
            Value::ByteString(bytes) => String::from_utf8(bytes).map_err(|_| BindError::InvalidUtf8 {
                path: path.clone(),
            }),
            other => Err(mismatch(ValueKind::ByteString, &other, path)),
        }
    }
}

impl ToValue for str {
    fn to_value(&self) -> Result<Value, EncodeError> {
        Ok(Value::from(self))
    }
}

impl ToValue for String {
    fn to_value(&self) -> Result<Value, EncodeError> {
        self.as_str().to_value()
    }
}

impl FromValue for ByteBuf {
    fn from_value(value: Value, path: &mut FieldPath) -> Result<Self, BindError> {
        match value {
            Value::ByteString(bytes) => Ok(ByteBuf(bytes)),
            other => Err(mismatch(ValueKind::ByteString, &other, path)),
        }
    }
}

impl ToValue for ByteBuf {
    fn to_value(&self) -> Result<Value, EncodeError> {
        Ok(Value::ByteString(self.0.clone()))
    }
}

// =============================================================================
// INTEGERS
// =============================================================================

impl FromValue for i64 {
    fn from_value(value: Value, path: &mut FieldPath) -> Result<Self, BindError> {
        match value {
            Value::Integer(n) => Ok(n),
            other => Err(mismatch(ValueKind::Integer, &other, path)),
        }
    }
}

impl ToValue for i64 {
    fn to_value(&self) -> Result<Value, EncodeError> {
        Ok(Value::Integer(*self))
    }
}

macro_rules! impl_narrow_int {
    ($($ty:ty),*) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: Value, path: &mut FieldPath) -> Result<Self, BindError> {
                    let n = i64::from_value(value, path)?;
                    <$ty>::try_from(n).map_err(|_| BindError::IntegerOutOfRange {
                        value: n,
                        target: stringify!($ty),
                        path: path.clone(),
                    })
                }
            }

            impl ToValue for $ty {
                fn to_value(&self) -> Result<Value, EncodeError> {
                    Ok(Value::Integer(i64::from(*self)))
                }
            }
        )*
    };
}

impl_narrow_int!(i8, i16, i32, u8, u16, u32);

macro_rules! impl_wide_int {
    ($($ty:ty),*) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: Value, path: &mut FieldPath) -> Result<Self, BindError> {
                    let n = i64::from_value(value, path)?;
                    <$ty>::try_from(n).map_err(|_| BindError::IntegerOutOfRange {
                        value: n,
                        target: stringify!($ty),
                        path: path.clone(),
                    })
                }
            }

            impl ToValue for $ty {
                fn to_value(&self) -> Result<Value, EncodeError> {
                    i64::try_from(*self)
                        .map(Value::Integer)
                        .map_err(|_| EncodeError::IntegerOutOfRange { value: *self as u64 })
                }
            }
        )*
    };
}

impl_wide_int!(u64, usize, isize);

// =============================================================================
// LISTS
// =============================================================================

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value, path: &mut FieldPath) -> Result<Self, BindError> {
        match value {
            Value::List(items) => items
                .into_iter()
                .enumerate()
                .map(|(i, item)| path.with(Segment::Index(i), |path| T::from_value(item, path)))
                .collect(),
            other => Err(mismatch(ValueKind::List, &other, path)),
        }
    }
}

impl<T: ToValue> ToValue for [T] {
    fn to_value(&self) -> Result<Value, EncodeError> {
        self.iter()
            .map(ToValue::to_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List)
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Result<Value, EncodeError> {
        self.as_slice().to_value()
    }
}

// =============================================================================
// MAPS
// =============================================================================

/// Binds each dictionary entry, requiring UTF-8 keys.
fn bind_entries<T, M>(value: Value, path: &mut FieldPath) -> Result<M, BindError>
where
    T: FromValue,
    M: FromIterator<(String, T)>,
{
    let dict = match value {
        Value::Dictionary(dict) => dict,
        other => return Err(mismatch(ValueKind::Dictionary, &other, path)),
    };
    dict.into_iter()
        .map(|(key, item)| {
            let key = String::from_utf8(key).map_err(|err| {
                let lossy = String::from_utf8_lossy(err.as_bytes()).into_owned();
                path.with(Segment::Key(lossy), |path| BindError::InvalidUtf8 {
                    path: path.clone(),
                })
            })?;
            let item = path.with(Segment::Key(key.clone()), |path| T::from_value(item, path))?;
            Ok((key, item))
        })
        .collect()
}

impl<T: FromValue> FromValue for BTreeMap<String, T> {
    fn from_value(value: Value, path: &mut FieldPath) -> Result<Self, BindError> {
        bind_entries(value, path)
    }
}

impl<T: ToValue> ToValue for BTreeMap<String, T> {
    fn to_value(&self) -> Result<Value, EncodeError> {
        let mut dict = Dictionary::with_capacity(self.len());
        for (key, item) in self {
            dict.insert(key.as_str(), item.to_value()?);
        }
        Ok(Value::Dictionary(dict))
    }
}

impl<T, S> FromValue for HashMap<String, T, S>
where
    T: FromValue,
    S: BuildHasher + Default,
{
    fn from_value(value: Value, path: &mut FieldPath) -> Result<Self, BindError> {
        bind_entries(value, path)
    }
}

impl<K, T, S> ToValue for HashMap<K, T, S>
where
    K: AsRef<str> + Eq + Hash,
    T: ToValue,
{
    /// Entries are written sorted by key so output does not depend on hash
    /// iteration order.
    fn to_value(&self) -> Result<Value, EncodeError> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_unstable_by(|a, b| AsRef::<str>::as_ref(a.0).cmp(b.0.as_ref()));
        let mut dict = Dictionary::with_capacity(entries.len());
        for (key, item) in entries {
            dict.insert(AsRef::<str>::as_ref(key), item.to_value()?);
        }
        Ok(Value::Dictionary(dict))
    }
}

// =============================================================================
// UNSUPPORTED
// =============================================================================

macro_rules! impl_unsupported {
    ($($ty:ty => $kind:literal),*) => {
        $(
            impl FromValue for $ty {
                fn from_value(_value: Value, path: &mut FieldPath) -> Result<Self, BindError> {
                    Err(BindError::UnsupportedType {
                        kind: $kind,
                        path: path.clone(),
                    })
                }
            }

            impl ToValue for $ty {
                fn to_value(&self) -> Result<Value, EncodeError> {
                    Err(EncodeError::UnsupportedType { kind: $kind })
                }
            }
        )*
    };
}

// The format has no floating-point or boolean representation.
impl_unsupported!(f32 => "f32", f64 => "f64", bool => "bool");

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bind::from_value;

    #[test]
    fn test_string_requires_utf8() {
        let err = from_value::<String>(Value::ByteString(vec![0xff])).unwrap_err();
        assert!(matches!(err, BindError::InvalidUtf8 { .. }));
        assert_eq!(from_value::<String>(Value::from("ok")).unwrap(), "ok");
    }

    #[test]
    fn test_byte_buf_accepts_binary() {
        let bound: ByteBuf = from_value(Value::ByteString(vec![0, 159, 146])).unwrap();
        assert_eq!(bound.as_slice(), &[0, 159, 146]);
    }

    #[test]
    fn test_integer_range_checks() {
        assert_eq!(from_value::<u8>(Value::Integer(255)).unwrap(), 255);
        let err = from_value::<u8>(Value::Integer(256)).unwrap_err();
        assert!(matches!(err, BindError::IntegerOutOfRange { value: 256, target: "u8", .. }));
        let err = from_value::<u64>(Value::Integer(-1)).unwrap_err();
        assert!(matches!(err, BindError::IntegerOutOfRange { target: "u64", .. }));

        assert!(matches!(
            u64::MAX.to_value(),
            Err(EncodeError::IntegerOutOfRange { value: u64::MAX })
        ));
        assert_eq!(7usize.to_value().unwrap(), Value::Integer(7));
    }

    #[test]
    fn test_vec_binds_each_element() {
        let value = Value::List(vec![Value::Integer(1), Value::Integer(2)]);
        assert_eq!(from_value::<Vec<i64>>(value).unwrap(), vec![1, 2]);

        let value = Value::List(vec![Value::Integer(1), Value::from("x")]);
        let err = from_value::<Vec<i64>>(value).unwrap_err();
        assert_eq!(err.path().to_string(), "[1]");
    }

    #[test]
    fn test_maps_bind_from_dictionaries() {
        let dict: Dictionary = [("b", 2), ("a", 1)].into_iter().collect();
        let bound: BTreeMap<String, i64> = from_value(Value::from(dict.clone())).unwrap();
        assert_eq!(bound.into_iter().collect::<Vec<_>>(), vec![("a".to_string(), 1), ("b".to_string(), 2)]);

        let bound: HashMap<String, i64> = from_value(Value::from(dict)).unwrap();
        assert_eq!(bound.get("b"), Some(&2));

        let mut bad = Dictionary::new();
        bad.insert(vec![0xff], 1);
        let err = from_value::<BTreeMap<String, i64>>(Value::from(bad)).unwrap_err();
        assert!(matches!(err, BindError::InvalidUtf8 { .. }));
    }

    #[test]
    fn test_maps_encode_sorted() {
        let mut map = HashMap::new();
        map.insert("zeta".to_string(), 1i64);
        map.insert("alpha".to_string(), 2i64);
        let value = map.to_value().unwrap();
        let keys: Vec<_> = value.as_dict().unwrap().keys().collect();
        assert_eq!(keys, vec![&b"alpha"[..], b"zeta"]);
    }

    #[test]
    fn test_unsupported_types() {
        let err = from_value::<f64>(Value::Integer(1)).unwrap_err();
        assert!(matches!(err, BindError::UnsupportedType { kind: "f64", .. }));
        assert!(matches!(
            true.to_value(),
            Err(EncodeError::UnsupportedType { kind: "bool" })
        ));
    }
}
