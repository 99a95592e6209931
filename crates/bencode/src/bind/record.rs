//! Record declaration and field-by-field resolution.

use rustc_hash::FxHashMap;

use crate::bind::{mismatch, FieldPath, FieldSpec, FromValue, Segment, ToValue};
use crate::error::{BindError, EncodeError};
use crate::model::{Dictionary, Value, ValueKind};

/// Source side of record binding: the dictionary's entries, looked up by key.
#[derive(Debug)]
pub struct RecordFields {
    entries: FxHashMap<Vec<u8>, Value>,
    /// Fields still to read each key, so several fields can share one key.
    readers: FxHashMap<&'static str, usize>,
}

impl RecordFields {
    /// Opens `value` as the source for the fields in `fields`; it must be a
    /// dictionary.
    pub fn new(value: Value, fields: &[FieldSpec], path: &FieldPath) -> Result<Self, BindError> {
        let dict = match value {
            Value::Dictionary(dict) => dict,
            other => return Err(mismatch(ValueKind::Dictionary, &other, path)),
        };
        let mut readers = FxHashMap::default();
        for spec in fields.iter().filter(|spec| !spec.tag().skip) {
            *readers.entry(spec.key()).or_insert(0) += 1;
        }
        Ok(Self {
            entries: dict.into_map(),
            readers,
        })
    }

    /// Resolves and binds one field.
    ///
    /// A missing key leaves the field at its default when the tag says
    /// `omitempty`; otherwise it is an error. Skipped fields always get
    /// their default.
    pub fn take<T: FromValue + Default>(
        &mut self,
        spec: &FieldSpec,
        path: &mut FieldPath,
    ) -> Result<T, BindError> {
        let tag = spec.tag();
        if tag.skip {
            return Ok(T::default());
        }
        let key = spec.key();
        match self.lookup(key) {
            Some(value) => path.with(Segment::Field(spec.ident), |path| {
                T::from_value(value, path)
            }),
            None if tag.omit_empty => Ok(T::default()),
            None => Err(BindError::MissingKey {
                field: spec.ident,
                key: key.to_string(),
                path: path.clone(),
            }),
        }
    }

    /// The last field reading `key` moves the value out; earlier ones get a copy.
    fn lookup(&mut self, key: &str) -> Option<Value> {
        match self.readers.get_mut(key) {
            Some(remaining) if *remaining > 1 => {
                *remaining -= 1;
                self.entries.get(key.as_bytes()).cloned()
            }
            Some(remaining) => {
                *remaining = 0;
                self.entries.remove(key.as_bytes())
            }
            None => self.entries.get(key.as_bytes()).cloned(),
        }
    }
}

/// Sink side of record encoding: builds a dictionary in field order.
#[derive(Debug, Default)]
pub struct RecordWriter {
    dict: Dictionary,
}

impl RecordWriter {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            dict: Dictionary::with_capacity(capacity),
        }
    }

    /// Adds one field, honoring `-` and `omitempty`.
    pub fn put<T: ToValue + ?Sized>(&mut self, spec: &FieldSpec, field: &T) -> Result<(), EncodeError> {
        let tag = spec.tag();
        if tag.skip {
            return Ok(());
        }
        let value = field.to_value()?;
        if tag.omit_empty && value.is_empty() {
            return Ok(());
        }
        self.dict.insert(spec.key(), value);
        Ok(())
    }

    pub fn finish(self) -> Value {
        Value::Dictionary(self.dict)
    }
}

/// Declares a record struct bound to bencode dictionaries.
///
/// Each field may carry a `#[tag = "..."]` attribute: `"name"`,
/// `"name,omitempty"`, or `"-"` to exclude the field. Untagged fields use
/// their identifier as the key in both directions. The tag may sit anywhere
/// among the field's other attributes, which are passed through. Field types
/// must implement [`FromValue`], [`ToValue`] and `Default`.
///
/// ```rust
/// bencode::record! {
///     #[derive(Debug, Default, PartialEq)]
///     pub struct File {
///         #[tag = "announce"]
///         pub announce: String,
///         #[tag = "name"]
///         pub name: String,
///         #[tag = "size"]
///         pub size: i64,
///     }
/// }
///
/// let file = File {
///     announce: "http://announce.com".into(),
///     name: "name.txt".into(),
///     size: 10,
/// };
/// let bytes = bencode::to_bytes(&file).unwrap();
/// assert_eq!(bytes, b"d8:announce19:http://announce.com4:name8:name.txt4:sizei10ee");
///
/// let back: File = bencode::from_slice(&bytes).unwrap();
/// assert_eq!(back, file);
/// ```
#[macro_export]
macro_rules! record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$($fattr:tt)*])*
                $fvis:vis $field:ident : $ty:ty
            ),* $(,)?
        }
    ) => {
        $crate::__record_struct! {
            @head [$(#[$meta])* $vis struct $name]
            @done []
            @todo [$( { [$([$($fattr)*])*] [$fvis] $field : $ty } )*]
        }

        impl $name {
            /// Field table in declaration order.
            pub const FIELDS: &'static [
                $crate::bind::FieldSpec;
                <[&str]>::len(&[$(stringify!($field)),*])
            ] = &[
                $(
                    $crate::bind::FieldSpec::new(
                        stringify!($field),
                        $crate::__record_tag!($([$($fattr)*])*),
                    ),
                )*
            ];
        }

        impl $crate::bind::FromValue for $name {
            fn from_value(
                value: $crate::Value,
                path: &mut $crate::bind::FieldPath,
            ) -> ::std::result::Result<Self, $crate::BindError> {
                let [$($field),*] = Self::FIELDS;
                let mut fields = $crate::bind::RecordFields::new(value, Self::FIELDS, path)?;
                ::std::result::Result::Ok(Self {
                    $( $field: fields.take($field, path)?, )*
                })
            }
        }

        impl $crate::bind::ToValue for $name {
            fn to_value(&self) -> ::std::result::Result<$crate::Value, $crate::EncodeError> {
                let [$($field),*] = Self::FIELDS;
                let mut fields = $crate::bind::RecordWriter::with_capacity(Self::FIELDS.len());
                $( fields.put($field, &self.$field)?; )*
                ::std::result::Result::Ok(fields.finish())
            }
        }
    };
}

/// Emits the record struct, dropping `#[tag]` attributes from its fields.
#[doc(hidden)]
#[macro_export]
macro_rules! __record_struct {
    (@head [$($head:tt)*] @done [$($done:tt)*] @todo []) => {
        $($head)* { $($done)* }
    };
    (
        @head $head:tt @done $done:tt
        @todo [{ [[tag = $tag:literal] $($attrs:tt)*] $($field:tt)* } $($todo:tt)*]
    ) => {
        $crate::__record_struct! {
            @head $head @done $done
            @todo [{ [$($attrs)*] $($field)* } $($todo)*]
        }
    };
    (
        @head $head:tt @done [$($done:tt)*]
        @todo [{ [[$($attr:tt)*] $($attrs:tt)*] $($field:tt)* } $($todo:tt)*]
    ) => {
        $crate::__record_struct! {
            @head $head @done [$($done)* #[$($attr)*]]
            @todo [{ [$($attrs)*] $($field)* } $($todo)*]
        }
    };
    (
        @head $head:tt @done [$($done:tt)*]
        @todo [{ [] [$($fvis:tt)*] $field:ident : $ty:ty } $($todo:tt)*]
    ) => {
        $crate::__record_struct! {
            @head $head @done [$($done)* $($fvis)* $field: $ty,]
            @todo [$($todo)*]
        }
    };
}

/// Picks the `#[tag]` value out of a field's attributes.
#[doc(hidden)]
#[macro_export]
macro_rules! __record_tag {
    () => {
        ::std::option::Option::None
    };
    ([tag = $tag:literal] $($rest:tt)*) => {
        ::std::option::Option::Some($tag)
    };
    ([$($other:tt)*] $($rest:tt)*) => {
        $crate::__record_tag!($($rest)*)
    };
}

#[cfg(test)]
mod tests {
    use crate::bind::{bind, from_value, FieldPath, Segment, ToValue};
    use crate::codec::{decode_slice, to_vec};
    use crate::error::BindError;
    use crate::model::{Dictionary, Value, ValueKind};

    crate::record! {
        #[derive(Debug, Clone, Default, PartialEq)]
        struct Announce {
            #[tag = "announce"]
            announce: i64,
        }
    }

    crate::record! {
        #[derive(Debug, Clone, Default, PartialEq)]
        struct AnnounceText {
            #[tag = "announce"]
            announce: String,
        }
    }

    crate::record! {
        #[derive(Debug, Clone, Default, PartialEq)]
        struct Optional {
            #[tag = "announce"]
            announce: i64,
            #[tag = "comment,omitempty"]
            comment: String,
        }
    }

    crate::record! {
        #[derive(Debug, Clone, Default, PartialEq)]
        struct Untagged {
            /// Bound by identifier.
            length: i64,
            #[tag = "-"]
            cached: i64,
        }
    }

    crate::record! {
        #[derive(Debug, Clone, Default, PartialEq)]
        struct Outer {
            #[tag = "items"]
            items: Vec<Untagged>,
        }
    }

    crate::record! {
        #[derive(Debug, Clone, Default, PartialEq)]
        struct SharedKey {
            #[tag = "k"]
            first: i64,
            #[tag = "k"]
            second: i64,
        }
    }

    crate::record! {
        #[derive(Debug, Clone, Default, PartialEq)]
        struct Annotated {
            #[tag = "len"]
            /// Documented after the tag.
            #[allow(dead_code)]
            length: i64,
            #[allow(unused)]
            #[tag = "name,omitempty"]
            pub name: String,
        }
    }

    fn dict<const N: usize>(entries: [(&str, Value); N]) -> Value {
        Value::Dictionary(entries.into_iter().collect::<Dictionary>())
    }

    #[test]
    fn test_bind_integer_field() {
        let mut target = Announce::default();
        bind(dict([("announce", Value::Integer(2))]), &mut target).unwrap();
        assert_eq!(target.announce, 2);
    }

    #[test]
    fn test_bind_type_mismatch() {
        let mut target = AnnounceText::default();
        let err = bind(dict([("announce", Value::Integer(2))]), &mut target).unwrap_err();
        match err {
            BindError::TypeMismatch { expected, got, path } => {
                assert_eq!(expected, ValueKind::ByteString);
                assert_eq!(got, ValueKind::Integer);
                assert_eq!(path.segments(), &[Segment::Field("announce")]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_required_key() {
        let err = from_value::<Announce>(dict([("other", Value::Integer(1))])).unwrap_err();
        assert_eq!(
            err,
            BindError::MissingKey {
                field: "announce",
                key: "announce".into(),
                path: FieldPath::new(),
            }
        );
    }

    #[test]
    fn test_omitempty_missing_key_keeps_default() {
        let bound: Optional = from_value(dict([("announce", Value::Integer(7))])).unwrap();
        assert_eq!(
            bound,
            Optional {
                announce: 7,
                comment: String::new(),
            }
        );
    }

    #[test]
    fn test_untagged_field_uses_identifier_both_ways() {
        let bound: Untagged = from_value(dict([
            ("length", Value::Integer(5)),
            ("cached", Value::Integer(9)),
        ]))
        .unwrap();
        assert_eq!(bound, Untagged { length: 5, cached: 0 });

        let value = Untagged { length: 5, cached: 9 }.to_value().unwrap();
        assert_eq!(to_vec(&value).unwrap(), b"d6:lengthi5ee");
    }

    #[test]
    fn test_omitempty_skips_empty_on_encode() {
        let value = Optional { announce: 0, comment: String::new() }.to_value().unwrap();
        assert_eq!(to_vec(&value).unwrap(), b"d8:announcei0ee");

        let value = Optional { announce: 1, comment: "hi".into() }.to_value().unwrap();
        assert_eq!(to_vec(&value).unwrap(), b"d8:announcei1e7:comment2:hie");
    }

    #[test]
    fn test_nested_error_path() {
        let value = decode_slice(b"d5:itemsld6:lengthi1eed6:length1:xeee").unwrap();
        let err = from_value::<Outer>(value).unwrap_err();
        assert_eq!(err.path().to_string(), "items[1].length");
        assert!(matches!(err, BindError::TypeMismatch { .. }));
    }

    #[test]
    fn test_failed_bind_leaves_target_untouched() {
        let mut target = Outer {
            items: vec![Untagged { length: 42, cached: 1 }],
        };
        let before = target.clone();
        let value = decode_slice(b"d5:itemsld6:lengthi1eed6:length1:xeee").unwrap();
        assert!(bind(value, &mut target).is_err());
        assert_eq!(target, before);
    }

    #[test]
    fn test_record_requires_dictionary() {
        let err = from_value::<Announce>(Value::List(vec![])).unwrap_err();
        assert!(matches!(
            err,
            BindError::TypeMismatch { expected: ValueKind::Dictionary, got: ValueKind::List, .. }
        ));
    }

    #[test]
    fn test_field_table() {
        assert_eq!(Optional::FIELDS.len(), 2);
        assert_eq!(Optional::FIELDS[1].key(), "comment");
        assert!(Optional::FIELDS[1].tag().omit_empty);
        assert_eq!(Untagged::FIELDS[0].raw_tag, None);
    }

    #[test]
    fn test_fields_sharing_a_key_all_bind() {
        let bound: SharedKey = from_value(dict([("k", Value::Integer(2))])).unwrap();
        assert_eq!(bound, SharedKey { first: 2, second: 2 });

        let value = SharedKey { first: 1, second: 2 }.to_value().unwrap();
        let bytes = to_vec(&value).unwrap();
        assert_eq!(bytes, b"d1:ki2ee");
        let back: SharedKey = from_value(decode_slice(&bytes).unwrap()).unwrap();
        assert_eq!(back, SharedKey { first: 2, second: 2 });
    }

    #[test]
    fn test_tag_among_other_field_attributes() {
        assert_eq!(Annotated::FIELDS[0].key(), "len");
        assert_eq!(Annotated::FIELDS[1].key(), "name");
        assert!(Annotated::FIELDS[1].tag().omit_empty);

        let record = Annotated {
            length: 3,
            name: String::new(),
        };
        let value = record.to_value().unwrap();
        assert_eq!(to_vec(&value).unwrap(), b"d3:leni3ee");
        assert_eq!(from_value::<Annotated>(value).unwrap(), record);
    }
}
