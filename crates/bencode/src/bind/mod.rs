//! Binding between [`Value`] trees and typed records.
//!
//! Types take part through two traits: [`FromValue`] builds a typed value
//! from a tree, [`ToValue`] builds a tree from a typed value. Records
//! declared with [`record!`](crate::record) get both, driven by a per-type
//! field table of identifiers and tags.
//!
//! | Destination | Value |
//! |---|---|
//! | `String`, `ByteBuf` | byte string |
//! | integers | integer |
//! | `Vec<T>` | list |
//! | records, `BTreeMap<String, T>`, `HashMap<String, T>` | dictionary |
//! | `Value` | any |

mod impls;
pub mod path;
pub mod record;
pub mod tag;

pub use path::{FieldPath, Segment};
pub use record::{RecordFields, RecordWriter};
pub use tag::{FieldSpec, Tag};

use crate::error::{BindError, EncodeError};
use crate::model::{Value, ValueKind};

/// Types that can be built from a value tree.
pub trait FromValue: Sized {
    /// Builds `Self` from `value`; `path` locates `value` for diagnostics.
    fn from_value(value: Value, path: &mut FieldPath) -> Result<Self, BindError>;
}

/// Types that can be turned into a value tree.
pub trait ToValue {
    fn to_value(&self) -> Result<Value, EncodeError>;
}

/// Binds `value` into `target`.
///
/// The result is built separately and assigned only on success, so `target`
/// is left untouched when binding fails.
pub fn bind<T: FromValue>(value: Value, target: &mut T) -> Result<(), BindError> {
    *target = from_value(value)?;
    Ok(())
}

/// Builds a typed value from `value`.
pub fn from_value<T: FromValue>(value: Value) -> Result<T, BindError> {
    let mut path = FieldPath::new();
    T::from_value(value, &mut path).inspect_err(|err| log::debug!("bind failed: {err}"))
}

pub(crate) fn mismatch(expected: ValueKind, got: &Value, path: &FieldPath) -> BindError {
    BindError::TypeMismatch {
        expected,
        got: got.kind(),
        path: path.clone(),
    }
}
