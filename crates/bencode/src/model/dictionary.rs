//! Insertion-ordered dictionary keyed by byte strings.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::model::Value;

type Entry = (Vec<u8>, Value);

/// Borrowing iterator over dictionary entries in insertion order.
pub type Iter<'a> = std::iter::Map<std::slice::Iter<'a, Entry>, fn(&Entry) -> (&[u8], &Value)>;

fn entry_ref((key, value): &Entry) -> (&[u8], &Value) {
    (key.as_slice(), value)
}

/// Ordered dictionary with unique byte-string keys.
///
/// Entries iterate in first-insertion order. Inserting an existing key
/// replaces the value but keeps the entry's original position, so a decoded
/// dictionary with a duplicate key ends up holding the later value.
#[derive(Clone, Default)]
pub struct Dictionary {
    entries: Vec<Entry>,
    index: FxHashMap<Vec<u8>, usize>,
}

impl Dictionary {
    /// Creates an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty dictionary with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Inserts an entry, returning the value it replaced.
    pub fn insert(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        if let Some(&pos) = self.index.get(&key) {
            return Some(std::mem::replace(&mut self.entries[pos].1, value));
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, value));
        None
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: impl AsRef<[u8]>) -> Option<&Value> {
        self.index
            .get(key.as_ref())
            .map(|&pos| &self.entries[pos].1)
    }

    /// Returns a mutable reference to the value stored under `key`.
    pub fn get_mut(&mut self, key: impl AsRef<[u8]>) -> Option<&mut Value> {
        let pos = *self.index.get(key.as_ref())?;
        Some(&mut self.entries[pos].1)
    }

    /// Returns true if `key` is present.
    pub fn contains_key(&self, key: impl AsRef<[u8]>) -> bool {
        self.index.contains_key(key.as_ref())
    }

    /// Removes `key`, preserving the order of the remaining entries.
    pub fn remove(&mut self, key: impl AsRef<[u8]>) -> Option<Value> {
        let pos = self.index.remove(key.as_ref())?;
        let (_, value) = self.entries.remove(pos);
        for (k, _) in &self.entries[pos..] {
            if let Some(i) = self.index.get_mut(k) {
                *i -= 1;
            }
        }
        Some(value)
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> Iter<'_> {
        self.entries.iter().map(entry_ref as fn(&Entry) -> (&[u8], &Value))
    }

    /// Iterates keys in insertion order.
    pub fn keys(&self) -> impl ExactSizeIterator<Item = &[u8]> {
        self.entries.iter().map(|(k, _)| k.as_slice())
    }

    /// Returns the entries sorted by raw key bytes (canonical order).
    pub fn sorted_entries(&self) -> Vec<(&[u8], &Value)> {
        let mut sorted: Vec<_> = self.iter().collect();
        sorted.sort_unstable_by(|a, b| a.0.cmp(b.0));
        sorted
    }

    /// Converts into a hash map for keyed consumption.
    pub fn into_map(self) -> FxHashMap<Vec<u8>, Value> {
        self.entries.into_iter().collect()
    }
}

impl PartialEq for Dictionary {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for Dictionary {}

impl fmt::Debug for Dictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.entries
                    .iter()
                    .map(|(k, v)| (String::from_utf8_lossy(k), v)),
            )
            .finish()
    }
}

impl<K, V> FromIterator<(K, V)> for Dictionary
where
    K: Into<Vec<u8>>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut dict = Dictionary::with_capacity(iter.size_hint().0);
        for (k, v) in iter {
            dict.insert(k, v);
        }
        dict
    }
}

impl IntoIterator for Dictionary {
    type Item = Entry;
    type IntoIter = std::vec::IntoIter<Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Dictionary {
    type Item = (&'a [u8], &'a Value);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_preserved() {
        let mut dict = Dictionary::new();
        dict.insert("spam", 1);
        dict.insert("cow", 2);
        dict.insert("aardvark", 3);

        let keys: Vec<_> = dict.keys().collect();
        assert_eq!(keys, vec![&b"spam"[..], b"cow", b"aardvark"]);
    }

    #[test]
    fn test_duplicate_insert_replaces_in_place() {
        let mut dict = Dictionary::new();
        dict.insert("a", 1);
        dict.insert("b", 2);
        let old = dict.insert("a", 3);

        assert_eq!(old, Some(Value::Integer(1)));
        assert_eq!(dict.len(), 2);
        assert_eq!(dict.get("a"), Some(&Value::Integer(3)));
        assert_eq!(dict.keys().next(), Some(&b"a"[..]));
    }

    #[test]
    fn test_remove_keeps_index_consistent() {
        let mut dict: Dictionary = [("a", 1), ("b", 2), ("c", 3)].into_iter().collect();

        assert_eq!(dict.remove("a"), Some(Value::Integer(1)));
        assert_eq!(dict.remove("a"), None);
        assert_eq!(dict.get("c"), Some(&Value::Integer(3)));
        assert_eq!(dict.get("b"), Some(&Value::Integer(2)));

        dict.insert("d", 4);
        let keys: Vec<_> = dict.keys().collect();
        assert_eq!(keys, vec![&b"b"[..], b"c", b"d"]);
    }

    #[test]
    fn test_sorted_entries() {
        let dict: Dictionary = [("zeta", 1), ("alpha", 2), ("Beta", 3)].into_iter().collect();
        let keys: Vec<_> = dict.sorted_entries().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![&b"Beta"[..], b"alpha", b"zeta"]);
    }

    #[test]
    fn test_equality_is_order_sensitive() {
        let a: Dictionary = [("x", 1), ("y", 2)].into_iter().collect();
        let b: Dictionary = [("x", 1), ("y", 2)].into_iter().collect();
        let c: Dictionary = [("y", 2), ("x", 1)].into_iter().collect();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
