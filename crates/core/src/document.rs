//! Insertion-ordered document type.
//!
//! Key order is significant: it is the priority order of sort specifications
//! and the merge order of selectors, so entries are kept in the order they
//! were first inserted rather than sorted.

use crate::value::Value;
use alloc::string::String;
use alloc::vec::Vec;

/// A string-keyed map that remembers insertion order.
#[derive(Clone, Debug, Default)]
pub struct Document {
    entries: Vec<(String, Value)>,
}

impl Document {
    /// Creates a new empty document.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Creates a document with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Returns the number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the document is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }

    /// Gets a value by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.position(key).map(|idx| &self.entries[idx].1)
    }

    /// Gets a mutable value by key.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        let idx = self.position(key)?;
        Some(&mut self.entries[idx].1)
    }

    /// Inserts a key-value pair.
    ///
    /// An existing key keeps its position and has its value replaced.
    /// Returns the previous value, if any.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        match self.position(&key) {
            Some(idx) => Some(core::mem::replace(&mut self.entries[idx].1, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Removes a key and returns its value if present.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let idx = self.position(key)?;
        Some(self.entries.remove(idx).1)
    }

    /// Returns true if the document contains the given key.
    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Returns the nested document stored under `key`, creating it (or
    /// replacing a non-document value) when needed.
    pub fn document_entry(&mut self, key: &str) -> &mut Document {
        let idx = match self.position(key) {
            Some(idx) => {
                if !self.entries[idx].1.is_document() {
                    self.entries[idx].1 = Value::Document(Document::new());
                }
                idx
            }
            None => {
                self.entries
                    .push((String::from(key), Value::Document(Document::new())));
                self.entries.len() - 1
            }
        };
        match &mut self.entries[idx].1 {
            Value::Document(doc) => doc,
            _ => unreachable!("entry was just made a document"),
        }
    }

    /// Returns an iterator over the keys.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Returns an iterator over the values.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }

    /// Returns an iterator over key-value pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        if self.entries.len() != other.entries.len() {
            return false;
        }
        self.entries
            .iter()
            .zip(other.entries.iter())
            .all(|((k1, v1), (k2, v2))| k1 == k2 && v1 == v2)
    }
}

impl<K, V> FromIterator<(K, V)> for Document
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut doc = Document::new();
        for (k, v) in iter {
            doc.insert(k, v);
        }
        doc
    }
}

impl IntoIterator for Document {
    type Item = (String, Value);
    type IntoIter = alloc::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_document_insert_and_get() {
        let mut doc = Document::new();
        doc.insert("name", "Alice");
        doc.insert("age", 25i64);

        assert_eq!(doc.get("name"), Some(&Value::String("Alice".into())));
        assert_eq!(doc.get("age"), Some(&Value::Int(25)));
        assert_eq!(doc.get("missing"), None);
    }

    #[test]
    fn test_document_keeps_insertion_order() {
        let doc = Document::new().with("z", 1i64).with("a", 2i64).with("m", 3i64);
        let keys: Vec<_> = doc.keys().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_document_replace_keeps_position() {
        let mut doc = Document::new().with("a", 1i64).with("b", 2i64);
        let old = doc.insert("a", 10i64);

        assert_eq!(old, Some(Value::Int(1)));
        let keys: Vec<_> = doc.keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(doc.get("a"), Some(&Value::Int(10)));
    }

    #[test]
    fn test_document_remove() {
        let mut doc = Document::new().with("key", 42i64);
        assert!(doc.contains_key("key"));
        assert_eq!(doc.remove("key"), Some(Value::Int(42)));
        assert!(!doc.contains_key("key"));
        assert!(doc.is_empty());
    }

    #[test]
    fn test_document_entry_nests() {
        let mut doc = Document::new();
        doc.document_entry("a").document_entry("b").insert("asc", true);
        doc.document_entry("a").insert("c", 1i64);

        let a = doc.get("a").and_then(Value::as_document).unwrap();
        assert_eq!(a.len(), 2);
        assert_eq!(a.get("b").and_then(|b| b.get("asc")), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_document_equality_is_order_sensitive() {
        let a = Document::new().with("x", 1i64).with("y", 2i64);
        let b = Document::new().with("y", 2i64).with("x", 1i64);
        assert_ne!(a, b);
    }
}
