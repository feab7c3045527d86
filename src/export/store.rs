use std::collections::hash_map::{Entry, Iter};
use std::collections::HashMap;

use serde_json::Value;

/// Raw export bodies keyed by `"{program}/{project}/{node_label}"`.
/// Last write wins; nothing is ever removed.
#[derive(Debug, Clone, Default)]
pub struct RawDataStore {
    inner: HashMap<String, Value>,
}

impl RawDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace any previous body for `key` and return the stored one
    pub fn insert(&mut self, key: String, body: Value) -> &Value {
        match self.inner.entry(key) {
            Entry::Occupied(mut entry) => {
                entry.insert(body);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(body),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.inner.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.inner.keys()
    }

    pub fn iter(&self) -> Iter<'_, String, Value> {
        self.inner.iter()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<'a> IntoIterator for &'a RawDataStore {
    type Item = (&'a String, &'a Value);
    type IntoIter = Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}
