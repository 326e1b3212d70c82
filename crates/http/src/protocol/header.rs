//! Read-only view over a request's header fields.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::protocol::HeaderField;

/// Request header fields keyed by their exact (case-sensitive) name.
///
/// Repeated fields are folded into a single comma-joined value as they are
/// inserted, so every name maps to exactly one value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpHeader {
    fields: HashMap<String, String>,
}

impl HttpHeader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field, appending to any previous value with `,` and no space.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let value = value.into();
        match self.fields.entry(name.into()) {
            Entry::Occupied(mut entry) => {
                let previous = entry.get_mut();
                previous.push(',');
                previous.push_str(&value);
            }
            Entry::Vacant(entry) => {
                entry.insert(value);
            }
        }
    }

    pub fn value_of(&self, field: HeaderField) -> Option<&str> {
        self.get(field.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Splits a list-valued field on `,` and trims every token.
    pub fn values_of(&self, field: HeaderField) -> Vec<&str> {
        self.value_of(field).map(|value| value.split(',').map(str::trim).collect()).unwrap_or_default()
    }

    pub fn has(&self, field: HeaderField) -> bool {
        self.fields.contains_key(field.as_str())
    }

    pub fn is_connection_close(&self) -> bool {
        self.value_of(HeaderField::Connection).is_some_and(|value| value.trim() == "close")
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for HttpHeader {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut header = Self::new();
        for (name, value) in iter {
            header.append(name, value);
        }
        header
    }
}
