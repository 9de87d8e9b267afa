//! Embedded attribute fragments: the property map, its codec, the two
//! extractors (alt text and following block) and the merge engine.

mod alt;
mod block;
mod codec;
mod merge;

use std::borrow::Cow;
use std::fmt;

pub use alt::{AltAttrs, AltExtraction, attrs_from_alt, extract_from_alt, salt};
pub use block::{
    BlockAttrs, BlockBy, BlockExtraction, RemoveRange, SiblingParagraph, attrs_from_block,
    block_text, extract_from_block, fold_whitespace, remove_block, sibling_paragraph,
};
pub use codec::{decode_attrs, encode_attrs};
pub use merge::merge_attrs;

use crate::dom::Attribute;

/// Attributes whose value is a whitespace-separated token list.
const TOKEN_LIST_ATTRS: &[&str] = &["class"];

/// Value of a single property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    /// Plain attribute text (numbers travel as text too).
    Text(String),
    /// Ordered token list, e.g. `class`.
    Tokens(Vec<String>),
}

impl PropertyValue {
    /// Build the value for attribute `name` from raw attribute text.
    pub fn for_attr(name: &str, raw: &str) -> Self {
        if TOKEN_LIST_ATTRS.contains(&name) {
            PropertyValue::Tokens(raw.split_ascii_whitespace().map(str::to_string).collect())
        } else {
            PropertyValue::Text(raw.to_string())
        }
    }

    /// The value as attribute text; token lists are space-joined.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            PropertyValue::Text(s) => Cow::Borrowed(s),
            PropertyValue::Tokens(tokens) => Cow::Owned(tokens.join(" ")),
        }
    }

    /// The value as a token list; text is split on ASCII whitespace.
    pub fn tokens(&self) -> Vec<String> {
        match self {
            PropertyValue::Text(s) => s.split_ascii_whitespace().map(str::to_string).collect(),
            PropertyValue::Tokens(tokens) => tokens.clone(),
        }
    }

    /// Parse the value as a non-negative integer dimension.
    pub fn as_u64(&self) -> Option<u64> {
        self.as_text().trim().parse().ok()
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::Text(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::Text(s)
    }
}

/// Ordered attribute map with unique keys.
///
/// Insertion order is serialization order. Overwriting an existing key keeps
/// its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyMap {
    entries: Vec<(String, PropertyValue)>,
}

impl PropertyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Insert or overwrite `key`, returning the previous value.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> Option<PropertyValue> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Insert `key` only when it is not present yet.
    pub fn insert_if_absent(&mut self, key: &str, value: impl Into<PropertyValue>) {
        if !self.contains_key(key) {
            self.entries.push((key.to_string(), value.into()));
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<PropertyValue> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Read element attributes into a map (first occurrence of a name wins).
    pub fn from_attributes(attrs: &[Attribute]) -> Self {
        let mut map = PropertyMap::new();
        for attr in attrs {
            let name = attr.name.local.as_ref();
            map.insert_if_absent(name, PropertyValue::for_attr(name, &attr.value));
        }
        map
    }

    /// Convert back to element attributes in map order.
    pub fn to_attributes(&self) -> Vec<Attribute> {
        self.iter()
            .map(|(k, v)| Attribute::new(k, v.as_text()))
            .collect()
    }
}

impl<K: Into<String>, V: Into<PropertyValue>> FromIterator<(K, V)> for PropertyMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = PropertyMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl IntoIterator for PropertyMap {
    type Item = (String, PropertyValue);
    type IntoIter = std::vec::IntoIter<(String, PropertyValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
