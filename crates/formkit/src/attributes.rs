//! HTML attribute bags: merging defaults with caller attributes and
//! serializing them to markup.

use serde::{Deserialize, Serialize};

use crate::html::escape_attribute;

/// A single attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    /// Rendered as `key="value"`.
    Text(String),

    /// `true` renders the bare attribute name, `false` omits it.
    Bool(bool),

    /// Space-joined when the key is `class`; skipped for any other key.
    List(Vec<String>),

    /// Never rendered.
    Absent,
}

impl AttrValue {
    /// Whether the value counts as "set" (anything but `Absent`).
    pub fn is_present(&self) -> bool {
        !matches!(self, AttrValue::Absent)
    }

    /// Collapse to a single string for value resolution.
    pub fn to_single(&self) -> String {
        match self {
            AttrValue::Text(s) => s.clone(),
            AttrValue::Bool(true) => "1".to_string(),
            AttrValue::Bool(false) | AttrValue::Absent => String::new(),
            AttrValue::List(items) => items.first().cloned().unwrap_or_default(),
        }
    }

    /// Normalize to a list for multi-value resolution.
    pub fn to_list(&self) -> Vec<String> {
        match self {
            AttrValue::List(items) => items.clone(),
            AttrValue::Absent => Vec::new(),
            other => vec![other.to_single()],
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Text(value)
    }
}

impl From<&String> for AttrValue {
    fn from(value: &String) -> Self {
        AttrValue::Text(value.clone())
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<Vec<String>> for AttrValue {
    fn from(value: Vec<String>) -> Self {
        AttrValue::List(value)
    }
}

impl From<Vec<&str>> for AttrValue {
    fn from(value: Vec<&str>) -> Self {
        AttrValue::List(value.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for AttrValue {
    fn from(value: [&str; N]) -> Self {
        AttrValue::List(value.iter().map(|s| s.to_string()).collect())
    }
}

impl<T: Into<AttrValue>> From<Option<T>> for AttrValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(AttrValue::Absent, Into::into)
    }
}

/// An ordered attribute bag.
///
/// Setting a key that already exists replaces its value without moving it;
/// new keys are appended.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    entries: Vec<(String, AttrValue)>,
}

impl Attributes {
    /// Create an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Insert or replace a value in place.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Look up a value.
    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.entries
            .iter()
            .find_map(|(k, v)| (k == key).then_some(v))
    }

    /// Look up a present text value.
    pub fn get_text(&self, key: &str) -> Option<&str> {
        match self.get(key) {
            Some(AttrValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    /// Whether the key is set to anything other than `Absent`.
    pub fn is_set(&self, key: &str) -> bool {
        self.get(key).is_some_and(AttrValue::is_present)
    }

    /// Remove a key, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<AttrValue> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The `class` attribute as a list of tokens.
    pub fn classes(&self) -> Vec<String> {
        match self.get("class") {
            Some(AttrValue::List(items)) => items.clone(),
            Some(AttrValue::Text(s)) => vec![s.clone()],
            _ => Vec::new(),
        }
    }

    /// Append a class token, normalizing `class` to a list first.
    pub fn push_class(&mut self, class: impl Into<String>) {
        let mut classes = self.classes();
        classes.push(class.into());
        self.set("class", classes);
    }

    /// Prepend a class token, normalizing `class` to a list first.
    pub fn prepend_class(&mut self, class: impl Into<String>) {
        let mut classes = self.classes();
        classes.insert(0, class.into());
        self.set("class", classes);
    }

    /// Normalize `class` to a list, adding an empty one when missing.
    fn normalize_class(&mut self) {
        let classes = self.classes();
        self.set("class", classes);
    }

    /// Merge computed defaults with caller attributes.
    ///
    /// The result keeps the caller's key order. Every default key overrides
    /// the caller's value for the same key, except `class`, which becomes the
    /// defaults' classes followed by the caller's.
    pub fn merge(defaults: &Attributes, overrides: &Attributes) -> Attributes {
        let mut defaults = defaults.clone();
        let mut merged = overrides.clone();
        defaults.normalize_class();
        merged.normalize_class();

        let mut classes = defaults.classes();
        classes.extend(merged.classes());
        defaults.set("class", classes);

        for (key, value) in defaults.entries {
            merged.set(key, value);
        }
        merged
    }

    /// Serialize to `key="value"` pairs joined by spaces.
    pub fn to_html(&self) -> String {
        self.entries
            .iter()
            .filter_map(|(key, value)| render_attribute(key, value))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn render_attribute(key: &str, value: &AttrValue) -> Option<String> {
    match value {
        AttrValue::Bool(true) if key != "value" => Some(key.to_string()),
        AttrValue::Bool(_) | AttrValue::Absent => None,
        AttrValue::List(items) if key == "class" => {
            let joined = items
                .iter()
                .map(|c| escape_attribute(c))
                .collect::<Vec<_>>()
                .join(" ");
            Some(format!(r#"class="{joined}""#))
        }
        AttrValue::List(_) => None,
        AttrValue::Text(s) => Some(format!(r#"{key}="{}""#, escape_attribute(s))),
    }
}

impl<K: Into<String>, V: Into<AttrValue>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attributes = Attributes::new();
        for (key, value) in iter {
            attributes.set(key, value);
        }
        attributes
    }
}

impl<K: Into<String>, V: Into<AttrValue>, const N: usize> From<[(K, V); N]> for Attributes {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}
