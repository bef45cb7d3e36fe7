//! Request context consumed by the renderer: previously submitted input and
//! validation errors.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::value::FieldValue;

/// Source of values flashed from the previous submission.
pub trait RequestValueSource {
    /// The old value for a field, if the last submission carried one.
    fn old_value(&self, name: &str) -> Option<FieldValue>;
}

/// Whether the active validation error bag has an entry for a field.
pub trait ErrorOracle {
    fn has_error(&self, name: &str) -> bool;
}

impl<T: RequestValueSource + ?Sized> RequestValueSource for &T {
    fn old_value(&self, name: &str) -> Option<FieldValue> {
        (**self).old_value(name)
    }
}

impl<T: RequestValueSource + ?Sized> RequestValueSource for Arc<T> {
    fn old_value(&self, name: &str) -> Option<FieldValue> {
        (**self).old_value(name)
    }
}

impl<T: ErrorOracle + ?Sized> ErrorOracle for &T {
    fn has_error(&self, name: &str) -> bool {
        (**self).has_error(name)
    }
}

impl<T: ErrorOracle + ?Sized> ErrorOracle for Arc<T> {
    fn has_error(&self, name: &str) -> bool {
        (**self).has_error(name)
    }
}

/// Old input keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OldInput {
    values: HashMap<String, FieldValue>,
}

impl OldInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from urlencoded form pairs.
    ///
    /// Keys ending in `[]` are collected into a list stored under the bare
    /// name; any other repeated key keeps its last value.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut values: HashMap<String, FieldValue> = HashMap::new();
        for (key, value) in pairs {
            let key = key.as_ref();
            let value = value.into();
            match key.strip_suffix("[]") {
                Some(base) => {
                    let entry = values
                        .entry(base.to_string())
                        .or_insert_with(|| FieldValue::Multiple(Vec::new()));
                    match entry {
                        FieldValue::Multiple(items) => items.push(value),
                        single => *single = FieldValue::Multiple(vec![value]),
                    }
                }
                None => {
                    values.insert(key.to_string(), FieldValue::Single(value));
                }
            }
        }
        Self { values }
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    /// Drop a field, e.g. a password that must never be flashed back.
    pub fn forget(&mut self, name: &str) -> Option<FieldValue> {
        self.values.remove(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl RequestValueSource for OldInput {
    fn old_value(&self, name: &str) -> Option<FieldValue> {
        self.values.get(name).cloned()
    }
}

/// Validation messages keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorBag {
    messages: BTreeMap<String, Vec<String>>,
}

impl ErrorBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.messages
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    /// Builder-style add.
    pub fn with(mut self, field: impl Into<String>, message: impl Into<String>) -> Self {
        self.add(field, message);
        self
    }

    /// All messages for a field.
    pub fn get(&self, field: &str) -> &[String] {
        self.messages
            .get(field)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The first message for a field.
    pub fn first(&self, field: &str) -> Option<&str> {
        self.get(field).first().map(String::as_str)
    }

    /// Iterate fields with their messages.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.messages
            .iter()
            .map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }

    /// Number of fields with at least one message.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl ErrorOracle for ErrorBag {
    fn has_error(&self, name: &str) -> bool {
        self.messages.get(name).is_some_and(|m| !m.is_empty())
    }
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pairs_groups_brackets() {
        let input = OldInput::from_pairs(vec![
            ("name", "Ana"),
            ("tags[]", "rust"),
            ("tags[]", "web"),
            ("name", "Bia"),
        ]);

        assert_eq!(input.old_value("name"), Some(FieldValue::from("Bia")));
        assert_eq!(input.old_value("tags"), Some(FieldValue::from(vec!["rust", "web"])));
        assert_eq!(input.old_value("tags[]"), None);
        assert_eq!(input.len(), 2);
    }

    #[test]
    fn test_forget_removes_field() {
        let mut input = OldInput::new().with("password", "secret");
        assert!(input.forget("password").is_some());
        assert!(input.old_value("password").is_none());
    }

    #[test]
    fn test_error_bag() {
        let errors = ErrorBag::new()
            .with("email", "The email is required.")
            .with("email", "The email must be valid.");

        assert!(errors.has_error("email"));
        assert!(!errors.has_error("name"));
        assert_eq!(errors.first("email"), Some("The email is required."));
        assert_eq!(errors.get("email").len(), 2);
        assert!(errors.get("name").is_empty());
    }

    #[test]
    fn test_error_bag_serde_round_trip() {
        let errors = ErrorBag::new().with("name", "Required");
        let json = serde_json::to_string(&errors).unwrap();
        assert_eq!(json, r#"{"name":["Required"]}"#);
        let parsed: ErrorBag = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, errors);
    }

    #[test]
    fn test_traits_through_references() {
        fn lookup(source: impl RequestValueSource, oracle: impl ErrorOracle) -> bool {
            source.old_value("a").is_some() && oracle.has_error("a")
        }
        let input = OldInput::new().with("a", "1");
        let errors = Arc::new(ErrorBag::new().with("a", "bad"));
        assert!(lookup(&input, errors));
    }
}
