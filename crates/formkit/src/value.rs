//! Field values and bound models.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{FormError, FormResult};

/// A submitted field value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Single(String),
    Multiple(Vec<String>),
}

impl FieldValue {
    /// The value in single-value context; lists collapse to their first entry.
    pub fn to_single(&self) -> String {
        match self {
            FieldValue::Single(s) => s.clone(),
            FieldValue::Multiple(items) => items.first().cloned().unwrap_or_default(),
        }
    }

    /// The value in multi-value context.
    pub fn to_list(&self) -> Vec<String> {
        match self {
            FieldValue::Single(s) => vec![s.clone()],
            FieldValue::Multiple(items) => items.clone(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Single(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Single(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        FieldValue::Multiple(value)
    }
}

impl From<Vec<&str>> for FieldValue {
    fn from(value: Vec<&str>) -> Self {
        FieldValue::Multiple(value.into_iter().map(str::to_string).collect())
    }
}

/// A record bound to the open form, used as the last source of field values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Model(Map<String, Value>);

impl Model {
    /// Build a model from any value that serializes to a JSON object.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> FormResult<Self> {
        match serde_json::to_value(value)? {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(FormError::ModelNotObject),
        }
    }

    /// Raw JSON lookup.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Insert a field, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// A truthy field as a single string.
    ///
    /// Null, `false`, zero, `""`, `"0"` and empty arrays or objects count as
    /// missing.
    pub fn single(&self, key: &str) -> Option<String> {
        let value = self.get(key).filter(|v| is_truthy(v))?;
        match value {
            Value::Array(items) => items.iter().find_map(scalar_to_string),
            other => scalar_to_string(other),
        }
    }

    /// A truthy field as a list of strings; scalars are wrapped.
    pub fn list(&self, key: &str) -> Option<Vec<String>> {
        let value = self.get(key).filter(|v| is_truthy(v))?;
        match value {
            Value::Array(items) => Some(items.iter().filter_map(scalar_to_string).collect()),
            Value::Object(map) => Some(map.values().filter_map(scalar_to_string).collect()),
            other => scalar_to_string(other).map(|s| vec![s]),
        }
    }
}

impl From<Map<String, Value>> for Model {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Model {
    type Error = FormError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(FormError::ModelNotObject),
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(true) => Some("1".to_string()),
        Value::Bool(false) => Some(String::new()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct User {
        name: String,
        age: u32,
        active: bool,
        roles_dropdown: Vec<u32>,
    }

    #[test]
    fn test_model_from_struct() {
        let user = User {
            name: "Ana".to_string(),
            age: 31,
            active: true,
            roles_dropdown: vec![1, 3],
        };
        let model = Model::from_serialize(&user).unwrap();
        assert_eq!(model.single("name"), Some("Ana".to_string()));
        assert_eq!(model.single("age"), Some("31".to_string()));
        assert_eq!(model.single("active"), Some("1".to_string()));
        assert_eq!(model.list("roles_dropdown"), Some(vec!["1".to_string(), "3".to_string()]));
    }

    #[test]
    fn test_model_rejects_non_objects() {
        assert!(matches!(
            Model::from_serialize(&vec![1, 2]),
            Err(FormError::ModelNotObject)
        ));
        assert!(Model::try_from(json!("x")).is_err());
    }

    #[test]
    fn test_falsy_model_values_are_missing() {
        let model = Model::try_from(json!({
            "null": null,
            "zero": 0,
            "empty": "",
            "zero_str": "0",
            "no": false,
            "none": [],
        }))
        .unwrap();

        for key in ["null", "zero", "empty", "zero_str", "no", "none", "missing"] {
            assert_eq!(model.single(key), None, "{key} should be missing");
            assert_eq!(model.list(key), None, "{key} should be missing");
        }
    }

    #[test]
    fn test_model_list_wraps_scalars() {
        let model = Model::try_from(json!({"tag": "rust"})).unwrap();
        assert_eq!(model.list("tag"), Some(vec!["rust".to_string()]));
    }

    #[test]
    fn test_field_value_contexts() {
        let multiple = FieldValue::from(vec!["a", "b"]);
        assert_eq!(multiple.to_single(), "a");
        assert_eq!(multiple.to_list(), vec!["a", "b"]);
        assert_eq!(FieldValue::from("x").to_list(), vec!["x"]);
        assert_eq!(FieldValue::Multiple(Vec::new()).to_single(), "");
    }
}
