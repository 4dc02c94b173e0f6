//! Structured field values.
//!
//! [`FieldValues`] is what flows between forms, entities, and persistence
//! hooks: a form's cleaned data, an entity's current fields, the arguments to
//! a save or update. It keeps fields in insertion order and can be converted
//! to and from any serde type.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use shapeup_core::{ShapeupError, ShapeupResult};

/// An ordered mapping of field names to values.
///
/// # Examples
///
/// ```
/// use serde::Deserialize;
/// use shapeup_views::FieldValues;
///
/// #[derive(Deserialize)]
/// struct NewArticle {
///     title: String,
///     draft: bool,
/// }
///
/// let mut values = FieldValues::new();
/// values.insert("title", "Hello");
/// values.insert("draft", true);
///
/// let article: NewArticle = values.deserialize().unwrap();
/// assert_eq!(article.title, "Hello");
/// assert!(article.draft);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldValues(Map<String, Value>);

impl FieldValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds field values from any serializable struct or map.
    ///
    /// Fails with [`ShapeupError::Serialization`] if `value` does not
    /// serialize to a JSON object.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> ShapeupResult<Self> {
        match serde_json::to_value(value)? {
            Value::Object(map) => Ok(Self(map)),
            other => Err(ShapeupError::Serialization(format!(
                "expected an object with named fields, got {other}"
            ))),
        }
    }

    /// Deserializes the values into a typed struct.
    pub fn deserialize<T: DeserializeOwned>(&self) -> ShapeupResult<T> {
        Ok(serde_json::from_value(Value::Object(self.0.clone()))?)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Returns a field as a string slice, if it holds a string.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    pub fn contains_key(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    /// Overlays `other` on these values. Fields present in both take the
    /// value from `other`.
    #[must_use]
    pub fn merged(mut self, other: Self) -> Self {
        self.0.extend(other.0);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for FieldValues {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for FieldValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
