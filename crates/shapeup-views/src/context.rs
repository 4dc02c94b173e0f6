//! The template context.
//!
//! A [`Context`] is an insertion-ordered map from names to JSON values. Views
//! build it in layers: the template view lays down the caller's entries and
//! the `view` back-reference, then each collaborator (lister, lookup, form
//! flow) adds its own keys on top.

use std::ops::Index;

use serde::Serialize;
use serde_json::{Map, Value};

use shapeup_core::ShapeupResult;

/// Key-value data passed to the rendering step.
///
/// # Examples
///
/// ```
/// use shapeup_views::Context;
///
/// let mut context = Context::new();
/// context.insert("title", "Inbox");
/// context.set_default("title", "ignored");
/// context.insert("count", 3);
///
/// assert_eq!(context.get("title").and_then(|v| v.as_str()), Some("Inbox"));
/// assert_eq!(context.keys().collect::<Vec<_>>(), vec!["title", "count"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Context(Map<String, Value>);

impl Context {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value, replacing and returning any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Serializes `value` and inserts it.
    pub fn insert_serialized<T: Serialize + ?Sized>(
        &mut self,
        key: impl Into<String>,
        value: &T,
    ) -> ShapeupResult<()> {
        self.0.insert(key.into(), serde_json::to_value(value)?);
        Ok(())
    }

    /// Inserts a value only if the key is not already present.
    pub fn set_default(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.entry(key.into()).or_insert_with(|| value.into());
    }

    /// Copies every entry of `other` in, replacing existing keys.
    pub fn update(&mut self, other: &Self) {
        for (key, value) in &other.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the underlying map.
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Converts the context into a JSON object.
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Context {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Missing keys index to `null`, as with [`serde_json::Value`].
impl Index<&str> for Context {
    type Output = Value;

    fn index(&self, key: &str) -> &Value {
        static NULL: Value = Value::Null;
        self.0.get(key).unwrap_or(&NULL)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Context {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
