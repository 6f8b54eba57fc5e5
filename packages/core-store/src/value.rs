//! Values that can be stored under a key.
//!
//! Each variant maps onto exactly one on-disk representation:
//! - [`Value::Object`] is a directory with a `.obj` marker
//! - [`Value::Function`] is a `<key>.js` leaf
//! - [`Value::Data`] is a `<key>.dat` leaf holding JSON

use std::collections::btree_map;
use std::collections::BTreeMap;

use serde_json::Value as JsonValue;

use crate::{Function, Path};

/// A value read from or written to a store.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Any JSON value stored as a single leaf. Writing `Null` deletes the key.
    Data(JsonValue),
    /// A function leaf.
    Function(Function),
    /// A nested mapping.
    Object(Object),
}

impl Value {
    /// JSON null marks a key for deletion on write.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Data(JsonValue::Null))
    }

    pub fn as_data(&self) -> Option<&JsonValue> {
        match self {
            Value::Data(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Value::Function(function) => Some(function),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn into_object(self) -> Option<Object> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Render as JSON. Functions render as their source text.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Data(data) => data.clone(),
            Value::Function(function) => JsonValue::String(function.source().to_string()),
            Value::Object(object) => object.to_json(),
        }
    }
}

/// JSON objects become [`Value::Object`] (recursively); everything else is
/// [`Value::Data`].
impl From<JsonValue> for Value {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
            other => Value::Data(other),
        }
    }
}

impl From<Function> for Value {
    fn from(function: Function) -> Self {
        Value::Function(function)
    }
}

impl From<Object> for Value {
    fn from(object: Object) -> Self {
        Value::Object(object)
    }
}

/// A nested mapping, tagged with its logical path once materialized.
///
/// Objects built by callers carry an empty path; the writer assigns the real
/// one. Objects returned by reads are snapshots: reading through their
/// [`Object::path`] again goes back to disk.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Object {
    path: Path,
    entries: BTreeMap<String, Value>,
}

impl Object {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty object at `path`.
    pub fn at(path: Path) -> Self {
        Object {
            path,
            entries: BTreeMap::new(),
        }
    }

    /// The logical path this object was read from or written to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.entries.iter()
    }

    /// Render the entries as a JSON object. The path is not included.
    pub fn to_json(&self) -> JsonValue {
        JsonValue::Object(
            self.entries
                .iter()
                .map(|(key, value)| (key.clone(), value.to_json()))
                .collect(),
        )
    }
}

impl FromIterator<(String, Value)> for Object {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Object {
            path: Path::default(),
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Object {
    type Item = (String, Value);
    type IntoIter = btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Object {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
