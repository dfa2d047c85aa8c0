// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Structured values walked by the scrubber

use serde::Serialize;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};

/// Generic object: string key to arbitrary value
pub type ObjectMap = BTreeMap<String, Value>;

/// Flat string-keyed mapping (tags)
pub type StringMap = HashMap<String, String>;

/// String-keyed mapping of string lists (HTTP headers)
pub type StringListMap = HashMap<String, Vec<String>>;

/// A dynamically-shaped value.
///
/// JSON decoding only ever produces the scalar variants plus `Object` and
/// `List`. The `StringMap`, `StringListMap` and `StringList` shapes come from
/// natively-typed callers and are preserved through a scrub.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    Object(ObjectMap),
    StringMap(StringMap),
    StringListMap(StringListMap),
    StringList(Vec<String>),
    List(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectMap> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Textual rendering used by value matchers, masks and map coercion.
    ///
    /// Strings render verbatim, `Null` as the empty string, other scalars as
    /// their JSON text and containers as compact JSON.
    pub fn render(&self) -> Cow<'_, str> {
        match self {
            Value::Null => Cow::Borrowed(""),
            Value::String(s) => Cow::Borrowed(s),
            Value::Bool(b) => Cow::Owned(b.to_string()),
            Value::Number(n) => Cow::Owned(n.to_string()),
            container => Cow::Owned(serde_json::to_string(container).unwrap_or_default()),
        }
    }

    /// Consume the value into its textual rendering
    pub fn into_rendered(self) -> String {
        match self {
            Value::String(s) => s,
            other => other.render().into_owned(),
        }
    }

    /// Coerce a replacement into the native element type of a string-list map.
    ///
    /// Lists pass through (generic elements are rendered). A scalar is
    /// repeated `desired_len` times, or wrapped in a singleton list when no
    /// prior length is known. `Null` becomes an empty list.
    pub fn into_string_list(self, desired_len: usize) -> Vec<String> {
        match self {
            Value::Null => Vec::new(),
            Value::StringList(items) => items,
            Value::List(items) => items.into_iter().map(Value::into_rendered).collect(),
            other => {
                let rendered = other.into_rendered();
                if desired_len == 0 {
                    vec![rendered]
                } else {
                    vec![rendered; desired_len]
                }
            }
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(value.into())
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::Number(value.into())
    }
}

impl From<f64> for Value {
    /// Non-finite floats have no JSON form and become `Null`
    fn from(value: f64) -> Self {
        serde_json::Number::from_f64(value).map_or(Value::Null, Value::Number)
    }
}

impl From<ObjectMap> for Value {
    fn from(value: ObjectMap) -> Self {
        Value::Object(value)
    }
}

impl From<StringMap> for Value {
    fn from(value: StringMap) -> Self {
        Value::StringMap(value)
    }
}

impl From<StringListMap> for Value {
    fn from(value: StringListMap) -> Self {
        Value::StringListMap(value)
    }
}

impl From<Vec<String>> for Value {
    fn from(value: Vec<String>) -> Self {
        Value::StringList(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(key, val)| (key, Value::from(val)))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Number(n) => serde_json::Value::Number(n),
            Value::String(s) => serde_json::Value::String(s),
            Value::Object(map) => serde_json::Value::Object(
                map.into_iter()
                    .map(|(key, val)| (key, serde_json::Value::from(val)))
                    .collect(),
            ),
            Value::StringMap(map) => serde_json::Value::Object(
                map.into_iter()
                    .map(|(key, val)| (key, serde_json::Value::String(val)))
                    .collect(),
            ),
            Value::StringListMap(map) => serde_json::Value::Object(
                map.into_iter()
                    .map(|(key, vals)| {
                        let items = vals.into_iter().map(serde_json::Value::String).collect();
                        (key, serde_json::Value::Array(items))
                    })
                    .collect(),
            ),
            Value::StringList(items) => {
                serde_json::Value::Array(items.into_iter().map(serde_json::Value::String).collect())
            }
            Value::List(items) => {
                serde_json::Value::Array(items.into_iter().map(serde_json::Value::from).collect())
            }
        }
    }
}
