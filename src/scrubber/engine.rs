// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Scrubber construction and shape-preserving traversal

use tracing::debug;

use super::error::{Result, ScrubError};
use super::matcher::FieldContext;
use super::rule::{apply_rules, Rule};
use super::value::{ObjectMap, StringListMap, StringMap, Value};

/// Replacement used by the built-in rule unless overridden
pub const DEFAULT_REPLACEMENT: &str = "[REDACTED]";

/// Construction options for a [`Scrubber`]
#[derive(Debug, Clone)]
pub struct ScrubberOptions {
    rules: Vec<Rule>,
    default_replacement: String,
    include_defaults: bool,
}

impl Default for ScrubberOptions {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            default_replacement: DEFAULT_REPLACEMENT.to_string(),
            include_defaults: true,
        }
    }
}

impl ScrubberOptions {
    /// Append caller rules; they run after the built-in rule
    pub fn with_rules(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.rules.extend(rules);
        self
    }

    pub fn without_default_rules(mut self) -> Self {
        self.include_defaults = false;
        self
    }

    /// Empty replacements are ignored
    pub fn with_default_replacement(mut self, replacement: impl Into<String>) -> Self {
        let replacement = replacement.into();
        if !replacement.is_empty() {
            self.default_replacement = replacement;
        }
        self
    }

    pub fn build(self) -> Scrubber {
        let mut rules = Vec::with_capacity(self.rules.len() + 1);
        if self.include_defaults {
            rules.push(Rule::default_sensitive(&self.default_replacement));
        }
        rules.extend(self.rules);

        debug!(
            rules = rules.len(),
            include_defaults = self.include_defaults,
            "scrubber constructed"
        );

        Scrubber {
            rules,
            default_replacement: self.default_replacement,
            include_defaults: self.include_defaults,
        }
    }
}

/// Ordered rule list plus the traversal over structured values.
///
/// Rules are fixed once the scrubber is shared: [`Scrubber::add_rules`]
/// takes `&mut self`, so a scrubber behind `&` or `Arc` is read-only and can
/// serve concurrent scrubs without locking.
///
/// # Example
/// ```
/// use scrubber_rust::scrubber::{Scrubber, Value};
/// use serde_json::json;
///
/// let scrubber = Scrubber::new();
/// let input = Value::from(json!({"password": "hunter2", "name": "john"}));
/// let output = scrubber.scrub(&input);
/// assert_eq!(
///     serde_json::Value::from(output),
///     json!({"password": "[REDACTED]", "name": "john"})
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Scrubber {
    rules: Vec<Rule>,
    default_replacement: String,
    include_defaults: bool,
}

impl Default for Scrubber {
    fn default() -> Self {
        Self::new()
    }
}

impl Scrubber {
    /// Scrubber with only the built-in sensitive-key rule
    pub fn new() -> Self {
        ScrubberOptions::default().build()
    }

    pub fn builder() -> ScrubberOptions {
        ScrubberOptions::default()
    }

    /// Append rules after construction
    pub fn add_rules(&mut self, rules: impl IntoIterator<Item = Rule>) {
        let before = self.rules.len();
        self.rules.extend(rules);
        if self.rules.len() > before {
            debug!(added = self.rules.len() - before, total = self.rules.len(), "rules added");
        }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn default_replacement(&self) -> &str {
        &self.default_replacement
    }

    pub fn includes_defaults(&self) -> bool {
        self.include_defaults
    }

    /// Scrub any value, returning a new value of the same shape
    pub fn scrub(&self, value: &Value) -> Value {
        let mut path = Vec::new();
        self.scrub_value(value, &mut path)
    }

    /// Scrub a generic object
    pub fn scrub_object(&self, data: &ObjectMap) -> ObjectMap {
        let mut path = Vec::new();
        self.scrub_object_fields(data, &mut path)
    }

    /// Decode, scrub and re-encode a JSON document.
    ///
    /// Empty or whitespace-only input is returned verbatim.
    pub fn scrub_json(&self, data: &[u8]) -> Result<Vec<u8>> {
        let trimmed = data.trim_ascii();
        if trimmed.is_empty() {
            return Ok(data.to_vec());
        }

        let payload: serde_json::Value =
            serde_json::from_slice(trimmed).map_err(ScrubError::Decode)?;
        let scrubbed = self.scrub(&Value::from(payload));
        serde_json::to_vec(&scrubbed).map_err(ScrubError::Encode)
    }

    /// Scrub flat string tags, rendering every result back to text
    pub fn scrub_string_map(&self, data: &StringMap) -> StringMap {
        if data.is_empty() {
            return StringMap::new();
        }

        let generic: ObjectMap = data
            .iter()
            .map(|(key, val)| (key.clone(), Value::from(val.as_str())))
            .collect();

        self.scrub_object(&generic)
            .into_iter()
            .map(|(key, val)| (key, val.into_rendered()))
            .collect()
    }

    fn field_rules(&self, path: &[String], value: &Value) -> Option<Value> {
        let key = path.last().map_or("", String::as_str);
        apply_rules(&self.rules, &FieldContext::new(path, key, value))
    }

    /// A matched field is terminal; otherwise descend into it
    fn scrub_field(&self, value: &Value, path: &mut Vec<String>) -> Value {
        match self.field_rules(path, value) {
            Some(replaced) => replaced,
            None => self.scrub_value(value, path),
        }
    }

    fn scrub_value(&self, value: &Value, path: &mut Vec<String>) -> Value {
        match value {
            Value::Object(map) => Value::Object(self.scrub_object_fields(map, path)),
            Value::StringMap(map) => Value::StringMap(self.scrub_string_fields(map, path)),
            Value::StringListMap(map) => Value::StringListMap(self.scrub_list_fields(map, path)),
            Value::StringList(items) => Value::StringList(self.scrub_strings(items, path)),
            Value::List(items) => {
                let mut out = Vec::with_capacity(items.len());
                for (idx, item) in items.iter().enumerate() {
                    path.push(index_segment(idx));
                    out.push(self.scrub_field(item, path));
                    path.pop();
                }
                Value::List(out)
            }
            leaf => leaf.clone(),
        }
    }

    fn scrub_object_fields(&self, map: &ObjectMap, path: &mut Vec<String>) -> ObjectMap {
        let mut out = ObjectMap::new();
        for (key, child) in map {
            path.push(key.clone());
            out.insert(key.clone(), self.scrub_field(child, path));
            path.pop();
        }
        out
    }

    fn scrub_string_fields(&self, map: &StringMap, path: &mut Vec<String>) -> StringMap {
        let mut out = StringMap::with_capacity(map.len());
        for (key, child) in map {
            path.push(key.clone());
            let scrubbed = match self.field_rules(path, &Value::from(child.as_str())) {
                Some(replaced) => replaced.into_rendered(),
                None => child.clone(),
            };
            path.pop();
            out.insert(key.clone(), scrubbed);
        }
        out
    }

    fn scrub_list_fields(&self, map: &StringListMap, path: &mut Vec<String>) -> StringListMap {
        let mut out = StringListMap::with_capacity(map.len());
        for (key, items) in map {
            path.push(key.clone());
            let scrubbed = match self.field_rules(path, &Value::StringList(items.clone())) {
                Some(replaced) => replaced.into_string_list(items.len()),
                None => self.scrub_strings(items, path),
            };
            path.pop();
            out.insert(key.clone(), scrubbed);
        }
        out
    }

    /// Per-element rules with a synthetic `[i]` key; strings have no children
    fn scrub_strings(&self, items: &[String], path: &mut Vec<String>) -> Vec<String> {
        let mut out = Vec::with_capacity(items.len());
        for (idx, item) in items.iter().enumerate() {
            path.push(index_segment(idx));
            let scrubbed = match self.field_rules(path, &Value::from(item.as_str())) {
                Some(replaced) => replaced.into_rendered(),
                None => item.clone(),
            };
            path.pop();
            out.push(scrubbed);
        }
        out
    }
}

fn index_segment(idx: usize) -> String {
    format!("[{idx}]")
}

/// Entry points over an optional scrubber.
///
/// `None` passes values through unchanged, still handing back fresh copies.
pub trait MaybeScrubber {
    fn scrub(&self, value: &Value) -> Value;
    fn scrub_object(&self, data: &ObjectMap) -> ObjectMap;
    fn scrub_json(&self, data: &[u8]) -> Result<Vec<u8>>;
    fn scrub_string_map(&self, data: &StringMap) -> StringMap;
}

impl MaybeScrubber for Option<&Scrubber> {
    fn scrub(&self, value: &Value) -> Value {
        match self {
            Some(scrubber) => scrubber.scrub(value),
            None => value.clone(),
        }
    }

    fn scrub_object(&self, data: &ObjectMap) -> ObjectMap {
        match self {
            Some(scrubber) => scrubber.scrub_object(data),
            None => data.clone(),
        }
    }

    fn scrub_json(&self, data: &[u8]) -> Result<Vec<u8>> {
        match self {
            Some(scrubber) => scrubber.scrub_json(data),
            None => Ok(data.to_vec()),
        }
    }

    fn scrub_string_map(&self, data: &StringMap) -> StringMap {
        match self {
            Some(scrubber) => scrubber.scrub_string_map(data),
            None => data.clone(),
        }
    }
}
