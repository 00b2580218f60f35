// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Loosely-typed parameter bags
//!
//! A [`ParameterBag`] is what a caller hands to one operation call. Keys are
//! kept ordered so that every stage downstream is deterministic.

use std::collections::{BTreeMap, btree_map};

use serde_json::{Map, Number, Value};

use crate::source::StreamHandle;

/// A single parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Explicit null
    Null,
    /// Boolean flag
    Bool(bool),
    /// Numeric value
    Number(Number),
    /// Text value
    String(String),
    /// Ordered list of values
    List(Vec<ParamValue>),
    /// Nested bag
    Bag(ParameterBag),
    /// Readable byte stream
    Stream(StreamHandle),
}

impl ParamValue {
    /// Whether the value counts as supplied
    ///
    /// `Null`, the empty string, `false` and zero count as absent. Streams,
    /// lists and nested bags always count as present.
    pub fn is_present(&self) -> bool {
        match self {
            ParamValue::Null => false,
            ParamValue::Bool(flag) => *flag,
            ParamValue::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
            ParamValue::String(text) => !text.is_empty(),
            ParamValue::List(_) | ParamValue::Bag(_) | ParamValue::Stream(_) => true,
        }
    }

    /// Borrow the value as text
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::String(text) => Some(text),
            _ => None,
        }
    }

    /// Borrow the value as a stream handle
    pub fn as_stream(&self) -> Option<&StreamHandle> {
        match self {
            ParamValue::Stream(handle) => Some(handle),
            _ => None,
        }
    }

    /// Render a scalar value as text, e.g. for a URL path segment
    pub fn to_text(&self) -> Option<String> {
        match self {
            ParamValue::String(text) => Some(text.clone()),
            ParamValue::Number(number) => Some(number.to_string()),
            ParamValue::Bool(flag) => Some(flag.to_string()),
            _ => None,
        }
    }

    /// Convert to JSON, or `None` if a stream is reachable from this value
    pub fn to_json(&self) -> Option<Value> {
        Some(match self {
            ParamValue::Null => Value::Null,
            ParamValue::Bool(flag) => Value::Bool(*flag),
            ParamValue::Number(number) => Value::Number(number.clone()),
            ParamValue::String(text) => Value::String(text.clone()),
            ParamValue::List(items) => Value::Array(
                items
                    .iter()
                    .map(ParamValue::to_json)
                    .collect::<Option<Vec<_>>>()?,
            ),
            ParamValue::Bag(bag) => Value::Object(bag.to_json_map()?),
            ParamValue::Stream(_) => return None,
        })
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::String(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::String(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Number(value.into())
    }
}

impl From<u64> for ParamValue {
    fn from(value: u64) -> Self {
        ParamValue::Number(value.into())
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Number::from_f64(value).map_or(ParamValue::Null, ParamValue::Number)
    }
}

impl From<StreamHandle> for ParamValue {
    fn from(value: StreamHandle) -> Self {
        ParamValue::Stream(value)
    }
}

impl From<ParameterBag> for ParamValue {
    fn from(value: ParameterBag) -> Self {
        ParamValue::Bag(value)
    }
}

impl<T: Into<ParamValue>> From<Vec<T>> for ParamValue {
    fn from(values: Vec<T>) -> Self {
        ParamValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl From<Value> for ParamValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => ParamValue::Null,
            Value::Bool(flag) => ParamValue::Bool(flag),
            Value::Number(number) => ParamValue::Number(number),
            Value::String(text) => ParamValue::String(text),
            Value::Array(items) => ParamValue::List(items.into_iter().map(Into::into).collect()),
            Value::Object(map) => ParamValue::Bag(map.into_iter().collect()),
        }
    }
}

/// Named parameters for one operation call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterBag(BTreeMap<String, ParamValue>);

impl ParameterBag {
    /// Create an empty bag
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a value, returning the previous one for the key
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ParamValue>,
    ) -> Option<ParamValue> {
        self.0.insert(key.into(), value.into())
    }

    /// Look up a value
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    /// Whether the key exists, whatever its value
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Whether the key exists with a present value, see [`ParamValue::is_present`]
    pub fn is_present(&self, key: &str) -> bool {
        self.get(key).is_some_and(ParamValue::is_present)
    }

    /// Iterate over entries in key order
    pub fn iter(&self) -> btree_map::Iter<'_, String, ParamValue> {
        self.0.iter()
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the bag has no keys
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Shallow merge: entries of `overrides` replace entries of `self`
    #[must_use]
    pub fn overlaid_with(&self, overrides: &ParameterBag) -> ParameterBag {
        let mut merged = self.clone();
        merged
            .0
            .extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged
    }

    fn to_json_map(&self) -> Option<Map<String, Value>> {
        self.iter()
            .map(|(key, value)| value.to_json().map(|json| (key.clone(), json)))
            .collect()
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for ParameterBag {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a ParameterBag {
    type Item = (&'a String, &'a ParamValue);
    type IntoIter = btree_map::Iter<'a, String, ParamValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
