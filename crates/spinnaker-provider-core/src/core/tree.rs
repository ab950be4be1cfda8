// crates/spinnaker-provider-core/src/core/tree.rs
// ============================================================================
// Module: Configuration Tree
// Description: Recursive, dynamically-typed document model for Gate payloads.
// Purpose: Replace untyped JSON maps with an exhaustive sum type.
// Dependencies: indexmap, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! [`ConfigTree`] is the interchange format for every configuration document
//! exchanged with the remote service. Maps preserve insertion order so that a
//! document re-serializes the way it was authored, while equality ignores
//! map order. Trees are immutable values: transformations such as
//! [`ConfigTree::without_keys`] return a new tree.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use indexmap::IndexMap;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use serde::de::MapAccess;
use serde::de::SeqAccess;
use serde::de::Visitor;
use serde::ser::SerializeMap;
use serde::ser::SerializeSeq;
use serde_json::Number;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Kinds
// ============================================================================

/// Node kind of a [`ConfigTree`], used in validation and drift diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    /// Explicit null.
    Null,
    /// Boolean scalar.
    Bool,
    /// Numeric scalar.
    Number,
    /// String scalar.
    String,
    /// Ordered list.
    List,
    /// Keyed map.
    Map,
    /// Key absent from its parent map.
    Missing,
}

impl Kind {
    /// Returns the stable lowercase label for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Number => "number",
            Self::String => "string",
            Self::List => "list",
            Self::Map => "map",
            Self::Missing => "missing",
        }
    }

    /// Returns the kind of an optional node, mapping `None` to [`Kind::Missing`].
    #[must_use]
    pub fn of(node: Option<&ConfigTree>) -> Self {
        node.map_or(Self::Missing, ConfigTree::kind)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Config Tree
// ============================================================================

/// Dynamically-typed configuration document.
///
/// # Invariants
/// - Map keys are unique; insertion order is preserved for serialization.
/// - Equality ignores map insertion order.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ConfigTree {
    /// JSON null.
    #[default]
    Null,
    /// JSON boolean.
    Bool(bool),
    /// JSON number, kept exact (integers and floats are distinct).
    Number(Number),
    /// JSON string.
    String(String),
    /// JSON array.
    List(Vec<ConfigTree>),
    /// JSON object.
    Map(IndexMap<String, ConfigTree>),
}

impl ConfigTree {
    /// Builds a map node from key/value pairs, keeping their order.
    #[must_use]
    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Self)>,
    {
        Self::Map(entries.into_iter().map(|(key, value)| (key.into(), value)).collect())
    }

    /// Builds a list node from items.
    #[must_use]
    pub fn list<I>(items: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        Self::List(items.into_iter().collect())
    }

    /// Parses a tree from JSON text, preserving object key order.
    ///
    /// # Errors
    ///
    /// Returns [`serde_json::Error`] when the text is not valid JSON.
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Parses a tree from JSON bytes, preserving object key order.
    ///
    /// # Errors
    ///
    /// Returns [`serde_json::Error`] when the bytes are not valid JSON.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Serializes the tree as compact JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`serde_json::Error`] when serialization fails.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Returns the node kind.
    #[must_use]
    pub const fn kind(&self) -> Kind {
        match self {
            Self::Null => Kind::Null,
            Self::Bool(_) => Kind::Bool,
            Self::Number(_) => Kind::Number,
            Self::String(_) => Kind::String,
            Self::List(_) => Kind::List,
            Self::Map(_) => Kind::Map,
        }
    }

    /// Returns true for boolean, number, and string nodes.
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        matches!(self, Self::Bool(_) | Self::Number(_) | Self::String(_))
    }

    /// Returns true when the node carries no usable value.
    ///
    /// Null, `false`, zero, the empty string, and the empty map are missing.
    /// The empty list is present: a declared collection with no elements is
    /// a valid value.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Bool(value) => !value,
            Self::Number(number) => is_zero(number),
            Self::String(value) => value.is_empty(),
            Self::List(_) => false,
            Self::Map(entries) => entries.is_empty(),
        }
    }

    /// Returns the value stored under `key` when the node is a map.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Self> {
        match self {
            Self::Map(entries) => entries.get(key),
            _ => None,
        }
    }

    /// Returns the string slice when the node is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the entries when the node is a map.
    #[must_use]
    pub const fn as_map(&self) -> Option<&IndexMap<String, Self>> {
        match self {
            Self::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Returns the items when the node is a list.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the string stored under `key`, if any.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Self::as_str)
    }

    /// Returns a copy of the tree with the given top-level keys removed.
    ///
    /// Non-map trees are returned unchanged.
    #[must_use]
    pub fn without_keys(&self, keys: &[&str]) -> Self {
        match self {
            Self::Map(entries) => Self::Map(
                entries
                    .iter()
                    .filter(|(key, _)| !keys.contains(&key.as_str()))
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect(),
            ),
            other => other.clone(),
        }
    }

    /// Returns a copy of the tree with `key` set to `value`.
    ///
    /// Existing keys keep their position; new keys are appended. Non-map
    /// trees are replaced by a single-entry map.
    #[must_use]
    pub fn with_entry(&self, key: impl Into<String>, value: Self) -> Self {
        let mut entries = match self {
            Self::Map(entries) => entries.clone(),
            _ => IndexMap::new(),
        };
        entries.insert(key.into(), value);
        Self::Map(entries)
    }
}

/// Returns true when the number is zero (integer or float).
#[allow(clippy::float_cmp, reason = "Zero detection compares against an exact literal.")]
fn is_zero(number: &Number) -> bool {
    if let Some(value) = number.as_u64() {
        return value == 0;
    }
    if let Some(value) = number.as_i64() {
        return value == 0;
    }
    number.as_f64().is_some_and(|value| value == 0.0)
}

impl fmt::Display for ConfigTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

// ============================================================================
// SECTION: Drift
// ============================================================================

/// First divergence found between a desired and an observed tree.
///
/// An absent observed key is reported with [`Kind::Missing`] and a null
/// observed value.
#[derive(Debug, Clone, PartialEq, Error)]
#[error(
    "configuration drift: {path_desired} ({kind_desired}) = {value_desired} but {path_observed} \
     ({kind_observed}) = {value_observed}"
)]
pub struct DriftError {
    /// Path in the desired tree.
    pub path_desired: String,
    /// Path in the observed tree.
    pub path_observed: String,
    /// Desired value at the divergence.
    pub value_desired: Box<ConfigTree>,
    /// Observed value at the divergence.
    pub value_observed: Box<ConfigTree>,
    /// Kind of the desired value.
    pub kind_desired: Kind,
    /// Kind of the observed value.
    pub kind_observed: Kind,
}

impl DriftError {
    /// Builds a drift record from the two diverging nodes.
    #[must_use]
    pub fn between(
        path_desired: &str,
        path_observed: &str,
        desired: &ConfigTree,
        observed: Option<&ConfigTree>,
    ) -> Self {
        Self {
            path_desired: path_desired.to_string(),
            path_observed: path_observed.to_string(),
            value_desired: Box::new(desired.clone()),
            value_observed: Box::new(observed.cloned().unwrap_or_default()),
            kind_desired: desired.kind(),
            kind_observed: Kind::of(observed),
        }
    }
}

// ============================================================================
// SECTION: Path Helpers
// ============================================================================

/// Appends a map key to a dotted path (`parent.key`).
#[must_use]
pub fn field_path(parent: &str, key: &str) -> String {
    if parent.is_empty() { key.to_string() } else { format!("{parent}.{key}") }
}

/// Appends a list index to a path (`parent[index]`).
#[must_use]
pub fn index_path(parent: &str, index: usize) -> String {
    format!("{parent}[{index}]")
}

// ============================================================================
// SECTION: Conversions
// ============================================================================

impl From<Value> for ConfigTree {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(value) => Self::Bool(value),
            Value::Number(number) => Self::Number(number),
            Value::String(value) => Self::String(value),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Value::Object(entries) => {
                Self::Map(entries.into_iter().map(|(key, value)| (key, Self::from(value))).collect())
            }
        }
    }
}

impl From<ConfigTree> for Value {
    fn from(tree: ConfigTree) -> Self {
        match tree {
            ConfigTree::Null => Self::Null,
            ConfigTree::Bool(value) => Self::Bool(value),
            ConfigTree::Number(number) => Self::Number(number),
            ConfigTree::String(value) => Self::String(value),
            ConfigTree::List(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            ConfigTree::Map(entries) => {
                Self::Object(entries.into_iter().map(|(key, value)| (key, Self::from(value))).collect())
            }
        }
    }
}

impl From<&str> for ConfigTree {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ConfigTree {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for ConfigTree {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ConfigTree {
    fn from(value: i64) -> Self {
        Self::Number(Number::from(value))
    }
}

impl From<u64> for ConfigTree {
    fn from(value: u64) -> Self {
        Self::Number(Number::from(value))
    }
}

impl<T: Into<Self>> From<Vec<T>> for ConfigTree {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

// ============================================================================
// SECTION: Serde
// ============================================================================

impl Serialize for ConfigTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(value) => serializer.serialize_bool(*value),
            Self::Number(number) => number.serialize(serializer),
            Self::String(value) => serializer.serialize_str(value),
            Self::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for ConfigTree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ConfigTreeVisitor)
    }
}

/// Serde visitor building trees while keeping object key order.
struct ConfigTreeVisitor;

impl<'de> Visitor<'de> for ConfigTreeVisitor {
    type Value = ConfigTree;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a JSON value")
    }

    fn visit_unit<E>(self) -> Result<Self::Value, E> {
        Ok(ConfigTree::Null)
    }

    fn visit_none<E>(self) -> Result<Self::Value, E> {
        Ok(ConfigTree::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        ConfigTree::deserialize(deserializer)
    }

    fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E> {
        Ok(ConfigTree::Bool(value))
    }

    fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E> {
        Ok(ConfigTree::Number(Number::from(value)))
    }

    fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E> {
        Ok(ConfigTree::Number(Number::from(value)))
    }

    fn visit_f64<E: serde::de::Error>(self, value: f64) -> Result<Self::Value, E> {
        Number::from_f64(value)
            .map(ConfigTree::Number)
            .ok_or_else(|| E::custom("non-finite numbers are not representable"))
    }

    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E> {
        Ok(ConfigTree::String(value.to_string()))
    }

    fn visit_string<E>(self, value: String) -> Result<Self::Value, E> {
        Ok(ConfigTree::String(value))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(ConfigTree::List(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut entries = IndexMap::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((key, value)) = access.next_entry::<String, ConfigTree>()? {
            entries.insert(key, value);
        }
        Ok(ConfigTree::Map(entries))
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions are permitted.")]

    use super::*;

    #[test]
    fn parse_preserves_key_order() {
        let tree = ConfigTree::from_json_str(r#"{"zeta":1,"alpha":{"b":true,"a":null}}"#).unwrap();
        assert_eq!(tree.to_json_string().unwrap(), r#"{"zeta":1,"alpha":{"b":true,"a":null}}"#);
    }

    #[test]
    fn equality_ignores_map_order() {
        let left = ConfigTree::from_json_str(r#"{"a":1,"b":2}"#).unwrap();
        let right = ConfigTree::from_json_str(r#"{"b":2,"a":1}"#).unwrap();
        assert_eq!(left, right);
    }

    #[test]
    fn integers_and_floats_stay_distinct() {
        let int = ConfigTree::from_json_str("1").unwrap();
        let float = ConfigTree::from_json_str("1.0").unwrap();
        assert_ne!(int, float);
    }

    #[test]
    fn missing_values() {
        assert!(ConfigTree::Null.is_missing());
        assert!(ConfigTree::from("").is_missing());
        assert!(ConfigTree::from(0_i64).is_missing());
        assert!(ConfigTree::from_json_str("0.0").unwrap().is_missing());
        assert!(ConfigTree::Bool(false).is_missing());
        assert!(ConfigTree::Map(IndexMap::new()).is_missing());
        assert!(!ConfigTree::List(Vec::new()).is_missing());
        assert!(!ConfigTree::from("x").is_missing());
    }

    #[test]
    fn without_keys_leaves_input_untouched() {
        let tree = ConfigTree::from_json_str(r#"{"id":"t","updateTs":"1","keep":2}"#).unwrap();
        let stripped = tree.without_keys(&["updateTs"]);
        assert!(stripped.get("updateTs").is_none());
        assert!(tree.get("updateTs").is_some());
        assert_eq!(stripped.to_json_string().unwrap(), r#"{"id":"t","keep":2}"#);
    }

    #[test]
    fn paths_render_dotted_and_bracketed() {
        let path = index_path(&field_path("pipeline", "stages"), 2);
        assert_eq!(field_path(&path, "name"), "pipeline.stages[2].name");
        assert_eq!(field_path("", "root"), "root");
    }
}
