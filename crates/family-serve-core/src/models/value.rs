// ABOUTME: ToolValue sum type for heterogeneous nested tool payloads
// ABOUTME: Null, bool, number, string, date, list and map with JSON conversions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Family Serve

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Number, Value};
use std::collections::BTreeMap;

/// A value flowing across the tool boundary.
///
/// Request arguments and responses are arbitrary nested data whose shape is only
/// partially known. Every transform over them (sanitize, flatten, mask) is a total
/// match over these variants.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ToolValue {
    /// Absent or JSON `null`
    #[default]
    Null,
    /// Boolean scalar
    Bool(bool),
    /// Numeric scalar
    Number(Number),
    /// Text scalar
    String(String),
    /// Timestamp, serialized as ISO-8601 with milliseconds
    Date(DateTime<Utc>),
    /// Ordered list
    List(Vec<ToolValue>),
    /// Mapping with deterministic key order
    Map(BTreeMap<String, ToolValue>),
}

impl ToolValue {
    /// Convert any serializable value
    ///
    /// # Errors
    ///
    /// Returns the serialization error if the value cannot be represented as JSON
    pub fn from_serializable<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(value).map(Self::from)
    }

    /// Type name used in contract-violation messages
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Date(_) => "date",
            Self::List(_) => "array",
            Self::Map(_) => "object",
        }
    }

    /// Borrow the string payload
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(text) => Some(text),
            _ => None,
        }
    }

    /// Borrow the boolean payload
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(flag) => Some(*flag),
            _ => None,
        }
    }

    /// Non-negative integer payload
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Number(number) => number.as_u64(),
            _ => None,
        }
    }

    /// Look up a key of a map value
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Self> {
        match self {
            Self::Map(entries) => entries.get(key),
            _ => None,
        }
    }

    /// Whether the value is `Null`
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// ISO-8601 rendering used for dates (`2024-01-01T00:00:00.000Z`)
    #[must_use]
    pub fn date_to_iso(date: &DateTime<Utc>) -> String {
        date.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

impl From<Value> for ToolValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(flag) => Self::Bool(flag),
            Value::Number(number) => Self::Number(number),
            Value::String(text) => Self::String(text),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Value::Object(entries) => Self::Map(
                entries
                    .into_iter()
                    .map(|(key, nested)| (key, Self::from(nested)))
                    .collect(),
            ),
        }
    }
}

impl From<ToolValue> for Value {
    fn from(value: ToolValue) -> Self {
        match value {
            ToolValue::Null => Self::Null,
            ToolValue::Bool(flag) => Self::Bool(flag),
            ToolValue::Number(number) => Self::Number(number),
            ToolValue::String(text) => Self::String(text),
            ToolValue::Date(date) => Self::String(ToolValue::date_to_iso(&date)),
            ToolValue::List(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            ToolValue::Map(entries) => Self::Object(
                entries
                    .into_iter()
                    .map(|(key, nested)| (key, Self::from(nested)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for ToolValue {
    fn from(text: &str) -> Self {
        Self::String(text.to_owned())
    }
}

impl From<String> for ToolValue {
    fn from(text: String) -> Self {
        Self::String(text)
    }
}

impl From<DateTime<Utc>> for ToolValue {
    fn from(date: DateTime<Utc>) -> Self {
        Self::Date(date)
    }
}

impl Serialize for ToolValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(flag) => serializer.serialize_bool(*flag),
            Self::Number(number) => number.serialize(serializer),
            Self::String(text) => serializer.serialize_str(text),
            Self::Date(date) => serializer.serialize_str(&Self::date_to_iso(date)),
            Self::List(items) => items.serialize(serializer),
            Self::Map(entries) => entries.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for ToolValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_json_conversion_keeps_structure() {
        let value = ToolValue::from(json!({"a": [1, "two", null], "b": {"c": true}}));
        assert_eq!(
            Value::from(value),
            json!({"a": [1, "two", null], "b": {"c": true}})
        );
    }

    #[test]
    fn test_date_serializes_as_iso_millis() {
        let date = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        let rendered = serde_json::to_string(&ToolValue::Date(date)).unwrap();
        assert_eq!(rendered, "\"2024-03-01T12:30:00.000Z\"");
    }

    #[test]
    fn test_type_names() {
        assert_eq!(ToolValue::from(json!(3)).type_name(), "number");
        assert_eq!(ToolValue::from(json!({})).type_name(), "object");
        assert_eq!(ToolValue::from(json!([])).type_name(), "array");
        assert_eq!(ToolValue::Null.type_name(), "null");
    }
}
