use std::fmt;

use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Reserved key carrying the capture timestamp on raw records.
pub const CAPTURE_TIMESTAMP_KEY: &str = "_captureTimestamp";

/// Key under which non-object records are wrapped at ingestion, mirroring
/// the capture script's contract.
pub const NON_OBJECT_DATA_KEY: &str = "nonObjectData";

/// A single datalayer field value.
///
/// Nested objects and arrays are collapsed to their compact JSON text at
/// ingestion so every value fits this union and comparisons stay total.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    Str(String),
}

impl FieldValue {
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Bool(*b),
            Value::Number(n) => FieldValue::Number(n.clone()),
            Value::String(s) => FieldValue::Str(s.clone()),
            other => FieldValue::Str(other.to_string()),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Null => Value::Null,
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Number(n) => Value::Number(n.clone()),
            FieldValue::Str(s) => Value::String(s.clone()),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// A reference value is dynamic when only its presence is checked:
    /// `null`, or a string carrying a `{...}`/`{{...}}` placeholder.
    pub fn is_dynamic(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Str(s) => s.contains('{') && s.contains('}'),
            _ => false,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => write!(f, "null"),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Str(s) => write!(f, "{}", s),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// An insertion-ordered `field -> value` map.
///
/// Both reference definitions and captured events preserve the key order of
/// the source document; lookups are linear, which is fine at datalayer sizes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventMap {
    entries: Vec<(String, FieldValue)>,
}

impl EventMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Inserts at the end, replacing in place if the key already exists.
    pub fn insert(&mut self, key: impl Into<String>, value: FieldValue) {
        let key = key.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<FieldValue> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Deterministic sorted-key JSON text, used for deduplication and for
    /// the unmatched-event content hash.
    pub fn canonical_json(&self) -> String {
        let mut value = serde_json::Map::new();
        for (k, v) in &self.entries {
            value.insert(k.clone(), v.to_json());
        }
        Value::Object(value).to_string()
    }
}

impl FromIterator<(String, FieldValue)> for EventMap {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        let mut map = EventMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl Serialize for EventMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for EventMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EventMapVisitor;

        impl<'de> Visitor<'de> for EventMapVisitor {
            type Value = EventMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object of datalayer fields")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut map = EventMap::new();
                while let Some((key, value)) = access.next_entry::<String, Value>()? {
                    map.insert(key, FieldValue::from_json(&value));
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(EventMapVisitor)
    }
}

/// One element of a raw input array: either a field-map or some other
/// JSON value that the capture pipeline let through.
#[derive(Debug, Clone, PartialEq)]
pub enum RawRecord {
    Map(EventMap),
    Other(Value),
}

impl RawRecord {
    pub fn as_map(&self) -> Option<&EventMap> {
        match self {
            RawRecord::Map(map) => Some(map),
            RawRecord::Other(_) => None,
        }
    }
}

impl<'de> Deserialize<'de> for RawRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RawRecordVisitor;

        impl<'de> Visitor<'de> for RawRecordVisitor {
            type Value = RawRecord;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a datalayer record")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut map = EventMap::new();
                while let Some((key, value)) = access.next_entry::<String, Value>()? {
                    map.insert(key, FieldValue::from_json(&value));
                }
                Ok(RawRecord::Map(map))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut items = Vec::new();
                while let Some(value) = access.next_element::<Value>()? {
                    items.push(value);
                }
                Ok(RawRecord::Other(Value::Array(items)))
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E> {
                Ok(RawRecord::Other(Value::Null))
            }

            fn visit_bool<E>(self, v: bool) -> Result<Self::Value, E> {
                Ok(RawRecord::Other(Value::Bool(v)))
            }

            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E> {
                Ok(RawRecord::Other(Value::from(v)))
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
                Ok(RawRecord::Other(Value::from(v)))
            }

            fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E> {
                Ok(RawRecord::Other(
                    serde_json::Number::from_f64(v)
                        .map(Value::Number)
                        .unwrap_or(Value::Null),
                ))
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E> {
                Ok(RawRecord::Other(Value::String(v.to_string())))
            }

            fn visit_string<E>(self, v: String) -> Result<Self::Value, E> {
                Ok(RawRecord::Other(Value::String(v)))
            }
        }

        deserializer.deserialize_any(RawRecordVisitor)
    }
}

/// Parse a raw input file body (a JSON array) into records, preserving
/// per-record field order.
pub fn parse_records(json: &str) -> serde_json::Result<Vec<RawRecord>> {
    serde_json::from_str(json)
}

/// One captured datalayer push.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturedEvent {
    /// Stable ingestion index; correlates an event across pipeline stages.
    pub ordinal: usize,
    /// Capture timestamp in milliseconds, when the record carried one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp_ms: Option<u64>,
    pub fields: EventMap,
}

/// Turn raw records into captured events: assign ordinals, strip the
/// reserved timestamp key, and wrap non-object records the way the capture
/// script does.
pub fn ingest_events(records: Vec<RawRecord>) -> Vec<CapturedEvent> {
    records
        .into_iter()
        .enumerate()
        .map(|(ordinal, record)| {
            let mut fields = match record {
                RawRecord::Map(map) => map,
                RawRecord::Other(value) => {
                    let mut map = EventMap::new();
                    map.insert(NON_OBJECT_DATA_KEY, FieldValue::from_json(&value));
                    map
                }
            };
            let timestamp_ms = fields
                .remove(CAPTURE_TIMESTAMP_KEY)
                .and_then(|v| match v {
                    FieldValue::Number(n) => {
                        n.as_u64().or_else(|| n.as_f64().map(|f| f.max(0.0) as u64))
                    }
                    _ => None,
                });
            CapturedEvent {
                ordinal,
                timestamp_ms,
                fields,
            }
        })
        .collect()
}
