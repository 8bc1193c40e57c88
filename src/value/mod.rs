//! Native values accepted by the encoder and produced by the decoder.
//!
//! Values carry no schema information. The encoder reads their shape
//! through the predicates in [`coerce`]; the decoder builds them from the
//! schema it is given.

pub mod coerce;

use std::collections::{BTreeMap, VecDeque};

use base64::Engine;
use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};
use serde_json::json;
use uuid::Uuid;

/// A native value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent / null sentinel
    Null,
    /// Boolean value
    Boolean(bool),
    /// 32-bit signed integer
    Int(i32),
    /// 64-bit signed integer
    Long(i64),
    /// 32-bit floating point
    Float(f32),
    /// 64-bit floating point
    Double(f64),
    /// Byte array
    Bytes(Vec<u8>),
    /// UTF-8 string
    String(String),
    /// Fixed-size byte array
    Fixed(Vec<u8>),
    /// Enum symbol
    Enum(String),
    /// Ordered sequence of values
    Array(Vec<Value>),
    /// Map with string keys
    Map(BTreeMap<String, Value>),
    /// Record keyed by field name
    Record(BTreeMap<String, Value>),

    // Logical type natives
    /// Exact fixed-point decimal
    Decimal(BigDecimal),
    /// UUID
    Uuid(Uuid),
    /// Calendar date
    Date(NaiveDate),
    /// Time of day
    Time(NaiveTime),
    /// Zone-aware instant
    Timestamp(DateTime<Utc>),
    /// Timestamp without zone; treated as UTC when encoded as an instant
    LocalTimestamp(NaiveDateTime),
}

impl Value {
    /// Build an array from any ordered collection.
    ///
    /// # Example
    /// ```
    /// use std::collections::VecDeque;
    /// use glider::Value;
    ///
    /// let from_vec = Value::array(vec![1, 2, 3]);
    /// let from_deque = Value::array(VecDeque::from([1, 2, 3]));
    /// assert_eq!(from_vec, from_deque);
    /// ```
    pub fn array<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Value::Array(items.into_iter().map(Into::into).collect())
    }

    /// Build a record from `(field, value)` pairs.
    pub fn record<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Value::Record(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Build a map from `(key, value)` pairs.
    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Short name of the value's shape, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Int(_) => "int",
            Value::Long(_) => "long",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::Bytes(_) => "bytes",
            Value::String(_) => "string",
            Value::Fixed(_) => "fixed",
            Value::Enum(_) => "enum",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
            Value::Record(_) => "record",
            Value::Decimal(_) => "decimal",
            Value::Uuid(_) => "uuid",
            Value::Date(_) => "date",
            Value::Time(_) => "time",
            Value::Timestamp(_) => "timestamp",
            Value::LocalTimestamp(_) => "local-timestamp",
        }
    }

    /// The instant this value denotes, reading a zone-less timestamp as UTC.
    pub fn as_utc_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Timestamp(ts) => Some(*ts),
            Value::LocalTimestamp(naive) => Some(naive.and_utc()),
            _ => None,
        }
    }

    /// Convert the value to a serde_json::Value for diagnostics.
    ///
    /// Bytes and fixed values are rendered as base64, decimals as exact
    /// text, temporal values in ISO 8601 form.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::{Map, Value as Json};

        match self {
            Value::Null => Json::Null,
            Value::Boolean(b) => Json::Bool(*b),
            Value::Int(i) => json!(i),
            Value::Long(l) => json!(l),
            Value::Float(f) => serde_json::Number::from_f64(*f as f64)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            Value::Double(d) => serde_json::Number::from_f64(*d)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            Value::Bytes(b) | Value::Fixed(b) => {
                Json::String(base64::engine::general_purpose::STANDARD.encode(b))
            }
            Value::String(s) | Value::Enum(s) => Json::String(s.clone()),
            Value::Array(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Value::Map(entries) | Value::Record(entries) => {
                let mut map = Map::new();
                for (key, value) in entries {
                    map.insert(key.clone(), value.to_json());
                }
                Json::Object(map)
            }
            Value::Decimal(d) => Json::String(d.to_string()),
            Value::Uuid(u) => Json::String(u.hyphenated().to_string()),
            Value::Date(d) => Json::String(d.to_string()),
            Value::Time(t) => Json::String(t.to_string()),
            Value::Timestamp(ts) => {
                Json::String(ts.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            Value::LocalTimestamp(ts) => Json::String(ts.to_string()),
        }
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v.into())
                }
            }
        )*
    };
}

impl_from! {
    bool => Boolean,
    i8 => Int,
    i16 => Int,
    i32 => Int,
    u8 => Int,
    u16 => Int,
    i64 => Long,
    u32 => Long,
    f32 => Float,
    f64 => Double,
    String => String,
    &str => String,
    Vec<u8> => Bytes,
    BigDecimal => Decimal,
    Uuid => Uuid,
    NaiveDate => Date,
    NaiveTime => Time,
    DateTime<Utc> => Timestamp,
    NaiveDateTime => LocalTimestamp,
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

impl<T: Into<Value>> From<VecDeque<T>> for Value {
    fn from(items: VecDeque<T>) -> Self {
        Value::array(items)
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(items: [T; N]) -> Self {
        Value::array(items)
    }
}

impl<T: Into<Value>> FromIterator<T> for Value {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Value::array(iter)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(entries: BTreeMap<String, Value>) -> Self {
        Value::Map(entries)
    }
}
