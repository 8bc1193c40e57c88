//! Value coercion.
//!
//! Small named predicates describe what shape a value has (null, numeric,
//! sequence, mapping, ...). The union resolver matches branches with them
//! and the encoder uses the paired conversions to normalize input before
//! writing bytes.

use std::collections::BTreeMap;

use serde_json::Value as Json;

use crate::schema::{AvroSchema, EnumSchema, RecordSchema, SchemaResolutionContext};
use crate::value::Value;

/// Largest integer magnitude a double represents exactly (2^53).
pub const MAX_EXACT_F64_INT: i64 = 1 << 53;

/// The absent/null sentinel.
#[inline]
pub fn is_null(value: &Value) -> bool {
    matches!(value, Value::Null)
}

#[inline]
pub fn is_boolean(value: &Value) -> bool {
    matches!(value, Value::Boolean(_))
}

/// Any integer or floating value, regardless of width.
#[inline]
pub fn is_numeric(value: &Value) -> bool {
    matches!(
        value,
        Value::Int(_) | Value::Long(_) | Value::Float(_) | Value::Double(_)
    )
}

#[inline]
pub fn is_text(value: &Value) -> bool {
    matches!(value, Value::String(_))
}

#[inline]
pub fn is_bytes_like(value: &Value) -> bool {
    matches!(value, Value::Bytes(_) | Value::Fixed(_))
}

#[inline]
pub fn is_sequence(value: &Value) -> bool {
    matches!(value, Value::Array(_))
}

#[inline]
pub fn is_mapping(value: &Value) -> bool {
    matches!(value, Value::Map(_) | Value::Record(_))
}

/// Bytes-like value of exactly `size` bytes.
pub fn is_fixed_of(value: &Value, size: usize) -> bool {
    as_bytes(value).is_some_and(|b| b.len() == size)
}

/// Enum or string value naming one of the declared symbols.
pub fn is_enum_symbol(value: &Value, schema: &EnumSchema) -> bool {
    as_symbol(value).is_some_and(|s| schema.symbol_index(s).is_some())
}

/// Mapping whose keys all name declared fields.
pub fn is_record_of(value: &Value, schema: &RecordSchema) -> bool {
    as_mapping(value).is_some_and(|m| m.keys().all(|k| schema.field(k).is_some()))
}

pub fn as_sequence(value: &Value) -> Option<&[Value]> {
    match value {
        Value::Array(items) => Some(items),
        _ => None,
    }
}

pub fn as_mapping(value: &Value) -> Option<&BTreeMap<String, Value>> {
    match value {
        Value::Map(entries) | Value::Record(entries) => Some(entries),
        _ => None,
    }
}

pub fn as_bytes(value: &Value) -> Option<&[u8]> {
    match value {
        Value::Bytes(b) | Value::Fixed(b) => Some(b),
        _ => None,
    }
}

pub fn as_symbol(value: &Value) -> Option<&str> {
    match value {
        Value::Enum(s) | Value::String(s) => Some(s),
        _ => None,
    }
}

/// Numeric value as a double.
///
/// Integers wider than 2^53 go through double-precision rounding; the
/// loss is part of the wire contract and is not reported here.
pub fn to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Int(i) => Some(*i as f64),
        Value::Long(l) => Some(*l as f64),
        Value::Float(f) => Some(*f as f64),
        Value::Double(d) => Some(*d),
        _ => None,
    }
}

/// Numeric value as a 64-bit integer.
///
/// Floating values convert only when finite, integral and in range.
pub fn to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Int(i) => Some(*i as i64),
        Value::Long(l) => Some(*l),
        Value::Float(f) => integral_f64(*f as f64),
        Value::Double(d) => integral_f64(*d),
        _ => None,
    }
}

/// Whether converting this value to a double loses integer precision.
pub fn loses_f64_precision(value: &Value) -> bool {
    match value {
        Value::Long(l) => l.unsigned_abs() > MAX_EXACT_F64_INT as u64,
        _ => false,
    }
}

fn integral_f64(d: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, which is out of range
    if d.is_finite() && d.fract() == 0.0 && d >= i64::MIN as f64 && d < i64::MAX as f64 {
        Some(d as i64)
    } else {
        None
    }
}

/// Convert a JSON default from a schema document into a value for `schema`.
///
/// Follows the Avro JSON default encoding: bytes and fixed are strings
/// whose code points are byte values, and enums are symbol strings. A union
/// default is read against the first branch only.
pub fn json_to_value(
    json: &Json,
    schema: &AvroSchema,
    context: &SchemaResolutionContext,
) -> Result<Value, String> {
    let schema = context
        .resolve(schema)
        .ok_or_else(|| format!("Unresolved named type in default: {}", schema.type_key()))?;

    match (json, schema) {
        (Json::Null, AvroSchema::Null) => Ok(Value::Null),
        (Json::Bool(b), AvroSchema::Boolean) => Ok(Value::Boolean(*b)),

        (Json::Number(n), AvroSchema::Int) => n
            .as_i64()
            .and_then(|v| i32::try_from(v).ok())
            .map(Value::Int)
            .ok_or_else(|| format!("Cannot convert {} to int", n)),
        (Json::Number(n), AvroSchema::Long) => n
            .as_i64()
            .map(Value::Long)
            .ok_or_else(|| format!("Cannot convert {} to long", n)),
        (Json::Number(n), AvroSchema::Float) => n
            .as_f64()
            .map(|v| Value::Float(v as f32))
            .ok_or_else(|| format!("Cannot convert {} to float", n)),
        (Json::Number(n), AvroSchema::Double) => n
            .as_f64()
            .map(Value::Double)
            .ok_or_else(|| format!("Cannot convert {} to double", n)),

        (Json::String(s), AvroSchema::String) => Ok(Value::String(s.clone())),
        (Json::String(s), AvroSchema::Bytes) => latin1_bytes(s).map(Value::Bytes),
        (Json::String(s), AvroSchema::Fixed(fixed)) => {
            let bytes = latin1_bytes(s)?;
            if bytes.len() != fixed.size {
                return Err(format!(
                    "Fixed default has wrong size: expected {}, got {}",
                    fixed.size,
                    bytes.len()
                ));
            }
            Ok(Value::Fixed(bytes))
        }
        (Json::String(s), AvroSchema::Enum(enum_schema)) => {
            if enum_schema.symbol_index(s).is_none() {
                return Err(format!(
                    "Unknown enum symbol '{}' for enum '{}'",
                    s, enum_schema.name
                ));
            }
            Ok(Value::Enum(s.clone()))
        }

        (Json::Array(arr), AvroSchema::Array(item_schema)) => arr
            .iter()
            .map(|item| json_to_value(item, item_schema, context))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        (Json::Object(obj), AvroSchema::Map(value_schema)) => obj
            .iter()
            .map(|(k, v)| Ok((k.clone(), json_to_value(v, value_schema, context)?)))
            .collect::<Result<BTreeMap<_, _>, String>>()
            .map(Value::Map),
        (Json::Object(obj), AvroSchema::Record(record_schema)) => record_schema
            .fields
            .iter()
            .map(|field| {
                let value = match obj.get(&field.name).or(field.default.as_ref()) {
                    Some(v) => json_to_value(v, &field.schema, context)?,
                    None => {
                        return Err(format!(
                            "Missing required field '{}' in default value",
                            field.name
                        ))
                    }
                };
                Ok((field.name.clone(), value))
            })
            .collect::<Result<BTreeMap<_, _>, String>>()
            .map(Value::Record),

        (json, AvroSchema::Union(variants)) => match variants.first() {
            Some(first) => json_to_value(json, first, context)
                .map_err(|e| format!("Union default must match the first branch: {}", e)),
            None => Err("Union has no branches".to_string()),
        },

        (json, AvroSchema::Logical(logical)) => json_to_value(json, &logical.base, context),

        (json, schema) => Err(format!(
            "Cannot convert default {} to {}",
            json,
            schema.type_key()
        )),
    }
}

/// Avro JSON encodes bytes as a string of code points 0-255.
fn latin1_bytes(s: &str) -> Result<Vec<u8>, String> {
    s.chars()
        .map(|c| u8::try_from(c).map_err(|_| format!("Character {:?} is not a byte value", c)))
        .collect()
}
