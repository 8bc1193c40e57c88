//! `uuid` over `string` (canonical hyphenated text) and `fixed(16)`.

use ::uuid::Uuid;

use super::{unexpected, LogicalConverter, LogicalTypeRegistry, PrimitiveKind};
use crate::error::LogicalTypeError;
use crate::schema::{AvroSchema, LogicalTypeName};
use crate::value::Value;

const NAME: &str = "uuid";

pub(super) fn register(registry: &mut LogicalTypeRegistry) {
    registry.register(
        PrimitiveKind::String,
        NAME,
        LogicalConverter::new(is_uuid, encode_string, decode_string),
    );
    registry.register(
        PrimitiveKind::Fixed,
        NAME,
        LogicalConverter::new(is_uuid, encode_fixed, decode_fixed),
    );
}

fn is_uuid(value: &Value) -> bool {
    matches!(value, Value::Uuid(_))
}

fn native(value: &Value) -> Result<&Uuid, LogicalTypeError> {
    match value {
        Value::Uuid(u) => Ok(u),
        other => Err(unexpected(NAME, "uuid", other)),
    }
}

fn encode_string(
    value: &Value,
    _: &LogicalTypeName,
    _: &AvroSchema,
) -> Result<Value, LogicalTypeError> {
    // Lowercase hyphenated form
    Ok(Value::String(native(value)?.hyphenated().to_string()))
}

fn decode_string(
    value: Value,
    _: &LogicalTypeName,
    _: &AvroSchema,
) -> Result<Value, LogicalTypeError> {
    let text = match value {
        Value::String(s) => s,
        other => return Err(unexpected(NAME, "string", &other)),
    };
    // 32 hex digits plus 4 dashes; other forms uuid accepts are rejected
    if text.len() != 36 {
        return Err(LogicalTypeError::Malformed {
            logical_type: NAME,
            message: format!("expected 36 characters, got {}", text.len()),
        });
    }
    Uuid::parse_str(&text)
        .map(Value::Uuid)
        .map_err(|e| LogicalTypeError::Malformed {
            logical_type: NAME,
            message: e.to_string(),
        })
}

fn encode_fixed(
    value: &Value,
    _: &LogicalTypeName,
    base: &AvroSchema,
) -> Result<Value, LogicalTypeError> {
    check_size(base)?;
    Ok(Value::Fixed(native(value)?.as_bytes().to_vec()))
}

fn decode_fixed(
    value: Value,
    _: &LogicalTypeName,
    _: &AvroSchema,
) -> Result<Value, LogicalTypeError> {
    match value {
        Value::Fixed(bytes) => Uuid::from_slice(&bytes)
            .map(Value::Uuid)
            .map_err(|e| LogicalTypeError::Malformed {
                logical_type: NAME,
                message: e.to_string(),
            }),
        other => Err(unexpected(NAME, "fixed", &other)),
    }
}

fn check_size(base: &AvroSchema) -> Result<(), LogicalTypeError> {
    match base {
        AvroSchema::Fixed(fixed) if fixed.size != 16 => Err(LogicalTypeError::InvalidParameters {
            logical_type: NAME,
            message: format!("fixed size must be 16, got {}", fixed.size),
        }),
        _ => Ok(()),
    }
}
