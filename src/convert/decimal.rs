//! `decimal` over `bytes` and `fixed(size)`.
//!
//! The unscaled integer `value × 10^scale` is stored big-endian in two's
//! complement: minimal length for `bytes`, sign-extended to exactly `size`
//! bytes for `fixed`. Values with more fractional digits than `scale` are
//! rounded half-to-even.

use bigdecimal::{BigDecimal, RoundingMode};
use num_bigint::{BigInt, Sign};

use super::{unexpected, LogicalConverter, LogicalTypeRegistry, PrimitiveKind};
use crate::error::LogicalTypeError;
use crate::schema::{AvroSchema, LogicalTypeName};
use crate::value::Value;

const NAME: &str = "decimal";

pub(super) fn register(registry: &mut LogicalTypeRegistry) {
    let converter = LogicalConverter::new(is_decimal, encode, decode);
    registry.register(PrimitiveKind::Bytes, NAME, converter);
    registry.register(PrimitiveKind::Fixed, NAME, converter);
}

fn is_decimal(value: &Value) -> bool {
    matches!(value, Value::Decimal(_))
}

fn scale_of(name: &LogicalTypeName) -> Result<i64, LogicalTypeError> {
    match name {
        LogicalTypeName::Decimal { scale, .. } => Ok(*scale as i64),
        other => Err(LogicalTypeError::InvalidParameters {
            logical_type: NAME,
            message: format!("no precision/scale on '{}'", other.name()),
        }),
    }
}

fn encode(
    value: &Value,
    name: &LogicalTypeName,
    base: &AvroSchema,
) -> Result<Value, LogicalTypeError> {
    let decimal = match value {
        Value::Decimal(d) => d,
        other => return Err(unexpected(NAME, "decimal", other)),
    };
    let scale = scale_of(name)?;

    let (unscaled, _) = decimal
        .with_scale_round(scale, RoundingMode::HalfEven)
        .as_bigint_and_exponent();
    let bytes = unscaled.to_signed_bytes_be();

    match base {
        AvroSchema::Fixed(fixed) => sign_extend(&unscaled, bytes, fixed.size).map(Value::Fixed),
        _ => Ok(Value::Bytes(bytes)),
    }
}

fn sign_extend(
    unscaled: &BigInt,
    bytes: Vec<u8>,
    size: usize,
) -> Result<Vec<u8>, LogicalTypeError> {
    if bytes.len() > size {
        return Err(LogicalTypeError::DecimalOverflow {
            needed: bytes.len(),
            size,
        });
    }
    let fill = if unscaled.sign() == Sign::Minus { 0xFF } else { 0x00 };
    let mut out = vec![fill; size - bytes.len()];
    out.extend_from_slice(&bytes);
    Ok(out)
}

fn decode(
    value: Value,
    name: &LogicalTypeName,
    _: &AvroSchema,
) -> Result<Value, LogicalTypeError> {
    let scale = scale_of(name)?;
    match value {
        Value::Bytes(bytes) | Value::Fixed(bytes) => {
            let unscaled = BigInt::from_signed_bytes_be(&bytes);
            Ok(Value::Decimal(BigDecimal::new(unscaled, scale)))
        }
        other => Err(unexpected(NAME, "bytes or fixed", &other)),
    }
}
