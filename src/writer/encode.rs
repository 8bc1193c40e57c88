//! Avro binary encoder for primitive and complex types.
//!
//! Mirror image of `reader::decode`: every routine here writes exactly
//! the bytes its decoding counterpart consumes. Arrays and maps are
//! written as a single block followed by the zero terminator; an empty
//! collection is the terminator alone.

use std::io::Write;

use tracing::warn;

use crate::convert::LogicalTypeRegistry;
use crate::error::EncodeError;
use crate::reader::varint::write_zigzag;
use crate::resolver::resolve_branch;
use crate::schema::{
    AvroSchema, EnumSchema, FixedSchema, LogicalType, RecordSchema, SchemaResolutionContext,
};
use crate::value::{coerce, Value};
use crate::writer::WriterConfig;

// ============================================================================
// Primitive Encoders
// ============================================================================

#[inline]
pub fn encode_boolean<W: Write + ?Sized>(sink: &mut W, value: bool) -> Result<(), EncodeError> {
    sink.write_all(&[value as u8])?;
    Ok(())
}

#[inline]
pub fn encode_long<W: Write + ?Sized>(sink: &mut W, value: i64) -> Result<(), EncodeError> {
    write_zigzag(sink, value)?;
    Ok(())
}

#[inline]
pub fn encode_float<W: Write + ?Sized>(sink: &mut W, value: f32) -> Result<(), EncodeError> {
    sink.write_all(&value.to_le_bytes())?;
    Ok(())
}

#[inline]
pub fn encode_double<W: Write + ?Sized>(sink: &mut W, value: f64) -> Result<(), EncodeError> {
    sink.write_all(&value.to_le_bytes())?;
    Ok(())
}

/// Length prefix, then the raw bytes. Strings use the same form.
#[inline]
pub fn encode_bytes<W: Write + ?Sized>(sink: &mut W, bytes: &[u8]) -> Result<(), EncodeError> {
    write_zigzag(sink, bytes.len() as i64)?;
    sink.write_all(bytes)?;
    Ok(())
}

// ============================================================================
// Schema-driven Encoding
// ============================================================================

/// Encodes values against schema nodes.
///
/// Holds the symbol table for named types, the logical type registry used
/// for logical nodes and union branch matching, and writer options.
#[derive(Debug, Clone, Copy)]
pub struct ValueEncoder<'a> {
    context: &'a SchemaResolutionContext,
    registry: &'a LogicalTypeRegistry,
    config: &'a WriterConfig,
    /// Schema nodes entered above the current one
    depth: usize,
}

impl<'a> ValueEncoder<'a> {
    pub fn new(
        context: &'a SchemaResolutionContext,
        registry: &'a LogicalTypeRegistry,
        config: &'a WriterConfig,
    ) -> Self {
        Self {
            context,
            registry,
            config,
            depth: 0,
        }
    }

    /// The encoder for the children of the current node.
    fn descend(&self) -> Result<Self, EncodeError> {
        if self.depth >= self.config.max_depth {
            return Err(EncodeError::DepthLimitExceeded {
                limit: self.config.max_depth,
            });
        }
        Ok(Self {
            depth: self.depth + 1,
            ..*self
        })
    }

    /// Encode `value` as `schema`.
    ///
    /// Bytes already written for earlier record fields or items stay in
    /// the sink when a later part fails. Values nesting deeper than
    /// [`WriterConfig::max_depth`] fail with
    /// [`EncodeError::DepthLimitExceeded`].
    pub fn encode<W: Write + ?Sized>(
        &self,
        sink: &mut W,
        value: &Value,
        schema: &AvroSchema,
    ) -> Result<(), EncodeError> {
        let nested = self.descend()?;
        match schema {
            AvroSchema::Null => match value {
                Value::Null => Ok(()),
                other => Err(mismatch("null", other)),
            },
            AvroSchema::Boolean => match value {
                Value::Boolean(b) => encode_boolean(sink, *b),
                other => Err(mismatch("boolean", other)),
            },
            AvroSchema::Int => {
                let v = integral(value, "int")?;
                let v = i32::try_from(v).map_err(|_| EncodeError::IntegerOverflow {
                    value: v.to_string(),
                    target: "int",
                })?;
                encode_long(sink, v as i64)
            }
            AvroSchema::Long => encode_long(sink, integral(value, "long")?),
            AvroSchema::Float => encode_float(sink, self.floating(value, "float")? as f32),
            AvroSchema::Double => encode_double(sink, self.floating(value, "double")?),
            AvroSchema::Bytes => match coerce::as_bytes(value) {
                Some(bytes) => encode_bytes(sink, bytes),
                None => Err(mismatch("bytes", value)),
            },
            AvroSchema::String => match value {
                Value::String(s) => encode_bytes(sink, s.as_bytes()),
                other => Err(mismatch("string", other)),
            },
            AvroSchema::Fixed(fixed) => encode_fixed(sink, value, fixed),
            AvroSchema::Enum(enum_schema) => encode_enum(sink, value, enum_schema),
            AvroSchema::Array(items) => nested.encode_array(sink, value, items),
            AvroSchema::Map(values) => nested.encode_map(sink, value, values),
            AvroSchema::Record(record) => nested.encode_record(sink, value, record),
            AvroSchema::Union(branches) => {
                let index = resolve_branch(value, branches, self.context, self.registry)?;
                encode_long(sink, index as i64)?;
                nested.encode(sink, value, &branches[index])
            }
            AvroSchema::Logical(logical) => nested.encode_logical(sink, value, logical),
            AvroSchema::Named(name) => {
                let resolved = self
                    .context
                    .get(name)
                    .ok_or_else(|| EncodeError::UnresolvedReference(name.clone()))?;
                nested.encode(sink, value, resolved)
            }
        }
    }

    /// Any numeric value as a double. Integers take the `f64` rounding
    /// path; the result is identical with or without the warning.
    fn floating(&self, value: &Value, target: &'static str) -> Result<f64, EncodeError> {
        let v = coerce::to_f64(value).ok_or_else(|| mismatch(target, value))?;
        if self.config.warn_on_precision_loss && coerce::loses_f64_precision(value) {
            warn!(
                value = ?value,
                encoded = v,
                schema_type = target,
                "Integer beyond 2^53 loses precision"
            );
        }
        Ok(v)
    }

    fn encode_array<W: Write + ?Sized>(
        &self,
        sink: &mut W,
        value: &Value,
        item_schema: &AvroSchema,
    ) -> Result<(), EncodeError> {
        let items = coerce::as_sequence(value).ok_or_else(|| mismatch("array", value))?;
        if !items.is_empty() {
            encode_long(sink, items.len() as i64)?;
            for item in items {
                self.encode(sink, item, item_schema)?;
            }
        }
        encode_long(sink, 0)
    }

    fn encode_map<W: Write + ?Sized>(
        &self,
        sink: &mut W,
        value: &Value,
        value_schema: &AvroSchema,
    ) -> Result<(), EncodeError> {
        let entries = coerce::as_mapping(value).ok_or_else(|| mismatch("map", value))?;
        if !entries.is_empty() {
            encode_long(sink, entries.len() as i64)?;
            for (key, entry) in entries {
                encode_bytes(sink, key.as_bytes())?;
                self.encode(sink, entry, value_schema)?;
            }
        }
        encode_long(sink, 0)
    }

    /// Fields in declared order. A missing field takes its default, or
    /// null when its type admits null.
    fn encode_record<W: Write + ?Sized>(
        &self,
        sink: &mut W,
        value: &Value,
        record: &RecordSchema,
    ) -> Result<(), EncodeError> {
        let fields = coerce::as_mapping(value)
            .ok_or_else(|| mismatch(&format!("record {}", record.fullname()), value))?;

        for field in &record.fields {
            match fields.get(&field.name) {
                Some(v) => self.encode(sink, v, &field.schema)?,
                None => {
                    let fallback = match &field.default {
                        Some(default) => coerce::json_to_value(default, &field.schema, self.context)
                            .map_err(|message| EncodeError::InvalidDefault {
                                field: field.name.clone(),
                                message,
                            })?,
                        None if self.admits_null(&field.schema) => Value::Null,
                        None => return Err(EncodeError::MissingField(field.name.clone())),
                    };
                    self.encode(sink, &fallback, &field.schema)?;
                }
            }
        }
        Ok(())
    }

    fn encode_logical<W: Write + ?Sized>(
        &self,
        sink: &mut W,
        value: &Value,
        logical: &LogicalType,
    ) -> Result<(), EncodeError> {
        match self.registry.lookup(logical, self.context) {
            Some((converter, base)) if (converter.accepts)(value) => {
                let underlying = (converter.encode)(value, &logical.logical_type, base)?;
                self.encode(sink, &underlying, &logical.base)
            }
            // Unknown logical type or an already-underlying value
            _ => self.encode(sink, value, &logical.base),
        }
    }

    fn admits_null(&self, schema: &AvroSchema) -> bool {
        match self.context.resolve(schema) {
            Some(AvroSchema::Null) => true,
            Some(AvroSchema::Union(branches)) => branches
                .iter()
                .any(|b| matches!(self.context.resolve(b), Some(AvroSchema::Null))),
            _ => false,
        }
    }
}

fn encode_fixed<W: Write + ?Sized>(
    sink: &mut W,
    value: &Value,
    fixed: &FixedSchema,
) -> Result<(), EncodeError> {
    let bytes = coerce::as_bytes(value).ok_or_else(|| mismatch("fixed", value))?;
    if bytes.len() != fixed.size {
        return Err(EncodeError::FixedSizeMismatch {
            name: fixed.fullname(),
            expected: fixed.size,
            found: bytes.len(),
        });
    }
    sink.write_all(bytes)?;
    Ok(())
}

fn encode_enum<W: Write + ?Sized>(
    sink: &mut W,
    value: &Value,
    schema: &EnumSchema,
) -> Result<(), EncodeError> {
    let symbol = coerce::as_symbol(value).ok_or_else(|| mismatch("enum", value))?;
    let index = schema
        .symbol_index(symbol)
        .ok_or_else(|| EncodeError::UnknownEnumSymbol {
            symbol: symbol.to_string(),
            name: schema.fullname(),
        })?;
    encode_long(sink, index as i64)
}

/// Integral value of a numeric for an `int`/`long` node.
fn integral(value: &Value, target: &'static str) -> Result<i64, EncodeError> {
    if let Some(v) = coerce::to_i64(value) {
        return Ok(v);
    }
    match coerce::to_f64(value) {
        // Whole but beyond the i64 range
        Some(d) if d.is_finite() && d.fract() == 0.0 => Err(EncodeError::IntegerOverflow {
            value: d.to_string(),
            target,
        }),
        _ => Err(mismatch(target, value)),
    }
}

fn mismatch(expected: &str, found: &Value) -> EncodeError {
    EncodeError::TypeMismatch {
        expected: expected.to_string(),
        found: found.kind_name(),
    }
}
