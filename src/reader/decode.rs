//! Schema-driven binary decoding.
//!
//! The decoder walks the schema and consumes bytes in exactly the order the
//! encoder wrote them. Collections are read as one or more positive blocks
//! closed by a zero count; a union is its branch index followed by the
//! branch value.

use std::collections::BTreeMap;

use crate::convert::LogicalTypeRegistry;
use crate::error::DecodeError;
use crate::reader::varint::decode_zigzag;
use crate::reader::ReaderConfig;
use crate::schema::{AvroSchema, EnumSchema, LogicalType, RecordSchema, SchemaResolutionContext};
use crate::source::ByteSource;
use crate::value::Value;

/// Upper bound on up-front reservation for a block, whatever its count says.
const MAX_PREALLOC_ITEMS: usize = 4096;

// ============================================================================
// Primitive Decoders
// ============================================================================

/// One byte, `0` or `1`.
#[inline]
pub fn decode_boolean<S: ByteSource + ?Sized>(src: &mut S) -> Result<bool, DecodeError> {
    match src.read_byte()? {
        0 => Ok(false),
        1 => Ok(true),
        byte => Err(DecodeError::InvalidData(format!(
            "Boolean byte must be 0 or 1, found {}",
            byte
        ))),
    }
}

#[inline]
pub fn decode_int<S: ByteSource + ?Sized>(src: &mut S) -> Result<i32, DecodeError> {
    let long = decode_long(src)?;
    i32::try_from(long).map_err(|_| {
        DecodeError::InvalidData(format!("Integer overflow: {} does not fit in i32", long))
    })
}

#[inline]
pub fn decode_long<S: ByteSource + ?Sized>(src: &mut S) -> Result<i64, DecodeError> {
    decode_zigzag(src)
}

/// Four bytes, little-endian.
#[inline]
pub fn decode_float<S: ByteSource + ?Sized>(src: &mut S) -> Result<f32, DecodeError> {
    let mut bytes = [0u8; 4];
    src.read_exact_into(&mut bytes)?;
    Ok(f32::from_le_bytes(bytes))
}

/// Eight bytes, little-endian.
#[inline]
pub fn decode_double<S: ByteSource + ?Sized>(src: &mut S) -> Result<f64, DecodeError> {
    let mut bytes = [0u8; 8];
    src.read_exact_into(&mut bytes)?;
    Ok(f64::from_le_bytes(bytes))
}

/// A long length followed by that many raw bytes.
///
/// # Errors
/// - `DecodeError::InvalidData` on a negative length
/// - `DecodeError::LengthLimitExceeded` if the length exceeds `max_len`
/// - `DecodeError::UnexpectedEof` if fewer bytes remain than declared
#[inline]
pub fn decode_bytes<S: ByteSource + ?Sized>(
    src: &mut S,
    max_len: usize,
) -> Result<Vec<u8>, DecodeError> {
    let len = decode_long(src)?;
    if len < 0 {
        return Err(DecodeError::InvalidData(format!(
            "Length prefix is negative: {}",
            len
        )));
    }
    let len = len as u64;
    if len > max_len as u64 {
        return Err(DecodeError::LengthLimitExceeded {
            length: len,
            limit: max_len,
        });
    }
    src.read_vec(len as usize)
}

/// Length-prefixed bytes that must be valid UTF-8.
#[inline]
pub fn decode_string<S: ByteSource + ?Sized>(
    src: &mut S,
    max_len: usize,
) -> Result<String, DecodeError> {
    let bytes = decode_bytes(src, max_len)?;
    String::from_utf8(bytes).map_err(DecodeError::from)
}

/// Decode a fixed-size byte array. No length prefix.
#[inline]
pub fn decode_fixed<S: ByteSource + ?Sized>(
    src: &mut S,
    size: usize,
) -> Result<Vec<u8>, DecodeError> {
    src.read_vec(size)
}

// ============================================================================
// Complex Type Decoders
// ============================================================================

/// Decode an enum symbol from its zero-based index.
pub fn decode_enum<S: ByteSource + ?Sized>(
    src: &mut S,
    schema: &EnumSchema,
) -> Result<String, DecodeError> {
    let index = decode_long(src)?;
    usize::try_from(index)
        .ok()
        .and_then(|i| schema.symbols.get(i))
        .cloned()
        .ok_or_else(|| DecodeError::EnumIndexOutOfRange {
            index,
            name: schema.name.clone(),
            symbols: schema.symbols.len(),
        })
}

/// Decode a union branch index, checking it against the branch count.
#[inline]
pub fn decode_union_index<S: ByteSource + ?Sized>(
    src: &mut S,
    num_branches: usize,
) -> Result<usize, DecodeError> {
    let index = decode_long(src)?;
    match usize::try_from(index) {
        Ok(i) if i < num_branches => Ok(i),
        _ => Err(DecodeError::UnionIndexOutOfRange {
            index,
            branches: num_branches,
        }),
    }
}

/// Decode an array or map block count.
///
/// Returns `None` for the terminating zero count. Negative counts (the
/// byte-size-prefixed block form) are rejected.
#[inline]
pub fn decode_block_count<S: ByteSource + ?Sized>(
    src: &mut S,
    max_items: usize,
) -> Result<Option<usize>, DecodeError> {
    let count = decode_long(src)?;
    if count < 0 {
        return Err(DecodeError::NegativeBlockCount(count));
    }
    if count == 0 {
        return Ok(None);
    }
    if count as u64 > max_items as u64 {
        return Err(DecodeError::LengthLimitExceeded {
            length: count as u64,
            limit: max_items,
        });
    }
    Ok(Some(count as usize))
}

// ============================================================================
// Schema-driven Decoding
// ============================================================================

/// Decodes values against schema nodes, resolving named types and logical
/// types along the way.
#[derive(Debug, Clone, Copy)]
pub struct ValueDecoder<'a> {
    context: &'a SchemaResolutionContext,
    registry: &'a LogicalTypeRegistry,
    config: &'a ReaderConfig,
    /// Schema nodes entered above the current one
    depth: usize,
}

impl<'a> ValueDecoder<'a> {
    pub fn new(
        context: &'a SchemaResolutionContext,
        registry: &'a LogicalTypeRegistry,
        config: &'a ReaderConfig,
    ) -> Self {
        Self {
            context,
            registry,
            config,
            depth: 0,
        }
    }

    /// The decoder for the children of the current node.
    fn descend(&self) -> Result<Self, DecodeError> {
        if self.depth >= self.config.max_depth {
            return Err(DecodeError::DepthLimitExceeded {
                limit: self.config.max_depth,
            });
        }
        Ok(Self {
            depth: self.depth + 1,
            ..*self
        })
    }

    /// Decode one value of `schema`.
    ///
    /// Fails with [`DecodeError::DepthLimitExceeded`] once a recursive
    /// schema nests deeper than [`ReaderConfig::max_depth`].
    pub fn decode<S: ByteSource + ?Sized>(
        &self,
        src: &mut S,
        schema: &AvroSchema,
    ) -> Result<Value, DecodeError> {
        let nested = self.descend()?;
        match schema {
            AvroSchema::Null => Ok(Value::Null),
            AvroSchema::Boolean => decode_boolean(src).map(Value::Boolean),
            AvroSchema::Int => decode_int(src).map(Value::Int),
            AvroSchema::Long => decode_long(src).map(Value::Long),
            AvroSchema::Float => decode_float(src).map(Value::Float),
            AvroSchema::Double => decode_double(src).map(Value::Double),
            AvroSchema::Bytes => decode_bytes(src, self.config.max_bytes_len).map(Value::Bytes),
            AvroSchema::String => decode_string(src, self.config.max_bytes_len).map(Value::String),
            AvroSchema::Fixed(fixed) => decode_fixed(src, fixed.size).map(Value::Fixed),
            AvroSchema::Enum(enum_schema) => decode_enum(src, enum_schema).map(Value::Enum),
            AvroSchema::Array(items) => nested.decode_array(src, items),
            AvroSchema::Map(values) => nested.decode_map(src, values),
            AvroSchema::Record(record) => nested.decode_record(src, record),
            AvroSchema::Union(branches) => {
                let index = decode_union_index(src, branches.len())?;
                nested.decode(src, &branches[index])
            }
            AvroSchema::Logical(logical) => nested.decode_logical(src, logical),
            AvroSchema::Named(name) => {
                let resolved = self
                    .context
                    .get(name)
                    .ok_or_else(|| DecodeError::UnresolvedReference(name.clone()))?;
                nested.decode(src, resolved)
            }
        }
    }

    fn decode_array<S: ByteSource + ?Sized>(
        &self,
        src: &mut S,
        item_schema: &AvroSchema,
    ) -> Result<Value, DecodeError> {
        let mut items = Vec::new();

        while let Some(count) = decode_block_count(src, self.config.max_block_items)? {
            items.reserve(count.min(MAX_PREALLOC_ITEMS));
            for _ in 0..count {
                items.push(self.decode(src, item_schema)?);
            }
        }

        Ok(Value::Array(items))
    }

    fn decode_map<S: ByteSource + ?Sized>(
        &self,
        src: &mut S,
        value_schema: &AvroSchema,
    ) -> Result<Value, DecodeError> {
        let mut entries = BTreeMap::new();

        while let Some(count) = decode_block_count(src, self.config.max_block_items)? {
            for _ in 0..count {
                let key = decode_string(src, self.config.max_bytes_len)?;
                let value = self.decode(src, value_schema)?;
                entries.insert(key, value);
            }
        }

        Ok(Value::Map(entries))
    }

    fn decode_record<S: ByteSource + ?Sized>(
        &self,
        src: &mut S,
        record: &RecordSchema,
    ) -> Result<Value, DecodeError> {
        let mut fields = BTreeMap::new();
        for field in &record.fields {
            fields.insert(field.name.clone(), self.decode(src, &field.schema)?);
        }
        Ok(Value::Record(fields))
    }

    /// Decode the underlying primitive, then convert it if the registry
    /// knows this logical type. Unknown logical types yield the primitive.
    fn decode_logical<S: ByteSource + ?Sized>(
        &self,
        src: &mut S,
        logical: &LogicalType,
    ) -> Result<Value, DecodeError> {
        let underlying = self.decode(src, &logical.base)?;
        match self.registry.lookup(logical, self.context) {
            Some((converter, base)) => {
                Ok((converter.decode)(underlying, &logical.logical_type, base)?)
            }
            None => Ok(underlying),
        }
    }
}
