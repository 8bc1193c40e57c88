//! Binary decoding
//!
//! This module provides the schema-driven decoder: configuration, the
//! reusable [`Decoder`], and the [`read`] / [`from_slice`] entry points.

pub mod decode;
pub mod varint;

use crate::convert::LogicalTypeRegistry;
use crate::error::DecodeError;
use crate::schema::Schema;
use crate::source::ByteSource;
use crate::value::Value;

pub use decode::{
    decode_block_count, decode_boolean, decode_bytes, decode_double, decode_enum, decode_fixed,
    decode_float, decode_int, decode_long, decode_string, decode_union_index, ValueDecoder,
};
pub use varint::{decode_varint, decode_zigzag, write_varint, write_zigzag};

/// Default cap on a single bytes or string length (256 MiB).
pub const DEFAULT_MAX_BYTES_LEN: usize = 256 * 1024 * 1024;

/// Default cap on the item count of a single array or map block.
pub const DEFAULT_MAX_BLOCK_ITEMS: usize = 16 * 1024 * 1024;

/// Default cap on schema nodes entered while reading or writing one value.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Configuration for decoding.
///
/// Bounds what a corrupt or hostile length prefix can make the decoder
/// allocate, and how deep a recursive schema may nest.
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Largest accepted bytes/string length (default: 256 MiB).
    pub max_bytes_len: usize,
    /// Largest accepted array/map block count (default: 16 Mi items).
    pub max_block_items: usize,
    /// Deepest chain of nested schema nodes (default: 512).
    pub max_depth: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            max_bytes_len: DEFAULT_MAX_BYTES_LEN,
            max_block_items: DEFAULT_MAX_BLOCK_ITEMS,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ReaderConfig {
    /// Create a new ReaderConfig with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the largest accepted bytes/string length.
    pub fn with_max_bytes_len(mut self, max_bytes_len: usize) -> Self {
        self.max_bytes_len = max_bytes_len;
        self
    }

    /// Set the largest accepted array/map block count.
    pub fn with_max_block_items(mut self, max_block_items: usize) -> Self {
        self.max_block_items = max_block_items;
        self
    }

    /// Set the deepest chain of nested schema nodes.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// A reusable decoder holding a logical type registry and configuration.
///
/// # Example
/// ```
/// use glider::{Decoder, ReaderConfig, Schema, Value};
///
/// let schema: Schema = r#"{"type": "array", "items": "int"}"#.parse().unwrap();
/// let decoder = Decoder::new().with_config(ReaderConfig::new().with_max_block_items(8));
///
/// let mut cursor: &[u8] = &[0x04, 0x02, 0x04, 0x00];
/// let value = decoder.read(&mut cursor, &schema).unwrap();
/// assert_eq!(value, Value::array([1, 2]));
/// ```
#[derive(Debug, Clone)]
pub struct Decoder<'r> {
    registry: &'r LogicalTypeRegistry,
    config: ReaderConfig,
}

impl Default for Decoder<'static> {
    fn default() -> Self {
        Self {
            registry: LogicalTypeRegistry::standard(),
            config: ReaderConfig::default(),
        }
    }
}

impl Decoder<'static> {
    /// A decoder using the standard registry and default limits.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<'r> Decoder<'r> {
    /// A decoder using a custom logical type registry.
    pub fn with_registry(registry: &'r LogicalTypeRegistry) -> Self {
        Self {
            registry,
            config: ReaderConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ReaderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Decode one value from `source`, consuming exactly its bytes.
    pub fn read<S: ByteSource + ?Sized>(
        &self,
        source: &mut S,
        schema: &Schema,
    ) -> Result<Value, DecodeError> {
        ValueDecoder::new(schema.context(), self.registry, &self.config)
            .decode(source, schema.root())
    }

    /// Decode a value that must span all of `bytes`.
    pub fn from_slice(&self, schema: &Schema, bytes: &[u8]) -> Result<Value, DecodeError> {
        let mut cursor = bytes;
        let value = self.read(&mut cursor, schema)?;
        if !cursor.is_empty() {
            return Err(DecodeError::TrailingBytes(cursor.len()));
        }
        Ok(value)
    }
}

/// Decode one value from a sequential byte source.
///
/// The source advances past exactly the bytes of this value, so several
/// values written back to back can be read with repeated calls.
pub fn read<S: ByteSource + ?Sized>(source: &mut S, schema: &Schema) -> Result<Value, DecodeError> {
    Decoder::new().read(source, schema)
}

/// Decode a value from a buffer holding exactly one encoded value.
///
/// # Errors
/// `DecodeError::TrailingBytes` if bytes remain after the value.
pub fn from_slice(schema: &Schema, bytes: &[u8]) -> Result<Value, DecodeError> {
    Decoder::new().from_slice(schema, bytes)
}
