//! Binary encoding
//!
//! This module provides the schema-driven encoder: configuration, the
//! reusable [`Encoder`], and the [`write`] / [`to_vec`] entry points.
//! Output carries no framing, header or schema fingerprint; the reader
//! must be given the same schema.

pub mod encode;

use std::io::Write;

use crate::convert::LogicalTypeRegistry;
use crate::error::EncodeError;
use crate::reader::DEFAULT_MAX_DEPTH;
use crate::schema::Schema;
use crate::value::Value;

pub use encode::{
    encode_boolean, encode_bytes, encode_double, encode_float, encode_long, ValueEncoder,
};

/// Configuration for encoding.
///
/// The bytes written for a value never depend on these options; they only
/// decide what gets logged and when encoding gives up.
#[derive(Debug, Clone)]
pub struct WriterConfig {
    /// Emit a `tracing` warning when an integer beyond ±2^53 is written to
    /// a float or double node (default: false).
    pub warn_on_precision_loss: bool,
    /// Deepest chain of nested schema nodes (default: 512).
    pub max_depth: usize,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            warn_on_precision_loss: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl WriterConfig {
    /// Create a new WriterConfig with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the precision-loss warning.
    pub fn with_warn_on_precision_loss(mut self, warn: bool) -> Self {
        self.warn_on_precision_loss = warn;
        self
    }

    /// Set the deepest chain of nested schema nodes.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// A reusable encoder holding a logical type registry and configuration.
///
/// # Example
/// ```
/// use glider::{Encoder, Schema, Value, WriterConfig};
///
/// let schema: Schema = r#"["null", "double"]"#.parse().unwrap();
/// let encoder = Encoder::new().with_config(WriterConfig::new().with_warn_on_precision_loss(true));
///
/// let mut out = Vec::new();
/// encoder.write(&mut out, &schema, &Value::Null).unwrap();
/// assert_eq!(out, vec![0x00]);
/// ```
#[derive(Debug, Clone)]
pub struct Encoder<'r> {
    registry: &'r LogicalTypeRegistry,
    config: WriterConfig,
}

impl Default for Encoder<'static> {
    fn default() -> Self {
        Self {
            registry: LogicalTypeRegistry::standard(),
            config: WriterConfig::default(),
        }
    }
}

impl Encoder<'static> {
    /// An encoder using the standard registry.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<'r> Encoder<'r> {
    /// An encoder using a custom logical type registry.
    pub fn with_registry(registry: &'r LogicalTypeRegistry) -> Self {
        Self {
            registry,
            config: WriterConfig::default(),
        }
    }

    pub fn with_config(mut self, config: WriterConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &WriterConfig {
        &self.config
    }

    /// Append the encoding of `value` to `sink`.
    ///
    /// On failure the sink may already hold bytes for the parts of the
    /// value written before the error; discard them.
    pub fn write<W: Write + ?Sized>(
        &self,
        sink: &mut W,
        schema: &Schema,
        value: &Value,
    ) -> Result<(), EncodeError> {
        ValueEncoder::new(schema.context(), self.registry, &self.config).encode(
            sink,
            value,
            schema.root(),
        )
    }

    /// Encode `value` into a new buffer.
    pub fn to_vec(&self, schema: &Schema, value: &Value) -> Result<Vec<u8>, EncodeError> {
        let mut out = Vec::new();
        self.write(&mut out, schema, value)?;
        Ok(out)
    }
}

/// Append the encoding of `value` to `sink` using the standard registry.
pub fn write<W: Write + ?Sized>(
    sink: &mut W,
    schema: &Schema,
    value: &Value,
) -> Result<(), EncodeError> {
    Encoder::new().write(sink, schema, value)
}

/// Encode `value` into a new buffer using the standard registry.
pub fn to_vec(schema: &Schema, value: &Value) -> Result<Vec<u8>, EncodeError> {
    Encoder::new().to_vec(schema, value)
}
