//! Logical type registry
//!
//! Logical types reinterpret a primitive as a richer native value. Each
//! conversion is registered under the underlying primitive kind and the
//! logical type name, so the byte grammar in `reader` and `writer` never
//! inspects logical types itself.
//!
//! # Example
//! ```
//! use glider::convert::LogicalTypeRegistry;
//! use glider::schema::PrimitiveKind;
//!
//! let registry = LogicalTypeRegistry::standard();
//! assert!(registry.get(PrimitiveKind::String, "uuid").is_some());
//! assert!(registry.get(PrimitiveKind::Long, "uuid").is_none());
//! ```

mod decimal;
mod temporal;
mod uuid;

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use crate::error::LogicalTypeError;
use crate::schema::{AvroSchema, LogicalType, LogicalTypeName, SchemaResolutionContext};
use crate::value::Value;

pub use crate::schema::PrimitiveKind;

/// Whether a value is the native form a converter handles.
pub type AcceptsFn = fn(&Value) -> bool;

/// Native value to underlying primitive value. The schema argument is the
/// resolved base node.
pub type EncodeFn = fn(&Value, &LogicalTypeName, &AvroSchema) -> Result<Value, LogicalTypeError>;

/// Underlying primitive value to native value.
pub type DecodeFn = fn(Value, &LogicalTypeName, &AvroSchema) -> Result<Value, LogicalTypeError>;

/// A bidirectional conversion for one `(primitive kind, logical name)` pair.
#[derive(Clone, Copy)]
pub struct LogicalConverter {
    pub accepts: AcceptsFn,
    pub encode: EncodeFn,
    pub decode: DecodeFn,
}

impl LogicalConverter {
    pub fn new(accepts: AcceptsFn, encode: EncodeFn, decode: DecodeFn) -> Self {
        Self {
            accepts,
            encode,
            decode,
        }
    }
}

impl fmt::Debug for LogicalConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogicalConverter").finish_non_exhaustive()
    }
}

/// Conversions keyed by underlying primitive kind, then logical type name.
#[derive(Debug, Clone, Default)]
pub struct LogicalTypeRegistry {
    converters: HashMap<PrimitiveKind, HashMap<String, LogicalConverter>>,
}

impl LogicalTypeRegistry {
    /// An empty registry. Every logical type passes through unchanged.
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared registry of built-in conversions.
    ///
    /// Built on first use and never mutated afterwards.
    pub fn standard() -> &'static LogicalTypeRegistry {
        static STANDARD: OnceLock<LogicalTypeRegistry> = OnceLock::new();
        STANDARD.get_or_init(Self::with_builtins)
    }

    /// A fresh registry holding the built-in conversions, to extend with
    /// [`register`](Self::register).
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        uuid::register(&mut registry);
        decimal::register(&mut registry);
        temporal::register(&mut registry);
        registry
    }

    /// Register a conversion, returning the one it replaces.
    pub fn register(
        &mut self,
        kind: PrimitiveKind,
        name: impl Into<String>,
        converter: LogicalConverter,
    ) -> Option<LogicalConverter> {
        self.converters
            .entry(kind)
            .or_default()
            .insert(name.into(), converter)
    }

    pub fn get(&self, kind: PrimitiveKind, name: &str) -> Option<&LogicalConverter> {
        self.converters.get(&kind)?.get(name)
    }

    /// Find the conversion for a logical node together with its resolved
    /// base. `None` means the node behaves as its base type.
    pub fn lookup<'a>(
        &'a self,
        logical: &'a LogicalType,
        context: &'a SchemaResolutionContext,
    ) -> Option<(&'a LogicalConverter, &'a AvroSchema)> {
        let base = context.resolve(&logical.base)?;
        let converter = self.get(base.primitive_kind()?, logical.logical_type.name())?;
        Some((converter, base))
    }

    /// Number of registered conversions.
    pub fn len(&self) -> usize {
        self.converters.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub(crate) fn unexpected(
    logical_type: &'static str,
    expected: &'static str,
    found: &Value,
) -> LogicalTypeError {
    LogicalTypeError::UnexpectedUnderlying {
        logical_type,
        expected,
        found: found.kind_name(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FixedSchema;

    #[test]
    fn test_standard_registry_keys() {
        let registry = LogicalTypeRegistry::standard();

        for (kind, name) in [
            (PrimitiveKind::String, "uuid"),
            (PrimitiveKind::Fixed, "uuid"),
            (PrimitiveKind::Bytes, "decimal"),
            (PrimitiveKind::Fixed, "decimal"),
            (PrimitiveKind::Int, "date"),
            (PrimitiveKind::Int, "time-millis"),
            (PrimitiveKind::Long, "time-micros"),
            (PrimitiveKind::Long, "timestamp-millis"),
            (PrimitiveKind::Long, "timestamp-micros"),
            (PrimitiveKind::Long, "local-timestamp-millis"),
            (PrimitiveKind::Long, "local-timestamp-micros"),
        ] {
            assert!(registry.get(kind, name).is_some(), "{:?}/{}", kind, name);
        }
        assert_eq!(registry.len(), 11);
        assert!(registry.get(PrimitiveKind::Int, "timestamp-micros").is_none());
    }

    #[test]
    fn test_lookup_resolves_named_base() {
        let mut context = SchemaResolutionContext::new();
        context.register(
            "Id".to_string(),
            AvroSchema::Fixed(FixedSchema::new("Id", 16)),
        );
        let logical = LogicalType::new(AvroSchema::Named("Id".to_string()), LogicalTypeName::Uuid);

        let (_, base) = LogicalTypeRegistry::standard()
            .lookup(&logical, &context)
            .unwrap();
        assert!(matches!(base, AvroSchema::Fixed(f) if f.size == 16));
    }

    #[test]
    fn test_unknown_name_has_no_conversion() {
        let logical = LogicalType::new(
            AvroSchema::String,
            LogicalTypeName::Other("color".to_string()),
        );
        let context = SchemaResolutionContext::new();
        assert!(LogicalTypeRegistry::standard()
            .lookup(&logical, &context)
            .is_none());
    }

    #[test]
    fn test_register_custom_conversion() {
        fn accepts(value: &Value) -> bool {
            matches!(value, Value::Boolean(_))
        }
        fn encode(
            value: &Value,
            _: &LogicalTypeName,
            _: &AvroSchema,
        ) -> Result<Value, LogicalTypeError> {
            match value {
                Value::Boolean(b) => Ok(Value::String(if *b { "yes" } else { "no" }.to_string())),
                other => Err(unexpected("yes-no", "boolean", other)),
            }
        }
        fn decode(
            value: Value,
            _: &LogicalTypeName,
            _: &AvroSchema,
        ) -> Result<Value, LogicalTypeError> {
            match value {
                Value::String(s) => Ok(Value::Boolean(s == "yes")),
                other => Err(unexpected("yes-no", "string", &other)),
            }
        }

        let mut registry = LogicalTypeRegistry::with_builtins();
        let previous = registry.register(
            PrimitiveKind::String,
            "yes-no",
            LogicalConverter::new(accepts, encode, decode),
        );
        assert!(previous.is_none());

        let converter = registry.get(PrimitiveKind::String, "yes-no").unwrap();
        let name = LogicalTypeName::Other("yes-no".to_string());
        let encoded =
            (converter.encode)(&Value::Boolean(true), &name, &AvroSchema::String).unwrap();
        assert_eq!(encoded, Value::String("yes".to_string()));
        assert_eq!(
            (converter.decode)(encoded, &name, &AvroSchema::String).unwrap(),
            Value::Boolean(true)
        );
    }
}
