//! Schemaless Avro binary encoding and decoding
//!
//! This library encodes native values to the Avro binary format and back,
//! driven entirely by a schema both sides already hold: no container
//! header, no sync markers, no schema fingerprint.
//!
//! # Example
//! ```
//! use glider::{from_slice, to_vec, Schema, Value};
//!
//! let schema: Schema = r#"{
//!     "type": "record",
//!     "name": "Reading",
//!     "fields": [
//!         {"name": "sensor", "type": "string"},
//!         {"name": "value", "type": ["null", "float", "double"]}
//!     ]
//! }"#
//! .parse()
//! .unwrap();
//!
//! let reading = Value::record([("sensor", Value::from("t1")), ("value", Value::Long(2))]);
//! let bytes = to_vec(&schema, &reading).unwrap();
//!
//! // The integer selected the float branch
//! let decoded = from_slice(&schema, &bytes).unwrap();
//! assert_eq!(
//!     decoded,
//!     Value::record([("sensor", Value::from("t1")), ("value", Value::Float(2.0))])
//! );
//! ```

pub mod convert;
pub mod error;
pub mod reader;
pub mod resolver;
pub mod schema;
pub mod source;
pub mod value;
pub mod writer;

// Re-export main types
pub use convert::{LogicalConverter, LogicalTypeRegistry};
pub use error::{DecodeError, EncodeError, Error, LogicalTypeError, ResolutionError, SchemaError};
pub use reader::{from_slice, read, Decoder, ReaderConfig};
pub use resolver::{branch_matches, resolve_branch};
pub use schema::{
    parse_schema, parse_schema_with_options, AvroSchema, EnumSchema, FieldSchema, FixedSchema,
    LogicalType, LogicalTypeName, PrimitiveKind, RecordSchema, Schema, SchemaParser,
    SchemaResolutionContext,
};
pub use source::{ByteSource, ReadSource};
pub use value::Value;
pub use writer::{to_vec, write, Encoder, WriterConfig};
