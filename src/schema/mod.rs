//! Avro schema model.
//!
//! This module defines the schema node types, parsing from normalized JSON
//! documents, the named type symbol table, and the validated [`Schema`]
//! that encoding and decoding operate on.

mod parser;
mod resolution;
mod tree;
mod types;

pub use parser::{parse_schema, parse_schema_with_options, SchemaParser};
pub use resolution::SchemaResolutionContext;
pub use tree::Schema;
pub use types::*;
