//! Validated, immutable schema handed to the encoder and decoder.

use std::str::FromStr;

use tracing::debug;

use crate::error::SchemaError;
use crate::schema::{parse_schema, AvroSchema, SchemaResolutionContext};

/// A schema tree together with the symbol table of its named types.
///
/// Built once, then only borrowed. `Schema` is `Send + Sync`, so one
/// instance can be shared (for example behind an `Arc`) by encoders and
/// decoders running on different threads.
#[derive(Debug, Clone)]
pub struct Schema {
    root: AvroSchema,
    context: SchemaResolutionContext,
}

impl Schema {
    /// Validate a programmatically built tree.
    ///
    /// Named types defined anywhere in the tree are collected into the
    /// symbol table first, so references may point forward.
    pub fn new(root: AvroSchema) -> Result<Self, SchemaError> {
        let context = SchemaResolutionContext::build_from_schema(&root);
        Self::with_context(root, context)
    }

    /// Validate a tree against an existing symbol table.
    pub fn with_context(
        root: AvroSchema,
        context: SchemaResolutionContext,
    ) -> Result<Self, SchemaError> {
        context.validate(&root)?;
        debug!(
            root = %root.type_key(),
            named_types = context.len(),
            "Schema validated"
        );
        Ok(Self { root, context })
    }

    /// The root node.
    pub fn root(&self) -> &AvroSchema {
        &self.root
    }

    /// The symbol table of named types.
    pub fn context(&self) -> &SchemaResolutionContext {
        &self.context
    }

    /// Follow `Named` references from `node` to a concrete definition.
    pub fn resolve<'a>(&'a self, node: &'a AvroSchema) -> Option<&'a AvroSchema> {
        self.context.resolve(node)
    }
}

impl FromStr for Schema {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_schema(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldSchema, RecordSchema};

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_schema_is_shareable() {
        assert_send_sync::<Schema>();
    }

    #[test]
    fn test_forward_reference_in_programmatic_tree() {
        let root = AvroSchema::Record(RecordSchema::new(
            "Pair",
            vec![
                FieldSchema::new("first", AvroSchema::Named("Inner".to_string())),
                FieldSchema::new(
                    "second",
                    AvroSchema::Record(RecordSchema::new(
                        "Inner",
                        vec![FieldSchema::new("x", AvroSchema::Int)],
                    )),
                ),
            ],
        ));

        let schema = Schema::new(root).unwrap();
        let named = AvroSchema::Named("Inner".to_string());
        let inner = schema.resolve(&named);
        assert!(matches!(inner, Some(AvroSchema::Record(_))));
    }

    #[test]
    fn test_from_str() {
        let schema: Schema = r#"{"type": "map", "values": "double"}"#.parse().unwrap();
        assert_eq!(
            schema.root(),
            &AvroSchema::Map(Box::new(AvroSchema::Double))
        );
    }
}
