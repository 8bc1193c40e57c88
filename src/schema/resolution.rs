//! Symbol table for named type references.
//!
//! Records, enums and fixed types are registered under their fully
//! qualified names. The encoder and decoder follow `Named` nodes through
//! this table lazily, which keeps recursive types finite.

use std::collections::HashMap;

use crate::error::SchemaError;
use crate::schema::AvroSchema;

/// A context for resolving named type references.
#[derive(Debug, Clone, Default)]
pub struct SchemaResolutionContext {
    /// Registry of named types by their fully qualified name
    named_types: HashMap<String, AvroSchema>,
}

impl SchemaResolutionContext {
    /// Create a new empty resolution context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a resolution context from a HashMap of named types.
    pub fn from_named_types(named_types: HashMap<String, AvroSchema>) -> Self {
        Self { named_types }
    }

    /// Register a named type in the context.
    pub fn register(&mut self, name: String, schema: AvroSchema) {
        self.named_types.insert(name, schema);
    }

    /// Get a named type from the context.
    pub fn get(&self, name: &str) -> Option<&AvroSchema> {
        self.named_types.get(name)
    }

    /// Check if a named type exists in the context.
    pub fn contains(&self, name: &str) -> bool {
        self.named_types.contains_key(name)
    }

    /// Number of registered named types.
    pub fn len(&self) -> usize {
        self.named_types.len()
    }

    /// Whether no named types are registered.
    pub fn is_empty(&self) -> bool {
        self.named_types.is_empty()
    }

    /// Build a resolution context by extracting all named types from a schema.
    pub fn build_from_schema(schema: &AvroSchema) -> Self {
        let mut context = Self::new();
        context.extract_named_types(schema);
        context
    }

    /// Follow `Named` references until a concrete node is reached.
    ///
    /// Returns `None` if a reference is missing from the table or the
    /// references form a cycle without a concrete definition.
    pub fn resolve<'a>(&'a self, schema: &'a AvroSchema) -> Option<&'a AvroSchema> {
        let mut current = schema;
        for _ in 0..=self.named_types.len() {
            match current {
                AvroSchema::Named(name) => current = self.named_types.get(name)?,
                concrete => return Some(concrete),
            }
        }
        None
    }

    /// Check that every `Named` reference reachable from `schema` is
    /// defined and that no union directly contains another union. Decimal
    /// parameters get the same checks the parser applies.
    pub fn validate(&self, schema: &AvroSchema) -> Result<(), SchemaError> {
        match schema {
            AvroSchema::Named(name) => match self.resolve(schema) {
                Some(_) => Ok(()),
                None => Err(SchemaError::UnresolvedReference(name.clone())),
            },
            AvroSchema::Record(record) => record
                .fields
                .iter()
                .try_for_each(|field| self.validate(&field.schema)),
            AvroSchema::Array(inner) | AvroSchema::Map(inner) => self.validate(inner),
            AvroSchema::Union(variants) => {
                for (i, variant) in variants.iter().enumerate() {
                    if matches!(self.resolve(variant), Some(AvroSchema::Union(_))) {
                        return Err(SchemaError::NestedUnion(i));
                    }
                    self.validate(variant)?;
                }
                Ok(())
            }
            AvroSchema::Logical(logical) => {
                logical.logical_type.validate()?;
                self.validate(&logical.base)
            }
            _ => Ok(()),
        }
    }

    /// Register every record, enum and fixed defined inside `schema`.
    fn extract_named_types(&mut self, schema: &AvroSchema) {
        if let Some(fullname) = schema.fullname().filter(|_| schema.is_named()) {
            self.named_types.insert(fullname, schema.clone());
        }
        match schema {
            AvroSchema::Record(record) => record
                .fields
                .iter()
                .for_each(|field| self.extract_named_types(&field.schema)),
            AvroSchema::Array(inner) | AvroSchema::Map(inner) => self.extract_named_types(inner),
            AvroSchema::Union(variants) => variants
                .iter()
                .for_each(|variant| self.extract_named_types(variant)),
            AvroSchema::Logical(logical) => {
                self.extract_named_types(&logical.base);
                // A reference to an annotated enum or fixed keeps the annotation
                if let Some(fullname) = logical.definition_name() {
                    self.named_types.insert(fullname, schema.clone());
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{
        EnumSchema, FieldSchema, FixedSchema, LogicalType, LogicalTypeName, RecordSchema,
    };

    #[test]
    fn test_build_context_collects_nested_definitions() {
        let kind = EnumSchema::new("Kind", vec!["A".to_string(), "B".to_string()]);
        let digest = FixedSchema::new("Digest", 4).with_namespace("io.blobs");
        let inner = RecordSchema::new(
            "Blob",
            vec![
                FieldSchema::new("kind", AvroSchema::Enum(kind)),
                FieldSchema::new(
                    "digests",
                    AvroSchema::Map(Box::new(AvroSchema::Fixed(digest))),
                ),
            ],
        )
        .with_namespace("io.store");
        let outer = RecordSchema::new(
            "Bucket",
            vec![FieldSchema::new(
                "blobs",
                AvroSchema::Array(Box::new(AvroSchema::Union(vec![
                    AvroSchema::Null,
                    AvroSchema::Record(inner),
                ]))),
            )],
        );

        let context = SchemaResolutionContext::build_from_schema(&AvroSchema::Record(outer));

        assert_eq!(context.len(), 4);
        for name in ["Bucket", "io.store.Blob", "Kind", "io.blobs.Digest"] {
            assert!(context.contains(name), "missing {}", name);
        }
        assert!(!context.contains("io.store.Kind"));
    }

    #[test]
    fn test_resolve_follows_named_reference() {
        let user = RecordSchema::new("User", vec![FieldSchema::new("name", AvroSchema::String)])
            .with_namespace("com.example");

        let mut context = SchemaResolutionContext::new();
        context.register("com.example.User".to_string(), AvroSchema::Record(user));

        let named_ref = AvroSchema::Named("com.example.User".to_string());
        match context.resolve(&named_ref) {
            Some(AvroSchema::Record(r)) => assert_eq!(r.name, "User"),
            other => panic!("Expected Record schema, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_cycle_of_references_is_none() {
        let mut context = SchemaResolutionContext::new();
        context.register("A".to_string(), AvroSchema::Named("B".to_string()));
        context.register("B".to_string(), AvroSchema::Named("A".to_string()));

        assert!(context.resolve(&AvroSchema::Named("A".to_string())).is_none());
    }

    #[test]
    fn test_validate_recursive_type() {
        let linked_list = AvroSchema::Record(RecordSchema::new(
            "LinkedList",
            vec![
                FieldSchema::new("value", AvroSchema::Int),
                FieldSchema::new(
                    "next",
                    AvroSchema::Union(vec![
                        AvroSchema::Null,
                        AvroSchema::Named("LinkedList".to_string()),
                    ]),
                ),
            ],
        ));

        let context = SchemaResolutionContext::build_from_schema(&linked_list);
        assert!(context.validate(&linked_list).is_ok());
    }

    #[test]
    fn test_validate_unresolved_reference() {
        let schema = AvroSchema::Array(Box::new(AvroSchema::Named("Ghost".to_string())));
        let context = SchemaResolutionContext::build_from_schema(&schema);

        assert!(matches!(
            context.validate(&schema),
            Err(SchemaError::UnresolvedReference(name)) if name == "Ghost"
        ));
    }

    #[test]
    fn test_annotated_fixed_registered_with_annotation() {
        let money = AvroSchema::Logical(LogicalType::new(
            AvroSchema::Fixed(FixedSchema::new("Money", 8)),
            LogicalTypeName::Decimal {
                precision: 18,
                scale: 2,
            },
        ));
        let schema = AvroSchema::Record(RecordSchema::new(
            "Ledger",
            vec![
                FieldSchema::new("debit", money.clone()),
                FieldSchema::new("credit", AvroSchema::Named("Money".to_string())),
            ],
        ));

        let context = SchemaResolutionContext::build_from_schema(&schema);
        assert_eq!(context.get("Money"), Some(&money));
        assert!(context.validate(&schema).is_ok());
    }

    #[test]
    fn test_validate_decimal_parameters() {
        let context = SchemaResolutionContext::new();
        let decimal = |precision, scale| {
            AvroSchema::Logical(LogicalType::new(
                AvroSchema::Bytes,
                LogicalTypeName::Decimal { precision, scale },
            ))
        };

        assert!(context.validate(&decimal(10, 4)).is_ok());
        assert!(context.validate(&decimal(4, 4)).is_ok());
        assert!(matches!(
            context.validate(&decimal(0, 0)),
            Err(SchemaError::InvalidLogicalType(_))
        ));
        assert!(matches!(
            context.validate(&decimal(2, 5)),
            Err(SchemaError::InvalidLogicalType(_))
        ));
    }

    #[test]
    fn test_validate_nested_union() {
        let schema = AvroSchema::Union(vec![
            AvroSchema::Null,
            AvroSchema::Union(vec![AvroSchema::Int, AvroSchema::Long]),
        ]);
        let context = SchemaResolutionContext::new();

        assert!(matches!(
            context.validate(&schema),
            Err(SchemaError::NestedUnion(1))
        ));
    }
}
