//! Schema documents to schema trees.
//!
//! Builds the schema tree from a normalized JSON document, registering every
//! named type under its namespace-qualified name as it goes.

use std::collections::HashMap;

use serde_json::{Map, Value};
use tracing::warn;

use crate::error::{LogicalTypeError, SchemaError};
use crate::schema::{
    AvroSchema, EnumSchema, FieldSchema, FixedSchema, LogicalType, LogicalTypeName, RecordSchema,
    Schema, SchemaResolutionContext,
};

/// Parse a schema document in permissive mode.
///
/// # Example
/// ```
/// use glider::schema::parse_schema;
///
/// let schema = parse_schema(r#"{"type": "array", "items": "int"}"#).unwrap();
/// ```
pub fn parse_schema(json: &str) -> Result<Schema, SchemaError> {
    parse_schema_with_options(json, false)
}

/// Parse a schema document, choosing how minor violations are treated.
///
/// Duplicate union branches, malformed names and named types defined twice
/// fail when `strict` is set and are logged with `warn!` otherwise. Nested
/// unions and unresolved references always fail.
///
/// # Example
/// ```
/// use glider::schema::parse_schema_with_options;
///
/// let doc = r#"["int", "int"]"#;
/// assert!(parse_schema_with_options(doc, false).is_ok());
/// assert!(parse_schema_with_options(doc, true).is_err());
/// ```
pub fn parse_schema_with_options(json: &str, strict: bool) -> Result<Schema, SchemaError> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| SchemaError::ParseError(format!("Invalid JSON: {}", e)))?;

    SchemaParser::new().with_strict(strict).build(&value)
}

/// Stateful parser that collects named definitions while it walks a
/// document.
#[derive(Debug, Default)]
pub struct SchemaParser {
    named_types: HashMap<String, AvroSchema>,
    /// Namespace of the innermost enclosing definition
    current_namespace: Option<String>,
    strict_schema: bool,
}

impl SchemaParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_strict() -> Self {
        Self::new().with_strict(true)
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict_schema = strict;
        self
    }

    /// Parse a document and validate it into an immutable [`Schema`].
    ///
    /// Every `Named` reference in the tree must match a definition collected
    /// while parsing.
    pub fn build(mut self, value: &Value) -> Result<Schema, SchemaError> {
        let root = self.parse(value)?;
        let context = SchemaResolutionContext::from_named_types(self.named_types);
        Schema::with_context(root, context)
    }

    /// Parse a JSON value into an AvroSchema node.
    ///
    /// References to named types are returned as [`AvroSchema::Named`] and
    /// are not checked until [`SchemaParser::build`].
    pub fn parse(&mut self, value: &Value) -> Result<AvroSchema, SchemaError> {
        match value {
            Value::String(s) => Ok(self.parse_string_schema(s)),
            Value::Object(obj) => self.parse_object_schema(obj),
            Value::Array(arr) => self.parse_union_schema(arr),
            _ => Err(SchemaError::InvalidSchema(format!(
                "Expected string, object, or array, found: {}",
                value
            ))),
        }
    }

    /// Definitions collected so far, by fully qualified name.
    pub fn named_types(&self) -> &HashMap<String, AvroSchema> {
        &self.named_types
    }

    fn parse_string_schema(&self, s: &str) -> AvroSchema {
        match primitive_from_name(s) {
            Some(primitive) => primitive,
            None => AvroSchema::Named(self.resolve_name(s)),
        }
    }

    /// `{"type": ...}` forms, with an optional `logicalType`.
    fn parse_object_schema(&mut self, obj: &Map<String, Value>) -> Result<AvroSchema, SchemaError> {
        let type_value = obj
            .get("type")
            .ok_or_else(|| SchemaError::InvalidSchema("Missing 'type' field".to_string()))?;

        let type_str = match type_value {
            Value::String(s) => s.as_str(),
            // {"type": {...}} and {"type": [...]} wrap a nested schema
            nested @ (Value::Object(_) | Value::Array(_)) => return self.parse(nested),
            other => {
                return Err(SchemaError::InvalidSchema(format!(
                    "'type' must be a string, object, or array, found: {}",
                    other
                )))
            }
        };

        let base = match type_str {
            "record" | "error" => return self.parse_record_schema(obj),
            "enum" => self.parse_enum_schema(obj)?,
            "array" => self.parse_array_schema(obj)?,
            "map" => self.parse_map_schema(obj)?,
            "fixed" => self.parse_fixed_schema(obj)?,
            // Forward references are checked once the whole tree is built
            other => self.parse_string_schema(other),
        };

        let Some(logical_type) = obj.get("logicalType") else {
            return Ok(base);
        };
        let schema = self.parse_logical_type(obj, logical_type, base)?;

        // References to an annotated enum or fixed carry the annotation too
        if let AvroSchema::Logical(logical) = &schema {
            if let Some(fullname) = logical.definition_name() {
                self.named_types.insert(fullname, schema.clone());
            }
        }

        Ok(schema)
    }

    fn parse_union_schema(&mut self, arr: &[Value]) -> Result<AvroSchema, SchemaError> {
        if arr.is_empty() {
            return Err(SchemaError::InvalidSchema(
                "A union needs at least one branch".to_string(),
            ));
        }

        let variants = arr
            .iter()
            .map(|v| self.parse(v))
            .collect::<Result<Vec<_>, _>>()?;

        self.validate_union(&variants)?;

        Ok(AvroSchema::Union(variants))
    }

    fn parse_record_schema(&mut self, obj: &Map<String, Value>) -> Result<AvroSchema, SchemaError> {
        let (name, namespace, fullname) = self.named_header(obj, "Record")?;

        // Nested definitions inherit the record's namespace
        let prev_namespace = self.current_namespace.clone();
        if namespace.is_some() {
            self.current_namespace = namespace.clone();
        }

        // Register before parsing fields so recursive references resolve
        self.register(&fullname, AvroSchema::Named(fullname.clone()))?;

        let fields_value = obj
            .get("fields")
            .and_then(|v| v.as_array())
            .ok_or_else(|| {
                SchemaError::InvalidSchema("Record missing 'fields' array".to_string())
            })?;

        let fields = fields_value
            .iter()
            .map(|f| self.parse_field_schema(f))
            .collect::<Result<Vec<_>, _>>();

        self.current_namespace = prev_namespace;

        let record = RecordSchema {
            name,
            namespace,
            fields: fields?,
            doc: doc_of(obj),
        };

        let schema = AvroSchema::Record(record);
        self.named_types.insert(fullname, schema.clone());

        Ok(schema)
    }

    fn parse_field_schema(&mut self, value: &Value) -> Result<FieldSchema, SchemaError> {
        let obj = value
            .as_object()
            .ok_or_else(|| SchemaError::InvalidSchema("Field must be an object".to_string()))?;

        let name = obj
            .get("name")
            .and_then(|v| v.as_str())
            .ok_or_else(|| SchemaError::InvalidSchema("Field missing 'name'".to_string()))?
            .to_string();

        self.validate_name(&name, "Field")?;

        let type_value = obj
            .get("type")
            .ok_or_else(|| SchemaError::InvalidSchema("Field missing 'type'".to_string()))?;

        Ok(FieldSchema {
            name,
            schema: self.parse(type_value)?,
            default: obj.get("default").cloned(),
            doc: doc_of(obj),
        })
    }

    fn parse_enum_schema(&mut self, obj: &Map<String, Value>) -> Result<AvroSchema, SchemaError> {
        let (name, namespace, fullname) = self.named_header(obj, "Enum")?;

        let symbols = obj
            .get("symbols")
            .and_then(|v| v.as_array())
            .ok_or_else(|| SchemaError::InvalidSchema("Enum missing 'symbols' array".to_string()))?
            .iter()
            .map(|v| {
                v.as_str().map(String::from).ok_or_else(|| {
                    SchemaError::InvalidSchema(format!("Enum symbol must be a string: {}", v))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if symbols.is_empty() {
            return Err(SchemaError::InvalidSchema(
                "An enum needs at least one symbol".to_string(),
            ));
        }

        for symbol in &symbols {
            self.validate_name(symbol, "Enum symbol")?;
        }

        let schema = AvroSchema::Enum(EnumSchema {
            name,
            namespace,
            symbols,
            doc: doc_of(obj),
        });
        self.register(&fullname, schema.clone())?;

        Ok(schema)
    }

    fn parse_array_schema(&mut self, obj: &Map<String, Value>) -> Result<AvroSchema, SchemaError> {
        let items = obj
            .get("items")
            .ok_or_else(|| SchemaError::InvalidSchema("Array missing 'items' field".to_string()))?;

        Ok(AvroSchema::Array(Box::new(self.parse(items)?)))
    }

    fn parse_map_schema(&mut self, obj: &Map<String, Value>) -> Result<AvroSchema, SchemaError> {
        let values = obj
            .get("values")
            .ok_or_else(|| SchemaError::InvalidSchema("Map missing 'values' field".to_string()))?;

        Ok(AvroSchema::Map(Box::new(self.parse(values)?)))
    }

    fn parse_fixed_schema(&mut self, obj: &Map<String, Value>) -> Result<AvroSchema, SchemaError> {
        let (name, namespace, fullname) = self.named_header(obj, "Fixed")?;

        let size =
            obj.get("size").and_then(|v| v.as_u64()).ok_or_else(|| {
                SchemaError::InvalidSchema("Fixed missing 'size' field".to_string())
            })? as usize;

        let schema = AvroSchema::Fixed(FixedSchema {
            name,
            namespace,
            size,
            doc: doc_of(obj),
        });
        self.register(&fullname, schema.clone())?;

        Ok(schema)
    }

    /// Wrap a parsed base schema with its logical type annotation.
    ///
    /// Names without a registered converter are kept as
    /// [`LogicalTypeName::Other`] so the registry can decide at encode time.
    fn parse_logical_type(
        &mut self,
        obj: &Map<String, Value>,
        logical_type_value: &Value,
        base: AvroSchema,
    ) -> Result<AvroSchema, SchemaError> {
        let Some(logical_type_name) = logical_type_value.as_str() else {
            // Non-string annotations carry no meaning; keep the base type
            self.warn_or_fail(format!(
                "logicalType must be a string, found: {}",
                logical_type_value
            ))?;
            return Ok(base);
        };

        let logical_type = match logical_type_name {
            "decimal" => parse_decimal_params(obj)?,
            other => LogicalTypeName::from_name(other),
        };

        Ok(AvroSchema::Logical(LogicalType::new(base, logical_type)))
    }

    /// Read `name`/`namespace` from a named type definition and compute the
    /// fully qualified name.
    fn named_header(
        &self,
        obj: &Map<String, Value>,
        context: &str,
    ) -> Result<(String, Option<String>, String), SchemaError> {
        let raw_name = obj
            .get("name")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                SchemaError::InvalidSchema(format!("{} missing 'name' field", context))
            })?;

        let explicit_namespace = obj
            .get("namespace")
            .and_then(|v| v.as_str())
            .map(String::from);

        // A dotted name carries its own namespace and ignores the attribute
        let (name, namespace) = match raw_name.rsplit_once('.') {
            Some((ns, short)) => (short.to_string(), Some(ns.to_string())),
            None => (
                raw_name.to_string(),
                explicit_namespace.or_else(|| self.current_namespace.clone()),
            ),
        };

        self.validate_name(&name, context)?;

        let namespace = namespace.filter(|ns| !ns.is_empty());
        let fullname = match &namespace {
            Some(ns) => format!("{}.{}", ns, name),
            None => name.clone(),
        };

        Ok((name, namespace, fullname))
    }

    fn register(&mut self, fullname: &str, schema: AvroSchema) -> Result<(), SchemaError> {
        if self.named_types.contains_key(fullname) {
            self.warn_or_fail(format!("Named type '{}' is defined more than once", fullname))?;
        }
        self.named_types.insert(fullname.to_string(), schema);
        Ok(())
    }

    /// Qualify a bare reference with the enclosing namespace.
    fn resolve_name(&self, name: &str) -> String {
        match &self.current_namespace {
            Some(ns) if !name.contains('.') => format!("{}.{}", ns, name),
            _ => name.to_string(),
        }
    }

    /// Names match `[A-Za-z_][A-Za-z0-9_]*`.
    fn validate_name(&self, name: &str, context: &str) -> Result<(), SchemaError> {
        let mut chars = name.chars();
        let message = match chars.next() {
            None => Some(format!("{} name cannot be empty", context)),
            Some(first) if !first.is_ascii_alphabetic() && first != '_' => Some(format!(
                "{} name '{}' must begin with a letter or underscore",
                context, name
            )),
            Some(_) => chars
                .find(|ch| !ch.is_ascii_alphanumeric() && *ch != '_')
                .map(|ch| {
                    format!(
                        "{} name '{}' has invalid character '{}'",
                        context, name, ch
                    )
                }),
        };

        match message {
            Some(msg) => self.warn_or_fail(msg),
            None => Ok(()),
        }
    }

    /// Nested unions are always rejected; duplicate branches go through
    /// `warn_or_fail`.
    fn validate_union(&self, variants: &[AvroSchema]) -> Result<(), SchemaError> {
        if let Some(position) = variants
            .iter()
            .position(|v| matches!(v, AvroSchema::Union(_)))
        {
            return Err(SchemaError::NestedUnion(position));
        }

        let mut seen_types = std::collections::HashSet::new();
        for (i, variant) in variants.iter().enumerate() {
            let type_key = variant.type_key();
            if !seen_types.insert(type_key.clone()) {
                self.warn_or_fail(format!(
                    "Duplicate union branch '{}' at position {}",
                    type_key, i
                ))?;
            }
        }

        Ok(())
    }

    fn warn_or_fail(&self, msg: String) -> Result<(), SchemaError> {
        if self.strict_schema {
            Err(SchemaError::InvalidSchema(msg))
        } else {
            warn!("{}", msg);
            Ok(())
        }
    }
}

fn primitive_from_name(name: &str) -> Option<AvroSchema> {
    match name {
        "null" => Some(AvroSchema::Null),
        "boolean" => Some(AvroSchema::Boolean),
        "int" => Some(AvroSchema::Int),
        "long" => Some(AvroSchema::Long),
        "float" => Some(AvroSchema::Float),
        "double" => Some(AvroSchema::Double),
        "bytes" => Some(AvroSchema::Bytes),
        "string" => Some(AvroSchema::String),
        _ => None,
    }
}

fn doc_of(obj: &Map<String, Value>) -> Option<String> {
    obj.get("doc").and_then(|v| v.as_str()).map(String::from)
}

/// Read decimal `precision` and `scale`.
///
/// Precision must be a positive integer. Scale defaults to zero and must be
/// a non-negative integer no greater than precision.
fn parse_decimal_params(obj: &Map<String, Value>) -> Result<LogicalTypeName, SchemaError> {
    let invalid = |message: String| {
        SchemaError::InvalidLogicalType(LogicalTypeError::InvalidParameters {
            logical_type: "decimal",
            message,
        })
    };

    let precision = match obj.get("precision") {
        Some(v) => v
            .as_u64()
            .filter(|p| *p > 0 && *p <= u32::MAX as u64)
            .ok_or_else(|| invalid(format!("precision must be a positive integer, got {}", v)))?
            as u32,
        None => return Err(invalid("missing 'precision'".to_string())),
    };

    let scale = match obj.get("scale") {
        Some(v) => v
            .as_u64()
            .filter(|s| *s <= u32::MAX as u64)
            .ok_or_else(|| invalid(format!("scale must be a non-negative integer, got {}", v)))?
            as u32,
        None => 0,
    };

    let decimal = LogicalTypeName::Decimal { precision, scale };
    decimal.validate()?;
    Ok(decimal)
}
