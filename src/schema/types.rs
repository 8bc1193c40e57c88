//! Avro schema node types.
//!
//! This module defines the schema tree used by the encoder and decoder:
//! primitives, named complex types, containers, unions and logical type
//! wrappers. Nodes are built once and never mutated afterwards.

use serde_json::{json, Map, Value};

use crate::error::LogicalTypeError;

/// One node of a schema tree.
///
/// Named types appear inline at their definition and as [`AvroSchema::Named`]
/// everywhere else, so recursive schemas stay finite.
#[derive(Debug, Clone, PartialEq)]
pub enum AvroSchema {
    Null,
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Bytes,
    String,

    /// Fields are written in declaration order with no tags.
    Record(RecordSchema),
    Enum(EnumSchema),
    Array(Box<AvroSchema>),
    /// Keys are always strings.
    Map(Box<AvroSchema>),
    /// Branch order decides which branch a value selects.
    Union(Vec<AvroSchema>),
    Fixed(FixedSchema),

    /// Fully qualified name of a record, enum or fixed defined elsewhere.
    Named(String),

    /// A base node carrying a `logicalType` annotation.
    Logical(LogicalType),
}

/// The underlying primitive shape a logical type is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Null,
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Bytes,
    String,
    Fixed,
}

impl PrimitiveKind {
    /// Avro type name for this kind.
    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveKind::Null => "null",
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
            PrimitiveKind::Bytes => "bytes",
            PrimitiveKind::String => "string",
            PrimitiveKind::Fixed => "fixed",
        }
    }
}

/// A record definition.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSchema {
    pub name: String,
    pub namespace: Option<String>,
    /// In wire order.
    pub fields: Vec<FieldSchema>,
    pub doc: Option<String>,
}

impl RecordSchema {
    pub fn new(name: impl Into<String>, fields: Vec<FieldSchema>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            fields,
            doc: None,
        }
    }

    /// Set the namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Set the documentation.
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// `namespace.name`, or just `name` without a namespace.
    pub fn fullname(&self) -> String {
        qualify(&self.namespace, &self.name)
    }

    /// Field declared under `name`, if any.
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    fn to_json_value(&self) -> Value {
        let mut obj = named_header("record", &self.name, &self.namespace, &self.doc);
        let fields: Vec<Value> = self.fields.iter().map(|f| f.to_json_value()).collect();
        obj.insert("fields".to_string(), Value::Array(fields));
        Value::Object(obj)
    }
}

/// A record field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSchema {
    pub name: String,
    pub schema: AvroSchema,
    /// JSON default, converted against `schema` when a record value omits
    /// the field.
    pub default: Option<Value>,
    pub doc: Option<String>,
}

impl FieldSchema {
    pub fn new(name: impl Into<String>, schema: AvroSchema) -> Self {
        Self {
            name: name.into(),
            schema,
            default: None,
            doc: None,
        }
    }

    /// Attach a JSON default.
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    fn to_json_value(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("name".to_string(), json!(&self.name));
        obj.insert("type".to_string(), self.schema.to_json_value());
        if let Some(default) = &self.default {
            obj.insert("default".to_string(), default.clone());
        }
        if let Some(doc) = &self.doc {
            obj.insert("doc".to_string(), json!(doc));
        }
        Value::Object(obj)
    }
}

/// An enum definition.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumSchema {
    pub name: String,
    pub namespace: Option<String>,
    /// A symbol is written as its position in this list.
    pub symbols: Vec<String>,
    pub doc: Option<String>,
}

impl EnumSchema {
    pub fn new(name: impl Into<String>, symbols: Vec<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            symbols,
            doc: None,
        }
    }

    /// Set the namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn fullname(&self) -> String {
        qualify(&self.namespace, &self.name)
    }

    /// Wire index of `symbol`.
    pub fn symbol_index(&self, symbol: &str) -> Option<usize> {
        self.symbols.iter().position(|s| s == symbol)
    }

    fn to_json_value(&self) -> Value {
        let mut obj = named_header("enum", &self.name, &self.namespace, &self.doc);
        obj.insert("symbols".to_string(), json!(&self.symbols));
        Value::Object(obj)
    }
}

/// A fixed definition: exactly `size` raw bytes, no length prefix.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedSchema {
    pub name: String,
    pub namespace: Option<String>,
    pub size: usize,
    pub doc: Option<String>,
}

impl FixedSchema {
    pub fn new(name: impl Into<String>, size: usize) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            size,
            doc: None,
        }
    }

    /// Set the namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn fullname(&self) -> String {
        qualify(&self.namespace, &self.name)
    }

    fn to_json_value(&self) -> Value {
        let mut obj = named_header("fixed", &self.name, &self.namespace, &self.doc);
        obj.insert("size".to_string(), json!(self.size));
        Value::Object(obj)
    }
}

/// A `logicalType` annotation over the node that defines its bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalType {
    pub base: Box<AvroSchema>,
    pub logical_type: LogicalTypeName,
}

impl LogicalType {
    pub fn new(base: AvroSchema, logical_type: LogicalTypeName) -> Self {
        Self {
            base: Box::new(base),
            logical_type,
        }
    }

    /// Declared size of a fixed base, if the base is fixed.
    pub fn fixed_size(&self) -> Option<usize> {
        match &*self.base {
            AvroSchema::Fixed(fixed) => Some(fixed.size),
            _ => None,
        }
    }

    /// Fully qualified name of an annotated enum or fixed definition.
    pub fn definition_name(&self) -> Option<String> {
        self.base.fullname().filter(|_| self.base.is_named())
    }

    /// Serialize the logical type as its base type plus `logicalType`
    /// and any type-specific parameters.
    fn to_json_value(&self) -> Value {
        let mut obj = match self.base.to_json_value() {
            Value::Object(m) => m,
            other => {
                let mut m = Map::new();
                m.insert("type".to_string(), other);
                m
            }
        };

        obj.insert("logicalType".to_string(), json!(self.logical_type.name()));

        if let LogicalTypeName::Decimal { precision, scale } = &self.logical_type {
            obj.insert("precision".to_string(), json!(precision));
            if *scale > 0 {
                obj.insert("scale".to_string(), json!(scale));
            }
        }

        Value::Object(obj)
    }
}

/// Logical type names. Only `decimal` carries parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum LogicalTypeName {
    Decimal { precision: u32, scale: u32 },
    Uuid,
    /// Days since 1970-01-01.
    Date,
    TimeMillis,
    TimeMicros,
    TimestampMillis,
    TimestampMicros,
    LocalTimestampMillis,
    LocalTimestampMicros,
    /// Any other name; resolved against the registry at encode time.
    Other(String),
}

impl LogicalTypeName {
    /// The `logicalType` attribute value.
    pub fn name(&self) -> &str {
        match self {
            LogicalTypeName::Decimal { .. } => "decimal",
            LogicalTypeName::Uuid => "uuid",
            LogicalTypeName::Date => "date",
            LogicalTypeName::TimeMillis => "time-millis",
            LogicalTypeName::TimeMicros => "time-micros",
            LogicalTypeName::TimestampMillis => "timestamp-millis",
            LogicalTypeName::TimestampMicros => "timestamp-micros",
            LogicalTypeName::LocalTimestampMillis => "local-timestamp-millis",
            LogicalTypeName::LocalTimestampMicros => "local-timestamp-micros",
            LogicalTypeName::Other(name) => name,
        }
    }

    /// Check parameters the type system cannot rule out: decimal precision
    /// must be positive and scale no greater than precision.
    pub fn validate(&self) -> Result<(), LogicalTypeError> {
        let LogicalTypeName::Decimal { precision, scale } = self else {
            return Ok(());
        };
        let message = if *precision == 0 {
            "precision must be a positive integer, got 0".to_string()
        } else if scale > precision {
            format!("scale {} exceeds precision {}", scale, precision)
        } else {
            return Ok(());
        };
        Err(LogicalTypeError::InvalidParameters {
            logical_type: "decimal",
            message,
        })
    }

    /// Map a `logicalType` attribute to its name. Decimal parameters are
    /// read separately by the parser.
    pub fn from_name(name: &str) -> Self {
        match name {
            "uuid" => LogicalTypeName::Uuid,
            "date" => LogicalTypeName::Date,
            "time-millis" => LogicalTypeName::TimeMillis,
            "time-micros" => LogicalTypeName::TimeMicros,
            "timestamp-millis" => LogicalTypeName::TimestampMillis,
            "timestamp-micros" => LogicalTypeName::TimestampMicros,
            "local-timestamp-millis" => LogicalTypeName::LocalTimestampMillis,
            "local-timestamp-micros" => LogicalTypeName::LocalTimestampMicros,
            other => LogicalTypeName::Other(other.to_string()),
        }
    }
}

impl AvroSchema {
    /// True for the eight unnamed primitives.
    pub fn is_primitive(&self) -> bool {
        self.primitive_kind().is_some() && !matches!(self, AvroSchema::Fixed(_))
    }

    /// The primitive kind of this node, if it has one.
    ///
    /// `fixed` counts as a primitive kind because logical types attach to it.
    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        match self {
            AvroSchema::Null => Some(PrimitiveKind::Null),
            AvroSchema::Boolean => Some(PrimitiveKind::Boolean),
            AvroSchema::Int => Some(PrimitiveKind::Int),
            AvroSchema::Long => Some(PrimitiveKind::Long),
            AvroSchema::Float => Some(PrimitiveKind::Float),
            AvroSchema::Double => Some(PrimitiveKind::Double),
            AvroSchema::Bytes => Some(PrimitiveKind::Bytes),
            AvroSchema::String => Some(PrimitiveKind::String),
            AvroSchema::Fixed(_) => Some(PrimitiveKind::Fixed),
            _ => None,
        }
    }

    /// True for record, enum and fixed definitions.
    pub fn is_named(&self) -> bool {
        matches!(
            self,
            AvroSchema::Record(_) | AvroSchema::Enum(_) | AvroSchema::Fixed(_)
        )
    }

    /// Fully qualified name of a definition or reference.
    pub fn fullname(&self) -> Option<String> {
        match self {
            AvroSchema::Record(r) => Some(r.fullname()),
            AvroSchema::Enum(e) => Some(e.fullname()),
            AvroSchema::Fixed(f) => Some(f.fullname()),
            AvroSchema::Named(n) => Some(n.clone()),
            _ => None,
        }
    }

    /// True for a union with a `null` branch.
    pub fn is_nullable(&self) -> bool {
        match self {
            AvroSchema::Union(variants) => variants.iter().any(|v| matches!(v, AvroSchema::Null)),
            _ => false,
        }
    }

    /// Short key identifying the node's type, used for duplicate detection
    /// and error messages.
    pub fn type_key(&self) -> String {
        match self {
            AvroSchema::Array(_) => "array".to_string(),
            AvroSchema::Map(_) => "map".to_string(),
            AvroSchema::Record(r) => format!("record:{}", r.fullname()),
            AvroSchema::Enum(e) => format!("enum:{}", e.fullname()),
            AvroSchema::Fixed(f) => format!("fixed:{}", f.fullname()),
            AvroSchema::Named(n) => format!("named:{}", n),
            AvroSchema::Union(_) => "union".to_string(),
            AvroSchema::Logical(lt) => {
                format!("{}:{}", lt.base.type_key(), lt.logical_type.name())
            }
            other => other
                .primitive_kind()
                .map(|k| k.name().to_string())
                .unwrap_or_default(),
        }
    }

    /// Render the schema as a JSON document that parses back to an equal
    /// tree.
    ///
    /// # Example
    /// ```
    /// use glider::schema::AvroSchema;
    ///
    /// let schema = AvroSchema::String;
    /// assert_eq!(schema.to_json(), r#""string""#);
    /// ```
    pub fn to_json(&self) -> String {
        self.to_json_value().to_string()
    }

    pub fn to_json_value(&self) -> Value {
        match self {
            AvroSchema::Record(r) => r.to_json_value(),
            AvroSchema::Enum(e) => e.to_json_value(),
            AvroSchema::Fixed(f) => f.to_json_value(),
            AvroSchema::Array(items) => json!({
                "type": "array",
                "items": items.to_json_value()
            }),
            AvroSchema::Map(values) => json!({
                "type": "map",
                "values": values.to_json_value()
            }),
            AvroSchema::Union(variants) => {
                Value::Array(variants.iter().map(|v| v.to_json_value()).collect())
            }
            AvroSchema::Named(name) => json!(name),
            AvroSchema::Logical(lt) => lt.to_json_value(),
            primitive => json!(primitive
                .primitive_kind()
                .map(|k| k.name())
                .unwrap_or("null")),
        }
    }
}

fn qualify(namespace: &Option<String>, name: &str) -> String {
    match namespace {
        Some(ns) if !ns.is_empty() => format!("{}.{}", ns, name),
        _ => name.to_string(),
    }
}

fn named_header(
    kind: &str,
    name: &str,
    namespace: &Option<String>,
    doc: &Option<String>,
) -> Map<String, Value> {
    let mut obj = Map::new();
    obj.insert("type".to_string(), json!(kind));
    obj.insert("name".to_string(), json!(name));
    if let Some(ns) = namespace {
        obj.insert("namespace".to_string(), json!(ns));
    }
    if let Some(doc) = doc {
        obj.insert("doc".to_string(), json!(doc));
    }
    obj
}
