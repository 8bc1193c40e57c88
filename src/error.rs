//! Error types for schemaless encoding and decoding

use std::io;
use thiserror::Error;

/// Errors that can occur while building a schema tree
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Invalid schema format
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),
    /// Schema document is not valid JSON
    #[error("Parse error: {0}")]
    ParseError(String),
    /// A named type reference has no definition
    #[error("Unresolved named type reference: '{0}'")]
    UnresolvedReference(String),
    /// A union lists another union as one of its branches
    #[error("Union contains nested union at position {0} (unions cannot be nested)")]
    NestedUnion(usize),
    /// Logical type parameters are structurally invalid
    #[error("Invalid logical type: {0}")]
    InvalidLogicalType(#[from] LogicalTypeError),
}

/// Errors raised by logical type conversions
#[derive(Debug, Error)]
pub enum LogicalTypeError {
    /// Textual form could not be parsed
    #[error("Malformed {logical_type} value: {message}")]
    Malformed {
        logical_type: &'static str,
        message: String,
    },
    /// Unscaled decimal does not fit the declared fixed size
    #[error("Decimal needs {needed} bytes but fixed size is {size}")]
    DecimalOverflow { needed: usize, size: usize },
    /// Declared parameters are invalid
    #[error("Invalid parameters for {logical_type}: {message}")]
    InvalidParameters {
        logical_type: &'static str,
        message: String,
    },
    /// Value is outside the range the logical type can represent
    #[error("{logical_type} value out of range: {value}")]
    OutOfRange {
        logical_type: &'static str,
        value: i64,
    },
    /// Underlying value has the wrong primitive shape
    #[error("{logical_type} expects {expected}, found {found}")]
    UnexpectedUnderlying {
        logical_type: &'static str,
        expected: &'static str,
        found: &'static str,
    },
}

/// No union branch accepted the value being encoded
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// Every branch was tried and none matched
    #[error("No union branch matches {found} value (branches: {branches})")]
    NoMatchingBranch {
        found: &'static str,
        branches: String,
    },
    /// A branch names a type that is not in the symbol table
    #[error("Unresolved named type reference: '{0}'")]
    UnresolvedReference(String),
}

/// Errors that can occur during encoding
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Value is incompatible with its target schema node
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: String,
        found: &'static str,
    },
    /// Union branch selection failed
    #[error("Schema resolution error: {0}")]
    Resolution(#[from] ResolutionError),
    /// Logical type conversion failed
    #[error("Logical type error: {0}")]
    LogicalType(#[from] LogicalTypeError),
    /// Record value lacks a field that has no default and is not nullable
    #[error("Missing required field '{0}'")]
    MissingField(String),
    /// Integer value does not fit the target width
    #[error("Integer overflow: {value} does not fit in {target}")]
    IntegerOverflow { value: String, target: &'static str },
    /// Enum symbol is not declared by the schema
    #[error("Unknown enum symbol '{symbol}' for enum '{name}'")]
    UnknownEnumSymbol { symbol: String, name: String },
    /// Fixed value has the wrong length
    #[error("Fixed '{name}' expects {expected} bytes, found {found}")]
    FixedSizeMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
    /// A schema node names a type that is not in the symbol table
    #[error("Unresolved named type reference: '{0}'")]
    UnresolvedReference(String),
    /// Schema default could not be converted to a value
    #[error("Invalid default for field '{field}': {message}")]
    InvalidDefault { field: String, message: String },
    /// Value nests deeper than the configured limit
    #[error("Nesting depth exceeds limit {limit}")]
    DepthLimitExceeded { limit: usize },
    /// Sink write failed
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Errors that can occur during decoding
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Invalid Avro data
    #[error("Invalid data: {0}")]
    InvalidData(String),
    /// Unexpected end of data
    #[error("Unexpected end of input")]
    UnexpectedEof,
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Invalid varint encoding
    #[error("Invalid varint encoding")]
    InvalidVarint,
    /// String is not valid UTF-8
    #[error("Invalid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
    /// Union branch index outside the branch list
    #[error("Union index {index} out of range (0..{branches})")]
    UnionIndexOutOfRange { index: i64, branches: usize },
    /// Enum index outside the symbol list
    #[error("Enum index {index} out of range for enum '{name}' with {symbols} symbols")]
    EnumIndexOutOfRange {
        index: i64,
        name: String,
        symbols: usize,
    },
    /// Array or map block count is negative
    #[error("Negative block count: {0}")]
    NegativeBlockCount(i64),
    /// Length prefix or block count exceeds the configured limit
    #[error("Length {length} exceeds limit {limit}")]
    LengthLimitExceeded { length: u64, limit: usize },
    /// Input nests deeper than the configured limit
    #[error("Nesting depth exceeds limit {limit}")]
    DepthLimitExceeded { limit: usize },
    /// A schema node names a type that is not in the symbol table
    #[error("Unresolved named type reference: '{0}'")]
    UnresolvedReference(String),
    /// Logical type conversion failed
    #[error("Logical type error: {0}")]
    LogicalType(#[from] LogicalTypeError),
    /// Input continued past the end of the value
    #[error("{0} trailing bytes after value")]
    TrailingBytes(usize),
}

/// Top-level error type
#[derive(Debug, Error)]
pub enum Error {
    /// Schema construction error
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Encoding error
    #[error("Encode error: {0}")]
    Encode(#[from] EncodeError),

    /// Decoding error
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),
}
