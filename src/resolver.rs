//! Union branch resolution.
//!
//! Branches are tried in declared order and the first compatible one wins.
//! There is no scoring and no backtracking, so the declared order alone
//! decides between overlapping branches. In particular every numeric
//! branch accepts every numeric value: with `["float", "long", "double",
//! "int"]` an integer selects `float`.

use tracing::trace;

use crate::convert::LogicalTypeRegistry;
use crate::error::ResolutionError;
use crate::schema::{AvroSchema, SchemaResolutionContext};
use crate::value::coerce;
use crate::value::Value;

/// Index of the first branch compatible with `value`.
///
/// # Example
/// ```
/// use glider::convert::LogicalTypeRegistry;
/// use glider::resolver::resolve_branch;
/// use glider::schema::{AvroSchema, SchemaResolutionContext};
/// use glider::Value;
///
/// let branches = [AvroSchema::Null, AvroSchema::Float, AvroSchema::Long];
/// let index = resolve_branch(
///     &Value::Long(2),
///     &branches,
///     &SchemaResolutionContext::new(),
///     LogicalTypeRegistry::standard(),
/// )
/// .unwrap();
/// assert_eq!(index, 1);
/// ```
pub fn resolve_branch(
    value: &Value,
    branches: &[AvroSchema],
    context: &SchemaResolutionContext,
    registry: &LogicalTypeRegistry,
) -> Result<usize, ResolutionError> {
    for (index, branch) in branches.iter().enumerate() {
        if branch_matches(value, branch, context, registry)? {
            trace!(
                index,
                branch = %branch.type_key(),
                value = value.kind_name(),
                "Union branch selected"
            );
            return Ok(index);
        }
    }

    Err(ResolutionError::NoMatchingBranch {
        found: value.kind_name(),
        branches: describe(branches),
    })
}

/// Whether `value` is compatible with a single branch.
///
/// A logical branch first checks for its native value (a `Value::Uuid`
/// for `{"type": "string", "logicalType": "uuid"}`), then falls back to
/// the rules of its base type.
pub fn branch_matches(
    value: &Value,
    branch: &AvroSchema,
    context: &SchemaResolutionContext,
    registry: &LogicalTypeRegistry,
) -> Result<bool, ResolutionError> {
    let branch = context.resolve(branch).ok_or_else(|| {
        ResolutionError::UnresolvedReference(branch.fullname().unwrap_or_default())
    })?;

    let matched = match branch {
        AvroSchema::Null => coerce::is_null(value),
        AvroSchema::Boolean => coerce::is_boolean(value),
        AvroSchema::Int | AvroSchema::Long | AvroSchema::Float | AvroSchema::Double => {
            coerce::is_numeric(value)
        }
        AvroSchema::String => coerce::is_text(value),
        AvroSchema::Bytes => coerce::is_bytes_like(value),
        AvroSchema::Fixed(fixed) => coerce::is_fixed_of(value, fixed.size),
        AvroSchema::Enum(enum_schema) => coerce::is_enum_symbol(value, enum_schema),
        AvroSchema::Array(_) => coerce::is_sequence(value),
        AvroSchema::Map(_) => coerce::is_mapping(value),
        AvroSchema::Record(record) => coerce::is_record_of(value, record),
        AvroSchema::Logical(logical) => {
            let native = registry
                .lookup(logical, context)
                .is_some_and(|(converter, _)| (converter.accepts)(value));
            native || branch_matches(value, &logical.base, context, registry)?
        }
        // Nested unions are rejected at schema construction and resolve()
        // never yields a Named node
        AvroSchema::Union(_) | AvroSchema::Named(_) => false,
    };

    Ok(matched)
}

fn describe(branches: &[AvroSchema]) -> String {
    let keys: Vec<String> = branches.iter().map(AvroSchema::type_key).collect();
    format!("[{}]", keys.join(", "))
}
