//! Property-based tests for the encoder and decoder.
//!
//! These tests use proptest to generate schemas, then values conforming to
//! each schema, and check properties that must hold for all of them.

use std::collections::VecDeque;

use proptest::prelude::*;

use glider::reader::varint::{decode_zigzag, write_zigzag, zigzag_decode, zigzag_encode};
use glider::schema::*;
use glider::{from_slice, read, to_vec, write, Value};

// ============================================================================
// Schema Generators
// ============================================================================

/// Generate arbitrary Avro primitive schemas.
fn arb_primitive_schema() -> impl Strategy<Value = AvroSchema> {
    prop_oneof![
        Just(AvroSchema::Null),
        Just(AvroSchema::Boolean),
        Just(AvroSchema::Int),
        Just(AvroSchema::Long),
        Just(AvroSchema::Float),
        Just(AvroSchema::Double),
        Just(AvroSchema::Bytes),
        Just(AvroSchema::String),
    ]
}

/// Generate valid Avro names (must start with [A-Za-z_] and contain only [A-Za-z0-9_]).
fn arb_avro_name() -> impl Strategy<Value = String> {
    "[A-Za-z_][A-Za-z0-9_]{0,15}"
}

/// Generate enum symbols (non-empty list of unique valid names).
fn arb_enum_symbols() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(arb_avro_name(), 1..5).prop_filter("symbols must be unique", |symbols| {
        let mut seen = std::collections::HashSet::new();
        symbols.iter().all(|s| seen.insert(s.clone()))
    })
}

/// Generate leaf schemas: primitives plus enum and fixed.
fn arb_leaf_schema() -> impl Strategy<Value = AvroSchema> {
    prop_oneof![
        4 => arb_primitive_schema(),
        1 => (arb_avro_name(), arb_enum_symbols())
            .prop_map(|(name, symbols)| AvroSchema::Enum(EnumSchema::new(name, symbols))),
        1 => (arb_avro_name(), 1usize..16)
            .prop_map(|(name, size)| AvroSchema::Fixed(FixedSchema::new(name, size))),
    ]
}

/// Generate field lists with unique names.
fn arb_fields(inner: BoxedStrategy<AvroSchema>) -> impl Strategy<Value = Vec<FieldSchema>> {
    prop::collection::vec((arb_avro_name(), inner), 1..4)
        .prop_filter("field names must be unique", |fields| {
            let mut seen = std::collections::HashSet::new();
            fields.iter().all(|(name, _)| seen.insert(name.clone()))
        })
        .prop_map(|fields| {
            fields
                .into_iter()
                .map(|(name, schema)| FieldSchema::new(name, schema))
                .collect()
        })
}

/// Generate schemas nesting arrays, maps, records and nullable unions.
///
/// Every named type is defined inline, so the tree never needs the symbol
/// table to encode.
fn arb_schema() -> impl Strategy<Value = AvroSchema> {
    arb_leaf_schema().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            inner
                .clone()
                .prop_map(|items| AvroSchema::Array(Box::new(items))),
            inner
                .clone()
                .prop_map(|values| AvroSchema::Map(Box::new(values))),
            (arb_avro_name(), arb_fields(inner.clone()))
                .prop_map(|(name, fields)| AvroSchema::Record(RecordSchema::new(name, fields))),
            inner
                .prop_filter("union branch must not be null or a union", |s| {
                    !matches!(s, AvroSchema::Null | AvroSchema::Union(_))
                })
                .prop_map(|branch| AvroSchema::Union(vec![AvroSchema::Null, branch])),
        ]
    })
}

/// Generate a value conforming to `schema`.
fn arb_value_for(schema: &AvroSchema) -> BoxedStrategy<Value> {
    match schema {
        AvroSchema::Null => Just(Value::Null).boxed(),
        AvroSchema::Boolean => any::<bool>().prop_map(Value::Boolean).boxed(),
        AvroSchema::Int => any::<i32>().prop_map(Value::Int).boxed(),
        AvroSchema::Long => any::<i64>().prop_map(Value::Long).boxed(),
        AvroSchema::Float => (-1.0e6f32..1.0e6f32).prop_map(Value::Float).boxed(),
        AvroSchema::Double => (-1.0e12f64..1.0e12f64).prop_map(Value::Double).boxed(),
        AvroSchema::Bytes => prop::collection::vec(any::<u8>(), 0..32)
            .prop_map(Value::Bytes)
            .boxed(),
        AvroSchema::String => ".{0,16}".prop_map(Value::String).boxed(),
        AvroSchema::Enum(e) => prop::sample::select(e.symbols.clone())
            .prop_map(Value::Enum)
            .boxed(),
        AvroSchema::Fixed(f) => prop::collection::vec(any::<u8>(), f.size)
            .prop_map(Value::Fixed)
            .boxed(),
        AvroSchema::Array(items) => prop::collection::vec(arb_value_for(items), 0..4)
            .prop_map(Value::Array)
            .boxed(),
        AvroSchema::Map(values) => {
            prop::collection::btree_map("[a-z]{0,6}", arb_value_for(values), 0..4)
                .prop_map(Value::Map)
                .boxed()
        }
        AvroSchema::Record(record) => {
            let fields: Vec<_> = record
                .fields
                .iter()
                .map(|field| {
                    let name = field.name.clone();
                    arb_value_for(&field.schema).prop_map(move |v| (name.clone(), v))
                })
                .collect();
            fields
                .prop_map(|pairs| Value::Record(pairs.into_iter().collect()))
                .boxed()
        }
        AvroSchema::Union(branches) => {
            prop::strategy::Union::new(branches.iter().map(arb_value_for)).boxed()
        }
        // Not produced by arb_schema
        AvroSchema::Named(_) | AvroSchema::Logical(_) => Just(Value::Null).boxed(),
    }
}

fn arb_schema_and_value() -> impl Strategy<Value = (Schema, Value)> {
    arb_schema().prop_flat_map(|root| {
        let value = arb_value_for(&root);
        let schema = Schema::new(root).expect("generated schema should validate");
        (Just(schema), value)
    })
}

// ============================================================================
// Round Trip Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Property: decoding the encoding of a conforming value yields the value.
    #[test]
    fn prop_round_trip((schema, value) in arb_schema_and_value()) {
        let bytes = to_vec(&schema, &value).expect("conforming value should encode");
        let decoded = from_slice(&schema, &bytes).expect("encoded bytes should decode");
        prop_assert_eq!(decoded, value);
    }

    /// Property: the decoder consumes exactly the bytes of one value.
    #[test]
    fn prop_back_to_back_values(
        (schema, first) in arb_schema_and_value(),
        trailer in any::<i64>(),
    ) {
        let long_schema: Schema = r#""long""#.parse().unwrap();
        let mut buffer = Vec::new();
        write(&mut buffer, &schema, &first).unwrap();
        write(&mut buffer, &long_schema, &Value::Long(trailer)).unwrap();

        let mut cursor = buffer.as_slice();
        prop_assert_eq!(read(&mut cursor, &schema).unwrap(), first);
        prop_assert_eq!(read(&mut cursor, &long_schema).unwrap(), Value::Long(trailer));
        prop_assert!(cursor.is_empty());
    }
}

// ============================================================================
// Varint Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Property: zig-zag is a bijection between i64 and u64.
    #[test]
    fn prop_zigzag_round_trip(n in any::<i64>()) {
        prop_assert_eq!(zigzag_decode(zigzag_encode(n)), n);

        let mut buffer = Vec::new();
        write_zigzag(&mut buffer, n).unwrap();
        prop_assert!(buffer.len() <= 10);
        let mut cursor = buffer.as_slice();
        prop_assert_eq!(decode_zigzag(&mut cursor).unwrap(), n);
        prop_assert!(cursor.is_empty());
    }

    /// Property: small magnitudes take a single byte.
    #[test]
    fn prop_small_values_single_byte(n in -64i64..64) {
        let mut buffer = Vec::new();
        write_zigzag(&mut buffer, n).unwrap();
        prop_assert_eq!(buffer.len(), 1);
    }
}

// ============================================================================
// Coercion Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: the bytes for an array do not depend on which ordered
    /// collection the items came from.
    #[test]
    fn prop_sequence_kind_independent(items in prop::collection::vec(any::<i32>(), 0..20)) {
        let schema: Schema = r#"{"type": "array", "items": "int"}"#.parse().unwrap();

        let from_vec = to_vec(&schema, &Value::array(items.clone())).unwrap();
        let deque: VecDeque<i32> = items.iter().copied().collect();
        let from_deque = to_vec(&schema, &Value::from(deque)).unwrap();
        let from_iter = to_vec(&schema, &items.iter().copied().collect::<Value>()).unwrap();

        prop_assert_eq!(&from_vec, &from_deque);
        prop_assert_eq!(&from_vec, &from_iter);
    }

    /// Property: an integer written to a union led by float decodes as a
    /// float, never as a long.
    #[test]
    fn prop_integer_selects_leading_float(n in any::<i64>()) {
        let schema: Schema = r#"["float", "long", "double", "int"]"#.parse().unwrap();
        let bytes = to_vec(&schema, &Value::Long(n)).unwrap();

        prop_assert_eq!(bytes[0], 0x00);
        prop_assert_eq!(bytes.len(), 5);
        prop_assert_eq!(from_slice(&schema, &bytes).unwrap(), Value::Float((n as f64) as f32));
    }

    /// Property: values within ±2^53 survive a double node exactly.
    #[test]
    fn prop_exact_integers_in_double(n in -(1i64 << 53)..=(1i64 << 53)) {
        let schema: Schema = r#""double""#.parse().unwrap();
        let decoded = from_slice(&schema, &to_vec(&schema, &Value::Long(n)).unwrap()).unwrap();
        prop_assert_eq!(decoded, Value::Double(n as f64));
    }
}
