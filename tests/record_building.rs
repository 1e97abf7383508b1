//! Record building through the public API
//!
//! Schema text in, records out: defaults, promotions, type enforcement and
//! the absent-field contract.

use genrec::record::{RecordBuilder, RecordError};
use genrec::schema::{FieldType, Schema, SchemaError, Value};
use std::sync::Arc;

// =============================================================================
// Test Utilities
// =============================================================================

const MEASUREMENT: &str = r#"{
    "type": "record",
    "name": "Measurement",
    "namespace": "lab",
    "fields": [
        {"name": "count", "type": "long"},
        {"name": "ratio", "type": {"type": "double"}, "default": 1},
        {"name": "label", "type": "string", "default": "unlabelled"},
        {"name": "weight", "type": "float"}
    ]
}"#;

fn measurement() -> Arc<Schema> {
    Arc::new(MEASUREMENT.parse::<Schema>().expect("schema parses"))
}

// =============================================================================
// Defaults and promotion
// =============================================================================

#[test]
fn test_defaults_fill_unset_fields() {
    let schema = measurement();
    let mut builder = RecordBuilder::new(Arc::clone(&schema));
    builder.set("count", 3i64).unwrap().set("weight", 2.5f32).unwrap();
    let record = builder.build().unwrap();

    assert_eq!(record.get("ratio"), Some(&Value::Double(1.0)));
    assert_eq!(record.get("label"), Some(&Value::from("unlabelled")));
    assert_eq!(
        record.to_string(),
        r#"{"count": 3, "ratio": 1.0, "label": "unlabelled", "weight": 2.5}"#
    );
}

#[test]
fn test_int_promotes_to_long_and_float() {
    let schema = measurement();
    let mut builder = RecordBuilder::new(schema);
    builder.set("count", 7).unwrap().set("weight", 4).unwrap();
    let record = builder.build().unwrap();

    assert_eq!(record.get("count"), Some(&Value::Long(7)));
    assert_eq!(record.get("weight"), Some(&Value::Float(4.0)));
}

#[test]
fn test_builder_can_build_again_after_changes() {
    let schema = measurement();
    let mut builder = RecordBuilder::new(schema);
    builder.set("count", 1i64).unwrap().set("weight", 1.0f32).unwrap();
    let first = builder.build().unwrap();

    builder.set("label", "second").unwrap();
    let second = builder.build().unwrap();

    assert_eq!(first.get("label"), Some(&Value::from("unlabelled")));
    assert_eq!(second.get("label"), Some(&Value::from("second")));

    let copy = RecordBuilder::from_record(&second).build().unwrap();
    assert_eq!(copy, second);
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_missing_required_names_first_field_in_order() {
    let schema = measurement();
    let builder = RecordBuilder::new(schema);
    match builder.build() {
        Err(RecordError::MissingRequiredField { field }) => assert_eq!(field, "count"),
        other => panic!("expected missing field error, got {:?}", other),
    }
}

#[test]
fn test_type_mismatch_and_unknown_field() {
    let schema = measurement();
    let mut builder = RecordBuilder::new(schema);

    match builder.set("count", "three") {
        Err(RecordError::TypeMismatch { field, expected, actual }) => {
            assert_eq!(field, "count");
            assert_eq!(expected, FieldType::Long);
            assert_eq!(actual, FieldType::String);
        }
        other => panic!("expected type mismatch, got {:?}", other.map(|_| ())),
    }

    // Narrowing is not a promotion
    assert!(builder.set("weight", 1.5f64).is_err());

    let err = builder.set("not_here", 1).map(|_| ()).unwrap_err();
    assert_eq!(err.code(), "GENREC_RECORD_UNKNOWN_FIELD");
    assert!(!builder.has("count"));
}

#[test]
fn test_absent_field_is_not_an_error() {
    let schema = measurement();
    let mut builder = RecordBuilder::new(schema);
    builder.set("count", 1i64).unwrap().set("weight", 0.5f32).unwrap();
    let record = builder.build().unwrap();

    assert_eq!(record.get("not_here"), None);
    assert!(record.schema().field("not_here").is_none());
}

#[test]
fn test_invalid_schema_default_rejected() {
    let err = Schema::parse(
        r#"{"type": "record", "name": "Flag", "fields": [
            {"name": "on", "type": "boolean", "default": "yes"}
        ]}"#,
    )
    .unwrap_err();
    assert!(matches!(err, SchemaError::InvalidDefault { .. }));
    assert_eq!(err.code(), "GENREC_SCHEMA_INVALID_DEFAULT");
}
