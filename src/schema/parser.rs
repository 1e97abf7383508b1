//! Schema text parsing and canonical rendering
//!
//! Schema text is a JSON record declaration:
//!
//! ```json
//! {
//!   "type": "record",
//!   "namespace": "com.example",
//!   "name": "Customer",
//!   "doc": "optional",
//!   "fields": [
//!     { "name": "first_name", "type": "string", "doc": "First Name" },
//!     { "name": "automated_email", "type": "boolean", "default": true }
//!   ]
//! }
//! ```
//!
//! A field type is either a bare tag (`"int"`) or an object carrying the tag
//! (`{"type": "int"}`). Unrecognized attributes are ignored.

use serde::{Deserialize, Deserializer};
use serde_json::{json, Map, Value as Json};

use super::errors::{SchemaError, SchemaResult};
use super::types::{Field, FieldType, Schema};
use super::value::{bytes_to_latin1, latin1_to_bytes, Value};

#[derive(Debug, Deserialize)]
struct SchemaDocument {
    #[serde(rename = "type")]
    kind: String,
    name: String,
    #[serde(default)]
    namespace: Option<String>,
    #[serde(default)]
    doc: Option<String>,
    fields: Vec<FieldDocument>,
}

#[derive(Debug, Deserialize)]
struct FieldDocument {
    name: String,
    #[serde(rename = "type")]
    field_type: Json,
    #[serde(default)]
    doc: Option<String>,
    #[serde(default, deserialize_with = "present")]
    default: Option<Json>,
}

/// Distinguishes `"default": null` (Some(Null)) from an absent key (None).
fn present<'de, D>(deserializer: D) -> Result<Option<Json>, D::Error>
where
    D: Deserializer<'de>,
{
    Json::deserialize(deserializer).map(Some)
}

/// Parses schema JSON text into a `Schema`.
///
/// # Errors
///
/// - `Syntax` for malformed JSON, a missing or mistyped attribute, a
///   top-level type other than "record", or an invalid name
/// - `UnknownType` for an unrecognized field type tag
/// - `InvalidDefault` for a default that does not fit the field type
/// - `DuplicateField` for a repeated field name
pub fn parse(text: &str) -> SchemaResult<Schema> {
    let json: Json = serde_json::from_str(text)
        .map_err(|e| SchemaError::syntax(format!("invalid JSON: {}", e)))?;

    if !json.is_object() {
        return Err(SchemaError::syntax("top-level schema must be a record object"));
    }

    let document: SchemaDocument =
        serde_json::from_value(json).map_err(|e| SchemaError::syntax(e.to_string()))?;

    if document.kind != "record" {
        return Err(SchemaError::syntax(format!(
            "top-level type must be \"record\", got \"{}\"",
            document.kind
        )));
    }

    let mut fields = Vec::with_capacity(document.fields.len());
    for field_doc in document.fields {
        let field_type = resolve_type(&field_doc.name, &field_doc.field_type)?;
        let default = field_doc
            .default
            .as_ref()
            .map(|raw| convert_default(&field_doc.name, field_type, raw))
            .transpose()?;

        fields.push(Field {
            name: field_doc.name,
            field_type,
            default,
            doc: field_doc.doc,
            position: 0,
        });
    }

    Schema::new(document.name, document.namespace, document.doc, fields)
}

fn resolve_type(field: &str, raw: &Json) -> SchemaResult<FieldType> {
    match raw {
        Json::String(tag) => {
            FieldType::from_name(tag).ok_or_else(|| SchemaError::unknown_type(field, tag.as_str()))
        }
        Json::Object(map) => match map.get("type") {
            Some(Json::String(tag)) => FieldType::from_name(tag)
                .ok_or_else(|| SchemaError::unknown_type(field, tag.as_str())),
            _ => Err(SchemaError::syntax(format!(
                "type object for field '{}' must carry a string \"type\"",
                field
            ))),
        },
        Json::Array(_) => Err(SchemaError::unknown_type(field, "union")),
        other => Err(SchemaError::syntax(format!(
            "type of field '{}' must be a string or object, got {}",
            field, other
        ))),
    }
}

fn convert_default(field: &str, field_type: FieldType, raw: &Json) -> SchemaResult<Value> {
    let converted = match (field_type, raw) {
        (FieldType::Null, Json::Null) => Some(Value::Null),
        (FieldType::Boolean, Json::Bool(b)) => Some(Value::Boolean(*b)),
        (FieldType::Int, Json::Number(n)) => n
            .as_i64()
            .and_then(|v| i32::try_from(v).ok())
            .map(Value::Int),
        (FieldType::Long, Json::Number(n)) => n.as_i64().map(Value::Long),
        (FieldType::Float, Json::Number(n)) => n.as_f64().map(|v| Value::Float(v as f32)),
        (FieldType::Double, Json::Number(n)) => n.as_f64().map(Value::Double),
        (FieldType::Bytes, Json::String(s)) => latin1_to_bytes(s).map(Value::Bytes),
        (FieldType::String, Json::String(s)) => Some(Value::String(s.clone())),
        _ => None,
    };

    converted.ok_or_else(|| {
        SchemaError::invalid_default(field, field_type, format!("cannot use {} as default", raw))
    })
}

/// Renders the canonical JSON form of a schema.
///
/// Object keys come out in sorted order, so equal schemas render to
/// identical text.
pub fn render(schema: &Schema) -> String {
    let fields: Vec<Json> = schema.fields().iter().map(render_field).collect();

    let mut map = Map::new();
    map.insert("type".into(), json!("record"));
    map.insert("name".into(), json!(schema.name()));
    if let Some(ns) = schema.namespace() {
        map.insert("namespace".into(), json!(ns));
    }
    if let Some(doc) = schema.doc() {
        map.insert("doc".into(), json!(doc));
    }
    map.insert("fields".into(), Json::Array(fields));

    Json::Object(map).to_string()
}

fn render_field(field: &Field) -> Json {
    let mut map = Map::new();
    map.insert("name".into(), json!(field.name));
    map.insert("type".into(), json!(field.field_type.type_name()));
    if let Some(doc) = &field.doc {
        map.insert("doc".into(), json!(doc));
    }
    if let Some(default) = &field.default {
        map.insert("default".into(), default_to_json(default));
    }
    Json::Object(map)
}

fn default_to_json(value: &Value) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Boolean(b) => json!(b),
        Value::Int(v) => json!(v),
        Value::Long(v) => json!(v),
        Value::Float(v) => json!(f64::from(*v)),
        Value::Double(v) => json!(v),
        Value::Bytes(b) => json!(bytes_to_latin1(b)),
        Value::String(s) => json!(s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CUSTOMER: &str = r#"{
        "type": "record",
        "namespace": "com.example",
        "name": "Customer",
        "fields": [
            { "name": "first_name", "type": "string", "doc": "First Name of Customer" },
            { "name": "last_name", "type": "string", "doc": "Last Name of Customer" },
            { "name": "age", "type": "int", "doc": "Age at the time of registration" },
            { "name": "height", "type": "float", "doc": "Height at the time of registration in cm" },
            { "name": "weight", "type": "float", "doc": "Weight at the time of registration in kg" },
            { "name": "automated_email", "type": "boolean", "default": true,
              "doc": "Field indicating if the user is enrolled in marketing emails" }
        ]
    }"#;

    #[test]
    fn test_parse_customer() {
        let schema = parse(CUSTOMER).unwrap();
        assert_eq!(schema.name(), "Customer");
        assert_eq!(schema.namespace(), Some("com.example"));
        assert_eq!(schema.len(), 6);

        let age = schema.field("age").unwrap();
        assert_eq!(age.field_type, FieldType::Int);
        assert_eq!(age.doc.as_deref(), Some("Age at the time of registration"));
        assert!(age.default.is_none());

        let email = schema.field("automated_email").unwrap();
        assert_eq!(email.default, Some(Value::Boolean(true)));
        assert_eq!(email.position, 5);
    }

    #[test]
    fn test_malformed_json_is_syntax_error() {
        let err = parse("{ \"type\": \"record\", ").unwrap_err();
        assert_eq!(err.code(), "GENREC_SCHEMA_SYNTAX");
    }

    #[test]
    fn test_missing_fields_is_syntax_error() {
        let err = parse(r#"{"type": "record", "name": "A"}"#).unwrap_err();
        assert!(matches!(err, SchemaError::Syntax { .. }));
    }

    #[test]
    fn test_non_record_top_level_is_syntax_error() {
        assert!(matches!(parse(r#""string""#), Err(SchemaError::Syntax { .. })));
        assert!(matches!(
            parse(r#"{"type": "enum", "name": "A", "fields": []}"#),
            Err(SchemaError::Syntax { .. })
        ));
    }

    #[test]
    fn test_duplicate_field() {
        let err = parse(
            r#"{"type": "record", "name": "A", "fields": [
                {"name": "x", "type": "int"},
                {"name": "x", "type": "string"}
            ]}"#,
        )
        .unwrap_err();
        assert_eq!(err, SchemaError::duplicate_field("x"));
    }

    #[test]
    fn test_unknown_type() {
        let err = parse(
            r#"{"type": "record", "name": "A", "fields": [{"name": "x", "type": "integer"}]}"#,
        )
        .unwrap_err();
        assert_eq!(err, SchemaError::unknown_type("x", "integer"));
    }

    #[test]
    fn test_union_type_is_unknown() {
        let err = parse(
            r#"{"type": "record", "name": "A", "fields": [{"name": "x", "type": ["null", "int"]}]}"#,
        )
        .unwrap_err();
        assert_eq!(err.code(), "GENREC_SCHEMA_UNKNOWN_TYPE");
    }

    #[test]
    fn test_type_object_form() {
        let schema = parse(
            r#"{"type": "record", "name": "A", "fields": [{"name": "x", "type": {"type": "long"}}]}"#,
        )
        .unwrap();
        assert_eq!(schema.field("x").unwrap().field_type, FieldType::Long);
    }

    #[test]
    fn test_invalid_defaults() {
        let cases = [
            r#"{"name": "x", "type": "boolean", "default": "yes"}"#,
            r#"{"name": "x", "type": "int", "default": 3000000000}"#,
            r#"{"name": "x", "type": "int", "default": 1.5}"#,
            r#"{"name": "x", "type": "string", "default": 1}"#,
            r#"{"name": "x", "type": "bytes", "default": "Ā"}"#,
            r#"{"name": "x", "type": "long", "default": null}"#,
        ];
        for field in cases {
            let text = format!(r#"{{"type": "record", "name": "A", "fields": [{}]}}"#, field);
            let err = parse(&text).unwrap_err();
            assert_eq!(err.code(), "GENREC_SCHEMA_INVALID_DEFAULT", "case: {}", field);
        }
    }

    #[test]
    fn test_null_default_is_declared() {
        let schema = parse(
            r#"{"type": "record", "name": "A", "fields": [{"name": "x", "type": "null", "default": null}]}"#,
        )
        .unwrap();
        assert_eq!(schema.field("x").unwrap().default, Some(Value::Null));
    }

    #[test]
    fn test_numeric_defaults_widen() {
        let schema = parse(
            r#"{"type": "record", "name": "A", "fields": [
                {"name": "f", "type": "float", "default": 2},
                {"name": "d", "type": "double", "default": 0.25}
            ]}"#,
        )
        .unwrap();
        assert_eq!(schema.field("f").unwrap().default, Some(Value::Float(2.0)));
        assert_eq!(schema.field("d").unwrap().default, Some(Value::Double(0.25)));
    }

    #[test]
    fn test_render_round_trip() {
        let schema = parse(CUSTOMER).unwrap();
        let text = schema.to_json();
        let reparsed = parse(&text).unwrap();
        assert_eq!(schema, reparsed);
        assert_eq!(text, reparsed.to_json());
    }

    #[test]
    fn test_render_round_trip_all_default_kinds() {
        let schema = parse(
            r#"{"type": "record", "name": "A", "doc": "all kinds", "fields": [
                {"name": "n", "type": "null", "default": null},
                {"name": "b", "type": "boolean", "default": false},
                {"name": "i", "type": "int", "default": -7},
                {"name": "l", "type": "long", "default": 9007199254740993},
                {"name": "f", "type": "float", "default": 0.1},
                {"name": "d", "type": "double", "default": 1e300},
                {"name": "y", "type": "bytes", "default": "ÿ\u0000"},
                {"name": "s", "type": "string", "default": "quote \" here"}
            ]}"#,
        )
        .unwrap();
        let reparsed = parse(&schema.to_json()).unwrap();
        assert_eq!(schema, reparsed);
    }
}
