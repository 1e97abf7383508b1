//! Schema type definitions
//!
//! Supported field types:
//! - null: no value
//! - boolean
//! - int: 32-bit signed integer
//! - long: 64-bit signed integer
//! - float: 32-bit IEEE-754
//! - double: 64-bit IEEE-754
//! - bytes: raw byte sequence
//! - string: UTF-8 string

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use super::errors::{SchemaError, SchemaResult};
use super::value::Value;

/// Primitive field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Null,
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Bytes,
    String,
}

impl FieldType {
    /// Returns the type tag as written in schema text
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::Null => "null",
            FieldType::Boolean => "boolean",
            FieldType::Int => "int",
            FieldType::Long => "long",
            FieldType::Float => "float",
            FieldType::Double => "double",
            FieldType::Bytes => "bytes",
            FieldType::String => "string",
        }
    }

    /// Resolves a type tag, `None` if it is not a known primitive.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "null" => Some(FieldType::Null),
            "boolean" => Some(FieldType::Boolean),
            "int" => Some(FieldType::Int),
            "long" => Some(FieldType::Long),
            "float" => Some(FieldType::Float),
            "double" => Some(FieldType::Double),
            "bytes" => Some(FieldType::Bytes),
            "string" => Some(FieldType::String),
            _ => None,
        }
    }

    /// Whether a value of type `from` may be stored in a field of this type.
    ///
    /// Identical types are always accepted. Numbers widen:
    /// int → long/float/double, long → float/double, float → double.
    pub fn accepts(&self, from: FieldType) -> bool {
        if *self == from {
            return true;
        }
        matches!(
            (from, *self),
            (FieldType::Int, FieldType::Long)
                | (FieldType::Int, FieldType::Float)
                | (FieldType::Int, FieldType::Double)
                | (FieldType::Long, FieldType::Float)
                | (FieldType::Long, FieldType::Double)
                | (FieldType::Float, FieldType::Double)
        )
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Field definition
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Field name, unique within its schema
    pub name: String,
    /// Declared primitive type
    pub field_type: FieldType,
    /// Value substituted when the field is not set at build time
    pub default: Option<Value>,
    /// Optional documentation string
    pub doc: Option<String>,
    /// Zero-based position in schema order (assigned by `Schema::new`)
    pub position: usize,
}

impl Field {
    /// Create a field without default or doc
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            default: None,
            doc: None,
            position: 0,
        }
    }

    /// Attach a default value
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Attach a doc string
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// A field with no default must be set explicitly before build.
    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

/// A named record schema. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct Schema {
    name: String,
    namespace: Option<String>,
    doc: Option<String>,
    fields: Vec<Field>,
    index: HashMap<String, usize>,
}

impl Schema {
    /// Create a schema from field definitions.
    ///
    /// Positions are reassigned in the given order. Fails if a name is not a
    /// valid identifier, a field name repeats, or a default does not match
    /// its field type.
    pub fn new(
        name: impl Into<String>,
        namespace: Option<String>,
        doc: Option<String>,
        fields: Vec<Field>,
    ) -> SchemaResult<Self> {
        let name = name.into();
        if !is_valid_name(&name) {
            return Err(SchemaError::syntax(format!("invalid record name '{}'", name)));
        }
        if let Some(ns) = namespace.as_deref() {
            if !ns.is_empty() && !ns.split('.').all(is_valid_name) {
                return Err(SchemaError::syntax(format!("invalid namespace '{}'", ns)));
            }
        }

        let mut index = HashMap::with_capacity(fields.len());
        let mut positioned = Vec::with_capacity(fields.len());

        for (position, mut field) in fields.into_iter().enumerate() {
            if !is_valid_name(&field.name) {
                return Err(SchemaError::syntax(format!("invalid field name '{}'", field.name)));
            }
            if index.contains_key(&field.name) {
                return Err(SchemaError::duplicate_field(&field.name));
            }
            if let Some(default) = &field.default {
                if default.field_type() != field.field_type {
                    return Err(SchemaError::invalid_default(
                        &field.name,
                        field.field_type,
                        format!("default has type {}", default.field_type()),
                    ));
                }
                if default.as_f64().map_or(false, |v| !v.is_finite()) {
                    return Err(SchemaError::invalid_default(
                        &field.name,
                        field.field_type,
                        "default must be a finite number",
                    ));
                }
            }

            field.position = position;
            index.insert(field.name.clone(), position);
            positioned.push(field);
        }

        Ok(Self {
            name,
            namespace: namespace.filter(|ns| !ns.is_empty()),
            doc,
            fields: positioned,
            index,
        })
    }

    /// Parses schema JSON text. See `parser::parse`.
    pub fn parse(text: &str) -> SchemaResult<Self> {
        super::parser::parse(text)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    /// `namespace.name`, or just `name` without a namespace
    pub fn full_name(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{}.{}", ns, self.name),
            None => self.name.clone(),
        }
    }

    /// Fields in declaration order
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Looks up a field by name. A miss is `None`, never an error.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.index.get(name).and_then(|&pos| self.fields.get(pos))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Canonical JSON text of this schema; parses back to an equal schema.
    pub fn to_json(&self) -> String {
        super::parser::render(self)
    }
}

/// Structural equality; the lookup index is derived and not compared.
impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.namespace == other.namespace
            && self.doc == other.doc
            && self.fields == other.fields
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json())
    }
}

impl FromStr for Schema {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Schema::parse(s)
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub(crate) fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_schema() -> Schema {
        Schema::new(
            "User",
            Some("com.example".into()),
            None,
            vec![
                Field::new("name", FieldType::String),
                Field::new("age", FieldType::Int),
                Field::new("active", FieldType::Boolean).with_default(true),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_positions_follow_declaration_order() {
        let schema = sample_schema();
        let positions: Vec<_> = schema.fields().iter().map(|f| f.position).collect();
        assert_eq!(positions, vec![0, 1, 2]);
        assert_eq!(schema.field("active").unwrap().position, 2);
    }

    #[test]
    fn test_field_lookup_miss_is_none() {
        let schema = sample_schema();
        assert!(schema.field("not_here").is_none());
    }

    #[test]
    fn test_full_name() {
        let schema = sample_schema();
        assert_eq!(schema.full_name(), "com.example.User");

        let bare = Schema::new("User", None, None, vec![]).unwrap();
        assert_eq!(bare.full_name(), "User");
    }

    #[test]
    fn test_empty_namespace_is_dropped() {
        let schema = Schema::new("User", Some(String::new()), None, vec![]).unwrap();
        assert_eq!(schema.namespace(), None);
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let result = Schema::new(
            "User",
            None,
            None,
            vec![Field::new("a", FieldType::Int), Field::new("a", FieldType::Long)],
        );
        assert!(matches!(result, Err(SchemaError::DuplicateField { .. })));
    }

    #[test]
    fn test_default_type_must_match() {
        let result = Schema::new(
            "User",
            None,
            None,
            vec![Field::new("flag", FieldType::Boolean).with_default("yes")],
        );
        assert!(matches!(result, Err(SchemaError::InvalidDefault { .. })));
    }

    #[test]
    fn test_invalid_names_rejected() {
        assert!(Schema::new("1User", None, None, vec![]).is_err());
        assert!(Schema::new("User", Some("com..example".into()), None, vec![]).is_err());
        assert!(Schema::new("User", None, None, vec![Field::new("first-name", FieldType::String)]).is_err());
    }

    #[test]
    fn test_required_means_no_default() {
        let schema = sample_schema();
        assert!(schema.field("name").unwrap().is_required());
        assert!(!schema.field("active").unwrap().is_required());
    }

    #[test]
    fn test_type_acceptance() {
        assert!(FieldType::Long.accepts(FieldType::Int));
        assert!(FieldType::Double.accepts(FieldType::Float));
        assert!(!FieldType::Int.accepts(FieldType::Long));
        assert!(!FieldType::String.accepts(FieldType::Bytes));
    }

    #[test]
    fn test_type_names_round_trip() {
        for ty in [
            FieldType::Null,
            FieldType::Boolean,
            FieldType::Int,
            FieldType::Long,
            FieldType::Float,
            FieldType::Double,
            FieldType::Bytes,
            FieldType::String,
        ] {
            assert_eq!(FieldType::from_name(ty.type_name()), Some(ty));
        }
        assert_eq!(FieldType::from_name("bool"), None);
    }
}
