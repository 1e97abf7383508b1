//! Schema-bound generic record

use std::fmt;
use std::sync::Arc;

use crate::schema::{Field, Schema, Value};

/// One immutable instance of a schema.
///
/// Values are stored in schema field order and always carry the declared
/// type of their field. Records are created by `RecordBuilder` or decoded
/// from a container; there is no way to mutate one afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    schema: Arc<Schema>,
    values: Vec<Value>,
}

impl Record {
    /// Caller guarantees one conforming value per schema field, in order.
    pub(crate) fn from_parts(schema: Arc<Schema>, values: Vec<Value>) -> Self {
        debug_assert_eq!(schema.len(), values.len());
        Self { schema, values }
    }

    /// Returns the value of a field, or `None` if the schema does not
    /// declare `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.schema
            .field(name)
            .and_then(|field| self.values.get(field.position))
    }

    /// Returns the value at a schema position.
    pub fn get_at(&self, position: usize) -> Option<&Value> {
        self.values.get(position)
    }

    /// The schema this record is bound to
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Values in schema field order
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Iterates `(field, value)` pairs in schema order
    pub fn iter(&self) -> impl Iterator<Item = (&Field, &Value)> {
        self.schema.fields().iter().zip(self.values.iter())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// JSON object in schema field order:
/// `{"first_name": "John", "age": 26}`
impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (field, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            Value::from(field.name.as_str()).write_json(f)?;
            f.write_str(": ")?;
            value.write_json(f)?;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldType;

    fn point_schema() -> Arc<Schema> {
        Arc::new(
            Schema::new(
                "Point",
                None,
                None,
                vec![
                    Field::new("x", FieldType::Int),
                    Field::new("label", FieldType::String),
                    Field::new("weight", FieldType::Float),
                ],
            )
            .unwrap(),
        )
    }

    fn point() -> Record {
        Record::from_parts(
            point_schema(),
            vec![Value::Int(3), Value::from("a \"b\""), Value::Float(0.5)],
        )
    }

    #[test]
    fn test_get_by_name_and_position() {
        let record = point();
        assert_eq!(record.get("x"), Some(&Value::Int(3)));
        assert_eq!(record.get_at(2), Some(&Value::Float(0.5)));
        assert_eq!(record.get_at(3), None);
    }

    #[test]
    fn test_get_undeclared_field_is_none() {
        let record = point();
        assert_eq!(record.get("not_here"), None);
    }

    #[test]
    fn test_iter_in_schema_order() {
        let record = point();
        let names: Vec<_> = record.iter().map(|(f, _)| f.name.as_str()).collect();
        assert_eq!(names, vec!["x", "label", "weight"]);
    }

    #[test]
    fn test_display_as_json() {
        let record = point();
        assert_eq!(
            record.to_string(),
            r#"{"x": 3, "label": "a \"b\"", "weight": 0.5}"#
        );
    }

    #[test]
    fn test_equality_is_structural_across_schema_instances() {
        let a = point();
        let b = Record::from_parts(point_schema(), a.values().to_vec());
        assert!(!Arc::ptr_eq(a.schema(), b.schema()));
        assert_eq!(a, b);
    }
}
