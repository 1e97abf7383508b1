//! Two-phase record construction
//!
//! Phase one accumulates explicit values, type-checked against the schema
//! as they are set. Phase two (`build`) folds the schema defaults over every
//! unset field and fails if a required field is still missing.

use std::sync::Arc;

use super::errors::{RecordError, RecordResult};
use super::generic::Record;
use crate::schema::{Field, Schema, Value};

/// Builds `Record`s for one schema.
///
/// The builder is reusable: `build` does not consume it, so a partially
/// populated builder can stamp out several records.
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    schema: Arc<Schema>,
    values: Vec<Option<Value>>,
}

impl RecordBuilder {
    /// Creates a builder with no fields set.
    pub fn new(schema: impl Into<Arc<Schema>>) -> Self {
        let schema = schema.into();
        let values = vec![None; schema.len()];
        Self { schema, values }
    }

    /// Creates a builder with every field set to the record's value.
    pub fn from_record(record: &Record) -> Self {
        Self {
            schema: Arc::clone(record.schema()),
            values: record.values().iter().cloned().map(Some).collect(),
        }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Sets a field value.
    ///
    /// Numeric values are widened to the declared type where that is
    /// lossless by type (int → long, float → double, ...).
    ///
    /// # Errors
    ///
    /// - `UnknownField` if the schema does not declare `name`
    /// - `TypeMismatch` if the value cannot be stored in the field
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> RecordResult<&mut Self> {
        let field = self.lookup(name)?;
        let position = field.position;
        let expected = field.field_type;

        let value = value.into();
        let actual = value.field_type();
        let value = value
            .promote_to(expected)
            .ok_or_else(|| RecordError::type_mismatch(name, expected, actual))?;

        self.values[position] = Some(value);
        Ok(self)
    }

    /// Whether `name` has been set explicitly. Undeclared names are never set.
    pub fn has(&self, name: &str) -> bool {
        self.explicit(name).is_some()
    }

    /// Returns the explicitly set value of `name`, ignoring defaults.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.explicit(name)
    }

    /// Unsets a field so `build` falls back to its default again.
    pub fn clear(&mut self, name: &str) -> RecordResult<&mut Self> {
        let position = self.lookup(name)?.position;
        self.values[position] = None;
        Ok(self)
    }

    /// Materializes a record.
    ///
    /// # Errors
    ///
    /// `MissingRequiredField` for the first field, in schema order, that has
    /// neither an explicit value nor a default.
    pub fn build(&self) -> RecordResult<Record> {
        let values = self
            .schema
            .fields()
            .iter()
            .zip(self.values.iter())
            .map(|(field, value)| match (value, &field.default) {
                (Some(v), _) => Ok(v.clone()),
                (None, Some(default)) => Ok(default.clone()),
                (None, None) => Err(RecordError::missing_required(&field.name)),
            })
            .collect::<RecordResult<Vec<_>>>()?;

        Ok(Record::from_parts(Arc::clone(&self.schema), values))
    }

    fn lookup(&self, name: &str) -> RecordResult<&Field> {
        self.schema
            .field(name)
            .ok_or_else(|| RecordError::unknown_field(self.schema.full_name(), name))
    }

    fn explicit(&self, name: &str) -> Option<&Value> {
        self.schema
            .field(name)
            .and_then(|field| self.values.get(field.position))
            .and_then(Option::as_ref)
    }
}
