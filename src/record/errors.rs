//! Record construction error types
//!
//! Error codes:
//! - GENREC_RECORD_UNKNOWN_FIELD
//! - GENREC_RECORD_TYPE_MISMATCH
//! - GENREC_RECORD_MISSING_FIELD

use thiserror::Error;

use crate::schema::FieldType;

/// Result type for record construction
pub type RecordResult<T> = Result<T, RecordError>;

/// Builder failures. No partial record is produced on error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("Field '{field}' is not declared in schema '{schema}'")]
    UnknownField { schema: String, field: String },

    #[error("Type mismatch for field '{field}': expected {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: FieldType,
        actual: FieldType,
    },

    #[error("Missing required field '{field}': no value set and no default declared")]
    MissingRequiredField { field: String },
}

impl RecordError {
    pub fn unknown_field(schema: impl Into<String>, field: impl Into<String>) -> Self {
        RecordError::UnknownField {
            schema: schema.into(),
            field: field.into(),
        }
    }

    pub fn type_mismatch(field: impl Into<String>, expected: FieldType, actual: FieldType) -> Self {
        RecordError::TypeMismatch {
            field: field.into(),
            expected,
            actual,
        }
    }

    pub fn missing_required(field: impl Into<String>) -> Self {
        RecordError::MissingRequiredField {
            field: field.into(),
        }
    }

    /// Returns the stable error code string
    pub fn code(&self) -> &'static str {
        match self {
            RecordError::UnknownField { .. } => "GENREC_RECORD_UNKNOWN_FIELD",
            RecordError::TypeMismatch { .. } => "GENREC_RECORD_TYPE_MISMATCH",
            RecordError::MissingRequiredField { .. } => "GENREC_RECORD_MISSING_FIELD",
        }
    }
}
