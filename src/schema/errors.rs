//! Schema error types
//!
//! Error codes:
//! - GENREC_SCHEMA_SYNTAX
//! - GENREC_SCHEMA_DUPLICATE_FIELD
//! - GENREC_SCHEMA_UNKNOWN_TYPE
//! - GENREC_SCHEMA_INVALID_DEFAULT
//!
//! All schema errors are construction-time failures: no partial schema is
//! ever produced.

use thiserror::Error;

use super::types::FieldType;

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Schema parsing and construction errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("Schema syntax error: {message}")]
    Syntax { message: String },

    #[error("Duplicate field '{field}'")]
    DuplicateField { field: String },

    #[error("Unknown type '{type_name}' for field '{field}'")]
    UnknownType { field: String, type_name: String },

    #[error("Invalid default for field '{field}' of type {expected}: {message}")]
    InvalidDefault {
        field: String,
        expected: FieldType,
        message: String,
    },
}

impl SchemaError {
    pub fn syntax(message: impl Into<String>) -> Self {
        SchemaError::Syntax {
            message: message.into(),
        }
    }

    pub fn duplicate_field(field: impl Into<String>) -> Self {
        SchemaError::DuplicateField {
            field: field.into(),
        }
    }

    pub fn unknown_type(field: impl Into<String>, type_name: impl Into<String>) -> Self {
        SchemaError::UnknownType {
            field: field.into(),
            type_name: type_name.into(),
        }
    }

    pub fn invalid_default(
        field: impl Into<String>,
        expected: FieldType,
        message: impl Into<String>,
    ) -> Self {
        SchemaError::InvalidDefault {
            field: field.into(),
            expected,
            message: message.into(),
        }
    }

    /// Returns the stable error code string
    pub fn code(&self) -> &'static str {
        match self {
            SchemaError::Syntax { .. } => "GENREC_SCHEMA_SYNTAX",
            SchemaError::DuplicateField { .. } => "GENREC_SCHEMA_DUPLICATE_FIELD",
            SchemaError::UnknownType { .. } => "GENREC_SCHEMA_UNKNOWN_TYPE",
            SchemaError::InvalidDefault { .. } => "GENREC_SCHEMA_INVALID_DEFAULT",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(SchemaError::syntax("x").code(), "GENREC_SCHEMA_SYNTAX");
        assert_eq!(SchemaError::duplicate_field("a").code(), "GENREC_SCHEMA_DUPLICATE_FIELD");
        assert_eq!(SchemaError::unknown_type("a", "uuid").code(), "GENREC_SCHEMA_UNKNOWN_TYPE");
        assert_eq!(
            SchemaError::invalid_default("a", FieldType::Int, "x").code(),
            "GENREC_SCHEMA_INVALID_DEFAULT"
        );
    }

    #[test]
    fn test_error_display_contains_context() {
        let err = SchemaError::unknown_type("age", "integer");
        let display = err.to_string();
        assert!(display.contains("age"));
        assert!(display.contains("integer"));

        let err = SchemaError::invalid_default("flag", FieldType::Boolean, "expected a JSON boolean");
        assert!(err.to_string().contains("boolean"));
    }
}
