//! Demo error type
//!
//! Wraps the library errors; `code()` reports the wrapped error's code.

use std::io;

use thiserror::Error;

use crate::container::ContainerError;
use crate::record::RecordError;
use crate::schema::SchemaError;

/// Result type for demo operations
pub type DemoResult<T> = Result<T, DemoError>;

#[derive(Debug, Error)]
pub enum DemoError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error(transparent)]
    Container(#[from] ContainerError),

    #[error("Failed to write demo output: {0}")]
    Output(#[from] io::Error),
}

impl DemoError {
    pub fn code(&self) -> &'static str {
        match self {
            DemoError::Schema(e) => e.code(),
            DemoError::Record(e) => e.code(),
            DemoError::Container(e) => e.code(),
            DemoError::Output(_) => "GENREC_DEMO_OUTPUT",
        }
    }
}
