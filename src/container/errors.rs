//! Container error types
//!
//! Error codes:
//! - GENREC_CONTAINER_IO
//! - GENREC_CONTAINER_SCHEMA_MISMATCH
//! - GENREC_CONTAINER_CORRUPT (stops the reader)
//! - GENREC_CONTAINER_CONFIG
//! - GENREC_CONTAINER_FAILED (writer refuses work after a failed block write)

use std::io;

use thiserror::Error;

/// Result type for container operations
pub type ContainerResult<T> = Result<T, ContainerError>;

/// Container read/write errors
#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("I/O error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("Record schema '{actual}' does not match container schema '{expected}'")]
    SchemaMismatch { expected: String, actual: String },

    #[error("Corrupt container at byte {offset}: {message}")]
    Corrupt { offset: u64, message: String },

    #[error("Invalid writer configuration: {0}")]
    Config(String),

    #[error("Writer stopped: block {block} failed to write earlier")]
    Failed { block: u64 },
}

impl ContainerError {
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        ContainerError::Io {
            context: context.into(),
            source,
        }
    }

    pub fn corrupt(offset: u64, message: impl Into<String>) -> Self {
        ContainerError::Corrupt {
            offset,
            message: message.into(),
        }
    }

    pub fn schema_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        ContainerError::SchemaMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        ContainerError::Config(message.into())
    }

    /// Maps a read failure at `offset`: short reads and malformed data are
    /// corruption, anything else is an I/O failure.
    pub(crate) fn from_read(offset: u64, what: &str, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => {
                ContainerError::corrupt(offset, format!("truncated {}", what))
            }
            io::ErrorKind::InvalidData => {
                ContainerError::corrupt(offset, format!("malformed {}: {}", what, err))
            }
            _ => ContainerError::io(format!("failed to read {}", what), err),
        }
    }

    /// Returns the stable error code string
    pub fn code(&self) -> &'static str {
        match self {
            ContainerError::Io { .. } => "GENREC_CONTAINER_IO",
            ContainerError::SchemaMismatch { .. } => "GENREC_CONTAINER_SCHEMA_MISMATCH",
            ContainerError::Corrupt { .. } => "GENREC_CONTAINER_CORRUPT",
            ContainerError::Config(_) => "GENREC_CONTAINER_CONFIG",
            ContainerError::Failed { .. } => "GENREC_CONTAINER_FAILED",
        }
    }

    pub fn is_corruption(&self) -> bool {
        matches!(self, ContainerError::Corrupt { .. })
    }
}
