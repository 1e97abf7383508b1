//! genrec - generic records over runtime schemas
//!
//! Schemas are parsed from JSON at runtime, records are built against them
//! with defaults applied, and sequences of records are stored in a
//! self-describing binary container file.

pub mod container;
pub mod demo;
pub mod observability;
pub mod record;
pub mod schema;

pub use container::{ContainerError, ContainerReader, ContainerWriter, WriterConfig};
pub use record::{Record, RecordBuilder, RecordError};
pub use schema::{Field, FieldType, Schema, SchemaError, Value};
