//! Schema model for genrec
//!
//! Schemas are runtime data: parsed from JSON text into an immutable
//! `Schema`, then shared (`Arc<Schema>`) by every record and container bound
//! to them.
//!
//! # Design Principles
//!
//! - Immutable once parsed
//! - Field order is significant (it is the binary encoding order)
//! - Every default is type-checked at parse time
//! - Lookup of an undeclared name is a normal miss, not an error

mod errors;
mod parser;
mod types;
mod value;

pub use errors::{SchemaError, SchemaResult};
pub use parser::parse;
pub use types::{Field, FieldType, Schema};
pub use value::Value;
