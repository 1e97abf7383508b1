//! Generic records
//!
//! A `Record` is a dynamically-typed value container whose shape comes from
//! a runtime `Schema`. Records are produced by `RecordBuilder` (or decoded
//! from a container) and are immutable afterwards.

mod builder;
mod errors;
mod generic;

pub use builder::RecordBuilder;
pub use errors::{RecordError, RecordResult};
pub use generic::Record;
pub use crate::schema::Value;
