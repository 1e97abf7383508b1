//! Customer round-trip demo
//!
//! 1. Parse the `Customer` schema
//! 2. Build one customer with every field set and one relying on the
//!    `automated_email` default
//! 3. Write the first customer to a container file
//! 4. Read it back and print it, its `first_name`, and the lookup of a
//!    field the schema does not declare
//!
//! Container I/O failures are printed and the demo carries on; only schema,
//! builder and output errors are returned.

mod errors;

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

pub use errors::{DemoError, DemoResult};

use crate::container::{ContainerReader, ContainerResult, ContainerWriter, WriterConfig};
use crate::observability::{log_event, log_event_with_fields, Event};
use crate::record::{Record, RecordBuilder};
use crate::schema::{Schema, Value};

/// Container file written and read by the demo
pub const OUTPUT_FILE: &str = "customer-generic.grc";

pub const CUSTOMER_SCHEMA: &str = r#"{
     "type": "record",
     "namespace": "com.example",
     "name": "Customer",
     "fields": [
       { "name": "first_name", "type": "string", "doc": "First Name of Customer" },
       { "name": "last_name", "type": "string", "doc": "Last Name of Customer" },
       { "name": "age", "type": "int", "doc": "Age at the time of registration" },
       { "name": "height", "type": "float", "doc": "Height at the time of registration in cm" },
       { "name": "weight", "type": "float", "doc": "Weight at the time of registration in kg" },
       { "name": "automated_email", "type": "boolean", "default": true, "doc": "Field indicating if the user is enrolled in marketing emails" }
     ]
}"#;

/// What a demo run produced
#[derive(Debug, Clone)]
pub struct DemoOutcome {
    /// Customer with every field set
    pub customer: Record,
    /// Customer built without `automated_email`
    pub customer_with_default: Record,
    /// Whether the container was written
    pub written: bool,
    /// First record read back, if the read succeeded
    pub read_back: Option<Record>,
}

pub fn customer_schema() -> DemoResult<Arc<Schema>> {
    Ok(Arc::new(Schema::parse(CUSTOMER_SCHEMA)?))
}

fn customer_builder(schema: &Arc<Schema>) -> DemoResult<RecordBuilder> {
    let mut builder = RecordBuilder::new(Arc::clone(schema));
    builder
        .set("first_name", "John")?
        .set("last_name", "Doe")?
        .set("age", 26)?
        .set("height", 175f32)?
        .set("weight", 70.5f32)?;
    Ok(builder)
}

/// John Doe, opted out of marketing emails
pub fn build_customer(schema: &Arc<Schema>) -> DemoResult<Record> {
    let mut builder = customer_builder(schema)?;
    builder.set("automated_email", false)?;
    Ok(builder.build()?)
}

/// John Doe with `automated_email` left to its default
pub fn build_customer_with_default(schema: &Arc<Schema>) -> DemoResult<Record> {
    Ok(customer_builder(schema)?.build()?)
}

/// Writes `customers` to a new container at `path`.
pub fn write_customers(
    schema: &Arc<Schema>,
    path: &Path,
    customers: &[Record],
) -> ContainerResult<()> {
    let mut writer = ContainerWriter::create(Arc::clone(schema), path, WriterConfig::default())?;
    writer.append_all(customers)?;
    writer.close()
}

/// Opens the container at `path` and decodes its first record.
pub fn read_first_customer(path: &Path) -> ContainerResult<Option<Record>> {
    ContainerReader::open(path)?.next_record()
}

/// Runs the demo against `path`, printing to `out`.
pub fn run<W: Write>(out: &mut W, path: &Path) -> DemoResult<DemoOutcome> {
    let path_text = path.display().to_string();
    log_event_with_fields(Event::DemoStart, &[("path", path_text.as_str())]);

    let schema = customer_schema()?;
    let customer = build_customer(&schema)?;
    let customer_with_default = build_customer_with_default(&schema)?;

    let written = match write_customers(&schema, path, std::slice::from_ref(&customer)) {
        Ok(()) => {
            writeln!(out, "Written {}", path_text)?;
            true
        }
        Err(e) => {
            writeln!(out, "Couldn't write file")?;
            writeln!(out, "{}", e)?;
            false
        }
    };

    let read_back = match read_first_customer(path) {
        Ok(Some(record)) => {
            writeln!(out, "Successfully read {}", path_text)?;
            writeln!(out, "{}", record)?;
            writeln!(out, "First name: {}", field_text(record.get("first_name")))?;
            writeln!(out, "Non existent field: {}", field_text(record.get("not_here")))?;
            Some(record)
        }
        Ok(None) => {
            writeln!(out, "No records in {}", path_text)?;
            None
        }
        Err(e) => {
            writeln!(out, "{}", e)?;
            None
        }
    };

    log_event(Event::DemoComplete);

    Ok(DemoOutcome {
        customer,
        customer_with_default,
        written,
        read_back,
    })
}

/// Absent fields print as `null`
fn field_text(value: Option<&Value>) -> String {
    value.unwrap_or(&Value::Null).to_string()
}
