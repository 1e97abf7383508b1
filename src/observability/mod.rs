//! Observability for genrec
//!
//! Structured JSON log lines on stderr for container lifecycle events.
//! Logging never fails the operation that emits it.
//!
//! ```ignore
//! use genrec::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::ContainerOpen, &[("path", "customer-generic.grc")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

/// Log an event at its own severity
pub fn log_event(event: Event) {
    Logger::log(event.severity(), event.as_str(), &[]);
}

/// Log an event with fields at its own severity
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
