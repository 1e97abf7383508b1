//! Observable events
//!
//! Events are explicit and typed; each maps to a fixed name and severity.

use std::fmt;

use super::logger::Severity;

/// Observable events in genrec
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Container writer
    /// Container file created and header written
    ContainerCreate,
    /// One block written to the sink
    ContainerBlockFlush,
    /// Writer closed, all blocks flushed
    ContainerClose,
    /// Flush during close or drop failed
    ContainerCloseFailed,

    // Container reader
    /// Container opened and header decoded
    ContainerOpen,
    /// Corruption detected while reading
    ContainerCorruption,
    /// Read failed for a reason other than corruption
    ContainerReadFailed,

    // Demo
    DemoStart,
    DemoComplete,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ContainerCreate => "CONTAINER_CREATE",
            Event::ContainerBlockFlush => "CONTAINER_BLOCK_FLUSH",
            Event::ContainerClose => "CONTAINER_CLOSE",
            Event::ContainerCloseFailed => "CONTAINER_CLOSE_FAILED",
            Event::ContainerOpen => "CONTAINER_OPEN",
            Event::ContainerCorruption => "CONTAINER_CORRUPTION",
            Event::ContainerReadFailed => "CONTAINER_READ_FAILED",
            Event::DemoStart => "DEMO_START",
            Event::DemoComplete => "DEMO_COMPLETE",
        }
    }

    /// Severity this event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::ContainerBlockFlush => Severity::Trace,
            Event::ContainerCloseFailed
            | Event::ContainerCorruption
            | Event::ContainerReadFailed => Severity::Error,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_screaming_snake_case() {
        let all = [
            Event::ContainerCreate,
            Event::ContainerBlockFlush,
            Event::ContainerClose,
            Event::ContainerCloseFailed,
            Event::ContainerOpen,
            Event::ContainerCorruption,
            Event::ContainerReadFailed,
            Event::DemoStart,
            Event::DemoComplete,
        ];
        for event in all {
            let name = event.as_str();
            assert!(name.chars().all(|c| c.is_ascii_uppercase() || c == '_'), "{}", name);
            assert_eq!(event.to_string(), name);
        }
    }

    #[test]
    fn test_event_severities() {
        assert_eq!(Event::ContainerBlockFlush.severity(), Severity::Trace);
        assert_eq!(Event::ContainerCreate.severity(), Severity::Info);
        assert_eq!(Event::ContainerCorruption.severity(), Severity::Error);
        assert_eq!(Event::ContainerCloseFailed.severity(), Severity::Error);
    }
}
