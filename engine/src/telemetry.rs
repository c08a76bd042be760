//! Telemetry port and event/property dictionary.
//!
//! The pipeline emits exactly one event per run — success or error, never
//! both, never zero once dispatch is reached. Transport is a collaborator
//! concern; this module only fixes the sink contract and the flat property
//! vocabulary shared across emitters.

use std::collections::HashMap;
use std::sync::Mutex;

use command_engine_core::EngineError;
use serde::Serialize;

/// Telemetry event names.
pub mod events {
    /// The pipeline's single per-run event.
    pub const COMMAND: &str = "command";

    /// Pre-pipeline usage event sent by the CLI surface.
    pub const COMMAND_USAGE: &str = "command-usage";

    /// Start-event name for an instrumented action.
    pub fn start(event: &str) -> String {
        format!("{event}-start")
    }
}

/// Flat property keys attached to telemetry events.
pub mod properties {
    pub const COMMAND: &str = "command";
    pub const COMMAND_HEAD: &str = "command-head";
    pub const COMMAND_BODY: &str = "command-body";
    pub const OPTIONS: &str = "options";
    pub const INTERACTIVE: &str = "interactive";
    pub const HELP: &str = "help";
    pub const LOG_LEVEL: &str = "log-level";
    pub const SUCCESS: &str = "success";
    pub const COMPONENT: &str = "component";
    pub const ERROR_KIND: &str = "error-kind";
    pub const ERROR_MESSAGE: &str = "error-message";
    pub const TIMESTAMP: &str = "timestamp";

    pub const YES: &str = "yes";
    pub const NO: &str = "no";
}

/// Structured error payload attached to error events.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorDetails {
    /// Stable machine kind (see [`EngineError::kind`]).
    pub kind: String,
    /// Message of the innermost error.
    pub message: String,
    /// Component tag chain, outermost first, joined with `/`.
    pub component: Option<String>,
}

impl ErrorDetails {
    /// Extracts the structured payload from an engine error.
    pub fn from_error(error: &EngineError) -> Self {
        let components = error.components();
        Self {
            kind: error.kind().to_string(),
            message: error.root().to_string(),
            component: if components.is_empty() {
                None
            } else {
                Some(components.join("/"))
            },
        }
    }
}

/// One recorded emission, as captured by [`MemoryTelemetry`].
#[derive(Debug, Clone, Serialize)]
pub struct TelemetryRecord {
    /// Event name.
    pub name: String,
    /// Flat property map.
    pub properties: HashMap<String, String>,
    /// Structured error payload, present on error emissions only.
    pub error: Option<ErrorDetails>,
}

impl TelemetryRecord {
    /// Whether this record came from an error emission.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Accepts an event name plus a flat string-keyed property mapping; error
/// emissions additionally carry the structured error object.
pub trait TelemetrySink: Send + Sync {
    /// Emits a success/neutral event.
    fn send_event(&self, name: &str, properties: HashMap<String, String>);

    /// Emits an error event carrying the structured error.
    fn send_error_event(
        &self,
        name: &str,
        properties: HashMap<String, String>,
        error: &EngineError,
    );
}

/// Sink that drops everything (telemetry disabled).
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTelemetry;

impl TelemetrySink for NullTelemetry {
    fn send_event(&self, _name: &str, _properties: HashMap<String, String>) {}

    fn send_error_event(
        &self,
        _name: &str,
        _properties: HashMap<String, String>,
        _error: &EngineError,
    ) {
    }
}

/// Recording sink for tests and debug inspection.
#[derive(Debug, Default)]
pub struct MemoryTelemetry {
    records: Mutex<Vec<TelemetryRecord>>,
}

impl MemoryTelemetry {
    /// All recorded emissions, in order.
    pub fn records(&self) -> Vec<TelemetryRecord> {
        self.records.lock().expect("telemetry poisoned").clone()
    }

    /// Number of recorded emissions.
    pub fn len(&self) -> usize {
        self.records.lock().expect("telemetry poisoned").len()
    }

    /// Whether nothing has been emitted.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TelemetrySink for MemoryTelemetry {
    fn send_event(&self, name: &str, properties: HashMap<String, String>) {
        self.records
            .lock()
            .expect("telemetry poisoned")
            .push(TelemetryRecord {
                name: name.to_string(),
                properties,
                error: None,
            });
    }

    fn send_error_event(
        &self,
        name: &str,
        properties: HashMap<String, String>,
        error: &EngineError,
    ) {
        self.records
            .lock()
            .expect("telemetry poisoned")
            .push(TelemetryRecord {
                name: name.to_string(),
                properties,
                error: Some(ErrorDetails::from_error(error)),
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_records_error_details() {
        let sink = MemoryTelemetry::default();
        let error = EngineError::Tagged {
            component: "generator".into(),
            source: Box::new(EngineError::Cancelled),
        };

        sink.send_error_event(events::COMMAND, HashMap::new(), &error);

        let records = sink.records();
        assert_eq!(records.len(), 1);
        let details = records[0].error.as_ref().unwrap();
        assert_eq!(details.kind, "user-cancel");
        assert_eq!(details.component.as_deref(), Some("generator"));
    }

    #[test]
    fn test_start_event_naming() {
        assert_eq!(events::start("scaffold"), "scaffold-start");
    }
}
