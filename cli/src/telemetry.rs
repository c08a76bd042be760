//! File-backed telemetry sink.
//!
//! Events are appended as JSON lines under the settings directory; shipping
//! them anywhere is a transport concern outside this binary. Recording
//! failures are swallowed — telemetry must never break a command.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use command_engine::telemetry::{ErrorDetails, TelemetrySink};
use command_engine_core::EngineError;
use serde::Serialize;
use tracing::debug;

#[derive(Serialize)]
struct EventLine<'a> {
    event: &'a str,
    properties: &'a HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorDetails>,
}

/// Appends telemetry events to a JSON-lines file.
#[derive(Debug)]
pub struct FileTelemetry {
    path: PathBuf,
}

impl FileTelemetry {
    /// Creates a sink writing to the given file.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn append(&self, line: &EventLine<'_>) {
        let written = (|| -> std::io::Result<()> {
            if let Some(parent) = self.path.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)?;
            let json = serde_json::to_string(line).map_err(std::io::Error::other)?;
            writeln!(file, "{json}")
        })();
        if let Err(error) = written {
            debug!(error = %error, "failed to record telemetry event");
        }
    }
}

impl TelemetrySink for FileTelemetry {
    fn send_event(&self, name: &str, properties: HashMap<String, String>) {
        self.append(&EventLine {
            event: name,
            properties: &properties,
            error: None,
        });
    }

    fn send_error_event(
        &self,
        name: &str,
        properties: HashMap<String, String>,
        error: &EngineError,
    ) {
        self.append(&EventLine {
            event: name,
            properties: &properties,
            error: Some(ErrorDetails::from_error(error)),
        });
    }
}
