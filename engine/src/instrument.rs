//! Telemetry instrumentation for long-running business actions.
//!
//! A higher-order wrapper applied at call sites around project creation,
//! provisioning, generation, and similar actions: a start event before the
//! action, a success or error event after, and — on failure — a component
//! tag on the propagating error. Wrappers compose by nesting; the action's
//! success value passes through untouched and the error's kind survives any
//! number of tags.

use std::collections::HashMap;

use command_engine_core::{EngineError, Result};
use tracing::debug;

use crate::telemetry::{TelemetrySink, events, properties};

/// Runs `action` inside a start/success-or-error telemetry envelope.
///
/// On failure the returned error is wrapped in
/// [`EngineError::Tagged`] with the given component; classification
/// ([`EngineError::kind`], [`EngineError::is_user_error`]) sees through the
/// tag, so wrapping never converts an error's kind.
///
/// # Examples
///
/// ```
/// use command_engine::telemetry::MemoryTelemetry;
/// use command_engine::instrument;
///
/// let sink = MemoryTelemetry::default();
/// let result = instrument(&sink, "generator", "scaffold", || Ok::<_, _>(42));
///
/// assert_eq!(result.unwrap(), 42);
/// let names: Vec<String> = sink.records().into_iter().map(|r| r.name).collect();
/// assert_eq!(names, vec!["scaffold-start", "scaffold"]);
/// ```
pub fn instrument<T>(
    telemetry: &dyn TelemetrySink,
    component: &str,
    event: &str,
    action: impl FnOnce() -> Result<T>,
) -> Result<T> {
    let mut base = HashMap::new();
    base.insert(
        properties::COMPONENT.to_string(),
        component.to_string(),
    );
    telemetry.send_event(&events::start(event), base.clone());
    debug!(component, event, "action started");

    match action() {
        Ok(value) => {
            base.insert(properties::SUCCESS.to_string(), properties::YES.to_string());
            telemetry.send_event(event, base);
            Ok(value)
        }
        Err(error) => {
            let tagged = EngineError::Tagged {
                component: component.to_string(),
                source: Box::new(error),
            };
            base.insert(properties::SUCCESS.to_string(), properties::NO.to_string());
            base.insert(
                properties::ERROR_KIND.to_string(),
                tagged.kind().to_string(),
            );
            telemetry.send_error_event(event, base, &tagged);
            Err(tagged)
        }
    }
}
