//! Per-invocation resolution context.

use std::collections::HashMap;

use serde::Serialize;

use crate::types::OptionValue;

/// State accumulated while resolving and executing a single invocation.
///
/// Exclusively owned by one pipeline run; the static command tree is never
/// mutated. `option_values` keys are always a subset of the matched node's
/// declared option names — unknown tokens never populate the map.
///
/// # Examples
///
/// ```
/// use command_engine_core::{CliContext, OptionValue};
///
/// let mut ctx = CliContext::default();
/// ctx.command_path = vec!["forge".into(), "new".into()];
/// ctx.global_option_values
///     .insert("verbose".into(), OptionValue::Flag(true));
///
/// assert_eq!(ctx.full_command(), "forge new");
/// assert_eq!(ctx.flag_option("verbose"), Some(true));
/// ```
#[derive(Debug, Clone, Default, Serialize)]
pub struct CliContext {
    /// Node names from the root to the matched command.
    pub command_path: Vec<String>,
    /// Token suffix not consumed by path matching or positional binding.
    pub remaining_args: Vec<String>,
    /// Bound values for the matched command's own options.
    pub option_values: HashMap<String, OptionValue>,
    /// Bound values for options inherited from ancestor commands.
    pub global_option_values: HashMap<String, OptionValue>,
    /// Positional bindings, in declaration order.
    pub argument_values: Vec<OptionValue>,
    /// Flat property map emitted with the final telemetry event.
    pub telemetry_properties: HashMap<String, String>,
}

impl CliContext {
    /// The matched command path as a single display string.
    pub fn full_command(&self) -> String {
        self.command_path.join(" ")
    }

    /// Looks up a bound option, local scope first, then inherited globals.
    pub fn option(&self, name: &str) -> Option<&OptionValue> {
        self.option_values
            .get(name)
            .or_else(|| self.global_option_values.get(name))
    }

    /// Text content of a bound option, if present and text-valued.
    pub fn text_option(&self, name: &str) -> Option<&str> {
        self.option(name).and_then(OptionValue::as_text)
    }

    /// Boolean content of a bound option, if present and flag-valued.
    pub fn flag_option(&self, name: &str) -> Option<bool> {
        self.option(name).and_then(OptionValue::as_flag)
    }

    /// List content of a bound option, if present and list-valued.
    pub fn list_option(&self, name: &str) -> Option<&[String]> {
        self.option(name).and_then(OptionValue::as_list)
    }

    /// Positional binding by declaration index.
    pub fn argument(&self, index: usize) -> Option<&OptionValue> {
        self.argument_values.get(index)
    }

    /// Records a property for the final telemetry emission.
    pub fn set_telemetry_property(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.telemetry_properties.insert(key.into(), value.into());
    }
}
