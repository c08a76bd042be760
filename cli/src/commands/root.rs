//! Root command: global options and child registration.

use std::sync::Arc;

use command_engine::telemetry::TelemetrySink;
use command_engine_core::{Command, CommandOption};

use super::{config, new};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Builds the full command tree. Constructed once at startup; the tree is
/// read-only afterwards and all per-invocation state lives in the context.
pub fn root_command(telemetry: Arc<dyn TelemetrySink>) -> Command {
    Command::new("forge")
        .with_version(VERSION)
        .with_description("Scaffold and manage toolkit projects.")
        .with_option(
            CommandOption::flag("verbose").with_description("Print additional information."),
        )
        .with_option(CommandOption::flag("debug").with_description("Print diagnostic information."))
        .with_option(
            CommandOption::flag("interactive")
                .with_shortcut("i")
                .with_description("Run the command interactively."),
        )
        .with_child(new::new_command(telemetry))
        .with_child(config::config_command())
}

#[cfg(test)]
mod tests {
    use super::*;
    use command_engine::NullTelemetry;
    use command_engine_core::validate_tree;

    #[test]
    fn test_tree_is_structurally_valid() {
        let root = root_command(Arc::new(NullTelemetry));
        assert!(validate_tree(&root).is_empty());
    }

    #[test]
    fn test_registered_commands() {
        let root = root_command(Arc::new(NullTelemetry));
        assert!(root.find_child("new").is_some());
        assert!(root.find_child("config").is_some());
        assert!(root.find_child("new").unwrap().find_child("template").is_some());
        assert!(root.find_child("config").unwrap().find_child("get").is_some());
        assert!(root.find_child("config").unwrap().find_child("set").is_some());
    }
}
