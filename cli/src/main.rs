//! `forge` — a project toolkit CLI assembled on the command engine.

mod args;
mod commands;
mod prompts;
mod settings;
mod telemetry;

use std::collections::HashMap;
use std::sync::Arc;

use command_engine::telemetry::{NullTelemetry, TelemetrySink, events, properties};
use command_engine::{ConsoleLogger, Engine, EngineOptions, HELP_FLAGS, Invocation, LogLevel};
use command_engine_core::validate_tree;
use tracing_subscriber::EnvFilter;

fn main() {
    let argv: Vec<String> = std::env::args().skip(1).collect();

    let user_settings =
        settings::UserSettings::load(&settings::settings_path()).unwrap_or_default();

    let sink: Arc<dyn TelemetrySink> = if user_settings.telemetry {
        Arc::new(telemetry::FileTelemetry::new(
            settings::settings_dir().join("telemetry.jsonl"),
        ))
    } else {
        Arc::new(NullTelemetry)
    };

    let root = commands::root_command(sink.clone());
    let tree_errors = validate_tree(&root);
    if !tree_errors.is_empty() {
        for error in &tree_errors {
            eprintln!("command tree error: {error}");
        }
        std::process::exit(2);
    }

    let table = args::flag_table(&root);
    let invocation = args::split_invocation(&argv, &table);

    init_tracing(&invocation);
    send_usage_telemetry(sink.as_ref(), &invocation);

    let threshold = if invocation.has_flag(&["debug", "verbose"]) {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };
    let engine = Engine::new(Arc::new(ConsoleLogger::new(threshold)), sink)
        .with_prompter(Arc::new(prompts::DialoguerPrompter))
        .with_options(EngineOptions {
            strict: true,
            interactive: user_settings.interactive,
        });

    let outcome = engine.run(&root, &invocation);
    std::process::exit(outcome.exit_code());
}

fn init_tracing(invocation: &Invocation) {
    let level = if invocation.has_flag(&["debug"]) {
        "debug"
    } else if invocation.has_flag(&["verbose"]) {
        "info"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// One usage event per process, sent before the pipeline runs (the pipeline
/// itself emits exactly one outcome event).
fn send_usage_telemetry(sink: &dyn TelemetrySink, invocation: &Invocation) {
    let mut props = HashMap::new();
    props.insert(
        properties::COMMAND_HEAD.to_string(),
        invocation.tokens.first().cloned().unwrap_or_default(),
    );
    props.insert(
        properties::COMMAND_BODY.to_string(),
        invocation.tokens.join(" "),
    );
    let mut names: Vec<&str> = invocation.options.iter().map(|o| o.name.as_str()).collect();
    names.sort_unstable();
    names.dedup();
    props.insert(properties::OPTIONS.to_string(), names.join(","));
    props.insert(
        properties::HELP.to_string(),
        invocation.has_flag(HELP_FLAGS).to_string(),
    );
    let level = if invocation.has_flag(&["debug"]) {
        "debug"
    } else if invocation.has_flag(&["verbose"]) {
        "verbose"
    } else {
        "info"
    };
    props.insert(properties::LOG_LEVEL.to_string(), level.to_string());

    sink.send_event(events::COMMAND_USAGE, props);
}
