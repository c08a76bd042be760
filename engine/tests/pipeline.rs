use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use command_engine::telemetry::properties;
use command_engine::{
    Engine, EngineOptions, Invocation, LogLevel, MemoryLogger, MemoryTelemetry, Outcome,
    PromptError, PromptProvider, PromptRequest, find_command,
};
use command_engine_core::{
    Command, CommandArgument, CommandOption, EngineError, OptionKind, OptionValue,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Prompt provider that replays a scripted answer queue; an exhausted queue
/// cancels.
struct ScriptedPrompter {
    answers: Mutex<VecDeque<OptionValue>>,
}

impl ScriptedPrompter {
    fn new(answers: Vec<OptionValue>) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
        }
    }

    fn cancelling() -> Self {
        Self::new(Vec::new())
    }
}

impl PromptProvider for ScriptedPrompter {
    fn prompt(&self, _request: &PromptRequest) -> Result<OptionValue, PromptError> {
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(PromptError::Cancelled)
    }
}

struct Fixture {
    root: Command,
    logger: Arc<MemoryLogger>,
    telemetry: Arc<MemoryTelemetry>,
    invocations: Arc<AtomicUsize>,
}

/// Tree shaped like the surveyed toolkit surface: root → `new` →
/// `template`, with a handler counter shared across leaves.
fn fixture() -> Fixture {
    let invocations = Arc::new(AtomicUsize::new(0));

    let template_count = invocations.clone();
    let new_count = invocations.clone();
    let root_count = invocations.clone();

    let root = Command::new("cli")
        .with_version("1.2.3")
        .with_option(CommandOption::flag("verbose"))
        .with_option(CommandOption::flag("interactive").with_shortcut("i"))
        .with_handler(move |_ctx| {
            root_count.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .with_child(
            Command::new("new")
                .with_option(
                    CommandOption::single_select("capability", &["tab", "bot"])
                        .with_shortcut("c")
                        .require(),
                )
                .with_option(CommandOption::text("app-name").with_shortcut("n").require())
                .with_option(CommandOption::multi_select("features", &["sso", "ci"]))
                .with_handler(move |_ctx| {
                    new_count.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                })
                .with_child(
                    Command::new("template")
                        .with_usage("template <template-name>")
                        .with_argument(CommandArgument::required(
                            "template-name",
                            OptionKind::Text,
                        ))
                        .with_handler(move |ctx| {
                            template_count.fetch_add(1, Ordering::SeqCst);
                            assert!(ctx.argument(0).is_some());
                            Ok(())
                        }),
                ),
        );

    Fixture {
        root,
        logger: Arc::new(MemoryLogger::default()),
        telemetry: Arc::new(MemoryTelemetry::default()),
        invocations,
    }
}

fn engine_for(fixture: &Fixture) -> Engine {
    Engine::new(fixture.logger.clone(), fixture.telemetry.clone())
}

fn tokens(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|p| p.to_string()).collect()
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

#[test]
fn finds_new_template_command() {
    let fixture = fixture();
    let toks = tokens(&["new", "template"]);

    let resolution = find_command(&fixture.root, &toks);
    assert_eq!(resolution.command.name, "template");
    assert!(resolution.remaining.is_empty());
}

// ---------------------------------------------------------------------------
// Pipeline outcomes
// ---------------------------------------------------------------------------

#[test]
fn displays_version() {
    let fixture = fixture();
    let engine = engine_for(&fixture);

    let invocation = Invocation::new(Vec::new()).with_option("version", None);
    let outcome = engine.run(&fixture.root, &invocation);

    assert!(matches!(outcome, Outcome::VersionShown));
    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(fixture.logger.messages_at(LogLevel::Info), vec!["1.2.3"]);
    assert_eq!(fixture.telemetry.len(), 1);
    assert!(!fixture.telemetry.records()[0].is_error());
}

#[test]
fn displays_help_message_once() {
    let fixture = fixture();
    let engine = engine_for(&fixture);

    let invocation = Invocation::new(Vec::new()).with_option("h", None);
    let outcome = engine.run(&fixture.root, &invocation);

    assert!(matches!(outcome, Outcome::HelpShown));
    let infos = fixture.logger.messages_at(LogLevel::Info);
    assert_eq!(infos.len(), 1);
    assert!(infos[0].contains("Usage: cli"));
    assert_eq!(fixture.invocations.load(Ordering::SeqCst), 0);
}

#[test]
fn runs_handler_with_argument() {
    let fixture = fixture();
    let engine = engine_for(&fixture);

    let invocation = Invocation::new(tokens(&["new", "template", "sample-name"]));
    let outcome = engine.run(&fixture.root, &invocation);

    assert!(matches!(outcome, Outcome::Completed));
    assert_eq!(fixture.invocations.load(Ordering::SeqCst), 1);

    // exactly one success log line and one success telemetry event
    assert_eq!(fixture.logger.messages_at(LogLevel::Info).len(), 1);
    let records = fixture.telemetry.records();
    assert_eq!(records.len(), 1);
    assert!(!records[0].is_error());
    assert_eq!(
        records[0].properties.get(properties::SUCCESS).map(String::as_str),
        Some(properties::YES)
    );
    assert_eq!(
        records[0].properties.get(properties::COMMAND).map(String::as_str),
        Some("cli new template")
    );
}

#[test]
fn validation_fails_for_bad_capability() {
    let fixture = fixture();
    let engine = engine_for(&fixture);

    let invocation = Invocation::new(tokens(&["new"]))
        .with_option("c", Some("vr"))
        .with_option("n", Some("myapp"))
        .with_option("i", Some("false"));
    let outcome = engine.run(&fixture.root, &invocation);

    let error = outcome.error().expect("must fail");
    assert!(matches!(
        error,
        EngineError::InputValidation { option, .. } if option == "capability"
    ));
    assert_eq!(outcome.exit_code(), 1);
    assert_eq!(fixture.invocations.load(Ordering::SeqCst), 0);
}

#[test]
fn multi_select_outside_choices_is_validation_error() {
    let fixture = fixture();
    let engine = engine_for(&fixture);

    let invocation = Invocation::new(tokens(&["new"]))
        .with_option("c", Some("tab"))
        .with_option("n", Some("myapp"))
        .with_option("features", Some("sso,unknown"));
    let outcome = engine.run(&fixture.root, &invocation);

    let error = outcome.error().expect("must fail");
    assert!(matches!(
        error,
        EngineError::InputValidation { option, .. } if option == "features"
    ));
}

#[test]
fn required_option_fails_before_handler_in_non_interactive_mode() {
    let fixture = fixture();
    let engine = engine_for(&fixture);

    // app-name and capability both missing, interactive off
    let invocation = Invocation::new(tokens(&["new"])).with_option("i", Some("false"));
    let outcome = engine.run(&fixture.root, &invocation);

    let error = outcome.error().expect("must fail");
    assert_eq!(error.kind(), "input-validation");
    assert_eq!(fixture.invocations.load(Ordering::SeqCst), 0);

    let records = fixture.telemetry.records();
    assert_eq!(records.len(), 1);
    assert!(records[0].is_error());
}

#[test]
fn unknown_command_token_is_user_error() {
    let fixture = fixture();
    let engine = engine_for(&fixture);

    let invocation = Invocation::new(tokens(&["new", "bogus"]));
    let outcome = engine.run(&fixture.root, &invocation);

    // "new" has a handler, so "bogus" binds nowhere and strict mode rejects
    let error = outcome.error().expect("must fail");
    assert!(matches!(error, EngineError::UnknownCommand { token, .. } if token == "bogus"));
    assert_eq!(outcome.exit_code(), 1);
}

// ---------------------------------------------------------------------------
// Interactive completion
// ---------------------------------------------------------------------------

#[test]
fn interactive_fill_in_supplies_missing_required_options() {
    let fixture = fixture();
    let prompter = Arc::new(ScriptedPrompter::new(vec![
        OptionValue::Text("tab".into()),
        OptionValue::Text("myapp".into()),
    ]));
    let engine = engine_for(&fixture).with_prompter(prompter);

    let invocation = Invocation::new(tokens(&["new"])).with_option("i", Some("true"));
    let outcome = engine.run(&fixture.root, &invocation);

    assert!(matches!(outcome, Outcome::Completed), "{outcome:?}");
    assert_eq!(fixture.invocations.load(Ordering::SeqCst), 1);
}

#[test]
fn cancelled_prompt_aborts_without_dispatch() {
    let fixture = fixture();
    let engine = engine_for(&fixture)
        .with_prompter(Arc::new(ScriptedPrompter::cancelling()))
        .with_options(EngineOptions {
            strict: true,
            interactive: true,
        });

    let invocation = Invocation::new(tokens(&["new"]));
    let outcome = engine.run(&fixture.root, &invocation);

    let error = outcome.error().expect("must fail");
    assert!(matches!(error, EngineError::Cancelled));
    assert_eq!(outcome.exit_code(), 1);
    assert_eq!(fixture.invocations.load(Ordering::SeqCst), 0);

    let records = fixture.telemetry.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].error.as_ref().unwrap().kind, "user-cancel");
}

#[test]
fn prompted_answer_is_revalidated() {
    let fixture = fixture();
    let prompter = Arc::new(ScriptedPrompter::new(vec![OptionValue::Text("vr".into())]));
    let engine = engine_for(&fixture).with_prompter(prompter);

    let invocation = Invocation::new(tokens(&["new"])).with_option("i", Some("true"));
    let outcome = engine.run(&fixture.root, &invocation);

    let error = outcome.error().expect("must fail");
    assert!(matches!(
        error,
        EngineError::InputValidation { option, .. } if option == "capability"
    ));
    assert_eq!(fixture.invocations.load(Ordering::SeqCst), 0);
}

// ---------------------------------------------------------------------------
// Error normalization
// ---------------------------------------------------------------------------

#[test]
fn handler_returned_error_is_normalized() {
    let fixture = fixture();
    let root = Command::new("cli").with_handler(|_ctx| Err(EngineError::Cancelled));
    let engine = engine_for(&fixture);

    let outcome = engine.run(&root, &Invocation::new(Vec::new()));

    assert!(matches!(outcome.error(), Some(EngineError::Cancelled)));
    assert_eq!(fixture.telemetry.records()[0].error.as_ref().unwrap().kind, "user-cancel");
}

#[test]
fn handler_panic_is_normalized_identically() {
    let fixture = fixture();
    let root =
        Command::new("cli").with_handler(|_ctx| std::panic::panic_any(EngineError::Cancelled));
    let engine = engine_for(&fixture);

    let outcome = engine.run(&root, &Invocation::new(Vec::new()));

    assert!(matches!(outcome.error(), Some(EngineError::Cancelled)));
    assert_eq!(outcome.exit_code(), 1);
    assert_eq!(fixture.telemetry.len(), 1);
}

#[test]
fn handler_message_panic_becomes_system_error() {
    let fixture = fixture();
    let root = Command::new("cli").with_handler(|_ctx| panic!("scaffold exploded"));
    let engine = engine_for(&fixture);

    let outcome = engine.run(&root, &Invocation::new(Vec::new()));

    let error = outcome.error().expect("must fail");
    assert!(matches!(
        error,
        EngineError::Unexpected { message } if message.contains("scaffold exploded")
    ));
    assert_eq!(outcome.exit_code(), 2);
}

#[test]
fn router_without_subcommand_shows_help() {
    let fixture = fixture();
    let root = Command::new("cli").with_child(Command::new("config").with_child(
        Command::new("get").with_handler(|_ctx| Ok(())),
    ));
    let engine = engine_for(&fixture);

    let outcome = engine.run(&root, &Invocation::new(tokens(&["config"])));

    assert!(matches!(outcome, Outcome::HelpShown));
    assert_eq!(outcome.exit_code(), 0);
    let infos = fixture.logger.messages_at(LogLevel::Info);
    assert_eq!(infos.len(), 1);
    assert!(infos[0].contains("Usage: cli config"));
}

#[test]
fn leaf_without_handler_is_incomplete_command() {
    let fixture = fixture();
    let root = Command::new("cli").with_child(Command::new("stub"));
    let engine = engine_for(&fixture);

    let outcome = engine.run(&root, &Invocation::new(tokens(&["stub"])));

    let error = outcome.error().expect("must fail");
    assert!(matches!(error, EngineError::IncompleteCommand { .. }));
    assert_eq!(outcome.exit_code(), 1);
}

// ---------------------------------------------------------------------------
// Telemetry contract
// ---------------------------------------------------------------------------

#[test]
fn exactly_one_emission_per_run_matching_outcome() {
    let fixture = fixture();
    let engine = engine_for(&fixture);

    let success = Invocation::new(tokens(&["new", "template", "x"]));
    engine.run(&fixture.root, &success);

    let failure = Invocation::new(tokens(&["new"])).with_option("i", Some("false"));
    engine.run(&fixture.root, &failure);

    let records = fixture.telemetry.records();
    assert_eq!(records.len(), 2);
    assert!(!records[0].is_error());
    assert!(records[1].is_error());
    assert_eq!(
        records[1].properties.get(properties::SUCCESS).map(String::as_str),
        Some(properties::NO)
    );
}
