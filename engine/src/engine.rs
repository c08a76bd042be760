//! The execution pipeline: resolve → bind → validate → interactive
//! completion → dispatch → result processing.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use chrono::Utc;
use command_engine_core::{
    CliContext, Command, CommandHandler, EngineError, OptionKind, OptionValue, Result,
    validate_argument, validate_option, validate_value,
};
use tracing::debug;

use crate::bind::{HELP_FLAGS, Invocation, VERSION_FLAGS, bind, parse_scalar};
use crate::help::render_help;
use crate::logger::Logger;
use crate::prompt::{NonInteractive, PromptError, PromptProvider, PromptRequest, PromptShape};
use crate::resolve::{Resolution, find_command};
use crate::telemetry::{TelemetrySink, events, properties};

/// Engine-level switches, fixed at construction.
#[derive(Debug, Clone, Copy)]
pub struct EngineOptions {
    /// Reject undeclared flags and leftover tokens.
    pub strict: bool,
    /// Interactive fallback when the invocation sets no `interactive` flag.
    pub interactive: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            strict: true,
            interactive: false,
        }
    }
}

/// How a run ended before result processing.
enum Completion {
    /// A handler ran to success.
    Handled,
    /// Help text was rendered.
    HelpShown,
    /// The root version string was printed.
    VersionShown,
}

/// Normalized outcome of one pipeline run.
#[derive(Debug)]
pub enum Outcome {
    /// A handler completed successfully.
    Completed,
    /// Help text was shown (including incomplete router invocations).
    HelpShown,
    /// The version string was shown.
    VersionShown,
    /// The run failed; the error keeps its original kind.
    Failed(EngineError),
}

impl Outcome {
    /// Process exit code: 0 for success/help/version, 1 for user errors
    /// (validation, unknown command, cancellation), 2 for system errors.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Completed | Self::HelpShown | Self::VersionShown => 0,
            Self::Failed(error) if error.is_user_error() => 1,
            Self::Failed(_) => 2,
        }
    }

    /// Whether the run ended without an error.
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }

    /// The failure, if any.
    pub fn error(&self) -> Option<&EngineError> {
        match self {
            Self::Failed(error) => Some(error),
            _ => None,
        }
    }
}

/// The command execution engine.
///
/// Holds the process-scoped collaborators — logger, telemetry sink, prompt
/// provider — injected once at startup; each [`run`](Engine::run) owns its
/// own [`CliContext`], so one engine can serve any number of sequential
/// invocations without shared per-run state.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use command_engine::{ConsoleLogger, Engine, Invocation};
/// use command_engine::telemetry::NullTelemetry;
/// use command_engine_core::Command;
///
/// let root = Command::new("forge")
///     .with_version("1.0.0")
///     .with_child(Command::new("new").with_handler(|_ctx| Ok(())));
///
/// let engine = Engine::new(Arc::new(ConsoleLogger::default()), Arc::new(NullTelemetry));
/// let outcome = engine.run(&root, &Invocation::new(vec!["new".into()]));
/// assert_eq!(outcome.exit_code(), 0);
/// ```
pub struct Engine {
    logger: Arc<dyn Logger>,
    telemetry: Arc<dyn TelemetrySink>,
    prompter: Arc<dyn PromptProvider>,
    options: EngineOptions,
}

impl Engine {
    /// Creates an engine with the given logger and telemetry sink. The
    /// prompt provider defaults to [`NonInteractive`].
    pub fn new(logger: Arc<dyn Logger>, telemetry: Arc<dyn TelemetrySink>) -> Self {
        Self {
            logger,
            telemetry,
            prompter: Arc::new(NonInteractive),
            options: EngineOptions::default(),
        }
    }

    /// Replaces the prompt provider.
    pub fn with_prompter(mut self, prompter: Arc<dyn PromptProvider>) -> Self {
        self.prompter = prompter;
        self
    }

    /// Replaces the engine options.
    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    /// Runs one invocation against a command tree.
    ///
    /// Exactly one telemetry event is emitted per call — success or error,
    /// matching the returned outcome.
    pub fn run(&self, root: &Command, invocation: &Invocation) -> Outcome {
        let mut ctx = CliContext::default();
        let result = self.execute(root, invocation, &mut ctx);
        self.process_result(&mut ctx, result)
    }

    fn execute(
        &self,
        root: &Command,
        invocation: &Invocation,
        ctx: &mut CliContext,
    ) -> Result<Completion> {
        let resolution = find_command(root, &invocation.tokens);
        ctx.command_path = resolution.path_names();

        // Help and version preempt binding: `--help` must work even when
        // the rest of the invocation would not validate.
        if invocation.has_flag(HELP_FLAGS) {
            self.logger.info(&render_help(&resolution.path));
            return Ok(Completion::HelpShown);
        }
        if invocation.has_flag(VERSION_FLAGS) {
            if let Some(version) = &root.version {
                self.logger.info(version);
                return Ok(Completion::VersionShown);
            }
        }

        bind(&resolution, invocation, self.options.strict, ctx)?;

        // Bad values fail here; absent required slots wait for fill-in.
        self.validate_bound(&resolution, ctx, false)?;

        if self.interactive_enabled(ctx) {
            self.fill_missing(&resolution, ctx)?;
        }

        self.validate_bound(&resolution, ctx, true)?;

        self.dispatch(&resolution, ctx)
    }

    /// Validates every bound option (local and global) and positional
    /// argument. With `check_required` unset, absent slots are skipped so
    /// interactive completion can still fill them.
    fn validate_bound(
        &self,
        resolution: &Resolution<'_, '_>,
        ctx: &CliContext,
        check_required: bool,
    ) -> Result<()> {
        for option in &resolution.command.options {
            let value = ctx.option_values.get(&option.name);
            if value.is_none() && !check_required {
                continue;
            }
            validate_option(option, value)?;
        }

        // Ancestor options are inherited for binding, but their
        // requiredness only applies when the ancestor itself is matched.
        for ancestor in resolution.ancestors() {
            for option in &ancestor.options {
                if let Some(value) = ctx.global_option_values.get(&option.name) {
                    validate_value(&option.name, &option.kind, false, Some(value))?;
                }
            }
        }

        for (index, argument) in resolution.command.arguments.iter().enumerate() {
            let value = ctx.argument_values.get(index);
            if value.is_none() && !check_required {
                continue;
            }
            validate_argument(argument, value)?;
        }

        Ok(())
    }

    fn interactive_enabled(&self, ctx: &CliContext) -> bool {
        ctx.flag_option("interactive")
            .unwrap_or(self.options.interactive)
    }

    /// Prompts for required options and arguments still unset, strictly one
    /// at a time; each answer is validated before it is accepted.
    fn fill_missing(&self, resolution: &Resolution<'_, '_>, ctx: &mut CliContext) -> Result<()> {
        for option in &resolution.command.options {
            if !option.required || ctx.option_values.contains_key(&option.name) {
                continue;
            }
            let value = self.prompt_for(
                &option.name,
                option.description.as_deref(),
                &option.kind,
                option.default.clone(),
            )?;
            validate_option(option, Some(&value))?;
            ctx.option_values.insert(option.name.clone(), value);
        }

        for index in ctx.argument_values.len()..resolution.command.arguments.len() {
            let argument = &resolution.command.arguments[index];
            if !argument.required {
                break;
            }
            let value = self.prompt_for(
                &argument.name,
                argument.description.as_deref(),
                &argument.kind,
                None,
            )?;
            validate_argument(argument, Some(&value))?;
            ctx.argument_values.push(value);
        }

        Ok(())
    }

    fn prompt_for(
        &self,
        name: &str,
        description: Option<&str>,
        kind: &OptionKind,
        default: Option<OptionValue>,
    ) -> Result<OptionValue> {
        let request = PromptRequest {
            name: name.to_string(),
            message: description.unwrap_or(name).to_string(),
            shape: PromptShape::for_kind(kind),
            default,
        };
        debug!(option = name, "prompting for missing value");

        let answer = match self.prompter.prompt(&request) {
            Ok(value) => value,
            Err(PromptError::Cancelled) => return Err(EngineError::Cancelled),
            Err(PromptError::Failed(message)) => {
                return Err(EngineError::Unexpected { message });
            }
        };

        // Free-text answers arrive as text regardless of kind; coerce to
        // the declared shape before validation.
        match (&answer, kind) {
            (OptionValue::Text(raw), OptionKind::Number | OptionKind::Array) => {
                parse_scalar(name, kind, raw)
            }
            _ => Ok(answer),
        }
    }

    fn dispatch(&self, resolution: &Resolution<'_, '_>, ctx: &mut CliContext) -> Result<Completion> {
        if let Some(handler) = &resolution.command.handler {
            debug!(command = %ctx.full_command(), "dispatching handler");
            invoke_handler(handler, ctx)?;
            return Ok(Completion::Handled);
        }

        if resolution.command.is_router() {
            // Incomplete invocation of a router is a help request, not a
            // hard error.
            self.logger.info(&render_help(&resolution.path));
            return Ok(Completion::HelpShown);
        }

        Err(EngineError::IncompleteCommand {
            path: ctx.full_command(),
        })
    }

    /// Normalizes the run result, appends outcome metadata to the telemetry
    /// properties, and emits the single per-run telemetry event.
    fn process_result(&self, ctx: &mut CliContext, result: Result<Completion>) -> Outcome {
        let command = ctx.full_command();
        ctx.set_telemetry_property(properties::COMMAND, command.clone());
        ctx.set_telemetry_property(
            properties::INTERACTIVE,
            self.interactive_enabled(ctx).to_string(),
        );
        let mut bound: Vec<&str> = ctx
            .option_values
            .keys()
            .chain(ctx.global_option_values.keys())
            .map(String::as_str)
            .collect();
        bound.sort_unstable();
        let bound = bound.join(",");
        ctx.set_telemetry_property(properties::OPTIONS, bound);
        ctx.set_telemetry_property(properties::TIMESTAMP, Utc::now().to_rfc3339());

        match result {
            Ok(completion) => {
                ctx.set_telemetry_property(properties::SUCCESS, properties::YES);
                self.telemetry
                    .send_event(events::COMMAND, ctx.telemetry_properties.clone());
                if matches!(completion, Completion::Handled) {
                    self.logger.info(&format!("'{command}' completed."));
                }
                match completion {
                    Completion::Handled => Outcome::Completed,
                    Completion::HelpShown => Outcome::HelpShown,
                    Completion::VersionShown => Outcome::VersionShown,
                }
            }
            Err(error) => {
                ctx.set_telemetry_property(properties::SUCCESS, properties::NO);
                ctx.set_telemetry_property(properties::ERROR_KIND, error.kind());
                ctx.set_telemetry_property(properties::ERROR_MESSAGE, error.root().to_string());
                let components = error.components();
                if !components.is_empty() {
                    ctx.set_telemetry_property(properties::COMPONENT, components.join("/"));
                }
                self.telemetry.send_error_event(
                    events::COMMAND,
                    ctx.telemetry_properties.clone(),
                    &error,
                );

                self.logger.error(&error.to_string());
                if matches!(
                    error.root(),
                    EngineError::UnknownCommand { .. } | EngineError::IncompleteCommand { .. }
                ) {
                    self.logger.info("Run with --help to see available commands.");
                }

                Outcome::Failed(error)
            }
        }
    }
}

/// Invokes a handler, converting a panic into a normalized error so that
/// thrown and returned failures share one exit path.
fn invoke_handler(handler: &CommandHandler, ctx: &mut CliContext) -> Result<()> {
    match catch_unwind(AssertUnwindSafe(|| (**handler)(ctx))) {
        Ok(result) => result,
        Err(payload) => Err(panic_to_error(payload)),
    }
}

fn panic_to_error(payload: Box<dyn Any + Send>) -> EngineError {
    match payload.downcast::<EngineError>() {
        Ok(error) => *error,
        Err(payload) => match payload.downcast::<String>() {
            Ok(message) => EngineError::Unexpected { message: *message },
            Err(payload) => match payload.downcast::<&'static str>() {
                Ok(message) => EngineError::Unexpected {
                    message: (*message).to_string(),
                },
                Err(_) => EngineError::Unexpected {
                    message: "handler panicked".to_string(),
                },
            },
        },
    }
}
