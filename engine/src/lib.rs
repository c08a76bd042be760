//! Command resolution, validation, and execution pipeline.
//!
//! This crate turns a static [`Command`](command_engine_core::Command) tree
//! plus a pre-split invocation into a dispatched handler call with uniform
//! telemetry and error normalization:
//!
//! - [`find_command`] — greedy longest-prefix resolution of tokens to the
//!   deepest matching node.
//! - [`Invocation`] / [`bind`] — mapping raw flag occurrences and
//!   positional tokens onto declared options and arguments.
//! - [`Engine`] — the pipeline: resolve → bind → validate → interactive
//!   completion → dispatch → result processing, with exactly one telemetry
//!   emission per run.
//! - [`instrument`] — start/success-or-error telemetry envelope around
//!   long-running business actions, tagging failures with their component.
//! - Collaborator ports: [`Logger`], [`telemetry::TelemetrySink`],
//!   [`PromptProvider`], each with plain built-in implementations.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use command_engine::{ConsoleLogger, Engine, Invocation};
//! use command_engine::telemetry::NullTelemetry;
//! use command_engine_core::{Command, CommandArgument, OptionKind};
//!
//! let root = Command::new("forge").with_version("0.1.0").with_child(
//!     Command::new("new").with_child(
//!         Command::new("template")
//!             .with_argument(CommandArgument::required("template-name", OptionKind::Text))
//!             .with_handler(|ctx| {
//!                 let _name = ctx.argument(0);
//!                 Ok(())
//!             }),
//!     ),
//! );
//!
//! let engine = Engine::new(Arc::new(ConsoleLogger::default()), Arc::new(NullTelemetry));
//! let invocation = Invocation::new(vec![
//!     "new".into(),
//!     "template".into(),
//!     "hello-world".into(),
//! ]);
//! assert_eq!(engine.run(&root, &invocation).exit_code(), 0);
//! ```

mod bind;
mod engine;
mod help;
mod instrument;
mod logger;
pub mod prompt;
mod resolve;
pub mod telemetry;

pub use bind::{HELP_FLAGS, Invocation, RawOption, VERSION_FLAGS, bind, is_reserved_flag};
pub use engine::{Engine, EngineOptions, Outcome};
pub use help::render_help;
pub use instrument::instrument;
pub use logger::{ConsoleLogger, LogLevel, Logger, MemoryLogger};
pub use prompt::{NonInteractive, PromptError, PromptProvider, PromptRequest, PromptShape};
pub use resolve::{Resolution, find_command};
pub use telemetry::{MemoryTelemetry, NullTelemetry, TelemetrySink};
