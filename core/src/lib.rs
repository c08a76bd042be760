//! Core command tree, option model, and validation primitives.
//!
//! This crate defines the static description of a command-line surface and
//! the validation rules applied to it:
//!
//! - [`Command`] — a named node in the command tree: options, positional
//!   arguments, children, and an optional handler.
//! - [`CommandOption`] / [`CommandArgument`] — typed, named input slots.
//! - [`OptionKind`] / [`OptionValue`] — the closed kind/value unions.
//! - [`CliContext`] — per-invocation state (bound values, telemetry
//!   properties), exclusively owned by one pipeline run.
//! - [`EngineError`] — the engine-wide error taxonomy.
//!
//! Tree validation ([`validate_tree`]) catches structural errors — duplicate
//! children, duplicate options, cycles, malformed choices — once at
//! construction time. Value validation ([`validate_option`],
//! [`validate_argument`]) checks bound values during execution.
//!
//! # Example
//!
//! ```
//! use command_engine_core::*;
//!
//! let root = Command::new("forge")
//!     .with_option(CommandOption::flag("verbose").with_shortcut("v"))
//!     .with_child(
//!         Command::new("new")
//!             .with_option(
//!                 CommandOption::single_select("capability", &["tab", "bot"]).require(),
//!             )
//!             .with_handler(|_ctx| Ok(())),
//!     );
//!
//! assert!(validate_tree(&root).is_empty());
//! assert!(root.find_child("new").is_some());
//! ```

mod context;
mod error;
mod types;
mod validate;

pub use context::CliContext;
pub use error::{EngineError, Result};
pub use types::*;
pub use validate::{
    TreeError, validate_argument, validate_option, validate_tree, validate_value,
};
