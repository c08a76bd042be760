//! Error taxonomy for the command engine.
//!
//! One variant per failure class in the execution pipeline: input
//! validation, command resolution, user cancellation, and handler plumbing.
//! Instrumentation wrappers tag errors with a component identifier via
//! [`EngineError::Tagged`]; classification always unwraps tags, so the
//! original kind is preserved through any number of wrapping layers.

use thiserror::Error;

/// Errors produced by the engine and by command handlers.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A bound option or argument value failed validation, or a required
    /// one is unresolved after interactive completion. Always names the
    /// offending option.
    #[error("invalid value for '{option}': {reason}")]
    InputValidation {
        /// Name of the option or argument that failed.
        option: String,
        /// Human-readable reason.
        reason: String,
    },

    /// An undeclared flag was supplied in strict mode.
    #[error("unknown option '{name}'")]
    UnknownOption {
        /// The flag token as supplied.
        name: String,
    },

    /// A token under a router node matched no child command.
    #[error("unknown command '{token}' under '{path}'")]
    UnknownCommand {
        /// The unmatched token.
        token: String,
        /// Path of the deepest matched node.
        path: String,
    },

    /// Resolution stopped at a node with no handler and no further match.
    #[error("'{path}' requires a subcommand")]
    IncompleteCommand {
        /// Path of the matched node.
        path: String,
    },

    /// The user cancelled an interactive prompt. Expected termination, not
    /// a system fault.
    #[error("operation cancelled by user")]
    Cancelled,

    /// An error tagged with its originating component by an
    /// instrumentation wrapper. Transparent for classification.
    #[error("{component}: {source}")]
    Tagged {
        /// Component identifier (e.g. `generator`).
        component: String,
        /// The original error, kind preserved.
        #[source]
        source: Box<EngineError>,
    },

    /// File I/O failure inside a handler.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failure inside a handler.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Normalized handler panic or otherwise unclassified failure.
    #[error("unexpected error: {message}")]
    Unexpected {
        /// Panic payload or failure description.
        message: String,
    },
}

impl EngineError {
    /// Creates an [`EngineError::InputValidation`] error.
    pub fn input_validation(option: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InputValidation {
            option: option.into(),
            reason: reason.into(),
        }
    }

    /// The innermost error, with all component tags stripped.
    pub fn root(&self) -> &EngineError {
        match self {
            Self::Tagged { source, .. } => source.root(),
            other => other,
        }
    }

    /// Component tags from outermost to innermost wrapper.
    pub fn components(&self) -> Vec<&str> {
        let mut components = Vec::new();
        let mut current = self;
        while let Self::Tagged { component, source } = current {
            components.push(component.as_str());
            current = source;
        }
        components
    }

    /// Stable machine name for telemetry, unwrapping component tags.
    pub fn kind(&self) -> &'static str {
        match self.root() {
            Self::InputValidation { .. } => "input-validation",
            Self::UnknownOption { .. } => "unknown-option",
            Self::UnknownCommand { .. } => "unknown-command",
            Self::IncompleteCommand { .. } => "incomplete-command",
            Self::Cancelled => "user-cancel",
            Self::Io(_) => "io",
            Self::Json(_) => "json",
            Self::Unexpected { .. } => "unexpected",
            Self::Tagged { .. } => unreachable!("root() strips tags"),
        }
    }

    /// Whether the failure is attributable to user input (drives exit codes
    /// and log severity). Cancellation counts as a user outcome.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self.root(),
            Self::InputValidation { .. }
                | Self::UnknownOption { .. }
                | Self::UnknownCommand { .. }
                | Self::IncompleteCommand { .. }
                | Self::Cancelled
        )
    }
}

/// Convenience alias for results with [`EngineError`].
pub type Result<T> = std::result::Result<T, EngineError>;
