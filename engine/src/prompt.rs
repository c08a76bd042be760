//! Interactive prompt port.
//!
//! When required options remain unset after binding and the run is
//! interactive, the pipeline asks a [`PromptProvider`] to fill them in, one
//! prompt at a time. The prompt shape is derived from the option's kind and
//! choices; cancellation of any prompt aborts the whole run.

use command_engine_core::{OptionKind, OptionValue};
use thiserror::Error;

/// Shape of a single prompt, derived from the option kind.
#[derive(Debug, Clone, PartialEq)]
pub enum PromptShape {
    /// Free-form text entry (text, number, and array kinds).
    FreeText,
    /// Yes/no confirmation (flag kind).
    Confirm,
    /// Single choice list.
    Select {
        /// Choices, in display order.
        choices: Vec<String>,
    },
    /// Multiple choice list.
    MultiSelect {
        /// Choices, in display order.
        choices: Vec<String>,
    },
}

impl PromptShape {
    /// Derives the prompt shape for an option kind.
    pub fn for_kind(kind: &OptionKind) -> Self {
        match kind {
            OptionKind::Flag => Self::Confirm,
            OptionKind::SingleSelect { choices } => Self::Select {
                choices: choices.clone(),
            },
            OptionKind::MultiSelect { choices } => Self::MultiSelect {
                choices: choices.clone(),
            },
            OptionKind::Text | OptionKind::Number | OptionKind::Array => Self::FreeText,
        }
    }
}

/// A single prompt to put to the user.
#[derive(Debug, Clone)]
pub struct PromptRequest {
    /// Name of the option or argument being filled.
    pub name: String,
    /// Message shown to the user.
    pub message: String,
    /// How to ask.
    pub shape: PromptShape,
    /// Pre-selected default, if declared.
    pub default: Option<OptionValue>,
}

/// Failure modes of a prompt.
#[derive(Debug, Error)]
pub enum PromptError {
    /// The user cancelled; aborts the pipeline with a cancellation outcome.
    #[error("prompt cancelled")]
    Cancelled,
    /// The prompt backend failed.
    #[error("prompt failed: {0}")]
    Failed(String),
}

/// Given an option's kind/choices/description, returns a bound value or a
/// cancellation signal. Must be called strictly sequentially — one
/// outstanding prompt at a time.
pub trait PromptProvider: Send + Sync {
    /// Puts one prompt to the user.
    fn prompt(&self, request: &PromptRequest) -> Result<OptionValue, PromptError>;
}

/// Provider for non-interactive environments: cancels every prompt.
#[derive(Debug, Clone, Copy, Default)]
pub struct NonInteractive;

impl PromptProvider for NonInteractive {
    fn prompt(&self, _request: &PromptRequest) -> Result<OptionValue, PromptError> {
        Err(PromptError::Cancelled)
    }
}
