//! Tree-construction and value validation.
//!
//! [`validate_tree`] checks structural invariants of a command tree once at
//! construction time: empty names, duplicate options, duplicate children,
//! name cycles along a path, and malformed choice declarations. The resolver
//! relies on these guarantees and never re-checks them.
//!
//! [`validate_option`] and [`validate_argument`] check a single bound value
//! against its declaration during the pipeline's validation stage.
//!
//! # Examples
//!
//! ```
//! use command_engine_core::*;
//!
//! let root = Command::new("forge")
//!     .with_option(CommandOption::flag("verbose"))
//!     .with_child(Command::new("new"));
//! assert!(validate_tree(&root).is_empty());
//!
//! // Duplicate child → error
//! let bad = Command::new("forge")
//!     .with_child(Command::new("new"))
//!     .with_child(Command::new("new"));
//! assert!(!validate_tree(&bad).is_empty());
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::error::{EngineError, Result};
use crate::types::{Command, CommandArgument, CommandOption, OptionKind, OptionValue};

/// Structural problems found during tree construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// A command name is empty or whitespace-only.
    #[error("empty command name under '{path}'")]
    EmptyCommandName {
        /// Path of the parent scope.
        path: String,
    },
    /// Two children in the same scope share a name or alias.
    #[error("duplicate subcommand '{name}' under '{path}'")]
    DuplicateChild {
        /// Path of the parent scope.
        path: String,
        /// Conflicting name or alias.
        name: String,
    },
    /// An option name is empty.
    #[error("empty option name on '{path}'")]
    EmptyOptionName {
        /// Path of the owning command.
        path: String,
    },
    /// Two options in the same scope share a name or shortcut.
    #[error("duplicate option '{name}' on '{path}'")]
    DuplicateOption {
        /// Path of the owning command.
        path: String,
        /// Conflicting name or shortcut.
        name: String,
    },
    /// Two positional arguments on one command share a name.
    #[error("duplicate argument '{name}' on '{path}'")]
    DuplicateArgument {
        /// Path of the owning command.
        path: String,
        /// Conflicting name.
        name: String,
    },
    /// A command path repeats a name (e.g. `forge new forge`).
    #[error("command cycle detected at path: {path}")]
    CommandCycle {
        /// The full repeating path.
        path: String,
    },
    /// A select kind declares no choices.
    #[error("select option '{option}' on '{path}' declares no choices")]
    EmptyChoices {
        /// Path of the owning command.
        path: String,
        /// Offending option or argument name.
        option: String,
    },
    /// A declared default is not a member of the declared choices.
    #[error("default for option '{option}' on '{path}' is outside its choices")]
    DefaultOutsideChoices {
        /// Path of the owning command.
        path: String,
        /// Offending option name.
        option: String,
    },
}

/// Validates a command tree, returning all structural errors found.
///
/// Scopes are checked depth-first; the first violation within a scope wins
/// and stops further descent, so a broken tree reports its shallowest
/// problem rather than a cascade.
pub fn validate_tree(root: &Command) -> Vec<TreeError> {
    let mut errors = Vec::new();

    if root.name.trim().is_empty() {
        errors.push(TreeError::EmptyCommandName {
            path: "<root>".to_string(),
        });
        return errors;
    }

    let mut path = vec![root.name.clone()];
    errors.extend(validate_node(root, &mut path));
    errors
}

fn validate_node(command: &Command, path: &mut Vec<String>) -> Vec<TreeError> {
    let scope = path.join(" ");
    let mut errors = Vec::new();

    errors.extend(validate_options(&command.options, &scope));
    if !errors.is_empty() {
        return errors;
    }

    errors.extend(validate_arguments(&command.arguments, &scope));
    if !errors.is_empty() {
        return errors;
    }

    let mut seen: HashSet<&str> = HashSet::new();
    for child in &command.children {
        let name = child.name.trim();
        if name.is_empty() {
            errors.push(TreeError::EmptyCommandName {
                path: scope.clone(),
            });
            return errors;
        }

        if !seen.insert(name) {
            errors.push(TreeError::DuplicateChild {
                path: scope.clone(),
                name: name.to_string(),
            });
            return errors;
        }
        for alias in &child.aliases {
            if !seen.insert(alias) {
                errors.push(TreeError::DuplicateChild {
                    path: scope.clone(),
                    name: alias.clone(),
                });
                return errors;
            }
        }

        if path.iter().any(|segment| segment == name) {
            let cycle = path
                .iter()
                .cloned()
                .chain(std::iter::once(name.to_string()))
                .collect::<Vec<_>>()
                .join(" ");
            errors.push(TreeError::CommandCycle { path: cycle });
            return errors;
        }

        path.push(name.to_string());
        errors.extend(validate_node(child, path));
        path.pop();
        if !errors.is_empty() {
            return errors;
        }
    }

    errors
}

fn validate_options(options: &[CommandOption], scope: &str) -> Vec<TreeError> {
    let mut errors = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for option in options {
        if option.name.trim().is_empty() {
            errors.push(TreeError::EmptyOptionName {
                path: scope.to_string(),
            });
            return errors;
        }

        if !seen.insert(&option.name) {
            errors.push(TreeError::DuplicateOption {
                path: scope.to_string(),
                name: option.name.clone(),
            });
            return errors;
        }
        if let Some(shortcut) = &option.shortcut {
            if !seen.insert(shortcut) {
                errors.push(TreeError::DuplicateOption {
                    path: scope.to_string(),
                    name: shortcut.clone(),
                });
                return errors;
            }
        }

        if let Some(choices) = option.kind.choices() {
            if choices.is_empty() {
                errors.push(TreeError::EmptyChoices {
                    path: scope.to_string(),
                    option: option.name.clone(),
                });
                return errors;
            }
            if let Some(default) = &option.default {
                if !default_within_choices(default, choices) {
                    errors.push(TreeError::DefaultOutsideChoices {
                        path: scope.to_string(),
                        option: option.name.clone(),
                    });
                    return errors;
                }
            }
        }
    }

    errors
}

fn validate_arguments(arguments: &[CommandArgument], scope: &str) -> Vec<TreeError> {
    let mut errors = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for argument in arguments {
        if argument.name.trim().is_empty() {
            errors.push(TreeError::EmptyOptionName {
                path: scope.to_string(),
            });
            return errors;
        }
        if !seen.insert(&argument.name) {
            errors.push(TreeError::DuplicateArgument {
                path: scope.to_string(),
                name: argument.name.clone(),
            });
            return errors;
        }
        if let Some(choices) = argument.kind.choices() {
            if choices.is_empty() {
                errors.push(TreeError::EmptyChoices {
                    path: scope.to_string(),
                    option: argument.name.clone(),
                });
                return errors;
            }
        }
    }

    errors
}

fn default_within_choices(default: &OptionValue, choices: &[String]) -> bool {
    match default {
        OptionValue::Text(v) => choices.contains(v),
        OptionValue::List(vs) => vs.iter().all(|v| choices.contains(v)),
        _ => false,
    }
}

/// Validates a bound option value against its declaration.
///
/// Rules are evaluated in order and the first violation wins: choice
/// membership for select kinds, cardinality for multi-valued kinds, primitive
/// shape for scalars, then presence for required slots. The declaration is
/// never mutated on failure.
///
/// # Examples
///
/// ```
/// use command_engine_core::{CommandOption, OptionValue, validate_option};
///
/// let option = CommandOption::multi_select("features", &["a", "b", "c"]);
/// let bound = OptionValue::List(vec!["d".into()]);
/// let err = validate_option(&option, Some(&bound)).unwrap_err();
/// assert_eq!(err.kind(), "input-validation");
/// ```
pub fn validate_option(option: &CommandOption, value: Option<&OptionValue>) -> Result<()> {
    validate_value(&option.name, &option.kind, option.required, value)
}

/// Validates a bound positional argument against its declaration.
pub fn validate_argument(argument: &CommandArgument, value: Option<&OptionValue>) -> Result<()> {
    validate_value(&argument.name, &argument.kind, argument.required, value)
}

/// Shared validation over a declared name, kind, and requiredness.
pub fn validate_value(
    name: &str,
    kind: &OptionKind,
    required: bool,
    value: Option<&OptionValue>,
) -> Result<()> {
    let Some(value) = value else {
        if required {
            return Err(EngineError::input_validation(name, "a value is required"));
        }
        return Ok(());
    };

    match (kind, value) {
        (OptionKind::SingleSelect { choices }, OptionValue::Text(v)) => {
            if choices.contains(v) {
                Ok(())
            } else {
                Err(EngineError::input_validation(
                    name,
                    format!("'{v}' is not one of: {}", choices.join(", ")),
                ))
            }
        }
        (OptionKind::MultiSelect { choices }, OptionValue::List(vs)) => {
            match vs.iter().find(|v| !choices.contains(v)) {
                Some(offending) => Err(EngineError::input_validation(
                    name,
                    format!("'{offending}' is not one of: {}", choices.join(", ")),
                )),
                None => Ok(()),
            }
        }
        (OptionKind::Array, OptionValue::List(_)) => Ok(()),
        (OptionKind::Text, OptionValue::Text(_)) => Ok(()),
        (OptionKind::Flag, OptionValue::Flag(_)) => Ok(()),
        (OptionKind::Number, OptionValue::Number(_)) => Ok(()),
        (kind, _) => Err(EngineError::input_validation(
            name,
            format!("expected {}", kind.expects()),
        )),
    }
}
