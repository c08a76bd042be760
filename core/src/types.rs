//! Command tree and option model definitions.
//!
//! This module defines the static description of a command-line surface: a
//! tree of [`Command`] nodes, each carrying named [`CommandOption`]s, ordered
//! positional [`CommandArgument`]s, child commands, and an optional handler.
//! The tree is built once at process start and is read-only afterwards; all
//! per-invocation state lives in [`CliContext`](crate::CliContext).

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::context::CliContext;

/// Value shape accepted by an option or positional argument.
///
/// A closed union with one variant per kind; the select kinds carry their
/// allowed choices inline, so a choice list can never exist on a kind that
/// does not use one.
///
/// # Examples
///
/// ```
/// use command_engine_core::OptionKind;
///
/// let kind = OptionKind::single_select(&["json", "yaml"]);
/// assert_eq!(kind.choices().map(<[String]>::len), Some(2));
/// assert!(!kind.is_multi_valued());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OptionKind {
    /// Free-form string value.
    Text,
    /// Boolean flag.
    Flag,
    /// Numeric value.
    Number,
    /// List of free-form string values.
    Array,
    /// Exactly one value out of a fixed choice list.
    SingleSelect {
        /// Allowed values, in display order.
        choices: Vec<String>,
    },
    /// Any subset of a fixed choice list.
    MultiSelect {
        /// Allowed values, in display order.
        choices: Vec<String>,
    },
}

impl OptionKind {
    /// Creates a single-select kind from string slices.
    pub fn single_select(choices: &[&str]) -> Self {
        Self::SingleSelect {
            choices: choices.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Creates a multi-select kind from string slices.
    pub fn multi_select(choices: &[&str]) -> Self {
        Self::MultiSelect {
            choices: choices.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Returns the declared choices for select kinds.
    pub fn choices(&self) -> Option<&[String]> {
        match self {
            Self::SingleSelect { choices } | Self::MultiSelect { choices } => Some(choices),
            _ => None,
        }
    }

    /// Whether the kind binds to a list of values rather than a scalar.
    pub fn is_multi_valued(&self) -> bool {
        matches!(self, Self::Array | Self::MultiSelect { .. })
    }

    /// Stable machine name used in diagnostics and telemetry.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Flag => "flag",
            Self::Number => "number",
            Self::Array => "array",
            Self::SingleSelect { .. } => "select",
            Self::MultiSelect { .. } => "multiselect",
        }
    }

    /// Human-readable description of what the kind accepts.
    pub fn expects(&self) -> &'static str {
        match self {
            Self::Text => "a value",
            Self::Flag => "true or false",
            Self::Number => "a number",
            Self::Array => "a list of values",
            Self::SingleSelect { .. } => "one of the allowed values",
            Self::MultiSelect { .. } => "a list of the allowed values",
        }
    }
}

/// A bound option or argument value.
///
/// Produced by binding raw invocation input or by an interactive prompt;
/// stored in the per-invocation [`CliContext`], never on the declaration.
///
/// # Examples
///
/// ```
/// use command_engine_core::OptionValue;
///
/// let value = OptionValue::List(vec!["tab".into(), "bot".into()]);
/// assert_eq!(value.render(), "tab,bot");
/// assert_eq!(value.as_list().map(<[String]>::len), Some(2));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OptionValue {
    /// String value (also carries single-select bindings).
    Text(String),
    /// Boolean value.
    Flag(bool),
    /// Numeric value.
    Number(f64),
    /// List value (array and multi-select bindings).
    List(Vec<String>),
}

impl OptionValue {
    /// Returns the string content, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the boolean content, if this is a flag value.
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the numeric content, if this is a number value.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the list content, if this is a list value.
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(v) => Some(v),
            _ => None,
        }
    }

    /// Renders the value as a single display string.
    pub fn render(&self) -> String {
        match self {
            Self::Text(v) => v.clone(),
            Self::Flag(v) => v.to_string(),
            Self::Number(v) => v.to_string(),
            Self::List(v) => v.join(","),
        }
    }
}

/// Declaration of a named option (flag) owned by a command.
///
/// Use the kind-specific constructors and chain builder methods, in the
/// style of the rest of the tree-building API.
///
/// # Examples
///
/// ```
/// use command_engine_core::CommandOption;
///
/// let capability = CommandOption::single_select("capability", &["tab", "bot"])
///     .with_shortcut("c")
///     .with_description("Project capability")
///     .require();
///
/// assert!(capability.required);
/// assert!(capability.matches("capability"));
/// assert!(capability.matches("c"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandOption {
    /// Unique name within the owning command's option set.
    pub name: String,
    /// Help text.
    pub description: Option<String>,
    /// Value shape this option accepts.
    pub kind: OptionKind,
    /// Whether execution must fail if unset after interactive fill-in.
    pub required: bool,
    /// Optional short alias (e.g. `c` for `capability`).
    pub shortcut: Option<String>,
    /// Value used when nothing is bound.
    pub default: Option<OptionValue>,
}

impl CommandOption {
    fn new(name: &str, kind: OptionKind) -> Self {
        Self {
            name: name.to_string(),
            description: None,
            kind,
            required: false,
            shortcut: None,
            default: None,
        }
    }

    /// Creates a free-form text option.
    pub fn text(name: &str) -> Self {
        Self::new(name, OptionKind::Text)
    }

    /// Creates a boolean flag option.
    pub fn flag(name: &str) -> Self {
        Self::new(name, OptionKind::Flag)
    }

    /// Creates a numeric option.
    pub fn number(name: &str) -> Self {
        Self::new(name, OptionKind::Number)
    }

    /// Creates a list-valued option.
    pub fn array(name: &str) -> Self {
        Self::new(name, OptionKind::Array)
    }

    /// Creates a single-select option with the given choices.
    pub fn single_select(name: &str, choices: &[&str]) -> Self {
        Self::new(name, OptionKind::single_select(choices))
    }

    /// Creates a multi-select option with the given choices.
    pub fn multi_select(name: &str, choices: &[&str]) -> Self {
        Self::new(name, OptionKind::multi_select(choices))
    }

    /// Adds a description.
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Adds a short alias.
    pub fn with_shortcut(mut self, shortcut: &str) -> Self {
        self.shortcut = Some(shortcut.to_string());
        self
    }

    /// Sets the value bound when the invocation supplies none.
    pub fn with_default(mut self, default: OptionValue) -> Self {
        self.default = Some(default);
        self
    }

    /// Marks the option as required.
    pub fn require(mut self) -> Self {
        self.required = true;
        self
    }

    /// Checks whether a flag token selects this option (name or shortcut).
    pub fn matches(&self, token: &str) -> bool {
        self.name == token || self.shortcut.as_deref() == Some(token)
    }
}

/// Declaration of a positional argument slot.
///
/// The position of an argument within [`Command::arguments`] defines its
/// binding order.
///
/// # Examples
///
/// ```
/// use command_engine_core::{CommandArgument, OptionKind};
///
/// let name = CommandArgument::required("template-name", OptionKind::Text);
/// assert!(name.required);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandArgument {
    /// Name of the argument, used in help and error messages.
    pub name: String,
    /// Help text.
    pub description: Option<String>,
    /// Value shape this slot accepts.
    pub kind: OptionKind,
    /// Whether execution must fail if unset after interactive fill-in.
    pub required: bool,
}

impl CommandArgument {
    /// Creates a required positional argument.
    pub fn required(name: &str, kind: OptionKind) -> Self {
        Self {
            name: name.to_string(),
            description: None,
            kind,
            required: true,
        }
    }

    /// Creates an optional positional argument.
    pub fn optional(name: &str, kind: OptionKind) -> Self {
        Self {
            name: name.to_string(),
            description: None,
            kind,
            required: false,
        }
    }

    /// Adds a description.
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }
}

/// Handler invoked when a command is dispatched.
///
/// Handlers receive the fully populated per-invocation context and report
/// success or a typed error; they must not emit their own invocation-outcome
/// telemetry or logging — the execution pipeline owns that.
pub type CommandHandler = Arc<dyn Fn(&mut CliContext) -> crate::Result<()> + Send + Sync>;

/// A named node in the static command tree.
///
/// A node with children and no handler is a pure router; a node with a
/// handler is executable. Child names are unique per node — enforced by
/// [`validate_tree`](crate::validate_tree) at construction time, never
/// re-checked during resolution.
///
/// # Examples
///
/// ```
/// use command_engine_core::{Command, CommandArgument, CommandOption, OptionKind};
///
/// let root = Command::new("forge")
///     .with_option(CommandOption::flag("verbose").with_description("Print more"))
///     .with_child(
///         Command::new("new")
///             .with_option(CommandOption::text("app-name").require())
///             .with_child(
///                 Command::new("template")
///                     .with_usage("template <template-name>")
///                     .with_argument(CommandArgument::required("template-name", OptionKind::Text))
///                     .with_handler(|_ctx| Ok(())),
///             ),
///     );
///
/// assert!(root.find_child("new").is_some());
/// assert!(root.find_child("new").unwrap().find_child("template").unwrap().handler.is_some());
/// ```
#[derive(Clone, Default, Serialize)]
pub struct Command {
    /// Token that selects this node from its parent's children.
    pub name: String,
    /// Name plus positional placeholders for help text (e.g.
    /// `template <template-name>`); not consulted by the resolver.
    pub usage: Option<String>,
    /// Short description for help listings.
    pub description: Option<String>,
    /// Alternative selection tokens.
    pub aliases: Vec<String>,
    /// Named options, unique by name within this node.
    pub options: Vec<CommandOption>,
    /// Positional arguments; order defines binding order.
    pub arguments: Vec<CommandArgument>,
    /// Child commands, unique by name within this node.
    pub children: Vec<Command>,
    /// Excluded from help listings.
    pub hidden: bool,
    /// Version string, meaningful on the root node only.
    pub version: Option<String>,
    /// Handler invoked on dispatch; `None` for pure routers.
    #[serde(skip)]
    pub handler: Option<CommandHandler>,
}

impl Command {
    /// Creates a command node with the given name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Adds a description.
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Sets the usage line shown in help text.
    pub fn with_usage(mut self, usage: &str) -> Self {
        self.usage = Some(usage.to_string());
        self
    }

    /// Adds a selection alias.
    pub fn with_alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    /// Adds an option.
    pub fn with_option(mut self, option: CommandOption) -> Self {
        self.options.push(option);
        self
    }

    /// Adds a positional argument.
    pub fn with_argument(mut self, argument: CommandArgument) -> Self {
        self.arguments.push(argument);
        self
    }

    /// Adds a child command.
    pub fn with_child(mut self, child: Command) -> Self {
        self.children.push(child);
        self
    }

    /// Sets the dispatch handler.
    pub fn with_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&mut CliContext) -> crate::Result<()> + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// Hides the command from help listings.
    pub fn hide(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Sets the version string (root node).
    pub fn with_version(mut self, version: &str) -> Self {
        self.version = Some(version.to_string());
        self
    }

    /// Finds a direct child by name or alias.
    pub fn find_child(&self, token: &str) -> Option<&Command> {
        self.children
            .iter()
            .find(|c| c.name == token || c.aliases.iter().any(|a| a == token))
    }

    /// Finds a declared option by name or shortcut.
    pub fn find_option(&self, token: &str) -> Option<&CommandOption> {
        self.options.iter().find(|o| o.matches(token))
    }

    /// Whether this node only routes to children.
    pub fn is_router(&self) -> bool {
        !self.children.is_empty() && self.handler.is_none()
    }

    /// The help usage fragment for this node (`usage` or plain name).
    pub fn usage_line(&self) -> &str {
        self.usage.as_deref().unwrap_or(&self.name)
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("usage", &self.usage)
            .field("aliases", &self.aliases)
            .field("options", &self.options)
            .field("arguments", &self.arguments)
            .field("children", &self.children)
            .field("hidden", &self.hidden)
            .field("version", &self.version)
            .field("handler", &self.handler.as_ref().map(|_| "<handler>"))
            .finish()
    }
}
