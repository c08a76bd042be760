//! Binding of raw invocation input onto declared options and arguments.
//!
//! The argument source (a thin collaborator in the CLI crate) splits `argv`
//! into command tokens and flag occurrences before the pipeline starts; this
//! module maps those occurrences onto the matched node's declared option set
//! and its inherited global options, and the positional remainder onto the
//! node's argument slots. Unknown flags are rejected only in strict mode.

use std::collections::HashMap;

use command_engine_core::{
    CliContext, Command, CommandOption, EngineError, OptionKind, OptionValue, Result,
};
use tracing::debug;

use crate::resolve::Resolution;

/// Flag names reserved for help output; never bound to declared options.
pub const HELP_FLAGS: &[&str] = &["help", "h"];

/// Flag names reserved for version output; never bound to declared options.
pub const VERSION_FLAGS: &[&str] = &["version", "v"];

/// Whether a flag name is reserved by the engine itself.
pub fn is_reserved_flag(name: &str) -> bool {
    HELP_FLAGS.contains(&name) || VERSION_FLAGS.contains(&name)
}

/// A single flag occurrence as produced by the argument source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawOption {
    /// Flag name with dashes stripped and case folded upstream.
    pub name: String,
    /// Inline or consumed value, if any.
    pub value: Option<String>,
}

/// Pre-split invocation input: command tokens plus flag occurrences.
///
/// # Examples
///
/// ```
/// use command_engine::Invocation;
///
/// let invocation = Invocation::new(vec!["new".into(), "template".into()])
///     .with_option("verbose", None)
///     .with_option("capability", Some("tab"));
/// assert!(invocation.has_flag(&["verbose"]));
/// assert!(!invocation.has_flag(&["help", "h"]));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Invocation {
    /// Ordered command tokens (positional values included).
    pub tokens: Vec<String>,
    /// Flag occurrences in invocation order; repeats preserved.
    pub options: Vec<RawOption>,
}

impl Invocation {
    /// Creates an invocation from command tokens.
    pub fn new(tokens: Vec<String>) -> Self {
        Self {
            tokens,
            options: Vec::new(),
        }
    }

    /// Appends a flag occurrence.
    pub fn with_option(mut self, name: &str, value: Option<&str>) -> Self {
        self.options.push(RawOption {
            name: name.to_string(),
            value: value.map(String::from),
        });
        self
    }

    /// Whether any of the given flag names occurs.
    pub fn has_flag(&self, names: &[&str]) -> bool {
        self.options
            .iter()
            .any(|o| names.contains(&o.name.as_str()))
    }
}

/// Binds an invocation's flags and positional remainder into the context.
///
/// Flag occurrences match the deepest declaring scope first (matched node,
/// then each ancestor up to the root). Multi-valued options accept repeated
/// occurrences and comma-separated values; scalar options take the last
/// occurrence. Unbound options fall back to their declared defaults.
/// Leftover positional tokens under a router are an unknown command; under a
/// leaf they are rejected in strict mode and kept in `remaining_args`
/// otherwise.
pub fn bind(
    resolution: &Resolution<'_, '_>,
    invocation: &Invocation,
    strict: bool,
    ctx: &mut CliContext,
) -> Result<()> {
    bind_flags(resolution, invocation, strict, ctx)?;
    bind_positionals(resolution, strict, ctx)
}

fn bind_flags(
    resolution: &Resolution<'_, '_>,
    invocation: &Invocation,
    strict: bool,
    ctx: &mut CliContext,
) -> Result<()> {
    // occurrences grouped per declaring scope: (is_local, name) -> (decl, raws)
    let mut groups: HashMap<(bool, String), (&CommandOption, Vec<&RawOption>)> = HashMap::new();

    for raw in &invocation.options {
        if is_reserved_flag(&raw.name) {
            continue;
        }
        match declaring_scope(resolution, &raw.name) {
            Some((is_local, option)) => {
                groups
                    .entry((is_local, option.name.clone()))
                    .or_insert_with(|| (option, Vec::new()))
                    .1
                    .push(raw);
            }
            None if strict => {
                return Err(EngineError::UnknownOption {
                    name: raw.name.clone(),
                });
            }
            None => {
                debug!(flag = %raw.name, "ignoring undeclared flag");
            }
        }
    }

    for ((is_local, name), (option, raws)) in groups {
        if let Some(value) = bind_occurrences(option, &raws)? {
            scope_values(ctx, is_local).insert(name, value);
        }
    }

    // declared defaults for anything still unbound
    for (is_local, option) in declared_options(resolution) {
        if let Some(default) = &option.default {
            if !scope_values(ctx, is_local).contains_key(&option.name) {
                scope_values(ctx, is_local).insert(option.name.clone(), default.clone());
            }
        }
    }

    Ok(())
}

/// Finds the deepest scope declaring a flag token: the matched node's own
/// options first, then each ancestor from nearest to the root.
fn declaring_scope<'c>(
    resolution: &Resolution<'c, '_>,
    token: &str,
) -> Option<(bool, &'c CommandOption)> {
    if let Some(option) = resolution.command.find_option(token) {
        return Some((true, option));
    }
    for ancestor in resolution.ancestors().iter().rev() {
        if let Some(option) = ancestor.find_option(token) {
            return Some((false, option));
        }
    }
    None
}

fn declared_options<'c>(
    resolution: &Resolution<'c, '_>,
) -> impl Iterator<Item = (bool, &'c CommandOption)> {
    let locals = resolution.command.options.iter().map(|o| (true, o));
    let globals = resolution
        .ancestors()
        .iter()
        .flat_map(|c| c.options.iter())
        .map(|o| (false, o));
    locals.chain(globals)
}

fn scope_values<'a>(
    ctx: &'a mut CliContext,
    is_local: bool,
) -> &'a mut HashMap<String, OptionValue> {
    if is_local {
        &mut ctx.option_values
    } else {
        &mut ctx.global_option_values
    }
}

fn bind_occurrences(option: &CommandOption, raws: &[&RawOption]) -> Result<Option<OptionValue>> {
    if option.kind.is_multi_valued() {
        let mut items = Vec::new();
        for raw in raws {
            let Some(value) = &raw.value else {
                return Err(EngineError::input_validation(
                    &option.name,
                    "expected a value",
                ));
            };
            items.extend(
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(String::from),
            );
        }
        return Ok(Some(OptionValue::List(items)));
    }

    // scalar kinds: the last occurrence wins
    let Some(last) = raws.last() else {
        return Ok(None);
    };
    match (&option.kind, &last.value) {
        (OptionKind::Flag, None) => Ok(Some(OptionValue::Flag(true))),
        (_, None) => Err(EngineError::input_validation(
            &option.name,
            "expected a value",
        )),
        (_, Some(raw)) => parse_scalar(&option.name, &option.kind, raw).map(Some),
    }
}

/// Parses a raw string into the value shape a kind expects.
pub(crate) fn parse_scalar(name: &str, kind: &OptionKind, raw: &str) -> Result<OptionValue> {
    match kind {
        OptionKind::Text | OptionKind::SingleSelect { .. } => {
            Ok(OptionValue::Text(raw.to_string()))
        }
        OptionKind::Flag => match raw {
            "true" => Ok(OptionValue::Flag(true)),
            "false" => Ok(OptionValue::Flag(false)),
            other => Err(EngineError::input_validation(
                name,
                format!("'{other}' is not true or false"),
            )),
        },
        OptionKind::Number => raw.parse::<f64>().map(OptionValue::Number).map_err(|_| {
            EngineError::input_validation(name, format!("'{raw}' is not a number"))
        }),
        OptionKind::Array | OptionKind::MultiSelect { .. } => Ok(OptionValue::List(
            raw.split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(String::from)
                .collect(),
        )),
    }
}

fn bind_positionals(
    resolution: &Resolution<'_, '_>,
    strict: bool,
    ctx: &mut CliContext,
) -> Result<()> {
    let mut remaining = resolution.remaining;

    if resolution.command.is_router() && !remaining.is_empty() {
        return Err(EngineError::UnknownCommand {
            token: remaining[0].clone(),
            path: resolution.full_command(),
        });
    }

    for argument in &resolution.command.arguments {
        if remaining.is_empty() {
            break;
        }
        if argument.kind.is_multi_valued() {
            ctx.argument_values
                .push(OptionValue::List(remaining.to_vec()));
            remaining = &[];
        } else {
            let value = parse_scalar(&argument.name, &argument.kind, &remaining[0])?;
            ctx.argument_values.push(value);
            remaining = &remaining[1..];
        }
    }

    if !remaining.is_empty() {
        if strict {
            return Err(EngineError::UnknownCommand {
                token: remaining[0].clone(),
                path: resolution.full_command(),
            });
        }
        debug!(count = remaining.len(), "keeping unbound trailing tokens");
        ctx.remaining_args = remaining.to_vec();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::find_command;
    use command_engine_core::{Command, CommandArgument};

    fn tree() -> Command {
        Command::new("forge")
            .with_option(CommandOption::flag("verbose").with_shortcut("v"))
            .with_option(CommandOption::flag("interactive").with_shortcut("i"))
            .with_child(
                Command::new("new")
                    .with_option(CommandOption::single_select("capability", &["tab", "bot"]))
                    .with_option(CommandOption::text("folder").with_default(OptionValue::Text(
                        ".".to_string(),
                    )))
                    .with_option(CommandOption::multi_select("features", &["sso", "ci"]))
                    .with_option(CommandOption::number("port"))
                    .with_handler(|_ctx| Ok(()))
                    .with_child(
                        Command::new("template")
                            .with_argument(CommandArgument::required(
                                "template-name",
                                OptionKind::Text,
                            ))
                            .with_handler(|_ctx| Ok(())),
                    ),
            )
    }

    fn bind_for(
        root: &Command,
        tokens: &[&str],
        options: &[(&str, Option<&str>)],
        strict: bool,
    ) -> Result<CliContext> {
        let tokens: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
        let mut invocation = Invocation::new(tokens.clone());
        for (name, value) in options {
            invocation = invocation.with_option(name, *value);
        }
        let resolution = find_command(root, &tokens);
        let mut ctx = CliContext::default();
        ctx.command_path = resolution.path_names();
        bind(&resolution, &invocation, strict, &mut ctx)?;
        Ok(ctx)
    }

    #[test]
    fn test_local_and_global_scopes() {
        let root = tree();
        let ctx = bind_for(
            &root,
            &["new"],
            &[("capability", Some("tab")), ("verbose", None)],
            true,
        )
        .unwrap();

        assert_eq!(ctx.option_values["capability"], OptionValue::Text("tab".into()));
        assert_eq!(ctx.global_option_values["verbose"], OptionValue::Flag(true));
        assert!(!ctx.option_values.contains_key("verbose"));
    }

    #[test]
    fn test_shortcut_binds_to_option_name() {
        let root = tree();
        let ctx = bind_for(&root, &["new"], &[("i", Some("false"))], true).unwrap();
        assert_eq!(
            ctx.global_option_values["interactive"],
            OptionValue::Flag(false)
        );
    }

    #[test]
    fn test_unknown_flag_strict_vs_lenient() {
        let root = tree();
        let err = bind_for(&root, &["new"], &[("bogus", None)], true).unwrap_err();
        assert!(matches!(err, EngineError::UnknownOption { ref name } if name == "bogus"));

        let ctx = bind_for(&root, &["new"], &[("bogus", None)], false).unwrap();
        assert!(ctx.option_values.is_empty() || !ctx.option_values.contains_key("bogus"));
    }

    #[test]
    fn test_defaults_fill_unbound_options() {
        let root = tree();
        let ctx = bind_for(&root, &["new"], &[], true).unwrap();
        assert_eq!(ctx.option_values["folder"], OptionValue::Text(".".into()));
    }

    #[test]
    fn test_multi_value_occurrences_and_commas() {
        let root = tree();
        let ctx = bind_for(
            &root,
            &["new"],
            &[("features", Some("sso")), ("features", Some("ci, extra"))],
            true,
        )
        .unwrap();

        assert_eq!(
            ctx.option_values["features"],
            OptionValue::List(vec!["sso".into(), "ci".into(), "extra".into()])
        );
    }

    #[test]
    fn test_scalar_last_occurrence_wins() {
        let root = tree();
        let ctx = bind_for(
            &root,
            &["new"],
            &[("capability", Some("tab")), ("capability", Some("bot"))],
            true,
        )
        .unwrap();

        assert_eq!(ctx.option_values["capability"], OptionValue::Text("bot".into()));
    }

    #[test]
    fn test_number_parse_failure() {
        let root = tree();
        let err = bind_for(&root, &["new"], &[("port", Some("eighty"))], true).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InputValidation { ref option, .. } if option == "port"
        ));
    }

    #[test]
    fn test_positional_binding() {
        let root = tree();
        let ctx = bind_for(&root, &["new", "template", "hello-world"], &[], true).unwrap();
        assert_eq!(
            ctx.argument_values,
            vec![OptionValue::Text("hello-world".into())]
        );
    }

    #[test]
    fn test_leftover_token_under_router() {
        let root = Command::new("forge").with_child(Command::new("config"));
        let err = bind_for(&root, &["config", "bogus"], &[], false).unwrap_err();
        assert!(matches!(
            err,
            EngineError::UnknownCommand { ref token, .. } if token == "bogus"
        ));
    }

    #[test]
    fn test_leftover_token_under_leaf() {
        let root = tree();
        let err = bind_for(&root, &["new", "template", "a", "b"], &[], true).unwrap_err();
        assert!(matches!(err, EngineError::UnknownCommand { ref token, .. } if token == "b"));

        let ctx = bind_for(&root, &["new", "template", "a", "b"], &[], false).unwrap();
        assert_eq!(ctx.remaining_args, vec!["b".to_string()]);
    }

    #[test]
    fn test_reserved_flags_never_bind() {
        let root = tree();
        let ctx = bind_for(&root, &["new"], &[("help", None)], true).unwrap();
        assert!(!ctx.option_values.contains_key("help"));
        assert!(!ctx.global_option_values.contains_key("help"));
    }
}
