//! Argv pre-splitting: command tokens vs flag occurrences.
//!
//! The engine expects invocation input already split into command tokens and
//! flag occurrences, with flag names case folded. The split is
//! declaration-aware: value-taking flags consume the following token, while
//! boolean flags only consume a literal `true`/`false`, so a flag before a
//! subcommand name never swallows it.

use std::collections::HashMap;

use command_engine::{HELP_FLAGS, Invocation, RawOption, VERSION_FLAGS};
use command_engine_core::{Command, OptionKind};

/// Collects every flag name and shortcut in the tree, mapped to whether it
/// takes a value. Reserved help/version flags are boolean.
pub fn flag_table(root: &Command) -> HashMap<String, bool> {
    let mut table = HashMap::new();
    collect(root, &mut table);
    for name in HELP_FLAGS.iter().chain(VERSION_FLAGS) {
        table.insert((*name).to_string(), false);
    }
    table
}

fn collect(command: &Command, table: &mut HashMap<String, bool>) {
    for option in &command.options {
        let takes_value = !matches!(option.kind, OptionKind::Flag);
        table.insert(option.name.clone(), takes_value);
        if let Some(shortcut) = &option.shortcut {
            table.insert(shortcut.clone(), takes_value);
        }
    }
    for child in &command.children {
        collect(child, table);
    }
}

/// Splits raw argv into an [`Invocation`].
///
/// `--name=value` carries its value inline (value case preserved, name case
/// folded). A value-taking flag consumes the next token unless it looks like
/// another flag; boolean and unknown flags consume only a literal
/// `true`/`false`. Everything else is a command token.
pub fn split_invocation(argv: &[String], table: &HashMap<String, bool>) -> Invocation {
    let mut invocation = Invocation::default();
    let mut index = 0;

    while index < argv.len() {
        let token = &argv[index];
        index += 1;

        let Some(raw_name) = flag_name(token) else {
            invocation.tokens.push(token.clone());
            continue;
        };

        if let Some((name, value)) = raw_name.split_once('=') {
            invocation.options.push(RawOption {
                name: name.to_ascii_lowercase(),
                value: Some(value.to_string()),
            });
            continue;
        }

        let name = raw_name.to_ascii_lowercase();
        let next = argv.get(index);
        let value = match table.get(&name) {
            Some(true) => next.filter(|n| flag_name(n).is_none()).cloned(),
            _ => next
                .filter(|n| n.as_str() == "true" || n.as_str() == "false")
                .cloned(),
        };
        if value.is_some() {
            index += 1;
        }
        invocation.options.push(RawOption { name, value });
    }

    invocation
}

/// The flag name carried by a token, if it is one. Bare dashes and negative
/// numbers are positional.
fn flag_name(token: &str) -> Option<&str> {
    if let Some(rest) = token.strip_prefix("--") {
        return (!rest.is_empty()).then_some(rest);
    }
    let rest = token.strip_prefix('-')?;
    match rest.chars().next() {
        Some(c) if !c.is_ascii_digit() => Some(rest),
        _ => None,
    }
}
