//! Help text rendering for command nodes.

use std::fmt::Write;

use command_engine_core::{Command, CommandOption, OptionKind};

use crate::bind::{HELP_FLAGS, VERSION_FLAGS};

const PAD: usize = 26;

/// Renders the help text for a resolved command path.
///
/// The usage line is built from the ancestor names plus the node's own
/// usage fragment; sections follow for visible subcommands, positional
/// arguments, local options, and options inherited from ancestors. The
/// pipeline logs the result at info level at most once per invocation.
pub fn render_help(path: &[&Command]) -> String {
    let Some(command) = path.last() else {
        return String::new();
    };
    let mut out = String::new();

    let mut usage: Vec<&str> = path[..path.len() - 1].iter().map(|c| c.name.as_str()).collect();
    usage.push(command.usage_line());
    let mut usage = usage.join(" ");
    if !command.children.is_empty() {
        usage.push_str(" <command>");
    }
    if !command.options.is_empty() || path.len() > 1 {
        usage.push_str(" [options]");
    }
    let _ = writeln!(out, "Usage: {usage}");

    if let Some(description) = &command.description {
        let _ = writeln!(out, "\n{description}");
    }

    let visible: Vec<&Command> = command.children.iter().filter(|c| !c.hidden).collect();
    if !visible.is_empty() {
        let _ = writeln!(out, "\nCommands:");
        for child in visible {
            let mut left = child.usage_line().to_string();
            if !child.aliases.is_empty() {
                left.push_str(&format!(" ({})", child.aliases.join(", ")));
            }
            let _ = writeln!(
                out,
                "  {left:<PAD$}  {}",
                child.description.as_deref().unwrap_or_default()
            );
        }
    }

    if !command.arguments.is_empty() {
        let _ = writeln!(out, "\nArguments:");
        for argument in &command.arguments {
            let left = format!("<{}>", argument.name);
            let mut right = argument.description.clone().unwrap_or_default();
            if let Some(choices) = argument.kind.choices() {
                let _ = write!(right, " [{}]", choices.join("|"));
            }
            let _ = writeln!(out, "  {left:<PAD$}  {}", right.trim());
        }
    }

    if !command.options.is_empty() {
        let _ = writeln!(out, "\nOptions:");
        for option in &command.options {
            render_option(&mut out, option);
        }
    }

    let inherited: Vec<&CommandOption> = path[..path.len() - 1]
        .iter()
        .flat_map(|c| c.options.iter())
        .collect();
    if !inherited.is_empty() {
        let _ = writeln!(out, "\nGlobal options:");
        for option in inherited {
            render_option(&mut out, option);
        }
    }

    let root = path[0];
    let _ = writeln!(out, "\n  {:<PAD$}  Show help", format!("--{}", HELP_FLAGS[0]));
    if root.version.is_some() {
        let _ = writeln!(
            out,
            "  {:<PAD$}  Show version",
            format!("--{}", VERSION_FLAGS[0])
        );
    }

    out
}

fn render_option(out: &mut String, option: &CommandOption) {
    let mut left = format!("--{}", option.name);
    if let Some(shortcut) = &option.shortcut {
        let _ = write!(left, ", -{shortcut}");
    }
    if !matches!(option.kind, OptionKind::Flag) {
        left.push_str(" <value>");
    }

    let mut right = option.description.clone().unwrap_or_default();
    if let Some(choices) = option.kind.choices() {
        let _ = write!(right, " [{}]", choices.join("|"));
    }
    if option.required {
        right.push_str(" (required)");
    }
    if let Some(default) = &option.default {
        let _ = write!(right, " (default: {})", default.render());
    }

    let _ = writeln!(out, "  {left:<PAD$}  {}", right.trim());
}
