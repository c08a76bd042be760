//! Command resolution by greedy longest-prefix descent.

use command_engine_core::Command;
use tracing::debug;

/// Result of matching a token sequence against a command tree.
///
/// `path` runs from the root to the matched node inclusive — a non-owning
/// accumulator built during descent, so the tree itself stays a plain owned
/// hierarchy with no parent back-pointers.
#[derive(Debug)]
pub struct Resolution<'c, 't> {
    /// The deepest matched node.
    pub command: &'c Command,
    /// Nodes from the root to `command`, in order.
    pub path: Vec<&'c Command>,
    /// Token suffix not consumed by path matching.
    pub remaining: &'t [String],
}

impl<'c> Resolution<'c, '_> {
    /// Node names from root to the matched command.
    pub fn path_names(&self) -> Vec<String> {
        self.path.iter().map(|c| c.name.clone()).collect()
    }

    /// The matched path as a single display string.
    pub fn full_command(&self) -> String {
        self.path_names().join(" ")
    }

    /// Ancestors of the matched node (everything on the path except it).
    pub fn ancestors(&self) -> &[&'c Command] {
        &self.path[..self.path.len() - 1]
    }
}

/// Resolves a token sequence to the deepest matching command node.
///
/// Starting at `root`, tokens are consumed one at a time; at each step the
/// descent follows a child whose name or alias equals the next token, and
/// stops at the first token that matches no child. There is no backtracking:
/// once a child is chosen, shallower nodes are never reconsidered — a later
/// option/validation failure against the chosen node is reported as a
/// validation error, never as a re-resolution.
///
/// Resolution is pure and total: it always returns a node (worst case the
/// root itself, with every token left in `remaining`) and never fails.
/// An empty token sequence resolves to `root` with an empty remainder.
/// Child-name uniqueness is guaranteed at tree-construction time, so ties
/// cannot occur here.
///
/// # Examples
///
/// ```
/// use command_engine::find_command;
/// use command_engine_core::Command;
///
/// let root = Command::new("forge")
///     .with_child(Command::new("new").with_child(Command::new("template")));
///
/// let tokens = vec!["new".to_string(), "template".to_string()];
/// let resolution = find_command(&root, &tokens);
/// assert_eq!(resolution.command.name, "template");
/// assert!(resolution.remaining.is_empty());
/// ```
pub fn find_command<'c, 't>(root: &'c Command, tokens: &'t [String]) -> Resolution<'c, 't> {
    let mut command = root;
    let mut path = vec![root];
    let mut index = 0;

    while index < tokens.len() {
        match command.find_child(&tokens[index]) {
            Some(child) => {
                command = child;
                path.push(child);
                index += 1;
            }
            None => break,
        }
    }

    debug!(
        command = %command.name,
        depth = path.len(),
        remaining = tokens.len() - index,
        "resolved command"
    );

    Resolution {
        command,
        path,
        remaining: &tokens[index..],
    }
}
