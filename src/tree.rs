// src/tree.rs

//! # Command tree view
//!
//! clap commands know their children but not their parent, while every completion
//! address is defined by the full chain from the root. [`CommandPath`] carries that
//! chain so UIDs, flag ownership and inherited flags can be computed without asking
//! the tree for parent links.
//!
//! Trees are inspected *unbuilt*: before `Command::build()` a global arg lives only on
//! the command that declared it, which is exactly the ownership rule completions need.

use clap::{Arg, Command};

use crate::error::{CompletionError, CompletionResult};

/// A position in a command tree: the root plus the chain of subcommands below it.
#[derive(Debug, Clone)]
pub struct CommandPath<'a> {
    root: &'a Command,
    descendants: Vec<&'a Command>,
}

impl<'a> CommandPath<'a> {
    /// The path that points at the root command itself.
    pub fn root(root: &'a Command) -> Self {
        Self {
            root,
            descendants: Vec::new(),
        }
    }

    /// Walks `names` (subcommand names or aliases, root excluded) down from `root`.
    pub fn find(root: &'a Command, names: &[&str]) -> CompletionResult<Self> {
        let mut path = Self::root(root);
        for name in names {
            let child = path
                .leaf()
                .find_subcommand(name)
                .ok_or_else(|| CompletionError::UnknownCommand {
                    path: format!("{} {}", root.get_name(), names.join(" ")),
                })?;
            path = path.child(child);
        }
        Ok(path)
    }

    /// Extends the path by one subcommand of the current leaf.
    pub fn child(&self, child: &'a Command) -> Self {
        let mut descendants = self.descendants.clone();
        descendants.push(child);
        Self {
            root: self.root,
            descendants,
        }
    }

    /// The command this path points at.
    pub fn leaf(&self) -> &'a Command {
        self.descendants.last().copied().unwrap_or(self.root)
    }

    /// The root of the tree this path lives in.
    pub fn root_command(&self) -> &'a Command {
        self.root
    }

    /// Commands from the root down to the leaf.
    pub fn commands(&self) -> impl DoubleEndedIterator<Item = &'a Command> + '_ {
        std::iter::once(self.root).chain(self.descendants.iter().copied())
    }

    /// Command names from the root down to the leaf.
    pub fn names(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.commands().map(Command::get_name)
    }

    /// Number of subcommands below the root.
    pub fn depth(&self) -> usize {
        self.descendants.len()
    }

    /// Human readable form, e.g. `app sub leaf`.
    pub fn display(&self) -> String {
        self.names().collect::<Vec<_>>().join(" ")
    }

    /// Flags usable on the leaf: its own non-positional args first, then the global
    /// args of its ancestors, nearest ancestor first. A name declared closer to the
    /// leaf shadows the same name further up.
    pub fn visible_flags(&self) -> Vec<Flag<'a>> {
        let mut flags: Vec<Flag<'a>> = local_flags(self.leaf())
            .map(|arg| Flag {
                arg,
                inherited: false,
            })
            .collect();

        for ancestor in self.commands().rev().skip(1) {
            for arg in local_flags(ancestor).filter(|arg| arg.is_global_set()) {
                let flag = Flag {
                    arg,
                    inherited: true,
                };
                if !flags.iter().any(|known| known.name() == flag.name()) {
                    flags.push(flag);
                }
            }
        }
        flags
    }

    /// Looks up a visible flag by its name (long name, or id for short-only flags).
    pub fn find_flag(&self, name: &str) -> Option<Flag<'a>> {
        self.visible_flags()
            .into_iter()
            .find(|flag| flag.name() == name)
    }
}

/// The non-positional args a command declares itself.
pub(crate) fn local_flags(command: &Command) -> impl Iterator<Item = &Arg> {
    command.get_arguments().filter(|arg| !arg.is_positional())
}

/// A flag as seen from some command in the tree.
#[derive(Debug, Clone, Copy)]
pub struct Flag<'a> {
    /// The clap arg behind the flag.
    pub arg: &'a Arg,
    /// `true` when the flag is declared by an ancestor and reaches the command as a global.
    pub inherited: bool,
}

impl<'a> Flag<'a> {
    /// The flag's name: its long name, or the arg id when it only has a shorthand.
    pub fn name(&self) -> &'a str {
        self.arg
            .get_long()
            .unwrap_or_else(|| self.arg.get_id().as_str())
    }

    /// The long name, without dashes.
    pub fn long(&self) -> Option<&'a str> {
        self.arg.get_long()
    }

    /// The one-letter shorthand.
    pub fn short(&self) -> Option<char> {
        self.arg.get_short()
    }

    /// Help text, empty when there is none.
    pub fn help(&self) -> String {
        self.arg
            .get_help()
            .map(ToString::to_string)
            .unwrap_or_default()
    }

    /// Whether the flag is hidden from help and completion.
    pub fn is_hidden(&self) -> bool {
        self.arg.is_hide_set()
    }

    /// Whether the flag consumes a value. Optional-value flags (`num_args(0..=n)`)
    /// count as value-less, since the shell must not insist on an argument.
    pub fn takes_value(&self) -> bool {
        self.arg.get_action().takes_values()
            && !self
                .arg
                .get_num_args()
                .is_some_and(|range| range.min_values() == 0)
    }

    pub(crate) fn matches_long(&self, long: &str) -> bool {
        self.arg.get_long() == Some(long)
            || self
                .arg
                .get_all_aliases()
                .is_some_and(|aliases| aliases.contains(&long))
    }

    pub(crate) fn matches_short(&self, short: char) -> bool {
        self.arg.get_short() == Some(short)
            || self
                .arg
                .get_all_short_aliases()
                .is_some_and(|aliases| aliases.contains(&short))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::ArgAction;

    fn tree() -> Command {
        Command::new("app")
            .arg(
                Arg::new("verbose")
                    .long("verbose")
                    .short('v')
                    .global(true)
                    .action(ArgAction::SetTrue),
            )
            .arg(Arg::new("local").long("local").action(ArgAction::SetTrue))
            .subcommand(
                Command::new("sub")
                    .alias("s")
                    .arg(Arg::new("color").long("color").short('c'))
                    .subcommand(Command::new("leaf")),
            )
    }

    #[test]
    fn test_find_walks_names_and_aliases() {
        let root = tree();
        let path = CommandPath::find(&root, &["s", "leaf"]).unwrap();
        assert_eq!(path.display(), "app sub leaf");
        assert_eq!(path.depth(), 2);
        assert_eq!(path.leaf().get_name(), "leaf");
    }

    #[test]
    fn test_find_unknown_command_is_an_error() {
        let root = tree();
        let err = CommandPath::find(&root, &["nope"]).unwrap_err();
        assert!(matches!(err, CompletionError::UnknownCommand { .. }));
    }

    #[test]
    fn test_visible_flags_include_only_global_ancestors() {
        let root = tree();
        let path = CommandPath::find(&root, &["sub"]).unwrap();
        let names: Vec<_> = path.visible_flags().iter().map(Flag::name).collect();
        assert_eq!(names, vec!["color", "verbose"]);

        let verbose = path.find_flag("verbose").unwrap();
        assert!(verbose.inherited);
        assert!(!verbose.takes_value());
        assert!(path.find_flag("local").is_none());
    }

    #[test]
    fn test_takes_value_follows_action_and_missing_values() {
        let optional = Arg::new("level")
            .long("level")
            .num_args(0..=1)
            .default_missing_value("1");
        let required = Arg::new("name").long("name");
        assert!(
            !Flag {
                arg: &optional,
                inherited: false
            }
            .takes_value()
        );
        assert!(
            Flag {
                arg: &required,
                inherited: false
            }
            .takes_value()
        );
    }
}
