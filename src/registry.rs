// src/registry.rs

use std::collections::HashMap;

use clap::Command;
use log::debug;

use crate::{
    action::Action,
    error::{CompletionError, CompletionResult},
    tree::CommandPath,
    uid::{flag_uid, positional_uid},
};

/// The single source of truth for dynamic completions: finalized actions keyed by UID.
///
/// The host application fills it once at startup, before generating the script or
/// dispatching a completion request. Afterwards it is only read.
#[derive(Debug, Default)]
pub struct Registry {
    actions: HashMap<String, Action>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers positional actions for the command at the end of `path`. The first
    /// action completes position 1, the second position 2, and so on.
    pub fn register_positional<I>(&mut self, path: &CommandPath<'_>, actions: I) -> CompletionResult<()>
    where
        I: IntoIterator<Item = Action>,
    {
        for (index, action) in actions.into_iter().enumerate() {
            self.insert(positional_uid(path, index + 1), action)?;
        }
        Ok(())
    }

    /// Registers flag actions for the command at the end of `path`, keyed by flag name.
    /// Inherited flags may be named here; the action is stored under the UID of the
    /// command that declares the flag.
    pub fn register_flags<I, N>(&mut self, path: &CommandPath<'_>, actions: I) -> CompletionResult<()>
    where
        I: IntoIterator<Item = (N, Action)>,
        N: AsRef<str>,
    {
        for (name, action) in actions {
            let name = name.as_ref();
            let flag = path
                .find_flag(name)
                .ok_or_else(|| CompletionError::UnknownFlag {
                    command: path.display(),
                    flag: name.to_string(),
                })?;
            self.insert(flag_uid(path, flag.name())?, action)?;
        }
        Ok(())
    }

    /// Shorthand for [`Registry::register_positional`] on the command reached by
    /// following `names` from `root`.
    pub fn positional<I>(&mut self, root: &Command, names: &[&str], actions: I) -> CompletionResult<()>
    where
        I: IntoIterator<Item = Action>,
    {
        let path = CommandPath::find(root, names)?;
        self.register_positional(&path, actions)
    }

    /// Shorthand for [`Registry::register_flags`] on the command reached by following
    /// `names` from `root`.
    pub fn flags<I, N>(&mut self, root: &Command, names: &[&str], actions: I) -> CompletionResult<()>
    where
        I: IntoIterator<Item = (N, Action)>,
        N: AsRef<str>,
    {
        let path = CommandPath::find(root, names)?;
        self.register_flags(&path, actions)
    }

    fn insert(&mut self, uid: String, action: Action) -> CompletionResult<()> {
        if self.actions.contains_key(&uid) {
            return Err(CompletionError::DuplicateRegistration { uid });
        }
        debug!("Registering {:?} for '{}'", action, uid);
        let action = action.finalize(&uid);
        self.actions.insert(uid, action);
        Ok(())
    }

    /// The finalized action registered for `uid`.
    pub fn get(&self, uid: &str) -> Option<&Action> {
        self.actions.get(uid)
    }

    /// Produces the completion for `uid`: a callback runs with `args`, a static action
    /// is returned as is, and an unknown UID yields the empty action.
    pub fn invoke(&self, uid: &str, args: &[String]) -> Action {
        match self.actions.get(uid) {
            Some(action) => {
                debug!("Invoking '{}' with {:?}", uid, args);
                action.invoke(args)
            }
            None => {
                debug!("No action registered for '{}'", uid);
                Action::default()
            }
        }
    }

    /// Number of registered slots.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{Arg, ArgAction};

    fn tree() -> Command {
        Command::new("app")
            .arg(
                Arg::new("config")
                    .long("config")
                    .global(true),
            )
            .subcommand(
                Command::new("sub")
                    .arg(Arg::new("color").long("color").short('c'))
                    .arg(Arg::new("dry-run").long("dry-run").action(ArgAction::SetTrue))
                    .arg(Arg::new("target")),
            )
    }

    #[test]
    fn test_register_positional_finalizes_with_slot_uid() {
        let root = tree();
        let mut registry = Registry::new();
        registry
            .positional(
                &root,
                &["sub"],
                [
                    Action::callback(|_| Action::values(["red", "blue"])),
                    Action::boolean(),
                ],
            )
            .unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry.get("_app__sub#1").unwrap().value(),
            "_callback _app__sub#1"
        );
        assert_eq!(
            registry.get("_app__sub#2").unwrap().value(),
            Action::boolean().value()
        );
    }

    #[test]
    fn test_register_inherited_flag_uses_owner_uid() {
        let root = tree();
        let mut registry = Registry::new();
        registry
            .flags(&root, &["sub"], [("config", Action::files(".toml"))])
            .unwrap();
        assert!(registry.get("_app##config").is_some());
        assert!(registry.get("_app__sub##config").is_none());
    }

    #[test]
    fn test_register_unknown_flag_fails() {
        let root = tree();
        let mut registry = Registry::new();
        let err = registry
            .flags(&root, &["sub"], [("missing", Action::boolean())])
            .unwrap_err();
        assert!(matches!(err, CompletionError::UnknownFlag { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_twice_fails() {
        let root = tree();
        let mut registry = Registry::new();
        registry
            .flags(&root, &["sub"], [("color", Action::boolean())])
            .unwrap();
        let err = registry
            .flags(&root, &["sub"], [("color", Action::boolean())])
            .unwrap_err();
        assert_eq!(
            err,
            CompletionError::DuplicateRegistration {
                uid: "_app__sub##color".to_string()
            }
        );
    }

    #[test]
    fn test_invoke_runs_callbacks_and_ignores_unknown() {
        let root = tree();
        let mut registry = Registry::new();
        registry
            .positional(
                &root,
                &["sub"],
                [Action::callback(|args| Action::values([args.len().to_string()]))],
            )
            .unwrap();

        let args = vec!["a".to_string(), "b".to_string()];
        assert_eq!(registry.invoke("_app__sub#1", &args).value(), "echo -e 2");
        assert_eq!(registry.invoke("_app__sub#9", &args).value(), "");
    }
}
