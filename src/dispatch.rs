// src/dispatch.rs

//! # Completion dispatch
//!
//! The generated script never runs completion logic itself: it re-invokes the program
//! as `<program> _fish_completion <verb> <current command line...>`. Each invocation
//! is a short-lived process that answers one question and prints one line.
//!
//! ## Verbs
//!
//! - *(none)*: print the whole script (bootstrap).
//! - `state`: print the command UID of the line being edited, then exit.
//! - `_`: work out which positional slot the cursor is on and run its action.
//! - any UID: run the action registered for that UID.
//!
//! A second hidden command, `_zsh_completion`, skips the verbs: its first argument is
//! always a UID whose action is run directly.

use clap::{Arg, ArgAction, ArgMatches, Command};
use log::debug;

use crate::{
    constants::{COMPLETION_COMMAND, PLAIN_COMPLETION_COMMAND, POSITIONAL_VERB, STATE_VERB},
    generate::generate,
    registry::Registry,
    traverse::traverse,
    uid::{command_uid, positional_uid, resolve_uid},
};

const RAW_ARGS: &str = "args";

/// What a dispatch invocation answers with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// The full completion script.
    Script(String),
    /// The command UID of the current line. The process ends right after printing it.
    State(String),
    /// A shell expression producing candidates, possibly empty.
    Value(String),
}

impl Reply {
    /// The text printed for this reply.
    pub fn text(&self) -> &str {
        match self {
            Self::Script(text) | Self::State(text) | Self::Value(text) => text,
        }
    }
}

/// Adds the hidden completion commands to `root`. Installing twice is a no-op.
pub fn install(root: Command) -> Command {
    [COMPLETION_COMMAND, PLAIN_COMPLETION_COMMAND]
        .into_iter()
        .fold(root, |root, name| {
            if root.find_subcommand(name).is_some() {
                debug!("'{}' is already installed", name);
                root
            } else {
                root.subcommand(completion_command(name))
            }
        })
}

fn completion_command(name: &'static str) -> Command {
    Command::new(name)
        .about("Answers completion requests from the generated shell script.")
        .hide(true)
        .disable_help_flag(true)
        .disable_version_flag(true)
        .arg(
            Arg::new(RAW_ARGS)
                .num_args(0..)
                .action(ArgAction::Append)
                .trailing_var_arg(true)
                .allow_hyphen_values(true),
        )
}

/// The raw, unparsed arguments given to the completion command.
pub fn raw_args(matches: &ArgMatches) -> Vec<String> {
    matches
        .get_many::<String>(RAW_ARGS)
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

/// The 1-based positional slot the cursor is on.
///
/// A last token ending in a space is finished, so the cursor is on the next slot;
/// otherwise the last token is the one being typed.
pub fn cursor_position(args: &[String]) -> usize {
    match args.last() {
        None => 1,
        Some(last) if last.ends_with(' ') => args.len() + 1,
        Some(_) => args.len(),
    }
}

/// Answers one completion request.
///
/// `raw_args` is `[verb, program, line...]`: the shell pipes the whole command line,
/// program name included, after the verb.
///
/// Every verb answers with exactly one line, except a UID that does not resolve
/// against `root`: the installed script is stale, so the process logs the UID and
/// exits with status 1 without printing anything.
pub fn dispatch(root: &Command, registry: &Registry, raw_args: &[String]) -> Reply {
    let Some((verb, rest)) = raw_args.split_first() else {
        return Reply::Script(generate(root, registry));
    };
    let line = rest.get(1..).unwrap_or_default();
    let traversal = traverse(root, line);

    let uid = match verb.as_str() {
        STATE_VERB => return Reply::State(command_uid(&traversal.path)),
        POSITIONAL_VERB => positional_uid(&traversal.path, cursor_position(&traversal.args)),
        uid => {
            resolve_uid(root, uid);
            uid.to_string()
        }
    };
    debug!("Dispatching '{}' for verb '{}'", uid, verb);

    Reply::Value(registry.invoke(&uid, &traversal.args).value())
}

/// Answers a request to the plain completion command: `[uid, program, line...]`.
pub fn dispatch_plain(root: &Command, registry: &Registry, raw_args: &[String]) -> Reply {
    let Some((uid, rest)) = raw_args.split_first() else {
        return Reply::Script(generate(root, registry));
    };
    let traversal = traverse(root, rest.get(1..).unwrap_or_default());
    Reply::Value(registry.invoke(uid, &traversal.args).value())
}

/// Answers one completion request on stdout. A `state` request ends the process.
pub fn run(root: &Command, registry: &Registry, raw_args: &[String]) {
    print_reply(dispatch(root, registry, raw_args));
}

fn print_reply(reply: Reply) {
    match reply {
        Reply::State(uid) => {
            println!("{}", uid);
            std::process::exit(0);
        }
        reply => println!("{}", reply.text()),
    }
}

/// Runs a completion command when `matches` selected one. Returns `false` when the
/// invocation was meant for the application itself.
pub fn handle_matches(root: &Command, registry: &Registry, matches: &ArgMatches) -> bool {
    match matches.subcommand() {
        Some((COMPLETION_COMMAND, sub_matches)) => {
            run(root, registry, &raw_args(sub_matches));
            true
        }
        Some((PLAIN_COMPLETION_COMMAND, sub_matches)) => {
            print_reply(dispatch_plain(root, registry, &raw_args(sub_matches)));
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;

    fn tree() -> Command {
        install(
            Command::new("app").subcommand(
                Command::new("sub")
                    .about("A subcommand")
                    .arg(
                        Arg::new("color")
                            .long("color")
                            .short('c')
                            .help("Output color"),
                    )
                    .arg(Arg::new("first"))
                    .arg(Arg::new("second")),
            ),
        )
    }

    fn registry(root: &Command) -> Registry {
        let mut registry = Registry::new();
        registry
            .positional(
                root,
                &["sub"],
                [
                    Action::callback(|_| Action::values(["red", "blue"])),
                    Action::callback(|args| Action::values(args.iter().map(|a| format!("after-{}", a)))),
                ],
            )
            .unwrap();
        registry
            .flags(root, &["sub"], [("color", Action::values(["auto", "never"]))])
            .unwrap();
        registry
    }

    fn args(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_cursor_position() {
        assert_eq!(cursor_position(&[]), 1);
        assert_eq!(cursor_position(&args(&["a", "b"])), 2);
        assert_eq!(cursor_position(&args(&["a", "b "])), 3);
    }

    #[test]
    fn test_install_is_idempotent() {
        let root = install(tree());
        for name in [COMPLETION_COMMAND, PLAIN_COMPLETION_COMMAND] {
            let count = root
                .get_subcommands()
                .filter(|c| c.get_name() == name)
                .count();
            assert_eq!(count, 1);
        }
    }

    #[test]
    fn test_install_accepts_raw_arguments() {
        let root = tree();
        let matches = root
            .clone()
            .try_get_matches_from(["app", COMPLETION_COMMAND, "_", "app", "sub", "--color", "-h"])
            .unwrap();
        let (name, sub_matches) = matches.subcommand().unwrap();
        assert_eq!(name, COMPLETION_COMMAND);
        assert_eq!(raw_args(sub_matches), args(&["_", "app", "sub", "--color", "-h"]));
    }

    #[test]
    fn test_no_args_bootstraps_the_script() {
        let root = tree();
        let registry = registry(&root);
        match dispatch(&root, &registry, &[]) {
            Reply::Script(script) => {
                assert!(script.contains("function _state"));
                // The hidden command is never offered as a candidate.
                assert!(!script.contains("-a _fish_completion"));
            }
            other => panic!("expected script, got {:?}", other),
        }
    }

    #[test]
    fn test_state_reports_command_uid() {
        let root = tree();
        let registry = registry(&root);
        let reply = dispatch(&root, &registry, &args(&["state", "app", "sub", "--color"]));
        assert_eq!(reply, Reply::State("_app__sub".to_string()));
    }

    #[test]
    fn test_sentinel_resolves_first_positional() {
        let root = tree();
        let registry = registry(&root);
        let reply = dispatch(&root, &registry, &args(&["_", "app", "sub"]));
        assert_eq!(reply, Reply::Value(r"echo -e red\nblue".to_string()));
    }

    #[test]
    fn test_sentinel_tracks_cursor_position() {
        let root = tree();
        let registry = registry(&root);
        let reply = dispatch(&root, &registry, &args(&["_", "app", "sub", "-c", "auto", "x", "y"]));
        assert_eq!(reply, Reply::Value(r"echo -e after-x\nafter-y".to_string()));

        let reply = dispatch(&root, &registry, &args(&["_", "app", "sub", "x", "y", "z"]));
        assert_eq!(reply, Reply::Value(String::new()));
    }

    #[test]
    fn test_explicit_uid_runs_registered_action() {
        let root = tree();
        let registry = registry(&root);
        let reply = dispatch(&root, &registry, &args(&["_app__sub##color", "app", "sub", "--color"]));
        assert_eq!(reply, Reply::Value(r"echo -e auto\nnever".to_string()));
    }

    #[test]
    fn test_plain_dispatch_treats_first_argument_as_uid() {
        let root = tree();
        let registry = registry(&root);
        // `_` is just an unknown UID here, not the positional sentinel.
        let reply = dispatch_plain(&root, &registry, &args(&["_", "app", "sub"]));
        assert_eq!(reply, Reply::Value(String::new()));

        let reply = dispatch_plain(&root, &registry, &args(&["_app__sub#2", "app", "sub", "x"]));
        assert_eq!(reply, Reply::Value("echo -e after-x".to_string()));
    }

    #[test]
    fn test_unregistered_uid_is_empty() {
        let root = tree();
        let registry = registry(&root);
        let reply = dispatch(&root, &registry, &args(&["_app#1", "app"]));
        assert_eq!(reply, Reply::Value(String::new()));
        assert_eq!(reply.text(), "");
    }
}
