// src/traverse.rs

//! # Command line reconstruction
//!
//! During completion the shell hands back whatever the user has typed so far. This
//! module walks it the way a real invocation would to find the command being edited
//! and the positional arguments given to it.
//!
//! # Logic:
//! 1. Leading tokens naming subcommands descend into the tree. Flags met on the way
//!    are set aside together with their values, and the first token that is not a
//!    subcommand stops the descent.
//! 2. The set-aside flags and the remaining tokens are parsed against the flags
//!    visible on the command that was reached. Parse problems are expected here (the
//!    last token is usually incomplete) and never abort the walk.

use clap::Command;
use log::debug;

use crate::tree::{CommandPath, Flag};

/// The reconstructed position of a partial command line.
#[derive(Debug, Clone)]
pub struct Traversal<'a> {
    /// The command the line is in.
    pub path: CommandPath<'a>,
    /// Tokens not consumed as subcommand names, flags or flag values, in order.
    pub args: Vec<String>,
}

/// Reconstructs the command and residual positionals of `raw_args`, which must not
/// include the program name.
pub fn traverse<'a>(root: &'a Command, raw_args: &[String]) -> Traversal<'a> {
    let (path, rest) = descend(root, raw_args);
    let args = parse_flags(&path, &rest);
    debug!(
        "Traversed {:?} to '{}' with args {:?}",
        raw_args,
        path.display(),
        args
    );
    Traversal { path, args }
}

fn descend<'a>(root: &'a Command, raw_args: &[String]) -> (CommandPath<'a>, Vec<String>) {
    let mut path = CommandPath::root(root);
    let mut set_aside = Vec::new();
    let mut tokens = raw_args.iter();

    while let Some(token) = tokens.next() {
        if token == "--" {
            set_aside.push(token.clone());
            set_aside.extend(tokens.by_ref().cloned());
            break;
        }

        if let Some(long) = token.strip_prefix("--") {
            set_aside.push(token.clone());
            let flags = path.visible_flags();
            let needs_value = !long.contains('=')
                && find_long(&flags, long).is_some_and(|flag| flag.takes_value());
            if needs_value {
                set_aside.extend(tokens.next().cloned());
            }
            continue;
        }

        if let Some(shorts) = token.strip_prefix('-').filter(|s| !s.is_empty()) {
            set_aside.push(token.clone());
            if cluster_awaits_value(&path.visible_flags(), shorts) {
                set_aside.extend(tokens.next().cloned());
            }
            continue;
        }

        match path.leaf().find_subcommand(token) {
            Some(child) => path = path.child(child),
            None => {
                set_aside.push(token.clone());
                set_aside.extend(tokens.by_ref().cloned());
                break;
            }
        }
    }

    (path, set_aside)
}

/// Whether a shorthand cluster ends on a flag that takes its value from the next token.
/// A value-taking shorthand in the middle of the cluster takes the rest as its value.
fn cluster_awaits_value(flags: &[Flag<'_>], shorts: &str) -> bool {
    for (offset, short) in shorts.char_indices() {
        if find_short(flags, short).is_some_and(|flag| flag.takes_value()) {
            return offset + short.len_utf8() == shorts.len();
        }
    }
    false
}

fn parse_flags(path: &CommandPath<'_>, tokens: &[String]) -> Vec<String> {
    let flags = path.visible_flags();
    let mut positionals = Vec::new();
    let mut tokens = tokens.iter();

    while let Some(token) = tokens.next() {
        if token == "--" {
            positionals.extend(tokens.by_ref().cloned());
            break;
        }

        if let Some(long) = token.strip_prefix("--") {
            let (name, inline_value) = match long.split_once('=') {
                Some((name, value)) => (name, Some(value)),
                None => (long, None),
            };
            match find_long(&flags, name) {
                Some(flag) if flag.takes_value() && inline_value.is_none() => {
                    if tokens.next().is_none() {
                        debug!("Flag '--{}' is still waiting for its value", name);
                    }
                }
                Some(_) => {}
                None => debug!("Ignoring unknown flag '{}'", token),
            }
            continue;
        }

        if let Some(shorts) = token.strip_prefix('-').filter(|s| !s.is_empty()) {
            for (offset, short) in shorts.char_indices() {
                match find_short(&flags, short) {
                    Some(flag) if flag.takes_value() => {
                        // The rest of the cluster, if any, is the value.
                        let rest = shorts.get(offset + short.len_utf8()..).unwrap_or_default();
                        if rest.is_empty() && tokens.next().is_none() {
                            debug!("Flag '-{}' is still waiting for its value", short);
                        }
                        break;
                    }
                    Some(_) => {}
                    None => debug!("Ignoring unknown shorthand '-{}' in '{}'", short, token),
                }
            }
            continue;
        }

        positionals.push(token.clone());
    }

    positionals
}

fn find_long<'f, 'a>(flags: &'f [Flag<'a>], long: &str) -> Option<&'f Flag<'a>> {
    flags.iter().find(|flag| flag.matches_long(long))
}

fn find_short<'f, 'a>(flags: &'f [Flag<'a>], short: char) -> Option<&'f Flag<'a>> {
    flags.iter().find(|flag| flag.matches_short(short))
}
