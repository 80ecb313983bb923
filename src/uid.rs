// src/uid.rs

//! # UID codec
//!
//! Every completion slot in the tree has a stable string address:
//!
//! - command: `_app__sub__leaf`
//! - flag: `_app__sub##color` (always relative to the command that declares the flag)
//! - positional: `_app__sub#1` (1-based)
//!
//! The generated script embeds these strings and the dispatch side recomputes them
//! from a reconstructed command line, so both sides must agree byte for byte.

use clap::Command;
use log::{debug, error};

use crate::{
    constants::{FLAG_SEPARATOR, PATH_SEPARATOR, POSITIONAL_SEPARATOR},
    error::{CompletionError, CompletionResult},
    tree::{CommandPath, local_flags},
};

/// UID of the command at the end of `path`.
pub fn command_uid(path: &CommandPath<'_>) -> String {
    format!("_{}", path.names().collect::<Vec<_>>().join(PATH_SEPARATOR))
}

/// UID of flag `name` as seen from the command at the end of `path`.
///
/// The owner is the nearest command on the path, leaf first, that declares the flag
/// itself. A flag no command on the path declares is a caller bug.
pub fn flag_uid(path: &CommandPath<'_>, name: &str) -> CompletionResult<String> {
    let commands: Vec<&Command> = path.commands().collect();
    let owner_depth = commands
        .iter()
        .rposition(|command| declares_flag(command, name))
        .ok_or_else(|| CompletionError::FlagNotOwned {
            command: path.display(),
            flag: name.to_string(),
        })?;

    let owner_names: Vec<&str> = path.names().take(owner_depth + 1).collect();
    Ok(format!(
        "_{}{}{}",
        owner_names.join(PATH_SEPARATOR),
        FLAG_SEPARATOR,
        name
    ))
}

/// UID of the 1-based positional slot `index` of the command at the end of `path`.
pub fn positional_uid(path: &CommandPath<'_>, index: usize) -> String {
    format!("{}{}{}", command_uid(path), POSITIONAL_SEPARATOR, index)
}

fn declares_flag(command: &Command, name: &str) -> bool {
    local_flags(command).any(|arg| arg.get_long().unwrap_or_else(|| arg.get_id().as_str()) == name)
}

/// Locates the command a UID of any shape refers to.
///
/// The first path element is the root's own name and is not looked up. A UID that
/// does not resolve was produced against a different tree.
pub fn try_resolve_uid<'a>(root: &'a Command, uid: &str) -> CompletionResult<CommandPath<'a>> {
    let unresolved = || CompletionError::UnresolvedUid {
        uid: uid.to_string(),
    };

    let body = uid.strip_prefix('_').ok_or_else(unresolved)?;
    let command_part = body.split(POSITIONAL_SEPARATOR).next().unwrap_or_default();
    let names: Vec<&str> = command_part.split(PATH_SEPARATOR).skip(1).collect();

    CommandPath::find(root, &names).map_err(|_| unresolved())
}

/// Like [`try_resolve_uid`], but a mismatch ends the process.
///
/// Each completion request is a fresh process, so a UID that does not match the live
/// tree means the installed script is stale; there is nothing to recover.
pub fn resolve_uid<'a>(root: &'a Command, uid: &str) -> CommandPath<'a> {
    match try_resolve_uid(root, uid) {
        Ok(path) => {
            debug!("Resolved '{}' to '{}'", uid, path.display());
            path
        }
        Err(e) => {
            error!("{}", e);
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}
