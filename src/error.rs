// src/error.rs

use thiserror::Error;

/// Errors raised while wiring completions onto a command tree.
///
/// All of these are caller bugs: they surface at registration time, before any
/// script is generated, so a broken setup fails loudly instead of producing a
/// script that silently completes nothing.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CompletionError {
    /// A subcommand name on the path does not exist.
    #[error("Command '{path}' not found in the command tree.")]
    UnknownCommand {
        /// The path as given, root included.
        path: String,
    },
    /// The flag is neither local to the command nor a global of an ancestor.
    #[error("Flag '{flag}' is not visible on command '{command}'.")]
    UnknownFlag {
        /// The command the flag was looked up on.
        command: String,
        /// The flag name.
        flag: String,
    },
    /// No command on the path declares the flag, so it has no UID.
    #[error("No command on the path to '{command}' declares flag '{flag}'.")]
    FlagNotOwned {
        /// The command at the end of the path.
        command: String,
        /// The flag name.
        flag: String,
    },
    /// The slot already has an action.
    #[error("An action is already registered for '{uid}'.")]
    DuplicateRegistration {
        /// The slot's UID.
        uid: String,
    },
    /// The UID names a command that is not in the tree.
    #[error("UID '{uid}' does not resolve against the command tree.")]
    UnresolvedUid {
        /// The offending UID.
        uid: String,
    },
}

/// Result type of registration and UID lookups.
pub type CompletionResult<T> = Result<T, CompletionError>;
