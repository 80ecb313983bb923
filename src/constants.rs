// src/constants.rs

/// The name of the hidden sub-command the shell re-invokes during completion.
pub const COMPLETION_COMMAND: &str = "_fish_completion";

/// The name of the hidden sub-command that runs a UID's action without resolving
/// `state` or `_` verbs.
pub const PLAIN_COMPLETION_COMMAND: &str = "_zsh_completion";

/// Dispatch verb asking for the command UID of the line being edited.
pub const STATE_VERB: &str = "state";

/// Dispatch verb asking to resolve the positional UID under the cursor and run it.
pub const POSITIONAL_VERB: &str = "_";

/// Name of the fish helper that compares the current context with a command UID.
pub const STATE_FUNCTION: &str = "_state";

/// Name of the fish helper that evaluates a callback through the dispatch command.
pub const CALLBACK_FUNCTION: &str = "_callback";

/// Separator between command names inside a command UID.
pub const PATH_SEPARATOR: &str = "__";

/// Separator between a command UID and a flag name.
pub const FLAG_SEPARATOR: &str = "##";

/// Separator between a command UID and a positional index.
pub const POSITIONAL_SEPARATOR: &str = "#";

/// Shown by the shell when a value set turns out to be empty.
pub const NO_VALUES_MESSAGE: &str = "no values to complete";
