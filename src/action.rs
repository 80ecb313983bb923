// src/action.rs

//! # Completion actions
//!
//! An [`Action`] says how one argument is completed. It is either a static fish
//! expression, evaluated by the shell to produce candidates, or a deferred callback
//! that only the running binary can execute.
//!
//! Callbacks cannot be written into a script, so registering one *finalizes* it: its
//! shell-visible value becomes `_callback <uid>`, which makes the shell re-invoke the
//! binary with that UID. The closure itself stays in the [`Registry`](crate::registry::Registry).

use std::{fmt, sync::Arc};

use crate::constants::{CALLBACK_FUNCTION, NO_VALUES_MESSAGE};

/// A completion callback: receives the residual positional arguments of the line being
/// edited and returns the action to evaluate.
pub type CompletionCallback = Arc<dyn Fn(&[String]) -> Action + Send + Sync>;

/// How to complete a single argument.
#[derive(Clone)]
pub enum Action {
    /// A fish expression whose output is the candidate list.
    Static(String),
    /// A closure run by the dispatch command. `uid` is set once the action is
    /// registered under a slot.
    Callback {
        /// The closure to run.
        callback: CompletionCallback,
        /// The slot the action is registered under.
        uid: Option<String>,
    },
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(value) => f.debug_tuple("Static").field(value).finish(),
            Self::Callback { uid, .. } => f.debug_struct("Callback").field("uid", uid).finish(),
        }
    }
}

impl Default for Action {
    /// The empty action: nothing to suggest.
    fn default() -> Self {
        Self::Static(String::new())
    }
}

impl Action {
    /// Wraps a shell expression verbatim.
    pub fn static_value(expression: impl Into<String>) -> Self {
        Self::Static(expression.into())
    }

    /// Defers completion to `callback`, run inside the binary at completion time.
    pub fn callback<F>(callback: F) -> Self
    where
        F: Fn(&[String]) -> Self + Send + Sync + 'static,
    {
        Self::Callback {
            callback: Arc::new(callback),
            uid: None,
        }
    }

    /// Completes a fixed set of words, one per line.
    ///
    /// A set whose words are all blank becomes a message instead, so the shell never
    /// evaluates an empty `echo`.
    pub fn values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        if values.concat().trim().is_empty() {
            return Self::message(NO_VALUES_MESSAGE);
        }
        Self::Static(format!("echo -e {}", values.join("\\n")))
    }

    /// Completes words with a description shown next to each candidate.
    pub fn values_described<I, V, D>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (V, D)>,
        V: fmt::Display,
        D: fmt::Display,
    {
        Self::values(
            pairs
                .into_iter()
                .map(|(value, description)| format!("{}\\t{}", value, description)),
        )
    }

    /// Displays a hint where no real candidates exist.
    pub fn message(text: impl fmt::Display) -> Self {
        Self::values_described([
            ("ERR".to_string(), text.to_string()),
            ("_".to_string(), String::new()),
        ])
    }

    /// Completes `true` and `false`.
    pub fn boolean() -> Self {
        Self::values(["true", "false"])
    }

    /// Completes file paths ending in `suffix`.
    pub fn paths(suffix: &str) -> Self {
        Self::Static(format!("__fish_complete_suffix \"{}\"", suffix))
    }

    /// Completes files ending in `suffix`.
    pub fn files(suffix: &str) -> Self {
        Self::Static(format!("__fish_complete_suffix \"{}\"", suffix))
    }

    /// Completes network interface names.
    pub fn net_interfaces() -> Self {
        Self::static_value("__fish_print_interfaces")
    }

    /// Completes user names.
    pub fn users() -> Self {
        Self::static_value("__fish_complete_users")
    }

    /// Completes group names.
    pub fn groups() -> Self {
        Self::static_value("__fish_complete_groups")
    }

    /// Completes host names.
    pub fn hosts() -> Self {
        Self::static_value("__fish_print_hostnames")
    }

    /// Completes words made of `separator`-delimited parts.
    ///
    /// Parts are not completed independently yet: the separator is ignored and the
    /// values are offered as whole words.
    pub fn multi_parts<I, S>(_separator: char, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::values(values)
    }

    /// Binds the action to the slot `uid`. Static actions are returned unchanged; a
    /// callback is (re)pointed at `uid`, whatever it was bound to before.
    pub fn finalize(self, uid: &str) -> Self {
        match self {
            Self::Callback { callback, .. } => Self::Callback {
                callback,
                uid: Some(uid.to_string()),
            },
            static_action => static_action,
        }
    }

    /// The expression the shell evaluates for this action.
    pub fn value(&self) -> String {
        match self {
            Self::Static(value) => value.clone(),
            Self::Callback { uid: Some(uid), .. } => format!("{} {}", CALLBACK_FUNCTION, uid),
            Self::Callback { uid: None, .. } => String::new(),
        }
    }

    /// Whether completion is deferred to the binary.
    pub fn is_callback(&self) -> bool {
        matches!(self, Self::Callback { .. })
    }

    /// Runs the callback with the residual positional arguments. Static actions are
    /// their own result.
    pub fn invoke(&self, args: &[String]) -> Self {
        match self {
            Self::Static(_) => self.clone(),
            Self::Callback { callback, .. } => callback(args),
        }
    }
}
