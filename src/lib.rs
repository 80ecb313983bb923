//! # tabwise
//!
//! Fish completions for clap command trees, with dynamic values computed by the
//! application itself.
//!
//! The host application builds its `clap::Command` tree, adds the hidden completion
//! command with [`install`], registers [`Action`]s for flags and positionals in a
//! [`Registry`], and routes the completion command to [`dispatch::run`]. Running
//! `<program> _fish_completion` prints the script to source in fish; from then on fish
//! calls back into the program whenever a dynamic value is needed.
//!
//! ```no_run
//! use clap::{Arg, Command};
//! use tabwise::{Action, Registry, install};
//!
//! let root = install(
//!     Command::new("app").subcommand(
//!         Command::new("sub").arg(Arg::new("color").long("color").short('c')),
//!     ),
//! );
//!
//! let mut registry = Registry::new();
//! registry.flags(&root, &["sub"], [("color", Action::values(["red", "blue"]))])?;
//! registry.positional(&root, &["sub"], [Action::callback(|_args| Action::files(".txt"))])?;
//!
//! let matches = root.clone().get_matches();
//! tabwise::dispatch::handle_matches(&root, &registry, &matches);
//! # Ok::<(), tabwise::CompletionError>(())
//! ```

pub mod action;
pub mod constants;
pub mod dispatch;
pub mod error;
pub mod generate;
pub mod registry;
pub mod traverse;
pub mod tree;
pub mod uid;

pub use action::{Action, CompletionCallback};
pub use dispatch::{Reply, dispatch, install};
pub use error::{CompletionError, CompletionResult};
pub use generate::generate;
pub use registry::Registry;
pub use traverse::{Traversal, traverse};
pub use tree::{CommandPath, Flag};
