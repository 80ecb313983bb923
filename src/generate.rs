// src/generate.rs

//! # Fish script generation
//!
//! The script has two parts. A header defines `_state`, which asks the binary which
//! command the current line is in (cached per line), and `_callback`, which asks the
//! binary to run a registered action. Then every visible command contributes `complete`
//! rules gated on `_state <command uid>`.

use clap::Command;

use crate::{
    constants::{CALLBACK_FUNCTION, COMPLETION_COMMAND, POSITIONAL_VERB, STATE_FUNCTION, STATE_VERB},
    registry::Registry,
    tree::{CommandPath, Flag},
    uid::{command_uid, flag_uid},
};

/// Characters with a meaning inside a `complete` rule and their escaped form.
const DESCRIPTION_ESCAPES: &[(char, &str)] = &[
    (':', "\\:"),
    ('"', "\\\""),
    ('\'', "\\'"),
    ('[', "\\["),
    (']', "\\]"),
];

/// Generates the complete fish completion script for `root`.
pub fn generate(root: &Command, registry: &Registry) -> String {
    let mut script = header(root.get_name());
    script.push_str(&command_rules(&CommandPath::root(root), registry));
    script
}

fn header(program: &str) -> String {
    format!(
        r#"function {state}
  set -lx CURRENT (commandline -cp)
  if [ "$LINE" != "$CURRENT" ]
    set -gx LINE (commandline -cp)
    set -gx STATE (commandline -cp | xargs {program} {command} {state_verb})
  end

  [ "$STATE" = "$argv" ]
end

function {callback}
  set -lx CALLBACK (commandline -cp | sed "s/ \$/ _/" | xargs {program} {command} $argv )
  eval "$CALLBACK"
end

complete -c {program} -f
"#,
        state = STATE_FUNCTION,
        callback = CALLBACK_FUNCTION,
        command = COMPLETION_COMMAND,
        state_verb = STATE_VERB,
        program = program,
    )
}

/// Rules for the command at the end of `path`, followed by those of its visible
/// descendants in pre-order.
fn command_rules(path: &CommandPath<'_>, registry: &Registry) -> String {
    let command = path.leaf();
    let program = path.root_command().get_name();
    let uid = command_uid(path);

    let mut rules: Vec<String> = path
        .visible_flags()
        .iter()
        .filter(|flag| !flag.is_hidden() && !flag.inherited)
        .map(|flag| flag_rule(path, flag, registry))
        .collect();

    // The hidden completion commands do not make a command a branch.
    if visible_subcommands(command).next().is_some() {
        for child in visible_subcommands(command) {
            let about = escape(&child.get_about().map(ToString::to_string).unwrap_or_default());
            for name in std::iter::once(child.get_name()).chain(child.get_all_aliases()) {
                rules.push(format!(
                    "complete -c {} -f -n '{} {}' -a {} -d '{}'",
                    program, STATE_FUNCTION, uid, name, about
                ));
            }
        }
    } else {
        rules.push(format!(
            "complete -c {} -f -n '{} {}' -a '({} {})'",
            program, STATE_FUNCTION, uid, CALLBACK_FUNCTION, POSITIONAL_VERB
        ));
    }

    let mut blocks = vec![format!("\n{}\n", rules.join("\n"))];
    for child in visible_subcommands(command) {
        blocks.push(command_rules(&path.child(child), registry));
    }
    blocks.join("\n")
}

fn flag_rule(path: &CommandPath<'_>, flag: &Flag<'_>, registry: &Registry) -> String {
    // Flags on the path are always owned by some command on it.
    let action = flag_uid(path, flag.name())
        .ok()
        .and_then(|uid| registry.get(&uid));

    let suffix = match action {
        Some(action) => format!(" -a '({})' -r", action.value()),
        None if flag.takes_value() => " -r".to_string(),
        None => String::new(),
    };

    let mut rule = format!(
        "complete -c {} -f -n '{} {}'",
        path.root_command().get_name(),
        STATE_FUNCTION,
        command_uid(path)
    );
    if let Some(long) = flag.long() {
        rule.push_str(&format!(" -l {}", long));
    }
    if let Some(short) = flag.short() {
        rule.push_str(&format!(" -s {}", short));
    }
    rule.push_str(&format!(" -d '{}'{}", escape(&flag.help()), suffix));
    rule
}

fn visible_subcommands(command: &Command) -> impl Iterator<Item = &Command> {
    command.get_subcommands().filter(|child| !child.is_hide_set())
}

/// Escapes characters that would otherwise end or split a description.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match DESCRIPTION_ESCAPES.iter().find(|(special, _)| *special == c) {
            Some((_, replacement)) => escaped.push_str(replacement),
            None => escaped.push(c),
        }
    }
    escaped
}
