// src/bin/palette.rs

use anyhow::Result;
use clap::{Command, CommandFactory, FromArgMatches, Parser, Subcommand};
use colored::*;
use tabwise::{Action, Registry, dispatch, install};

const PRIMARY_COLORS: &[&str] = &["red", "yellow", "blue"];

/// palette: mixes and applies paint. Run `palette _fish_completion | source` in fish
/// to enable completions.
#[derive(Parser, Debug)]
#[command(name = "palette", author, version, about, long_about = None)]
struct Cli {
    /// Explain every step.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<PaletteCommand>,
}

#[derive(Subcommand, Debug)]
enum PaletteCommand {
    /// Paints files with a color.
    Paint {
        /// The color to apply.
        #[arg(long, short)]
        color: Option<String>,

        /// Surface finish: matte or gloss.
        #[arg(long)]
        finish: Option<String>,

        /// Files to paint.
        files: Vec<String>,
    },
    /// Mixes two primary colors.
    #[command(alias = "blend")]
    Mix {
        /// The first color.
        first: String,
        /// The second color.
        second: String,
    },
    /// Prints internal state.
    #[command(hide = true)]
    Debug,
}

/// Registers every completion the CLI offers.
fn completions(root: &Command) -> Result<Registry> {
    let mut registry = Registry::new();

    registry.flags(
        root,
        &["paint"],
        [
            (
                "color",
                Action::values_described([("red", "warm"), ("yellow", "bright"), ("blue", "cold")]),
            ),
            ("finish", Action::values(["matte", "gloss"])),
        ],
    )?;
    registry.positional(root, &["paint"], [Action::files("")])?;

    registry.positional(
        root,
        &["mix"],
        [
            Action::callback(|_| Action::values(PRIMARY_COLORS.iter().copied())),
            // The second color cannot repeat the first one.
            Action::callback(|args| {
                let first = args.first().map(String::as_str);
                Action::values(
                    PRIMARY_COLORS
                        .iter()
                        .copied()
                        .filter(|color| Some(*color) != first),
                )
            }),
        ],
    )?;

    Ok(registry)
}

/// The main entry point of `palette`.
/// It sets up logging, answers completion requests, and otherwise runs the command.
fn main() {
    env_logger::init();

    if let Err(e) = run_cli() {
        eprintln!("\n{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run_cli() -> Result<()> {
    let root = install(Cli::command());
    let registry = completions(&root)?;

    let matches = root.clone().get_matches();
    if dispatch::handle_matches(&root, &registry, &matches) {
        return Ok(());
    }

    let cli = Cli::from_arg_matches(&matches)?;
    log::debug!("CLI args parsed: {:?}", cli);

    match cli.command {
        Some(PaletteCommand::Paint {
            color,
            finish,
            files,
        }) => {
            let color = color.unwrap_or_else(|| "white".to_string());
            if cli.verbose {
                println!("{} {}", "finish:".dimmed(), finish.as_deref().unwrap_or("matte"));
            }
            for file in files {
                println!("Painted {} {}", file.cyan(), color);
            }
        }
        Some(PaletteCommand::Mix { first, second }) => {
            println!("Mixed {} and {}", first.yellow(), second.yellow());
        }
        Some(PaletteCommand::Debug) => {
            println!("{} completion slots registered", registry.len());
        }
        None => {
            println!("Nothing to paint. Try `palette --help`.");
        }
    }
    Ok(())
}
