mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    check, clone, delete, move_element, usages, CheckArgs, CloneArgs, DeleteArgs, MoveArgs,
    UsagesArgs,
};

/// Formtree CLI - inspect and restructure form documents
#[derive(Parser, Debug)]
#[command(name = "formtree")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log mutation and traversal details
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Report duplicate ids and dangling references
    Check(CheckArgs),

    /// List the elements whose conditional logic references an element
    Usages(UsagesArgs),

    /// Remove an element, refusing if something still depends on it
    Delete(DeleteArgs),

    /// Duplicate an element right after itself
    Clone(CloneArgs),

    /// Reorder a child within its parent
    Move(MoveArgs),
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new(default_level)
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cwd = match std::env::current_dir() {
        Ok(dir) => dir.display().to_string(),
        Err(err) => {
            eprintln!("{} Cannot get current directory: {}", "Error:".red().bold(), err);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Command::Check(args) => check(args, &cwd),
        Command::Usages(args) => usages(args, &cwd),
        Command::Delete(args) => delete(args, &cwd),
        Command::Clone(args) => clone(args, &cwd),
        Command::Move(args) => move_element(args, &cwd),
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
