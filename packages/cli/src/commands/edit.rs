//! Commands that apply one mutation and write the result

use crate::config::Config;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use formtree_editor::{FormDocument, Mutation};
use std::path::{Path, PathBuf};

/// Where to write the edited form
#[derive(Args, Debug)]
pub struct OutputArgs {
    /// Output file (defaults to the config's outDir, then to the input)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Form document (JSON)
    pub input: PathBuf,

    /// Element to remove
    pub id: String,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug)]
pub struct CloneArgs {
    /// Form document (JSON)
    pub input: PathBuf,

    /// Element to duplicate
    pub id: String,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug)]
pub struct MoveArgs {
    /// Form document (JSON)
    pub input: PathBuf,

    /// Parent whose children are reordered
    pub parent_id: String,

    /// Current position of the child
    pub from: usize,

    /// New position of the child
    pub to: usize,

    #[command(flatten)]
    pub output: OutputArgs,
}

pub fn delete(args: DeleteArgs, cwd: &str) -> Result<()> {
    let mutation = Mutation::RemoveElement {
        element_id: args.id.clone(),
    };
    run(&args.input, &args.output, mutation, cwd)
}

pub fn clone(args: CloneArgs, cwd: &str) -> Result<()> {
    let path = PathBuf::from(cwd).join(&args.input);
    let doc = FormDocument::load(path)?;

    let (parent, index) = doc
        .root()
        .parent_of(&args.id)
        .ok_or_else(|| anyhow!("'{}' has no parent to clone into", args.id))?;

    let mutation = Mutation::CloneElement {
        parent_id: parent.id.clone(),
        after_index: index,
        element_id: args.id.clone(),
    };
    run(&args.input, &args.output, mutation, cwd)
}

pub fn move_element(args: MoveArgs, cwd: &str) -> Result<()> {
    let mutation = Mutation::MoveElement {
        parent_id: args.parent_id.clone(),
        from_index: args.from,
        to_index: args.to,
    };
    run(&args.input, &args.output, mutation, cwd)
}

fn run(input: &Path, output: &OutputArgs, mutation: Mutation, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let mut doc =
        FormDocument::load(PathBuf::from(cwd).join(input))?.with_options(config.editor.clone());

    let name = mutation.name();
    let result = doc.apply(mutation)?;

    let target = match &output.output {
        Some(path) => PathBuf::from(cwd).join(path),
        None => config.output_path(cwd, &doc.path),
    };

    if target == doc.path {
        doc.save()?;
    } else {
        if let Some(dir) = target.parent() {
            std::fs::create_dir_all(dir)?;
        }
        doc.save_as(&target)?;
    }

    println!("{} {}", "✓".green(), name);
    if let Some(created) = result.created_id {
        println!("   Created: {}", created.bright_white());
    }
    println!("   Output: {}", target.display());

    Ok(())
}
