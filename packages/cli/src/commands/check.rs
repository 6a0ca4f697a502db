use anyhow::Result;
use clap::Args;
use colored::Colorize;
use formtree_editor::{find_dangling_references, find_duplicate_ids, FormDocument};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Form document (JSON) to check
    pub input: PathBuf,
}

pub fn check(args: CheckArgs, cwd: &str) -> Result<()> {
    let path = PathBuf::from(cwd).join(&args.input);
    let doc = FormDocument::load(path)?;
    let root = doc.root();

    println!("🔍 {} {}", "Checking".green().bold(), args.input.display());
    println!("   Form: {} ({})", doc.form().title, doc.form().id);
    println!("   Elements: {}", root.pre_order().count());
    println!();

    // Collisions are advisory
    let duplicates = find_duplicate_ids(root);
    for warning in &duplicates {
        println!("{} {}", "⚠".yellow(), warning);
    }

    let dangling = find_dangling_references(root);
    for reference in &dangling {
        let title = root
            .find(&reference.element_id)
            .map(|e| e.display_title())
            .unwrap_or(&reference.element_id);
        println!(
            "{} '{}' references missing element '{}'",
            "✗".red(),
            title,
            reference.missing_id
        );
    }

    if duplicates.is_empty() && dangling.is_empty() {
        println!("   {} No issues found!", "✓".green());
        return Ok(());
    }

    println!();
    if !duplicates.is_empty() {
        println!("   {} {}", "Duplicate ids:".yellow(), duplicates.len());
    }
    if !dangling.is_empty() {
        println!("   {} {}", "Dangling references:".red(), dangling.len());
        std::process::exit(1);
    }

    Ok(())
}
