use anyhow::Result;
use clap::Args;
use colored::Colorize;
use formtree_editor::FormDocument;
use formtree_model::Element;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct UsagesArgs {
    /// Form document (JSON)
    pub input: PathBuf,

    /// Element whose dependents should be listed
    pub id: String,

    /// Also list dependents of every descendant
    #[arg(short, long)]
    pub children: bool,
}

pub fn usages(args: UsagesArgs, cwd: &str) -> Result<()> {
    let doc = FormDocument::load(PathBuf::from(cwd).join(&args.input))?;

    let target = doc
        .root()
        .find(&args.id)
        .ok_or_else(|| anyhow::anyhow!("Element not found: {}", args.id))?;

    println!(
        "{} {} ({})",
        "Usages of".bright_blue().bold(),
        target.display_title(),
        target.element_type()
    );
    print_usages(&doc.usages(&args.id)?, "   ");

    if args.children {
        for entry in doc.usages_of_children(&args.id)? {
            println!("   {} {}", "└".dimmed(), entry.child.display_title());
            print_usages(&entry.usages, "      ");
        }
    }

    Ok(())
}

fn print_usages(usages: &[&Element], indent: &str) {
    if usages.is_empty() {
        println!("{}{}", indent, "(none)".dimmed());
    }
    for element in usages {
        println!(
            "{}{} {} [{}]",
            indent,
            "←".yellow(),
            element.display_title(),
            element.id
        );
    }
}
