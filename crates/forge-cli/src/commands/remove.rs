//! `modelforge remove` - delete models from disk and configuration.

use crate::interact::TermInteract;
use anyhow::Result;
use clap::Args;
use modelforge_library::{ConfigStore, Interact, ProjectConfig};
use std::path::Path;

#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Model names to remove; omit with --all to remove everything
    pub names: Vec<String>,

    /// Remove every declared model
    #[arg(short, long, conflicts_with = "names")]
    pub all: bool,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

pub fn run(project_root: &Path, args: RemoveArgs) -> Result<()> {
    let store = ProjectConfig::open(project_root)?;

    let names = if args.all {
        store.list_declared()?.names()
    } else {
        args.names
    };
    if names.is_empty() {
        println!("nothing to remove");
        return Ok(());
    }

    if !args.yes {
        let question = format!("Remove {} model(s) and their files?", names.len());
        if !TermInteract.confirm(&question, false) {
            return Ok(());
        }
    }

    let missing = store.remove_declared_by_names(&names)?;
    for name in &missing {
        eprintln!("warning: not declared: {}", name);
    }
    println!("removed {} model(s)", names.len() - missing.len());
    Ok(())
}
