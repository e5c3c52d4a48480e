//! `modelforge add` - resolve, download and declare models.

use crate::interact::TermInteract;
use anyhow::{bail, Result};
use clap::Args;
use modelforge_library::{
    commit, CatalogClient, ProjectConfig, ReconcileEngine, ReconcileOptions, ScriptAcquirer,
};
use std::path::Path;

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Model names in owner/repo form; omit to pick from the catalog
    pub names: Vec<String>,

    /// Offer the catalog selection even when names are given
    #[arg(short, long)]
    pub select: bool,

    /// Answer yes to every confirmation
    #[arg(short, long)]
    pub yes: bool,
}

pub async fn run(project_root: &Path, args: AddArgs) -> Result<()> {
    let store = ProjectConfig::open(project_root)?;
    let catalog = CatalogClient::new()?;
    let interact = TermInteract;

    let options = ReconcileOptions {
        interactive: args.select,
        assume_yes: args.yes,
        ..Default::default()
    };

    let engine = ReconcileEngine::new(&catalog, &store, &interact, options);
    let plan = engine.reconcile(&args.names).await?;

    for warning in &plan.warnings {
        eprintln!("warning: {}", warning);
    }
    if plan.approved.is_empty() {
        return Ok(());
    }

    let acquirer = ScriptAcquirer::new(project_root);
    let outcome = commit(&store, &acquirer, plan.approved).await?;

    for model in &outcome.succeeded {
        if model.downloaded {
            println!("added {} (downloaded)", model.name);
        } else {
            println!("added {} (declared only)", model.name);
        }
    }
    for model in &outcome.failed {
        eprintln!("failed: {}", model.name);
    }

    if !outcome.failed.is_empty() {
        bail!(
            "{} of {} model(s) failed to download",
            outcome.failed.len(),
            outcome.failed.len() + outcome.succeeded.len()
        );
    }
    Ok(())
}
