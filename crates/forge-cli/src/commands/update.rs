//! `modelforge update` - re-download declared models whose catalog
//! version moved.

use crate::interact::TermInteract;
use anyhow::{bail, Result};
use clap::Args;
use modelforge_library::{
    commit, plan_update, CatalogClient, Interact, ProjectConfig, ScriptAcquirer,
};
use std::path::Path;

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Model names to check; omit to pick from the downloaded models
    pub names: Vec<String>,

    /// Update without asking for confirmation
    #[arg(short, long)]
    pub yes: bool,
}

pub async fn run(project_root: &Path, args: UpdateArgs) -> Result<()> {
    let store = ProjectConfig::open(project_root)?;
    let catalog = CatalogClient::new()?;
    let interact = TermInteract;

    let plan = plan_update(&catalog, &store, &interact, &args.names).await?;

    for name in &plan.not_found {
        eprintln!("warning: not updatable: {}", name);
    }
    for name in &plan.up_to_date {
        println!("up to date: {}", name);
    }
    if plan.stale.is_empty() {
        println!("nothing to update");
        return Ok(());
    }

    if !args.yes {
        let question = format!("Update {} model(s)?", plan.stale.len());
        if !interact.confirm(&question, true) {
            return Ok(());
        }
    }

    let acquirer = ScriptAcquirer::new(project_root);
    let outcome = commit(&store, &acquirer, plan.stale).await?;

    for model in &outcome.succeeded {
        println!("updated {}", model.name);
    }
    for model in &outcome.failed {
        eprintln!("failed: {}", model.name);
    }

    if !outcome.failed.is_empty() {
        bail!("{} model(s) failed to update", outcome.failed.len());
    }
    Ok(())
}
