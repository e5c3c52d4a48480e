//! `modelforge list` - show declared models.

use anyhow::Result;
use modelforge_library::{ConfigStore, ProjectConfig};
use std::path::Path;

pub fn run(project_root: &Path) -> Result<()> {
    let store = ProjectConfig::open(project_root)?;
    let declared = store.list_declared()?;

    if declared.is_empty() {
        println!("no models declared");
        return Ok(());
    }

    for model in &declared {
        let state = if model.downloaded {
            "downloaded"
        } else {
            "declared"
        };
        let tag = model.pipeline_tag.as_deref().unwrap_or("-");
        println!("{:<12} {:<20} {}", state, tag, model.name);
    }
    println!("{} model(s)", declared.len());
    Ok(())
}
