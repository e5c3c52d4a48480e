//! Update planning: find declared models whose catalog version moved.

use super::commit::mark_install_now;
use crate::catalog::CatalogSource;
use crate::error::{ForgeError, Result};
use crate::interact::Interact;
use crate::model::{dedupe_names, ModelOrigin, ModelSet};
use crate::project::ConfigStore;
use tracing::debug;

/// Result of comparing declared models against the catalog.
#[derive(Debug, Default)]
pub struct UpdatePlan {
    /// Models whose catalog version moved, carrying the new version and
    /// marked for download. Committing them replaces the declared entries.
    pub stale: ModelSet,
    /// Selected models already at the catalog version.
    pub up_to_date: Vec<String>,
    /// Names that are not updatable: not declared, never downloaded from
    /// the catalog, or gone from it.
    pub not_found: Vec<String>,
}

/// Compare declared catalog models against the current catalog state.
///
/// Candidates are the declared models that came from the catalog and
/// were downloaded. With an empty `names` the candidates are offered in
/// a multi-select; otherwise the names are deduplicated and checked as
/// given. The returned stale set feeds straight into
/// [`commit`](super::commit).
pub async fn plan_update(
    catalog: &dyn CatalogSource,
    store: &dyn ConfigStore,
    interact: &dyn Interact,
    names: &[String],
) -> Result<UpdatePlan> {
    let declared = store.list_declared()?;
    let candidates: ModelSet = declared
        .into_vec()
        .into_iter()
        .filter(|m| m.origin == ModelOrigin::Catalog && m.downloaded)
        .collect::<Vec<_>>()
        .into();

    let selected = if !names.is_empty() {
        dedupe_names(names)
    } else if candidates.is_empty() || !interact.is_interactive() {
        Vec::new()
    } else {
        interact.multi_select("Select the model(s) to update", &candidates.names())
    };

    let mut plan = UpdatePlan::default();
    if selected.is_empty() {
        return Ok(plan);
    }

    let mut stale = Vec::new();
    let mut lookups = 0u32;
    let mut lookup_errors = 0u32;

    for name in &selected {
        let Some(record) = candidates.iter().find(|m| m.name == *name) else {
            plan.not_found.push(name.clone());
            continue;
        };

        lookups += 1;
        let latest = match catalog.model_by_name(name).await {
            Ok(model) => model,
            Err(ForgeError::ModelNotFound { .. }) => {
                plan.not_found.push(name.clone());
                continue;
            }
            Err(e) => {
                debug!("Catalog lookup failed for {}: {}", name, e);
                lookup_errors += 1;
                plan.not_found.push(name.clone());
                continue;
            }
        };

        if record.version == latest.last_modified {
            plan.up_to_date.push(name.clone());
        } else {
            let mut record = record.clone();
            record.version = latest.last_modified;
            stale.push(record);
        }
    }

    if lookups > 0 && lookup_errors == lookups {
        return Err(ForgeError::CatalogUnavailable);
    }

    plan.stale = mark_install_now(stale);
    Ok(plan)
}
