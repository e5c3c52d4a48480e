//! Reconciliation engine: reduce user intent, catalog data, disk state
//! and declared configuration to one approved action set.

use crate::catalog::{CatalogSource, PipelineTag};
use crate::error::{ForgeError, Result};
use crate::interact::Interact;
use crate::model::{dedupe_names, disk, is_valid_model_name, ModelRecord, ModelSet};
use crate::project::ConfigStore;
use tracing::{debug, warn};

/// Behavior flags for one reconciliation run.
///
/// Scoped to a single command invocation; nothing here outlives the call.
#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    /// Offer the tag multi-select even when names were supplied.
    pub interactive: bool,
    /// Answer yes to every confirmation without prompting.
    pub assume_yes: bool,
    /// How many times an empty tag selection is re-prompted before the
    /// run falls through to the empty-selection path.
    pub tag_retries: u32,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        ReconcileOptions {
            interactive: false,
            assume_yes: false,
            tag_retries: 2,
        }
    }
}

/// Outcome of a reconciliation run.
#[derive(Debug)]
pub struct Reconciliation {
    /// Models cleared for the commit stage.
    pub approved: ModelSet,
    /// Accumulated soft failures, surfaced once at the end.
    pub warnings: Vec<String>,
}

/// Orchestrates identifier resolution, conflict detection and
/// user-confirmed conflict resolution.
///
/// The engine owns no state between runs; collaborators are injected so
/// the whole flow runs headless under tests.
pub struct ReconcileEngine<'a> {
    catalog: &'a dyn CatalogSource,
    store: &'a dyn ConfigStore,
    interact: &'a dyn Interact,
    options: ReconcileOptions,
}

impl<'a> ReconcileEngine<'a> {
    pub fn new(
        catalog: &'a dyn CatalogSource,
        store: &'a dyn ConfigStore,
        interact: &'a dyn Interact,
        options: ReconcileOptions,
    ) -> Self {
        Self {
            catalog,
            store,
            interact,
            options,
        }
    }

    /// Reconcile requested model names into an approved install set.
    ///
    /// Soft failures (duplicates, already-declared names, catalog misses,
    /// declined disk conflicts) become warnings. Hard failures are a
    /// catalog that errors on every lookup and a failed deletion of a
    /// conflicting install path.
    pub async fn reconcile(&self, requested: &[String]) -> Result<Reconciliation> {
        let mut warnings = Vec::new();
        let declared = self.store.list_declared()?;

        // Stable dedupe, first occurrence wins.
        let names = dedupe_names(requested);

        let mut resolved = self.resolve_names(&names, &declared, &mut warnings).await?;

        // Interactive augmentation over the tag taxonomy.
        if (names.is_empty() || self.options.interactive) && self.interact.is_interactive() {
            self.augment_from_tags(&declared, &mut resolved, &mut warnings)
                .await?;
        }

        // Empty selection ends the run; it is not an error.
        if resolved.is_empty() {
            warnings.push("no models selected".to_string());
            return Ok(Reconciliation {
                approved: ModelSet::new(),
                warnings,
            });
        }

        self.select_install_now(&mut resolved);

        let invalid = self.resolve_disk_conflicts(&resolved, &mut warnings)?;

        let approved = resolved.difference(&invalid);
        if approved.is_empty() {
            warnings.push("no models approved for installation".to_string());
        }

        Ok(Reconciliation { approved, warnings })
    }

    /// Classify each name against the declared set, then resolve the
    /// remainder through the catalog.
    ///
    /// Declared state wins: a declared name is never re-resolved.
    async fn resolve_names(
        &self,
        names: &[String],
        declared: &ModelSet,
        warnings: &mut Vec<String>,
    ) -> Result<ModelSet> {
        let mut resolved = ModelSet::new();
        let mut lookups = 0u32;
        let mut lookup_errors = 0u32;

        for name in names {
            if declared.contains_name(name) {
                warnings.push(format!("already declared: {}", name));
                continue;
            }

            if !is_valid_model_name(name) {
                warnings.push(format!("invalid model name: {}", name));
                continue;
            }

            lookups += 1;
            match self.catalog.model_by_name(name).await {
                Ok(model) => {
                    debug!("Resolved {} via catalog", name);
                    resolved.push(ModelRecord::from(model));
                }
                Err(ForgeError::ModelNotFound { .. }) => {
                    warnings.push(format!("not found in catalog: {}", name));
                }
                Err(e) => {
                    lookup_errors += 1;
                    warnings.push(format!("catalog lookup failed for {}: {}", name, e));
                }
            }
        }

        // A single miss is soft; a catalog that errored on every call is not.
        if lookups > 0 && lookup_errors == lookups {
            return Err(ForgeError::CatalogUnavailable);
        }

        Ok(resolved)
    }

    /// Offer the tag taxonomy, then the per-tag model lists, excluding
    /// everything already resolved or declared.
    async fn augment_from_tags(
        &self,
        declared: &ModelSet,
        resolved: &mut ModelSet,
        warnings: &mut Vec<String>,
    ) -> Result<()> {
        let mut empty_picks = 0u32;
        let tags = loop {
            let picked = self
                .interact
                .multi_select("Select the type of models to add", &PipelineTag::all_strings());
            if !picked.is_empty() {
                break picked;
            }
            // Bounded re-prompt; exhaustion falls through to the
            // empty-selection path.
            empty_picks += 1;
            if empty_picks > self.options.tag_retries {
                warnings.push("no model type selected".to_string());
                return Ok(());
            }
            warn!("No model type selected, asking again");
        };

        let mut available = ModelSet::new();
        let mut lookups = 0u32;
        let mut lookup_errors = 0u32;

        for tag_name in &tags {
            let Some(tag) = PipelineTag::parse(tag_name) else {
                warnings.push(format!("unknown model type: {}", tag_name));
                continue;
            };

            lookups += 1;
            match self.catalog.models_by_tag(tag).await {
                Ok(models) => {
                    for model in models {
                        available.push(ModelRecord::from(model));
                    }
                }
                Err(e) => {
                    lookup_errors += 1;
                    warnings.push(format!("catalog listing failed for {}: {}", tag, e));
                }
            }
        }

        if lookups > 0 && lookup_errors == lookups {
            return Err(ForgeError::CatalogUnavailable);
        }

        // Set difference by name against args + configuration.
        let available = available.difference(resolved).difference(declared);
        if available.is_empty() {
            warnings.push("no new models available for the selected types".to_string());
            return Ok(());
        }

        let picked = self
            .interact
            .multi_select("Select the model(s) to add", &available.names());
        for record in available.filter_with_names(&picked) {
            resolved.push(record);
        }

        Ok(())
    }

    /// Decide which resolved models download now vs. declare-only.
    ///
    /// The prompt is inverted on purpose: the user deselects, so the
    /// default of selecting nothing installs everything.
    fn select_install_now(&self, resolved: &mut ModelSet) {
        if self.options.assume_yes || !self.interact.is_interactive() {
            for record in resolved.iter_mut() {
                record.install_now = true;
            }
            return;
        }

        let defer = self
            .interact
            .multi_select("Select the model(s) to install later", &resolved.names());
        for record in resolved.iter_mut() {
            record.install_now = !defer.contains(&record.name);
        }
    }

    /// Probe install paths and resolve conflicts through the user.
    ///
    /// Returns the records excluded from installation. A confirmed
    /// conflict deletes the existing path before the model proceeds; a
    /// failed deletion aborts the whole run.
    fn resolve_disk_conflicts(
        &self,
        resolved: &ModelSet,
        warnings: &mut Vec<String>,
    ) -> Result<ModelSet> {
        let models_dir = self.store.models_dir();
        let mut invalid = ModelSet::new();

        for record in resolved {
            let install_path = record.install_path(&models_dir);

            let present = match disk::present_on_disk(&install_path) {
                Ok(present) => present,
                Err(e) => {
                    warnings.push(format!("cannot probe {}: {}", install_path.display(), e));
                    invalid.push(record.clone());
                    continue;
                }
            };
            if !present {
                continue;
            }

            let question = if record.install_now {
                format!(
                    "Model '{}' already exists at '{}'. Do you want to overwrite it?",
                    record.name,
                    install_path.display()
                )
            } else {
                format!(
                    "Model '{}' already exists at '{}'. Do you want to delete it?",
                    record.name,
                    install_path.display()
                )
            };

            let proceed = self.options.assume_yes || self.interact.confirm(&question, false);
            if proceed {
                self.store.remove_physical(&record.name).map_err(|e| {
                    ForgeError::DeletionFailed {
                        name: record.name.clone(),
                        message: e.to_string(),
                    }
                })?;
            } else {
                warnings.push(format!("kept existing files, skipping: {}", record.name));
                invalid.push(record.clone());
            }
        }

        Ok(invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogModel;
    use crate::interact::scripted::ScriptedInteract;
    use crate::interact::AssumeDefaults;
    use crate::project::ProjectConfig;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use tempfile::TempDir;

    /// In-memory catalog: known models by name, tag listings, and an
    /// optional hard-failure mode.
    #[derive(Default)]
    struct FakeCatalog {
        models: HashMap<String, CatalogModel>,
        by_tag: HashMap<&'static str, Vec<CatalogModel>>,
        failing: bool,
    }

    impl FakeCatalog {
        fn with_models(names: &[&str]) -> Self {
            let mut catalog = FakeCatalog::default();
            for name in names {
                catalog.models.insert((*name).into(), entry(name));
            }
            catalog
        }
    }

    fn entry(name: &str) -> CatalogModel {
        CatalogModel {
            name: name.into(),
            pipeline_tag: Some("text-generation".into()),
            library_name: Some("transformers".into()),
            last_modified: None,
        }
    }

    #[async_trait]
    impl CatalogSource for FakeCatalog {
        async fn model_by_name(&self, name: &str) -> Result<CatalogModel> {
            if self.failing {
                return Err(ForgeError::Network {
                    message: "connection refused".into(),
                    cause: None,
                });
            }
            self.models
                .get(name)
                .cloned()
                .ok_or_else(|| ForgeError::ModelNotFound { name: name.into() })
        }

        async fn models_by_tag(&self, tag: PipelineTag) -> Result<Vec<CatalogModel>> {
            if self.failing {
                return Err(ForgeError::Network {
                    message: "connection refused".into(),
                    cause: None,
                });
            }
            Ok(self.by_tag.get(tag.as_str()).cloned().unwrap_or_default())
        }
    }

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn yes_options() -> ReconcileOptions {
        ReconcileOptions {
            assume_yes: true,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_empty_input_terminates_without_error() {
        let dir = TempDir::new().unwrap();
        let store = ProjectConfig::open(dir.path()).unwrap();
        let catalog = FakeCatalog::default();
        let engine = ReconcileEngine::new(
            &catalog,
            &store,
            &AssumeDefaults,
            ReconcileOptions::default(),
        );

        let outcome = engine.reconcile(&[]).await.unwrap();
        assert!(outcome.approved.is_empty());
        assert!(outcome.warnings.iter().any(|w| w.contains("no models selected")));
    }

    #[tokio::test]
    async fn test_dedupe_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = ProjectConfig::open(dir.path()).unwrap();
        let catalog = FakeCatalog::with_models(&["org/alpha", "org/beta"]);

        let engine = ReconcileEngine::new(&catalog, &store, &AssumeDefaults, yes_options());
        let dup = engine
            .reconcile(&names(&["org/alpha", "org/beta", "org/alpha"]))
            .await
            .unwrap();
        let clean = engine
            .reconcile(&names(&["org/alpha", "org/beta"]))
            .await
            .unwrap();

        assert_eq!(dup.approved.names(), clean.approved.names());
        assert_eq!(dup.warnings, clean.warnings);
    }

    #[tokio::test]
    async fn test_declared_wins_over_catalog() {
        let dir = TempDir::new().unwrap();
        let store = ProjectConfig::open(dir.path()).unwrap();
        store
            .append_declared(&vec![ModelRecord::named("org/alpha")].into())
            .unwrap();

        // alpha resolves in the catalog too; declared state must win.
        let catalog = FakeCatalog::with_models(&["org/alpha", "org/beta"]);
        let engine = ReconcileEngine::new(&catalog, &store, &AssumeDefaults, yes_options());

        let outcome = engine
            .reconcile(&names(&["org/alpha", "org/beta", "org/alpha"]))
            .await
            .unwrap();

        assert_eq!(outcome.approved.names(), vec!["org/beta"]);
        let declared_warnings: Vec<_> = outcome
            .warnings
            .iter()
            .filter(|w| w.contains("already declared: org/alpha"))
            .collect();
        assert_eq!(declared_warnings.len(), 1);
    }

    #[tokio::test]
    async fn test_catalog_miss_is_soft() {
        let dir = TempDir::new().unwrap();
        let store = ProjectConfig::open(dir.path()).unwrap();
        let catalog = FakeCatalog::with_models(&["org/beta"]);
        let engine = ReconcileEngine::new(&catalog, &store, &AssumeDefaults, yes_options());

        let outcome = engine
            .reconcile(&names(&["org/ghost", "org/beta"]))
            .await
            .unwrap();
        assert_eq!(outcome.approved.names(), vec!["org/beta"]);
        assert!(outcome
            .warnings
            .iter()
            .any(|w| w.contains("not found in catalog: org/ghost")));
    }

    #[tokio::test]
    async fn test_all_lookups_failing_is_hard() {
        let dir = TempDir::new().unwrap();
        let store = ProjectConfig::open(dir.path()).unwrap();
        let catalog = FakeCatalog {
            failing: true,
            ..Default::default()
        };
        let engine = ReconcileEngine::new(&catalog, &store, &AssumeDefaults, yes_options());

        let err = engine
            .reconcile(&names(&["org/alpha", "org/beta"]))
            .await
            .unwrap_err();
        assert!(matches!(err, ForgeError::CatalogUnavailable));
    }

    #[tokio::test]
    async fn test_invalid_name_skips_catalog() {
        let dir = TempDir::new().unwrap();
        let store = ProjectConfig::open(dir.path()).unwrap();
        // Catalog fails hard, but the only requested name never reaches it.
        let catalog = FakeCatalog {
            failing: true,
            ..Default::default()
        };
        let engine = ReconcileEngine::new(&catalog, &store, &AssumeDefaults, yes_options());

        let outcome = engine.reconcile(&names(&["no-owner"])).await.unwrap();
        assert!(outcome.approved.is_empty());
        assert!(outcome
            .warnings
            .iter()
            .any(|w| w.contains("invalid model name: no-owner")));
    }

    #[tokio::test]
    async fn test_disk_conflict_confirmed_deletes_and_approves() {
        let dir = TempDir::new().unwrap();
        let store = ProjectConfig::open(dir.path()).unwrap();
        let catalog = FakeCatalog::with_models(&["org/gamma"]);

        let install = store.models_dir().join("org/gamma");
        std::fs::create_dir_all(&install).unwrap();
        std::fs::write(install.join("weights.bin"), b"old").unwrap();

        let interact = ScriptedInteract::new();
        interact.push_selection::<String>(vec![]); // install everything now
        interact.push_confirm(true); // overwrite

        let engine = ReconcileEngine::new(
            &catalog,
            &store,
            &interact,
            ReconcileOptions::default(),
        );
        let outcome = engine.reconcile(&names(&["org/gamma"])).await.unwrap();

        assert_eq!(outcome.approved.names(), vec!["org/gamma"]);
        assert!(!install.exists());
    }

    #[tokio::test]
    async fn test_disk_conflict_declined_is_excluded() {
        let dir = TempDir::new().unwrap();
        let store = ProjectConfig::open(dir.path()).unwrap();
        let catalog = FakeCatalog::with_models(&["org/gamma"]);

        let install = store.models_dir().join("org/gamma");
        std::fs::create_dir_all(&install).unwrap();
        std::fs::write(install.join("weights.bin"), b"old").unwrap();

        let interact = ScriptedInteract::new();
        interact.push_selection::<String>(vec![]);
        interact.push_confirm(false); // keep existing files

        let engine = ReconcileEngine::new(
            &catalog,
            &store,
            &interact,
            ReconcileOptions::default(),
        );
        let outcome = engine.reconcile(&names(&["org/gamma"])).await.unwrap();

        assert!(outcome.approved.is_empty());
        assert!(install.exists());
        assert!(outcome
            .warnings
            .iter()
            .any(|w| w.contains("skipping: org/gamma")));
    }

    #[tokio::test]
    async fn test_tag_augmentation_excludes_known_models() {
        let dir = TempDir::new().unwrap();
        let store = ProjectConfig::open(dir.path()).unwrap();
        store
            .append_declared(&vec![ModelRecord::named("org/declared")].into())
            .unwrap();

        let mut catalog = FakeCatalog::default();
        catalog.by_tag.insert(
            "text-generation",
            vec![entry("org/declared"), entry("org/fresh")],
        );

        let interact = ScriptedInteract::new();
        interact.push_selection(vec!["text-generation"]); // tag pick
        interact.push_selection(vec!["org/fresh"]); // model pick
        interact.push_selection::<String>(vec![]); // install everything now

        let engine = ReconcileEngine::new(
            &catalog,
            &store,
            &interact,
            ReconcileOptions::default(),
        );
        let outcome = engine.reconcile(&[]).await.unwrap();

        assert_eq!(outcome.approved.names(), vec!["org/fresh"]);
        assert!(outcome.approved.iter().all(|m| m.install_now));
    }

    #[tokio::test]
    async fn test_empty_tag_selection_is_bounded() {
        let dir = TempDir::new().unwrap();
        let store = ProjectConfig::open(dir.path()).unwrap();
        let catalog = FakeCatalog::default();

        let interact = ScriptedInteract::new();
        // tag_retries = 1: initial prompt + one retry, then give up.
        interact.push_selection::<String>(vec![]);
        interact.push_selection::<String>(vec![]);

        let options = ReconcileOptions {
            tag_retries: 1,
            ..Default::default()
        };
        let engine = ReconcileEngine::new(&catalog, &store, &interact, options);
        let outcome = engine.reconcile(&[]).await.unwrap();

        assert!(outcome.approved.is_empty());
        assert!(outcome
            .warnings
            .iter()
            .any(|w| w.contains("no model type selected")));
    }

    #[tokio::test]
    async fn test_install_later_selection_unmarks_models() {
        let dir = TempDir::new().unwrap();
        let store = ProjectConfig::open(dir.path()).unwrap();
        let catalog = FakeCatalog::with_models(&["org/alpha", "org/beta"]);

        let interact = ScriptedInteract::new();
        interact.push_selection(vec!["org/beta"]); // defer beta

        let engine = ReconcileEngine::new(
            &catalog,
            &store,
            &interact,
            ReconcileOptions::default(),
        );
        let outcome = engine
            .reconcile(&names(&["org/alpha", "org/beta"]))
            .await
            .unwrap();

        let marks: HashMap<String, bool> = outcome
            .approved
            .iter()
            .map(|m| (m.name.clone(), m.install_now))
            .collect();
        assert_eq!(marks["org/alpha"], true);
        assert_eq!(marks["org/beta"], false);
    }
}
