//! Persisted project configuration: the set of declared models.

use super::atomic::{read_json, write_json};
use crate::config::PathsConfig;
use crate::error::{ForgeError, IoResultExt, Result};
use crate::model::{ModelRecord, ModelSet};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Access to the declared-model state of a project.
///
/// `append_declared` is the only write path used by the commit stage and
/// must cover all records in one atomic call — the configuration either
/// gains the whole batch or none of it.
pub trait ConfigStore: Send + Sync {
    /// All models currently declared, in declaration order.
    fn list_declared(&self) -> Result<ModelSet>;

    /// Add records to the declared set with a single atomic write.
    ///
    /// Records whose names are already declared replace the previous
    /// entry; everything else is preserved unchanged.
    fn append_declared(&self, records: &ModelSet) -> Result<()>;

    /// Delete a model's install path from disk.
    fn remove_physical(&self, name: &str) -> Result<()>;

    /// Root directory where model artifacts are materialized.
    fn models_dir(&self) -> PathBuf;
}

/// Root structure of `modelforge.json`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct ProjectFile {
    #[serde(default)]
    models: Vec<ModelRecord>,
}

/// File-backed [`ConfigStore`] rooted at a project directory.
pub struct ProjectConfig {
    project_root: PathBuf,
}

impl ProjectConfig {
    /// Open the configuration of an existing project.
    ///
    /// Fails if the project root does not exist; the config file itself
    /// may be absent (empty declared set).
    pub fn open(project_root: impl Into<PathBuf>) -> Result<Self> {
        let project_root = project_root.into();
        if !project_root.is_dir() {
            return Err(ForgeError::Config {
                message: format!("Project root does not exist: {}", project_root.display()),
            });
        }
        Ok(Self { project_root })
    }

    /// The project root this store is bound to.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    fn config_path(&self) -> PathBuf {
        self.project_root.join(PathsConfig::CONFIG_FILE_NAME)
    }

    fn load(&self) -> Result<ProjectFile> {
        Ok(read_json(&self.config_path())?.unwrap_or_default())
    }

    fn save(&self, file: &ProjectFile) -> Result<()> {
        write_json(&self.config_path(), file, true)
    }

    /// Remove declared entries by name after deleting their artifacts.
    ///
    /// Returns the names that were not declared in the first place.
    pub fn remove_declared_by_names(&self, names: &[String]) -> Result<Vec<String>> {
        let declared: ModelSet = self.load()?.models.into();
        let to_remove = declared.filter_with_names(names);

        let not_found: Vec<String> = names
            .iter()
            .filter(|n| !declared.contains_name(n))
            .cloned()
            .collect();

        if to_remove.is_empty() {
            return Ok(not_found);
        }

        for record in &to_remove {
            self.remove_physical(&record.name)?;
        }

        let remaining = declared.difference(&to_remove);
        self.save(&ProjectFile {
            models: remaining.into_vec(),
        })?;
        info!("Removed {} declared model(s)", to_remove.len());

        Ok(not_found)
    }

    /// Delete empty directories from `path` up to (excluding) `stop`.
    fn prune_empty_dirs(&self, mut path: PathBuf, stop: &Path) {
        while path.starts_with(stop) && path != stop {
            let empty = match std::fs::read_dir(&path) {
                Ok(mut entries) => entries.next().is_none(),
                Err(_) => false,
            };
            if !empty || std::fs::remove_dir(&path).is_err() {
                break;
            }
            match path.parent() {
                Some(parent) => path = parent.to_path_buf(),
                None => break,
            }
        }
    }
}

impl ConfigStore for ProjectConfig {
    fn list_declared(&self) -> Result<ModelSet> {
        Ok(self.load()?.models.into())
    }

    fn append_declared(&self, records: &ModelSet) -> Result<()> {
        let declared: ModelSet = self.load()?.models.into();

        // Entries being re-declared are replaced by the incoming records.
        let unchanged = declared.difference(records);

        let mut models = unchanged.into_vec();
        let now = chrono::Utc::now().to_rfc3339();
        for record in records {
            let mut record = record.clone();
            if record.added_date.is_none() {
                record.added_date = Some(now.clone());
            }
            models.push(record);
        }

        self.save(&ProjectFile { models })?;
        debug!("Declared {} model(s) in {}", records.len(), self.config_path().display());
        Ok(())
    }

    fn remove_physical(&self, name: &str) -> Result<()> {
        let models_dir = self.models_dir();
        let install_path = models_dir.join(name);

        if !install_path.exists() {
            debug!("Install path already absent: {}", install_path.display());
            return Ok(());
        }

        if install_path.is_dir() {
            std::fs::remove_dir_all(&install_path).with_path(&install_path)?;
        } else {
            std::fs::remove_file(&install_path).with_path(&install_path)?;
        }

        // A removed owner/repo layout leaves the owner directory behind.
        if let Some(parent) = install_path.parent() {
            self.prune_empty_dirs(parent.to_path_buf(), &models_dir);
        }

        info!("Removed install path {}", install_path.display());
        Ok(())
    }

    fn models_dir(&self) -> PathBuf {
        self.project_root.join(PathsConfig::MODELS_DIR_NAME)
    }
}
