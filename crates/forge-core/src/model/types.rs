//! Model records and ordered, name-unique model sets.

use crate::catalog::CatalogModel;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Where a declared model came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ModelOrigin {
    #[default]
    Catalog,
    Custom,
}

/// One model as it moves through the pipeline and into the project
/// configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ModelRecord {
    /// Unique, case-sensitive `owner/repo` identifier.
    pub name: String,
    /// Python module used by the downloader (transformers, diffusers, ...).
    #[serde(default)]
    pub module: Option<String>,
    /// Class within the module, when known.
    #[serde(default)]
    pub class: Option<String>,
    /// Extra downloader options, verbatim.
    #[serde(default)]
    pub options: Vec<String>,
    /// Pipeline tag reported by the catalog.
    #[serde(default)]
    pub pipeline_tag: Option<String>,
    /// Catalog vs. manually added.
    #[serde(default)]
    pub origin: ModelOrigin,
    /// Install path relative to the project root, once materialized.
    #[serde(default)]
    pub path: Option<String>,
    /// Whether this run should download artifacts, not just declare.
    #[serde(default)]
    pub install_now: bool,
    /// True once artifacts were materialized by a successful acquisition.
    #[serde(default)]
    pub downloaded: bool,
    /// Catalog version marker (last-modified timestamp).
    #[serde(default)]
    pub version: Option<String>,
    /// Timestamp the record entered the configuration.
    #[serde(default)]
    pub added_date: Option<String>,
}

impl ModelRecord {
    /// Create a bare record pending catalog resolution.
    pub fn named(name: impl Into<String>) -> Self {
        ModelRecord {
            name: name.into(),
            ..Default::default()
        }
    }

    /// The on-disk location for this model's artifacts.
    pub fn install_path(&self, models_dir: &Path) -> PathBuf {
        models_dir.join(&self.name)
    }
}

impl From<CatalogModel> for ModelRecord {
    fn from(m: CatalogModel) -> Self {
        ModelRecord {
            name: m.name,
            module: m.library_name,
            pipeline_tag: m.pipeline_tag,
            origin: ModelOrigin::Catalog,
            version: m.last_modified,
            ..Default::default()
        }
    }
}

/// Ordered sequence of [`ModelRecord`]s with unique names.
///
/// Order is insertion order; a name entering twice keeps its first
/// occurrence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelSet(Vec<ModelRecord>);

impl ModelSet {
    pub fn new() -> Self {
        ModelSet(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if a record with this exact name is present.
    pub fn contains_name(&self, name: &str) -> bool {
        self.0.iter().any(|m| m.name == name)
    }

    /// Append a record unless its name is already present.
    ///
    /// Returns false when the record was dropped as a duplicate.
    pub fn push(&mut self, record: ModelRecord) -> bool {
        if self.contains_name(&record.name) {
            return false;
        }
        self.0.push(record);
        true
    }

    /// The records of `self` whose names do not appear in `other`.
    pub fn difference(&self, other: &ModelSet) -> ModelSet {
        ModelSet(
            self.0
                .iter()
                .filter(|m| !other.contains_name(&m.name))
                .cloned()
                .collect(),
        )
    }

    /// The records of `self` whose names appear in `names`.
    pub fn filter_with_names(&self, names: &[String]) -> ModelSet {
        let wanted: HashSet<&str> = names.iter().map(String::as_str).collect();
        ModelSet(
            self.0
                .iter()
                .filter(|m| wanted.contains(m.name.as_str()))
                .cloned()
                .collect(),
        )
    }

    /// Every record name, in set order.
    pub fn names(&self) -> Vec<String> {
        self.0.iter().map(|m| m.name.clone()).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ModelRecord> {
        self.0.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, ModelRecord> {
        self.0.iter_mut()
    }

    pub fn into_vec(self) -> Vec<ModelRecord> {
        self.0
    }
}

impl From<Vec<ModelRecord>> for ModelSet {
    /// Build a set from records, dropping later duplicates by name.
    fn from(records: Vec<ModelRecord>) -> Self {
        let mut set = ModelSet::new();
        for record in records {
            set.push(record);
        }
        set
    }
}

impl IntoIterator for ModelSet {
    type Item = ModelRecord;
    type IntoIter = std::vec::IntoIter<ModelRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ModelSet {
    type Item = &'a ModelRecord;
    type IntoIter = std::slice::Iter<'a, ModelRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Stable deduplication of requested names, first occurrence wins.
pub fn dedupe_names(names: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .iter()
        .filter(|n| seen.insert(n.as_str()))
        .cloned()
        .collect()
}
