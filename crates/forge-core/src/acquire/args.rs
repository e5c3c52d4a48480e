//! Acquisition parameters and script result mapping.

use crate::error::{ForgeError, Result};
use crate::model::ModelRecord;
use serde::Deserialize;
use std::ffi::OsString;
use std::path::PathBuf;

/// Resolved parameters for one acquisition run.
#[derive(Debug, Clone)]
pub struct AcquireArgs {
    /// `owner/repo` identifier of the model.
    pub model_name: String,
    /// Python module used for the download.
    pub module: String,
    /// Class within the module, when known.
    pub class: Option<String>,
    /// Extra `key=value` options passed through to the script.
    pub options: Vec<String>,
    /// Directory model artifacts are materialized under.
    pub models_dir: PathBuf,
    /// Resolve configuration only; declare without downloading.
    pub only_configuration: bool,
    /// The engine already confirmed overwriting an existing path.
    pub overwrite: bool,
}

impl AcquireArgs {
    /// Build arguments for a record approved by reconciliation.
    pub fn for_record(record: &ModelRecord, models_dir: PathBuf) -> Result<Self> {
        let module = record.module.clone().ok_or_else(|| ForgeError::Validation {
            field: "module".into(),
            message: format!("no downloader module resolved for {}", record.name),
        })?;

        Ok(AcquireArgs {
            model_name: record.name.clone(),
            module,
            class: record.class.clone(),
            options: record.options.clone(),
            models_dir,
            only_configuration: !record.install_now,
            overwrite: true,
        })
    }

    /// The argv handed to the downloader script.
    pub fn to_argv(&self) -> Vec<OsString> {
        let mut argv: Vec<OsString> = vec![
            self.models_dir.clone().into(),
            self.model_name.clone().into(),
            self.module.clone().into(),
        ];

        if let Some(ref class) = self.class {
            argv.push("--class".into());
            argv.push(class.clone().into());
        }
        if !self.options.is_empty() {
            argv.push("--options".into());
            argv.extend(self.options.iter().map(|o| o.clone().into()));
        }
        if self.only_configuration {
            argv.push("--only-configuration".into());
        }
        if self.overwrite {
            argv.push("--overwrite".into());
        }

        argv
    }
}

/// JSON report printed by the downloader script.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AcquireReport {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub module: Option<String>,
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub options: Vec<String>,
}

impl AcquireReport {
    /// Fold the report back into a record, keeping fields the script
    /// did not touch.
    pub fn apply_to(&self, record: &mut ModelRecord) {
        if self.path.is_some() {
            record.path = self.path.clone();
        }
        if self.module.is_some() {
            record.module = self.module.clone();
        }
        if self.class.is_some() {
            record.class = self.class.clone();
        }
        if !self.options.is_empty() {
            record.options = self.options.clone();
        }
    }
}
