//! Centralized configuration constants for modelforge.
//!
//! Project layout names and network parameters shared across modules.

use std::time::Duration;

/// Project directory and file name layout.
pub struct PathsConfig;

impl PathsConfig {
    /// Persisted project configuration at the project root.
    pub const CONFIG_FILE_NAME: &'static str = "modelforge.json";
    /// Directory where model artifacts are materialized.
    pub const MODELS_DIR_NAME: &'static str = "models";
    /// Project virtual environment used to run the downloader.
    pub const VENV_DIR_NAME: &'static str = ".venv";
    /// Tool-private data directory at the project root.
    pub const DATA_DIR_NAME: &'static str = ".forge";
    /// Deployed helper scripts under the data directory.
    pub const SCRIPTS_DIR_NAME: &'static str = "scripts";
}

/// Network-related configuration.
pub struct NetworkConfig;

impl NetworkConfig {
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
    pub const USER_AGENT: &'static str = "modelforge-library/0.3";
    pub const CATALOG_API_BASE: &'static str = "https://huggingface.co/api";
    pub const CATALOG_PAGE_SIZE: u32 = 100;
    pub const CATALOG_MAX_PAGES: u32 = 5;
}
