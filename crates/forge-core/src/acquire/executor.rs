//! Script-backed acquisition executor.

use super::args::{AcquireArgs, AcquireReport};
use super::scripts::{ensure_scripts_deployed, venv_python};
use super::Acquirer;
use crate::error::{ForgeError, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::{debug, warn};

/// Runs the deployed downloader script with the project venv's Python.
pub struct ScriptAcquirer {
    project_root: PathBuf,
}

impl ScriptAcquirer {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
        }
    }

    fn python(&self) -> Result<PathBuf> {
        let python = venv_python(&self.project_root);
        if !python.exists() {
            return Err(ForgeError::Config {
                message: format!(
                    "No virtual environment found at {}; create one before adding models",
                    python.display()
                ),
            });
        }
        Ok(python)
    }

    /// The report is the last stdout line; anything before it is script
    /// logging and is ignored.
    fn parse_report(stdout: &str) -> Result<Option<AcquireReport>> {
        let last = stdout.lines().rev().find(|l| !l.trim().is_empty());
        let Some(line) = last else {
            return Ok(None);
        };

        let report: AcquireReport =
            serde_json::from_str(line.trim()).map_err(|e| ForgeError::Json {
                message: format!("Downloader returned malformed report: {}", e),
                source: Some(e),
            })?;
        Ok(Some(report))
    }
}

#[async_trait]
impl Acquirer for ScriptAcquirer {
    async fn acquire(&self, args: &AcquireArgs) -> Result<Option<AcquireReport>> {
        let python = self.python()?;
        let script = ensure_scripts_deployed(&self.project_root)?;

        debug!("Acquiring {} via {}", args.model_name, script.display());

        let output = Command::new(&python)
            .arg(&script)
            .args(args.to_argv())
            .current_dir(&self.project_root)
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| ForgeError::AcquisitionFailed {
                name: args.model_name.clone(),
                message: format!("failed to spawn downloader: {}", e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = stderr.lines().last().unwrap_or("no error output");
            warn!("Downloader failed for {}: {}", args.model_name, detail);
            return Err(ForgeError::AcquisitionFailed {
                name: args.model_name.clone(),
                message: detail.to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Self::parse_report(&stdout)
    }
}
