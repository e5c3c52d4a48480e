//! ModelForge Library - Headless model acquisition and reconciliation.
//!
//! This crate implements the full pipeline behind the `modelforge` CLI:
//! resolving requested model names against the remote catalog, reconciling
//! them with the project configuration and the local disk, driving the
//! Python downloader, and committing successful acquisitions atomically.
//! It has no terminal dependency; prompts go through the [`Interact`]
//! trait, so the pipeline can run headless.
//!
//! # Example
//!
//! ```rust,ignore
//! use modelforge_library::{
//!     commit, AssumeDefaults, CatalogClient, ProjectConfig, ReconcileEngine,
//!     ReconcileOptions, ScriptAcquirer,
//! };
//!
//! #[tokio::main]
//! async fn main() -> modelforge_library::Result<()> {
//!     let store = ProjectConfig::open("/path/to/project")?;
//!     let catalog = CatalogClient::new()?;
//!     let engine = ReconcileEngine::new(
//!         &catalog,
//!         &store,
//!         &AssumeDefaults,
//!         ReconcileOptions::default(),
//!     );
//!
//!     let plan = engine.reconcile(&["openai/clip".into()]).await?;
//!     let acquirer = ScriptAcquirer::new("/path/to/project");
//!     let outcome = commit(&store, &acquirer, plan.approved).await?;
//!     println!("declared {} model(s)", outcome.succeeded.len());
//!
//!     Ok(())
//! }
//! ```

pub mod acquire;
pub mod catalog;
pub mod config;
pub mod error;
pub mod interact;
pub mod model;
pub mod project;
pub mod reconcile;

pub use acquire::{AcquireArgs, AcquireReport, Acquirer, ScriptAcquirer};
pub use catalog::{CatalogClient, CatalogModel, CatalogSource, PipelineTag};
pub use error::{ForgeError, Result};
pub use interact::{AssumeDefaults, Interact};
pub use model::{ModelOrigin, ModelRecord, ModelSet};
pub use project::{ConfigStore, ProjectConfig};
pub use reconcile::{
    commit, plan_update, CommitOutcome, ReconcileEngine, ReconcileOptions, Reconciliation,
    UpdatePlan,
};
