//! Remote model catalog integration.
//!
//! The reconciliation pipeline consumes the catalog through the
//! [`CatalogSource`] trait: lookup by identifier and listing by pipeline
//! tag. [`CatalogClient`] is the HTTP implementation against the
//! HuggingFace Hub API; tests substitute an in-memory source.

mod client;
mod types;

pub use client::CatalogClient;
pub use types::{CatalogModel, PipelineTag};

use crate::error::Result;
use async_trait::async_trait;

/// Read-only access to the remote model catalog.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Look up a single model by its `owner/repo` identifier.
    ///
    /// Returns [`ForgeError::ModelNotFound`](crate::ForgeError::ModelNotFound)
    /// when the catalog has no such model.
    async fn model_by_name(&self, name: &str) -> Result<CatalogModel>;

    /// List all models carrying a pipeline tag, as one flat sequence.
    async fn models_by_tag(&self, tag: PipelineTag) -> Result<Vec<CatalogModel>>;
}
