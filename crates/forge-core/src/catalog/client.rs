//! HTTP catalog client against the HuggingFace Hub API.

use super::types::{CatalogApiEntry, CatalogModel, PipelineTag};
use super::CatalogSource;
use crate::config::NetworkConfig;
use crate::error::{ForgeError, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

/// Client for catalog lookups by identifier and by pipeline tag.
pub struct CatalogClient {
    client: Client,
    base_url: String,
}

impl CatalogClient {
    /// Create a client against the public catalog endpoint.
    pub fn new() -> Result<Self> {
        Self::with_base_url(NetworkConfig::CATALOG_API_BASE)
    }

    /// Create a client against a custom endpoint (tests, mirrors).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(NetworkConfig::REQUEST_TIMEOUT)
            .user_agent(NetworkConfig::USER_AGENT)
            .build()
            .map_err(|e| ForgeError::Network {
                message: format!("Failed to create HTTP client: {}", e),
                cause: None,
            })?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Fetch one page of models for a pipeline tag.
    async fn tag_page(&self, tag: PipelineTag, offset: u32) -> Result<Vec<CatalogModel>> {
        let url = format!(
            "{}/models?pipeline_tag={}&config=config&limit={}&skip={}",
            self.base_url,
            urlencoding::encode(tag.as_str()),
            NetworkConfig::CATALOG_PAGE_SIZE,
            offset
        );

        let response = self.client.get(&url).send().await.map_err(|e| {
            ForgeError::Network {
                message: format!("Catalog request failed: {}", e),
                cause: Some(e.to_string()),
            }
        })?;

        if !response.status().is_success() {
            return Err(ForgeError::Network {
                message: format!("Catalog returned {} for tag {}", response.status(), tag),
                cause: None,
            });
        }

        let entries: Vec<CatalogApiEntry> =
            response.json().await.map_err(|e| ForgeError::Json {
                message: format!("Failed to parse catalog response: {}", e),
                source: None,
            })?;

        Ok(entries.into_iter().map(CatalogModel::from).collect())
    }
}

#[async_trait]
impl CatalogSource for CatalogClient {
    /// Fetch a model directly by its `owner/repo` identifier.
    ///
    /// The slash is part of the URL path and must not be percent-encoded.
    async fn model_by_name(&self, name: &str) -> Result<CatalogModel> {
        let url = format!("{}/models/{}", self.base_url, name);

        let response = self.client.get(&url).send().await.map_err(|e| {
            ForgeError::Network {
                message: format!("Catalog request failed: {}", e),
                cause: Some(e.to_string()),
            }
        })?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ForgeError::ModelNotFound {
                name: name.to_string(),
            });
        }

        if !response.status().is_success() {
            return Err(ForgeError::Network {
                message: format!("Catalog returned {} for model {}", response.status(), name),
                cause: None,
            });
        }

        let entry: CatalogApiEntry = response.json().await.map_err(|e| ForgeError::Json {
            message: format!("Failed to parse catalog response: {}", e),
            source: None,
        })?;

        Ok(entry.into())
    }

    /// Fetch every model for a tag, flattening the catalog's paging.
    ///
    /// Paging stops at the first short page or after
    /// [`NetworkConfig::CATALOG_MAX_PAGES`] pages, whichever comes first.
    async fn models_by_tag(&self, tag: PipelineTag) -> Result<Vec<CatalogModel>> {
        let mut all = Vec::new();

        for page in 0..NetworkConfig::CATALOG_MAX_PAGES {
            let offset = page * NetworkConfig::CATALOG_PAGE_SIZE;
            let models = self.tag_page(tag, offset).await?;
            let short_page = (models.len() as u32) < NetworkConfig::CATALOG_PAGE_SIZE;

            debug!("tag {} page {}: {} models", tag, page, models.len());
            all.extend(models);

            if short_page {
                break;
            }
        }

        Ok(all)
    }
}
