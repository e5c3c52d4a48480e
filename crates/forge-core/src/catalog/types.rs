//! Shared catalog types and API response structs.

use serde::{Deserialize, Serialize};

/// Pipeline tags offered for interactive model selection.
///
/// Mirrors the subset of Hub pipeline tags the downloader knows how to
/// materialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineTag {
    TextGeneration,
    TextToImage,
    TextToVideo,
    TextTo3d,
    TextToAudio,
    ImageToText,
    ImageToImage,
}

impl PipelineTag {
    /// All supported tags, in display order.
    pub fn all() -> &'static [PipelineTag] {
        &[
            PipelineTag::TextGeneration,
            PipelineTag::TextToImage,
            PipelineTag::TextToVideo,
            PipelineTag::TextTo3d,
            PipelineTag::TextToAudio,
            PipelineTag::ImageToText,
            PipelineTag::ImageToImage,
        ]
    }

    /// The wire value used in catalog queries.
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineTag::TextGeneration => "text-generation",
            PipelineTag::TextToImage => "text-to-image",
            PipelineTag::TextToVideo => "text-to-video",
            PipelineTag::TextTo3d => "text-to-3d",
            PipelineTag::TextToAudio => "text-to-audio",
            PipelineTag::ImageToText => "image-to-text",
            PipelineTag::ImageToImage => "image-to-image",
        }
    }

    /// All tag wire values, for building a multi-select.
    pub fn all_strings() -> Vec<String> {
        Self::all().iter().map(|t| t.as_str().to_string()).collect()
    }

    /// Parse a wire value back into a tag.
    pub fn parse(value: &str) -> Option<PipelineTag> {
        Self::all().iter().copied().find(|t| t.as_str() == value)
    }
}

impl std::fmt::Display for PipelineTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One model as described by the remote catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogModel {
    /// Fully qualified `owner/repo` identifier.
    pub name: String,
    /// Pipeline tag reported by the catalog, if any.
    #[serde(default)]
    pub pipeline_tag: Option<String>,
    /// Python library backing the model (transformers, diffusers, ...).
    #[serde(default)]
    pub library_name: Option<String>,
    /// Last modification timestamp, as reported by the catalog.
    #[serde(default)]
    pub last_modified: Option<String>,
}

/// Raw `/api/models` entry. Only the fields the pipeline consumes.
#[derive(Debug, Deserialize)]
pub(crate) struct CatalogApiEntry {
    #[serde(rename = "modelId", alias = "id")]
    pub model_id: String,
    #[serde(default)]
    pub pipeline_tag: Option<String>,
    #[serde(default)]
    pub library_name: Option<String>,
    #[serde(rename = "lastModified", default)]
    pub last_modified: Option<String>,
}

impl From<CatalogApiEntry> for CatalogModel {
    fn from(entry: CatalogApiEntry) -> Self {
        CatalogModel {
            name: entry.model_id,
            pipeline_tag: entry.pipeline_tag,
            library_name: entry.library_name,
            last_modified: entry.last_modified,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_round_trip() {
        for tag in PipelineTag::all() {
            assert_eq!(PipelineTag::parse(tag.as_str()), Some(*tag));
        }
        assert_eq!(PipelineTag::parse("feature-extraction"), None);
    }

    #[test]
    fn test_api_entry_conversion() {
        let entry: CatalogApiEntry = serde_json::from_str(
            r#"{"modelId":"openai/whisper-small","pipeline_tag":"text-to-audio","library_name":"transformers","lastModified":"2024-02-01T00:00:00.000Z"}"#,
        )
        .unwrap();
        let model: CatalogModel = entry.into();
        assert_eq!(model.name, "openai/whisper-small");
        assert_eq!(model.library_name.as_deref(), Some("transformers"));
    }
}
