use crate::markdown::{DEFAULT_SAMPLE_DOCUMENT, MarkdownOptions};
use mdpress_render_core::PdfOptions;
use serde::{Deserialize, Serialize};

/// Class of the container element the export fragment is wrapped in.
pub const EXPORT_CONTAINER_CLASS: &str = "markdown-body";

/// Serializable part of a converter's configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConverterConfig {
    pub initial_document: String,
    pub pdf: PdfOptions,
    pub markdown: MarkdownOptions,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            initial_document: DEFAULT_SAMPLE_DOCUMENT.to_string(),
            pdf: PdfOptions::default(),
            markdown: MarkdownOptions::default(),
        }
    }
}

/// Whether the preview reflects the latest edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    /// An edit has been made whose render has not been applied yet.
    Dirty,
    Clean,
}
