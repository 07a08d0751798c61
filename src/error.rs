// src/error.rs
use mdpress_render_core::RenderError;
use mdpress_traits::{LoadError, TransformError};
use thiserror::Error;

/// Why a single export attempt was abandoned. The session stays usable.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Nothing to export: the rendered document is empty")]
    EmptyFragment,

    #[error("PDF backend could not be loaded: {0}")]
    BackendUnavailable(#[source] LoadError),

    #[error("PDF backend failed: {0}")]
    Backend(#[from] RenderError),

    #[error("Failed to save PDF: {0}")]
    Save(#[from] std::io::Error),
}

/// A comprehensive error type for the conversion pipeline.
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Markdown transform could not be loaded: {0}")]
    TransformLoad(#[from] LoadError),

    #[error("Markdown rendering failed: {0}")]
    Render(String),

    #[error("HTML sanitization failed: {0}")]
    Sanitize(String),

    #[error("Export failed: {0}")]
    Export(#[from] ExportError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<TransformError> for ConvertError {
    fn from(e: TransformError) -> Self {
        match e {
            TransformError::Transform(msg) => ConvertError::Render(msg),
            TransformError::Sanitize(msg) => ConvertError::Sanitize(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_errors_map_to_their_stage() {
        let render: ConvertError = TransformError::Transform("bad".into()).into();
        assert!(matches!(render, ConvertError::Render(m) if m == "bad"));
        let sanitize: ConvertError = TransformError::Sanitize("worse".into()).into();
        assert!(matches!(sanitize, ConvertError::Sanitize(_)));
    }

    #[test]
    fn export_errors_nest() {
        let err: ConvertError = ExportError::from(RenderError::EmptyFragment).into();
        assert_eq!(
            err.to_string(),
            "Export failed: PDF backend failed: Nothing to render: the fragment is empty"
        );
    }
}
