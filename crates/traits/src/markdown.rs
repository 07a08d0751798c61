//! Collaborators of the Markdown renderer.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    #[error("Markdown transform failed: {0}")]
    Transform(String),

    #[error("HTML sanitizer failed: {0}")]
    Sanitize(String),
}

/// Converts Markdown source into raw (unsanitized) HTML.
///
/// The grammar is up to the implementation; callers only rely on
/// commonmark-family input producing an HTML string.
#[async_trait]
pub trait MarkdownTransform: Send + Sync {
    async fn to_html(&self, markdown: &str) -> Result<String, TransformError>;

    fn name(&self) -> &'static str;
}

/// Removes active content (scripts, event handlers, disallowed tags and
/// attributes) from an HTML string.
pub trait HtmlSanitizer: Send + Sync {
    fn sanitize(&self, html: &str) -> Result<String, TransformError>;

    fn name(&self) -> &'static str;
}
