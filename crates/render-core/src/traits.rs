use crate::error::RenderError;
use crate::types::{ExportRequest, PdfFile};
use async_trait::async_trait;

/// A PDF backend that lays a detached HTML fragment out onto pages.
///
/// Implementations produce exactly one file per call. An empty fragment
/// must be reported as [`RenderError::EmptyFragment`] rather than yielding
/// a blank document.
#[async_trait]
pub trait Rasterizer: Send + Sync {
    async fn render(&self, request: &ExportRequest) -> Result<PdfFile, RenderError>;

    /// Returns a human-readable name for this backend (for logging/debugging).
    fn name(&self) -> &'static str;
}
