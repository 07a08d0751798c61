use crate::layout::{LayoutSettings, layout_blocks};
use crate::markup::{BlockKind, parse_blocks};
use crate::writer::{DocumentInfo, write_document};
use async_trait::async_trait;
use mdpress_render_core::{ExportRequest, PdfFile, Rasterizer, RenderError};

/// A PDF backend using the `lopdf` library.
///
/// Rendering is CPU-bound, so the async entry point runs it on tokio's
/// blocking pool and the caller's task stays free while a page set is built.
#[derive(Debug, Clone)]
pub struct LopdfRasterizer {
    producer: String,
}

impl Default for LopdfRasterizer {
    fn default() -> Self {
        Self {
            producer: format!("mdpress {}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl LopdfRasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_producer(mut self, producer: impl Into<String>) -> Self {
        self.producer = producer.into();
        self
    }

    /// Renders on the current thread.
    pub fn render_blocking(&self, request: &ExportRequest) -> Result<PdfFile, RenderError> {
        if request.fragment.is_empty() {
            return Err(RenderError::EmptyFragment);
        }
        request.options.validate()?;
        let geometry = request.options.geometry()?;

        let blocks = parse_blocks(&request.fragment.to_html())?;
        if blocks.is_empty() {
            return Err(RenderError::EmptyFragment);
        }

        let settings = LayoutSettings::from_points(
            geometry.content_width(),
            geometry.content_height(),
            request.options.raster_scale,
        );
        let pages = layout_blocks(&blocks, &settings);

        let filename = request.options.output_filename();
        let title = request
            .options
            .title
            .clone()
            .or_else(|| {
                blocks
                    .iter()
                    .find(|b| matches!(b.kind, BlockKind::Heading(_)))
                    .map(|b| b.plain_text())
            })
            .unwrap_or_else(|| filename.trim_end_matches(".pdf").to_string());

        let info = DocumentInfo {
            title: &title,
            producer: &self.producer,
        };
        let bytes = write_document(&pages, &geometry, &info, request.options.enable_links)?;

        log::info!(
            "Rendered '{}': {} block(s) on {} page(s), {} bytes.",
            filename,
            blocks.len(),
            pages.len(),
            bytes.len()
        );
        Ok(PdfFile {
            filename,
            bytes,
            page_count: pages.len(),
        })
    }
}

#[async_trait]
impl Rasterizer for LopdfRasterizer {
    async fn render(&self, request: &ExportRequest) -> Result<PdfFile, RenderError> {
        let this = self.clone();
        let request = request.clone();
        tokio::task::spawn_blocking(move || this.render_blocking(&request))
            .await
            .map_err(|e| RenderError::Other(format!("Render task failed: {}", e)))?
    }

    fn name(&self) -> &'static str {
        "lopdf"
    }
}
