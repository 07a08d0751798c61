// src/pipeline/builder.rs
use super::backend::LopdfLoader;
use super::config::ConverterConfig;
use super::download::{DirectorySink, DownloadSink};
use super::orchestrator::{Converter, ConverterInner};
use crate::error::ConvertError;
use crate::markdown::{AmmoniaSanitizer, MarkdownOptions, MarkdownRenderer, PulldownLoader};
use mdpress_render_core::{PdfOptions, Rasterizer};
use mdpress_traits::{HtmlSanitizer, LazyModule, MarkdownTransform, ModuleLoader};
use std::path::PathBuf;
use std::sync::Arc;

/// A builder for creating a [`Converter`].
///
/// Every collaborator has a default: `pulldown-cmark` for Markdown,
/// `ammonia` for sanitizing, `lopdf` for PDF output and a directory sink
/// writing into the current directory.
#[derive(Default)]
pub struct ConverterBuilder {
    config: ConverterConfig,
    transform_loader: Option<Arc<dyn ModuleLoader<dyn MarkdownTransform>>>,
    sanitizer: Option<Arc<dyn HtmlSanitizer>>,
    rasterizer_loader: Option<Arc<dyn ModuleLoader<dyn Rasterizer>>>,
    download_sink: Option<Arc<dyn DownloadSink>>,
    output_dir: Option<PathBuf>,
}

impl ConverterBuilder {
    /// Creates a new `ConverterBuilder` starting from the sample document.
    pub fn new() -> Self {
        Default::default()
    }

    /// Replaces the whole serializable configuration.
    pub fn with_config(mut self, config: ConverterConfig) -> Self {
        self.config = config;
        self
    }

    /// The document the session starts with.
    pub fn with_initial_document(mut self, text: impl Into<String>) -> Self {
        self.config.initial_document = text.into();
        self
    }

    pub fn with_pdf_options(mut self, options: PdfOptions) -> Self {
        self.config.pdf = options;
        self
    }

    /// Configures PDF options from a JSON object such as
    /// `{"margin": [10, 15], "unit": "mm", "pageFormat": "letter"}`.
    pub fn with_pdf_options_json(mut self, json: &str) -> Result<Self, ConvertError> {
        self.config.pdf = PdfOptions::from_json(json)?;
        Ok(self)
    }

    pub fn with_markdown_options(mut self, options: MarkdownOptions) -> Self {
        self.config.markdown = options;
        self
    }

    /// Substitutes the Markdown transform. Markdown options then no longer
    /// apply unless the loader honors them itself.
    pub fn with_transform_loader(mut self, loader: Arc<dyn ModuleLoader<dyn MarkdownTransform>>) -> Self {
        self.transform_loader = Some(loader);
        self
    }

    pub fn with_sanitizer(mut self, sanitizer: Arc<dyn HtmlSanitizer>) -> Self {
        self.sanitizer = Some(sanitizer);
        self
    }

    /// Substitutes the PDF backend.
    pub fn with_rasterizer_loader(mut self, loader: Arc<dyn ModuleLoader<dyn Rasterizer>>) -> Self {
        self.rasterizer_loader = Some(loader);
        self
    }

    /// Sets where exported files go. Takes precedence over [`with_output_dir`](Self::with_output_dir).
    pub fn with_download_sink(mut self, sink: Arc<dyn DownloadSink>) -> Self {
        self.download_sink = Some(sink);
        self
    }

    /// Saves exported files into `dir`, creating it on the first export.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Consumes the builder and creates the `Converter`.
    ///
    /// Nothing is loaded or rendered yet; call [`Converter::refresh`] for the
    /// first preview.
    pub fn build(self) -> Result<Converter, ConvertError> {
        let ConverterConfig {
            initial_document,
            pdf,
            markdown,
        } = self.config;

        pdf.validate()
            .map_err(|e| ConvertError::Config(format!("PDF options rejected: {}", e)))?;

        let transform_loader = self
            .transform_loader
            .unwrap_or_else(|| Arc::new(PulldownLoader::new(markdown)));
        let sanitizer = self.sanitizer.unwrap_or_else(|| Arc::new(AmmoniaSanitizer));
        let rasterizer_loader = self
            .rasterizer_loader
            .unwrap_or_else(|| Arc::new(LopdfLoader::new()));

        let sink: Arc<dyn DownloadSink> = match (self.download_sink, self.output_dir) {
            (Some(sink), _) => sink,
            (None, Some(dir)) => Arc::new(DirectorySink::new(dir)),
            (None, None) => Arc::new(DirectorySink::new(".")),
        };

        log::info!(
            "Building converter: transform '{}', sanitizer '{}', backend '{}', sink '{}'.",
            transform_loader.name(),
            sanitizer.name(),
            rasterizer_loader.name(),
            sink.name()
        );

        let inner = ConverterInner::new(
            initial_document,
            MarkdownRenderer::new(transform_loader, sanitizer),
            LazyModule::new(rasterizer_loader),
            sink,
            pdf,
        );
        Ok(Converter::from_inner(inner))
    }
}
