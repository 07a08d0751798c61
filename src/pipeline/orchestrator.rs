use super::config::{EXPORT_CONTAINER_CLASS, RenderState};
use super::download::{DownloadSink, SavedPdf};
use super::surface::SurfaceHost;
use crate::error::{ConvertError, ExportError};
use crate::filename::{derive_filename, display_filename};
use crate::markdown::{MarkdownRenderer, SanitizedHtml};
use mdpress_render_core::{ExportRequest, HtmlFragment, PdfOptions, Rasterizer, RenderError};
use mdpress_traits::LazyModule;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;

/// How a render pass ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The result became the current preview.
    Applied { version: u64 },
    /// A newer version had already been applied; the result was dropped.
    Superseded { version: u64, applied: u64 },
}

impl RenderOutcome {
    pub fn version(&self) -> u64 {
        match *self {
            RenderOutcome::Applied { version } | RenderOutcome::Superseded { version, .. } => version,
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, RenderOutcome::Applied { .. })
    }
}

/// Handle to a spawned render pass. Dropping it does not cancel the render.
#[derive(Debug)]
pub struct RenderHandle {
    version: u64,
    task: JoinHandle<RenderOutcome>,
}

impl RenderHandle {
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits for the render pass to complete.
    pub async fn wait(self) -> Result<RenderOutcome, ConvertError> {
        self.task
            .await
            .map_err(|e| ConvertError::Render(format!("render task for v{} did not complete: {}", self.version, e)))
    }
}

struct Session {
    document: String,
    /// Highest version stamped on an edit.
    version: u64,
    /// Highest version whose render has been applied; 0 before the first.
    applied_version: u64,
    rendered: SanitizedHtml,
    last_error: Option<String>,
}

pub(crate) struct ConverterInner {
    pub(crate) renderer: MarkdownRenderer,
    pub(crate) rasterizer: LazyModule<dyn Rasterizer>,
    pub(crate) sink: Arc<dyn DownloadSink>,
    pub(crate) surfaces: SurfaceHost,
    pub(crate) pdf_options: PdfOptions,
    session: Mutex<Session>,
}

impl ConverterInner {
    pub(crate) fn new(
        document: String,
        renderer: MarkdownRenderer,
        rasterizer: LazyModule<dyn Rasterizer>,
        sink: Arc<dyn DownloadSink>,
        pdf_options: PdfOptions,
    ) -> Self {
        Self {
            renderer,
            rasterizer,
            sink,
            surfaces: SurfaceHost::new(),
            pdf_options,
            session: Mutex::new(Session {
                document,
                // The initial document counts as the first edit.
                version: 1,
                applied_version: 0,
                rendered: SanitizedHtml::default(),
                last_error: None,
            }),
        }
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn render_version(&self, version: u64, text: String) -> RenderOutcome {
        let result = self.renderer.try_render(&text).await;

        let mut session = self.session();
        if version <= session.applied_version {
            log::debug!(
                "Discarding render v{}: v{} is already applied.",
                version,
                session.applied_version
            );
            return RenderOutcome::Superseded {
                version,
                applied: session.applied_version,
            };
        }

        session.applied_version = version;
        match result {
            Ok(html) => {
                log::debug!("Applied render v{} ({} bytes of HTML).", version, html.as_str().len());
                session.rendered = html;
                session.last_error = None;
            }
            Err(e) => {
                log::warn!("Render v{} failed, preview cleared: {}", version, e);
                session.rendered = SanitizedHtml::default();
                session.last_error = Some(e.to_string());
            }
        }
        RenderOutcome::Applied { version }
    }

    async fn export(&self, html: SanitizedHtml, filename: String) -> Result<SavedPdf, ExportError> {
        let rasterizer = self
            .rasterizer
            .get()
            .await
            .map_err(ExportError::BackendUnavailable)?;

        let surface = self
            .surfaces
            .attach(HtmlFragment::container(EXPORT_CONTAINER_CLASS, html.into_string()));
        let request = ExportRequest::new(surface.fragment().clone(), filename, self.pdf_options.clone());

        let file = rasterizer.render(&request).await.map_err(|e| match e {
            RenderError::EmptyFragment => ExportError::EmptyFragment,
            other => ExportError::Backend(other),
        })?;
        log::info!(
            "'{}' rasterized by {}: {} page(s).",
            file.filename,
            rasterizer.name(),
            file.page_count
        );

        let saved = self.sink.save(file).await?;
        drop(surface);
        Ok(saved)
    }
}

/// The conversion orchestrator.
///
/// Owns the session state: the current document, its version stamps and
/// the last applied preview. Cloning yields another handle to the same
/// session.
#[derive(Clone)]
pub struct Converter {
    pub(crate) inner: Arc<ConverterInner>,
}

impl Converter {
    pub(crate) fn from_inner(inner: ConverterInner) -> Self {
        Self { inner: Arc::new(inner) }
    }

    /// Replaces the document and schedules a render of it.
    ///
    /// # Panics
    ///
    /// Must be called from within a tokio runtime, like `tokio::spawn`.
    pub fn set_document(&self, text: impl Into<String>) -> RenderHandle {
        let text = text.into();
        let version = {
            let mut session = self.inner.session();
            session.document.clone_from(&text);
            session.version += 1;
            session.version
        };
        self.spawn_render(version, text)
    }

    /// Schedules a render of the current document under a new version.
    /// Used to produce the first preview of a session.
    pub fn refresh(&self) -> RenderHandle {
        let (version, text) = {
            let mut session = self.inner.session();
            session.version += 1;
            (session.version, session.document.clone())
        };
        self.spawn_render(version, text)
    }

    fn spawn_render(&self, version: u64, text: String) -> RenderHandle {
        log::debug!("Scheduling render v{} ({} chars).", version, text.len());
        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(async move { inner.render_version(version, text).await });
        RenderHandle { version, task }
    }

    /// Sets the document and waits for its render.
    pub async fn render_now(&self, text: impl Into<String>) -> Result<RenderOutcome, ConvertError> {
        self.set_document(text).wait().await
    }

    /// Exports the last applied preview as a PDF named after the current
    /// document and hands it to the download sink.
    pub async fn export_pdf(&self) -> Result<SavedPdf, ConvertError> {
        let (html, filename, applied) = {
            let session = self.inner.session();
            (
                session.rendered.clone(),
                derive_filename(&session.document),
                session.applied_version,
            )
        };

        if html.is_empty() {
            log::error!("Export of '{}.pdf' aborted: nothing has been rendered.", filename);
            return Err(ExportError::EmptyFragment.into());
        }

        log::info!("Exporting '{}.pdf' from render v{}.", filename, applied);
        match self.inner.export(html, filename).await {
            Ok(saved) => {
                log::info!("Export complete: {} ({} bytes).", saved.filename, saved.size);
                Ok(saved)
            }
            Err(e) => {
                log::error!("Export failed: {}", e);
                Err(e.into())
            }
        }
    }

    /// Filename derived from the live document, without extension.
    pub fn current_filename(&self) -> String {
        derive_filename(&self.inner.session().document)
    }

    pub fn display_filename(&self) -> String {
        display_filename(&self.inner.session().document)
    }

    pub fn document(&self) -> String {
        self.inner.session().document.clone()
    }

    pub fn rendered_html(&self) -> SanitizedHtml {
        self.inner.session().rendered.clone()
    }

    pub fn version(&self) -> u64 {
        self.inner.session().version
    }

    pub fn applied_version(&self) -> u64 {
        self.inner.session().applied_version
    }

    pub fn render_state(&self) -> RenderState {
        let session = self.inner.session();
        if session.applied_version < session.version {
            RenderState::Dirty
        } else {
            RenderState::Clean
        }
    }

    /// Number of `\n`-separated lines in the document; an empty document has one.
    pub fn line_count(&self) -> usize {
        self.inner.session().document.split('\n').count()
    }

    /// Error of the most recent applied render, if it failed.
    pub fn last_render_error(&self) -> Option<String> {
        self.inner.session().last_error.clone()
    }

    pub fn pdf_options(&self) -> &PdfOptions {
        &self.inner.pdf_options
    }

    pub fn surfaces(&self) -> &SurfaceHost {
        &self.inner.surfaces
    }

    pub fn is_transform_loaded(&self) -> bool {
        self.inner.renderer.is_transform_loaded()
    }

    pub fn is_rasterizer_loaded(&self) -> bool {
        self.inner.rasterizer.is_loaded()
    }

    pub fn rasterizer_load_attempts(&self) -> usize {
        self.inner.rasterizer.load_attempts()
    }
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let session = self.inner.session();
        f.debug_struct("Converter")
            .field("version", &session.version)
            .field("applied_version", &session.applied_version)
            .field("renderer", &self.inner.renderer)
            .field("rasterizer", &self.inner.rasterizer)
            .field("sink", &self.inner.sink.name())
            .finish()
    }
}
